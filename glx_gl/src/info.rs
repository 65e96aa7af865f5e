use std::ffi::CStr;

use crate::transmutable_u32;

#[repr(u32)]
#[derive(Debug, Clone, Copy)]
pub enum GlString {
    Vendor = gl::VENDOR,
    Renderer = gl::RENDERER,
    Version = gl::VERSION,
    ShadingLanguageVersion = gl::SHADING_LANGUAGE_VERSION,
}
transmutable_u32!(GlString);

impl GlString {
    /// Requires a current context with loaded entry points.
    pub fn get_gl(&self) -> String {
        let str_ptr = unsafe { gl::GetString(self.to_u32()) };
        if str_ptr.is_null() {
            return String::new();
        }
        unsafe { CStr::from_ptr(str_ptr.cast()) }
            .to_string_lossy()
            .into_owned()
    }
}

/// Driver identification strings of the current context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverInfo {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
    pub shading_language_version: String,
}

impl DriverInfo {
    pub fn query() -> Option<Self> {
        if !gl::GetString::is_loaded() {
            return None;
        }
        Some(Self {
            vendor: GlString::Vendor.get_gl(),
            renderer: GlString::Renderer.get_gl(),
            version: GlString::Version.get_gl(),
            shading_language_version: GlString::ShadingLanguageVersion.get_gl(),
        })
    }

    pub fn log(&self) {
        log::info!("vendor: {}", self.vendor);
        log::info!("renderer: {}", self.renderer);
        log::info!("version: {}", self.version);
        log::info!("shading language version: {}", self.shading_language_version);
    }
}
