use glam::IVec2;
use glx_utils::OptExt;
use std::{
    borrow::Cow,
    ffi::{c_char, c_void, CStr, CString},
    ptr::{self, NonNull},
};

use glfw::ffi;

use crate::error::HostError;

#[repr(i32)]
#[derive(Debug, Clone, Copy)]
pub enum GlfwError {
    NotInitialized,
    NoCurrentContext,
    InvalidEnum,
    InvalidValue,
    OutOfMemory,
    ApiUnavailable,
    VersionUnavailable,
    PlatformError,
    FormatUnavailable,
    NoWindowContext,
    CursorUnavilable,
    FeatureUnavailable,
    FeatureUnimplemented,
    PlatformUnavailable,
}

impl GlfwError {
    pub fn from_num(err: i32) -> Option<Self> {
        Some(match err {
            0x00010001 => Self::NotInitialized,
            0x00010002 => Self::NoCurrentContext,
            0x00010003 => Self::InvalidEnum,
            0x00010004 => Self::InvalidValue,
            0x00010005 => Self::OutOfMemory,
            0x00010006 => Self::ApiUnavailable,
            0x00010007 => Self::VersionUnavailable,
            0x00010008 => Self::PlatformError,
            0x00010009 => Self::FormatUnavailable,
            0x0001000a => Self::NoWindowContext,
            0x0001000b => Self::CursorUnavilable,
            0x0001000c => Self::FeatureUnavailable,
            0x0001000d => Self::FeatureUnimplemented,
            0x0001000e => Self::PlatformUnavailable,
            _ => return None,
        })
    }
}

extern "C" fn err_callback(err: i32, desc: *const c_char) {
    let desc = if desc.is_null() {
        Cow::Borrowed("<no description>")
    } else {
        unsafe { CStr::from_ptr(desc) }.to_string_lossy()
    };
    match GlfwError::from_num(err) {
        Some(err) => log::error!("glfw error {err:?}: {desc}"),
        None => log::error!("glfw error {err:#x}: {desc}"),
    }
}

pub fn init() -> Option<()> {
    let err = unsafe { ffi::glfwInit() };
    (err == ffi::TRUE).then_some(())
}

pub fn terminate() {
    unsafe { ffi::glfwTerminate() }
}

pub fn install_errors() {
    unsafe { ffi::glfwSetErrorCallback(Some(err_callback)) };
}

pub fn get_proc_address(name: &'static str) -> *const c_void {
    let name = CString::new(name).unwrap_unreach();
    unsafe { ffi::glfwGetProcAddress(name.as_ptr()) }
}

pub fn poll_events() {
    unsafe { ffi::glfwPollEvents() }
}

/// Whether any window's context is current on this thread.
pub fn has_current_context() -> bool {
    !unsafe { ffi::glfwGetCurrentContext() }.is_null()
}

/// Size of the primary monitor's current video mode.
pub fn primary_monitor_size() -> Option<IVec2> {
    let monitor = unsafe { ffi::glfwGetPrimaryMonitor() };
    if monitor.is_null() {
        return None;
    }
    let mode = unsafe { ffi::glfwGetVideoMode(monitor) };
    // SAFETY: glfw owns the mode until the monitor disconnects; it is copied out here.
    let mode = unsafe { mode.as_ref() }?;
    Some(IVec2::new(mode.width, mode.height))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowHint {
    ContextVersion { major: u32, minor: u32 },
    CoreProfile,
    ForwardCompat(bool),
    FocusOnShow(bool),
}

fn glfw_bool(value: bool) -> i32 {
    if value {
        ffi::TRUE
    } else {
        ffi::FALSE
    }
}

pub fn reset_window_hints() {
    unsafe { ffi::glfwDefaultWindowHints() }
}

pub fn window_hint(hint: WindowHint) {
    unsafe {
        match hint {
            WindowHint::ContextVersion { major, minor } => {
                ffi::glfwWindowHint(ffi::CONTEXT_VERSION_MAJOR, major as i32);
                ffi::glfwWindowHint(ffi::CONTEXT_VERSION_MINOR, minor as i32);
            }
            WindowHint::CoreProfile => {
                ffi::glfwWindowHint(ffi::OPENGL_PROFILE, ffi::OPENGL_CORE_PROFILE)
            }
            WindowHint::ForwardCompat(value) => {
                ffi::glfwWindowHint(ffi::OPENGL_FORWARD_COMPAT, glfw_bool(value))
            }
            WindowHint::FocusOnShow(value) => {
                ffi::glfwWindowHint(ffi::FOCUS_ON_SHOW, glfw_bool(value))
            }
        }
    }
}

/// An owned glfw window and its context. Destroyed on `Drop`.
pub struct Window {
    window: NonNull<ffi::GLFWwindow>,
}

impl Drop for Window {
    fn drop(&mut self) {
        unsafe { ffi::glfwDestroyWindow(self.window.as_ptr()) }
    }
}

impl Window {
    pub fn create(width: i32, height: i32, title: &str) -> Result<Self, HostError> {
        let as_c_str = CString::new(title).map_err(|_| HostError::InvalidTitle)?;
        let window = unsafe {
            ffi::glfwCreateWindow(
                width,
                height,
                as_c_str.as_ptr(),
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };

        if let Some(window) = NonNull::new(window) {
            Ok(Self { window })
        } else {
            Err(HostError::WindowCreation("glfwCreateWindow returned null".into()))
        }
    }

    pub fn should_close(&self) -> bool {
        (unsafe { ffi::glfwWindowShouldClose(self.window.as_ptr()) }) > 0
    }

    pub fn swap_buffers(&self) {
        unsafe { ffi::glfwSwapBuffers(self.window.as_ptr()) }
    }

    pub fn make_current(&self) {
        unsafe { ffi::glfwMakeContextCurrent(self.window.as_ptr()) };
    }

    pub fn is_current(&self) -> bool {
        unsafe { ffi::glfwGetCurrentContext() == self.window.as_ptr() }
    }

    pub fn set_aspect_ratio(&self, numerator: i32, denominator: i32) {
        unsafe { ffi::glfwSetWindowAspectRatio(self.window.as_ptr(), numerator, denominator) }
    }

    pub fn get_framebuffer_size(&self) -> IVec2 {
        let mut result = IVec2::ZERO;
        unsafe { ffi::glfwGetFramebufferSize(self.window.as_ptr(), &mut result.x, &mut result.y) };
        result
    }
}
