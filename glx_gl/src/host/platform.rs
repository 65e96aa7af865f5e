use std::rc::Rc;

use glam::IVec2;

use crate::driver::{GlDriver, ShaderDriver};
use crate::error::{GlError, HostError};
use crate::glfw::{self, Window, WindowHint};
use crate::info::DriverInfo;

use super::HostConfig;

/// The windowing library a [`RenderHost`](super::RenderHost) runs on.
///
/// Context currency is process-wide state: at most one host may drive a
/// platform at a time.
pub trait Platform {
    type Window: PlatformWindow;

    fn shader_driver(&self) -> Rc<dyn ShaderDriver>;
    fn primary_monitor_size(&self) -> Option<IVec2>;

    /// Turns `config` into hints for the next created window.
    fn apply_hints(&mut self, config: &HostConfig);
    fn create_window(&mut self, config: &HostConfig) -> Result<Self::Window, HostError>;
    /// May block waiting for input events.
    fn poll_events(&mut self);
}

/// A window together with its context. Dropping it destroys both.
pub trait PlatformWindow {
    fn framebuffer_size(&self) -> IVec2;
    fn make_current(&self);
    fn is_current(&self) -> bool;
    /// Resolves graphics entry points for the current context.
    fn load_extensions(&self, config: &HostConfig) -> Result<(), HostError>;

    fn should_close(&self) -> bool;
    fn swap_buffers(&self);

    fn take_gl_error(&self) -> Option<GlError>;
    fn driver_info(&self) -> Option<DriverInfo>;
}

/// An initialized glfw library. Terminates glfw on `Drop`.
pub struct Glfw {
    driver: Rc<GlDriver>,
}

impl Glfw {
    pub fn init() -> Result<Self, HostError> {
        glfw::install_errors();
        glfw::init().ok_or(HostError::GlfwInit)?;
        Ok(Self {
            driver: Rc::new(GlDriver),
        })
    }
}

impl Drop for Glfw {
    fn drop(&mut self) {
        glfw::terminate();
    }
}

impl Platform for Glfw {
    type Window = Window;

    fn shader_driver(&self) -> Rc<dyn ShaderDriver> {
        self.driver.clone()
    }

    fn primary_monitor_size(&self) -> Option<IVec2> {
        glfw::primary_monitor_size()
    }

    fn apply_hints(&mut self, config: &HostConfig) {
        glfw::reset_window_hints();
        glfw::window_hint(WindowHint::ContextVersion {
            major: config.gl_version.major,
            minor: config.gl_version.minor,
        });
        glfw::window_hint(WindowHint::FocusOnShow(config.focus_on_show));
        glfw::window_hint(WindowHint::CoreProfile);
        glfw::window_hint(WindowHint::ForwardCompat(config.forward_compatible));
    }

    fn create_window(&mut self, config: &HostConfig) -> Result<Window, HostError> {
        let window = Window::create(config.width, config.height, &config.title)?;
        if let Some(ratio) = config.aspect_ratio {
            window.set_aspect_ratio(ratio.numerator, ratio.denominator);
        }
        Ok(window)
    }

    fn poll_events(&mut self) {
        glfw::poll_events();
    }
}

type EntryPoint = (&'static str, fn() -> bool);

const REQUIRED_ENTRY_POINTS: [EntryPoint; 11] = [
    ("glGetError", gl::GetError::is_loaded),
    ("glGetString", gl::GetString::is_loaded),
    ("glViewport", gl::Viewport::is_loaded),
    ("glCreateShader", gl::CreateShader::is_loaded),
    ("glShaderSource", gl::ShaderSource::is_loaded),
    ("glCompileShader", gl::CompileShader::is_loaded),
    ("glDeleteShader", gl::DeleteShader::is_loaded),
    ("glCreateProgram", gl::CreateProgram::is_loaded),
    ("glAttachShader", gl::AttachShader::is_loaded),
    ("glLinkProgram", gl::LinkProgram::is_loaded),
    ("glUseProgram", gl::UseProgram::is_loaded),
];

impl PlatformWindow for Window {
    fn framebuffer_size(&self) -> IVec2 {
        self.get_framebuffer_size()
    }

    fn make_current(&self) {
        Window::make_current(self);
    }

    fn is_current(&self) -> bool {
        Window::is_current(self)
    }

    /// With `experimental_loader` off, any missing required entry point is
    /// an error; with it on, missing ones are only reported.
    fn load_extensions(&self, config: &HostConfig) -> Result<(), HostError> {
        gl::load_with(glfw::get_proc_address);

        let missing: Vec<&str> = REQUIRED_ENTRY_POINTS
            .iter()
            .filter(|(_, is_loaded)| !is_loaded())
            .map(|&(name, _)| name)
            .collect();
        if !missing.is_empty() {
            let message = format!("missing entry points: {}", missing.join(", "));
            if !config.experimental_loader {
                return Err(HostError::ExtensionLoader(message));
            }
            log::warn!("{message}");
        }

        if gl::Viewport::is_loaded() {
            unsafe { gl::Viewport(0, 0, config.width, config.height) };
        }
        Ok(())
    }

    fn should_close(&self) -> bool {
        Window::should_close(self)
    }

    fn swap_buffers(&self) {
        Window::swap_buffers(self);
    }

    fn take_gl_error(&self) -> Option<GlError> {
        GlError::try_get()
    }

    fn driver_info(&self) -> Option<DriverInfo> {
        DriverInfo::query()
    }
}
