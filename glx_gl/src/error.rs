use std::path::PathBuf;

use thiserror::Error;

use crate::shader::ShaderStage;
use crate::transmutable_u32;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlError {
    InvalidEnum = gl::INVALID_ENUM,
    InvalidValue = gl::INVALID_VALUE,
    InvalidOperation = gl::INVALID_OPERATION,
    InvalidFramebufferOperation = gl::INVALID_FRAMEBUFFER_OPERATION,
    OutOfMemory = gl::OUT_OF_MEMORY,
    StackUnderflow = gl::STACK_UNDERFLOW,
    StackOverflow = gl::STACK_OVERFLOW,
}
transmutable_u32!(GlError);

impl GlError {
    pub fn from_num(err_num: u32) -> Option<Self> {
        Some(match err_num {
            gl::NO_ERROR => return None,
            gl::INVALID_ENUM => GlError::InvalidEnum,
            gl::INVALID_VALUE => GlError::InvalidValue,
            gl::INVALID_OPERATION => GlError::InvalidOperation,
            gl::INVALID_FRAMEBUFFER_OPERATION => GlError::InvalidFramebufferOperation,
            gl::OUT_OF_MEMORY => GlError::OutOfMemory,
            gl::STACK_UNDERFLOW => GlError::StackUnderflow,
            gl::STACK_OVERFLOW => GlError::StackOverflow,
            other => {
                log::warn!("unrecognized GL error code {other:#x}");
                return None;
            }
        })
    }

    /// Pops the oldest pending driver error.
    ///
    /// Requires loaded entry points; returns `None` otherwise.
    pub fn try_get() -> Option<Self> {
        if !gl::GetError::is_loaded() {
            return None;
        }
        Self::from_num(unsafe { gl::GetError() })
    }
}

/// Failures of the shader program lifecycle.
///
/// `Link` and `Validate` are the two build failures; everything else is
/// reported before the driver is asked to link.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    #[error("could not read shader source {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
    #[error("{0} shader source is empty")]
    EmptySource(ShaderStage),
    #[error("{stage} shader compilation failed\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("program link failed\n{0}")]
    Link(String),
    #[error("program validation failed\n{0}")]
    Validate(String),
    #[error("build refused, previous error is unresolved: {0}")]
    StaleError(Box<ShaderError>),
    #[error("program is not built")]
    NotReady,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("glfw failed to initialize")]
    GlfwInit,
    #[error("invalid host config: {0}")]
    Config(String),
    #[error("window title contains a nul byte")]
    InvalidTitle,
    #[error("window creation failed: {0}")]
    WindowCreation(String),
    #[error("extension loader failed: {0}")]
    ExtensionLoader(String),
}
