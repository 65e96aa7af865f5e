use std::num::NonZeroU32;

use gl::types::*;

use crate::glfw;
use crate::shader::ShaderStage;

/// The part of the graphics driver a [`ShaderProgram`](crate::ShaderProgram)
/// talks to.
///
/// Every call is synchronous and may block inside the driver. Methods other
/// than [`has_context`](ShaderDriver::has_context) require a current context.
pub trait ShaderDriver {
    /// Whether a context is current and its entry points are loaded.
    fn has_context(&self) -> bool;

    fn create_shader(&self, stage: ShaderStage) -> Option<NonZeroU32>;
    /// Uploads `source` and compiles it. `Err` carries the compiler log.
    fn compile_shader(&self, shader: NonZeroU32, source: &str) -> Result<(), String>;
    fn delete_shader(&self, shader: NonZeroU32);

    fn create_program(&self) -> Option<NonZeroU32>;
    fn attach_shader(&self, program: NonZeroU32, shader: NonZeroU32);
    /// `Err` carries the program info log.
    fn link_program(&self, program: NonZeroU32) -> Result<(), String>;
    /// `Err` carries the program info log.
    fn validate_program(&self, program: NonZeroU32) -> Result<(), String>;
    fn delete_program(&self, program: NonZeroU32);
    fn use_program(&self, program: NonZeroU32);
}

/// [`ShaderDriver`] backed by the process-wide `gl` entry points.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlDriver;

impl GlDriver {
    fn shader_info_log(shader: GLuint) -> String {
        let mut log_size = 0;
        unsafe { gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut log_size) };

        let mut info_log: Vec<u8> = Vec::with_capacity(log_size.max(0) as usize);
        let mut bytes_written = 0;
        unsafe {
            gl::GetShaderInfoLog(
                shader,
                log_size,
                &mut bytes_written,
                info_log.as_mut_ptr().cast(),
            );
            info_log.set_len(bytes_written.max(0) as usize);
        }
        String::from_utf8_lossy(&info_log).into_owned()
    }

    fn program_info_log(program: GLuint) -> String {
        let mut log_size = 0;
        unsafe { gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut log_size) };

        let mut info_log: Vec<u8> = Vec::with_capacity(log_size.max(0) as usize);
        let mut bytes_written = 0;
        unsafe {
            gl::GetProgramInfoLog(
                program,
                log_size,
                &mut bytes_written,
                info_log.as_mut_ptr().cast(),
            );
            info_log.set_len(bytes_written.max(0) as usize);
        }
        String::from_utf8_lossy(&info_log).into_owned()
    }

    fn program_status(program: GLuint, status: GLenum) -> Result<(), String> {
        let mut success: GLint = 0;
        unsafe { gl::GetProgramiv(program, status, &mut success) };
        if success == GLint::from(gl::FALSE) {
            Err(Self::program_info_log(program))
        } else {
            Ok(())
        }
    }
}

impl ShaderDriver for GlDriver {
    fn has_context(&self) -> bool {
        glfw::has_current_context() && gl::CreateShader::is_loaded()
    }

    fn create_shader(&self, stage: ShaderStage) -> Option<NonZeroU32> {
        NonZeroU32::new(unsafe { gl::CreateShader(stage.to_u32()) })
    }

    fn compile_shader(&self, shader: NonZeroU32, source: &str) -> Result<(), String> {
        let handle = shader.get();
        let length = source.len() as GLint;
        let source = source.as_ptr().cast::<GLchar>();
        unsafe {
            gl::ShaderSource(handle, 1, &source, &length);
            gl::CompileShader(handle);
        }

        let mut success: GLint = 0;
        unsafe { gl::GetShaderiv(handle, gl::COMPILE_STATUS, &mut success) };
        if success == GLint::from(gl::FALSE) {
            Err(Self::shader_info_log(handle))
        } else {
            Ok(())
        }
    }

    fn delete_shader(&self, shader: NonZeroU32) {
        unsafe { gl::DeleteShader(shader.get()) }
    }

    fn create_program(&self) -> Option<NonZeroU32> {
        NonZeroU32::new(unsafe { gl::CreateProgram() })
    }

    fn attach_shader(&self, program: NonZeroU32, shader: NonZeroU32) {
        unsafe { gl::AttachShader(program.get(), shader.get()) }
    }

    fn link_program(&self, program: NonZeroU32) -> Result<(), String> {
        unsafe { gl::LinkProgram(program.get()) };
        Self::program_status(program.get(), gl::LINK_STATUS)
    }

    fn validate_program(&self, program: NonZeroU32) -> Result<(), String> {
        unsafe { gl::ValidateProgram(program.get()) };
        Self::program_status(program.get(), gl::VALIDATE_STATUS)
    }

    fn delete_program(&self, program: NonZeroU32) {
        unsafe { gl::DeleteProgram(program.get()) }
    }

    fn use_program(&self, program: NonZeroU32) {
        unsafe { gl::UseProgram(program.get()) }
    }
}
