pub mod driver;
mod error;
pub mod glfw;
pub mod host;
pub mod info;
pub mod shader;
pub mod vertex;

#[cfg(test)]
mod testing;

pub use driver::{GlDriver, ShaderDriver};
pub use error::{GlError, HostError, ShaderError};
pub use host::{HostConfig, HostHandle, Ratio, RenderHost, Task, TaskResult};
pub use shader::{Compiled, ShaderProgram, ShaderStage};

pub use gl;

/// Version reported by [`RenderHost::log_info`].
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[macro_export]
macro_rules! transmutable_u32 {
    ($name: ident) => {
        impl $name {
            pub const fn to_u32(self) -> u32 {
                unsafe { std::mem::transmute(self) }
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> Self {
                value.to_u32()
            }
        }
    };
}
#[macro_export]
macro_rules! has_handle {
    ($name: ident) => {
        impl $name {
            pub fn as_handle(&self) -> GLuint {
                self.handle
            }
        }
    };
}
