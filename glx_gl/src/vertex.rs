use crate::has_handle;
use gl::types::*;

/// A vertex array with no attributes, enough to issue draws whose vertices
/// come from `gl_VertexID` under a core profile.
pub struct VertexArrayObject {
    handle: GLuint,
}
has_handle!(VertexArrayObject);

impl VertexArrayObject {
    /// Requires a current context.
    pub fn new() -> Option<Self> {
        let mut handle = 0;
        unsafe { gl::GenVertexArrays(1, &mut handle) };
        (handle != 0).then_some(Self { handle })
    }

    pub fn use_self(&self) {
        unsafe {
            gl::BindVertexArray(self.handle);
        }
    }

    pub fn draw_triangles(&self, vertex_count: i32) {
        self.use_self();
        unsafe { gl::DrawArrays(gl::TRIANGLES, 0, vertex_count) };
    }

    /// Deletes the array. Must run while its context is still current.
    pub fn delete(self) {
        unsafe { gl::DeleteVertexArrays(1, &self.handle) };
    }
}
