// renderer/frame.rs
use glam::Mat4;

use super::uniforms::ShaderUniforms;
use super::Texture;
use crate::asset::{Handle, VertexArray, VertexBuffer};

/// Resources currently bound for the next draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bindings {
    pub vertex_array: Option<Handle<VertexArray>>,
    pub vertex_buffer: Option<Handle<VertexBuffer>>,
    pub texture: Option<Handle<Texture>>,
}

/// A recorded triangle-list draw, replayed by the GPU backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCall {
    pub vertex_array: Handle<VertexArray>,
    pub vertex_buffer: Handle<VertexBuffer>,
    pub texture: Handle<Texture>,
    pub model: Mat4,
    pub vertex_count: u32,
}

/// Bind state, uniform values and recorded draws of the frame being built.
///
/// Bindings and uniforms persist across frames the same way they would on a
/// stateful graphics context; only the draw list is reset by [`FrameContext::begin_frame`].
#[derive(Debug, Default)]
pub struct FrameContext {
    bindings: Bindings,
    uniforms: ShaderUniforms,
    draws: Vec<DrawCall>,
}

impl FrameContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_frame(&mut self) {
        self.draws.clear();
    }

    pub fn bind_vertex_array(&mut self, handle: Handle<VertexArray>) {
        self.bindings.vertex_array = Some(handle);
    }

    pub fn bind_vertex_buffer(&mut self, handle: Handle<VertexBuffer>) {
        self.bindings.vertex_buffer = Some(handle);
    }

    pub fn bind_texture(&mut self, handle: Handle<Texture>) {
        self.bindings.texture = Some(handle);
    }

    pub fn bindings(&self) -> Bindings {
        self.bindings
    }

    pub fn uniforms(&self) -> &ShaderUniforms {
        &self.uniforms
    }

    pub fn uniforms_mut(&mut self) -> &mut ShaderUniforms {
        &mut self.uniforms
    }

    /// Record a draw of `vertex_count` vertices with the current bindings and model uniform.
    pub fn draw_arrays(&mut self, vertex_count: u32) {
        let Bindings {
            vertex_array: Some(vertex_array),
            vertex_buffer: Some(vertex_buffer),
            texture: Some(texture),
        } = self.bindings
        else {
            log::warn!("draw skipped, incomplete bindings: {:?}", self.bindings);
            return;
        };

        self.draws.push(DrawCall {
            vertex_array,
            vertex_buffer,
            texture,
            model: self.uniforms.model,
            vertex_count,
        });
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::UniformSlot;

    fn bind_all(ctx: &mut FrameContext) {
        ctx.bind_vertex_array(Handle::new(0));
        ctx.bind_vertex_buffer(Handle::new(1));
        ctx.bind_texture(Handle::new(2));
    }

    #[test]
    fn draw_without_bindings_is_skipped() {
        let mut ctx = FrameContext::new();
        ctx.bind_vertex_buffer(Handle::new(1));
        ctx.draw_arrays(36);
        assert!(ctx.draws().is_empty());
    }

    #[test]
    fn draw_snapshots_bindings_and_model() {
        let mut ctx = FrameContext::new();
        bind_all(&mut ctx);
        let model = Mat4::from_translation(glam::Vec3::X);
        ctx.uniforms_mut().set_mat4(UniformSlot::Model, model);
        ctx.draw_arrays(36);

        ctx.uniforms_mut().set_mat4(UniformSlot::Model, Mat4::IDENTITY);
        let call = ctx.draws()[0];
        assert_eq!(call.model, model);
        assert_eq!(call.vertex_buffer, Handle::new(1));
        assert_eq!(call.vertex_count, 36);
    }

    #[test]
    fn begin_frame_keeps_bind_state() {
        let mut ctx = FrameContext::new();
        bind_all(&mut ctx);
        ctx.draw_arrays(3);
        ctx.begin_frame();
        assert!(ctx.draws().is_empty());
        assert_eq!(ctx.bindings().texture, Some(Handle::new(2)));
    }
}
