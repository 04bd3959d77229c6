use glam::Mat4;

use crate::asset::{Handle, VertexArray, VertexBuffer};
use crate::renderer::{FrameContext, Texture, UniformSlot};

/// Something with uploaded vertices and a transform that can draw itself.
pub trait RenderableModel {
    fn vertex_array(&self) -> Handle<VertexArray>;
    fn vertex_buffer(&self) -> Handle<VertexBuffer>;
    fn vertex_count(&self) -> u32;
    fn texture(&self) -> Handle<Texture>;
    fn local_transform(&self) -> Mat4;

    /// Bind this model's resources, set its model matrix and record a triangle-list draw.
    ///
    /// Leaves the model's resources bound in `ctx`.
    fn draw(&self, ctx: &mut FrameContext, parent: Mat4) {
        ctx.bind_vertex_array(self.vertex_array());
        ctx.bind_vertex_buffer(self.vertex_buffer());
        ctx.bind_texture(self.texture());

        let mvp = parent * self.local_transform();
        ctx.uniforms_mut().set_mat4(UniformSlot::Model, mvp);

        ctx.draw_arrays(self.vertex_count());
    }
}
