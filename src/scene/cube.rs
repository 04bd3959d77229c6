use std::hash::{Hash, Hasher};

use glam::{Mat4, Vec2, Vec3};

use super::{RenderableModel, Transform};
use crate::asset::{GeometryCache, Handle, ModelData, VertexArray, VertexBuffer, VertexUploader};
use crate::renderer::vertex::v;
use crate::renderer::{Texture, Vertex};

/// Every cube mesh has the same topology: 6 faces of 2 triangles.
pub const CUBE_VERTEX_COUNT: usize = 36;

/// Cache of uploaded cube meshes, one entry per distinct configuration.
pub type MeshCache = GeometryCache<CubeConfig, ModelData>;

/// Dimensions and color identifying one cube mesh variant.
///
/// Equality is component-wise; `-0.0` and `0.0` are the same key.
#[derive(Clone, Copy, Debug)]
pub struct CubeConfig {
    scale: Vec3,
    color: Vec3,
}

impl CubeConfig {
    pub fn new(scale: Vec3, color: Vec3) -> Self {
        Self { scale, color }
    }

    fn key_bits(&self) -> [u32; 6] {
        // Adding 0.0 turns -0.0 into 0.0 and leaves every other value unchanged.
        let bits = |x: f32| (x + 0.0).to_bits();
        [
            bits(self.scale.x),
            bits(self.scale.y),
            bits(self.scale.z),
            bits(self.color.x),
            bits(self.color.y),
            bits(self.color.z),
        ]
    }
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self::new(Vec3::ONE, Vec3::ONE)
    }
}

impl PartialEq for CubeConfig {
    fn eq(&self, other: &Self) -> bool {
        self.key_bits() == other.key_bits()
    }
}

impl Eq for CubeConfig {}

impl Hash for CubeConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_bits().hash(state);
    }
}

/// Triangle list for a cube of the given configuration, centered on the origin.
pub fn cube_vertices(config: &CubeConfig) -> Vec<Vertex> {
    let Vec3 {
        x: sx,
        y: sy,
        z: sz,
    } = config.scale;
    let p = Vec3::new;
    let uv = Vec2::new;

    let front = Vec3::Z;
    let top = Vec3::Y;
    let right = Vec3::X;

    let mut vertices = vec![
        // Front
        v(p(-1.0, -1.0, 1.0), uv(0.0, 0.0), front),
        v(p(1.0, -1.0, 1.0), uv(sx, 0.0), front),
        v(p(1.0, 1.0, 1.0), uv(sx, sy), front),
        v(p(-1.0, -1.0, 1.0), uv(0.0, 0.0), front),
        v(p(1.0, 1.0, 1.0), uv(sx, sy), front),
        v(p(-1.0, 1.0, 1.0), uv(0.0, sy), front),
        // Top
        v(p(-1.0, 1.0, 1.0), uv(0.0, 0.0), top),
        v(p(1.0, 1.0, 1.0), uv(sx, 0.0), top),
        v(p(1.0, 1.0, -1.0), uv(sx, sz), top),
        v(p(-1.0, 1.0, 1.0), uv(0.0, 0.0), top),
        v(p(1.0, 1.0, -1.0), uv(sx, sz), top),
        v(p(-1.0, 1.0, -1.0), uv(0.0, sz), top),
        // Right
        v(p(1.0, -1.0, 1.0), uv(0.0, 0.0), right),
        v(p(1.0, -1.0, -1.0), uv(sz, 0.0), right),
        v(p(1.0, 1.0, -1.0), uv(sz, sy), right),
        v(p(1.0, -1.0, 1.0), uv(0.0, 0.0), right),
        v(p(1.0, 1.0, -1.0), uv(sz, sy), right),
        v(p(1.0, 1.0, 1.0), uv(0.0, sy), right),
    ];

    for vertex in &mut vertices {
        for c in &mut vertex.position {
            *c *= 0.5;
        }
    }

    let mirrored: Vec<Vertex> = vertices.iter().map(mirror).collect();
    vertices.extend(mirrored);

    let color = config.color.to_array();
    for vertex in &mut vertices {
        vertex.position = (vertex.position() * config.scale).to_array();
        vertex.color = color;
    }

    vertices
}

/// Opposite face of a visible vertex: a half turn about Y for X/Z faces, about X for the Y face.
fn mirror(vertex: &Vertex) -> Vertex {
    let mut copy = *vertex;
    let normal = -vertex.normal();
    let mut position = vertex.position();

    if normal.z != 0.0 || normal.x != 0.0 {
        position.x = -position.x;
        position.z = -position.z;
    } else if normal.y != 0.0 {
        position.y = -position.y;
        position.z = -position.z;
    }

    copy.normal = normal.to_array();
    copy.position = position.to_array();
    copy
}

/// Cached handles for `config`, generating and uploading the mesh on first request.
pub fn get_or_build_mesh<U>(cache: &MeshCache, uploader: &mut U, config: CubeConfig) -> ModelData
where
    U: VertexUploader + ?Sized,
{
    cache.get_or_insert_with(config, |config| {
        log::debug!(
            "Building cube mesh: scale {:?}, color {:?}",
            config.scale,
            config.color
        );
        uploader.upload_vertices("Cube.VertexBuffer", &cube_vertices(config))
    })
}

pub struct Cube {
    model: ModelData,
    texture: Handle<Texture>,
    pub transform: Transform,
}

impl Cube {
    pub fn new<U>(
        cache: &MeshCache,
        uploader: &mut U,
        config: CubeConfig,
        texture: Handle<Texture>,
    ) -> Self
    where
        U: VertexUploader + ?Sized,
    {
        let model = get_or_build_mesh(cache, uploader, config);
        Self {
            model,
            texture,
            transform: Transform::default(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn model_data(&self) -> ModelData {
        self.model
    }
}

impl RenderableModel for Cube {
    fn vertex_array(&self) -> Handle<VertexArray> {
        self.model.vertex_array
    }

    fn vertex_buffer(&self) -> Handle<VertexBuffer> {
        self.model.vertex_buffer
    }

    fn vertex_count(&self) -> u32 {
        CUBE_VERTEX_COUNT as u32
    }

    fn texture(&self) -> Handle<Texture> {
        self.texture
    }

    fn local_transform(&self) -> Mat4 {
        self.transform.matrix()
    }
}
