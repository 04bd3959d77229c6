pub mod cache;
pub mod handle;
pub mod mesh;

pub use cache::{AssetCache, GeometryCache};
pub use handle::Handle;
pub use mesh::{ModelData, VertexArray, VertexBuffer, VertexUploader};

use crate::renderer::Texture;

/// Backend resource tables. Entries live until the process exits.
pub struct Assets {
    pub vertex_arrays: AssetCache<VertexArray>,
    pub vertex_buffers: AssetCache<VertexBuffer>,
    pub textures: AssetCache<Texture>,
}

impl Assets {
    pub fn new() -> Self {
        Self {
            vertex_arrays: AssetCache::new(),
            vertex_buffers: AssetCache::new(),
            textures: AssetCache::new(),
        }
    }
}

impl Default for Assets {
    fn default() -> Self {
        Self::new()
    }
}
