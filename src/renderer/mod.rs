pub mod depth;
pub mod error;
pub mod frame;
pub mod gpu;
pub mod shader;
pub mod texture;
pub mod uniforms;
pub mod vertex;

pub use error::{GpuError, TextureError};
pub use frame::{Bindings, DrawCall, FrameContext};
pub use gpu::Gpu;
pub use texture::Texture;
pub use uniforms::{ShaderUniforms, UniformSlot};
pub use vertex::Vertex;
