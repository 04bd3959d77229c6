// scene/mod.rs

pub mod camera;
pub mod cube;
pub mod model;
pub mod scene;
pub mod transform;

pub use camera::Camera;
pub use cube::{get_or_build_mesh, Cube, CubeConfig, MeshCache, CUBE_VERTEX_COUNT};
pub use model::RenderableModel;
pub use scene::Scene;
pub use transform::Transform;
