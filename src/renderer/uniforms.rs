// renderer/uniforms.rs
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

pub const UNIFORM_PROJECTION_MATRIX_NAME: &str = "projection";
pub const UNIFORM_VIEW_MATRIX_NAME: &str = "view";
pub const UNIFORM_CAMERA_POSITION_NAME: &str = "camera_position";
pub const UNIFORM_MODEL_MATRIX_NAME: &str = "model";

/// Uniform locations exposed by the cube shader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniformSlot {
    Projection,
    View,
    CameraPosition,
    Model,
}

impl UniformSlot {
    pub const ALL: [UniformSlot; 4] = [
        UniformSlot::Projection,
        UniformSlot::View,
        UniformSlot::CameraPosition,
        UniformSlot::Model,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UniformSlot::Projection => UNIFORM_PROJECTION_MATRIX_NAME,
            UniformSlot::View => UNIFORM_VIEW_MATRIX_NAME,
            UniformSlot::CameraPosition => UNIFORM_CAMERA_POSITION_NAME,
            UniformSlot::Model => UNIFORM_MODEL_MATRIX_NAME,
        }
    }
}

/// Current uniform values of the active shader program.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShaderUniforms {
    pub projection: Mat4,
    pub view: Mat4,
    pub camera_position: Vec3,
    pub model: Mat4,
}

impl ShaderUniforms {
    pub fn new() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            model: Mat4::IDENTITY,
        }
    }

    pub fn set_mat4(&mut self, slot: UniformSlot, value: Mat4) {
        match slot {
            UniformSlot::Projection => self.projection = value,
            UniformSlot::View => self.view = value,
            UniformSlot::Model => self.model = value,
            UniformSlot::CameraPosition => {
                log::warn!("uniform `{}` is a vec3, ignoring mat4 write", slot.name());
            }
        }
    }

    pub fn set_vec3(&mut self, slot: UniformSlot, value: Vec3) {
        match slot {
            UniformSlot::CameraPosition => self.camera_position = value,
            _ => log::warn!("uniform `{}` is a mat4, ignoring vec3 write", slot.name()),
        }
    }

    pub fn camera(&self) -> CameraUniform {
        CameraUniform {
            projection: self.projection.to_cols_array_2d(),
            view: self.view.to_cols_array_2d(),
            camera_position: self.camera_position.to_array(),
            _padding: 0.0,
        }
    }
}

impl Default for ShaderUniforms {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU layout of the camera uniform block (group 0).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug)]
pub struct CameraUniform {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub _padding: f32,
}

/// Per-draw entry of the objects storage buffer (group 1).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug)]
pub struct ObjectData {
    pub model: [[f32; 4]; 4],
}

impl From<Mat4> for ObjectData {
    fn from(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
        }
    }
}
