use glam::{DVec2, Mat4, Vec3};

use crate::input::{InputState, MoveKey};
use crate::renderer::{ShaderUniforms, UniformSlot};
use crate::settings::CameraSettings;

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;
pub const MAX_PITCH_DEGREES: f32 = 89.0;

/// Horizontal angle 0 looks down +X; 270 looks down -Z.
pub const DEFAULT_HORIZONTAL_ANGLE: f32 = 270.0;

/// Free-fly camera steered by the mouse and moved by the six movement keys.
///
/// Angles are in degrees. The pitch (`vertical_angle`) stays within
/// `[-MAX_PITCH_DEGREES, MAX_PITCH_DEGREES]` and the yaw within `(-360, 360)`.
#[derive(Clone, Debug)]
pub struct Camera {
    position: Vec3,
    look: Vec3,
    up: Vec3,
    fov_degrees: f32,
    aspect: f32,
    horizontal_angle: f32,
    vertical_angle: f32,
    speed: f32,
    mouse_sensitivity: f32,
    last_cursor: DVec2,
}

impl Camera {
    /// Build the camera and publish its matrices once.
    pub fn new(
        position: Vec3,
        settings: &CameraSettings,
        aspect: f32,
        uniforms: &mut ShaderUniforms,
    ) -> Self {
        let camera = Self {
            position,
            look: look_direction(DEFAULT_HORIZONTAL_ANGLE, 0.0),
            up: Vec3::Y,
            fov_degrees: settings.fov_degrees,
            aspect,
            horizontal_angle: DEFAULT_HORIZONTAL_ANGLE,
            vertical_angle: 0.0,
            speed: settings.speed,
            mouse_sensitivity: settings.mouse_sensitivity,
            last_cursor: DVec2::ZERO,
        };
        camera.publish(uniforms);
        camera
    }

    pub fn update(&mut self, input: &InputState, dt: f32, uniforms: &mut ShaderUniforms) {
        let cursor = input.cursor();
        let dx = (cursor.x - self.last_cursor.x) as f32;
        let dy = (self.last_cursor.y - cursor.y) as f32; // screen y grows downward
        if cursor.is_finite() {
            self.last_cursor = cursor;
        }

        let yaw = dx * dt * self.mouse_sensitivity;
        if yaw.is_finite() {
            self.horizontal_angle = wrap_degrees(self.horizontal_angle + yaw);
        }
        let pitch = dy * dt * self.mouse_sensitivity;
        if pitch.is_finite() {
            self.vertical_angle =
                (self.vertical_angle + pitch).clamp(-MAX_PITCH_DEGREES, MAX_PITCH_DEGREES);
        }

        self.look = look_direction(self.horizontal_angle, self.vertical_angle);

        let side = self.look.cross(self.up).normalize();
        let forward = Vec3::new(self.look.x, 0.0, self.look.z).normalize();
        let step = self.speed * dt;

        if step.is_finite() {
            for key in MoveKey::ALL {
                if !input.is_pressed(key) {
                    continue;
                }
                self.position += match key {
                    MoveKey::StrafeLeft => -side * step,
                    MoveKey::StrafeRight => side * step,
                    MoveKey::Forward => forward * step,
                    MoveKey::Back => -forward * step,
                    MoveKey::Up => self.up * step,
                    MoveKey::Down => -self.up * step,
                };
            }
        }

        self.publish(uniforms);
    }

    /// Push projection, view and position to the shader uniforms.
    pub fn publish(&self, uniforms: &mut ShaderUniforms) {
        uniforms.set_mat4(UniformSlot::Projection, self.projection());
        uniforms.set_mat4(UniformSlot::View, self.view());
        uniforms.set_vec3(UniformSlot::CameraPosition, self.position);
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            NEAR_PLANE,
            FAR_PLANE,
        )
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.look, self.up)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn look(&self) -> Vec3 {
        self.look
    }

    pub fn horizontal_angle(&self) -> f32 {
        self.horizontal_angle
    }

    pub fn vertical_angle(&self) -> f32 {
        self.vertical_angle
    }
}

/// Unit look vector for yaw `horizontal` and pitch `vertical`, both in degrees.
pub fn look_direction(horizontal: f32, vertical: f32) -> Vec3 {
    let theta = horizontal.to_radians();
    let phi = vertical.to_radians();
    Vec3::new(theta.cos() * phi.cos(), phi.sin(), theta.sin() * phi.cos())
}

/// Remainder keeps the sign of the angle, so the result lies in (-360, 360).
fn wrap_degrees(angle: f32) -> f32 {
    angle % 360.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(position: Vec3, uniforms: &mut ShaderUniforms) -> Camera {
        Camera::new(position, &CameraSettings::default(), 16.0 / 9.0, uniforms)
    }

    #[test]
    fn construction_publishes_uniforms() {
        let mut uniforms = ShaderUniforms::new();
        let cam = camera_at(Vec3::new(1.0, 2.0, 3.0), &mut uniforms);
        assert_eq!(uniforms.camera_position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(uniforms.view, cam.view());
        assert_eq!(uniforms.projection, cam.projection());
    }

    #[test]
    fn default_look_is_negative_z() {
        let mut uniforms = ShaderUniforms::new();
        let cam = camera_at(Vec3::ZERO, &mut uniforms);
        assert!(cam.look().abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut uniforms = ShaderUniforms::new();
        let mut cam = camera_at(Vec3::ZERO, &mut uniforms);
        let mut input = InputState::new();

        input.add_mouse_motion(0.0, -1.0e6);
        cam.update(&input, 0.016, &mut uniforms);
        assert_eq!(cam.vertical_angle(), MAX_PITCH_DEGREES);

        input.add_mouse_motion(0.0, 4.0e6);
        cam.update(&input, 0.016, &mut uniforms);
        assert_eq!(cam.vertical_angle(), -MAX_PITCH_DEGREES);
    }

    #[test]
    fn yaw_wraps() {
        let mut uniforms = ShaderUniforms::new();
        let mut cam = camera_at(Vec3::ZERO, &mut uniforms);
        let mut input = InputState::new();

        for step in [123.0, 9_000.0, -50_000.0, 7.5] {
            input.add_mouse_motion(step, 0.0);
            cam.update(&input, 0.1, &mut uniforms);
            let angle = cam.horizontal_angle();
            assert!(angle > -360.0 && angle < 360.0, "{angle}");
        }
    }

    #[test]
    fn publish_matches_projection_planes() {
        let mut uniforms = ShaderUniforms::new();
        let cam = camera_at(Vec3::ZERO, &mut uniforms);
        let near = cam.projection().project_point3(Vec3::new(0.0, 0.0, -NEAR_PLANE));
        let far = cam.projection().project_point3(Vec3::new(0.0, 0.0, -FAR_PLANE));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn vertical_movement_ignores_look() {
        let mut uniforms = ShaderUniforms::new();
        let mut cam = camera_at(Vec3::ZERO, &mut uniforms);
        let mut input = InputState::new();
        input.add_mouse_motion(0.0, -300.0);
        input.set_pressed(MoveKey::Up, true);

        cam.update(&input, 0.5, &mut uniforms);
        let speed = CameraSettings::default().speed;
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, speed * 0.5, 0.0), 1e-5));
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let mut uniforms = ShaderUniforms::new();
        let mut cam = camera_at(Vec3::ZERO, &mut uniforms);
        let mut input = InputState::new();
        input.add_mouse_motion(f64::NAN, f64::INFINITY);
        cam.update(&input, 0.016, &mut uniforms);
        assert_eq!(cam.horizontal_angle(), DEFAULT_HORIZONTAL_ANGLE);
        assert_eq!(cam.vertical_angle(), 0.0);

        for _ in 0..10 {
            input.add_mouse_motion(50.0, 0.0);
            cam.update(&input, 0.016, &mut uniforms);
        }
        assert!(cam.horizontal_angle() > DEFAULT_HORIZONTAL_ANGLE);
        assert_eq!(cam.vertical_angle(), 0.0);
    }
}
