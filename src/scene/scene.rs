// scene/scene.rs
use glam::{Mat4, Quat, Vec3};
use rand::{rngs::SmallRng, Rng, SeedableRng};

use super::{Camera, Cube, CubeConfig, MeshCache, RenderableModel, Transform};
use crate::asset::{Handle, VertexUploader};
use crate::input::InputState;
use crate::renderer::{FrameContext, ShaderUniforms, Texture};
use crate::settings::RenderSettings;

const PALETTE: [Vec3; 5] = [
    Vec3::new(0.90, 0.30, 0.25),
    Vec3::new(0.25, 0.65, 0.90),
    Vec3::new(0.95, 0.80, 0.30),
    Vec3::new(0.40, 0.80, 0.45),
    Vec3::new(0.75, 0.45, 0.85),
];

const SIZES: [f32; 3] = [0.5, 1.0, 1.5];

/// Half-width of the square area scattered cubes are placed in.
const SCATTER_EXTENT: f32 = 9.0;

/// The demo world: a floor, a few fixed cubes, randomly scattered cubes and the camera.
pub struct Scene {
    camera: Camera,
    cubes: Vec<Cube>,
    mesh_cache: MeshCache,
}

impl Scene {
    pub fn new<U>(
        uploader: &mut U,
        texture: Handle<Texture>,
        settings: &RenderSettings,
        uniforms: &mut ShaderUniforms,
    ) -> Self
    where
        U: VertexUploader + ?Sized,
    {
        let camera = Camera::new(
            Vec3::from_array(settings.camera.start_position),
            &settings.camera,
            settings.aspect_ratio(),
            uniforms,
        );

        let mesh_cache = MeshCache::new();
        let mut cubes = Vec::with_capacity(settings.scene.cube_count + 4);
        let mut add = |config: CubeConfig, transform: Transform| {
            let cube = Cube::new(&mesh_cache, &mut *uploader, config, texture);
            cubes.push(cube.with_transform(transform));
        };

        add(
            CubeConfig::new(Vec3::new(20.0, 0.2, 20.0), Vec3::splat(0.55)),
            Transform::from_translation(Vec3::new(0.0, -0.1, 0.0)),
        );

        let red = Vec3::new(1.0, 0.0, 0.0);
        add(
            CubeConfig::new(Vec3::ONE, red),
            Transform::from_translation(Vec3::new(-1.5, 0.5, 0.0)),
        );
        add(
            CubeConfig::new(Vec3::ONE, red),
            Transform::from_translation(Vec3::new(1.5, 0.5, 0.0)),
        );
        add(
            CubeConfig::new(Vec3::new(2.0, 1.0, 1.0), red),
            Transform::from_translation(Vec3::new(0.0, 0.5, -3.0)),
        );

        let mut rng = SmallRng::seed_from_u64(settings.scene.seed);
        for _ in 0..settings.scene.cube_count {
            let size = SIZES[rng.gen_range(0..SIZES.len())];
            let color = PALETTE[rng.gen_range(0..PALETTE.len())];
            let position = Vec3::new(
                rng.gen_range(-SCATTER_EXTENT..SCATTER_EXTENT),
                rng.gen_range(size * 0.5..4.0),
                rng.gen_range(-SCATTER_EXTENT..SCATTER_EXTENT),
            );
            let yaw = rng.gen_range(0.0..std::f32::consts::TAU);

            add(
                CubeConfig::new(Vec3::splat(size), color),
                Transform::from_translation(position).with_rotation(Quat::from_rotation_y(yaw)),
            );
        }

        log::info!(
            "Scene ready: {} cubes sharing {} meshes",
            cubes.len(),
            mesh_cache.len()
        );

        Self {
            camera,
            cubes,
            mesh_cache,
        }
    }

    pub fn update(&mut self, input: &InputState, dt: f32, uniforms: &mut ShaderUniforms) {
        self.camera.update(input, dt, uniforms);
    }

    pub fn render(&self, ctx: &mut FrameContext) {
        for cube in &self.cubes {
            cube.draw(ctx, Mat4::IDENTITY);
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn cubes(&self) -> &[Cube] {
        &self.cubes
    }

    pub fn mesh_cache(&self) -> &MeshCache {
        &self.mesh_cache
    }
}
