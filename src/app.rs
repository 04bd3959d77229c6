// app.rs
use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::*,
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::input::InputState;
use crate::renderer::{FrameContext, Gpu, GpuError};
use crate::scene::Scene;
use crate::settings::RenderSettings;

pub struct App {
    settings: RenderSettings,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    scene: Option<Scene>,
    frame: FrameContext,
    input: InputState,
    last_frame: Instant,
}

impl App {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            window: None,
            gpu: None,
            scene: None,
            frame: FrameContext::new(),
            input: InputState::new(),
            last_frame: Instant::now(),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), GpuError> {
        let attributes = Window::default_attributes()
            .with_title(self.settings.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.settings.window.width,
                self.settings.window.height,
            ));
        let window = Arc::new(event_loop.create_window(attributes)?);
        capture_cursor(&window);

        let mut gpu = pollster::block_on(Gpu::new(Arc::clone(&window), &self.settings))?;

        let texture = match &self.settings.scene.texture_path {
            Some(path) => gpu.load_texture(path).unwrap_or_else(|err| {
                log::error!("{err}. Using the default texture.");
                gpu.default_texture()
            }),
            None => gpu.default_texture(),
        };

        let scene = Scene::new(&mut gpu, texture, &self.settings, self.frame.uniforms_mut());

        window.request_redraw();
        self.window = Some(window);
        self.gpu = Some(gpu);
        self.scene = Some(scene);
        self.last_frame = Instant::now();
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gpu), Some(scene)) = (self.gpu.as_mut(), self.scene.as_mut()) else {
            return;
        };

        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.frame.begin_frame();
        scene.update(&self.input, dt, self.frame.uniforms_mut());
        scene.render(&mut self.frame);

        match gpu.render(&self.frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Surface out of memory, shutting down");
                event_loop.exit();
            }
            Err(err) => log::warn!("Dropped frame: {err}"),
        }

        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }
}

/// Hide and lock the cursor so mouse motion arrives as relative deltas.
fn capture_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(err) = grabbed {
        log::warn!("Could not capture the cursor: {err}");
    }
    window.set_cursor_visible(false);
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init(event_loop) {
            eprintln!("Failed to initialize: {err}");
            std::process::exit(1);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(|w| w.id()) != Some(id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(size);
                }
            }
            WindowEvent::Focused(false) => {
                self.input.release_all();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                self.input.handle_key(code, state.is_pressed());
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.input.add_mouse_motion(dx, dy);
        }
    }
}
