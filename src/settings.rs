use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file {0:?} not found")]
    Missing(PathBuf),
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub present_mode: PresentModeSetting,
    #[serde(default = "RenderSettings::default_sample_count")]
    pub sample_count: u32,
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub scene: SceneSettings,
    #[serde(default)]
    pub shader_path: Option<PathBuf>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            present_mode: PresentModeSetting::default(),
            sample_count: Self::default_sample_count(),
            camera: CameraSettings::default(),
            scene: SceneSettings::default(),
            shader_path: None,
        }
    }
}

impl RenderSettings {
    pub fn load() -> Self {
        Self::load_from_path("settings.json")
    }

    /// Reads settings from `path`, falling back to defaults when the file is
    /// missing or malformed.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::read(path) {
            Ok(settings) => {
                info!("Loaded render settings from {}", path.display());
                settings.validate()
            }
            Err(SettingsError::Missing(_)) => {
                info!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                warn!("{err}; using default render settings");
                Self::default()
            }
        }
    }

    pub fn read(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                SettingsError::Missing(path.to_path_buf())
            } else {
                SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn validate(mut self) -> Self {
        // 1 and 4 are the only sample counts every adapter supports.
        if !matches!(self.sample_count, 1 | 4) {
            warn!(
                "Sample count {} is not supported. Using {} instead.",
                self.sample_count,
                Self::default_sample_count()
            );
            self.sample_count = Self::default_sample_count();
        }

        if self.window.width == 0 || self.window.height == 0 {
            warn!("Window size must be greater than zero. Using default size.");
            let title = std::mem::take(&mut self.window.title);
            self.window = WindowSettings {
                title,
                ..WindowSettings::default()
            };
        }

        let defaults = CameraSettings::default();
        if !(1.0..180.0).contains(&self.camera.fov_degrees) {
            warn!("Field of view must be between 1 and 180 degrees. Using default.");
            self.camera.fov_degrees = defaults.fov_degrees;
        }
        if !(self.camera.speed.is_finite() && self.camera.speed > 0.0) {
            warn!("Camera speed must be positive. Using default.");
            self.camera.speed = defaults.speed;
        }
        if !(self.camera.mouse_sensitivity.is_finite() && self.camera.mouse_sensitivity >= 0.0) {
            warn!("Mouse sensitivity must not be negative. Using default.");
            self.camera.mouse_sensitivity = defaults.mouse_sensitivity;
        }

        self
    }

    /// Fixed projection aspect ratio, taken from the configured window size.
    pub fn aspect_ratio(&self) -> f32 {
        self.window.width as f32 / self.window.height.max(1) as f32
    }

    pub fn present_mode(&self, available: &[wgpu::PresentMode]) -> wgpu::PresentMode {
        let desired = self.present_mode.to_wgpu();
        if available.contains(&desired) {
            return desired;
        }

        warn!(
            "Requested present mode {:?} is not supported. Falling back to FIFO.",
            desired
        );

        if available.contains(&wgpu::PresentMode::Fifo) {
            wgpu::PresentMode::Fifo
        } else {
            available
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo)
        }
    }

    const fn default_sample_count() -> u32 {
        4
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "cube-fly".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    /// World units per second.
    pub speed: f32,
    /// Degrees per cursor unit per second.
    pub mouse_sensitivity: f32,
    pub start_position: [f32; 3],
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            speed: 5.0,
            mouse_sensitivity: 10.0,
            start_position: [0.0, 1.5, 6.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub cube_count: usize,
    pub seed: u64,
    pub texture_path: Option<PathBuf>,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            cube_count: 40,
            seed: 8,
            texture_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentModeSetting {
    #[default]
    Fifo,
    FifoRelaxed,
    Immediate,
    Mailbox,
    AutoVsync,
    AutoNoVsync,
}

impl PresentModeSetting {
    fn to_wgpu(&self) -> wgpu::PresentMode {
        match self {
            PresentModeSetting::Fifo => wgpu::PresentMode::Fifo,
            PresentModeSetting::FifoRelaxed => wgpu::PresentMode::FifoRelaxed,
            PresentModeSetting::Immediate => wgpu::PresentMode::Immediate,
            PresentModeSetting::Mailbox => wgpu::PresentMode::Mailbox,
            PresentModeSetting::AutoVsync => wgpu::PresentMode::AutoVsync,
            PresentModeSetting::AutoNoVsync => wgpu::PresentMode::AutoNoVsync,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_settings() -> RenderSettings {
        RenderSettings {
            sample_count: 3,
            window: WindowSettings {
                width: 0,
                height: 0,
                title: "kept".to_string(),
            },
            camera: CameraSettings {
                fov_degrees: 0.0,
                speed: -1.0,
                mouse_sensitivity: f32::NAN,
                start_position: [1.0, 2.0, 3.0],
            },
            ..RenderSettings::default()
        }
    }

    #[test]
    fn validate_replaces_invalid_values_with_defaults() {
        let validated = invalid_settings().validate();
        let defaults = RenderSettings::default();

        assert_eq!(validated.sample_count, defaults.sample_count);
        assert_eq!(validated.window.width, defaults.window.width);
        assert_eq!(validated.window.height, defaults.window.height);
        assert_eq!(validated.window.title, "kept");
        assert_eq!(validated.camera.fov_degrees, defaults.camera.fov_degrees);
        assert_eq!(validated.camera.speed, defaults.camera.speed);
        assert_eq!(
            validated.camera.mouse_sensitivity,
            defaults.camera.mouse_sensitivity
        );
        assert_eq!(validated.camera.start_position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn validate_preserves_valid_values() {
        let valid = RenderSettings {
            sample_count: 1,
            window: WindowSettings {
                width: 1920,
                height: 1080,
                title: "demo".to_string(),
            },
            ..RenderSettings::default()
        };

        let validated = valid.clone().validate();

        assert_eq!(validated.sample_count, 1);
        assert_eq!(validated.window.width, 1920);
        assert_eq!(validated.window.height, 1080);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let settings: RenderSettings =
            serde_json::from_str(r#"{ "camera": { "speed": 2.5 }, "present_mode": "mailbox" }"#)
                .unwrap();

        assert_eq!(settings.camera.speed, 2.5);
        assert_eq!(settings.camera.fov_degrees, 75.0);
        assert_eq!(settings.sample_count, 4);
        assert!(matches!(settings.present_mode, PresentModeSetting::Mailbox));
        assert!(settings.scene.texture_path.is_none());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let settings = RenderSettings::load_from_path("no/such/settings.json");
        assert_eq!(settings.window.width, 1280);
    }

    #[test]
    fn read_distinguishes_missing_and_malformed_files() {
        let missing = RenderSettings::read(Path::new("no/such/settings.json"));
        assert!(matches!(missing, Err(SettingsError::Missing(_))));

        let path = std::env::temp_dir().join(format!(
            "cube-fly-bad-settings-{}.json",
            std::process::id()
        ));
        fs::write(&path, "{ not json").unwrap();
        let malformed = RenderSettings::read(&path);
        let _ = fs::remove_file(&path);
        assert!(matches!(malformed, Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn aspect_ratio_follows_window_size() {
        let settings = RenderSettings::default();
        assert!((settings.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn present_mode_returns_desired_when_available() {
        let settings = RenderSettings {
            present_mode: PresentModeSetting::Mailbox,
            ..RenderSettings::default()
        };

        let available = [
            wgpu::PresentMode::Fifo,
            wgpu::PresentMode::Mailbox,
            wgpu::PresentMode::Immediate,
        ];

        assert_eq!(
            settings.present_mode(&available),
            wgpu::PresentMode::Mailbox
        );
    }

    #[test]
    fn present_mode_falls_back_to_fifo_when_desired_missing() {
        let settings = RenderSettings {
            present_mode: PresentModeSetting::Mailbox,
            ..RenderSettings::default()
        };

        let available = [wgpu::PresentMode::Fifo, wgpu::PresentMode::Immediate];

        assert_eq!(settings.present_mode(&available), wgpu::PresentMode::Fifo);
    }
}
