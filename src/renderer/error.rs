use std::path::PathBuf;

use thiserror::Error;

/// Failures while bringing up the window and graphics context. None are recoverable.
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to open graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("built-in shader pipeline is invalid: {0}")]
    Pipeline(#[from] wgpu::Error),
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load texture {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture {path:?} has zero size")]
    Empty { path: PathBuf },
    #[error("texture {path:?} is {width}x{height}, larger than the device limit of {max}")]
    TooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max: u32,
    },
}
