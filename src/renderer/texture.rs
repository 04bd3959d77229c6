// renderer/texture.rs (CPU mip chain)

use std::path::Path;

use image::{imageops, DynamicImage, RgbaImage};

use super::error::TextureError;

#[derive(Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub bind_group: wgpu::BindGroup,
}

impl Texture {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("TextureBindLayout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }

    /// Load an image file as a mipmapped 2D texture, flipped so that v = 0 is the bottom row.
    pub fn from_path(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        path: impl AsRef<Path>,
    ) -> Result<Self, TextureError> {
        let path = path.as_ref();
        log::info!("Loading texture: {:?}", path);

        let pixels = decode_flipped(path)?;
        check_dimensions(path, &pixels, device.limits().max_texture_dimension_2d)?;
        let label = path.to_string_lossy();
        Ok(Self::from_rgba8(device, queue, layout, &pixels, &label))
    }

    /// 1x1 white texture used by models that do not name one.
    pub fn white(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let pixels = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        Self::from_rgba8(device, queue, layout, &pixels, "DefaultTexture")
    }

    fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        pixels: &RgbaImage,
        label: &str,
    ) -> Self {
        let levels = mip_chain(pixels);
        let (width, height) = pixels.dimensions();

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, level) in levels.iter().enumerate() {
            let (w, h) = level.dimensions();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                level.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * w),
                    rows_per_image: Some(h),
                },
                wgpu::Extent3d {
                    width: w,
                    height: h,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear, // trilinear
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            texture,
            view,
            sampler,
            bind_group,
        }
    }
}

/// Decode to RGB8, flip vertically, then expand to RGBA8 (wgpu has no 3-channel format).
fn decode_flipped(path: &Path) -> Result<RgbaImage, TextureError> {
    let img = image::open(path).map_err(|source| TextureError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let rgb = DynamicImage::ImageRgb8(img.to_rgb8()).flipv();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(TextureError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(rgb.to_rgba8())
}

fn check_dimensions(path: &Path, pixels: &RgbaImage, max: u32) -> Result<(), TextureError> {
    let (width, height) = pixels.dimensions();
    if width > max || height > max {
        return Err(TextureError::TooLarge {
            path: path.to_path_buf(),
            width,
            height,
            max,
        });
    }
    Ok(())
}

fn calculate_mip_levels(width: u32, height: u32) -> u32 {
    let max_dimension = width.max(height).max(1);
    u32::BITS - max_dimension.leading_zeros()
}

/// Base image followed by successively halved levels down to 1x1.
fn mip_chain(base: &RgbaImage) -> Vec<RgbaImage> {
    let (width, height) = base.dimensions();
    let count = calculate_mip_levels(width, height);

    let mut levels = Vec::with_capacity(count as usize);
    levels.push(base.clone());
    for level in 1..count {
        let w = (width >> level).max(1);
        let h = (height >> level).max(1);
        let next = imageops::resize(
            &levels[level as usize - 1],
            w,
            h,
            imageops::FilterType::Triangle,
        );
        levels.push(next);
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_levels_cover_largest_dimension() {
        assert_eq!(calculate_mip_levels(1, 1), 1);
        assert_eq!(calculate_mip_levels(256, 256), 9);
        assert_eq!(calculate_mip_levels(300, 17), 9);
    }

    #[test]
    fn mip_chain_halves_down_to_one_pixel() {
        let base = RgbaImage::from_pixel(8, 2, image::Rgba([10, 20, 30, 255]));
        let dims: Vec<(u32, u32)> = mip_chain(&base).iter().map(|l| l.dimensions()).collect();
        assert_eq!(dims, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
    }

    #[test]
    fn oversized_image_is_rejected_before_upload() {
        let wide = RgbaImage::new(9, 4);
        let err = check_dimensions(Path::new("wide.png"), &wide, 8).unwrap_err();
        assert!(matches!(
            err,
            TextureError::TooLarge {
                width: 9,
                height: 4,
                max: 8,
                ..
            }
        ));
        assert!(err.to_string().contains("wide.png"));

        let fits = RgbaImage::new(8, 8);
        assert!(check_dimensions(Path::new("fits.png"), &fits, 8).is_ok());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = decode_flipped(Path::new("does/not/exist.png")).unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
        assert!(err.to_string().contains("exist.png"));
    }

    #[test]
    fn decoded_image_is_flipped_vertically() {
        let mut img = image::RgbImage::new(1, 2);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(0, 1, image::Rgb([0, 0, 255]));

        let path = std::env::temp_dir().join("cube_fly_flip_test.png");
        img.save(&path).unwrap();

        let flipped = decode_flipped(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(flipped.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(flipped.get_pixel(0, 1).0, [255, 0, 0, 255]);
    }
}
