use std::path::Path;

use anyhow::Context as _;

use crate::data_structures::texture;

/// Layout of the per-object bind group: material uniform followed by the diffuse and
/// specular override textures, each with its sampler.
pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            texture_entry(1),
            sampler_entry(2),
            texture_entry(3),
            sampler_entry(4),
        ],
        label: Some("material_bind_group_layout"),
    })
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

pub fn load_binary(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("cannot read '{}'", path.display()))
}

pub fn load_texture(
    path: impl AsRef<Path>,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<texture::Texture> {
    let path = path.as_ref();
    let data = load_binary(path)?;
    let label = path.to_string_lossy();
    let format = path.extension().and_then(|ext| ext.to_str());
    texture::Texture::from_bytes(device, queue, &data, &label, format)
        .with_context(|| format!("cannot decode texture '{}'", path.display()))
}

/// Load the configured texture, or fall back to solid white when there is none or it
/// cannot be loaded.
pub fn load_texture_or_white(
    path: Option<&Path>,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> texture::Texture {
    let white = || texture::Texture::create_solid(device, queue, [255; 4], "white");
    match path {
        None => white(),
        Some(path) => match load_texture(path, device, queue) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("{:#}; falling back to a white texture", e);
                white()
            }
        },
    }
}
