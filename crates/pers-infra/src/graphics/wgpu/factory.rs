// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines [`WgpuResourceFactory`], which turns pers descriptors into `wgpu`
//! objects.

use super::conversions::{wgpu_format, IntoWgpu};
use super::resources::{
    WgpuBindGroup, WgpuBindGroupLayout, WgpuBuffer, WgpuRenderPipeline, WgpuSampler,
    WgpuShaderModule, WgpuTexture, WgpuTextureView,
};
use pers_core::graphics::api::{
    BindGroupDesc, BindGroupLayoutDesc, BindingResource, BindingType, BufferDesc, BufferUsage,
    FilterMode, RenderPipelineDesc, SamplerDesc, ShaderModuleDesc, TextureDesc, TextureDimension,
    TextureViewDesc, TextureViewDimension,
};
use pers_core::graphics::error::{GraphicsError, GraphicsResult};
use pers_core::graphics::traits::{
    BindGroup, BindGroupLayout, Buffer, MappableBuffer, RenderPipeline, ResourceFactory, Sampler,
    ShaderModule, Texture, TextureView,
};
use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The `wgpu` binding type for a layout slot.
pub fn wgpu_binding_type(ty: BindingType) -> wgpu::BindingType {
    match ty {
        BindingType::UniformBuffer {
            has_dynamic_offset,
            min_binding_size,
        } => wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset,
            min_binding_size: min_binding_size.and_then(wgpu::BufferSize::new),
        },
        BindingType::StorageBuffer {
            read_only,
            has_dynamic_offset,
        } => wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset,
            min_binding_size: None,
        },
        BindingType::Sampler { comparison: true } => {
            wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison)
        }
        BindingType::Sampler { comparison: false } => {
            wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
        }
        BindingType::Texture {
            sample_type,
            view_dimension,
            multisampled,
        } => wgpu::BindingType::Texture {
            sample_type: sample_type.into_wgpu(),
            view_dimension: view_dimension.into_wgpu(),
            multisampled,
        },
    }
}

/// Backend-specific buffer rules on top of [`BufferDesc::validate`].
///
/// Without mappable primary buffers, `wgpu` only allows a read map next to
/// `COPY_DST` and a write map next to `COPY_SRC`.
pub fn validate_buffer_usage(desc: &BufferDesc) -> GraphicsResult<()> {
    let usage = desc.usage;
    if usage.contains(BufferUsage::MAP_READ) && !(BufferUsage::MAP_READ | BufferUsage::COPY_DST).contains(usage) {
        return Err(GraphicsError::invalid(format!(
            "buffer '{}': MAP_READ can only be combined with COPY_DST",
            desc.label_or_default()
        )));
    }
    if usage.contains(BufferUsage::MAP_WRITE) && !(BufferUsage::MAP_WRITE | BufferUsage::COPY_SRC).contains(usage) {
        return Err(GraphicsError::invalid(format!(
            "buffer '{}': MAP_WRITE can only be combined with COPY_SRC",
            desc.label_or_default()
        )));
    }
    Ok(())
}

/// The view dimension a view inherits when its descriptor leaves it unset.
pub fn default_view_dimension(desc: &TextureDesc) -> TextureViewDimension {
    match desc.dimension {
        TextureDimension::D1 => TextureViewDimension::D1,
        TextureDimension::D2 if desc.depth_or_array_layers > 1 => TextureViewDimension::D2Array,
        TextureDimension::D2 => TextureViewDimension::D2,
        TextureDimension::D3 => TextureViewDimension::D3,
    }
}

fn validate_sampler(desc: &SamplerDesc) -> GraphicsResult<()> {
    let label = desc.label.as_deref().unwrap_or("<unnamed>");
    if !(desc.lod_min_clamp >= 0.0 && desc.lod_min_clamp <= desc.lod_max_clamp) {
        return Err(GraphicsError::invalid(format!(
            "sampler '{label}': lod clamp {}..{} is not a valid range",
            desc.lod_min_clamp, desc.lod_max_clamp
        )));
    }
    let all_linear = [desc.mag_filter, desc.min_filter, desc.mipmap_filter]
        .iter()
        .all(|f| *f == FilterMode::Linear);
    if desc.max_anisotropy > 1 && !all_linear {
        return Err(GraphicsError::invalid(format!(
            "sampler '{label}': anisotropic filtering requires linear filters"
        )));
    }
    Ok(())
}

/// Creates resources on one `wgpu` device.
pub struct WgpuResourceFactory {
    device: wgpu::Device,
    lost: Arc<AtomicBool>,
}

impl WgpuResourceFactory {
    pub(crate) fn new(device: wgpu::Device, lost: Arc<AtomicBool>) -> Self {
        Self { device, lost }
    }

    fn ensure_alive(&self) -> GraphicsResult<()> {
        if self.lost.load(Ordering::Acquire) {
            return Err(GraphicsError::DeviceLost(
                "resources cannot be created on a lost device".to_owned(),
            ));
        }
        Ok(())
    }

    fn new_buffer(&self, desc: &BufferDesc) -> GraphicsResult<Arc<WgpuBuffer>> {
        self.ensure_alive()?;
        desc.validate()
            .and_then(|()| validate_buffer_usage(desc))
            .inspect_err(|e| log::error!("WgpuResourceFactory: {e}"))?;
        let raw = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: desc.label.as_deref(),
            size: desc.size.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT),
            usage: desc.usage.into_wgpu(),
            mapped_at_creation: desc.mapped_at_creation,
        });
        log::debug!(
            "WgpuResourceFactory: created buffer '{}' ({} bytes, {:?})",
            desc.label_or_default(),
            desc.size,
            desc.usage
        );
        Ok(Arc::new(WgpuBuffer::new(raw, self.device.clone(), desc)))
    }
}

impl ResourceFactory for WgpuResourceFactory {
    fn create_buffer(&self, desc: &BufferDesc) -> GraphicsResult<Arc<dyn Buffer>> {
        Ok(self.new_buffer(desc)?)
    }

    fn create_initializable_device_buffer(
        &self,
        desc: &BufferDesc,
        data: &[u8],
    ) -> GraphicsResult<Arc<dyn Buffer>> {
        if data.len() as u64 > desc.size {
            let e = GraphicsError::invalid(format!(
                "{} bytes of initial data do not fit buffer '{}' ({} bytes)",
                data.len(),
                desc.label_or_default(),
                desc.size
            ));
            log::error!("WgpuResourceFactory: {e}");
            return Err(e);
        }
        let init_desc = BufferDesc {
            usage: desc.usage | BufferUsage::COPY_SRC,
            mapped_at_creation: true,
            ..desc.clone()
        };
        let buffer = self.new_buffer(&init_desc)?;
        buffer.write_mapped(0, data)?;
        buffer.unmap();
        Ok(buffer)
    }

    fn create_mappable_buffer(&self, desc: &BufferDesc) -> GraphicsResult<Arc<dyn MappableBuffer>> {
        if !desc.usage.intersects(BufferUsage::MAP_READ | BufferUsage::MAP_WRITE) {
            let e = GraphicsError::invalid(format!(
                "mappable buffer '{}' needs MAP_READ or MAP_WRITE",
                desc.label_or_default()
            ));
            log::error!("WgpuResourceFactory: {e}");
            return Err(e);
        }
        Ok(self.new_buffer(desc)?)
    }

    fn create_texture(&self, desc: &TextureDesc) -> GraphicsResult<Arc<dyn Texture>> {
        self.ensure_alive()?;
        desc.validate()
            .inspect_err(|e| log::error!("WgpuResourceFactory: {e}"))?;
        let format = wgpu_format(desc.format)?;
        let raw = self.device.create_texture(&wgpu::TextureDescriptor {
            label: desc.label.as_deref(),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: desc.depth_or_array_layers,
            },
            mip_level_count: desc.mip_level_count,
            sample_count: desc.sample_count,
            dimension: desc.dimension.into_wgpu(),
            format,
            usage: desc.usage.into_wgpu(),
            view_formats: &[],
        });
        log::debug!(
            "WgpuResourceFactory: created texture '{}' {}x{} {}",
            desc.label.as_deref().unwrap_or("<unnamed>"),
            desc.width,
            desc.height,
            desc.format
        );
        Ok(Arc::new(WgpuTexture::new(raw, desc.clone())))
    }

    fn create_texture_view(
        &self,
        texture: &Arc<dyn Texture>,
        desc: &TextureViewDesc,
    ) -> GraphicsResult<Arc<dyn TextureView>> {
        let wgpu_texture = WgpuTexture::of(texture.as_ref())?;
        let texture_desc = texture.desc();
        if desc.base_mip_level >= texture_desc.mip_level_count {
            let e = GraphicsError::invalid(format!(
                "view '{}': base mip {} is past the texture's {} levels",
                desc.label.as_deref().unwrap_or("<unnamed>"),
                desc.base_mip_level,
                texture_desc.mip_level_count
            ));
            log::error!("WgpuResourceFactory: {e}");
            return Err(e);
        }
        let format = desc.format.unwrap_or(texture_desc.format);
        let dimension = desc
            .dimension
            .unwrap_or_else(|| default_view_dimension(texture_desc));
        let raw = wgpu_texture.raw().create_view(&wgpu::TextureViewDescriptor {
            label: desc.label.as_deref(),
            format: Some(wgpu_format(format)?),
            dimension: Some(dimension.into_wgpu()),
            usage: None,
            aspect: desc.aspect.into_wgpu(),
            base_mip_level: desc.base_mip_level,
            mip_level_count: desc.mip_level_count,
            base_array_layer: desc.base_array_layer,
            array_layer_count: desc.array_layer_count,
        });
        let (width, height, _) = texture_desc.mip_extent(desc.base_mip_level);
        Ok(Arc::new(WgpuTextureView::new(
            raw,
            desc.label.clone(),
            format,
            dimension,
            desc.aspect,
            (width, height),
            texture_desc.sample_count,
        )))
    }

    fn create_sampler(&self, desc: &SamplerDesc) -> GraphicsResult<Arc<dyn Sampler>> {
        self.ensure_alive()?;
        validate_sampler(desc).inspect_err(|e| log::error!("WgpuResourceFactory: {e}"))?;
        let raw = self.device.create_sampler(&desc.into_wgpu());
        Ok(Arc::new(WgpuSampler::new(raw)))
    }

    fn create_shader_module(&self, desc: &ShaderModuleDesc) -> GraphicsResult<Arc<dyn ShaderModule>> {
        self.ensure_alive()?;
        let label = desc.label.clone().unwrap_or_else(|| "<unnamed>".to_owned());
        if desc.source.trim().is_empty() || desc.entry_point.is_empty() {
            let e = GraphicsError::invalid(format!(
                "shader '{label}' needs a source and an entry point"
            ));
            log::error!("WgpuResourceFactory: {e}");
            return Err(e);
        }
        let raw = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: desc.label.as_deref(),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(&desc.source)),
        });

        let info = pollster::block_on(raw.get_compilation_info());
        let errors: Vec<String> = info
            .messages
            .iter()
            .filter(|m| matches!(m.message_type, wgpu::CompilationMessageType::Error))
            .map(|m| match &m.location {
                Some(loc) => format!("{}:{}: {}", loc.line_number, loc.line_position, m.message),
                None => m.message.clone(),
            })
            .collect();
        if !errors.is_empty() {
            let details = errors.join("\n");
            log::error!("WgpuResourceFactory: shader '{label}' failed to compile:\n{details}");
            return Err(GraphicsError::ShaderCompilation { label, details });
        }

        log::debug!(
            "WgpuResourceFactory: compiled {} shader '{label}' ({})",
            desc.stage,
            desc.entry_point
        );
        Ok(Arc::new(WgpuShaderModule::new(
            raw,
            desc.label.clone(),
            desc.stage,
            desc.entry_point.clone(),
        )))
    }

    fn create_render_pipeline(
        &self,
        desc: &RenderPipelineDesc,
    ) -> GraphicsResult<Arc<dyn RenderPipeline>> {
        self.ensure_alive()?;
        desc.validate()
            .inspect_err(|e| log::error!("WgpuResourceFactory: {e}"))?;

        let vertex = WgpuShaderModule::of(desc.vertex_shader.as_ref())?;
        let fragment = desc
            .fragment_shader
            .as_deref()
            .map(WgpuShaderModule::of)
            .transpose()?;
        let bind_group_layouts = desc
            .bind_group_layouts
            .iter()
            .map(|l| WgpuBindGroupLayout::of(l.as_ref()).map(|l| Some(l.raw())))
            .collect::<GraphicsResult<Vec<_>>>()?;

        let layout_label = desc.label.as_deref().map(|s| format!("{s} Layout"));
        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: layout_label.as_deref(),
                bind_group_layouts: &bind_group_layouts,
                immediate_size: 0,
            });

        let attributes: Vec<Vec<wgpu::VertexAttribute>> = desc
            .vertex_layouts
            .iter()
            .map(|layout| {
                layout
                    .attributes
                    .iter()
                    .map(|a| wgpu::VertexAttribute {
                        format: a.format.into_wgpu(),
                        offset: a.offset,
                        shader_location: a.shader_location,
                    })
                    .collect()
            })
            .collect();
        let vertex_buffers: Vec<wgpu::VertexBufferLayout> = desc
            .vertex_layouts
            .iter()
            .zip(&attributes)
            .map(|(layout, attributes)| wgpu::VertexBufferLayout {
                array_stride: layout.array_stride,
                step_mode: layout.step_mode.into_wgpu(),
                attributes,
            })
            .collect();
        let targets: Vec<Option<wgpu::ColorTargetState>> = desc
            .color_targets
            .iter()
            .map(|target| target.into_wgpu())
            .collect();

        let raw = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: desc.label.as_deref(),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: vertex.raw(),
                    entry_point: Some(vertex.entry_point()),
                    buffers: &vertex_buffers,
                    compilation_options: Default::default(),
                },
                fragment: fragment.map(|fragment| wgpu::FragmentState {
                    module: fragment.raw(),
                    entry_point: Some(fragment.entry_point()),
                    targets: &targets,
                    compilation_options: Default::default(),
                }),
                primitive: desc.primitive.into_wgpu(),
                depth_stencil: desc.depth_stencil.and_then(IntoWgpu::into_wgpu),
                multisample: desc.multisample.into_wgpu(),
                multiview_mask: None,
                cache: None,
            });

        log::debug!(
            "WgpuResourceFactory: created render pipeline '{}'",
            desc.label.as_deref().unwrap_or("<unnamed>")
        );
        Ok(Arc::new(WgpuRenderPipeline {
            raw,
            label: desc.label.clone(),
            vertex_buffer_count: desc.vertex_layouts.len() as u32,
            color_formats: desc.color_targets.iter().map(|t| t.format).collect(),
            depth_format: desc.depth_stencil.map(|ds| ds.format),
            sample_count: desc.multisample.count,
        }))
    }

    fn create_bind_group_layout(
        &self,
        desc: &BindGroupLayoutDesc,
    ) -> GraphicsResult<Arc<dyn BindGroupLayout>> {
        self.ensure_alive()?;
        desc.validate()
            .inspect_err(|e| log::error!("WgpuResourceFactory: {e}"))?;
        let entries: Vec<wgpu::BindGroupLayoutEntry> = desc
            .entries
            .iter()
            .map(|entry| wgpu::BindGroupLayoutEntry {
                binding: entry.binding,
                visibility: entry.visibility.into_wgpu(),
                ty: wgpu_binding_type(entry.ty),
                count: None,
            })
            .collect();
        let raw = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: desc.label.as_deref(),
                entries: &entries,
            });
        Ok(Arc::new(WgpuBindGroupLayout::new(raw)))
    }

    fn create_bind_group(&self, desc: &BindGroupDesc) -> GraphicsResult<Arc<dyn BindGroup>> {
        self.ensure_alive()?;
        let layout = WgpuBindGroupLayout::of(desc.layout.as_ref())?;
        let entries = desc
            .entries
            .iter()
            .map(|entry| {
                let resource = match &entry.resource {
                    BindingResource::Buffer {
                        buffer,
                        offset,
                        size,
                    } => wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: WgpuBuffer::of(buffer.as_ref())?.raw(),
                        offset: *offset,
                        size: size.and_then(wgpu::BufferSize::new),
                    }),
                    BindingResource::Sampler(sampler) => {
                        wgpu::BindingResource::Sampler(WgpuSampler::of(sampler.as_ref())?.raw())
                    }
                    BindingResource::TextureView(view) => wgpu::BindingResource::TextureView(
                        WgpuTextureView::of(view.as_ref())?.raw(),
                    ),
                };
                Ok(wgpu::BindGroupEntry {
                    binding: entry.binding,
                    resource,
                })
            })
            .collect::<GraphicsResult<Vec<_>>>()
            .inspect_err(|e| log::error!("WgpuResourceFactory: {e}"))?;
        let raw = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: desc.label.as_deref(),
            layout: layout.raw(),
            entries: &entries,
        });
        Ok(Arc::new(WgpuBindGroup::new(raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pers_core::graphics::api::{TextureFormat, TextureSampleType, TextureUsage};

    #[test]
    fn readback_usage_is_restricted_to_copy_dst() {
        let ok = BufferDesc::new(64, BufferUsage::MAP_READ | BufferUsage::COPY_DST);
        assert!(validate_buffer_usage(&ok).is_ok());
        let bad = BufferDesc::new(64, BufferUsage::MAP_READ | BufferUsage::VERTEX);
        assert!(matches!(
            validate_buffer_usage(&bad),
            Err(GraphicsError::InvalidArgument(_))
        ));
        let upload = BufferDesc::new(64, BufferUsage::MAP_WRITE | BufferUsage::COPY_SRC);
        assert!(validate_buffer_usage(&upload).is_ok());
        let plain = BufferDesc::new(64, BufferUsage::VERTEX | BufferUsage::COPY_DST);
        assert!(validate_buffer_usage(&plain).is_ok());
    }

    #[test]
    fn array_textures_default_to_array_views() {
        let mut desc = TextureDesc::new_2d(
            256,
            256,
            TextureFormat::Depth32Float,
            TextureUsage::RENDER_ATTACHMENT,
        );
        assert_eq!(default_view_dimension(&desc), TextureViewDimension::D2);
        desc.depth_or_array_layers = 4;
        assert_eq!(default_view_dimension(&desc), TextureViewDimension::D2Array);
    }

    #[test]
    fn comparison_samplers_bind_as_comparison() {
        assert!(matches!(
            wgpu_binding_type(BindingType::Sampler { comparison: true }),
            wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison)
        ));
        assert!(matches!(
            wgpu_binding_type(BindingType::Texture {
                sample_type: TextureSampleType::Depth,
                view_dimension: TextureViewDimension::D2,
                multisampled: false,
            }),
            wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Depth,
                ..
            }
        ));
    }

    #[test]
    fn anisotropy_needs_linear_filtering() {
        let nearest = SamplerDesc {
            max_anisotropy: 16,
            ..Default::default()
        };
        assert!(validate_sampler(&nearest).is_err());
        let linear = SamplerDesc {
            max_anisotropy: 16,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: FilterMode::Linear,
            ..Default::default()
        };
        assert!(validate_sampler(&linear).is_ok());
        let inverted = SamplerDesc {
            lod_min_clamp: 4.0,
            lod_max_clamp: 1.0,
            ..Default::default()
        };
        assert!(validate_sampler(&inverted).is_err());
    }
}
