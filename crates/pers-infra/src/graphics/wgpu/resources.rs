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

//! Defines the `wgpu` implementations of the resource traits.
//!
//! Every wrapper owns its `wgpu` object and whatever metadata the traits
//! report back. `of` downcasts a trait object and fails with
//! `InvalidArgument` when it came from another backend.

use parking_lot::Mutex;
use pers_core::graphics::api::{
    BufferDesc, BufferMapRange, BufferState, BufferUsage, MapMode, ShaderStage, TextureAspect,
    TextureDesc, TextureFormat, TextureViewDimension,
};
use pers_core::graphics::error::{GraphicsError, GraphicsResult};
use pers_core::graphics::handle::{
    BindGroupHandle, BindGroupLayoutHandle, BufferHandle, PipelineHandle, SamplerHandle,
    ShaderHandle, TextureHandle, TextureViewHandle,
};
use pers_core::graphics::traits::{
    BindGroup, BindGroupLayout, Buffer, MappableBuffer, RenderPipeline, Sampler, ShaderModule,
    Texture, TextureView,
};
use pers_core::sync::{completion, Completion};
use std::any::Any;
use std::sync::Arc;

fn foreign(kind: &str) -> GraphicsError {
    GraphicsError::invalid(format!("{kind} was not created by the wgpu backend"))
}

macro_rules! downcast {
    ($ty:ident, $tr:ident, $kind:literal) => {
        impl $ty {
            /// Downcasts a trait object created by this backend.
            pub fn of(object: &dyn $tr) -> GraphicsResult<&$ty> {
                object
                    .as_any()
                    .downcast_ref::<$ty>()
                    .ok_or_else(|| foreign($kind))
            }
        }
    };
}

// --- Buffers ---

#[derive(Default)]
struct MapSlot {
    mapped: Option<(u64, u64)>,
    pending: Option<(u64, u64)>,
    generation: u64,
    destroyed: bool,
}

/// A `wgpu` buffer, mappable or not.
///
/// The `wgpu` allocation is padded to a multiple of four bytes; `size`
/// reports the requested size. Maps always cover the whole allocation while
/// the logical range is tracked here.
pub struct WgpuBuffer {
    raw: wgpu::Buffer,
    device: wgpu::Device,
    label: Option<String>,
    size: u64,
    usage: BufferUsage,
    map: Arc<Mutex<MapSlot>>,
}

downcast!(WgpuBuffer, Buffer, "buffer");

impl WgpuBuffer {
    pub(crate) fn new(raw: wgpu::Buffer, device: wgpu::Device, desc: &BufferDesc) -> Self {
        let map = MapSlot {
            mapped: desc.mapped_at_creation.then_some((0, desc.size)),
            ..Default::default()
        };
        Self {
            raw,
            device,
            label: desc.label.clone(),
            size: desc.size,
            usage: desc.usage,
            map: Arc::new(Mutex::new(map)),
        }
    }

    /// The underlying `wgpu` buffer.
    pub fn raw(&self) -> &wgpu::Buffer {
        &self.raw
    }

    fn name(&self) -> &str {
        self.label.as_deref().unwrap_or("<unnamed>")
    }

    /// Checks that `offset..offset + len` lies inside the mapped range and
    /// returns it as indices into the mapped view.
    fn mapped_window(&self, offset: u64, len: usize) -> GraphicsResult<std::ops::Range<usize>> {
        let Some((start, mapped_len)) = self.map.lock().mapped else {
            return Err(GraphicsError::state(format!(
                "buffer '{}' is not mapped",
                self.name()
            )));
        };
        let end = offset
            .checked_add(len as u64)
            .filter(|end| offset >= start && *end <= start + mapped_len)
            .ok_or_else(|| {
                GraphicsError::invalid(format!(
                    "access of {len} bytes at offset {offset} is outside the mapped range {start}..{} of '{}'",
                    start + mapped_len,
                    self.name()
                ))
            })?;
        Ok(offset as usize..end as usize)
    }
}

impl Buffer for WgpuBuffer {
    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn usage(&self) -> BufferUsage {
        self.usage
    }

    fn state(&self) -> BufferState {
        let map = self.map.lock();
        if map.destroyed {
            BufferState::Destroyed
        } else if map.mapped.is_some() {
            BufferState::Mapped
        } else if map.pending.is_some() {
            BufferState::MapPending
        } else {
            BufferState::Ready
        }
    }

    fn write_mapped(&self, offset: u64, data: &[u8]) -> GraphicsResult<()> {
        let window = self.mapped_window(offset, data.len())?;
        let mut view = self.raw.slice(..).get_mapped_range_mut();
        view.slice(window).copy_from_slice(data);
        Ok(())
    }

    fn mapped_len(&self) -> Option<u64> {
        self.map.lock().mapped.map(|(_, len)| len)
    }

    fn unmap(&self) {
        {
            let mut map = self.map.lock();
            if map.mapped.is_none() && map.pending.is_none() {
                return;
            }
            map.generation += 1;
            map.mapped = None;
            map.pending = None;
        }
        // A pending map resolves its callback from inside `unmap`.
        self.raw.unmap();
    }

    fn destroy(&self) {
        {
            let mut map = self.map.lock();
            if map.destroyed {
                return;
            }
            map.destroyed = true;
            map.generation += 1;
            map.mapped = None;
            map.pending = None;
        }
        log::debug!("WgpuBuffer: destroying '{}'", self.name());
        self.raw.destroy();
    }

    fn native_handle(&self) -> BufferHandle {
        BufferHandle::from_backend(&self.raw)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl MappableBuffer for WgpuBuffer {
    fn map_async(
        &self,
        mode: MapMode,
        range: BufferMapRange,
    ) -> GraphicsResult<Completion<GraphicsResult<()>>> {
        let (required, wgpu_mode) = match mode {
            MapMode::Read => (BufferUsage::MAP_READ, wgpu::MapMode::Read),
            MapMode::Write => (BufferUsage::MAP_WRITE, wgpu::MapMode::Write),
        };
        if !self.usage.contains(required) {
            return Err(GraphicsError::invalid(format!(
                "buffer '{}' cannot be mapped for {mode:?} without {required:?}",
                self.name()
            )));
        }
        let (offset, len) = range.resolve(self.size)?;

        let generation = {
            let mut map = self.map.lock();
            if map.destroyed {
                return Err(GraphicsError::state(format!(
                    "buffer '{}' is destroyed",
                    self.name()
                )));
            }
            if map.mapped.is_some() || map.pending.is_some() {
                return Err(GraphicsError::state(format!(
                    "buffer '{}' is already mapped or has a map pending",
                    self.name()
                )));
            }
            map.generation += 1;
            map.pending = Some((offset, len));
            map.generation
        };

        let (completer, result) = completion();
        let slot = Arc::clone(&self.map);
        let label = self.name().to_owned();
        self.raw.slice(..).map_async(wgpu_mode, move |outcome| {
            let mut map = slot.lock();
            if map.generation != generation {
                drop(map);
                completer.complete(Err(GraphicsError::state(format!(
                    "map of '{label}' was cancelled"
                ))));
                return;
            }
            let requested = map.pending.take();
            match outcome {
                Ok(()) => {
                    map.mapped = requested;
                    drop(map);
                    completer.complete(Ok(()));
                }
                Err(e) => {
                    drop(map);
                    log::error!("WgpuBuffer: map of '{label}' failed: {e}");
                    completer.complete(Err(GraphicsError::Backend(format!(
                        "map of '{label}' failed: {e}"
                    ))));
                }
            }
        });
        Ok(result)
    }

    fn poll(&self) {
        if let Err(e) = self.device.poll(wgpu::PollType::Poll) {
            log::debug!("WgpuBuffer: device poll failed: {e}");
        }
    }

    fn read_mapped(&self, offset: u64, out: &mut [u8]) -> GraphicsResult<()> {
        let window = self.mapped_window(offset, out.len())?;
        let view = self.raw.slice(..).get_mapped_range();
        out.copy_from_slice(&view[window]);
        Ok(())
    }

    fn is_map_pending(&self) -> bool {
        self.map.lock().pending.is_some()
    }

    fn is_mapped(&self) -> bool {
        self.map.lock().mapped.is_some()
    }

    fn as_buffer(&self) -> &dyn Buffer {
        self
    }
}

// --- Textures ---

/// A `wgpu` texture.
pub struct WgpuTexture {
    raw: wgpu::Texture,
    desc: TextureDesc,
}

downcast!(WgpuTexture, Texture, "texture");

impl WgpuTexture {
    pub(crate) fn new(raw: wgpu::Texture, desc: TextureDesc) -> Self {
        Self { raw, desc }
    }

    /// The underlying `wgpu` texture.
    pub fn raw(&self) -> &wgpu::Texture {
        &self.raw
    }
}

impl Texture for WgpuTexture {
    fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    fn native_handle(&self) -> TextureHandle {
        TextureHandle::from_backend(&self.raw)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A `wgpu` texture view and what it was created as.
pub struct WgpuTextureView {
    raw: wgpu::TextureView,
    label: Option<String>,
    format: TextureFormat,
    dimension: TextureViewDimension,
    aspect: TextureAspect,
    extent: (u32, u32),
    sample_count: u32,
    swapchain: bool,
}

downcast!(WgpuTextureView, TextureView, "texture view");

impl WgpuTextureView {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        raw: wgpu::TextureView,
        label: Option<String>,
        format: TextureFormat,
        dimension: TextureViewDimension,
        aspect: TextureAspect,
        extent: (u32, u32),
        sample_count: u32,
    ) -> Self {
        Self {
            raw,
            label,
            format,
            dimension,
            aspect,
            extent,
            sample_count,
            swapchain: false,
        }
    }

    /// Marks the view as belonging to an acquired swapchain image.
    pub(crate) fn for_swapchain(mut self) -> Self {
        self.swapchain = true;
        self
    }

    /// The underlying `wgpu` view.
    pub fn raw(&self) -> &wgpu::TextureView {
        &self.raw
    }
}

impl TextureView for WgpuTextureView {
    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn format(&self) -> TextureFormat {
        self.format
    }

    fn dimension(&self) -> TextureViewDimension {
        self.dimension
    }

    fn aspect(&self) -> TextureAspect {
        self.aspect
    }

    fn width(&self) -> u32 {
        self.extent.0
    }

    fn height(&self) -> u32 {
        self.extent.1
    }

    fn sample_count(&self) -> u32 {
        self.sample_count
    }

    fn is_swapchain_view(&self) -> bool {
        self.swapchain
    }

    fn native_handle(&self) -> TextureViewHandle {
        TextureViewHandle::from_backend(&self.raw)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A `wgpu` sampler.
pub struct WgpuSampler {
    raw: wgpu::Sampler,
}

downcast!(WgpuSampler, Sampler, "sampler");

impl WgpuSampler {
    pub(crate) fn new(raw: wgpu::Sampler) -> Self {
        Self { raw }
    }

    /// The underlying `wgpu` sampler.
    pub fn raw(&self) -> &wgpu::Sampler {
        &self.raw
    }
}

impl Sampler for WgpuSampler {
    fn native_handle(&self) -> SamplerHandle {
        SamplerHandle::from_backend(&self.raw)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// --- Shaders and pipelines ---

/// A compiled `wgpu` shader module and its entry point.
pub struct WgpuShaderModule {
    raw: wgpu::ShaderModule,
    label: Option<String>,
    stage: ShaderStage,
    entry_point: String,
}

downcast!(WgpuShaderModule, ShaderModule, "shader module");

impl WgpuShaderModule {
    pub(crate) fn new(
        raw: wgpu::ShaderModule,
        label: Option<String>,
        stage: ShaderStage,
        entry_point: String,
    ) -> Self {
        Self {
            raw,
            label,
            stage,
            entry_point,
        }
    }

    /// The underlying `wgpu` module.
    pub fn raw(&self) -> &wgpu::ShaderModule {
        &self.raw
    }
}

impl ShaderModule for WgpuShaderModule {
    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn stage(&self) -> ShaderStage {
        self.stage
    }

    fn entry_point(&self) -> &str {
        &self.entry_point
    }

    fn native_handle(&self) -> ShaderHandle {
        ShaderHandle::from_backend(&self.raw)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A `wgpu` render pipeline with the attachment formats it was built for.
pub struct WgpuRenderPipeline {
    pub(crate) raw: wgpu::RenderPipeline,
    pub(crate) label: Option<String>,
    pub(crate) vertex_buffer_count: u32,
    pub(crate) color_formats: Vec<TextureFormat>,
    pub(crate) depth_format: Option<TextureFormat>,
    pub(crate) sample_count: u32,
}

downcast!(WgpuRenderPipeline, RenderPipeline, "render pipeline");

impl WgpuRenderPipeline {
    /// The underlying `wgpu` pipeline.
    pub fn raw(&self) -> &wgpu::RenderPipeline {
        &self.raw
    }
}

impl RenderPipeline for WgpuRenderPipeline {
    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn vertex_buffer_count(&self) -> u32 {
        self.vertex_buffer_count
    }

    fn color_formats(&self) -> &[TextureFormat] {
        &self.color_formats
    }

    fn depth_format(&self) -> Option<TextureFormat> {
        self.depth_format
    }

    fn sample_count(&self) -> u32 {
        self.sample_count
    }

    fn native_handle(&self) -> PipelineHandle {
        PipelineHandle::from_backend(&self.raw)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// --- Bind groups ---

/// A `wgpu` bind group layout.
pub struct WgpuBindGroupLayout {
    raw: wgpu::BindGroupLayout,
}

downcast!(WgpuBindGroupLayout, BindGroupLayout, "bind group layout");

impl WgpuBindGroupLayout {
    pub(crate) fn new(raw: wgpu::BindGroupLayout) -> Self {
        Self { raw }
    }

    /// The underlying `wgpu` layout.
    pub fn raw(&self) -> &wgpu::BindGroupLayout {
        &self.raw
    }
}

impl BindGroupLayout for WgpuBindGroupLayout {
    fn native_handle(&self) -> BindGroupLayoutHandle {
        BindGroupLayoutHandle::from_backend(&self.raw)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A `wgpu` bind group.
pub struct WgpuBindGroup {
    raw: wgpu::BindGroup,
}

downcast!(WgpuBindGroup, BindGroup, "bind group");

impl WgpuBindGroup {
    pub(crate) fn new(raw: wgpu::BindGroup) -> Self {
        Self { raw }
    }

    /// The underlying `wgpu` bind group.
    pub fn raw(&self) -> &wgpu::BindGroup {
        &self.raw
    }
}

impl BindGroup for WgpuBindGroup {
    fn native_handle(&self) -> BindGroupHandle {
        BindGroupHandle::from_backend(&self.raw)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
