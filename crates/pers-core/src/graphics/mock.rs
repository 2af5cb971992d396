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

//! In-memory implementations of the graphics traits for unit tests.
//!
//! Buffers keep their bytes in host memory, maps resolve on the next
//! `poll()`, and copies recorded by [`MockEncoder`] are applied immediately.

use super::api::*;
use super::error::{GraphicsError, GraphicsResult};
use super::handle::*;
use super::pass_state::RenderPassState;
use super::swapchain::{PresentAction, ResizeAction, SwapChainState, SwapChainStateMachine};
use super::traits::*;
use crate::sync::{completion, Completer, Completion};
use parking_lot::Mutex;
use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

fn handle_of<K: HandleKind, T>(object: &T) -> Handle<K> {
    Handle::from_backend(object as *const T)
}

#[derive(Default)]
struct MapSlot {
    mapped: Option<(u64, u64)>,
    pending: Option<(Completer<GraphicsResult<()>>, u64, u64)>,
    destroyed: bool,
}

pub(crate) struct MockBuffer {
    desc: BufferDesc,
    contents: Mutex<Vec<u8>>,
    map: Mutex<MapSlot>,
}

impl MockBuffer {
    fn new(desc: &BufferDesc) -> Self {
        let map = MapSlot {
            mapped: desc.mapped_at_creation.then_some((0, desc.size)),
            ..Default::default()
        };
        Self {
            desc: desc.clone(),
            contents: Mutex::new(vec![0; desc.size as usize]),
            map: Mutex::new(map),
        }
    }

    fn of(buffer: &dyn Buffer) -> &MockBuffer {
        buffer
            .as_any()
            .downcast_ref::<MockBuffer>()
            .expect("not a mock buffer")
    }
}

impl Buffer for MockBuffer {
    fn label(&self) -> Option<&str> {
        self.desc.label.as_deref()
    }

    fn size(&self) -> u64 {
        self.desc.size
    }

    fn usage(&self) -> BufferUsage {
        self.desc.usage
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
        let Some((start, len)) = self.map.lock().mapped else {
            return Err(GraphicsError::state("buffer is not mapped"));
        };
        let end = match offset.checked_add(data.len() as u64) {
            Some(end) if offset >= start && end <= start + len => end,
            _ => return Err(GraphicsError::invalid("write outside the mapped range")),
        };
        self.contents.lock()[offset as usize..end as usize].copy_from_slice(data);
        Ok(())
    }

    fn mapped_len(&self) -> Option<u64> {
        self.map.lock().mapped.map(|(_, len)| len)
    }

    fn unmap(&self) {
        let mut map = self.map.lock();
        map.mapped = None;
        map.pending = None;
    }

    fn destroy(&self) {
        self.map.lock().destroyed = true;
    }

    fn native_handle(&self) -> BufferHandle {
        handle_of(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl MappableBuffer for MockBuffer {
    fn map_async(
        &self,
        mode: MapMode,
        range: BufferMapRange,
    ) -> GraphicsResult<Completion<GraphicsResult<()>>> {
        let required = match mode {
            MapMode::Read => BufferUsage::MAP_READ,
            MapMode::Write => BufferUsage::MAP_WRITE,
        };
        if !self.desc.usage.contains(required) {
            return Err(GraphicsError::invalid("map mode does not match usage"));
        }
        let (offset, len) = range.resolve(self.desc.size)?;
        let mut map = self.map.lock();
        if map.mapped.is_some() || map.pending.is_some() {
            return Err(GraphicsError::state("buffer is already mapped"));
        }
        let (completer, completion) = completion();
        map.pending = Some((completer, offset, len));
        Ok(completion)
    }

    fn poll(&self) {
        let mut map = self.map.lock();
        if let Some((completer, offset, len)) = map.pending.take() {
            map.mapped = Some((offset, len));
            drop(map);
            completer.complete(Ok(()));
        }
    }

    fn read_mapped(&self, offset: u64, out: &mut [u8]) -> GraphicsResult<()> {
        let Some((start, len)) = self.map.lock().mapped else {
            return Err(GraphicsError::state("buffer is not mapped"));
        };
        let end = match offset.checked_add(out.len() as u64) {
            Some(end) if offset >= start && end <= start + len => end,
            _ => return Err(GraphicsError::invalid("read outside the mapped range")),
        };
        out.copy_from_slice(&self.contents.lock()[offset as usize..end as usize]);
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

pub(crate) struct MockTexture {
    desc: TextureDesc,
}

impl Texture for MockTexture {
    fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    fn native_handle(&self) -> TextureHandle {
        handle_of(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) struct MockTextureView {
    label: Option<String>,
    format: TextureFormat,
    aspect: TextureAspect,
    width: u32,
    height: u32,
    sample_count: u32,
    swapchain: bool,
}

impl MockTextureView {
    pub(crate) fn new(format: TextureFormat, width: u32, height: u32, sample_count: u32) -> Arc<Self> {
        Arc::new(Self {
            label: None,
            format,
            aspect: TextureAspect::All,
            width,
            height,
            sample_count,
            swapchain: false,
        })
    }
}

impl TextureView for MockTextureView {
    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
    fn format(&self) -> TextureFormat {
        self.format
    }
    fn dimension(&self) -> TextureViewDimension {
        TextureViewDimension::D2
    }
    fn aspect(&self) -> TextureAspect {
        self.aspect
    }
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }
    fn sample_count(&self) -> u32 {
        self.sample_count
    }
    fn is_swapchain_view(&self) -> bool {
        self.swapchain
    }
    fn native_handle(&self) -> TextureViewHandle {
        handle_of(self)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct MockSampler;

impl Sampler for MockSampler {
    fn native_handle(&self) -> SamplerHandle {
        handle_of(self)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) struct MockShader {
    label: Option<String>,
    stage: ShaderStage,
    entry_point: String,
}

impl MockShader {
    pub(crate) fn new(stage: ShaderStage) -> Arc<Self> {
        Arc::new(Self {
            label: None,
            stage,
            entry_point: "main".to_owned(),
        })
    }
}

impl ShaderModule for MockShader {
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
        handle_of(self)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) struct MockPipeline {
    color_formats: Vec<TextureFormat>,
    depth_format: Option<TextureFormat>,
    vertex_buffer_count: u32,
    sample_count: u32,
}

impl MockPipeline {
    pub(crate) fn new(
        color_formats: Vec<TextureFormat>,
        depth_format: Option<TextureFormat>,
        vertex_buffer_count: u32,
    ) -> Arc<Self> {
        Arc::new(Self {
            color_formats,
            depth_format,
            vertex_buffer_count,
            sample_count: 1,
        })
    }
}

impl RenderPipeline for MockPipeline {
    fn label(&self) -> Option<&str> {
        None
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
        handle_of(self)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct MockBindGroupLayout;

impl BindGroupLayout for MockBindGroupLayout {
    fn native_handle(&self) -> BindGroupLayoutHandle {
        handle_of(self)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct MockBindGroup;

impl BindGroup for MockBindGroup {
    fn native_handle(&self) -> BindGroupHandle {
        handle_of(self)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A factory whose resources live in host memory.
#[derive(Default)]
pub(crate) struct MockFactory {
    textures: Mutex<Vec<(String, TextureUsage)>>,
    fail_textures: AtomicBool,
}

impl MockFactory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn buffer_contents(&self, buffer: &dyn Buffer) -> Vec<u8> {
        MockBuffer::of(buffer).contents.lock().clone()
    }

    pub(crate) fn set_buffer_contents(&self, buffer: &dyn Buffer, bytes: &[u8]) {
        MockBuffer::of(buffer).contents.lock()[..bytes.len()].copy_from_slice(bytes);
    }

    pub(crate) fn texture_labels(&self) -> Vec<String> {
        self.textures.lock().iter().map(|(label, _)| label.clone()).collect()
    }

    pub(crate) fn texture_usages(&self) -> Vec<TextureUsage> {
        self.textures.lock().iter().map(|(_, usage)| *usage).collect()
    }

    pub(crate) fn texture_count(&self) -> usize {
        self.textures.lock().len()
    }

    pub(crate) fn fail_textures(&self, fail: bool) {
        self.fail_textures.store(fail, Ordering::SeqCst);
    }
}

impl ResourceFactory for MockFactory {
    fn create_buffer(&self, desc: &BufferDesc) -> GraphicsResult<Arc<dyn Buffer>> {
        desc.validate()?;
        Ok(Arc::new(MockBuffer::new(desc)))
    }

    fn create_initializable_device_buffer(
        &self,
        desc: &BufferDesc,
        data: &[u8],
    ) -> GraphicsResult<Arc<dyn Buffer>> {
        desc.validate()?;
        let buffer = MockBuffer::new(desc);
        buffer.contents.lock()[..data.len()].copy_from_slice(data);
        Ok(Arc::new(buffer))
    }

    fn create_mappable_buffer(&self, desc: &BufferDesc) -> GraphicsResult<Arc<dyn MappableBuffer>> {
        desc.validate()?;
        Ok(Arc::new(MockBuffer::new(desc)))
    }

    fn create_texture(&self, desc: &TextureDesc) -> GraphicsResult<Arc<dyn Texture>> {
        desc.validate()?;
        if self.fail_textures.load(Ordering::SeqCst) {
            return Err(GraphicsError::AllocationFailed("mock texture failure".to_owned()));
        }
        self.textures
            .lock()
            .push((desc.label.clone().unwrap_or_default(), desc.usage));
        Ok(Arc::new(MockTexture { desc: desc.clone() }))
    }

    fn create_texture_view(
        &self,
        texture: &Arc<dyn Texture>,
        desc: &TextureViewDesc,
    ) -> GraphicsResult<Arc<dyn TextureView>> {
        let (width, height, _) = texture.desc().mip_extent(desc.base_mip_level);
        Ok(Arc::new(MockTextureView {
            label: desc.label.clone(),
            format: desc.format.unwrap_or(texture.format()),
            aspect: desc.aspect,
            width,
            height,
            sample_count: texture.desc().sample_count,
            swapchain: false,
        }))
    }

    fn create_sampler(&self, _desc: &SamplerDesc) -> GraphicsResult<Arc<dyn Sampler>> {
        Ok(Arc::new(MockSampler))
    }

    fn create_shader_module(&self, desc: &ShaderModuleDesc) -> GraphicsResult<Arc<dyn ShaderModule>> {
        Ok(Arc::new(MockShader {
            label: desc.label.clone(),
            stage: desc.stage,
            entry_point: desc.entry_point.clone(),
        }))
    }

    fn create_render_pipeline(
        &self,
        desc: &RenderPipelineDesc,
    ) -> GraphicsResult<Arc<dyn RenderPipeline>> {
        desc.validate()?;
        Ok(Arc::new(MockPipeline {
            color_formats: desc.color_targets.iter().map(|t| t.format).collect(),
            depth_format: desc.depth_stencil.map(|ds| ds.format),
            vertex_buffer_count: desc.vertex_layouts.len() as u32,
            sample_count: desc.multisample.count,
        }))
    }

    fn create_bind_group_layout(
        &self,
        desc: &BindGroupLayoutDesc,
    ) -> GraphicsResult<Arc<dyn BindGroupLayout>> {
        desc.validate()?;
        Ok(Arc::new(MockBindGroupLayout))
    }

    fn create_bind_group(&self, _desc: &BindGroupDesc) -> GraphicsResult<Arc<dyn BindGroup>> {
        Ok(Arc::new(MockBindGroup))
    }
}

/// An encoder that applies copies as soon as they are recorded.
#[derive(Default)]
pub(crate) struct MockEncoder {
    copies: Vec<(u64, u64, u64)>,
    draws: u32,
}

impl MockEncoder {
    pub(crate) fn new(_factory: &MockFactory) -> Self {
        Self::default()
    }

    pub(crate) fn copies(&self) -> Vec<(u64, u64, u64)> {
        self.copies.clone()
    }

    pub(crate) fn draws(&self) -> u32 {
        self.draws
    }
}

impl CommandEncoder for MockEncoder {
    fn label(&self) -> Option<&str> {
        None
    }

    fn copy_buffer_to_buffer(
        &mut self,
        source: BufferRef<'_>,
        destination: BufferRef<'_>,
        copy: &ResolvedCopy,
    ) -> GraphicsResult<()> {
        let src = MockBuffer::of(source.buffer());
        let dst = MockBuffer::of(destination.buffer());
        let bytes = src.contents.lock()
            [copy.src_offset as usize..(copy.src_offset + copy.size) as usize]
            .to_vec();
        dst.contents.lock()[copy.dst_offset as usize..(copy.dst_offset + copy.size) as usize]
            .copy_from_slice(&bytes);
        self.copies.push((copy.src_offset, copy.dst_offset, copy.size));
        Ok(())
    }

    fn begin_render_pass<'encoder>(
        &'encoder mut self,
        desc: &RenderPassDesc,
    ) -> GraphicsResult<Box<dyn RenderPassEncoder + 'encoder>> {
        Ok(Box::new(MockRenderPass {
            state: RenderPassState::new(desc),
            draws: &mut self.draws,
        }))
    }

    fn finish(self: Box<Self>) -> GraphicsResult<Box<dyn CommandBuffer>> {
        Ok(Box::new(MockCommandBuffer))
    }

    fn native_handle(&self) -> CommandEncoderHandle {
        handle_of(self)
    }
}

struct MockRenderPass<'e> {
    state: RenderPassState,
    draws: &'e mut u32,
}

impl RenderPassEncoder for MockRenderPass<'_> {
    fn set_pipeline(&mut self, pipeline: &Arc<dyn RenderPipeline>) {
        let _ = self.state.bind_pipeline(pipeline.as_ref());
    }

    fn set_bind_group(&mut self, _index: u32, _bind_group: &Arc<dyn BindGroup>, _offsets: &[u32]) {}

    fn set_vertex_buffer(&mut self, slot: u32, _buffer: &super::DeviceBuffer, _offset: u64, _size: Option<u64>) {
        let _ = self.state.bind_vertex_buffer(slot);
    }

    fn set_index_buffer(
        &mut self,
        _buffer: &super::DeviceBuffer,
        format: IndexFormat,
        _offset: u64,
        _size: Option<u64>,
    ) {
        self.state.bind_index_buffer(format);
    }

    fn set_viewport(&mut self, _viewport: &Viewport) {}

    fn set_scissor_rect(&mut self, _rect: &ScissorRect) {}

    fn draw(&mut self, _vertex_count: u32, _instance_count: u32, _first_vertex: u32, _first_instance: u32) {
        if self.state.check_draw().is_ok() {
            *self.draws += 1;
        }
    }

    fn draw_indexed(
        &mut self,
        _index_count: u32,
        _instance_count: u32,
        _first_index: u32,
        _base_vertex: i32,
        _first_instance: u32,
    ) {
        if self.state.check_draw_indexed().is_ok() {
            *self.draws += 1;
        }
    }

    fn end(self: Box<Self>) {}
}

struct MockCommandBuffer;

impl CommandBuffer for MockCommandBuffer {
    fn label(&self) -> Option<&str> {
        None
    }
    fn native_handle(&self) -> CommandBufferHandle {
        handle_of(self)
    }
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

#[derive(Default)]
pub(crate) struct MockQueue {
    submitted: AtomicUsize,
}

impl MockQueue {
    pub(crate) fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }
}

impl Queue for MockQueue {
    fn submit_batch(&self, command_buffers: Vec<Box<dyn CommandBuffer>>) -> GraphicsResult<()> {
        self.submitted.fetch_add(command_buffers.len(), Ordering::SeqCst);
        Ok(())
    }

    fn write_buffer(&self, write: &BufferWriteDesc<'_>) -> GraphicsResult<()> {
        write.validate()?;
        let start = write.offset as usize;
        MockBuffer::of(write.buffer).contents.lock()[start..start + write.data.len()]
            .copy_from_slice(write.data);
        Ok(())
    }

    fn write_texture(&self, _texture: &Arc<dyn Texture>, _data: &[u8], _mip_level: u32) -> GraphicsResult<()> {
        Ok(())
    }

    fn wait_idle(&self) -> bool {
        true
    }

    fn native_handle(&self) -> QueueHandle {
        handle_of(self)
    }
}

pub(crate) struct MockSurface;

impl MockSurface {
    pub(crate) fn new() -> Arc<dyn Surface> {
        Arc::new(MockSurface)
    }
}

impl Surface for MockSurface {
    fn label(&self) -> &str {
        "Mock Surface"
    }
    fn native_handle(&self) -> SurfaceHandle {
        handle_of(self)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A swapchain driven by the shared state machine, with images that are
/// always ready.
pub(crate) struct MockSwapChain {
    desc: Mutex<SwapChainDesc>,
    machine: Mutex<SwapChainStateMachine>,
    current: Mutex<Option<Arc<dyn TextureView>>>,
    presents: AtomicUsize,
    configures: AtomicUsize,
}

impl MockSwapChain {
    pub(crate) fn new(desc: SwapChainDesc) -> Arc<Self> {
        let mut machine = SwapChainStateMachine::new(desc.width, desc.height);
        let _ = machine.configured();
        Arc::new(Self {
            desc: Mutex::new(desc),
            machine: Mutex::new(machine),
            current: Mutex::new(None),
            presents: AtomicUsize::new(0),
            configures: AtomicUsize::new(1),
        })
    }

    pub(crate) fn present_count(&self) -> usize {
        self.presents.load(Ordering::SeqCst)
    }

    pub(crate) fn configure_count(&self) -> usize {
        self.configures.load(Ordering::SeqCst)
    }

    fn image(&self) -> Arc<dyn TextureView> {
        let desc = self.desc.lock();
        Arc::new(MockTextureView {
            label: Some("SwapChainImage".to_owned()),
            format: desc.format,
            aspect: TextureAspect::All,
            width: desc.width,
            height: desc.height,
            sample_count: 1,
            swapchain: true,
        })
    }
}

impl SwapChain for MockSwapChain {
    fn desc(&self) -> SwapChainDesc {
        self.desc.lock().clone()
    }

    fn state(&self) -> SwapChainState {
        self.machine.lock().state()
    }

    fn acquire_next_image(&self) -> Option<Arc<dyn TextureView>> {
        let mut machine = self.machine.lock();
        if machine.begin_acquire().ok()? {
            self.current.lock().take();
        }
        machine.on_acquire(super::swapchain::AcquireStatus::Optimal);
        let view = self.image();
        *self.current.lock() = Some(Arc::clone(&view));
        Some(view)
    }

    fn current_view(&self) -> Option<Arc<dyn TextureView>> {
        self.current.lock().clone()
    }

    fn present(&self) {
        let action = self.machine.lock().present();
        if action != PresentAction::Skip {
            self.current.lock().take();
            self.presents.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn resize(&self, width: u32, height: u32) -> GraphicsResult<()> {
        let mut machine = self.machine.lock();
        if let ResizeAction::Reconfigure { .. } = machine.resize(width, height) {
            self.current.lock().take();
            let mut desc = self.desc.lock();
            desc.width = width;
            desc.height = height;
            self.configures.fetch_add(1, Ordering::SeqCst);
            machine.configured()?;
        }
        Ok(())
    }

    fn destroy(&self) {
        self.machine.lock().destroy();
        self.current.lock().take();
    }

    fn native_handle(&self) -> SwapChainHandle {
        handle_of(self)
    }
}

/// A device backed by [`MockFactory`] and [`MockQueue`].
pub(crate) struct MockDevice {
    factory: Arc<MockFactory>,
    queue: Arc<MockQueue>,
}

impl MockDevice {
    #[allow(clippy::new_ret_no_self)]
    pub(crate) fn new() -> Arc<dyn LogicalDevice> {
        Arc::new(Self {
            factory: Arc::new(MockFactory::new()),
            queue: Arc::new(MockQueue::default()),
        })
    }
}

impl LogicalDevice for MockDevice {
    fn queue(&self) -> Arc<dyn Queue> {
        self.queue.clone()
    }

    fn resource_factory(&self) -> Arc<dyn ResourceFactory> {
        self.factory.clone()
    }

    fn create_command_encoder(&self, _label: Option<&str>) -> GraphicsResult<Box<dyn CommandEncoder>> {
        Ok(Box::new(MockEncoder::default()))
    }

    fn create_swap_chain(
        &self,
        _surface: &Arc<dyn Surface>,
        desc: &SwapChainDesc,
    ) -> GraphicsResult<Arc<dyn SwapChain>> {
        Ok(MockSwapChain::new(desc.clone()))
    }

    fn wait_idle(&self) -> bool {
        true
    }

    fn physical_device(&self) -> Option<Arc<dyn PhysicalDevice>> {
        None
    }

    fn is_lost(&self) -> bool {
        false
    }

    fn native_handle(&self) -> DeviceHandle {
        handle_of(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Reaches the mock internals behind a `dyn LogicalDevice`.
pub(crate) trait MockDeviceExt {
    fn mock_factory(&self) -> &MockFactory;
    fn mock_queue(&self) -> &MockQueue;
}

impl MockDeviceExt for Arc<dyn LogicalDevice> {
    fn mock_factory(&self) -> &MockFactory {
        &self
            .as_any()
            .downcast_ref::<MockDevice>()
            .expect("not a mock device")
            .factory
    }

    fn mock_queue(&self) -> &MockQueue {
        &self
            .as_any()
            .downcast_ref::<MockDevice>()
            .expect("not a mock device")
            .queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::buffers::{DeviceBuffer, ImmediateStagingBuffer};

    #[test]
    fn upload_then_draw_through_the_traits() {
        let device = MockDevice::new();
        let factory = device.resource_factory();
        let staging = ImmediateStagingBuffer::create(factory.as_ref(), 16, Some("Upload")).unwrap();
        staging.write(&[1u32, 2, 3, 4], 0).unwrap();
        let vertices =
            DeviceBuffer::create(factory.as_ref(), &BufferDesc::new(16, BufferUsage::VERTEX)).unwrap();

        let mut encoder = MockEncoder::default();
        encoder
            .upload_to_device_buffer(&staging, &vertices, &BufferCopyDesc::whole())
            .unwrap();
        assert!(staging.is_finalized());
        assert_eq!(
            device.mock_factory().buffer_contents(vertices.buffer().as_ref()),
            bytemuck::cast_slice::<u32, u8>(&[1, 2, 3, 4]).to_vec()
        );

        let target = MockTextureView::new(TextureFormat::Rgba8Unorm, 4, 4, 1);
        let desc = RenderPassDesc {
            color_attachments: vec![RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                load_op: LoadOp::Clear,
                store_op: StoreOp::Store,
                clear_color: Color::BLACK,
            }],
            ..Default::default()
        };
        let pipeline: Arc<dyn RenderPipeline> =
            MockPipeline::new(vec![TextureFormat::Rgba8Unorm], None, 1);
        {
            let mut pass = encoder.begin_render_pass(&desc).unwrap();
            pass.draw(3, 1, 0, 0);
            pass.set_pipeline(&pipeline);
            pass.draw(3, 1, 0, 0);
            pass.set_vertex_buffer(0, &vertices, 0, None);
            pass.draw(3, 1, 0, 0);
            pass.draw_indexed(3, 1, 0, 0, 0);
            pass.end();
        }
        assert_eq!(encoder.draws(), 1);

        let queue = device.queue();
        queue.submit(Box::new(encoder).finish().unwrap()).unwrap();
        queue.submit_batch(Vec::new()).unwrap();
        assert_eq!(device.mock_queue().submitted(), 1);
    }

    #[test]
    fn queue_writes_are_bounds_checked() {
        let device = MockDevice::new();
        let buffer = DeviceBuffer::create(
            device.resource_factory().as_ref(),
            &BufferDesc::new(8, BufferUsage::UNIFORM),
        )
        .unwrap();
        let queue = device.queue();
        let write = |offset, data: &[u8]| {
            queue.write_buffer(&BufferWriteDesc {
                buffer: buffer.buffer().as_ref(),
                offset,
                data,
            })
        };
        assert!(write(4, &[1, 2, 3, 4]).is_ok());
        assert!(write(8, &[1, 2, 3, 4]).is_err());
        assert!(write(2, &[1, 2, 3, 4]).is_err());
        assert!(matches!(
            write(u64::MAX - 3, &[1, 2, 3, 4]),
            Err(GraphicsError::InvalidArgument(_))
        ));
        assert_eq!(
            device.mock_factory().buffer_contents(buffer.buffer().as_ref()),
            vec![0, 0, 0, 0, 1, 2, 3, 4]
        );
    }
}
