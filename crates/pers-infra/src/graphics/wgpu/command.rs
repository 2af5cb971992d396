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

//! Defines the `wgpu` command recording types: [`WgpuCommandEncoder`],
//! [`WgpuRenderPassEncoder`] and [`WgpuCommandBuffer`].

use super::conversions::{operations, IntoWgpu};
use super::resources::{WgpuBindGroup, WgpuBuffer, WgpuRenderPipeline, WgpuTextureView};
use pers_core::graphics::api::{
    BufferState, BufferUsage, IndexFormat, RenderPassDesc, ResolvedCopy, ScissorRect, Viewport,
    MAX_COLOR_ATTACHMENTS,
};
use pers_core::graphics::buffers::DeviceBuffer;
use pers_core::graphics::error::{GraphicsError, GraphicsResult};
use pers_core::graphics::handle::{CommandBufferHandle, CommandEncoderHandle};
use pers_core::graphics::pass_state::RenderPassState;
use pers_core::graphics::traits::{
    BindGroup, Buffer, BufferRef, CommandBuffer, CommandEncoder, RenderPassEncoder,
    RenderPipeline, RetainedResource,
};
use std::any::Any;
use std::sync::Arc;

/// Checks the attachment counts of a render pass before it is opened.
pub fn validate_pass_desc(desc: &RenderPassDesc) -> GraphicsResult<()> {
    let label = desc.label.as_deref().unwrap_or("<unnamed>");
    if desc.color_attachments.is_empty() && desc.depth_stencil_attachment.is_none() {
        return Err(GraphicsError::invalid(format!(
            "render pass '{label}' has no attachments"
        )));
    }
    if desc.color_attachments.len() > MAX_COLOR_ATTACHMENTS {
        return Err(GraphicsError::invalid(format!(
            "render pass '{label}' has {} color attachments, at most {MAX_COLOR_ATTACHMENTS} are allowed",
            desc.color_attachments.len()
        )));
    }
    Ok(())
}

fn check_copy_side(buffer: &dyn Buffer, needed: BufferUsage, role: &str) -> GraphicsResult<()> {
    let label = buffer.label().unwrap_or("<unnamed>");
    if !buffer.usage().contains(needed) {
        return Err(GraphicsError::invalid(format!(
            "copy {role} '{label}' lacks {needed:?} usage"
        )));
    }
    match buffer.state() {
        BufferState::Destroyed => Err(GraphicsError::state(format!(
            "copy {role} '{label}' has been destroyed"
        ))),
        BufferState::Mapped | BufferState::MapPending => Err(GraphicsError::state(format!(
            "copy {role} '{label}' is mapped"
        ))),
        _ => Ok(()),
    }
}

/// Records commands into one `wgpu::CommandEncoder`.
pub struct WgpuCommandEncoder {
    raw: wgpu::CommandEncoder,
    label: Option<String>,
    retained: Vec<RetainedResource>,
}

impl WgpuCommandEncoder {
    /// Opens a new encoder on `device`.
    pub fn new(device: &wgpu::Device, label: Option<&str>) -> Self {
        let raw = device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label });
        Self {
            raw,
            label: label.map(str::to_owned),
            retained: Vec::new(),
        }
    }
}

impl CommandEncoder for WgpuCommandEncoder {
    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn copy_buffer_to_buffer(
        &mut self,
        source: BufferRef<'_>,
        destination: BufferRef<'_>,
        copy: &ResolvedCopy,
    ) -> GraphicsResult<()> {
        check_copy_side(source.buffer(), BufferUsage::COPY_SRC, "source")
            .and_then(|_| check_copy_side(destination.buffer(), BufferUsage::COPY_DST, "destination"))
            .inspect_err(|e| log::error!("WgpuCommandEncoder: {e}"))?;
        let src = WgpuBuffer::of(source.buffer())?;
        let dst = WgpuBuffer::of(destination.buffer())?;
        log::trace!(
            "WgpuCommandEncoder: copying {} bytes from '{}'+{} to '{}'+{}",
            copy.size,
            source.buffer().label().unwrap_or("<unnamed>"),
            copy.src_offset,
            destination.buffer().label().unwrap_or("<unnamed>"),
            copy.dst_offset
        );
        self.raw.copy_buffer_to_buffer(
            src.raw(),
            copy.src_offset,
            dst.raw(),
            copy.dst_offset,
            copy.size,
        );
        self.retained.push(source.retain());
        self.retained.push(destination.retain());
        Ok(())
    }

    fn begin_render_pass<'encoder>(
        &'encoder mut self,
        desc: &RenderPassDesc,
    ) -> GraphicsResult<Box<dyn RenderPassEncoder + 'encoder>> {
        validate_pass_desc(desc).inspect_err(|e| log::error!("WgpuCommandEncoder: {e}"))?;

        let mut color_attachments = Vec::with_capacity(desc.color_attachments.len());
        for attachment in &desc.color_attachments {
            let view = WgpuTextureView::of(attachment.view.as_ref())?;
            let resolve_target = attachment
                .resolve_target
                .as_ref()
                .map(|target| WgpuTextureView::of(target.as_ref()).map(WgpuTextureView::raw))
                .transpose()?;
            let clear = attachment.clear_color;
            color_attachments.push(Some(wgpu::RenderPassColorAttachment {
                view: view.raw(),
                resolve_target,
                ops: operations(
                    attachment.load_op,
                    attachment.store_op,
                    wgpu::Color {
                        r: clear.r,
                        g: clear.g,
                        b: clear.b,
                        a: clear.a,
                    },
                ),
                depth_slice: None,
            }));
        }

        let depth_stencil_attachment = match &desc.depth_stencil_attachment {
            Some(attachment) => {
                let view = WgpuTextureView::of(attachment.view.as_ref())?;
                let format = attachment.view.format();
                let depth_ops = (format.has_depth() && !attachment.depth_read_only).then(|| {
                    operations(
                        attachment.depth_load_op,
                        attachment.depth_store_op,
                        attachment.depth_clear_value,
                    )
                });
                let stencil_ops = (format.has_stencil() && !attachment.stencil_read_only).then(|| {
                    operations(
                        attachment.stencil_load_op,
                        attachment.stencil_store_op,
                        attachment.stencil_clear_value,
                    )
                });
                Some(wgpu::RenderPassDepthStencilAttachment {
                    view: view.raw(),
                    depth_ops,
                    stencil_ops,
                })
            }
            None => None,
        };

        let state = RenderPassState::new(desc);
        let Self { raw, retained, .. } = self;
        for attachment in &desc.color_attachments {
            retained.push(RetainedResource::TextureView(Arc::clone(&attachment.view)));
            if let Some(target) = &attachment.resolve_target {
                retained.push(RetainedResource::TextureView(Arc::clone(target)));
            }
        }
        if let Some(attachment) = &desc.depth_stencil_attachment {
            retained.push(RetainedResource::TextureView(Arc::clone(&attachment.view)));
        }

        log::trace!("WgpuCommandEncoder: beginning render pass {desc:?}");
        let pass = raw.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: desc.label.as_deref(),
            color_attachments: &color_attachments,
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        Ok(Box::new(WgpuRenderPassEncoder {
            pass: Some(pass),
            state,
            retained,
            label: desc.label.clone(),
            ended: false,
        }))
    }

    fn finish(self: Box<Self>) -> GraphicsResult<Box<dyn CommandBuffer>> {
        let Self {
            raw,
            label,
            retained,
        } = *self;
        log::trace!(
            "WgpuCommandEncoder: finishing '{}' with {} retained resource(s)",
            label.as_deref().unwrap_or("<unnamed>"),
            retained.len()
        );
        Ok(Box::new(WgpuCommandBuffer {
            raw: raw.finish(),
            label,
            retained,
        }))
    }

    fn native_handle(&self) -> CommandEncoderHandle {
        CommandEncoderHandle::from_backend(&self.raw)
    }
}

/// An open render pass. It borrows its encoder until it ends.
pub struct WgpuRenderPassEncoder<'encoder> {
    pass: Option<wgpu::RenderPass<'encoder>>,
    state: RenderPassState,
    retained: &'encoder mut Vec<RetainedResource>,
    label: Option<String>,
    ended: bool,
}

impl WgpuRenderPassEncoder<'_> {
    fn name(&self) -> &str {
        self.label.as_deref().unwrap_or("<unnamed>")
    }

    fn buffer_slice<'b>(
        &self,
        buffer: &'b DeviceBuffer,
        offset: u64,
        size: Option<u64>,
        role: &str,
    ) -> GraphicsResult<wgpu::BufferSlice<'b>> {
        let raw = WgpuBuffer::of(buffer.buffer().as_ref())?.raw();
        let end = match size {
            Some(size) => offset.checked_add(size),
            None => Some(buffer.size()),
        };
        match end {
            Some(end) if offset < end && end <= buffer.size() => Ok(raw.slice(offset..end)),
            _ => Err(GraphicsError::invalid(format!(
                "{role} binding at offset {offset} with size {size:?} does not fit '{}' ({} bytes)",
                buffer.label(),
                buffer.size()
            ))),
        }
    }
}

impl RenderPassEncoder for WgpuRenderPassEncoder<'_> {
    fn set_pipeline(&mut self, pipeline: &Arc<dyn RenderPipeline>) {
        if let Err(e) = self.state.bind_pipeline(pipeline.as_ref()) {
            log::warn!("WgpuRenderPassEncoder: pass '{}': {e}", self.name());
            return;
        }
        let wgpu_pipeline = match WgpuRenderPipeline::of(pipeline.as_ref()) {
            Ok(p) => p,
            Err(e) => {
                log::error!("WgpuRenderPassEncoder: {e}");
                return;
            }
        };
        if let Some(pass) = self.pass.as_mut() {
            pass.set_pipeline(wgpu_pipeline.raw());
            self.retained.push(RetainedResource::Pipeline(Arc::clone(pipeline)));
        }
    }

    fn set_bind_group(&mut self, index: u32, bind_group: &Arc<dyn BindGroup>, dynamic_offsets: &[u32]) {
        let group = match WgpuBindGroup::of(bind_group.as_ref()) {
            Ok(g) => g,
            Err(e) => {
                log::error!("WgpuRenderPassEncoder: {e}");
                return;
            }
        };
        if let Some(pass) = self.pass.as_mut() {
            pass.set_bind_group(index, group.raw(), dynamic_offsets);
            self.retained.push(RetainedResource::BindGroup(Arc::clone(bind_group)));
        }
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &DeviceBuffer, offset: u64, size: Option<u64>) {
        if !buffer.usage().contains(BufferUsage::VERTEX) {
            log::warn!(
                "WgpuRenderPassEncoder: '{}' is not a vertex buffer, ignoring slot {slot}",
                buffer.label()
            );
            return;
        }
        let slice = match self.buffer_slice(buffer, offset, size, "vertex buffer") {
            Ok(slice) => slice,
            Err(e) => {
                log::warn!("WgpuRenderPassEncoder: {e}");
                return;
            }
        };
        if let Err(e) = self.state.bind_vertex_buffer(slot) {
            log::warn!("WgpuRenderPassEncoder: {e}");
            return;
        }
        if let Some(pass) = self.pass.as_mut() {
            pass.set_vertex_buffer(slot, slice);
            self.retained.push(RetainedResource::Buffer(Arc::clone(buffer.buffer())));
        }
    }

    fn set_index_buffer(
        &mut self,
        buffer: &DeviceBuffer,
        format: IndexFormat,
        offset: u64,
        size: Option<u64>,
    ) {
        if !buffer.usage().contains(BufferUsage::INDEX) {
            log::warn!(
                "WgpuRenderPassEncoder: '{}' is not an index buffer, ignoring it",
                buffer.label()
            );
            return;
        }
        let slice = match self.buffer_slice(buffer, offset, size, "index buffer") {
            Ok(slice) => slice,
            Err(e) => {
                log::warn!("WgpuRenderPassEncoder: {e}");
                return;
            }
        };
        self.state.bind_index_buffer(format);
        if let Some(pass) = self.pass.as_mut() {
            pass.set_index_buffer(slice, format.into_wgpu());
            self.retained.push(RetainedResource::Buffer(Arc::clone(buffer.buffer())));
        }
    }

    fn set_viewport(&mut self, viewport: &Viewport) {
        if let Some(pass) = self.pass.as_mut() {
            pass.set_viewport(
                viewport.x,
                viewport.y,
                viewport.width,
                viewport.height,
                viewport.min_depth,
                viewport.max_depth,
            );
        }
    }

    fn set_scissor_rect(&mut self, rect: &ScissorRect) {
        if let Some(pass) = self.pass.as_mut() {
            pass.set_scissor_rect(rect.x, rect.y, rect.width, rect.height);
        }
    }

    fn draw(&mut self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32) {
        if let Err(e) = self.state.check_draw() {
            log::warn!("WgpuRenderPassEncoder: pass '{}': skipping draw: {e}", self.name());
            return;
        }
        if let Some(pass) = self.pass.as_mut() {
            pass.draw(
                first_vertex..first_vertex.saturating_add(vertex_count),
                first_instance..first_instance.saturating_add(instance_count),
            );
        }
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    ) {
        if let Err(e) = self.state.check_draw_indexed() {
            log::warn!(
                "WgpuRenderPassEncoder: pass '{}': skipping indexed draw: {e}",
                self.name()
            );
            return;
        }
        if let Some(pass) = self.pass.as_mut() {
            pass.draw_indexed(
                first_index..first_index.saturating_add(index_count),
                base_vertex,
                first_instance..first_instance.saturating_add(instance_count),
            );
        }
    }

    fn end(mut self: Box<Self>) {
        self.ended = true;
        self.pass = None;
    }
}

impl Drop for WgpuRenderPassEncoder<'_> {
    fn drop(&mut self) {
        if !self.ended {
            log::warn!(
                "WgpuRenderPassEncoder: pass '{}' dropped without end(), ending it implicitly",
                self.name()
            );
        }
    }
}

/// A finished `wgpu` command buffer and the resources it references.
pub struct WgpuCommandBuffer {
    raw: wgpu::CommandBuffer,
    label: Option<String>,
    retained: Vec<RetainedResource>,
}

impl WgpuCommandBuffer {
    /// Splits into the raw buffer for submission and the resources that
    /// must outlive it.
    pub fn into_parts(self) -> (wgpu::CommandBuffer, Vec<RetainedResource>) {
        (self.raw, self.retained)
    }
}

impl CommandBuffer for WgpuCommandBuffer {
    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn native_handle(&self) -> CommandBufferHandle {
        CommandBufferHandle::from_backend(&self.raw)
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_without_attachments_is_rejected() {
        let desc = RenderPassDesc {
            label: Some("empty".into()),
            ..Default::default()
        };
        assert!(matches!(
            validate_pass_desc(&desc),
            Err(GraphicsError::InvalidArgument(_))
        ));
    }
}
