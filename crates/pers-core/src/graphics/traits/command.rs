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

//! Defines the command recording traits: [`CommandEncoder`],
//! [`RenderPassEncoder`] and [`CommandBuffer`].

use super::resource::{BindGroup, Buffer, MappableBuffer, RenderPipeline, TextureView};
use crate::graphics::api::{
    BufferCopyDesc, IndexFormat, RenderPassDesc, ResolvedCopy, ScissorRect, Viewport,
};
use crate::graphics::buffers::{DeferredStagingBuffer, DeviceBuffer, ImmediateStagingBuffer};
use crate::graphics::error::GraphicsResult;
use crate::graphics::handle::{CommandBufferHandle, CommandEncoderHandle};
use std::any::Any;
use std::sync::Arc;

/// A buffer argument to a copy, in whichever shape its owner holds it.
#[derive(Clone, Copy)]
pub enum BufferRef<'a> {
    /// A buffer that is never mapped after creation.
    Plain(&'a Arc<dyn Buffer>),
    /// A buffer that can be mapped for readback.
    Mappable(&'a Arc<dyn MappableBuffer>),
}

impl<'a> BufferRef<'a> {
    /// The buffer behind the reference.
    pub fn buffer(&self) -> &'a dyn Buffer {
        match *self {
            BufferRef::Plain(buffer) => buffer.as_ref(),
            BufferRef::Mappable(buffer) => buffer.as_buffer(),
        }
    }

    /// A strong reference suitable for keeping the buffer alive until the
    /// recorded commands have been submitted.
    pub fn retain(&self) -> RetainedResource {
        match *self {
            BufferRef::Plain(buffer) => RetainedResource::Buffer(Arc::clone(buffer)),
            BufferRef::Mappable(buffer) => RetainedResource::MappableBuffer(Arc::clone(buffer)),
        }
    }
}

/// A resource an encoder or command buffer keeps alive.
#[derive(Clone)]
pub enum RetainedResource {
    /// A plain buffer.
    Buffer(Arc<dyn Buffer>),
    /// A mappable buffer.
    MappableBuffer(Arc<dyn MappableBuffer>),
    /// An attachment view.
    TextureView(Arc<dyn TextureView>),
    /// A bound pipeline.
    Pipeline(Arc<dyn RenderPipeline>),
    /// A bound bind group.
    BindGroup(Arc<dyn BindGroup>),
}

/// Records GPU commands into a single command buffer.
///
/// An encoder is single-use: [`finish`](Self::finish) consumes it. A render
/// pass borrows the encoder mutably, so only one pass can be open at a time
/// and it must end before the encoder can finish.
pub trait CommandEncoder: Send {
    /// The debug label given at creation.
    fn label(&self) -> Option<&str>;

    /// Records a copy between two buffers whose range has already been
    /// resolved and checked.
    fn copy_buffer_to_buffer(
        &mut self,
        source: BufferRef<'_>,
        destination: BufferRef<'_>,
        copy: &ResolvedCopy,
    ) -> GraphicsResult<()>;

    /// Records an upload from a staging buffer into a device buffer.
    ///
    /// A staging buffer that is still mapped is finalized first, with a
    /// warning.
    fn upload_to_device_buffer(
        &mut self,
        staging: &ImmediateStagingBuffer,
        destination: &DeviceBuffer,
        copy: &BufferCopyDesc,
    ) -> GraphicsResult<()> {
        if !staging.is_finalized() {
            log::warn!(
                "CommandEncoder: staging buffer '{}' is still mapped, finalizing it before the upload",
                staging.label()
            );
            staging.finalize();
        }
        let resolved = copy
            .resolve(staging.size(), destination.size())
            .inspect_err(|e| log::error!("CommandEncoder: invalid upload: {e}"))?;
        self.copy_buffer_to_buffer(
            BufferRef::Plain(staging.buffer()),
            BufferRef::Plain(destination.buffer()),
            &resolved,
        )
    }

    /// Records a download from a device buffer into a readback buffer.
    ///
    /// A readback buffer that is mapped (or has a map pending) is unmapped
    /// first, with a warning.
    fn download_from_device_buffer(
        &mut self,
        source: &DeviceBuffer,
        readback: &DeferredStagingBuffer,
        copy: &BufferCopyDesc,
    ) -> GraphicsResult<()> {
        if readback.is_mapped() || readback.is_map_pending() {
            log::warn!(
                "CommandEncoder: readback buffer '{}' is mapped, unmapping it before the download",
                readback.label()
            );
            readback.unmap();
        }
        let resolved = copy
            .resolve(source.size(), readback.size())
            .inspect_err(|e| log::error!("CommandEncoder: invalid download: {e}"))?;
        self.copy_buffer_to_buffer(
            BufferRef::Plain(source.buffer()),
            BufferRef::Mappable(readback.buffer()),
            &resolved,
        )
    }

    /// Records a copy between two device buffers.
    fn copy_device_to_device(
        &mut self,
        source: &DeviceBuffer,
        destination: &DeviceBuffer,
        copy: &BufferCopyDesc,
    ) -> GraphicsResult<()> {
        let resolved = copy
            .resolve(source.size(), destination.size())
            .inspect_err(|e| log::error!("CommandEncoder: invalid device copy: {e}"))?;
        self.copy_buffer_to_buffer(
            BufferRef::Plain(source.buffer()),
            BufferRef::Plain(destination.buffer()),
            &resolved,
        )
    }

    /// Begins a render pass.
    ///
    /// The returned pass borrows the encoder until it is ended or dropped.
    ///
    /// ## Errors
    /// * `InvalidArgument` if the descriptor has no attachments or more
    ///   than eight color attachments.
    fn begin_render_pass<'encoder>(
        &'encoder mut self,
        desc: &RenderPassDesc,
    ) -> GraphicsResult<Box<dyn RenderPassEncoder + 'encoder>>;

    /// Finishes recording. The encoder is consumed.
    fn finish(self: Box<Self>) -> GraphicsResult<Box<dyn CommandBuffer>>;

    /// The backend's opaque handle.
    fn native_handle(&self) -> CommandEncoderHandle;
}

/// Records draw commands inside one render pass.
///
/// Draws are checked against the bound state before they are recorded: a
/// pipeline must be bound, every vertex slot it reads must have a buffer and
/// indexed draws need an index buffer. A draw that fails the check is skipped
/// with a warning.
pub trait RenderPassEncoder {
    /// Binds a pipeline. A pipeline whose formats do not match the pass's
    /// attachments is rejected with a warning.
    fn set_pipeline(&mut self, pipeline: &Arc<dyn RenderPipeline>);

    /// Binds a bind group at `index`.
    fn set_bind_group(&mut self, index: u32, bind_group: &Arc<dyn BindGroup>, dynamic_offsets: &[u32]);

    /// Binds a vertex buffer to `slot`. `size: None` binds to the end of the
    /// buffer.
    fn set_vertex_buffer(&mut self, slot: u32, buffer: &DeviceBuffer, offset: u64, size: Option<u64>);

    /// Binds the index buffer.
    fn set_index_buffer(
        &mut self,
        buffer: &DeviceBuffer,
        format: IndexFormat,
        offset: u64,
        size: Option<u64>,
    );

    /// Sets the viewport transform.
    fn set_viewport(&mut self, viewport: &Viewport);

    /// Sets the scissor rectangle.
    fn set_scissor_rect(&mut self, rect: &ScissorRect);

    /// Records a non-indexed draw.
    fn draw(&mut self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32);

    /// Records an indexed draw.
    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    );

    /// Ends the pass. Dropping the pass without ending it also ends it, but
    /// logs a warning.
    fn end(self: Box<Self>);
}

/// A finished, immutable list of commands ready for submission.
pub trait CommandBuffer: Send {
    /// The debug label of the encoder that produced it.
    fn label(&self) -> Option<&str>;
    /// The backend's opaque handle.
    fn native_handle(&self) -> CommandBufferHandle;
    /// Converts into the backend type for submission.
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}
