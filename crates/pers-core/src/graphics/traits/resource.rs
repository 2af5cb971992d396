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

//! Defines the GPU resource traits: buffers, textures, views, samplers,
//! shader modules, pipelines and bind groups.

use crate::graphics::api::{
    BufferMapRange, BufferState, BufferUsage, MapMode, ShaderStage, TextureAspect, TextureDesc,
    TextureFormat, TextureViewDimension,
};
use crate::graphics::error::GraphicsResult;
use crate::graphics::handle::{
    BindGroupHandle, BindGroupLayoutHandle, BufferHandle, PipelineHandle, SamplerHandle,
    ShaderHandle, TextureHandle, TextureViewHandle,
};
use crate::sync::Completion;
use std::any::Any;

/// A linear block of GPU memory.
///
/// Buffers are shared through `Arc`; every method takes `&self` and
/// implementations guard their mutable state internally.
pub trait Buffer: Send + Sync + 'static {
    /// The debug label given at creation.
    fn label(&self) -> Option<&str>;

    /// Size in bytes.
    fn size(&self) -> u64;

    /// The usages the buffer was created with.
    fn usage(&self) -> BufferUsage;

    /// The current lifecycle state.
    fn state(&self) -> BufferState;

    /// Writes into the host range exposed by a mapped-at-creation buffer.
    ///
    /// ## Errors
    /// * `StateViolation` if the buffer is not mapped.
    /// * `InvalidArgument` if the write runs past the mapped range.
    fn write_mapped(&self, offset: u64, data: &[u8]) -> GraphicsResult<()>;

    /// Length of the currently mapped host range, if any.
    fn mapped_len(&self) -> Option<u64>;

    /// Releases the host mapping. A no-op when nothing is mapped.
    fn unmap(&self);

    /// Frees the GPU memory. The object stays alive but unusable.
    fn destroy(&self);

    /// The backend's opaque handle.
    fn native_handle(&self) -> BufferHandle;

    /// Allows downcasting to the backend type.
    fn as_any(&self) -> &dyn Any;
}

/// A buffer that can be mapped for host access after creation.
pub trait MappableBuffer: Buffer {
    /// Starts an asynchronous map of `range`.
    ///
    /// The returned completion resolves once the driver has signalled the
    /// map; it only makes progress while the device is polled (see
    /// [`poll`](Self::poll)).
    ///
    /// ## Errors
    /// * `StateViolation` if the buffer is already mapped or a map is pending.
    /// * `InvalidArgument` if the range is out of bounds or the mode does not
    ///   match the buffer's usage.
    fn map_async(
        &self,
        mode: MapMode,
        range: BufferMapRange,
    ) -> GraphicsResult<Completion<GraphicsResult<()>>>;

    /// Pumps device callbacks without blocking.
    fn poll(&self);

    /// Copies bytes out of the mapped range. `offset` is relative to the
    /// buffer start.
    fn read_mapped(&self, offset: u64, out: &mut [u8]) -> GraphicsResult<()>;

    /// Whether a map has been requested but not yet resolved.
    fn is_map_pending(&self) -> bool;

    /// Whether a host range is currently mapped.
    fn is_mapped(&self) -> bool;

    /// This buffer as a plain [`Buffer`].
    fn as_buffer(&self) -> &dyn Buffer;
}

/// A GPU texture.
pub trait Texture: Send + Sync + 'static {
    /// The descriptor the texture was created from.
    fn desc(&self) -> &TextureDesc;

    /// Image format.
    fn format(&self) -> TextureFormat {
        self.desc().format
    }

    /// Width of mip 0.
    fn width(&self) -> u32 {
        self.desc().width
    }

    /// Height of mip 0.
    fn height(&self) -> u32 {
        self.desc().height
    }

    /// The backend's opaque handle.
    fn native_handle(&self) -> TextureHandle;

    /// Allows downcasting to the backend type.
    fn as_any(&self) -> &dyn Any;
}

/// A view into a texture, usable as an attachment or a binding.
pub trait TextureView: Send + Sync + 'static {
    /// The debug label given at creation.
    fn label(&self) -> Option<&str>;
    /// Format the view interprets texels as.
    fn format(&self) -> TextureFormat;
    /// How the view addresses the texture.
    fn dimension(&self) -> TextureViewDimension;
    /// Which aspect of a depth/stencil texture is visible.
    fn aspect(&self) -> TextureAspect;
    /// Width of the viewed mip level.
    fn width(&self) -> u32;
    /// Height of the viewed mip level.
    fn height(&self) -> u32;
    /// Sample count of the underlying texture.
    fn sample_count(&self) -> u32;

    /// Whether the view belongs to an image acquired from a swapchain.
    fn is_swapchain_view(&self) -> bool {
        false
    }

    /// The backend's opaque handle.
    fn native_handle(&self) -> TextureViewHandle;
    /// Allows downcasting to the backend type.
    fn as_any(&self) -> &dyn Any;
}

/// A texture sampler.
pub trait Sampler: Send + Sync + 'static {
    /// The backend's opaque handle.
    fn native_handle(&self) -> SamplerHandle;
    /// Allows downcasting to the backend type.
    fn as_any(&self) -> &dyn Any;
}

/// A compiled shader module with a single entry point.
pub trait ShaderModule: Send + Sync + 'static {
    /// The debug label given at creation.
    fn label(&self) -> Option<&str>;
    /// Pipeline stage the entry point targets.
    fn stage(&self) -> ShaderStage;
    /// Entry point function name.
    fn entry_point(&self) -> &str;
    /// The backend's opaque handle.
    fn native_handle(&self) -> ShaderHandle;
    /// Allows downcasting to the backend type.
    fn as_any(&self) -> &dyn Any;
}

/// A compiled render pipeline.
///
/// The pipeline remembers the attachment formats it was built for so that
/// render passes can reject it when the framebuffer does not match.
pub trait RenderPipeline: Send + Sync + 'static {
    /// The debug label given at creation.
    fn label(&self) -> Option<&str>;
    /// Number of vertex buffer slots the pipeline reads.
    fn vertex_buffer_count(&self) -> u32;
    /// Color target formats, in attachment order.
    fn color_formats(&self) -> &[TextureFormat];
    /// Depth/stencil format, if the pipeline tests depth.
    fn depth_format(&self) -> Option<TextureFormat>;
    /// Sample count the pipeline rasterizes at.
    fn sample_count(&self) -> u32 {
        1
    }
    /// The backend's opaque handle.
    fn native_handle(&self) -> PipelineHandle;
    /// Allows downcasting to the backend type.
    fn as_any(&self) -> &dyn Any;
}

/// The layout of one bind group.
pub trait BindGroupLayout: Send + Sync + 'static {
    /// The backend's opaque handle.
    fn native_handle(&self) -> BindGroupLayoutHandle;
    /// Allows downcasting to the backend type.
    fn as_any(&self) -> &dyn Any;
}

/// A set of resources bound together at one group index.
pub trait BindGroup: Send + Sync + 'static {
    /// The backend's opaque handle.
    fn native_handle(&self) -> BindGroupHandle;
    /// Allows downcasting to the backend type.
    fn as_any(&self) -> &dyn Any;
}
