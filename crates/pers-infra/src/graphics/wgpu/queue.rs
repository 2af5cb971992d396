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

//! Defines [`WgpuQueue`], the device's single submission queue.

use super::command::WgpuCommandBuffer;
use super::conversions::IntoWgpu;
use super::resources::{WgpuBuffer, WgpuTexture};
use pers_core::graphics::api::{BufferUsage, BufferWriteDesc, TextureAspect, TextureDesc, TextureUsage};
use pers_core::graphics::error::{GraphicsError, GraphicsResult};
use pers_core::graphics::handle::QueueHandle;
use pers_core::graphics::traits::{CommandBuffer, Queue, Texture};
use pers_core::sync::completion;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How long [`Queue::wait_idle`] waits before giving up.
pub const QUEUE_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// The tightly packed layout of one mip level, as
/// `(bytes_per_row, rows_per_image, extent)`.
pub fn texel_layout(desc: &TextureDesc, mip_level: u32) -> GraphicsResult<(u32, u32, wgpu::Extent3d)> {
    if mip_level >= desc.mip_level_count {
        return Err(GraphicsError::invalid(format!(
            "mip level {mip_level} is past the texture's {} levels",
            desc.mip_level_count
        )));
    }
    let (width, height, depth) = desc.mip_extent(mip_level);
    let bytes_per_row = desc.format.bytes_per_row(width).ok_or_else(|| {
        GraphicsError::invalid(format!("format {} has no texel size", desc.format))
    })?;
    let rows_per_image = desc.format.rows_per_image(height);
    let (block_w, block_h) = desc.format.block_dimensions();
    let extent = wgpu::Extent3d {
        width: width.next_multiple_of(block_w),
        height: height.next_multiple_of(block_h),
        depth_or_array_layers: depth,
    };
    Ok((bytes_per_row, rows_per_image, extent))
}

/// The `wgpu` implementation of [`Queue`].
pub struct WgpuQueue {
    queue: wgpu::Queue,
    device: wgpu::Device,
    lost: Arc<AtomicBool>,
}

impl WgpuQueue {
    pub(crate) fn new(queue: wgpu::Queue, device: wgpu::Device, lost: Arc<AtomicBool>) -> Self {
        Self {
            queue,
            device,
            lost,
        }
    }

    /// The underlying `wgpu` queue.
    pub fn raw(&self) -> &wgpu::Queue {
        &self.queue
    }

    fn ensure_alive(&self) -> GraphicsResult<()> {
        if self.lost.load(Ordering::Acquire) {
            return Err(GraphicsError::DeviceLost(
                "cannot use the queue of a lost device".to_owned(),
            ));
        }
        Ok(())
    }
}

impl Queue for WgpuQueue {
    fn submit_batch(&self, command_buffers: Vec<Box<dyn CommandBuffer>>) -> GraphicsResult<()> {
        if command_buffers.is_empty() {
            return Ok(());
        }
        self.ensure_alive()?;
        let mut finished = Vec::with_capacity(command_buffers.len());
        for command_buffer in command_buffers {
            let recorded = command_buffer
                .into_any()
                .downcast::<WgpuCommandBuffer>()
                .map_err(|_| {
                    GraphicsError::invalid("command buffer was not recorded by the wgpu backend")
                })
                .inspect_err(|e| log::error!("WgpuQueue: {e}"))?;
            finished.push(*recorded);
        }
        let (raw, retained): (Vec<_>, Vec<_>) = finished
            .into_iter()
            .map(WgpuCommandBuffer::into_parts)
            .unzip();
        log::trace!("WgpuQueue: submitting {} command buffer(s)", raw.len());
        self.queue.submit(raw);
        drop(retained);
        Ok(())
    }

    fn write_buffer(&self, write: &BufferWriteDesc<'_>) -> GraphicsResult<()> {
        self.ensure_alive()?;
        write
            .validate()
            .inspect_err(|e| log::error!("WgpuQueue: {e}"))?;
        if !write.buffer.usage().contains(BufferUsage::COPY_DST) {
            let e = GraphicsError::invalid(format!(
                "buffer '{}' cannot be written without COPY_DST",
                write.buffer.label().unwrap_or("<unnamed>")
            ));
            log::error!("WgpuQueue: {e}");
            return Err(e);
        }
        if write.data.is_empty() {
            return Ok(());
        }
        let buffer = WgpuBuffer::of(write.buffer)?;
        self.queue.write_buffer(buffer.raw(), write.offset, write.data);
        Ok(())
    }

    fn write_texture(
        &self,
        texture: &Arc<dyn Texture>,
        data: &[u8],
        mip_level: u32,
    ) -> GraphicsResult<()> {
        self.ensure_alive()?;
        let wgpu_texture = WgpuTexture::of(texture.as_ref())?;
        let desc = texture.desc();
        let label = desc.label.as_deref().unwrap_or("<unnamed>");
        if !desc.usage.contains(TextureUsage::COPY_DST) {
            let e = GraphicsError::invalid(format!(
                "texture '{label}' cannot be written without COPY_DST"
            ));
            log::error!("WgpuQueue: {e}");
            return Err(e);
        }
        let (bytes_per_row, rows_per_image, extent) =
            texel_layout(desc, mip_level).inspect_err(|e| log::error!("WgpuQueue: {e}"))?;
        let expected = u64::from(bytes_per_row)
            * u64::from(rows_per_image)
            * u64::from(extent.depth_or_array_layers);
        if data.len() as u64 != expected {
            let e = GraphicsError::invalid(format!(
                "texture '{label}' mip {mip_level} needs {expected} bytes, got {}",
                data.len()
            ));
            log::error!("WgpuQueue: {e}");
            return Err(e);
        }
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: wgpu_texture.raw(),
                mip_level,
                origin: wgpu::Origin3d::ZERO,
                aspect: TextureAspect::All.into_wgpu(),
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(rows_per_image),
            },
            extent,
        );
        Ok(())
    }

    fn wait_idle(&self) -> bool {
        if self.lost.load(Ordering::Acquire) {
            return false;
        }
        let (completer, done) = completion();
        self.queue.on_submitted_work_done(move || completer.complete(()));
        let finished = done
            .wait_with_pump(QUEUE_IDLE_TIMEOUT, || {
                if let Err(e) = self.device.poll(wgpu::PollType::Poll) {
                    log::debug!("WgpuQueue: device poll failed: {e}");
                }
            })
            .is_some();
        if !finished {
            log::warn!(
                "WgpuQueue: submitted work did not finish within {} s",
                QUEUE_IDLE_TIMEOUT.as_secs()
            );
        }
        finished
    }

    fn native_handle(&self) -> QueueHandle {
        QueueHandle::from_backend(&self.queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pers_core::graphics::api::{TextureDimension, TextureFormat};

    #[test]
    fn mip_levels_shrink_the_layout() {
        let desc = TextureDesc {
            mip_level_count: 3,
            ..TextureDesc::new_2d(16, 8, TextureFormat::Rgba8Unorm, TextureUsage::COPY_DST)
        };
        let (bpr, rows, extent) = texel_layout(&desc, 2).expect("valid mip");
        assert_eq!((bpr, rows), (16, 2));
        assert_eq!((extent.width, extent.height, extent.depth_or_array_layers), (4, 2, 1));
        assert!(texel_layout(&desc, 3).is_err());
    }

    #[test]
    fn compressed_layouts_count_blocks() {
        let desc = TextureDesc::new_2d(
            10,
            10,
            TextureFormat::Bc1RgbaUnorm,
            TextureUsage::COPY_DST,
        );
        let (bpr, rows, extent) = texel_layout(&desc, 0).expect("valid mip");
        assert_eq!(bpr, 3 * 8);
        assert_eq!(rows, 3);
        assert_eq!((extent.width, extent.height), (12, 12));
    }

    #[test]
    fn volume_layers_shrink_with_the_mip() {
        let desc = TextureDesc {
            dimension: TextureDimension::D3,
            depth_or_array_layers: 8,
            mip_level_count: 2,
            ..TextureDesc::new_2d(8, 8, TextureFormat::R8Unorm, TextureUsage::COPY_DST)
        };
        let (_, _, extent) = texel_layout(&desc, 1).expect("valid mip");
        assert_eq!(extent.depth_or_array_layers, 4);
    }
}
