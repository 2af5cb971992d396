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

use crate::graphics::api::{BufferDesc, BufferUsage, MemoryLocation};
use crate::graphics::error::GraphicsResult;
use crate::graphics::handle::BufferHandle;
use crate::graphics::traits::{Buffer, ResourceFactory};
use std::sync::Arc;

/// A buffer that lives in GPU memory and is never mapped by the host.
///
/// Map flags in the descriptor are stripped (with a warning) and `COPY_DST`
/// is always added so the buffer can be the target of uploads.
#[derive(Clone)]
pub struct DeviceBuffer {
    buffer: Arc<dyn Buffer>,
}

impl std::fmt::Debug for DeviceBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("label", &self.label())
            .field("size", &self.size())
            .field("usage", &self.usage())
            .finish()
    }
}

impl DeviceBuffer {
    /// The descriptor actually used for a device buffer.
    pub fn device_desc(desc: &BufferDesc) -> BufferDesc {
        let mut desc = desc.clone();
        if desc.usage.intersects(BufferUsage::MAP_ANY) {
            log::warn!(
                "DeviceBuffer: stripping map flags from '{}', device buffers are never mapped",
                desc.label_or_default()
            );
            desc.usage.remove(BufferUsage::MAP_ANY);
        }
        desc.usage |= BufferUsage::COPY_DST;
        desc.mapped_at_creation = false;
        if desc.memory_location == MemoryLocation::Auto {
            desc.memory_location = MemoryLocation::DeviceLocal;
        }
        desc
    }

    /// Creates an empty device buffer.
    pub fn create(factory: &dyn ResourceFactory, desc: &BufferDesc) -> GraphicsResult<Self> {
        let buffer = factory.create_buffer(&Self::device_desc(desc))?;
        Ok(Self { buffer })
    }

    /// Creates a device buffer that already holds `data`.
    ///
    /// `desc.size` is raised to `data.len()` when it is smaller.
    pub fn create_initialized(
        factory: &dyn ResourceFactory,
        desc: &BufferDesc,
        data: &[u8],
    ) -> GraphicsResult<Self> {
        let mut desc = Self::device_desc(desc);
        desc.size = desc.size.max(data.len() as u64);
        let buffer = factory.create_initializable_device_buffer(&desc, data)?;
        Ok(Self { buffer })
    }

    /// Wraps a buffer created elsewhere.
    pub fn from_buffer(buffer: Arc<dyn Buffer>) -> Self {
        Self { buffer }
    }

    /// The underlying buffer.
    pub fn buffer(&self) -> &Arc<dyn Buffer> {
        &self.buffer
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.buffer.size()
    }

    /// Usage flags.
    pub fn usage(&self) -> BufferUsage {
        self.buffer.usage()
    }

    /// The debug label, or a placeholder.
    pub fn label(&self) -> &str {
        self.buffer.label().unwrap_or("<unnamed>")
    }

    /// The backend's opaque handle.
    pub fn native_handle(&self) -> BufferHandle {
        self.buffer.native_handle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::mock::MockFactory;

    #[test]
    fn map_flags_are_stripped_and_copy_dst_added() {
        let desc = BufferDesc::new(64, BufferUsage::VERTEX | BufferUsage::MAP_WRITE);
        let device = DeviceBuffer::device_desc(&desc);
        assert_eq!(device.usage, BufferUsage::VERTEX | BufferUsage::COPY_DST);
        assert_eq!(device.memory_location, MemoryLocation::DeviceLocal);
    }

    #[test]
    fn created_buffer_is_never_mapped() {
        let factory = MockFactory::new();
        let desc = BufferDesc {
            mapped_at_creation: true,
            ..BufferDesc::new(16, BufferUsage::UNIFORM)
        };
        let buffer = DeviceBuffer::create(&factory, &desc).unwrap();
        assert_eq!(buffer.buffer().mapped_len(), None);
        assert!(buffer.usage().contains(BufferUsage::COPY_DST));
    }

    #[test]
    fn initialized_buffer_grows_to_fit_data() {
        let factory = MockFactory::new();
        let desc = BufferDesc::new(4, BufferUsage::VERTEX).with_label("Verts");
        let buffer = DeviceBuffer::create_initialized(&factory, &desc, &[7u8; 12]).unwrap();
        assert_eq!(buffer.size(), 12);
        assert_eq!(buffer.label(), "Verts");
        assert_eq!(factory.buffer_contents(buffer.buffer().as_ref()), vec![7u8; 12]);
    }

    #[test]
    fn zero_size_is_rejected() {
        let factory = MockFactory::new();
        assert!(DeviceBuffer::create(&factory, &BufferDesc::new(0, BufferUsage::VERTEX)).is_err());
    }
}
