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

use super::device_buffer::DeviceBuffer;
use super::mapping::MapFuture;
use crate::graphics::api::{
    AccessPattern, BufferCopyDesc, BufferDesc, BufferMapRange, BufferUsage, MapMode,
    MemoryLocation,
};
use crate::graphics::error::{GraphicsError, GraphicsResult};
use crate::graphics::traits::{CommandEncoder, MappableBuffer, ResourceFactory};
use std::sync::Arc;

/// A readback buffer: the GPU copies into it, then the host maps it
/// asynchronously and reads the bytes out.
pub struct DeferredStagingBuffer {
    buffer: Arc<dyn MappableBuffer>,
}

impl DeferredStagingBuffer {
    /// Creates an unmapped readback buffer of `size` bytes.
    pub fn create(
        factory: &dyn ResourceFactory,
        size: u64,
        label: Option<&str>,
    ) -> GraphicsResult<Self> {
        let desc = BufferDesc {
            label: label.map(str::to_owned),
            size,
            usage: BufferUsage::MAP_READ | BufferUsage::COPY_DST,
            memory_location: MemoryLocation::HostCached,
            access_pattern: AccessPattern::Staging,
            mapped_at_creation: false,
        };
        let buffer = factory.create_mappable_buffer(&desc)?;
        Ok(Self { buffer })
    }

    /// Records a copy from `source` into this buffer.
    pub fn download_from(
        &self,
        encoder: &mut dyn CommandEncoder,
        source: &DeviceBuffer,
        copy: &BufferCopyDesc,
    ) -> GraphicsResult<()> {
        encoder.download_from_device_buffer(source, self, copy)
    }

    /// Requests a map of `range`.
    ///
    /// Readback buffers can only be mapped for reading; a write map resolves
    /// to an `InvalidArgument` error, as do out-of-range requests. Write maps
    /// are also reported as a
    /// [`Severity::TodoSomeday`](crate::diagnostics::Severity::TodoSomeday)
    /// diagnostic.
    pub fn map_async(&self, mode: MapMode, range: BufferMapRange) -> MapFuture {
        if mode == MapMode::Write {
            crate::todo_someday!(
                "DeferredStagingBuffer",
                "write maps of readback buffer '{}' are not implemented",
                self.label()
            );
            return MapFuture::failed(GraphicsError::invalid(
                "readback buffers can only be mapped for reading",
            ));
        }
        let (offset, len) = match range.resolve(self.size()) {
            Ok(resolved) => resolved,
            Err(e) => {
                log::error!("DeferredStagingBuffer: invalid map of '{}': {e}", self.label());
                return MapFuture::failed(e);
            }
        };
        let resolved = BufferMapRange { offset, size: len };
        match self.buffer.map_async(mode, resolved) {
            Ok(completion) => MapFuture::pending(completion, Arc::clone(&self.buffer), offset, len),
            Err(e) => {
                log::error!("DeferredStagingBuffer: map of '{}' failed: {e}", self.label());
                MapFuture::failed(e)
            }
        }
    }

    /// Releases the mapping. Pending maps are cancelled.
    pub fn unmap(&self) {
        self.buffer.unmap();
    }

    /// Whether a host range is mapped.
    pub fn is_mapped(&self) -> bool {
        self.buffer.is_mapped()
    }

    /// Whether a map is in flight.
    pub fn is_map_pending(&self) -> bool {
        self.buffer.is_map_pending()
    }

    /// Copies bytes out of the mapped range. `offset` is relative to the
    /// buffer start.
    pub fn read_bytes(&self, offset: u64, out: &mut [u8]) -> GraphicsResult<()> {
        if !self.is_mapped() {
            return Err(GraphicsError::state(format!(
                "readback buffer '{}' is not mapped",
                self.label()
            )));
        }
        self.buffer.read_mapped(offset, out)
    }

    /// Reads `count` plain-old-data values starting at `offset`.
    pub fn read<T: bytemuck::Pod>(&self, offset: u64, count: usize) -> GraphicsResult<Vec<T>> {
        let mut values = vec![T::zeroed(); count];
        self.read_bytes(offset, bytemuck::cast_slice_mut(&mut values))?;
        Ok(values)
    }

    /// The underlying buffer.
    pub fn buffer(&self) -> &Arc<dyn MappableBuffer> {
        &self.buffer
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.buffer.size()
    }

    /// The debug label, or a placeholder.
    pub fn label(&self) -> &str {
        self.buffer.label().unwrap_or("<unnamed>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Diagnostics, Severity, CALLBACK_GUARD};
    use crate::graphics::mock::{MockEncoder, MockFactory};
    use parking_lot::Mutex;
    use std::time::Duration;

    fn filled_readback(factory: &MockFactory, bytes: &[u8]) -> DeferredStagingBuffer {
        let readback = DeferredStagingBuffer::create(factory, bytes.len() as u64, Some("Readback"))
            .unwrap();
        factory.set_buffer_contents(readback.buffer().as_buffer(), bytes);
        readback
    }

    #[test]
    fn map_resolves_only_after_polling() {
        let factory = MockFactory::new();
        let readback = filled_readback(&factory, &[1, 2, 3, 4, 5, 6, 7, 8]);
        let future = readback.map_async(MapMode::Read, BufferMapRange::whole());
        assert!(readback.is_map_pending());
        let range = future.wait(Duration::from_secs(1)).unwrap();
        assert!(readback.is_mapped());
        assert_eq!(range.len(), 8);
        assert_eq!(range.to_vec().unwrap(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
        let mut tail = [0u8; 2];
        range.read_into(6, &mut tail).unwrap();
        assert_eq!(tail, [7, 8]);
        assert!(matches!(
            range.read_into(u64::MAX - 1, &mut tail),
            Err(GraphicsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn future_can_be_awaited() {
        let factory = MockFactory::new();
        let readback = filled_readback(&factory, &42u32.to_le_bytes());
        let range = pollster::block_on(readback.map_async(MapMode::Read, BufferMapRange::whole()))
            .unwrap();
        assert_eq!(range.to_vec().unwrap(), 42u32.to_le_bytes().to_vec());
        assert_eq!(readback.read::<u32>(0, 1).unwrap(), vec![42]);
    }

    #[test]
    fn write_maps_are_rejected_and_reported() {
        let _guard = CALLBACK_GUARD.lock();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = Arc::clone(&seen);
        Diagnostics::global().set_callback(Severity::TodoSomeday, move |record| {
            seen_cb.lock().push(record.category.to_owned());
            true
        });

        let factory = MockFactory::new();
        let readback = DeferredStagingBuffer::create(&factory, 16, None).unwrap();
        let err = readback
            .map_async(MapMode::Write, BufferMapRange::whole())
            .wait(Duration::from_millis(10))
            .unwrap_err();
        Diagnostics::global().clear_callback(Severity::TodoSomeday);

        assert!(matches!(err, GraphicsError::InvalidArgument(_)));
        assert!(!readback.is_map_pending());
        assert_eq!(*seen.lock(), vec!["DeferredStagingBuffer".to_owned()]);
    }

    #[test]
    fn reading_unmapped_buffer_is_a_state_violation() {
        let factory = MockFactory::new();
        let readback = DeferredStagingBuffer::create(&factory, 16, None).unwrap();
        let mut out = [0u8; 4];
        assert!(matches!(
            readback.read_bytes(0, &mut out),
            Err(GraphicsError::StateViolation(_))
        ));
    }

    #[test]
    fn download_unmaps_a_mapped_readback_buffer() {
        let factory = MockFactory::new();
        let source = DeviceBuffer::create_initialized(
            &factory,
            &BufferDesc::new(8, BufferUsage::STORAGE),
            &[5; 8],
        )
        .unwrap();
        let readback = DeferredStagingBuffer::create(&factory, 8, None).unwrap();
        readback
            .map_async(MapMode::Read, BufferMapRange::whole())
            .wait(Duration::from_secs(1))
            .unwrap();
        assert!(readback.is_mapped());

        let mut encoder = MockEncoder::new(&factory);
        readback
            .download_from(&mut encoder, &source, &BufferCopyDesc::whole())
            .unwrap();
        assert!(!readback.is_mapped());
        assert_eq!(encoder.copies(), vec![(0, 0, 8)]);
    }
}
