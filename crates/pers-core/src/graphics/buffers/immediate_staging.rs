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

use crate::graphics::api::{AccessPattern, BufferDesc, BufferUsage, MemoryLocation};
use crate::graphics::error::{GraphicsError, GraphicsResult};
use crate::graphics::traits::{Buffer, ResourceFactory};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct StagingState {
    finalized: bool,
    bytes_written: u64,
}

/// A host-written staging buffer, mapped from the moment it is created.
///
/// Fill it with [`write_bytes`](Self::write_bytes) or [`write`](Self::write),
/// [`finalize`](Self::finalize) it, then copy it into a [`DeviceBuffer`]
/// with a command encoder.
///
/// [`DeviceBuffer`]: super::DeviceBuffer
pub struct ImmediateStagingBuffer {
    buffer: Arc<dyn Buffer>,
    state: Mutex<StagingState>,
}

impl ImmediateStagingBuffer {
    /// Creates a mapped staging buffer of `size` bytes.
    pub fn create(
        factory: &dyn ResourceFactory,
        size: u64,
        label: Option<&str>,
    ) -> GraphicsResult<Self> {
        let desc = BufferDesc {
            label: label.map(str::to_owned),
            size,
            usage: BufferUsage::MAP_WRITE | BufferUsage::COPY_SRC,
            memory_location: MemoryLocation::HostVisible,
            access_pattern: AccessPattern::Staging,
            mapped_at_creation: true,
        };
        let buffer = factory.create_buffer(&desc)?;
        if buffer.mapped_len().is_none() {
            log::error!(
                "ImmediateStagingBuffer: backend returned '{}' without a mapped range",
                desc.label_or_default()
            );
            return Err(GraphicsError::state("staging buffer was not mapped at creation"));
        }
        Ok(Self {
            buffer,
            state: Mutex::new(StagingState::default()),
        })
    }

    /// Copies `data` into the mapped range at `offset`. Returns the number of
    /// bytes written.
    ///
    /// ## Errors
    /// * `StateViolation` after [`finalize`](Self::finalize).
    /// * `InvalidArgument` if the write runs past the end of the buffer.
    pub fn write_bytes(&self, data: &[u8], offset: u64) -> GraphicsResult<u64> {
        let mut state = self.state.lock();
        if state.finalized {
            log::warn!(
                "ImmediateStagingBuffer: write to '{}' after finalize",
                self.label()
            );
            return Err(GraphicsError::state(format!(
                "staging buffer '{}' is finalized",
                self.label()
            )));
        }
        let len = data.len() as u64;
        let end = offset
            .checked_add(len)
            .filter(|end| *end <= self.size())
            .ok_or_else(|| {
                GraphicsError::invalid(format!(
                    "write of {len} bytes at offset {offset} exceeds staging buffer '{}' ({} bytes)",
                    self.label(),
                    self.size()
                ))
            })
            .inspect_err(|e| log::error!("ImmediateStagingBuffer: {e}"))?;
        self.buffer.write_mapped(offset, data)?;
        state.bytes_written = state.bytes_written.max(end);
        Ok(len)
    }

    /// Writes a slice of plain-old-data values at `offset`.
    pub fn write<T: bytemuck::Pod>(&self, values: &[T], offset: u64) -> GraphicsResult<u64> {
        self.write_bytes(bytemuck::cast_slice(values), offset)
    }

    /// Unmaps the buffer so the GPU can read it. Idempotent.
    pub fn finalize(&self) {
        let mut state = self.state.lock();
        if !state.finalized {
            self.buffer.unmap();
            state.finalized = true;
        }
    }

    /// Whether [`finalize`](Self::finalize) has run.
    pub fn is_finalized(&self) -> bool {
        self.state.lock().finalized
    }

    /// The highest byte offset written so far.
    pub fn bytes_written(&self) -> u64 {
        self.state.lock().bytes_written
    }

    /// The underlying buffer.
    pub fn buffer(&self) -> &Arc<dyn Buffer> {
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

impl Drop for ImmediateStagingBuffer {
    fn drop(&mut self) {
        if !self.state.get_mut().finalized {
            self.buffer.unmap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::mock::MockFactory;

    #[test]
    fn mapped_range_covers_the_whole_buffer() {
        let factory = MockFactory::new();
        let staging = ImmediateStagingBuffer::create(&factory, 256, Some("Upload")).unwrap();
        assert_eq!(staging.buffer().mapped_len(), Some(256));
        assert!(!staging.is_finalized());
    }

    #[test]
    fn writes_track_the_high_water_mark() {
        let factory = MockFactory::new();
        let staging = ImmediateStagingBuffer::create(&factory, 64, None).unwrap();
        assert_eq!(staging.write(&[1.0f32, 2.0], 16).unwrap(), 8);
        assert_eq!(staging.write_bytes(&[9; 4], 0).unwrap(), 4);
        assert_eq!(staging.bytes_written(), 24);
        let contents = factory.buffer_contents(staging.buffer().as_ref());
        assert_eq!(&contents[0..4], &[9; 4]);
        assert_eq!(&contents[16..20], bytemuck::bytes_of(&1.0f32));
    }

    #[test]
    fn out_of_range_write_fails() {
        let factory = MockFactory::new();
        let staging = ImmediateStagingBuffer::create(&factory, 8, None).unwrap();
        let err = staging.write_bytes(&[0; 8], 4).unwrap_err();
        assert!(matches!(err, GraphicsError::InvalidArgument(_)));
        assert_eq!(staging.bytes_written(), 0);
    }

    #[test]
    fn writes_after_finalize_are_state_violations() {
        let factory = MockFactory::new();
        let staging = ImmediateStagingBuffer::create(&factory, 8, None).unwrap();
        staging.finalize();
        staging.finalize();
        assert!(staging.is_finalized());
        assert_eq!(staging.buffer().mapped_len(), None);
        let err = staging.write_bytes(&[0; 4], 0).unwrap_err();
        assert!(matches!(err, GraphicsError::StateViolation(_)));
    }
}
