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

//! Defines data structures related to GPU buffer resources.

use super::flags::BufferUsage;
use crate::graphics::error::{GraphicsError, GraphicsResult};
use crate::graphics::traits::Buffer;
use serde::{Deserialize, Serialize};

/// Where a buffer should live. A hint; backends may ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MemoryLocation {
    /// Let the backend decide.
    #[default]
    Auto,
    /// GPU-only memory.
    DeviceLocal,
    /// CPU-writable, GPU-readable memory.
    HostVisible,
    /// CPU-readable memory the GPU writes to.
    HostCached,
    /// Shared memory on unified-memory systems.
    Unified,
}

/// How often a buffer's contents change. A hint; backends may ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccessPattern {
    /// Written once, read many times.
    #[default]
    Static,
    /// Updated occasionally.
    Dynamic,
    /// Updated every frame.
    Stream,
    /// A temporary transfer buffer.
    Staging,
}

/// The lifecycle state of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferState {
    /// Not created yet, or creation failed.
    Uninitialized,
    /// Usable by the GPU.
    Ready,
    /// Host-visible range available.
    Mapped,
    /// An asynchronous map was requested and has not resolved.
    MapPending,
    /// Released.
    Destroyed,
}

/// Direction of a host mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapMode {
    /// The host reads what the GPU wrote.
    Read,
    /// The host writes for the GPU to read.
    Write,
}

/// Alignment requirements for buffer offsets and sizes, in bytes.
pub struct BufferAlignment;

impl BufferAlignment {
    /// Uniform buffer binding offsets.
    pub const UNIFORM_BUFFER_OFFSET: u64 = 256;
    /// Storage buffer binding offsets.
    pub const STORAGE_BUFFER_OFFSET: u64 = 256;
    /// Vertex buffer offsets.
    pub const VERTEX_BUFFER_OFFSET: u64 = 4;
    /// Index buffer offsets.
    pub const INDEX_BUFFER_OFFSET: u64 = 4;
    /// Copy offsets and sizes.
    pub const COPY_BUFFER_OFFSET: u64 = 4;
    /// Dynamic binding offsets.
    pub const DYNAMIC_OFFSET: u64 = 256;
    /// Everything else.
    pub const DEFAULT: u64 = 16;

    /// The alignment that applies to a buffer with `usage`.
    pub const fn for_usage(usage: BufferUsage) -> u64 {
        if usage.contains(BufferUsage::UNIFORM) {
            Self::UNIFORM_BUFFER_OFFSET
        } else if usage.contains(BufferUsage::STORAGE) {
            Self::STORAGE_BUFFER_OFFSET
        } else if usage.contains(BufferUsage::VERTEX) {
            Self::VERTEX_BUFFER_OFFSET
        } else if usage.contains(BufferUsage::INDEX) {
            Self::INDEX_BUFFER_OFFSET
        } else {
            Self::DEFAULT
        }
    }
}

/// Hard size limits applied when validating buffer descriptors.
pub struct BufferLimits;

impl BufferLimits {
    /// Largest buffer (2 GiB).
    pub const MAX_BUFFER_SIZE: u64 = 2 * 1024 * 1024 * 1024;
    /// Largest uniform buffer (64 KiB).
    pub const MAX_UNIFORM_BUFFER_SIZE: u64 = 64 * 1024;
    /// Largest storage buffer (128 MiB).
    pub const MAX_STORAGE_BUFFER_SIZE: u64 = 128 * 1024 * 1024;
    /// Most vertex attributes per pipeline.
    pub const MAX_VERTEX_ATTRIBUTES: u32 = 32;
    /// Largest vertex buffer stride.
    pub const MAX_VERTEX_BUFFER_STRIDE: u32 = 2048;
}

/// A descriptor used to create a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferDesc {
    /// An optional debug label.
    pub label: Option<String>,
    /// Size in bytes. Must be greater than zero.
    pub size: u64,
    /// How the buffer will be used.
    pub usage: BufferUsage,
    /// Placement hint.
    pub memory_location: MemoryLocation,
    /// Update-frequency hint.
    pub access_pattern: AccessPattern,
    /// Create the buffer with a writable host range.
    pub mapped_at_creation: bool,
}

impl BufferDesc {
    /// A descriptor with the given size and usage and default hints.
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self {
            size,
            usage,
            ..Default::default()
        }
    }

    /// Sets the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label, or a placeholder for logs.
    pub fn label_or_default(&self) -> &str {
        self.label.as_deref().unwrap_or("<unnamed>")
    }

    /// Checks the descriptor against the buffer rules.
    pub fn validate(&self) -> GraphicsResult<()> {
        if self.size == 0 {
            return Err(GraphicsError::invalid(format!(
                "buffer '{}' has size 0",
                self.label_or_default()
            )));
        }
        if self.size > BufferLimits::MAX_BUFFER_SIZE {
            return Err(GraphicsError::invalid(format!(
                "buffer '{}' size {} exceeds the {} byte limit",
                self.label_or_default(),
                self.size,
                BufferLimits::MAX_BUFFER_SIZE
            )));
        }
        if self.usage.is_empty() {
            return Err(GraphicsError::invalid(format!(
                "buffer '{}' has no usage flags",
                self.label_or_default()
            )));
        }
        if self.usage.contains(BufferUsage::MAP_ANY) {
            return Err(GraphicsError::invalid(format!(
                "buffer '{}' requests both MAP_READ and MAP_WRITE",
                self.label_or_default()
            )));
        }
        if self.usage.contains(BufferUsage::UNIFORM)
            && self.size > BufferLimits::MAX_UNIFORM_BUFFER_SIZE
        {
            return Err(GraphicsError::invalid(format!(
                "uniform buffer '{}' size {} exceeds {}",
                self.label_or_default(),
                self.size,
                BufferLimits::MAX_UNIFORM_BUFFER_SIZE
            )));
        }
        if self.usage.contains(BufferUsage::STORAGE)
            && self.size > BufferLimits::MAX_STORAGE_BUFFER_SIZE
        {
            return Err(GraphicsError::invalid(format!(
                "storage buffer '{}' size {} exceeds {}",
                self.label_or_default(),
                self.size,
                BufferLimits::MAX_STORAGE_BUFFER_SIZE
            )));
        }
        if self.mapped_at_creation
            && !self
                .usage
                .intersects(BufferUsage::MAP_WRITE | BufferUsage::COPY_SRC)
        {
            return Err(GraphicsError::invalid(format!(
                "buffer '{}' is mapped at creation without MAP_WRITE or COPY_SRC",
                self.label_or_default()
            )));
        }
        Ok(())
    }

    /// The size rounded up to the alignment `usage` calls for.
    pub fn aligned_size(&self, usage: BufferUsage) -> u64 {
        self.size.next_multiple_of(BufferAlignment::for_usage(usage))
    }
}

/// A buffer-to-buffer copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferCopyDesc {
    /// Byte offset in the source.
    pub src_offset: u64,
    /// Byte offset in the destination.
    pub dst_offset: u64,
    /// Bytes to copy, or [`BufferCopyDesc::WHOLE_SIZE`].
    pub size: u64,
}

impl Default for BufferCopyDesc {
    fn default() -> Self {
        Self::whole()
    }
}

/// A copy whose size has been resolved and checked against both buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedCopy {
    /// Byte offset in the source.
    pub src_offset: u64,
    /// Byte offset in the destination.
    pub dst_offset: u64,
    /// Bytes to copy.
    pub size: u64,
}

impl BufferCopyDesc {
    /// Copy as much as fits in both buffers.
    pub const WHOLE_SIZE: u64 = u64::MAX;

    /// A copy of everything, from offset 0 to offset 0.
    pub const fn whole() -> Self {
        Self {
            src_offset: 0,
            dst_offset: 0,
            size: Self::WHOLE_SIZE,
        }
    }

    /// A copy of `size` bytes between explicit offsets.
    pub const fn new(src_offset: u64, dst_offset: u64, size: u64) -> Self {
        Self {
            src_offset,
            dst_offset,
            size,
        }
    }

    /// Resolves `WHOLE_SIZE` to `min(src - src_offset, dst - dst_offset)` and
    /// checks both ranges and the copy alignment.
    pub fn resolve(&self, src_size: u64, dst_size: u64) -> GraphicsResult<ResolvedCopy> {
        if self.src_offset > src_size {
            return Err(GraphicsError::invalid(format!(
                "copy source offset {} is past the end of a {} byte buffer",
                self.src_offset, src_size
            )));
        }
        if self.dst_offset > dst_size {
            return Err(GraphicsError::invalid(format!(
                "copy destination offset {} is past the end of a {} byte buffer",
                self.dst_offset, dst_size
            )));
        }
        let size = if self.size == Self::WHOLE_SIZE {
            (src_size - self.src_offset).min(dst_size - self.dst_offset)
        } else {
            self.size
        };
        if self.src_offset.checked_add(size).filter(|end| *end <= src_size).is_none() {
            return Err(GraphicsError::invalid("copy source range exceeds buffer size"));
        }
        if self.dst_offset.checked_add(size).filter(|end| *end <= dst_size).is_none() {
            return Err(GraphicsError::invalid(
                "copy destination range exceeds buffer size",
            ));
        }
        let align = BufferAlignment::COPY_BUFFER_OFFSET;
        if self.src_offset % align != 0 || self.dst_offset % align != 0 || size % align != 0 {
            return Err(GraphicsError::invalid(format!(
                "copy offsets and size must be multiples of {align} (src {}, dst {}, size {size})",
                self.src_offset, self.dst_offset
            )));
        }
        Ok(ResolvedCopy {
            src_offset: self.src_offset,
            dst_offset: self.dst_offset,
            size,
        })
    }
}

/// A byte range of a buffer to map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferMapRange {
    /// Byte offset of the range.
    pub offset: u64,
    /// Length of the range, or [`BufferMapRange::WHOLE_BUFFER`].
    pub size: u64,
}

impl BufferMapRange {
    /// Map from the offset to the end of the buffer.
    pub const WHOLE_BUFFER: u64 = u64::MAX;

    /// The whole buffer.
    pub const fn whole() -> Self {
        Self {
            offset: 0,
            size: Self::WHOLE_BUFFER,
        }
    }

    /// Resolves `WHOLE_BUFFER` against `buffer_size` and checks bounds.
    /// Returns `(offset, len)`.
    pub fn resolve(&self, buffer_size: u64) -> GraphicsResult<(u64, u64)> {
        if self.offset > buffer_size {
            return Err(GraphicsError::invalid(format!(
                "map offset {} is past the end of a {} byte buffer",
                self.offset, buffer_size
            )));
        }
        let len = if self.size == Self::WHOLE_BUFFER {
            buffer_size - self.offset
        } else {
            self.size
        };
        if self.offset.checked_add(len).filter(|end| *end <= buffer_size).is_none() {
            return Err(GraphicsError::invalid(format!(
                "map of {len} bytes at offset {} exceeds buffer size {buffer_size}",
                self.offset
            )));
        }
        Ok((self.offset, len))
    }
}

impl Default for BufferMapRange {
    fn default() -> Self {
        Self::whole()
    }
}

/// A queue-side write of host bytes into a buffer.
#[derive(Clone, Copy)]
pub struct BufferWriteDesc<'a> {
    /// The destination buffer.
    pub buffer: &'a dyn Buffer,
    /// Byte offset in the destination.
    pub offset: u64,
    /// The bytes to write.
    pub data: &'a [u8],
}

impl std::fmt::Debug for BufferWriteDesc<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferWriteDesc")
            .field("buffer", &self.buffer.label())
            .field("offset", &self.offset)
            .field("len", &self.data.len())
            .finish()
    }
}

impl BufferWriteDesc<'_> {
    /// Checks bounds and the 4-byte write alignment.
    pub fn validate(&self) -> GraphicsResult<()> {
        let len = self.data.len() as u64;
        if self.offset.checked_add(len).filter(|end| *end <= self.buffer.size()).is_none() {
            return Err(GraphicsError::invalid(format!(
                "write of {} bytes at offset {} exceeds buffer size {}",
                len,
                self.offset,
                self.buffer.size()
            )));
        }
        let align = BufferAlignment::COPY_BUFFER_OFFSET;
        if self.offset % align != 0 || len % align != 0 {
            return Err(GraphicsError::invalid(format!(
                "buffer writes must be {align}-byte aligned (offset {}, len {len})",
                self.offset
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_rejected_and_one_byte_is_fine() {
        assert!(BufferDesc::new(0, BufferUsage::VERTEX).validate().is_err());
        assert!(BufferDesc::new(1, BufferUsage::VERTEX).validate().is_ok());
    }

    #[test]
    fn both_map_flags_are_rejected() {
        let desc = BufferDesc::new(64, BufferUsage::MAP_READ | BufferUsage::MAP_WRITE);
        assert!(matches!(
            desc.validate(),
            Err(GraphicsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn uniform_size_limit() {
        let desc = BufferDesc::new(
            BufferLimits::MAX_UNIFORM_BUFFER_SIZE + 4,
            BufferUsage::UNIFORM,
        );
        assert!(desc.validate().is_err());
    }

    #[test]
    fn aligned_size_depends_on_usage() {
        let desc = BufferDesc::new(100, BufferUsage::COPY_DST);
        assert_eq!(desc.aligned_size(BufferUsage::UNIFORM), 256);
        assert_eq!(desc.aligned_size(BufferUsage::VERTEX), 100);
        assert_eq!(desc.aligned_size(BufferUsage::COPY_DST), 112);
    }

    #[test]
    fn whole_size_copies_resolve_to_the_smaller_remainder() {
        let copy = BufferCopyDesc::new(16, 0, BufferCopyDesc::WHOLE_SIZE);
        let resolved = copy.resolve(128, 64).unwrap();
        assert_eq!(resolved.size, 64);

        let resolved = BufferCopyDesc::whole().resolve(32, 256).unwrap();
        assert_eq!(resolved.size, 32);
    }

    #[test]
    fn out_of_range_and_misaligned_copies_fail() {
        assert!(BufferCopyDesc::new(0, 0, 128).resolve(64, 256).is_err());
        assert!(BufferCopyDesc::new(0, 200, 64).resolve(64, 256).is_err());
        assert!(BufferCopyDesc::new(2, 0, 8).resolve(64, 64).is_err());
        assert!(BufferCopyDesc::new(300, 0, 4).resolve(64, 64).is_err());
    }

    #[test]
    fn map_ranges_resolve_against_buffer_size() {
        assert_eq!(BufferMapRange::whole().resolve(256).unwrap(), (0, 256));
        let range = BufferMapRange {
            offset: 64,
            size: BufferMapRange::WHOLE_BUFFER,
        };
        assert_eq!(range.resolve(256).unwrap(), (64, 192));
        let range = BufferMapRange {
            offset: 64,
            size: 256,
        };
        assert!(range.resolve(256).is_err());
    }

    #[test]
    fn ranges_near_u64_max_are_rejected_instead_of_wrapping() {
        let copy = BufferCopyDesc::new(4, 0, u64::MAX - 3);
        assert!(matches!(
            copy.resolve(64, 64),
            Err(GraphicsError::InvalidArgument(_))
        ));
        let copy = BufferCopyDesc::new(0, 4, u64::MAX - 3);
        assert!(matches!(
            copy.resolve(64, 64),
            Err(GraphicsError::InvalidArgument(_))
        ));

        let range = BufferMapRange {
            offset: 8,
            size: u64::MAX - 1,
        };
        assert!(matches!(
            range.resolve(64),
            Err(GraphicsError::InvalidArgument(_))
        ));
    }
}
