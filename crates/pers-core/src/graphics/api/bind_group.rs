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

//! Defines bind group layouts and bind groups.

use super::enums::TextureViewDimension;
use super::flags::ShaderStages;
use crate::graphics::error::{GraphicsError, GraphicsResult};
use crate::graphics::traits::{BindGroupLayout, Buffer, Sampler, TextureView};
use std::sync::Arc;

/// What a texture binding returns when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSampleType {
    /// Floating point texels.
    Float {
        /// Whether filtering samplers may be used.
        filterable: bool,
    },
    /// Depth values.
    Depth,
    /// Signed integers.
    Sint,
    /// Unsigned integers.
    Uint,
}

/// The kind of resource a binding slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingType {
    /// A uniform buffer.
    UniformBuffer {
        /// Whether a dynamic offset is supplied at bind time.
        has_dynamic_offset: bool,
        /// Smallest legal bound size, if any.
        min_binding_size: Option<u64>,
    },
    /// A storage buffer.
    StorageBuffer {
        /// Whether shaders can only read it.
        read_only: bool,
        /// Whether a dynamic offset is supplied at bind time.
        has_dynamic_offset: bool,
    },
    /// A sampler.
    Sampler {
        /// Whether this is a comparison sampler.
        comparison: bool,
    },
    /// A sampled texture.
    Texture {
        /// The texel type.
        sample_type: TextureSampleType,
        /// The view dimension.
        view_dimension: TextureViewDimension,
        /// Whether the texture is multisampled.
        multisampled: bool,
    },
}

impl BindingType {
    /// Whether the binding consumes a dynamic offset.
    pub fn has_dynamic_offset(&self) -> bool {
        matches!(
            self,
            BindingType::UniformBuffer {
                has_dynamic_offset: true,
                ..
            } | BindingType::StorageBuffer {
                has_dynamic_offset: true,
                ..
            }
        )
    }
}

/// One slot of a bind group layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindGroupLayoutEntry {
    /// The `@binding` index.
    pub binding: u32,
    /// The stages that see it.
    pub visibility: ShaderStages,
    /// The resource kind.
    pub ty: BindingType,
}

/// A descriptor used to create a bind group layout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BindGroupLayoutDesc {
    /// An optional debug label.
    pub label: Option<String>,
    /// The slots.
    pub entries: Vec<BindGroupLayoutEntry>,
}

impl BindGroupLayoutDesc {
    /// Rejects duplicate binding indices.
    pub fn validate(&self) -> GraphicsResult<()> {
        let mut seen = std::collections::HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.binding) {
                return Err(GraphicsError::invalid(format!(
                    "bind group layout '{}' declares binding {} twice",
                    self.label.as_deref().unwrap_or("<unnamed>"),
                    entry.binding
                )));
            }
        }
        Ok(())
    }
}

/// The resource bound at one slot.
#[derive(Clone)]
pub enum BindingResource {
    /// A buffer range.
    Buffer {
        /// The buffer.
        buffer: Arc<dyn Buffer>,
        /// Byte offset.
        offset: u64,
        /// Byte length; `None` for the rest of the buffer.
        size: Option<u64>,
    },
    /// A sampler.
    Sampler(Arc<dyn Sampler>),
    /// A texture view.
    TextureView(Arc<dyn TextureView>),
}

impl std::fmt::Debug for BindingResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindingResource::Buffer { buffer, offset, size } => f
                .debug_struct("Buffer")
                .field("buffer", &buffer.label())
                .field("offset", offset)
                .field("size", size)
                .finish(),
            BindingResource::Sampler(_) => f.write_str("Sampler"),
            BindingResource::TextureView(view) => {
                f.debug_tuple("TextureView").field(&view.format()).finish()
            }
        }
    }
}

/// One slot of a bind group.
#[derive(Debug, Clone)]
pub struct BindGroupEntry {
    /// The `@binding` index.
    pub binding: u32,
    /// The bound resource.
    pub resource: BindingResource,
}

/// A descriptor used to create a bind group.
#[derive(Clone)]
pub struct BindGroupDesc {
    /// An optional debug label.
    pub label: Option<String>,
    /// The layout the group conforms to.
    pub layout: Arc<dyn BindGroupLayout>,
    /// The bound resources.
    pub entries: Vec<BindGroupEntry>,
}

impl std::fmt::Debug for BindGroupDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindGroupDesc")
            .field("label", &self.label)
            .field("entries", &self.entries)
            .finish()
    }
}
