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

//! Defines shader module and render pipeline descriptors.

use super::buffer::BufferLimits;
use super::enums::{
    BlendFactor, BlendOperation, CompareFunction, CullMode, FrontFace, IndexFormat,
    PrimitiveTopology, ShaderStage, StencilOperation, VertexFormat, VertexStepMode,
};
use super::flags::ColorWrites;
use super::format::TextureFormat;
use crate::graphics::error::{GraphicsError, GraphicsResult};
use crate::graphics::traits::{BindGroupLayout, ShaderModule};
use std::sync::Arc;

/// Most color targets a pipeline or framebuffer can have.
pub const MAX_COLOR_ATTACHMENTS: usize = 8;

/// A descriptor used to create a shader module from WGSL source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderModuleDesc {
    /// An optional debug label.
    pub label: Option<String>,
    /// The WGSL source.
    pub source: String,
    /// The stage the entry point belongs to.
    pub stage: ShaderStage,
    /// The entry point function.
    pub entry_point: String,
}

impl ShaderModuleDesc {
    /// A WGSL module with one entry point.
    pub fn wgsl(
        label: impl Into<String>,
        source: impl Into<String>,
        stage: ShaderStage,
        entry_point: impl Into<String>,
    ) -> Self {
        Self {
            label: Some(label.into()),
            source: source.into(),
            stage,
            entry_point: entry_point.into(),
        }
    }
}

/// One attribute inside a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// The attribute format.
    pub format: VertexFormat,
    /// Byte offset inside one vertex.
    pub offset: u64,
    /// The `@location` it feeds.
    pub shader_location: u32,
}

/// The layout of one vertex buffer slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VertexBufferLayout {
    /// Bytes between consecutive elements.
    pub array_stride: u64,
    /// Per-vertex or per-instance stepping.
    pub step_mode: VertexStepMode,
    /// The attributes read from the buffer.
    pub attributes: Vec<VertexAttribute>,
}

impl VertexBufferLayout {
    /// A tightly packed per-vertex layout: attribute offsets follow the
    /// formats in order and locations count up from `first_location`.
    pub fn packed(formats: &[VertexFormat], first_location: u32) -> Self {
        let mut offset = 0;
        let attributes = formats
            .iter()
            .enumerate()
            .map(|(i, &format)| {
                let attribute = VertexAttribute {
                    format,
                    offset,
                    shader_location: first_location + i as u32,
                };
                offset += format.size();
                attribute
            })
            .collect();
        Self {
            array_stride: offset,
            step_mode: VertexStepMode::Vertex,
            attributes,
        }
    }
}

/// How primitives are assembled and rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PrimitiveState {
    /// The topology.
    pub topology: PrimitiveTopology,
    /// The index format used with strip topologies, if any.
    pub strip_index_format: Option<IndexFormat>,
    /// The front-facing winding.
    pub front_face: FrontFace,
    /// Culling.
    pub cull_mode: CullMode,
}

/// Stencil behaviour for one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilFaceState {
    /// The test.
    pub compare: CompareFunction,
    /// Operation when the stencil test fails.
    pub fail_op: StencilOperation,
    /// Operation when the depth test fails.
    pub depth_fail_op: StencilOperation,
    /// Operation when both pass.
    pub pass_op: StencilOperation,
}

impl Default for StencilFaceState {
    fn default() -> Self {
        Self {
            compare: CompareFunction::Always,
            fail_op: StencilOperation::Keep,
            depth_fail_op: StencilOperation::Keep,
            pass_op: StencilOperation::Keep,
        }
    }
}

/// Stencil configuration for both faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilState {
    /// Front faces.
    pub front: StencilFaceState,
    /// Back faces.
    pub back: StencilFaceState,
    /// Mask applied when reading.
    pub read_mask: u32,
    /// Mask applied when writing.
    pub write_mask: u32,
}

impl Default for StencilState {
    fn default() -> Self {
        Self {
            front: StencilFaceState::default(),
            back: StencilFaceState::default(),
            read_mask: 0xFF,
            write_mask: 0xFF,
        }
    }
}

/// Depth bias applied during rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DepthBiasState {
    /// Constant bias.
    pub constant: i32,
    /// Slope-scaled bias.
    pub slope_scale: f32,
    /// Maximum bias.
    pub clamp: f32,
}

/// Depth and stencil testing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthStencilState {
    /// Format of the depth attachment; must match the framebuffer.
    pub format: TextureFormat,
    /// Whether passing fragments write depth.
    pub depth_write_enabled: bool,
    /// The depth test.
    pub depth_compare: CompareFunction,
    /// Stencil configuration.
    pub stencil: StencilState,
    /// Depth bias.
    pub bias: DepthBiasState,
}

impl DepthStencilState {
    /// Standard less-than depth testing with writes.
    pub fn depth_less(format: TextureFormat) -> Self {
        Self {
            format,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }
    }
}

/// Multisampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MultisampleState {
    /// Samples per pixel.
    pub count: u32,
    /// Sample mask.
    pub mask: u32,
    /// Whether alpha drives coverage.
    pub alpha_to_coverage_enabled: bool,
}

impl Default for MultisampleState {
    fn default() -> Self {
        Self {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        }
    }
}

/// One side of a blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponent {
    /// Factor applied to the source.
    pub src_factor: BlendFactor,
    /// Factor applied to the destination.
    pub dst_factor: BlendFactor,
    /// How the terms combine.
    pub operation: BlendOperation,
}

impl BlendComponent {
    /// Source replaces destination.
    pub const REPLACE: Self = Self {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::Zero,
        operation: BlendOperation::Add,
    };
    /// Standard non-premultiplied alpha blending.
    pub const ALPHA_BLENDING: Self = Self {
        src_factor: BlendFactor::SrcAlpha,
        dst_factor: BlendFactor::OneMinusSrcAlpha,
        operation: BlendOperation::Add,
    };
}

/// Color and alpha blending for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendState {
    /// Color channels.
    pub color: BlendComponent,
    /// Alpha channel.
    pub alpha: BlendComponent,
}

impl BlendState {
    /// No blending.
    pub const REPLACE: Self = Self {
        color: BlendComponent::REPLACE,
        alpha: BlendComponent::REPLACE,
    };
    /// Alpha blending on color, replace on alpha.
    pub const ALPHA_BLENDING: Self = Self {
        color: BlendComponent::ALPHA_BLENDING,
        alpha: BlendComponent::REPLACE,
    };
}

/// One color output of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorTargetState {
    /// Format of the attachment; must match the framebuffer.
    pub format: TextureFormat,
    /// Blending, if any.
    pub blend: Option<BlendState>,
    /// Written channels.
    pub write_mask: ColorWrites,
}

impl From<TextureFormat> for ColorTargetState {
    fn from(format: TextureFormat) -> Self {
        Self {
            format,
            blend: Some(BlendState::REPLACE),
            write_mask: ColorWrites::ALL,
        }
    }
}

/// A descriptor used to create a render pipeline.
#[derive(Clone)]
pub struct RenderPipelineDesc {
    /// An optional debug label.
    pub label: Option<String>,
    /// The vertex stage module.
    pub vertex_shader: Arc<dyn ShaderModule>,
    /// The fragment stage module, if any.
    pub fragment_shader: Option<Arc<dyn ShaderModule>>,
    /// One layout per vertex buffer slot.
    pub vertex_layouts: Vec<VertexBufferLayout>,
    /// Primitive assembly.
    pub primitive: PrimitiveState,
    /// Depth and stencil testing.
    pub depth_stencil: Option<DepthStencilState>,
    /// Multisampling.
    pub multisample: MultisampleState,
    /// Color outputs.
    pub color_targets: Vec<ColorTargetState>,
    /// Bind group layouts, in group order.
    pub bind_group_layouts: Vec<Arc<dyn BindGroupLayout>>,
}

impl std::fmt::Debug for RenderPipelineDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipelineDesc")
            .field("label", &self.label)
            .field("vertex_layouts", &self.vertex_layouts)
            .field("primitive", &self.primitive)
            .field("depth_stencil", &self.depth_stencil)
            .field("multisample", &self.multisample)
            .field("color_targets", &self.color_targets)
            .field("bind_group_layouts", &self.bind_group_layouts.len())
            .finish()
    }
}

impl RenderPipelineDesc {
    /// A pipeline with default fixed-function state.
    pub fn new(vertex_shader: Arc<dyn ShaderModule>) -> Self {
        Self {
            label: None,
            vertex_shader,
            fragment_shader: None,
            vertex_layouts: Vec::new(),
            primitive: PrimitiveState::default(),
            depth_stencil: None,
            multisample: MultisampleState::default(),
            color_targets: Vec::new(),
            bind_group_layouts: Vec::new(),
        }
    }

    /// Checks stages, vertex layouts, targets and the depth format.
    pub fn validate(&self) -> GraphicsResult<()> {
        let label = self.label.as_deref().unwrap_or("<unnamed>");
        if self.vertex_shader.stage() != ShaderStage::Vertex {
            return Err(GraphicsError::invalid(format!(
                "pipeline '{label}': vertex shader has stage {}",
                self.vertex_shader.stage()
            )));
        }
        if let Some(fragment) = &self.fragment_shader {
            if fragment.stage() != ShaderStage::Fragment {
                return Err(GraphicsError::invalid(format!(
                    "pipeline '{label}': fragment shader has stage {}",
                    fragment.stage()
                )));
            }
        }
        let attribute_count: usize = self.vertex_layouts.iter().map(|l| l.attributes.len()).sum();
        if attribute_count > BufferLimits::MAX_VERTEX_ATTRIBUTES as usize {
            return Err(GraphicsError::invalid(format!(
                "pipeline '{label}': {attribute_count} vertex attributes exceed {}",
                BufferLimits::MAX_VERTEX_ATTRIBUTES
            )));
        }
        if let Some(layout) = self
            .vertex_layouts
            .iter()
            .find(|l| l.array_stride > BufferLimits::MAX_VERTEX_BUFFER_STRIDE as u64)
        {
            return Err(GraphicsError::invalid(format!(
                "pipeline '{label}': vertex stride {} exceeds {}",
                layout.array_stride,
                BufferLimits::MAX_VERTEX_BUFFER_STRIDE
            )));
        }
        if self.color_targets.len() > MAX_COLOR_ATTACHMENTS {
            return Err(GraphicsError::invalid(format!(
                "pipeline '{label}': {} color targets exceed {MAX_COLOR_ATTACHMENTS}",
                self.color_targets.len()
            )));
        }
        if self.color_targets.is_empty() && self.depth_stencil.is_none() {
            return Err(GraphicsError::invalid(format!(
                "pipeline '{label}' has neither color targets nor a depth-stencil state"
            )));
        }
        if !self.color_targets.is_empty() && self.fragment_shader.is_none() {
            return Err(GraphicsError::invalid(format!(
                "pipeline '{label}' has color targets but no fragment shader"
            )));
        }
        if let Some(ds) = &self.depth_stencil {
            if !ds.format.is_depth_or_stencil() {
                return Err(GraphicsError::invalid(format!(
                    "pipeline '{label}': {} is not a depth/stencil format",
                    ds.format
                )));
            }
        }
        if self.primitive.strip_index_format.is_some() && !self.primitive.topology.is_strip() {
            return Err(GraphicsError::invalid(format!(
                "pipeline '{label}': strip index format set on {} topology",
                self.primitive.topology
            )));
        }
        Ok(())
    }

    /// Whether the pipeline can render into attachments with these formats.
    pub fn is_compatible_with(
        &self,
        color_formats: &[TextureFormat],
        depth_format: Option<TextureFormat>,
    ) -> bool {
        let colors_match = self.color_targets.len() == color_formats.len()
            && self
                .color_targets
                .iter()
                .zip(color_formats)
                .all(|(target, format)| target.format == *format);
        let depth_matches = self.depth_stencil.map(|ds| ds.format) == depth_format;
        colors_match && depth_matches
    }
}
