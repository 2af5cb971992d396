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

//! Defines [`RenderPassState`], the bookkeeping a render pass encoder uses
//! to reject mismatched pipelines and incomplete draws before they reach
//! the driver.

use super::api::{IndexFormat, RenderPassDesc, TextureFormat};
use super::error::{GraphicsError, GraphicsResult};
use super::traits::RenderPipeline;

#[derive(Debug, Clone, Copy)]
struct BoundPipeline {
    vertex_buffer_count: u32,
}

/// What is bound inside one open render pass.
#[derive(Debug, Clone)]
pub struct RenderPassState {
    color_formats: Vec<TextureFormat>,
    depth_format: Option<TextureFormat>,
    sample_count: u32,
    pipeline: Option<BoundPipeline>,
    vertex_slots: u64,
    index_format: Option<IndexFormat>,
}

impl RenderPassState {
    /// Captures the attachment formats of the pass being opened.
    pub fn new(desc: &RenderPassDesc) -> Self {
        let sample_count = desc
            .color_attachments
            .first()
            .map(|a| a.view.sample_count())
            .or_else(|| {
                desc.depth_stencil_attachment
                    .as_ref()
                    .map(|a| a.view.sample_count())
            })
            .unwrap_or(1);
        Self {
            color_formats: desc.color_attachments.iter().map(|a| a.view.format()).collect(),
            depth_format: desc
                .depth_stencil_attachment
                .as_ref()
                .map(|a| a.view.format()),
            sample_count,
            pipeline: None,
            vertex_slots: 0,
            index_format: None,
        }
    }

    /// Records a pipeline binding.
    ///
    /// ## Errors
    /// * `InvalidArgument` if the pipeline's color or depth formats or its
    ///   sample count differ from the pass's attachments. The previous
    ///   binding is cleared so later draws are skipped.
    pub fn bind_pipeline(&mut self, pipeline: &dyn RenderPipeline) -> GraphicsResult<()> {
        self.pipeline = None;
        let label = pipeline.label().unwrap_or("<unnamed>");
        if pipeline.color_formats() != self.color_formats.as_slice() {
            return Err(GraphicsError::invalid(format!(
                "pipeline '{label}' targets {:?} but the pass renders to {:?}",
                pipeline.color_formats(),
                self.color_formats
            )));
        }
        if pipeline.depth_format() != self.depth_format {
            return Err(GraphicsError::invalid(format!(
                "pipeline '{label}' expects depth {:?} but the pass has {:?}",
                pipeline.depth_format(),
                self.depth_format
            )));
        }
        if pipeline.sample_count() != self.sample_count {
            return Err(GraphicsError::invalid(format!(
                "pipeline '{label}' rasterizes at {} samples but the pass has {}",
                pipeline.sample_count(),
                self.sample_count
            )));
        }
        self.pipeline = Some(BoundPipeline {
            vertex_buffer_count: pipeline.vertex_buffer_count(),
        });
        Ok(())
    }

    /// Records a vertex buffer in `slot`.
    pub fn bind_vertex_buffer(&mut self, slot: u32) -> GraphicsResult<()> {
        if slot >= u64::BITS {
            return Err(GraphicsError::invalid(format!(
                "vertex buffer slot {slot} is out of range"
            )));
        }
        self.vertex_slots |= 1 << slot;
        Ok(())
    }

    /// Records the index buffer format.
    pub fn bind_index_buffer(&mut self, format: IndexFormat) {
        self.index_format = Some(format);
    }

    /// The bound index format, if any.
    pub fn index_format(&self) -> Option<IndexFormat> {
        self.index_format
    }

    /// Whether a compatible pipeline is bound.
    pub fn has_pipeline(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Checks that a non-indexed draw has everything it needs.
    pub fn check_draw(&self) -> GraphicsResult<()> {
        let Some(pipeline) = self.pipeline else {
            return Err(GraphicsError::state("draw without a bound pipeline"));
        };
        if let Some(slot) =
            (0..pipeline.vertex_buffer_count).find(|slot| self.vertex_slots & (1 << slot) == 0)
        {
            return Err(GraphicsError::state(format!(
                "draw without a vertex buffer in slot {slot}"
            )));
        }
        Ok(())
    }

    /// Checks that an indexed draw has everything it needs.
    pub fn check_draw_indexed(&self) -> GraphicsResult<()> {
        self.check_draw()?;
        if self.index_format.is_none() {
            return Err(GraphicsError::state("indexed draw without an index buffer"));
        }
        Ok(())
    }
}
