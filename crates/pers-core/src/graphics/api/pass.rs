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

//! Defines the per-pass render pass descriptor.

use super::enums::{LoadOp, StoreOp};
use crate::graphics::traits::TextureView;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A linear RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
    /// Alpha.
    pub a: f64,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    /// Builds a color from its components.
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// One color attachment of a render pass.
#[derive(Clone)]
pub struct RenderPassColorAttachment {
    /// The view rendered into.
    pub view: Arc<dyn TextureView>,
    /// Where a multisampled view resolves to, if anywhere.
    pub resolve_target: Option<Arc<dyn TextureView>>,
    /// What happens at the start of the pass.
    pub load_op: LoadOp,
    /// What happens at the end of the pass.
    pub store_op: StoreOp,
    /// The clear value used with [`LoadOp::Clear`].
    pub clear_color: Color,
}

/// The depth/stencil attachment of a render pass.
#[derive(Clone)]
pub struct RenderPassDepthStencilAttachment {
    /// The view rendered into.
    pub view: Arc<dyn TextureView>,
    /// Depth load operation.
    pub depth_load_op: LoadOp,
    /// Depth store operation.
    pub depth_store_op: StoreOp,
    /// Depth clear value.
    pub depth_clear_value: f32,
    /// Whether depth is read-only in this pass.
    pub depth_read_only: bool,
    /// Stencil load operation.
    pub stencil_load_op: LoadOp,
    /// Stencil store operation.
    pub stencil_store_op: StoreOp,
    /// Stencil clear value.
    pub stencil_clear_value: u32,
    /// Whether stencil is read-only in this pass.
    pub stencil_read_only: bool,
}

/// Everything needed to begin one render pass.
#[derive(Clone, Default)]
pub struct RenderPassDesc {
    /// An optional debug label.
    pub label: Option<String>,
    /// Color attachments, in location order.
    pub color_attachments: Vec<RenderPassColorAttachment>,
    /// The depth/stencil attachment, if any.
    pub depth_stencil_attachment: Option<RenderPassDepthStencilAttachment>,
}

impl std::fmt::Debug for RenderPassDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPassDesc")
            .field("label", &self.label)
            .field("color_attachments", &self.color_attachments.len())
            .field(
                "depth_stencil_attachment",
                &self.depth_stencil_attachment.is_some(),
            )
            .finish()
    }
}

/// The rasterizer viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Near depth.
    pub min_depth: f32,
    /// Far depth.
    pub max_depth: f32,
}

impl Viewport {
    /// A full-depth viewport covering `width` x `height`.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// A pixel rectangle outside of which fragments are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScissorRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}
