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

//! Defines [`RenderPassConfig`], the framebuffer-independent description of
//! how a render pass loads and stores its attachments.

use super::api::{
    Color, LoadOp, RenderPassColorAttachment, RenderPassDepthStencilAttachment, RenderPassDesc,
    StoreOp,
};
use super::framebuffer::Framebuffer;
use serde::{Deserialize, Serialize};

/// Load/store behaviour of one color slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorAttachmentConfig {
    /// What happens at the start of the pass.
    pub load_op: LoadOp,
    /// What happens at the end of the pass.
    pub store_op: StoreOp,
    /// The clear value used with [`LoadOp::Clear`].
    pub clear_color: Color,
}

impl Default for ColorAttachmentConfig {
    fn default() -> Self {
        Self {
            load_op: LoadOp::Clear,
            store_op: StoreOp::Store,
            clear_color: Color::BLACK,
        }
    }
}

impl ColorAttachmentConfig {
    /// Clears to `color` and stores.
    pub fn clear(color: Color) -> Self {
        Self {
            clear_color: color,
            ..Default::default()
        }
    }

    /// Keeps the previous contents and stores.
    pub fn load() -> Self {
        Self {
            load_op: LoadOp::Load,
            ..Default::default()
        }
    }
}

/// Load/store behaviour of the depth/stencil slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthStencilConfig {
    /// Depth load operation.
    pub depth_load_op: LoadOp,
    /// Depth store operation.
    pub depth_store_op: StoreOp,
    /// Depth clear value.
    pub depth_clear_value: f32,
    /// Whether depth is read-only.
    pub depth_read_only: bool,
    /// Stencil load operation.
    pub stencil_load_op: LoadOp,
    /// Stencil store operation.
    pub stencil_store_op: StoreOp,
    /// Stencil clear value.
    pub stencil_clear_value: u32,
    /// Whether stencil is read-only.
    pub stencil_read_only: bool,
}

impl Default for DepthStencilConfig {
    fn default() -> Self {
        Self {
            depth_load_op: LoadOp::Clear,
            depth_store_op: StoreOp::Store,
            depth_clear_value: 1.0,
            depth_read_only: false,
            stencil_load_op: LoadOp::Clear,
            stencil_store_op: StoreOp::Discard,
            stencil_clear_value: 0,
            stencil_read_only: false,
        }
    }
}

/// Describes a render pass without naming the views it renders into.
///
/// [`project`](Self::project) pairs the configuration with a framebuffer
/// to produce a [`RenderPassDesc`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderPassConfig {
    /// An optional debug label.
    pub label: Option<String>,
    /// One entry per color slot, in location order.
    pub color: Vec<ColorAttachmentConfig>,
    /// Depth/stencil behaviour, if the pass uses depth.
    pub depth_stencil: Option<DepthStencilConfig>,
}

impl RenderPassConfig {
    /// A pass with `color_count` default color slots and no depth.
    pub fn with_colors(color_count: usize) -> Self {
        Self {
            label: None,
            color: vec![ColorAttachmentConfig::default(); color_count],
            depth_stencil: None,
        }
    }

    /// Sets the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Adds the default depth/stencil configuration.
    pub fn with_depth(mut self) -> Self {
        self.depth_stencil = Some(DepthStencilConfig::default());
        self
    }

    /// Pairs each configured slot with the framebuffer attachment at the
    /// same index.
    ///
    /// Slots the framebuffer has no view for are skipped, framebuffer
    /// attachments beyond the configured slots are ignored, and depth is
    /// attached only when both sides have it.
    pub fn project(&self, framebuffer: &dyn Framebuffer) -> RenderPassDesc {
        let color_attachments = self
            .color
            .iter()
            .enumerate()
            .filter_map(|(index, config)| {
                let Some(view) = framebuffer.color_attachment(index) else {
                    log::warn!("Framebuffer missing color attachment at index {index}");
                    return None;
                };
                Some(RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    load_op: config.load_op,
                    store_op: config.store_op,
                    clear_color: config.clear_color,
                })
            })
            .collect();

        let depth_stencil_attachment = self.depth_stencil.as_ref().and_then(|config| {
            let view = framebuffer.depth_stencil_attachment()?;
            Some(RenderPassDepthStencilAttachment {
                view,
                depth_load_op: config.depth_load_op,
                depth_store_op: config.depth_store_op,
                depth_clear_value: config.depth_clear_value,
                depth_read_only: config.depth_read_only,
                stencil_load_op: config.stencil_load_op,
                stencil_store_op: config.stencil_store_op,
                stencil_clear_value: config.stencil_clear_value,
                stencil_read_only: config.stencil_read_only,
            })
        });

        RenderPassDesc {
            label: self.label.clone(),
            color_attachments,
            depth_stencil_attachment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::api::TextureFormat;
    use crate::graphics::framebuffer::{MrtFramebuffer, OffscreenFramebuffer, OffscreenFramebufferConfig};
    use crate::graphics::mock::MockDevice;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_clear_to_opaque_black_and_far_depth() {
        let color = ColorAttachmentConfig::default();
        assert_eq!(color.load_op, LoadOp::Clear);
        assert_eq!(color.clear_color, Color::rgba(0.0, 0.0, 0.0, 1.0));
        let depth = DepthStencilConfig::default();
        assert_relative_eq!(depth.depth_clear_value, 1.0);
        assert_eq!(depth.stencil_store_op, StoreOp::Discard);
        assert!(!depth.depth_read_only);
    }

    #[test]
    fn projection_never_exceeds_either_side() {
        let device = MockDevice::new();
        let fb = MrtFramebuffer::new(
            &device,
            32,
            32,
            &[TextureFormat::Rgba8Unorm, TextureFormat::R32Float],
            None,
        )
        .unwrap();

        let desc = RenderPassConfig::with_colors(3).with_depth().project(&fb);
        assert_eq!(desc.color_attachments.len(), 2);
        assert!(desc.depth_stencil_attachment.is_none());

        let desc = RenderPassConfig::with_colors(1).project(&fb);
        assert_eq!(desc.color_attachments.len(), 1);
        assert_eq!(desc.color_attachments[0].view.format(), TextureFormat::Rgba8Unorm);
    }

    #[test]
    fn depth_is_attached_when_both_sides_have_it() {
        let device = MockDevice::new();
        let fb = OffscreenFramebuffer::new(
            &device,
            OffscreenFramebufferConfig {
                width: 16,
                height: 16,
                color_formats: vec![TextureFormat::Bgra8Unorm],
                depth_format: Some(TextureFormat::Depth24Plus),
                ..Default::default()
            },
        )
        .unwrap();

        let config = RenderPassConfig {
            color: vec![ColorAttachmentConfig::clear(Color::WHITE)],
            ..Default::default()
        }
        .with_label("Main")
        .with_depth();
        let desc = config.project(&fb);
        assert_eq!(desc.label.as_deref(), Some("Main"));
        assert_eq!(desc.color_attachments[0].clear_color, Color::WHITE);
        let depth = desc.depth_stencil_attachment.unwrap();
        assert_eq!(depth.view.format(), TextureFormat::Depth24Plus);

        let no_depth = RenderPassConfig::with_colors(1).project(&fb);
        assert!(no_depth.depth_stencil_attachment.is_none());
    }

    #[test]
    fn config_loads_from_json() {
        let config: RenderPassConfig = serde_json::from_str(
            r#"{ "label": "Ui", "color": [{ "load_op": "Load" }] }"#,
        )
        .unwrap();
        assert_eq!(config.color[0].load_op, LoadOp::Load);
        assert_eq!(config.color[0].store_op, StoreOp::Store);
        assert!(config.depth_stencil.is_none());
    }
}
