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

use super::attachments::{factory_of, AttachmentSpec, Attachments};
use super::validation::{normalize_sample_count, validate_attachment_count, validate_dimensions};
use super::{Framebuffer, ResizableFramebuffer};
use crate::graphics::api::{TextureFormat, TextureUsage};
use crate::graphics::error::GraphicsResult;
use crate::graphics::traits::{LogicalDevice, TextureView};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};

/// How an [`OffscreenFramebuffer`] is laid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffscreenFramebufferConfig {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Samples per pixel; 1, 2, 4 or 8.
    pub sample_count: u32,
    /// One color attachment per format.
    pub color_formats: Vec<TextureFormat>,
    /// The depth/stencil format, if any.
    pub depth_format: Option<TextureFormat>,
    /// Usages of the color textures.
    pub color_usage: TextureUsage,
    /// Usages of the depth texture.
    pub depth_usage: TextureUsage,
}

impl Default for OffscreenFramebufferConfig {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            sample_count: 1,
            color_formats: Vec::new(),
            depth_format: None,
            color_usage: TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
            depth_usage: TextureUsage::RENDER_ATTACHMENT,
        }
    }
}

struct OffscreenState {
    config: OffscreenFramebufferConfig,
    attachments: Attachments,
}

/// A framebuffer that owns its textures.
///
/// The configuration and the attachments built from it sit behind one lock,
/// so readers never see views of a different size than `width()` reports.
pub struct OffscreenFramebuffer {
    name: &'static str,
    device: Weak<dyn LogicalDevice>,
    state: RwLock<OffscreenState>,
}

impl OffscreenFramebuffer {
    /// Validates `config` and creates every attachment.
    pub fn new(device: &Arc<dyn LogicalDevice>, config: OffscreenFramebufferConfig) -> GraphicsResult<Self> {
        Self::with_name("OffscreenFramebuffer", device, config)
    }

    pub(crate) fn with_name(
        name: &'static str,
        device: &Arc<dyn LogicalDevice>,
        mut config: OffscreenFramebufferConfig,
    ) -> GraphicsResult<Self> {
        validate_dimensions(name, config.width, config.height)?;
        validate_attachment_count(name, config.color_formats.len(), config.depth_format.is_some())?;
        config.sample_count = normalize_sample_count(name, config.sample_count);

        let device = Arc::downgrade(device);
        let attachments = Self::create_attachments(name, &device, &config)?;
        log::debug!(
            "{name}: created {}x{}, {} color attachments, sample count {}",
            config.width,
            config.height,
            config.color_formats.len(),
            config.sample_count
        );
        Ok(Self {
            name,
            device,
            state: RwLock::new(OffscreenState {
                config,
                attachments,
            }),
        })
    }

    fn create_attachments(
        name: &str,
        device: &Weak<dyn LogicalDevice>,
        config: &OffscreenFramebufferConfig,
    ) -> GraphicsResult<Attachments> {
        let factory = factory_of(name, device)?;
        Attachments::create(
            factory.as_ref(),
            &AttachmentSpec {
                label_prefix: "Offscreen",
                width: config.width,
                height: config.height,
                sample_count: config.sample_count,
                color_formats: &config.color_formats,
                color_usage: config.color_usage,
                depth_format: config.depth_format,
                depth_usage: config.depth_usage,
            },
        )
        .inspect_err(|e| log::error!("{name}: failed to create attachments: {e}"))
    }

    /// A copy of the current configuration.
    pub fn config(&self) -> OffscreenFramebufferConfig {
        self.state.read().config.clone()
    }
}

impl Framebuffer for OffscreenFramebuffer {
    fn color_attachment(&self, index: usize) -> Option<Arc<dyn TextureView>> {
        self.state.read().attachments.color_views.get(index).cloned()
    }

    fn depth_stencil_attachment(&self) -> Option<Arc<dyn TextureView>> {
        self.state.read().attachments.depth_view.clone()
    }

    fn width(&self) -> u32 {
        self.state.read().config.width
    }

    fn height(&self) -> u32 {
        self.state.read().config.height
    }

    fn sample_count(&self) -> u32 {
        self.state.read().config.sample_count
    }

    fn color_format(&self, index: usize) -> Option<TextureFormat> {
        self.state.read().config.color_formats.get(index).copied()
    }

    fn depth_format(&self) -> Option<TextureFormat> {
        self.state.read().config.depth_format
    }

    fn color_attachment_count(&self) -> usize {
        self.state.read().config.color_formats.len()
    }
}

impl ResizableFramebuffer for OffscreenFramebuffer {
    fn resize(&self, width: u32, height: u32) -> GraphicsResult<()> {
        let mut state = self.state.write();
        if (state.config.width, state.config.height) == (width, height) {
            return Ok(());
        }
        validate_dimensions(self.name, width, height)?;
        let mut resized = state.config.clone();
        resized.width = width;
        resized.height = height;
        let attachments = Self::create_attachments(self.name, &self.device, &resized)?;
        *state = OffscreenState {
            config: resized,
            attachments,
        };
        log::debug!("{}: resized to {width}x{height}", self.name);
        Ok(())
    }
}
