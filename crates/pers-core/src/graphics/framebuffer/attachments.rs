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

use crate::graphics::api::{TextureAspect, TextureDesc, TextureFormat, TextureUsage, TextureViewDesc};
use crate::graphics::error::{GraphicsError, GraphicsResult};
use crate::graphics::traits::{LogicalDevice, ResourceFactory, Texture, TextureView};
use std::sync::{Arc, Weak};

/// What to create.
pub(crate) struct AttachmentSpec<'a> {
    pub label_prefix: &'a str,
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
    pub color_formats: &'a [TextureFormat],
    pub color_usage: TextureUsage,
    pub depth_format: Option<TextureFormat>,
    pub depth_usage: TextureUsage,
}

/// The textures and views of one framebuffer, replaced as a unit.
#[derive(Clone, Default)]
pub(crate) struct Attachments {
    pub color_textures: Vec<Arc<dyn Texture>>,
    pub color_views: Vec<Arc<dyn TextureView>>,
    pub depth_texture: Option<Arc<dyn Texture>>,
    pub depth_view: Option<Arc<dyn TextureView>>,
}

impl Attachments {
    /// Creates every texture and view. Nothing is kept if any creation fails.
    pub fn create(factory: &dyn ResourceFactory, spec: &AttachmentSpec<'_>) -> GraphicsResult<Self> {
        let prefix = spec.label_prefix;
        let mut attachments = Attachments::default();
        for (i, format) in spec.color_formats.iter().copied().enumerate() {
            let desc = TextureDesc::new_2d(spec.width, spec.height, format, spec.color_usage)
                .with_label(format!("{prefix}ColorTexture{i}"))
                .with_sample_count(spec.sample_count);
            let texture = factory.create_texture(&desc)?;
            let view = factory.create_texture_view(
                &texture,
                &TextureViewDesc::attachment(format!("{prefix}ColorView{i}"), format, TextureAspect::All),
            )?;
            attachments.color_textures.push(texture);
            attachments.color_views.push(view);
        }
        if let Some(format) = spec.depth_format {
            let desc = TextureDesc::new_2d(spec.width, spec.height, format, spec.depth_usage)
                .with_label(format!("{prefix}DepthTexture"))
                .with_sample_count(spec.sample_count);
            let texture = factory.create_texture(&desc)?;
            let view = factory.create_texture_view(
                &texture,
                &TextureViewDesc::attachment(
                    format!("{prefix}DepthView"),
                    format,
                    format.attachment_aspect(),
                ),
            )?;
            attachments.depth_texture = Some(texture);
            attachments.depth_view = Some(view);
        }
        Ok(attachments)
    }
}

/// Upgrades the device reference and fetches its factory.
pub(crate) fn factory_of(
    owner: &str,
    device: &Weak<dyn LogicalDevice>,
) -> GraphicsResult<Arc<dyn ResourceFactory>> {
    match device.upgrade() {
        Some(device) => Ok(device.resource_factory()),
        None => {
            log::error!("{owner}: device expired");
            Err(GraphicsError::DeviceExpired)
        }
    }
}
