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

use super::offscreen::{OffscreenFramebuffer, OffscreenFramebufferConfig};
use crate::graphics::api::{TextureFormat, TextureUsage, MAX_COLOR_ATTACHMENTS};
use crate::graphics::error::{GraphicsError, GraphicsResult};
use crate::graphics::traits::LogicalDevice;
use std::sync::Arc;

/// A multiple-render-target framebuffer: one to eight single-sample color
/// attachments, all sampleable, for deferred shading.
pub struct MrtFramebuffer {
    inner: OffscreenFramebuffer,
}

impl MrtFramebuffer {
    /// Creates the color targets and the optional depth attachment.
    pub fn new(
        device: &Arc<dyn LogicalDevice>,
        width: u32,
        height: u32,
        color_formats: &[TextureFormat],
        depth_format: Option<TextureFormat>,
    ) -> GraphicsResult<Self> {
        if color_formats.is_empty() || color_formats.len() > MAX_COLOR_ATTACHMENTS {
            log::error!(
                "MrtFramebuffer: {} color formats given, expected 1 to {MAX_COLOR_ATTACHMENTS}",
                color_formats.len()
            );
            return Err(GraphicsError::invalid(format!(
                "MRT framebuffers need 1 to {MAX_COLOR_ATTACHMENTS} color formats, got {}",
                color_formats.len()
            )));
        }
        log::debug!(
            "MrtFramebuffer: creating {} color attachments",
            color_formats.len()
        );
        let config = OffscreenFramebufferConfig {
            width,
            height,
            sample_count: 1,
            color_formats: color_formats.to_vec(),
            depth_format,
            color_usage: TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
            depth_usage: TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
        };
        let inner = OffscreenFramebuffer::with_name("MrtFramebuffer", device, config)?;
        Ok(Self { inner })
    }
}

delegate_framebuffer!(MrtFramebuffer);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::mock::MockDevice;

    #[test]
    fn gbuffer_layout() {
        let device = MockDevice::new();
        let formats = [
            TextureFormat::Rgba8Unorm,
            TextureFormat::Rgba16Float,
            TextureFormat::Rg16Float,
        ];
        let fb = MrtFramebuffer::new(&device, 800, 600, &formats, Some(TextureFormat::Depth32Float))
            .unwrap();
        assert_eq!(fb.color_formats(), formats.to_vec());
        assert_eq!(fb.sample_count(), 1);
        assert_eq!(fb.depth_format(), Some(TextureFormat::Depth32Float));
    }

    #[test]
    fn color_count_bounds() {
        let device = MockDevice::new();
        assert!(MrtFramebuffer::new(&device, 8, 8, &[], None).is_err());
        assert!(MrtFramebuffer::new(&device, 8, 8, &[TextureFormat::Rgba8Unorm; 9], None).is_err());
        assert!(MrtFramebuffer::new(&device, 8, 8, &[TextureFormat::Rgba8Unorm; 8], None).is_ok());
    }

    #[test]
    fn resize_forwards() {
        let device = MockDevice::new();
        let fb = MrtFramebuffer::new(&device, 8, 8, &[TextureFormat::Rgba8Unorm], None).unwrap();
        fb.resize(16, 32).unwrap();
        assert_eq!((fb.width(), fb.height()), (16, 32));
    }
}
