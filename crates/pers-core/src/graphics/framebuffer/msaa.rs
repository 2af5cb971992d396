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
use crate::graphics::api::{TextureFormat, TextureUsage};
use crate::graphics::error::GraphicsResult;
use crate::graphics::traits::LogicalDevice;
use std::sync::Arc;

/// A multisampled framebuffer with one color attachment.
///
/// Its textures are render attachments only; resolve them into a
/// single-sample target to read the result.
pub struct MsaaFramebuffer {
    inner: OffscreenFramebuffer,
}

impl MsaaFramebuffer {
    /// Creates the multisampled color and optional depth attachments.
    pub fn new(
        device: &Arc<dyn LogicalDevice>,
        width: u32,
        height: u32,
        color_format: TextureFormat,
        depth_format: Option<TextureFormat>,
        sample_count: u32,
    ) -> GraphicsResult<Self> {
        if sample_count <= 1 {
            log::warn!(
                "MsaaFramebuffer: created with sample count {sample_count}, should be greater than 1"
            );
        }
        let config = OffscreenFramebufferConfig {
            width,
            height,
            sample_count,
            color_formats: vec![color_format],
            depth_format,
            color_usage: TextureUsage::RENDER_ATTACHMENT,
            depth_usage: TextureUsage::RENDER_ATTACHMENT,
        };
        let inner = OffscreenFramebuffer::with_name("MsaaFramebuffer", device, config)?;
        Ok(Self { inner })
    }
}

delegate_framebuffer!(MsaaFramebuffer);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::mock::{MockDevice, MockDeviceExt};

    #[test]
    fn four_x_msaa() {
        let device = MockDevice::new();
        let fb = MsaaFramebuffer::new(
            &device,
            640,
            480,
            TextureFormat::Bgra8Unorm,
            Some(TextureFormat::Depth24Plus),
            4,
        )
        .unwrap();
        assert_eq!(fb.sample_count(), 4);
        assert_eq!(fb.color_attachment(0).unwrap().sample_count(), 4);
        assert_eq!(
            device.mock_factory().texture_usages(),
            vec![TextureUsage::RENDER_ATTACHMENT; 2]
        );
    }

    #[test]
    fn single_sample_is_allowed_with_a_warning() {
        let device = MockDevice::new();
        let fb =
            MsaaFramebuffer::new(&device, 64, 64, TextureFormat::Rgba8Unorm, None, 1).unwrap();
        assert_eq!(fb.sample_count(), 1);
    }
}
