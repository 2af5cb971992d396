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
use super::validation::{normalize_sample_count, validate_dimensions};
use super::{Framebuffer, ResizableFramebuffer};
use crate::graphics::api::{TextureFormat, TextureUsage};
use crate::graphics::error::{GraphicsError, GraphicsResult};
use crate::graphics::traits::{LogicalDevice, TextureView};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

#[derive(Debug, Clone, Copy)]
struct DepthLayout {
    width: u32,
    height: u32,
    format: TextureFormat,
    sample_count: u32,
    usage: TextureUsage,
}

struct DepthState {
    layout: DepthLayout,
    attachments: Attachments,
}

/// A framebuffer with a single depth (or stencil) attachment and no color.
///
/// The view aspect follows the format: `Stencil8` views the stencil aspect,
/// combined depth-stencil formats view everything, and pure depth formats
/// view the depth aspect.
pub struct DepthOnlyFramebuffer {
    name: &'static str,
    device: Weak<dyn LogicalDevice>,
    state: RwLock<DepthState>,
}

impl DepthOnlyFramebuffer {
    /// Creates the depth texture.
    ///
    /// ## Errors
    /// * `InvalidArgument` for a zero size or a format without depth or
    ///   stencil.
    pub fn new(
        device: &Arc<dyn LogicalDevice>,
        width: u32,
        height: u32,
        format: TextureFormat,
        sample_count: u32,
        usage: TextureUsage,
    ) -> GraphicsResult<Self> {
        Self::with_name("DepthOnlyFramebuffer", device, width, height, format, sample_count, usage)
    }

    fn with_name(
        name: &'static str,
        device: &Arc<dyn LogicalDevice>,
        width: u32,
        height: u32,
        format: TextureFormat,
        sample_count: u32,
        usage: TextureUsage,
    ) -> GraphicsResult<Self> {
        validate_dimensions(name, width, height)?;
        if !format.is_depth_or_stencil() {
            log::error!("{name}: invalid depth format {format}");
            return Err(GraphicsError::invalid(format!(
                "{name}: {format} is not a depth or stencil format"
            )));
        }
        let layout = DepthLayout {
            width,
            height,
            format,
            sample_count: normalize_sample_count(name, sample_count),
            usage: usage | TextureUsage::RENDER_ATTACHMENT,
        };
        let device = Arc::downgrade(device);
        let attachments = Self::create_attachments(name, &device, &layout)?;
        log::debug!(
            "{name}: created {width}x{height}, format {format}, sample count {}",
            layout.sample_count
        );
        Ok(Self {
            name,
            device,
            state: RwLock::new(DepthState {
                layout,
                attachments,
            }),
        })
    }

    fn create_attachments(
        name: &str,
        device: &Weak<dyn LogicalDevice>,
        layout: &DepthLayout,
    ) -> GraphicsResult<Attachments> {
        let factory = factory_of(name, device)?;
        Attachments::create(
            factory.as_ref(),
            &AttachmentSpec {
                label_prefix: "DepthOnly",
                width: layout.width,
                height: layout.height,
                sample_count: layout.sample_count,
                color_formats: &[],
                color_usage: TextureUsage::empty(),
                depth_format: Some(layout.format),
                depth_usage: layout.usage,
            },
        )
        .inspect_err(|e| log::error!("{name}: failed to create the depth texture: {e}"))
    }

    /// Usages of the depth texture.
    pub fn usage(&self) -> TextureUsage {
        self.state.read().layout.usage
    }
}

impl Framebuffer for DepthOnlyFramebuffer {
    fn color_attachment(&self, _index: usize) -> Option<Arc<dyn TextureView>> {
        None
    }

    fn depth_stencil_attachment(&self) -> Option<Arc<dyn TextureView>> {
        self.state.read().attachments.depth_view.clone()
    }

    fn width(&self) -> u32 {
        self.state.read().layout.width
    }

    fn height(&self) -> u32 {
        self.state.read().layout.height
    }

    fn sample_count(&self) -> u32 {
        self.state.read().layout.sample_count
    }

    fn color_format(&self, _index: usize) -> Option<TextureFormat> {
        None
    }

    fn depth_format(&self) -> Option<TextureFormat> {
        Some(self.state.read().layout.format)
    }

    fn color_attachment_count(&self) -> usize {
        0
    }
}

impl ResizableFramebuffer for DepthOnlyFramebuffer {
    fn resize(&self, width: u32, height: u32) -> GraphicsResult<()> {
        let mut state = self.state.write();
        if (state.layout.width, state.layout.height) == (width, height) {
            return Ok(());
        }
        validate_dimensions(self.name, width, height)?;
        let mut layout = state.layout;
        layout.width = width;
        layout.height = height;
        let attachments = Self::create_attachments(self.name, &self.device, &layout)?;
        *state = DepthState {
            layout,
            attachments,
        };
        Ok(())
    }
}

/// A square, sampleable depth-only framebuffer for shadow mapping.
pub struct ShadowMapFramebuffer {
    inner: DepthOnlyFramebuffer,
}

impl ShadowMapFramebuffer {
    /// Creates a `size` x `size` shadow map.
    pub fn new(device: &Arc<dyn LogicalDevice>, size: u32, format: TextureFormat) -> GraphicsResult<Self> {
        let inner = DepthOnlyFramebuffer::with_name(
            "ShadowMapFramebuffer",
            device,
            size,
            size,
            format,
            1,
            TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
        )?;
        Ok(Self { inner })
    }

    /// Edge length in pixels.
    pub fn size(&self) -> u32 {
        self.inner.width()
    }
}

impl Framebuffer for ShadowMapFramebuffer {
    fn color_attachment(&self, index: usize) -> Option<Arc<dyn TextureView>> {
        self.inner.color_attachment(index)
    }

    fn depth_stencil_attachment(&self) -> Option<Arc<dyn TextureView>> {
        self.inner.depth_stencil_attachment()
    }

    fn width(&self) -> u32 {
        self.inner.width()
    }

    fn height(&self) -> u32 {
        self.inner.height()
    }

    fn sample_count(&self) -> u32 {
        1
    }

    fn color_format(&self, index: usize) -> Option<TextureFormat> {
        self.inner.color_format(index)
    }

    fn depth_format(&self) -> Option<TextureFormat> {
        self.inner.depth_format()
    }

    fn color_attachment_count(&self) -> usize {
        0
    }
}

impl ResizableFramebuffer for ShadowMapFramebuffer {
    /// Shadow maps stay square; the larger of the two sizes wins.
    fn resize(&self, width: u32, height: u32) -> GraphicsResult<()> {
        let size = width.max(height);
        if width != height {
            log::warn!("ShadowMapFramebuffer: {width}x{height} is not square, using {size}x{size}");
        }
        self.inner.resize(size, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::api::TextureAspect;
    use crate::graphics::mock::MockDevice;

    fn depth_only(format: TextureFormat, samples: u32) -> GraphicsResult<DepthOnlyFramebuffer> {
        let device = MockDevice::new();
        DepthOnlyFramebuffer::new(&device, 256, 256, format, samples, TextureUsage::RENDER_ATTACHMENT)
    }

    #[test]
    fn aspect_follows_format() {
        let stencil = depth_only(TextureFormat::Stencil8, 1).unwrap();
        assert_eq!(
            stencil.depth_stencil_attachment().unwrap().aspect(),
            TextureAspect::StencilOnly
        );
        let combined = depth_only(TextureFormat::Depth32FloatStencil8, 1).unwrap();
        assert_eq!(
            combined.depth_stencil_attachment().unwrap().aspect(),
            TextureAspect::All
        );
        let depth = depth_only(TextureFormat::Depth16Unorm, 1).unwrap();
        assert_eq!(
            depth.depth_stencil_attachment().unwrap().aspect(),
            TextureAspect::DepthOnly
        );
        assert_eq!(depth.color_attachment_count(), 0);
        assert!(depth.has_depth_stencil_attachment());
    }

    #[test]
    fn color_formats_are_rejected() {
        assert!(depth_only(TextureFormat::Rgba8Unorm, 1).is_err());
    }

    #[test]
    fn sample_count_is_normalized() {
        assert_eq!(depth_only(TextureFormat::Depth24Plus, 4).unwrap().sample_count(), 4);
        assert_eq!(depth_only(TextureFormat::Depth24Plus, 3).unwrap().sample_count(), 1);
    }

    #[test]
    fn resize_swaps_layout_and_texture_together() {
        let device = MockDevice::new();
        let fb = DepthOnlyFramebuffer::new(
            &device,
            64,
            64,
            TextureFormat::Depth32Float,
            1,
            TextureUsage::RENDER_ATTACHMENT,
        )
        .unwrap();
        std::thread::scope(|scope| {
            for side in [128, 256, 512] {
                let fb = &fb;
                scope.spawn(move || fb.resize(side, side / 2).unwrap());
            }
        });
        let view = fb.depth_stencil_attachment().unwrap();
        assert_eq!((view.width(), view.height()), (fb.width(), fb.height()));
    }

    #[test]
    fn shadow_map_is_square_and_sampleable() {
        let device = MockDevice::new();
        let shadow = ShadowMapFramebuffer::new(&device, 1024, TextureFormat::Depth32Float).unwrap();
        assert_eq!((shadow.width(), shadow.height()), (1024, 1024));
        assert!(shadow.inner.usage().contains(TextureUsage::TEXTURE_BINDING));
        shadow.resize(512, 2048).unwrap();
        assert_eq!(shadow.size(), 2048);
        assert_eq!(shadow.height(), 2048);
    }
}
