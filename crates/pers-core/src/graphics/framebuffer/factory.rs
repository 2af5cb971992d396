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

use super::{
    DepthOnlyFramebuffer, MrtFramebuffer, MsaaFramebuffer, OffscreenFramebuffer,
    OffscreenFramebufferConfig, ResizableFramebuffer, ShadowMapFramebuffer, SurfaceFramebuffer,
    SwapChainFramebuffer,
};
use crate::graphics::api::{SwapChainDesc, TextureFormat, TextureUsage};
use crate::graphics::error::{GraphicsError, GraphicsResult};
use crate::graphics::traits::{LogicalDevice, Surface};
use std::sync::{Arc, Weak};

/// Builds every framebuffer variant for one device.
///
/// The factory only holds a weak reference; once the device is dropped every
/// method fails with [`GraphicsError::DeviceExpired`].
#[derive(Clone)]
pub struct FramebufferFactory {
    device: Weak<dyn LogicalDevice>,
}

impl FramebufferFactory {
    /// A factory for `device`.
    pub fn new(device: &Arc<dyn LogicalDevice>) -> Self {
        Self {
            device: Arc::downgrade(device),
        }
    }

    fn device(&self) -> GraphicsResult<Arc<dyn LogicalDevice>> {
        self.device.upgrade().ok_or_else(|| {
            log::error!("FramebufferFactory: device expired");
            GraphicsError::DeviceExpired
        })
    }

    /// An offscreen framebuffer from an explicit configuration.
    pub fn create_offscreen(
        &self,
        config: OffscreenFramebufferConfig,
    ) -> GraphicsResult<OffscreenFramebuffer> {
        OffscreenFramebuffer::new(&self.device()?, config)
    }

    /// A framebuffer with only a depth/stencil attachment.
    pub fn create_depth_only(
        &self,
        width: u32,
        height: u32,
        format: TextureFormat,
        sample_count: u32,
    ) -> GraphicsResult<DepthOnlyFramebuffer> {
        DepthOnlyFramebuffer::new(
            &self.device()?,
            width,
            height,
            format,
            sample_count,
            TextureUsage::RENDER_ATTACHMENT,
        )
    }

    /// A square, sampleable depth target.
    pub fn create_shadow_map(
        &self,
        size: u32,
        format: TextureFormat,
    ) -> GraphicsResult<ShadowMapFramebuffer> {
        ShadowMapFramebuffer::new(&self.device()?, size, format)
    }

    /// A framebuffer with several sampleable color targets.
    pub fn create_mrt(
        &self,
        width: u32,
        height: u32,
        color_formats: &[TextureFormat],
        depth_format: Option<TextureFormat>,
    ) -> GraphicsResult<MrtFramebuffer> {
        MrtFramebuffer::new(&self.device()?, width, height, color_formats, depth_format)
    }

    /// A multisampled framebuffer.
    pub fn create_msaa(
        &self,
        width: u32,
        height: u32,
        color_format: TextureFormat,
        depth_format: Option<TextureFormat>,
        sample_count: u32,
    ) -> GraphicsResult<MsaaFramebuffer> {
        MsaaFramebuffer::new(
            &self.device()?,
            width,
            height,
            color_format,
            depth_format,
            sample_count,
        )
    }

    /// Creates a swapchain for `surface` and wraps it, with a matching
    /// depth framebuffer when `depth_format` is given.
    pub fn create_surface_framebuffer(
        &self,
        surface: &Arc<dyn Surface>,
        desc: &SwapChainDesc,
        depth_format: Option<TextureFormat>,
    ) -> GraphicsResult<SwapChainFramebuffer> {
        let device = self.device()?;
        let swap_chain = device
            .create_swap_chain(surface, desc)
            .inspect_err(|e| log::error!("FramebufferFactory: swapchain creation failed: {e}"))?;
        let framebuffer = SwapChainFramebuffer::new(swap_chain);
        if let Some(format) = depth_format {
            let depth = DepthOnlyFramebuffer::new(
                &device,
                desc.width,
                desc.height,
                format,
                1,
                TextureUsage::RENDER_ATTACHMENT,
            )?;
            let depth: Arc<dyn ResizableFramebuffer> = Arc::new(depth);
            framebuffer.set_depth_framebuffer(Some(depth));
        }
        Ok(framebuffer)
    }
}
