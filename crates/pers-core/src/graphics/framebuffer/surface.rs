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

use super::{Framebuffer, ResizableFramebuffer, SurfaceFramebuffer};
use crate::graphics::api::TextureFormat;
use crate::graphics::error::GraphicsResult;
use crate::graphics::traits::{SwapChain, TextureView};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// A framebuffer whose single color attachment is the image currently
/// acquired from a swapchain, plus an optional depth framebuffer.
///
/// The color attachment is only available between
/// [`acquire_next_image`](SurfaceFramebuffer::acquire_next_image) and
/// [`present`](SurfaceFramebuffer::present).
pub struct SwapChainFramebuffer {
    // Declared first so the view is released before the swapchain.
    current: Mutex<Option<Arc<dyn TextureView>>>,
    depth: RwLock<Option<Arc<dyn ResizableFramebuffer>>>,
    swap_chain: Arc<dyn SwapChain>,
}

impl SwapChainFramebuffer {
    /// Wraps a configured swapchain.
    pub fn new(swap_chain: Arc<dyn SwapChain>) -> Self {
        Self {
            current: Mutex::new(None),
            depth: RwLock::new(None),
            swap_chain,
        }
    }

    /// The attached depth framebuffer, if any.
    pub fn depth_framebuffer(&self) -> Option<Arc<dyn ResizableFramebuffer>> {
        self.depth.read().clone()
    }
}

impl Framebuffer for SwapChainFramebuffer {
    fn color_attachment(&self, index: usize) -> Option<Arc<dyn TextureView>> {
        if index != 0 {
            return None;
        }
        let current = self.current.lock().clone();
        if current.is_none() {
            log::error!("SwapChainFramebuffer: color_attachment() called without an acquired image");
        }
        current
    }

    fn depth_stencil_attachment(&self) -> Option<Arc<dyn TextureView>> {
        self.depth
            .read()
            .as_ref()
            .and_then(|depth| depth.depth_stencil_attachment())
    }

    fn width(&self) -> u32 {
        self.swap_chain.width()
    }

    fn height(&self) -> u32 {
        self.swap_chain.height()
    }

    fn sample_count(&self) -> u32 {
        1
    }

    fn color_format(&self, index: usize) -> Option<TextureFormat> {
        (index == 0).then(|| self.swap_chain.format())
    }

    fn depth_format(&self) -> Option<TextureFormat> {
        self.depth.read().as_ref().and_then(|depth| depth.depth_format())
    }

    fn color_attachment_count(&self) -> usize {
        1
    }
}

impl ResizableFramebuffer for SwapChainFramebuffer {
    fn resize(&self, width: u32, height: u32) -> GraphicsResult<()> {
        if (width, height) == (self.width(), self.height()) {
            return Ok(());
        }
        self.current.lock().take();
        self.swap_chain.resize(width, height)?;
        if let Some(depth) = self.depth.read().as_ref() {
            if let Err(e) = depth.resize(width, height) {
                log::warn!("SwapChainFramebuffer: failed to resize the depth framebuffer: {e}");
            }
        }
        Ok(())
    }
}

impl SurfaceFramebuffer for SwapChainFramebuffer {
    fn acquire_next_image(&self) -> bool {
        let mut current = self.current.lock();
        if current.is_some() {
            log::warn!("SwapChainFramebuffer: an image is already acquired");
            return false;
        }
        *current = self.swap_chain.acquire_next_image();
        current.is_some()
    }

    fn present(&self) {
        let view = self.current.lock().take();
        if view.is_none() {
            log::warn!("SwapChainFramebuffer: present() called without an acquired image");
            return;
        }
        drop(view);
        self.swap_chain.present();
    }

    fn is_ready(&self) -> bool {
        self.current.lock().is_some()
    }

    fn set_depth_framebuffer(&self, depth: Option<Arc<dyn ResizableFramebuffer>>) {
        if let Some(fb) = &depth {
            if (fb.width(), fb.height()) != (self.width(), self.height()) {
                log::warn!(
                    "SwapChainFramebuffer: depth framebuffer is {}x{} but the surface is {}x{}",
                    fb.width(),
                    fb.height(),
                    self.width(),
                    self.height()
                );
            }
        }
        *self.depth.write() = depth;
    }

    fn swap_chain(&self) -> &Arc<dyn SwapChain> {
        &self.swap_chain
    }
}

impl Drop for SwapChainFramebuffer {
    fn drop(&mut self) {
        self.current.get_mut().take();
    }
}
