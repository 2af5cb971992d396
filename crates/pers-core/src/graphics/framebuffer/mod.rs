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

//! Defines the framebuffer family: a width, a height, a sample count, up to
//! eight color attachments and an optional depth/stencil attachment.
//!
//! Every variant here builds its textures through a device's
//! [`ResourceFactory`](crate::graphics::ResourceFactory) and only keeps a
//! weak reference to that device.

/// Implements the framebuffer traits for a newtype by forwarding to its
/// `inner` field.
macro_rules! delegate_framebuffer {
    ($ty:ty) => {
        use $crate::graphics::framebuffer::{Framebuffer, ResizableFramebuffer};

        impl Framebuffer for $ty {
            fn color_attachment(
                &self,
                index: usize,
            ) -> Option<std::sync::Arc<dyn $crate::graphics::traits::TextureView>> {
                Framebuffer::color_attachment(&self.inner, index)
            }

            fn depth_stencil_attachment(
                &self,
            ) -> Option<std::sync::Arc<dyn $crate::graphics::traits::TextureView>> {
                Framebuffer::depth_stencil_attachment(&self.inner)
            }

            fn width(&self) -> u32 {
                Framebuffer::width(&self.inner)
            }

            fn height(&self) -> u32 {
                Framebuffer::height(&self.inner)
            }

            fn sample_count(&self) -> u32 {
                Framebuffer::sample_count(&self.inner)
            }

            fn color_format(&self, index: usize) -> Option<$crate::graphics::api::TextureFormat> {
                Framebuffer::color_format(&self.inner, index)
            }

            fn depth_format(&self) -> Option<$crate::graphics::api::TextureFormat> {
                Framebuffer::depth_format(&self.inner)
            }

            fn color_attachment_count(&self) -> usize {
                Framebuffer::color_attachment_count(&self.inner)
            }
        }

        impl ResizableFramebuffer for $ty {
            fn resize(&self, width: u32, height: u32) -> $crate::graphics::error::GraphicsResult<()> {
                ResizableFramebuffer::resize(&self.inner, width, height)
            }
        }
    };
}

mod attachments;
mod depth_only;
mod factory;
mod mrt;
mod msaa;
mod offscreen;
mod surface;
pub mod validation;

pub use self::depth_only::{DepthOnlyFramebuffer, ShadowMapFramebuffer};
pub use self::factory::FramebufferFactory;
pub use self::mrt::MrtFramebuffer;
pub use self::msaa::MsaaFramebuffer;
pub use self::offscreen::{OffscreenFramebuffer, OffscreenFramebufferConfig};
pub use self::surface::SwapChainFramebuffer;

use crate::graphics::api::TextureFormat;
use crate::graphics::error::GraphicsResult;
use crate::graphics::traits::{SwapChain, TextureView};
use std::sync::Arc;

/// A set of attachments a render pass can draw into.
pub trait Framebuffer: Send + Sync {
    /// The color view at `index`, if there is one and it is available.
    fn color_attachment(&self, index: usize) -> Option<Arc<dyn TextureView>>;

    /// The depth/stencil view, if any.
    fn depth_stencil_attachment(&self) -> Option<Arc<dyn TextureView>>;

    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Samples per pixel of every attachment.
    fn sample_count(&self) -> u32;

    /// Format of the color attachment at `index`.
    fn color_format(&self, index: usize) -> Option<TextureFormat>;

    /// Format of the depth/stencil attachment.
    fn depth_format(&self) -> Option<TextureFormat>;

    /// Number of color attachment slots.
    fn color_attachment_count(&self) -> usize;

    /// Whether a depth/stencil attachment is present.
    fn has_depth_stencil_attachment(&self) -> bool {
        self.depth_format().is_some()
    }

    /// Every color format, in slot order.
    fn color_formats(&self) -> Vec<TextureFormat> {
        (0..self.color_attachment_count())
            .filter_map(|i| self.color_format(i))
            .collect()
    }
}

/// A framebuffer whose attachments can be recreated at a new size.
pub trait ResizableFramebuffer: Framebuffer {
    /// Recreates the attachments at `width` x `height`.
    ///
    /// Resizing to the current size does nothing. On failure the previous
    /// attachments are kept.
    fn resize(&self, width: u32, height: u32) -> GraphicsResult<()>;
}

/// A framebuffer whose color attachment comes from a swapchain.
pub trait SurfaceFramebuffer: ResizableFramebuffer {
    /// Acquires the next swapchain image. Returns `false` if no image is
    /// available or one is already acquired.
    fn acquire_next_image(&self) -> bool;

    /// Presents the acquired image.
    fn present(&self);

    /// Whether an image is currently acquired.
    fn is_ready(&self) -> bool;

    /// Attaches (or detaches) the framebuffer that provides the depth
    /// attachment. It is resized together with the surface.
    fn set_depth_framebuffer(&self, depth: Option<Arc<dyn ResizableFramebuffer>>);

    /// The swapchain behind the color attachment.
    fn swap_chain(&self) -> &Arc<dyn SwapChain>;
}
