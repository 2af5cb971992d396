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

//! Defines the swapchain trait.

use super::resource::TextureView;
use crate::graphics::api::{SwapChainDesc, TextureFormat};
use crate::graphics::error::GraphicsResult;
use crate::graphics::handle::SwapChainHandle;
use crate::graphics::swapchain::SwapChainState;
use std::sync::Arc;

/// A configured surface that hands out one presentable image at a time.
///
/// The cycle is acquire, render, present. At most one view is outstanding;
/// acquiring again before presenting drops the previous image.
pub trait SwapChain: Send + Sync + 'static {
    /// The current configuration.
    fn desc(&self) -> SwapChainDesc;

    /// Current width in pixels.
    fn width(&self) -> u32 {
        self.desc().width
    }

    /// Current height in pixels.
    fn height(&self) -> u32 {
        self.desc().height
    }

    /// Image format.
    fn format(&self) -> TextureFormat {
        self.desc().format
    }

    /// Where the acquire/present cycle currently stands.
    fn state(&self) -> SwapChainState;

    /// Acquires the next image. Returns `None` when the surface is lost,
    /// out of memory, timed out, or still outdated after one reconfigure.
    fn acquire_next_image(&self) -> Option<Arc<dyn TextureView>>;

    /// The view acquired by the last successful acquire, until it is
    /// presented.
    fn current_view(&self) -> Option<Arc<dyn TextureView>>;

    /// Presents the acquired image. Without one this only logs a warning.
    fn present(&self);

    /// Reconfigures for a new size, dropping any acquired image. A zero size
    /// is ignored with a warning; the current size is a no-op.
    fn resize(&self, width: u32, height: u32) -> GraphicsResult<()>;

    /// Releases the surface configuration. Every later call is a no-op.
    fn destroy(&self);

    /// The backend's opaque handle.
    fn native_handle(&self) -> SwapChainHandle;
}
