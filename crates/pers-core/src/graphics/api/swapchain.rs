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

//! Defines swapchain configuration and surface capability types.

use super::enums::{CompositeAlphaMode, PresentMode};
use super::flags::TextureUsage;
use super::format::TextureFormat;
use serde::{Deserialize, Serialize};

/// A negotiated swapchain configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapChainDesc {
    /// An optional debug label.
    pub label: Option<String>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Image format.
    pub format: TextureFormat,
    /// Presentation discipline.
    pub present_mode: PresentMode,
    /// Compositing mode.
    pub alpha_mode: CompositeAlphaMode,
    /// Image usages.
    pub usage: TextureUsage,
    /// Images in flight the application would like.
    pub desired_image_count: u32,
}

impl Default for SwapChainDesc {
    fn default() -> Self {
        Self {
            label: None,
            width: 800,
            height: 600,
            format: TextureFormat::Bgra8Unorm,
            present_mode: PresentMode::Fifo,
            alpha_mode: CompositeAlphaMode::Opaque,
            usage: TextureUsage::RENDER_ATTACHMENT,
            desired_image_count: 2,
        }
    }
}

/// What a surface supports on a given adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceCapabilities {
    /// Supported image formats, in the backend's preference order.
    pub formats: Vec<TextureFormat>,
    /// Supported present modes.
    pub present_modes: Vec<PresentMode>,
    /// Supported alpha modes.
    pub alpha_modes: Vec<CompositeAlphaMode>,
    /// Supported image usages.
    pub usages: TextureUsage,
    /// Fewest images.
    pub min_image_count: u32,
    /// Most images.
    pub max_image_count: u32,
    /// Smallest width.
    pub min_width: u32,
    /// Smallest height.
    pub min_height: u32,
    /// Largest width.
    pub max_width: u32,
    /// Largest height.
    pub max_height: u32,
    /// The surface's current size, when the platform reports one.
    pub current_size: Option<(u32, u32)>,
}

impl Default for SurfaceCapabilities {
    fn default() -> Self {
        Self {
            formats: Vec::new(),
            present_modes: Vec::new(),
            alpha_modes: Vec::new(),
            usages: TextureUsage::RENDER_ATTACHMENT,
            min_image_count: 2,
            max_image_count: 3,
            min_width: 1,
            min_height: 1,
            max_width: 8192,
            max_height: 8192,
            current_size: None,
        }
    }
}

impl SurfaceCapabilities {
    /// Whether `width` x `height` lies within the supported range.
    pub fn contains_size(&self, width: u32, height: u32) -> bool {
        (self.min_width..=self.max_width).contains(&width)
            && (self.min_height..=self.max_height).contains(&height)
    }
}
