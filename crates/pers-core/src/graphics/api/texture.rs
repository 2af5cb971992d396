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

//! Defines data structures for textures, texture views and samplers.

use super::enums::{
    AddressMode, CompareFunction, FilterMode, TextureAspect, TextureDimension,
    TextureViewDimension,
};
use super::flags::TextureUsage;
use super::format::TextureFormat;
use crate::graphics::error::{GraphicsError, GraphicsResult};
use serde::{Deserialize, Serialize};

/// Sample counts every backend accepts.
pub const VALID_SAMPLE_COUNTS: [u32; 4] = [1, 2, 4, 8];

/// Whether `count` is one of [`VALID_SAMPLE_COUNTS`].
pub fn is_valid_sample_count(count: u32) -> bool {
    VALID_SAMPLE_COUNTS.contains(&count)
}

/// A descriptor used to create a texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureDesc {
    /// An optional debug label.
    pub label: Option<String>,
    /// The dimensionality.
    pub dimension: TextureDimension,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Depth for 3D textures, layer count otherwise.
    pub depth_or_array_layers: u32,
    /// Number of mip levels.
    pub mip_level_count: u32,
    /// Samples per texel.
    pub sample_count: u32,
    /// Texel format.
    pub format: TextureFormat,
    /// Allowed usages.
    pub usage: TextureUsage,
}

impl Default for TextureDesc {
    fn default() -> Self {
        Self {
            label: None,
            dimension: TextureDimension::D2,
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
            mip_level_count: 1,
            sample_count: 1,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        }
    }
}

impl TextureDesc {
    /// A single-mip 2D texture.
    pub fn new_2d(width: u32, height: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            width,
            height,
            format,
            usage,
            ..Default::default()
        }
    }

    /// Sets the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the sample count.
    pub fn with_sample_count(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }

    /// Checks dimensions, counts and format.
    pub fn validate(&self) -> GraphicsResult<()> {
        let label = self.label.as_deref().unwrap_or("<unnamed>");
        if self.width == 0 || self.height == 0 || self.depth_or_array_layers == 0 {
            return Err(GraphicsError::invalid(format!(
                "texture '{label}' has a zero extent ({}x{}x{})",
                self.width, self.height, self.depth_or_array_layers
            )));
        }
        if self.mip_level_count == 0 {
            return Err(GraphicsError::invalid(format!(
                "texture '{label}' has zero mip levels"
            )));
        }
        if !is_valid_sample_count(self.sample_count) {
            return Err(GraphicsError::invalid(format!(
                "texture '{label}' sample count {} is not one of {:?}",
                self.sample_count, VALID_SAMPLE_COUNTS
            )));
        }
        if self.format == TextureFormat::Undefined {
            return Err(GraphicsError::invalid(format!(
                "texture '{label}' has an undefined format"
            )));
        }
        if self.usage.is_empty() {
            return Err(GraphicsError::invalid(format!(
                "texture '{label}' has no usage flags"
            )));
        }
        Ok(())
    }

    /// Extent of `mip_level`, never smaller than one texel.
    pub fn mip_extent(&self, mip_level: u32) -> (u32, u32, u32) {
        let shrink = |v: u32| (v >> mip_level).max(1);
        let depth = match self.dimension {
            TextureDimension::D3 => shrink(self.depth_or_array_layers),
            _ => self.depth_or_array_layers,
        };
        (shrink(self.width), shrink(self.height), depth)
    }
}

/// A descriptor used to create a view into a texture.
///
/// `None` fields inherit from the texture.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureViewDesc {
    /// An optional debug label.
    pub label: Option<String>,
    /// The view format.
    pub format: Option<TextureFormat>,
    /// How the texture is interpreted.
    pub dimension: Option<TextureViewDimension>,
    /// Which aspect the view covers.
    pub aspect: TextureAspect,
    /// First visible mip.
    pub base_mip_level: u32,
    /// Visible mip count; `None` for the rest.
    pub mip_level_count: Option<u32>,
    /// First visible layer.
    pub base_array_layer: u32,
    /// Visible layer count; `None` for the rest.
    pub array_layer_count: Option<u32>,
}

impl TextureViewDesc {
    /// A single-mip, single-layer 2D view of `aspect`.
    pub fn attachment(label: impl Into<String>, format: TextureFormat, aspect: TextureAspect) -> Self {
        Self {
            label: Some(label.into()),
            format: Some(format),
            dimension: Some(TextureViewDimension::D2),
            aspect,
            base_mip_level: 0,
            mip_level_count: Some(1),
            base_array_layer: 0,
            array_layer_count: Some(1),
        }
    }
}

/// A descriptor used to create a sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerDesc {
    /// An optional debug label.
    pub label: Option<String>,
    /// Addressing along U.
    pub address_mode_u: AddressMode,
    /// Addressing along V.
    pub address_mode_v: AddressMode,
    /// Addressing along W.
    pub address_mode_w: AddressMode,
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Filter between mip levels.
    pub mipmap_filter: FilterMode,
    /// Lowest mip level used.
    pub lod_min_clamp: f32,
    /// Highest mip level used.
    pub lod_max_clamp: f32,
    /// Comparison for comparison samplers.
    pub compare: Option<CompareFunction>,
    /// Anisotropy clamp; 1 disables anisotropic filtering.
    pub max_anisotropy: u16,
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self {
            label: None,
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            address_mode_w: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
            mipmap_filter: FilterMode::Nearest,
            lod_min_clamp: 0.0,
            lod_max_clamp: 32.0,
            compare: None,
            max_anisotropy: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sample_count_three_is_invalid() {
        let desc = TextureDesc::new_2d(
            64,
            64,
            TextureFormat::Rgba8Unorm,
            TextureUsage::RENDER_ATTACHMENT,
        )
        .with_sample_count(3);
        assert!(desc.validate().is_err());
        assert!(desc.with_sample_count(4).validate().is_ok());
    }

    #[test]
    fn zero_extent_is_invalid() {
        let desc = TextureDesc::new_2d(0, 64, TextureFormat::R8Unorm, TextureUsage::COPY_DST);
        assert!(desc.validate().is_err());
    }

    #[test]
    fn mip_extents_shrink_to_one() {
        let desc = TextureDesc::new_2d(256, 64, TextureFormat::R8Unorm, TextureUsage::COPY_DST);
        assert_eq!(desc.mip_extent(0), (256, 64, 1));
        assert_eq!(desc.mip_extent(3), (32, 8, 1));
        assert_eq!(desc.mip_extent(8), (1, 1, 1));
    }

    #[test]
    fn sampler_defaults() {
        let desc = SamplerDesc::default();
        assert_eq!(desc.max_anisotropy, 1);
        assert_relative_eq!(desc.lod_max_clamp, 32.0);
        assert!(desc.compare.is_none());
    }
}
