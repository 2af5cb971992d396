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

//! Defines the texture format catalog and its per-format queries.

use super::enums::{catalog_enum, TextureAspect};

catalog_enum! {
    /// The memory layout of texels.
    ///
    /// Display names follow the channel-order spelling used in configuration
    /// files and logs (`"BGRA8Unorm"`, `"BC7RGBAUnormSrgb"`, `"ASTC4x4Unorm"`).
    #[allow(missing_docs)]
    #[derive(Default)]
    pub enum TextureFormat {
        #[default]
        Undefined => "Undefined",
        R8Unorm => "R8Unorm",
        R8Snorm => "R8Snorm",
        R8Uint => "R8Uint",
        R8Sint => "R8Sint",
        R16Uint => "R16Uint",
        R16Sint => "R16Sint",
        R16Float => "R16Float",
        R16Unorm => "R16Unorm",
        R16Snorm => "R16Snorm",
        Rg8Unorm => "RG8Unorm",
        Rg8Snorm => "RG8Snorm",
        Rg8Uint => "RG8Uint",
        Rg8Sint => "RG8Sint",
        R32Uint => "R32Uint",
        R32Sint => "R32Sint",
        R32Float => "R32Float",
        Rg16Uint => "RG16Uint",
        Rg16Sint => "RG16Sint",
        Rg16Float => "RG16Float",
        Rg16Unorm => "RG16Unorm",
        Rg16Snorm => "RG16Snorm",
        Rgba8Unorm => "RGBA8Unorm",
        Rgba8UnormSrgb => "RGBA8UnormSrgb",
        Rgba8Snorm => "RGBA8Snorm",
        Rgba8Uint => "RGBA8Uint",
        Rgba8Sint => "RGBA8Sint",
        Bgra8Unorm => "BGRA8Unorm",
        Bgra8UnormSrgb => "BGRA8UnormSrgb",
        Rgb9e5Ufloat => "RGB9E5Ufloat",
        Rgb10a2Uint => "RGB10A2Uint",
        Rgb10a2Unorm => "RGB10A2Unorm",
        Rg11b10Ufloat => "RG11B10Ufloat",
        Rg32Uint => "RG32Uint",
        Rg32Sint => "RG32Sint",
        Rg32Float => "RG32Float",
        Rgba16Uint => "RGBA16Uint",
        Rgba16Sint => "RGBA16Sint",
        Rgba16Float => "RGBA16Float",
        Rgba16Unorm => "RGBA16Unorm",
        Rgba16Snorm => "RGBA16Snorm",
        Rgba32Uint => "RGBA32Uint",
        Rgba32Sint => "RGBA32Sint",
        Rgba32Float => "RGBA32Float",
        Stencil8 => "Stencil8",
        Depth16Unorm => "Depth16Unorm",
        Depth24Plus => "Depth24Plus",
        Depth24PlusStencil8 => "Depth24PlusStencil8",
        Depth32Float => "Depth32Float",
        Depth32FloatStencil8 => "Depth32FloatStencil8",
        Bc1RgbaUnorm => "BC1RGBAUnorm",
        Bc1RgbaUnormSrgb => "BC1RGBAUnormSrgb",
        Bc2RgbaUnorm => "BC2RGBAUnorm",
        Bc2RgbaUnormSrgb => "BC2RGBAUnormSrgb",
        Bc3RgbaUnorm => "BC3RGBAUnorm",
        Bc3RgbaUnormSrgb => "BC3RGBAUnormSrgb",
        Bc4RUnorm => "BC4RUnorm",
        Bc4RSnorm => "BC4RSnorm",
        Bc5RgUnorm => "BC5RGUnorm",
        Bc5RgSnorm => "BC5RGSnorm",
        Bc6hRgbUfloat => "BC6HRGBUfloat",
        Bc6hRgbFloat => "BC6HRGBFloat",
        Bc7RgbaUnorm => "BC7RGBAUnorm",
        Bc7RgbaUnormSrgb => "BC7RGBAUnormSrgb",
        Etc2Rgb8Unorm => "ETC2RGB8Unorm",
        Etc2Rgb8UnormSrgb => "ETC2RGB8UnormSrgb",
        Etc2Rgb8A1Unorm => "ETC2RGB8A1Unorm",
        Etc2Rgb8A1UnormSrgb => "ETC2RGB8A1UnormSrgb",
        Etc2Rgba8Unorm => "ETC2RGBA8Unorm",
        Etc2Rgba8UnormSrgb => "ETC2RGBA8UnormSrgb",
        EacR11Unorm => "EACR11Unorm",
        EacR11Snorm => "EACR11Snorm",
        EacRg11Unorm => "EACRG11Unorm",
        EacRg11Snorm => "EACRG11Snorm",
        Astc4x4Unorm => "ASTC4x4Unorm",
        Astc4x4UnormSrgb => "ASTC4x4UnormSrgb",
        Astc5x4Unorm => "ASTC5x4Unorm",
        Astc5x4UnormSrgb => "ASTC5x4UnormSrgb",
        Astc5x5Unorm => "ASTC5x5Unorm",
        Astc5x5UnormSrgb => "ASTC5x5UnormSrgb",
        Astc6x5Unorm => "ASTC6x5Unorm",
        Astc6x5UnormSrgb => "ASTC6x5UnormSrgb",
        Astc6x6Unorm => "ASTC6x6Unorm",
        Astc6x6UnormSrgb => "ASTC6x6UnormSrgb",
        Astc8x5Unorm => "ASTC8x5Unorm",
        Astc8x5UnormSrgb => "ASTC8x5UnormSrgb",
        Astc8x6Unorm => "ASTC8x6Unorm",
        Astc8x6UnormSrgb => "ASTC8x6UnormSrgb",
        Astc8x8Unorm => "ASTC8x8Unorm",
        Astc8x8UnormSrgb => "ASTC8x8UnormSrgb",
        Astc10x5Unorm => "ASTC10x5Unorm",
        Astc10x5UnormSrgb => "ASTC10x5UnormSrgb",
        Astc10x6Unorm => "ASTC10x6Unorm",
        Astc10x6UnormSrgb => "ASTC10x6UnormSrgb",
        Astc10x8Unorm => "ASTC10x8Unorm",
        Astc10x8UnormSrgb => "ASTC10x8UnormSrgb",
        Astc10x10Unorm => "ASTC10x10Unorm",
        Astc10x10UnormSrgb => "ASTC10x10UnormSrgb",
        Astc12x10Unorm => "ASTC12x10Unorm",
        Astc12x10UnormSrgb => "ASTC12x10UnormSrgb",
        Astc12x12Unorm => "ASTC12x12Unorm",
        Astc12x12UnormSrgb => "ASTC12x12UnormSrgb",
    }
}

impl TextureFormat {
    /// Whether the format has a depth aspect.
    pub const fn has_depth(self) -> bool {
        matches!(
            self,
            TextureFormat::Depth16Unorm
                | TextureFormat::Depth24Plus
                | TextureFormat::Depth24PlusStencil8
                | TextureFormat::Depth32Float
                | TextureFormat::Depth32FloatStencil8
        )
    }

    /// Whether the format has a stencil aspect.
    pub const fn has_stencil(self) -> bool {
        matches!(
            self,
            TextureFormat::Stencil8
                | TextureFormat::Depth24PlusStencil8
                | TextureFormat::Depth32FloatStencil8
        )
    }

    /// Whether the format combines a depth and a stencil aspect.
    pub const fn is_depth_stencil(self) -> bool {
        self.has_depth() && self.has_stencil()
    }

    /// Whether the format can back a depth/stencil attachment.
    pub const fn is_depth_or_stencil(self) -> bool {
        self.has_depth() || self.has_stencil()
    }

    /// The view aspect to use when binding this format as a depth attachment:
    /// stencil-only formats use the stencil aspect, combined formats use
    /// every aspect and pure depth formats use the depth aspect.
    pub const fn attachment_aspect(self) -> TextureAspect {
        if self.is_depth_stencil() {
            TextureAspect::All
        } else if self.has_stencil() {
            TextureAspect::StencilOnly
        } else if self.has_depth() {
            TextureAspect::DepthOnly
        } else {
            TextureAspect::All
        }
    }

    /// Whether reads through this format are sRGB-decoded.
    pub const fn is_srgb(self) -> bool {
        use TextureFormat::*;
        matches!(
            self,
            Rgba8UnormSrgb
                | Bgra8UnormSrgb
                | Bc1RgbaUnormSrgb
                | Bc2RgbaUnormSrgb
                | Bc3RgbaUnormSrgb
                | Bc7RgbaUnormSrgb
                | Etc2Rgb8UnormSrgb
                | Etc2Rgb8A1UnormSrgb
                | Etc2Rgba8UnormSrgb
                | Astc4x4UnormSrgb
                | Astc5x4UnormSrgb
                | Astc5x5UnormSrgb
                | Astc6x5UnormSrgb
                | Astc6x6UnormSrgb
                | Astc8x5UnormSrgb
                | Astc8x6UnormSrgb
                | Astc8x8UnormSrgb
                | Astc10x5UnormSrgb
                | Astc10x6UnormSrgb
                | Astc10x8UnormSrgb
                | Astc10x10UnormSrgb
                | Astc12x10UnormSrgb
                | Astc12x12UnormSrgb
        )
    }

    /// Whether the format is block compressed.
    pub const fn is_compressed(self) -> bool {
        self.block_dimensions().0 > 1
    }

    /// Width and height of one compression block; `(1, 1)` for plain formats.
    pub const fn block_dimensions(self) -> (u32, u32) {
        use TextureFormat::*;
        match self {
            Bc1RgbaUnorm | Bc1RgbaUnormSrgb | Bc2RgbaUnorm | Bc2RgbaUnormSrgb | Bc3RgbaUnorm
            | Bc3RgbaUnormSrgb | Bc4RUnorm | Bc4RSnorm | Bc5RgUnorm | Bc5RgSnorm
            | Bc6hRgbUfloat | Bc6hRgbFloat | Bc7RgbaUnorm | Bc7RgbaUnormSrgb | Etc2Rgb8Unorm
            | Etc2Rgb8UnormSrgb | Etc2Rgb8A1Unorm | Etc2Rgb8A1UnormSrgb | Etc2Rgba8Unorm
            | Etc2Rgba8UnormSrgb | EacR11Unorm | EacR11Snorm | EacRg11Unorm | EacRg11Snorm
            | Astc4x4Unorm | Astc4x4UnormSrgb => (4, 4),
            Astc5x4Unorm | Astc5x4UnormSrgb => (5, 4),
            Astc5x5Unorm | Astc5x5UnormSrgb => (5, 5),
            Astc6x5Unorm | Astc6x5UnormSrgb => (6, 5),
            Astc6x6Unorm | Astc6x6UnormSrgb => (6, 6),
            Astc8x5Unorm | Astc8x5UnormSrgb => (8, 5),
            Astc8x6Unorm | Astc8x6UnormSrgb => (8, 6),
            Astc8x8Unorm | Astc8x8UnormSrgb => (8, 8),
            Astc10x5Unorm | Astc10x5UnormSrgb => (10, 5),
            Astc10x6Unorm | Astc10x6UnormSrgb => (10, 6),
            Astc10x8Unorm | Astc10x8UnormSrgb => (10, 8),
            Astc10x10Unorm | Astc10x10UnormSrgb => (10, 10),
            Astc12x10Unorm | Astc12x10UnormSrgb => (12, 10),
            Astc12x12Unorm | Astc12x12UnormSrgb => (12, 12),
            _ => (1, 1),
        }
    }

    /// Bytes per block for compressed formats, per texel otherwise.
    /// `None` for `Undefined`.
    pub const fn block_size(self) -> Option<u32> {
        use TextureFormat::*;
        match self {
            Undefined => None,
            Bc1RgbaUnorm | Bc1RgbaUnormSrgb | Bc4RUnorm | Bc4RSnorm | Etc2Rgb8Unorm
            | Etc2Rgb8UnormSrgb | Etc2Rgb8A1Unorm | Etc2Rgb8A1UnormSrgb | EacR11Unorm
            | EacR11Snorm => Some(8),
            _ if self.is_compressed() => Some(16),
            _ => self.bytes_per_pixel(),
        }
    }

    /// Size of one texel in bytes. `None` for compressed formats and
    /// `Undefined`.
    pub const fn bytes_per_pixel(self) -> Option<u32> {
        use TextureFormat::*;
        match self {
            R8Unorm | R8Snorm | R8Uint | R8Sint | Stencil8 => Some(1),
            R16Uint | R16Sint | R16Float | R16Unorm | R16Snorm | Rg8Unorm | Rg8Snorm
            | Rg8Uint | Rg8Sint | Depth16Unorm => Some(2),
            R32Uint | R32Sint | R32Float | Rg16Uint | Rg16Sint | Rg16Float | Rg16Unorm
            | Rg16Snorm | Rgba8Unorm | Rgba8UnormSrgb | Rgba8Snorm | Rgba8Uint | Rgba8Sint
            | Bgra8Unorm | Bgra8UnormSrgb | Rgb9e5Ufloat | Rgb10a2Uint | Rgb10a2Unorm
            | Rg11b10Ufloat | Depth24Plus | Depth24PlusStencil8 | Depth32Float => Some(4),
            Rg32Uint | Rg32Sint | Rg32Float | Rgba16Uint | Rgba16Sint | Rgba16Float
            | Rgba16Unorm | Rgba16Snorm | Depth32FloatStencil8 => Some(8),
            Rgba32Uint | Rgba32Sint | Rgba32Float => Some(16),
            _ => None,
        }
    }

    /// Tightly packed size of one row of blocks for a texture `width` texels
    /// wide, or `None` if the format has no defined size.
    pub fn bytes_per_row(self, width: u32) -> Option<u32> {
        let (block_w, _) = self.block_dimensions();
        let blocks = width.div_ceil(block_w);
        self.block_size().map(|size| blocks * size)
    }

    /// Number of block rows for a texture `height` texels tall.
    pub fn rows_per_image(self, height: u32) -> u32 {
        let (_, block_h) = self.block_dimensions();
        height.div_ceil(block_h)
    }

    /// The sRGB twin of a linear format, or the format itself.
    pub const fn add_srgb_suffix(self) -> Self {
        match self {
            TextureFormat::Rgba8Unorm => TextureFormat::Rgba8UnormSrgb,
            TextureFormat::Bgra8Unorm => TextureFormat::Bgra8UnormSrgb,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_channel_order_spelling() {
        assert_eq!(TextureFormat::Bgra8Unorm.as_str(), "BGRA8Unorm");
        assert_eq!(TextureFormat::Bc7RgbaUnormSrgb.as_str(), "BC7RGBAUnormSrgb");
        assert_eq!(
            TextureFormat::from_name("ASTC10x10UnormSrgb"),
            Some(TextureFormat::Astc10x10UnormSrgb)
        );
        assert_eq!(TextureFormat::from_name("bgra8unorm"), None);
        assert_eq!(TextureFormat::default(), TextureFormat::Undefined);
    }

    #[test]
    fn every_name_is_unique_and_parses_back() {
        let mut seen = std::collections::HashSet::new();
        for format in TextureFormat::ALL {
            assert!(seen.insert(format.as_str()), "duplicate {}", format);
            assert_eq!(TextureFormat::from_name(format.as_str()), Some(*format));
        }
    }

    #[test]
    fn depth_and_stencil_classification() {
        assert!(TextureFormat::Depth24PlusStencil8.is_depth_stencil());
        assert!(TextureFormat::Depth32Float.has_depth());
        assert!(!TextureFormat::Depth32Float.has_stencil());
        assert!(TextureFormat::Stencil8.is_depth_or_stencil());
        assert!(!TextureFormat::Rgba8Unorm.is_depth_or_stencil());

        assert_eq!(
            TextureFormat::Stencil8.attachment_aspect(),
            TextureAspect::StencilOnly
        );
        assert_eq!(
            TextureFormat::Depth32FloatStencil8.attachment_aspect(),
            TextureAspect::All
        );
        assert_eq!(
            TextureFormat::Depth16Unorm.attachment_aspect(),
            TextureAspect::DepthOnly
        );
    }

    #[test]
    fn sizes_of_plain_and_compressed_formats() {
        assert_eq!(TextureFormat::Rgba8Unorm.bytes_per_pixel(), Some(4));
        assert_eq!(TextureFormat::Rgba32Float.bytes_per_pixel(), Some(16));
        assert_eq!(TextureFormat::Bc1RgbaUnorm.bytes_per_pixel(), None);
        assert!(TextureFormat::Bc1RgbaUnorm.is_compressed());
        assert_eq!(TextureFormat::Bc1RgbaUnorm.block_size(), Some(8));
        assert_eq!(TextureFormat::Astc8x8Unorm.block_size(), Some(16));

        assert_eq!(TextureFormat::Rgba8Unorm.bytes_per_row(256), Some(1024));
        assert_eq!(TextureFormat::Bc7RgbaUnorm.bytes_per_row(10), Some(48));
        assert_eq!(TextureFormat::Bc7RgbaUnorm.rows_per_image(10), 3);
        assert_eq!(TextureFormat::Undefined.bytes_per_row(4), None);
    }

    #[test]
    fn srgb_detection() {
        assert!(TextureFormat::Bgra8UnormSrgb.is_srgb());
        assert!(!TextureFormat::Bgra8Unorm.is_srgb());
        assert_eq!(
            TextureFormat::Bgra8Unorm.add_srgb_suffix(),
            TextureFormat::Bgra8UnormSrgb
        );
    }
}
