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

//! Defines the translation between pers descriptors and their `wgpu`
//! counterparts.
//!
//! [`IntoWgpu`] goes from pers to `wgpu`; [`FromWgpu`] goes back and returns
//! `None` for values pers has no name for.

use pers_core::graphics::api::{
    AdapterType, AddressMode, BlendComponent, BlendFactor, BlendOperation, BlendState,
    BufferUsage, ColorTargetState, ColorWrites, CompareFunction, CompositeAlphaMode, CullMode,
    DepthStencilState, DeviceFeature, DeviceLimits, FilterMode, FrontFace, IndexFormat, LoadOp,
    MultisampleState, PowerPreference, PresentMode, PrimitiveState, PrimitiveTopology,
    SamplerDesc, ShaderStages, StencilFaceState, StencilOperation, StoreOp, TextureAspect,
    TextureDimension, TextureFormat, TextureSampleType, TextureUsage, TextureViewDimension,
    VertexFormat, VertexStepMode,
};
use pers_core::graphics::error::{GraphicsError, GraphicsResult};
use wgpu::{AstcBlock as Block, AstcChannel as Channel, TextureFormat as Wf};

/// A local extension trait to convert pers types into `wgpu` types.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_wgpu()` syntax.
pub trait IntoWgpu<T> {
    /// Consumes self and converts it into a `wgpu` type.
    fn into_wgpu(self) -> T;
}

/// The reverse of [`IntoWgpu`], for values reported by the driver.
pub trait FromWgpu<T>: Sized {
    /// Converts a `wgpu` value, or `None` if pers has no equivalent.
    fn from_wgpu(value: T) -> Option<Self>;
}

// --- Texture formats ---

macro_rules! texture_formats {
    ($($ours:ident => $theirs:expr),+ $(,)?) => {
        impl IntoWgpu<Option<wgpu::TextureFormat>> for TextureFormat {
            fn into_wgpu(self) -> Option<wgpu::TextureFormat> {
                match self {
                    TextureFormat::Undefined => None,
                    $(TextureFormat::$ours => Some($theirs),)+
                }
            }
        }

        impl FromWgpu<wgpu::TextureFormat> for TextureFormat {
            fn from_wgpu(format: wgpu::TextureFormat) -> Option<Self> {
                $(
                    if format == $theirs {
                        return Some(TextureFormat::$ours);
                    }
                )+
                None
            }
        }
    };
}

texture_formats! {
    R8Unorm => Wf::R8Unorm,
    R8Snorm => Wf::R8Snorm,
    R8Uint => Wf::R8Uint,
    R8Sint => Wf::R8Sint,
    R16Uint => Wf::R16Uint,
    R16Sint => Wf::R16Sint,
    R16Float => Wf::R16Float,
    R16Unorm => Wf::R16Unorm,
    R16Snorm => Wf::R16Snorm,
    Rg8Unorm => Wf::Rg8Unorm,
    Rg8Snorm => Wf::Rg8Snorm,
    Rg8Uint => Wf::Rg8Uint,
    Rg8Sint => Wf::Rg8Sint,
    R32Uint => Wf::R32Uint,
    R32Sint => Wf::R32Sint,
    R32Float => Wf::R32Float,
    Rg16Uint => Wf::Rg16Uint,
    Rg16Sint => Wf::Rg16Sint,
    Rg16Float => Wf::Rg16Float,
    Rg16Unorm => Wf::Rg16Unorm,
    Rg16Snorm => Wf::Rg16Snorm,
    Rgba8Unorm => Wf::Rgba8Unorm,
    Rgba8UnormSrgb => Wf::Rgba8UnormSrgb,
    Rgba8Snorm => Wf::Rgba8Snorm,
    Rgba8Uint => Wf::Rgba8Uint,
    Rgba8Sint => Wf::Rgba8Sint,
    Bgra8Unorm => Wf::Bgra8Unorm,
    Bgra8UnormSrgb => Wf::Bgra8UnormSrgb,
    Rgb9e5Ufloat => Wf::Rgb9e5Ufloat,
    Rgb10a2Uint => Wf::Rgb10a2Uint,
    Rgb10a2Unorm => Wf::Rgb10a2Unorm,
    Rg11b10Ufloat => Wf::Rg11b10Ufloat,
    Rg32Uint => Wf::Rg32Uint,
    Rg32Sint => Wf::Rg32Sint,
    Rg32Float => Wf::Rg32Float,
    Rgba16Uint => Wf::Rgba16Uint,
    Rgba16Sint => Wf::Rgba16Sint,
    Rgba16Float => Wf::Rgba16Float,
    Rgba16Unorm => Wf::Rgba16Unorm,
    Rgba16Snorm => Wf::Rgba16Snorm,
    Rgba32Uint => Wf::Rgba32Uint,
    Rgba32Sint => Wf::Rgba32Sint,
    Rgba32Float => Wf::Rgba32Float,
    Stencil8 => Wf::Stencil8,
    Depth16Unorm => Wf::Depth16Unorm,
    Depth24Plus => Wf::Depth24Plus,
    Depth24PlusStencil8 => Wf::Depth24PlusStencil8,
    Depth32Float => Wf::Depth32Float,
    Depth32FloatStencil8 => Wf::Depth32FloatStencil8,
    Bc1RgbaUnorm => Wf::Bc1RgbaUnorm,
    Bc1RgbaUnormSrgb => Wf::Bc1RgbaUnormSrgb,
    Bc2RgbaUnorm => Wf::Bc2RgbaUnorm,
    Bc2RgbaUnormSrgb => Wf::Bc2RgbaUnormSrgb,
    Bc3RgbaUnorm => Wf::Bc3RgbaUnorm,
    Bc3RgbaUnormSrgb => Wf::Bc3RgbaUnormSrgb,
    Bc4RUnorm => Wf::Bc4RUnorm,
    Bc4RSnorm => Wf::Bc4RSnorm,
    Bc5RgUnorm => Wf::Bc5RgUnorm,
    Bc5RgSnorm => Wf::Bc5RgSnorm,
    Bc6hRgbUfloat => Wf::Bc6hRgbUfloat,
    Bc6hRgbFloat => Wf::Bc6hRgbFloat,
    Bc7RgbaUnorm => Wf::Bc7RgbaUnorm,
    Bc7RgbaUnormSrgb => Wf::Bc7RgbaUnormSrgb,
    Etc2Rgb8Unorm => Wf::Etc2Rgb8Unorm,
    Etc2Rgb8UnormSrgb => Wf::Etc2Rgb8UnormSrgb,
    Etc2Rgb8A1Unorm => Wf::Etc2Rgb8A1Unorm,
    Etc2Rgb8A1UnormSrgb => Wf::Etc2Rgb8A1UnormSrgb,
    Etc2Rgba8Unorm => Wf::Etc2Rgba8Unorm,
    Etc2Rgba8UnormSrgb => Wf::Etc2Rgba8UnormSrgb,
    EacR11Unorm => Wf::EacR11Unorm,
    EacR11Snorm => Wf::EacR11Snorm,
    EacRg11Unorm => Wf::EacRg11Unorm,
    EacRg11Snorm => Wf::EacRg11Snorm,
    Astc4x4Unorm => Wf::Astc { block: Block::B4x4, channel: Channel::Unorm },
    Astc4x4UnormSrgb => Wf::Astc { block: Block::B4x4, channel: Channel::UnormSrgb },
    Astc5x4Unorm => Wf::Astc { block: Block::B5x4, channel: Channel::Unorm },
    Astc5x4UnormSrgb => Wf::Astc { block: Block::B5x4, channel: Channel::UnormSrgb },
    Astc5x5Unorm => Wf::Astc { block: Block::B5x5, channel: Channel::Unorm },
    Astc5x5UnormSrgb => Wf::Astc { block: Block::B5x5, channel: Channel::UnormSrgb },
    Astc6x5Unorm => Wf::Astc { block: Block::B6x5, channel: Channel::Unorm },
    Astc6x5UnormSrgb => Wf::Astc { block: Block::B6x5, channel: Channel::UnormSrgb },
    Astc6x6Unorm => Wf::Astc { block: Block::B6x6, channel: Channel::Unorm },
    Astc6x6UnormSrgb => Wf::Astc { block: Block::B6x6, channel: Channel::UnormSrgb },
    Astc8x5Unorm => Wf::Astc { block: Block::B8x5, channel: Channel::Unorm },
    Astc8x5UnormSrgb => Wf::Astc { block: Block::B8x5, channel: Channel::UnormSrgb },
    Astc8x6Unorm => Wf::Astc { block: Block::B8x6, channel: Channel::Unorm },
    Astc8x6UnormSrgb => Wf::Astc { block: Block::B8x6, channel: Channel::UnormSrgb },
    Astc8x8Unorm => Wf::Astc { block: Block::B8x8, channel: Channel::Unorm },
    Astc8x8UnormSrgb => Wf::Astc { block: Block::B8x8, channel: Channel::UnormSrgb },
    Astc10x5Unorm => Wf::Astc { block: Block::B10x5, channel: Channel::Unorm },
    Astc10x5UnormSrgb => Wf::Astc { block: Block::B10x5, channel: Channel::UnormSrgb },
    Astc10x6Unorm => Wf::Astc { block: Block::B10x6, channel: Channel::Unorm },
    Astc10x6UnormSrgb => Wf::Astc { block: Block::B10x6, channel: Channel::UnormSrgb },
    Astc10x8Unorm => Wf::Astc { block: Block::B10x8, channel: Channel::Unorm },
    Astc10x8UnormSrgb => Wf::Astc { block: Block::B10x8, channel: Channel::UnormSrgb },
    Astc10x10Unorm => Wf::Astc { block: Block::B10x10, channel: Channel::Unorm },
    Astc10x10UnormSrgb => Wf::Astc { block: Block::B10x10, channel: Channel::UnormSrgb },
    Astc12x10Unorm => Wf::Astc { block: Block::B12x10, channel: Channel::Unorm },
    Astc12x10UnormSrgb => Wf::Astc { block: Block::B12x10, channel: Channel::UnormSrgb },
    Astc12x12Unorm => Wf::Astc { block: Block::B12x12, channel: Channel::Unorm },
    Astc12x12UnormSrgb => Wf::Astc { block: Block::B12x12, channel: Channel::UnormSrgb },
}

/// Converts a format that must name a real texel layout.
///
/// ## Errors
/// * `InvalidArgument` for [`TextureFormat::Undefined`].
pub fn wgpu_format(format: TextureFormat) -> GraphicsResult<wgpu::TextureFormat> {
    format
        .into_wgpu()
        .ok_or_else(|| GraphicsError::invalid(format!("texture format {format} has no texel layout")))
}

// --- Surface ---

impl IntoWgpu<wgpu::PresentMode> for PresentMode {
    fn into_wgpu(self) -> wgpu::PresentMode {
        match self {
            PresentMode::Fifo => wgpu::PresentMode::Fifo,
            PresentMode::Immediate => wgpu::PresentMode::Immediate,
            PresentMode::Mailbox => wgpu::PresentMode::Mailbox,
            PresentMode::FifoRelaxed => wgpu::PresentMode::FifoRelaxed,
        }
    }
}

impl FromWgpu<wgpu::PresentMode> for PresentMode {
    fn from_wgpu(mode: wgpu::PresentMode) -> Option<Self> {
        match mode {
            wgpu::PresentMode::Fifo => Some(PresentMode::Fifo),
            wgpu::PresentMode::Immediate => Some(PresentMode::Immediate),
            wgpu::PresentMode::Mailbox => Some(PresentMode::Mailbox),
            wgpu::PresentMode::FifoRelaxed => Some(PresentMode::FifoRelaxed),
            _ => None,
        }
    }
}

impl IntoWgpu<wgpu::CompositeAlphaMode> for CompositeAlphaMode {
    fn into_wgpu(self) -> wgpu::CompositeAlphaMode {
        match self {
            CompositeAlphaMode::Auto => wgpu::CompositeAlphaMode::Auto,
            CompositeAlphaMode::Opaque => wgpu::CompositeAlphaMode::Opaque,
            CompositeAlphaMode::PreMultiplied => wgpu::CompositeAlphaMode::PreMultiplied,
            CompositeAlphaMode::PostMultiplied => wgpu::CompositeAlphaMode::PostMultiplied,
            CompositeAlphaMode::Inherit => wgpu::CompositeAlphaMode::Inherit,
        }
    }
}

impl FromWgpu<wgpu::CompositeAlphaMode> for CompositeAlphaMode {
    fn from_wgpu(mode: wgpu::CompositeAlphaMode) -> Option<Self> {
        match mode {
            wgpu::CompositeAlphaMode::Auto => Some(CompositeAlphaMode::Auto),
            wgpu::CompositeAlphaMode::Opaque => Some(CompositeAlphaMode::Opaque),
            wgpu::CompositeAlphaMode::PreMultiplied => Some(CompositeAlphaMode::PreMultiplied),
            wgpu::CompositeAlphaMode::PostMultiplied => Some(CompositeAlphaMode::PostMultiplied),
            wgpu::CompositeAlphaMode::Inherit => Some(CompositeAlphaMode::Inherit),
        }
    }
}

// --- Flags ---

impl IntoWgpu<wgpu::BufferUsages> for BufferUsage {
    fn into_wgpu(self) -> wgpu::BufferUsages {
        const PAIRS: [(BufferUsage, wgpu::BufferUsages); 10] = [
            (BufferUsage::MAP_READ, wgpu::BufferUsages::MAP_READ),
            (BufferUsage::MAP_WRITE, wgpu::BufferUsages::MAP_WRITE),
            (BufferUsage::COPY_SRC, wgpu::BufferUsages::COPY_SRC),
            (BufferUsage::COPY_DST, wgpu::BufferUsages::COPY_DST),
            (BufferUsage::VERTEX, wgpu::BufferUsages::VERTEX),
            (BufferUsage::INDEX, wgpu::BufferUsages::INDEX),
            (BufferUsage::UNIFORM, wgpu::BufferUsages::UNIFORM),
            (BufferUsage::STORAGE, wgpu::BufferUsages::STORAGE),
            (BufferUsage::INDIRECT, wgpu::BufferUsages::INDIRECT),
            (BufferUsage::QUERY_RESOLVE, wgpu::BufferUsages::QUERY_RESOLVE),
        ];
        PAIRS
            .iter()
            .filter(|(ours, _)| self.contains(*ours))
            .fold(wgpu::BufferUsages::empty(), |acc, (_, theirs)| acc | *theirs)
    }
}

const TEXTURE_USAGE_PAIRS: [(TextureUsage, wgpu::TextureUsages); 5] = [
    (TextureUsage::COPY_SRC, wgpu::TextureUsages::COPY_SRC),
    (TextureUsage::COPY_DST, wgpu::TextureUsages::COPY_DST),
    (TextureUsage::TEXTURE_BINDING, wgpu::TextureUsages::TEXTURE_BINDING),
    (TextureUsage::STORAGE_BINDING, wgpu::TextureUsages::STORAGE_BINDING),
    (TextureUsage::RENDER_ATTACHMENT, wgpu::TextureUsages::RENDER_ATTACHMENT),
];

impl IntoWgpu<wgpu::TextureUsages> for TextureUsage {
    fn into_wgpu(self) -> wgpu::TextureUsages {
        TEXTURE_USAGE_PAIRS
            .iter()
            .filter(|(ours, _)| self.contains(*ours))
            .fold(wgpu::TextureUsages::empty(), |acc, (_, theirs)| acc | *theirs)
    }
}

impl FromWgpu<wgpu::TextureUsages> for TextureUsage {
    fn from_wgpu(usages: wgpu::TextureUsages) -> Option<Self> {
        Some(
            TEXTURE_USAGE_PAIRS
                .iter()
                .filter(|(_, theirs)| usages.contains(*theirs))
                .fold(TextureUsage::empty(), |acc, (ours, _)| acc | *ours),
        )
    }
}

impl IntoWgpu<wgpu::ColorWrites> for ColorWrites {
    fn into_wgpu(self) -> wgpu::ColorWrites {
        let mut writes = wgpu::ColorWrites::empty();
        writes.set(wgpu::ColorWrites::RED, self.contains(ColorWrites::RED));
        writes.set(wgpu::ColorWrites::GREEN, self.contains(ColorWrites::GREEN));
        writes.set(wgpu::ColorWrites::BLUE, self.contains(ColorWrites::BLUE));
        writes.set(wgpu::ColorWrites::ALPHA, self.contains(ColorWrites::ALPHA));
        writes
    }
}

impl IntoWgpu<wgpu::ShaderStages> for ShaderStages {
    fn into_wgpu(self) -> wgpu::ShaderStages {
        let mut stages = wgpu::ShaderStages::NONE;
        stages.set(wgpu::ShaderStages::VERTEX, self.contains(ShaderStages::VERTEX));
        stages.set(wgpu::ShaderStages::FRAGMENT, self.contains(ShaderStages::FRAGMENT));
        stages.set(wgpu::ShaderStages::COMPUTE, self.contains(ShaderStages::COMPUTE));
        stages
    }
}

// --- Textures and samplers ---

impl IntoWgpu<wgpu::TextureDimension> for TextureDimension {
    fn into_wgpu(self) -> wgpu::TextureDimension {
        match self {
            TextureDimension::D1 => wgpu::TextureDimension::D1,
            TextureDimension::D2 => wgpu::TextureDimension::D2,
            TextureDimension::D3 => wgpu::TextureDimension::D3,
        }
    }
}

impl IntoWgpu<wgpu::TextureViewDimension> for TextureViewDimension {
    fn into_wgpu(self) -> wgpu::TextureViewDimension {
        match self {
            TextureViewDimension::D1 => wgpu::TextureViewDimension::D1,
            TextureViewDimension::D2 => wgpu::TextureViewDimension::D2,
            TextureViewDimension::D2Array => wgpu::TextureViewDimension::D2Array,
            TextureViewDimension::Cube => wgpu::TextureViewDimension::Cube,
            TextureViewDimension::CubeArray => wgpu::TextureViewDimension::CubeArray,
            TextureViewDimension::D3 => wgpu::TextureViewDimension::D3,
        }
    }
}

impl IntoWgpu<wgpu::TextureAspect> for TextureAspect {
    fn into_wgpu(self) -> wgpu::TextureAspect {
        match self {
            TextureAspect::All => wgpu::TextureAspect::All,
            TextureAspect::StencilOnly => wgpu::TextureAspect::StencilOnly,
            TextureAspect::DepthOnly => wgpu::TextureAspect::DepthOnly,
        }
    }
}

impl IntoWgpu<wgpu::TextureSampleType> for TextureSampleType {
    fn into_wgpu(self) -> wgpu::TextureSampleType {
        match self {
            TextureSampleType::Float { filterable } => {
                wgpu::TextureSampleType::Float { filterable }
            }
            TextureSampleType::Depth => wgpu::TextureSampleType::Depth,
            TextureSampleType::Uint => wgpu::TextureSampleType::Uint,
            TextureSampleType::Sint => wgpu::TextureSampleType::Sint,
        }
    }
}

impl IntoWgpu<wgpu::AddressMode> for AddressMode {
    fn into_wgpu(self) -> wgpu::AddressMode {
        match self {
            AddressMode::Repeat => wgpu::AddressMode::Repeat,
            AddressMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            AddressMode::MirrorRepeat => wgpu::AddressMode::MirrorRepeat,
        }
    }
}

impl IntoWgpu<wgpu::FilterMode> for FilterMode {
    fn into_wgpu(self) -> wgpu::FilterMode {
        match self {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        }
    }
}

impl IntoWgpu<wgpu::MipmapFilterMode> for FilterMode {
    fn into_wgpu(self) -> wgpu::MipmapFilterMode {
        match self {
            FilterMode::Nearest => wgpu::MipmapFilterMode::Nearest,
            FilterMode::Linear => wgpu::MipmapFilterMode::Linear,
        }
    }
}

impl IntoWgpu<wgpu::CompareFunction> for CompareFunction {
    fn into_wgpu(self) -> wgpu::CompareFunction {
        match self {
            CompareFunction::Never => wgpu::CompareFunction::Never,
            CompareFunction::Less => wgpu::CompareFunction::Less,
            CompareFunction::Equal => wgpu::CompareFunction::Equal,
            CompareFunction::LessEqual => wgpu::CompareFunction::LessEqual,
            CompareFunction::Greater => wgpu::CompareFunction::Greater,
            CompareFunction::NotEqual => wgpu::CompareFunction::NotEqual,
            CompareFunction::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
            CompareFunction::Always => wgpu::CompareFunction::Always,
        }
    }
}

impl<'a> IntoWgpu<wgpu::SamplerDescriptor<'a>> for &'a SamplerDesc {
    fn into_wgpu(self) -> wgpu::SamplerDescriptor<'a> {
        wgpu::SamplerDescriptor {
            label: self.label.as_deref(),
            address_mode_u: self.address_mode_u.into_wgpu(),
            address_mode_v: self.address_mode_v.into_wgpu(),
            address_mode_w: self.address_mode_w.into_wgpu(),
            mag_filter: self.mag_filter.into_wgpu(),
            min_filter: self.min_filter.into_wgpu(),
            mipmap_filter: self.mipmap_filter.into_wgpu(),
            lod_min_clamp: self.lod_min_clamp,
            lod_max_clamp: self.lod_max_clamp,
            compare: self.compare.map(IntoWgpu::into_wgpu),
            anisotropy_clamp: self.max_anisotropy.max(1),
            border_color: None,
        }
    }
}

// --- Pipeline state ---

impl IntoWgpu<wgpu::VertexFormat> for VertexFormat {
    fn into_wgpu(self) -> wgpu::VertexFormat {
        match self {
            VertexFormat::Uint8x2 => wgpu::VertexFormat::Uint8x2,
            VertexFormat::Uint8x4 => wgpu::VertexFormat::Uint8x4,
            VertexFormat::Sint8x2 => wgpu::VertexFormat::Sint8x2,
            VertexFormat::Sint8x4 => wgpu::VertexFormat::Sint8x4,
            VertexFormat::Unorm8x2 => wgpu::VertexFormat::Unorm8x2,
            VertexFormat::Unorm8x4 => wgpu::VertexFormat::Unorm8x4,
            VertexFormat::Snorm8x2 => wgpu::VertexFormat::Snorm8x2,
            VertexFormat::Snorm8x4 => wgpu::VertexFormat::Snorm8x4,
            VertexFormat::Uint16x2 => wgpu::VertexFormat::Uint16x2,
            VertexFormat::Uint16x4 => wgpu::VertexFormat::Uint16x4,
            VertexFormat::Sint16x2 => wgpu::VertexFormat::Sint16x2,
            VertexFormat::Sint16x4 => wgpu::VertexFormat::Sint16x4,
            VertexFormat::Unorm16x2 => wgpu::VertexFormat::Unorm16x2,
            VertexFormat::Unorm16x4 => wgpu::VertexFormat::Unorm16x4,
            VertexFormat::Snorm16x2 => wgpu::VertexFormat::Snorm16x2,
            VertexFormat::Snorm16x4 => wgpu::VertexFormat::Snorm16x4,
            VertexFormat::Float16x2 => wgpu::VertexFormat::Float16x2,
            VertexFormat::Float16x4 => wgpu::VertexFormat::Float16x4,
            VertexFormat::Float32 => wgpu::VertexFormat::Float32,
            VertexFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
            VertexFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
            VertexFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
            VertexFormat::Uint32 => wgpu::VertexFormat::Uint32,
            VertexFormat::Uint32x2 => wgpu::VertexFormat::Uint32x2,
            VertexFormat::Uint32x3 => wgpu::VertexFormat::Uint32x3,
            VertexFormat::Uint32x4 => wgpu::VertexFormat::Uint32x4,
            VertexFormat::Sint32 => wgpu::VertexFormat::Sint32,
            VertexFormat::Sint32x2 => wgpu::VertexFormat::Sint32x2,
            VertexFormat::Sint32x3 => wgpu::VertexFormat::Sint32x3,
            VertexFormat::Sint32x4 => wgpu::VertexFormat::Sint32x4,
        }
    }
}

impl IntoWgpu<wgpu::VertexStepMode> for VertexStepMode {
    fn into_wgpu(self) -> wgpu::VertexStepMode {
        match self {
            VertexStepMode::Vertex => wgpu::VertexStepMode::Vertex,
            VertexStepMode::Instance => wgpu::VertexStepMode::Instance,
        }
    }
}

impl IntoWgpu<wgpu::PrimitiveTopology> for PrimitiveTopology {
    fn into_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            PrimitiveTopology::PointList => wgpu::PrimitiveTopology::PointList,
            PrimitiveTopology::LineList => wgpu::PrimitiveTopology::LineList,
            PrimitiveTopology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            PrimitiveTopology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            PrimitiveTopology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }
}

impl IntoWgpu<wgpu::FrontFace> for FrontFace {
    fn into_wgpu(self) -> wgpu::FrontFace {
        match self {
            FrontFace::Ccw => wgpu::FrontFace::Ccw,
            FrontFace::Cw => wgpu::FrontFace::Cw,
        }
    }
}

impl IntoWgpu<Option<wgpu::Face>> for CullMode {
    fn into_wgpu(self) -> Option<wgpu::Face> {
        match self {
            CullMode::None => None,
            CullMode::Front => Some(wgpu::Face::Front),
            CullMode::Back => Some(wgpu::Face::Back),
        }
    }
}

impl IntoWgpu<wgpu::IndexFormat> for IndexFormat {
    fn into_wgpu(self) -> wgpu::IndexFormat {
        match self {
            IndexFormat::Uint16 => wgpu::IndexFormat::Uint16,
            IndexFormat::Uint32 => wgpu::IndexFormat::Uint32,
        }
    }
}

impl IntoWgpu<wgpu::PrimitiveState> for PrimitiveState {
    fn into_wgpu(self) -> wgpu::PrimitiveState {
        wgpu::PrimitiveState {
            topology: self.topology.into_wgpu(),
            strip_index_format: self.strip_index_format.map(IntoWgpu::into_wgpu),
            front_face: self.front_face.into_wgpu(),
            cull_mode: self.cull_mode.into_wgpu(),
            ..Default::default()
        }
    }
}

impl IntoWgpu<wgpu::StencilOperation> for StencilOperation {
    fn into_wgpu(self) -> wgpu::StencilOperation {
        match self {
            StencilOperation::Keep => wgpu::StencilOperation::Keep,
            StencilOperation::Zero => wgpu::StencilOperation::Zero,
            StencilOperation::Replace => wgpu::StencilOperation::Replace,
            StencilOperation::Invert => wgpu::StencilOperation::Invert,
            StencilOperation::IncrementClamp => wgpu::StencilOperation::IncrementClamp,
            StencilOperation::DecrementClamp => wgpu::StencilOperation::DecrementClamp,
            StencilOperation::IncrementWrap => wgpu::StencilOperation::IncrementWrap,
            StencilOperation::DecrementWrap => wgpu::StencilOperation::DecrementWrap,
        }
    }
}

impl IntoWgpu<wgpu::StencilFaceState> for StencilFaceState {
    fn into_wgpu(self) -> wgpu::StencilFaceState {
        wgpu::StencilFaceState {
            compare: self.compare.into_wgpu(),
            fail_op: self.fail_op.into_wgpu(),
            depth_fail_op: self.depth_fail_op.into_wgpu(),
            pass_op: self.pass_op.into_wgpu(),
        }
    }
}

impl IntoWgpu<Option<wgpu::DepthStencilState>> for DepthStencilState {
    fn into_wgpu(self) -> Option<wgpu::DepthStencilState> {
        Some(wgpu::DepthStencilState {
            format: self.format.into_wgpu()?,
            depth_write_enabled: Some(self.depth_write_enabled),
            depth_compare: Some(self.depth_compare.into_wgpu()),
            stencil: wgpu::StencilState {
                front: self.stencil.front.into_wgpu(),
                back: self.stencil.back.into_wgpu(),
                read_mask: self.stencil.read_mask,
                write_mask: self.stencil.write_mask,
            },
            bias: wgpu::DepthBiasState {
                constant: self.bias.constant,
                slope_scale: self.bias.slope_scale,
                clamp: self.bias.clamp,
            },
        })
    }
}

impl IntoWgpu<wgpu::MultisampleState> for MultisampleState {
    fn into_wgpu(self) -> wgpu::MultisampleState {
        wgpu::MultisampleState {
            count: self.count,
            mask: u64::from(self.mask),
            alpha_to_coverage_enabled: self.alpha_to_coverage_enabled,
        }
    }
}

impl IntoWgpu<wgpu::BlendFactor> for BlendFactor {
    fn into_wgpu(self) -> wgpu::BlendFactor {
        match self {
            BlendFactor::Zero => wgpu::BlendFactor::Zero,
            BlendFactor::One => wgpu::BlendFactor::One,
            BlendFactor::Src => wgpu::BlendFactor::Src,
            BlendFactor::OneMinusSrc => wgpu::BlendFactor::OneMinusSrc,
            BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
            BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
            BlendFactor::Dst => wgpu::BlendFactor::Dst,
            BlendFactor::OneMinusDst => wgpu::BlendFactor::OneMinusDst,
            BlendFactor::DstAlpha => wgpu::BlendFactor::DstAlpha,
            BlendFactor::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
            BlendFactor::SrcAlphaSaturated => wgpu::BlendFactor::SrcAlphaSaturated,
            BlendFactor::Constant => wgpu::BlendFactor::Constant,
            BlendFactor::OneMinusConstant => wgpu::BlendFactor::OneMinusConstant,
        }
    }
}

impl IntoWgpu<wgpu::BlendOperation> for BlendOperation {
    fn into_wgpu(self) -> wgpu::BlendOperation {
        match self {
            BlendOperation::Add => wgpu::BlendOperation::Add,
            BlendOperation::Subtract => wgpu::BlendOperation::Subtract,
            BlendOperation::ReverseSubtract => wgpu::BlendOperation::ReverseSubtract,
            BlendOperation::Min => wgpu::BlendOperation::Min,
            BlendOperation::Max => wgpu::BlendOperation::Max,
        }
    }
}

impl IntoWgpu<wgpu::BlendComponent> for BlendComponent {
    fn into_wgpu(self) -> wgpu::BlendComponent {
        wgpu::BlendComponent {
            src_factor: self.src_factor.into_wgpu(),
            dst_factor: self.dst_factor.into_wgpu(),
            operation: self.operation.into_wgpu(),
        }
    }
}

impl IntoWgpu<wgpu::BlendState> for BlendState {
    fn into_wgpu(self) -> wgpu::BlendState {
        wgpu::BlendState {
            color: self.color.into_wgpu(),
            alpha: self.alpha.into_wgpu(),
        }
    }
}

impl IntoWgpu<Option<wgpu::ColorTargetState>> for ColorTargetState {
    fn into_wgpu(self) -> Option<wgpu::ColorTargetState> {
        Some(wgpu::ColorTargetState {
            format: self.format.into_wgpu()?,
            blend: self.blend.map(IntoWgpu::into_wgpu),
            write_mask: self.write_mask.into_wgpu(),
        })
    }
}

// --- Render pass operations ---

impl IntoWgpu<wgpu::StoreOp> for StoreOp {
    fn into_wgpu(self) -> wgpu::StoreOp {
        match self {
            StoreOp::Store => wgpu::StoreOp::Store,
            StoreOp::Discard => wgpu::StoreOp::Discard,
        }
    }
}

/// Builds pass operations from a load op and the value it clears to.
pub fn operations<V>(load: LoadOp, store: StoreOp, clear_value: V) -> wgpu::Operations<V> {
    wgpu::Operations {
        load: match load {
            LoadOp::Clear => wgpu::LoadOp::Clear(clear_value),
            LoadOp::Load => wgpu::LoadOp::Load,
        },
        store: store.into_wgpu(),
    }
}

// --- Adapter ---

impl IntoWgpu<wgpu::PowerPreference> for PowerPreference {
    fn into_wgpu(self) -> wgpu::PowerPreference {
        match self {
            PowerPreference::Default => wgpu::PowerPreference::None,
            PowerPreference::LowPower => wgpu::PowerPreference::LowPower,
            PowerPreference::HighPerformance => wgpu::PowerPreference::HighPerformance,
        }
    }
}

impl FromWgpu<wgpu::DeviceType> for AdapterType {
    fn from_wgpu(device_type: wgpu::DeviceType) -> Option<Self> {
        Some(match device_type {
            wgpu::DeviceType::Other => AdapterType::Other,
            wgpu::DeviceType::IntegratedGpu => AdapterType::IntegratedGpu,
            wgpu::DeviceType::DiscreteGpu => AdapterType::DiscreteGpu,
            wgpu::DeviceType::VirtualGpu => AdapterType::VirtualGpu,
            wgpu::DeviceType::Cpu => AdapterType::Cpu,
        })
    }
}

impl IntoWgpu<wgpu::Features> for DeviceFeature {
    fn into_wgpu(self) -> wgpu::Features {
        match self {
            DeviceFeature::DepthClipControl => wgpu::Features::DEPTH_CLIP_CONTROL,
            DeviceFeature::Depth32FloatStencil8 => wgpu::Features::DEPTH32FLOAT_STENCIL8,
            DeviceFeature::TimestampQuery => wgpu::Features::TIMESTAMP_QUERY,
            DeviceFeature::PipelineStatisticsQuery => wgpu::Features::PIPELINE_STATISTICS_QUERY,
            DeviceFeature::TextureCompressionBC => wgpu::Features::TEXTURE_COMPRESSION_BC,
            DeviceFeature::TextureCompressionETC2 => wgpu::Features::TEXTURE_COMPRESSION_ETC2,
            DeviceFeature::TextureCompressionASTC => wgpu::Features::TEXTURE_COMPRESSION_ASTC,
            DeviceFeature::IndirectFirstInstance => wgpu::Features::INDIRECT_FIRST_INSTANCE,
            DeviceFeature::ShaderF16 => wgpu::Features::SHADER_F16,
            DeviceFeature::RG11B10UfloatRenderable => wgpu::Features::RG11B10UFLOAT_RENDERABLE,
            DeviceFeature::BGRA8UnormStorage => wgpu::Features::BGRA8UNORM_STORAGE,
            DeviceFeature::Float32Filterable => wgpu::Features::FLOAT32_FILTERABLE,
        }
    }
}

/// The `wgpu` feature set covering every feature in `features`.
pub fn wgpu_features(features: &[DeviceFeature]) -> wgpu::Features {
    features
        .iter()
        .fold(wgpu::Features::empty(), |acc, f| acc | f.into_wgpu())
}

macro_rules! limit_fields {
    ($($field:ident),+ $(,)?) => {
        impl FromWgpu<&wgpu::Limits> for DeviceLimits {
            fn from_wgpu(limits: &wgpu::Limits) -> Option<Self> {
                Some(DeviceLimits {
                    $($field: u32::try_from(limits.$field).unwrap_or(u32::MAX),)+
                })
            }
        }

        /// Overlays `requested` onto `base`, leaving the fields pers does not
        /// model (alignments, buffer size) as `base` has them.
        pub fn wgpu_limits(requested: &DeviceLimits, base: wgpu::Limits) -> wgpu::Limits {
            wgpu::Limits {
                $($field: requested.$field.into(),)+
                ..base
            }
        }
    };
}

limit_fields! {
    max_texture_dimension_1d,
    max_texture_dimension_2d,
    max_texture_dimension_3d,
    max_texture_array_layers,
    max_bind_groups,
    max_bindings_per_bind_group,
    max_dynamic_uniform_buffers_per_pipeline_layout,
    max_dynamic_storage_buffers_per_pipeline_layout,
    max_sampled_textures_per_shader_stage,
    max_samplers_per_shader_stage,
    max_storage_buffers_per_shader_stage,
    max_storage_textures_per_shader_stage,
    max_uniform_buffers_per_shader_stage,
    max_uniform_buffer_binding_size,
    max_storage_buffer_binding_size,
    max_vertex_buffers,
    max_vertex_attributes,
    max_vertex_buffer_array_stride,
    max_compute_workgroup_storage_size,
    max_compute_invocations_per_workgroup,
    max_compute_workgroup_size_x,
    max_compute_workgroup_size_y,
    max_compute_workgroup_size_z,
    max_compute_workgroups_per_dimension,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_defined_format_round_trips() {
        for &format in TextureFormat::ALL {
            let converted: Option<wgpu::TextureFormat> = format.into_wgpu();
            match format {
                TextureFormat::Undefined => assert!(converted.is_none()),
                _ => {
                    let theirs = converted.unwrap_or_else(|| panic!("{format} has no wgpu format"));
                    assert_eq!(TextureFormat::from_wgpu(theirs), Some(format));
                }
            }
        }
    }

    #[test]
    fn unknown_wgpu_formats_have_no_pers_name() {
        assert_eq!(TextureFormat::from_wgpu(wgpu::TextureFormat::R64Uint), None);
        let hdr = wgpu::TextureFormat::Astc {
            block: wgpu::AstcBlock::B4x4,
            channel: wgpu::AstcChannel::Hdr,
        };
        assert_eq!(TextureFormat::from_wgpu(hdr), None);
    }

    #[test]
    fn undefined_format_is_rejected() {
        assert!(wgpu_format(TextureFormat::Undefined).is_err());
        assert_eq!(
            wgpu_format(TextureFormat::Bgra8Unorm).ok(),
            Some(wgpu::TextureFormat::Bgra8Unorm)
        );
    }

    #[test]
    fn buffer_usage_flags_map_one_to_one() {
        let usage = BufferUsage::MAP_READ | BufferUsage::COPY_DST;
        let theirs: wgpu::BufferUsages = usage.into_wgpu();
        assert_eq!(theirs, wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST);

        let all: wgpu::BufferUsages = BufferUsage::all().into_wgpu();
        assert_eq!(all.bits().count_ones(), BufferUsage::all().bits().count_ones());
    }

    #[test]
    fn texture_usage_survives_the_round_trip() {
        let usage = TextureUsage::RENDER_ATTACHMENT | TextureUsage::COPY_SRC;
        let theirs: wgpu::TextureUsages = usage.into_wgpu();
        assert_eq!(TextureUsage::from_wgpu(theirs), Some(usage));
    }

    #[test]
    fn present_modes_without_a_pers_name_are_dropped() {
        for &mode in PresentMode::ALL {
            assert_eq!(PresentMode::from_wgpu(mode.into_wgpu()), Some(mode));
        }
        assert_eq!(PresentMode::from_wgpu(wgpu::PresentMode::AutoVsync), None);
    }

    #[test]
    fn cull_none_disables_culling() {
        let none: Option<wgpu::Face> = CullMode::None.into_wgpu();
        assert_eq!(none, None);
        let back: Option<wgpu::Face> = CullMode::Back.into_wgpu();
        assert_eq!(back, Some(wgpu::Face::Back));
    }

    #[test]
    fn default_power_preference_lets_the_driver_choose() {
        assert_eq!(
            wgpu::PowerPreference::None,
            PowerPreference::Default.into_wgpu()
        );
        assert_eq!(
            wgpu::PowerPreference::HighPerformance,
            PowerPreference::HighPerformance.into_wgpu()
        );
    }

    #[test]
    fn clear_ops_carry_their_value() {
        let ops = operations(LoadOp::Clear, StoreOp::Store, 1.0f32);
        assert_eq!(ops.load, wgpu::LoadOp::Clear(1.0));
        assert_eq!(ops.store, wgpu::StoreOp::Store);
        let ops = operations(LoadOp::Load, StoreOp::Discard, 0u32);
        assert_eq!(ops.load, wgpu::LoadOp::Load);
    }

    #[test]
    fn features_fold_into_one_set() {
        let set = wgpu_features(&[DeviceFeature::TimestampQuery, DeviceFeature::ShaderF16]);
        assert!(set.contains(wgpu::Features::TIMESTAMP_QUERY));
        assert!(set.contains(wgpu::Features::SHADER_F16));
        assert!(!set.contains(wgpu::Features::TEXTURE_COMPRESSION_BC));
    }

    #[test]
    fn limits_survive_the_round_trip() {
        let base = wgpu::Limits::default();
        let ours = DeviceLimits::from_wgpu(&base).unwrap_or_default();
        assert_eq!(ours.max_texture_dimension_2d, base.max_texture_dimension_2d);

        let requested = DeviceLimits {
            max_bind_groups: 2,
            ..ours
        };
        let theirs = wgpu_limits(&requested, base.clone());
        assert_eq!(theirs.max_bind_groups, 2);
        assert_eq!(
            theirs.min_uniform_buffer_offset_alignment,
            base.min_uniform_buffer_offset_alignment
        );
    }
}
