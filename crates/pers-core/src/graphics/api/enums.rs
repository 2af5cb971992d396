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

//! Defines the catalog of plain enumerations used across the API.
//!
//! Every catalog enum carries a stable display name (`as_str`, `Display`),
//! parses back from that name (`from_name`, `FromStr`), lists its values
//! (`ALL`) and serializes by name.

/// Declares a catalog enum with its name table.
macro_rules! catalog_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant ),+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Returns the display name.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Parses a display name. Matching is exact.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($label => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::graphics::error::GraphicsError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_name(s).ok_or_else(|| {
                    $crate::graphics::error::GraphicsError::InvalidArgument(format!(
                        "unknown {} '{}'",
                        stringify!($name),
                        s
                    ))
                })
            }
        }
    };
}

pub(crate) use catalog_enum;

catalog_enum! {
    /// The queuing discipline of a swapchain.
    #[derive(Default)]
    pub enum PresentMode {
        /// Vertical sync. Always available.
        #[default]
        Fifo => "Fifo",
        /// No vertical sync; may tear.
        Immediate => "Immediate",
        /// Triple buffering; the newest frame replaces a queued one.
        Mailbox => "Mailbox",
        /// Vertical sync that tears when a frame is late.
        FifoRelaxed => "FifoRelaxed",
    }
}

catalog_enum! {
    /// How the compositor blends the surface with what lies beneath it.
    #[derive(Default)]
    pub enum CompositeAlphaMode {
        /// Let the backend pick.
        Auto => "Auto",
        /// Alpha is ignored.
        #[default]
        Opaque => "Opaque",
        /// Colors are premultiplied by alpha.
        PreMultiplied => "PreMultiplied",
        /// Colors are multiplied by alpha by the compositor.
        PostMultiplied => "PostMultiplied",
        /// Whatever the windowing system uses.
        Inherit => "Inherit",
    }
}

catalog_enum! {
    /// The format of an index buffer.
    #[derive(Default)]
    pub enum IndexFormat {
        /// 16-bit indices.
        Uint16 => "Uint16",
        /// 32-bit indices.
        #[default]
        Uint32 => "Uint32",
    }
}

impl IndexFormat {
    /// Size of one index in bytes.
    pub const fn size(self) -> u64 {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

catalog_enum! {
    /// The format of one vertex attribute.
    pub enum VertexFormat {
        /// Two unsigned bytes.
        Uint8x2 => "Uint8x2",
        /// Four unsigned bytes.
        Uint8x4 => "Uint8x4",
        /// Two signed bytes.
        Sint8x2 => "Sint8x2",
        /// Four signed bytes.
        Sint8x4 => "Sint8x4",
        /// Two normalized unsigned bytes.
        Unorm8x2 => "Unorm8x2",
        /// Four normalized unsigned bytes.
        Unorm8x4 => "Unorm8x4",
        /// Two normalized signed bytes.
        Snorm8x2 => "Snorm8x2",
        /// Four normalized signed bytes.
        Snorm8x4 => "Snorm8x4",
        /// Two unsigned shorts.
        Uint16x2 => "Uint16x2",
        /// Four unsigned shorts.
        Uint16x4 => "Uint16x4",
        /// Two signed shorts.
        Sint16x2 => "Sint16x2",
        /// Four signed shorts.
        Sint16x4 => "Sint16x4",
        /// Two normalized unsigned shorts.
        Unorm16x2 => "Unorm16x2",
        /// Four normalized unsigned shorts.
        Unorm16x4 => "Unorm16x4",
        /// Two normalized signed shorts.
        Snorm16x2 => "Snorm16x2",
        /// Four normalized signed shorts.
        Snorm16x4 => "Snorm16x4",
        /// Two half floats.
        Float16x2 => "Float16x2",
        /// Four half floats.
        Float16x4 => "Float16x4",
        /// One float.
        Float32 => "Float32",
        /// Two floats.
        Float32x2 => "Float32x2",
        /// Three floats.
        Float32x3 => "Float32x3",
        /// Four floats.
        Float32x4 => "Float32x4",
        /// One unsigned int.
        Uint32 => "Uint32",
        /// Two unsigned ints.
        Uint32x2 => "Uint32x2",
        /// Three unsigned ints.
        Uint32x3 => "Uint32x3",
        /// Four unsigned ints.
        Uint32x4 => "Uint32x4",
        /// One signed int.
        Sint32 => "Sint32",
        /// Two signed ints.
        Sint32x2 => "Sint32x2",
        /// Three signed ints.
        Sint32x3 => "Sint32x3",
        /// Four signed ints.
        Sint32x4 => "Sint32x4",
    }
}

impl VertexFormat {
    /// Size of one attribute of this format, in bytes.
    pub const fn size(self) -> u64 {
        use VertexFormat::*;
        match self {
            Uint8x2 | Sint8x2 | Unorm8x2 | Snorm8x2 => 2,
            Uint8x4 | Sint8x4 | Unorm8x4 | Snorm8x4 => 4,
            Uint16x2 | Sint16x2 | Unorm16x2 | Snorm16x2 | Float16x2 => 4,
            Uint16x4 | Sint16x4 | Unorm16x4 | Snorm16x4 | Float16x4 => 8,
            Float32 | Uint32 | Sint32 => 4,
            Float32x2 | Uint32x2 | Sint32x2 => 8,
            Float32x3 | Uint32x3 | Sint32x3 => 12,
            Float32x4 | Uint32x4 | Sint32x4 => 16,
        }
    }
}

catalog_enum! {
    /// Whether a vertex buffer advances per vertex or per instance.
    #[derive(Default)]
    pub enum VertexStepMode {
        /// Advance once per vertex.
        #[default]
        Vertex => "Vertex",
        /// Advance once per instance.
        Instance => "Instance",
    }
}

catalog_enum! {
    /// How vertices are assembled into primitives.
    #[derive(Default)]
    pub enum PrimitiveTopology {
        /// Each vertex is a point.
        PointList => "PointList",
        /// Each pair of vertices is a line.
        LineList => "LineList",
        /// Consecutive vertices form a connected line.
        LineStrip => "LineStrip",
        /// Each triple of vertices is a triangle.
        #[default]
        TriangleList => "TriangleList",
        /// Consecutive vertices form a triangle strip.
        TriangleStrip => "TriangleStrip",
    }
}

impl PrimitiveTopology {
    /// Whether this is a strip topology, which may carry a strip index format.
    pub const fn is_strip(self) -> bool {
        matches!(
            self,
            PrimitiveTopology::LineStrip | PrimitiveTopology::TriangleStrip
        )
    }
}

catalog_enum! {
    /// The winding order that marks a triangle as front-facing.
    #[derive(Default)]
    pub enum FrontFace {
        /// Counter-clockwise.
        #[default]
        Ccw => "Ccw",
        /// Clockwise.
        Cw => "Cw",
    }
}

catalog_enum! {
    /// Which faces get culled.
    #[derive(Default)]
    pub enum CullMode {
        /// Nothing is culled.
        #[default]
        None => "None",
        /// Front faces are culled.
        Front => "Front",
        /// Back faces are culled.
        Back => "Back",
    }
}

catalog_enum! {
    /// A comparison used for depth, stencil and sampler tests.
    #[derive(Default)]
    pub enum CompareFunction {
        /// Never passes.
        Never => "Never",
        /// Passes if new < old.
        #[default]
        Less => "Less",
        /// Passes if new == old.
        Equal => "Equal",
        /// Passes if new <= old.
        LessEqual => "LessEqual",
        /// Passes if new > old.
        Greater => "Greater",
        /// Passes if new != old.
        NotEqual => "NotEqual",
        /// Passes if new >= old.
        GreaterEqual => "GreaterEqual",
        /// Always passes.
        Always => "Always",
    }
}

catalog_enum! {
    /// What happens to a stencil value when a test concludes.
    #[derive(Default)]
    pub enum StencilOperation {
        /// Keep the current value.
        #[default]
        Keep => "Keep",
        /// Set to zero.
        Zero => "Zero",
        /// Replace with the reference value.
        Replace => "Replace",
        /// Bitwise invert.
        Invert => "Invert",
        /// Increment, clamping at the maximum.
        IncrementClamp => "IncrementClamp",
        /// Decrement, clamping at zero.
        DecrementClamp => "DecrementClamp",
        /// Increment, wrapping around.
        IncrementWrap => "IncrementWrap",
        /// Decrement, wrapping around.
        DecrementWrap => "DecrementWrap",
    }
}

catalog_enum! {
    /// What happens to an attachment at the start of a pass.
    #[derive(Default)]
    pub enum LoadOp {
        /// Clear to the attachment's clear value.
        #[default]
        Clear => "Clear",
        /// Keep the previous contents.
        Load => "Load",
    }
}

catalog_enum! {
    /// What happens to an attachment at the end of a pass.
    #[derive(Default)]
    pub enum StoreOp {
        /// Write the results back.
        #[default]
        Store => "Store",
        /// The results may be thrown away.
        Discard => "Discard",
    }
}

catalog_enum! {
    /// A blend factor.
    pub enum BlendFactor {
        /// 0.
        Zero => "Zero",
        /// 1.
        One => "One",
        /// Source color.
        Src => "Src",
        /// 1 - source color.
        OneMinusSrc => "OneMinusSrc",
        /// Source alpha.
        SrcAlpha => "SrcAlpha",
        /// 1 - source alpha.
        OneMinusSrcAlpha => "OneMinusSrcAlpha",
        /// Destination color.
        Dst => "Dst",
        /// 1 - destination color.
        OneMinusDst => "OneMinusDst",
        /// Destination alpha.
        DstAlpha => "DstAlpha",
        /// 1 - destination alpha.
        OneMinusDstAlpha => "OneMinusDstAlpha",
        /// min(source alpha, 1 - destination alpha).
        SrcAlphaSaturated => "SrcAlphaSaturated",
        /// The pass blend constant.
        Constant => "Constant",
        /// 1 - the pass blend constant.
        OneMinusConstant => "OneMinusConstant",
    }
}

catalog_enum! {
    /// How blended source and destination terms combine.
    #[derive(Default)]
    pub enum BlendOperation {
        /// src + dst.
        #[default]
        Add => "Add",
        /// src - dst.
        Subtract => "Subtract",
        /// dst - src.
        ReverseSubtract => "ReverseSubtract",
        /// min(src, dst).
        Min => "Min",
        /// max(src, dst).
        Max => "Max",
    }
}

catalog_enum! {
    /// The dimensionality of a texture.
    #[derive(Default)]
    pub enum TextureDimension {
        /// One-dimensional.
        D1 => "1D",
        /// Two-dimensional.
        #[default]
        D2 => "2D",
        /// Three-dimensional.
        D3 => "3D",
    }
}

catalog_enum! {
    /// How a view interprets its texture.
    #[derive(Default)]
    pub enum TextureViewDimension {
        /// One-dimensional.
        D1 => "1D",
        /// Two-dimensional.
        #[default]
        D2 => "2D",
        /// An array of 2D layers.
        D2Array => "2DArray",
        /// A cube map.
        Cube => "Cube",
        /// An array of cube maps.
        CubeArray => "CubeArray",
        /// Three-dimensional.
        D3 => "3D",
    }
}

catalog_enum! {
    /// Which aspect of a texture a view covers.
    #[derive(Default)]
    pub enum TextureAspect {
        /// Every aspect the format has.
        #[default]
        All => "All",
        /// Only the stencil aspect.
        StencilOnly => "StencilOnly",
        /// Only the depth aspect.
        DepthOnly => "DepthOnly",
    }
}

catalog_enum! {
    /// Texel filtering.
    #[derive(Default)]
    pub enum FilterMode {
        /// Nearest texel.
        #[default]
        Nearest => "Nearest",
        /// Linear interpolation.
        Linear => "Linear",
    }
}

catalog_enum! {
    /// How coordinates outside `[0, 1]` are resolved.
    #[derive(Default)]
    pub enum AddressMode {
        /// Clamp to the edge texel.
        #[default]
        ClampToEdge => "ClampToEdge",
        /// Wrap around.
        Repeat => "Repeat",
        /// Wrap around, mirroring every other repetition.
        MirrorRepeat => "MirrorRepeat",
    }
}

catalog_enum! {
    /// A programmable pipeline stage.
    pub enum ShaderStage {
        /// The vertex stage.
        Vertex => "Vertex",
        /// The fragment stage.
        Fragment => "Fragment",
        /// The compute stage.
        Compute => "Compute",
    }
}

catalog_enum! {
    /// Which adapter class an application prefers.
    #[derive(Default)]
    pub enum PowerPreference {
        /// Let the backend decide.
        #[default]
        Default => "Default",
        /// Integrated or otherwise power-saving adapters.
        LowPower => "LowPower",
        /// Discrete or otherwise high-performance adapters.
        HighPerformance => "HighPerformance",
    }
}

catalog_enum! {
    /// The class of a physical adapter.
    #[derive(Default)]
    pub enum AdapterType {
        /// Unknown or other.
        #[default]
        Other => "Other",
        /// Integrated GPU.
        IntegratedGpu => "IntegratedGpu",
        /// Discrete GPU.
        DiscreteGpu => "DiscreteGpu",
        /// Virtualized GPU.
        VirtualGpu => "VirtualGpu",
        /// Software rasterizer.
        Cpu => "Cpu",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_for_every_value() {
        for mode in PresentMode::ALL {
            assert_eq!(PresentMode::from_name(mode.as_str()), Some(*mode));
        }
        for op in CompareFunction::ALL {
            assert_eq!(op.to_string().parse::<CompareFunction>().unwrap(), *op);
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(PresentMode::from_name("VSync"), None);
        assert!("fifo".parse::<PresentMode>().is_err());
    }

    #[test]
    fn defaults_match_documented_values() {
        assert_eq!(PresentMode::default(), PresentMode::Fifo);
        assert_eq!(CompositeAlphaMode::default(), CompositeAlphaMode::Opaque);
        assert_eq!(PrimitiveTopology::default(), PrimitiveTopology::TriangleList);
        assert_eq!(LoadOp::default(), LoadOp::Clear);
        assert_eq!(StoreOp::default(), StoreOp::Store);
    }

    #[test]
    fn vertex_format_sizes() {
        assert_eq!(VertexFormat::Float32x3.size(), 12);
        assert_eq!(VertexFormat::Unorm8x4.size(), 4);
        assert_eq!(VertexFormat::Float16x4.size(), 8);
        assert_eq!(IndexFormat::Uint16.size(), 2);
    }

    #[test]
    fn catalog_enums_serialize_by_name() {
        let json = serde_json::to_string(&TextureViewDimension::D2Array).unwrap();
        assert_eq!(json, "\"2DArray\"");
        let mode: CompositeAlphaMode = serde_json::from_str("\"PreMultiplied\"").unwrap();
        assert_eq!(mode, CompositeAlphaMode::PreMultiplied);
    }
}
