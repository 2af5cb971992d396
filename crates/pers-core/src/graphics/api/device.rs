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

//! Defines instance, adapter and logical device descriptors and the
//! capability model.

use super::enums::{catalog_enum, AdapterType, PowerPreference};
use crate::graphics::traits::Surface;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Name of the environment variable that overrides the backend set.
pub const BACKEND_ENV_VAR: &str = "PERS_BACKEND";

/// Which native APIs the instance may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BackendSelection {
    /// Every backend when software rendering is allowed, primary hardware
    /// backends otherwise.
    #[default]
    Auto,
    /// Every backend, including GL.
    All,
    /// Vulkan, Metal and DX12.
    Primary,
    /// Vulkan only.
    Vulkan,
    /// Metal only.
    Metal,
    /// DirectX 12 only.
    Dx12,
    /// OpenGL / GLES only.
    Gl,
}

impl BackendSelection {
    /// Parses the values accepted by `PERS_BACKEND` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "all" => Some(Self::All),
            "primary" => Some(Self::Primary),
            "vulkan" | "vk" => Some(Self::Vulkan),
            "metal" | "mtl" => Some(Self::Metal),
            "dx12" | "d3d12" => Some(Self::Dx12),
            "gl" | "gles" | "opengl" => Some(Self::Gl),
            _ => None,
        }
    }

    /// Reads `PERS_BACKEND`; unset or unparsable values yield `None`.
    pub fn from_env() -> Option<Self> {
        let value = std::env::var(BACKEND_ENV_VAR).ok()?;
        let parsed = Self::parse(&value);
        if parsed.is_none() {
            log::warn!("{BACKEND_ENV_VAR}: ignoring unknown backend '{value}'");
        }
        parsed
    }
}

/// A descriptor used to create the instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceDesc {
    /// Application name, for driver diagnostics.
    pub application_name: String,
    /// Application version.
    pub application_version: u32,
    /// Engine name, for driver diagnostics.
    pub engine_name: String,
    /// Engine version.
    pub engine_version: u32,
    /// Enable API validation and debug labels.
    pub enable_validation: bool,
    /// Enable GPU-assisted validation. Slow.
    pub enable_gpu_validation: bool,
    /// Enable synchronization validation where the backend has it.
    pub enable_synchronization_validation: bool,
    /// Allow software (CPU) adapters and the GL backend.
    pub allow_software_renderer: bool,
    /// Prefer discrete adapters when the request does not say otherwise.
    pub prefer_high_performance: bool,
    /// Backend-specific extensions that must be present.
    pub required_extensions: Vec<String>,
    /// Backend-specific extensions used when present.
    pub optional_extensions: Vec<String>,
    /// Preferred native API version; 0 means latest.
    pub preferred_api_version: u32,
    /// Backend set. `PERS_BACKEND` overrides it.
    pub backends: BackendSelection,
}

impl Default for InstanceDesc {
    fn default() -> Self {
        Self {
            application_name: "Pers Application".to_owned(),
            application_version: 1,
            engine_name: "Pers".to_owned(),
            engine_version: 1,
            enable_validation: true,
            enable_gpu_validation: false,
            enable_synchronization_validation: false,
            allow_software_renderer: false,
            prefer_high_performance: true,
            required_extensions: Vec::new(),
            optional_extensions: Vec::new(),
            preferred_api_version: 0,
            backends: BackendSelection::Auto,
        }
    }
}

/// Options for choosing a physical device.
#[derive(Clone, Default)]
pub struct PhysicalDeviceOptions {
    /// Adapter class preference.
    pub power_preference: PowerPreference,
    /// Only consider software adapters.
    pub force_fallback_adapter: bool,
    /// A surface the adapter must be able to present to.
    pub compatible_surface: Option<Arc<dyn Surface>>,
}

impl std::fmt::Debug for PhysicalDeviceOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicalDeviceOptions")
            .field("power_preference", &self.power_preference)
            .field("force_fallback_adapter", &self.force_fallback_adapter)
            .field(
                "compatible_surface",
                &self.compatible_surface.as_ref().map(|s| s.label().to_owned()),
            )
            .finish()
    }
}

catalog_enum! {
    /// An optional device feature that must be requested at device creation.
    pub enum DeviceFeature {
        /// Depth clipping can be disabled.
        DepthClipControl => "DepthClipControl",
        /// The `Depth32FloatStencil8` format.
        Depth32FloatStencil8 => "Depth32FloatStencil8",
        /// Timestamp queries.
        TimestampQuery => "TimestampQuery",
        /// Pipeline statistics queries.
        PipelineStatisticsQuery => "PipelineStatisticsQuery",
        /// BC compressed formats.
        TextureCompressionBC => "TextureCompressionBC",
        /// ETC2 and EAC compressed formats.
        TextureCompressionETC2 => "TextureCompressionETC2",
        /// ASTC compressed formats.
        TextureCompressionASTC => "TextureCompressionASTC",
        /// `first_instance` in indirect draws.
        IndirectFirstInstance => "IndirectFirstInstance",
        /// `f16` in shaders.
        ShaderF16 => "ShaderF16",
        /// `RG11B10Ufloat` as a render target.
        RG11B10UfloatRenderable => "RG11B10UfloatRenderable",
        /// `BGRA8Unorm` as a storage texture.
        BGRA8UnormStorage => "BGRA8UnormStorage",
        /// Filtering of 32-bit float textures.
        Float32Filterable => "Float32Filterable",
    }
}

/// What a physical device can do.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    /// Human-readable adapter name.
    pub device_name: String,
    /// Driver name and version.
    pub driver_info: String,
    /// Native API the adapter is driven through.
    pub backend: String,
    /// Adapter class.
    pub adapter_type: AdapterType,
    /// Dedicated video memory estimate in bytes, 0 if unknown.
    pub dedicated_video_memory: u64,
    /// Dedicated system memory estimate in bytes, 0 if unknown.
    pub dedicated_system_memory: u64,
    /// Shared system memory estimate in bytes, 0 if unknown.
    pub shared_system_memory: u64,
    /// Compute shaders.
    pub supports_compute: bool,
    /// Always false on this family of APIs.
    pub supports_ray_tracing: bool,
    /// Always false on this family of APIs.
    pub supports_tessellation: bool,
    /// `f16` in shaders.
    pub supports_shader_f16: bool,
    /// BC compressed formats.
    pub supports_texture_compression_bc: bool,
    /// ETC2 compressed formats.
    pub supports_texture_compression_etc2: bool,
    /// ASTC compressed formats.
    pub supports_texture_compression_astc: bool,
    /// `Depth32FloatStencil8`.
    pub supports_depth32_float_stencil8: bool,
    /// Depth clip control.
    pub supports_depth_clip_control: bool,
    /// `RG11B10Ufloat` render targets.
    pub supports_rg11b10_ufloat_renderable: bool,
    /// `BGRA8Unorm` storage textures.
    pub supports_bgra8_unorm_storage: bool,
    /// 32-bit float filtering.
    pub supports_float32_filterable: bool,
    /// Timestamp queries.
    pub supports_timestamp_query: bool,
    /// Pipeline statistics queries.
    pub supports_pipeline_statistics_query: bool,
    /// `first_instance` in indirect draws.
    pub supports_indirect_first_instance: bool,
    /// Largest 2D texture side.
    pub max_texture_size_2d: u32,
    /// Largest 3D texture side.
    pub max_texture_size_3d: u32,
    /// Most array layers.
    pub max_texture_layers: u32,
}

impl DeviceCapabilities {
    /// Whether `feature` is reported as available.
    pub fn supports(&self, feature: DeviceFeature) -> bool {
        match feature {
            DeviceFeature::DepthClipControl => self.supports_depth_clip_control,
            DeviceFeature::Depth32FloatStencil8 => self.supports_depth32_float_stencil8,
            DeviceFeature::TimestampQuery => self.supports_timestamp_query,
            DeviceFeature::PipelineStatisticsQuery => self.supports_pipeline_statistics_query,
            DeviceFeature::TextureCompressionBC => self.supports_texture_compression_bc,
            DeviceFeature::TextureCompressionETC2 => self.supports_texture_compression_etc2,
            DeviceFeature::TextureCompressionASTC => self.supports_texture_compression_astc,
            DeviceFeature::IndirectFirstInstance => self.supports_indirect_first_instance,
            DeviceFeature::ShaderF16 => self.supports_shader_f16,
            DeviceFeature::RG11B10UfloatRenderable => self.supports_rg11b10_ufloat_renderable,
            DeviceFeature::BGRA8UnormStorage => self.supports_bgra8_unorm_storage,
            DeviceFeature::Float32Filterable => self.supports_float32_filterable,
        }
    }
}

macro_rules! device_limits {
    ($($(#[$meta:meta])* $field:ident),+ $(,)?) => {
        /// Resource limits of a device. Every field is an upper bound.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(default)]
        pub struct DeviceLimits {
            $($(#[$meta])* pub $field: u32,)+
        }

        impl DeviceLimits {
            /// Every limit as `(name, value)`, in declaration order.
            pub fn fields(&self) -> Vec<(&'static str, u32)> {
                vec![$((stringify!($field), self.$field)),+]
            }

            /// The first limit in `self` that is larger than the same limit
            /// in `supported`, as `(name, requested, supported)`.
            pub fn first_exceeding(&self, supported: &DeviceLimits) -> Option<(&'static str, u32, u32)> {
                $(
                    if self.$field > supported.$field {
                        return Some((stringify!($field), self.$field, supported.$field));
                    }
                )+
                None
            }
        }
    };
}

device_limits! {
    /// Largest 1D texture.
    max_texture_dimension_1d,
    /// Largest 2D texture side.
    max_texture_dimension_2d,
    /// Largest 3D texture side.
    max_texture_dimension_3d,
    /// Most texture array layers.
    max_texture_array_layers,
    /// Most bind groups in a pipeline layout.
    max_bind_groups,
    /// Most bindings in one bind group.
    max_bindings_per_bind_group,
    /// Most dynamic uniform buffers per pipeline layout.
    max_dynamic_uniform_buffers_per_pipeline_layout,
    /// Most dynamic storage buffers per pipeline layout.
    max_dynamic_storage_buffers_per_pipeline_layout,
    /// Most sampled textures per stage.
    max_sampled_textures_per_shader_stage,
    /// Most samplers per stage.
    max_samplers_per_shader_stage,
    /// Most storage buffers per stage.
    max_storage_buffers_per_shader_stage,
    /// Most storage textures per stage.
    max_storage_textures_per_shader_stage,
    /// Most uniform buffers per stage.
    max_uniform_buffers_per_shader_stage,
    /// Largest uniform buffer binding.
    max_uniform_buffer_binding_size,
    /// Largest storage buffer binding.
    max_storage_buffer_binding_size,
    /// Most vertex buffers.
    max_vertex_buffers,
    /// Most vertex attributes.
    max_vertex_attributes,
    /// Largest vertex stride.
    max_vertex_buffer_array_stride,
    /// Largest workgroup shared memory.
    max_compute_workgroup_storage_size,
    /// Most invocations per workgroup.
    max_compute_invocations_per_workgroup,
    /// Largest workgroup X size.
    max_compute_workgroup_size_x,
    /// Largest workgroup Y size.
    max_compute_workgroup_size_y,
    /// Largest workgroup Z size.
    max_compute_workgroup_size_z,
    /// Most workgroups per dispatch dimension.
    max_compute_workgroups_per_dimension,
}

/// A queue family. Backends of this API family expose exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct QueueFamily {
    /// Family index.
    pub index: u32,
    /// Queues in the family.
    pub queue_count: u32,
    /// Graphics work.
    pub supports_graphics: bool,
    /// Compute work.
    pub supports_compute: bool,
    /// Transfers.
    pub supports_transfer: bool,
    /// Sparse binding.
    pub supports_sparse: bool,
}

impl QueueFamily {
    /// The single graphics + compute + transfer family.
    pub const UNIVERSAL: Self = Self {
        index: 0,
        queue_count: 1,
        supports_graphics: true,
        supports_compute: true,
        supports_transfer: true,
        supports_sparse: false,
    };
}

/// A descriptor used to create a logical device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicalDeviceDesc {
    /// Enable validation on the device.
    pub enable_validation: bool,
    /// Debug label.
    pub debug_name: Option<String>,
    /// Features that must be enabled.
    pub required_features: Vec<DeviceFeature>,
    /// Backend-specific extensions.
    pub required_extensions: Vec<String>,
    /// Limits the device must provide; adapter defaults when `None`.
    pub required_limits: Option<DeviceLimits>,
    /// Informational; there is only one family.
    pub queue_families: Vec<QueueFamily>,
    /// How long to wait for the device, in milliseconds.
    pub timeout_ms: u64,
}

impl LogicalDeviceDesc {
    /// Default device creation timeout.
    pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

    /// The creation timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for LogicalDeviceDesc {
    fn default() -> Self {
        Self {
            enable_validation: true,
            debug_name: None,
            required_features: Vec::new(),
            required_extensions: Vec::new(),
            required_limits: None,
            queue_families: vec![QueueFamily::UNIVERSAL],
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
        }
    }
}
