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

//! Defines [`WgpuPhysicalDevice`], the adapter side of the `wgpu` backend.

use super::conversions::{wgpu_features, wgpu_limits, FromWgpu, IntoWgpu};
use super::device::WgpuLogicalDevice;
use super::surface::WgpuSurface;
use parking_lot::Mutex;
use pers_core::graphics::api::{
    AdapterType, CompositeAlphaMode, DeviceCapabilities, DeviceFeature, DeviceLimits,
    LogicalDeviceDesc, PresentMode, QueueFamily, SurfaceCapabilities, TextureFormat, TextureUsage,
};
use pers_core::graphics::error::{GraphicsError, GraphicsResult};
use pers_core::graphics::handle::AdapterHandle;
use pers_core::graphics::traits::{LogicalDevice, PhysicalDevice, Surface};
use pers_core::sync::{completion, EventPump, PUMP_INTERVAL};
use std::any::Any;
use std::sync::Arc;
use wgpu::Backend;

/// Returns a human-readable name for a `wgpu` backend.
pub fn backend_name(backend: Backend) -> &'static str {
    match backend {
        Backend::Vulkan => "Vulkan",
        Backend::Metal => "Metal",
        Backend::Dx12 => "DirectX 12",
        Backend::Gl => "OpenGL",
        Backend::BrowserWebGpu => "WebGPU",
        Backend::Noop => "No-op",
    }
}

/// Builds the capability report of an adapter from what `wgpu` exposes.
///
/// `wgpu` does not report memory sizes, so the three memory estimates are 0.
pub fn capabilities_from_adapter(
    info: &wgpu::AdapterInfo,
    features: wgpu::Features,
    limits: &wgpu::Limits,
    downlevel: &wgpu::DownlevelCapabilities,
) -> DeviceCapabilities {
    let has = |feature: DeviceFeature| features.contains(feature.into_wgpu());
    let driver_info = format!("{} {}", info.driver, info.driver_info)
        .trim()
        .to_owned();
    DeviceCapabilities {
        device_name: info.name.clone(),
        driver_info,
        backend: backend_name(info.backend).to_owned(),
        adapter_type: AdapterType::from_wgpu(info.device_type).unwrap_or_default(),
        dedicated_video_memory: 0,
        dedicated_system_memory: 0,
        shared_system_memory: 0,
        supports_compute: downlevel
            .flags
            .contains(wgpu::DownlevelFlags::COMPUTE_SHADERS),
        supports_ray_tracing: false,
        supports_tessellation: false,
        supports_shader_f16: has(DeviceFeature::ShaderF16),
        supports_texture_compression_bc: has(DeviceFeature::TextureCompressionBC),
        supports_texture_compression_etc2: has(DeviceFeature::TextureCompressionETC2),
        supports_texture_compression_astc: has(DeviceFeature::TextureCompressionASTC),
        supports_depth32_float_stencil8: has(DeviceFeature::Depth32FloatStencil8),
        supports_depth_clip_control: has(DeviceFeature::DepthClipControl),
        supports_rg11b10_ufloat_renderable: has(DeviceFeature::RG11B10UfloatRenderable),
        supports_bgra8_unorm_storage: has(DeviceFeature::BGRA8UnormStorage),
        supports_float32_filterable: has(DeviceFeature::Float32Filterable),
        supports_timestamp_query: has(DeviceFeature::TimestampQuery),
        supports_pipeline_statistics_query: has(DeviceFeature::PipelineStatisticsQuery),
        supports_indirect_first_instance: has(DeviceFeature::IndirectFirstInstance),
        max_texture_size_2d: limits.max_texture_dimension_2d,
        max_texture_size_3d: limits.max_texture_dimension_3d,
        max_texture_layers: limits.max_texture_array_layers,
    }
}

/// Checks requested features and limits against what the adapter offers.
pub(crate) fn check_device_request(
    desc: &LogicalDeviceDesc,
    capabilities: &DeviceCapabilities,
    supported: &DeviceLimits,
) -> GraphicsResult<()> {
    if let Some(&missing) = desc
        .required_features
        .iter()
        .find(|f| !capabilities.supports(**f))
    {
        return Err(GraphicsError::FeatureUnsupported(missing));
    }
    if let Some((field, requested, supported)) = desc
        .required_limits
        .as_ref()
        .and_then(|requested| requested.first_exceeding(supported))
    {
        return Err(GraphicsError::LimitExceeded {
            field,
            requested,
            supported,
        });
    }
    Ok(())
}

/// A `wgpu` adapter.
pub struct WgpuPhysicalDevice {
    adapter: wgpu::Adapter,
    instance: wgpu::Instance,
    capabilities: Mutex<Option<DeviceCapabilities>>,
    limits: Mutex<Option<DeviceLimits>>,
}

impl WgpuPhysicalDevice {
    pub(crate) fn new(adapter: wgpu::Adapter, instance: wgpu::Instance) -> Self {
        Self {
            adapter,
            instance,
            capabilities: Mutex::new(None),
            limits: Mutex::new(None),
        }
    }

    /// The underlying `wgpu` adapter.
    pub fn raw(&self) -> &wgpu::Adapter {
        &self.adapter
    }
}

impl PhysicalDevice for WgpuPhysicalDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
            .lock()
            .get_or_insert_with(|| {
                pers_core::todo_someday!(
                    "WgpuPhysicalDevice",
                    "wgpu does not report memory sizes, the memory estimates of '{}' are 0",
                    self.adapter.get_info().name
                );
                capabilities_from_adapter(
                    &self.adapter.get_info(),
                    self.adapter.features(),
                    &self.adapter.limits(),
                    &self.adapter.get_downlevel_capabilities(),
                )
            })
            .clone()
    }

    fn limits(&self) -> DeviceLimits {
        *self.limits.lock().get_or_insert_with(|| {
            DeviceLimits::from_wgpu(&self.adapter.limits()).unwrap_or_default()
        })
    }

    fn queue_families(&self) -> Vec<QueueFamily> {
        vec![QueueFamily::UNIVERSAL]
    }

    fn supports_surface(&self, surface: &dyn Surface) -> bool {
        self.surface_capabilities(surface)
            .map(|caps| !caps.formats.is_empty())
            .unwrap_or(false)
    }

    fn surface_capabilities(&self, surface: &dyn Surface) -> GraphicsResult<SurfaceCapabilities> {
        let surface = WgpuSurface::of(surface)?;
        let caps = surface.raw().get_capabilities(&self.adapter);
        if caps.formats.is_empty() {
            return Err(GraphicsError::Unsupported(format!(
                "{} cannot be presented by this adapter",
                surface.label()
            )));
        }
        let max_side = self.adapter.limits().max_texture_dimension_2d;
        let max_image_count = if caps.present_modes.contains(&wgpu::PresentMode::Mailbox) {
            3
        } else {
            2
        };
        Ok(SurfaceCapabilities {
            formats: caps
                .formats
                .iter()
                .filter_map(|f| TextureFormat::from_wgpu(*f))
                .collect(),
            present_modes: caps
                .present_modes
                .iter()
                .filter_map(|m| PresentMode::from_wgpu(*m))
                .collect(),
            alpha_modes: caps
                .alpha_modes
                .iter()
                .filter_map(|m| CompositeAlphaMode::from_wgpu(*m))
                .collect(),
            usages: TextureUsage::from_wgpu(caps.usages).unwrap_or(TextureUsage::RENDER_ATTACHMENT),
            max_width: max_side,
            max_height: max_side,
            max_image_count,
            ..SurfaceCapabilities::default()
        })
    }

    fn create_logical_device(
        self: Arc<Self>,
        desc: &LogicalDeviceDesc,
    ) -> GraphicsResult<Arc<dyn LogicalDevice>> {
        check_device_request(desc, &self.capabilities(), &self.limits())
            .inspect_err(|e| log::error!("WgpuPhysicalDevice: {e}"))?;
        for extension in &desc.required_extensions {
            log::warn!("WgpuPhysicalDevice: extension '{extension}' is managed by wgpu, ignoring");
        }

        let required_features = wgpu_features(&desc.required_features);
        let base_limits = self.adapter.limits();
        let required_limits = match &desc.required_limits {
            Some(requested) => wgpu_limits(requested, base_limits),
            None => base_limits,
        };
        let label = desc.debug_name.clone();

        let (completer, result) = completion();
        let adapter = self.adapter.clone();
        std::thread::Builder::new()
            .name("pers-device-request".to_owned())
            .spawn(move || {
                let device = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
                    label: label.as_deref(),
                    required_features,
                    required_limits,
                    ..Default::default()
                }));
                completer.complete(device);
            })
            .map_err(|e| GraphicsError::Backend(format!("failed to spawn device request: {e}")))?;

        let pump_instance = self.instance.clone();
        let pump = EventPump::spawn("pers-device-pump", PUMP_INTERVAL, move || {
            pump_instance.poll_all(false);
        })
        .map_err(|e| GraphicsError::Backend(format!("failed to spawn event pump: {e}")))?;
        let outcome = result.wait_timeout(desc.timeout());
        pump.stop();

        let (device, queue) = match outcome {
            Some(Ok(pair)) => pair,
            Some(Err(e)) => {
                log::error!("WgpuPhysicalDevice: device request failed: {e}");
                return Err(GraphicsError::Backend(format!("device request failed: {e}")));
            }
            None => {
                log::error!(
                    "WgpuPhysicalDevice: device request timed out after {} ms",
                    desc.timeout_ms
                );
                return Err(GraphicsError::Timeout {
                    operation: "device request",
                    timeout_ms: desc.timeout_ms,
                });
            }
        };

        Ok(WgpuLogicalDevice::new(self, device, queue, desc))
    }

    fn native_handle(&self) -> AdapterHandle {
        AdapterHandle::from_backend(&self.adapter)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_features_are_reported_first() {
        let caps = DeviceCapabilities {
            supports_shader_f16: true,
            ..Default::default()
        };
        let desc = LogicalDeviceDesc {
            required_features: vec![DeviceFeature::ShaderF16, DeviceFeature::TimestampQuery],
            ..Default::default()
        };
        assert!(matches!(
            check_device_request(&desc, &caps, &DeviceLimits::default()),
            Err(GraphicsError::FeatureUnsupported(DeviceFeature::TimestampQuery))
        ));
    }

    #[test]
    fn excessive_limits_are_rejected() {
        let supported = DeviceLimits {
            max_bind_groups: 4,
            ..Default::default()
        };
        let desc = LogicalDeviceDesc {
            required_limits: Some(DeviceLimits {
                max_bind_groups: 8,
                ..Default::default()
            }),
            ..Default::default()
        };
        match check_device_request(&desc, &DeviceCapabilities::default(), &supported) {
            Err(GraphicsError::LimitExceeded {
                field,
                requested,
                supported,
            }) => {
                assert_eq!(field, "max_bind_groups");
                assert_eq!((requested, supported), (8, 4));
            }
            other => panic!("expected LimitExceeded, got {other:?}"),
        }
    }

    #[test]
    fn backend_names_are_readable() {
        assert_eq!(backend_name(Backend::Dx12), "DirectX 12");
        assert_eq!(backend_name(Backend::Gl), "OpenGL");
    }
}
