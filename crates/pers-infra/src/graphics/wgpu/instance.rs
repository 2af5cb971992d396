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

//! Defines [`WgpuInstance`], the entry point of the `wgpu` backend.

use super::conversions::IntoWgpu;
use super::physical_device::WgpuPhysicalDevice;
use super::surface::{surface_label, RawWindow, WgpuSurface};
use pers_core::graphics::api::{BackendSelection, InstanceDesc, PhysicalDeviceOptions};
use pers_core::graphics::error::{GraphicsError, GraphicsResult};
use pers_core::graphics::traits::{Instance, PhysicalDevice, Surface};
use pers_core::platform::NativeWindowHandle;
use pers_core::sync::{completion, EventPump, PUMP_INTERVAL};
use std::sync::Arc;
use std::time::Duration;

/// How long an adapter request may take before it is abandoned.
pub const ADAPTER_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// The native APIs `selection` resolves to.
pub fn wgpu_backends(selection: BackendSelection, allow_software: bool) -> wgpu::Backends {
    match selection {
        BackendSelection::Auto if allow_software => wgpu::Backends::all(),
        BackendSelection::Auto => wgpu::Backends::PRIMARY,
        BackendSelection::All => wgpu::Backends::all(),
        BackendSelection::Primary => wgpu::Backends::PRIMARY,
        BackendSelection::Vulkan => wgpu::Backends::VULKAN,
        BackendSelection::Metal => wgpu::Backends::METAL,
        BackendSelection::Dx12 => wgpu::Backends::DX12,
        BackendSelection::Gl => wgpu::Backends::GL,
    }
}

/// The instance flags the validation switches of `desc` ask for.
pub fn wgpu_instance_flags(desc: &InstanceDesc) -> wgpu::InstanceFlags {
    let mut flags = wgpu::InstanceFlags::empty();
    if desc.enable_validation {
        flags |= wgpu::InstanceFlags::VALIDATION | wgpu::InstanceFlags::DEBUG;
    }
    if desc.enable_gpu_validation {
        flags |= wgpu::InstanceFlags::GPU_BASED_VALIDATION;
    }
    flags
}

/// The DX12 shader compiler for this platform. Windows prefers DXC and falls
/// back to FXC when no DXC library can be loaded.
pub fn platform_dx12_compiler() -> wgpu::Dx12Compiler {
    if cfg!(windows) {
        wgpu::Dx12Compiler::Auto
    } else {
        wgpu::Dx12Compiler::Fxc
    }
}

/// Builds the `wgpu` descriptor for `desc`.
///
/// Per-backend options start from the platform choice and may be overridden
/// by the `WGPU_*` environment variables. Backends and flags come from `desc`.
pub fn instance_descriptor(desc: &InstanceDesc) -> wgpu::InstanceDescriptor {
    let mut backend_options = wgpu::BackendOptions::default();
    backend_options.dx12.shader_compiler = platform_dx12_compiler();
    backend_options.gl.gles_minor_version = wgpu::Gles3MinorVersion::Automatic;
    backend_options.gl.fence_behavior = wgpu::GlFenceBehavior::Normal;

    let mut instance_desc = wgpu::InstanceDescriptor::new_without_display_handle();
    instance_desc.backends = wgpu_backends(desc.backends, desc.allow_software_renderer);
    instance_desc.flags = wgpu_instance_flags(desc);
    instance_desc.backend_options = backend_options.with_env();
    instance_desc
}

/// The `wgpu` implementation of [`Instance`].
pub struct WgpuInstance {
    instance: wgpu::Instance,
    desc: InstanceDesc,
}

impl WgpuInstance {
    /// Creates the instance. `PERS_BACKEND` overrides `desc.backends`.
    pub fn new(mut desc: InstanceDesc) -> Self {
        if let Some(selection) = BackendSelection::from_env() {
            log::info!("WgpuInstance: backend override from environment: {selection:?}");
            desc.backends = selection;
        }

        let instance_desc = instance_descriptor(&desc);
        if desc.enable_synchronization_validation {
            log::debug!("WgpuInstance: synchronization validation has no wgpu switch, ignoring");
        }
        for extension in &desc.required_extensions {
            log::warn!("WgpuInstance: extension '{extension}' is managed by wgpu, ignoring");
        }

        log::info!(
            "WgpuInstance: creating instance for '{}' with backends {:?}",
            desc.application_name,
            instance_desc.backends
        );
        log::debug!(
            "WgpuInstance: DX12 compiler {:?}, GLES minor version {:?}",
            instance_desc.backend_options.dx12.shader_compiler,
            instance_desc.backend_options.gl.gles_minor_version
        );
        let instance = wgpu::Instance::new(instance_desc);
        Self { instance, desc }
    }

    /// The underlying `wgpu` instance.
    pub fn raw(&self) -> &wgpu::Instance {
        &self.instance
    }

    fn wgpu_surface(&self, window: &NativeWindowHandle) -> GraphicsResult<wgpu::Surface<'static>> {
        #[cfg(target_vendor = "apple")]
        if let NativeWindowHandle::Metal { layer } = *window {
            // SAFETY: `validate` rejected a null layer; the embedder keeps it alive.
            return unsafe {
                self.instance
                    .create_surface_unsafe(wgpu::SurfaceTargetUnsafe::CoreAnimationLayer(layer))
            }
            .map_err(|e| GraphicsError::Backend(format!("failed to create surface: {e}")));
        }

        let raw = RawWindow::from_native(window)?.ok_or_else(|| {
            GraphicsError::InvalidHandle(format!(
                "{} handles are not supported on this platform",
                window.platform_name()
            ))
        })?;
        // SAFETY: the handles were validated and outlive the surface per the
        // `NativeWindowHandle` contract.
        let target = unsafe { wgpu::SurfaceTargetUnsafe::from_window(&raw) }
            .map_err(|e| GraphicsError::InvalidHandle(format!("failed to create surface target: {e}")))?;
        unsafe { self.instance.create_surface_unsafe(target) }
            .map_err(|e| GraphicsError::Backend(format!("failed to create surface: {e}")))
    }
}

impl Instance for WgpuInstance {
    fn desc(&self) -> &InstanceDesc {
        &self.desc
    }

    fn create_surface(&self, window: &NativeWindowHandle) -> GraphicsResult<Arc<dyn Surface>> {
        window
            .validate()
            .inspect_err(|e| log::error!("WgpuInstance: rejected window handle: {e}"))?;
        let label = surface_label(window);
        let surface = self
            .wgpu_surface(window)
            .inspect_err(|e| log::error!("WgpuInstance: {e}"))?;
        log::debug!("WgpuInstance: created {label}");
        Ok(Arc::new(WgpuSurface::new(surface, label)))
    }

    fn request_physical_device(
        &self,
        options: &PhysicalDeviceOptions,
    ) -> GraphicsResult<Arc<dyn PhysicalDevice>> {
        let power_preference = if options.power_preference == Default::default()
            && self.desc.prefer_high_performance
        {
            wgpu::PowerPreference::HighPerformance
        } else {
            options.power_preference.into_wgpu()
        };
        let force_fallback_adapter = options.force_fallback_adapter;
        let compatible_surface = options.compatible_surface.clone();
        if let Some(surface) = &compatible_surface {
            WgpuSurface::of(surface.as_ref())?;
        }

        let (completer, result) = completion();
        let instance = self.instance.clone();
        std::thread::Builder::new()
            .name("pers-adapter-request".to_owned())
            .spawn(move || {
                let surface = compatible_surface
                    .as_deref()
                    .and_then(|s| WgpuSurface::of(s).ok())
                    .map(WgpuSurface::raw);
                let adapter = pollster::block_on(instance.request_adapter(
                    &wgpu::RequestAdapterOptions {
                        power_preference,
                        force_fallback_adapter,
                        compatible_surface: surface,
                    },
                ));
                completer.complete(adapter);
            })
            .map_err(|e| GraphicsError::Backend(format!("failed to spawn adapter request: {e}")))?;

        let pump_instance = self.instance.clone();
        let pump = EventPump::spawn("pers-adapter-pump", PUMP_INTERVAL, move || {
            pump_instance.poll_all(false);
        })
        .map_err(|e| GraphicsError::Backend(format!("failed to spawn event pump: {e}")))?;
        let outcome = result.wait_timeout(ADAPTER_REQUEST_TIMEOUT);
        pump.stop();

        let adapter = match outcome {
            Some(Ok(adapter)) => adapter,
            Some(Err(e)) => {
                log::error!("WgpuInstance: no suitable adapter: {e}");
                return Err(GraphicsError::AdapterUnavailable(e.to_string()));
            }
            None => {
                log::error!("WgpuInstance: adapter request timed out");
                return Err(GraphicsError::Timeout {
                    operation: "adapter request",
                    timeout_ms: ADAPTER_REQUEST_TIMEOUT.as_millis() as u64,
                });
            }
        };

        let info = adapter.get_info();
        if info.device_type == wgpu::DeviceType::Cpu
            && !self.desc.allow_software_renderer
            && !force_fallback_adapter
        {
            log::error!(
                "WgpuInstance: adapter '{}' is a software rasterizer and software rendering is disabled",
                info.name
            );
            return Err(GraphicsError::SoftwareRejected(info.name));
        }
        log::info!(
            "WgpuInstance: selected adapter '{}' ({:?}, {:?})",
            info.name,
            info.backend,
            info.device_type
        );
        Ok(Arc::new(WgpuPhysicalDevice::new(
            adapter,
            self.instance.clone(),
        )))
    }

    fn process_events(&self) {
        self.instance.poll_all(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_selection_depends_on_software_permission() {
        assert_eq!(
            wgpu_backends(BackendSelection::Auto, true),
            wgpu::Backends::all()
        );
        assert_eq!(
            wgpu_backends(BackendSelection::Auto, false),
            wgpu::Backends::PRIMARY
        );
        assert_eq!(
            wgpu_backends(BackendSelection::Gl, false),
            wgpu::Backends::GL
        );
    }

    #[test]
    fn validation_switches_map_to_flags() {
        let desc = InstanceDesc {
            enable_validation: true,
            enable_gpu_validation: false,
            ..Default::default()
        };
        let flags = wgpu_instance_flags(&desc);
        assert!(flags.contains(wgpu::InstanceFlags::VALIDATION));
        assert!(!flags.contains(wgpu::InstanceFlags::GPU_BASED_VALIDATION));

        let quiet = InstanceDesc {
            enable_validation: false,
            enable_gpu_validation: false,
            ..Default::default()
        };
        assert!(wgpu_instance_flags(&quiet).is_empty());
    }

    #[test]
    fn descriptor_carries_selection_and_platform_options() {
        let desc = InstanceDesc {
            backends: BackendSelection::Vulkan,
            enable_validation: true,
            ..Default::default()
        };
        let instance_desc = instance_descriptor(&desc);
        assert_eq!(instance_desc.backends, wgpu::Backends::VULKAN);
        assert_eq!(instance_desc.flags, wgpu_instance_flags(&desc));
        assert!(instance_desc.display.is_none());
        if std::env::var_os("WGPU_GLES_MINOR_VERSION").is_none() {
            assert_eq!(
                instance_desc.backend_options.gl.gles_minor_version,
                wgpu::Gles3MinorVersion::Automatic
            );
        }
        if std::env::var_os("WGPU_DX12_COMPILER").is_none() {
            let expected = if cfg!(windows) { "Auto" } else { "Fxc" };
            assert_eq!(
                format!("{:?}", instance_desc.backend_options.dx12.shader_compiler),
                expected
            );
        }
    }

    #[test]
    fn json_config_drives_the_descriptor() {
        let config = pers_core::GraphicsConfig::from_json_str(
            r#"{ "instance": { "backends": "Gl", "enable_validation": false } }"#,
        )
        .unwrap();
        let instance_desc = instance_descriptor(&config.instance);
        assert_eq!(instance_desc.backends, wgpu::Backends::GL);
        assert!(instance_desc.flags.is_empty());
    }

    #[test]
    fn surfaces_reject_null_handles() {
        let instance = WgpuInstance::new(InstanceDesc::default());
        let window = NativeWindowHandle::Wayland {
            display: std::ptr::null_mut(),
            surface: std::ptr::null_mut(),
        };
        assert!(matches!(
            instance.create_surface(&window),
            Err(GraphicsError::InvalidHandle(_))
        ));
    }
}
