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

//! Defines [`WgpuLogicalDevice`], the open connection to a `wgpu` adapter.

use super::command::WgpuCommandEncoder;
use super::factory::WgpuResourceFactory;
use super::queue::WgpuQueue;
use super::swapchain::WgpuSwapChain;
use pers_core::graphics::api::{LogicalDeviceDesc, SwapChainDesc};
use pers_core::graphics::error::{GraphicsError, GraphicsResult};
use pers_core::graphics::handle::DeviceHandle;
use pers_core::graphics::traits::{
    CommandEncoder, LogicalDevice, PhysicalDevice, Queue, ResourceFactory, Surface, SwapChain,
};
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// The `wgpu` implementation of [`LogicalDevice`].
pub struct WgpuLogicalDevice {
    device: wgpu::Device,
    queue: Arc<WgpuQueue>,
    physical: Arc<dyn PhysicalDevice>,
    factory: OnceLock<Arc<WgpuResourceFactory>>,
    lost: Arc<AtomicBool>,
    label: String,
}

impl WgpuLogicalDevice {
    pub(crate) fn new(
        physical: Arc<dyn PhysicalDevice>,
        device: wgpu::Device,
        queue: wgpu::Queue,
        desc: &LogicalDeviceDesc,
    ) -> Arc<dyn LogicalDevice> {
        let label = desc
            .debug_name
            .clone()
            .unwrap_or_else(|| "pers device".to_owned());
        let lost = Arc::new(AtomicBool::new(false));

        device.on_uncaptured_error(Arc::new(|error| match &error {
            wgpu::Error::OutOfMemory { .. } => {
                log::error!("WgpuLogicalDevice: out of memory: {error}");
            }
            wgpu::Error::Validation { description, .. } => {
                log::error!("WgpuLogicalDevice: validation error: {description}");
            }
            other => log::error!("WgpuLogicalDevice: {other}"),
        }));

        let lost_flag = Arc::clone(&lost);
        let lost_label = label.clone();
        device.set_device_lost_callback(move |reason, message| {
            lost_flag.store(true, Ordering::Release);
            match reason {
                wgpu::DeviceLostReason::Destroyed => {
                    log::info!("WgpuLogicalDevice: '{lost_label}' was destroyed");
                }
                _ => log::error!("WgpuLogicalDevice: '{lost_label}' lost: {message}"),
            }
        });

        log::info!(
            "WgpuLogicalDevice: created '{label}' (validation {})",
            if desc.enable_validation { "on" } else { "off" }
        );
        Arc::new(Self {
            queue: Arc::new(WgpuQueue::new(queue, device.clone(), Arc::clone(&lost))),
            device,
            physical,
            factory: OnceLock::new(),
            lost,
            label,
        })
    }

    /// The underlying `wgpu` device.
    pub fn raw(&self) -> &wgpu::Device {
        &self.device
    }

    /// The debug name the device was created with.
    pub fn label(&self) -> &str {
        &self.label
    }

    fn ensure_alive(&self) -> GraphicsResult<()> {
        if self.is_lost() {
            return Err(GraphicsError::DeviceLost(format!(
                "device '{}' is lost",
                self.label
            )));
        }
        Ok(())
    }
}

impl LogicalDevice for WgpuLogicalDevice {
    fn queue(&self) -> Arc<dyn Queue> {
        self.queue.clone()
    }

    fn resource_factory(&self) -> Arc<dyn ResourceFactory> {
        self.factory
            .get_or_init(|| {
                Arc::new(WgpuResourceFactory::new(
                    self.device.clone(),
                    Arc::clone(&self.lost),
                ))
            })
            .clone()
    }

    fn create_command_encoder(
        &self,
        label: Option<&str>,
    ) -> GraphicsResult<Box<dyn CommandEncoder>> {
        self.ensure_alive()?;
        Ok(Box::new(WgpuCommandEncoder::new(&self.device, label)))
    }

    fn create_swap_chain(
        &self,
        surface: &Arc<dyn Surface>,
        desc: &SwapChainDesc,
    ) -> GraphicsResult<Arc<dyn SwapChain>> {
        self.ensure_alive()?;
        let capabilities = self.physical.surface_capabilities(surface.as_ref())?;
        WgpuSwapChain::check_desc(desc, &capabilities)
            .inspect_err(|e| log::error!("WgpuLogicalDevice: {e}"))?;
        let swap_chain = WgpuSwapChain::new(self.device.clone(), Arc::clone(surface), desc.clone())?;
        Ok(Arc::new(swap_chain))
    }

    fn wait_idle(&self) -> bool {
        if self.is_lost() {
            return false;
        }
        self.queue.wait_idle()
    }

    fn physical_device(&self) -> Option<Arc<dyn PhysicalDevice>> {
        Some(Arc::clone(&self.physical))
    }

    fn is_lost(&self) -> bool {
        self.lost.load(Ordering::Acquire)
    }

    fn native_handle(&self) -> DeviceHandle {
        DeviceHandle::from_backend(&self.device)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
