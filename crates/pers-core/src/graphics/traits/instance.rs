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

//! Defines the instance, surface and physical device traits.

use super::device::LogicalDevice;
use crate::graphics::api::{
    DeviceCapabilities, DeviceFeature, DeviceLimits, InstanceDesc, LogicalDeviceDesc,
    PhysicalDeviceOptions, QueueFamily, SurfaceCapabilities,
};
use crate::graphics::error::GraphicsResult;
use crate::graphics::handle::{AdapterHandle, SurfaceHandle};
use crate::platform::NativeWindowHandle;
use std::any::Any;
use std::sync::Arc;

/// The entry point of a backend.
///
/// An instance is created once per application and must outlive every object
/// created from it.
pub trait Instance: Send + Sync + 'static {
    /// The descriptor the instance was created with.
    fn desc(&self) -> &InstanceDesc;

    /// Binds a native window to a presentable surface.
    ///
    /// ## Errors
    /// * `InvalidHandle` if a pointer in the handle is null or the handle's
    ///   platform is not the one the program runs on.
    /// * `Backend` if the driver refuses the window.
    fn create_surface(&self, window: &NativeWindowHandle) -> GraphicsResult<Arc<dyn Surface>>;

    /// Selects an adapter matching `options`.
    ///
    /// Blocks for at most five seconds.
    ///
    /// ## Errors
    /// * `Timeout` if the driver does not answer in time.
    /// * `AdapterUnavailable` if no adapter matches.
    /// * `SoftwareRejected` if only a software adapter was found and the
    ///   instance does not allow one.
    fn request_physical_device(
        &self,
        options: &PhysicalDeviceOptions,
    ) -> GraphicsResult<Arc<dyn PhysicalDevice>>;

    /// Pumps pending backend callbacks.
    fn process_events(&self);
}

/// A window binding the swapchain presents into.
pub trait Surface: Send + Sync + 'static {
    /// A human readable name for the platform binding.
    fn label(&self) -> &str;
    /// The backend's opaque handle.
    fn native_handle(&self) -> SurfaceHandle;
    /// Allows downcasting to the backend type.
    fn as_any(&self) -> &dyn Any;
}

/// A GPU adapter: what the hardware (or software rasterizer) can do.
pub trait PhysicalDevice: Send + Sync + 'static {
    /// Names, memory estimates and feature booleans. Cached after the first
    /// query.
    fn capabilities(&self) -> DeviceCapabilities;

    /// Numeric limits. Cached after the first query.
    fn limits(&self) -> DeviceLimits;

    /// Queue families exposed by the adapter.
    fn queue_families(&self) -> Vec<QueueFamily>;

    /// Whether the adapter can present to `surface`.
    fn supports_surface(&self, surface: &dyn Surface) -> bool;

    /// What `surface` supports on this adapter.
    fn surface_capabilities(&self, surface: &dyn Surface) -> GraphicsResult<SurfaceCapabilities>;

    /// Whether the adapter exposes `feature`.
    fn supports_feature(&self, feature: DeviceFeature) -> bool {
        self.capabilities().supports(feature)
    }

    /// Creates a logical device.
    ///
    /// The device holds a strong reference to this adapter, so the adapter
    /// lives until every device created from it is gone.
    ///
    /// ## Errors
    /// * `FeatureUnsupported` for the first requested feature the adapter lacks.
    /// * `LimitExceeded` for the first requested limit above the adapter's.
    /// * `Timeout` if the driver does not answer within `desc.timeout_ms`.
    fn create_logical_device(
        self: Arc<Self>,
        desc: &LogicalDeviceDesc,
    ) -> GraphicsResult<Arc<dyn LogicalDevice>>;

    /// The backend's opaque handle.
    fn native_handle(&self) -> AdapterHandle;

    /// Allows downcasting to the backend type.
    fn as_any(&self) -> &dyn Any;
}
