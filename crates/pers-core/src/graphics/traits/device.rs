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

//! Defines the logical device trait.

use super::command::CommandEncoder;
use super::factory::ResourceFactory;
use super::instance::{PhysicalDevice, Surface};
use super::queue::Queue;
use super::swapchain::SwapChain;
use crate::graphics::api::SwapChainDesc;
use crate::graphics::error::GraphicsResult;
use crate::graphics::handle::DeviceHandle;
use std::any::Any;
use std::sync::Arc;

/// An open connection to an adapter: the owner of the queue, the resource
/// factory and every object created through them.
///
/// Devices are always shared through `Arc` and never copied. Objects that
/// need to reach back to their device hold a `Weak`.
pub trait LogicalDevice: Send + Sync + 'static {
    /// The device's single queue.
    fn queue(&self) -> Arc<dyn Queue>;

    /// The resource factory, created on first use.
    fn resource_factory(&self) -> Arc<dyn ResourceFactory>;

    /// Starts recording a command buffer.
    fn create_command_encoder(&self, label: Option<&str>)
        -> GraphicsResult<Box<dyn CommandEncoder>>;

    /// Configures `surface` for presentation.
    ///
    /// ## Errors
    /// * `InvalidArgument` if the size is zero or the format, present mode or
    ///   alpha mode is not supported by the surface.
    fn create_swap_chain(
        &self,
        surface: &Arc<dyn Surface>,
        desc: &SwapChainDesc,
    ) -> GraphicsResult<Arc<dyn SwapChain>>;

    /// Blocks until all submitted work has finished. Returns `false` on
    /// timeout or device loss.
    fn wait_idle(&self) -> bool;

    /// The adapter this device was created from. A device keeps its adapter
    /// alive, so backends return `None` only when they have no adapter object.
    fn physical_device(&self) -> Option<Arc<dyn PhysicalDevice>>;

    /// Whether the driver has reported the device lost.
    fn is_lost(&self) -> bool;

    /// The backend's opaque handle.
    fn native_handle(&self) -> DeviceHandle;

    /// Allows downcasting to the backend type.
    fn as_any(&self) -> &dyn Any;
}
