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

//! The `wgpu` backend.
//!
//! [`WgpuInstance`] is the entry point; every other object is reached
//! through the pers-core traits it hands out.

pub mod command;
pub mod conversions;
pub mod device;
pub mod factory;
pub mod instance;
pub mod physical_device;
pub mod queue;
pub mod resources;
pub mod surface;
pub mod swapchain;

pub use self::command::{WgpuCommandBuffer, WgpuCommandEncoder, WgpuRenderPassEncoder};
pub use self::device::WgpuLogicalDevice;
pub use self::factory::WgpuResourceFactory;
pub use self::instance::WgpuInstance;
pub use self::physical_device::WgpuPhysicalDevice;
pub use self::queue::WgpuQueue;
pub use self::resources::{
    WgpuBindGroup, WgpuBindGroupLayout, WgpuBuffer, WgpuRenderPipeline, WgpuSampler,
    WgpuShaderModule, WgpuTexture, WgpuTextureView,
};
pub use self::surface::WgpuSurface;
pub use self::swapchain::WgpuSwapChain;
