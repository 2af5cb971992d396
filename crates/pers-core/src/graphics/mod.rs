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

//! The graphics layer: handles, descriptors, backend traits and the
//! backend-agnostic buffer, swapchain and framebuffer machinery built on them.

pub mod api;
pub mod buffers;
pub mod error;
pub mod framebuffer;
pub mod handle;
pub mod pass_state;
pub mod render_pass_config;
pub mod swapchain;
pub mod traits;

#[cfg(test)]
pub(crate) mod mock;

pub use api::*;
pub use buffers::{
    DeferredStagingBuffer, DeviceBuffer, ImmediateStagingBuffer, MapFuture, MappedRange,
};
pub use error::{ErrorKind, GraphicsError, GraphicsResult};
pub use handle::*;
pub use pass_state::RenderPassState;
pub use render_pass_config::{ColorAttachmentConfig, DepthStencilConfig, RenderPassConfig};
pub use traits::*;
