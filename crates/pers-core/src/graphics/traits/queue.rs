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

//! Defines the queue trait.

use super::command::CommandBuffer;
use super::resource::Texture;
use crate::graphics::api::BufferWriteDesc;
use crate::graphics::error::GraphicsResult;
use crate::graphics::handle::QueueHandle;
use std::sync::Arc;

/// The device's single submission queue.
///
/// Command buffers execute in submission order.
pub trait Queue: Send + Sync + 'static {
    /// Submits one command buffer.
    fn submit(&self, command_buffer: Box<dyn CommandBuffer>) -> GraphicsResult<()> {
        self.submit_batch(vec![command_buffer])
    }

    /// Submits several command buffers at once. An empty batch succeeds
    /// without doing anything.
    fn submit_batch(&self, command_buffers: Vec<Box<dyn CommandBuffer>>) -> GraphicsResult<()>;

    /// Schedules a write of host bytes into a buffer.
    ///
    /// ## Errors
    /// * `InvalidArgument` if the write is out of bounds or not 4-byte aligned.
    fn write_buffer(&self, write: &BufferWriteDesc<'_>) -> GraphicsResult<()>;

    /// Schedules a write of tightly packed texel rows into one mip level of
    /// `texture`.
    fn write_texture(&self, texture: &Arc<dyn Texture>, data: &[u8], mip_level: u32)
        -> GraphicsResult<()>;

    /// Blocks until every submitted command buffer has finished. Returns
    /// `false` if the wait timed out.
    fn wait_idle(&self) -> bool;

    /// The backend's opaque handle.
    fn native_handle(&self) -> QueueHandle;
}
