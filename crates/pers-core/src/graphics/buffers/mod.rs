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

//! Defines the backend-agnostic buffer family.
//!
//! * [`DeviceBuffer`]: GPU-only memory, filled by copies or queue writes.
//! * [`ImmediateStagingBuffer`]: mapped at creation, written on the host,
//!   then copied to a device buffer.
//! * [`DeferredStagingBuffer`]: the copy target of a download, mapped
//!   asynchronously for readback.

mod deferred_staging;
mod device_buffer;
mod immediate_staging;
mod mapping;

pub use self::deferred_staging::DeferredStagingBuffer;
pub use self::device_buffer::DeviceBuffer;
pub use self::immediate_staging::ImmediateStagingBuffer;
pub use self::mapping::{MapFuture, MappedRange};
