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

//! # Pers Infra
//!
//! The `wgpu` implementation of the pers-core GPU contracts.
//!
//! ```no_run
//! use pers_core::graphics::api::{InstanceDesc, PhysicalDeviceOptions};
//! use pers_core::graphics::traits::Instance;
//! use pers_infra::WgpuInstance;
//!
//! let instance = WgpuInstance::new(InstanceDesc::default());
//! let adapter = instance.request_physical_device(&PhysicalDeviceOptions::default())?;
//! println!("{}", adapter.capabilities().device_name);
//! # Ok::<(), pers_core::GraphicsError>(())
//! ```

#![warn(missing_docs)]

pub mod graphics;

pub use graphics::wgpu::WgpuInstance;
