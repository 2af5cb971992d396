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

//! Defines the traits every backend implements.
//!
//! Application code only ever sees these traits; a backend crate supplies
//! the concrete objects behind `Arc<dyn ...>` / `Box<dyn ...>`.

mod command;
mod device;
mod factory;
mod instance;
mod queue;
mod resource;
mod swapchain;

pub use self::command::*;
pub use self::device::*;
pub use self::factory::*;
pub use self::instance::*;
pub use self::queue::*;
pub use self::resource::*;
pub use self::swapchain::*;
