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

//! # Pers Core
//!
//! Backend-agnostic contracts for the pers GPU abstraction: typed handles,
//! the enum and format catalog, descriptors, the traits every backend
//! implements, and the pure pieces of the frame model (swapchain
//! negotiation, the acquire/present state machine, framebuffers and render
//! pass configuration).

#![warn(missing_docs)]

pub mod config;
pub mod diagnostics;
pub mod graphics;
pub mod platform;
pub mod sync;

pub use config::GraphicsConfig;
pub use graphics::error::{ErrorKind, GraphicsError, GraphicsResult};
pub use platform::window::NativeWindowHandle;
