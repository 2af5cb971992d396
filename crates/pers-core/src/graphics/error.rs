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

//! Defines the error taxonomy shared by every graphics operation.

use super::api::device::DeviceFeature;
use thiserror::Error;

/// A convenient alias for results produced by the graphics layer.
pub type GraphicsResult<T> = Result<T, GraphicsError>;

/// The coarse categories every [`GraphicsError`] falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The backend or hardware lacks the requested capability.
    Unsupported,
    /// A caller supplied an unusable argument.
    InvalidArgument,
    /// The driver could not allocate memory.
    OutOfMemory,
    /// An operation was attempted in the wrong object state.
    StateViolation,
    /// An asynchronous request did not complete in time.
    Timeout,
    /// The device was lost or dropped.
    DeviceLost,
    /// A diagnostic callback intercepted an unimplemented path.
    CallbackIntercept,
}

/// An error produced by the graphics layer.
#[derive(Debug, Clone, Error)]
pub enum GraphicsError {
    /// A native handle was null or unsupported on this platform.
    #[error("invalid native handle: {0}")]
    InvalidHandle(String),

    /// No adapter satisfied the request.
    #[error("no suitable adapter available: {0}")]
    AdapterUnavailable(String),

    /// Only a software adapter was found and software rendering is disallowed.
    #[error("software adapter '{0}' rejected: software rendering is not allowed")]
    SoftwareRejected(String),

    /// An asynchronous request did not complete before its deadline.
    #[error("{operation} timed out after {timeout_ms} ms")]
    Timeout {
        /// What was being waited on.
        operation: &'static str,
        /// The deadline that expired.
        timeout_ms: u64,
    },

    /// A required device feature is not offered by the adapter.
    #[error("required feature {0} is not supported by the adapter")]
    FeatureUnsupported(DeviceFeature),

    /// A requested limit is larger than what the adapter supports.
    #[error("requested limit {field} = {requested} exceeds supported {supported}")]
    LimitExceeded {
        /// The limit name.
        field: &'static str,
        /// The requested value.
        requested: u32,
        /// The adapter's value.
        supported: u32,
    },

    /// The device was lost.
    #[error("device lost: {0}")]
    DeviceLost(String),

    /// A weak reference to the device could no longer be upgraded.
    #[error("the logical device has been dropped")]
    DeviceExpired,

    /// A caller supplied an unusable argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Allocation of a resource failed.
    #[error("allocation failed: {0}")]
    AllocationFailed(String),

    /// An operation was attempted in the wrong state.
    #[error("state violation: {0}")]
    StateViolation(String),

    /// A shader module failed to compile.
    #[error("shader '{label}' failed to compile:\n{details}")]
    ShaderCompilation {
        /// The shader label.
        label: String,
        /// The compiler diagnostics.
        details: String,
    },

    /// The operation is not supported.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A backend-specific failure that does not fit elsewhere.
    #[error("backend error: {0}")]
    Backend(String),
}

impl GraphicsError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GraphicsError::InvalidHandle(_)
            | GraphicsError::InvalidArgument(_)
            | GraphicsError::LimitExceeded { .. }
            | GraphicsError::ShaderCompilation { .. } => ErrorKind::InvalidArgument,
            GraphicsError::AdapterUnavailable(_)
            | GraphicsError::SoftwareRejected(_)
            | GraphicsError::FeatureUnsupported(_)
            | GraphicsError::Unsupported(_)
            | GraphicsError::Backend(_) => ErrorKind::Unsupported,
            GraphicsError::Timeout { .. } => ErrorKind::Timeout,
            GraphicsError::DeviceLost(_) | GraphicsError::DeviceExpired => ErrorKind::DeviceLost,
            GraphicsError::AllocationFailed(_) => ErrorKind::OutOfMemory,
            GraphicsError::StateViolation(_) => ErrorKind::StateViolation,
        }
    }

    /// Shorthand for [`GraphicsError::InvalidArgument`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        GraphicsError::InvalidArgument(msg.into())
    }

    /// Shorthand for [`GraphicsError::StateViolation`].
    pub fn state(msg: impl Into<String>) -> Self {
        GraphicsError::StateViolation(msg.into())
    }
}
