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

//! Defines strongly typed, non-owning handles to backend objects.
//!
//! A handle is a pointer-sized payload tagged at the type level with the kind
//! of object it names. Handles of different kinds are distinct types, so a
//! `TextureHandle` can never be passed where a `BufferHandle` is expected.
//!
//! ```compile_fail
//! use pers_core::graphics::handle::{BufferHandle, TextureHandle};
//! let b = BufferHandle::from_raw(1);
//! let t = TextureHandle::from_raw(1);
//! let _ = b == t;
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker trait implemented by the zero-sized kind types.
pub trait HandleKind: 'static {
    /// The kind name shown by `Debug`.
    const NAME: &'static str;
}

/// A typed, non-owning handle. The null handle is the default.
pub struct Handle<K: HandleKind> {
    raw: usize,
    _kind: PhantomData<fn() -> K>,
}

impl<K: HandleKind> Handle<K> {
    /// The null handle.
    pub const fn null() -> Self {
        Self {
            raw: 0,
            _kind: PhantomData,
        }
    }

    /// Wraps a raw payload.
    pub const fn from_raw(raw: usize) -> Self {
        Self {
            raw,
            _kind: PhantomData,
        }
    }

    /// Wraps the address of a backend object. The handle does not keep the
    /// object alive.
    pub fn from_backend<T>(object: *const T) -> Self {
        Self::from_raw(object as usize)
    }

    /// Returns the raw payload.
    pub const fn raw(&self) -> usize {
        self.raw
    }

    /// Whether this is the null handle.
    pub const fn is_null(&self) -> bool {
        self.raw == 0
    }

    /// Whether the handle names something.
    pub const fn is_valid(&self) -> bool {
        !self.is_null()
    }
}

// Manual impls so that `K` itself needs none of these traits.
impl<K: HandleKind> Clone for Handle<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: HandleKind> Copy for Handle<K> {}

impl<K: HandleKind> PartialEq for Handle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<K: HandleKind> Eq for Handle<K> {}

impl<K: HandleKind> Hash for Handle<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<K: HandleKind> Default for Handle<K> {
    fn default() -> Self {
        Self::null()
    }
}

impl<K: HandleKind> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "{}(null)", K::NAME)
        } else {
            write!(f, "{}({:#x})", K::NAME, self.raw)
        }
    }
}

macro_rules! handle_kinds {
    ($($(#[$meta:meta])* $kind:ident => $alias:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub enum $kind {}

            impl HandleKind for $kind {
                const NAME: &'static str = stringify!($alias);
            }

            $(#[$meta])*
            pub type $alias = Handle<$kind>;
        )+
    };
}

handle_kinds! {
    /// Names a physical adapter.
    AdapterKind => AdapterHandle,
    /// Names a logical device.
    DeviceKind => DeviceHandle,
    /// Names a queue.
    QueueKind => QueueHandle,
    /// Names a presentation surface.
    SurfaceKind => SurfaceHandle,
    /// Names a swapchain.
    SwapChainKind => SwapChainHandle,
    /// Names a finished command buffer.
    CommandBufferKind => CommandBufferHandle,
    /// Names a command encoder.
    CommandEncoderKind => CommandEncoderHandle,
    /// Names a render pass being recorded.
    RenderPassKind => RenderPassHandle,
    /// Names a texture.
    TextureKind => TextureHandle,
    /// Names a texture view.
    TextureViewKind => TextureViewHandle,
    /// Names a buffer.
    BufferKind => BufferHandle,
    /// Names a sampler.
    SamplerKind => SamplerHandle,
    /// Names a render pipeline.
    PipelineKind => PipelineHandle,
    /// Names a shader module.
    ShaderKind => ShaderHandle,
    /// Names a bind group.
    BindGroupKind => BindGroupHandle,
    /// Names a bind group layout.
    BindGroupLayoutKind => BindGroupLayoutHandle,
    /// Names a pipeline layout.
    PipelineLayoutKind => PipelineLayoutHandle,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_handle_is_null() {
        let handle = BufferHandle::default();
        assert!(handle.is_null());
        assert!(!handle.is_valid());
        assert_eq!(handle, BufferHandle::null());
    }

    #[test]
    fn handles_compare_by_payload() {
        let a = TextureHandle::from_raw(0x1000);
        let b = TextureHandle::from_raw(0x1000);
        let c = TextureHandle::from_raw(0x2000);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.is_valid());

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn backend_pointer_round_trips_through_raw() {
        let object = 5u64;
        let handle = DeviceHandle::from_backend(&object as *const u64);
        assert_eq!(handle.raw(), &object as *const u64 as usize);
    }

    #[test]
    fn debug_shows_kind_name() {
        assert_eq!(format!("{:?}", SamplerHandle::null()), "SamplerHandle(null)");
        assert_eq!(
            format!("{:?}", PipelineHandle::from_raw(0x10)),
            "PipelineHandle(0x10)"
        );
    }

    #[test]
    fn handles_are_pointer_sized() {
        assert_eq!(std::mem::size_of::<BufferHandle>(), std::mem::size_of::<usize>());
    }
}
