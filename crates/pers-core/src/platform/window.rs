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

//! Defines the native window handle a surface is created from.

use crate::graphics::error::{GraphicsError, GraphicsResult};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
use std::ffi::c_void;

/// A platform window binding, as consumed by `Instance::create_surface`.
///
/// The pointers are never dereferenced by the core crate; they are handed to
/// the backend unchanged. The caller must keep the underlying window alive
/// for as long as any surface created from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeWindowHandle {
    /// A Win32 window.
    Win32 {
        /// The `HWND`.
        hwnd: *mut c_void,
        /// The `HINSTANCE` of the module that owns the window.
        hinstance: *mut c_void,
    },
    /// An X11 window through Xlib.
    Xlib {
        /// The `Display*` connection.
        display: *mut c_void,
        /// The X11 window id.
        window: u64,
    },
    /// A Wayland surface.
    Wayland {
        /// The `wl_display*`.
        display: *mut c_void,
        /// The `wl_surface*`.
        surface: *mut c_void,
    },
    /// A `CAMetalLayer*` on Apple platforms.
    Metal {
        /// The layer pointer.
        layer: *mut c_void,
    },
    /// An `NSView*` on macOS. The backend attaches a Metal layer to it.
    AppKit {
        /// The view pointer.
        ns_view: *mut c_void,
    },
}

// SAFETY: the handle is an inert bag of identifiers. Whoever turns it into a
// surface is responsible for using it on a thread the platform allows.
unsafe impl Send for NativeWindowHandle {}
unsafe impl Sync for NativeWindowHandle {}

impl NativeWindowHandle {
    /// Bridges the handles produced by `raw-window-handle` 0.6 (winit, sdl, ...).
    pub fn from_raw(window: RawWindowHandle, display: RawDisplayHandle) -> GraphicsResult<Self> {
        match (window, display) {
            (RawWindowHandle::Win32(w), _) => Ok(Self::Win32 {
                hwnd: w.hwnd.get() as *mut c_void,
                hinstance: w
                    .hinstance
                    .map_or(std::ptr::null_mut(), |h| h.get() as *mut c_void),
            }),
            (RawWindowHandle::Xlib(w), RawDisplayHandle::Xlib(d)) => Ok(Self::Xlib {
                display: d
                    .display
                    .map_or(std::ptr::null_mut(), |p| p.as_ptr()),
                window: w.window as u64,
            }),
            (RawWindowHandle::Wayland(w), RawDisplayHandle::Wayland(d)) => Ok(Self::Wayland {
                display: d.display.as_ptr(),
                surface: w.surface.as_ptr(),
            }),
            (RawWindowHandle::AppKit(w), _) => Ok(Self::AppKit {
                ns_view: w.ns_view.as_ptr(),
            }),
            (w, d) => Err(GraphicsError::InvalidHandle(format!(
                "unsupported window/display handle pair: {w:?} / {d:?}"
            ))),
        }
    }

    /// The platform family name, used in surface labels and logs.
    pub fn platform_name(&self) -> &'static str {
        match self {
            Self::Win32 { .. } => "Win32",
            Self::Xlib { .. } => "Xlib",
            Self::Wayland { .. } => "Wayland",
            Self::Metal { .. } => "Metal",
            Self::AppKit { .. } => "AppKit",
        }
    }

    /// Whether this kind of handle can be turned into a surface on the
    /// platform the crate was compiled for.
    pub fn is_supported_on_current_platform(&self) -> bool {
        match self {
            Self::Win32 { .. } => cfg!(target_os = "windows"),
            Self::Xlib { .. } | Self::Wayland { .. } => {
                cfg!(all(unix, not(target_vendor = "apple"), not(target_os = "android")))
            }
            Self::Metal { .. } | Self::AppKit { .. } => cfg!(target_vendor = "apple"),
        }
    }

    /// Checks that the handle is usable: no null pointers, and a variant the
    /// current platform supports.
    pub fn validate(&self) -> GraphicsResult<()> {
        let has_null = match *self {
            Self::Win32 { hwnd, .. } => hwnd.is_null(),
            Self::Xlib { display, window } => display.is_null() || window == 0,
            Self::Wayland { display, surface } => display.is_null() || surface.is_null(),
            Self::Metal { layer } => layer.is_null(),
            Self::AppKit { ns_view } => ns_view.is_null(),
        };
        if has_null {
            return Err(GraphicsError::InvalidHandle(format!(
                "{} window handle contains a null pointer",
                self.platform_name()
            )));
        }
        if !self.is_supported_on_current_platform() {
            return Err(GraphicsError::InvalidHandle(format!(
                "{} window handles are not supported on this platform",
                self.platform_name()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_pointers_are_rejected() {
        let handle = NativeWindowHandle::Wayland {
            display: std::ptr::null_mut(),
            surface: 0x10 as *mut c_void,
        };
        assert!(matches!(
            handle.validate(),
            Err(GraphicsError::InvalidHandle(_))
        ));

        let handle = NativeWindowHandle::Xlib {
            display: 0x10 as *mut c_void,
            window: 0,
        };
        assert!(handle.validate().is_err());
    }

    #[test]
    fn exactly_one_family_matches_the_current_platform() {
        let p = 0x10 as *mut c_void;
        let win32 = NativeWindowHandle::Win32 {
            hwnd: p,
            hinstance: p,
        };
        let metal = NativeWindowHandle::Metal { layer: p };
        let wayland = NativeWindowHandle::Wayland {
            display: p,
            surface: p,
        };
        let supported = [win32, metal, wayland]
            .iter()
            .filter(|h| h.is_supported_on_current_platform())
            .count();
        assert!(supported <= 1);
    }

    #[test]
    fn raw_wayland_handles_are_bridged() {
        use raw_window_handle::{WaylandDisplayHandle, WaylandWindowHandle};
        use std::ptr::NonNull;

        let mut display_obj = 1u8;
        let mut surface_obj = 2u8;
        let display = NonNull::from(&mut display_obj).cast::<c_void>();
        let surface = NonNull::from(&mut surface_obj).cast::<c_void>();

        let handle = NativeWindowHandle::from_raw(
            RawWindowHandle::Wayland(WaylandWindowHandle::new(surface)),
            RawDisplayHandle::Wayland(WaylandDisplayHandle::new(display)),
        )
        .unwrap();

        assert_eq!(
            handle,
            NativeWindowHandle::Wayland {
                display: display.as_ptr(),
                surface: surface.as_ptr(),
            }
        );
        assert_eq!(handle.platform_name(), "Wayland");
    }
}
