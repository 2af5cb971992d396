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

//! Defines [`WgpuSurface`] and the bridge from [`NativeWindowHandle`] to the
//! raw handles `wgpu` consumes.

use pers_core::graphics::error::{GraphicsError, GraphicsResult};
use pers_core::graphics::handle::SurfaceHandle;
use pers_core::graphics::traits::Surface;
use pers_core::platform::NativeWindowHandle;
use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, RawDisplayHandle,
    RawWindowHandle, WindowHandle,
};
use std::any::Any;
use std::ffi::c_void;
use std::ptr::NonNull;

/// A window bound to the instance.
pub struct WgpuSurface {
    surface: wgpu::Surface<'static>,
    label: &'static str,
}

impl WgpuSurface {
    pub(crate) fn new(surface: wgpu::Surface<'static>, label: &'static str) -> Self {
        Self { surface, label }
    }

    /// The underlying `wgpu` surface.
    pub fn raw(&self) -> &wgpu::Surface<'static> {
        &self.surface
    }

    /// Downcasts a trait object created by this backend.
    pub fn of(surface: &dyn Surface) -> GraphicsResult<&WgpuSurface> {
        surface
            .as_any()
            .downcast_ref::<WgpuSurface>()
            .ok_or_else(|| GraphicsError::invalid("surface was not created by the wgpu backend"))
    }
}

impl Surface for WgpuSurface {
    fn label(&self) -> &str {
        self.label
    }

    fn native_handle(&self) -> SurfaceHandle {
        SurfaceHandle::from_backend(&self.surface)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The label a surface gets for each platform binding.
pub(crate) fn surface_label(window: &NativeWindowHandle) -> &'static str {
    match window {
        NativeWindowHandle::Win32 { .. } => "Windows Surface",
        NativeWindowHandle::Xlib { .. } => "Linux X11 Surface",
        NativeWindowHandle::Wayland { .. } => "Linux Wayland Surface",
        NativeWindowHandle::Metal { .. } | NativeWindowHandle::AppKit { .. } => {
            "macOS Metal Surface"
        }
    }
}

/// Raw window and display handles rebuilt from a [`NativeWindowHandle`].
pub(crate) struct RawWindow {
    window: RawWindowHandle,
    display: RawDisplayHandle,
}

fn non_null(ptr: *mut c_void, what: &str) -> GraphicsResult<NonNull<c_void>> {
    NonNull::new(ptr).ok_or_else(|| GraphicsError::InvalidHandle(format!("{what} is null")))
}

impl RawWindow {
    /// Rebuilds the raw handles. The Metal layer variant has no raw window
    /// handle and yields `None`.
    pub(crate) fn from_native(window: &NativeWindowHandle) -> GraphicsResult<Option<Self>> {
        use raw_window_handle::{
            AppKitDisplayHandle, AppKitWindowHandle, WaylandDisplayHandle, WaylandWindowHandle,
            Win32WindowHandle, WindowsDisplayHandle, XlibDisplayHandle, XlibWindowHandle,
        };

        let raw = match *window {
            NativeWindowHandle::Win32 { hwnd, hinstance } => {
                let hwnd = std::num::NonZeroIsize::new(hwnd as isize)
                    .ok_or_else(|| GraphicsError::InvalidHandle("hwnd is null".to_owned()))?;
                let mut handle = Win32WindowHandle::new(hwnd);
                handle.hinstance = std::num::NonZeroIsize::new(hinstance as isize);
                RawWindow {
                    window: RawWindowHandle::Win32(handle),
                    display: RawDisplayHandle::Windows(WindowsDisplayHandle::new()),
                }
            }
            NativeWindowHandle::Xlib { display, window } => RawWindow {
                window: RawWindowHandle::Xlib(XlibWindowHandle::new(window as _)),
                display: RawDisplayHandle::Xlib(XlibDisplayHandle::new(
                    Some(non_null(display, "X11 display")?),
                    0,
                )),
            },
            NativeWindowHandle::Wayland { display, surface } => RawWindow {
                window: RawWindowHandle::Wayland(WaylandWindowHandle::new(non_null(
                    surface,
                    "Wayland surface",
                )?)),
                display: RawDisplayHandle::Wayland(WaylandDisplayHandle::new(non_null(
                    display,
                    "Wayland display",
                )?)),
            },
            NativeWindowHandle::AppKit { ns_view } => RawWindow {
                window: RawWindowHandle::AppKit(AppKitWindowHandle::new(non_null(
                    ns_view, "NSView",
                )?)),
                display: RawDisplayHandle::AppKit(AppKitDisplayHandle::new()),
            },
            NativeWindowHandle::Metal { .. } => return Ok(None),
        };
        Ok(Some(raw))
    }
}

impl HasWindowHandle for RawWindow {
    fn window_handle(&self) -> Result<WindowHandle<'_>, HandleError> {
        // SAFETY: the embedder keeps the window alive for as long as any
        // surface created from it.
        Ok(unsafe { WindowHandle::borrow_raw(self.window) })
    }
}

impl HasDisplayHandle for RawWindow {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        // SAFETY: see `window_handle`.
        Ok(unsafe { DisplayHandle::borrow_raw(self.display) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_the_platform() {
        let x11 = NativeWindowHandle::Xlib {
            display: 0x10 as *mut c_void,
            window: 7,
        };
        assert_eq!(surface_label(&x11), "Linux X11 Surface");
        let metal = NativeWindowHandle::Metal {
            layer: 0x10 as *mut c_void,
        };
        assert_eq!(surface_label(&metal), "macOS Metal Surface");
    }

    #[test]
    fn raw_handles_are_rebuilt() {
        let wayland = NativeWindowHandle::Wayland {
            display: 0x10 as *mut c_void,
            surface: 0x20 as *mut c_void,
        };
        let raw = RawWindow::from_native(&wayland)
            .ok()
            .flatten()
            .expect("wayland handles convert");
        assert!(matches!(raw.window, RawWindowHandle::Wayland(_)));
        assert!(matches!(raw.display, RawDisplayHandle::Wayland(_)));
        assert!(raw.window_handle().is_ok());
    }

    #[test]
    fn metal_layers_have_no_raw_window() {
        let metal = NativeWindowHandle::Metal {
            layer: 0x10 as *mut c_void,
        };
        assert!(matches!(RawWindow::from_native(&metal), Ok(None)));
    }

    #[test]
    fn null_pointers_are_rejected() {
        let wayland = NativeWindowHandle::Wayland {
            display: std::ptr::null_mut(),
            surface: 0x20 as *mut c_void,
        };
        assert!(matches!(
            RawWindow::from_native(&wayland),
            Err(GraphicsError::InvalidHandle(_))
        ));
    }
}
