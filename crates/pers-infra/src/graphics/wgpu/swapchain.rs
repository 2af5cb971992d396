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

//! Defines [`WgpuSwapChain`], a configured `wgpu::Surface` driven by the
//! backend-independent acquire/present state machine.

use super::conversions::{wgpu_format, IntoWgpu};
use super::resources::WgpuTextureView;
use super::surface::WgpuSurface;
use parking_lot::Mutex;
use pers_core::graphics::api::{
    SurfaceCapabilities, SwapChainDesc, TextureAspect, TextureViewDimension,
};
use pers_core::graphics::error::{GraphicsError, GraphicsResult};
use pers_core::graphics::handle::SwapChainHandle;
use pers_core::graphics::swapchain::{
    AcquireAction, AcquireStatus, PresentAction, ResizeAction, SwapChainState,
    SwapChainStateMachine,
};
use pers_core::graphics::traits::{Surface, SwapChain, TextureView};
use std::sync::Arc;

/// Splits the surface's answer into a state machine status and the texture,
/// if one was handed out.
fn acquire_status(current: wgpu::CurrentSurfaceTexture) -> (AcquireStatus, Option<wgpu::SurfaceTexture>) {
    match current {
        wgpu::CurrentSurfaceTexture::Success(texture) => (AcquireStatus::Optimal, Some(texture)),
        wgpu::CurrentSurfaceTexture::Suboptimal(texture) => {
            (AcquireStatus::Suboptimal, Some(texture))
        }
        wgpu::CurrentSurfaceTexture::Timeout | wgpu::CurrentSurfaceTexture::Occluded => {
            (AcquireStatus::Timeout, None)
        }
        wgpu::CurrentSurfaceTexture::Outdated => (AcquireStatus::Outdated, None),
        wgpu::CurrentSurfaceTexture::Lost => (AcquireStatus::Lost, None),
        wgpu::CurrentSurfaceTexture::Validation => (AcquireStatus::Other, None),
    }
}

struct Frame {
    texture: wgpu::SurfaceTexture,
    view: Arc<dyn TextureView>,
}

struct Inner {
    desc: SwapChainDesc,
    machine: SwapChainStateMachine,
    frame: Option<Frame>,
}

/// A swapchain over a `wgpu` surface.
pub struct WgpuSwapChain {
    device: wgpu::Device,
    surface: Arc<dyn Surface>,
    inner: Mutex<Inner>,
}

impl WgpuSwapChain {
    /// Checks a descriptor against what the surface supports.
    pub fn check_desc(desc: &SwapChainDesc, capabilities: &SurfaceCapabilities) -> GraphicsResult<()> {
        if desc.width == 0 || desc.height == 0 {
            return Err(GraphicsError::invalid(format!(
                "swapchain size {}x{} is empty",
                desc.width, desc.height
            )));
        }
        if !capabilities.contains_size(desc.width, desc.height) {
            return Err(GraphicsError::invalid(format!(
                "swapchain size {}x{} is outside {}x{}..={}x{}",
                desc.width,
                desc.height,
                capabilities.min_width,
                capabilities.min_height,
                capabilities.max_width,
                capabilities.max_height
            )));
        }
        if !capabilities.formats.contains(&desc.format) {
            return Err(GraphicsError::invalid(format!(
                "surface does not support format {}",
                desc.format
            )));
        }
        if !capabilities.present_modes.contains(&desc.present_mode) {
            return Err(GraphicsError::invalid(format!(
                "surface does not support present mode {}",
                desc.present_mode
            )));
        }
        if !capabilities.alpha_modes.contains(&desc.alpha_mode) {
            return Err(GraphicsError::invalid(format!(
                "surface does not support alpha mode {}",
                desc.alpha_mode
            )));
        }
        if !capabilities.usages.contains(desc.usage) {
            return Err(GraphicsError::invalid(format!(
                "surface images do not support usage {:?}",
                desc.usage
            )));
        }
        Ok(())
    }

    /// Configures `surface` for `device` and wraps it.
    pub fn new(device: wgpu::Device, surface: Arc<dyn Surface>, desc: SwapChainDesc) -> GraphicsResult<Self> {
        configure(&device, surface.as_ref(), &desc)?;
        let mut machine = SwapChainStateMachine::new(desc.width, desc.height);
        machine.configured()?;
        log::info!(
            "WgpuSwapChain: configured '{}' at {}x{} {} {}",
            desc.label.as_deref().unwrap_or("<unnamed>"),
            desc.width,
            desc.height,
            desc.format,
            desc.present_mode
        );
        Ok(Self {
            device,
            surface,
            inner: Mutex::new(Inner {
                desc,
                machine,
                frame: None,
            }),
        })
    }

    fn reconfigure(&self, inner: &mut Inner) -> GraphicsResult<()> {
        if let Err(e) = configure(&self.device, self.surface.as_ref(), &inner.desc) {
            log::error!("WgpuSwapChain: reconfigure failed: {e}");
            inner.machine.reconfigure_failed();
            return Err(e);
        }
        inner.machine.configured()
    }

    fn wrap_frame(&self, inner: &mut Inner, texture: wgpu::SurfaceTexture) -> Arc<dyn TextureView> {
        let raw = texture.texture.create_view(&wgpu::TextureViewDescriptor {
            label: inner.desc.label.as_deref(),
            ..Default::default()
        });
        let view: Arc<dyn TextureView> = Arc::new(
            WgpuTextureView::new(
                raw,
                inner.desc.label.clone(),
                inner.desc.format,
                TextureViewDimension::D2,
                TextureAspect::All,
                (texture.texture.width(), texture.texture.height()),
                1,
            )
            .for_swapchain(),
        );
        inner.frame = Some(Frame {
            texture,
            view: Arc::clone(&view),
        });
        view
    }
}

fn configure(device: &wgpu::Device, surface: &dyn Surface, desc: &SwapChainDesc) -> GraphicsResult<()> {
    let surface = WgpuSurface::of(surface)?;
    let config = wgpu::SurfaceConfiguration {
        usage: desc.usage.into_wgpu(),
        format: wgpu_format(desc.format)?,
        width: desc.width,
        height: desc.height,
        present_mode: desc.present_mode.into_wgpu(),
        desired_maximum_frame_latency: desc.desired_image_count.saturating_sub(1).max(1),
        alpha_mode: desc.alpha_mode.into_wgpu(),
        view_formats: vec![],
    };
    surface.raw().configure(device, &config);
    Ok(())
}

impl SwapChain for WgpuSwapChain {
    fn desc(&self) -> SwapChainDesc {
        self.inner.lock().desc.clone()
    }

    fn state(&self) -> SwapChainState {
        self.inner.lock().machine.state()
    }

    fn acquire_next_image(&self) -> Option<Arc<dyn TextureView>> {
        let mut inner = self.inner.lock();
        match inner.machine.begin_acquire() {
            Ok(true) => inner.frame = None,
            Ok(false) => {}
            Err(e) => {
                log::warn!("WgpuSwapChain: {e}");
                return None;
            }
        }
        if inner.machine.needs_reconfigure() {
            log::debug!("WgpuSwapChain: retrying a pending reconfigure before acquiring");
            self.reconfigure(&mut inner).ok()?;
        }
        let surface = WgpuSurface::of(self.surface.as_ref())
            .inspect_err(|e| log::error!("WgpuSwapChain: {e}"))
            .ok()?;
        loop {
            let (status, texture) = acquire_status(surface.raw().get_current_texture());
            match (inner.machine.on_acquire(status), texture) {
                (AcquireAction::Use, Some(texture)) => {
                    return Some(self.wrap_frame(&mut inner, texture));
                }
                (AcquireAction::ReconfigureAndRetry, _) => {
                    self.reconfigure(&mut inner).ok()?;
                }
                _ => return None,
            }
        }
    }

    fn current_view(&self) -> Option<Arc<dyn TextureView>> {
        self.inner.lock().frame.as_ref().map(|f| Arc::clone(&f.view))
    }

    fn present(&self) {
        let mut inner = self.inner.lock();
        let action = inner.machine.present();
        if action == PresentAction::Skip {
            return;
        }
        if let Some(frame) = inner.frame.take() {
            frame.texture.present();
        }
        if action == PresentAction::PresentAndReconfigure {
            log::debug!("WgpuSwapChain: reconfiguring after a suboptimal frame");
            if self.reconfigure(&mut inner).is_err() {
                log::warn!("WgpuSwapChain: will retry the reconfigure on the next acquire");
            }
        }
    }

    fn resize(&self, width: u32, height: u32) -> GraphicsResult<()> {
        let mut inner = self.inner.lock();
        match inner.machine.resize(width, height) {
            ResizeAction::Reconfigure { drop_view } => {
                if drop_view {
                    inner.frame = None;
                }
                inner.desc.width = width;
                inner.desc.height = height;
                self.reconfigure(&mut inner)
            }
            ResizeAction::Unchanged | ResizeAction::Ignore => Ok(()),
        }
    }

    fn destroy(&self) {
        let mut inner = self.inner.lock();
        if inner.machine.state() == SwapChainState::Gone {
            return;
        }
        if inner.machine.destroy() {
            log::warn!("WgpuSwapChain: destroyed with an image still acquired, discarding it");
        }
        inner.frame = None;
        log::debug!(
            "WgpuSwapChain: '{}' destroyed",
            inner.desc.label.as_deref().unwrap_or("<unnamed>")
        );
    }

    fn native_handle(&self) -> SwapChainHandle {
        SwapChainHandle::from_backend(self as *const Self)
    }
}

impl Drop for WgpuSwapChain {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pers_core::graphics::api::{CompositeAlphaMode, PresentMode, TextureFormat};

    fn capabilities() -> SurfaceCapabilities {
        SurfaceCapabilities {
            formats: vec![TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm],
            present_modes: vec![PresentMode::Fifo],
            alpha_modes: vec![CompositeAlphaMode::Opaque],
            ..SurfaceCapabilities::default()
        }
    }

    #[test]
    fn supported_desc_passes() {
        let desc = SwapChainDesc::default();
        assert!(WgpuSwapChain::check_desc(&desc, &capabilities()).is_ok());
    }

    #[test]
    fn unsupported_settings_are_rejected() {
        let caps = capabilities();
        for desc in [
            SwapChainDesc {
                width: 0,
                ..SwapChainDesc::default()
            },
            SwapChainDesc {
                format: TextureFormat::Rgba16Float,
                ..SwapChainDesc::default()
            },
            SwapChainDesc {
                present_mode: PresentMode::Mailbox,
                ..SwapChainDesc::default()
            },
            SwapChainDesc {
                alpha_mode: CompositeAlphaMode::PreMultiplied,
                ..SwapChainDesc::default()
            },
        ] {
            assert!(matches!(
                WgpuSwapChain::check_desc(&desc, &caps),
                Err(GraphicsError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn surface_errors_map_to_acquire_status() {
        let status = |current| acquire_status(current).0;
        assert_eq!(status(wgpu::CurrentSurfaceTexture::Outdated), AcquireStatus::Outdated);
        assert_eq!(status(wgpu::CurrentSurfaceTexture::Lost), AcquireStatus::Lost);
        assert_eq!(status(wgpu::CurrentSurfaceTexture::Timeout), AcquireStatus::Timeout);
        assert_eq!(status(wgpu::CurrentSurfaceTexture::Occluded), AcquireStatus::Timeout);
        assert_eq!(status(wgpu::CurrentSurfaceTexture::Validation), AcquireStatus::Other);
    }
}
