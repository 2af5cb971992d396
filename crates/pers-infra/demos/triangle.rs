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

//! Opens a window and draws one triangle per frame through the pers
//! abstraction. Run with `cargo run -p pers-infra --example triangle`.

use anyhow::{anyhow, Context};
use pers_core::graphics::api::{
    DepthStencilState, PresentMode, RenderPipelineDesc, ShaderModuleDesc, ShaderStage,
    TextureFormat,
};
use pers_core::graphics::framebuffer::{
    FramebufferFactory, ResizableFramebuffer, SurfaceFramebuffer, SwapChainFramebuffer,
};
use pers_core::graphics::render_pass_config::{ColorAttachmentConfig, RenderPassConfig};
use pers_core::graphics::swapchain::SwapChainDescBuilder;
use pers_core::graphics::traits::{Instance, LogicalDevice, RenderPipeline};
use pers_core::graphics::Color;
use pers_core::{GraphicsConfig, NativeWindowHandle};
use pers_infra::WgpuInstance;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth24PlusStencil8;

const SHADER: &str = r#"
struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 0.5),
        vec2<f32>(-0.5, -0.5),
        vec2<f32>(0.5, -0.5),
    );
    var colors = array<vec3<f32>, 3>(
        vec3<f32>(1.0, 0.0, 0.0),
        vec3<f32>(0.0, 1.0, 0.0),
        vec3<f32>(0.0, 0.0, 1.0),
    );
    var out: VertexOutput;
    out.position = vec4<f32>(positions[index], 0.0, 1.0);
    out.color = colors[index];
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, 1.0);
}
"#;

struct Renderer {
    // Declared first so the swapchain is released before the device.
    framebuffer: SwapChainFramebuffer,
    pipeline: Arc<dyn RenderPipeline>,
    pass: RenderPassConfig,
    device: Arc<dyn LogicalDevice>,
    _instance: WgpuInstance,
}

/// Settings from the JSON file named by the first argument, or the demo's
/// defaults when there is none.
fn load_config() -> anyhow::Result<GraphicsConfig> {
    let Some(path) = std::env::args_os().nth(1) else {
        let mut config = GraphicsConfig::default();
        config.instance.application_name = "pers triangle".into();
        config.device.debug_name = Some("triangle device".into());
        return Ok(config);
    };
    let config = GraphicsConfig::load(&path)
        .with_context(|| format!("loading {}", path.to_string_lossy()))?;
    log::info!("Loaded graphics config from {}", path.to_string_lossy());
    Ok(config)
}

impl Renderer {
    fn new(window: &Window, config: &GraphicsConfig) -> anyhow::Result<Self> {
        let instance = WgpuInstance::new(config.instance.clone());
        let native = NativeWindowHandle::from_raw(
            window.window_handle().context("window handle")?.as_raw(),
            window.display_handle().context("display handle")?.as_raw(),
        )?;
        let surface = instance.create_surface(&native)?;
        let adapter = instance
            .request_physical_device(&config.adapter.to_options(Some(Arc::clone(&surface))))?;
        log::info!("Using adapter: {}", adapter.capabilities().device_name);

        let capabilities = adapter.surface_capabilities(surface.as_ref())?;
        let size = window.inner_size();
        let mut builder = SwapChainDescBuilder::new()
            .with_label("triangle swapchain")
            .with_dimensions(size.width.max(1), size.height.max(1))
            .with_format(
                config.swapchain.format,
                vec![TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm, TextureFormat::Rgba8Unorm],
            )
            .with_present_mode(config.swapchain.present_mode, vec![PresentMode::Fifo]);
        let negotiated = builder.negotiate(&capabilities);
        if !negotiated.is_success() {
            return Err(anyhow!("swapchain negotiation failed:\n{}", negotiated.report()));
        }
        let desc = builder.build(&negotiated);

        let device = Arc::clone(&adapter).create_logical_device(&config.device)?;
        let framebuffer = FramebufferFactory::new(&device).create_surface_framebuffer(
            &surface,
            &desc,
            Some(DEPTH_FORMAT),
        )?;

        let factory = device.resource_factory();
        let vertex = factory.create_shader_module(&ShaderModuleDesc::wgsl(
            "triangle vs",
            SHADER,
            ShaderStage::Vertex,
            "vs_main",
        ))?;
        let fragment = factory.create_shader_module(&ShaderModuleDesc::wgsl(
            "triangle fs",
            SHADER,
            ShaderStage::Fragment,
            "fs_main",
        ))?;
        let pipeline = factory.create_render_pipeline(&RenderPipelineDesc {
            label: Some("triangle".into()),
            fragment_shader: Some(fragment),
            color_targets: vec![desc.format.into()],
            depth_stencil: Some(DepthStencilState::depth_less(DEPTH_FORMAT)),
            ..RenderPipelineDesc::new(vertex)
        })?;

        let pass = RenderPassConfig {
            color: vec![ColorAttachmentConfig::clear(Color::rgba(0.1, 0.2, 0.3, 1.0))],
            ..RenderPassConfig::default()
        }
        .with_depth()
        .with_label("triangle pass");

        Ok(Self {
            framebuffer,
            pipeline,
            pass,
            device,
            _instance: instance,
        })
    }

    fn render(&self) -> anyhow::Result<()> {
        if !self.framebuffer.acquire_next_image() {
            return Ok(());
        }
        let mut encoder = self.device.create_command_encoder(Some("frame"))?;
        {
            let mut pass = encoder.begin_render_pass(&self.pass.project(&self.framebuffer))?;
            pass.set_pipeline(&self.pipeline);
            pass.draw(3, 1, 0, 0);
            pass.end();
        }
        self.device.queue().submit(encoder.finish()?)?;
        self.framebuffer.present();
        Ok(())
    }
}

#[derive(Default)]
struct App {
    // The surface borrows the window, so the renderer drops first.
    renderer: Option<Renderer>,
    window: Option<Arc<Window>>,
    config: GraphicsConfig,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attributes = Window::default_attributes().with_title("pers triangle");
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        match Renderer::new(&window, &self.config) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(e) => {
                log::error!("Failed to initialize the renderer: {e:#}");
                event_loop.exit();
                return;
            }
        }
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Shutdown requested, exiting event loop...");
                if let Some(renderer) = &self.renderer {
                    renderer.device.wait_idle();
                }
                self.renderer = None;
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &self.renderer {
                    if let Err(e) = renderer.framebuffer.resize(size.width, size.height) {
                        log::error!("Resize failed: {e}");
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(renderer) = &self.renderer {
                    if let Err(e) = renderer.render() {
                        log::error!("Frame failed: {e:#}");
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let event_loop = EventLoop::new()?;
    let mut app = App {
        config: load_config()?,
        ..App::default()
    };
    event_loop.run_app(&mut app)?;
    Ok(())
}
