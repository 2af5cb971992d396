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

//! End-to-end checks of the wgpu backend. Every test needs an adapter and
//! skips itself when none is available.

use pers_core::graphics::api::{
    BufferCopyDesc, BufferDesc, BufferMapRange, BufferUsage, DepthStencilState, InstanceDesc,
    LogicalDeviceDesc, MapMode, PhysicalDeviceOptions, RenderPipelineDesc, ShaderModuleDesc,
    ShaderStage, TextureFormat,
};
use pers_core::graphics::buffers::{DeferredStagingBuffer, DeviceBuffer, ImmediateStagingBuffer};
use pers_core::graphics::framebuffer::{
    Framebuffer, OffscreenFramebuffer, OffscreenFramebufferConfig,
};
use pers_core::graphics::render_pass_config::{ColorAttachmentConfig, RenderPassConfig};
use pers_core::graphics::handle::SurfaceHandle;
use pers_core::graphics::traits::{CommandBuffer, Instance, LogicalDevice, PhysicalDevice, Surface};
use pers_core::graphics::{Color, GraphicsError};
use pers_infra::WgpuInstance;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

const TRIANGLE: &str = r#"
@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    let x = f32(i32(index) - 1);
    let y = f32(i32(index & 1u) * 2 - 1);
    return vec4<f32>(x, y, 0.0, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.0, 0.0, 1.0);
}
"#;

fn create_test_adapter() -> Option<Arc<dyn PhysicalDevice>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let instance = WgpuInstance::new(InstanceDesc {
        allow_software_renderer: true,
        ..InstanceDesc::default()
    });
    instance
        .request_physical_device(&PhysicalDeviceOptions::default())
        .ok()
}

fn create_test_device() -> Option<Arc<dyn LogicalDevice>> {
    create_test_adapter()?
        .create_logical_device(&LogicalDeviceDesc::default())
        .ok()
}

/// Bitwise CRC-32 (IEEE, reflected).
fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = !0u32;
    for &byte in bytes {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
        }
    }
    !crc
}

/// A surface that no wgpu adapter can present to.
struct ForeignSurface;

impl Surface for ForeignSurface {
    fn label(&self) -> &str {
        "foreign surface"
    }

    fn native_handle(&self) -> SurfaceHandle {
        SurfaceHandle::null()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

macro_rules! device_or_skip {
    ($name:literal) => {
        match create_test_device() {
            Some(device) => device,
            None => {
                println!("Skipping {}: could not create test device.", $name);
                return;
            }
        }
    };
}

#[test]
fn adapter_reports_capabilities() {
    let device = device_or_skip!("adapter_reports_capabilities");
    let adapter = device.physical_device().expect("adapter outlives the test");
    let caps = adapter.capabilities();
    assert!(!caps.device_name.is_empty());
    assert!(!caps.backend.is_empty());
    assert!(adapter.limits().max_texture_dimension_2d >= 2048);
    assert!(!device.is_lost());
}

#[test]
fn device_keeps_its_adapter_alive() {
    let Some(adapter) = create_test_adapter() else {
        println!("Skipping device_keeps_its_adapter_alive: could not create test adapter.");
        return;
    };
    let name = adapter.capabilities().device_name;
    let device = Arc::clone(&adapter)
        .create_logical_device(&LogicalDeviceDesc::default())
        .expect("device");
    drop(adapter);

    let adapter = device.physical_device().expect("device holds its adapter");
    assert_eq!(adapter.capabilities().device_name, name);
    drop(adapter);

    let target = OffscreenFramebuffer::new(
        &device,
        OffscreenFramebufferConfig {
            width: 8,
            height: 8,
            color_formats: vec![TextureFormat::Rgba8Unorm],
            ..OffscreenFramebufferConfig::default()
        },
    )
    .expect("offscreen target");
    assert_eq!(target.width(), 8);
    assert!(device.physical_device().is_some());
}

#[test]
fn foreign_surfaces_are_neither_supported_nor_described() {
    let Some(adapter) = create_test_adapter() else {
        println!("Skipping foreign_surfaces_are_neither_supported_nor_described: no adapter.");
        return;
    };
    let surface = ForeignSurface;
    assert!(!adapter.supports_surface(&surface));
    assert!(adapter.surface_capabilities(&surface).is_err());
}

#[test]
fn byte_pattern_survives_upload_and_download() {
    const SIZE: usize = 4096;
    let device = device_or_skip!("byte_pattern_survives_upload_and_download");
    let factory = device.resource_factory();
    let pattern: Vec<u8> = (0..SIZE).map(|i| (i & 0xFF) as u8).collect();
    assert_eq!(crc32(&pattern), 0xA291_2082);

    let staging = ImmediateStagingBuffer::create(factory.as_ref(), SIZE as u64, Some("pattern upload"))
        .expect("staging buffer");
    staging.write_bytes(&pattern, 0).expect("write");
    staging.finalize();
    let gpu = DeviceBuffer::create(
        factory.as_ref(),
        &BufferDesc::new(SIZE as u64, BufferUsage::STORAGE).with_label("pattern"),
    )
    .expect("device buffer");
    let readback = DeferredStagingBuffer::create(factory.as_ref(), SIZE as u64, Some("pattern readback"))
        .expect("readback buffer");

    let mut encoder = device.create_command_encoder(Some("pattern")).expect("encoder");
    encoder
        .upload_to_device_buffer(&staging, &gpu, &BufferCopyDesc::whole())
        .expect("upload");
    readback
        .download_from(encoder.as_mut(), &gpu, &BufferCopyDesc::whole())
        .expect("download");
    device.queue().submit(encoder.finish().expect("finish")).expect("submit");

    let mapped = readback
        .map_async(MapMode::Read, BufferMapRange::whole())
        .wait(Duration::from_secs(5))
        .expect("map");
    let bytes = mapped.to_vec().expect("read");
    assert_eq!(bytes.len(), SIZE);
    assert_eq!(crc32(&bytes), crc32(&pattern));
}

#[test]
fn upload_then_download_round_trips() {
    let device = device_or_skip!("upload_then_download_round_trips");
    let factory = device.resource_factory();
    let values: Vec<u32> = (0..64).collect();
    let bytes: &[u8] = bytemuck::cast_slice(&values);

    let staging = ImmediateStagingBuffer::create(factory.as_ref(), bytes.len() as u64, Some("upload"))
        .expect("staging buffer");
    assert_eq!(staging.write(&values, 0).expect("write"), bytes.len() as u64);
    staging.finalize();

    let gpu = DeviceBuffer::create(
        factory.as_ref(),
        &BufferDesc::new(bytes.len() as u64, BufferUsage::STORAGE).with_label("gpu"),
    )
    .expect("device buffer");
    let readback = DeferredStagingBuffer::create(factory.as_ref(), bytes.len() as u64, Some("readback"))
        .expect("readback buffer");

    let mut encoder = device.create_command_encoder(Some("round trip")).expect("encoder");
    encoder
        .upload_to_device_buffer(&staging, &gpu, &BufferCopyDesc::whole())
        .expect("upload");
    readback
        .download_from(encoder.as_mut(), &gpu, &BufferCopyDesc::whole())
        .expect("download");
    device.queue().submit(encoder.finish().expect("finish")).expect("submit");

    let mapped = readback
        .map_async(MapMode::Read, BufferMapRange::whole())
        .wait(Duration::from_secs(5))
        .expect("map");
    assert_eq!(mapped.to_vec().expect("read"), bytes);
    drop(mapped);
    let read: Vec<u32> = readback.read(0, values.len()).expect("typed read");
    assert_eq!(read, values);
    readback.unmap();
}

#[test]
fn queue_write_is_visible_after_download() {
    let device = device_or_skip!("queue_write_is_visible_after_download");
    let factory = device.resource_factory();
    let gpu = DeviceBuffer::create(factory.as_ref(), &BufferDesc::new(16, BufferUsage::UNIFORM))
        .expect("device buffer");
    let readback = DeferredStagingBuffer::create(factory.as_ref(), 16, None).expect("readback");

    device
        .queue()
        .write_buffer(&pers_core::graphics::api::BufferWriteDesc {
            buffer: gpu.buffer().as_ref(),
            offset: 4,
            data: &[7, 7, 7, 7],
        })
        .expect("write");
    let mut encoder = device.create_command_encoder(None).expect("encoder");
    readback
        .download_from(encoder.as_mut(), &gpu, &BufferCopyDesc::whole())
        .expect("download");
    device.queue().submit(encoder.finish().expect("finish")).expect("submit");

    let mapped = readback
        .map_async(MapMode::Read, BufferMapRange::whole())
        .wait(Duration::from_secs(5))
        .expect("map");
    let bytes = mapped.to_vec().expect("read");
    assert_eq!(&bytes[4..8], &[7, 7, 7, 7]);
    assert_eq!(&bytes[..4], &[0, 0, 0, 0]);
}

#[test]
fn write_maps_on_readback_buffers_fail() {
    let device = device_or_skip!("write_maps_on_readback_buffers_fail");
    let readback = DeferredStagingBuffer::create(device.resource_factory().as_ref(), 64, None)
        .expect("readback");
    let result = readback
        .map_async(MapMode::Write, BufferMapRange::whole())
        .wait(Duration::from_secs(1));
    assert!(matches!(result, Err(GraphicsError::InvalidArgument(_))));
}

#[test]
fn broken_shader_reports_compilation_error() {
    let device = device_or_skip!("broken_shader_reports_compilation_error");
    let result = device.resource_factory().create_shader_module(&ShaderModuleDesc::wgsl(
        "broken",
        "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return nope; }",
        ShaderStage::Vertex,
        "vs_main",
    ));
    match result {
        Err(GraphicsError::ShaderCompilation { label, details }) => {
            assert_eq!(label, "broken");
            assert!(!details.is_empty());
        }
        Err(other) => panic!("expected a compilation error, got {other}"),
        Ok(_) => panic!("broken shader compiled"),
    }
}

#[test]
fn triangle_renders_into_offscreen_target() {
    let device = device_or_skip!("triangle_renders_into_offscreen_target");
    let factory = device.resource_factory();
    let vertex = factory
        .create_shader_module(&ShaderModuleDesc::wgsl("triangle vs", TRIANGLE, ShaderStage::Vertex, "vs_main"))
        .expect("vertex shader");
    let fragment = factory
        .create_shader_module(&ShaderModuleDesc::wgsl("triangle fs", TRIANGLE, ShaderStage::Fragment, "fs_main"))
        .expect("fragment shader");
    let pipeline = factory
        .create_render_pipeline(&RenderPipelineDesc {
            label: Some("triangle".into()),
            fragment_shader: Some(fragment),
            color_targets: vec![TextureFormat::Rgba8Unorm.into()],
            ..RenderPipelineDesc::new(vertex)
        })
        .expect("pipeline");

    let target = OffscreenFramebuffer::new(
        &device,
        OffscreenFramebufferConfig {
            width: 64,
            height: 64,
            color_formats: vec![TextureFormat::Rgba8Unorm],
            ..OffscreenFramebufferConfig::default()
        },
    )
    .expect("offscreen target");
    assert_eq!(target.color_formats(), vec![TextureFormat::Rgba8Unorm]);

    let pass_desc = RenderPassConfig {
        color: vec![ColorAttachmentConfig::clear(Color::rgba(0.0, 0.0, 1.0, 1.0))],
        ..RenderPassConfig::default()
    }
    .with_label("offscreen")
    .project(&target);

    let mut encoder = device.create_command_encoder(Some("triangle")).expect("encoder");
    {
        let mut pass = encoder.begin_render_pass(&pass_desc).expect("pass");
        pass.set_pipeline(&pipeline);
        pass.draw(3, 1, 0, 0);
        pass.end();
    }
    device.queue().submit(encoder.finish().expect("finish")).expect("submit");
    assert!(device.wait_idle());
}

#[test]
fn depth_tested_triangle_renders_into_depth_stencil_target() {
    let device = device_or_skip!("depth_tested_triangle_renders_into_depth_stencil_target");
    let factory = device.resource_factory();
    let vertex = factory
        .create_shader_module(&ShaderModuleDesc::wgsl("depth vs", TRIANGLE, ShaderStage::Vertex, "vs_main"))
        .expect("vertex shader");
    let fragment = factory
        .create_shader_module(&ShaderModuleDesc::wgsl("depth fs", TRIANGLE, ShaderStage::Fragment, "fs_main"))
        .expect("fragment shader");
    let pipeline = factory
        .create_render_pipeline(&RenderPipelineDesc {
            label: Some("depth triangle".into()),
            fragment_shader: Some(fragment),
            color_targets: vec![TextureFormat::Bgra8Unorm.into()],
            depth_stencil: Some(DepthStencilState::depth_less(TextureFormat::Depth24PlusStencil8)),
            ..RenderPipelineDesc::new(vertex)
        })
        .expect("pipeline");

    let target = OffscreenFramebuffer::new(
        &device,
        OffscreenFramebufferConfig {
            width: 800,
            height: 600,
            color_formats: vec![TextureFormat::Bgra8Unorm],
            depth_format: Some(TextureFormat::Depth24PlusStencil8),
            ..OffscreenFramebufferConfig::default()
        },
    )
    .expect("offscreen target");
    assert!(target.has_depth_stencil_attachment());
    assert_eq!(target.depth_format(), Some(TextureFormat::Depth24PlusStencil8));

    let pass_desc = RenderPassConfig {
        color: vec![ColorAttachmentConfig::clear(Color::rgba(0.1, 0.2, 0.3, 1.0))],
        ..RenderPassConfig::default()
    }
    .with_depth()
    .project(&target);
    assert!(pass_desc.depth_stencil_attachment.is_some());

    let mut encoder = device.create_command_encoder(Some("depth triangle")).expect("encoder");
    {
        let mut pass = encoder.begin_render_pass(&pass_desc).expect("pass");
        pass.set_pipeline(&pipeline);
        pass.draw(3, 1, 0, 0);
        pass.end();
    }
    device.queue().submit(encoder.finish().expect("finish")).expect("submit");
    assert!(device.wait_idle());
    assert!(!device.is_lost());
}

#[test]
fn mismatched_pipeline_is_rejected_without_failing_the_pass() {
    let device = device_or_skip!("mismatched_pipeline_is_rejected_without_failing_the_pass");
    let factory = device.resource_factory();
    let vertex = factory
        .create_shader_module(&ShaderModuleDesc::wgsl("vs", TRIANGLE, ShaderStage::Vertex, "vs_main"))
        .expect("vertex shader");
    let fragment = factory
        .create_shader_module(&ShaderModuleDesc::wgsl("fs", TRIANGLE, ShaderStage::Fragment, "fs_main"))
        .expect("fragment shader");
    let pipeline = factory
        .create_render_pipeline(&RenderPipelineDesc {
            fragment_shader: Some(fragment),
            color_targets: vec![TextureFormat::Bgra8Unorm.into()],
            ..RenderPipelineDesc::new(vertex)
        })
        .expect("pipeline");
    let target = OffscreenFramebuffer::new(
        &device,
        OffscreenFramebufferConfig {
            width: 16,
            height: 16,
            color_formats: vec![TextureFormat::Rgba8Unorm],
            ..OffscreenFramebufferConfig::default()
        },
    )
    .expect("offscreen target");

    let mut encoder = device.create_command_encoder(None).expect("encoder");
    {
        let mut pass = encoder
            .begin_render_pass(&RenderPassConfig::with_colors(1).project(&target))
            .expect("pass");
        pass.set_pipeline(&pipeline);
        pass.draw(3, 1, 0, 0);
        pass.end();
    }
    device.queue().submit(encoder.finish().expect("finish")).expect("submit");
    assert!(device.wait_idle());
    assert!(!device.is_lost());
}

#[test]
fn empty_command_buffer_submits_and_drains() {
    let device = device_or_skip!("empty_command_buffer_submits_and_drains");
    let encoder = device.create_command_encoder(Some("empty")).expect("encoder");
    let command_buffer = encoder.finish().expect("finish");
    assert_eq!(command_buffer.label(), Some("empty"));
    device.queue().submit(command_buffer).expect("submit");
    device.queue().submit_batch(Vec::new()).expect("empty batch");
    assert!(device.wait_idle());
}
