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

//! Defines the resource factory trait.

use super::resource::{
    BindGroup, BindGroupLayout, Buffer, MappableBuffer, RenderPipeline, Sampler, ShaderModule,
    Texture, TextureView,
};
use crate::graphics::api::{
    BindGroupDesc, BindGroupLayoutDesc, BufferDesc, RenderPipelineDesc, SamplerDesc,
    ShaderModuleDesc, TextureDesc, TextureViewDesc,
};
use crate::graphics::error::GraphicsResult;
use std::sync::Arc;

/// Creates GPU resources on behalf of a logical device.
///
/// Every method validates its descriptor, logs an error on failure and
/// returns it as a value.
pub trait ResourceFactory: Send + Sync + 'static {
    /// Creates a buffer.
    ///
    /// ## Errors
    /// * `InvalidArgument` for a zero size or `MAP_READ | MAP_WRITE`.
    fn create_buffer(&self, desc: &BufferDesc) -> GraphicsResult<Arc<dyn Buffer>>;

    /// Creates a buffer holding `data`.
    ///
    /// The buffer is created mapped with `COPY_SRC` added, filled, and
    /// unmapped before it is returned.
    fn create_initializable_device_buffer(
        &self,
        desc: &BufferDesc,
        data: &[u8],
    ) -> GraphicsResult<Arc<dyn Buffer>>;

    /// Creates a buffer that can be mapped after creation.
    fn create_mappable_buffer(&self, desc: &BufferDesc) -> GraphicsResult<Arc<dyn MappableBuffer>>;

    /// Creates a texture.
    fn create_texture(&self, desc: &TextureDesc) -> GraphicsResult<Arc<dyn Texture>>;

    /// Creates a view of `texture`.
    fn create_texture_view(
        &self,
        texture: &Arc<dyn Texture>,
        desc: &TextureViewDesc,
    ) -> GraphicsResult<Arc<dyn TextureView>>;

    /// Creates a sampler.
    fn create_sampler(&self, desc: &SamplerDesc) -> GraphicsResult<Arc<dyn Sampler>>;

    /// Compiles a shader module.
    ///
    /// ## Errors
    /// * `ShaderCompilation` if the compiler reports any error.
    fn create_shader_module(&self, desc: &ShaderModuleDesc) -> GraphicsResult<Arc<dyn ShaderModule>>;

    /// Builds a render pipeline.
    fn create_render_pipeline(
        &self,
        desc: &RenderPipelineDesc,
    ) -> GraphicsResult<Arc<dyn RenderPipeline>>;

    /// Creates a bind group layout.
    fn create_bind_group_layout(
        &self,
        desc: &BindGroupLayoutDesc,
    ) -> GraphicsResult<Arc<dyn BindGroupLayout>>;

    /// Creates a bind group.
    fn create_bind_group(&self, desc: &BindGroupDesc) -> GraphicsResult<Arc<dyn BindGroup>>;
}
