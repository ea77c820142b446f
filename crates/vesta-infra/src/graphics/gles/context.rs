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

use std::collections::HashMap;

use vesta_core::renderer::*;

use super::constants::GlesConstantRegistry;
use super::driver::{gl, GlDriver, GlObjectKind};
use super::probes::{apply_baseline, compressed_format_names, GLES2_PROBES};

const LOG_TARGET: &str = "vesta::gles";

/// The immediate-mode backend over a [`GlDriver`].
///
/// Every GL call completes before it returns, so submissions are done as soon
/// as they are issued and destroyed objects are deleted right away.
pub struct GlesContext {
    driver: Box<dyn GlDriver>,
    registry: GlesConstantRegistry,
    names: HashMap<GpuObject, (GlObjectKind, u32)>,
    submitted: Epoch,
}

impl GlesContext {
    /// Wraps a driver whose context has not been made current yet.
    pub fn new(driver: impl GlDriver + 'static) -> Self {
        Self {
            driver: Box::new(driver),
            registry: GlesConstantRegistry::default(),
            names: HashMap::new(),
            submitted: Epoch::ZERO,
        }
    }

    /// Code-path switches read during initialization.
    pub fn registry(&self) -> &GlesConstantRegistry {
        &self.registry
    }

    fn integer(&self, name: u32) -> u32 {
        self.driver.get_integer(name).max(0) as u32
    }

    fn string(&self, name: u32) -> String {
        self.driver.get_string(name).unwrap_or_default()
    }

    fn query_limits(&self, multiple_render_targets: bool) -> Limits {
        Limits {
            max_vertex_attributes: self.integer(gl::MAX_VERTEX_ATTRIBS),
            max_vertex_uniform_vectors: self.integer(gl::MAX_VERTEX_UNIFORM_VECTORS),
            max_fragment_uniform_vectors: self.integer(gl::MAX_FRAGMENT_UNIFORM_VECTORS),
            max_texture_units: self.integer(gl::MAX_TEXTURE_IMAGE_UNITS),
            max_vertex_texture_units: self.integer(gl::MAX_VERTEX_TEXTURE_IMAGE_UNITS),
            max_texture_size: self.integer(gl::MAX_TEXTURE_SIZE),
            max_cube_map_texture_size: self.integer(gl::MAX_CUBE_MAP_TEXTURE_SIZE),
            max_color_render_targets: if multiple_render_targets {
                self.integer(gl::MAX_DRAW_BUFFERS).max(1)
            } else {
                1
            },
        }
    }

    fn generate(&mut self, object: GpuObject, kind: GlObjectKind) -> Result<(), ResourceError> {
        let name = self.driver.gen_object(kind).ok_or_else(|| {
            ResourceError::BackendError(format!("The driver returned no {kind:?} name"))
        })?;
        self.names.insert(object, (kind, name));
        log::trace!(target: LOG_TARGET, "{object:?} -> GL {kind:?} {name}");
        Ok(())
    }

    fn texture_name(&self, texture: Option<TextureId>) -> u32 {
        texture
            .and_then(|id| self.names.get(&GpuObject::Texture(id)))
            .map_or(0, |(_, name)| *name)
    }
}

impl NativeContext for GlesContext {
    fn backend_type(&self) -> GraphicsBackendType {
        GraphicsBackendType::Gles2
    }

    fn execution_model(&self) -> ExecutionModel {
        ExecutionModel::Immediate
    }

    fn initialize(
        &mut self,
        state_cache: &mut GpuStateCache,
        caps: &mut CapabilityTable,
    ) -> Result<DeviceInfo, RenderError> {
        if !self.driver.make_current(true) {
            return Err(RenderError::InitializationFailed(
                "The GL context could not be made current".to_string(),
            ));
        }

        let extensions = match self.driver.get_string(gl::EXTENSIONS) {
            Some(list) => ExtensionSet::parse(&list),
            None => {
                log::warn!(target: LOG_TARGET, "The driver reported no extension string.");
                ExtensionSet::default()
            }
        };

        apply_baseline(caps);
        caps.run_probes(&extensions, GLES2_PROBES);
        self.registry = GlesConstantRegistry::detect(&extensions);

        let limits = self.query_limits(caps.has_feature(Feature::MultipleRenderTargets));
        caps.set_limits(limits);
        state_cache.initialize(
            limits.max_texture_units as usize,
            limits.max_vertex_attributes as usize,
        );

        let info = DeviceInfo {
            device_name: "GLES2".to_string(),
            backend_type: GraphicsBackendType::Gles2,
            renderer: self.string(gl::RENDERER),
            vendor: self.string(gl::VENDOR),
            version: self.string(gl::VERSION),
        };

        log::info!(target: LOG_TARGET, "GLES2 device initialized.");
        log::info!(target: LOG_TARGET, "RENDERER: {}", info.renderer);
        log::info!(target: LOG_TARGET, "VENDOR: {}", info.vendor);
        log::info!(target: LOG_TARGET, "VERSION: {}", info.version);
        log::info!(target: LOG_TARGET, "COMPRESSED_FORMATS: {}", compressed_format_names(caps));
        log::info!(target: LOG_TARGET, "USE_VAO: {}", self.registry.use_vao);
        log::info!(target: LOG_TARGET, "FRAMEBUFFER_FETCH: {}", self.registry.framebuffer_fetch);
        log::debug!(target: LOG_TARGET, "EXTENSIONS: {} advertised", extensions.len());
        Ok(info)
    }

    fn bind_context(&mut self, bound: bool) {
        if !self.driver.make_current(bound) {
            log::error!(target: LOG_TARGET, "Failed to change the current GL context (bound: {bound}).");
        }
    }

    fn present(&mut self, swapchain: SwapchainId) -> Result<(), RenderError> {
        if self.driver.swap_buffers() {
            Ok(())
        } else {
            Err(RenderError::PresentFailed(format!(
                "eglSwapBuffers failed for {swapchain:?}"
            )))
        }
    }

    fn create_buffer(&mut self, id: BufferId, _info: &BufferInfo<'_>) -> Result<(), ResourceError> {
        self.generate(GpuObject::Buffer(id), GlObjectKind::Buffer)
    }

    fn create_texture(
        &mut self,
        id: TextureId,
        _info: &TextureInfo<'_>,
    ) -> Result<(), ResourceError> {
        self.generate(GpuObject::Texture(id), GlObjectKind::Texture)
    }

    fn create_sampler(&mut self, _id: SamplerId, _info: &SamplerInfo) -> Result<(), ResourceError> {
        // GL ES 2 stores sampling state on the texture.
        Ok(())
    }

    fn create_shader(&mut self, id: ShaderId, _info: &ShaderInfo<'_>) -> Result<(), ResourceError> {
        self.generate(GpuObject::Shader(id), GlObjectKind::Program)
    }

    fn create_pipeline(
        &mut self,
        _id: PipelineId,
        _info: &PipelineInfo<'_>,
    ) -> Result<(), ResourceError> {
        Ok(())
    }

    fn create_descriptor_set(
        &mut self,
        _id: DescriptorSetId,
        _info: &DescriptorSetInfo<'_>,
    ) -> Result<(), ResourceError> {
        Ok(())
    }

    fn create_query_pool(
        &mut self,
        id: QueryPoolId,
        _info: &QueryPoolInfo,
    ) -> Result<(), ResourceError> {
        self.generate(GpuObject::QueryPool(id), GlObjectKind::Query)
    }

    fn create_swapchain(
        &mut self,
        _id: SwapchainId,
        _info: &SwapchainInfo<'_>,
    ) -> Result<(), ResourceError> {
        // Presents the default framebuffer of the current context.
        Ok(())
    }

    fn bind_texture_unit(&mut self, unit: u32, texture: Option<TextureId>) {
        let name = self.texture_name(texture);
        self.driver.bind_texture(unit, name);
    }

    fn set_vertex_attribute(&mut self, location: u32, enabled: bool) {
        self.driver.set_vertex_attrib_array(location, enabled);
    }

    fn submit(
        &mut self,
        _queue: QueueId,
        command_buffers: &[CommandBufferId],
        epoch: Epoch,
    ) -> Result<(), RenderError> {
        log::trace!(
            target: LOG_TARGET,
            "Executed {} command buffer(s) as epoch {}",
            command_buffers.len(),
            epoch.0
        );
        self.submitted = epoch;
        Ok(())
    }

    fn poll_completed(&mut self) -> Epoch {
        self.submitted
    }

    fn wait_idle(&mut self) {
        self.driver.finish();
    }

    fn release(&mut self, object: RetiredObject) {
        if let Some((kind, name)) = self.names.remove(&object.object) {
            self.driver.delete_object(kind, name);
        }
    }

    fn shutdown(&mut self) {
        if !self.names.is_empty() {
            log::warn!(
                target: LOG_TARGET,
                "{} GL object(s) still alive at shutdown, deleting them.",
                self.names.len()
            );
            for (_, (kind, name)) in self.names.drain() {
                self.driver.delete_object(kind, name);
            }
        }
        self.driver.make_current(false);
        log::info!(target: LOG_TARGET, "GLES2 device destroyed.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gles::HeadlessGlDriver;

    #[test]
    fn limits_come_from_the_driver() {
        // --- 1. ARRANGE ---
        let driver = HeadlessGlDriver::new()
            .with_extensions("GL_EXT_draw_buffers")
            .with_integer(gl::MAX_DRAW_BUFFERS, 8)
            .with_integer(gl::MAX_TEXTURE_IMAGE_UNITS, 16);
        let mut context = GlesContext::new(driver);
        let mut cache = GpuStateCache::new();
        let mut caps = CapabilityTable::new();

        // --- 2. ACT ---
        let info = context.initialize(&mut cache, &mut caps).unwrap();

        // --- 3. ASSERT ---
        assert_eq!(info.device_name, "GLES2");
        assert_eq!(info.renderer, "Vesta Headless GL");
        assert_eq!(caps.limits().max_color_render_targets, 8);
        assert_eq!(caps.limits().max_texture_units, 16);
        assert_eq!(cache.texture_unit_count(), 16);
        assert_eq!(cache.vertex_attribute_count(), 8);
    }

    #[test]
    fn draw_buffer_count_is_ignored_without_the_extension() {
        let driver = HeadlessGlDriver::new().with_integer(gl::MAX_DRAW_BUFFERS, 8);
        let mut context = GlesContext::new(driver);
        let mut caps = CapabilityTable::new();
        context
            .initialize(&mut GpuStateCache::new(), &mut caps)
            .unwrap();
        assert_eq!(caps.limits().max_color_render_targets, 1);
    }

    #[test]
    fn lost_context_fails_initialization() {
        let mut context = GlesContext::new(HeadlessGlDriver::new().lost());
        let result = context.initialize(&mut GpuStateCache::new(), &mut CapabilityTable::new());
        assert!(matches!(result, Err(RenderError::InitializationFailed(_))));
    }

    #[test]
    fn release_deletes_the_gl_name() {
        let driver = HeadlessGlDriver::new();
        let stats = driver.stats();
        let mut context = GlesContext::new(driver);
        let info = BufferInfo {
            label: None,
            size: 16,
            stride: 0,
            usage: BufferUsage::VERTEX,
        };

        context.create_buffer(BufferId(3), &info).unwrap();
        assert_eq!(stats.snapshot().live_total(), 1);

        context.release(RetiredObject {
            object: GpuObject::Buffer(BufferId(3)),
            size: 16,
        });
        assert_eq!(stats.snapshot().live_total(), 0);
    }
}
