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

//! Resource factory: one creation and one destruction entry point per kind.
//!
//! Creation is all-or-nothing. Descriptors are validated first, then the
//! backend allocates, and only then is the object registered and accounted.
//! Destruction disengages the object from every descriptor set and hands it
//! to the recycle path.

use std::collections::HashSet;

use super::{CommandBufferRecord, Device, ObjectRecord, QueueRecord, LOG_TARGET};
use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use crate::renderer::recycle_bin::{RecycleBin, RetiredObject};

impl Device {
    fn allocate_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn register(&mut self, object: GpuObject, size: u64) {
        self.objects.insert(
            object,
            ObjectRecord {
                size,
                created_after: self.timeline.last_submitted(),
            },
        );
        match object {
            GpuObject::Buffer(_) => self.memory.buffer_size += size,
            GpuObject::Texture(_) => self.memory.texture_size += size,
            _ => {}
        }
    }

    fn require_format(&self, format: Format, needed: FormatFeature) -> Result<(), ResourceError> {
        if self.caps.format_features(format).contains(needed) {
            Ok(())
        } else {
            Err(ResourceError::Unsupported(format!(
                "{} lacks {:?}",
                format.name(),
                needed
            )))
        }
    }

    /// Creates a buffer.
    pub fn create_buffer(&mut self, info: &BufferInfo<'_>) -> Result<BufferId, ResourceError> {
        self.ensure_ready()?;
        if info.size == 0 {
            return Err(ResourceError::InvalidDescriptor(
                "buffer size must be non-zero".to_string(),
            ));
        }
        let id = BufferId(self.allocate_id());
        self.context.create_buffer(id, info)?;
        self.register(GpuObject::Buffer(id), info.size);
        log::debug!(
            target: LOG_TARGET,
            "Created buffer {:?} ({:?}, {} bytes)",
            id,
            info.label.as_deref().unwrap_or_default(),
            info.size
        );
        Ok(id)
    }

    /// Creates a texture. The format must support the requested usages.
    pub fn create_texture(&mut self, info: &TextureInfo<'_>) -> Result<TextureId, ResourceError> {
        self.ensure_ready()?;
        if info.width == 0 || info.height == 0 || info.mip_levels == 0 {
            return Err(ResourceError::InvalidDescriptor(format!(
                "texture extent {}x{} with {} mips",
                info.width, info.height, info.mip_levels
            )));
        }
        match info.ty {
            TextureType::Tex3D if info.depth == 0 => {
                return Err(ResourceError::InvalidDescriptor(
                    "3D texture with zero depth".to_string(),
                ));
            }
            TextureType::Cube if info.layer_count == 0 || info.layer_count % 6 != 0 => {
                return Err(ResourceError::InvalidDescriptor(format!(
                    "cube texture with {} layers, expected a multiple of six",
                    info.layer_count
                )));
            }
            _ => {}
        }
        let max = match info.ty {
            TextureType::Cube => self.caps.limits().max_cube_map_texture_size,
            _ => self.caps.limits().max_texture_size,
        };
        if max > 0 && (info.width > max || info.height > max) {
            return Err(ResourceError::Unsupported(format!(
                "texture extent {}x{} exceeds {max}",
                info.width, info.height
            )));
        }
        if info.usage.contains(TextureUsage::SAMPLED) {
            self.require_format(info.format, FormatFeature::SAMPLED_TEXTURE)?;
        }
        if info
            .usage
            .intersects(TextureUsage::COLOR_ATTACHMENT | TextureUsage::DEPTH_STENCIL_ATTACHMENT)
        {
            self.require_format(info.format, FormatFeature::RENDER_TARGET)?;
        }

        let id = TextureId(self.allocate_id());
        self.context.create_texture(id, info)?;
        let size = info.byte_size();
        self.register(GpuObject::Texture(id), size);
        log::debug!(
            target: LOG_TARGET,
            "Created texture {:?} ({:?}, {} {}x{}, {} bytes)",
            id,
            info.label.as_deref().unwrap_or_default(),
            info.format.name(),
            info.width,
            info.height,
            size
        );
        Ok(id)
    }

    /// Creates a sampler.
    pub fn create_sampler(&mut self, info: &SamplerInfo) -> Result<SamplerId, ResourceError> {
        self.ensure_ready()?;
        let id = SamplerId(self.allocate_id());
        self.context.create_sampler(id, info)?;
        self.register(GpuObject::Sampler(id), 0);
        Ok(id)
    }

    /// Creates a shader program from one source per stage.
    pub fn create_shader(&mut self, info: &ShaderInfo<'_>) -> Result<ShaderId, ResourceError> {
        self.ensure_ready()?;
        if info.stages.is_empty() {
            return Err(ResourceError::InvalidDescriptor(format!(
                "shader '{}' has no stages",
                info.name
            )));
        }
        let id = ShaderId(self.allocate_id());
        self.context.create_shader(id, info)?;
        self.register(GpuObject::Shader(id), 0);
        log::debug!(target: LOG_TARGET, "Created shader {:?} ('{}')", id, info.name);
        Ok(id)
    }

    /// Creates a pipeline state object for a live shader.
    pub fn create_pipeline(&mut self, info: &PipelineInfo<'_>) -> Result<PipelineId, ResourceError> {
        self.ensure_ready()?;
        if !self.objects.contains_key(&GpuObject::Shader(info.shader)) {
            return Err(ResourceError::NotFound(GpuObject::Shader(info.shader)));
        }
        let max_targets = self.caps.limits().max_color_render_targets as usize;
        if info.color_formats.len() > max_targets {
            return Err(ResourceError::Unsupported(format!(
                "{} color targets, device supports {max_targets}",
                info.color_formats.len()
            )));
        }
        for &format in &info.color_formats {
            self.require_format(format, FormatFeature::RENDER_TARGET)?;
        }
        if let Some(depth) = info.depth_format {
            if !depth.is_depth() {
                return Err(ResourceError::InvalidDescriptor(format!(
                    "{} is not a depth format",
                    depth.name()
                )));
            }
        }

        let id = PipelineId(self.allocate_id());
        self.context.create_pipeline(id, info)?;
        self.register(GpuObject::Pipeline(id), 0);
        Ok(id)
    }

    /// Creates a descriptor set. Every slot starts empty.
    pub fn create_descriptor_set(
        &mut self,
        info: &DescriptorSetInfo<'_>,
    ) -> Result<DescriptorSetId, ResourceError> {
        self.ensure_ready()?;
        let mut seen = HashSet::with_capacity(info.bindings.len());
        for binding in &info.bindings {
            if !seen.insert(binding.binding) {
                return Err(ResourceError::InvalidDescriptor(format!(
                    "binding {} declared twice",
                    binding.binding
                )));
            }
        }

        let id = DescriptorSetId(self.allocate_id());
        self.context.create_descriptor_set(id, info)?;
        self.register(GpuObject::DescriptorSet(id), 0);
        self.hub.register_set(id, &info.bindings);
        Ok(id)
    }

    /// Creates a queue.
    pub fn create_queue(&mut self, info: &QueueInfo) -> Result<QueueId, ResourceError> {
        self.ensure_ready()?;
        let id = QueueId(self.allocate_id());
        self.context.create_queue(id, info)?;
        self.register(GpuObject::Queue(id), 0);
        self.queues.insert(
            id,
            QueueRecord {
                ty: info.ty,
                counters: DrawCounters::default(),
            },
        );
        Ok(id)
    }

    /// Creates a command buffer for a live queue.
    ///
    /// The result is primary when the caller records through an agent or
    /// asks for a primary buffer, secondary otherwise.
    pub fn create_command_buffer(
        &mut self,
        info: &CommandBufferInfo,
    ) -> Result<CommandBufferId, ResourceError> {
        self.ensure_ready()?;
        if !self.queues.contains_key(&info.queue) {
            return Err(ResourceError::NotFound(GpuObject::Queue(info.queue)));
        }
        let ty = info.resolved_type();
        let id = CommandBufferId(self.allocate_id());
        self.context.create_command_buffer(id, ty, info)?;
        self.register(GpuObject::CommandBuffer(id), 0);
        self.command_buffers.insert(
            id,
            CommandBufferRecord {
                ty,
                queue: info.queue,
                counters: DrawCounters::default(),
            },
        );
        log::trace!(target: LOG_TARGET, "Created {ty:?} command buffer {id:?}");
        Ok(id)
    }

    /// Creates a query pool.
    pub fn create_query_pool(&mut self, info: &QueryPoolInfo) -> Result<QueryPoolId, ResourceError> {
        self.ensure_ready()?;
        if info.max_query_objects == 0 {
            return Err(ResourceError::InvalidDescriptor(
                "query pool capacity must be non-zero".to_string(),
            ));
        }
        let id = QueryPoolId(self.allocate_id());
        self.context.create_query_pool(id, info)?;
        self.register(GpuObject::QueryPool(id), 0);
        Ok(id)
    }

    /// Creates a swapchain. Its format must be renderable.
    pub fn create_swapchain(
        &mut self,
        info: &SwapchainInfo<'_>,
    ) -> Result<SwapchainId, ResourceError> {
        self.ensure_ready()?;
        if info.width == 0 || info.height == 0 {
            return Err(ResourceError::InvalidDescriptor(format!(
                "swapchain extent {}x{}",
                info.width, info.height
            )));
        }
        self.require_format(info.format, FormatFeature::RENDER_TARGET)?;
        let id = SwapchainId(self.allocate_id());
        self.context.create_swapchain(id, info)?;
        self.register(GpuObject::Swapchain(id), 0);
        Ok(id)
    }

    /// Destroys a buffer. Descriptor slots referencing it become empty.
    pub fn destroy_buffer(&mut self, id: BufferId) -> Result<(), ResourceError> {
        self.retire(GpuObject::Buffer(id))
    }

    /// Destroys a texture. Descriptor slots referencing it become empty.
    pub fn destroy_texture(&mut self, id: TextureId) -> Result<(), ResourceError> {
        self.retire(GpuObject::Texture(id))
    }

    /// Destroys a sampler. Descriptor slots referencing it become empty.
    pub fn destroy_sampler(&mut self, id: SamplerId) -> Result<(), ResourceError> {
        self.retire(GpuObject::Sampler(id))
    }

    /// Destroys a shader program.
    pub fn destroy_shader(&mut self, id: ShaderId) -> Result<(), ResourceError> {
        self.retire(GpuObject::Shader(id))
    }

    /// Destroys a pipeline state object.
    pub fn destroy_pipeline(&mut self, id: PipelineId) -> Result<(), ResourceError> {
        self.retire(GpuObject::Pipeline(id))
    }

    /// Destroys a descriptor set.
    pub fn destroy_descriptor_set(&mut self, id: DescriptorSetId) -> Result<(), ResourceError> {
        self.retire(GpuObject::DescriptorSet(id))
    }

    /// Destroys a queue. The default queue is owned by the device.
    pub fn destroy_queue(&mut self, id: QueueId) -> Result<(), ResourceError> {
        if self.default_queue == Some(id) {
            return Err(ResourceError::InvalidHandle);
        }
        self.retire(GpuObject::Queue(id))
    }

    /// Destroys a command buffer. The default one is owned by the device.
    pub fn destroy_command_buffer(&mut self, id: CommandBufferId) -> Result<(), ResourceError> {
        if self.default_command_buffer == Some(id) {
            return Err(ResourceError::InvalidHandle);
        }
        self.retire(GpuObject::CommandBuffer(id))
    }

    /// Destroys a query pool. The default one is owned by the device.
    pub fn destroy_query_pool(&mut self, id: QueryPoolId) -> Result<(), ResourceError> {
        if self.default_query_pool == Some(id) {
            return Err(ResourceError::InvalidHandle);
        }
        self.retire(GpuObject::QueryPool(id))
    }

    /// Destroys a swapchain and removes it from the active set.
    pub fn destroy_swapchain(&mut self, id: SwapchainId) -> Result<(), ResourceError> {
        self.retire(GpuObject::Swapchain(id))?;
        self.swapchains.retain(|s| *s != id);
        Ok(())
    }

    /// Unregisters `object`, disengages it and routes it to the recycle path.
    ///
    /// The object is freed synchronously when nothing in flight can reference
    /// it: on immediate backends, when it was created after the last
    /// submission, or when every submission already completed.
    fn retire(&mut self, object: GpuObject) -> Result<(), ResourceError> {
        self.ensure_ready()?;
        let record = self
            .objects
            .remove(&object)
            .ok_or(ResourceError::NotFound(object))?;

        if let Some(resource) = object.as_bound() {
            for (set, binding) in self.hub.disengage(resource) {
                log::debug!(
                    target: LOG_TARGET,
                    "{resource:?} removed from binding {binding} of {set:?}"
                );
                self.context.write_descriptor(set, binding, None);
            }
        }
        match object {
            GpuObject::DescriptorSet(set) => {
                self.hub.remove_set(set);
            }
            GpuObject::Queue(queue) => {
                self.queues.remove(&queue);
            }
            GpuObject::CommandBuffer(cmd) => {
                self.command_buffers.remove(&cmd);
            }
            _ => {}
        }

        let retired = RetiredObject {
            object,
            size: record.size,
        };
        let last_submitted = self.timeline.last_submitted();
        let synchronous = self.context.execution_model() == ExecutionModel::Immediate
            || record.created_after == last_submitted
            || self.timeline.completed() >= last_submitted;

        if synchronous {
            let Self {
                hub,
                context,
                memory,
                state_cache,
                ..
            } = self;
            RecycleBin::release_now(retired, hub, |object| {
                Self::free(context.as_mut(), memory, state_cache, object)
            });
        } else {
            self.bin.collect(retired, last_submitted);
        }
        Ok(())
    }
}
