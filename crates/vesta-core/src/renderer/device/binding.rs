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

use super::{Device, LOG_TARGET};
use crate::renderer::api::*;
use crate::renderer::error::ResourceError;

impl Device {
    /// Places a buffer in a descriptor slot.
    pub fn bind_buffer(
        &mut self,
        set: DescriptorSetId,
        binding: u32,
        buffer: BufferId,
    ) -> Result<(), ResourceError> {
        self.bind_resource(set, binding, BoundResource::Buffer(buffer))
    }

    /// Places a texture in a descriptor slot.
    pub fn bind_texture(
        &mut self,
        set: DescriptorSetId,
        binding: u32,
        texture: TextureId,
    ) -> Result<(), ResourceError> {
        self.bind_resource(set, binding, BoundResource::Texture(texture))
    }

    /// Places a sampler in a descriptor slot.
    pub fn bind_sampler(
        &mut self,
        set: DescriptorSetId,
        binding: u32,
        sampler: SamplerId,
    ) -> Result<(), ResourceError> {
        self.bind_resource(set, binding, BoundResource::Sampler(sampler))
    }

    fn bind_resource(
        &mut self,
        set: DescriptorSetId,
        binding: u32,
        resource: BoundResource,
    ) -> Result<(), ResourceError> {
        self.ensure_ready()?;
        let object = GpuObject::from(resource);
        if !self.objects.contains_key(&object) {
            return Err(ResourceError::NotFound(object));
        }
        self.hub.engage(resource, set, binding)?;
        self.context.write_descriptor(set, binding, Some(resource));
        Ok(())
    }

    /// Checks that every slot of `set` holds a live resource.
    ///
    /// A slot emptied because its resource was destroyed reports
    /// [`ResourceError::BindingUndefined`].
    pub fn validate_descriptor_set(&self, set: DescriptorSetId) -> Result<(), ResourceError> {
        self.ensure_ready()?;
        self.hub.validate(set)
    }

    /// Binds a texture to a texture unit, skipping the backend call when the
    /// unit already holds it.
    pub fn set_texture_unit(
        &mut self,
        unit: u32,
        texture: Option<TextureId>,
    ) -> Result<(), ResourceError> {
        self.ensure_ready()?;
        if let Some(id) = texture {
            if !self.objects.contains_key(&GpuObject::Texture(id)) {
                return Err(ResourceError::NotFound(GpuObject::Texture(id)));
            }
        }
        if self.state_cache.bind_texture(unit, texture)? {
            self.context.bind_texture_unit(unit, texture);
        } else {
            log::trace!(target: LOG_TARGET, "Texture unit {unit} already holds {texture:?}");
        }
        Ok(())
    }

    /// Enables or disables a vertex attribute, skipping redundant calls.
    pub fn set_vertex_attribute(&mut self, location: u32, enabled: bool) -> Result<(), ResourceError> {
        self.ensure_ready()?;
        if self.state_cache.set_attribute_enabled(location, enabled)? {
            self.context.set_vertex_attribute(location, enabled);
        }
        Ok(())
    }
}
