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

//! Mirror of the bind state of an immediate-mode backend.

use crate::renderer::api::TextureId;
use crate::renderer::error::ResourceError;

/// Remembers what is currently bound so redundant backend calls can be
/// skipped.
///
/// The backend sizes the cache during initialization, once it knows how many
/// texture units and vertex attributes it has.
#[derive(Debug, Clone, Default)]
pub struct GpuStateCache {
    texture_units: Vec<Option<TextureId>>,
    enabled_attributes: Vec<bool>,
}

impl GpuStateCache {
    /// An empty cache with no units.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sizes the cache and clears every entry.
    pub fn initialize(&mut self, texture_units: usize, vertex_attributes: usize) {
        self.texture_units = vec![None; texture_units];
        self.enabled_attributes = vec![false; vertex_attributes];
    }

    /// Number of texture units tracked.
    pub fn texture_unit_count(&self) -> usize {
        self.texture_units.len()
    }

    /// Number of vertex attributes tracked.
    pub fn vertex_attribute_count(&self) -> usize {
        self.enabled_attributes.len()
    }

    /// Texture bound to `unit`, if any.
    pub fn bound_texture(&self, unit: u32) -> Option<TextureId> {
        self.texture_units.get(unit as usize).copied().flatten()
    }

    /// Records a texture binding.
    ///
    /// Returns `true` if the binding changed and the backend must be told.
    pub fn bind_texture(
        &mut self,
        unit: u32,
        texture: Option<TextureId>,
    ) -> Result<bool, ResourceError> {
        let count = self.texture_units.len();
        let slot = self.texture_units.get_mut(unit as usize).ok_or_else(|| {
            ResourceError::Unsupported(format!("texture unit {unit} (device has {count})"))
        })?;
        if *slot == texture {
            return Ok(false);
        }
        *slot = texture;
        Ok(true)
    }

    /// Records the enabled state of a vertex attribute.
    ///
    /// Returns `true` if the state changed.
    pub fn set_attribute_enabled(
        &mut self,
        location: u32,
        enabled: bool,
    ) -> Result<bool, ResourceError> {
        let count = self.enabled_attributes.len();
        let slot = self
            .enabled_attributes
            .get_mut(location as usize)
            .ok_or_else(|| {
                ResourceError::Unsupported(format!(
                    "vertex attribute {location} (device has {count})"
                ))
            })?;
        if *slot == enabled {
            return Ok(false);
        }
        *slot = enabled;
        Ok(true)
    }

    /// `true` if the attribute at `location` is enabled.
    pub fn is_attribute_enabled(&self, location: u32) -> bool {
        self.enabled_attributes
            .get(location as usize)
            .copied()
            .unwrap_or(false)
    }

    /// Forgets every unit `texture` is bound to. Returns the affected units.
    pub fn unbind_texture(&mut self, texture: TextureId) -> Vec<u32> {
        let mut units = Vec::new();
        for (unit, slot) in self.texture_units.iter_mut().enumerate() {
            if *slot == Some(texture) {
                *slot = None;
                units.push(unit as u32);
            }
        }
        units
    }

    /// Drops all tracked state, including the unit counts.
    pub fn reset(&mut self) {
        self.texture_units.clear();
        self.enabled_attributes.clear();
    }
}
