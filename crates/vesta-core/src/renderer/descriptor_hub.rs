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

//! Cross-reference between descriptor sets and the resources they point at.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::renderer::api::{
    BoundResource, DescriptorBinding, DescriptorSetId, DescriptorType, GpuObject,
};
use crate::renderer::error::ResourceError;

#[derive(Debug, Clone)]
struct Slot {
    ty: DescriptorType,
    resource: Option<BoundResource>,
}

/// Tracks, for every live descriptor set, which resource sits in each slot,
/// and for every resource, which slots reference it.
///
/// Both directions are kept in sync: after [`DescriptorHub::disengage`] the
/// resource appears in no slot and has no reverse entry.
#[derive(Debug, Default)]
pub struct DescriptorHub {
    sets: HashMap<DescriptorSetId, BTreeMap<u32, Slot>>,
    users: HashMap<BoundResource, BTreeSet<(DescriptorSetId, u32)>>,
}

impl DescriptorHub {
    /// An empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a set with the given layout. Every slot starts empty.
    ///
    /// Registering an id twice replaces the previous layout.
    pub fn register_set(&mut self, set: DescriptorSetId, bindings: &[DescriptorBinding]) {
        self.remove_set(set);
        let slots = bindings
            .iter()
            .map(|b| {
                (
                    b.binding,
                    Slot {
                        ty: b.ty,
                        resource: None,
                    },
                )
            })
            .collect();
        self.sets.insert(set, slots);
    }

    /// Places `resource` in `binding` of `set`.
    ///
    /// Returns the resource previously in the slot, which is no longer
    /// referenced from there.
    pub fn engage(
        &mut self,
        resource: BoundResource,
        set: DescriptorSetId,
        binding: u32,
    ) -> Result<Option<BoundResource>, ResourceError> {
        let slots = self
            .sets
            .get_mut(&set)
            .ok_or(ResourceError::NotFound(GpuObject::DescriptorSet(set)))?;
        let slot = match slots.get_mut(&binding) {
            Some(slot) if slot.ty.accepts(resource) => slot,
            _ => {
                return Err(ResourceError::BindingMismatch {
                    set,
                    binding,
                    resource,
                })
            }
        };

        let previous = slot.resource.replace(resource);
        if let Some(old) = previous {
            Self::unlink(&mut self.users, old, set, binding);
        }
        self.users.entry(resource).or_default().insert((set, binding));
        Ok(previous)
    }

    /// Removes `resource` from every set referencing it.
    ///
    /// Returns the emptied `(set, binding)` slots, in set then binding order.
    pub fn disengage(&mut self, resource: BoundResource) -> Vec<(DescriptorSetId, u32)> {
        let Some(slots) = self.users.remove(&resource) else {
            return Vec::new();
        };
        for &(set, binding) in &slots {
            if let Some(slot) = self
                .sets
                .get_mut(&set)
                .and_then(|bindings| bindings.get_mut(&binding))
            {
                slot.resource = None;
            }
        }
        slots.into_iter().collect()
    }

    /// Forgets a destroyed set. Returns `false` if it was not tracked.
    pub fn remove_set(&mut self, set: DescriptorSetId) -> bool {
        let Some(slots) = self.sets.remove(&set) else {
            return false;
        };
        for (binding, slot) in slots {
            if let Some(resource) = slot.resource {
                Self::unlink(&mut self.users, resource, set, binding);
            }
        }
        true
    }

    /// Checks that every slot of `set` holds a resource.
    pub fn validate(&self, set: DescriptorSetId) -> Result<(), ResourceError> {
        let slots = self
            .sets
            .get(&set)
            .ok_or(ResourceError::NotFound(GpuObject::DescriptorSet(set)))?;
        match slots.iter().find(|(_, slot)| slot.resource.is_none()) {
            Some((&binding, _)) => Err(ResourceError::BindingUndefined { set, binding }),
            None => Ok(()),
        }
    }

    /// The resource currently in `binding` of `set`.
    pub fn resource_at(&self, set: DescriptorSetId, binding: u32) -> Option<BoundResource> {
        self.sets
            .get(&set)
            .and_then(|slots| slots.get(&binding))
            .and_then(|slot| slot.resource)
    }

    /// `true` if any set references `resource`.
    pub fn is_engaged(&self, resource: BoundResource) -> bool {
        self.users.contains_key(&resource)
    }

    /// The sets referencing `resource`, each listed once.
    pub fn sets_referencing(&self, resource: BoundResource) -> Vec<DescriptorSetId> {
        let mut sets: Vec<_> = self
            .users
            .get(&resource)
            .into_iter()
            .flatten()
            .map(|(set, _)| *set)
            .collect();
        sets.dedup();
        sets
    }

    /// `true` if `set` is tracked.
    pub fn contains_set(&self, set: DescriptorSetId) -> bool {
        self.sets.contains_key(&set)
    }

    /// Number of tracked sets.
    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.sets.clear();
        self.users.clear();
    }

    fn unlink(
        users: &mut HashMap<BoundResource, BTreeSet<(DescriptorSetId, u32)>>,
        resource: BoundResource,
        set: DescriptorSetId,
        binding: u32,
    ) {
        if let Some(slots) = users.get_mut(&resource) {
            slots.remove(&(set, binding));
            if slots.is_empty() {
                users.remove(&resource);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::{BufferId, SamplerId, TextureId};

    fn layout() -> Vec<DescriptorBinding> {
        vec![
            DescriptorBinding {
                binding: 0,
                ty: DescriptorType::UniformBuffer,
            },
            DescriptorBinding {
                binding: 1,
                ty: DescriptorType::SampledTexture,
            },
            DescriptorBinding {
                binding: 2,
                ty: DescriptorType::Sampler,
            },
        ]
    }

    #[test]
    fn disengage_empties_every_referencing_slot() {
        let mut hub = DescriptorHub::new();
        let (a, b) = (DescriptorSetId(0), DescriptorSetId(1));
        hub.register_set(a, &layout());
        hub.register_set(b, &layout());
        let texture = BoundResource::Texture(TextureId(5));

        hub.engage(texture, a, 1).unwrap();
        hub.engage(texture, b, 1).unwrap();
        assert_eq!(hub.sets_referencing(texture), [a, b]);

        let emptied = hub.disengage(texture);
        assert_eq!(emptied, [(a, 1), (b, 1)]);
        assert!(!hub.is_engaged(texture));
        assert_eq!(hub.resource_at(a, 1), None);
        assert_eq!(hub.resource_at(b, 1), None);
    }

    #[test]
    fn replacing_a_slot_unlinks_the_previous_resource() {
        let mut hub = DescriptorHub::new();
        let set = DescriptorSetId(3);
        hub.register_set(set, &layout());
        let first = BoundResource::Buffer(BufferId(1));
        let second = BoundResource::Buffer(BufferId(2));

        assert_eq!(hub.engage(first, set, 0), Ok(None));
        assert_eq!(hub.engage(second, set, 0), Ok(Some(first)));
        assert!(!hub.is_engaged(first));
        assert!(hub.disengage(first).is_empty());
        assert_eq!(hub.resource_at(set, 0), Some(second));
    }

    #[test]
    fn mismatched_slot_type_is_rejected() {
        let mut hub = DescriptorHub::new();
        let set = DescriptorSetId(0);
        hub.register_set(set, &layout());
        let sampler = BoundResource::Sampler(SamplerId(0));

        assert_eq!(
            hub.engage(sampler, set, 1),
            Err(ResourceError::BindingMismatch {
                set,
                binding: 1,
                resource: sampler
            })
        );
        assert!(hub.engage(sampler, set, 9).is_err());
        assert!(!hub.is_engaged(sampler));
    }

    #[test]
    fn validate_reports_first_empty_slot() {
        let mut hub = DescriptorHub::new();
        let set = DescriptorSetId(0);
        hub.register_set(set, &layout());
        hub.engage(BoundResource::Buffer(BufferId(0)), set, 0).unwrap();
        hub.engage(BoundResource::Sampler(SamplerId(0)), set, 2).unwrap();

        assert_eq!(
            hub.validate(set),
            Err(ResourceError::BindingUndefined { set, binding: 1 })
        );
        hub.engage(BoundResource::Texture(TextureId(0)), set, 1).unwrap();
        assert_eq!(hub.validate(set), Ok(()));
        assert!(hub.validate(DescriptorSetId(42)).is_err());
    }

    #[test]
    fn removing_a_set_drops_its_reverse_entries() {
        let mut hub = DescriptorHub::new();
        let set = DescriptorSetId(0);
        hub.register_set(set, &layout());
        let buffer = BoundResource::Buffer(BufferId(0));
        hub.engage(buffer, set, 0).unwrap();

        assert!(hub.remove_set(set));
        assert!(!hub.is_engaged(buffer));
        assert!(!hub.remove_set(set));
        assert_eq!(hub.set_count(), 0);
    }
}
