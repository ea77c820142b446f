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

//! Deferred destruction of GPU objects.
//!
//! The device hands destroyed objects to the [`RecycleBin`] together with the
//! last submitted [`Epoch`]. An entry is released once the completed-epoch
//! watermark reaches that epoch. Entries are checked one by one, so an old
//! entry never holds back a newer one that is already safe.

use crate::renderer::api::{Epoch, GpuObject};
use crate::renderer::descriptor_hub::DescriptorHub;
use crate::renderer::error::IntegrityViolation;

/// A destroyed object waiting for its final release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetiredObject {
    /// The object to free.
    pub object: GpuObject,
    /// Bytes it accounts for in the device memory counters.
    pub size: u64,
}

/// The deferred-destruction queue.
#[derive(Debug, Default)]
pub struct RecycleBin {
    entries: Vec<(RetiredObject, Epoch)>,
}

impl RecycleBin {
    /// An empty bin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `object` until `epoch` completes.
    ///
    /// The object must already be disengaged from every descriptor set.
    pub fn collect(&mut self, object: RetiredObject, epoch: Epoch) {
        log::trace!(
            target: "vesta::device",
            "Recycling {:?} until epoch {}",
            object.object,
            epoch.0
        );
        self.entries.push((object, epoch));
    }

    /// Releases `object` right away through `release`.
    ///
    /// # Panics
    ///
    /// Panics with [`IntegrityViolation::DanglingDescriptor`] if a descriptor
    /// set still references the object.
    pub fn release_now(
        object: RetiredObject,
        hub: &DescriptorHub,
        mut release: impl FnMut(RetiredObject),
    ) {
        assert_disengaged(hub, &object);
        release(object);
    }

    /// Releases every entry whose epoch is at or below `completed`.
    ///
    /// Returns the number of released entries.
    pub fn release_completed(
        &mut self,
        completed: Epoch,
        hub: &DescriptorHub,
        mut release: impl FnMut(RetiredObject),
    ) -> usize {
        let mut released = 0;
        let mut pending = Vec::with_capacity(self.entries.len());
        for (object, epoch) in self.entries.drain(..) {
            if epoch <= completed {
                assert_disengaged(hub, &object);
                release(object);
                released += 1;
            } else {
                pending.push((object, epoch));
            }
        }
        self.entries = pending;
        released
    }

    /// Releases everything regardless of epoch. Only valid once the backend
    /// is idle.
    pub fn drain_all(&mut self, hub: &DescriptorHub, mut release: impl FnMut(RetiredObject)) -> usize {
        let count = self.entries.len();
        for (object, _) in self.entries.drain(..) {
            assert_disengaged(hub, &object);
            release(object);
        }
        count
    }

    /// Number of entries still waiting.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes held by waiting entries.
    pub fn pending_bytes(&self) -> u64 {
        self.entries.iter().map(|(object, _)| object.size).sum()
    }

    /// The newest epoch any entry waits for.
    pub fn latest_epoch(&self) -> Option<Epoch> {
        self.entries.iter().map(|(_, epoch)| *epoch).max()
    }
}

fn assert_disengaged(hub: &DescriptorHub, object: &RetiredObject) {
    let Some(resource) = object.object.as_bound() else {
        return;
    };
    if let Some(&set) = hub.sets_referencing(resource).first() {
        let violation = IntegrityViolation::DanglingDescriptor { resource, set };
        log::error!(target: "vesta::device", "FATAL: {violation}");
        panic!("{violation}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::{
        BoundResource, BufferId, DescriptorBinding, DescriptorSetId, DescriptorType, TextureId,
    };

    fn buffer(id: usize) -> RetiredObject {
        RetiredObject {
            object: GpuObject::Buffer(BufferId(id)),
            size: 64,
        }
    }

    #[test]
    fn entries_wait_for_their_own_epoch() {
        let hub = DescriptorHub::new();
        let mut bin = RecycleBin::new();
        bin.collect(buffer(0), Epoch(3));
        bin.collect(buffer(1), Epoch(1));
        bin.collect(buffer(2), Epoch(2));

        let mut freed = Vec::new();
        assert_eq!(bin.release_completed(Epoch(2), &hub, |o| freed.push(o)), 2);
        assert_eq!(freed, [buffer(1), buffer(2)]);
        assert_eq!(bin.len(), 1);
        assert_eq!(bin.pending_bytes(), 64);
        assert_eq!(bin.latest_epoch(), Some(Epoch(3)));

        assert_eq!(bin.release_completed(Epoch(2), &hub, |_| {}), 0);
        assert_eq!(bin.release_completed(Epoch(3), &hub, |o| freed.push(o)), 1);
        assert!(bin.is_empty());
    }

    #[test]
    fn drain_all_ignores_epochs() {
        let hub = DescriptorHub::new();
        let mut bin = RecycleBin::new();
        bin.collect(buffer(0), Epoch(10));
        bin.collect(buffer(1), Epoch(20));
        let mut count = 0;
        assert_eq!(bin.drain_all(&hub, |_| count += 1), 2);
        assert_eq!(count, 2);
        assert!(bin.is_empty());
    }

    #[test]
    #[should_panic(expected = "still references")]
    fn releasing_an_engaged_resource_panics() {
        let mut hub = DescriptorHub::new();
        let set = DescriptorSetId(0);
        hub.register_set(
            set,
            &[DescriptorBinding {
                binding: 0,
                ty: DescriptorType::SampledTexture,
            }],
        );
        hub.engage(BoundResource::Texture(TextureId(4)), set, 0)
            .unwrap();

        let object = RetiredObject {
            object: GpuObject::Texture(TextureId(4)),
            size: 16,
        };
        RecycleBin::release_now(object, &hub, |_| {});
    }
}
