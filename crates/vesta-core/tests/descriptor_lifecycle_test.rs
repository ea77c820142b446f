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

mod common;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use common::{buffer_info, device, material_set, texture_info};
use vesta_core::renderer::*;

#[test]
fn destroyed_texture_leaves_an_undefined_binding() {
    // --- 1. ARRANGE ---
    let (mut device, fake) = device(ExecutionModel::Immediate);
    let set = material_set(&mut device);
    let buffer = device.create_buffer(&buffer_info(64)).unwrap();
    let texture = device.create_texture(&texture_info(16, 16)).unwrap();
    let sampler = device.create_sampler(&SamplerInfo::default()).unwrap();
    device.bind_buffer(set, 0, buffer).unwrap();
    device.bind_texture(set, 1, texture).unwrap();
    device.bind_sampler(set, 2, sampler).unwrap();
    assert_eq!(device.validate_descriptor_set(set), Ok(()));

    // --- 2. ACT ---
    device.destroy_texture(texture).unwrap();

    // --- 3. ASSERT ---
    let hub = device.descriptor_hub();
    assert!(!hub.is_engaged(BoundResource::Texture(texture)));
    assert_eq!(hub.resource_at(set, 1), None);
    assert_eq!(
        device.validate_descriptor_set(set),
        Err(ResourceError::BindingUndefined { set, binding: 1 })
    );
    assert_eq!(
        fake.state().descriptor_writes.last(),
        Some(&(set, 1, None)),
        "the backend is told the slot is empty"
    );
    assert!(fake.was_released(GpuObject::Texture(texture)));

    device.destroy_buffer(buffer).unwrap();
    device.destroy_sampler(sampler).unwrap();
    device.destroy_descriptor_set(set).unwrap();
    assert_eq!(device.descriptor_hub().set_count(), 0);
    device.destroy();
}

#[test]
fn binding_requires_a_live_resource_of_the_right_kind() {
    let (mut device, _fake) = device(ExecutionModel::Immediate);
    let set = material_set(&mut device);
    let texture = device.create_texture(&texture_info(4, 4)).unwrap();

    assert!(matches!(
        device.bind_texture(set, 0, texture),
        Err(ResourceError::BindingMismatch { binding: 0, .. })
    ));
    assert_eq!(
        device.bind_buffer(set, 0, BufferId(4242)),
        Err(ResourceError::NotFound(GpuObject::Buffer(BufferId(4242))))
    );

    device.destroy_texture(texture).unwrap();
    assert!(matches!(
        device.bind_texture(set, 1, texture),
        Err(ResourceError::NotFound(_))
    ));
    device.destroy_descriptor_set(set).unwrap();
    device.destroy();
}

#[test]
fn random_engage_disengage_keeps_both_directions_in_sync() {
    let mut rng = StdRng::seed_from_u64(0x5eed_d35c);
    let mut hub = DescriptorHub::new();
    let layout: Vec<_> = (0..4)
        .map(|binding| DescriptorBinding {
            binding,
            ty: DescriptorType::SampledTexture,
        })
        .collect();
    let sets: Vec<_> = (0..6).map(DescriptorSetId).collect();
    for &set in &sets {
        hub.register_set(set, &layout);
    }
    let textures: Vec<_> = (0..10)
        .map(|i| BoundResource::Texture(TextureId(i)))
        .collect();

    for _ in 0..2_000 {
        let resource = textures[rng.random_range(0..textures.len())];
        if rng.random_bool(0.7) {
            let set = sets[rng.random_range(0..sets.len())];
            let binding = rng.random_range(0..4);
            hub.engage(resource, set, binding).unwrap();
            assert_eq!(hub.resource_at(set, binding), Some(resource));
        } else {
            let emptied = hub.disengage(resource);
            assert!(!hub.is_engaged(resource));
            for (set, binding) in emptied {
                assert_eq!(hub.resource_at(set, binding), None);
            }
            for &set in &sets {
                for binding in 0..4 {
                    assert_ne!(hub.resource_at(set, binding), Some(resource));
                }
            }
        }

        // Forward and reverse views agree for every resource.
        for &candidate in &textures {
            let forward: Vec<_> = sets
                .iter()
                .copied()
                .filter(|&set| (0..4).any(|b| hub.resource_at(set, b) == Some(candidate)))
                .collect();
            assert_eq!(hub.sets_referencing(candidate), forward);
        }
    }
}

#[test]
fn random_destroy_order_never_leaves_dangling_descriptors() {
    let mut rng = StdRng::seed_from_u64(7);
    let (mut device, fake) = device(ExecutionModel::ExplicitAsync);
    let queue = device.default_queue().unwrap();
    let cmd = device.default_command_buffer().unwrap();
    let sets: Vec<_> = (0..4).map(|_| material_set(&mut device)).collect();

    let mut live = Vec::new();
    for round in 0..200 {
        if live.len() < 8 || rng.random_bool(0.5) {
            let texture = device.create_texture(&texture_info(8, 8)).unwrap();
            let set = sets[rng.random_range(0..sets.len())];
            device.bind_texture(set, 1, texture).unwrap();
            live.push(texture);
        } else {
            let texture = live.swap_remove(rng.random_range(0..live.len()));
            device.destroy_texture(texture).unwrap();
            assert!(!device
                .descriptor_hub()
                .is_engaged(BoundResource::Texture(texture)));
        }
        if round % 7 == 0 {
            let epoch = device.submit(queue, &[cmd]).unwrap();
            fake.signal(epoch);
        }
        // Releases run the dangling-descriptor check and would panic.
        device.poll();
    }

    for texture in live.drain(..) {
        device.destroy_texture(texture).unwrap();
    }
    for set in sets {
        device.destroy_descriptor_set(set).unwrap();
    }
    device.destroy();
}
