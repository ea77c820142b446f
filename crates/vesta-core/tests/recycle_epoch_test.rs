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

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use common::{buffer_info, device, texture_info};
use vesta_core::renderer::*;

#[test]
fn immediate_backend_frees_on_destroy() {
    let (mut device, fake) = device(ExecutionModel::Immediate);
    let queue = device.default_queue().unwrap();
    let cmd = device.default_command_buffer().unwrap();
    let buffer = device.create_buffer(&buffer_info(128)).unwrap();
    device.submit(queue, &[cmd]).unwrap();

    device.destroy_buffer(buffer).unwrap();

    assert!(fake.was_released(GpuObject::Buffer(buffer)));
    assert_eq!(device.pending_recycle_count(), 0);
    assert!(device.memory_status().is_empty());
    device.destroy();
}

#[test]
fn explicit_backend_waits_for_the_submission_epoch() {
    // --- 1. ARRANGE ---
    let (mut device, fake) = device(ExecutionModel::ExplicitAsync);
    let queue = device.default_queue().unwrap();
    let cmd = device.default_command_buffer().unwrap();
    let buffer = device.create_buffer(&buffer_info(128)).unwrap();
    let epoch = device.submit(queue, &[cmd]).unwrap();

    // --- 2. ACT ---
    device.destroy_buffer(buffer).unwrap();

    // --- 3. ASSERT ---
    assert!(!fake.was_released(GpuObject::Buffer(buffer)));
    assert_eq!(device.pending_recycle_count(), 1);
    assert_eq!(
        device.memory_status().buffer_size,
        128,
        "recycled memory is still accounted"
    );
    assert!(!device.is_alive(GpuObject::Buffer(buffer)));

    device.poll();
    assert!(!fake.was_released(GpuObject::Buffer(buffer)));

    fake.signal(epoch);
    assert_eq!(device.poll(), epoch);
    assert!(fake.was_released(GpuObject::Buffer(buffer)));
    assert!(device.memory_status().is_empty());
    device.destroy();
}

#[test]
fn resource_created_after_last_submission_is_freed_synchronously() {
    let (mut device, fake) = device(ExecutionModel::ExplicitAsync);
    let queue = device.default_queue().unwrap();
    let cmd = device.default_command_buffer().unwrap();
    device.submit(queue, &[cmd]).unwrap();

    let texture = device.create_texture(&texture_info(32, 32)).unwrap();
    device.destroy_texture(texture).unwrap();

    assert!(fake.was_released(GpuObject::Texture(texture)));
    assert_eq!(device.pending_recycle_count(), 0);
    device.destroy();
}

#[test]
fn teardown_drains_pending_entries_and_zeroes_memory() {
    let (mut device, fake) = device(ExecutionModel::ExplicitAsync);
    let queue = device.default_queue().unwrap();
    let cmd = device.default_command_buffer().unwrap();
    let buffer = device.create_buffer(&buffer_info(512)).unwrap();
    let texture = device.create_texture(&texture_info(8, 8)).unwrap();
    device.submit(queue, &[cmd]).unwrap();
    device.destroy_buffer(buffer).unwrap();
    device.destroy_texture(texture).unwrap();
    assert_eq!(device.pending_recycle_count(), 2);

    device.destroy();

    assert!(device.memory_status().is_empty());
    assert_eq!(device.pending_recycle_count(), 0);
    assert!(fake.was_released(GpuObject::Buffer(buffer)));
    assert!(fake.was_released(GpuObject::Texture(texture)));
}

#[test]
fn recycled_objects_never_release_before_their_epoch_completes() {
    let mut rng = StdRng::seed_from_u64(0xe90c);
    let (mut device, fake) = device(ExecutionModel::ExplicitAsync);
    let queue = device.default_queue().unwrap();
    let cmd = device.default_command_buffer().unwrap();

    // Each destroyed buffer waits for the epoch that was last submitted when
    // it was destroyed.
    let mut waits_for: HashMap<GpuObject, Epoch> = HashMap::new();
    let mut live = Vec::new();
    let mut submitted = Vec::new();

    for _ in 0..300 {
        match rng.random_range(0..3) {
            0 => live.push(device.create_buffer(&buffer_info(32)).unwrap()),
            1 if !live.is_empty() => {
                let buffer = live.swap_remove(rng.random_range(0..live.len()));
                device.destroy_buffer(buffer).unwrap();
                if !fake.was_released(GpuObject::Buffer(buffer)) {
                    waits_for.insert(GpuObject::Buffer(buffer), device.last_submitted_epoch());
                }
            }
            _ => submitted.push(device.submit(queue, &[cmd]).unwrap()),
        }
    }

    // Signal completion in random order, checking after every arrival.
    submitted.shuffle(&mut rng);
    let signal = fake.completion_signal();
    let mut arrived = Vec::new();
    for epoch in submitted {
        signal.signal(epoch);
        arrived.push(epoch);
        let watermark = device.poll();

        for (object, epoch) in &waits_for {
            let complete = (1..=epoch.0).all(|e| arrived.contains(&Epoch(e)));
            if fake.was_released(*object) {
                assert!(complete, "{object:?} released before epoch {} completed", epoch.0);
                assert!(*epoch <= watermark);
            }
            if complete {
                assert!(fake.was_released(*object), "{object:?} should be released");
            }
        }
    }

    assert_eq!(device.pending_recycle_count(), 0);
    for buffer in live {
        device.destroy_buffer(buffer).unwrap();
    }
    device.destroy();
}

#[test]
fn completion_from_another_thread_releases_entries() {
    let (mut device, fake) = device(ExecutionModel::ExplicitAsync);
    let queue = device.default_queue().unwrap();
    let cmd = device.default_command_buffer().unwrap();
    let buffer = device.create_buffer(&buffer_info(64)).unwrap();
    let epoch = device.submit(queue, &[cmd]).unwrap();
    device.destroy_buffer(buffer).unwrap();

    let signal = fake.completion_signal();
    std::thread::spawn(move || signal.signal(epoch))
        .join()
        .unwrap();

    assert_eq!(device.poll(), epoch);
    assert!(fake.was_released(GpuObject::Buffer(buffer)));
    device.destroy();
}
