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

//! Frame statistics and GPU memory accounting.

/// Work counters for the last presented frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Number of frames presented so far.
    pub frame_number: u64,
    /// Draw calls submitted during the frame.
    pub draw_calls: u32,
    /// Instances drawn during the frame.
    pub instances: u32,
    /// Triangles submitted during the frame.
    pub triangles: u32,
}

/// Draw counters accumulated on a command buffer or a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawCounters {
    /// Draw calls.
    pub draw_calls: u32,
    /// Instances.
    pub instances: u32,
    /// Triangles.
    pub triangles: u32,
}

impl DrawCounters {
    /// Adds `other` into `self`.
    pub fn accumulate(&mut self, other: DrawCounters) {
        self.draw_calls = self.draw_calls.saturating_add(other.draw_calls);
        self.instances = self.instances.saturating_add(other.instances);
        self.triangles = self.triangles.saturating_add(other.triangles);
    }

    /// Returns the counters and zeroes them.
    pub fn take(&mut self) -> DrawCounters {
        std::mem::take(self)
    }
}

/// Running byte counters for live buffer and texture allocations.
///
/// Incremented when the factory creates a resource and decremented when the
/// recycle bin performs the final free, so recycled-but-not-yet-freed objects
/// are still counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryStatus {
    /// Bytes held by live buffers.
    pub buffer_size: u64,
    /// Bytes held by live textures.
    pub texture_size: u64,
}

impl MemoryStatus {
    /// `true` when no buffer or texture memory is outstanding.
    pub fn is_empty(&self) -> bool {
        self.buffer_size == 0 && self.texture_size == 0
    }
}
