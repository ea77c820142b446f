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

//! A GL driver with no GPU behind it, for tests, CI and the sandbox.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::driver::{gl, GlDriver, GlObjectKind};

/// Calls observed by a [`HeadlessGlDriver`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeadlessStats {
    /// Objects currently alive, per kind.
    pub live: HashMap<GlObjectKind, usize>,
    /// Total `gen_object` calls that succeeded.
    pub generated: usize,
    /// Total `delete_object` calls on live names.
    pub deleted: usize,
    /// `bind_texture` calls.
    pub texture_binds: usize,
    /// `set_vertex_attrib_array` calls.
    pub attribute_toggles: usize,
    /// `swap_buffers` calls.
    pub swaps: usize,
    /// `finish` calls.
    pub finishes: usize,
}

impl HeadlessStats {
    /// Live objects across every kind.
    pub fn live_total(&self) -> usize {
        self.live.values().sum()
    }
}

/// A driver that reports a configurable extension string and limits.
///
/// The defaults are the minimums a GL ES 2 implementation must expose, with
/// no extensions at all.
#[derive(Debug)]
pub struct HeadlessGlDriver {
    strings: HashMap<u32, String>,
    integers: HashMap<u32, i32>,
    names: HashMap<u32, GlObjectKind>,
    next_name: u32,
    name_budget: Option<usize>,
    lost: bool,
    current: bool,
    stats: Arc<Mutex<HeadlessStats>>,
}

impl Default for HeadlessGlDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessGlDriver {
    /// A baseline GL ES 2 driver.
    pub fn new() -> Self {
        let strings = HashMap::from([
            (gl::VENDOR, "Vesta".to_string()),
            (gl::RENDERER, "Vesta Headless GL".to_string()),
            (gl::VERSION, "OpenGL ES 2.0 (headless)".to_string()),
            (gl::EXTENSIONS, String::new()),
        ]);
        let integers = HashMap::from([
            (gl::MAX_VERTEX_ATTRIBS, 8),
            (gl::MAX_VERTEX_UNIFORM_VECTORS, 128),
            (gl::MAX_FRAGMENT_UNIFORM_VECTORS, 16),
            (gl::MAX_TEXTURE_IMAGE_UNITS, 8),
            (gl::MAX_VERTEX_TEXTURE_IMAGE_UNITS, 0),
            (gl::MAX_TEXTURE_SIZE, 2048),
            (gl::MAX_CUBE_MAP_TEXTURE_SIZE, 2048),
            (gl::MAX_DRAW_BUFFERS, 4),
        ]);
        Self {
            strings,
            integers,
            names: HashMap::new(),
            next_name: 1,
            name_budget: None,
            lost: false,
            current: false,
            stats: Arc::default(),
        }
    }

    /// Replaces the space-separated extension string.
    pub fn with_extensions(mut self, extensions: &str) -> Self {
        self.strings.insert(gl::EXTENSIONS, extensions.to_string());
        self
    }

    /// Overrides one `glGetIntegerv` value.
    pub fn with_integer(mut self, name: u32, value: i32) -> Self {
        self.integers.insert(name, value);
        self
    }

    /// Overrides one `glGetString` value.
    pub fn with_string(mut self, name: u32, value: &str) -> Self {
        self.strings.insert(name, value.to_string());
        self
    }

    /// Fails `gen_object` once `count` names are alive.
    pub fn with_name_budget(mut self, count: usize) -> Self {
        self.name_budget = Some(count);
        self
    }

    /// Simulates a context that can never be made current.
    pub fn lost(mut self) -> Self {
        self.lost = true;
        self
    }

    /// A handle to the call counters, usable after the driver is boxed.
    pub fn stats(&self) -> HeadlessStatsHandle {
        HeadlessStatsHandle(self.stats.clone())
    }

    fn counters(&self) -> MutexGuard<'_, HeadlessStats> {
        // A poisoned lock only means a test panicked mid-update.
        self.stats.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Shared view of a [`HeadlessGlDriver`]'s counters.
#[derive(Debug, Clone)]
pub struct HeadlessStatsHandle(Arc<Mutex<HeadlessStats>>);

impl HeadlessStatsHandle {
    /// A copy of the current counters.
    pub fn snapshot(&self) -> HeadlessStats {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl GlDriver for HeadlessGlDriver {
    fn make_current(&mut self, current: bool) -> bool {
        if self.lost {
            return false;
        }
        self.current = current;
        true
    }

    fn get_string(&self, name: u32) -> Option<String> {
        self.strings.get(&name).cloned()
    }

    fn get_integer(&self, name: u32) -> i32 {
        self.integers.get(&name).copied().unwrap_or(0)
    }

    fn gen_object(&mut self, kind: GlObjectKind) -> Option<u32> {
        if self.name_budget.is_some_and(|budget| self.names.len() >= budget) {
            return None;
        }
        let name = self.next_name;
        self.next_name += 1;
        self.names.insert(name, kind);

        let mut stats = self.counters();
        stats.generated += 1;
        *stats.live.entry(kind).or_default() += 1;
        Some(name)
    }

    fn delete_object(&mut self, kind: GlObjectKind, name: u32) {
        if self.names.get(&name) != Some(&kind) {
            log::warn!(target: "vesta::gles", "Deleting unknown {kind:?} name {name}");
            return;
        }
        self.names.remove(&name);

        let mut stats = self.counters();
        stats.deleted += 1;
        if let Some(live) = stats.live.get_mut(&kind) {
            *live = live.saturating_sub(1);
        }
    }

    fn bind_texture(&mut self, _unit: u32, _name: u32) {
        self.counters().texture_binds += 1;
    }

    fn set_vertex_attrib_array(&mut self, _location: u32, _enabled: bool) {
        self.counters().attribute_toggles += 1;
    }

    fn swap_buffers(&mut self) -> bool {
        self.counters().swaps += 1;
        self.current
    }

    fn finish(&mut self) {
        self.counters().finishes += 1;
    }
}
