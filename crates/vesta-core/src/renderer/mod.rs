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

//! Provides the public, backend-agnostic graphics device for Vesta.
//!
//! This module defines the "common language" every backend speaks. It contains
//! the [`NativeContext`] trait a backend implements, the data types passed
//! through it, and the lifecycle machinery sitting between the application and
//! the backend:
//!
//! - [`caps`]: the normalized capability table filled by backend probes.
//! - [`GpuStateCache`]: bound-state cache used to elide redundant calls.
//! - [`DescriptorHub`]: which descriptor sets reference which resources.
//! - [`RecycleBin`]: deferred destruction keyed on submission epochs.
//! - [`Device`]: the orchestrator and resource factory.
//!
//! Concrete backends live in the `vesta-infra` crate.

pub mod api;
pub mod caps;
pub mod descriptor_hub;
pub mod device;
pub mod error;
pub mod recycle_bin;
pub mod state_cache;
pub mod timeline;
pub mod traits;

pub use self::api::*;
pub use self::caps::{CapabilityProbe, CapabilityTable, ExtensionSet};
pub use self::descriptor_hub::DescriptorHub;
pub use self::device::{Device, DeviceState};
pub use self::error::{IntegrityViolation, RenderError, ResourceError};
pub use self::recycle_bin::{RecycleBin, RetiredObject};
pub use self::state_cache::GpuStateCache;
pub use self::timeline::{CompletionSignal, SubmissionTimeline};
pub use self::traits::NativeContext;
