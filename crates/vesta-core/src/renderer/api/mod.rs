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

//! Backend-agnostic device API types.
//!
//! - **[`format`]**: texel formats and their capability bits.
//! - **[`feature`]**: optional device features and scalar limits.
//! - **[`resource`]**: typed resource ids and creation descriptors.
//! - **[`adapter`]**: backend identity and execution model.
//! - **[`settings`]**: serializable device configuration.
//! - **[`stats`]**: frame statistics and memory accounting.

pub mod adapter;
pub mod feature;
pub mod format;
pub mod resource;
pub mod settings;
pub mod stats;

pub use self::adapter::*;
pub use self::feature::*;
pub use self::format::*;
pub use self::resource::*;
pub use self::settings::*;
pub use self::stats::*;

/// A monotonically increasing submission marker.
///
/// Every queue submission is stamped with the next epoch. [`Epoch::ZERO`] sits
/// before the first submission and is always complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Epoch(pub u64);

impl Epoch {
    /// The epoch preceding any submission.
    pub const ZERO: Epoch = Epoch(0);

    /// The epoch right after this one.
    pub const fn next(self) -> Epoch {
        Epoch(self.0 + 1)
    }
}
