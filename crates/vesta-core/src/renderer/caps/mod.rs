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

//! The normalized capability table and the probes that fill it.
//!
//! A backend fills a [`CapabilityTable`] once, during initialization, by
//! assigning a baseline and then running [`CapabilityProbe`]s against the
//! optional capabilities it detected (an [`ExtensionSet`] for GL-class APIs).
//! Probes only ever add bits, so the order they run in does not matter.

mod extensions;
mod probe;
mod table;

pub use self::extensions::ExtensionSet;
pub use self::probe::CapabilityProbe;
pub use self::table::CapabilityTable;
