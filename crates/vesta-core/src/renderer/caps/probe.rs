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

use std::fmt;

use crate::renderer::caps::{CapabilityTable, ExtensionSet};

/// One independent enrichment step of a [`CapabilityTable`].
///
/// A probe fires when its gating extension is advertised. Probes that depend
/// on a second extension (sRGB ASTC, RG float formats, ...) check it inside
/// `apply`, so every probe stays independent of the others.
#[derive(Clone, Copy)]
pub struct CapabilityProbe {
    /// Name used in log lines.
    pub name: &'static str,
    /// Extension substring gating the probe.
    pub extension: &'static str,
    /// Adds capabilities to the table. Must only OR bits in.
    pub apply: fn(&ExtensionSet, &mut CapabilityTable),
}

impl CapabilityProbe {
    /// Declares a probe.
    pub const fn new(
        name: &'static str,
        extension: &'static str,
        apply: fn(&ExtensionSet, &mut CapabilityTable),
    ) -> Self {
        Self {
            name,
            extension,
            apply,
        }
    }

    /// `true` if the gating extension is present.
    pub fn applies(&self, extensions: &ExtensionSet) -> bool {
        extensions.contains(self.extension)
    }
}

impl fmt::Debug for CapabilityProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityProbe")
            .field("name", &self.name)
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}
