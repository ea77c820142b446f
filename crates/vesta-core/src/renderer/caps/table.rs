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

use crate::renderer::api::{Feature, Format, FormatFeature, Limits};
use crate::renderer::caps::{CapabilityProbe, ExtensionSet};

/// What the device can do, normalized across backends.
///
/// Format masks and feature flags can only be added to. Texture exclusivity
/// starts out `true` for every format and can only be cleared. Together this
/// makes probing order-independent.
#[derive(Clone, PartialEq, Eq)]
pub struct CapabilityTable {
    format_features: [FormatFeature; Format::COUNT],
    texture_exclusive: [bool; Format::COUNT],
    features: [bool; Feature::COUNT],
    limits: Limits,
    multithreaded_submission: bool,
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityTable {
    /// An empty table: no format bits, every format exclusive, no features.
    pub fn new() -> Self {
        Self {
            format_features: [FormatFeature::EMPTY; Format::COUNT],
            texture_exclusive: [true; Format::COUNT],
            features: [false; Feature::COUNT],
            limits: Limits::default(),
            multithreaded_submission: false,
        }
    }

    /// ORs `features` into the mask of `format`.
    pub fn add_format_features(&mut self, format: Format, features: FormatFeature) {
        self.format_features[format.index()].insert(features);
    }

    /// ORs `features` into the mask of every format in `formats`.
    pub fn add_format_features_all(&mut self, formats: &[Format], features: FormatFeature) {
        for &format in formats {
            self.add_format_features(format, features);
        }
    }

    /// Marks `format` as safe to sample and render to at the same time.
    pub fn clear_texture_exclusive(&mut self, format: Format) {
        self.texture_exclusive[format.index()] = false;
    }

    /// Turns an optional feature on.
    pub fn enable_feature(&mut self, feature: Feature) {
        self.features[feature.index()] = true;
    }

    /// Records that queues accept submissions from several threads.
    pub fn enable_multithreaded_submission(&mut self) {
        self.multithreaded_submission = true;
    }

    /// Replaces the scalar limits.
    pub fn set_limits(&mut self, limits: Limits) {
        self.limits = limits;
    }

    /// Mutable access to the scalar limits, for backends that query them one
    /// at a time.
    pub fn limits_mut(&mut self) -> &mut Limits {
        &mut self.limits
    }

    /// The mask of `format`.
    pub fn format_features(&self, format: Format) -> FormatFeature {
        self.format_features[format.index()]
    }

    /// `true` if `format` cannot be sampled while it is being rendered to.
    pub fn is_texture_exclusive(&self, format: Format) -> bool {
        self.texture_exclusive[format.index()]
    }

    /// `true` if `feature` is available.
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features[feature.index()]
    }

    /// The scalar limits.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// `true` if queues accept submissions from several threads.
    pub fn supports_multithreaded_submission(&self) -> bool {
        self.multithreaded_submission
    }

    /// Compressed formats that can at least be sampled.
    pub fn compressed_formats(&self) -> Vec<Format> {
        Format::ALL
            .iter()
            .copied()
            .filter(|f| {
                f.is_compressed()
                    && self
                        .format_features(*f)
                        .contains(FormatFeature::SAMPLED_TEXTURE)
            })
            .collect()
    }

    /// Runs every probe whose gating extension is present, in slice order.
    ///
    /// Returns the names of the probes that fired.
    pub fn run_probes(
        &mut self,
        extensions: &ExtensionSet,
        probes: &[CapabilityProbe],
    ) -> Vec<&'static str> {
        let mut applied = Vec::new();
        for probe in probes {
            if probe.applies(extensions) {
                (probe.apply)(extensions, self);
                applied.push(probe.name);
            }
        }
        log::trace!(target: "vesta::caps", "Applied capability probes: {:?}", applied);
        applied
    }
}

impl std::fmt::Debug for CapabilityTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let formats: Vec<_> = Format::ALL
            .iter()
            .filter(|fmt| !self.format_features(**fmt).is_empty())
            .map(|fmt| (fmt.name(), self.format_features(*fmt)))
            .collect();
        let features: Vec<_> = Feature::ALL
            .iter()
            .filter(|feat| self.has_feature(**feat))
            .collect();
        f.debug_struct("CapabilityTable")
            .field("formats", &formats)
            .field("features", &features)
            .field("limits", &self.limits)
            .field("multithreaded_submission", &self.multithreaded_submission)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_table_is_empty_and_exclusive() {
        let table = CapabilityTable::new();
        for &format in Format::ALL {
            assert!(table.format_features(format).is_empty());
            assert!(table.is_texture_exclusive(format));
        }
        for feature in Feature::ALL {
            assert!(!table.has_feature(feature));
        }
        assert!(!table.supports_multithreaded_submission());
    }

    #[test]
    fn format_bits_accumulate() {
        let mut table = CapabilityTable::new();
        table.add_format_features(Format::Rgba16Float, FormatFeature::VERTEX_ATTRIBUTE);
        table.add_format_features(Format::Rgba16Float, FormatFeature::RENDER_TARGET);
        table.add_format_features(Format::Rgba16Float, FormatFeature::EMPTY);

        let mask = table.format_features(Format::Rgba16Float);
        assert!(mask.contains(FormatFeature::VERTEX_ATTRIBUTE | FormatFeature::RENDER_TARGET));
        assert!(!mask.contains(FormatFeature::SAMPLED_TEXTURE));
    }

    #[test]
    fn exclusivity_is_per_format() {
        let mut table = CapabilityTable::new();
        table.clear_texture_exclusive(Format::R5G6B5);
        table.clear_texture_exclusive(Format::R5G6B5);
        assert!(!table.is_texture_exclusive(Format::R5G6B5));
        assert!(table.is_texture_exclusive(Format::Rgba8));
    }

    #[test]
    fn probes_fire_only_when_gated_extension_is_present() {
        fn srgb(_: &ExtensionSet, table: &mut CapabilityTable) {
            table.add_format_features(Format::Srgb8A8, FormatFeature::COMPLETE);
        }
        fn minmax(_: &ExtensionSet, table: &mut CapabilityTable) {
            table.enable_feature(Feature::BlendMinmax);
        }
        let probes = [
            CapabilityProbe::new("srgb", "EXT_sRGB", srgb),
            CapabilityProbe::new("minmax", "blend_minmax", minmax),
        ];

        let mut table = CapabilityTable::new();
        let applied = table.run_probes(&ExtensionSet::parse("GL_EXT_blend_minmax"), &probes);

        assert_eq!(applied, ["minmax"]);
        assert!(table.has_feature(Feature::BlendMinmax));
        assert!(table.format_features(Format::Srgb8A8).is_empty());
    }

    #[test]
    fn compressed_formats_lists_sampleable_blocks() {
        let mut table = CapabilityTable::new();
        table.add_format_features(Format::EtcRgb8, FormatFeature::COMPLETE);
        table.add_format_features(Format::Rgba8, FormatFeature::COMPLETE);
        table.add_format_features(Format::Bc1Rgba, FormatFeature::VERTEX_ATTRIBUTE);
        assert_eq!(table.compressed_formats(), [Format::EtcRgb8]);
    }
}
