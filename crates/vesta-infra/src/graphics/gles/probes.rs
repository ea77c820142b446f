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

//! Capability probes for GL ES 2 drivers.
//!
//! [`apply_baseline`] fills what every conformant driver supports. Each entry
//! of [`GLES2_PROBES`] then ORs in what one extension adds. Probes that need
//! a second extension (`texture_rg`, `EXT_sRGB`) check it themselves, so the
//! list can run in any order.

use vesta_core::renderer::{
    CapabilityProbe, CapabilityTable, ExtensionSet, Feature, Format, FormatFeature,
};

use super::constants::FramebufferFetchLevel;

const SAMPLED_TARGET: FormatFeature =
    FormatFeature::RENDER_TARGET.union(FormatFeature::SAMPLED_TEXTURE);

/// Formats and flags available without any extension.
pub fn apply_baseline(caps: &mut CapabilityTable) {
    caps.add_format_features_all(
        &[
            Format::Rgb8,
            Format::R5G6B5,
            Format::Rgba8,
            Format::Rgba4,
            Format::Rgb5A1,
        ],
        FormatFeature::COMPLETE,
    );
    for format in [
        Format::R5G6B5,
        Format::Rgba4,
        Format::Rgb5A1,
        Format::Depth,
        Format::DepthStencil,
    ] {
        caps.clear_texture_exclusive(format);
    }

    caps.add_format_features_all(Format::INTEGER, FormatFeature::VERTEX_ATTRIBUTE);
    caps.add_format_features_all(
        &[
            Format::R32Float,
            Format::Rg32Float,
            Format::Rgb32Float,
            Format::Rgba32Float,
        ],
        FormatFeature::VERTEX_ATTRIBUTE,
    );
}

/// Every GL ES 2 extension probe.
pub const GLES2_PROBES: &[CapabilityProbe] = &[
    CapabilityProbe::new("vertex_half_float", "OES_vertex_half_float", |_, caps| {
        caps.add_format_features_all(HALF_FLOATS, FormatFeature::VERTEX_ATTRIBUTE);
    }),
    CapabilityProbe::new("srgb", "EXT_sRGB", |_, caps| {
        caps.add_format_features_all(&[Format::Srgb8, Format::Srgb8A8], FormatFeature::COMPLETE);
        caps.clear_texture_exclusive(Format::Srgb8A8);
    }),
    CapabilityProbe::new("element_index_uint", "element_index_uint", |_, caps| {
        caps.enable_feature(Feature::ElementIndexUint);
    }),
    CapabilityProbe::new("texture_rg", "texture_rg", |_, caps| {
        caps.add_format_features_all(&[Format::R8, Format::Rg8], FormatFeature::COMPLETE);
    }),
    CapabilityProbe::new("texture_float", "texture_float", |ext, caps| {
        add_with_rg(ext, caps, FULL_FLOATS, SAMPLED_TARGET);
    }),
    CapabilityProbe::new("texture_half_float", "texture_half_float", |ext, caps| {
        add_with_rg(ext, caps, HALF_FLOATS, SAMPLED_TARGET);
    }),
    CapabilityProbe::new(
        "color_buffer_half_float",
        "color_buffer_half_float",
        |ext, caps| {
            for &format in rg_gated(ext, HALF_FLOATS) {
                caps.add_format_features(format, FormatFeature::RENDER_TARGET);
                caps.clear_texture_exclusive(format);
            }
        },
    ),
    CapabilityProbe::new("texture_float_linear", "texture_float_linear", |ext, caps| {
        add_with_rg(ext, caps, FULL_FLOATS, FormatFeature::LINEAR_FILTER);
    }),
    CapabilityProbe::new(
        "texture_half_float_linear",
        "OES_texture_half_float_linear",
        |ext, caps| {
            add_with_rg(ext, caps, HALF_FLOATS, FormatFeature::LINEAR_FILTER);
        },
    ),
    CapabilityProbe::new("depth_texture", "depth_texture", |_, caps| {
        caps.add_format_features(Format::Depth, FormatFeature::COMPLETE);
    }),
    CapabilityProbe::new("packed_depth_stencil", "packed_depth_stencil", |_, caps| {
        caps.add_format_features(Format::DepthStencil, FormatFeature::COMPLETE);
    }),
    CapabilityProbe::new("draw_buffers", "draw_buffers", |_, caps| {
        // The attachment count is queried from the driver afterwards.
        caps.enable_feature(Feature::MultipleRenderTargets);
    }),
    CapabilityProbe::new("blend_minmax", "blend_minmax", |_, caps| {
        caps.enable_feature(Feature::BlendMinmax);
    }),
    CapabilityProbe::new("instanced_arrays", "instanced_arrays", |_, caps| {
        caps.enable_feature(Feature::InstancedArrays);
    }),
    CapabilityProbe::new("framebuffer_fetch", "framebuffer_fetch", |ext, caps| {
        if cfg!(not(target_os = "windows"))
            && FramebufferFetchLevel::detect(ext) != FramebufferFetchLevel::None
        {
            caps.enable_feature(Feature::InputAttachmentBenefit);
        }
    }),
    CapabilityProbe::new("etc1", "compressed_ETC1", |_, caps| {
        caps.add_format_features(Format::EtcRgb8, FormatFeature::COMPLETE);
    }),
    CapabilityProbe::new("pvrtc", "texture_compression_pvrtc", |_, caps| {
        caps.add_format_features_all(Format::PVRTC, FormatFeature::COMPLETE);
    }),
    CapabilityProbe::new("astc", "texture_compression_astc", |ext, caps| {
        caps.add_format_features_all(Format::ASTC, FormatFeature::COMPLETE);
        if ext.contains("EXT_sRGB") {
            caps.add_format_features_all(Format::ASTC_SRGB, FormatFeature::COMPLETE);
        }
    }),
];

/// RGB and RGBA first, then the R and RG variants that need `texture_rg`.
const FULL_FLOATS: &[Format] = &[
    Format::Rgb32Float,
    Format::Rgba32Float,
    Format::R32Float,
    Format::Rg32Float,
];

const HALF_FLOATS: &[Format] = &[
    Format::Rgb16Float,
    Format::Rgba16Float,
    Format::R16Float,
    Format::Rg16Float,
];

/// Drops the one- and two-channel formats when `texture_rg` is missing.
fn rg_gated<'a>(extensions: &ExtensionSet, formats: &'a [Format]) -> &'a [Format] {
    if extensions.contains("texture_rg") {
        formats
    } else {
        &formats[..2]
    }
}

fn add_with_rg(
    extensions: &ExtensionSet,
    caps: &mut CapabilityTable,
    formats: &[Format],
    features: FormatFeature,
) {
    caps.add_format_features_all(rg_gated(extensions, formats), features);
}

/// The compressed families the table ended up supporting, as logged at
/// startup (`"etc1 pvrtc astc "`).
pub fn compressed_format_names(caps: &CapabilityTable) -> String {
    let families: [(&str, &[Format]); 3] = [
        ("etc1", &[Format::EtcRgb8]),
        ("pvrtc", Format::PVRTC),
        ("astc", Format::ASTC),
    ];
    let mut names = String::new();
    for (name, formats) in families {
        if formats
            .iter()
            .any(|f| caps.format_features(*f).contains(FormatFeature::SAMPLED_TEXTURE))
        {
            names.push_str(name);
            names.push(' ');
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(extensions: &str) -> CapabilityTable {
        let mut caps = CapabilityTable::new();
        apply_baseline(&mut caps);
        caps.run_probes(&ExtensionSet::parse(extensions), GLES2_PROBES);
        caps
    }

    #[test]
    fn float_rg_variants_need_texture_rg() {
        let caps = table_with("GL_OES_texture_float");
        assert!(caps
            .format_features(Format::Rgba32Float)
            .contains(SAMPLED_TARGET));
        assert_eq!(
            caps.format_features(Format::R32Float),
            FormatFeature::VERTEX_ATTRIBUTE
        );

        let caps = table_with("GL_OES_texture_float GL_EXT_texture_rg");
        assert!(caps.format_features(Format::R32Float).contains(SAMPLED_TARGET));
        assert!(caps.format_features(Format::Rg8).contains(FormatFeature::COMPLETE));
    }

    #[test]
    fn half_float_render_targets_drop_exclusivity() {
        let caps = table_with("GL_EXT_color_buffer_half_float");
        assert!(!caps.is_texture_exclusive(Format::Rgba16Float));
        assert!(caps.is_texture_exclusive(Format::R16Float));
        assert_eq!(
            caps.format_features(Format::Rgb16Float),
            FormatFeature::RENDER_TARGET
        );
    }

    #[test]
    fn vertex_half_float_keeps_earlier_bits() {
        let caps = table_with("GL_OES_texture_half_float GL_OES_vertex_half_float");
        let mask = caps.format_features(Format::Rgba16Float);
        assert!(mask.contains(SAMPLED_TARGET));
        assert!(mask.contains(FormatFeature::VERTEX_ATTRIBUTE));
    }

    #[test]
    fn srgb_astc_needs_both_extensions() {
        let caps = table_with("GL_KHR_texture_compression_astc_ldr");
        assert!(caps
            .format_features(Format::AstcRgba8x8)
            .contains(FormatFeature::COMPLETE));
        assert!(caps.format_features(Format::AstcSrgba8x8).is_empty());

        let caps = table_with("GL_KHR_texture_compression_astc_ldr GL_EXT_sRGB");
        assert!(caps
            .format_features(Format::AstcSrgba8x8)
            .contains(FormatFeature::COMPLETE));
        assert!(!caps.is_texture_exclusive(Format::Srgb8A8));
    }

    #[test]
    fn compressed_names_follow_probe_results() {
        assert_eq!(compressed_format_names(&table_with("")), "");
        let caps = table_with(
            "GL_OES_compressed_ETC1_RGB8_texture GL_IMG_texture_compression_pvrtc \
             GL_KHR_texture_compression_astc_ldr",
        );
        assert_eq!(compressed_format_names(&caps), "etc1 pvrtc astc ");
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn framebuffer_fetch_sets_input_attachment_benefit() {
        assert!(!table_with("GL_ARM_shader_framebuffer_fetch")
            .has_feature(Feature::InputAttachmentBenefit));
        assert!(table_with("GL_EXT_shader_framebuffer_fetch")
            .has_feature(Feature::InputAttachmentBenefit));
    }
}
