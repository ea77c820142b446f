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

//! Fills a [`CapabilityTable`] from what a wgpu adapter reports.

use vesta_core::renderer::{CapabilityTable, Feature, Format, FormatFeature, Limits};

use super::conversions::{required_feature, texture_format, vertex_format};

/// Probes every format, the optional features and the limits.
///
/// `features` are the features enabled on the logical device. Compressed
/// formats whose feature is missing keep an empty mask.
pub fn probe_adapter(
    adapter: &wgpu::Adapter,
    features: wgpu::Features,
    limits: &wgpu::Limits,
    caps: &mut CapabilityTable,
) {
    for &format in Format::ALL {
        if !features.contains(required_feature(format)) {
            continue;
        }
        if let Some(wgpu_format) = texture_format(format) {
            let mask = format_mask(adapter.get_texture_format_features(wgpu_format));
            caps.add_format_features(format, mask);
        }
        if vertex_format(format).is_some() {
            caps.add_format_features(format, FormatFeature::VERTEX_ATTRIBUTE);
        }
    }

    // A depth attachment can be sampled while bound read-only.
    caps.clear_texture_exclusive(Format::Depth);
    caps.clear_texture_exclusive(Format::DepthStencil);

    let limits = map_limits(limits);
    for feature in core_features(&limits) {
        caps.enable_feature(feature);
    }
    caps.set_limits(limits);
    caps.enable_multithreaded_submission();
}

/// Translates the usages and flags wgpu reports for one texture format.
pub fn format_mask(features: wgpu::TextureFormatFeatures) -> FormatFeature {
    let mut mask = FormatFeature::EMPTY;
    if features
        .allowed_usages
        .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
    {
        mask.insert(FormatFeature::RENDER_TARGET);
    }
    if features
        .allowed_usages
        .contains(wgpu::TextureUsages::TEXTURE_BINDING)
    {
        mask.insert(FormatFeature::SAMPLED_TEXTURE);
    }
    if features
        .flags
        .contains(wgpu::TextureFormatFeatureFlags::FILTERABLE)
    {
        mask.insert(FormatFeature::LINEAR_FILTER);
    }
    mask
}

/// Uniform limits are expressed in bytes by wgpu and in `vec4` slots here.
pub fn map_limits(limits: &wgpu::Limits) -> Limits {
    let uniform_vectors =
        (limits.max_uniform_buffer_binding_size as u64 / 16).min(u32::MAX as u64) as u32;
    Limits {
        max_vertex_attributes: limits.max_vertex_attributes,
        max_vertex_uniform_vectors: uniform_vectors,
        max_fragment_uniform_vectors: uniform_vectors,
        max_texture_units: limits.max_sampled_textures_per_shader_stage,
        max_vertex_texture_units: limits.max_sampled_textures_per_shader_stage,
        max_texture_size: limits.max_texture_dimension_2d,
        max_cube_map_texture_size: limits.max_texture_dimension_2d,
        max_color_render_targets: limits.max_color_attachments.max(1),
    }
}

/// Features every wgpu device has, plus MRT when more than one color
/// attachment is allowed.
fn core_features(limits: &Limits) -> Vec<Feature> {
    let mut features = vec![
        Feature::ElementIndexUint,
        Feature::InstancedArrays,
        Feature::BlendMinmax,
    ];
    if limits.max_color_render_targets > 1 {
        features.push(Feature::MultipleRenderTargets);
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_flags_map_to_format_features() {
        let features = wgpu::TextureFormatFeatures {
            allowed_usages: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            flags: wgpu::TextureFormatFeatureFlags::FILTERABLE,
        };
        assert_eq!(format_mask(features), FormatFeature::COMPLETE);

        let sample_only = wgpu::TextureFormatFeatures {
            allowed_usages: wgpu::TextureUsages::TEXTURE_BINDING,
            flags: wgpu::TextureFormatFeatureFlags::empty(),
        };
        assert_eq!(format_mask(sample_only), FormatFeature::SAMPLED_TEXTURE);
    }

    #[test]
    fn downlevel_limits_still_allow_multiple_render_targets() {
        let limits = map_limits(&wgpu::Limits::downlevel_webgl2_defaults());
        assert!(limits.max_color_render_targets >= 4);
        assert_eq!(limits.max_vertex_uniform_vectors, 16 * 1024 / 16);
        assert!(core_features(&limits).contains(&Feature::MultipleRenderTargets));
    }

    #[test]
    fn single_attachment_has_no_mrt() {
        let limits = Limits {
            max_color_render_targets: 1,
            ..Limits::default()
        };
        assert!(!core_features(&limits).contains(&Feature::MultipleRenderTargets));
    }
}
