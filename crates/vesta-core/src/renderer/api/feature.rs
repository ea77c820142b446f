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

//! Coarse-grained optional features and scalar device limits.

/// An optional capability that a backend may or may not expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// 32-bit index buffers.
    ElementIndexUint,
    /// Per-instance vertex attributes (instanced drawing).
    InstancedArrays,
    /// More than one color attachment per render pass.
    MultipleRenderTargets,
    /// `MIN`/`MAX` blend equations.
    BlendMinmax,
    /// Reading an input attachment after writing it in the same pass is cheap
    /// (framebuffer fetch).
    InputAttachmentBenefit,
}

impl Feature {
    /// Every feature, in declaration order.
    pub const ALL: [Feature; 5] = [
        Feature::ElementIndexUint,
        Feature::InstancedArrays,
        Feature::MultipleRenderTargets,
        Feature::BlendMinmax,
        Feature::InputAttachmentBenefit,
    ];

    /// Number of features, used to size the feature table.
    pub const COUNT: usize = Feature::ALL.len();

    /// Position of the feature in the feature table.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Scalar limits reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of vertex attributes.
    pub max_vertex_attributes: u32,
    /// Maximum number of vec4 uniforms in the vertex stage.
    pub max_vertex_uniform_vectors: u32,
    /// Maximum number of vec4 uniforms in the fragment stage.
    pub max_fragment_uniform_vectors: u32,
    /// Maximum number of texture units usable by the fragment stage.
    pub max_texture_units: u32,
    /// Maximum number of texture units usable by the vertex stage.
    pub max_vertex_texture_units: u32,
    /// Maximum width/height of a 2D texture.
    pub max_texture_size: u32,
    /// Maximum width/height of a cube map face.
    pub max_cube_map_texture_size: u32,
    /// Maximum number of simultaneous color render targets.
    pub max_color_render_targets: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_vertex_attributes: 0,
            max_vertex_uniform_vectors: 0,
            max_fragment_uniform_vectors: 0,
            max_texture_units: 0,
            max_vertex_texture_units: 0,
            max_texture_size: 0,
            max_cube_map_texture_size: 0,
            max_color_render_targets: 1,
        }
    }
}
