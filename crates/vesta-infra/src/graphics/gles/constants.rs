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

//! Backend-only switches derived from the extension list.

use std::fmt;

use vesta_core::renderer::ExtensionSet;

/// How the driver exposes reading the current framebuffer in a shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramebufferFetchLevel {
    /// Not available.
    #[default]
    None,
    /// `GL_EXT_shader_framebuffer_fetch_non_coherent`.
    NonCoherentExt,
    /// `GL_QCOM_shader_framebuffer_fetch_noncoherent`.
    NonCoherentQcom,
    /// `GL_EXT_shader_framebuffer_fetch`.
    Coherent,
}

impl FramebufferFetchLevel {
    /// Picks the level advertised by `extensions`.
    ///
    /// A non-coherent extension wins over the coherent one when both are
    /// listed. The ARM variant is ignored because it does not support MRT.
    pub fn detect(extensions: &ExtensionSet) -> Self {
        if !extensions.contains("framebuffer_fetch") {
            return Self::None;
        }
        match extensions.find("framebuffer_fetch_non") {
            Some("GL_EXT_shader_framebuffer_fetch_non_coherent") => Self::NonCoherentExt,
            Some("GL_QCOM_shader_framebuffer_fetch_noncoherent") => Self::NonCoherentQcom,
            Some(_) => Self::None,
            None if extensions.contains("GL_EXT_shader_framebuffer_fetch") => Self::Coherent,
            None => Self::None,
        }
    }
}

impl fmt::Display for FramebufferFetchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "NONE",
            Self::NonCoherentExt => "NON_COHERENT_EXT",
            Self::NonCoherentQcom => "NON_COHERENT_QCOM",
            Self::Coherent => "COHERENT",
        })
    }
}

/// Support for rendering into a single-sampled texture through an implicit
/// multisampled attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum MsrtLevel {
    /// Not available.
    #[default]
    None,
    /// `multisampled_render_to_texture`.
    Level1,
    /// `multisampled_render_to_texture2`, which also covers MRT.
    Level2,
}

impl MsrtLevel {
    /// Picks the level advertised by `extensions`.
    pub fn detect(extensions: &ExtensionSet) -> Self {
        if extensions.contains("multisampled_render_to_texture2") {
            Self::Level2
        } else if extensions.contains("multisampled_render_to_texture") {
            Self::Level1
        } else {
            Self::None
        }
    }
}

/// Code paths the GL backend takes depending on the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlesConstantRegistry {
    pub use_vao: bool,
    pub use_draw_instanced: bool,
    pub use_instanced_arrays: bool,
    pub use_discard_framebuffer: bool,
    pub framebuffer_fetch: FramebufferFetchLevel,
    pub msrt: MsrtLevel,
}

impl GlesConstantRegistry {
    /// Reads every switch from the extension list.
    pub fn detect(extensions: &ExtensionSet) -> Self {
        let framebuffer_fetch = if cfg!(target_os = "windows") {
            // Emulators on this platform report the extension without honoring it.
            FramebufferFetchLevel::None
        } else {
            FramebufferFetchLevel::detect(extensions)
        };
        Self {
            use_vao: extensions.contains("vertex_array_object"),
            use_draw_instanced: extensions.contains("draw_instanced"),
            use_instanced_arrays: extensions.contains("instanced_arrays"),
            use_discard_framebuffer: extensions.contains("discard_framebuffer"),
            framebuffer_fetch,
            msrt: MsrtLevel::detect(extensions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_coherent_fetch_takes_precedence() {
        let ext = ExtensionSet::parse(
            "GL_EXT_shader_framebuffer_fetch GL_EXT_shader_framebuffer_fetch_non_coherent",
        );
        assert_eq!(
            FramebufferFetchLevel::detect(&ext),
            FramebufferFetchLevel::NonCoherentExt
        );

        let qcom = ExtensionSet::parse("GL_QCOM_shader_framebuffer_fetch_noncoherent");
        assert_eq!(
            FramebufferFetchLevel::detect(&qcom),
            FramebufferFetchLevel::NonCoherentQcom
        );
    }

    #[test]
    fn coherent_fetch_requires_the_ext_variant() {
        let ext = ExtensionSet::parse("GL_EXT_shader_framebuffer_fetch");
        assert_eq!(FramebufferFetchLevel::detect(&ext), FramebufferFetchLevel::Coherent);

        let arm = ExtensionSet::parse("GL_ARM_shader_framebuffer_fetch");
        assert_eq!(FramebufferFetchLevel::detect(&arm), FramebufferFetchLevel::None);
        assert_eq!(FramebufferFetchLevel::None.to_string(), "NONE");
    }

    #[test]
    fn msrt_level_two_implies_level_one_string() {
        let both = ExtensionSet::parse(
            "GL_EXT_multisampled_render_to_texture GL_EXT_multisampled_render_to_texture2",
        );
        assert_eq!(MsrtLevel::detect(&both), MsrtLevel::Level2);
        let one = ExtensionSet::parse("GL_EXT_multisampled_render_to_texture");
        assert_eq!(MsrtLevel::detect(&one), MsrtLevel::Level1);
        assert_eq!(MsrtLevel::detect(&ExtensionSet::default()), MsrtLevel::None);
    }

    #[test]
    fn registry_reads_code_path_switches() {
        let ext = ExtensionSet::parse("GL_OES_vertex_array_object GL_EXT_discard_framebuffer");
        let registry = GlesConstantRegistry::detect(&ext);
        assert!(registry.use_vao);
        assert!(registry.use_discard_framebuffer);
        assert!(!registry.use_instanced_arrays);
        assert!(!registry.use_draw_instanced);
    }
}
