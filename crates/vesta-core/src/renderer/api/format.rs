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

//! Texel formats and per-format capability bits.

use crate::vesta_bitflags;

vesta_bitflags! {
    /// What a backend can do with a given [`Format`].
    pub struct FormatFeature: u32 {
        /// The format can be a color or depth render target.
        const RENDER_TARGET = 1 << 0;
        /// The format can be sampled from a shader.
        const SAMPLED_TEXTURE = 1 << 1;
        /// Sampling the format supports linear filtering.
        const LINEAR_FILTER = 1 << 2;
        /// The format can feed a vertex attribute.
        const VERTEX_ATTRIBUTE = 1 << 3;
    }
}

impl FormatFeature {
    /// Render target, sampled texture and linear filtering together.
    pub const COMPLETE: FormatFeature = FormatFeature::RENDER_TARGET
        .union(FormatFeature::SAMPLED_TEXTURE)
        .union(FormatFeature::LINEAR_FILTER);
}

macro_rules! define_formats {
    ($($name:ident => ($bytes:expr, $block_w:expr, $block_h:expr),)*) => {
        /// Texel and vertex-attribute formats known to the device layer.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Format {
            $(
                #[doc = concat!("`", stringify!($name), "` format.")]
                $name,
            )*
        }

        impl Format {
            /// Every format, in declaration order.
            pub const ALL: &'static [Format] = &[$(Format::$name,)*];

            /// Number of formats, used to size per-format tables.
            pub const COUNT: usize = Format::ALL.len();

            /// Bytes per block and the block footprint in texels.
            pub const fn block_info(self) -> (u32, u32, u32) {
                match self {
                    $(Format::$name => ($bytes, $block_w, $block_h),)*
                }
            }

            /// Stable name used in log lines.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Format::$name => stringify!($name),)*
                }
            }
        }
    };
}

define_formats! {
    R8 => (1, 1, 1),
    Rg8 => (2, 1, 1),
    Rgb8 => (3, 1, 1),
    Rgba8 => (4, 1, 1),
    Srgb8 => (3, 1, 1),
    Srgb8A8 => (4, 1, 1),
    R5G6B5 => (2, 1, 1),
    Rgba4 => (2, 1, 1),
    Rgb5A1 => (2, 1, 1),

    R8Sint => (1, 1, 1),
    Rg8Sint => (2, 1, 1),
    Rgb8Sint => (3, 1, 1),
    Rgba8Sint => (4, 1, 1),
    R8Uint => (1, 1, 1),
    Rg8Uint => (2, 1, 1),
    Rgb8Uint => (3, 1, 1),
    Rgba8Uint => (4, 1, 1),
    R16Sint => (2, 1, 1),
    Rg16Sint => (4, 1, 1),
    Rgb16Sint => (6, 1, 1),
    Rgba16Sint => (8, 1, 1),
    R16Uint => (2, 1, 1),
    Rg16Uint => (4, 1, 1),
    Rgb16Uint => (6, 1, 1),
    Rgba16Uint => (8, 1, 1),

    R16Float => (2, 1, 1),
    Rg16Float => (4, 1, 1),
    Rgb16Float => (6, 1, 1),
    Rgba16Float => (8, 1, 1),
    R32Float => (4, 1, 1),
    Rg32Float => (8, 1, 1),
    Rgb32Float => (12, 1, 1),
    Rgba32Float => (16, 1, 1),

    Depth => (4, 1, 1),
    DepthStencil => (4, 1, 1),

    EtcRgb8 => (8, 4, 4),
    PvrtcRgb2 => (8, 8, 4),
    PvrtcRgba2 => (8, 8, 4),
    PvrtcRgb4 => (8, 4, 4),
    PvrtcRgba4 => (8, 4, 4),
    Bc1Rgba => (8, 4, 4),
    Bc3Rgba => (16, 4, 4),

    AstcRgba4x4 => (16, 4, 4),
    AstcRgba5x4 => (16, 5, 4),
    AstcRgba5x5 => (16, 5, 5),
    AstcRgba6x5 => (16, 6, 5),
    AstcRgba6x6 => (16, 6, 6),
    AstcRgba8x5 => (16, 8, 5),
    AstcRgba8x6 => (16, 8, 6),
    AstcRgba8x8 => (16, 8, 8),
    AstcRgba10x5 => (16, 10, 5),
    AstcRgba10x6 => (16, 10, 6),
    AstcRgba10x8 => (16, 10, 8),
    AstcRgba10x10 => (16, 10, 10),
    AstcRgba12x10 => (16, 12, 10),
    AstcRgba12x12 => (16, 12, 12),

    AstcSrgba4x4 => (16, 4, 4),
    AstcSrgba5x4 => (16, 5, 4),
    AstcSrgba5x5 => (16, 5, 5),
    AstcSrgba6x5 => (16, 6, 5),
    AstcSrgba6x6 => (16, 6, 6),
    AstcSrgba8x5 => (16, 8, 5),
    AstcSrgba8x6 => (16, 8, 6),
    AstcSrgba8x8 => (16, 8, 8),
    AstcSrgba10x5 => (16, 10, 5),
    AstcSrgba10x6 => (16, 10, 6),
    AstcSrgba10x8 => (16, 10, 8),
    AstcSrgba10x10 => (16, 10, 10),
    AstcSrgba12x10 => (16, 12, 10),
    AstcSrgba12x12 => (16, 12, 12),
}

impl Format {
    /// All 8/16-bit signed and unsigned integer formats.
    pub const INTEGER: &'static [Format] = &[
        Format::R8Sint,
        Format::Rg8Sint,
        Format::Rgb8Sint,
        Format::Rgba8Sint,
        Format::R8Uint,
        Format::Rg8Uint,
        Format::Rgb8Uint,
        Format::Rgba8Uint,
        Format::R16Sint,
        Format::Rg16Sint,
        Format::Rgb16Sint,
        Format::Rgba16Sint,
        Format::R16Uint,
        Format::Rg16Uint,
        Format::Rgb16Uint,
        Format::Rgba16Uint,
    ];

    /// ASTC linear-color formats, smallest block first.
    pub const ASTC: &'static [Format] = &[
        Format::AstcRgba4x4,
        Format::AstcRgba5x4,
        Format::AstcRgba5x5,
        Format::AstcRgba6x5,
        Format::AstcRgba6x6,
        Format::AstcRgba8x5,
        Format::AstcRgba8x6,
        Format::AstcRgba8x8,
        Format::AstcRgba10x5,
        Format::AstcRgba10x6,
        Format::AstcRgba10x8,
        Format::AstcRgba10x10,
        Format::AstcRgba12x10,
        Format::AstcRgba12x12,
    ];

    /// ASTC sRGB formats, in the same order as [`Format::ASTC`].
    pub const ASTC_SRGB: &'static [Format] = &[
        Format::AstcSrgba4x4,
        Format::AstcSrgba5x4,
        Format::AstcSrgba5x5,
        Format::AstcSrgba6x5,
        Format::AstcSrgba6x6,
        Format::AstcSrgba8x5,
        Format::AstcSrgba8x6,
        Format::AstcSrgba8x8,
        Format::AstcSrgba10x5,
        Format::AstcSrgba10x6,
        Format::AstcSrgba10x8,
        Format::AstcSrgba10x10,
        Format::AstcSrgba12x10,
        Format::AstcSrgba12x12,
    ];

    /// PVRTC formats.
    pub const PVRTC: &'static [Format] = &[
        Format::PvrtcRgb2,
        Format::PvrtcRgba2,
        Format::PvrtcRgb4,
        Format::PvrtcRgba4,
    ];

    /// Position of the format in per-format tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// `true` for block-compressed formats.
    pub const fn is_compressed(self) -> bool {
        let (_, w, h) = self.block_info();
        w > 1 || h > 1
    }

    /// `true` for depth and depth/stencil formats.
    pub const fn is_depth(self) -> bool {
        matches!(self, Format::Depth | Format::DepthStencil)
    }

    /// Size in bytes of a texture of this format, summed over `mip_levels`.
    ///
    /// Block-compressed levels round up to whole blocks.
    pub fn texture_size(self, width: u32, height: u32, depth: u32, mip_levels: u32) -> u64 {
        let (block_bytes, block_w, block_h) = self.block_info();
        let mut total = 0u64;
        let (mut w, mut h, mut d) = (width.max(1), height.max(1), depth.max(1));
        for _ in 0..mip_levels.max(1) {
            let blocks_x = w.div_ceil(block_w) as u64;
            let blocks_y = h.div_ceil(block_h) as u64;
            total += blocks_x * blocks_y * d as u64 * block_bytes as u64;
            w = (w / 2).max(1);
            h = (h / 2).max(1);
            d = (d / 2).max(1);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_dense_and_ordered() {
        for (i, format) in Format::ALL.iter().enumerate() {
            assert_eq!(format.index(), i, "{} out of place", format.name());
        }
        assert_eq!(Format::COUNT, Format::ALL.len());
    }

    #[test]
    fn complete_mask_has_three_bits() {
        assert!(FormatFeature::COMPLETE.contains(FormatFeature::RENDER_TARGET));
        assert!(FormatFeature::COMPLETE.contains(FormatFeature::SAMPLED_TEXTURE));
        assert!(FormatFeature::COMPLETE.contains(FormatFeature::LINEAR_FILTER));
        assert!(!FormatFeature::COMPLETE.contains(FormatFeature::VERTEX_ATTRIBUTE));
    }

    #[test]
    fn uncompressed_size_covers_the_mip_chain() {
        // 4x4 RGBA8 with 3 levels: 64 + 16 + 4 bytes.
        assert_eq!(Format::Rgba8.texture_size(4, 4, 1, 3), 84);
    }

    #[test]
    fn compressed_size_rounds_up_to_blocks() {
        assert!(Format::AstcRgba6x6.is_compressed());
        // 10x10 with 6x6 blocks needs 2x2 blocks of 16 bytes.
        assert_eq!(Format::AstcRgba6x6.texture_size(10, 10, 1, 1), 64);
        assert!(!Format::Rgb8.is_compressed());
    }

    #[test]
    fn astc_groups_are_parallel() {
        assert_eq!(Format::ASTC.len(), Format::ASTC_SRGB.len());
        for (linear, srgb) in Format::ASTC.iter().zip(Format::ASTC_SRGB) {
            assert_eq!(linear.block_info(), srgb.block_info());
        }
    }
}
