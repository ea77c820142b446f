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

use wgpu::{AstcBlock, AstcChannel};

use vesta_core::renderer::{
    Address, BufferUsage, ComparisonFunc, Filter, Format, GraphicsBackendType, QueryType,
    TextureType, TextureUsage,
};

/// A local extension trait to convert device-layer types into wgpu types.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_wgpu()` syntax.
pub trait IntoWgpu<T> {
    /// Consumes self and converts it into a wgpu-compatible type.
    fn into_wgpu(self) -> T;
}

// --- Formats ---

/// The wgpu texture format for `format`, if wgpu has one.
///
/// Three-channel and packed 16-bit formats have no wgpu equivalent. PVRTC is
/// not exposed by wgpu either.
pub fn texture_format(format: Format) -> Option<wgpu::TextureFormat> {
    use wgpu::TextureFormat as T;
    let mapped = match format {
        Format::R8 => T::R8Unorm,
        Format::Rg8 => T::Rg8Unorm,
        Format::Rgba8 => T::Rgba8Unorm,
        Format::Srgb8A8 => T::Rgba8UnormSrgb,

        Format::R8Sint => T::R8Sint,
        Format::Rg8Sint => T::Rg8Sint,
        Format::Rgba8Sint => T::Rgba8Sint,
        Format::R8Uint => T::R8Uint,
        Format::Rg8Uint => T::Rg8Uint,
        Format::Rgba8Uint => T::Rgba8Uint,
        Format::R16Sint => T::R16Sint,
        Format::Rg16Sint => T::Rg16Sint,
        Format::Rgba16Sint => T::Rgba16Sint,
        Format::R16Uint => T::R16Uint,
        Format::Rg16Uint => T::Rg16Uint,
        Format::Rgba16Uint => T::Rgba16Uint,

        Format::R16Float => T::R16Float,
        Format::Rg16Float => T::Rg16Float,
        Format::Rgba16Float => T::Rgba16Float,
        Format::R32Float => T::R32Float,
        Format::Rg32Float => T::Rg32Float,
        Format::Rgba32Float => T::Rgba32Float,

        Format::Depth => T::Depth32Float,
        Format::DepthStencil => T::Depth24PlusStencil8,

        // ETC1 data decodes as ETC2 RGB8.
        Format::EtcRgb8 => T::Etc2Rgb8Unorm,
        Format::Bc1Rgba => T::Bc1RgbaUnorm,
        Format::Bc3Rgba => T::Bc3RgbaUnorm,

        other => {
            if let Some(block) = astc_block(other) {
                let channel = if Format::ASTC_SRGB.contains(&other) {
                    AstcChannel::UnormSrgb
                } else {
                    AstcChannel::Unorm
                };
                T::Astc { block, channel }
            } else {
                return None;
            }
        }
    };
    Some(mapped)
}

fn astc_block(format: Format) -> Option<AstcBlock> {
    const BLOCKS: [AstcBlock; 14] = [
        AstcBlock::B4x4,
        AstcBlock::B5x4,
        AstcBlock::B5x5,
        AstcBlock::B6x5,
        AstcBlock::B6x6,
        AstcBlock::B8x5,
        AstcBlock::B8x6,
        AstcBlock::B8x8,
        AstcBlock::B10x5,
        AstcBlock::B10x6,
        AstcBlock::B10x8,
        AstcBlock::B10x10,
        AstcBlock::B12x10,
        AstcBlock::B12x12,
    ];
    Format::ASTC
        .iter()
        .position(|f| *f == format)
        .or_else(|| Format::ASTC_SRGB.iter().position(|f| *f == format))
        .map(|i| BLOCKS[i])
}

/// The vertex format reading `format` as a vertex attribute, if any.
pub fn vertex_format(format: Format) -> Option<wgpu::VertexFormat> {
    use wgpu::VertexFormat as V;
    Some(match format {
        Format::Rg8 => V::Unorm8x2,
        Format::Rgba8 => V::Unorm8x4,
        Format::Rg8Sint => V::Sint8x2,
        Format::Rgba8Sint => V::Sint8x4,
        Format::Rg8Uint => V::Uint8x2,
        Format::Rgba8Uint => V::Uint8x4,
        Format::Rg16Sint => V::Sint16x2,
        Format::Rgba16Sint => V::Sint16x4,
        Format::Rg16Uint => V::Uint16x2,
        Format::Rgba16Uint => V::Uint16x4,
        Format::Rg16Float => V::Float16x2,
        Format::Rgba16Float => V::Float16x4,
        Format::R32Float => V::Float32,
        Format::Rg32Float => V::Float32x2,
        Format::Rgb32Float => V::Float32x3,
        Format::Rgba32Float => V::Float32x4,
        _ => return None,
    })
}

/// The adapter feature a compressed format needs, if any.
pub fn required_feature(format: Format) -> wgpu::Features {
    match format {
        Format::EtcRgb8 => wgpu::Features::TEXTURE_COMPRESSION_ETC2,
        Format::Bc1Rgba | Format::Bc3Rgba => wgpu::Features::TEXTURE_COMPRESSION_BC,
        f if astc_block(f).is_some() => wgpu::Features::TEXTURE_COMPRESSION_ASTC,
        _ => wgpu::Features::empty(),
    }
}

// --- Usages ---

impl IntoWgpu<wgpu::BufferUsages> for BufferUsage {
    fn into_wgpu(self) -> wgpu::BufferUsages {
        let pairs = [
            (BufferUsage::VERTEX, wgpu::BufferUsages::VERTEX),
            (BufferUsage::INDEX, wgpu::BufferUsages::INDEX),
            (BufferUsage::UNIFORM, wgpu::BufferUsages::UNIFORM),
            (BufferUsage::STORAGE, wgpu::BufferUsages::STORAGE),
            (BufferUsage::INDIRECT, wgpu::BufferUsages::INDIRECT),
            (BufferUsage::COPY_SRC, wgpu::BufferUsages::COPY_SRC),
            (BufferUsage::COPY_DST, wgpu::BufferUsages::COPY_DST),
        ];
        // Uploads always go through the queue.
        let mut usages = wgpu::BufferUsages::COPY_DST;
        for (ours, theirs) in pairs {
            if self.contains(ours) {
                usages |= theirs;
            }
        }
        usages
    }
}

impl IntoWgpu<wgpu::TextureUsages> for TextureUsage {
    fn into_wgpu(self) -> wgpu::TextureUsages {
        let mut usages = wgpu::TextureUsages::COPY_DST;
        if self.contains(TextureUsage::SAMPLED) {
            usages |= wgpu::TextureUsages::TEXTURE_BINDING;
        }
        if self.intersects(TextureUsage::COLOR_ATTACHMENT.union(TextureUsage::DEPTH_STENCIL_ATTACHMENT))
        {
            usages |= wgpu::TextureUsages::RENDER_ATTACHMENT;
        }
        if self.contains(TextureUsage::COPY_SRC) {
            usages |= wgpu::TextureUsages::COPY_SRC;
        }
        usages
    }
}

impl IntoWgpu<wgpu::TextureDimension> for TextureType {
    fn into_wgpu(self) -> wgpu::TextureDimension {
        match self {
            TextureType::Tex2D | TextureType::Tex2DArray | TextureType::Cube => {
                wgpu::TextureDimension::D2
            }
            TextureType::Tex3D => wgpu::TextureDimension::D3,
        }
    }
}

// --- Sampling ---

impl IntoWgpu<wgpu::FilterMode> for Filter {
    fn into_wgpu(self) -> wgpu::FilterMode {
        match self {
            Filter::None | Filter::Point => wgpu::FilterMode::Nearest,
            Filter::Linear | Filter::Anisotropic => wgpu::FilterMode::Linear,
        }
    }
}

impl IntoWgpu<wgpu::MipmapFilterMode> for Filter {
    fn into_wgpu(self) -> wgpu::MipmapFilterMode {
        match self {
            Filter::None | Filter::Point => wgpu::MipmapFilterMode::Nearest,
            Filter::Linear | Filter::Anisotropic => wgpu::MipmapFilterMode::Linear,
        }
    }
}

impl IntoWgpu<wgpu::AddressMode> for Address {
    fn into_wgpu(self) -> wgpu::AddressMode {
        match self {
            Address::Wrap => wgpu::AddressMode::Repeat,
            Address::Mirror => wgpu::AddressMode::MirrorRepeat,
            // Border colors need an optional feature; edge clamping is the
            // closest core behavior.
            Address::Clamp | Address::Border => wgpu::AddressMode::ClampToEdge,
        }
    }
}

impl IntoWgpu<wgpu::CompareFunction> for ComparisonFunc {
    fn into_wgpu(self) -> wgpu::CompareFunction {
        match self {
            ComparisonFunc::Never => wgpu::CompareFunction::Never,
            ComparisonFunc::Less => wgpu::CompareFunction::Less,
            ComparisonFunc::Equal => wgpu::CompareFunction::Equal,
            ComparisonFunc::LessEqual => wgpu::CompareFunction::LessEqual,
            ComparisonFunc::Greater => wgpu::CompareFunction::Greater,
            ComparisonFunc::NotEqual => wgpu::CompareFunction::NotEqual,
            ComparisonFunc::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
            ComparisonFunc::Always => wgpu::CompareFunction::Always,
        }
    }
}

// --- Queries and backends ---

/// The feature a query type needs beyond core wgpu.
pub fn query_feature(ty: QueryType) -> wgpu::Features {
    match ty {
        QueryType::Occlusion => wgpu::Features::empty(),
        QueryType::PipelineStatistics => wgpu::Features::PIPELINE_STATISTICS_QUERY,
        QueryType::Timestamp => wgpu::Features::TIMESTAMP_QUERY,
    }
}

impl IntoWgpu<wgpu::QueryType> for QueryType {
    fn into_wgpu(self) -> wgpu::QueryType {
        match self {
            QueryType::Occlusion => wgpu::QueryType::Occlusion,
            QueryType::PipelineStatistics => wgpu::QueryType::PipelineStatistics(
                wgpu::PipelineStatisticsTypes::VERTEX_SHADER_INVOCATIONS
                    | wgpu::PipelineStatisticsTypes::FRAGMENT_SHADER_INVOCATIONS,
            ),
            QueryType::Timestamp => wgpu::QueryType::Timestamp,
        }
    }
}

/// Converts a wgpu backend into the device-layer enum.
pub fn backend_type(backend: wgpu::Backend) -> GraphicsBackendType {
    match backend {
        wgpu::Backend::Vulkan => GraphicsBackendType::Vulkan,
        wgpu::Backend::Metal => GraphicsBackendType::Metal,
        wgpu::Backend::Dx12 => GraphicsBackendType::Dx12,
        wgpu::Backend::Gl => GraphicsBackendType::OpenGL,
        wgpu::Backend::BrowserWebGpu => GraphicsBackendType::WebGpu,
        _ => GraphicsBackendType::Unknown,
    }
}
