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

//! Typed resource ids and the immutable descriptors passed to the factory.

use std::borrow::Cow;

use crate::renderer::api::format::Format;
use crate::vesta_bitflags;

/// An opaque handle to a GPU buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub usize);

/// An opaque handle to a GPU texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);

/// An opaque handle to a sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SamplerId(pub usize);

/// An opaque handle to a shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub usize);

/// An opaque handle to a pipeline state object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipelineId(pub usize);

/// An opaque handle to a descriptor set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorSetId(pub usize);

/// An opaque handle to a submission queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueueId(pub usize);

/// An opaque handle to a command buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandBufferId(pub usize);

/// An opaque handle to a query pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryPoolId(pub usize);

/// An opaque handle to a swapchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SwapchainId(pub usize);

/// Any backend object the device hands to the recycle path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuObject {
    /// A buffer.
    Buffer(BufferId),
    /// A texture.
    Texture(TextureId),
    /// A sampler.
    Sampler(SamplerId),
    /// A shader program.
    Shader(ShaderId),
    /// A pipeline state object.
    Pipeline(PipelineId),
    /// A descriptor set.
    DescriptorSet(DescriptorSetId),
    /// A queue.
    Queue(QueueId),
    /// A command buffer.
    CommandBuffer(CommandBufferId),
    /// A query pool.
    QueryPool(QueryPoolId),
    /// A swapchain.
    Swapchain(SwapchainId),
}

/// The subset of objects a descriptor set can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BoundResource {
    /// A uniform or storage buffer.
    Buffer(BufferId),
    /// A sampled texture.
    Texture(TextureId),
    /// A sampler.
    Sampler(SamplerId),
}

impl From<BoundResource> for GpuObject {
    fn from(resource: BoundResource) -> Self {
        match resource {
            BoundResource::Buffer(id) => GpuObject::Buffer(id),
            BoundResource::Texture(id) => GpuObject::Texture(id),
            BoundResource::Sampler(id) => GpuObject::Sampler(id),
        }
    }
}

impl GpuObject {
    /// The descriptor-bindable view of this object, if it has one.
    pub fn as_bound(&self) -> Option<BoundResource> {
        match *self {
            GpuObject::Buffer(id) => Some(BoundResource::Buffer(id)),
            GpuObject::Texture(id) => Some(BoundResource::Texture(id)),
            GpuObject::Sampler(id) => Some(BoundResource::Sampler(id)),
            _ => None,
        }
    }
}

vesta_bitflags! {
    /// Allowed usages of a buffer.
    pub struct BufferUsage: u32 {
        /// Vertex data.
        const VERTEX = 1 << 0;
        /// Index data.
        const INDEX = 1 << 1;
        /// Uniform block.
        const UNIFORM = 1 << 2;
        /// Shader storage.
        const STORAGE = 1 << 3;
        /// Indirect draw arguments.
        const INDIRECT = 1 << 4;
        /// Source of a copy.
        const COPY_SRC = 1 << 5;
        /// Destination of a copy.
        const COPY_DST = 1 << 6;
    }
}

/// Describes a buffer to create.
#[derive(Debug, Clone)]
pub struct BufferInfo<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Size in bytes; must be non-zero.
    pub size: u64,
    /// Element stride in bytes, `0` when not applicable.
    pub stride: u32,
    /// How the buffer will be used.
    pub usage: BufferUsage,
}

vesta_bitflags! {
    /// Allowed usages of a texture.
    pub struct TextureUsage: u32 {
        /// Sampled from shaders.
        const SAMPLED = 1 << 0;
        /// Color attachment of a render pass.
        const COLOR_ATTACHMENT = 1 << 1;
        /// Depth/stencil attachment of a render pass.
        const DEPTH_STENCIL_ATTACHMENT = 1 << 2;
        /// Source of a copy.
        const COPY_SRC = 1 << 3;
        /// Destination of a copy.
        const COPY_DST = 1 << 4;
    }
}

/// Dimensionality of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureType {
    /// A 2D texture.
    #[default]
    Tex2D,
    /// An array of 2D textures.
    Tex2DArray,
    /// A cube map (six 2D faces).
    Cube,
    /// A volume texture.
    Tex3D,
}

/// Describes a texture to create.
#[derive(Debug, Clone)]
pub struct TextureInfo<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Dimensionality.
    pub ty: TextureType,
    /// How the texture will be used.
    pub usage: TextureUsage,
    /// Texel format.
    pub format: Format,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Depth in texels (3D textures only).
    pub depth: u32,
    /// Array layers (six for cube maps).
    pub layer_count: u32,
    /// Mip levels, at least one.
    pub mip_levels: u32,
}

impl TextureInfo<'_> {
    /// Bytes the texture occupies, over all layers and mips.
    pub fn byte_size(&self) -> u64 {
        self.format
            .texture_size(self.width, self.height, self.depth, self.mip_levels)
            * self.layer_count.max(1) as u64
    }
}

/// Texel filter used by a sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Filter {
    /// No filtering (only meaningful for mips).
    None,
    /// Nearest texel.
    Point,
    /// Linear interpolation.
    #[default]
    Linear,
    /// Anisotropic filtering.
    Anisotropic,
}

/// How out-of-range coordinates are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Address {
    /// Repeat the texture.
    #[default]
    Wrap,
    /// Repeat with mirroring.
    Mirror,
    /// Clamp to the edge texel.
    Clamp,
    /// Use the border color.
    Border,
}

/// A depth-compare function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonFunc {
    /// Never passes.
    Never,
    /// Passes if less.
    Less,
    /// Passes if equal.
    Equal,
    /// Passes if less or equal.
    LessEqual,
    /// Passes if greater.
    Greater,
    /// Passes if not equal.
    NotEqual,
    /// Passes if greater or equal.
    GreaterEqual,
    /// Always passes.
    Always,
}

/// Describes a sampler to create.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerInfo {
    /// Minification filter.
    pub min_filter: Filter,
    /// Magnification filter.
    pub mag_filter: Filter,
    /// Mip filter.
    pub mip_filter: Filter,
    /// U address mode.
    pub address_u: Address,
    /// V address mode.
    pub address_v: Address,
    /// W address mode.
    pub address_w: Address,
    /// Maximum anisotropy, used with [`Filter::Anisotropic`].
    pub max_anisotropy: u32,
    /// Depth-compare function for shadow samplers.
    pub compare: Option<ComparisonFunc>,
    /// Border color for [`Address::Border`].
    pub border_color: [f32; 4],
    /// Bias applied to the computed mip level.
    pub mip_lod_bias: f32,
}

impl Default for SamplerInfo {
    fn default() -> Self {
        Self {
            min_filter: Filter::Linear,
            mag_filter: Filter::Linear,
            mip_filter: Filter::None,
            address_u: Address::Wrap,
            address_v: Address::Wrap,
            address_w: Address::Wrap,
            max_anisotropy: 0,
            compare: None,
            border_color: [0.0; 4],
            mip_lod_bias: 0.0,
        }
    }
}

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage.
    Vertex,
    /// Fragment stage.
    Fragment,
    /// Compute stage.
    Compute,
}

/// Source for one shader stage. Compilation is the backend's business.
#[derive(Debug, Clone)]
pub struct ShaderStageSource<'a> {
    /// The stage.
    pub stage: ShaderStage,
    /// Backend-specific source text.
    pub source: Cow<'a, str>,
}

/// Describes a shader program to create.
#[derive(Debug, Clone)]
pub struct ShaderInfo<'a> {
    /// Program name, used in logs.
    pub name: Cow<'a, str>,
    /// One entry per stage; must not be empty.
    pub stages: Vec<ShaderStageSource<'a>>,
}

/// Which kind of work a pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PipelineBindPoint {
    /// Rasterization.
    #[default]
    Graphics,
    /// Compute dispatch.
    Compute,
}

/// Describes a pipeline state object to create.
#[derive(Debug, Clone)]
pub struct PipelineInfo<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Program the pipeline runs.
    pub shader: ShaderId,
    /// Graphics or compute.
    pub bind_point: PipelineBindPoint,
    /// Color target formats; each must be renderable.
    pub color_formats: Vec<Format>,
    /// Depth target format, if any.
    pub depth_format: Option<Format>,
}

/// The resource kind a descriptor slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorType {
    /// A uniform buffer.
    UniformBuffer,
    /// A storage buffer.
    StorageBuffer,
    /// A sampled texture.
    SampledTexture,
    /// A sampler.
    Sampler,
}

impl DescriptorType {
    /// `true` if `resource` may occupy a slot of this type.
    pub fn accepts(&self, resource: BoundResource) -> bool {
        matches!(
            (self, resource),
            (
                DescriptorType::UniformBuffer | DescriptorType::StorageBuffer,
                BoundResource::Buffer(_)
            ) | (DescriptorType::SampledTexture, BoundResource::Texture(_))
                | (DescriptorType::Sampler, BoundResource::Sampler(_))
        )
    }
}

/// One slot of a descriptor set layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorBinding {
    /// Binding index.
    pub binding: u32,
    /// Accepted resource kind.
    pub ty: DescriptorType,
}

/// Describes a descriptor set to create.
#[derive(Debug, Clone)]
pub struct DescriptorSetInfo<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Slots of the set; binding indices must be unique.
    pub bindings: Vec<DescriptorBinding>,
}

/// The kind of work a queue accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QueueType {
    /// Graphics, compute and transfer.
    #[default]
    Graphics,
    /// Compute and transfer.
    Compute,
    /// Transfer only.
    Transfer,
}

/// Describes a queue to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueInfo {
    /// Queue kind.
    pub ty: QueueType,
}

/// Primary command buffers are submitted to a queue; secondary ones are
/// executed into a primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandBufferType {
    /// Directly submittable.
    #[default]
    Primary,
    /// Must be recorded into a primary.
    Secondary,
}

/// Describes a command buffer to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandBufferInfo {
    /// Requested type; may be promoted to primary by the factory.
    pub ty: CommandBufferType,
    /// Queue the command buffer will be submitted to.
    pub queue: QueueId,
    /// The caller records through an indirection agent (e.g. a recording
    /// thread proxy). Agent-backed command buffers are always primary.
    pub has_agent: bool,
}

impl CommandBufferInfo {
    /// The type the factory actually creates.
    pub fn resolved_type(&self) -> CommandBufferType {
        if self.has_agent || self.ty == CommandBufferType::Primary {
            CommandBufferType::Primary
        } else {
            CommandBufferType::Secondary
        }
    }
}

/// The kind of query stored in a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QueryType {
    /// Samples-passed occlusion queries.
    #[default]
    Occlusion,
    /// Pipeline statistics.
    PipelineStatistics,
    /// GPU timestamps.
    Timestamp,
}

/// Describes a query pool to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPoolInfo {
    /// Query kind.
    pub ty: QueryType,
    /// Capacity of the pool; must be non-zero.
    pub max_query_objects: u32,
    /// Wait for results when reading them back instead of returning stale data.
    pub force_wait: bool,
}

/// Describes a swapchain to create.
#[derive(Debug, Clone)]
pub struct SwapchainInfo<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Color format of the images; must be renderable.
    pub format: Format,
    /// Synchronize presentation with vertical blank.
    pub vsync: bool,
}

/// Counts describing one recorded draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawInfo {
    /// Non-indexed vertex count.
    pub vertex_count: u32,
    /// Indexed vertex count; takes precedence over `vertex_count` when non-zero.
    pub index_count: u32,
    /// Instance count; `0` is treated as one instance.
    pub instance_count: u32,
}

impl DrawInfo {
    /// Triangles produced by this draw, assuming a triangle list.
    pub fn triangle_count(&self) -> u32 {
        let vertices = if self.index_count > 0 {
            self.index_count
        } else {
            self.vertex_count
        };
        (vertices / 3).saturating_mul(self.instance_count.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_types_accept_matching_resources_only() {
        let buffer = BoundResource::Buffer(BufferId(0));
        let texture = BoundResource::Texture(TextureId(0));
        let sampler = BoundResource::Sampler(SamplerId(0));

        assert!(DescriptorType::UniformBuffer.accepts(buffer));
        assert!(DescriptorType::StorageBuffer.accepts(buffer));
        assert!(!DescriptorType::UniformBuffer.accepts(texture));
        assert!(DescriptorType::SampledTexture.accepts(texture));
        assert!(!DescriptorType::SampledTexture.accepts(sampler));
        assert!(DescriptorType::Sampler.accepts(sampler));
    }

    #[test]
    fn triangle_count_prefers_indices_and_scales_by_instances() {
        let draw = DrawInfo {
            vertex_count: 300,
            index_count: 6,
            instance_count: 4,
        };
        assert_eq!(draw.triangle_count(), 8);

        let single = DrawInfo {
            vertex_count: 9,
            ..Default::default()
        };
        assert_eq!(single.triangle_count(), 3);
    }

    #[test]
    fn huge_instanced_draw_saturates_the_triangle_count() {
        let draw = DrawInfo {
            vertex_count: 0,
            index_count: 3_000_000,
            instance_count: 10_000,
        };
        assert_eq!(draw.triangle_count(), u32::MAX);
    }

    #[test]
    fn cube_texture_size_counts_every_face() {
        let info = TextureInfo {
            label: None,
            ty: TextureType::Cube,
            usage: TextureUsage::SAMPLED,
            format: Format::Rgba8,
            width: 2,
            height: 2,
            depth: 1,
            layer_count: 6,
            mip_levels: 1,
        };
        assert_eq!(info.byte_size(), 2 * 2 * 4 * 6);
    }

    #[test]
    fn agent_promotes_command_buffers_to_primary() {
        let mut info = CommandBufferInfo {
            ty: CommandBufferType::Secondary,
            queue: QueueId(0),
            has_agent: false,
        };
        assert_eq!(info.resolved_type(), CommandBufferType::Secondary);
        info.has_agent = true;
        assert_eq!(info.resolved_type(), CommandBufferType::Primary);
        info = CommandBufferInfo {
            ty: CommandBufferType::Primary,
            has_agent: false,
            ..info
        };
        assert_eq!(info.resolved_type(), CommandBufferType::Primary);
    }

    #[test]
    fn only_bindable_objects_have_a_bound_view() {
        assert_eq!(
            GpuObject::Texture(TextureId(3)).as_bound(),
            Some(BoundResource::Texture(TextureId(3)))
        );
        assert_eq!(GpuObject::Shader(ShaderId(3)).as_bound(), None);
    }
}
