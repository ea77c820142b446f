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

use crate::renderer::api::*;
use crate::renderer::caps::CapabilityTable;
use crate::renderer::error::{RenderError, ResourceError};
use crate::renderer::recycle_bin::RetiredObject;
use crate::renderer::state_cache::GpuStateCache;

/// A native graphics backend as seen by the [`Device`](crate::renderer::Device).
///
/// The device owns all bookkeeping (ids, memory counters, descriptor
/// references, deferred destruction). The backend only allocates, frees and
/// executes. Ids are chosen by the device and are unique across all object
/// kinds for the lifetime of the device.
pub trait NativeContext: Send {
    /// The API behind this context.
    fn backend_type(&self) -> GraphicsBackendType;

    /// Whether destruction must wait for the GPU timeline.
    fn execution_model(&self) -> ExecutionModel;

    /// Connects to the driver and probes its capabilities. Called exactly once.
    ///
    /// ## Arguments
    /// * `state_cache` - The cache to size for the backend's units and attributes.
    /// * `caps` - An empty table for the backend to fill.
    /// ## Returns
    /// The identity strings of the device.
    /// ## Errors
    /// * `RenderError::InitializationFailed` - If the driver cannot be used.
    fn initialize(
        &mut self,
        state_cache: &mut GpuStateCache,
        caps: &mut CapabilityTable,
    ) -> Result<DeviceInfo, RenderError>;

    /// Makes the backend context current on the calling thread, or releases it.
    fn bind_context(&mut self, _bound: bool) {}

    /// Hook run before the active swapchains are replaced.
    fn acquire(&mut self, _swapchains: &[SwapchainId]) -> Result<(), RenderError> {
        Ok(())
    }

    /// Presents one swapchain.
    fn present(&mut self, swapchain: SwapchainId) -> Result<(), RenderError>;

    /// Allocates a buffer.
    fn create_buffer(&mut self, id: BufferId, info: &BufferInfo<'_>) -> Result<(), ResourceError>;

    /// Allocates a texture.
    fn create_texture(&mut self, id: TextureId, info: &TextureInfo<'_>)
        -> Result<(), ResourceError>;

    /// Allocates a sampler.
    fn create_sampler(&mut self, id: SamplerId, info: &SamplerInfo) -> Result<(), ResourceError>;

    /// Builds a shader program. Compilation details belong to the backend.
    fn create_shader(&mut self, id: ShaderId, info: &ShaderInfo<'_>) -> Result<(), ResourceError>;

    /// Builds a pipeline state object.
    fn create_pipeline(
        &mut self,
        id: PipelineId,
        info: &PipelineInfo<'_>,
    ) -> Result<(), ResourceError>;

    /// Allocates a descriptor set. Its slots start empty.
    fn create_descriptor_set(
        &mut self,
        id: DescriptorSetId,
        info: &DescriptorSetInfo<'_>,
    ) -> Result<(), ResourceError>;

    /// Creates a queue. Backends with a single implicit queue accept any number.
    fn create_queue(&mut self, _id: QueueId, _info: &QueueInfo) -> Result<(), ResourceError> {
        Ok(())
    }

    /// Creates a command buffer of the type resolved by the factory.
    fn create_command_buffer(
        &mut self,
        _id: CommandBufferId,
        _ty: CommandBufferType,
        _info: &CommandBufferInfo,
    ) -> Result<(), ResourceError> {
        Ok(())
    }

    /// Creates a query pool.
    fn create_query_pool(
        &mut self,
        id: QueryPoolId,
        info: &QueryPoolInfo,
    ) -> Result<(), ResourceError>;

    /// Creates a swapchain.
    fn create_swapchain(
        &mut self,
        id: SwapchainId,
        info: &SwapchainInfo<'_>,
    ) -> Result<(), ResourceError>;

    /// Updates one descriptor slot. `None` empties it.
    fn write_descriptor(
        &mut self,
        _set: DescriptorSetId,
        _binding: u32,
        _resource: Option<BoundResource>,
    ) {
    }

    /// Binds a texture to a unit. Only called when the binding changes.
    fn bind_texture_unit(&mut self, _unit: u32, _texture: Option<TextureId>) {}

    /// Enables or disables a vertex attribute. Only called on change.
    fn set_vertex_attribute(&mut self, _location: u32, _enabled: bool) {}

    /// Records `secondaries` into `primary`.
    fn execute_secondary(
        &mut self,
        _primary: CommandBufferId,
        _secondaries: &[CommandBufferId],
    ) -> Result<(), ResourceError> {
        Ok(())
    }

    /// Submits primary command buffers, stamped with `epoch`.
    ///
    /// ## Errors
    /// * `RenderError::SubmissionFailed` - If nothing was submitted. The epoch
    ///   is then reused for the next submission.
    fn submit(
        &mut self,
        queue: QueueId,
        command_buffers: &[CommandBufferId],
        epoch: Epoch,
    ) -> Result<(), RenderError>;

    /// The newest epoch such that it and every epoch before it completed.
    fn poll_completed(&mut self) -> Epoch;

    /// Blocks until all submitted work completed. Only used during teardown.
    fn wait_idle(&mut self) {}

    /// Frees a retired object. The object is never referenced again.
    fn release(&mut self, object: RetiredObject);

    /// Disconnects from the driver. Called exactly once, last.
    fn shutdown(&mut self);
}
