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

//! A recording backend shared by the integration tests.

#![allow(dead_code)]

use std::borrow::Cow;
use std::sync::{Arc, Mutex, MutexGuard};

use vesta_core::renderer::*;

/// Everything the fake backend saw, shared with the test body.
#[derive(Debug, Default)]
pub struct FakeState {
    pub created: Vec<GpuObject>,
    pub released: Vec<GpuObject>,
    pub descriptor_writes: Vec<(DescriptorSetId, u32, Option<BoundResource>)>,
    pub texture_unit_binds: Vec<(u32, Option<TextureId>)>,
    pub submissions: Vec<(QueueId, Vec<CommandBufferId>, Epoch)>,
    pub acquires: usize,
    pub presents: Vec<SwapchainId>,
    pub fail_initialize: bool,
    pub fail_next_create: bool,
    pub fail_query_pool: bool,
    pub fail_submit: bool,
    pub shutdown_calls: usize,
    pub timeline: SubmissionTimeline,
}

/// Test-side view of the fake backend.
#[derive(Debug, Clone, Default)]
pub struct FakeHandle(Arc<Mutex<FakeState>>);

impl FakeHandle {
    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.0.lock().unwrap()
    }

    /// Reports `epoch` complete as a GPU callback would.
    pub fn signal(&self, epoch: Epoch) {
        let signal = self.state().timeline.signal();
        signal.signal(epoch);
    }

    pub fn completion_signal(&self) -> CompletionSignal {
        self.state().timeline.signal()
    }

    pub fn was_released(&self, object: GpuObject) -> bool {
        self.state().released.contains(&object)
    }
}

/// A backend that allocates nothing and records every call.
pub struct FakeContext {
    model: ExecutionModel,
    state: Arc<Mutex<FakeState>>,
}

impl FakeContext {
    pub fn new(model: ExecutionModel) -> (Self, FakeHandle) {
        let handle = FakeHandle::default();
        (
            Self {
                model,
                state: handle.0.clone(),
            },
            handle,
        )
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn record_create(&mut self, object: GpuObject) -> Result<(), ResourceError> {
        let mut state = self.state();
        if state.fail_next_create {
            state.fail_next_create = false;
            return Err(ResourceError::BackendError("out of memory".to_string()));
        }
        state.created.push(object);
        Ok(())
    }
}

impl NativeContext for FakeContext {
    fn backend_type(&self) -> GraphicsBackendType {
        match self.model {
            ExecutionModel::Immediate => GraphicsBackendType::Gles2,
            ExecutionModel::ExplicitAsync => GraphicsBackendType::Vulkan,
        }
    }

    fn execution_model(&self) -> ExecutionModel {
        self.model
    }

    fn initialize(
        &mut self,
        state_cache: &mut GpuStateCache,
        caps: &mut CapabilityTable,
    ) -> Result<DeviceInfo, RenderError> {
        if self.state().fail_initialize {
            return Err(RenderError::InitializationFailed(
                "no display".to_string(),
            ));
        }
        caps.add_format_features_all(
            &[Format::Rgba8, Format::Rgb8, Format::Srgb8A8],
            FormatFeature::COMPLETE,
        );
        caps.add_format_features(Format::Depth, FormatFeature::RENDER_TARGET);
        caps.add_format_features(Format::R8, FormatFeature::SAMPLED_TEXTURE);
        caps.enable_feature(Feature::ElementIndexUint);
        caps.set_limits(Limits {
            max_vertex_attributes: 16,
            max_vertex_uniform_vectors: 256,
            max_fragment_uniform_vectors: 224,
            max_texture_units: 8,
            max_vertex_texture_units: 4,
            max_texture_size: 4096,
            max_cube_map_texture_size: 2048,
            max_color_render_targets: 4,
        });
        state_cache.initialize(8, 16);
        Ok(DeviceInfo {
            device_name: "Fake".to_string(),
            backend_type: self.backend_type(),
            renderer: "Recording renderer".to_string(),
            vendor: "Vesta tests".to_string(),
            version: "1.0".to_string(),
        })
    }

    fn acquire(&mut self, _swapchains: &[SwapchainId]) -> Result<(), RenderError> {
        self.state().acquires += 1;
        Ok(())
    }

    fn present(&mut self, swapchain: SwapchainId) -> Result<(), RenderError> {
        self.state().presents.push(swapchain);
        Ok(())
    }

    fn create_buffer(&mut self, id: BufferId, _info: &BufferInfo<'_>) -> Result<(), ResourceError> {
        self.record_create(GpuObject::Buffer(id))
    }

    fn create_texture(
        &mut self,
        id: TextureId,
        _info: &TextureInfo<'_>,
    ) -> Result<(), ResourceError> {
        self.record_create(GpuObject::Texture(id))
    }

    fn create_sampler(&mut self, id: SamplerId, _info: &SamplerInfo) -> Result<(), ResourceError> {
        self.record_create(GpuObject::Sampler(id))
    }

    fn create_shader(&mut self, id: ShaderId, _info: &ShaderInfo<'_>) -> Result<(), ResourceError> {
        self.record_create(GpuObject::Shader(id))
    }

    fn create_pipeline(
        &mut self,
        id: PipelineId,
        _info: &PipelineInfo<'_>,
    ) -> Result<(), ResourceError> {
        self.record_create(GpuObject::Pipeline(id))
    }

    fn create_descriptor_set(
        &mut self,
        id: DescriptorSetId,
        _info: &DescriptorSetInfo<'_>,
    ) -> Result<(), ResourceError> {
        self.record_create(GpuObject::DescriptorSet(id))
    }

    fn create_queue(&mut self, id: QueueId, _info: &QueueInfo) -> Result<(), ResourceError> {
        self.record_create(GpuObject::Queue(id))
    }

    fn create_command_buffer(
        &mut self,
        id: CommandBufferId,
        _ty: CommandBufferType,
        _info: &CommandBufferInfo,
    ) -> Result<(), ResourceError> {
        self.record_create(GpuObject::CommandBuffer(id))
    }

    fn create_query_pool(
        &mut self,
        id: QueryPoolId,
        _info: &QueryPoolInfo,
    ) -> Result<(), ResourceError> {
        if self.state().fail_query_pool {
            return Err(ResourceError::BackendError("no queries".to_string()));
        }
        self.record_create(GpuObject::QueryPool(id))
    }

    fn create_swapchain(
        &mut self,
        id: SwapchainId,
        _info: &SwapchainInfo<'_>,
    ) -> Result<(), ResourceError> {
        self.record_create(GpuObject::Swapchain(id))
    }

    fn write_descriptor(
        &mut self,
        set: DescriptorSetId,
        binding: u32,
        resource: Option<BoundResource>,
    ) {
        self.state().descriptor_writes.push((set, binding, resource));
    }

    fn bind_texture_unit(&mut self, unit: u32, texture: Option<TextureId>) {
        self.state().texture_unit_binds.push((unit, texture));
    }

    fn submit(
        &mut self,
        queue: QueueId,
        command_buffers: &[CommandBufferId],
        epoch: Epoch,
    ) -> Result<(), RenderError> {
        let mut state = self.state();
        if state.fail_submit {
            return Err(RenderError::SubmissionFailed("device lost".to_string()));
        }
        let advanced = state.timeline.advance();
        assert_eq!(advanced, epoch, "device and backend epochs diverged");
        state
            .submissions
            .push((queue, command_buffers.to_vec(), epoch));
        Ok(())
    }

    fn poll_completed(&mut self) -> Epoch {
        let mut state = self.state();
        match self.model {
            ExecutionModel::Immediate => state.timeline.last_submitted(),
            ExecutionModel::ExplicitAsync => state.timeline.poll(),
        }
    }

    fn wait_idle(&mut self) {
        self.state().timeline.complete_all();
    }

    fn release(&mut self, object: RetiredObject) {
        self.state().released.push(object.object);
    }

    fn shutdown(&mut self) {
        self.state().shutdown_calls += 1;
    }
}

/// An initialized device over a fresh fake backend.
pub fn device(model: ExecutionModel) -> (Device, FakeHandle) {
    let (context, handle) = FakeContext::new(model);
    let mut device = Device::new(Box::new(context), DeviceSettings::default());
    device.initialize().expect("fake backend always initializes");
    (device, handle)
}

pub fn buffer_info(size: u64) -> BufferInfo<'static> {
    BufferInfo {
        label: Some(Cow::Borrowed("test buffer")),
        size,
        stride: 0,
        usage: BufferUsage::UNIFORM,
    }
}

pub fn texture_info(width: u32, height: u32) -> TextureInfo<'static> {
    TextureInfo {
        label: None,
        ty: TextureType::Tex2D,
        usage: TextureUsage::SAMPLED,
        format: Format::Rgba8,
        width,
        height,
        depth: 1,
        layer_count: 1,
        mip_levels: 1,
    }
}

/// A set with a uniform buffer at 0, a texture at 1 and a sampler at 2.
pub fn material_set(device: &mut Device) -> DescriptorSetId {
    device
        .create_descriptor_set(&DescriptorSetInfo {
            label: Some(Cow::Borrowed("material")),
            bindings: vec![
                DescriptorBinding {
                    binding: 0,
                    ty: DescriptorType::UniformBuffer,
                },
                DescriptorBinding {
                    binding: 1,
                    ty: DescriptorType::SampledTexture,
                },
                DescriptorBinding {
                    binding: 2,
                    ty: DescriptorType::Sampler,
                },
            ],
        })
        .unwrap()
}
