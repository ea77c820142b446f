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

use std::collections::HashMap;

use vesta_core::renderer::*;

use super::caps::probe_adapter;
use super::context::WgpuGraphicsContext;
use super::conversions::{self, query_feature, texture_format, IntoWgpu};

const LOG_TARGET: &str = "vesta::wgpu";

/// wgpu caps every query set at this many queries.
const MAX_QUERIES_PER_SET: u32 = 4096;

/// The explicit, asynchronous backend.
///
/// Submissions complete on the GPU timeline. wgpu reports completion through
/// `on_submitted_work_done` callbacks, which feed this backend's own
/// [`SubmissionTimeline`]. Shaders and pipelines are compiled by the layer
/// above, so only their ids are tracked here.
pub struct WgpuBackend {
    context: WgpuGraphicsContext,
    buffers: HashMap<BufferId, wgpu::Buffer>,
    textures: HashMap<TextureId, wgpu::Texture>,
    samplers: HashMap<SamplerId, wgpu::Sampler>,
    query_sets: HashMap<QueryPoolId, wgpu::QuerySet>,
    swapchains: HashMap<SwapchainId, wgpu::Texture>,
    timeline: SubmissionTimeline,
}

impl WgpuBackend {
    /// Wraps an initialized graphics context.
    pub fn new(context: WgpuGraphicsContext) -> Self {
        Self {
            context,
            buffers: HashMap::new(),
            textures: HashMap::new(),
            samplers: HashMap::new(),
            query_sets: HashMap::new(),
            swapchains: HashMap::new(),
            timeline: SubmissionTimeline::new(),
        }
    }

    /// Opens the preferred adapter and wraps it.
    pub fn create_default() -> anyhow::Result<Self> {
        let context = WgpuGraphicsContext::new_blocking(wgpu::PowerPreference::HighPerformance)?;
        Ok(Self::new(context))
    }

    pub fn context(&self) -> &WgpuGraphicsContext {
        &self.context
    }

    /// The native buffer behind `id`, for command encoding.
    pub fn buffer(&self, id: BufferId) -> Option<&wgpu::Buffer> {
        self.buffers.get(&id)
    }

    /// The native texture behind `id`, for command encoding.
    pub fn texture(&self, id: TextureId) -> Option<&wgpu::Texture> {
        self.textures.get(&id)
    }

    fn wgpu_format(format: Format) -> Result<wgpu::TextureFormat, ResourceError> {
        texture_format(format).ok_or_else(|| {
            ResourceError::Unsupported(format!("{} has no wgpu equivalent", format.name()))
        })
    }

    /// Runs `create` inside validation and out-of-memory error scopes.
    ///
    /// wgpu reports invalid descriptors asynchronously; popping the scopes
    /// turns them into a creation error instead of a handle to an invalid
    /// object.
    fn scoped<T>(
        &self,
        what: &str,
        create: impl FnOnce(&wgpu::Device) -> T,
    ) -> Result<T, ResourceError> {
        let device = &self.context.device;
        let out_of_memory = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let created = create(device);
        let validation_error = pollster::block_on(validation.pop());
        let memory_error = pollster::block_on(out_of_memory.pop());

        match validation_error.or(memory_error) {
            None => Ok(created),
            Some(err) => {
                log::error!(target: LOG_TARGET, "Failed to create {what}: {err}");
                Err(ResourceError::BackendError(format!("{what}: {err}")))
            }
        }
    }

    fn poll_device(&self, poll_type: wgpu::PollType) {
        if let Err(e) = self.context.device.poll(poll_type) {
            log::warn!(target: LOG_TARGET, "Failed to poll device: {:?}", e);
        }
    }
}

impl NativeContext for WgpuBackend {
    fn backend_type(&self) -> GraphicsBackendType {
        conversions::backend_type(self.context.adapter_info.backend)
    }

    fn execution_model(&self) -> ExecutionModel {
        ExecutionModel::ExplicitAsync
    }

    fn initialize(
        &mut self,
        state_cache: &mut GpuStateCache,
        caps: &mut CapabilityTable,
    ) -> Result<DeviceInfo, RenderError> {
        probe_adapter(
            &self.context.adapter,
            self.context.active_device_features,
            &self.context.device_limits,
            caps,
        );
        let limits = *caps.limits();
        state_cache.initialize(
            limits.max_texture_units as usize,
            limits.max_vertex_attributes as usize,
        );

        let info = &self.context.adapter_info;
        let device_info = DeviceInfo {
            device_name: format!("wgpu ({:?})", info.backend),
            backend_type: self.backend_type(),
            renderer: info.name.clone(),
            vendor: format!("{:#06x}", info.vendor),
            version: format!("{} {}", info.driver, info.driver_info)
                .trim()
                .to_string(),
        };
        log::info!(
            target: LOG_TARGET,
            "wgpu device initialized on \"{}\" ({:?}).",
            info.name,
            info.device_type
        );
        let compressed: Vec<_> = caps.compressed_formats().iter().map(|f| f.name()).collect();
        log::info!(target: LOG_TARGET, "COMPRESSED_FORMATS: {}", compressed.join(" "));
        Ok(device_info)
    }

    fn present(&mut self, swapchain: SwapchainId) -> Result<(), RenderError> {
        if self.swapchains.contains_key(&swapchain) {
            log::trace!(target: LOG_TARGET, "Presented offscreen {swapchain:?}");
            Ok(())
        } else {
            Err(RenderError::PresentFailed(format!(
                "{swapchain:?} has no backing texture"
            )))
        }
    }

    fn create_buffer(&mut self, id: BufferId, info: &BufferInfo<'_>) -> Result<(), ResourceError> {
        let buffer = self.scoped("buffer", |device| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: info.label.as_deref(),
                size: info.size,
                usage: info.usage.into_wgpu(),
                mapped_at_creation: false,
            })
        })?;
        self.buffers.insert(id, buffer);
        log::debug!(
            target: LOG_TARGET,
            "Created buffer '{}' with ID: {:?}, size: {} bytes",
            info.label.as_deref().unwrap_or_default(),
            id,
            info.size
        );
        Ok(())
    }

    fn create_texture(
        &mut self,
        id: TextureId,
        info: &TextureInfo<'_>,
    ) -> Result<(), ResourceError> {
        let format = Self::wgpu_format(info.format)?;
        let depth_or_array_layers = match info.ty {
            TextureType::Tex3D => info.depth,
            TextureType::Cube => info.layer_count,
            TextureType::Tex2D | TextureType::Tex2DArray => info.layer_count.max(1),
        };
        let texture = self.scoped("texture", |device| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: info.label.as_deref(),
                size: wgpu::Extent3d {
                    width: info.width,
                    height: info.height,
                    depth_or_array_layers,
                },
                mip_level_count: info.mip_levels,
                sample_count: 1,
                dimension: info.ty.into_wgpu(),
                format,
                usage: info.usage.into_wgpu(),
                view_formats: &[],
            })
        })?;
        self.textures.insert(id, texture);
        log::debug!(
            target: LOG_TARGET,
            "Created texture '{}' with ID: {:?}, size: {} bytes (VRAM)",
            info.label.as_deref().unwrap_or_default(),
            id,
            info.byte_size()
        );
        Ok(())
    }

    fn create_sampler(&mut self, id: SamplerId, info: &SamplerInfo) -> Result<(), ResourceError> {
        // Anisotropy is only valid when every filter is linear.
        let anisotropic = info.max_anisotropy > 1
            && [info.min_filter, info.mag_filter, info.mip_filter].contains(&Filter::Anisotropic);
        let (min_filter, mag_filter, mip_filter, anisotropy_clamp) = if anisotropic {
            (
                Filter::Linear,
                Filter::Linear,
                Filter::Linear,
                info.max_anisotropy.min(16) as u16,
            )
        } else {
            (info.min_filter, info.mag_filter, info.mip_filter, 1)
        };

        let sampler = self.scoped("sampler", |device| {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: None,
                address_mode_u: info.address_u.into_wgpu(),
                address_mode_v: info.address_v.into_wgpu(),
                address_mode_w: info.address_w.into_wgpu(),
                mag_filter: mag_filter.into_wgpu(),
                min_filter: min_filter.into_wgpu(),
                mipmap_filter: mip_filter.into_wgpu(),
                lod_min_clamp: 0.0,
                lod_max_clamp: 32.0,
                compare: info.compare.map(|f| f.into_wgpu()),
                anisotropy_clamp,
                border_color: None,
            })
        })?;
        self.samplers.insert(id, sampler);
        Ok(())
    }

    fn create_shader(&mut self, id: ShaderId, info: &ShaderInfo<'_>) -> Result<(), ResourceError> {
        log::debug!(
            target: LOG_TARGET,
            "Registered shader '{}' ({:?}) with {} stage(s)",
            info.name,
            id,
            info.stages.len()
        );
        Ok(())
    }

    fn create_pipeline(
        &mut self,
        id: PipelineId,
        info: &PipelineInfo<'_>,
    ) -> Result<(), ResourceError> {
        for format in info.color_formats.iter().chain(info.depth_format.iter()) {
            Self::wgpu_format(*format)?;
        }
        log::debug!(target: LOG_TARGET, "Registered pipeline {id:?} for {:?}", info.shader);
        Ok(())
    }

    fn create_descriptor_set(
        &mut self,
        _id: DescriptorSetId,
        _info: &DescriptorSetInfo<'_>,
    ) -> Result<(), ResourceError> {
        // Bind groups are built at encode time from the hub's slots.
        Ok(())
    }

    fn create_query_pool(
        &mut self,
        id: QueryPoolId,
        info: &QueryPoolInfo,
    ) -> Result<(), ResourceError> {
        let needed = query_feature(info.ty);
        if !self.context.active_device_features.contains(needed) {
            return Err(ResourceError::Unsupported(format!(
                "{:?} queries need {needed:?}",
                info.ty
            )));
        }
        let count = info.max_query_objects.min(MAX_QUERIES_PER_SET);
        if count < info.max_query_objects {
            log::debug!(
                target: LOG_TARGET,
                "Query pool {id:?} clamped from {} to {count} queries",
                info.max_query_objects
            );
        }
        let query_set = self.scoped("query set", |device| {
            device.create_query_set(&wgpu::QuerySetDescriptor {
                label: Some("vesta query pool"),
                ty: info.ty.into_wgpu(),
                count,
            })
        })?;
        self.query_sets.insert(id, query_set);
        Ok(())
    }

    fn create_swapchain(
        &mut self,
        id: SwapchainId,
        info: &SwapchainInfo<'_>,
    ) -> Result<(), ResourceError> {
        let format = Self::wgpu_format(info.format)?;
        let texture = self.scoped("swapchain image", |device| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: info.label.as_deref(),
                size: wgpu::Extent3d {
                    width: info.width,
                    height: info.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
                view_formats: &[],
            })
        })?;
        self.swapchains.insert(id, texture);
        Ok(())
    }

    fn submit(
        &mut self,
        _queue: QueueId,
        command_buffers: &[CommandBufferId],
        epoch: Epoch,
    ) -> Result<(), RenderError> {
        let stamped = self.timeline.advance();
        if stamped != epoch {
            log::warn!(
                target: LOG_TARGET,
                "Backend epoch {} differs from device epoch {}",
                stamped.0,
                epoch.0
            );
        }

        // Command encoding happens above this layer; the submission marks the
        // point on the queue timeline the epoch stands for.
        let encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("vesta submission"),
            });
        self.context.queue.submit(std::iter::once(encoder.finish()));

        let signal = self.timeline.signal();
        self.context
            .queue
            .on_submitted_work_done(move || signal.signal(stamped));
        log::trace!(
            target: LOG_TARGET,
            "Submitted {} command buffer(s) as epoch {}",
            command_buffers.len(),
            stamped.0
        );
        Ok(())
    }

    fn poll_completed(&mut self) -> Epoch {
        self.poll_device(wgpu::PollType::Poll);
        self.timeline.poll()
    }

    fn wait_idle(&mut self) {
        self.poll_device(wgpu::PollType::wait_indefinitely());
        if self.timeline.poll() < self.timeline.last_submitted() {
            log::warn!(target: LOG_TARGET, "Device idle before every completion callback ran.");
            self.timeline.complete_all();
        }
    }

    fn release(&mut self, object: RetiredObject) {
        match object.object {
            GpuObject::Buffer(id) => {
                if let Some(buffer) = self.buffers.remove(&id) {
                    buffer.destroy();
                }
            }
            GpuObject::Texture(id) => {
                if let Some(texture) = self.textures.remove(&id) {
                    texture.destroy();
                }
            }
            GpuObject::Sampler(id) => {
                self.samplers.remove(&id);
            }
            GpuObject::QueryPool(id) => {
                self.query_sets.remove(&id);
            }
            GpuObject::Swapchain(id) => {
                if let Some(texture) = self.swapchains.remove(&id) {
                    texture.destroy();
                }
            }
            _ => {}
        }
        log::trace!(target: LOG_TARGET, "Released {:?}", object.object);
    }

    fn shutdown(&mut self) {
        let remaining = self.buffers.len()
            + self.textures.len()
            + self.samplers.len()
            + self.query_sets.len()
            + self.swapchains.len();
        if remaining > 0 {
            log::warn!(
                target: LOG_TARGET,
                "{remaining} wgpu object(s) still alive at shutdown, dropping them."
            );
        }
        self.buffers.clear();
        self.textures.clear();
        self.samplers.clear();
        self.query_sets.clear();
        self.swapchains.clear();
        self.poll_device(wgpu::PollType::wait_indefinitely());
        log::info!(target: LOG_TARGET, "wgpu device destroyed.");
    }
}
