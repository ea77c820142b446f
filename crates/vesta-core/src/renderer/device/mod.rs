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

//! The [`Device`]: lifecycle, framing and submission.
//!
//! Resource creation and destruction live in the `factory` submodule,
//! descriptor and bind-state updates in `binding`.

mod binding;
mod factory;

use std::collections::HashMap;

use crate::renderer::api::*;
use crate::renderer::caps::CapabilityTable;
use crate::renderer::descriptor_hub::DescriptorHub;
use crate::renderer::error::{IntegrityViolation, RenderError, ResourceError};
use crate::renderer::recycle_bin::{RecycleBin, RetiredObject};
use crate::renderer::state_cache::GpuStateCache;
use crate::renderer::timeline::SubmissionTimeline;
use crate::renderer::traits::NativeContext;

const LOG_TARGET: &str = "vesta::device";

/// Lifecycle state of a [`Device`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceState {
    /// Constructed, backend not yet probed.
    Uninitialized,
    /// Ready for resource creation and submission.
    Initialized,
    /// Torn down. Terminal.
    Destroyed,
}

/// Bookkeeping for a live object.
#[derive(Debug, Clone, Copy)]
struct ObjectRecord {
    size: u64,
    /// Last submitted epoch when the object was created.
    created_after: Epoch,
}

#[derive(Debug, Clone, Copy, Default)]
struct QueueRecord {
    ty: QueueType,
    counters: DrawCounters,
}

#[derive(Debug, Clone, Copy)]
struct CommandBufferRecord {
    ty: CommandBufferType,
    queue: QueueId,
    counters: DrawCounters,
}

/// One graphics device over one native backend.
///
/// The device is explicitly owned. Every mutation takes `&mut self`, so there
/// is a single writer and no internal locking. GPU completion may still be
/// reported from other threads through the backend's completion channel.
pub struct Device {
    context: Box<dyn NativeContext + Send>,
    settings: DeviceSettings,
    state: DeviceState,
    info: DeviceInfo,

    caps: CapabilityTable,
    state_cache: GpuStateCache,
    hub: DescriptorHub,
    bin: RecycleBin,
    /// Hands out epochs and holds the completed watermark. Backends signal
    /// their own timelines; their reports reach this one only through
    /// `complete_through`, so its completion channel stays empty.
    timeline: SubmissionTimeline,

    objects: HashMap<GpuObject, ObjectRecord>,
    queues: HashMap<QueueId, QueueRecord>,
    command_buffers: HashMap<CommandBufferId, CommandBufferRecord>,
    next_id: usize,

    memory: MemoryStatus,
    frame_stats: FrameStats,

    default_queue: Option<QueueId>,
    default_command_buffer: Option<CommandBufferId>,
    default_query_pool: Option<QueryPoolId>,
    swapchains: Vec<SwapchainId>,
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("label", &self.settings.label)
            .field("backend", &self.context.backend_type())
            .field("state", &self.state)
            .field("live_objects", &self.objects.len())
            .field("pending_recycle", &self.bin.len())
            .field("memory", &self.memory)
            .finish_non_exhaustive()
    }
}

impl Device {
    /// Wraps a backend. Nothing is probed until [`Device::initialize`].
    pub fn new(context: Box<dyn NativeContext + Send>, settings: DeviceSettings) -> Self {
        Self {
            context,
            settings,
            state: DeviceState::Uninitialized,
            info: DeviceInfo::default(),
            caps: CapabilityTable::new(),
            state_cache: GpuStateCache::new(),
            hub: DescriptorHub::new(),
            bin: RecycleBin::new(),
            timeline: SubmissionTimeline::new(),
            objects: HashMap::new(),
            queues: HashMap::new(),
            command_buffers: HashMap::new(),
            next_id: 0,
            memory: MemoryStatus::default(),
            frame_stats: FrameStats::default(),
            default_queue: None,
            default_command_buffer: None,
            default_query_pool: None,
            swapchains: Vec::new(),
        }
    }

    /// Probes the backend and creates the default queue, query pool and
    /// primary command buffer.
    ///
    /// On failure everything created so far is released, the device ends up
    /// [`DeviceState::Destroyed`] and the error is returned.
    pub fn initialize(&mut self) -> Result<(), RenderError> {
        match self.state {
            DeviceState::Uninitialized => {}
            DeviceState::Initialized => return Err(RenderError::AlreadyInitialized),
            DeviceState::Destroyed => return Err(RenderError::Destroyed),
        }

        let info = match self
            .context
            .initialize(&mut self.state_cache, &mut self.caps)
        {
            Ok(info) => info,
            Err(err) => {
                log::error!(target: LOG_TARGET, "Backend initialization failed: {err}");
                self.context.shutdown();
                self.state = DeviceState::Destroyed;
                return Err(match err {
                    RenderError::InitializationFailed(_) => err,
                    other => RenderError::InitializationFailed(other.to_string()),
                });
            }
        };
        self.info = info;
        self.state = DeviceState::Initialized;

        if let Err(err) = self.create_defaults() {
            log::error!(target: LOG_TARGET, "Failed to create default objects: {err}");
            self.teardown();
            return Err(RenderError::InitializationFailed(err.to_string()));
        }

        self.log_summary();
        Ok(())
    }

    fn create_defaults(&mut self) -> Result<(), ResourceError> {
        let queue = self.create_queue(&QueueInfo {
            ty: QueueType::Graphics,
        })?;
        self.default_queue = Some(queue);

        let pool = self.create_query_pool(&QueryPoolInfo {
            ty: QueryType::Occlusion,
            max_query_objects: self.settings.max_query_objects,
            force_wait: self.settings.query_pool_force_wait,
        })?;
        self.default_query_pool = Some(pool);

        let cmd = self.create_command_buffer(&CommandBufferInfo {
            ty: CommandBufferType::Primary,
            queue,
            has_agent: false,
        })?;
        self.default_command_buffer = Some(cmd);
        Ok(())
    }

    fn log_summary(&self) {
        log::info!(
            target: LOG_TARGET,
            "{} device initialized ({:?}, {:?})",
            self.info.device_name,
            self.info.backend_type,
            self.context.execution_model()
        );
        log::info!(target: LOG_TARGET, "RENDERER: {}", self.info.renderer);
        log::info!(target: LOG_TARGET, "VENDOR: {}", self.info.vendor);
        log::info!(target: LOG_TARGET, "VERSION: {}", self.info.version);
        let features: Vec<_> = Feature::ALL
            .iter()
            .filter(|f| self.caps.has_feature(**f))
            .collect();
        log::info!(target: LOG_TARGET, "FEATURES: {:?}", features);
        log::debug!(target: LOG_TARGET, "LIMITS: {:?}", self.caps.limits());
    }

    /// Tears the device down. Calling it again is a no-op.
    ///
    /// # Panics
    ///
    /// Panics with [`IntegrityViolation::MemoryLeak`] if buffers or textures
    /// are still alive once the recycle bin has been drained.
    pub fn destroy(&mut self) {
        match self.state {
            DeviceState::Uninitialized => {
                self.context.shutdown();
                self.state = DeviceState::Destroyed;
            }
            DeviceState::Initialized => self.teardown(),
            DeviceState::Destroyed => {}
        }
    }

    /// Reverse-order teardown shared by `destroy`, `Drop` and failed
    /// initialization.
    fn teardown(&mut self) {
        if let Some(cmd) = self.default_command_buffer.take() {
            if let Err(err) = self.destroy_command_buffer(cmd) {
                log::warn!(target: LOG_TARGET, "Default command buffer: {err}");
            }
        }
        if let Some(pool) = self.default_query_pool.take() {
            if let Err(err) = self.destroy_query_pool(pool) {
                log::warn!(target: LOG_TARGET, "Default query pool: {err}");
            }
        }
        if let Some(queue) = self.default_queue.take() {
            if let Err(err) = self.destroy_queue(queue) {
                log::warn!(target: LOG_TARGET, "Default queue: {err}");
            }
        }
        self.swapchains.clear();

        self.context.wait_idle();
        self.timeline.complete_all();
        let drained = {
            let Self {
                bin,
                hub,
                context,
                memory,
                state_cache,
                ..
            } = self;
            bin.drain_all(hub, |object| {
                Self::free(context.as_mut(), memory, state_cache, object)
            })
        };
        log::debug!(target: LOG_TARGET, "Drained {drained} recycled objects at teardown");

        let leak = self.memory;
        self.state = DeviceState::Destroyed;

        if !leak.is_empty() {
            let violation = IntegrityViolation::MemoryLeak {
                buffer_bytes: leak.buffer_size,
                texture_bytes: leak.texture_size,
            };
            log::error!(target: LOG_TARGET, "FATAL: {violation}");
            if std::thread::panicking() {
                return;
            }
            panic!("{violation}");
        }

        for (object, _) in self.objects.drain() {
            log::warn!(target: LOG_TARGET, "{object:?} still alive at teardown, releasing");
            self.context.release(RetiredObject { object, size: 0 });
        }
        self.queues.clear();
        self.command_buffers.clear();
        self.hub.clear();
        self.state_cache.reset();
        self.context.shutdown();
        log::info!(target: LOG_TARGET, "Device '{}' destroyed", self.settings.label);
    }

    /// Final release of a retired object.
    fn free(
        context: &mut dyn NativeContext,
        memory: &mut MemoryStatus,
        state_cache: &mut GpuStateCache,
        retired: RetiredObject,
    ) {
        match retired.object {
            GpuObject::Buffer(_) => {
                memory.buffer_size = memory.buffer_size.saturating_sub(retired.size);
            }
            GpuObject::Texture(id) => {
                memory.texture_size = memory.texture_size.saturating_sub(retired.size);
                state_cache.unbind_texture(id);
            }
            _ => {}
        }
        context.release(retired);
    }

    /// Makes the backend context current on the calling thread, or releases it.
    pub fn bind_context(&mut self, bound: bool) -> Result<(), RenderError> {
        self.ensure_initialized()?;
        self.context.bind_context(bound);
        Ok(())
    }

    /// Runs the backend's pre-acquire hook, then makes `swapchains` the set
    /// presented by the next [`Device::present`].
    pub fn acquire(&mut self, swapchains: &[SwapchainId]) -> Result<(), RenderError> {
        self.ensure_initialized()?;
        for &id in swapchains {
            if !self.objects.contains_key(&GpuObject::Swapchain(id)) {
                return Err(ResourceError::NotFound(GpuObject::Swapchain(id)).into());
            }
        }
        self.context.acquire(swapchains)?;
        self.swapchains = swapchains.to_vec();
        Ok(())
    }

    /// Ends the frame.
    ///
    /// Copies the default queue's counters into the frame statistics, presents
    /// every active swapchain, resets the counters, advances the frame number
    /// and polls the recycle bin. A present failure is returned after the
    /// frame bookkeeping is done.
    pub fn present(&mut self) -> Result<(), RenderError> {
        self.ensure_initialized()?;

        let counters = self
            .default_queue
            .and_then(|queue| self.queues.get(&queue))
            .map(|record| record.counters)
            .unwrap_or_default();
        self.frame_stats.draw_calls = counters.draw_calls;
        self.frame_stats.instances = counters.instances;
        self.frame_stats.triangles = counters.triangles;

        let mut result = Ok(());
        for &swapchain in &self.swapchains {
            if let Err(err) = self.context.present(swapchain) {
                log::error!(target: LOG_TARGET, "Present of {swapchain:?} failed: {err}");
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }

        if let Some(record) = self
            .default_queue
            .and_then(|queue| self.queues.get_mut(&queue))
        {
            record.counters.take();
        }
        self.frame_stats.frame_number += 1;
        self.poll();
        result
    }

    /// Submits primary command buffers to `queue`.
    ///
    /// Each command buffer's draw counters move into the queue's counters.
    /// Returns the epoch stamped on the submission.
    pub fn submit(
        &mut self,
        queue: QueueId,
        command_buffers: &[CommandBufferId],
    ) -> Result<Epoch, RenderError> {
        self.ensure_initialized()?;
        if !self.queues.contains_key(&queue) {
            return Err(ResourceError::NotFound(GpuObject::Queue(queue)).into());
        }
        for &cmd in command_buffers {
            let record = self
                .command_buffers
                .get(&cmd)
                .ok_or(ResourceError::NotFound(GpuObject::CommandBuffer(cmd)))?;
            if record.ty != CommandBufferType::Primary {
                return Err(ResourceError::NotSubmittable(cmd).into());
            }
        }

        let epoch = self.timeline.peek_next();
        self.context.submit(queue, command_buffers, epoch)?;
        self.timeline.advance();

        let mut merged = DrawCounters::default();
        for cmd in command_buffers {
            if let Some(record) = self.command_buffers.get_mut(cmd) {
                merged.accumulate(record.counters.take());
            }
        }
        if let Some(record) = self.queues.get_mut(&queue) {
            record.counters.accumulate(merged);
        }
        log::trace!(
            target: LOG_TARGET,
            "Submitted {} command buffers to {:?} as epoch {}",
            command_buffers.len(),
            queue,
            epoch.0
        );
        Ok(epoch)
    }

    /// Counts a draw recorded into `command_buffer`.
    pub fn record_draw(
        &mut self,
        command_buffer: CommandBufferId,
        draw: DrawInfo,
    ) -> Result<(), ResourceError> {
        self.ensure_ready()?;
        let record = self
            .command_buffers
            .get_mut(&command_buffer)
            .ok_or(ResourceError::NotFound(GpuObject::CommandBuffer(command_buffer)))?;
        record.counters.accumulate(DrawCounters {
            draw_calls: 1,
            instances: draw.instance_count.max(1),
            triangles: draw.triangle_count(),
        });
        Ok(())
    }

    /// Records secondary command buffers into a primary one.
    ///
    /// The secondaries' counters move into the primary.
    pub fn execute_secondary(
        &mut self,
        primary: CommandBufferId,
        secondaries: &[CommandBufferId],
    ) -> Result<(), ResourceError> {
        self.ensure_ready()?;
        match self.command_buffers.get(&primary) {
            Some(record) if record.ty == CommandBufferType::Primary => {}
            Some(_) => {
                return Err(ResourceError::InvalidDescriptor(format!(
                    "{primary:?} is secondary and cannot execute other command buffers"
                )))
            }
            None => return Err(ResourceError::NotFound(GpuObject::CommandBuffer(primary))),
        }
        for &cmd in secondaries {
            match self.command_buffers.get(&cmd) {
                Some(record) if record.ty == CommandBufferType::Secondary => {}
                Some(_) => {
                    return Err(ResourceError::InvalidDescriptor(format!(
                        "{cmd:?} is primary and cannot be executed inside another command buffer"
                    )))
                }
                None => return Err(ResourceError::NotFound(GpuObject::CommandBuffer(cmd))),
            }
        }

        self.context.execute_secondary(primary, secondaries)?;

        let mut merged = DrawCounters::default();
        for cmd in secondaries {
            if let Some(record) = self.command_buffers.get_mut(cmd) {
                merged.accumulate(record.counters.take());
            }
        }
        if let Some(record) = self.command_buffers.get_mut(&primary) {
            record.counters.accumulate(merged);
        }
        Ok(())
    }

    /// Collects completed epochs from the backend and releases every recycle
    /// entry they cover. Returns the completed watermark.
    pub fn poll(&mut self) -> Epoch {
        if self.state != DeviceState::Initialized {
            return self.timeline.completed();
        }
        let reported = self.context.poll_completed();
        let completed = self.timeline.complete_through(reported);

        let Self {
            bin,
            hub,
            context,
            memory,
            state_cache,
            ..
        } = self;
        let released = bin.release_completed(completed, hub, |object| {
            Self::free(context.as_mut(), memory, state_cache, object)
        });
        if released > 0 {
            log::debug!(
                target: LOG_TARGET,
                "Released {released} recycled objects up to epoch {}",
                completed.0
            );
        }
        completed
    }

    fn ensure_initialized(&self) -> Result<(), RenderError> {
        match self.state {
            DeviceState::Initialized => Ok(()),
            DeviceState::Uninitialized => Err(RenderError::NotInitialized),
            DeviceState::Destroyed => Err(RenderError::Destroyed),
        }
    }

    fn ensure_ready(&self) -> Result<(), ResourceError> {
        match self.state {
            DeviceState::Initialized => Ok(()),
            _ => Err(ResourceError::DeviceNotReady),
        }
    }

    // --- Queries ---

    /// Current lifecycle state.
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Identity strings reported by the backend.
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// The settings the device was created with.
    pub fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    /// The normalized capability table.
    pub fn caps(&self) -> &CapabilityTable {
        &self.caps
    }

    /// The API behind the device.
    pub fn backend_type(&self) -> GraphicsBackendType {
        self.context.backend_type()
    }

    /// The backend's execution model.
    pub fn execution_model(&self) -> ExecutionModel {
        self.context.execution_model()
    }

    /// `true` if `feature` is available.
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.caps.has_feature(feature)
    }

    /// Capability mask of `format`.
    pub fn format_features(&self, format: Format) -> FormatFeature {
        self.caps.format_features(format)
    }

    /// `true` if `format` cannot be sampled while it is being rendered to.
    pub fn is_texture_exclusive(&self, format: Format) -> bool {
        self.caps.is_texture_exclusive(format)
    }

    /// `true` if queues accept submissions from several threads.
    pub fn supports_multithreaded_submission(&self) -> bool {
        self.caps.supports_multithreaded_submission()
    }

    /// Bytes held by live buffers and textures, recycled ones included.
    pub fn memory_status(&self) -> MemoryStatus {
        self.memory
    }

    /// Counters of the last presented frame.
    pub fn frame_stats(&self) -> FrameStats {
        self.frame_stats
    }

    /// The queue created at initialization.
    pub fn default_queue(&self) -> Option<QueueId> {
        self.default_queue
    }

    /// The primary command buffer created at initialization.
    pub fn default_command_buffer(&self) -> Option<CommandBufferId> {
        self.default_command_buffer
    }

    /// The occlusion query pool created at initialization.
    pub fn default_query_pool(&self) -> Option<QueryPoolId> {
        self.default_query_pool
    }

    /// Swapchains presented by the next [`Device::present`].
    pub fn active_swapchains(&self) -> &[SwapchainId] {
        &self.swapchains
    }

    /// Draw counters pending on `queue` since the last present.
    pub fn queue_counters(&self, queue: QueueId) -> Option<DrawCounters> {
        self.queues.get(&queue).map(|record| record.counters)
    }

    /// The kind of work `queue` accepts.
    pub fn queue_type(&self, queue: QueueId) -> Option<QueueType> {
        self.queues.get(&queue).map(|record| record.ty)
    }

    /// The resolved type of a command buffer.
    pub fn command_buffer_type(&self, command_buffer: CommandBufferId) -> Option<CommandBufferType> {
        self.command_buffers
            .get(&command_buffer)
            .map(|record| record.ty)
    }

    /// Queue a command buffer was created for.
    pub fn command_buffer_queue(&self, command_buffer: CommandBufferId) -> Option<QueueId> {
        self.command_buffers
            .get(&command_buffer)
            .map(|record| record.queue)
    }

    /// `true` if `object` was created and not yet destroyed.
    pub fn is_alive(&self, object: GpuObject) -> bool {
        self.objects.contains_key(&object)
    }

    /// Number of live objects, all kinds together.
    pub fn live_object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of destroyed objects still waiting in the recycle bin.
    pub fn pending_recycle_count(&self) -> usize {
        self.bin.len()
    }

    /// The most recent submission epoch.
    pub fn last_submitted_epoch(&self) -> Epoch {
        self.timeline.last_submitted()
    }

    /// Every epoch at or below this one is complete.
    pub fn completed_epoch(&self) -> Epoch {
        self.timeline.completed()
    }

    /// Read-only view of the descriptor references.
    pub fn descriptor_hub(&self) -> &DescriptorHub {
        &self.hub
    }

    /// Read-only view of the bind-state cache.
    pub fn state_cache(&self) -> &GpuStateCache {
        &self.state_cache
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        if self.state == DeviceState::Destroyed {
            return;
        }
        log::debug!(target: LOG_TARGET, "Device dropped without destroy(), tearing down");
        self.destroy();
    }
}
