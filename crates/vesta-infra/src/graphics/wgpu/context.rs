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

use anyhow::anyhow;
use anyhow::Result;
use wgpu::{Features, Instance};

/// Features requested when the adapter offers them.
fn optional_features() -> Features {
    Features::TEXTURE_COMPRESSION_BC
        | Features::TEXTURE_COMPRESSION_ETC2
        | Features::TEXTURE_COMPRESSION_ASTC
        | Features::TIMESTAMP_QUERY
}

/// Holds the core wgpu state objects: adapter, logical device and queue.
///
/// The device renders offscreen, so no surface is involved.
#[derive(Debug)]
pub struct WgpuGraphicsContext {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,

    // Store info for easy access
    pub adapter_info: wgpu::AdapterInfo,
    pub active_device_features: wgpu::Features,
    pub device_limits: wgpu::Limits,
}

impl WgpuGraphicsContext {
    /// Selects an adapter and opens a logical device on it.
    ///
    /// ## Arguments
    /// * `power_preference` - Which adapter to favor when several are present.
    ///
    /// ## Returns
    /// * `Result<Self>` - The initialized context, or an error if no adapter
    ///   or device could be obtained.
    pub async fn new(power_preference: wgpu::PowerPreference) -> Result<Self> {
        log::info!(target: "vesta::wgpu", "Initializing wgpu graphics context...");

        // --- 1. Select Adapter ---
        let instance = Instance::new(wgpu::InstanceDescriptor::new_without_display_handle());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("Failed to find a suitable adapter: {}", e))?;

        let adapter_info = adapter.get_info();
        log::info!(
            target: "vesta::wgpu",
            "Using graphics adapter: \"{}\" (Backend: {:?})",
            adapter_info.name,
            adapter_info.backend
        );

        // --- 2. Create Logical Device and Command Queue from Adapter ---
        let features_to_enable = adapter.features() & optional_features();
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Vesta Logical Device"),
                required_features: features_to_enable,
                required_limits: adapter.limits(),
                ..Default::default()
            })
            .await
            .map_err(|e| anyhow!("Failed to create logical device: {}", e))?;

        device.on_uncaptured_error(std::sync::Arc::new(|e| {
            log::error!(target: "vesta::wgpu", "wgpu uncaptured error: {e:?}");
        }));

        let active_device_features = device.features();
        let device_limits = device.limits();
        log::debug!(target: "vesta::wgpu", "Active device features: {active_device_features:?}");

        Ok(Self {
            adapter,
            device,
            queue,
            adapter_info,
            active_device_features,
            device_limits,
        })
    }

    /// Blocking variant of [`WgpuGraphicsContext::new`].
    pub fn new_blocking(power_preference: wgpu::PowerPreference) -> Result<Self> {
        pollster::block_on(Self::new(power_preference))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}
