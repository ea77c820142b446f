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

//! Runs a short frame loop on the headless GLES driver or on wgpu.
//!
//! Usage: `sandbox [gles|wgpu] [settings.json]`

use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use vesta_core::renderer::*;
use vesta_infra::graphics::gles::{GlesContext, HeadlessGlDriver};
use vesta_infra::graphics::wgpu::WgpuBackend;
use vesta_infra::{init_logging, LogSettings};

const FRAME_COUNT: u32 = 3;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SandboxSettings {
    device: DeviceSettings,
    log: LogSettings,
}

impl SandboxSettings {
    fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Invalid settings in {}", path.display()))
    }
}

fn create_device(backend: &str, settings: DeviceSettings) -> Result<Device> {
    let context: Box<dyn NativeContext + Send> = match backend {
        "gles" => Box::new(GlesContext::new(
            HeadlessGlDriver::new()
                .with_extensions("GL_OES_element_index_uint GL_OES_texture_float GL_EXT_draw_buffers"),
        )),
        "wgpu" => Box::new(WgpuBackend::create_default()?),
        other => anyhow::bail!("Unknown backend '{other}', expected 'gles' or 'wgpu'"),
    };
    let mut device = Device::new(context, settings);
    device.initialize()?;
    Ok(device)
}

fn run_frames(device: &mut Device) -> Result<()> {
    let queue = device.default_queue().context("No default queue")?;
    let cmd = device.default_command_buffer().context("No default command buffer")?;

    let swapchain = device.create_swapchain(&SwapchainInfo {
        label: Some(Cow::Borrowed("sandbox")),
        width: 320,
        height: 240,
        format: Format::Rgba8,
        vsync: true,
    })?;
    let vertices = device.create_buffer(&BufferInfo {
        label: Some(Cow::Borrowed("triangle")),
        size: 3 * 16,
        stride: 16,
        usage: BufferUsage::VERTEX,
    })?;
    let texture = device.create_texture(&TextureInfo {
        label: Some(Cow::Borrowed("checker")),
        ty: TextureType::Tex2D,
        usage: TextureUsage::SAMPLED,
        format: Format::Rgba8,
        width: 64,
        height: 64,
        depth: 1,
        layer_count: 1,
        mip_levels: 1,
    })?;

    for _ in 0..FRAME_COUNT {
        device.acquire(&[swapchain])?;
        device.set_texture_unit(0, Some(texture))?;
        device.set_vertex_attribute(0, true)?;
        device.record_draw(
            cmd,
            DrawInfo {
                vertex_count: 3,
                ..Default::default()
            },
        )?;
        device.submit(queue, &[cmd])?;
        device.present()?;

        let stats = device.frame_stats();
        log::info!(
            "Frame {}: {} draw(s), {} triangle(s)",
            stats.frame_number,
            stats.draw_calls,
            stats.triangles
        );
    }

    let memory = device.memory_status();
    log::info!(
        "Memory: {} buffer byte(s), {} texture byte(s)",
        memory.buffer_size,
        memory.texture_size
    );

    device.destroy_texture(texture)?;
    device.destroy_buffer(vertices)?;
    device.destroy_swapchain(swapchain)?;
    log::info!(
        "{} object(s) waiting for the GPU",
        device.pending_recycle_count()
    );
    Ok(())
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let backend = args.next().unwrap_or_else(|| "gles".to_string());
    let settings_path = args.next();
    let settings = SandboxSettings::load(settings_path.as_deref().map(Path::new))?;

    init_logging(&settings.log)?;

    let mut device = create_device(&backend, settings.device)?;
    let info = device.info();
    log::info!(
        "Running on {} ({}, {})",
        info.device_name,
        info.renderer,
        info.vendor
    );

    let result = run_frames(&mut device);
    device.destroy();
    result
}
