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

//! Backend identity and execution model.

/// The native graphics API behind a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GraphicsBackendType {
    /// OpenGL ES 2.0 class API.
    Gles2,
    /// Vulkan API.
    Vulkan,
    /// Apple's Metal API.
    Metal,
    /// Microsoft's DirectX 12 API.
    Dx12,
    /// Desktop OpenGL.
    OpenGL,
    /// WebGPU API (for web builds).
    WebGpu,
    /// An unknown or unsupported backend.
    #[default]
    Unknown,
}

/// How a backend executes work relative to the calling thread.
///
/// This decides the recycle policy: immediate backends may free objects as
/// soon as they are destroyed, explicit ones must wait for the GPU timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionModel {
    /// Calls are serialized with destruction by the driver.
    Immediate,
    /// Commands are recorded and executed later on a decoupled timeline.
    ExplicitAsync,
}

/// Identity strings reported by a backend after initialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Short device name, e.g. `"GLES2"`.
    pub device_name: String,
    /// The API backing the device.
    pub backend_type: GraphicsBackendType,
    /// Renderer string, e.g. the GPU model.
    pub renderer: String,
    /// Vendor string.
    pub vendor: String,
    /// Driver or API version string.
    pub version: String,
}
