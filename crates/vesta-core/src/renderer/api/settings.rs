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

//! Device configuration.

use serde::{Deserialize, Serialize};

use crate::renderer::error::RenderError;

/// Capacity of the device's default occlusion query pool.
pub const DEFAULT_MAX_QUERY_OBJECTS: u32 = 32767;

/// Settings applied when a [`Device`](crate::renderer::Device) initializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// A label used in log lines.
    pub label: String,
    /// Capacity of the default query pool.
    pub max_query_objects: u32,
    /// Whether the default query pool waits for results on readback.
    pub query_pool_force_wait: bool,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            label: "vesta-device".to_string(),
            max_query_objects: DEFAULT_MAX_QUERY_OBJECTS,
            query_pool_force_wait: true,
        }
    }
}

impl DeviceSettings {
    /// Parses settings from JSON. Missing fields take their default value.
    pub fn from_json(text: &str) -> Result<Self, RenderError> {
        serde_json::from_str(text).map_err(|e| RenderError::Config(e.to_string()))
    }

    /// Serializes the settings to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, RenderError> {
        serde_json::to_string_pretty(self).map_err(|e| RenderError::Config(e.to_string()))
    }
}
