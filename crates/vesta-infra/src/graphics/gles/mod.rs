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

//! Immediate-mode backend for GL ES 2 class drivers.

mod constants;
mod context;
mod driver;
mod headless;
mod probes;

pub use self::constants::{FramebufferFetchLevel, GlesConstantRegistry, MsrtLevel};
pub use self::context::GlesContext;
pub use self::driver::{gl, GlDriver, GlObjectKind};
pub use self::headless::{HeadlessGlDriver, HeadlessStats, HeadlessStatsHandle};
pub use self::probes::{apply_baseline, compressed_format_names, GLES2_PROBES};
