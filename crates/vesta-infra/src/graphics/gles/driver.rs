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

//! The slice of the GL ES 2 entry points the backend needs.

/// `glGetString` / `glGetIntegerv` enums used during initialization.
pub mod gl {
    #![allow(missing_docs)]

    pub const VENDOR: u32 = 0x1F00;
    pub const RENDERER: u32 = 0x1F01;
    pub const VERSION: u32 = 0x1F02;
    pub const EXTENSIONS: u32 = 0x1F03;

    pub const MAX_TEXTURE_SIZE: u32 = 0x0D33;
    pub const MAX_CUBE_MAP_TEXTURE_SIZE: u32 = 0x851C;
    pub const MAX_DRAW_BUFFERS: u32 = 0x8824;
    pub const MAX_VERTEX_ATTRIBS: u32 = 0x8869;
    pub const MAX_TEXTURE_IMAGE_UNITS: u32 = 0x8872;
    pub const MAX_VERTEX_TEXTURE_IMAGE_UNITS: u32 = 0x8B4C;
    pub const MAX_VERTEX_UNIFORM_VECTORS: u32 = 0x8DFB;
    pub const MAX_FRAGMENT_UNIFORM_VECTORS: u32 = 0x8DFD;
}

/// The kinds of named GL objects the backend generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlObjectKind {
    /// `glGenBuffers`.
    Buffer,
    /// `glGenTextures`.
    Texture,
    /// `glCreateProgram`.
    Program,
    /// `glGenFramebuffers`, backing an offscreen swapchain.
    Framebuffer,
    /// `glGenQueriesEXT`.
    Query,
}

/// A GL ES 2 driver bound to one context.
///
/// Real implementations wrap a loaded function table. Names returned by
/// [`GlDriver::gen_object`] are never `0`.
pub trait GlDriver: Send {
    /// Makes the context current (`true`) or releases it. Returns `false` when
    /// the context is lost.
    fn make_current(&mut self, current: bool) -> bool;

    /// `glGetString`. `None` when the driver returns a null pointer.
    fn get_string(&self, name: u32) -> Option<String>;

    /// `glGetIntegerv` for a single value.
    fn get_integer(&self, name: u32) -> i32;

    /// Generates one object name, or `None` when the driver is out of names.
    fn gen_object(&mut self, kind: GlObjectKind) -> Option<u32>;

    /// Deletes an object generated by [`GlDriver::gen_object`].
    fn delete_object(&mut self, kind: GlObjectKind, name: u32);

    /// `glActiveTexture` + `glBindTexture`. Name `0` unbinds.
    fn bind_texture(&mut self, unit: u32, name: u32);

    /// `glEnableVertexAttribArray` / `glDisableVertexAttribArray`.
    fn set_vertex_attrib_array(&mut self, location: u32, enabled: bool);

    /// Swaps the default framebuffer. Returns `false` on failure.
    fn swap_buffers(&mut self) -> bool;

    /// `glFinish`.
    fn finish(&mut self);
}
