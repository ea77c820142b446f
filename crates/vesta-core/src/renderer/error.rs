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

//! Defines the hierarchy of error types for the device layer.
//!
//! [`ResourceError`] is recoverable at the call site, [`RenderError`] covers
//! the device lifecycle, and [`IntegrityViolation`] describes a broken
//! lifecycle contract. The device panics with the latter instead of returning
//! it.

use crate::renderer::api::{BoundResource, CommandBufferId, DescriptorSetId, GpuObject};
use std::fmt;

/// An error related to the creation or use of a single GPU resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
    /// The handle or ID used to reference a resource is invalid.
    InvalidHandle,
    /// A generic resource could not be found.
    NotFound(GpuObject),
    /// The creation descriptor is inconsistent (zero size, missing stages, ...).
    InvalidDescriptor(String),
    /// The requested format or usage is not supported by the device.
    Unsupported(String),
    /// A secondary command buffer was submitted directly to a queue.
    NotSubmittable(CommandBufferId),
    /// A descriptor slot has no resource bound, usually because the resource
    /// it referenced was destroyed.
    BindingUndefined {
        /// The descriptor set being used.
        set: DescriptorSetId,
        /// The empty binding index.
        binding: u32,
    },
    /// A resource was bound to a slot of an incompatible type or an unknown
    /// binding index.
    BindingMismatch {
        /// The descriptor set being updated.
        set: DescriptorSetId,
        /// The binding index.
        binding: u32,
        /// The resource that was rejected.
        resource: BoundResource,
    },
    /// The device is not in the initialized state.
    DeviceNotReady,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle or ID."),
            ResourceError::NotFound(object) => write!(f, "Resource not found: {object:?}"),
            ResourceError::InvalidDescriptor(msg) => {
                write!(f, "Invalid resource descriptor: {msg}")
            }
            ResourceError::Unsupported(msg) => write!(f, "Unsupported by the device: {msg}"),
            ResourceError::NotSubmittable(id) => {
                write!(f, "Command buffer {id:?} is secondary and cannot be submitted")
            }
            ResourceError::BindingUndefined { set, binding } => {
                write!(f, "Binding {binding} of descriptor set {set:?} is undefined")
            }
            ResourceError::BindingMismatch {
                set,
                binding,
                resource,
            } => write!(
                f,
                "Resource {resource:?} cannot be bound to binding {binding} of descriptor set {set:?}"
            ),
            ResourceError::DeviceNotReady => write!(f, "The device is not initialized."),
        }
    }
}

impl std::error::Error for ResourceError {}

/// A high-level error raised by the device lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// An operation was attempted before the device was initialized.
    NotInitialized,
    /// `initialize` was called on a device that is not in the initial state.
    AlreadyInitialized,
    /// The device has been destroyed.
    Destroyed,
    /// A failure occurred during the initialization of the graphics backend.
    InitializationFailed(String),
    /// The backend failed to present a swapchain.
    PresentFailed(String),
    /// The backend rejected a queue submission.
    SubmissionFailed(String),
    /// Settings could not be parsed or serialized.
    Config(String),
    /// An error occurred while managing a GPU resource.
    ResourceError(ResourceError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotInitialized => write!(f, "The device is not initialized."),
            RenderError::AlreadyInitialized => {
                write!(f, "The device has already been initialized.")
            }
            RenderError::Destroyed => write!(f, "The device has been destroyed."),
            RenderError::InitializationFailed(msg) => {
                write!(f, "Failed to initialize graphics backend: {msg}")
            }
            RenderError::PresentFailed(msg) => write!(f, "Failed to present: {msg}"),
            RenderError::SubmissionFailed(msg) => write!(f, "Queue submission failed: {msg}"),
            RenderError::Config(msg) => write!(f, "Invalid device settings: {msg}"),
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

/// A broken lifecycle contract. Never recoverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// GPU memory was still accounted for after the teardown drain.
    MemoryLeak {
        /// Outstanding buffer bytes.
        buffer_bytes: u64,
        /// Outstanding texture bytes.
        texture_bytes: u64,
    },
    /// A descriptor set still referenced a resource being freed.
    DanglingDescriptor {
        /// The resource being freed.
        resource: BoundResource,
        /// The set still referencing it.
        set: DescriptorSetId,
    },
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityViolation::MemoryLeak {
                buffer_bytes,
                texture_bytes,
            } => write!(
                f,
                "GPU memory leaked: {buffer_bytes} buffer bytes, {texture_bytes} texture bytes"
            ),
            IntegrityViolation::DanglingDescriptor { resource, set } => write!(
                f,
                "Descriptor set {set:?} still references {resource:?} while it is freed"
            ),
        }
    }
}

impl std::error::Error for IntegrityViolation {}
