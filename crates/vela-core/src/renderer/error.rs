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

//! Defines the error taxonomy of the graphics layer.

use crate::renderer::api::core::BackendType;
use crate::renderer::api::util::TextureFormat;
use std::fmt;

/// A convenience alias for results produced by the graphics layer.
pub type GraphicsResult<T> = Result<T, GraphicsError>;

/// A descriptor or argument failed the facade's shape validation.
///
/// These are detected before a backend is ever called.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A size, dimension or count that must be non-zero was zero.
    ZeroSize {
        /// What was measured (e.g. "texture width").
        what: &'static str,
    },
    /// A sample count that is not a power of two in `1..=64`.
    InvalidSampleCount(u32),
    /// A frames-in-flight count outside `1..=8`.
    InvalidFramesInFlight(u32),
    /// A swap chain buffer count outside `2..=3`.
    InvalidBufferCount(u32),
    /// More mip levels were requested than the texture size allows.
    MipLevelCountOutOfRange {
        /// The requested level count.
        requested: u32,
        /// The longest valid chain for the texture size.
        max: u32,
    },
    /// A value exceeds a device limit reported by the backend.
    ExceedsLimit {
        /// What was measured.
        what: &'static str,
        /// The offending value.
        value: u64,
        /// The device limit.
        limit: u64,
    },
    /// A slice or string that must not be empty was empty.
    Empty {
        /// What was empty.
        what: &'static str,
    },
    /// Supplied data does not match the size of its destination.
    DataSizeMismatch {
        /// The number of bytes the destination expects.
        expected: u64,
        /// The number of bytes supplied.
        actual: u64,
    },
    /// A range does not fit inside its resource.
    OutOfBounds {
        /// What was addressed.
        what: &'static str,
        /// The start of the range.
        offset: u64,
        /// The length of the range.
        size: u64,
        /// The size of the resource.
        capacity: u64,
    },
    /// A resource was used for something its usage flags do not allow.
    MissingUsage {
        /// The resource being used.
        what: &'static str,
        /// The required usage flag, by name.
        required: &'static str,
    },
    /// Two formats that must match do not.
    FormatMismatch {
        /// The format that was expected.
        expected: TextureFormat,
        /// The format that was supplied.
        actual: TextureFormat,
    },
    /// A handle holds the null key and can never refer to a live resource.
    NullHandle {
        /// The kind of handle.
        what: &'static str,
    },
    /// A structural problem with a descriptor not covered by the other variants.
    InvalidDescriptor(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::ZeroSize { what } => write!(f, "{what} must be non-zero"),
            ValidationError::InvalidSampleCount(count) => {
                write!(f, "Sample count {count} is not a power of two in 1..=64")
            }
            ValidationError::InvalidFramesInFlight(count) => {
                write!(f, "Frames in flight {count} is outside 1..=8")
            }
            ValidationError::InvalidBufferCount(count) => {
                write!(f, "Swap chain buffer count {count} is outside 2..=3")
            }
            ValidationError::MipLevelCountOutOfRange { requested, max } => {
                write!(f, "Requested {requested} mip levels but at most {max} fit")
            }
            ValidationError::ExceedsLimit { what, value, limit } => {
                write!(f, "{what} of {value} exceeds the device limit of {limit}")
            }
            ValidationError::Empty { what } => write!(f, "{what} must not be empty"),
            ValidationError::DataSizeMismatch { expected, actual } => {
                write!(f, "Expected {expected} bytes of data, got {actual}")
            }
            ValidationError::OutOfBounds {
                what,
                offset,
                size,
                capacity,
            } => write!(
                f,
                "{what} range {offset}..{} is outside a resource of {capacity} bytes",
                offset.saturating_add(*size)
            ),
            ValidationError::MissingUsage { what, required } => {
                write!(f, "{what} was not created with the {required} usage")
            }
            ValidationError::FormatMismatch { expected, actual } => {
                write!(f, "Expected format {expected:?}, got {actual:?}")
            }
            ValidationError::NullHandle { what } => write!(f, "Null {what} handle"),
            ValidationError::InvalidDescriptor(msg) => write!(f, "Invalid descriptor: {msg}"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// An error raised by the graphics layer or by a backend behind it.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphicsError {
    /// The backend failed to initialize.
    InitializationFailed(String),
    /// The logical device could not be created.
    DeviceCreationFailed(String),
    /// The swap chain could not be created for the given surface.
    SwapChainCreationFailed(String),
    /// The native call creating a resource failed, or the descriptor referenced
    /// objects the backend could not resolve.
    ResourceCreationFailed(String),
    /// A command buffer could not be submitted, or previously submitted work failed
    /// on the device.
    CommandSubmissionFailed(String),
    /// An allocation exceeded the memory available to the backend.
    OutOfMemory {
        /// The number of bytes requested.
        requested: u64,
        /// The number of bytes still available.
        available: u64,
    },
    /// A contract or state-machine violation, including use of a destroyed handle.
    InvalidOperation(String),
    /// The device cannot create or use resources of this format.
    UnsupportedFormat(TextureFormat),
    /// The device lacks a feature required by the operation.
    UnsupportedOperation(String),
    /// The requested backend is not compiled in, registered, or loadable here.
    BackendNotAvailable(BackendType),
    /// The facade was used before initialization or after shutdown.
    NotInitialized,
    /// The swap chain could not be resized to the requested dimensions.
    ResizeFailed {
        /// The requested width.
        width: u32,
        /// The requested height.
        height: u32,
        /// Why the resize was rejected.
        reason: String,
    },
    /// The current frame could not be presented.
    PresentFailed(String),
    /// A descriptor or argument failed shape validation before reaching the backend.
    Validation(ValidationError),
}

impl GraphicsError {
    /// Shorthand for building an [`GraphicsError::InvalidOperation`].
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        GraphicsError::InvalidOperation(msg.into())
    }

    /// Returns `true` for failures the caller is expected to recover from by
    /// choosing another backend.
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, GraphicsError::BackendNotAvailable(_))
    }
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsError::InitializationFailed(msg) => {
                write!(f, "Failed to initialize graphics backend: {msg}")
            }
            GraphicsError::DeviceCreationFailed(msg) => {
                write!(f, "Failed to create graphics device: {msg}")
            }
            GraphicsError::SwapChainCreationFailed(msg) => {
                write!(f, "Failed to create swap chain: {msg}")
            }
            GraphicsError::ResourceCreationFailed(msg) => {
                write!(f, "Failed to create resource: {msg}")
            }
            GraphicsError::CommandSubmissionFailed(msg) => {
                write!(f, "Command submission failed: {msg}")
            }
            GraphicsError::OutOfMemory {
                requested,
                available,
            } => write!(
                f,
                "Out of memory: requested {requested} bytes, {available} bytes available"
            ),
            GraphicsError::InvalidOperation(msg) => write!(f, "Invalid operation: {msg}"),
            GraphicsError::UnsupportedFormat(format) => {
                write!(f, "Texture format {format:?} is not supported by this device")
            }
            GraphicsError::UnsupportedOperation(msg) => {
                write!(f, "Unsupported operation: {msg}")
            }
            GraphicsError::BackendNotAvailable(backend) => {
                write!(f, "The {backend:?} backend is not available on this build")
            }
            GraphicsError::NotInitialized => {
                write!(f, "The graphics backend is not initialized.")
            }
            GraphicsError::ResizeFailed {
                width,
                height,
                reason,
            } => write!(f, "Failed to resize swap chain to {width}x{height}: {reason}"),
            GraphicsError::PresentFailed(msg) => write!(f, "Failed to present frame: {msg}"),
            GraphicsError::Validation(err) => write!(f, "Validation failed: {err}"),
        }
    }
}

impl std::error::Error for GraphicsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraphicsError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for GraphicsError {
    fn from(err: ValidationError) -> Self {
        GraphicsError::Validation(err)
    }
}
