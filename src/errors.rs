//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`CinderError`] covers all failure modes including:
//! - GPU context bootstrap failures
//! - Registry name collisions and missed lookups
//! - Bind group slot and kind-compatibility violations
//! - Descriptor validation failures at lazy-build time
//!
//! Every failure is a synchronous, typed contract violation surfaced
//! immediately to the caller. None of them are transient, so there is no
//! retry machinery. The one recoverable condition — a render pass whose
//! declared resources do not resolve — is reported as a `bool` from pass
//! validation rather than through this type.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, CinderError>`.

use thiserror::Error;

use crate::registry::ResourceCategory;

/// The main error type for the cinder engine core.
#[derive(Error, Debug)]
pub enum CinderError {
    // ========================================================================
    // GPU Context Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceRequestFailed(#[from] wgpu::RequestDeviceError),

    // ========================================================================
    // Registry Errors
    // ========================================================================
    /// A resource, bind group, pipeline or canvas was created under a name
    /// already in use within its category.
    #[error("{category} already exists: {name}")]
    DuplicateName {
        /// Registry category the collision occurred in
        category: ResourceCategory,
        /// The colliding name
        name: String,
    },

    /// A name was looked up that is absent from the registry.
    #[error("{category} not found: {name}")]
    NotFound {
        /// Registry category that was searched
        category: ResourceCategory,
        /// The missing name
        name: String,
    },

    // ========================================================================
    // Bind Group Errors
    // ========================================================================
    /// A binding slot is already occupied (slots are unique within a group).
    #[error("invalid binding slot {slot}: {reason}")]
    InvalidSlot {
        /// The offending slot index
        slot: u32,
        /// Why the slot was rejected
        reason: String,
    },

    /// A binding references a resource that does not exist or whose kind is
    /// incompatible with the binding kind.
    #[error("invalid resource for binding: {name} ({reason})")]
    InvalidResource {
        /// Name of the rejected resource
        name: String,
        /// Why the resource was rejected
        reason: String,
    },

    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// A resource descriptor failed validation at lazy-build time, or a
    /// mutation violated a descriptor contract (oversized write, frozen
    /// uniform layout, mismatched field type).
    #[error("invalid descriptor for {name}: {reason}")]
    InvalidDescriptor {
        /// Name of the resource being validated
        name: String,
        /// Why validation failed
        reason: String,
    },

    /// Index data whose element width disagrees with the buffer's declared
    /// index format.
    #[error("index format mismatch: buffer declares {expected:?}, data is {supplied:?}")]
    FormatMismatch {
        /// Format fixed at buffer creation
        expected: wgpu::IndexFormat,
        /// Format of the supplied index data
        supplied: wgpu::IndexFormat,
    },

    /// A native handle was accessed before its required build step ran.
    #[error("{name} has not been built yet")]
    NotBuilt {
        /// Name of the unbuilt object
        name: String,
    },

    /// A uniform field name was not found in a buffer's layout.
    #[error("uniform field not found in {buffer}: {field}")]
    FieldNotFound {
        /// The uniform buffer that was searched
        buffer: String,
        /// The missing field
        field: String,
    },

    // ========================================================================
    // Async Transfer Errors
    // ========================================================================
    /// Mapping a buffer for readback failed or the device was lost while
    /// waiting for the map to complete.
    #[error("buffer mapping failed: {0}")]
    BufferMapFailed(String),
}

/// Alias for `Result<T, CinderError>`.
pub type Result<T> = std::result::Result<T, CinderError>;
