// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for fluxline

use core::fmt;

/// Result type for fluxline operations
pub type Result<T> = core::result::Result<T, Error>;

/// Error type for fluxline
///
/// `HardLimitReached` and `BodyLimitReached` are the two admission
/// failures; both also trip the batch's sticky overflow flag. The
/// remaining variants report inputs that cannot be represented in the
/// bounded storage and leave the flag alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A bounded capacity (points, or field/tag slots within a point) is full
    HardLimitReached,

    /// Serializing the current or projected batch would exceed the
    /// transport body-size ceiling
    BodyLimitReached,

    /// An input string does not fit its bounded slot
    CapacityExceeded,

    /// Tag/field addition aimed at an empty batch or an out-of-range index
    NoSuchPoint,

    /// Serialized output no longer fits the body buffer
    BufferTooSmall,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::HardLimitReached => write!(f, "Hard capacity limit reached"),
            Error::BodyLimitReached => write!(f, "HTTP body size limit reached"),
            Error::CapacityExceeded => write!(f, "String exceeds bounded slot capacity"),
            Error::NoSuchPoint => write!(f, "No point at the requested index"),
            Error::BufferTooSmall => write!(f, "Body buffer too small"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
