// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # fluxline - Embedded InfluxDB Line-Protocol Batching
//!
//! A `no_std` fixed-capacity accumulator for measurement points, for
//! resource-constrained embedded systems such as ESP32, RP2040, and
//! STM32 microcontrollers. Points are batched into pre-allocated
//! storage, serialized as InfluxDB Line Protocol, and handed to an
//! external HTTP client for upload.
//!
//! ## Design Constraints
//!
//! - **No heap allocations** (const generics for fixed buffers,
//!   `heapless` for bounded strings)
//! - **Two admission ceilings**, checked before any mutation: point
//!   count and serialized HTTP body size
//! - **No I/O in core** (string construction only); the HTTP transport
//!   is an external collaborator
//! - **`no_std` compatible**, single-owner, no suspension points
//!
//! ## Architecture
//!
//! ```text
//! +-----------------------------------------+
//! |  Application (User Code)                |
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  Batch (admission control + store)      |
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  Line Protocol Encoder                  |
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  HTTP client (external collaborator)    |
//! +-----------------------------------------+
//! ```
//!
//! ## Feature Flags
//!
//! - `esp32` -- ESP32-specific optimizations
//! - `rp2040` -- RP2040-specific optimizations
//! - `stm32` -- STM32-specific optimizations
//! - `strict-admission` -- projective body-size check for tag/field
//!   additions (the default mirrors the legacy reactive check)
//! - `std` -- Enable std (for host testing)

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Fixed-capacity point batch with admission control
pub mod batch;

/// Batch construction parameters
pub mod config;

/// Error types for fluxline
pub mod error;

/// HTTP collaborator contract (write path, bounded header list)
pub mod http;

/// InfluxDB Line Protocol encoder
pub mod line;

/// Bounded measurement points
pub mod point;

/// String-value points, produced one line at a time
pub mod string_point;

// Re-exports for convenience
pub use crate::batch::Batch;
pub use crate::config::InfluxDbConfig;
pub use crate::error::{Error, Result};
pub use crate::http::{Header, WriteEndpoint};
pub use crate::point::{FieldValue, Point, TagValue};
pub use crate::string_point::{StringField, StringPoint};

/// Default maximum number of points per batch
pub const DEFAULT_MAX_POINTS: usize = 200;

/// Default HTTP body-size ceiling in bytes (SIMCOM modem limit)
pub const DEFAULT_MAX_BODY_SIZE: usize = 16384;

/// Default field slots per point
pub const DEFAULT_MAX_FIELDS_PER_POINT: usize = 5;

/// Default tag slots per point
pub const DEFAULT_MAX_TAGS_PER_POINT: usize = 1;

/// Maximum measurement name length in bytes
pub const MAX_NAME_LEN: usize = 32;

/// Maximum field/tag key length in bytes
pub const MAX_KEY_LEN: usize = 32;

/// Maximum tag value length in bytes (also bounds the sensor identity)
pub const MAX_TAG_VALUE_LEN: usize = 32;

/// Maximum timestamp length in bytes
pub const MAX_TIMESTAMP_LEN: usize = 20;

/// Maximum string-mode field value length in bytes
pub const MAX_STRING_VALUE_LEN: usize = 64;

/// Maximum host/path length in bytes
pub const MAX_URL_LEN: usize = 128;

/// Maximum HTTP header name length in bytes
pub const MAX_HEADER_KEY_LEN: usize = 16;

/// Maximum HTTP header value length in bytes
pub const MAX_HEADER_VALUE_LEN: usize = 128;

/// [`Batch`] with the default firmware capacities
pub type DefaultBatch =
    Batch<DEFAULT_MAX_POINTS, DEFAULT_MAX_FIELDS_PER_POINT, DEFAULT_MAX_TAGS_PER_POINT, DEFAULT_MAX_BODY_SIZE>;

/// Version of fluxline
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
