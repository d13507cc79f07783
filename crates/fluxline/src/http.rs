// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HTTP collaborator contract
//!
//! The core never performs I/O. It prepares everything an external HTTP
//! client needs to POST a batch: the target host, the write path
//! (`/api/v2/write?org=<ORG>&bucket=<BUCKET>&precision=s`), and a fixed
//! three-slot header list. Slots 0 and 1 are populated at construction
//! (`Authorization`, `Connection`); slot 2 is reserved for the
//! caller-set `Content-Type`.
//!
//! Sending the request and interpreting the server response are entirely
//! the transport's job.

use core::fmt::Write;

use heapless::String;

use crate::config::InfluxDbConfig;
use crate::error::{Error, Result};
use crate::{MAX_HEADER_KEY_LEN, MAX_HEADER_VALUE_LEN, MAX_URL_LEN};

/// One HTTP header as a bounded key/value pair
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    /// Header name (empty = unused slot)
    pub key: String<MAX_HEADER_KEY_LEN>,
    /// Header value
    pub value: String<MAX_HEADER_VALUE_LEN>,
}

impl Header {
    /// Create a header from a key/value pair
    pub fn new(key: &str, value: &str) -> Result<Self> {
        Ok(Self {
            key: String::try_from(key).map_err(|_| Error::CapacityExceeded)?,
            value: String::try_from(value).map_err(|_| Error::CapacityExceeded)?,
        })
    }

    /// An unused header slot
    pub const fn empty() -> Self {
        Self {
            key: String::new(),
            value: String::new(),
        }
    }

    /// Whether this slot holds a header
    pub fn is_set(&self) -> bool {
        !self.key.is_empty()
    }
}

/// Write target for an external HTTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteEndpoint {
    /// Target host
    host: String<MAX_URL_LEN>,

    /// Path plus query for the v2 write API
    path: String<MAX_URL_LEN>,

    /// Authorization, Connection, and the caller-set Content-Type
    headers: [Header; 3],
}

impl WriteEndpoint {
    pub(crate) fn new(config: &InfluxDbConfig<'_>) -> Result<Self> {
        let mut path = String::new();
        write!(
            path,
            "/api/v2/write?org={}&bucket={}&precision=s",
            config.org, config.bucket
        )
        .map_err(|_| Error::CapacityExceeded)?;

        let mut auth = String::<MAX_HEADER_VALUE_LEN>::new();
        write!(auth, "Token {}", config.token).map_err(|_| Error::CapacityExceeded)?;

        Ok(Self {
            host: String::try_from(config.url).map_err(|_| Error::CapacityExceeded)?,
            path,
            headers: [
                Header::new("Authorization", &auth)?,
                Header::new("Connection", "keep-alive")?,
                Header::empty(),
            ],
        })
    }

    /// Target host, as configured
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Path plus query for the v2 write API
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The three-slot header list
    pub fn headers(&self) -> &[Header; 3] {
        &self.headers
    }

    /// Set the Content-Type header (slot 2)
    pub fn set_content_type(&mut self, value: &str) -> Result<()> {
        self.headers[2] = Header::new("Content-Type", value)?;
        Ok(())
    }
}
