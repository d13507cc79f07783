// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounded measurement points
//!
//! A [`Point`] is one measurement event: a name, up to `T` tag-value
//! pairs, up to `K` field-value pairs, and a timestamp. All strings are
//! bounded `heapless` strings; occupancy is expressed by membership in a
//! bounded vector, so there is no "unset slot" sentinel to scan for.
//!
//! A `Point` is never constructed without its first field: slot 0 is
//! filled at creation time and later fields fill left-to-right.

use heapless::{String, Vec};

use crate::error::{Error, Result};
use crate::{MAX_KEY_LEN, MAX_NAME_LEN, MAX_TAG_VALUE_LEN, MAX_TIMESTAMP_LEN};

/// One measured field: key plus numeric value
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    /// Field key (non-empty once set)
    pub key: String<MAX_KEY_LEN>,
    /// Measured value
    pub value: f32,
}

impl FieldValue {
    /// Create a field-value pair
    ///
    /// Fails with [`Error::CapacityExceeded`] if the key is longer than
    /// [`MAX_KEY_LEN`].
    pub fn new(key: &str, value: f32) -> Result<Self> {
        Ok(Self {
            key: String::try_from(key).map_err(|_| Error::CapacityExceeded)?,
            value,
        })
    }
}

/// One tag: indexed metadata attached to a point
#[derive(Debug, Clone, PartialEq)]
pub struct TagValue {
    /// Tag key (non-empty once set)
    pub tag: String<MAX_KEY_LEN>,
    /// Tag value
    pub value: String<MAX_TAG_VALUE_LEN>,
}

impl TagValue {
    /// Create a tag-value pair
    pub fn new(tag: &str, value: &str) -> Result<Self> {
        Ok(Self {
            tag: String::try_from(tag).map_err(|_| Error::CapacityExceeded)?,
            value: String::try_from(value).map_err(|_| Error::CapacityExceeded)?,
        })
    }
}

/// One measurement point with bounded tag and field storage
///
/// `K` is the field capacity, `T` the tag capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct Point<const K: usize, const T: usize> {
    /// Measurement name
    name: String<MAX_NAME_LEN>,

    /// Tags, in insertion order
    tags: Vec<TagValue, T>,

    /// Fields, in insertion order (slot 0 filled at creation)
    fields: Vec<FieldValue, K>,

    /// Timestamp, emitted verbatim (empty = server-assigned)
    timestamp: String<MAX_TIMESTAMP_LEN>,
}

impl<const K: usize, const T: usize> Point<K, T> {
    /// Create a point with its first field
    ///
    /// # Arguments
    ///
    /// * `name` - Measurement name
    /// * `key` - First field key
    /// * `value` - First field value
    /// * `timestamp` - Timestamp string, empty for server-assigned time
    pub fn new(name: &str, key: &str, value: f32, timestamp: &str) -> Result<Self> {
        let mut fields = Vec::new();
        fields
            .push(FieldValue::new(key, value)?)
            .map_err(|_| Error::HardLimitReached)?;

        Ok(Self {
            name: String::try_from(name).map_err(|_| Error::CapacityExceeded)?,
            tags: Vec::new(),
            fields,
            timestamp: String::try_from(timestamp).map_err(|_| Error::CapacityExceeded)?,
        })
    }

    /// Append a field after the creation-time one
    ///
    /// Fails with [`Error::HardLimitReached`] when all `K` slots are
    /// occupied; earlier fields are left untouched.
    pub fn add_field(&mut self, key: &str, value: f32) -> Result<()> {
        let field = FieldValue::new(key, value)?;
        self.fields.push(field).map_err(|_| Error::HardLimitReached)
    }

    /// Append a tag
    ///
    /// Fails with [`Error::HardLimitReached`] when all `T` slots are
    /// occupied.
    pub fn add_tag(&mut self, tag: &str, value: &str) -> Result<()> {
        let tag = TagValue::new(tag, value)?;
        self.tags.push(tag).map_err(|_| Error::HardLimitReached)
    }

    /// Measurement name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Timestamp (empty = server-assigned)
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Occupied tags, in insertion order
    pub fn tags(&self) -> &[TagValue] {
        &self.tags
    }

    /// Occupied fields, in insertion order
    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    /// Number of occupied tag slots
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Number of occupied field slots
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Whether every field slot is occupied
    pub fn fields_full(&self) -> bool {
        self.fields.is_full()
    }

    /// Whether every tag slot is occupied
    pub fn tags_full(&self) -> bool {
        self.tags.is_full()
    }
}
