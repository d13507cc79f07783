// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! String-value points, produced one line at a time
//!
//! The batching [`Batch`](crate::Batch) only carries numeric field
//! values. Arbitrary string values would defeat its size accounting, so
//! they are handled point-by-point instead: a [`StringPoint`] holds
//! bounded string fields, encodes itself as a single line-protocol line
//! with quoted values (`key="value"`) under the `sensor_id` identity
//! tag, and is then discarded. There is no batch container here:
//! callers accumulate and transmit each line themselves, and are
//! responsible for keeping the combined upload under their transport's
//! body ceiling.

use core::fmt::{self, Write};

use heapless::{String, Vec};

use crate::error::{Error, Result};
use crate::line::{ByteCounter, CRLF, STRING_SENSOR_TAG};
use crate::{MAX_KEY_LEN, MAX_NAME_LEN, MAX_STRING_VALUE_LEN, MAX_TAG_VALUE_LEN, MAX_TIMESTAMP_LEN};

/// One string-valued field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringField {
    /// Field key
    pub key: String<MAX_KEY_LEN>,
    /// Field value, emitted inside double quotes
    pub value: String<MAX_STRING_VALUE_LEN>,
}

impl StringField {
    /// Create a string field
    pub fn new(key: &str, value: &str) -> Result<Self> {
        Ok(Self {
            key: String::try_from(key).map_err(|_| Error::CapacityExceeded)?,
            value: String::try_from(value).map_err(|_| Error::CapacityExceeded)?,
        })
    }
}

/// A single string-valued measurement point
///
/// Unlike [`Point`](crate::Point), a `StringPoint` starts with no
/// fields; a zero-field point still encodes to a (degenerate) line.
/// `K` is the field capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringPoint<const K: usize> {
    name: String<MAX_NAME_LEN>,
    sensor_id: String<MAX_TAG_VALUE_LEN>,
    timestamp: String<MAX_TIMESTAMP_LEN>,
    fields: Vec<StringField, K>,
}

impl<const K: usize> StringPoint<K> {
    /// Create an empty string point
    ///
    /// # Arguments
    ///
    /// * `name` - Measurement name
    /// * `sensor_id` - Sensor identity for the `sensor_id` tag
    /// * `timestamp` - Timestamp string, empty for server-assigned time
    pub fn new(name: &str, sensor_id: &str, timestamp: &str) -> Result<Self> {
        Ok(Self {
            name: String::try_from(name).map_err(|_| Error::CapacityExceeded)?,
            sensor_id: String::try_from(sensor_id).map_err(|_| Error::CapacityExceeded)?,
            timestamp: String::try_from(timestamp).map_err(|_| Error::CapacityExceeded)?,
            fields: Vec::new(),
        })
    }

    /// Append a string field
    ///
    /// Fails with [`Error::HardLimitReached`] once all `K` slots are
    /// occupied.
    pub fn add_field(&mut self, key: &str, value: &str) -> Result<()> {
        let field = StringField::new(key, value)?;
        self.fields.push(field).map_err(|_| Error::HardLimitReached)
    }

    /// Whether every field slot is occupied
    pub fn is_full(&self) -> bool {
        self.fields.is_full()
    }

    /// Number of occupied field slots
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Measurement name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encode this point as one line-protocol line, CRLF included
    pub fn write_line<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(out, "{},{}={} ", self.name, STRING_SENSOR_TAG, self.sensor_id)?;

        for (i, field) in self.fields.iter().enumerate() {
            if i != 0 {
                out.write_char(',')?;
            }
            write!(out, "{}=\"{}\"", field.key, field.value)?;
        }

        write!(out, " {}{}", self.timestamp, CRLF)
    }

    /// Encode this point into an owned bounded string
    ///
    /// Fails with [`Error::BufferTooSmall`] if the line is longer than
    /// `B` bytes.
    pub fn to_line<const B: usize>(&self) -> Result<String<B>> {
        let mut line = String::new();
        self.write_line(&mut line).map_err(|_| Error::BufferTooSmall)?;
        Ok(line)
    }

    /// Encoded line length, CRLF included
    pub fn line_len(&self) -> usize {
        let mut counter = ByteCounter::new();
        let _ = self.write_line(&mut counter);
        counter.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_point_line() {
        let mut point: StringPoint<5> = StringPoint::new("status", "BOX1", "100").unwrap();
        point.add_field("state", "running").unwrap();
        point.add_field("mode", "auto").unwrap();

        let line: String<128> = point.to_line().unwrap();
        assert_eq!(line, "status,sensor_id=BOX1 state=\"running\",mode=\"auto\" 100\r\n");
    }

    #[test]
    fn test_zero_field_line() {
        let point: StringPoint<5> = StringPoint::new("status", "BOX1", "").unwrap();

        let line: String<64> = point.to_line().unwrap();
        assert_eq!(line, "status,sensor_id=BOX1  \r\n");
    }

    #[test]
    fn test_full_point_rejects_field() {
        let mut point: StringPoint<2> = StringPoint::new("status", "BOX1", "").unwrap();

        point.add_field("a", "1").unwrap();
        point.add_field("b", "2").unwrap();
        assert!(point.is_full());

        let result = point.add_field("c", "3");
        assert_eq!(result, Err(Error::HardLimitReached));
        assert_eq!(point.field_count(), 2);
    }

    #[test]
    fn test_line_len_matches_encoding() {
        let mut point: StringPoint<5> = StringPoint::new("status", "BOX1", "7").unwrap();
        point.add_field("state", "running").unwrap();

        let line: String<128> = point.to_line().unwrap();
        assert_eq!(point.line_len(), line.len());
    }

    #[test]
    fn test_line_too_long_for_buffer() {
        let mut point: StringPoint<5> = StringPoint::new("status", "BOX1", "").unwrap();
        point.add_field("state", "running").unwrap();

        let result: Result<String<8>> = point.to_line();
        assert_eq!(result, Err(Error::BufferTooSmall));
    }
}
