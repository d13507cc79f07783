// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! InfluxDB Line Protocol encoder
//!
//! Deterministic, order-preserving text encoding, one line per point:
//!
//! ```text
//! <name>,BOX=<sensor>[,<tag>=<value>]... <key>=<value>[,...] <timestamp>\r\n
//! ```
//!
//! - the measurement name and the mandatory sensor identity tag come
//!   first, then occupied tags in index order (comma-prefixed)
//! - a single space separates the tag set from the field set; fields are
//!   comma-joined in index order
//! - field values are rendered with two fractional digits
//! - a trailing space precedes the timestamp, emitted verbatim (empty
//!   permitted: the server assigns time)
//! - every line ends with CRLF
//!
//! See: <https://docs.influxdata.com/influxdb/v2/reference/syntax/line-protocol/>
//!
//! The encoder is generic over [`core::fmt::Write`], so the same code
//! path drives both real encoding (into a bounded body buffer) and pure
//! length measurement (into a [`ByteCounter`]). Admission checks measure
//! candidate lines this way instead of encoding into a throwaway buffer.

use core::fmt::{self, Write};

use crate::point::Point;

/// Line separator required by the HTTP write endpoint
pub const CRLF: &str = "\r\n";

/// Tag key carrying the sensor identity on every numeric-mode line
pub const SENSOR_TAG: &str = "BOX";

/// Tag key carrying the sensor identity on string-mode lines
pub const STRING_SENSOR_TAG: &str = "sensor_id";

/// Byte-counting sink for measuring encoded lengths without a buffer
#[derive(Debug, Default)]
pub struct ByteCounter {
    len: usize,
}

impl ByteCounter {
    /// Create a counter at zero
    pub const fn new() -> Self {
        Self { len: 0 }
    }

    /// Bytes written so far
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing has been written
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Write for ByteCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.len += s.len();
        Ok(())
    }
}

/// Encode one point as a line-protocol line, CRLF included
pub fn write_point<W: Write, const K: usize, const T: usize>(
    out: &mut W,
    sensor_name: &str,
    point: &Point<K, T>,
) -> fmt::Result {
    write!(out, "{},{}={}", point.name(), SENSOR_TAG, sensor_name)?;

    for tag in point.tags() {
        write!(out, ",{}={}", tag.tag, tag.value)?;
    }

    for (i, field) in point.fields().iter().enumerate() {
        let sep = if i == 0 { ' ' } else { ',' };
        write!(out, "{}{}={:.2}", sep, field.key, field.value)?;
    }

    write!(out, " {}{}", point.timestamp(), CRLF)
}

/// Encoded line length of a point, CRLF included
pub fn point_line_len<const K: usize, const T: usize>(
    sensor_name: &str,
    point: &Point<K, T>,
) -> usize {
    let mut counter = ByteCounter::new();
    let _ = write_point(&mut counter, sensor_name, point);
    counter.len()
}

/// Encoded line length of a not-yet-constructed point, CRLF included
///
/// Measures the line a new point (no tags, one field) would produce,
/// without building the point. Used by the projective admission check.
pub fn candidate_line_len(
    sensor_name: &str,
    name: &str,
    key: &str,
    value: f32,
    timestamp: &str,
) -> usize {
    let mut counter = ByteCounter::new();
    let _ = write!(
        counter,
        "{},{}={} {}={:.2} {}{}",
        name, SENSOR_TAG, sensor_name, key, value, timestamp, CRLF
    );
    counter.len()
}

/// Encoded length of an additional `,key=value` field pair
pub(crate) fn field_pair_len(key: &str, value: f32) -> usize {
    let mut counter = ByteCounter::new();
    let _ = write!(counter, ",{}={:.2}", key, value);
    counter.len()
}

/// Encoded length of an additional `,tag=value` tag pair
pub(crate) fn tag_pair_len(tag: &str, value: &str) -> usize {
    // ',' + tag + '=' + value
    2 + tag.len() + value.len()
}
