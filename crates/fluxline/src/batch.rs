// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-capacity point batch with admission control
//!
//! [`Batch`] owns the point store, enforces the two admission ceilings
//! (point count and serialized body size) before any mutation, and
//! serves the serialized body for upload.
//!
//! ## Admission policy
//!
//! - New points are checked *projectively*: the candidate line is
//!   measured (without being stored) and rejected if the body would
//!   exceed the ceiling.
//! - Tag/field additions to existing points are checked *reactively*
//!   against the cached body length. The delta of the new pair is not
//!   projected, so the body can overshoot the ceiling by one pair before
//!   the next addition is refused. The `strict-admission` feature
//!   switches these operations to a projective delta check.
//!
//! Every admission failure sets a sticky overflow flag that survives
//! subsequent successful additions until absorbed via
//! [`Batch::overflowed`] or reset via [`Batch::clear_points`].

use heapless::{String, Vec};

use crate::config::InfluxDbConfig;
use crate::error::{Error, Result};
use crate::http::WriteEndpoint;
use crate::line::{self, ByteCounter, CRLF};
use crate::point::Point;
use crate::MAX_TAG_VALUE_LEN;

/// Fixed-capacity accumulator for line-protocol points
///
/// Type parameters:
///
/// * `N` - maximum number of points
/// * `K` - field slots per point
/// * `T` - tag slots per point
/// * `B` - HTTP body-size ceiling in bytes
///
/// # Example
///
/// ```ignore
/// let mut batch: Batch<200, 5, 1, 16384> = Batch::new(&InfluxDbConfig {
///     url: "https://influx.example.com:8086",
///     token: "...",
///     org: "workshop",
///     bucket: "telemetry",
///     sensor_name: "BOX1",
/// })?;
///
/// batch.add_point("engine", "rpm", 1450.0)?;
/// batch.add_tag("bank", "port")?;
/// batch.add_field("oil_temp", 85.0)?;
///
/// http_client.post(batch.endpoint(), batch.body()?)?;
/// batch.clear_points();
/// ```
#[derive(Debug)]
pub struct Batch<const N: usize, const K: usize, const T: usize, const B: usize> {
    /// Sensor identity emitted as the mandatory identity tag
    sensor_name: String<MAX_TAG_VALUE_LEN>,

    /// Write target for the external HTTP client
    endpoint: WriteEndpoint,

    /// Point store, insertion order = upload order
    points: Vec<Point<K, T>, N>,

    /// Serialized body, rebuilt by [`Batch::body`]
    body: String<B>,

    /// Cached serialized length (no trailing CRLF), refreshed after
    /// every mutation
    body_len: usize,

    /// Sticky overflow flag
    overflow_hit: bool,
}

impl<const N: usize, const K: usize, const T: usize, const B: usize> Batch<N, K, T, B> {
    /// Create an empty batch for the given write target
    pub fn new(config: &InfluxDbConfig<'_>) -> Result<Self> {
        Ok(Self {
            sensor_name: String::try_from(config.sensor_name)
                .map_err(|_| Error::CapacityExceeded)?,
            endpoint: WriteEndpoint::new(config)?,
            points: Vec::new(),
            body: String::new(),
            body_len: 0,
            overflow_hit: false,
        })
    }

    /// Add a new point with one field and a server-assigned timestamp
    pub fn add_point(&mut self, name: &str, key: &str, value: f32) -> Result<()> {
        self.add_point_with_timestamp(name, key, value, "")
    }

    /// Add a new point with one field and an explicit timestamp
    ///
    /// The body-size ceiling is checked first (projectively, by
    /// measuring the candidate line), then the point-count ceiling.
    /// Stored state is untouched on rejection.
    pub fn add_point_with_timestamp(
        &mut self,
        name: &str,
        key: &str,
        value: f32,
        timestamp: &str,
    ) -> Result<()> {
        let line_len = line::candidate_line_len(&self.sensor_name, name, key, value, timestamp);
        if self.body_len + line_len + CRLF.len() > B {
            return Err(self.hit_overflow(Error::BodyLimitReached));
        }

        if self.points.is_full() {
            return Err(self.hit_overflow(Error::HardLimitReached));
        }

        let point = Point::new(name, key, value, timestamp)?;
        self.points.push(point).map_err(|_| Error::HardLimitReached)?;
        self.refresh_body_len();
        Ok(())
    }

    /// Add a field to the most recently added point
    pub fn add_field(&mut self, key: &str, value: f32) -> Result<()> {
        let last = self.points.len().checked_sub(1).ok_or(Error::NoSuchPoint)?;
        self.add_field_at(last, key, value)
    }

    /// Add a field to the point at `index`
    ///
    /// Fills the first free field slot after the creation-time one.
    pub fn add_field_at(&mut self, index: usize, key: &str, value: f32) -> Result<()> {
        if index >= self.points.len() {
            return Err(Error::NoSuchPoint);
        }

        if self.pair_would_overflow(line::field_pair_len(key, value)) {
            return Err(self.hit_overflow(Error::BodyLimitReached));
        }

        let point = self.points.get_mut(index).ok_or(Error::NoSuchPoint)?;
        match point.add_field(key, value) {
            Ok(()) => {
                self.refresh_body_len();
                Ok(())
            }
            Err(Error::HardLimitReached) => Err(self.hit_overflow(Error::HardLimitReached)),
            Err(e) => Err(e),
        }
    }

    /// Add a tag to the most recently added point
    pub fn add_tag(&mut self, tag: &str, value: &str) -> Result<()> {
        let last = self.points.len().checked_sub(1).ok_or(Error::NoSuchPoint)?;
        self.add_tag_at(last, tag, value)
    }

    /// Add a tag to the point at `index`
    pub fn add_tag_at(&mut self, index: usize, tag: &str, value: &str) -> Result<()> {
        if index >= self.points.len() {
            return Err(Error::NoSuchPoint);
        }

        if self.pair_would_overflow(line::tag_pair_len(tag, value)) {
            return Err(self.hit_overflow(Error::BodyLimitReached));
        }

        let point = self.points.get_mut(index).ok_or(Error::NoSuchPoint)?;
        match point.add_tag(tag, value) {
            Ok(()) => {
                self.refresh_body_len();
                Ok(())
            }
            Err(Error::HardLimitReached) => Err(self.hit_overflow(Error::HardLimitReached)),
            Err(e) => Err(e),
        }
    }

    /// Remove the most recently added point
    ///
    /// No-op on an empty batch. The sticky overflow flag is left alone.
    pub fn clear_last_point(&mut self) {
        self.points.pop();
        self.refresh_body_len();
    }

    /// Drop every point, reset the overflow flag, and zero the body
    pub fn clear_points(&mut self) {
        self.points.clear();
        self.body.clear();
        self.body_len = 0;
        self.overflow_hit = false;
        log::debug!("batch cleared");
    }

    /// Serialize the whole batch
    ///
    /// Lines are concatenated in insertion order with the final CRLF
    /// stripped. The returned length becomes the new cached body length.
    pub fn body(&mut self) -> Result<&str> {
        self.body_range(0, self.points.len())
    }

    /// Serialize points in `[start, end)`, with `end` clamped to the
    /// point count
    ///
    /// Note that the cached body length is overwritten with the length
    /// of the returned sub-range until the next mutation recomputes it.
    pub fn body_range(&mut self, start: usize, end: usize) -> Result<&str> {
        let end = end.min(self.points.len());

        self.body.clear();
        for point in self.points.iter().take(end).skip(start) {
            line::write_point(&mut self.body, &self.sensor_name, point)
                .map_err(|_| Error::BufferTooSmall)?;
        }

        // Drop the CRLF after the final line
        self.body.pop();
        self.body.pop();

        self.body_len = self.body.len();
        Ok(&self.body)
    }

    /// Sticky overflow state
    ///
    /// Re-asserts the count limit as a side effect (a full store trips
    /// the flag even if no addition has been refused yet). Passing
    /// `absorb = true` acknowledges the overflow and clears the flag.
    pub fn overflowed(&mut self, absorb: bool) -> bool {
        if self.points.is_full() {
            self.overflow_hit = true;
        }

        let hit = self.overflow_hit;
        if absorb {
            self.overflow_hit = false;
        }
        hit
    }

    /// Replace the sensor identity used on every line
    pub fn set_sensor_name(&mut self, name: &str) -> Result<()> {
        self.sensor_name = String::try_from(name).map_err(|_| Error::CapacityExceeded)?;
        self.refresh_body_len();
        Ok(())
    }

    /// Sensor identity currently in use
    pub fn sensor_name(&self) -> &str {
        &self.sensor_name
    }

    /// Write target for the external HTTP client
    pub fn endpoint(&self) -> &WriteEndpoint {
        &self.endpoint
    }

    /// Mutable write target (for setting the Content-Type slot)
    pub fn endpoint_mut(&mut self) -> &mut WriteEndpoint {
        &mut self.endpoint
    }

    /// Number of accumulated points
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Whether the batch holds no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether every point slot is occupied
    pub fn is_full(&self) -> bool {
        self.points.is_full()
    }

    /// Point-count ceiling (`N`)
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Body-size ceiling in bytes (`B`)
    pub const fn max_body_size(&self) -> usize {
        B
    }

    /// Cached serialized length, refreshed after every mutation
    pub fn body_len(&self) -> usize {
        self.body_len
    }

    /// Accumulated points, in insertion order
    pub fn points(&self) -> &[Point<K, T>] {
        &self.points
    }

    /// The point at `index`, if any
    pub fn point(&self, index: usize) -> Option<&Point<K, T>> {
        self.points.get(index)
    }

    /// Recompute the cached body length with a counting encoder
    fn refresh_body_len(&mut self) {
        let mut counter = ByteCounter::new();
        for point in &self.points {
            let _ = line::write_point(&mut counter, &self.sensor_name, point);
        }
        self.body_len = counter.len().saturating_sub(CRLF.len());
    }

    fn hit_overflow(&mut self, err: Error) -> Error {
        log::warn!("admission rejected: {}", err);
        self.overflow_hit = true;
        err
    }

    /// Legacy reactive check: refuse only once the body already exceeds
    /// the ceiling
    #[cfg(not(feature = "strict-admission"))]
    fn pair_would_overflow(&self, _pair_len: usize) -> bool {
        self.body_len > B
    }

    /// Projective check: refuse if appending the pair would exceed the
    /// ceiling
    #[cfg(feature = "strict-admission")]
    fn pair_would_overflow(&self, pair_len: usize) -> bool {
        self.body_len + pair_len > B
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> InfluxDbConfig<'static> {
        InfluxDbConfig {
            url: "https://influx.example.com:8086",
            token: "t0ken",
            org: "workshop",
            bucket: "telemetry",
            sensor_name: "BOX1",
        }
    }

    fn config_named(sensor_name: &str) -> InfluxDbConfig<'_> {
        InfluxDbConfig {
            sensor_name,
            ..config()
        }
    }

    #[test]
    fn test_add_point_increments_count() {
        let mut batch: Batch<4, 5, 1, 1024> = Batch::new(&config()).unwrap();

        assert_eq!(batch.point_count(), 0);
        batch.add_point("engine", "rpm", 1450.0).unwrap();
        assert_eq!(batch.point_count(), 1);
        batch.add_point("engine", "rpm", 1500.0).unwrap();
        assert_eq!(batch.point_count(), 2);
    }

    #[test]
    fn test_hard_limit_at_capacity() {
        let mut batch: Batch<2, 5, 1, 1024> = Batch::new(&config()).unwrap();

        batch.add_point("engine", "rpm", 1450.0).unwrap();
        batch.add_point("engine", "rpm", 1500.0).unwrap();

        let result = batch.add_point("engine", "rpm", 1550.0);
        assert_eq!(result, Err(Error::HardLimitReached));
        assert_eq!(batch.point_count(), 2);
        assert!(batch.overflowed(false));
    }

    #[test]
    fn test_round_trip_body() {
        let mut batch: Batch<4, 5, 1, 1024> = Batch::new(&config()).unwrap();

        batch
            .add_point_with_timestamp("sensor", "temp", 21.5, "100")
            .unwrap();
        batch.add_tag("a", "1").unwrap();

        assert_eq!(batch.body().unwrap(), "sensor,BOX=BOX1,a=1 temp=21.50 100");
    }

    #[test]
    fn test_body_lines_match_point_count() {
        let mut batch: Batch<4, 5, 1, 1024> = Batch::new(&config()).unwrap();

        batch
            .add_point_with_timestamp("engine", "rpm", 1450.0, "1")
            .unwrap();
        batch
            .add_point_with_timestamp("engine", "rpm", 1500.0, "2")
            .unwrap();
        batch
            .add_point_with_timestamp("engine", "rpm", 1550.0, "3")
            .unwrap();

        let body = batch.body().unwrap();
        let lines: heapless::Vec<&str, 8> = body.split(CRLF).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "engine,BOX=BOX1 rpm=1450.00 1");
        assert_eq!(lines[2], "engine,BOX=BOX1 rpm=1550.00 3");
    }

    #[test]
    fn test_body_idempotent() {
        let mut batch: Batch<4, 5, 1, 1024> = Batch::new(&config()).unwrap();
        batch.add_point("engine", "rpm", 1450.0).unwrap();
        batch.add_field("oil_temp", 85.0).unwrap();

        let first_len = {
            let body = batch.body().unwrap();
            assert_eq!(body, "engine,BOX=BOX1 rpm=1450.00,oil_temp=85.00 ");
            body.len()
        };
        assert_eq!(batch.body_len(), first_len);

        let second = batch.body().unwrap();
        assert_eq!(second, "engine,BOX=BOX1 rpm=1450.00,oil_temp=85.00 ");
        assert_eq!(batch.body_len(), first_len);
    }

    #[test]
    fn test_projective_reject_leaves_state() {
        // Sensor "B" keeps small lines at 17 bytes
        let mut batch: Batch<32, 5, 1, 64> = Batch::new(&config_named("B")).unwrap();

        batch.add_point("m", "k", 1.0).unwrap();
        batch.add_point("m", "k", 1.0).unwrap();
        let body_len = batch.body_len();

        // Candidate line: 32 + 5 + 1 + 1 + 32 + 1 + 4 + 1 + 0 + 2 = 79 bytes
        let long_name = "a".repeat(32);
        let long_key = "b".repeat(32);
        let result = batch.add_point(&long_name, &long_key, 1.0);

        assert_eq!(result, Err(Error::BodyLimitReached));
        assert_eq!(batch.point_count(), 2);
        assert_eq!(batch.body_len(), body_len);
        assert!(batch.overflowed(false));
    }

    #[test]
    fn test_overflow_sticky_across_successes() {
        let mut batch: Batch<32, 3, 1, 128> = Batch::new(&config_named("B")).unwrap();

        // 3 x 17-byte lines -> body_len 49
        for _ in 0..3 {
            batch.add_point("m", "k", 1.0).unwrap();
        }
        assert_eq!(batch.body_len(), 49);

        // Candidate line is 99 bytes: 49 + 99 + 2 > 128
        let long_name = "a".repeat(32);
        let long_key = "b".repeat(32);
        let timestamp = "c".repeat(20);
        let result = batch.add_point_with_timestamp(&long_name, &long_key, 1.0, &timestamp);
        assert_eq!(result, Err(Error::BodyLimitReached));

        // Ten subsequent successful additions leave the flag set
        for _ in 0..10 {
            batch.clear_last_point();
            batch.add_point("m", "k", 1.0).unwrap();
            assert!(batch.overflowed(false));
        }

        assert!(batch.overflowed(true));
        assert!(!batch.overflowed(false));
    }

    #[test]
    fn test_clear_points_resets_everything() {
        let mut batch: Batch<2, 5, 1, 1024> = Batch::new(&config()).unwrap();

        batch.add_point("engine", "rpm", 1450.0).unwrap();
        batch.add_point("engine", "rpm", 1500.0).unwrap();
        let _ = batch.add_point("engine", "rpm", 1550.0);
        assert!(batch.overflowed(false));

        batch.clear_points();

        assert_eq!(batch.point_count(), 0);
        assert!(!batch.overflowed(false));
        assert_eq!(batch.body().unwrap(), "");
        assert_eq!(batch.body_len(), 0);
    }

    #[test]
    fn test_field_hard_limit_leaves_prior_slots() {
        let mut batch: Batch<4, 3, 1, 1024> = Batch::new(&config()).unwrap();

        batch.add_point("engine", "rpm", 1450.0).unwrap();
        batch.add_field("oil_temp", 85.0).unwrap();
        batch.add_field("coolant", 78.5).unwrap();

        let result = batch.add_field("boost", 1.2);
        assert_eq!(result, Err(Error::HardLimitReached));
        assert!(batch.overflowed(false));

        let point = batch.point(0).unwrap();
        assert_eq!(point.field_count(), 3);
        assert_eq!(point.fields()[1].key, "oil_temp");
        assert_eq!(point.fields()[2].key, "coolant");
    }

    #[test]
    fn test_add_field_targets_last_point() {
        let mut batch: Batch<4, 5, 1, 1024> = Batch::new(&config()).unwrap();

        batch.add_point("first", "rpm", 1450.0).unwrap();
        batch.add_point("second", "rpm", 1500.0).unwrap();
        batch.add_field("oil_temp", 85.0).unwrap();

        assert_eq!(batch.point(0).unwrap().field_count(), 1);
        assert_eq!(batch.point(1).unwrap().field_count(), 2);
    }

    #[test]
    fn test_add_field_at_index() {
        let mut batch: Batch<4, 5, 1, 1024> = Batch::new(&config()).unwrap();

        batch.add_point("first", "rpm", 1450.0).unwrap();
        batch.add_point("second", "rpm", 1500.0).unwrap();
        batch.add_field_at(0, "oil_temp", 85.0).unwrap();

        assert_eq!(batch.point(0).unwrap().field_count(), 2);
        assert_eq!(batch.point(1).unwrap().field_count(), 1);

        let result = batch.add_field_at(5, "boost", 1.2);
        assert_eq!(result, Err(Error::NoSuchPoint));
    }

    #[test]
    fn test_mutations_on_empty_batch() {
        let mut batch: Batch<4, 5, 1, 1024> = Batch::new(&config()).unwrap();

        assert_eq!(batch.add_field("rpm", 1.0), Err(Error::NoSuchPoint));
        assert_eq!(batch.add_tag("bank", "port"), Err(Error::NoSuchPoint));

        // Popping an empty batch is a no-op
        batch.clear_last_point();
        assert_eq!(batch.point_count(), 0);
        assert!(!batch.overflowed(false));
    }

    #[test]
    fn test_tag_hard_limit() {
        let mut batch: Batch<4, 5, 1, 1024> = Batch::new(&config()).unwrap();

        batch.add_point("engine", "rpm", 1450.0).unwrap();
        batch.add_tag("bank", "port").unwrap();

        let result = batch.add_tag("cyl", "3");
        assert_eq!(result, Err(Error::HardLimitReached));
        assert!(batch.overflowed(false));
        assert_eq!(batch.point(0).unwrap().tag_count(), 1);
    }

    #[test]
    fn test_clear_last_point_pops_most_recent() {
        let mut batch: Batch<4, 5, 1, 1024> = Batch::new(&config()).unwrap();

        batch
            .add_point_with_timestamp("first", "rpm", 1450.0, "1")
            .unwrap();
        batch
            .add_point_with_timestamp("second", "rpm", 1500.0, "2")
            .unwrap();

        batch.clear_last_point();

        assert_eq!(batch.point_count(), 1);
        assert_eq!(batch.body().unwrap(), "first,BOX=BOX1 rpm=1450.00 1");
    }

    #[test]
    fn test_body_range() {
        let mut batch: Batch<4, 5, 1, 1024> = Batch::new(&config()).unwrap();

        batch
            .add_point_with_timestamp("engine", "rpm", 1.0, "1")
            .unwrap();
        batch
            .add_point_with_timestamp("engine", "rpm", 2.0, "2")
            .unwrap();
        batch
            .add_point_with_timestamp("engine", "rpm", 3.0, "3")
            .unwrap();
        let full_len = batch.body_len();

        // End is clamped to the point count
        let tail = batch.body_range(1, 99).unwrap();
        assert_eq!(
            tail,
            "engine,BOX=BOX1 rpm=2.00 2\r\nengine,BOX=BOX1 rpm=3.00 3"
        );

        // The cache follows the returned range until the next mutation
        let tail_len = tail.len();
        assert_eq!(batch.body_len(), tail_len);
        assert!(tail_len < full_len);

        batch.body().unwrap();
        assert_eq!(batch.body_len(), full_len);
    }

    #[cfg(not(feature = "strict-admission"))]
    #[test]
    fn test_reactive_check_allows_one_overshoot() {
        let mut batch: Batch<4, 5, 1, 64> = Batch::new(&config_named("B")).unwrap();

        batch.add_point("m", "k", 1.0).unwrap();
        assert_eq!(batch.body_len(), 15);

        // Each pair adds 26 bytes; the check only compares the cached
        // length, so the second addition overshoots the 64-byte ceiling
        let key = "d".repeat(20);
        batch.add_field(&key, 1.0).unwrap();
        assert_eq!(batch.body_len(), 41);
        batch.add_tag(&key, "1.00").unwrap();
        assert_eq!(batch.body_len(), 67);

        let result = batch.add_field(&key, 1.0);
        assert_eq!(result, Err(Error::BodyLimitReached));
        assert!(batch.overflowed(false));

        // The overshot body no longer fits the bounded buffer
        assert_eq!(batch.body(), Err(Error::BufferTooSmall));
    }

    #[cfg(feature = "strict-admission")]
    #[test]
    fn test_strict_check_refuses_overshoot() {
        let mut batch: Batch<4, 5, 1, 64> = Batch::new(&config_named("B")).unwrap();

        batch.add_point("m", "k", 1.0).unwrap();
        assert_eq!(batch.body_len(), 15);

        let key = "d".repeat(20);
        batch.add_field(&key, 1.0).unwrap();
        assert_eq!(batch.body_len(), 41);

        // 41 + 26 > 64: refused before the body can overshoot
        let result = batch.add_field(&key, 1.0);
        assert_eq!(result, Err(Error::BodyLimitReached));
        assert_eq!(batch.body_len(), 41);
    }

    #[test]
    fn test_set_sensor_name_reencodes() {
        let mut batch: Batch<4, 5, 1, 1024> = Batch::new(&config()).unwrap();
        batch
            .add_point_with_timestamp("sensor", "temp", 21.5, "100")
            .unwrap();

        batch.set_sensor_name("BOX2").unwrap();

        assert_eq!(batch.sensor_name(), "BOX2");
        assert_eq!(batch.body().unwrap(), "sensor,BOX=BOX2 temp=21.50 100");
    }

    #[test]
    fn test_endpoint_exposed() {
        let mut batch: Batch<4, 5, 1, 1024> = Batch::new(&config()).unwrap();

        assert_eq!(
            batch.endpoint().path(),
            "/api/v2/write?org=workshop&bucket=telemetry&precision=s"
        );

        batch.endpoint_mut().set_content_type("text/plain").unwrap();
        assert_eq!(batch.endpoint().headers()[2].value, "text/plain");
    }

    #[test]
    fn test_capacity_accessors() {
        let batch: Batch<4, 5, 1, 1024> = Batch::new(&config()).unwrap();

        assert_eq!(batch.capacity(), 4);
        assert_eq!(batch.max_body_size(), 1024);
        assert!(batch.is_empty());
        assert!(!batch.is_full());
    }
}
