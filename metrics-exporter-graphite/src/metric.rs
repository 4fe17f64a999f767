use std::fmt;

use chrono::DateTime;

const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single metric data point.
///
/// The value is carried as a string so that it reaches the wire exactly as the caller rendered it, without any
/// round-tripping through a floating-point representation.
///
/// A timestamp of `0` means the timestamp is unset, and the current time will be used when the metric is encoded.
///
/// # Uninitialized metrics
///
/// A metric equal to [`Metric::default`] (empty name, empty value, zero timestamp) is considered uninitialized, and is
/// silently skipped when sending a batch over the network. This allows batches to be pre-sized with unused slots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Metric {
    name: String,
    value: String,
    timestamp: i64,
}

impl Metric {
    /// Creates a new `Metric`.
    pub fn new<N, V>(name: N, value: V, timestamp: i64) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        Self { name: name.into(), value: value.into(), timestamp }
    }

    /// Creates a new `Metric` with an integer value.
    pub fn from_integer<N>(name: N, value: i64, timestamp: i64) -> Self
    where
        N: Into<String>,
    {
        let mut int_writer = itoa::Buffer::new();
        Self::new(name, int_writer.format(value), timestamp)
    }

    /// Creates a new `Metric` with a floating-point value.
    ///
    /// The value is rendered with the shortest representation that round-trips, so `42.0` is sent as `42.0` and
    /// `0.1` as `0.1`.
    pub fn from_float<N>(name: N, value: f64, timestamp: i64) -> Self
    where
        N: Into<String>,
    {
        let mut float_writer = ryu::Buffer::new();
        Self::new(name, float_writer.format(value), timestamp)
    }

    /// Returns the name of the metric.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value of the metric.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the timestamp of the metric, in seconds since the Unix epoch.
    ///
    /// A value of `0` indicates that the timestamp is unset.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Returns `true` if this metric is uninitialized.
    ///
    /// See the type-level documentation for details.
    pub fn is_uninitialized(&self) -> bool {
        self.name.is_empty() && self.value.is_empty() && self.timestamp == 0
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.name, self.value)?;

        // Timestamps that chrono can't represent are shown as-is rather than dropped.
        match DateTime::from_timestamp(self.timestamp, 0) {
            Some(dt) => write!(f, "{}", dt.format(DISPLAY_TIMESTAMP_FORMAT)),
            None => write!(f, "{}", self.timestamp),
        }
    }
}
