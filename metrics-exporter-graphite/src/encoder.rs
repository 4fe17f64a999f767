use crate::{clock::Clock, Metric};

/// Encodes metrics into the Graphite plaintext line format.
///
/// Each metric is rendered as a single line in the form of `[<prefix>.]<name> <value> <timestamp>\n`.
pub(crate) struct LineEncoder {
    prefix: Option<String>,
}

impl LineEncoder {
    /// Creates a new `LineEncoder` with the given namespace prefix.
    ///
    /// An empty prefix is treated the same as no prefix.
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix: prefix.filter(|p| !p.is_empty()) }
    }

    /// Returns the namespace prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Appends the encoded line for `metric` to `buf`.
    ///
    /// If the metric has no timestamp, the current time from `clock` is used instead.
    pub fn encode(&self, metric: &Metric, clock: &dyn Clock, buf: &mut Vec<u8>) {
        if let Some(prefix) = &self.prefix {
            buf.extend_from_slice(prefix.as_bytes());
            buf.push(b'.');
        }

        buf.extend_from_slice(metric.name().as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(metric.value().as_bytes());
        buf.push(b' ');

        let timestamp = match metric.timestamp() {
            0 => clock.now(),
            ts => ts,
        };
        let mut int_writer = itoa::Buffer::new();
        buf.extend_from_slice(int_writer.format(timestamp).as_bytes());

        buf.push(b'\n');
    }
}
