use std::io::{self, Write};

use crate::{clock::Clock, encoder::LineEncoder, Metric};

/// Minimum amount of free space the stream buffer must have before another metric is encoded into it.
///
/// When the free space drops below this threshold, the buffer is flushed before encoding the next metric.
pub(crate) const FLUSH_THRESHOLD: usize = 512;

/// Buffers encoded metrics for stream-oriented transports.
///
/// Graphite lines are newline delimited, so any number of them can be concatenated and written in one go. Buffering
/// them up cuts down on the number of system calls needed to send a batch.
///
/// The buffer only ever holds the metrics of the batch currently being sent: it is always empty once a batch
/// completes, whether or not it completed successfully.
pub(crate) struct StreamBuffer {
    buf: Vec<u8>,
    capacity: usize,
}

impl StreamBuffer {
    /// Creates a new `StreamBuffer` with the given capacity.
    ///
    /// The capacity is raised to [`FLUSH_THRESHOLD`] if it is any smaller.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(FLUSH_THRESHOLD);
        Self { buf: Vec::with_capacity(capacity), capacity }
    }

    /// Returns the capacity of the buffer, in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of bytes that can be buffered before reaching capacity.
    fn available(&self) -> usize {
        self.capacity.saturating_sub(self.buf.len())
    }

    /// Writes out any buffered bytes to `sink`.
    ///
    /// The buffer is cleared even if the write fails, as the batch the bytes belong to is abandoned at that point.
    fn flush_into<W>(&mut self, sink: &mut W) -> io::Result<()>
    where
        W: Write + ?Sized,
    {
        if self.buf.is_empty() {
            return Ok(());
        }

        let result = sink.write_all(&self.buf);
        self.buf.clear();
        result
    }
}

/// Sends a batch of metrics over a stream-oriented transport.
///
/// Metrics are encoded into `buffer`, which is flushed to `sink` whenever its free space drops below
/// [`FLUSH_THRESHOLD`], and once more after the last metric. Uninitialized metrics are skipped.
///
/// Returns the number of metrics sent. If any write fails, the remaining metrics are not sent and the error is
/// returned.
pub(crate) fn send_buffered<W>(
    sink: &mut W, buffer: &mut StreamBuffer, encoder: &LineEncoder, clock: &dyn Clock, metrics: &[Metric],
) -> io::Result<usize>
where
    W: Write + ?Sized,
{
    let mut metrics_sent = 0;
    for metric in metrics.iter().filter(|m| !m.is_uninitialized()) {
        if buffer.available() < FLUSH_THRESHOLD {
            buffer.flush_into(sink)?;
        }

        encoder.encode(metric, clock, &mut buffer.buf);
        metrics_sent += 1;
    }

    buffer.flush_into(sink)?;
    sink.flush()?;

    Ok(metrics_sent)
}

/// Sends a batch of metrics over a datagram-oriented transport.
///
/// Each metric is encoded and written on its own, so that every metric is sent as a separate datagram. Uninitialized
/// metrics are skipped.
///
/// Returns the number of metrics sent. If any write fails, or only part of a metric could be written, the remaining
/// metrics are not sent and the error is returned.
pub(crate) fn send_datagrams<W>(
    sink: &mut W, encoder: &LineEncoder, clock: &dyn Clock, metrics: &[Metric],
) -> io::Result<usize>
where
    W: Write + ?Sized,
{
    let mut line = Vec::new();
    let mut metrics_sent = 0;
    for metric in metrics.iter().filter(|m| !m.is_uninitialized()) {
        line.clear();
        encoder.encode(metric, clock, &mut line);

        let written = sink.write(&line)?;
        if written != line.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("datagram truncated: wrote {} of {} bytes", written, line.len()),
            ));
        }

        metrics_sent += 1;
    }

    Ok(metrics_sent)
}
