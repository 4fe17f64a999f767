use tracing::info;

use crate::Metric;

/// A destination for metrics sent through a disabled (no-op) client.
///
/// A disabled client performs no network I/O. Instead, unless logging has been turned off, every metric handed to it
/// is passed to its `MetricLogger`, one call per metric.
pub trait MetricLogger: Send + Sync {
    /// Logs a single metric.
    fn log(&self, metric: &Metric);
}

/// A [`MetricLogger`] that emits each metric as a `tracing` event at the `INFO` level.
///
/// Events only go anywhere once the application has installed a `tracing` subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl MetricLogger for TracingLogger {
    fn log(&self, metric: &Metric) {
        info!(target: "metrics_exporter_graphite", "Graphite: {}", metric);
    }
}

impl<F> MetricLogger for F
where
    F: Fn(&Metric) + Send + Sync,
{
    fn log(&self, metric: &Metric) {
        self(metric);
    }
}

#[cfg(test)]
mod tests {
    use std::{io, sync::Arc};

    use parking_lot::Mutex;

    use super::{MetricLogger, TracingLogger};
    use crate::Metric;

    #[derive(Clone, Default)]
    struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn tracing_logger_emits_one_event_per_metric() {
        let output = CapturedOutput::default();
        let writer = output.clone();
        let subscriber = tracing_subscriber::fmt().with_writer(move || writer.clone()).finish();

        tracing::subscriber::with_default(subscriber, || {
            TracingLogger.log(&Metric::new("cpu.load", "0.5", 1_700_000_000));
            TracingLogger.log(&Metric::default());
        });

        let output = String::from_utf8(output.0.lock().clone()).unwrap();
        let lines = output.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].contains("Graphite: cpu.load 0.5 2023-11-14 22:13:20"));
        assert!(lines[1].contains("Graphite:   1970-01-01 00:00:00"));
    }
}
