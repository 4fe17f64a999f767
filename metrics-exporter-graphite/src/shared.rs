use std::sync::Arc;

use parking_lot::Mutex;

use crate::{Graphite, GraphiteError, Metric};

/// A [`Graphite`] client that can be shared between threads.
///
/// Every operation locks the underlying client for its whole duration, including any network I/O, so concurrent
/// callers are serialized. Clones refer to the same client and connection.
#[derive(Clone, Debug)]
pub struct SharedGraphite {
    inner: Arc<Mutex<Graphite>>,
}

impl SharedGraphite {
    /// Creates a new `SharedGraphite` wrapping the given client.
    pub fn new(graphite: Graphite) -> Self {
        Self { inner: Arc::new(Mutex::new(graphite)) }
    }

    /// Runs `f` with exclusive access to the underlying client.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Graphite) -> R,
    {
        f(&mut *self.inner.lock())
    }

    /// Connects to the configured host and port, replacing any existing connection.
    ///
    /// See [`Graphite::connect`].
    ///
    /// # Errors
    ///
    /// If a connection cannot be established, an error will be returned.
    pub fn connect(&self) -> Result<(), GraphiteError> {
        self.inner.lock().connect()
    }

    /// Closes the current connection.
    ///
    /// See [`Graphite::disconnect`].
    ///
    /// # Errors
    ///
    /// If the client is not connected, an error will be returned.
    pub fn disconnect(&self) -> Result<(), GraphiteError> {
        self.inner.lock().disconnect()
    }

    /// Sends a single metric.
    ///
    /// # Errors
    ///
    /// If the client is not connected, or writing to the connection fails, an error will be returned.
    pub fn send_metric(&self, metric: &Metric) -> Result<(), GraphiteError> {
        self.inner.lock().send_metric(metric)
    }

    /// Sends a batch of metrics.
    ///
    /// # Errors
    ///
    /// If the client is not connected, or writing to the connection fails, an error will be returned.
    pub fn send_metrics(&self, metrics: &[Metric]) -> Result<(), GraphiteError> {
        self.inner.lock().send_metrics(metrics)
    }

    /// Sends a single metric with the given name and value, timestamped with the current time.
    ///
    /// # Errors
    ///
    /// If the client is not connected, or writing to the connection fails, an error will be returned.
    pub fn simple_send<N, V>(&self, name: N, value: V) -> Result<(), GraphiteError>
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.inner.lock().simple_send(name, value)
    }
}

impl From<Graphite> for SharedGraphite {
    fn from(graphite: Graphite) -> Self {
        SharedGraphite::new(graphite)
    }
}
