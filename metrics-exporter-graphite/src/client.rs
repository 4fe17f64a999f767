use std::{fmt, slice, sync::Arc, time::Duration};

use tracing::{debug, trace};

use crate::{
    clock::Clock,
    encoder::LineEncoder,
    logger::MetricLogger,
    sender::{send_buffered, send_datagrams},
    transport::{DatagramWriter, Protocol, Transport},
    GraphiteBuilder, GraphiteError, Metric,
};

/// A client for sending metrics to a Graphite server.
///
/// # Connection lifecycle
///
/// Clients for [`Protocol::Tcp`] and [`Protocol::Udp`] must be connected before metrics can be sent. All of the
/// constructors connect the client immediately, and [`connect`][Graphite::connect] can be called again at any point to
/// replace the current connection with a fresh one. Nothing is done automatically when sending fails: the error is
/// returned as-is, and it is up to the caller to reconnect if they wish to.
///
/// Clients for [`Protocol::Nop`] never connect to anything, and never fail to send. Metrics sent to them are logged
/// instead, unless logging has been disabled.
///
/// # Concurrency
///
/// All operations are synchronous, and block the calling thread while connecting or writing. Sending and connecting
/// require exclusive access to the client, so sharing one between threads requires external synchronization, such as
/// [`SharedGraphite`][crate::SharedGraphite].
pub struct Graphite {
    host: String,
    port: u16,
    encoder: LineEncoder,
    transport: Transport,
    logger: Arc<dyn MetricLogger>,
    clock: Arc<dyn Clock>,
}

impl Graphite {
    /// Creates a client that sends metrics over TCP, and connects it.
    ///
    /// # Errors
    ///
    /// If the client cannot connect, an error will be returned.
    pub fn new<H>(host: H, port: u16) -> Result<Self, GraphiteError>
    where
        H: Into<String>,
    {
        GraphiteBuilder::new(Protocol::Tcp, host, port).build()
    }

    /// Creates a client that sends metrics over TCP with the given namespace prefix, and connects it.
    ///
    /// # Errors
    ///
    /// If the client cannot connect, an error will be returned.
    pub fn with_prefix<H, P>(host: H, port: u16, prefix: P) -> Result<Self, GraphiteError>
    where
        H: Into<String>,
        P: Into<String>,
    {
        GraphiteBuilder::new(Protocol::Tcp, host, port).with_prefix(prefix).build()
    }

    /// Creates a client that sends metrics over UDP, and connects it.
    ///
    /// # Errors
    ///
    /// If the address cannot be resolved, or the socket cannot be created, an error will be returned.
    pub fn udp<H>(host: H, port: u16) -> Result<Self, GraphiteError>
    where
        H: Into<String>,
    {
        GraphiteBuilder::new(Protocol::Udp, host, port).build()
    }

    /// Creates a client that doesn't send metrics anywhere, and logs them instead.
    ///
    /// This is useful for making Graphite optional in an application without having to special-case every call site.
    pub fn nop<H>(host: H, port: u16) -> Self
    where
        H: Into<String>,
    {
        GraphiteBuilder::new(Protocol::Nop, host, port).build_unconnected()
    }

    /// Creates a client for the given protocol, with an optional namespace prefix, and connects it.
    ///
    /// # Errors
    ///
    /// If the client cannot connect, an error will be returned. Clients using [`Protocol::Nop`] never fail.
    pub fn from_protocol<H>(protocol: Protocol, host: H, port: u16, prefix: Option<&str>) -> Result<Self, GraphiteError>
    where
        H: Into<String>,
    {
        let mut builder = GraphiteBuilder::new(protocol, host, port);
        if let Some(prefix) = prefix {
            builder = builder.with_prefix(prefix);
        }
        builder.build()
    }

    /// Returns a [`GraphiteBuilder`] for configuring a client.
    pub fn builder<H>(protocol: Protocol, host: H, port: u16) -> GraphiteBuilder
    where
        H: Into<String>,
    {
        GraphiteBuilder::new(protocol, host, port)
    }

    pub(crate) fn from_parts(
        host: String, port: u16, encoder: LineEncoder, transport: Transport, logger: Arc<dyn MetricLogger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Graphite { host, port, encoder, transport, logger, clock }
    }

    /// Returns the host metrics are sent to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port metrics are sent to.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the protocol metrics are sent over.
    pub fn protocol(&self) -> Protocol {
        self.transport.protocol()
    }

    /// Returns the namespace prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.encoder.prefix()
    }

    /// Returns the connect timeout, if the client uses [`Protocol::Tcp`].
    pub fn connect_timeout(&self) -> Option<Duration> {
        match &self.transport {
            Transport::Stream { connect_timeout, .. } => Some(*connect_timeout),
            _ => None,
        }
    }

    /// Returns the capacity of the write buffer, if the client uses [`Protocol::Tcp`].
    pub fn buffer_capacity(&self) -> Option<usize> {
        match &self.transport {
            Transport::Stream { buffer, .. } => Some(buffer.capacity()),
            _ => None,
        }
    }

    /// Returns `true` if the client doesn't send metrics anywhere.
    pub fn is_nop(&self) -> bool {
        matches!(self.transport, Transport::Disabled { .. })
    }

    /// Returns `true` if the client currently has an open connection.
    ///
    /// Always `false` for clients using [`Protocol::Nop`].
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Returns `true` if metrics sent to a [`Protocol::Nop`] client are logged.
    ///
    /// Always `false` for other protocols.
    pub fn logging_enabled(&self) -> bool {
        matches!(self.transport, Transport::Disabled { logging: true })
    }

    /// Sets whether or not metrics sent to a [`Protocol::Nop`] client are logged.
    ///
    /// Has no effect for other protocols.
    pub fn set_logging_enabled(&mut self, enabled: bool) {
        if let Transport::Disabled { logging } = &mut self.transport {
            *logging = enabled;
        }
    }

    /// Connects to the configured host and port.
    ///
    /// If the client is already connected, the existing connection is closed first. If connecting fails, the client is
    /// left disconnected.
    ///
    /// Does nothing for clients using [`Protocol::Nop`].
    ///
    /// # Errors
    ///
    /// If the address cannot be resolved, or a connection cannot be established within the connect timeout, an error
    /// will be returned.
    pub fn connect(&mut self) -> Result<(), GraphiteError> {
        self.transport.connect(&self.host, self.port)
    }

    /// Closes the current connection.
    ///
    /// Does nothing for clients using [`Protocol::Nop`].
    ///
    /// # Errors
    ///
    /// If the client is not connected, [`GraphiteError::NotConnected`] will be returned.
    pub fn disconnect(&mut self) -> Result<(), GraphiteError> {
        self.transport.disconnect()
    }

    /// Sends a single metric.
    ///
    /// # Errors
    ///
    /// If the client is not connected, or writing to the connection fails, an error will be returned.
    pub fn send_metric(&mut self, metric: &Metric) -> Result<(), GraphiteError> {
        self.send_metrics(slice::from_ref(metric))
    }

    /// Sends a batch of metrics.
    ///
    /// Metrics are sent in order. Uninitialized metrics (see [`Metric`]) are skipped, except for clients using
    /// [`Protocol::Nop`], where every metric is logged.
    ///
    /// # Errors
    ///
    /// If the client is not connected, or writing to the connection fails, an error will be returned. When a write
    /// fails, none of the metrics after the failing one are sent, and there is no indication of how many metrics were
    /// sent before the failure.
    pub fn send_metrics(&mut self, metrics: &[Metric]) -> Result<(), GraphiteError> {
        let result = match &mut self.transport {
            Transport::Disabled { logging } => {
                if *logging {
                    for metric in metrics {
                        self.logger.log(metric);
                    }
                }
                return Ok(());
            }
            Transport::Stream { buffer, socket, .. } => {
                let socket = socket.as_mut().ok_or(GraphiteError::NotConnected)?;
                send_buffered(socket, buffer, &self.encoder, self.clock.as_ref(), metrics)
            }
            Transport::Datagram { socket } => {
                let socket = socket.as_ref().ok_or(GraphiteError::NotConnected)?;
                send_datagrams(&mut DatagramWriter(socket), &self.encoder, self.clock.as_ref(), metrics)
            }
        };

        match result {
            Ok(metrics_sent) => {
                trace!(metrics_sent, protocol = %self.transport.protocol(), "Sent metrics to Graphite.");
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, protocol = %self.transport.protocol(), "Failed to send metrics to Graphite.");
                Err(GraphiteError::Io(e))
            }
        }
    }

    /// Sends a single metric with the given name and value, timestamped with the current time.
    ///
    /// # Errors
    ///
    /// If the client is not connected, or writing to the connection fails, an error will be returned.
    pub fn simple_send<N, V>(&mut self, name: N, value: V) -> Result<(), GraphiteError>
    where
        N: Into<String>,
        V: Into<String>,
    {
        let metric = Metric::new(name, value, self.clock.now());
        self.send_metric(&metric)
    }
}

impl fmt::Debug for Graphite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graphite")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("protocol", &self.protocol())
            .field("prefix", &self.prefix())
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::Graphite;
    use crate::{GraphiteBuilder, GraphiteError, Metric, Protocol};

    fn recording_nop() -> (Graphite, Arc<Mutex<Vec<Metric>>>) {
        let logged = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&logged);
        let graphite = GraphiteBuilder::new(Protocol::Nop, "localhost", 2003)
            .with_logger(move |metric: &Metric| sink.lock().push(metric.clone()))
            .with_clock(|| 1_700_000_000_i64)
            .build()
            .unwrap();

        (graphite, logged)
    }

    #[test]
    fn nop_logs_every_metric() {
        let (mut graphite, logged) = recording_nop();
        let metrics = vec![Metric::new("a", "1", 1), Metric::default(), Metric::new("b", "2", 0)];

        graphite.send_metrics(&metrics).unwrap();

        // Uninitialized metrics are logged too, and timestamps are left as-is.
        assert_eq!(*logged.lock(), metrics);
    }

    #[test]
    fn nop_without_logging() {
        let (mut graphite, logged) = recording_nop();
        graphite.set_logging_enabled(false);
        assert!(!graphite.logging_enabled());

        graphite.send_metrics(&[Metric::new("a", "1", 1), Metric::default()]).unwrap();
        graphite.simple_send("b", "2").unwrap();

        assert!(logged.lock().is_empty());
    }

    #[test]
    fn nop_never_fails() {
        let (mut graphite, logged) = recording_nop();

        graphite.send_metrics(&[]).unwrap();
        graphite.send_metric(&Metric::default()).unwrap();
        graphite.connect().unwrap();
        graphite.disconnect().unwrap();
        graphite.disconnect().unwrap();
        graphite.send_metric(&Metric::new("a", "1", 1)).unwrap();

        assert_eq!(logged.lock().len(), 2);
        assert!(!graphite.is_connected());
    }

    #[test]
    fn nop_simple_send_uses_clock() {
        let (mut graphite, logged) = recording_nop();

        graphite.simple_send("cpu.load", "0.5").unwrap();

        assert_eq!(*logged.lock(), vec![Metric::new("cpu.load", "0.5", 1_700_000_000)]);
    }

    #[test]
    fn nop_constructor() {
        let graphite = Graphite::nop("localhost", 2003);

        assert!(graphite.is_nop());
        assert!(graphite.logging_enabled());
        assert_eq!(graphite.protocol(), Protocol::Nop);
        assert_eq!(graphite.connect_timeout(), None);
    }

    #[test]
    fn send_without_connection() {
        for protocol in [Protocol::Tcp, Protocol::Udp] {
            let mut graphite = GraphiteBuilder::new(protocol, "127.0.0.1", 2003).build_unconnected();

            let result = graphite.send_metric(&Metric::new("a", "1", 1));
            assert!(matches!(result, Err(GraphiteError::NotConnected)));

            let result = graphite.simple_send("a", "1");
            assert!(matches!(result, Err(GraphiteError::NotConnected)));

            assert!(matches!(graphite.disconnect(), Err(GraphiteError::NotConnected)));
        }
    }

    #[test]
    fn logging_flag_only_applies_to_nop() {
        let mut graphite = GraphiteBuilder::new(Protocol::Udp, "127.0.0.1", 2003).build_unconnected();
        graphite.set_logging_enabled(true);

        assert!(!graphite.logging_enabled());
    }

    #[test]
    fn debug_output() {
        let graphite = GraphiteBuilder::new(Protocol::Tcp, "localhost", 2003).with_prefix("app").build_unconnected();
        let debug = format!("{:?}", graphite);

        assert!(debug.contains("host: \"localhost\""));
        assert!(debug.contains("protocol: Tcp"));
        assert!(debug.contains("prefix: Some(\"app\")"));
        assert!(debug.contains("connected: false"));
    }
}
