use std::{sync::Arc, time::Duration};

use crate::{
    clock::{Clock, SystemClock},
    encoder::LineEncoder,
    logger::{MetricLogger, TracingLogger},
    transport::{Protocol, Transport},
    Graphite, GraphiteError,
};

pub(crate) const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_BUFFER_CAPACITY: usize = 4096;

/// Builder for a Graphite client.
pub struct GraphiteBuilder {
    protocol: Protocol,
    host: String,
    port: u16,
    prefix: Option<String>,
    connect_timeout: Duration,
    buffer_capacity: usize,
    logging: bool,
    logger: Arc<dyn MetricLogger>,
    clock: Arc<dyn Clock>,
}

impl GraphiteBuilder {
    /// Creates a new `GraphiteBuilder` for sending metrics to the given host and port over the given protocol.
    pub fn new<H>(protocol: Protocol, host: H, port: u16) -> Self
    where
        H: Into<String>,
    {
        GraphiteBuilder {
            protocol,
            host: host.into(),
            port,
            prefix: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            logging: true,
            logger: Arc::new(TracingLogger),
            clock: Arc::new(SystemClock),
        }
    }

    /// Set the namespace prefix for all metrics.
    ///
    /// The prefix, followed by a `.`, is prepended to the name of every metric sent. An empty prefix is the same as no
    /// prefix.
    ///
    /// Defaults to no prefix.
    #[must_use]
    pub fn with_prefix<P>(mut self, prefix: P) -> Self
    where
        P: Into<String>,
    {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the connect timeout for TCP connections.
    ///
    /// This bounds how long establishing a connection may take. It does not apply to writes, which may block for as
    /// long as the operating system allows. A timeout of zero is replaced with the default.
    ///
    /// Only used when the protocol is [`Protocol::Tcp`].
    ///
    /// Defaults to 5 seconds.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the capacity of the write buffer for TCP connections.
    ///
    /// Metrics are buffered before being written to the connection, and the buffer is flushed whenever it has less than
    /// 512 bytes of free space left, as well as at the end of every batch. Capacities smaller than 512 bytes are raised
    /// to 512 bytes.
    ///
    /// Only used when the protocol is [`Protocol::Tcp`].
    ///
    /// Defaults to 4096 bytes.
    #[must_use]
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Sets whether or not metrics are logged when the protocol is [`Protocol::Nop`].
    ///
    /// Defaults to `true`.
    #[must_use]
    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    /// Set the logger used for metrics sent when the protocol is [`Protocol::Nop`].
    ///
    /// Defaults to [`TracingLogger`].
    #[must_use]
    pub fn with_logger<L>(mut self, logger: L) -> Self
    where
        L: MetricLogger + 'static,
    {
        self.logger = Arc::new(logger);
        self
    }

    /// Set the clock used to timestamp metrics that are sent without a timestamp.
    ///
    /// Defaults to [`SystemClock`].
    #[must_use]
    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Builds the client without connecting it.
    ///
    /// [`Graphite::connect`] must be called before any metrics can be sent, unless the protocol is [`Protocol::Nop`].
    pub fn build_unconnected(self) -> Graphite {
        let transport = match self.protocol {
            Protocol::Tcp => Transport::stream(self.connect_timeout, self.buffer_capacity),
            Protocol::Udp => Transport::datagram(),
            Protocol::Nop => Transport::disabled(self.logging),
        };

        Graphite::from_parts(
            self.host,
            self.port,
            LineEncoder::new(self.prefix),
            transport,
            self.logger,
            self.clock,
        )
    }

    /// Builds the client and connects it.
    ///
    /// # Errors
    ///
    /// If the client cannot connect to the configured host and port, an error will be returned. Clients using
    /// [`Protocol::Nop`] never fail to build.
    pub fn build(self) -> Result<Graphite, GraphiteError> {
        let mut graphite = self.build_unconnected();
        graphite.connect()?;
        Ok(graphite)
    }
}
