use std::{
    fmt,
    io::{self, Write},
    net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream, ToSocketAddrs as _, UdpSocket},
    str::FromStr,
    time::Duration,
};

use tracing::debug;

use crate::{builder::DEFAULT_CONNECT_TIMEOUT, error::ParseProtocolError, sender::StreamBuffer, GraphiteError};

/// Transport protocol used to send metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Metrics are sent over a TCP connection.
    Tcp,

    /// Metrics are sent as UDP datagrams, one metric per datagram.
    Udp,

    /// Metrics are not sent at all, and are logged instead.
    Nop,
}

impl Protocol {
    /// Returns the name of the protocol.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Nop => "nop",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ParseProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            "nop" => Ok(Protocol::Nop),
            _ => Err(ParseProtocolError::new(s)),
        }
    }
}

/// Writes to a connected UDP socket, one datagram per write.
pub(crate) struct DatagramWriter<'a>(pub &'a UdpSocket);

impl Write for DatagramWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.send(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Transport state of a client.
///
/// Each variant only carries what its protocol needs. The socket, when present, is exclusively owned by the transport
/// and is closed when replaced or cleared.
pub(crate) enum Transport {
    /// Stream-oriented (TCP) transport.
    Stream { connect_timeout: Duration, buffer: StreamBuffer, socket: Option<TcpStream> },

    /// Datagram-oriented (UDP) transport.
    Datagram { socket: Option<UdpSocket> },

    /// No transport at all. Metrics are logged, if `logging` is `true`, and otherwise dropped.
    Disabled { logging: bool },
}

impl Transport {
    /// Creates a new, unconnected stream transport.
    ///
    /// A zero connect timeout is replaced with the default of 5 seconds.
    pub fn stream(connect_timeout: Duration, buffer_capacity: usize) -> Self {
        let connect_timeout = if connect_timeout.is_zero() { DEFAULT_CONNECT_TIMEOUT } else { connect_timeout };
        Transport::Stream { connect_timeout, buffer: StreamBuffer::new(buffer_capacity), socket: None }
    }

    /// Creates a new, unconnected datagram transport.
    pub fn datagram() -> Self {
        Transport::Datagram { socket: None }
    }

    /// Creates a new disabled transport.
    pub fn disabled(logging: bool) -> Self {
        Transport::Disabled { logging }
    }

    /// Returns the protocol of this transport.
    pub fn protocol(&self) -> Protocol {
        match self {
            Transport::Stream { .. } => Protocol::Tcp,
            Transport::Datagram { .. } => Protocol::Udp,
            Transport::Disabled { .. } => Protocol::Nop,
        }
    }

    /// Returns `true` if the transport currently holds a socket.
    pub fn is_connected(&self) -> bool {
        match self {
            Transport::Stream { socket, .. } => socket.is_some(),
            Transport::Datagram { socket } => socket.is_some(),
            Transport::Disabled { .. } => false,
        }
    }

    /// Connects to the given host and port.
    ///
    /// Any existing socket is closed first. If establishing the new socket fails, the transport is left without a
    /// socket.
    ///
    /// Does nothing for a disabled transport.
    ///
    /// # Errors
    ///
    /// If the address cannot be resolved, or no connection could be established to any of the resolved addresses, an
    /// error is returned.
    pub fn connect(&mut self, host: &str, port: u16) -> Result<(), GraphiteError> {
        match self {
            Transport::Stream { connect_timeout, socket, .. } => {
                if socket.take().is_some() {
                    debug!(host, port, "Closed existing TCP connection before reconnecting.");
                }

                *socket = Some(connect_stream(host, port, *connect_timeout)?);
                debug!(host, port, "Connected to Graphite over TCP.");
            }
            Transport::Datagram { socket } => {
                if socket.take().is_some() {
                    debug!(host, port, "Closed existing UDP socket before reconnecting.");
                }

                *socket = Some(connect_datagram(host, port)?);
                debug!(host, port, "Connected to Graphite over UDP.");
            }
            Transport::Disabled { .. } => {}
        }

        Ok(())
    }

    /// Closes the current socket.
    ///
    /// Does nothing for a disabled transport.
    ///
    /// # Errors
    ///
    /// If there is no socket to close, [`GraphiteError::NotConnected`] is returned.
    pub fn disconnect(&mut self) -> Result<(), GraphiteError> {
        let closed = match self {
            Transport::Stream { socket, .. } => socket.take().is_some(),
            Transport::Datagram { socket } => socket.take().is_some(),
            Transport::Disabled { .. } => return Ok(()),
        };

        if closed {
            debug!(protocol = %self.protocol(), "Disconnected from Graphite.");
            Ok(())
        } else {
            Err(GraphiteError::NotConnected)
        }
    }
}

fn display_address(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

fn resolve(host: &str, port: u16) -> Result<Vec<SocketAddr>, GraphiteError> {
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| GraphiteError::Resolve { address: display_address(host, port), source })?
        .collect::<Vec<_>>();

    if addrs.is_empty() {
        return Err(GraphiteError::Resolve {
            address: display_address(host, port),
            source: io::Error::new(io::ErrorKind::NotFound, "no addresses found"),
        });
    }

    Ok(addrs)
}

fn connect_stream(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, GraphiteError> {
    let addrs = resolve(host, port)?;

    // Try each resolved address in turn, keeping the last error if none of them work out.
    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!(%addr, error = %e, "Failed to connect to resolved address.");
                last_err = Some(e);
            }
        }
    }

    let source = last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses found"));
    Err(GraphiteError::Connect { address: display_address(host, port), source })
}

fn connect_datagram(host: &str, port: u16) -> Result<UdpSocket, GraphiteError> {
    let addrs = resolve(host, port)?;

    // Bind to the unspecified address of the same family as the first resolved peer, so that connecting to it can
    // actually succeed.
    let local_addr = match addrs[0] {
        SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
    };

    UdpSocket::bind(local_addr)
        .and_then(|socket| {
            socket.connect(&addrs[..])?;
            Ok(socket)
        })
        .map_err(|source| GraphiteError::Connect { address: display_address(host, port), source })
}
