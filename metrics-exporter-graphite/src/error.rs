use std::io;

use thiserror::Error;

/// Errors that could occur while connecting to, or sending metrics to, a Graphite server.
#[derive(Debug, Error)]
pub enum GraphiteError {
    /// Failed to resolve the remote address.
    #[error("failed to resolve address '{address}': {source}")]
    Resolve {
        /// The address that was being resolved, in `host:port` form.
        address: String,

        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// Failed to establish a connection to the remote address.
    #[error("failed to connect to '{address}': {source}")]
    Connect {
        /// The address that was being connected to, in `host:port` form.
        address: String,

        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// Failed to write or flush metrics to the connection.
    ///
    /// Any metrics in the batch after the one that failed were not sent.
    #[error("failed to send metrics: {0}")]
    Io(#[from] io::Error),

    /// The client has no active connection.
    #[error("not connected")]
    NotConnected,
}

/// An unrecognized protocol name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid protocol '{protocol}' (expected 'tcp', 'udp', or 'nop')")]
pub struct ParseProtocolError {
    protocol: String,
}

impl ParseProtocolError {
    pub(crate) fn new<S: Into<String>>(protocol: S) -> Self {
        Self { protocol: protocol.into() }
    }

    /// Returns the protocol name that failed to parse.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }
}
