//! A client for sending metrics to a [Graphite][graphite] server using its [plaintext protocol][plaintext].
//!
//! [graphite]: https://graphiteapp.org/
//! [plaintext]: https://graphite.readthedocs.io/en/latest/feeding-carbon.html#the-plaintext-protocol
//!
//! # Usage
//!
//! ```no_run
//! # use metrics_exporter_graphite::{Graphite, Metric};
//! // Connect to a Graphite server over TCP, prefixing every metric with `web01`.
//! let mut graphite = Graphite::with_prefix("graphite.local", 2003, "web01").expect("failed to connect");
//!
//! // Send a single metric, timestamped with the current time...
//! graphite.simple_send("requests.count", "42").expect("failed to send");
//!
//! // ...or a batch of metrics. A timestamp of zero is replaced with the current time.
//! let metrics = [Metric::from_float("cpu.load", 0.5, 0), Metric::from_integer("mem.free", 1024, 0)];
//! graphite.send_metrics(&metrics).expect("failed to send");
//! ```
//!
//! For anything beyond the defaults, such as changing the connect timeout, use [`GraphiteBuilder`]:
//!
//! ```no_run
//! # use std::time::Duration;
//! # use metrics_exporter_graphite::{GraphiteBuilder, Protocol};
//! let graphite = GraphiteBuilder::new(Protocol::Tcp, "graphite.local", 2003)
//!     .with_prefix("web01")
//!     .with_connect_timeout(Duration::from_secs(1))
//!     .build()
//!     .expect("failed to connect");
//! ```
//!
//! # Wire format
//!
//! Every metric is sent as a single line in the form of `[<prefix>.]<name> <value> <timestamp>\n`, where the timestamp
//! is in seconds since the Unix epoch. There is no handshake, framing, or acknowledgement.
//!
//! # Transports
//!
//! ## TCP
//!
//! Metrics are buffered and written to the connection in as few writes as possible. The buffer is always flushed
//! before a send returns, so no metrics are ever left sitting in the buffer between sends.
//!
//! ## UDP
//!
//! Every metric is sent as its own datagram.
//!
//! ## No-op
//!
//! Metrics aren't sent anywhere. Instead, each metric is handed to a [`MetricLogger`], which by default emits it as a
//! `tracing` event. This makes it easy to keep Graphite optional in an application. Logging can be turned off
//! entirely, in which case metrics are simply dropped.
//!
//! # Error handling
//!
//! The client does not retry, reconnect, or buffer metrics across failures: every failure is returned to the caller
//! immediately. If a write fails partway through a batch, the remainder of the batch is not sent. Calling
//! [`Graphite::connect`] again replaces the current connection with a fresh one.

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]

mod builder;
pub use self::builder::GraphiteBuilder;

mod client;
pub use self::client::Graphite;

mod clock;
pub use self::clock::{Clock, SystemClock};

mod encoder;

mod error;
pub use self::error::{GraphiteError, ParseProtocolError};

mod logger;
pub use self::logger::{MetricLogger, TracingLogger};

mod metric;
pub use self::metric::Metric;

mod sender;

mod shared;
pub use self::shared::SharedGraphite;

mod transport;
pub use self::transport::Protocol;
