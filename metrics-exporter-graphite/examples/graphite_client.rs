use std::{env, thread::sleep, time::Duration};

use metrics_exporter_graphite::{Graphite, GraphiteBuilder, Metric, Protocol};

fn main() {
    tracing_subscriber::fmt::init();

    // Pick the protocol from the environment, falling back to logging metrics locally.
    let protocol = env::var("GRAPHITE_PROTOCOL")
        .ok()
        .map(|p| p.parse::<Protocol>().expect("invalid GRAPHITE_PROTOCOL"))
        .unwrap_or(Protocol::Nop);
    let host = env::var("GRAPHITE_HOST").unwrap_or_else(|_| "localhost".to_string());

    let mut graphite: Graphite = GraphiteBuilder::new(protocol, host, 2003)
        .with_prefix("graphite_client_example")
        .build()
        .expect("failed to connect to Graphite");

    let mut iterations = 0;
    loop {
        iterations += 1;

        let metrics = [
            Metric::from_integer("loop.iterations", iterations, 0),
            Metric::from_float("loop.ratio", 1.0 / iterations as f64, 0),
        ];

        if let Err(e) = graphite.send_metrics(&metrics) {
            tracing::error!(error = %e, "Failed to send metrics, reconnecting.");
            if let Err(e) = graphite.connect() {
                tracing::error!(error = %e, "Failed to reconnect.");
            }
        }

        sleep(Duration::from_secs(1));
    }
}
