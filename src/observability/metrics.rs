use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the global Prometheus recorder and start its scrape endpoint.
pub fn init_metrics(bind_address: &str, port: u16) {
    let addr: SocketAddr = format!("{}:{}", bind_address, port)
        .parse()
        .expect("invalid metrics listen address");

    let builder = PrometheusBuilder::new().with_http_listener(addr);

    builder
        .install()
        .expect("failed to install Prometheus recorder");
}

pub const METRIC_CONNECTIONS_TOTAL: &str = "latticedb_connections_total";
pub const METRIC_ACTIVE_CONNECTIONS: &str = "latticedb_active_connections";
pub const METRIC_COMMANDS_TOTAL: &str = "latticedb_commands_total";
pub const METRIC_COMMAND_ERRORS_TOTAL: &str = "latticedb_command_errors_total";
pub const METRIC_COMMAND_LATENCY: &str = "latticedb_command_latency_seconds";
