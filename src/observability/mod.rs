//! Observability: structured logging setup lives in `main`, Prometheus
//! metric names and initialization live here.

pub mod metrics;
