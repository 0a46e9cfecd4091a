//! Prometheus-backed metrics adapters, behind the `metrics` feature.

mod prometheus_limits;

pub use prometheus_limits::PrometheusLimitDecisionMetrics;
