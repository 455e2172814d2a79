pub mod telemetry_setup;

pub use telemetry_setup::{init_logging, init_metrics, init_observability, LogFormat};
