// Infrastructure layer - External dependencies and adapters
pub mod broadcast_sink;
pub mod config;
pub mod line_decoder;
pub mod log_sink;
pub mod telemetry_listener;
