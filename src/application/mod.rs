// Application layer - Use cases and ports
pub mod alert_sink;
pub mod line_source;
pub mod monitor_service;
pub mod router;
