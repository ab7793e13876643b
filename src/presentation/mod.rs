// Presentation layer - HTTP views for external dashboards
pub mod app_state;
pub mod handlers;
