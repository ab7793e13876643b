// Domain layer - Readings, series windows, trend detection and notices
pub mod notice;
pub mod reading;
pub mod series_window;
pub mod trend;
