use crate::application::router::RouterSettings;
use crate::domain::reading::DEFAULT_PRIMARY_SOURCE_ID;
use crate::domain::series_window::DEFAULT_WINDOW_CAPACITY;
use crate::domain::trend::DEFAULT_SLOPE_THRESHOLD;
use crate::infrastructure::telemetry_listener::DEFAULT_MAX_LINE_LENGTH;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MonitorConfig {
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default)]
    pub listener: ListenerSettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Sensor identifier -> display name
    #[serde(default)]
    pub sensor_names: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MonitorSettings {
    pub primary_source_id: i32,
    pub window_capacity: usize,
    pub slope_threshold: f64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            primary_source_id: DEFAULT_PRIMARY_SOURCE_ID,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            slope_threshold: DEFAULT_SLOPE_THRESHOLD,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ListenerSettings {
    /// Accept base station connections on `telemetry_addr`
    pub enabled: bool,
    pub telemetry_addr: String,
    /// Also read telemetry lines from stdin
    pub read_stdin: bool,
    /// Longer lines are dropped as malformed
    pub max_line_length: usize,
}

impl Default for ListenerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            telemetry_addr: "0.0.0.0:9000".to_string(),
            read_stdin: false,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpSettings {
    pub addr: String,
    pub notice_buffer: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            notice_buffer: 64,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.monitor.window_capacity < 2 {
            anyhow::bail!(
                "monitor.window_capacity must be at least 2, got {}",
                self.monitor.window_capacity
            );
        }
        if !self.monitor.slope_threshold.is_finite() || self.monitor.slope_threshold <= 0.0 {
            anyhow::bail!(
                "monitor.slope_threshold must be a positive number, got {}",
                self.monitor.slope_threshold
            );
        }
        if self.listener.max_line_length == 0 {
            anyhow::bail!("listener.max_line_length must be greater than zero");
        }
        if self.http.notice_buffer == 0 {
            anyhow::bail!("http.notice_buffer must be greater than zero");
        }
        Ok(())
    }

    pub fn router_settings(&self) -> RouterSettings {
        RouterSettings {
            primary_source_id: self.monitor.primary_source_id,
            window_capacity: self.monitor.window_capacity,
            slope_threshold: self.monitor.slope_threshold,
            sensor_names: self.sensor_names.clone(),
        }
    }
}

/// Load `config/monitor.{toml,...}` if present, overridden by `MONITOR__*`
/// environment variables (e.g. `MONITOR__MONITOR__SLOPE_THRESHOLD=2.5`).
pub fn load_monitor_config() -> anyhow::Result<MonitorConfig> {
    load_monitor_config_from("config/monitor")
}

pub fn load_monitor_config_from(path: &str) -> anyhow::Result<MonitorConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(config::Environment::with_prefix("MONITOR").separator("__"))
        .build()?;

    let config: MonitorConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = load_monitor_config_from("config/does-not-exist").unwrap();
        assert_eq!(config.monitor.primary_source_id, 220);
        assert_eq!(config.monitor.window_capacity, 3);
        assert_eq!(config.monitor.slope_threshold, 1.0);
        assert_eq!(config.http.addr, "0.0.0.0:8080");
        assert!(config.listener.enabled);
        assert!(!config.listener.read_stdin);
        assert_eq!(config.listener.max_line_length, 1024);
    }

    #[test]
    fn test_parse_toml_source() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [monitor]
                primary_source_id = 17
                slope_threshold = 2.5

                [listener]
                read_stdin = true

                [sensor_names]
                a1 = "Top Sensor"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: MonitorConfig = settings.try_deserialize().unwrap();

        assert_eq!(config.monitor.primary_source_id, 17);
        assert_eq!(config.monitor.window_capacity, 3);
        assert!(config.listener.read_stdin);
        assert!(config.listener.enabled);
        assert_eq!(config.listener.telemetry_addr, "0.0.0.0:9000");

        let router = config.router_settings();
        assert_eq!(router.slope_threshold, 2.5);
        assert_eq!(router.sensor_names.get("a1").map(String::as_str), Some("Top Sensor"));
    }

    #[test]
    fn test_tcp_listener_can_be_disabled() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [listener]
                enabled = false
                read_stdin = true
                max_line_length = 256
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: MonitorConfig = settings.try_deserialize().unwrap();

        assert!(!config.listener.enabled);
        assert!(config.listener.read_stdin);
        assert_eq!(config.listener.max_line_length, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_degenerate_windows() {
        let mut config = MonitorConfig::default();
        assert!(config.validate().is_ok());

        config.monitor.window_capacity = 1;
        assert!(config.validate().is_err());

        config.monitor.window_capacity = 3;
        config.monitor.slope_threshold = 0.0;
        assert!(config.validate().is_err());

        config.monitor.slope_threshold = 1.0;
        config.listener.max_line_length = 0;
        assert!(config.validate().is_err());
    }
}
