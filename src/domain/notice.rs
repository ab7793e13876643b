// Operator-facing signals raised by the monitor
use super::reading::{SensorSlot, SeriesKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    /// A monitored series is climbing or falling faster than the threshold.
    ElevatedTrend {
        series_kind: SeriesKind,
        series_id: u32,
        slot: SensorSlot,
        source_id: i32,
        slope: f64,
        raised_at: DateTime<Utc>,
    },
    /// The base station reported which sensors are connected.
    TopologyDiscovered {
        count: usize,
        formatted_names: String,
        raised_at: DateTime<Utc>,
    },
}

impl Notice {
    pub fn event_name(&self) -> &'static str {
        match self {
            Notice::ElevatedTrend { .. } => "elevated_trend",
            Notice::TopologyDiscovered { .. } => "topology_discovered",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ElevatedTrend { series_kind: SeriesKind::Voc, slope, .. } => write!(
                f,
                "Detected elevated VOC levels in your fridge (slope {:.2}). Please check its contents for spoilage!",
                slope
            ),
            Notice::ElevatedTrend { series_kind: SeriesKind::Temperature, slope, .. } => write!(
                f,
                "Detected a rapid temperature change in your fridge (slope {:.2}).",
                slope
            ),
            Notice::TopologyDiscovered { count, formatted_names, .. } => write!(
                f,
                "We detected {} sensors connected to your base station and named them {}",
                count, formatted_names
            ),
        }
    }
}

/// Join names as "A, B and C".
pub fn format_name_list<S: AsRef<str>>(names: &[S]) -> String {
    match names {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [init @ .., last] => {
            let init: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{} and {}", init.join(", "), last.as_ref())
        }
    }
}
