// Reading router - owns the series windows and decides when to raise alerts
use crate::domain::notice::{Notice, format_name_list};
use crate::domain::reading::{
    DEFAULT_PRIMARY_SOURCE_ID, Reading, SensorSlot, SeriesKey, SeriesKind, TopologyEvent,
};
use crate::domain::series_window::{DEFAULT_WINDOW_CAPACITY, SeriesWindows};
use crate::domain::trend::{DEFAULT_SLOPE_THRESHOLD, TrendDetector};
use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub primary_source_id: i32,
    pub window_capacity: usize,
    pub slope_threshold: f64,
    /// Display names for sensor identifiers announced on `System` lines.
    pub sensor_names: HashMap<String, String>,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            primary_source_id: DEFAULT_PRIMARY_SOURCE_ID,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            slope_threshold: DEFAULT_SLOPE_THRESHOLD,
            sensor_names: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesSnapshot {
    pub series_id: u32,
    pub slot: SensorSlot,
    pub kind: SeriesKind,
    pub values: Vec<f64>,
    pub full: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouterSnapshot {
    pub primary_source_id: i32,
    pub window_capacity: usize,
    pub series: Vec<SeriesSnapshot>,
    pub latest: BTreeMap<SensorSlot, Reading>,
}

struct RouterState {
    windows: SeriesWindows,
    latest: BTreeMap<SensorSlot, Reading>,
}

/// Routes readings into per-slot series. Only the primary VOC series is
/// checked for trends; primary temperature and both secondary series are
/// tracked without evaluation.
pub struct ReadingRouter {
    primary_source_id: i32,
    detector: TrendDetector,
    sensor_names: HashMap<String, String>,
    state: Mutex<RouterState>,
}

impl ReadingRouter {
    pub fn new(settings: RouterSettings) -> Self {
        Self {
            primary_source_id: settings.primary_source_id,
            detector: TrendDetector::new(settings.slope_threshold),
            sensor_names: settings.sensor_names,
            state: Mutex::new(RouterState {
                windows: SeriesWindows::new(settings.window_capacity),
                latest: BTreeMap::new(),
            }),
        }
    }

    /// Push a reading into its slot's series. Returns an alert when the
    /// primary VOC window is full and its slope exceeds the threshold.
    pub fn route(&self, reading: &Reading) -> Option<Notice> {
        let slot = SensorSlot::for_source(reading.source_id, self.primary_source_id);
        let voc_key = SeriesKey::new(slot, SeriesKind::Voc);
        let temperature_key = SeriesKey::new(slot, SeriesKind::Temperature);

        // Both pushes and the window read happen under one lock.
        let mut state = self.state.lock();
        state.latest.insert(slot, *reading);
        let voc_full = state.windows.push(voc_key, reading.voc_concentration);
        state.windows.push(temperature_key, reading.temperature);

        if slot != SensorSlot::Primary || !voc_full {
            return None;
        }

        let values = state.windows.get(&voc_key)?.values();
        drop(state);

        let result = self.detector.evaluate(&values)?;
        tracing::debug!(
            series_id = voc_key.id(),
            slope = result.slope,
            triggered = result.triggered,
            "Evaluated VOC trend"
        );

        result.triggered.then(|| Notice::ElevatedTrend {
            series_kind: voc_key.kind,
            series_id: voc_key.id(),
            slot,
            source_id: reading.source_id,
            slope: result.slope,
            raised_at: Utc::now(),
        })
    }

    pub fn topology_notice(&self, event: &TopologyEvent) -> Notice {
        let names: Vec<&str> = event
            .sensor_ids
            .iter()
            .map(|id| self.sensor_names.get(id).unwrap_or(id).as_str())
            .collect();

        Notice::TopologyDiscovered {
            count: event.sensor_count(),
            formatted_names: format_name_list(&names),
            raised_at: Utc::now(),
        }
    }

    pub fn snapshot(&self) -> RouterSnapshot {
        let state = self.state.lock();
        let mut series: Vec<SeriesSnapshot> = state
            .windows
            .iter()
            .map(|(key, window)| SeriesSnapshot {
                series_id: key.id(),
                slot: key.slot,
                kind: key.kind,
                values: window.values(),
                full: window.is_full(),
            })
            .collect();
        series.sort_by_key(|s| s.series_id);

        RouterSnapshot {
            primary_source_id: self.primary_source_id,
            window_capacity: state.windows.capacity(),
            series,
            latest: state.latest.clone(),
        }
    }
}
