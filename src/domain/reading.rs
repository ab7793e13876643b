// Sensor reading domain models
use serde::Serialize;

/// Source identifier of the sensor mounted in the primary slot (`0xDC`).
pub const DEFAULT_PRIMARY_SOURCE_ID: i32 = 0xDC;

/// One telemetry sample decoded from a `Data` line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    pub voc_concentration: f64,
    pub temperature: f64,
    pub battery_level: i32,
    pub source_id: i32,
}

impl Reading {
    pub fn new(voc_concentration: f64, temperature: f64, battery_level: i32, source_id: i32) -> Self {
        Self {
            voc_concentration,
            temperature,
            battery_level,
            source_id,
        }
    }
}

/// Sensors announced by the base station on a `System` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyEvent {
    pub sensor_ids: Vec<String>,
}

impl TopologyEvent {
    pub fn new(sensor_ids: Vec<String>) -> Self {
        Self { sensor_ids }
    }

    pub fn sensor_count(&self) -> usize {
        self.sensor_ids.len()
    }
}

/// A successfully decoded protocol line.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Reading(Reading),
    Topology(TopologyEvent),
    Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorSlot {
    Primary,
    Secondary,
}

impl SensorSlot {
    pub fn for_source(source_id: i32, primary_source_id: i32) -> Self {
        if source_id == primary_source_id {
            SensorSlot::Primary
        } else {
            SensorSlot::Secondary
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Voc,
    Temperature,
}

/// Identifies one series: a quantity measured by the sensor in a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SeriesKey {
    pub slot: SensorSlot,
    pub kind: SeriesKind,
}

impl SeriesKey {
    pub fn new(slot: SensorSlot, kind: SeriesKind) -> Self {
        Self { slot, kind }
    }

    /// Stable integer identifier of the series.
    pub fn id(&self) -> u32 {
        let slot = match self.slot {
            SensorSlot::Primary => 0,
            SensorSlot::Secondary => 1,
        };
        let kind = match self.kind {
            SeriesKind::Voc => 0,
            SeriesKind::Temperature => 1,
        };
        slot * 2 + kind
    }
}
