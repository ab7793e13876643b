// Decoder for the base station's line-based telemetry protocol
use crate::domain::reading::{Message, Reading, TopologyEvent};
use std::str::FromStr;
use thiserror::Error;

const DATA_PREFIX: &str = "Data";
const SYSTEM_PREFIX: &str = "System";

const DATA_FIELDS: [&str; 4] = ["voc_concentration", "temperature", "battery_level", "source_id"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("missing field `{field}`")]
    MissingField { field: &'static str },

    #[error("field `{field}` is not a decimal number: {value:?}")]
    InvalidFloat { field: &'static str, value: String },

    #[error("field `{field}` is not an integer: {value:?}")]
    InvalidInteger { field: &'static str, value: String },

    #[error("field `{field}` is not finite: {value:?}")]
    NonFinite { field: &'static str, value: String },

    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    #[error("line exceeds {limit} bytes")]
    LineTooLong { limit: usize },
}

/// Decode one raw protocol line.
///
/// ```text
/// Data<voc>;<temp>;<battery>;<sourceId>
/// System<id1>,<id2>,...;<ignored>
/// ```
///
/// Lines with any other prefix decode to [`Message::Unrecognized`].
pub fn decode(raw: &str) -> Result<Message, DecodeError> {
    let line = raw.trim_end_matches(['\r', '\n']);

    if let Some(body) = line.strip_prefix(DATA_PREFIX) {
        decode_reading(body).map(Message::Reading)
    } else if let Some(body) = line.strip_prefix(SYSTEM_PREFIX) {
        Ok(Message::Topology(decode_topology(body)))
    } else {
        Ok(Message::Unrecognized)
    }
}

fn decode_reading(body: &str) -> Result<Reading, DecodeError> {
    let mut fields = body.split(';');
    let mut next_field = |index: usize| {
        fields
            .next()
            .map(str::trim)
            .ok_or(DecodeError::MissingField { field: DATA_FIELDS[index] })
    };

    let voc = next_field(0)?;
    let temperature = next_field(1)?;
    let battery = next_field(2)?;
    let source = next_field(3)?;

    Ok(Reading::new(
        parse_float(DATA_FIELDS[0], voc)?,
        parse_float(DATA_FIELDS[1], temperature)?,
        parse_integer(DATA_FIELDS[2], battery)?,
        parse_integer(DATA_FIELDS[3], source)?,
    ))
}

fn decode_topology(body: &str) -> TopologyEvent {
    let ids = body.split(';').next().unwrap_or_default();
    let sensor_ids = ids.split(',').map(str::to_string).collect();
    TopologyEvent::new(sensor_ids)
}

fn parse_float(field: &'static str, value: &str) -> Result<f64, DecodeError> {
    let parsed = f64::from_str(value).map_err(|_| DecodeError::InvalidFloat {
        field,
        value: value.to_string(),
    })?;
    if !parsed.is_finite() {
        return Err(DecodeError::NonFinite {
            field,
            value: value.to_string(),
        });
    }
    Ok(parsed)
}

fn parse_integer(field: &'static str, value: &str) -> Result<i32, DecodeError> {
    i32::from_str(value).map_err(|_| DecodeError::InvalidInteger {
        field,
        value: value.to_string(),
    })
}
