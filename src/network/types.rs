//! Data types used by the station network pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Errors raised by the network core.
///
/// All variants carry enough context (record index, field name, offending
/// value) to diagnose the input row that caused the failure. Every error is
/// fatal for the run: partial station data is unusable, and silently dropping
/// rows would skew the aggregates.
#[derive(Debug, Error, PartialEq)]
pub enum TripDataError {
    #[error("record {index}: missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("record {index}: field '{field}' holds invalid coordinate {value}")]
    InvalidCoordinate {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error(
        "unknown ranking key '{0}', expected one of: outgoing_edges, incoming_edges, net_flow, connected_count"
    )]
    InvalidKey(String),
}

/// A single row deserialized from a trip CSV file.
///
/// Every field is optional so that absent columns and empty cells surface as
/// `None` instead of aborting deserialization; presence is enforced by
/// [`TripRow::validate`] with a row index attached for diagnostics.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TripRow {
    #[serde(default)]
    pub start_station_name: Option<String>,
    #[serde(default)]
    pub start_station_id: Option<String>,
    #[serde(default)]
    pub end_station_name: Option<String>,
    #[serde(default)]
    pub end_station_id: Option<String>,
    #[serde(default)]
    pub start_lat: Option<f64>,
    #[serde(default)]
    pub start_lng: Option<f64>,
    #[serde(default)]
    pub end_lat: Option<f64>,
    #[serde(default)]
    pub end_lng: Option<f64>,

    // optional attributes, passed through untouched
    #[serde(default)]
    pub member_casual: Option<String>,
    #[serde(default)]
    pub rideable_type: Option<String>,
}

/// A validated trip record: one observed rental linking a start station to an
/// end station. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub start_name: String,
    pub start_lat: f64,
    pub start_lng: f64,
    pub end_name: String,
    pub end_lat: f64,
    pub end_lng: f64,
}

impl TripRow {
    /// Promotes a raw row into a [`TripRecord`], checking that every
    /// mandatory field is present and that coordinates are finite and within
    /// the valid latitude/longitude ranges.
    ///
    /// # Errors
    ///
    /// Returns [`TripDataError::MissingField`] or
    /// [`TripDataError::InvalidCoordinate`] naming the field and the row
    /// index supplied by the caller.
    pub fn validate(&self, index: usize) -> Result<TripRecord, TripDataError> {
        let start_name = require(self.start_station_name.as_deref(), index, "start_station_name")?;
        let end_name = require(self.end_station_name.as_deref(), index, "end_station_name")?;

        let start_lat = coordinate(self.start_lat, index, "start_lat", 90.0)?;
        let start_lng = coordinate(self.start_lng, index, "start_lng", 180.0)?;
        let end_lat = coordinate(self.end_lat, index, "end_lat", 90.0)?;
        let end_lng = coordinate(self.end_lng, index, "end_lng", 180.0)?;

        Ok(TripRecord {
            start_name: start_name.to_string(),
            start_lat,
            start_lng,
            end_name: end_name.to_string(),
            end_lat,
            end_lng,
        })
    }
}

fn require<'a>(
    value: Option<&'a str>,
    index: usize,
    field: &'static str,
) -> Result<&'a str, TripDataError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(TripDataError::MissingField { index, field }),
    }
}

fn coordinate(
    value: Option<f64>,
    index: usize,
    field: &'static str,
    bound: f64,
) -> Result<f64, TripDataError> {
    let v = value.ok_or(TripDataError::MissingField { index, field })?;
    if !v.is_finite() || v.abs() > bound {
        return Err(TripDataError::InvalidCoordinate {
            index,
            field,
            value: v,
        });
    }
    Ok(v)
}

/// A named bike-share dock location with accumulated traffic metrics.
///
/// Coordinates are fixed by the first record that references the station, as
/// either a start or an end; later records with different coordinates for the
/// same name are silently ignored. Downstream positions are therefore only as
/// accurate as the first observation.
#[derive(Debug, Clone, Serialize)]
pub struct Station {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub outgoing_edges: usize,
    pub incoming_edges: usize,
    /// Stations that exchanged at least one trip with this one, in either
    /// direction. A self-referencing trip puts the station in its own set.
    pub connected_stations: BTreeSet<String>,
    /// Always `outgoing_edges - incoming_edges`; recomputed in one pass by
    /// the metrics engine, never accumulated record-by-record.
    pub net_flow: i64,
}

impl Station {
    pub fn new(name: &str, latitude: f64, longitude: f64) -> Self {
        Station {
            name: name.to_string(),
            latitude,
            longitude,
            outgoing_edges: 0,
            incoming_edges: 0,
            connected_stations: BTreeSet::new(),
            net_flow: 0,
        }
    }

    pub fn connected_count(&self) -> usize {
        self.connected_stations.len()
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Station: {}", self.name)?;
        writeln!(f, "Outgoing Edges: {}", self.outgoing_edges)?;
        writeln!(f, "Incoming Edges: {}", self.incoming_edges)?;
        writeln!(f, "Connected Stations: {}", self.connected_count())?;
        writeln!(f, "Net Flow: {}", self.net_flow)?;
        write!(f, "Location: ({}, {})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row() -> TripRow {
        TripRow {
            start_station_name: Some("Grove St PATH".to_string()),
            start_station_id: Some("JC005".to_string()),
            end_station_name: Some("Hamilton Park".to_string()),
            end_station_id: Some("JC009".to_string()),
            start_lat: Some(40.7196),
            start_lng: Some(-74.0434),
            end_lat: Some(40.7271),
            end_lng: Some(-74.0443),
            member_casual: Some("member".to_string()),
            rideable_type: Some("classic_bike".to_string()),
        }
    }

    #[test]
    fn test_validate_full_row() {
        let record = full_row().validate(0).unwrap();
        assert_eq!(record.start_name, "Grove St PATH");
        assert_eq!(record.end_name, "Hamilton Park");
        assert_eq!(record.start_lat, 40.7196);
        assert_eq!(record.end_lng, -74.0443);
    }

    #[test]
    fn test_validate_missing_end_lat() {
        let mut row = full_row();
        row.end_lat = None;

        let err = row.validate(7).unwrap_err();
        assert_eq!(
            err,
            TripDataError::MissingField {
                index: 7,
                field: "end_lat"
            }
        );
    }

    #[test]
    fn test_validate_empty_name_is_missing() {
        let mut row = full_row();
        row.start_station_name = Some(String::new());

        let err = row.validate(3).unwrap_err();
        assert_eq!(
            err,
            TripDataError::MissingField {
                index: 3,
                field: "start_station_name"
            }
        );
    }

    #[test]
    fn test_validate_nan_coordinate() {
        let mut row = full_row();
        row.start_lat = Some(f64::NAN);

        let err = row.validate(0).unwrap_err();
        match err {
            TripDataError::InvalidCoordinate { index, field, value } => {
                assert_eq!(index, 0);
                assert_eq!(field, "start_lat");
                assert!(value.is_nan());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_out_of_range_latitude() {
        let mut row = full_row();
        row.end_lat = Some(91.5);

        let err = row.validate(2).unwrap_err();
        assert_eq!(
            err,
            TripDataError::InvalidCoordinate {
                index: 2,
                field: "end_lat",
                value: 91.5
            }
        );
    }

    #[test]
    fn test_validate_ignores_optional_attributes() {
        let mut row = full_row();
        row.member_casual = None;
        row.rideable_type = None;
        row.start_station_id = None;

        assert!(row.validate(0).is_ok());
    }

    #[test]
    fn test_error_message_names_field_and_index() {
        let err = TripDataError::MissingField {
            index: 12,
            field: "end_lat",
        };
        let msg = err.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("end_lat"));
    }

    #[test]
    fn test_station_display_lists_metrics() {
        let mut station = Station::new("Grove St PATH", 40.7196, -74.0434);
        station.outgoing_edges = 4;
        station.incoming_edges = 1;
        station.net_flow = 3;
        station.connected_stations.insert("Hamilton Park".to_string());

        let text = station.to_string();
        assert!(text.contains("Station: Grove St PATH"));
        assert!(text.contains("Outgoing Edges: 4"));
        assert!(text.contains("Connected Stations: 1"));
        assert!(text.contains("Net Flow: 3"));
    }
}
