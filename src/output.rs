//! Presentation outputs for computed station metrics.
//!
//! Supports the per-station text report and a timestamped JSON index of the
//! ranked stations.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::network::rank::RankKey;
use crate::network::types::Station;

/// One station's metrics in the JSON index.
#[derive(Debug, Serialize)]
pub struct StationIndexEntry {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub outgoing_edges: usize,
    pub incoming_edges: usize,
    pub net_flow: i64,
    pub connected_count: usize,
}

/// Index of all ranked stations, written as a single JSON document.
#[derive(Debug, Serialize)]
pub struct StationIndex {
    pub generated_at: DateTime<Utc>,
    pub ranked_by: String,
    pub stations: Vec<StationIndexEntry>,
}

/// Builds the index for a ranked station list.
pub fn station_index(ranked: &[&Station], key: RankKey) -> StationIndex {
    let stations = ranked
        .iter()
        .map(|station| StationIndexEntry {
            name: station.name.clone(),
            latitude: station.latitude,
            longitude: station.longitude,
            outgoing_edges: station.outgoing_edges,
            incoming_edges: station.incoming_edges,
            net_flow: station.net_flow,
            connected_count: station.connected_count(),
        })
        .collect();

    StationIndex {
        generated_at: Utc::now(),
        ranked_by: key.as_str().to_string(),
        stations,
    }
}

/// Serializes the station index as pretty JSON to `path`.
pub fn write_station_index(path: &Path, index: &StationIndex) -> Result<()> {
    let body = serde_json::to_string_pretty(index)?;
    fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), stations = index.stations.len(), "Station index written");
    Ok(())
}

/// Prints the per-station report blocks, most significant first.
pub fn print_report(ranked: &[&Station], top: Option<usize>) {
    let limit = top.unwrap_or(ranked.len());
    debug!(stations = ranked.len(), limit, "Printing station report");

    for station in ranked.iter().take(limit) {
        println!("{station}");
        println!("----------------------------");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("trip_flow_mapper_{name}"))
    }

    fn station(name: &str, outgoing: usize, incoming: usize) -> Station {
        let mut s = Station::new(name, 40.0, -74.0);
        s.outgoing_edges = outgoing;
        s.incoming_edges = incoming;
        s.net_flow = outgoing as i64 - incoming as i64;
        s
    }

    #[test]
    fn test_station_index_carries_all_metrics() {
        let a = station("A", 3, 1);
        let b = station("B", 1, 2);

        let index = station_index(&[&a, &b], RankKey::OutgoingEdges);
        assert_eq!(index.ranked_by, "outgoing_edges");
        assert_eq!(index.stations.len(), 2);
        assert_eq!(index.stations[0].name, "A");
        assert_eq!(index.stations[0].net_flow, 2);
        assert_eq!(index.stations[1].incoming_edges, 2);
    }

    #[test]
    fn test_write_station_index_round_trips() {
        let path = temp_path("station_index.json");
        let a = station("A", 3, 1);

        let index = station_index(&[&a], RankKey::NetFlow);
        write_station_index(&path, &index).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["ranked_by"], "net_flow");
        assert_eq!(parsed["stations"][0]["name"], "A");
        assert!(parsed["generated_at"].is_string());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_print_report_does_not_panic() {
        let a = station("A", 1, 0);
        print_report(&[&a], None);
        print_report(&[&a], Some(0));
    }
}
