//! Station registry construction from validated trip rows.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::network::types::{Station, TripDataError, TripRow};

/// The station registry: one [`Station`] per distinct station name, plus the
/// observed `(start, end)` edge list consumed by the metrics engine.
///
/// Iteration order is insertion order (first reference in the input), which
/// gives downstream ranking a deterministic tie-break.
#[derive(Debug, Default)]
pub struct StationRegistry {
    pub(crate) stations: HashMap<String, Station>,
    pub(crate) order: Vec<String>,
    pub(crate) edges: Vec<(String, String)>,
}

impl StationRegistry {
    /// Builds a registry from raw trip rows.
    ///
    /// Each row is validated in input order; the start station's
    /// `outgoing_edges` and the end station's `incoming_edges` are
    /// incremented, and stations are created lazily on first reference with
    /// the coordinates of that specific reference (start coordinates if first
    /// seen as a start, end coordinates if first seen as an end). Later rows
    /// never overwrite coordinates, even when they disagree.
    ///
    /// Final counts do not depend on input order; only the coordinate
    /// assignment is order-sensitive (first reference wins).
    ///
    /// # Errors
    ///
    /// Fails on the first row with a missing mandatory field or an invalid
    /// coordinate. The build is atomic: on failure no partially-built
    /// registry is returned.
    pub fn build(rows: &[TripRow]) -> Result<StationRegistry, TripDataError> {
        let mut registry = StationRegistry::default();

        for (index, row) in rows.iter().enumerate() {
            let record = row.validate(index)?;

            registry
                .station_entry(&record.start_name, record.start_lat, record.start_lng)
                .outgoing_edges += 1;
            registry
                .station_entry(&record.end_name, record.end_lat, record.end_lng)
                .incoming_edges += 1;

            registry.edges.push((record.start_name, record.end_name));
        }

        Ok(registry)
    }

    /// Resolves the station for `name`, creating it with the supplied
    /// coordinates on first reference.
    fn station_entry(&mut self, name: &str, latitude: f64, longitude: f64) -> &mut Station {
        match self.stations.entry(name.to_string()) {
            Entry::Occupied(existing) => existing.into_mut(),
            Entry::Vacant(slot) => {
                self.order.push(name.to_string());
                slot.insert(Station::new(name, latitude, longitude))
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Station> {
        self.stations.get(name)
    }

    /// Stations in first-reference order.
    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.order.iter().filter_map(|name| self.stations.get(name))
    }

    /// Observed `(start, end)` pairs, one per trip row, in input order.
    pub fn edges(&self) -> &[(String, String)] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
