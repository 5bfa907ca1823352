//! Derived station metrics: connectivity sets and net flow.

use crate::network::registry::StationRegistry;

/// Folds the observed edges into per-station connected sets, then computes
/// net flow for every station.
///
/// Connectivity is undirected: for each `(start, end)` trip, `end` joins
/// `start`'s set and `start` joins `end`'s set, while the edge counts stay
/// directional. "Connected" means "exchanged at least one trip in either
/// direction", which is a coarser notion than the counts.
///
/// Runs in O(edges) set insertions plus an O(stations) flow pass; no
/// traversal beyond direct neighbors. The result is identical for any
/// processing order of the same registry contents.
pub fn compute(registry: &mut StationRegistry) {
    for (start, end) in &registry.edges {
        if let Some(station) = registry.stations.get_mut(start) {
            station.connected_stations.insert(end.clone());
        }
        if let Some(station) = registry.stations.get_mut(end) {
            station.connected_stations.insert(start.clone());
        }
    }

    for station in registry.stations.values_mut() {
        station.net_flow = station.outgoing_edges as i64 - station.incoming_edges as i64;
    }
}
