//! Ordering stations by a chosen traffic metric.

use std::str::FromStr;

use crate::network::types::{Station, TripDataError};

/// The station attribute a ranking (or a map) is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankKey {
    OutgoingEdges,
    IncomingEdges,
    NetFlow,
    ConnectedCount,
}

impl RankKey {
    /// All recognized keys, in presentation order.
    pub const ALL: [RankKey; 4] = [
        RankKey::OutgoingEdges,
        RankKey::IncomingEdges,
        RankKey::NetFlow,
        RankKey::ConnectedCount,
    ];

    /// The metric value this key selects on a station.
    pub fn value(&self, station: &Station) -> i64 {
        match self {
            RankKey::OutgoingEdges => station.outgoing_edges as i64,
            RankKey::IncomingEdges => station.incoming_edges as i64,
            RankKey::NetFlow => station.net_flow,
            RankKey::ConnectedCount => station.connected_count() as i64,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RankKey::OutgoingEdges => "outgoing_edges",
            RankKey::IncomingEdges => "incoming_edges",
            RankKey::NetFlow => "net_flow",
            RankKey::ConnectedCount => "connected_count",
        }
    }

    /// Human-readable title, used for map headings.
    pub fn title(&self) -> &'static str {
        match self {
            RankKey::OutgoingEdges => "Outgoing Edges",
            RankKey::IncomingEdges => "Incoming Edges",
            RankKey::NetFlow => "Net Flow",
            RankKey::ConnectedCount => "Connected Stations",
        }
    }
}

impl FromStr for RankKey {
    type Err = TripDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "outgoing_edges" => Ok(RankKey::OutgoingEdges),
            "incoming_edges" => Ok(RankKey::IncomingEdges),
            "net_flow" => Ok(RankKey::NetFlow),
            "connected_count" => Ok(RankKey::ConnectedCount),
            other => Err(TripDataError::InvalidKey(other.to_string())),
        }
    }
}

/// Orders stations descending by the chosen key.
///
/// The sort is stable: ties keep the order of the input slice, so callers
/// passing registry insertion order get reproducible rankings.
pub fn rank<'a>(stations: Vec<&'a Station>, key: RankKey) -> Vec<&'a Station> {
    let mut ranked = stations;
    ranked.sort_by(|a, b| key.value(b).cmp(&key.value(a)));
    ranked
}
