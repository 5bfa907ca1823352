use trip_flow_mapper::map::render_map;
use trip_flow_mapper::network::metrics;
use trip_flow_mapper::network::rank::{RankKey, rank};
use trip_flow_mapper::network::registry::StationRegistry;
use trip_flow_mapper::network::types::TripRow;

fn load_fixture() -> Vec<TripRow> {
    let raw = include_str!("fixtures/sample_trips.csv");
    let mut reader = csv::Reader::from_reader(raw.as_bytes());
    reader
        .deserialize()
        .collect::<Result<Vec<TripRow>, _>>()
        .expect("Failed to parse fixture")
}

#[test]
fn test_full_pipeline() {
    let rows = load_fixture();
    let mut registry = StationRegistry::build(&rows).expect("Failed to build registry");
    metrics::compute(&mut registry);

    assert_eq!(registry.len(), 3);

    let grove = registry.get("Grove St PATH").unwrap();
    assert_eq!(grove.outgoing_edges, 2);
    assert_eq!(grove.incoming_edges, 1);
    assert_eq!(grove.net_flow, 1);
    let connected: Vec<_> = grove.connected_stations.iter().cloned().collect();
    assert_eq!(connected, vec!["Hamilton Park", "Newport Pkwy"]);

    let hamilton = registry.get("Hamilton Park").unwrap();
    assert_eq!(hamilton.outgoing_edges, 1);
    assert_eq!(hamilton.incoming_edges, 1);
    assert_eq!(hamilton.net_flow, 0);
    assert!(hamilton.connected_stations.contains("Grove St PATH"));

    let newport = registry.get("Newport Pkwy").unwrap();
    assert_eq!(newport.outgoing_edges, 0);
    assert_eq!(newport.incoming_edges, 1);
    assert_eq!(newport.net_flow, -1);
}

#[test]
fn test_every_metric_renders_a_map() {
    let rows = load_fixture();
    let mut registry = StationRegistry::build(&rows).expect("Failed to build registry");
    metrics::compute(&mut registry);

    let ranked = rank(registry.stations().collect(), RankKey::OutgoingEdges);
    assert_eq!(ranked[0].name, "Grove St PATH");

    for key in RankKey::ALL {
        let html = render_map(&ranked, key).expect("Failed to render map");
        assert!(html.contains("Grove St PATH"), "{}", key.as_str());
        assert!(html.contains("FeatureCollection"), "{}", key.as_str());
    }
}
