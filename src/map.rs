//! Map rendering: marker geometry and self-contained HTML maps.
//!
//! Each map keys marker size on one station metric. Geometry is emitted as a
//! GeoJSON feature collection and embedded into a Leaflet document, one
//! circle marker per station.

use anyhow::{Context, Result, bail};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::network::rank::RankKey;
use crate::network::types::Station;

pub const MIN_MARKER_RADIUS: f64 = 10.0;
pub const MAX_MARKER_RADIUS: f64 = 50.0;
/// Used when every station shares the same metric value, where the linear
/// formula's denominator is zero.
pub const FLAT_MARKER_RADIUS: f64 = 30.0;

const MAP_ZOOM: u32 = 13;

/// Maps a metric value linearly into the marker radius range.
///
/// With `min_val == max_val` every station gets the constant mid-range
/// radius instead of a division by zero.
pub fn marker_radius(value: f64, min_val: f64, max_val: f64) -> f64 {
    if min_val == max_val {
        return FLAT_MARKER_RADIUS;
    }
    MIN_MARKER_RADIUS
        + (MAX_MARKER_RADIUS - MIN_MARKER_RADIUS) * (value - min_val) / (max_val - min_val)
}

/// One GeoJSON point feature per station, carrying the station name, the
/// metric value, and the normalized marker radius as properties.
pub fn station_features(stations: &[&Station], key: RankKey) -> FeatureCollection {
    let values: Vec<i64> = stations.iter().map(|s| key.value(s)).collect();
    let min_val = values.iter().min().copied().unwrap_or(0) as f64;
    let max_val = values.iter().max().copied().unwrap_or(0) as f64;

    let features = stations
        .iter()
        .zip(values)
        .map(|(station, value)| {
            let mut properties = JsonObject::new();
            properties.insert("name".to_string(), JsonValue::from(station.name.clone()));
            properties.insert("value".to_string(), JsonValue::from(value));
            properties.insert(
                "radius".to_string(),
                JsonValue::from(marker_radius(value as f64, min_val, max_val)),
            );

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![
                    station.longitude,
                    station.latitude,
                ]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Renders a self-contained Leaflet HTML document for one metric.
///
/// The map is centered on the mean station position, and each station gets a
/// circle marker sized by the normalized metric with a `name: value` tooltip.
///
/// # Errors
///
/// Fails on an empty station list: there is no center or value range to
/// normalize against.
pub fn render_map(stations: &[&Station], key: RankKey) -> Result<String> {
    if stations.is_empty() {
        bail!("cannot render a map with no stations");
    }

    let (center_lat, center_lng) = map_center(stations);
    let collection = station_features(stations, key);
    let geojson = serde_json::to_string(&collection)?;

    Ok(MAP_TEMPLATE
        .replace("__TITLE__", key.title())
        .replace("__CENTER_LAT__", &center_lat.to_string())
        .replace("__CENTER_LNG__", &center_lng.to_string())
        .replace("__ZOOM__", &MAP_ZOOM.to_string())
        .replace("__GEOJSON__", &geojson))
}

/// Writes the map for `key` as `<dir>/<key>_map.html`, creating the
/// directory if needed. Returns the written path.
pub fn write_map(dir: &Path, stations: &[&Station], key: RankKey) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let html = render_map(stations, key)?;
    let path = dir.join(format!("{}_map.html", key.as_str()));
    fs::write(&path, html).with_context(|| format!("writing {}", path.display()))?;

    info!(path = %path.display(), metric = key.as_str(), stations = stations.len(), "Map written");
    Ok(path)
}

fn map_center(stations: &[&Station]) -> (f64, f64) {
    let n = stations.len() as f64;
    let lat = stations.iter().map(|s| s.latitude).sum::<f64>() / n;
    let lng = stations.iter().map(|s| s.longitude).sum::<f64>() / n;
    (lat, lng)
}

const MAP_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>__TITLE__</title>
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>html, body, #map { height: 100%; margin: 0; }</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map('map').setView([__CENTER_LAT__, __CENTER_LNG__], __ZOOM__);
L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', {
    attribution: '&copy; OpenStreetMap contributors'
}).addTo(map);
var stations = __GEOJSON__;
L.geoJSON(stations, {
    pointToLayer: function (feature, latlng) {
        return L.circleMarker(latlng, {
            radius: feature.properties.radius,
            color: 'blue',
            fillColor: 'blue',
            fillOpacity: 0.6
        }).bindTooltip(feature.properties.name + ': ' + feature.properties.value);
    }
}).addTo(map);
</script>
</body>
</html>
"#;
