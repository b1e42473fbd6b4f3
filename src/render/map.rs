use super::{Selector, escape, html::script_json, rating_label};
use serde::Serialize;
use soboite_schema::{Restaurant, RestaurantId};

/// Center used when no record has coordinates.
pub const DEFAULT_CENTER: (f64, f64) = (20.5937, 78.9629);
pub const DEFAULT_ZOOM: u8 = 13;

const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const TILE_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: (f64, f64),
    pub zoom: u8,
    pub markers: Vec<MapMarker>,
}

/// Markers for records with both coordinates, centered on their mean.
pub fn map_view(items: &[Restaurant]) -> MapView {
    let markers: Vec<MapMarker> = items
        .iter()
        .filter_map(|r| {
            let (lat, lng) = r.coordinates()?;
            Some(MapMarker {
                restaurant_id: r.restaurant_id.clone(),
                name: r.name.clone(),
                lat,
                lng,
                rating: r.rating,
            })
        })
        .collect();

    let center = if markers.is_empty() {
        DEFAULT_CENTER
    } else {
        #[allow(clippy::cast_precision_loss)]
        let n = markers.len() as f64;
        let (lat, lng) = markers
            .iter()
            .fold((0.0, 0.0), |(lat, lng), m| (lat + m.lat, lng + m.lng));
        (lat / n, lng / n)
    };

    MapView {
        center,
        zoom: DEFAULT_ZOOM,
        markers,
    }
}

#[derive(Serialize)]
struct PlacedMarker {
    lat: f64,
    lng: f64,
    popup: String,
}

#[derive(Serialize)]
struct MapScript<'a> {
    center: (f64, f64),
    zoom: u8,
    tiles: &'a str,
    attribution: &'a str,
    markers: Vec<PlacedMarker>,
}

/// Map container plus the Leaflet bootstrap script.
pub fn map_panel(map: &MapView, select: Selector<'_>) -> String {
    let data = MapScript {
        center: map.center,
        zoom: map.zoom,
        tiles: TILE_URL,
        attribution: TILE_ATTRIBUTION,
        markers: map
            .markers
            .iter()
            .map(|m| PlacedMarker {
                lat: m.lat,
                lng: m.lng,
                popup: format!(
                    "<strong>{}</strong><br>Rating: {}<br><a href=\"{}\">View details</a>",
                    escape(&m.name),
                    rating_label(m.rating),
                    escape(&select(&m.restaurant_id)),
                ),
            })
            .collect(),
    };

    format!(
        "<div id=\"map\"></div><script>(function(){{\
         if(!window.L)return;const d={};\
         const map=L.map('map').setView(d.center,d.zoom);\
         L.tileLayer(d.tiles,{{attribution:d.attribution}}).addTo(map);\
         d.markers.forEach(m=>L.marker([m.lat,m.lng]).addTo(map).bindPopup(m.popup));\
         }})();</script>",
        script_json(&data)
    )
}
