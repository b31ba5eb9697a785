// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Map rendering: display centroid, map view model and Leaflet document.

use crate::models::{Boundary, BoundaryGeometry, TerritoryKind};
use geo::{Centroid, Coord, MapCoords, Point};
use geojson::FeatureCollection;
use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// WGS84 equatorial radius used by Web Mercator.
const EARTH_RADIUS_M: f64 = 6_378_137.0;
/// Web Mercator is undefined at the poles.
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// Project lon/lat degrees to EPSG:3857 meters.
pub fn to_web_mercator(c: Coord<f64>) -> Coord<f64> {
    let lat = c.y.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    Coord {
        x: EARTH_RADIUS_M * c.x.to_radians(),
        y: EARTH_RADIUS_M * (FRAC_PI_4 + lat / 2.0).tan().ln(),
    }
}

/// Inverse of [`to_web_mercator`].
pub fn from_web_mercator(c: Coord<f64>) -> Coord<f64> {
    Coord {
        x: (c.x / EARTH_RADIUS_M).to_degrees(),
        y: (2.0 * (c.y / EARTH_RADIUS_M).exp().atan() - FRAC_PI_2).to_degrees(),
    }
}

/// Centroid computed in Web Mercator and returned as lon/lat.
pub fn centroid(geometry: &BoundaryGeometry) -> Option<Point<f64>> {
    let projected = geometry.to_multi_polygon().map_coords(to_web_mercator);
    projected
        .centroid()
        .map(|p| Point::from(from_web_mercator(p.0)))
}

/// A selectable background tile layer.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BaseLayer {
    pub name: &'static str,
    pub url: &'static str,
    pub attribution: &'static str,
}

pub const BASE_LAYERS: [BaseLayer; 2] = [
    BaseLayer {
        name: "Satellite",
        url: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
        attribution: "Esri",
    },
    BaseLayer {
        name: "Plan",
        url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
        attribution: "&copy; OpenStreetMap contributors",
    },
];

/// Leaflet path style for the boundary overlay.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BoundaryStyle {
    pub fill_color: &'static str,
    pub color: &'static str,
    pub weight: u8,
    pub fill_opacity: f64,
}

pub const BOUNDARY_STYLE: BoundaryStyle = BoundaryStyle {
    fill_color: "#318ce7",
    color: "black",
    weight: 2,
    fill_opacity: 0.3,
};

/// Everything a client needs to draw the map.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub title: String,
    pub code: String,
    /// `[lat, lon]` in Leaflet order
    pub center: [f64; 2],
    pub zoom: u8,
    pub base_layers: Vec<BaseLayer>,
    pub style: BoundaryStyle,
    pub boundary: FeatureCollection,
}

impl MapView {
    pub fn build(boundary: &Boundary, title: &str, kind: TerritoryKind) -> Option<Self> {
        let center = centroid(&boundary.geometry)?;
        Some(Self {
            title: title.to_string(),
            code: boundary.code.clone(),
            center: [center.y(), center.x()],
            zoom: kind.default_zoom(),
            base_layers: BASE_LAYERS.to_vec(),
            style: BOUNDARY_STYLE,
            boundary: boundary.to_download(title),
        })
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render a standalone Leaflet page, or a placeholder when there is no map.
pub fn render_map_html(view: Option<&MapView>) -> String {
    let Some(view) = view else {
        return PLACEHOLDER_HTML.to_string();
    };

    // Keep "</script>" out of the inlined JSON.
    let data = serde_json::to_string(view)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/");

    MAP_TEMPLATE
        .replace("{{TITLE}}", &escape_html(&view.title))
        .replace("{{DATA}}", &data)
}

const PLACEHOLDER_HTML: &str = r#"<!doctype html>
<html lang="fr">
<head><meta charset="utf-8" /><title>Carte indisponible</title></head>
<body style="font-family: sans-serif; display: flex; align-items: center; justify-content: center; height: 100vh; margin: 0; background: #f5f7fa;">
  <p>Sélectionnez un territoire valide pour afficher la carte.</p>
</body>
</html>
"#;

const MAP_TEMPLATE: &str = r#"<!doctype html>
<html lang="fr">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <style>html, body, #map { height: 100%; margin: 0; }</style>
</head>
<body>
  <div id="map"></div>
  <script>
    const view = {{DATA}};
    const map = L.map('map').setView(view.center, view.zoom);
    const layers = {};
    view.base_layers.forEach((l, i) => {
      const layer = L.tileLayer(l.url, { attribution: l.attribution, maxZoom: 19 });
      if (i === 0) layer.addTo(map);
      layers[l.name] = layer;
    });
    const overlay = L.geoJSON(view.boundary, { style: () => view.style }).addTo(map);
    L.control.layers(layers, { [view.title]: overlay }).addTo(map);
  </script>
</body>
</html>
"#;
