// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Territory boundary model and GeoJSON handling.

use crate::models::territory::TerritoryKind;
use geo::{MultiPolygon, Polygon};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject};

/// Boundary geometry - either a simple polygon or multi-polygon, in WGS84.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl BoundaryGeometry {
    /// Convert a GeoJSON geometry value, rejecting anything that isn't areal.
    pub fn from_geojson(value: geojson::Value) -> Option<Self> {
        match value {
            geojson::Value::Polygon(_) => Polygon::<f64>::try_from(value)
                .ok()
                .map(BoundaryGeometry::Polygon),
            geojson::Value::MultiPolygon(_) => MultiPolygon::<f64>::try_from(value)
                .ok()
                .map(BoundaryGeometry::MultiPolygon),
            _ => None,
        }
    }

    /// Polygons with no exterior coordinates count as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            BoundaryGeometry::Polygon(p) => p.exterior().0.is_empty(),
            BoundaryGeometry::MultiPolygon(mp) => {
                mp.0.iter().all(|p| p.exterior().0.is_empty())
            }
        }
    }

    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        match self {
            BoundaryGeometry::Polygon(p) => MultiPolygon::new(vec![p.clone()]),
            BoundaryGeometry::MultiPolygon(mp) => mp.clone(),
        }
    }

    pub fn to_geojson(&self) -> Geometry {
        match self {
            BoundaryGeometry::Polygon(p) => Geometry::new(geojson::Value::from(p)),
            BoundaryGeometry::MultiPolygon(mp) => Geometry::new(geojson::Value::from(mp)),
        }
    }
}

/// A resolved territory boundary.
#[derive(Debug, Clone)]
pub struct Boundary {
    pub code: String,
    pub kind: TerritoryKind,
    /// Name of the source that produced it (e.g. "geo-api")
    pub source: &'static str,
    pub geometry: BoundaryGeometry,
    /// Non-geometry attributes copied from the source feature
    pub properties: JsonObject,
}

impl Boundary {
    /// Build a boundary from the first usable feature of a GeoJSON payload.
    ///
    /// Accepts a bare Feature, a FeatureCollection (only the first feature is
    /// used) or a bare Geometry. Returns `None` for empty payloads.
    pub fn from_geojson(
        geojson: GeoJson,
        code: &str,
        kind: TerritoryKind,
        source: &'static str,
    ) -> Option<Self> {
        let feature = match geojson {
            GeoJson::Feature(f) => f,
            GeoJson::FeatureCollection(fc) => fc.features.into_iter().next()?,
            GeoJson::Geometry(g) => Feature {
                geometry: Some(g),
                ..Default::default()
            },
        };
        Self::from_feature(feature, code, kind, source)
    }

    pub fn from_feature(
        feature: Feature,
        code: &str,
        kind: TerritoryKind,
        source: &'static str,
    ) -> Option<Self> {
        let geometry = BoundaryGeometry::from_geojson(feature.geometry?.value)?;
        if geometry.is_empty() {
            return None;
        }
        Some(Self {
            code: code.to_string(),
            kind,
            source,
            geometry,
            properties: feature.properties.unwrap_or_default(),
        })
    }

    /// Downloadable FeatureCollection with `code`, `nom` and `source` set.
    pub fn to_download(&self, title: &str) -> FeatureCollection {
        let mut properties = self.properties.clone();
        properties.insert("code".to_string(), self.code.clone().into());
        properties.insert("nom".to_string(), title.into());
        properties.insert("source".to_string(), self.source.into());

        let feature = Feature {
            geometry: Some(self.geometry.to_geojson()),
            properties: Some(properties),
            ..Default::default()
        };

        FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        }
    }
}
