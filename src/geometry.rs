use geo::prelude::*;
use geo::Point;
use serde::{Deserialize, Serialize};

/// Number of decimal places kept when two street vertices are compared for identity.
/// Six places is roughly 0.1 m at campus latitudes.
pub const NODE_KEY_PRECISION: i32 = 6;

/// WGS-84 position, latitude first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// GeoJSON positions are `[lng, lat]`.
    pub fn from_lon_lat(position: &[f64]) -> Option<Self> {
        match position {
            [lon, lat, ..] if lat.is_finite() && lon.is_finite() => Some(Self::new(*lat, *lon)),
            _ => None,
        }
    }

    pub fn to_lon_lat(self) -> Vec<f64> {
        vec![self.lon, self.lat]
    }

    fn point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

/// Great-circle distance in meters.
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }
    a.point().haversine_distance(&b.point())
}

/// Plain average of the endpoints. Street sub-segments are a few meters long,
/// so this is indistinguishable from the geodesic midpoint.
pub fn midpoint(a: Coordinate, b: Coordinate) -> Coordinate {
    Coordinate::new((a.lat + b.lat) / 2.0, (a.lon + b.lon) / 2.0)
}

/// Canonical identity of a street vertex. Coordinates that round to the same
/// key collapse into one graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(i64, i64);

impl NodeKey {
    pub fn of(coordinate: Coordinate) -> Self {
        let scale = 10f64.powi(NODE_KEY_PRECISION);
        NodeKey(
            (coordinate.lat * scale).round() as i64,
            (coordinate.lon * scale).round() as i64,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Inclusive on every side.
    pub fn contains(&self, c: Coordinate) -> bool {
        c.lat >= self.min_lat && c.lat <= self.max_lat && c.lon >= self.min_lon && c.lon <= self.max_lon
    }
}

/// University City, Philadelphia. Scopes both street inclusion and hazard inclusion.
pub const CAMPUS_BBOX: BoundingBox = BoundingBox {
    min_lat: 39.94,
    max_lat: 39.96,
    min_lon: -75.21,
    max_lon: -75.18,
};
