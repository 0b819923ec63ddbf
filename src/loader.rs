use geojson::{Feature, GeoJson, Value as GeometryValue};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::LoadError;
use crate::geometry::{Coordinate, CAMPUS_BBOX};
use crate::graph::{NavigationGraph, StreetLine};
use crate::places::{numeric, Place, PlaceTable, LIGHTING_LEVEL};
use crate::route::Planner;
use crate::safety::{LightingSample, SafetyMap};

const PLACE_NAME: &str = "Name";

/// The three input datasets, converted to core types.
#[derive(Debug, Default)]
pub struct Datasets {
    pub places: PlaceTable,
    pub lights: Vec<LightingSample>,
    pub streets: Vec<StreetLine>,
    pub crimes: Vec<Coordinate>,
}

impl Datasets {
    /// Reads all three files concurrently; nothing is built until every read succeeds.
    pub async fn load(config: &Config) -> Result<Self, LoadError> {
        let (places, streets, crimes) = tokio::try_join!(
            read(&config.places_path),
            read(&config.streets_path),
            read(&config.crimes_path),
        )?;
        Self::from_geojson(&places, &streets, &crimes)
    }

    pub fn from_geojson(places: &str, streets: &str, crimes: &str) -> Result<Self, LoadError> {
        let place_features = features(places, "places")?;
        let street_features = features(streets, "streets")?;
        let crime_features = features(crimes, "crimes")?;

        let mut datasets = Datasets::default();
        let mut duplicates = 0usize;
        for feature in &place_features {
            let Some(position) = point_of(feature) else {
                continue;
            };
            let properties = feature.properties.clone().unwrap_or_default();

            // Unnamed features still report lighting.
            if let Some(level) = lighting_level(properties.get(LIGHTING_LEVEL)) {
                datasets.lights.push(LightingSample { position, level });
            }

            let name = match properties.get(PLACE_NAME) {
                Some(Value::String(name)) if !name.is_empty() => name.clone(),
                _ => continue,
            };
            if datasets.places.insert(Place {
                name,
                position,
                properties,
            }) {
                duplicates += 1;
            }
        }
        if duplicates > 0 {
            warn!(duplicates, "Duplicate place names, later entries replaced earlier ones");
        }

        datasets.streets = street_features.iter().filter_map(line_of).collect();
        datasets.crimes = crime_features.iter().filter_map(point_of).collect();

        info!(
            places = datasets.places.len(),
            lights = datasets.lights.len(),
            streets = datasets.streets.len(),
            crimes = datasets.crimes.len(),
            "Datasets parsed"
        );
        Ok(datasets)
    }

    /// Restricts hazards to campus and builds the routing graph.
    pub fn into_planner(self) -> Planner {
        let safety_map = SafetyMap::new(self.crimes, self.lights, &CAMPUS_BBOX);
        let graph = NavigationGraph::from_streets(&self.streets, &safety_map, &CAMPUS_BBOX);
        Planner::new(graph, self.places)
    }
}

async fn read(path: &str) -> Result<String, LoadError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Io {
            path: path.to_string(),
            source,
        })
}

fn features(text: &str, dataset: &'static str) -> Result<Vec<Feature>, LoadError> {
    let geojson: GeoJson = text.parse().map_err(|source| LoadError::GeoJson {
        dataset,
        source: Box::new(source),
    })?;
    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(collection.features),
        _ => Err(LoadError::NotAFeatureCollection(dataset)),
    }
}

fn point_of(feature: &Feature) -> Option<Coordinate> {
    match &feature.geometry.as_ref()?.value {
        GeometryValue::Point(position) => Coordinate::from_lon_lat(position),
        _ => None,
    }
}

/// LineStrings only. A line with any unreadable vertex is dropped whole.
fn line_of(feature: &Feature) -> Option<StreetLine> {
    match &feature.geometry.as_ref()?.value {
        GeometryValue::LineString(positions) => positions
            .iter()
            .map(|p| Coordinate::from_lon_lat(p))
            .collect::<Option<Vec<_>>>()
            .map(|vertices| StreetLine { vertices }),
        _ => None,
    }
}

/// Coerces like the source data's numeric fields: `null`, `false` and blank
/// strings read as 0, `true` as 1. A missing or non-numeric level yields no sample.
fn lighting_level(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Null => Some(0.0),
        Value::Bool(lit) => Some(if *lit { 1.0 } else { 0.0 }),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        other => numeric(Some(other)),
    }
}
