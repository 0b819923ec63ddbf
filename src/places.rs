use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value};

use crate::geometry::Coordinate;

pub const CATEGORY: &str = "Category";
pub const PERCEIVED_SAFETY: &str = "PerceivedSafety";
pub const POPULARITY_NIGHT: &str = "Popularity_Night";
pub const LIGHTING_LEVEL: &str = "LightingLevel";

/// A named point of interest with its raw properties bag.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub position: Coordinate,
    pub properties: Map<String, Value>,
}

impl Place {
    pub fn category(&self) -> Option<&str> {
        self.properties.get(CATEGORY).and_then(Value::as_str)
    }

    pub fn perceived_safety(&self) -> Option<f64> {
        numeric(self.properties.get(PERCEIVED_SAFETY))
    }

    pub fn popularity_night(&self) -> Option<f64> {
        numeric(self.properties.get(POPULARITY_NIGHT))
    }

    pub fn lighting_level(&self) -> Option<f64> {
        numeric(self.properties.get(LIGHTING_LEVEL))
    }
}

/// Reads a property as a number. Numeric strings count, as they do in the
/// source datasets; anything else is missing.
pub fn numeric(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Attribute filter over places. Thresholds always apply, so a place whose
/// attribute is missing or non-numeric never matches.
#[derive(Debug, Clone)]
pub struct PlaceFilter {
    /// Empty matches any category.
    pub categories: BTreeSet<String>,
    pub min_safety: f64,
    pub min_popularity: f64,
    pub min_lighting: f64,
}

impl Default for PlaceFilter {
    fn default() -> Self {
        Self {
            categories: BTreeSet::new(),
            min_safety: 1.0,
            min_popularity: 0.0,
            min_lighting: 0.0,
        }
    }
}

impl PlaceFilter {
    pub fn matches(&self, place: &Place) -> bool {
        let category_ok = self.categories.is_empty()
            || place
                .category()
                .is_some_and(|c| self.categories.contains(c));

        category_ok
            && at_least(place.perceived_safety(), self.min_safety)
            && at_least(place.popularity_night(), self.min_popularity)
            && at_least(place.lighting_level(), self.min_lighting)
    }
}

fn at_least(value: Option<f64>, min: f64) -> bool {
    value.is_some_and(|v| v >= min)
}

/// Places keyed by name, kept in first-seen order.
#[derive(Debug, Default)]
pub struct PlaceTable {
    places: Vec<Place>,
    by_name: HashMap<String, usize>,
    // Every inserted feature in input order, duplicates included.
    features: Vec<Place>,
}

impl PlaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces. A repeated name overwrites the earlier entry but
    /// keeps its position. Returns true when an entry was replaced.
    pub fn insert(&mut self, place: Place) -> bool {
        self.features.push(place.clone());
        match self.by_name.get(&place.name) {
            Some(&idx) => {
                self.places[idx] = place;
                true
            }
            None => {
                self.by_name.insert(place.name.clone(), self.places.len());
                self.places.push(place);
                false
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Place> {
        self.by_name.get(name).map(|&idx| &self.places[idx])
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Place> {
        self.places.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.places.iter().map(|p| p.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Case-insensitive substring match over features in input order. With
    /// duplicate names the earliest feature wins, not the table entry.
    pub fn search(&self, query: &str) -> Option<&Place> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        self.features
            .iter()
            .find(|p| p.name.to_lowercase().contains(&query))
    }

    /// Matching places sorted by name.
    pub fn filter(&self, filter: &PlaceFilter) -> Vec<&Place> {
        let mut found: Vec<&Place> = self.places.iter().filter(|p| filter.matches(p)).collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }
}

impl FromIterator<Place> for PlaceTable {
    fn from_iter<T: IntoIterator<Item = Place>>(iter: T) -> Self {
        let mut table = PlaceTable::new();
        for place in iter {
            table.insert(place);
        }
        table
    }
}
