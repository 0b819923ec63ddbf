use h3o::{CellIndex, LatLng, Resolution};
use std::collections::HashMap;

use crate::geometry::{distance, BoundingBox, Coordinate};

/// Crime influence decays linearly to zero at this distance.
pub const CRIME_RADIUS_METERS: f64 = 80.0;
/// Lighting samples further than this are treated as "nothing known".
pub const LIGHTING_RADIUS_METERS: f64 = 100.0;
/// Penalty for streets with no lighting sample nearby. Unknown must not look safe.
pub const UNKNOWN_LIGHTING_PENALTY: f64 = 0.3;
/// Crime risk counts double against lighting in the safety cost.
pub const CRIME_WEIGHT: f64 = 2.0;

// Resolution NINE cells have ~170 m edges; a disk of 2 rings always covers
// every sample within both hazard radii of the query cell.
const BUCKET_RESOLUTION: Resolution = Resolution::Nine;
const BUCKET_RINGS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingSample {
    pub position: Coordinate,
    /// 1 (dark) to 5 (well lit). Anything that is not exactly 2, 3 or at
    /// least 4 counts as dark.
    pub level: f64,
}

/// 0.0 = Safe, 1.0 = Dangerous
pub fn crime_risk_at(nearest_meters: f64) -> f64 {
    if nearest_meters >= CRIME_RADIUS_METERS {
        return 0.0;
    }
    (CRIME_RADIUS_METERS - nearest_meters) / CRIME_RADIUS_METERS
}

pub fn lighting_level_penalty(level: f64) -> f64 {
    if level >= 4.0 {
        0.0
    } else if level == 3.0 {
        0.1
    } else if level == 2.0 {
        0.4
    } else {
        0.8
    }
}

/// `distance * (1 + 2·risk + penalty)`. Never below `distance_meters`.
pub fn safety_cost(distance_meters: f64, crime_risk: f64, lighting_penalty: f64) -> f64 {
    distance_meters * (1.0 + CRIME_WEIGHT * crime_risk + lighting_penalty)
}

/// Linear-scan crime risk over an already box-filtered sample set.
pub fn crime_risk(point: Coordinate, crimes: &[Coordinate]) -> f64 {
    nearest_in(point, crimes.iter().copied().enumerate())
        .map(|(_, d)| crime_risk_at(d))
        .unwrap_or(0.0)
}

/// Linear-scan lighting penalty over an already box-filtered sample set.
pub fn lighting_penalty(point: Coordinate, lights: &[LightingSample]) -> f64 {
    match nearest_in(point, lights.iter().map(|l| l.position).enumerate()) {
        Some((idx, d)) if d <= LIGHTING_RADIUS_METERS => lighting_level_penalty(lights[idx].level),
        _ => UNKNOWN_LIGHTING_PENALTY,
    }
}

/// Nearest sample by great-circle distance. Ties keep the earliest sample
/// in the iteration order, so callers must iterate in input order.
fn nearest_in(
    point: Coordinate,
    samples: impl Iterator<Item = (usize, Coordinate)>,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, position) in samples {
        let d = distance(point, position);
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((idx, d));
        }
    }
    best
}

/// Hazard positions bucketed by H3 cell, so a lookup only scans nearby samples.
#[derive(Debug, Default)]
struct CellBuckets {
    cells: HashMap<CellIndex, Vec<usize>>,
    // Positions H3 rejects; always scanned.
    unbucketed: Vec<usize>,
}

impl CellBuckets {
    fn new(positions: impl Iterator<Item = Coordinate>) -> Self {
        let mut buckets = CellBuckets::default();
        for (idx, position) in positions.enumerate() {
            match cell_of(position) {
                Some(cell) => buckets.cells.entry(cell).or_default().push(idx),
                None => buckets.unbucketed.push(idx),
            }
        }
        buckets
    }

    /// Sample indices near `point`, ascending. Returns `None` when the query
    /// itself cannot be located, in which case the caller scans everything.
    fn candidates(&self, point: Coordinate) -> Option<Vec<usize>> {
        let cell = cell_of(point)?;
        let mut found = self.unbucketed.clone();
        for neighbor in cell.grid_disk::<Vec<_>>(BUCKET_RINGS) {
            if let Some(indices) = self.cells.get(&neighbor) {
                found.extend_from_slice(indices);
            }
        }
        found.sort_unstable();
        Some(found)
    }
}

fn cell_of(position: Coordinate) -> Option<CellIndex> {
    LatLng::new(position.lat, position.lon)
        .ok()
        .map(|ll| ll.to_cell(BUCKET_RESOLUTION))
}

/// Crime and lighting samples inside the campus box, indexed for proximity lookups.
/// Produces exactly the values of [`crime_risk`] and [`lighting_penalty`].
pub struct SafetyMap {
    crimes: Vec<Coordinate>,
    crime_cells: CellBuckets,
    lights: Vec<LightingSample>,
    light_cells: CellBuckets,
}

impl SafetyMap {
    /// Samples outside `bbox` are discarded so they can never influence in-box edges.
    pub fn new(crimes: Vec<Coordinate>, lights: Vec<LightingSample>, bbox: &BoundingBox) -> Self {
        let crimes: Vec<Coordinate> = crimes.into_iter().filter(|c| bbox.contains(*c)).collect();
        let lights: Vec<LightingSample> = lights
            .into_iter()
            .filter(|l| bbox.contains(l.position))
            .collect();

        let crime_cells = CellBuckets::new(crimes.iter().copied());
        let light_cells = CellBuckets::new(lights.iter().map(|l| l.position));

        Self {
            crimes,
            crime_cells,
            lights,
            light_cells,
        }
    }

    pub fn crimes(&self) -> &[Coordinate] {
        &self.crimes
    }

    pub fn lights(&self) -> &[LightingSample] {
        &self.lights
    }

    pub fn crime_risk(&self, point: Coordinate) -> f64 {
        if self.crimes.is_empty() {
            return 0.0;
        }
        match self.crime_cells.candidates(point) {
            Some(indices) => nearest_in(point, indices.into_iter().map(|i| (i, self.crimes[i])))
                .map(|(_, d)| crime_risk_at(d))
                .unwrap_or(0.0),
            None => crime_risk(point, &self.crimes),
        }
    }

    pub fn lighting_penalty(&self, point: Coordinate) -> f64 {
        if self.lights.is_empty() {
            return UNKNOWN_LIGHTING_PENALTY;
        }
        let Some(indices) = self.light_cells.candidates(point) else {
            return lighting_penalty(point, &self.lights);
        };
        match nearest_in(
            point,
            indices.into_iter().map(|i| (i, self.lights[i].position)),
        ) {
            Some((idx, d)) if d <= LIGHTING_RADIUS_METERS => {
                lighting_level_penalty(self.lights[idx].level)
            }
            _ => UNKNOWN_LIGHTING_PENALTY,
        }
    }
}
