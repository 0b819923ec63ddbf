use std::collections::HashMap;

use itertools::Itertools;
use petgraph::graph::{EdgeIndex, Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::{debug, info};

use crate::geometry::{distance, midpoint, BoundingBox, Coordinate, NodeKey};
use crate::safety::{safety_cost, SafetyMap};

pub type GeoNode = Coordinate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkEdge {
    pub distance_meters: f64,
    pub safety_cost: f64,
    /// Endpoints in the direction this edge is walked.
    pub geometry: [Coordinate; 2],
}

impl WalkEdge {
    pub fn reversed(&self) -> Self {
        Self {
            geometry: [self.geometry[1], self.geometry[0]],
            ..*self
        }
    }
}

/// One street centerline, vertices in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct StreetLine {
    pub vertices: Vec<Coordinate>,
}

/// Undirected walking network stored as reciprocal directed edge pairs.
/// Immutable once built.
pub struct NavigationGraph {
    pub graph: Graph<GeoNode, WalkEdge>,
}

impl NavigationGraph {
    pub fn from_streets(streets: &[StreetLine], safety_map: &SafetyMap, bbox: &BoundingBox) -> Self {
        info!(
            streets = streets.len(),
            crimes = safety_map.crimes().len(),
            lights = safety_map.lights().len(),
            "Building walking graph"
        );

        let mut graph = Graph::new();
        let mut key_map: HashMap<NodeKey, NodeIndex> = HashMap::new();
        let mut skipped = 0usize;

        for street in streets {
            // A street is taken whole as soon as any vertex touches the box.
            if street.vertices.len() < 2 || !street.vertices.iter().any(|v| bbox.contains(*v)) {
                skipped += 1;
                continue;
            }

            for (&a, &b) in street.vertices.iter().tuple_windows() {
                let idx_a = *key_map
                    .entry(NodeKey::of(a))
                    .or_insert_with(|| graph.add_node(a));
                let idx_b = *key_map
                    .entry(NodeKey::of(b))
                    .or_insert_with(|| graph.add_node(b));

                let dist = distance(a, b);
                let mid = midpoint(a, b);
                let risk = safety_map.crime_risk(mid);
                let penalty = safety_map.lighting_penalty(mid);

                let edge = WalkEdge {
                    distance_meters: dist,
                    safety_cost: safety_cost(dist, risk, penalty),
                    geometry: [a, b],
                };

                graph.add_edge(idx_a, idx_b, edge);
                graph.add_edge(idx_b, idx_a, edge.reversed());
            }
        }

        debug!(skipped, "Streets outside campus or too short");
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Graph built"
        );
        Self { graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn coordinate(&self, node: NodeIndex) -> Coordinate {
        self.graph[node]
    }

    /// Linear scan over all nodes in index order; the first of equally near nodes wins.
    pub fn find_nearest_node(&self, point: Coordinate) -> Option<NodeIndex> {
        self.graph.node_indices().min_by(|&a, &b| {
            let da = distance(self.graph[a], point);
            let db = distance(self.graph[b], point);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    /// Cheapest edge `from -> to` under `weight`, lowest edge index on ties.
    /// Parallel edges exist when two input streets share a segment.
    pub fn edge_between<F>(&self, from: NodeIndex, to: NodeIndex, weight: F) -> Option<EdgeIndex>
    where
        F: Fn(&WalkEdge) -> f64,
    {
        self.graph
            .edges_connecting(from, to)
            .min_by(|x, y| {
                weight(x.weight())
                    .total_cmp(&weight(y.weight()))
                    .then(x.id().cmp(&y.id()))
            })
            .map(|e| e.id())
    }
}
