use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::Serialize;
use tracing::{debug, warn};

use crate::dijkstra::{shortest_path, RouteMode};
use crate::error::RouteError;
use crate::geometry::Coordinate;
use crate::graph::NavigationGraph;
use crate::places::PlaceTable;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub mode: RouteMode,
    pub path: Vec<Coordinate>,
    pub distance_meters: f64,
    pub safety_cost: f64,
}

/// Edges walked along `path`, cheapest under `mode` where streets overlap.
///
/// A hop with no edge is skipped. A graph from [`NavigationGraph::from_streets`]
/// walked along a path from [`shortest_path`] never has one.
fn path_edges(nav: &NavigationGraph, path: &[NodeIndex], mode: RouteMode) -> Vec<EdgeIndex> {
    path.windows(2)
        .filter_map(|hop| {
            let edge = nav.edge_between(hop[0], hop[1], |e| mode.weight(e));
            if edge.is_none() {
                warn!(from = hop[0].index(), to = hop[1].index(), "Missing edge on route hop");
            }
            edge
        })
        .collect()
}

fn polyline(nav: &NavigationGraph, edges: &[EdgeIndex]) -> Vec<Coordinate> {
    let mut coordinates = Vec::with_capacity(edges.len() + 1);
    if let Some(&first) = edges.first() {
        coordinates.push(nav.graph[first].geometry[0]);
    }
    coordinates.extend(edges.iter().map(|&e| nav.graph[e].geometry[1]));
    coordinates
}

/// Display geometry for a node path: the first edge's start, then every edge's end.
pub fn path_to_polyline(nav: &NavigationGraph, path: &[NodeIndex], mode: RouteMode) -> Vec<Coordinate> {
    polyline(nav, &path_edges(nav, path, mode))
}

/// Everything a route request reads. Built once, shared read-only.
pub struct Planner {
    pub graph: NavigationGraph,
    pub places: PlaceTable,
}

impl Planner {
    pub fn new(graph: NavigationGraph, places: PlaceTable) -> Self {
        Self { graph, places }
    }

    pub fn compute_route(&self, start: &str, end: &str, mode: RouteMode) -> Result<Route, RouteError> {
        if start == end {
            return Err(RouteError::SameEndpoints);
        }
        let start_place = self
            .places
            .get(start)
            .ok_or_else(|| RouteError::UnknownPlace(start.to_string()))?;
        let end_place = self
            .places
            .get(end)
            .ok_or_else(|| RouteError::UnknownPlace(end.to_string()))?;

        let start_node = self
            .graph
            .find_nearest_node(start_place.position)
            .ok_or(RouteError::NoReachableNode)?;
        let end_node = self
            .graph
            .find_nearest_node(end_place.position)
            .ok_or(RouteError::NoReachableNode)?;
        debug!(start, end, %mode, start_node = start_node.index(), end_node = end_node.index(), "Snapped route endpoints");

        let nodes = shortest_path(&self.graph, start_node, end_node, |e| mode.weight(e))
            .ok_or(RouteError::NoPath)?;

        let edges = path_edges(&self.graph, &nodes, mode);
        let path = polyline(&self.graph, &edges);
        if path.len() < 2 {
            return Err(RouteError::DegenerateRoute);
        }

        let (distance_meters, safety_cost) = edges.iter().fold((0.0, 0.0), |(d, s), &e| {
            let w = &self.graph.graph[e];
            (d + w.distance_meters, s + w.safety_cost)
        });
        debug!(hops = edges.len(), distance_meters, safety_cost, "Route computed");

        Ok(Route {
            mode,
            path,
            distance_meters,
            safety_cost,
        })
    }
}
