use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::str::FromStr;

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::graph::{NavigationGraph, WalkEdge};

/// Which edge weight the path search minimises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    Shortest,
    Safest,
}

impl RouteMode {
    pub fn weight(self, edge: &WalkEdge) -> f64 {
        match self {
            RouteMode::Shortest => edge.distance_meters,
            RouteMode::Safest => edge.safety_cost,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RouteMode::Shortest => "shortest",
            RouteMode::Safest => "safest",
        }
    }
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shortest" => Ok(RouteMode::Shortest),
            "safest" => Ok(RouteMode::Safest),
            other => Err(format!("unknown route mode '{other}'")),
        }
    }
}

#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    node: NodeIndex,
}

impl Eq for State {}

// Min-heap by cost, then by node index so equal costs pop in a fixed order.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-source Dijkstra from `start`, stopping once `end` is settled.
///
/// `weight` picks the edge field to minimise; both route modes run through here.
/// Returns the node sequence `start..=end`, or `None` when `end` lies in another
/// component. `start == end` yields a one-node path.
pub fn shortest_path<F>(
    nav: &NavigationGraph,
    start: NodeIndex,
    end: NodeIndex,
    weight: F,
) -> Option<Vec<NodeIndex>>
where
    F: Fn(&WalkEdge) -> f64,
{
    let g = &nav.graph;
    let n = g.node_count();
    if start.index() >= n || end.index() >= n {
        return None;
    }

    let mut dist = vec![f64::INFINITY; n];
    let mut prev: Vec<Option<NodeIndex>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut heap = BinaryHeap::new();

    dist[start.index()] = 0.0;
    heap.push(State {
        cost: 0.0,
        node: start,
    });

    while let Some(State { cost, node }) = heap.pop() {
        if visited[node.index()] {
            continue;
        }
        if node == end {
            return Some(reconstruct(&prev, start, end));
        }
        visited[node.index()] = true;

        for edge in g.edges(node) {
            let next = edge.target();
            if visited[next.index()] {
                continue;
            }
            let alt = cost + weight(edge.weight());
            if alt < dist[next.index()] {
                dist[next.index()] = alt;
                prev[next.index()] = Some(node);
                heap.push(State {
                    cost: alt,
                    node: next,
                });
            }
        }
    }

    None
}

fn reconstruct(prev: &[Option<NodeIndex>], start: NodeIndex, end: NodeIndex) -> Vec<NodeIndex> {
    let mut path = vec![end];
    let mut cur = end;
    while cur != start {
        match prev[cur.index()] {
            Some(p) => {
                path.push(p);
                cur = p;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Sum of `weight` along consecutive hops, using the cheapest parallel edge.
pub fn path_cost<F>(nav: &NavigationGraph, path: &[NodeIndex], weight: F) -> Option<f64>
where
    F: Fn(&WalkEdge) -> f64,
{
    path.windows(2).try_fold(0.0, |acc, hop| {
        nav.edge_between(hop[0], hop[1], &weight)
            .map(|e| acc + weight(&nav.graph[e]))
    })
}
