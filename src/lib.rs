//! Shortest versus safest walking routes across campus.
//!
//! Street centerlines become a walking graph whose edges carry two weights:
//! physical length and a safety cost inflated near crime incidents and on
//! poorly lit streets. Routes are Dijkstra searches over either weight.

pub mod api;
pub mod config;
pub mod dijkstra;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod loader;
pub mod places;
pub mod route;
pub mod safety;

pub use dijkstra::RouteMode;
pub use error::{LoadError, RouteError};
pub use route::{Planner, Route};
