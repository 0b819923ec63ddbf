use thiserror::Error;

/// Expected, recoverable outcomes of a route request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("Unknown place: {0}")]
    UnknownPlace(String),
    #[error("Start and destination cannot be the same")]
    SameEndpoints,
    #[error("Cannot snap to street network, the graph has no nodes")]
    NoReachableNode,
    #[error("No route found between these places")]
    NoPath,
    #[error("Route is too short or invalid")]
    DegenerateRoute,
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid GeoJSON in {dataset}: {source}")]
    GeoJson {
        dataset: &'static str,
        #[source]
        source: Box<geojson::Error>,
    },
    #[error("{0} dataset is not a FeatureCollection")]
    NotAFeatureCollection(&'static str),
}
