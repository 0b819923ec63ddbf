use std::env;

use tracing::Level;

pub const PLACES_VAR: &str = "SAFEWALK_PLACES";
pub const STREETS_VAR: &str = "SAFEWALK_STREETS";
pub const CRIMES_VAR: &str = "SAFEWALK_CRIMES";
pub const BIND_VAR: &str = "SAFEWALK_BIND";
pub const LOG_VAR: &str = "SAFEWALK_LOG";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub places_path: String,
    pub streets_path: String,
    pub crimes_path: String,
    pub bind_addr: String,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            places_path: "data/UpennBuilding.geojson".to_string(),
            streets_path: "data/Street_Centerline.geojson".to_string(),
            crimes_path: "data/Crime.geojson".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            log_level: Level::INFO,
        }
    }
}

impl Config {
    /// Environment first, then `.env` if present, then defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        Self {
            places_path: lookup(PLACES_VAR).unwrap_or(defaults.places_path),
            streets_path: lookup(STREETS_VAR).unwrap_or(defaults.streets_path),
            crimes_path: lookup(CRIMES_VAR).unwrap_or(defaults.crimes_path),
            bind_addr: lookup(BIND_VAR).unwrap_or(defaults.bind_addr),
            log_level: lookup(LOG_VAR)
                .and_then(|level| level.parse().ok())
                .unwrap_or(defaults.log_level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Config::from_lookup(|_| None), Config::default());
    }

    #[test]
    fn overrides_and_bad_log_level() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (STREETS_VAR, "/srv/streets.geojson"),
            (BIND_VAR, "127.0.0.1:8080"),
            (LOG_VAR, "loud"),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.streets_path, "/srv/streets.geojson");
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.places_path, Config::default().places_path);
        assert_eq!(config.log_level, Level::INFO);

        let debug = Config::from_lookup(|key| (key == LOG_VAR).then(|| "debug".to_string()));
        assert_eq!(debug.log_level, Level::DEBUG);
    }
}
