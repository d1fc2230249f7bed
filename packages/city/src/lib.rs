#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! City and map configuration for the bikeshare map.
//!
//! Every supported city is described by a TOML file in
//! `packages/city/cities/`, embedded at compile time by the [`registry`]
//! module. Configurations are immutable and looked up by city id; nothing
//! in the workspace reads city settings from ambient state.

pub mod registry;

use serde::{Deserialize, Serialize};

pub use registry::{all_cities, find_city, map_config};

/// Errors that can occur when resolving city configuration.
#[derive(Debug, thiserror::Error)]
pub enum CityError {
    /// No city is registered under the requested id.
    #[error("Unknown city: {id}")]
    UnknownCity {
        /// The id that was looked up.
        id: String,
    },
}

/// Configuration for a single bikeshare city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityConfig {
    /// Unique city identifier (e.g. `"dc"`).
    pub id: String,
    /// Human-readable city name.
    pub name: String,
    /// Initial map center as `[latitude, longitude]`.
    pub center: [f64; 2],
    /// Path of the station dataset, relative to the data root
    /// (e.g. `"/data/dc.json"`).
    pub dataset: String,
    /// Initial map zoom level.
    pub zoom: u8,
}

impl CityConfig {
    /// Resolves the dataset path against a base URL
    /// (e.g. `"http://localhost:8080"`).
    #[must_use]
    pub fn dataset_url(&self, base_url: &str) -> String {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            self.dataset.trim_start_matches('/')
        )
    }

    /// Dataset path relative to a local data directory.
    ///
    /// The `/data/` prefix of [`Self::dataset`] names the served directory
    /// itself, so `"/data/dc.json"` resolves to `"dc.json"`.
    #[must_use]
    pub fn dataset_file_name(&self) -> &str {
        let path = self.dataset.trim_start_matches('/');
        path.strip_prefix("data/").unwrap_or(path)
    }
}

/// Base map settings shared by all cities.
///
/// Describes the tile layer a map client should render beneath the
/// catchment polygons. The tile access token is never embedded; it is
/// filled in from the environment by [`MapConfig::with_access_token`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct MapConfig {
    /// City selected when the map first loads.
    pub default_city: String,
    /// Zoom level used before any city is selected.
    pub default_zoom: u8,
    /// Tile URL template with `{id}`, `{z}`, `{x}`, `{y}` and
    /// `{accessToken}` placeholders.
    pub tile_url: String,
    /// Tile style identifier substituted for `{id}`.
    pub tile_style_id: String,
    /// HTML attribution shown on the map.
    pub attribution: String,
    /// Maximum zoom level.
    pub max_zoom: u8,
    /// Tile size in pixels.
    pub tile_size: u32,
    /// Zoom offset applied to tile requests.
    pub zoom_offset: i8,
    /// Tile provider access token.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl MapConfig {
    /// Returns a copy carrying the given access token.
    #[must_use]
    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dc() -> CityConfig {
        CityConfig {
            id: "dc".to_string(),
            name: "Washington, DC".to_string(),
            center: [38.953, -77.027],
            dataset: "/data/dc.json".to_string(),
            zoom: 11,
        }
    }

    #[test]
    fn dataset_url_joins_without_double_slash() {
        assert_eq!(
            dc().dataset_url("http://localhost:8080/"),
            "http://localhost:8080/data/dc.json"
        );
        assert_eq!(
            dc().dataset_url("https://example.org"),
            "https://example.org/data/dc.json"
        );
    }

    #[test]
    fn dataset_file_name_strips_data_prefix() {
        assert_eq!(dc().dataset_file_name(), "dc.json");

        let mut city = dc();
        city.dataset = "stations/dc.json".to_string();
        assert_eq!(city.dataset_file_name(), "stations/dc.json");
    }

    #[test]
    fn access_token_is_injected() {
        let config = map_config().with_access_token(Some("pk.test".to_string()));
        assert_eq!(config.access_token.as_deref(), Some("pk.test"));
    }
}
