//! Compile-time registry of bikeshare cities.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! Adding a new city requires creating a TOML file in `cities/` and adding
//! a corresponding entry here.

use crate::{CityConfig, CityError, MapConfig};

/// Number of registered cities. Enforced by a test.
#[cfg(test)]
const EXPECTED_CITY_COUNT: usize = 9;

/// Embedded TOML city definitions.
const CITY_TOMLS: &[(&str, &str)] = &[
    ("boston", include_str!("../cities/boston.toml")),
    ("chicago", include_str!("../cities/chicago.toml")),
    ("dc", include_str!("../cities/dc.toml")),
    ("nyc", include_str!("../cities/nyc.toml")),
    ("sf", include_str!("../cities/sf.toml")),
    ("la", include_str!("../cities/la.toml")),
    ("portland", include_str!("../cities/portland.toml")),
    ("mn", include_str!("../cities/mn.toml")),
    ("phila", include_str!("../cities/phila.toml")),
];

/// Embedded base map settings.
const MAP_TOML: &str = include_str!("../map.toml");

/// Returns all registered cities, in registration order.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. Since these are
/// compile-time constants, parse failures indicate a development error
/// and are caught during CI.
#[must_use]
pub fn all_cities() -> Vec<CityConfig> {
    CITY_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse city config '{name}': {e}"))
        })
        .collect()
}

/// Looks up a city by id.
///
/// # Errors
///
/// Returns [`CityError::UnknownCity`] if no city is registered under `id`.
pub fn find_city(id: &str) -> Result<CityConfig, CityError> {
    all_cities()
        .into_iter()
        .find(|city| city.id == id)
        .ok_or_else(|| {
            log::debug!("City lookup failed for '{id}'");
            CityError::UnknownCity { id: id.to_string() }
        })
}

/// Returns the base map settings.
///
/// # Panics
///
/// Panics if the embedded `map.toml` fails to parse.
#[must_use]
pub fn map_config() -> MapConfig {
    toml::de::from_str(MAP_TOML).unwrap_or_else(|e| panic!("Failed to parse map config: {e}"))
}
