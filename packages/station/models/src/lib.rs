#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Bikeshare station types.
//!
//! A [`Station`] is one point feature of a city dataset: a location, a
//! unique name, and the number of trips that left it for every other
//! station. All other crates in the workspace consume stations through
//! this type rather than through raw `GeoJSON`.

use std::collections::BTreeMap;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

/// Property holding the station's unique name.
pub const STATION_NAME_PROPERTY: &str = "station_name";

/// Property holding the destination-name -> trip-count mapping.
pub const TRIPS_PROPERTY: &str = "to";

/// Outbound trip counts keyed by destination station name.
pub type TripCounts = BTreeMap<String, u64>;

/// A bikeshare station loaded from a city dataset.
///
/// Immutable after load. `properties` keeps every property of the source
/// feature verbatim (including `station_name` and `to`) so derived
/// features can carry them unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Unique station name.
    pub name: String,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Outbound trips to each destination station.
    pub trips: TripCounts,
    /// Original feature properties.
    pub properties: JsonObject,
}

impl Station {
    /// Creates a station from a name, location and trip counts, building
    /// the matching `GeoJSON` properties.
    #[must_use]
    pub fn new(name: impl Into<String>, longitude: f64, latitude: f64, trips: TripCounts) -> Self {
        let name = name.into();
        let mut properties = JsonObject::new();
        properties.insert(
            STATION_NAME_PROPERTY.to_string(),
            JsonValue::String(name.clone()),
        );
        properties.insert(
            TRIPS_PROPERTY.to_string(),
            JsonValue::Object(
                trips
                    .iter()
                    .map(|(dest, count)| (dest.clone(), JsonValue::from(*count)))
                    .collect(),
            ),
        );

        Self {
            name,
            longitude,
            latitude,
            trips,
            properties,
        }
    }

    /// Parses a station from a `GeoJSON` point feature.
    ///
    /// A missing `to` property is treated as an empty mapping. Entries of
    /// `to` that are not non-negative integers are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStationError`] if the feature has no point geometry
    /// or no string `station_name` property.
    pub fn from_feature(feature: &Feature) -> Result<Self, InvalidStationError> {
        let (longitude, latitude) = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::Point(position)) if position.len() >= 2 => (position[0], position[1]),
            _ => return Err(InvalidStationError::NotAPoint),
        };

        let properties = feature.properties.clone().unwrap_or_default();

        let name = properties
            .get(STATION_NAME_PROPERTY)
            .and_then(JsonValue::as_str)
            .ok_or(InvalidStationError::MissingName)?
            .to_string();

        let trips = properties
            .get(TRIPS_PROPERTY)
            .and_then(JsonValue::as_object)
            .map(parse_trip_counts)
            .unwrap_or_default();

        Ok(Self {
            name,
            longitude,
            latitude,
            trips,
            properties,
        })
    }

    /// Converts the station back into a `GeoJSON` point feature carrying
    /// its original properties.
    #[must_use]
    pub fn to_feature(&self) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![
                self.longitude,
                self.latitude,
            ]))),
            id: None,
            properties: Some(self.properties.clone()),
            foreign_members: None,
        }
    }

    /// Total outbound trips from this station.
    #[must_use]
    pub fn total_trips(&self) -> u64 {
        self.trips.values().sum()
    }
}

fn parse_trip_counts(object: &JsonObject) -> TripCounts {
    object
        .iter()
        .filter_map(|(dest, count)| {
            let count = count.as_u64().or_else(|| {
                count
                    .as_f64()
                    .filter(|c| c.is_finite() && *c >= 0.0 && c.fract() == 0.0)
                    .map(|c| {
                        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                        let c = c as u64;
                        c
                    })
            })?;
            Some((dest.clone(), count))
        })
        .collect()
}

/// Builds a `FeatureCollection` of station points.
#[must_use]
pub fn stations_to_feature_collection(stations: &[Station]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: stations.iter().map(Station::to_feature).collect(),
        foreign_members: None,
    }
}

/// Error returned when a `GeoJSON` feature cannot be read as a [`Station`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidStationError {
    /// The feature has no `Point` geometry.
    NotAPoint,
    /// The feature has no string `station_name` property.
    MissingName,
}

impl std::fmt::Display for InvalidStationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAPoint => write!(f, "feature geometry is not a point"),
            Self::MissingName => write!(f, "feature has no '{STATION_NAME_PROPERTY}' property"),
        }
    }
}

impl std::error::Error for InvalidStationError {}
