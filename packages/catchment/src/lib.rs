#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Catchment areas of bikeshare stations.
//!
//! A station's catchment approximates the walkable area around it: a
//! fixed-radius buffer around the station, cut down to the station's
//! Voronoi cell so that neighboring catchments never overlap. The Voronoi
//! tessellation is bounded by the bounding box of all stations.
//!
//! Geometry runs in a [`LocalProjection`] (metres) and the resulting
//! polygons are projected back to longitude/latitude.

pub mod projection;
pub mod voronoi;

use bikeshare_map_station_models::{Station, TripCounts};
use geo::{BooleanOps, BoundingRect, Buffer, Coord, MapCoords, MultiPoint, MultiPolygon, Point, Rect};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};

pub use projection::LocalProjection;
pub use voronoi::voronoi_cells;

/// Default catchment radius: roughly half a mile.
pub const DEFAULT_RADIUS_KM: f64 = 0.8;

/// Errors that can occur while building catchments.
#[derive(Debug, thiserror::Error)]
pub enum CatchmentError {
    /// The buffer radius is not a positive, finite number.
    #[error("Invalid catchment radius: {radius_km} km")]
    InvalidRadius {
        /// The rejected radius.
        radius_km: f64,
    },
}

/// Options for [`build_catchments`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatchmentOptions {
    /// Buffer radius around each station, in kilometres.
    pub radius_km: f64,
}

impl Default for CatchmentOptions {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
        }
    }
}

/// The catchment polygon of a single station.
#[derive(Debug, Clone, PartialEq)]
pub struct Catchment {
    /// Name of the station this catchment belongs to.
    pub station: String,
    /// The station's outbound trip counts.
    pub trips: TripCounts,
    /// The station's original feature properties, unchanged.
    pub properties: JsonObject,
    /// Catchment area in longitude/latitude.
    pub geometry: MultiPolygon<f64>,
}

impl Catchment {
    /// Converts the catchment into a `GeoJSON` feature carrying the
    /// station's original properties.
    ///
    /// A single-part catchment is written as a `Polygon`, anything else as
    /// a `MultiPolygon`.
    #[must_use]
    pub fn to_feature(&self) -> Feature {
        let value = match self.geometry.0.as_slice() {
            [polygon] => Value::from(polygon),
            _ => Value::from(&self.geometry),
        };

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(value)),
            id: None,
            properties: Some(self.properties.clone()),
            foreign_members: None,
        }
    }
}

/// All catchments derived from one city's stations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatchmentLayer {
    /// The input stations, in dataset order.
    pub stations: Vec<Station>,
    /// One catchment per station whose buffer/cell intersection was
    /// non-empty, in station order.
    pub catchments: Vec<Catchment>,
}

impl CatchmentLayer {
    /// Number of stations the layer was built from.
    #[must_use]
    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// Finds the catchment of the named station.
    #[must_use]
    pub fn find(&self, station: &str) -> Option<&Catchment> {
        self.catchments.iter().find(|c| c.station == station)
    }

    /// Position of the named station's catchment in [`Self::catchments`].
    #[must_use]
    pub fn position(&self, station: &str) -> Option<usize> {
        self.catchments.iter().position(|c| c.station == station)
    }

    /// Converts the catchments into a `GeoJSON` `FeatureCollection`.
    #[must_use]
    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.catchments.iter().map(Catchment::to_feature).collect(),
            foreign_members: None,
        }
    }
}

/// Builds the catchment polygon of every station.
///
/// For each station `i`, `buffer[i]` is intersected with `voronoi[i]`.
/// Stations whose buffer or cell is missing, or whose intersection is
/// empty, are skipped, so the layer never has more catchments than
/// stations. Every catchment carries its station's original properties.
///
/// # Errors
///
/// Returns [`CatchmentError::InvalidRadius`] if `options.radius_km` is not
/// positive and finite.
pub fn build_catchments(
    stations: Vec<Station>,
    options: &CatchmentOptions,
) -> Result<CatchmentLayer, CatchmentError> {
    if !(options.radius_km.is_finite() && options.radius_km > 0.0) {
        return Err(CatchmentError::InvalidRadius {
            radius_km: options.radius_km,
        });
    }

    let projection = LocalProjection::from_stations(&stations);
    let sites: Vec<Coord<f64>> = stations
        .iter()
        .map(|s| {
            projection.project(Coord {
                x: s.longitude,
                y: s.latitude,
            })
        })
        .collect();

    let buffers = station_buffers(&sites, options.radius_km * 1000.0);
    let cells = stations_bbox(&sites).map_or_else(
        || vec![None; sites.len()],
        |bbox| voronoi_cells(&sites, bbox),
    );

    let mut catchments = Vec::with_capacity(stations.len());

    for (i, station) in stations.iter().enumerate() {
        let (Some(buffer), Some(cell)) = (&buffers[i], &cells[i]) else {
            log::debug!("No buffer or Voronoi cell for station '{}'", station.name);
            continue;
        };

        let area = buffer.intersection(cell);
        if area.0.is_empty() {
            log::debug!("Empty catchment for station '{}'", station.name);
            continue;
        }

        catchments.push(Catchment {
            station: station.name.clone(),
            trips: station.trips.clone(),
            properties: station.properties.clone(),
            geometry: area.map_coords(|xy| projection.unproject(xy)),
        });
    }

    log::info!(
        "Built {} catchments from {} stations ({} km radius)",
        catchments.len(),
        stations.len(),
        options.radius_km
    );

    Ok(CatchmentLayer {
        stations,
        catchments,
    })
}

/// Buffers every projected station by `radius_m` metres.
///
/// Entries are `None` where the buffer came out empty.
#[must_use]
pub fn station_buffers(sites: &[Coord<f64>], radius_m: f64) -> Vec<Option<MultiPolygon<f64>>> {
    sites
        .iter()
        .map(|site| {
            let buffer = Point::from(*site).buffer(radius_m);
            (!buffer.0.is_empty()).then_some(buffer)
        })
        .collect()
}

/// Bounding box of the projected stations, `None` when there are none.
#[must_use]
pub fn stations_bbox(sites: &[Coord<f64>]) -> Option<Rect<f64>> {
    MultiPoint::from(sites.iter().copied().map(Point::from).collect::<Vec<_>>()).bounding_rect()
}
