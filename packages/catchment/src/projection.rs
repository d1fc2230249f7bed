//! Local planar projection for catchment geometry.
//!
//! Buffers must be a true distance on the ground, so station coordinates
//! are projected into an equirectangular frame in metres centered on the
//! stations before any geometry is computed, and projected back afterwards.
//! Over the extent of one bikeshare system the distortion is negligible.

use bikeshare_map_station_models::Station;
use geo::Coord;

/// Mean Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Equirectangular projection around a fixed origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalProjection {
    origin: Coord<f64>,
    meters_per_deg_lon: f64,
    meters_per_deg_lat: f64,
}

impl LocalProjection {
    /// Creates a projection centered on `origin` (`x` = longitude,
    /// `y` = latitude).
    #[must_use]
    pub fn new(origin: Coord<f64>) -> Self {
        let meters_per_deg_lat = EARTH_RADIUS_M.to_radians();
        Self {
            origin,
            meters_per_deg_lon: meters_per_deg_lat * origin.y.to_radians().cos(),
            meters_per_deg_lat,
        }
    }

    /// Creates a projection centered on the mean position of `stations`.
    ///
    /// An empty slice yields a projection centered on `(0, 0)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_stations(stations: &[Station]) -> Self {
        if stations.is_empty() {
            return Self::new(Coord { x: 0.0, y: 0.0 });
        }

        let n = stations.len() as f64;
        let (lon_sum, lat_sum) = stations
            .iter()
            .fold((0.0, 0.0), |(lon, lat), s| (lon + s.longitude, lat + s.latitude));

        Self::new(Coord {
            x: lon_sum / n,
            y: lat_sum / n,
        })
    }

    /// Projects a lon/lat position to metres.
    #[must_use]
    pub fn project(&self, lonlat: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (lonlat.x - self.origin.x) * self.meters_per_deg_lon,
            y: (lonlat.y - self.origin.y) * self.meters_per_deg_lat,
        }
    }

    /// Inverse of [`Self::project`].
    #[must_use]
    pub fn unproject(&self, xy: Coord<f64>) -> Coord<f64> {
        Coord {
            x: xy.x / self.meters_per_deg_lon + self.origin.x,
            y: xy.y / self.meters_per_deg_lat + self.origin.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_positions() {
        let projection = LocalProjection::new(Coord { x: -77.03, y: 38.9 });
        let lonlat = Coord { x: -77.01, y: 38.95 };
        let back = projection.unproject(projection.project(lonlat));
        assert!((back.x - lonlat.x).abs() < 1e-9);
        assert!((back.y - lonlat.y).abs() < 1e-9);
    }

    #[test]
    fn origin_projects_to_zero() {
        let projection = LocalProjection::new(Coord { x: 10.0, y: 45.0 });
        let xy = projection.project(Coord { x: 10.0, y: 45.0 });
        assert!(xy.x.abs() < 1e-9 && xy.y.abs() < 1e-9);
    }

    #[test]
    fn scales_longitude_by_latitude() {
        let projection = LocalProjection::new(Coord { x: 0.0, y: 60.0 });
        let east = projection.project(Coord { x: 0.01, y: 60.0 });
        let north = projection.project(Coord { x: 0.0, y: 60.01 });
        // cos(60°) = 0.5
        assert!((east.x / north.y - 0.5).abs() < 1e-9);
        // 0.01° of latitude is roughly 1.11 km
        assert!((north.y - 1_111.95).abs() < 1.0);
    }

    #[test]
    fn centers_on_station_mean() {
        let stations = [
            Station::new("A", -77.0, 38.0, Default::default()),
            Station::new("B", -76.0, 39.0, Default::default()),
        ];
        let projection = LocalProjection::from_stations(&stations);
        let center = projection.project(Coord { x: -76.5, y: 38.5 });
        assert!(center.x.abs() < 1e-6 && center.y.abs() < 1e-6);
    }
}
