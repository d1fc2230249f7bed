#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Quartile classification of trip counts.
//!
//! When a station is hovered, its outbound trip counts are split at the
//! first, second and third quartile, and every destination station is
//! assigned one of four [`Bucket`]s. Each bucket maps to a fixed fill color
//! and fill opacity; stations that received no trips stay invisible.

use bikeshare_map_station_models::TripCounts;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Percentiles reported by [`compute_quartiles`].
const PERCENTILES: [u64; 3] = [25, 50, 75];

/// First, second and third quartile of a trip-count distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    /// 25th percentile.
    pub q1: f64,
    /// 50th percentile (median).
    pub q2: f64,
    /// 75th percentile.
    pub q3: f64,
}

/// Computes the quartiles of a station's trip counts.
///
/// Counts are sorted ascending. For each percentile `p` the index
/// `p / 100 * N` is computed; when it is a whole number the quantile is
/// the mean of the elements at `index - 1` and `index`, otherwise it is
/// the element at `floor(index)`. Integrality is decided on integers so
/// no floating-point rounding can move a boundary.
///
/// Returns `None` for an empty mapping: there is nothing to classify.
#[must_use]
pub fn compute_quartiles(trips: &TripCounts) -> Option<Quartiles> {
    if trips.is_empty() {
        return None;
    }

    let mut sorted: Vec<u64> = trips.values().copied().collect();
    sorted.sort_unstable();

    let [q1, q2, q3] = PERCENTILES.map(|p| percentile(&sorted, p));

    Some(Quartiles { q1, q2, q3 })
}

/// Percentile `p` of a non-empty ascending slice.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn percentile(sorted: &[u64], p: u64) -> f64 {
    let scaled = p * sorted.len() as u64;
    let index = (scaled / 100) as usize;

    if scaled % 100 == 0 {
        (sorted[index - 1] as f64 + sorted[index] as f64) / 2.0
    } else {
        sorted[index] as f64
    }
}

/// One of the four quartile classes a destination station can fall in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Bucket {
    /// At or below Q1
    Bottom,
    /// Above Q1, at or below Q2
    Lower,
    /// Above Q2, at or below Q3
    Upper,
    /// Above Q3
    Top,
}

impl Bucket {
    /// Hex fill color for this bucket.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Top => "#800026",
            Self::Upper => "#E31A1C",
            Self::Lower => "#FD8D3C",
            Self::Bottom => "#FC4E2A",
        }
    }

    /// Fill opacity for this bucket.
    #[must_use]
    pub const fn fill_opacity(self) -> f64 {
        match self {
            Self::Top => 0.8,
            Self::Upper => 0.6,
            Self::Lower => 0.4,
            Self::Bottom => 0.2,
        }
    }
}

/// Classifies a trip count against the quartiles.
///
/// Comparisons are strict: a count equal to a quartile falls in the lower
/// of the two adjacent buckets.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn classify(count: u64, quartiles: &Quartiles) -> Bucket {
    let count = count as f64;

    if count > quartiles.q3 {
        Bucket::Top
    } else if count > quartiles.q2 {
        Bucket::Upper
    } else if count > quartiles.q1 {
        Bucket::Lower
    } else {
        Bucket::Bottom
    }
}

/// Classifies destination `name` within the hovered station's `trips`.
///
/// Returns `None` when `name` received no trips (absent or zero), in which
/// case its catchment stays invisible.
#[must_use]
pub fn classify_station(name: &str, trips: &TripCounts, quartiles: &Quartiles) -> Option<Bucket> {
    trips
        .get(name)
        .copied()
        .filter(|count| *count > 0)
        .map(|count| classify(count, quartiles))
}

/// Fill color for destination `name`, or `None` when it is unclassified.
#[must_use]
pub fn fill_color(name: &str, trips: &TripCounts, quartiles: &Quartiles) -> Option<&'static str> {
    classify_station(name, trips, quartiles).map(Bucket::color)
}

/// Fill opacity for destination `name`; exactly `0.0` when it received no
/// trips.
#[must_use]
pub fn fill_opacity(name: &str, trips: &TripCounts, quartiles: &Quartiles) -> f64 {
    classify_station(name, trips, quartiles).map_or(0.0, Bucket::fill_opacity)
}
