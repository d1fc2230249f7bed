#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hover interaction for the catchment layer.
//!
//! [`HoverController`] is a two-state machine. While [`HoverState::Idle`]
//! every catchment is transparent and the info panel shows the station
//! count. Entering a catchment moves it to [`HoverState::Focused`]: every
//! catchment (not only the hovered one) is restyled by how many trips it
//! received from the hovered station, and the panel lists the hovered
//! station's top destinations. Leaving returns to idle.
//!
//! The style and panel functions are also usable on their own, for
//! callers that keep no per-pointer state (such as an HTTP handler).

pub mod panel;

use std::sync::Arc;

use bikeshare_map_catchment::CatchmentLayer;
use bikeshare_map_classify::{Quartiles, classify_station, compute_quartiles};
use bikeshare_map_station_models::TripCounts;
use serde::Serialize;

pub use panel::{default_panel, render_panel, top_destinations};

/// Errors that can occur when driving the hover controller.
#[derive(Debug, thiserror::Error)]
pub enum HoverError {
    /// No catchment exists at the given position.
    #[error("No catchment at index {index} (layer has {len})")]
    NoSuchCatchment {
        /// Requested position.
        index: usize,
        /// Number of catchments in the layer.
        len: usize,
    },

    /// No catchment belongs to the named station.
    #[error("No catchment for station '{station}'")]
    UnknownStation {
        /// Requested station name.
        station: String,
    },
}

/// Rendering style of one catchment polygon.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    /// Outline opacity. Catchment outlines are never drawn.
    pub opacity: f64,
    /// Fill opacity; `0.0` hides the polygon.
    pub fill_opacity: f64,
    /// Fill color, absent while the polygon is hidden.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<&'static str>,
}

impl Style {
    /// The idle style: fully transparent.
    #[must_use]
    pub const fn hidden() -> Self {
        Self {
            opacity: 0.0,
            fill_opacity: 0.0,
            fill_color: None,
        }
    }

    /// Whether the polygon is drawn at all.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.fill_opacity > 0.0
    }
}

/// Current hover state.
#[derive(Debug, Clone, PartialEq)]
pub enum HoverState {
    /// Nothing is hovered.
    Idle,
    /// A catchment is hovered.
    Focused {
        /// Name of the hovered station.
        station: String,
        /// The hovered station's outbound trips.
        trips: TripCounts,
        /// Quartiles of `trips`; `None` when it has no trips.
        quartiles: Option<Quartiles>,
    },
}

/// Styles of every catchment in `layer` while a station with `trips` is
/// hovered, in catchment order.
///
/// Each catchment is looked up by its own station name in `trips`. An
/// empty `trips` classifies nothing, so every catchment stays hidden.
#[must_use]
pub fn focused_styles(layer: &CatchmentLayer, trips: &TripCounts) -> Vec<Style> {
    let Some(quartiles) = compute_quartiles(trips) else {
        return idle_styles(layer);
    };

    layer
        .catchments
        .iter()
        .map(|catchment| {
            classify_station(&catchment.station, trips, &quartiles).map_or_else(
                Style::hidden,
                |bucket| Style {
                    opacity: 0.0,
                    fill_opacity: bucket.fill_opacity(),
                    fill_color: Some(bucket.color()),
                },
            )
        })
        .collect()
}

/// Styles of every catchment in `layer` while nothing is hovered.
#[must_use]
pub fn idle_styles(layer: &CatchmentLayer) -> Vec<Style> {
    vec![Style::hidden(); layer.catchments.len()]
}

/// Drives catchment styles and the info panel from pointer events.
#[derive(Debug, Clone)]
pub struct HoverController {
    layer: Arc<CatchmentLayer>,
    state: HoverState,
    styles: Vec<Style>,
    panel: String,
}

impl HoverController {
    /// Creates an idle controller over `layer`.
    #[must_use]
    pub fn new(layer: Arc<CatchmentLayer>) -> Self {
        let styles = idle_styles(&layer);
        let panel = default_panel(layer.station_count());

        Self {
            layer,
            state: HoverState::Idle,
            styles,
            panel,
        }
    }

    /// Pointer entered the catchment at `index`.
    ///
    /// Entering while already focused switches directly to the new
    /// station.
    ///
    /// # Errors
    ///
    /// Returns [`HoverError::NoSuchCatchment`] if `index` is out of range;
    /// the state is left unchanged.
    pub fn pointer_enter(&mut self, index: usize) -> Result<(), HoverError> {
        let len = self.layer.catchments.len();
        let catchment = self
            .layer
            .catchments
            .get(index)
            .ok_or(HoverError::NoSuchCatchment { index, len })?;

        let station = catchment.station.clone();
        let trips = catchment.trips.clone();
        log::debug!("Hover enter: {station} ({} destinations)", trips.len());

        self.styles = focused_styles(&self.layer, &trips);
        self.panel = render_panel(&station, &trips);
        self.state = HoverState::Focused {
            station,
            quartiles: compute_quartiles(&trips),
            trips,
        };

        Ok(())
    }

    /// Pointer entered the named station's catchment.
    ///
    /// # Errors
    ///
    /// Returns [`HoverError::UnknownStation`] if the station has no
    /// catchment.
    pub fn pointer_enter_station(&mut self, station: &str) -> Result<(), HoverError> {
        let index = self
            .layer
            .position(station)
            .ok_or_else(|| HoverError::UnknownStation {
                station: station.to_string(),
            })?;
        self.pointer_enter(index)
    }

    /// Pointer left the catchment layer.
    pub fn pointer_leave(&mut self) {
        if let HoverState::Focused { station, .. } = &self.state {
            log::debug!("Hover leave: {station}");
        }

        self.state = HoverState::Idle;
        self.styles = idle_styles(&self.layer);
        self.panel = default_panel(self.layer.station_count());
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &HoverState {
        &self.state
    }

    /// Current style of every catchment, in catchment order.
    #[must_use]
    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    /// Current info panel HTML.
    #[must_use]
    pub fn panel(&self) -> &str {
        &self.panel
    }

    /// The layer being styled.
    #[must_use]
    pub fn layer(&self) -> &CatchmentLayer {
        &self.layer
    }
}
