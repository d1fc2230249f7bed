#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the bikeshare map server.
//!
//! These types are serialized to JSON for the REST API. A map client
//! applies the returned styles to its catchment polygons (matched by
//! station name) and replaces its info panel with the returned HTML.

use bikeshare_map_classify::Quartiles;
use bikeshare_map_hover::Style;
use serde::{Deserialize, Serialize};

/// Style of one catchment, keyed by its station.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCatchmentStyle {
    /// Station the catchment belongs to.
    pub station: String,
    /// Style to apply.
    #[serde(flatten)]
    pub style: Style,
}

/// Layer styles and panel for one hover state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHoverResponse {
    /// Hovered station, absent when idle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,
    /// Quartiles of the hovered station's trips, absent when idle or when
    /// it has no trips.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quartiles: Option<Quartiles>,
    /// Style of every catchment, in layer order.
    pub styles: Vec<ApiCatchmentStyle>,
    /// Info panel HTML.
    pub panel: String,
}

/// Query parameters for the hover endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverQueryParams {
    /// Name of the hovered station.
    pub station: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Crate version.
    pub version: String,
}

/// Error body returned by failing endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catchment_style_is_flattened() {
        let style = ApiCatchmentStyle {
            station: "A".to_string(),
            style: Style {
                opacity: 0.0,
                fill_opacity: 0.4,
                fill_color: Some("#FD8D3C"),
            },
        };
        assert_eq!(
            serde_json::to_value(&style).unwrap(),
            serde_json::json!({
                "station": "A",
                "opacity": 0.0,
                "fillOpacity": 0.4,
                "fillColor": "#FD8D3C"
            })
        );
    }

    #[test]
    fn idle_response_omits_focus_fields() {
        let response = ApiHoverResponse {
            station: None,
            quartiles: None,
            styles: vec![],
            panel: "<h5>0 stations in total</h5>".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("station").is_none());
        assert!(json.get("quartiles").is_none());
        assert_eq!(json["panel"], "<h5>0 stations in total</h5>");
    }
}
