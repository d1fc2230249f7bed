//! HTTP handler functions for the bikeshare map API.

use actix_web::{HttpResponse, web};
use bikeshare_map_city::{CityError, all_cities};
use bikeshare_map_hover::{HoverController, HoverError, HoverState};
use bikeshare_map_server_models::{
    ApiCatchmentStyle, ApiError, ApiHealth, ApiHoverResponse, HoverQueryParams,
};
use bikeshare_map_station_models::stations_to_feature_collection;

use crate::{AppState, ServerError};

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/map`
///
/// Returns the base map (tile layer) settings.
pub async fn map(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&state.map)
}

/// `GET /api/cities`
///
/// Lists every configured city.
pub async fn cities() -> HttpResponse {
    HttpResponse::Ok().json(all_cities())
}

/// `GET /api/cities/{city}/stations`
///
/// Returns the city's stations as a point `FeatureCollection`.
pub async fn stations(state: web::Data<AppState>, city: web::Path<String>) -> HttpResponse {
    match state.layer(&city).await {
        Ok(layer) => HttpResponse::Ok().json(stations_to_feature_collection(&layer.stations)),
        Err(e) => error_response(&e),
    }
}

/// `GET /api/cities/{city}/catchments`
///
/// Returns the city's catchment polygons as a `FeatureCollection`, each
/// feature carrying its station's original properties.
pub async fn catchments(state: web::Data<AppState>, city: web::Path<String>) -> HttpResponse {
    match state.layer(&city).await {
        Ok(layer) => HttpResponse::Ok().json(layer.to_feature_collection()),
        Err(e) => error_response(&e),
    }
}

/// `GET /api/cities/{city}/hover?station=NAME`
///
/// Styles of every catchment and the info panel while `station`'s
/// catchment is hovered.
pub async fn hover(
    state: web::Data<AppState>,
    city: web::Path<String>,
    params: web::Query<HoverQueryParams>,
) -> HttpResponse {
    let layer = match state.layer(&city).await {
        Ok(layer) => layer,
        Err(e) => return error_response(&e),
    };

    let mut controller = HoverController::new(layer);
    match controller.pointer_enter_station(&params.station) {
        Ok(()) => HttpResponse::Ok().json(hover_response(&controller)),
        Err(e) => error_response(&e.into()),
    }
}

/// `GET /api/cities/{city}/panel`
///
/// Styles and info panel while nothing is hovered.
pub async fn panel(state: web::Data<AppState>, city: web::Path<String>) -> HttpResponse {
    match state.layer(&city).await {
        Ok(layer) => HttpResponse::Ok().json(hover_response(&HoverController::new(layer))),
        Err(e) => error_response(&e),
    }
}

fn hover_response(controller: &HoverController) -> ApiHoverResponse {
    let (station, quartiles) = match controller.state() {
        HoverState::Idle => (None, None),
        HoverState::Focused {
            station, quartiles, ..
        } => (Some(station.clone()), *quartiles),
    };

    let styles = controller
        .layer()
        .catchments
        .iter()
        .zip(controller.styles())
        .map(|(catchment, style)| ApiCatchmentStyle {
            station: catchment.station.clone(),
            style: style.clone(),
        })
        .collect();

    ApiHoverResponse {
        station,
        quartiles,
        styles,
        panel: controller.panel().to_string(),
    }
}

fn error_response(e: &ServerError) -> HttpResponse {
    let body = ApiError {
        error: e.to_string(),
    };

    match e {
        ServerError::City(CityError::UnknownCity { .. })
        | ServerError::Hover(HoverError::UnknownStation { .. } | HoverError::NoSuchCatchment { .. }) => {
            HttpResponse::NotFound().json(body)
        }
        ServerError::Load(_) => HttpResponse::BadGateway().json(body),
        ServerError::Catchment(_) => {
            log::error!("Failed to build catchments: {e}");
            HttpResponse::InternalServerError().json(body)
        }
    }
}
