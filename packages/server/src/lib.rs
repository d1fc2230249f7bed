#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the bikeshare catchment map.
//!
//! Serves city and map configuration, station points, catchment polygons,
//! and the per-hover style set plus info panel that a map client applies
//! to its catchment layer. Catchments for a city are built the first time
//! the city is requested and cached for the life of the process. Raw
//! datasets are served as static files under `/data`.

mod handlers;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use bikeshare_map_catchment::{
    CatchmentError, CatchmentLayer, CatchmentOptions, DEFAULT_RADIUS_KM, build_catchments,
};
use bikeshare_map_city::{CityError, MapConfig, find_city, map_config};
use bikeshare_map_hover::HoverError;
use bikeshare_map_loader::{DatasetSource, LoadError};

/// Errors surfaced by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Unknown city id.
    #[error(transparent)]
    City(#[from] CityError),

    /// The city's dataset could not be loaded.
    #[error("Failed to load dataset: {0}")]
    Load(#[from] LoadError),

    /// Catchments could not be built.
    #[error(transparent)]
    Catchment(#[from] CatchmentError),

    /// Unknown hover target.
    #[error(transparent)]
    Hover(#[from] HoverError),
}

/// Server settings, resolved from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`, default `127.0.0.1`).
    pub bind_addr: String,
    /// Port to bind (`PORT`, default `8080`).
    pub port: u16,
    /// Directory served under `/data` (`DATA_DIR`, default `data`).
    pub data_dir: PathBuf,
    /// Where city datasets are loaded from.
    pub source: DatasetSource,
    /// Catchment settings (`CATCHMENT_RADIUS_KM`, default 0.8).
    pub catchment: CatchmentOptions,
}

impl ServerConfig {
    /// Reads the server settings from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let data_dir = PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "data".into()));
        let radius_km = std::env::var("CATCHMENT_RADIUS_KM")
            .ok()
            .and_then(|r| r.parse().ok())
            .unwrap_or(DEFAULT_RADIUS_KM);

        Self {
            bind_addr,
            port,
            data_dir,
            source: DatasetSource::from_env(),
            catchment: CatchmentOptions { radius_km },
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// Where city datasets are loaded from.
    pub source: DatasetSource,
    /// Catchment settings.
    pub catchment: CatchmentOptions,
    /// Base map settings returned by `/api/map`.
    pub map: MapConfig,
    /// Built catchment layers by city id.
    layers: RwLock<BTreeMap<String, Arc<CatchmentLayer>>>,
}

impl AppState {
    /// Creates state with an empty layer cache.
    #[must_use]
    pub const fn new(source: DatasetSource, catchment: CatchmentOptions, map: MapConfig) -> Self {
        Self {
            source,
            catchment,
            map,
            layers: RwLock::new(BTreeMap::new()),
        }
    }

    /// Returns the catchment layer of `city_id`, loading the dataset and
    /// building catchments on first use.
    ///
    /// A failed load is logged and not cached; the next request for the city
    /// fetches the dataset again.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if the city is unknown, its dataset cannot
    /// be loaded, or catchments cannot be built.
    #[allow(clippy::future_not_send)]
    pub async fn layer(&self, city_id: &str) -> Result<Arc<CatchmentLayer>, ServerError> {
        if let Some(layer) = self
            .layers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(city_id)
        {
            return Ok(Arc::clone(layer));
        }

        let city = find_city(city_id)?;
        let stations = self.source.load(&city).await.inspect_err(|e| {
            log::error!("Failed to load {} dataset: {e}", city.id);
        })?;
        let layer = Arc::new(build_catchments(stations, &self.catchment)?);

        self.layers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(city.id, Arc::clone(&layer));

        Ok(layer)
    }
}

/// Registers the API routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/map", web::get().to(handlers::map))
            .route("/cities", web::get().to(handlers::cities))
            .route("/cities/{city}/stations", web::get().to(handlers::stations))
            .route("/cities/{city}/catchments", web::get().to(handlers::catchments))
            .route("/cities/{city}/hover", web::get().to(handlers::hover))
            .route("/cities/{city}/panel", web::get().to(handlers::panel)),
    );
}

/// Starts the bikeshare map API server.
///
/// This is a regular async function; the caller provides the async
/// runtime (e.g. via `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let map = map_config().with_access_token(std::env::var("MAPBOX_ACCESS_TOKEN").ok());
    if map.access_token.is_none() {
        log::warn!("MAPBOX_ACCESS_TOKEN is not set; map clients will not be able to load tiles");
    }

    log::info!("Loading datasets from {:?}", config.source);

    let state = web::Data::new(AppState::new(config.source, config.catchment, map));
    let data_dir = config.data_dir;

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
            // Serve raw station datasets
            .service(Files::new("/data", &data_dir))
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use bikeshare_map_station_models::{Station, TripCounts, stations_to_feature_collection};

    fn trips(entries: &[(&str, u64)]) -> TripCounts {
        entries
            .iter()
            .map(|(name, count)| ((*name).to_string(), *count))
            .collect()
    }

    fn write_dataset(name: &str) -> PathBuf {
        let stations = vec![
            Station::new(
                "A",
                -77.035,
                38.895,
                trips(&[("B", 5), ("C", 10), ("D", 15), ("E", 20)]),
            ),
            Station::new("B", -77.045, 38.895, trips(&[("A", 2)])),
            Station::new("C", -77.025, 38.895, TripCounts::new()),
            Station::new("D", -77.035, 38.905, TripCounts::new()),
            Station::new("E", -77.035, 38.885, TripCounts::new()),
        ];

        let root = std::env::temp_dir().join(format!(
            "bikeshare_map_server_{name}_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(
            root.join("dc.json"),
            serde_json::to_string(&stations_to_feature_collection(&stations)).unwrap(),
        )
        .unwrap();
        root
    }

    fn state(root: PathBuf) -> web::Data<AppState> {
        web::Data::new(AppState::new(
            DatasetSource::Directory { root },
            CatchmentOptions::default(),
            map_config(),
        ))
    }

    #[actix_web::test]
    async fn hover_returns_styles_and_panel() {
        let root = write_dataset("hover");
        let app = test::init_service(App::new().app_data(state(root.clone())).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/cities/dc/hover?station=A")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["station"], "A");
        assert_eq!(body["quartiles"]["q2"], 12.5);
        let styles = body["styles"].as_array().unwrap();
        assert_eq!(styles.len(), 5);
        let d = styles.iter().find(|s| s["station"] == "D").unwrap();
        assert_eq!(d["fillColor"], "#E31A1C");
        assert_eq!(d["fillOpacity"], 0.6);
        assert!(body["panel"].as_str().unwrap().starts_with("<h5>From A</h5>"));

        std::fs::remove_dir_all(root).unwrap();
    }

    #[actix_web::test]
    async fn panel_and_catchments_describe_idle_layer() {
        let root = write_dataset("idle");
        let app = test::init_service(App::new().app_data(state(root.clone())).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/cities/dc/panel").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["panel"], "<h5>5 stations in total</h5>");
        assert!(
            body["styles"]
                .as_array()
                .unwrap()
                .iter()
                .all(|s| s["fillOpacity"] == 0.0)
        );

        let req = test::TestRequest::get().uri("/api/cities/dc/catchments").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(body["features"].as_array().unwrap().len(), 5);

        std::fs::remove_dir_all(root).unwrap();
    }

    #[actix_web::test]
    async fn unknown_city_and_station_are_not_found() {
        let root = write_dataset("missing");
        let app = test::init_service(App::new().app_data(state(root.clone())).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/cities/atlantis/catchments").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri("/api/cities/dc/hover?station=Nowhere")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

        std::fs::remove_dir_all(root).unwrap();
    }

    #[actix_web::test]
    async fn missing_dataset_is_a_bad_gateway_and_not_cached() {
        let root = std::env::temp_dir().join(format!("bikeshare_map_server_empty_{}", std::process::id()));
        let app_state = state(root);
        let app = test::init_service(App::new().app_data(app_state.clone()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/cities/chicago/stations").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_GATEWAY);
        assert!(app_state.layers.read().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn lists_cities_and_map_config() {
        let app = test::init_service(
            App::new()
                .app_data(state(std::env::temp_dir()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/cities").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body.as_array().unwrap().iter().any(|c| c["id"] == "dc"));

        let req = test::TestRequest::get().uri("/api/map").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["defaultCity"], "dc");
        assert_eq!(body["tileSize"], 512);
    }
}
