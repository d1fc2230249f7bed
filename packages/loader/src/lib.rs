#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Bikeshare station dataset loading.
//!
//! A city dataset is a `GeoJSON` `FeatureCollection` of `Point` features,
//! one per station, each carrying a `station_name` and a `to` mapping of
//! outbound trip counts. [`DatasetSource`] fetches it over HTTP or reads
//! it from a local data directory, and [`parse_stations`] turns it into
//! [`Station`]s.

pub mod http;

use std::path::{Path, PathBuf};

use bikeshare_map_city::CityConfig;
use bikeshare_map_station_models::Station;
use geojson::GeoJson;

/// Errors that can occur while loading a station dataset.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP error: {message}")]
    Status {
        /// Description of the failing status.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The `GeoJSON` document is not a `FeatureCollection`.
    #[error("Expected a GeoJSON FeatureCollection")]
    NotAFeatureCollection,

    /// I/O error (file read).
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Where city datasets are loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// Fetch `{base_url}{dataset}` over HTTP.
    Http {
        /// Base URL the city dataset paths are resolved against.
        base_url: String,
    },
    /// Read `{root}/{dataset file}` from disk.
    Directory {
        /// Local data directory.
        root: PathBuf,
    },
}

impl DatasetSource {
    /// Resolves the dataset source from the environment.
    ///
    /// `DATASET_BASE_URL` selects HTTP loading; otherwise datasets are read
    /// from `DATA_DIR` (default `data`).
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var("DATASET_BASE_URL").map_or_else(
            |_| Self::Directory {
                root: PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "data".into())),
            },
            |base_url| Self::Http { base_url },
        )
    }

    /// Loads the stations of `city`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the dataset cannot be fetched, read, or
    /// parsed as a station `FeatureCollection`.
    #[allow(clippy::future_not_send)]
    pub async fn load(&self, city: &CityConfig) -> Result<Vec<Station>, LoadError> {
        match self {
            Self::Http { base_url } => {
                let url = city.dataset_url(base_url);
                log::info!("Fetching {} stations from {url}", city.id);
                fetch_stations(&reqwest::Client::new(), &url).await
            }
            Self::Directory { root } => {
                let path = root.join(city.dataset_file_name());
                log::info!("Reading {} stations from {}", city.id, path.display());
                load_stations_file(&path).await
            }
        }
    }
}

/// Fetches a station dataset over HTTP.
///
/// # Errors
///
/// Returns [`LoadError`] if the request fails, the server answers with a
/// non-success status, or the body is not a station `FeatureCollection`.
/// The request is never retried.
#[allow(clippy::future_not_send)]
pub async fn fetch_stations(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<Station>, LoadError> {
    let body = http::get_json(client, url).await?;
    parse_stations(GeoJson::from_json_value(body)?)
}

/// Reads a station dataset from a local file.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be read or is not a station
/// `FeatureCollection`.
pub async fn load_stations_file(path: &Path) -> Result<Vec<Station>, LoadError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_stations_str(&text)
}

/// Parses a station dataset from a JSON string.
///
/// # Errors
///
/// Returns [`LoadError`] if the text is not a `GeoJSON` `FeatureCollection`.
pub fn parse_stations_str(text: &str) -> Result<Vec<Station>, LoadError> {
    parse_stations(text.parse::<GeoJson>()?)
}

/// Converts a `GeoJSON` document into stations, in feature order.
///
/// Features that are not named points are skipped with a warning; the
/// remaining stations keep their relative order.
///
/// # Errors
///
/// Returns [`LoadError::NotAFeatureCollection`] for any other `GeoJSON`
/// document type.
pub fn parse_stations(geojson: GeoJson) -> Result<Vec<Station>, LoadError> {
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(LoadError::NotAFeatureCollection);
    };

    let total = collection.features.len();
    let stations: Vec<Station> = collection
        .features
        .iter()
        .enumerate()
        .filter_map(|(i, feature)| match Station::from_feature(feature) {
            Ok(station) => Some(station),
            Err(e) => {
                log::warn!("Skipping feature {i}: {e}");
                None
            }
        })
        .collect();

    log::debug!("Parsed {} of {total} features as stations", stations.len());

    Ok(stations)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATASET: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-77.03, 38.90]},
                "properties": {"station_name": "A", "to": {"B": 3}}
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-77.02, 38.91]},
                "properties": {"to": {"A": 1}}
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-77.01, 38.92]},
                "properties": {"station_name": "B", "to": {"A": 7}}
            }
        ]
    }"#;

    #[test]
    fn parses_stations_in_order_skipping_invalid() {
        let stations = parse_stations_str(DATASET).unwrap();
        let names: Vec<&str> = stations.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(stations[1].trips.get("A"), Some(&7));
    }

    #[test]
    fn rejects_non_feature_collection() {
        let point = r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#;
        assert!(matches!(
            parse_stations_str(point),
            Err(LoadError::NotAFeatureCollection)
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(parse_stations_str("{not json").is_err());
    }

    #[tokio::test]
    async fn loads_from_data_directory() {
        let root = std::env::temp_dir().join(format!("bikeshare_map_loader_{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("dc.json"), DATASET).unwrap();

        let city = bikeshare_map_city::find_city("dc").unwrap();
        let source = DatasetSource::Directory { root: root.clone() };
        let stations = source.load(&city).await.unwrap();
        assert_eq!(stations.len(), 2);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let path = std::env::temp_dir().join("bikeshare_map_loader_missing.json");
        let err = load_stations_file(&path).await.unwrap_err();
        assert!(matches!(err, LoadError::Io { path: p, .. } if p == path));
    }

    /// Serves `response` to every connection on a local port, counting
    /// connections.
    async fn serve(
        response: String,
    ) -> (
        String,
        std::sync::Arc<std::sync::atomic::AtomicUsize>,
        tokio::task::JoinHandle<()>,
    ) {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/data/dc.json", listener.local_addr().unwrap());
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&connections);

        let server = tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (url, connections, server)
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\n\
             content-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[tokio::test]
    async fn server_error_fails_after_one_request() {
        let (url, connections, server) =
            serve(http_response("503 Service Unavailable", "")).await;

        let started = std::time::Instant::now();
        let result = fetch_stations(&reqwest::Client::new(), &url).await;

        assert!(
            matches!(&result, Err(LoadError::Status { message }) if message.contains("503")),
            "unexpected result: {result:?}"
        );
        assert_eq!(connections.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert!(started.elapsed() < std::time::Duration::from_secs(2));

        server.abort();
    }

    #[tokio::test]
    async fn client_error_is_a_status_error() {
        let (url, connections, server) = serve(http_response("404 Not Found", "")).await;

        let result = fetch_stations(&reqwest::Client::new(), &url).await;

        assert!(matches!(result, Err(LoadError::Status { .. })));
        assert_eq!(connections.load(std::sync::atomic::Ordering::SeqCst), 1);

        server.abort();
    }

    #[tokio::test]
    async fn fetches_stations_over_http() {
        let (url, _connections, server) = serve(http_response("200 OK", DATASET)).await;

        let stations = fetch_stations(&reqwest::Client::new(), &url).await.unwrap();
        let names: Vec<&str> = stations.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);

        server.abort();
    }
}
