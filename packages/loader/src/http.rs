//! HTTP fetch of dataset JSON.
//!
//! Each dataset is requested exactly once. A failed request or a
//! non-success status is returned to the caller as is; a static dataset
//! does not heal on re-fetch.

use crate::LoadError;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Sends a single GET request to `url` and parses the body as JSON.
///
/// # Errors
///
/// Returns [`LoadError`] if the request fails, the server answers with a
/// non-success status, or the body is not JSON.
#[allow(clippy::future_not_send)]
pub async fn get_json(client: &reqwest::Client, url: &str) -> Result<serde_json::Value, LoadError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            message: format!("HTTP {status} from {url}"),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let text = response.text().await?;

    serde_json::from_str(&text).map_err(|json_err| {
        let mut preview: String = text.chars().take(BODY_PREVIEW_LEN).collect();
        if preview.len() < text.len() {
            preview.push_str("...");
        }
        log::error!(
            "Dataset JSON parse failed.\n  \
             url: {url}\n  \
             status: {status}\n  \
             content-type: {content_type:?}\n  \
             received: {} bytes\n  \
             parse error: {json_err}\n  \
             body preview: {preview}",
            text.len(),
        );
        LoadError::Json(json_err)
    })
}
