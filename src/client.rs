//! HTTP client for the scoring service. The two endpoints encode their
//! responses differently and the difference is contractual: the overlay
//! endpoint returns a JSON string wrapping a geojson document (decoded in two
//! steps), the simulate endpoint returns structured geojson (decoded in one).

use crate::overlay;
use crate::types::LngLat;
use anyhow::{Context, Result};
use geojson::FeatureCollection;

#[derive(Debug, Clone)]
pub struct ScoringClient {
    http: reqwest::Client,
    base_url: String,
}

impl ScoringClient {
    pub fn new(base_url: &str) -> Self {
        ScoringClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// GET /underserved-overlay: the body is a JSON string whose value is
    /// itself a geojson document, so it takes an explicit second parse.
    pub async fn fetch_overlay(&self) -> Result<FeatureCollection> {
        let url = format!("{}/underserved-overlay", self.base_url);
        let document: String = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach the scoring service at {}", url))?
            .error_for_status()
            .context("Scoring service rejected the overlay request")?
            .json()
            .await
            .context("Overlay response body was not a JSON string")?;

        overlay::parse_document(&document)
    }

    /// POST /simulate-facility with `{lng, lat}`: the body is already a
    /// structured feature collection, no extra parse step.
    pub async fn simulate(&self, location: LngLat) -> Result<FeatureCollection> {
        let url = format!("{}/simulate-facility", self.base_url);
        self.http
            .post(&url)
            .json(&location)
            .send()
            .await
            .with_context(|| format!("Failed to reach the scoring service at {}", url))?
            .error_for_status()
            .context("Scoring service rejected the simulation request")?
            .json()
            .await
            .context("Simulation response was not a feature collection")
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::overlay::fixtures;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    /// In-process scoring service double. Serves the documented encodings:
    /// a double-encoded overlay document on GET, structured geojson on POST,
    /// and records every simulate payload it sees.
    pub(crate) async fn spawn_mock(simulate_fails: bool) -> (String, Arc<Mutex<Vec<Value>>>) {
        let posted: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));

        let overlay_doc = serde_json::to_string(&fixtures::collection(3)).unwrap();
        let overlay_handler = get(move || {
            let doc = overlay_doc.clone();
            async move { Json(doc) }
        });

        let seen = posted.clone();
        let simulate_handler = post(move |Json(body): Json<Value>| {
            let seen = seen.clone();
            async move {
                seen.lock().unwrap().push(body);
                if simulate_fails {
                    Err(StatusCode::INTERNAL_SERVER_ERROR)
                } else {
                    Ok(Json(fixtures::collection(1)))
                }
            }
        });

        let app = Router::new()
            .route("/underserved-overlay", overlay_handler)
            .route("/simulate-facility", simulate_handler);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), posted)
    }
}
