//! Historical-results REST collaborator
//!
//! One-shot queries against the detection backend's HTTP surface:
//! - `GET /health`  → liveness probe, logged at startup
//! - `GET /results` → offline model-accuracy and clustering metrics
//!
//! Both are best-effort: a failure is logged and the UI shows the results
//! pane as unavailable. Nothing here is streamed.

use reqwest;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ModelAccuracy {
    pub accuracy: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationResults {
    pub rf: ModelAccuracy,
    pub xgb: ModelAccuracy,
    pub dnn: ModelAccuracy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusteringResults {
    pub kmeans_silhouette: f64,
    pub dbscan_silhouette: f64,
    pub ae_kmeans_silhouette: f64,
}

/// Payload of `GET /results`.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionResults {
    pub classification: ClassificationResults,
    pub clustering: ClusteringResults,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

pub struct ResultsClient {
    base_url: String,
    client: reqwest::Client,
}

impl ResultsClient {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Probe `GET /health`; true when the backend reports `status == "ok"`.
    pub async fn health(&self) -> Result<bool, reqwest::Error> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let health: HealthResponse = response.json().await?;
        Ok(health.status == "ok")
    }

    /// Fetch the backend's offline evaluation results.
    pub async fn fetch_results(&self) -> Result<DetectionResults, reqwest::Error> {
        let url = format!("{}/results", self.base_url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        response.json().await
    }
}
