use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use shapesketch_shared::PredictRequest;

/// Status and JSON body as the classifier sent them.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifierReply {
    pub status: u16,
    pub body: Value,
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, request: &PredictRequest) -> Result<ClassifierReply, String>;
}

pub struct HttpClassifier {
    client: reqwest::Client,
    url: String,
}

impl HttpClassifier {
    pub fn new(url: String, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, request: &PredictRequest) -> Result<ClassifierReply, String> {
        let payload = serde_json::to_vec(request)
            .map_err(|e| format!("Failed to encode classifier request: {e}"))?;
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| format!("Classifier unreachable at {}: {e}", self.url))?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| format!("Classifier body read failed: {e}"))?;
        let body = serde_json::from_slice(&bytes)
            .map_err(|e| format!("Classifier returned non-JSON body (status {status}): {e}"))?;
        Ok(ClassifierReply { status, body })
    }
}
