//! HTTP client for the review backend.
//!
//! One [`ReviewClient`] per session. It speaks either the current contract
//! (`{code, language, model, response_language}` → `{success, result, error}`) or
//! the legacy one (`{code, language}` → `{ml_suggestions, static_analysis}`),
//! selected by [`ApiFlavor`]. No call is retried.

use std::time::Duration;

use reqwest::{Response, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::models::ModelSelector;
use crate::types::{
    LegacyReviewRequest, LegacyReviewResponse, ReviewEnvelope, ReviewPayload, ReviewRequest,
};

pub const MODELS_PATH: &str = "api/models";
pub const REVIEW_PATH: &str = "api/review";
pub const PING_PATH: &str = "api/ping";

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Which request/response contract the backend speaks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFlavor {
    #[default]
    Modern,
    Legacy,
}

/// Connection settings for [`ReviewClient::new`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub flavor: ApiFlavor,
    /// Whole-request timeout. `None` leaves requests unbounded.
    pub request_timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct ReviewClient {
    http: reqwest::Client,
    base: Url,
    flavor: ApiFlavor,
}

impl ReviewClient {
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base_url` does not parse, or
    /// [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(options: &ClientOptions) -> Result<Self, ApiError> {
        let mut base = Url::parse(&options.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", options.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(options.base_url.clone()));
        }
        // Url::join drops the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("critique/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self { http: builder.build()?, base, flavor: options.flavor })
    }

    pub fn flavor(&self) -> ApiFlavor {
        self.flavor
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{}{path}: {e}", self.base)))
    }

    /// Fetches the model directory and turns it into selector state.
    ///
    /// Never fails: transport errors and malformed payloads produce a selector
    /// holding a single disabled placeholder.
    pub async fn load_models(&self) -> ModelSelector {
        ModelSelector::from_response(self.fetch_models().await)
    }

    /// Raw `GET /api/models` body. The status code is not checked: error bodies
    /// carry `success: false` and are judged by shape.
    pub async fn fetch_models(&self) -> Result<Value, ApiError> {
        let url = self.endpoint(MODELS_PATH)?;
        let response = self.http.get(url).send().await?;
        tracing::debug!(status = response.status().as_u16(), "GET {MODELS_PATH}");
        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }

    /// `true` when `GET /api/ping` answers with a 2xx status.
    pub async fn ping(&self) -> bool {
        let url = match self.endpoint(PING_PATH) {
            Ok(url) => url,
            Err(_) => return false,
        };
        match self.http.get(url).send().await {
            Ok(response) => {
                tracing::debug!(status = response.status().as_u16(), "GET {PING_PATH}");
                response.status().is_success()
            }
            Err(e) => {
                tracing::warn!(%e, "backend ping failed");
                false
            }
        }
    }

    /// Submits a review request using the configured contract.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Transport`] if the request did not complete.
    /// - [`ApiError::Server`] for a non-2xx status, with the body's `error` text.
    /// - [`ApiError::Rejected`] for `success: false`.
    /// - [`ApiError::Malformed`] if a 2xx body is not the expected JSON.
    pub async fn review(&self, request: &ReviewRequest) -> Result<ReviewPayload, ApiError> {
        match self.flavor {
            ApiFlavor::Modern => self.review_modern(request).await,
            ApiFlavor::Legacy => self.review_legacy(request).await,
        }
    }

    async fn review_modern(&self, request: &ReviewRequest) -> Result<ReviewPayload, ApiError> {
        let url = self.endpoint(REVIEW_PATH)?;
        let response = self.http.post(url).json(request).send().await?;
        tracing::debug!(
            status = response.status().as_u16(),
            language = request.language.as_str(),
            model = %request.model,
            "POST {REVIEW_PATH}"
        );
        let response = check_status(response).await?;

        let envelope: ReviewEnvelope = response
            .json()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))?;
        if !envelope.success {
            return Err(ApiError::rejected(envelope.error_message()));
        }
        Ok(envelope
            .result
            .map(ReviewPayload::from)
            .unwrap_or_else(|| ReviewPayload::Text(String::new())))
    }

    async fn review_legacy(&self, request: &ReviewRequest) -> Result<ReviewPayload, ApiError> {
        let url = self.endpoint(REVIEW_PATH)?;
        let body = LegacyReviewRequest::from(request);
        let response = self.http.post(url).json(&body).send().await?;
        tracing::debug!(status = response.status().as_u16(), "POST {REVIEW_PATH} (legacy)");
        let response = check_status(response).await?;

        let parsed: LegacyReviewResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))?;
        Ok(ReviewPayload::from(parsed))
    }
}

/// Passes 2xx responses through; converts anything else to [`ApiError::Server`],
/// pulling `error` out of a JSON body when there is one.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = error_detail(response).await;
    tracing::warn!(
        status = status.as_u16(),
        detail = detail.as_deref().unwrap_or(""),
        "backend returned error status"
    );
    Err(ApiError::Server { status: status.as_u16(), detail })
}

async fn error_detail(response: Response) -> Option<String> {
    let body: Value = response.json().await.ok()?;
    match body.get("error")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::String(_) | Value::Null => None,
        other => Some(other.to_string()),
    }
}

