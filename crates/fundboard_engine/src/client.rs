use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

use crate::protocol::{BatchCreated, JobStatusDto, PrepareDto};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
    #[error("{0}")]
    Transport(String),
    /// Non-success HTTP status. The message is the response body verbatim
    /// when the server sent one, else a generic `status N`.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Thin JSON client for the scrape API. One attempt per call; no retry, no
/// timeout, no backoff; failures surface directly to the caller.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, RequestError> {
        // A trailing slash keeps Url::join appending instead of replacing the
        // last path segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base =
            Url::parse(&normalized).map_err(|err| RequestError::InvalidUrl(err.to_string()))?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| RequestError::Transport(err.to_string()))?;
        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, RequestError> {
        let url = self
            .base
            .join(path)
            .map_err(|err| RequestError::InvalidUrl(err.to_string()))?;
        let mut builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        let response = builder
            .send()
            .await
            .map_err(|err| RequestError::Transport(err.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| RequestError::Transport(err.to_string()))?;
        if !status.is_success() {
            let message = if text.trim().is_empty() {
                format!("status {}", status.as_u16())
            } else {
                text
            };
            return Err(RequestError::Status {
                status: status.as_u16(),
                message,
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|err| RequestError::Decode(err.to_string()))
    }

    fn decode<T: DeserializeOwned>(value: Value) -> Result<T, RequestError> {
        serde_json::from_value(value).map_err(|err| RequestError::Decode(err.to_string()))
    }

    /// `GET /results/`: the full stored record set, untyped.
    pub async fn results(&self) -> Result<Vec<Value>, RequestError> {
        let body = self.request(Method::GET, "results/", None).await?;
        match body.get("results").and_then(Value::as_array) {
            Some(records) => Ok(records.clone()),
            None => Err(RequestError::Decode("missing results array".into())),
        }
    }

    /// `POST /scrape/single`: immediate scrape+extract of one URL. Returns
    /// the produced record, untyped.
    pub async fn scrape_single(
        &self,
        fund_url: &str,
        fund_name: Option<&str>,
    ) -> Result<Value, RequestError> {
        let mut body = json!({ "fund_url": fund_url });
        if let Some(name) = fund_name {
            body["fund_name"] = Value::String(name.to_string());
        }
        self.request(Method::POST, "scrape/single", Some(body)).await
    }

    /// `POST /scrape/batch`: start an asynchronous batch job.
    pub async fn scrape_batch(
        &self,
        fund_urls: &[String],
        rescrape_urls: &[String],
    ) -> Result<BatchCreated, RequestError> {
        let mut body = json!({ "fund_urls": fund_urls });
        if !rescrape_urls.is_empty() {
            body["rescrape_urls"] = json!(rescrape_urls);
        }
        let value = self.request(Method::POST, "scrape/batch", Some(body)).await?;
        Self::decode(value)
    }

    /// `GET /scrape/jobs/{job_id}`: current job snapshot.
    pub async fn job_status(&self, job_id: &str) -> Result<JobStatusDto, RequestError> {
        let value = self
            .request(Method::GET, &format!("scrape/jobs/{job_id}"), None)
            .await?;
        Self::decode(value)
    }

    /// `POST /scrape/prepare`: classify candidates before committing to a
    /// batch.
    pub async fn prepare(&self, fund_urls: &[String]) -> Result<PrepareDto, RequestError> {
        let value = self
            .request(
                Method::POST,
                "scrape/prepare",
                Some(json!({ "fund_urls": fund_urls })),
            )
            .await?;
        Self::decode(value)
    }

    /// `POST /results/refresh`: rebuild the server-side results store.
    /// Returns the total record count afterwards.
    pub async fn refresh_results(&self) -> Result<u64, RequestError> {
        let value = self.request(Method::POST, "results/refresh", None).await?;
        value
            .get("total_results")
            .and_then(Value::as_u64)
            .ok_or_else(|| RequestError::Decode("missing total_results".into()))
    }

    /// `POST /settings/openai`: push an API credential for this session.
    pub async fn set_openai_key(&self, key: &str) -> Result<(), RequestError> {
        self.request(
            Method::POST,
            "settings/openai",
            Some(json!({ "openai_api_key": key })),
        )
        .await?;
        Ok(())
    }
}
