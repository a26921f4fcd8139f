//! Wire shapes of the scrape API. Records ride through as untyped JSON; the
//! caller decides what shape to assert on them.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Response of `POST /scrape/batch`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BatchCreated {
    pub job_id: String,
    #[serde(default)]
    pub to_scrape: Vec<String>,
    #[serde(default)]
    pub already_processed: Vec<String>,
    #[serde(default)]
    pub duplicates_in_payload: Vec<String>,
}

/// Response of `GET /scrape/jobs/{job_id}`. Every poll replaces the previous
/// snapshot wholesale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobStatusDto {
    pub job_id: String,
    pub done: bool,
    #[serde(default)]
    pub progress_percent: i64,
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub errors: Vec<JobErrorDto>,
    #[serde(default)]
    pub current_url: Option<String>,
    #[serde(default)]
    pub current_elapsed_seconds: u64,
    #[serde(default)]
    pub total_elapsed_seconds: u64,
    #[serde(default)]
    pub started_at: Option<f64>,
    #[serde(default)]
    pub finished_at: Option<f64>,
    #[serde(default)]
    pub url_timings: Vec<UrlTimingDto>,
    #[serde(default)]
    pub total_urls: usize,
    #[serde(default)]
    pub completed_urls: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobErrorDto {
    pub url: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UrlTimingDto {
    pub url: String,
    #[serde(default)]
    pub seconds: f64,
}

/// Response of `POST /scrape/prepare`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PrepareDto {
    #[serde(default)]
    pub to_scrape: Vec<String>,
    #[serde(default)]
    pub already_processed: Vec<String>,
    #[serde(default)]
    pub duplicates_in_payload: Vec<String>,
    #[serde(default)]
    pub normalized_map: BTreeMap<String, String>,
}
