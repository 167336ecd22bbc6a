// src/oracle/mod.rs

//! Client for the external advisory oracle: a metered text-in/JSON-out
//! service consulted for second-opinion validation and schedule repair.
//! Never authoritative — every failure mode here is recoverable.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::engine::error::ScheduleError;
use crate::models::{Schedule, Severity};

#[derive(Debug, Clone, Serialize)]
pub struct OracleValidationRequest {
    pub rules: String,
    pub schedule: serde_json::Value,
    pub local_violations: Vec<String>,
}

/// Response contract. Deserialization is strict on shape and severity
/// values; anything non-conforming is an oracle failure, never "valid".
#[derive(Debug, Clone, Deserialize)]
pub struct OracleReport {
    pub is_valid: bool,
    pub total_violations: i64,
    pub violations: Vec<String>,
    pub severity: Severity,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OracleFixRequest {
    pub rules: String,
    pub schedule: serde_json::Value,
    pub violations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct OracleFixResponse {
    schedule: Schedule,
}

#[derive(Clone)]
pub struct OracleClient {
    http: reqwest::Client,
    base_url: String,
}

impl OracleClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, ScheduleError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScheduleError::OracleUnavailable(format!("client build error: {e}")))?;
        Ok(Self { http, base_url })
    }

    /// POST /validate. Timeouts, transport errors, non-2xx statuses and
    /// malformed bodies all surface as `OracleUnavailable`.
    pub async fn validate(
        &self,
        request: &OracleValidationRequest,
    ) -> Result<OracleReport, ScheduleError> {
        let url = format!("{}/validate", self.base_url);
        let report = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(oracle_error)?
            .error_for_status()
            .map_err(oracle_error)?
            .json::<OracleReport>()
            .await
            .map_err(oracle_error)?;
        Ok(report)
    }

    /// POST /fix. Returns the corrected schedule; the caller must
    /// re-validate it before acceptance.
    pub async fn fix(&self, request: &OracleFixRequest) -> Result<Schedule, ScheduleError> {
        let url = format!("{}/fix", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(oracle_error)?
            .error_for_status()
            .map_err(oracle_error)?
            .json::<OracleFixResponse>()
            .await
            .map_err(oracle_error)?;
        Ok(resp.schedule)
    }
}

fn oracle_error(e: reqwest::Error) -> ScheduleError {
    ScheduleError::OracleUnavailable(e.to_string())
}
