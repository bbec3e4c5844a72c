//! TfL Unified API client for real-time bus arrival predictions.
//!
//! One endpoint is used: `GET {base}/StopPoint/{stopID}/arrivals`, which
//! returns a JSON array of predicted arrivals for every line serving the
//! stop. Only `lineName` and `expectedArrival` are read; everything else in
//! the payload is ignored.
//!
//! Stop IDs are TfL Naptan codes (e.g. "490008660N"). Find them with
//! `{base}/StopPoint/Search/{name}` or on any TfL countdown page.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.tfl.gov.uk";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// One predicted arrival as reported by the stop point arrivals endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Arrival {
    #[serde(rename = "lineName")]
    pub line_name: String,
    #[serde(rename = "expectedArrival")]
    pub expected_arrival: DateTime<FixedOffset>,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed arrivals payload: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct TflClient {
    client: reqwest::Client,
    base_url: String,
}

impl TflClient {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the raw arrivals list for a stop.
    ///
    /// Transport errors, non-2xx responses and undecodable bodies all
    /// surface as [`FetchError`]. No retry happens here; the next scheduled
    /// fetch tick is the retry.
    pub async fn fetch_arrivals(&self, stop_id: &str) -> Result<Vec<Arrival>, FetchError> {
        let url = format!(
            "{}/StopPoint/{}/arrivals",
            self.base_url,
            urlencoding::encode(stop_id)
        );
        debug!(url = %url, "Fetching arrivals");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body: serde_json::Value = response.json().await?;
        debug!(
            "Raw arrivals payload:\n{}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        serde_json::from_value(body).map_err(FetchError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_arrivals_and_ignores_extra_fields() {
        let payload = r#"[
            {
                "$type": "Tfl.Api.Presentation.Entities.Prediction",
                "lineName": "73",
                "destinationName": "Victoria",
                "expectedArrival": "2024-03-05T18:04:30Z",
                "timeToStation": 125
            },
            {
                "lineName": "390",
                "expectedArrival": "2024-03-05T18:10:00+00:00"
            }
        ]"#;

        let arrivals: Vec<Arrival> = serde_json::from_str(payload).unwrap();
        assert_eq!(arrivals.len(), 2);
        assert_eq!(arrivals[0].line_name, "73");
        assert_eq!(
            arrivals[0].expected_arrival.timestamp(),
            arrivals[1].expected_arrival.timestamp() - 330
        );
    }

    #[test]
    fn rejects_non_array_payload() {
        let payload = r#"{"message": "entity not found"}"#;
        let result: Result<Vec<Arrival>, _> = serde_json::from_str(payload);
        assert!(result.is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = TflClient::new("https://api.tfl.gov.uk/").unwrap();
        assert_eq!(client.base_url, "https://api.tfl.gov.uk");
    }
}
