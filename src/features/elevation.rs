use crate::features::error::ElevationError;
use async_trait::async_trait;
use bon::bon;
use serde::Deserialize;
use std::time::Duration;

pub const GOOGLE_ELEVATION_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/elevation/json";

/// Looks up ground elevation, in meters above mean sea level, for a position.
#[async_trait]
pub trait ElevationService: Send + Sync {
    async fn elevation(&self, latitude: f64, longitude: f64) -> Result<f64, ElevationError>;
}

#[derive(Debug, Deserialize)]
struct ElevationResponse {
    #[serde(default)]
    results: Vec<ElevationResult>,
    /// Google always sends a status; Open-Elevation style services don't.
    status: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ElevationResult {
    elevation: f64,
}

/// Extracts the first elevation from a Google Elevation API style JSON body.
pub fn parse_elevation_response(body: &str) -> Result<f64, ElevationError> {
    let response: ElevationResponse = serde_json::from_str(body)
        .map_err(|_| ElevationError::Api("malformed response".to_string()))?;

    if let Some(status) = response.status.as_deref()
        && status != "OK"
    {
        return Err(ElevationError::Api(match response.error_message {
            Some(message) => format!("{status}: {message}"),
            None => status.to_string(),
        }));
    }

    response
        .results
        .first()
        .map(|result| result.elevation)
        .ok_or_else(|| ElevationError::Api("no results".to_string()))
}

/// HTTP client for the Google Maps Elevation API, or any service answering with the same
/// JSON shape.
pub struct GoogleElevation {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[bon]
impl GoogleElevation {
    /// # Builder Arguments
    ///
    /// * `api_key: Option<String>` - Sent as the `key` query parameter when present.
    /// * `endpoint: String` - (Default: the Google Elevation API URL).
    /// * `timeout: Duration` - (Default: 10 seconds) Per-request timeout of the HTTP client.
    ///
    /// # Errors
    ///
    /// Fails if the underlying HTTP client cannot be initialized.
    #[builder]
    pub fn new(
        #[builder(into)] api_key: Option<String>,
        #[builder(into, default = GOOGLE_ELEVATION_ENDPOINT.to_string())] endpoint: String,
        #[builder(default = Duration::from_secs(10))] timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl ElevationService for GoogleElevation {
    async fn elevation(&self, latitude: f64, longitude: f64) -> Result<f64, ElevationError> {
        let mut query = vec![("locations", format!("{latitude},{longitude}"))];
        if let Some(key) = &self.api_key {
            query.push(("key", key.clone()));
        }

        let body = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_elevation_response(&body)
    }
}
