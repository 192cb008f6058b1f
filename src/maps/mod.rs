//! HTTP client for the maps provider: directions, place autocomplete and
//! place details.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

pub mod directions;
pub mod places;

pub use directions::RouteResolver;
pub use places::{PlaceCandidate, PlaceResolver, MIN_QUERY_CHARS};

pub const DEFAULT_MAPS_API_URL: &str = "https://maps.gomaps.pro/maps/api";

#[derive(Debug, Clone)]
pub struct MapsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MapsClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| Error::Network {
                endpoint: "http client",
                source,
            })?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// GET `{base_url}/{path}` and deserialize the body.
    ///
    /// A `status` field other than `OK` or one of `accepted` is reported as an
    /// upstream error before the body shape is checked.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        params: &[(&str, &str)],
        accepted: &[&str],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("Requesting {} from {}", endpoint, url);

        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| Error::Network { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus { endpoint, status });
        }

        let body = response
            .text()
            .await
            .map_err(|source| Error::Network { endpoint, source })?;
        let value: Value = serde_json::from_str(&body)
            .map_err(|source| Error::MalformedResponse { endpoint, source })?;

        if let Some(status) = value.get("status").and_then(Value::as_str) {
            if status != "OK" && !accepted.contains(&status) {
                return Err(Error::Upstream {
                    endpoint,
                    status: status.to_string(),
                    message: value
                        .get("error_message")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                });
            }
        }

        serde_json::from_value(value).map_err(|source| Error::MalformedResponse { endpoint, source })
    }
}
