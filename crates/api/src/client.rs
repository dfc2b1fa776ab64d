//! HTTP client for the Duo log search backend.

use std::env;

use duo_search_types::{FieldStat, LogRecord, Schema, SearchParams, ServiceName, ServicesEnvelope};
use reqwest::{Client, Response, Url, header};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::response::{parse_response_json_strict, status_text};

/// Service catalogue resource.
pub const SERVICES_PATH: &str = "api/services";
/// Log schema resource.
pub const SCHEMA_PATH: &str = "api/logs/schema";
/// Log search resource.
pub const LOGS_PATH: &str = "api/logs";
/// Prefix of the per-field statistics resource; the field name follows.
pub const FIELD_STATS_PATH: &str = "api/logs/stats/";

/// Typed façade over the log backend's HTTP API.
///
/// Every operation is a single idempotent GET resolved under the base URL
/// chosen at construction. The client keeps no state between calls, so
/// clones may be used from concurrent tasks freely.
#[derive(Debug, Clone)]
pub struct LogApiClient {
    base_url: Url,
    http: Client,
    user_agent: String,
}

impl LogApiClient {
    /// Build a client with JSON defaults for the configured base URL.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder().default_headers(default_headers).build()?;
        Ok(Self::with_http_client(config, http))
    }

    /// Reuse an existing `reqwest::Client`.
    pub fn with_http_client(config: &ClientConfig, http: Client) -> Self {
        Self {
            base_url: config.base_url().clone(),
            http,
            user_agent: format!("duo-search/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` under the base URL and attach `params` as the query
    /// string, in order and without modification.
    ///
    /// When `params` is given it replaces any query carried by `path`
    /// itself (a field name containing `?`, for instance); a fragment in
    /// `path` is dropped.
    pub fn endpoint(&self, path: &str, params: Option<&SearchParams>) -> Result<Url, ApiError> {
        let mut url = self.base_url.join(path).map_err(|source| ApiError::InvalidUrl {
            path: path.to_string(),
            source,
        })?;
        url.set_fragment(None);
        if let Some(params) = params {
            url.set_query(None);
            if !params.is_empty() {
                url.query_pairs_mut().extend_pairs(params.iter());
            }
        }
        Ok(url)
    }

    /// List the services known to the backend, sorted ascending.
    ///
    /// A body without `data` yields an empty list.
    pub async fn get_services(&self) -> Result<Vec<ServiceName>, ApiError> {
        let response = self.send(self.endpoint(SERVICES_PATH, None)?).await?;
        let envelope: ServicesEnvelope = decode_success(response).await?;
        Ok(envelope.into_sorted())
    }

    /// Fetch the log schema, unmodified.
    pub async fn get_schema(&self) -> Result<Schema, ApiError> {
        let response = self.send(self.endpoint(SCHEMA_PATH, None)?).await?;
        decode_success(response).await
    }

    /// Search logs with caller-assembled filters.
    ///
    /// A non-2xx response fails with [`ApiError::Transport`] whose message
    /// is the status text alone.
    pub async fn search_logs(&self, params: &SearchParams) -> Result<Vec<LogRecord>, ApiError> {
        let response = self.send(self.endpoint(LOGS_PATH, Some(params))?).await?;
        decode_success(response).await
    }

    /// Value counts of `field` under the current filters.
    ///
    /// `field` is placed in the path as given. Statistics are best-effort:
    /// a non-2xx response resolves to an empty list instead of an error.
    /// Network and decode failures still propagate.
    pub async fn get_field_stats(&self, field: &str, params: &SearchParams) -> Result<Vec<FieldStat>, ApiError> {
        let path = format!("{FIELD_STATS_PATH}{field}");
        let response = self.send(self.endpoint(&path, Some(params))?).await?;
        let status = response.status();
        if !status.is_success() {
            debug!(%field, status = %status_text(status), "field stats unavailable");
            return Ok(Vec::new());
        }
        decode(response).await
    }

    async fn send(&self, url: Url) -> Result<Response, ApiError> {
        debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await?;
        debug!(status = %response.status(), url = %response.url(), "response received");
        Ok(response)
    }
}

async fn decode_success<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::transport(status));
    }
    decode(response).await
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let text = response.text().await?;
    Ok(parse_response_json_strict(&text, Some(status))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> LogApiClient {
        LogApiClient::new(&ClientConfig::new(base).unwrap()).unwrap()
    }

    #[test]
    fn endpoints_nest_under_base_path() {
        let client = client("https://logs.example.com/duo");
        let url = client.endpoint(SERVICES_PATH, None).unwrap();
        assert_eq!(url.as_str(), "https://logs.example.com/duo/api/services");
    }

    #[test]
    fn empty_params_add_no_query() {
        let client = client("http://localhost:3000");
        let url = client.endpoint(LOGS_PATH, Some(&SearchParams::new())).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/logs");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn params_become_query_string_verbatim() {
        let client = client("http://localhost:3000");
        let params = SearchParams::new()
            .with("service", "checkout")
            .with("expr", "level = 'ERROR'")
            .with("service", "billing");
        let url = client.endpoint(LOGS_PATH, Some(&params)).unwrap();

        assert_eq!(url.query(), Some(params.to_query_string().as_str()));
        assert_eq!(SearchParams::parse(url.query().unwrap()), params);
    }

    #[test]
    fn params_replace_query_embedded_in_path() {
        let client = client("http://localhost:3000");
        let path = format!("{FIELD_STATS_PATH}level?service=injected#frag");
        let params = SearchParams::new().with("service", "api");

        let url = client.endpoint(&path, Some(&params)).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/logs/stats/level?service=api");

        let url = client.endpoint(&path, Some(&SearchParams::new())).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/logs/stats/level");
    }

    #[test]
    fn field_name_is_interpolated_into_path() {
        let client = client("http://localhost:3000");
        let path = format!("{FIELD_STATS_PATH}latency_ms");
        let url = client
            .endpoint(&path, Some(&SearchParams::new().with("service", "api")))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/logs/stats/latency_ms?service=api");
    }
}
