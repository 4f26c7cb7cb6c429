use crate::{
    api::filter::FilterParams, core::config::LaneMapConfig, data::lanes::LaneCollection,
    MapError, Result,
};
use async_trait::async_trait;
use instant::Instant;
use reqwest::{Client, Request, Url};
use std::time::Duration;

/// Anything that can answer a lane query.
///
/// The controller only talks to this trait, so tests and alternative
/// transports can stand in for the HTTP API.
#[async_trait]
pub trait LaneSource: Send + Sync {
    /// Fetches the lanes matching `params`
    async fn fetch_lanes(&self, params: &FilterParams) -> Result<LaneCollection>;
}

/// Lane source backed by the `GET /api/lanes` HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpLaneClient {
    client: Client,
    endpoint: Url,
}

impl HttpLaneClient {
    /// Builds a client for the endpoint and timeout in `config`
    pub fn new(config: &LaneMapConfig) -> Result<Self> {
        let endpoint = config.endpoint_url()?;
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Builds the GET request for `params` without sending it
    pub fn build_request(&self, params: &FilterParams) -> Result<Request> {
        Ok(self
            .client
            .get(self.endpoint.clone())
            .query(&params.query_pairs())
            .header(reqwest::header::ACCEPT, "application/json")
            .build()?)
    }
}

/// Pulls the `{"error": "..."}` message the lane API sends with 5xx answers
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[async_trait]
impl LaneSource for HttpLaneClient {
    async fn fetch_lanes(&self, params: &FilterParams) -> Result<LaneCollection> {
        let request = self.build_request(params)?;
        let url = request.url().clone();
        let started = Instant::now();

        log::debug!("GET {}", url);
        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;
        let elapsed = started.elapsed();

        if !status.is_success() {
            log::warn!("GET {} -> {} after {:?}", url, status, elapsed);
            return Err(MapError::HttpStatus {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let lanes = LaneCollection::from_json_str(&body)?;
        log::info!(
            "GET {} -> {} lanes in {:?} ({} bytes)",
            url,
            lanes.len(),
            elapsed,
            body.len()
        );
        Ok(lanes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpLaneClient {
        HttpLaneClient::new(&LaneMapConfig::default()).unwrap()
    }

    #[test]
    fn test_endpoint_from_default_config() {
        assert_eq!(client().endpoint().as_str(), "http://localhost:5000/api/lanes");
    }

    #[test]
    fn test_request_without_filters_has_no_query() {
        let request = client().build_request(&FilterParams::default()).unwrap();

        assert_eq!(request.method(), &reqwest::Method::GET);
        assert_eq!(request.url().query(), None);
    }

    #[test]
    fn test_request_for_other_type_sends_type_only() {
        let params = FilterParams::from_inputs("Lane Construction", "foo");
        let request = client().build_request(&params).unwrap();

        let pairs: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![("type_names".to_string(), "Lane Construction".to_string())]
        );
    }

    #[test]
    fn test_request_for_nominal_sends_both() {
        let params = FilterParams::from_inputs("Lane Nominal", "curved");
        let request = client().build_request(&params).unwrap();

        assert_eq!(
            request.url().query(),
            Some("type_names=Lane+Nominal&semantic_description=curved")
        );
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"error": "db down"}"#), "db down");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }
}
