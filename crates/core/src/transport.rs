//! Upstream JSON fetching.
//!
//! Every upstream call in the pipeline goes through the [`Transport`] trait:
//! "GET this URL with these query parameters and give me the JSON body".
//! [`HttpTransport`] is the reqwest implementation; tests use
//! [`MockTransport`](crate::testing::MockTransport).

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// Query parameters for one upstream call, in insertion order.
pub type Params = Vec<(&'static str, String)>;

/// Fetches JSON documents from upstream endpoints.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` with `params` and decode the body as JSON.
    async fn get_json(&self, url: &str, params: &[(&'static str, String)]) -> Result<Value>;
}

#[cfg(feature = "fetch")]
pub use http::HttpTransport;

#[cfg(feature = "fetch")]
mod http {
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::Client;
    use serde_json::Value;
    use url::Url;

    use super::Transport;
    use crate::{HarvestError, Result};

    /// HTTP client configuration for upstream calls.
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        client: Client,
        timeout: u64,
    }

    impl HttpTransport {
        /// Creates a transport with a bounded per-request timeout.
        pub fn new(timeout: u64, user_agent: &str) -> Result<Self> {
            let client = Client::builder()
                .timeout(Duration::from_secs(timeout))
                .user_agent(user_agent)
                .build()
                .map_err(HarvestError::HttpError)?;

            Ok(Self { client, timeout })
        }

        /// Creates a transport from a client configuration.
        pub fn from_config(config: &crate::WikiConfig) -> Result<Self> {
            Self::new(config.timeout, &config.user_agent)
        }
    }

    #[async_trait]
    impl Transport for HttpTransport {
        async fn get_json(&self, url: &str, params: &[(&'static str, String)]) -> Result<Value> {
            let parsed_url = Url::parse(url).map_err(|e| HarvestError::InvalidUrl(e.to_string()))?;

            let response = self
                .client
                .get(parsed_url)
                .query(params)
                .header("Accept", "application/json")
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        HarvestError::Timeout { timeout: self.timeout }
                    } else {
                        HarvestError::HttpError(e)
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(HarvestError::UpstreamStatus { status: status.as_u16(), url: url.to_string() });
            }

            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_transport_builds() {
            assert!(HttpTransport::new(10, "wikiharvest-test").is_ok());
        }

        #[test]
        fn test_get_json_invalid_url() {
            let transport = HttpTransport::new(1, "wikiharvest-test").unwrap();
            let result = std::thread::spawn(move || {
                tokio::runtime::Runtime::new()
                    .unwrap()
                    .block_on(async move { transport.get_json("not-a-url", &[]).await })
            })
            .join()
            .unwrap();

            assert!(matches!(result, Err(HarvestError::InvalidUrl(_))));
        }
    }
}
