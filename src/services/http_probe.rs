//! HTTP HEAD probe backed by reqwest.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;

use crate::services::liveness_scanner::Probe;
use crate::types::errors::ProbeError;

const USER_AGENT: &str = concat!("bookmark-audit/", env!("CARGO_PKG_VERSION"));

/// Issues one HEAD request per probe. Redirects are followed by the client.
#[derive(Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self, ProbeError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProbeError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Probe for HttpProbe {
    fn probe(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<u16, ProbeError>> + Send {
        let request = self.client.head(url).timeout(timeout);
        let url = url.to_string();
        async move {
            match request.send().await {
                Ok(response) => Ok(response.status().as_u16()),
                Err(e) if e.is_timeout() => Err(ProbeError::Timeout(url)),
                Err(e) => Err(ProbeError::Network(e.to_string())),
            }
        }
    }
}
