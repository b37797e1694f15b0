use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError(err.to_string())
    }
}

/// The single seam between the listings client and the network.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse, TransportError>;
}

/// reqwest-backed transport used in production.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    api_token: Option<String>,
}

impl HttpTransport {
    pub fn new(timeout: Duration, api_token: Option<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, api_token })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse, TransportError> {
        let mut request = self.client.get(url).query(query);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}
