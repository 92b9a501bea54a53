//! HTTP transport.

use std::time::Duration;

use crate::error::LoadError;
use crate::loader::LoaderConfig;

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        self.status < 300
    }
}

/// Performs one GET request per call.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse, LoadError>;
}

/// [`Transport`] backed by a blocking reqwest client.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(config: &LoaderConfig) -> Result<Self, LoadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| LoadError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    fn map_reqwest_error(e: reqwest::Error) -> LoadError {
        if e.is_timeout() {
            LoadError::Timeout(e.to_string())
        } else {
            LoadError::Network(e.to_string())
        }
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, LoadError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| LoadError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        log::debug!("GET {parsed}");
        let response = self
            .client
            .get(parsed)
            .send()
            .map_err(Self::map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(Self::map_reqwest_error)?.to_vec();

        Ok(HttpResponse { status, body })
    }
}
