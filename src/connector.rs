use log::error;
use reqwest::{ Method, Response };
use serde_json::Value as JsonValue;
use thiserror::Error;
use url::Url;

pub const DEFAULT_BACKEND_BASE_URL: &str = "http://localhost:4000/api/v1";

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// General-purpose client for the application's own REST backend.
///
/// Cookies set by the backend are kept and replayed on later requests.
pub struct ApiConnector {
    client: reqwest::Client,
    base_url: String,
}

impl ApiConnector {
    pub fn new(base_url: &str) -> Result<Self, ConnectorError> {
        Url::parse(base_url)?;
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Uses `BACKEND_BASE_URL`, falling back to the local development server.
    pub fn from_env() -> Result<Self, ConnectorError> {
        let base_url = std::env::var("BACKEND_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_BASE_URL.to_string());
        Self::new(&base_url)
    }

    fn resolve(&self, url: &str) -> Result<Url, ConnectorError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(Url::parse(url)?);
        }
        Ok(Url::parse(&format!("{}/{}", self.base_url, url.trim_start_matches('/')))?)
    }

    pub async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&JsonValue>,
        headers: &[(&str, &str)],
        params: &[(&str, &str)],
    ) -> Result<Response, ConnectorError> {
        let target = self.resolve(url)?;
        let mut req = self.client.request(method.clone(), target.clone()).query(params);
        if let Some(data) = body {
            req = req.json(data);
        }
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let response = req.send().await.map_err(|e| {
            error!("API ERROR: {} {} failed: {}", method, target, e);
            ConnectorError::Request(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("API ERROR: {} {} returned {}: {}", method, target, status, body);
            return Err(ConnectorError::Status { status: status.as_u16(), body });
        }
        Ok(response)
    }
}
