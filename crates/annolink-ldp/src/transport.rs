//! HTTP access to the LDP server

use crate::call::CallContext;
use crate::config::LdpConfig;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::{Client, Response};
use tracing::{debug, info};

pub const TEXT_TURTLE: &str = "text/turtle";

/// Transport error types
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {url} failed: {status} - {message}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        message: String,
    },

    #[error("POST {url} succeeded without a Location header")]
    MissingLocation { url: String },

    #[error("Call cancelled")]
    Cancelled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,
}

impl TransportError {
    /// HTTP status of a non-success answer
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Http(e) => e.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}

/// LDP resource server speaking Turtle.
///
/// Paths are relative to [`LdpTransport::base_url`]; the empty path is the
/// root container.
#[async_trait]
pub trait LdpTransport: Send + Sync {
    fn base_url(&self) -> &str;

    /// GET the resource at `path` as Turtle
    async fn get_turtle(&self, path: &str, cx: &CallContext) -> Result<String, TransportError>;

    /// POST a Turtle description into the container at `path`; returns the
    /// absolute URL from the `Location` header
    async fn post_turtle(
        &self,
        path: &str,
        body: String,
        slug: Option<&str>,
        cx: &CallContext,
    ) -> Result<String, TransportError>;

    async fn delete(&self, path: &str, cx: &CallContext) -> Result<(), TransportError>;

    fn resource_url(&self, path: &str) -> String {
        join_url(self.base_url(), path)
    }

    /// Path of `url` relative to the base, `None` for foreign URLs
    fn relative_path(&self, url: &str) -> Option<String> {
        let base = self.base_url().trim_end_matches('/');
        let rest = url.strip_prefix(base)?;
        if rest.is_empty() {
            return Some(String::new());
        }
        rest.strip_prefix('/').map(|path| path.trim_end_matches('/').to_string())
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

/// reqwest-backed transport
pub struct HttpTransport {
    config: LdpConfig,
    client: Client,
}

impl HttpTransport {
    pub fn new(config: LdpConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &LdpConfig {
        &self.config
    }
}

async fn check_status(method: &'static str, url: &str, response: Response) -> Result<Response, TransportError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    Err(TransportError::Status {
        method,
        url: url.to_string(),
        status,
        message,
    })
}

#[async_trait]
impl LdpTransport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn get_turtle(&self, path: &str, cx: &CallContext) -> Result<String, TransportError> {
        let url = self.resource_url(path);
        debug!("GET {}", url);

        cx.run(async {
            let response = self
                .client
                .get(&url)
                .header(ACCEPT, TEXT_TURTLE)
                .send()
                .await?;
            let response = check_status("GET", &url, response).await?;
            Ok(response.text().await?)
        })
        .await
    }

    async fn post_turtle(
        &self,
        path: &str,
        body: String,
        slug: Option<&str>,
        cx: &CallContext,
    ) -> Result<String, TransportError> {
        let url = self.resource_url(path);
        debug!("POST {} (slug: {:?})", url, slug);

        cx.run(async {
            let mut request = self
                .client
                .post(&url)
                .header(CONTENT_TYPE, TEXT_TURTLE)
                .body(body);
            if let Some(slug) = slug {
                request = request.header("Slug", slug);
            }

            let response = check_status("POST", &url, request.send().await?).await?;
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .ok_or_else(|| TransportError::MissingLocation { url: url.clone() })?;

            // Location may be relative to the request URL
            let location = response
                .url()
                .join(location)
                .map(|resolved| resolved.to_string())
                .unwrap_or_else(|_| location.to_string());
            info!("Created {}", location);
            Ok(location)
        })
        .await
    }

    async fn delete(&self, path: &str, cx: &CallContext) -> Result<(), TransportError> {
        let url = self.resource_url(path);
        debug!("DELETE {}", url);

        cx.run(async {
            let response = self.client.delete(&url).send().await?;
            check_status("DELETE", &url, response).await?;
            info!("Deleted {}", url);
            Ok(())
        })
        .await
    }
}
