//! Uploads API trait and its HTTP implementation.

use std::io;
use std::time::Duration;

use asag_core::UploadStatus;
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use super::error::TransportError;
use super::types::{UploadCredentials, UploadRequest};

/// Default uploads API host.
pub const DEFAULT_API_URL: &str = "https://api.mapbox.com";
/// Default account owning the tilesets.
pub const DEFAULT_USER: &str = "entur";
/// Default user agent for API requests.
pub const DEFAULT_USER_AGENT: &str = "asag-mapbox/0.1";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Operations of the tileset uploads service.
#[async_trait(?Send)]
pub trait UploadApi {
    /// Fetch single-use staging credentials.
    async fn fetch_credentials(&self) -> Result<UploadCredentials, TransportError>;
    /// Start building a tileset from a staged object.
    async fn initiate_upload(
        &self,
        request: &UploadRequest,
    ) -> Result<UploadStatus, TransportError>;
    /// Fetch the current status of an upload.
    async fn fetch_status(&self, upload_id: &str) -> Result<UploadStatus, TransportError>;
}

/// Errors raised while building an [`HttpUploadApi`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UploadApiBuildError {
    /// The base URL did not parse.
    #[error("invalid uploads API URL {url:?}: {source}")]
    InvalidUrl {
        /// Rejected URL.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
    /// The base URL cannot carry path segments.
    #[error("uploads API URL {url:?} cannot be used as a base")]
    CannotBeBase {
        /// Rejected URL.
        url: String,
    },
    /// The HTTP client failed to build.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Configuration for [`HttpUploadApi`].
#[derive(Clone)]
pub struct HttpUploadApiConfig {
    /// API host, e.g. `https://api.mapbox.com`.
    pub api_url: String,
    /// Secret access token sent as a query parameter.
    pub access_token: String,
    /// Account owning the uploads.
    pub user: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl std::fmt::Debug for HttpUploadApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpUploadApiConfig")
            .field("api_url", &self.api_url)
            .field("access_token", &"<redacted>")
            .field("user", &self.user)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for HttpUploadApiConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            access_token: String::new(),
            user: DEFAULT_USER.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpUploadApiConfig {
    /// Create a configuration for the default host.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    /// Override the API host.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Override the account.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Uploads API over HTTP.
///
/// Routes live under `{api_url}/uploads/v1/{user}`. The access token is
/// appended to every request and stripped from URLs carried by errors.
pub struct HttpUploadApi {
    client: Client,
    base_url: Url,
    access_token: String,
    user: String,
    user_agent: String,
}

impl std::fmt::Debug for HttpUploadApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpUploadApi")
            .field("base_url", &self.base_url.as_str())
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// A request URL with and without its credentials.
struct Endpoint {
    authorised: Url,
    display: String,
}

impl HttpUploadApi {
    /// Build a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error when the API URL is unusable or the HTTP client
    /// fails to build.
    pub fn with_config(config: HttpUploadApiConfig) -> Result<Self, UploadApiBuildError> {
        let base_url =
            Url::parse(&config.api_url).map_err(|source| UploadApiBuildError::InvalidUrl {
                url: config.api_url.clone(),
                source,
            })?;
        if base_url.cannot_be_a_base() {
            return Err(UploadApiBuildError::CannotBeBase {
                url: config.api_url,
            });
        }
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(UploadApiBuildError::HttpClient)?;
        Ok(Self {
            client,
            base_url,
            access_token: config.access_token,
            user: config.user,
            user_agent: config.user_agent,
        })
    }

    /// Account the client acts for.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    fn endpoint(&self, tail: &[&str]) -> Endpoint {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["uploads", "v1", self.user.as_str()])
                .extend(tail);
        }
        let display = url.to_string();
        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token);
        Endpoint {
            authorised: url,
            display,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        display: &str,
    ) -> Result<T, TransportError> {
        let response = request
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, display))?
            .error_for_status()
            .map_err(|err| convert_reqwest_error(err, display))?;
        response
            .json::<T>()
            .await
            .map_err(|err| TransportError::Decode {
                url: display.to_owned(),
                message: err.without_url().to_string(),
            })
    }
}

#[async_trait(?Send)]
impl UploadApi for HttpUploadApi {
    async fn fetch_credentials(&self) -> Result<UploadCredentials, TransportError> {
        let endpoint = self.endpoint(&["credentials"]);
        self.send(self.client.get(endpoint.authorised), &endpoint.display)
            .await
    }

    async fn initiate_upload(
        &self,
        request: &UploadRequest,
    ) -> Result<UploadStatus, TransportError> {
        let endpoint = self.endpoint(&[]);
        self.send(
            self.client.post(endpoint.authorised).json(request),
            &endpoint.display,
        )
        .await
    }

    async fn fetch_status(&self, upload_id: &str) -> Result<UploadStatus, TransportError> {
        let endpoint = self.endpoint(&[upload_id]);
        self.send(self.client.get(endpoint.authorised), &endpoint.display)
            .await
    }
}

fn convert_reqwest_error(error: reqwest::Error, url: &str) -> TransportError {
    let error = error.without_url();
    if let Some(status) = error.status() {
        return TransportError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
            message: error.to_string(),
        };
    }

    let kind = if error.is_timeout() {
        io::ErrorKind::TimedOut
    } else {
        io::ErrorKind::Other
    };
    TransportError::Network {
        url: url.to_owned(),
        source: io::Error::new(kind, error),
    }
}
