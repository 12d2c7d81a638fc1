use std::time::Duration;

use jobsync_core::SyncError;
use jobsync_domain::{JobSyncError, RemoteConfig};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with connect and request timeouts.
///
/// Each call is sent exactly once. A remote job server is not idempotent for
/// `createItem`, so retrying here could create the job twice.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client configured from the `[remote]` section.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, JobSyncError> {
        Self::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
    }

    /// Create a request builder using the underlying reqwest client.
    #[must_use]
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send the request once. Transport failures are classified; HTTP status
    /// codes are left to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Timeout`] when the request times out and
    /// [`SyncError::Network`] for any other transport failure.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, SyncError> {
        let request = builder.build().map_err(|err| SyncError::Network(err.to_string()))?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                debug!(%method, %url, status = %response.status(), "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(classify_transport_error(&err))
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    connect_timeout: Duration,
    timeout: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(10),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    /// Time allowed to establish the TCP and TLS connection.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Total time allowed for one request, including reading the body.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `User-Agent` header sent with every request.
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client. Proxies from the environment are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn build(self) -> Result<HttpClient, JobSyncError> {
        let mut builder = ReqwestClient::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.timeout)
            .no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            JobSyncError::from(infra)
        })?;

        Ok(HttpClient { client })
    }
}

pub(crate) fn classify_transport_error(err: &reqwest::Error) -> SyncError {
    if err.is_timeout() {
        SyncError::Timeout
    } else {
        SyncError::Network(err.to_string())
    }
}
