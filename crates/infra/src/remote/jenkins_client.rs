//! Jenkins-compatible implementation of [`RemoteJobClient`]

use std::sync::Arc;

use async_trait::async_trait;
use jobsync_common::SecretCipher;
use jobsync_core::{RemoteJobClient, SyncError};
use jobsync_domain::{HttpVerb, IntentBody, JobSyncError, RemoteConfig, RemoteConnection, SyncIntent};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use tracing::{debug, instrument, warn, Span};

use crate::http::{classify_transport_error, HttpClient};

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Sends [`SyncIntent`]s to a Jenkins-style job API with HTTP Basic auth.
///
/// The connection secret is decrypted for each call and dropped with the
/// request builder.
pub struct JenkinsClient {
    http: HttpClient,
    cipher: Arc<SecretCipher>,
}

impl JenkinsClient {
    /// Client sending through `http` and decrypting secrets with `cipher`.
    #[must_use]
    pub fn new(http: HttpClient, cipher: Arc<SecretCipher>) -> Self {
        Self { http, cipher }
    }

    /// Client using the timeouts and user agent from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &RemoteConfig, cipher: Arc<SecretCipher>) -> Result<Self, JobSyncError> {
        Ok(Self::new(HttpClient::from_config(config)?, cipher))
    }
}

#[async_trait]
impl RemoteJobClient for JenkinsClient {
    #[instrument(
        skip(self, connection, intent),
        fields(job_id = %intent.job_id, operation = %intent.operation, status)
    )]
    async fn execute(
        &self,
        connection: &RemoteConnection,
        intent: &SyncIntent,
    ) -> Result<String, SyncError> {
        let secret = self.cipher.decrypt(&connection.encrypted_secret)?;

        let method = match intent.method {
            HttpVerb::Get => Method::GET,
            HttpVerb::Post => Method::POST,
        };
        let mut request = self
            .http
            .request(method, &intent.url)
            .basic_auth(&connection.principal, Some(secret.as_str()));
        drop(secret);

        request = match &intent.body {
            IntentBody::None => request,
            IntentBody::Xml(document) => {
                request.header(CONTENT_TYPE, XML_CONTENT_TYPE).body(document.clone())
            }
            IntentBody::Form => request.header(CONTENT_TYPE, FORM_CONTENT_TYPE).body(""),
        };

        let response = self.http.send(request).await?;
        let status = response.status().as_u16();
        Span::current().record("status", status);

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = SyncError::from_status(status, &body)
                .unwrap_or(SyncError::RemoteClientError { status, body });
            debug!(status, job_name = %intent.job_name, "remote rejected request");
            return Err(err);
        }

        match response.text().await {
            Ok(body) => Ok(body),
            // A GET exists to read the document, so a broken body is a failure.
            Err(err) if intent.method == HttpVerb::Get => Err(classify_transport_error(&err)),
            // The remote already applied a successful write.
            Err(err) => {
                warn!(
                    status,
                    job_name = %intent.job_name,
                    error = %err,
                    "remote accepted request but the response body was unreadable"
                );
                Ok(String::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use jobsync_core::SyncErrorCategory;
    use jobsync_domain::SyncOperation;
    use uuid::Uuid;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn cipher() -> Arc<SecretCipher> {
        Arc::new(SecretCipher::new(SecretCipher::generate_key()).unwrap())
    }

    fn connection(base_uri: String, encrypted_secret: String) -> RemoteConnection {
        RemoteConnection {
            id: Uuid::new_v4(),
            name: "ci".into(),
            description: None,
            base_uri,
            principal: "admin".into(),
            encrypted_secret,
            created_at: 0,
        }
    }

    fn fetch(url: String) -> SyncIntent {
        SyncIntent {
            job_id: Uuid::new_v4(),
            job_name: "app".into(),
            operation: SyncOperation::Update,
            method: HttpVerb::Get,
            url,
            body: IntentBody::None,
        }
    }

    #[tokio::test]
    async fn returns_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<project/>"))
            .mount(&server)
            .await;

        let cipher = cipher();
        let secret = cipher.encrypt("token").unwrap();
        let client = JenkinsClient::from_config(&RemoteConfig::default(), Arc::clone(&cipher)).unwrap();

        let body = client
            .execute(&connection(server.uri(), secret), &fetch(format!("{}/job/app/config.xml", server.uri())))
            .await
            .unwrap();
        assert_eq!(body, "<project/>");
    }

    #[tokio::test]
    async fn maps_forbidden_to_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(403)).mount(&server).await;

        let cipher = cipher();
        let secret = cipher.encrypt("token").unwrap();
        let client = JenkinsClient::from_config(&RemoteConfig::default(), Arc::clone(&cipher)).unwrap();

        let err = client.execute(&connection(server.uri(), secret), &fetch(server.uri())).await.unwrap_err();
        assert_eq!(err.category(), SyncErrorCategory::Authentication);
    }

    #[tokio::test]
    async fn undecryptable_secret_never_reaches_the_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let foreign = cipher().encrypt("token").unwrap();
        let client = JenkinsClient::from_config(&RemoteConfig::default(), cipher()).unwrap();

        let err = client.execute(&connection(server.uri(), foreign), &fetch(server.uri())).await.unwrap_err();
        assert_eq!(err.category(), SyncErrorCategory::Credentials);
    }
}
