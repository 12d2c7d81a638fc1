//! Remote build server connection records

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Stored connection to a remote build server.
///
/// `encrypted_secret` holds a cipher blob; the plaintext token only exists
/// in memory while an outbound request is being built.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConnection {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Base URI without trailing slash, e.g. `https://ci.example.com`.
    pub base_uri: String,
    /// Principal used for HTTP Basic authentication.
    pub principal: String,
    #[serde(skip_serializing)]
    pub encrypted_secret: String,
    pub created_at: i64,
}

impl RemoteConnection {
    /// Join `path` onto the base URI with exactly one separating slash.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_uri.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

impl std::fmt::Debug for RemoteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConnection")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("base_uri", &self.base_uri)
            .field("principal", &self.principal)
            .field("encrypted_secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Registration request carrying the plaintext secret.
///
/// The secret is wiped from memory when the request is dropped, and its
/// `Debug` form never shows the value.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRemoteConnection {
    pub name: String,
    pub description: Option<String>,
    pub base_uri: String,
    pub principal: String,
    pub secret: Zeroizing<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(base_uri: &str) -> RemoteConnection {
        RemoteConnection {
            id: Uuid::nil(),
            name: "ci".into(),
            description: None,
            base_uri: base_uri.into(),
            principal: "admin".into(),
            encrypted_secret: "c2VjcmV0".into(),
            created_at: 0,
        }
    }

    #[test]
    fn url_joins_with_single_slash() {
        assert_eq!(connection("http://ci:8080/").url("/createItem"), "http://ci:8080/createItem");
        assert_eq!(connection("http://ci:8080").url("job/a/config.xml"), "http://ci:8080/job/a/config.xml");
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", connection("http://ci"));
        assert!(!rendered.contains("c2VjcmV0"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn registration_debug_hides_plaintext_secret() {
        let request = NewRemoteConnection {
            name: "ci".into(),
            description: None,
            base_uri: "http://ci".into(),
            principal: "admin".into(),
            secret: Zeroizing::new("api-token-1234".into()),
        };
        let rendered = format!("{request:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("api-token-1234"));
    }
}
