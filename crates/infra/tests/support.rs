//! Shared helpers for `jobsync-infra` integration tests.
//!
//! Every harness owns an isolated SQLCipher database inside a temporary
//! directory, and sync harnesses also own a wiremock server standing in for
//! the remote build server.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use jobsync_common::SecretCipher;
use jobsync_core::ConfigTemplateEngine;
use jobsync_domain::{AppConfig, JobKind, JobSpec, NewJob, NewRemoteConnection, RemoteConnection};
use jobsync_infra::{AppContext, DbManager, GithubRepositoryInspector, HttpClient, JenkinsClient};
use rusqlite::params;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use uuid::Uuid;
use wiremock::MockServer;
use zeroize::Zeroizing;

pub const TEST_DB_KEY: &str = "test_key_64_chars_long_aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const PRINCIPAL: &str = "deployer";
pub const SECRET: &str = "api-token-1234";

/// Minimal freestyle configuration served by the mock for `GET config.xml`.
pub const REMOTE_CONFIG: &str = r#"<?xml version='1.1' encoding='UTF-8'?>
<project>
  <description>initial</description>
  <keepDependencies>false</keepDependencies>
  <properties/>
  <scm class="hudson.scm.NullSCM"/>
  <canRoam>true</canRoam>
  <builders>
    <hudson.tasks.Shell>
      <command>make</command>
    </hudson.tasks.Shell>
  </builders>
  <publishers/>
</project>"#;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("jobsync-test.db");

        let manager =
            DbManager::new(&db_path, 4, Some(TEST_DB_KEY)).expect("db manager should be created");
        manager.run_migrations().expect("schema should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    /// Insert a connection row directly, bypassing the service layer.
    pub fn insert_connection(&self) -> Uuid {
        let id = Uuid::new_v4();
        let conn = self.manager.get_connection().expect("connection");
        conn.execute(
            "INSERT INTO remote_connection
                (id, name, description, base_uri, principal, encrypted_secret, created_at)
             VALUES (?1, 'ci', NULL, 'http://ci.test', 'admin', 'blob', 0)",
            params![id.to_string()],
        )
        .expect("connection row should insert");
        id
    }

    pub fn count(&self, table: &str) -> i64 {
        let conn = self.manager.get_connection().expect("connection");
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .expect("count query")
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Real services over a temp database, talking to a wiremock server.
pub struct SyncHarness {
    pub db: TestDatabase,
    pub server: MockServer,
    pub cipher: Arc<SecretCipher>,
    pub ctx: AppContext,
    pub connection: RemoteConnection,
}

impl SyncHarness {
    pub async fn new() -> Self {
        Self::with_request_timeout(Duration::from_secs(5)).await
    }

    pub async fn with_request_timeout(timeout: Duration) -> Self {
        let db = TestDatabase::new();
        let server = MockServer::start().await;
        let cipher =
            Arc::new(SecretCipher::new(SecretCipher::generate_key()).expect("cipher key"));

        let http = HttpClient::builder().timeout(timeout).build().expect("http client");
        let remote = Arc::new(JenkinsClient::new(http.clone(), Arc::clone(&cipher)));
        let inspector = Arc::new(GithubRepositoryInspector::new(http, &server.uri(), None));
        let templates = Arc::new(ConfigTemplateEngine::with_builtin().expect("builtin templates"));

        let ctx = AppContext::with_remote(
            AppConfig::default(),
            Arc::clone(&db.manager),
            Arc::clone(&cipher),
            templates,
            remote,
            inspector,
        );

        let connection = ctx
            .connections
            .register(NewRemoteConnection {
                name: "ci".into(),
                description: Some("mock build server".into()),
                base_uri: server.uri(),
                principal: PRINCIPAL.into(),
                secret: Zeroizing::new(SECRET.into()),
            })
            .await
            .expect("connection should register");

        Self { db, server, cipher, ctx, connection }
    }

    pub fn new_job(&self, name: &str, description: &str) -> NewJob {
        NewJob {
            connection_id: self.connection.id,
            name: name.into(),
            kind: JobKind::Freestyle,
            spec: spec(description),
        }
    }

    pub fn job_rows(&self) -> i64 {
        self.db.count("job")
    }

    pub fn history_rows(&self) -> i64 {
        self.db.count("job_history")
    }
}

/// Server that answers every request with `200 OK` and a `Content-Length`
/// longer than the body it actually sends. Returns its base URI.
pub async fn truncated_body_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_request(&mut socket).await;
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\nshort",
                    )
                    .await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

/// Drain one request (head and `Content-Length` body) from `socket`.
async fn read_request(socket: &mut TcpStream) {
    let mut data = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let read = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(read) => read,
        };
        data.extend_from_slice(&chunk[..read]);

        if let Some(end) = data.windows(4).position(|window| window == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&data[..end]).to_ascii_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= end + 4 + length {
                return;
            }
        }
    }
}

pub fn spec(description: &str) -> JobSpec {
    JobSpec {
        description: description.into(),
        project_url: "https://github.com/acme/deploy".into(),
        project_display_name: "deploy".into(),
        github_trigger: false,
        repository_url: Some("https://github.com/acme/deploy.git".into()),
        branch: None,
        script: "./deploy.sh".into(),
    }
}
