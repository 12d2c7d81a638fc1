//! Shared test helpers for `jobsync-core` integration tests.
//!
//! In-memory stand-ins for the storage and remote ports so saga tests can
//! focus on state transitions instead of SQL and HTTP.

#![allow(dead_code)]

pub mod inspector;
pub mod remote;
pub mod repositories;

use std::sync::Arc;

use jobsync_core::{ConfigTemplateEngine, SyncCoordinator};
use jobsync_domain::{JobKind, JobSpec, NewJob, RemoteConnection};
use uuid::Uuid;

use self::remote::ScriptedRemote;
use self::repositories::InMemoryStore;

/// Remote config the scripted server returns for `GET config.xml`.
pub const REMOTE_FREESTYLE_CONFIG: &str = r#"<?xml version='1.1' encoding='UTF-8'?>
<project>
  <actions/>
  <description>old</description>
  <keepDependencies>false</keepDependencies>
  <properties/>
  <scm class="hudson.scm.NullSCM"/>
  <assignedNode>linux</assignedNode>
  <builders>
    <hudson.tasks.Shell>
      <command>echo old</command>
    </hudson.tasks.Shell>
  </builders>
</project>"#;

pub fn connection() -> RemoteConnection {
    RemoteConnection {
        id: Uuid::new_v4(),
        name: "ci".into(),
        description: Some("test server".into()),
        base_uri: "http://ci.test".into(),
        principal: "admin".into(),
        encrypted_secret: "unused".into(),
        created_at: 0,
    }
}

pub fn spec(description: &str) -> JobSpec {
    JobSpec {
        description: description.into(),
        project_url: "https://github.com/acme/app".into(),
        project_display_name: "app".into(),
        github_trigger: false,
        repository_url: None,
        branch: None,
        script: "make".into(),
    }
}

pub fn new_job(connection_id: Uuid, name: &str, description: &str) -> NewJob {
    NewJob { connection_id, name: name.into(), kind: JobKind::Freestyle, spec: spec(description) }
}

/// Coordinator wired to a fresh store holding one connection.
pub struct Harness {
    pub store: InMemoryStore,
    pub remote: Arc<ScriptedRemote>,
    pub connection: RemoteConnection,
    pub coordinator: SyncCoordinator,
}

impl Harness {
    pub fn new(remote: ScriptedRemote) -> Self {
        let store = InMemoryStore::default();
        let connection = connection();
        store.add_connection(connection.clone());

        let remote = Arc::new(remote);
        let store_arc = Arc::new(store.clone());
        let coordinator = SyncCoordinator::new(
            store_arc.clone(),
            store_arc.clone(),
            store_arc,
            remote.clone(),
            Arc::new(ConfigTemplateEngine::with_builtin().unwrap()),
        );

        Self { store, remote, connection, coordinator }
    }
}
