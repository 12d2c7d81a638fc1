//! Pipeline script generation through the wired context and a mock GitHub API.

mod support;

use jobsync_core::ScriptError;
use jobsync_domain::{BuildTool, JobSyncError, ScriptRequest};
use serde_json::json;
use support::SyncHarness;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

async fn mount_repository(harness: &SyncHarness, files: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/repos/acme/app"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"default_branch": "main"})))
        .mount(&harness.server)
        .await;

    let tree: Vec<_> = files.iter().map(|f| json!({"path": f, "type": "blob"})).collect();
    Mock::given(method("GET"))
        .and(path("/repos/acme/app/git/trees/main"))
        .and(query_param("recursive", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tree": tree, "truncated": false})))
        .mount(&harness.server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn maven_repository_gets_build_and_test_stages() {
    let harness = SyncHarness::new().await;
    mount_repository(&harness, &["api/pom.xml", "api/src/main/java/App.java"]).await;

    let generated = harness
        .ctx
        .scripts
        .generate(&ScriptRequest {
            repository_url: "https://github.com/acme/app".into(),
            branch: Some("release".into()),
            build: true,
            test: true,
        })
        .await
        .expect("script should generate");

    assert_eq!(generated.layout.tool, BuildTool::Maven);
    assert_eq!(generated.layout.directory, "api");
    assert_eq!(generated.stages, vec!["Checkout", "Build", "Test"]);
    assert!(generated.script.contains("git branch: 'release', url: 'https://github.com/acme/app'"));
    assert!(generated.script.contains("dir('api')"));
    assert!(generated.script.contains("sh 'mvn -B test'"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_repository_surfaces_not_found() {
    let harness = SyncHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&harness.server)
        .await;

    let err = harness
        .ctx
        .scripts
        .generate(&ScriptRequest {
            repository_url: "https://github.com/acme/missing.git".into(),
            build: true,
            ..ScriptRequest::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ScriptError::Domain(JobSyncError::NotFound(_))), "unexpected {err:?}");
}
