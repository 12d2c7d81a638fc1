//! Pipeline script generation against a fixed repository listing

mod support;

use std::sync::Arc;

use jobsync_core::{ConfigTemplateEngine, GithubRepository, PipelineScriptService, ScriptError};
use jobsync_domain::{BuildTool, JobSyncError, ScriptRequest};
use support::inspector::StaticInspector;

fn service(inspector: &Arc<StaticInspector>) -> PipelineScriptService {
    PipelineScriptService::new(
        inspector.clone(),
        Arc::new(ConfigTemplateEngine::with_builtin().unwrap()),
    )
}

fn request(build: bool, test: bool) -> ScriptRequest {
    ScriptRequest {
        repository_url: "https://github.com/acme/app.git".into(),
        branch: None,
        build,
        test,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn gradle_build_only_script() {
    let inspector =
        Arc::new(StaticInspector::with_files(&["README.md", "service/gradlew", "service/build.gradle"]));

    let generated = service(&inspector).generate(&request(true, false)).await.unwrap();

    let expected = "\
pipeline {
  agent any
  stages {
    stage('Checkout') {
      steps {
        git branch: 'main', url: 'https://github.com/acme/app.git'
      }
    }
    stage('Build') {
      steps {
        dir('service') {
          sh 'if [ -f gradlew ]; then sh gradlew clean build -x test; else gradle clean build -x test; fi'
        }
      }
    }
  }
}
";
    assert_eq!(generated.script, expected);
    assert_eq!(generated.layout.tool, BuildTool::Gradle);
    assert_eq!(generated.stages, vec!["Checkout", "Build"]);
    assert_eq!(
        inspector.seen(),
        vec![GithubRepository { owner: "acme".into(), name: "app".into() }]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn maven_wrapper_build_and_test() {
    let inspector = Arc::new(StaticInspector::with_files(&["pom.xml", "mvnw", "src/main/App.java"]));
    let mut req = request(true, true);
    req.branch = Some("develop".into());

    let generated = service(&inspector).generate(&req).await.unwrap();

    assert_eq!(generated.stages, vec!["Checkout", "Build", "Test"]);
    assert!(generated.script.contains("git branch: 'develop'"));
    assert!(generated.script.contains("sh 'sh mvnw -B clean package -DskipTests'"));
    assert!(generated.script.contains("sh 'sh mvnw -B test'"));
    assert!(generated.script.contains("dir('.')"));
    assert!(!generated.script.contains("mvn -B test'"));
}

#[tokio::test(flavor = "multi_thread")]
async fn checkout_only_when_nothing_selected() {
    let inspector = Arc::new(StaticInspector::with_files(&["build.sbt"]));

    let generated = service(&inspector).generate(&request(false, false)).await.unwrap();

    assert_eq!(generated.layout.tool, BuildTool::Sbt);
    assert_eq!(generated.stages, vec!["Checkout"]);
    assert!(!generated.script.contains("sbt"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_tool_still_renders_stages() {
    let inspector = Arc::new(StaticInspector::with_files(&["docs/index.md"]));

    let generated = service(&inspector).generate(&request(true, true)).await.unwrap();

    assert_eq!(generated.layout.tool, BuildTool::Unknown);
    assert_eq!(generated.stages, vec!["Checkout", "Build", "Test"]);
    assert_eq!(generated.script.matches("echo 'No supported build tool detected'").count(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_repository_is_rejected_before_lookup() {
    let inspector = Arc::new(StaticInspector::with_files(&["pom.xml"]));
    let mut req = request(true, true);
    req.repository_url = "https://gitlab.com/acme/app".into();

    let err = service(&inspector).generate(&req).await.unwrap_err();

    assert!(matches!(err, ScriptError::Domain(JobSyncError::InvalidInput(_))));
    assert!(inspector.seen().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn inspector_failure_is_propagated() {
    let inspector =
        Arc::new(StaticInspector::failing(JobSyncError::NotFound("repository acme/app".into())));

    let err = service(&inspector).generate(&request(true, false)).await.unwrap_err();

    assert!(matches!(err, ScriptError::Domain(JobSyncError::NotFound(_))));
}
