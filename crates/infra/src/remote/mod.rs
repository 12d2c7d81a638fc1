//! Remote build server and source host clients

mod github_inspector;
mod jenkins_client;

pub use github_inspector::GithubRepositoryInspector;
pub use jenkins_client::JenkinsClient;
