//! Scripted remote build server

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use jobsync_core::{RemoteJobClient, SyncError};
use jobsync_domain::{RemoteConnection, SyncIntent};

/// Replays queued responses in order; an empty queue answers `Ok("")`.
#[derive(Default)]
pub struct ScriptedRemote {
    responses: Mutex<VecDeque<Result<String, SyncError>>>,
    calls: Mutex<Vec<SyncIntent>>,
    completed: Mutex<usize>,
    delay: Option<Duration>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: Result<String, SyncError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Delay every call, simulating a slow server.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Intents received so far, in call order.
    pub fn calls(&self) -> Vec<SyncIntent> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that ran to completion.
    pub fn completed(&self) -> usize {
        *self.completed.lock().unwrap()
    }
}

#[async_trait]
impl RemoteJobClient for ScriptedRemote {
    async fn execute(
        &self,
        _connection: &RemoteConnection,
        intent: &SyncIntent,
    ) -> Result<String, SyncError> {
        self.calls.lock().unwrap().push(intent.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let response = self.responses.lock().unwrap().pop_front().unwrap_or_else(|| Ok(String::new()));
        *self.completed.lock().unwrap() += 1;
        response
    }
}
