//! Remote calls prepared before the local commit

use jobsync_domain::{HttpVerb, IntentBody, JobDefinition, RemoteConnection, SyncIntent, SyncOperation};
use urlencoding::encode;

/// `POST {base}/createItem?name={job}` carrying the full configuration.
#[must_use]
pub fn create_item(connection: &RemoteConnection, job: &JobDefinition, config: &str) -> SyncIntent {
    SyncIntent {
        job_id: job.id,
        job_name: job.name.clone(),
        operation: SyncOperation::Create,
        method: HttpVerb::Post,
        url: connection.url(&format!("createItem?name={}", encode(&job.name))),
        body: IntentBody::Xml(config.to_string()),
    }
}

/// `GET {base}/job/{job}/config.xml`.
#[must_use]
pub fn fetch_config(
    connection: &RemoteConnection,
    job: &JobDefinition,
    operation: SyncOperation,
) -> SyncIntent {
    SyncIntent {
        job_id: job.id,
        job_name: job.name.clone(),
        operation,
        method: HttpVerb::Get,
        url: config_url(connection, &job.name),
        body: IntentBody::None,
    }
}

/// `POST {base}/job/{job}/config.xml` replacing the remote configuration.
#[must_use]
pub fn push_config(
    connection: &RemoteConnection,
    job: &JobDefinition,
    operation: SyncOperation,
    config: String,
) -> SyncIntent {
    SyncIntent {
        job_id: job.id,
        job_name: job.name.clone(),
        operation,
        method: HttpVerb::Post,
        url: config_url(connection, &job.name),
        body: IntentBody::Xml(config),
    }
}

/// `POST {base}/job/{job}/doDelete` with an empty form body.
#[must_use]
pub fn delete_item(connection: &RemoteConnection, job: &JobDefinition) -> SyncIntent {
    SyncIntent {
        job_id: job.id,
        job_name: job.name.clone(),
        operation: SyncOperation::Delete,
        method: HttpVerb::Post,
        url: connection.url(&format!("job/{}/doDelete", encode(&job.name))),
        body: IntentBody::Form,
    }
}

fn config_url(connection: &RemoteConnection, job_name: &str) -> String {
    connection.url(&format!("job/{}/config.xml", encode(job_name)))
}
