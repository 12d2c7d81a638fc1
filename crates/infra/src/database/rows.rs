//! Row decoding helpers shared by the SQLite repositories

use std::str::FromStr;

use jobsync_domain::JobSpec;
use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

/// Decode a TEXT column holding a UUID.
pub(crate) fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Decode a TEXT column holding an enum spelled by its `FromStr` impl.
pub(crate) fn enum_at<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

/// Decode the seven spec columns starting at `start`, in the order
/// `description, project_url, project_display_name, github_trigger,
/// repository_url, branch, script`.
pub(crate) fn spec_at(row: &Row<'_>, start: usize) -> rusqlite::Result<JobSpec> {
    Ok(JobSpec {
        description: row.get(start)?,
        project_url: row.get(start + 1)?,
        project_display_name: row.get(start + 2)?,
        github_trigger: row.get::<_, i64>(start + 3)? != 0,
        repository_url: row.get(start + 4)?,
        branch: row.get(start + 5)?,
        script: row.get(start + 6)?,
    })
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}
