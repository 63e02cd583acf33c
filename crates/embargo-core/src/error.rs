use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbargoError {
    #[error("not initialized: run 'embargo init'")]
    NotInitialized,

    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("item already exists: {0}")]
    ItemExists(String),

    #[error("invalid slug '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("workflow definition not found: {0}")]
    WorkflowNotFound(String),

    #[error("item '{0}' is not bound to a workflow definition")]
    NotGoverned(String),

    /// The record refused to persist. The workflow step must be treated as failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The job queue could not create or reschedule a job.
    #[error("job queue error: {0}")]
    JobQueue(String),

    #[error("invalid timestamp '{0}': expected RFC 3339 (e.g. 2014-01-06T12:00:00Z)")]
    InvalidTimestamp(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EmbargoError>;
