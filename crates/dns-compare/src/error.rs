use dns::ResolveError;
use thiserror::Error;

use crate::record::RecordType;

#[derive(Error, Debug)]
#[error("Lookup of {record_type} {name} on {server} failed: {source}")]
pub struct FetchError {
    pub name: String,
    pub server: String,
    pub record_type: RecordType,
    #[source]
    pub source: ResolveError,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Worker count must be at least 1")]
    NoWorkers,

    #[error("Unknown record type: {0}")]
    UnknownRecordType(String),

    #[error("{0} is listed both as compared and as fetch-only")]
    ConflictingRecordType(RecordType),

    #[error("No record types left to check")]
    EmptyPlan,

    #[error("Server address must not be empty")]
    EmptyServer,

    #[error("Either a name or a name list file is required")]
    MissingNames,

    #[error("Name must not be empty")]
    EmptyName,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Job runner is already running")]
    AlreadyStarted,

    #[error("Job runner has not been started")]
    NotStarted,

    #[error("Job runner needs at least one worker")]
    NoWorkers,

    #[error("Could not spawn worker: {0}")]
    Spawn(String),

    #[error("All workers have stopped")]
    Disconnected,
}
