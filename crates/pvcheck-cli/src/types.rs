use std::path::PathBuf;

use pvcheck_validate::{ExitStatus, Report};

/// Inputs of one validation run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub settings: PathBuf,
    pub urls: Vec<String>,
    pub report_json: Option<PathBuf>,
    pub fail_on_unchecked: bool,
}

#[derive(Debug)]
pub enum DatabaseOutcome {
    Validated(Report),
    /// The database could not be read; holds the error message.
    Unreadable(String),
}

#[derive(Debug)]
pub struct DatabaseResult {
    pub url: String,
    pub outcome: DatabaseOutcome,
}

impl DatabaseResult {
    pub fn report(&self) -> Option<&Report> {
        match &self.outcome {
            DatabaseOutcome::Validated(report) => Some(report),
            DatabaseOutcome::Unreadable(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct RunResult {
    pub databases: Vec<DatabaseResult>,
    pub object_rules: usize,
    pub relationship_rules: usize,
    pub report_json: Option<PathBuf>,
    pub exit_status: ExitStatus,
}

impl RunResult {
    pub fn reports(&self) -> impl Iterator<Item = &Report> {
        self.databases.iter().filter_map(DatabaseResult::report)
    }
}
