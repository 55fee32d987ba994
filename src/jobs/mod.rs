// Job system module
//
// A job is one user-triggered action (a CLI command or a front-end button).
// runner executes it synchronously against an event sink; worker runs it on a
// background thread and streams the events back over a channel.

pub mod runner;
pub mod worker;

use serde::{Deserialize, Serialize};

use crate::events::EventSink;
use crate::paths::PathLocator;
use crate::process::EditorProcess;

pub use runner::{clean_db, close_editor, ensure_editor_closed, login, modify_ids, run_all, RunAllSummary};
pub use worker::{spawn_job, JobHandle, JobMessage};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Job {
    /// `force` skips the running-editor check.
    CleanDatabase { keyword: String, force: bool },
    ModifyIds { force: bool },
    CloseEditor,
    /// The running-editor check only applies when `close_editor` is false.
    RunAll { keyword: String, close_editor: bool, force: bool },
    Login { open_browser: bool },
}

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Job::CleanDatabase { .. } => "clean-db",
            Job::ModifyIds { .. } => "modify-ids",
            Job::CloseEditor => "close-editor",
            Job::RunAll { .. } => "run-all",
            Job::Login { .. } => "login",
        }
    }
}

/// Execute a job to completion. Returns overall success.
pub fn run_job(
    job: &Job,
    locator: &dyn PathLocator,
    process: &dyn EditorProcess,
    sink: &dyn EventSink,
) -> bool {
    log::info!("Running job {}", job.name());
    let success = match job {
        Job::CleanDatabase { keyword, force } => {
            ensure_editor_closed(process, *force, sink)
                && clean_db(locator, keyword, sink)
                    .map(|r| r.success)
                    .unwrap_or(false)
        }
        Job::ModifyIds { force } => {
            ensure_editor_closed(process, *force, sink)
                && modify_ids(locator, sink).map(|r| r.success).unwrap_or(false)
        }
        Job::CloseEditor => close_editor(process, sink),
        Job::RunAll {
            keyword,
            close_editor,
            force,
        } => {
            (*close_editor || ensure_editor_closed(process, *force, sink))
                && run_all(locator, process, keyword, *close_editor, sink).success()
        }
        Job::Login { open_browser } => login(*open_browser, sink).is_some(),
    };
    log::info!("Job {} finished (success: {})", job.name(), success);
    success
}
