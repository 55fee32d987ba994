// Guarded mutation: backup -> mutate -> verify -> restore on failure
//
// State machine shared by the database cleanser and the telemetry rewriter:
//
//   Start -> BackupCreated -> Mutating -> Committed
//                                     \-> Failed -> RestoredFromBackup
//                                                \-> RestoreFailed
//
// A missing target or a failed backup ends in Start: nothing was touched.
// Errors and panics inside the mutation never escape run_guarded.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backup;
use crate::error::{ErrorKind, MaintenanceError, Result};
use crate::events::{EventSink, Recorder, StatusEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxState {
    Start,
    BackupCreated,
    Mutating,
    Committed,
    Failed,
    RestoredFromBackup,
    RestoreFailed,
}

impl TxState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TxState::Committed | TxState::RestoredFromBackup | TxState::RestoreFailed
        )
    }
}

/// Result of one guarded operation: success flag plus everything that was said.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationReport<T> {
    pub target: PathBuf,
    pub success: bool,
    pub state: TxState,
    pub backup: Option<PathBuf>,
    pub outcome: Option<T>,
    pub error: Option<ErrorKind>,
    pub error_message: Option<String>,
    pub events: Vec<StatusEvent>,
}

impl<T> OperationReport<T> {
    /// The most severe outcome: the target may be left half-written.
    pub fn restore_failed(&self) -> bool {
        self.state == TxState::RestoreFailed
    }

    pub fn warnings(&self) -> impl Iterator<Item = &StatusEvent> {
        self.events
            .iter()
            .filter(|e| e.level == crate::events::StatusLevel::Warning)
    }
}

/// Report for an operation refused before any file was touched.
pub fn rejected<T>(target: &Path, err: MaintenanceError, sink: &dyn EventSink) -> OperationReport<T> {
    let recorder = Recorder::new(sink);
    recorder.error(&err.to_string());
    OperationReport {
        target: target.to_path_buf(),
        success: false,
        state: TxState::Start,
        backup: None,
        outcome: None,
        error: Some(err.kind()),
        error_message: Some(err.to_string()),
        events: recorder.into_events(),
    }
}

struct Progress {
    state: TxState,
    backup: Option<PathBuf>,
}

impl Progress {
    fn advance(&mut self, next: TxState) {
        log::debug!("guarded op: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Run `mutate` against `target` under the backup/restore guard.
///
/// `label` names the target in messages ("Database", "Storage file"); `intro`
/// lines are emitted once the target is known to exist.
pub fn run_guarded<T, F>(
    target: &Path,
    label: &str,
    intro: &[String],
    sink: &dyn EventSink,
    mutate: F,
) -> OperationReport<T>
where
    F: FnOnce(&dyn EventSink) -> Result<T>,
{
    let recorder = Recorder::new(sink);
    let mut progress = Progress {
        state: TxState::Start,
        backup: None,
    };

    let result = guarded(target, label, intro, &recorder, &mut progress, mutate);

    let (success, outcome, error, error_message) = match result {
        Ok(v) => (true, Some(v), None, None),
        Err(e) => (false, None, Some(e.kind()), Some(e.to_string())),
    };

    OperationReport {
        target: target.to_path_buf(),
        success,
        state: progress.state,
        backup: progress.backup,
        outcome,
        error,
        error_message,
        events: recorder.into_events(),
    }
}

fn guarded<T, F>(
    target: &Path,
    label: &str,
    intro: &[String],
    events: &Recorder<'_>,
    progress: &mut Progress,
    mutate: F,
) -> Result<T>
where
    F: FnOnce(&dyn EventSink) -> Result<T>,
{
    if !target.is_file() {
        events.error(&format!("{} not found: {}", label, target.display()));
        return Err(MaintenanceError::NotFound(target.to_path_buf()));
    }
    for line in intro {
        events.info(line);
    }

    events.info(&format!("Backing up {}...", target.display()));
    let backup_path = match backup::create_backup(target) {
        Ok(p) => p,
        Err(e) => {
            events.error(&format!("{}", e));
            events.error("Aborting: no changes were made because the backup could not be created.");
            return Err(e);
        }
    };
    events.success(&format!("Backup created at: {}", backup_path.display()));
    progress.backup = Some(backup_path.clone());
    progress.advance(TxState::BackupCreated);

    progress.advance(TxState::Mutating);
    let sink: &dyn EventSink = events;
    let result = match catch_unwind(AssertUnwindSafe(|| mutate(sink))) {
        Ok(r) => r,
        Err(panic) => Err(MaintenanceError::Engine(format!(
            "unexpected failure: {}",
            panic_message(&*panic)
        ))),
    };

    let err = match result {
        Ok(v) => {
            progress.advance(TxState::Committed);
            return Ok(v);
        }
        Err(e) => e,
    };

    progress.advance(TxState::Failed);
    events.error(&format!("{}", err));
    events.warning(&format!(
        "Attempting to restore {} from backup: {}",
        target.display(),
        backup_path.display()
    ));

    match backup::restore_from_backup(&backup_path, target) {
        Ok(()) => {
            progress.advance(TxState::RestoredFromBackup);
            events.success(&format!("{} successfully restored from backup.", label));
        }
        Err(restore_err) => {
            progress.advance(TxState::RestoreFailed);
            events.error(&format!("Failed to restore from backup: {}", restore_err));
            events.error(&format!(
                "{} might be corrupted or in an inconsistent state.",
                target.display()
            ));
            events.error(&format!("The backup is available at: {}", backup_path.display()));
        }
    }

    Err(err)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
