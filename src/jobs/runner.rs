// Job runner - resolves target paths and drives the guarded operations

use serde::Serialize;

use crate::db::{clean_database, CleanOutcome};
use crate::events::EventSink;
use crate::login::{build_login_request, LoginRequest};
use crate::paths::PathLocator;
use crate::process::{open_in_browser, EditorProcess};
use crate::telemetry::{rewrite_telemetry_ids, RewriteOutcome};
use crate::transaction::OperationReport;

/// Refuse to touch the editor's files while it is running, unless forced.
pub fn ensure_editor_closed(process: &dyn EditorProcess, force: bool, sink: &dyn EventSink) -> bool {
    if !process.is_running() {
        return true;
    }
    if force {
        sink.warning("VS Code is running. Continuing anyway because --force was given.");
        return true;
    }
    sink.warning("VS Code is running and may overwrite the files being modified.");
    sink.error("Aborting: close VS Code first (close-editor) or pass --force.");
    false
}

/// Clean the state database. `None` when the operation never started
/// (paths unknown or the database file is missing).
pub fn clean_db(
    locator: &dyn PathLocator,
    keyword: &str,
    sink: &dyn EventSink,
) -> Option<OperationReport<CleanOutcome>> {
    let keyword = keyword.trim();
    sink.info(&format!("Executing: Database Cleaning (keyword: '{}')", keyword));

    let paths = match locator.locate() {
        Ok(p) => p,
        Err(e) => {
            sink.error(&format!("Could not determine VS Code paths for your OS ({}). Aborting.", e));
            return None;
        }
    };

    if !paths.state_db.is_file() {
        sink.warning(&format!(
            "Database file does not exist or is not a file at the expected location: {}",
            paths.state_db.display()
        ));
        sink.error("Aborting database cleaning as the database file was not found.");
        return None;
    }

    let report = clean_database(&paths.state_db, keyword, sink);
    if report.success {
        sink.info("Database cleaning process finished.");
    } else {
        sink.error("Database cleaning process reported errors. Check previous messages.");
    }
    Some(report)
}

/// Rotate telemetry identifiers. `None` when the operation never started.
pub fn modify_ids(locator: &dyn PathLocator, sink: &dyn EventSink) -> Option<OperationReport<RewriteOutcome>> {
    sink.info("Executing: Telemetry ID Modification");

    let paths = match locator.locate() {
        Ok(p) => p,
        Err(e) => {
            sink.error(&format!("Could not determine VS Code paths for your OS ({}). Aborting.", e));
            return None;
        }
    };

    if !paths.storage_json.is_file() {
        sink.warning(&format!(
            "Storage file does not exist or is not a file at the expected location: {}",
            paths.storage_json.display()
        ));
        sink.error("Aborting telemetry ID modification as the storage file was not found.");
        return None;
    }

    let report = rewrite_telemetry_ids(&paths.storage_json, sink);
    if report.success {
        sink.info("Telemetry ID modification process finished.");
    } else {
        sink.error("Telemetry ID modification process reported errors. Check previous messages.");
    }
    Some(report)
}

/// Close the editor. Nothing running counts as success.
pub fn close_editor(process: &dyn EditorProcess, sink: &dyn EventSink) -> bool {
    sink.info("Closing VS Code processes...");
    match process.terminate() {
        Ok(true) => {
            sink.success("VS Code has been closed.");
            true
        }
        Ok(false) => {
            sink.warning("No running VS Code process was found.");
            true
        }
        Err(e) => {
            sink.error(&format!("Error while closing VS Code: {}", e));
            false
        }
    }
}

/// Build the account login URL and optionally hand it to the browser.
/// A browser that fails to launch is a warning; the URL is still reported.
pub fn login(open: bool, sink: &dyn EventSink) -> Option<LoginRequest> {
    sink.info("Executing: Account Login");

    let request = match build_login_request() {
        Ok(r) => r,
        Err(e) => {
            sink.error(&format!("Could not build the login URL: {}", e));
            return None;
        }
    };
    log::debug!("Login state {}", request.state);
    sink.info(&format!("Login URL: {}", request.url));

    if open {
        match open_in_browser(&request.url) {
            Ok(()) => sink.success("Opened the login page in your browser."),
            Err(e) => sink.warning(&format!("Could not open a browser ({}). Open the URL above manually.", e)),
        }
    }
    Some(request)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAllSummary {
    /// `None` when closing was not requested or the editor was not running.
    pub editor_closed: Option<bool>,
    pub clean: Option<OperationReport<CleanOutcome>>,
    pub ids: Option<OperationReport<RewriteOutcome>>,
}

impl RunAllSummary {
    pub fn success(&self) -> bool {
        let clean_ok = self.clean.as_ref().map(|r| r.success).unwrap_or(false);
        let ids_ok = self.ids.as_ref().map(|r| r.success).unwrap_or(false);
        clean_ok && ids_ok
    }
}

/// Optionally close the editor, then clean the database, then rotate IDs.
/// A failing step never stops the next one.
pub fn run_all(
    locator: &dyn PathLocator,
    process: &dyn EditorProcess,
    keyword: &str,
    close_first: bool,
    sink: &dyn EventSink,
) -> RunAllSummary {
    sink.info("Executing: Run All Tools");

    let mut editor_closed = None;
    if close_first {
        sink.info("--- Step 0: Close VS Code ---");
        if process.is_running() {
            let closed = matches!(process.terminate(), Ok(true));
            if closed {
                sink.success("VS Code has been closed.");
            } else {
                sink.warning("Problem while closing VS Code, continuing with the next steps.");
            }
            editor_closed = Some(closed);
        } else {
            sink.info("VS Code is not running, skipping.");
        }
    }

    sink.info("--- Step 1: Database Cleaning ---");
    let clean = clean_db(locator, keyword, sink);
    if clean.as_ref().map(|r| !r.success).unwrap_or(true) {
        sink.warning("Proceeding to the next step despite the error.");
    }

    sink.info("--- Step 2: Telemetry ID Modification ---");
    let ids = modify_ids(locator, sink);

    sink.success("All tools have finished their execution sequence.");

    RunAllSummary {
        editor_closed,
        clean,
        ids,
    }
}
