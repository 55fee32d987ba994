// Database cleanser
// Removes ItemTable rows whose key contains a keyword, under the backup/restore guard.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::item_table::{delete_matching, find_matching_keys, like_pattern};
use super::open_db;
use crate::error::{MaintenanceError, Result};
use crate::events::EventSink;
use crate::transaction::{self, OperationReport};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanOutcome {
    pub keyword: String,
    pub matched: usize,
    pub deleted: usize,
}

impl CleanOutcome {
    /// Some but not all matched rows went away.
    pub fn is_partial(&self) -> bool {
        self.deleted > 0 && self.deleted != self.matched
    }
}

/// Remove every row of `db_path`'s ItemTable whose key contains `keyword`.
///
/// No matches is a successful no-op. The engine reporting fewer deletions than
/// matches is a warning; reporting zero deletions despite matches is treated as
/// an engine inconsistency and rolls the file back from its backup.
pub fn clean_database(db_path: &Path, keyword: &str, sink: &dyn EventSink) -> OperationReport<CleanOutcome> {
    if keyword.is_empty() {
        return transaction::rejected(
            db_path,
            MaintenanceError::InvalidInput("keyword must not be empty".to_string()),
            sink,
        );
    }

    let intro = [
        format!("Attempting to clean VS Code database: {}", db_path.display()),
        format!("Target keyword for cleaning: '{}'", keyword),
    ];
    transaction::run_guarded(db_path, "Database", &intro, sink, |events| {
        purge(db_path, keyword, events)
    })
}

fn purge(db_path: &Path, keyword: &str, events: &dyn EventSink) -> Result<CleanOutcome> {
    events.info(&format!("Connecting to database: {}", db_path.display()));
    let mut conn = open_db(db_path)?;
    events.success("Successfully connected to the database.");

    let pattern = like_pattern(keyword);
    events.info(&format!("Searching for entries with keyword '{}'...", keyword));
    let keys = find_matching_keys(&conn, &pattern)?;
    let matched = keys.len();

    if matched == 0 {
        events.success(&format!(
            "No entries found with keyword '{}'. Database is already clean.",
            keyword
        ));
        return Ok(CleanOutcome {
            keyword: keyword.to_string(),
            matched: 0,
            deleted: 0,
        });
    }

    events.warning(&format!("Found {} entries containing '{}':", matched, keyword));
    for (i, key) in keys.iter().enumerate() {
        events.info(&format!("  {}. {}", i + 1, key));
    }

    events.info(&format!("Deleting {} entries...", matched));
    let tx = conn.transaction()?;
    let deleted = delete_matching(&tx, &pattern)?;
    tx.commit()?;
    drop(conn);

    if deleted == matched {
        events.success(&format!(
            "Successfully deleted {} entries containing '{}'.",
            deleted, keyword
        ));
    } else {
        events.warning(&format!(
            "Attempted to delete {} entries, but {} were reported deleted by the database.",
            matched, deleted
        ));
        if deleted > 0 {
            events.success(&format!("Partial success: {} entries deleted.", deleted));
        } else {
            events.error("No entries were deleted despite being found. Check database permissions or logs.");
            return Err(MaintenanceError::Engine(format!(
                "found {} matching entries but the delete affected none",
                matched
            )));
        }
    }

    events.success("Database cleaning process completed.");
    Ok(CleanOutcome {
        keyword: keyword.to_string(),
        matched,
        deleted,
    })
}
