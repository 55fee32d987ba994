// Database module: keyword cleanup of the editor's state.vscdb

pub mod cleanser;
pub mod item_table;


use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use crate::constants::DB_BUSY_TIMEOUT_MS;
use crate::error::Result;

pub use cleanser::{clean_database, CleanOutcome};

/// Open an existing state database for writing. Never creates a file.
///
/// The journal mode is left alone: switching to WAL would move committed pages
/// out of the main file and the backup copy would no longer capture them.
pub fn open_db(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;

    conn.execute_batch(&format!("PRAGMA busy_timeout = {};", DB_BUSY_TIMEOUT_MS))?;

    Ok(conn)
}
