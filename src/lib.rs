// Augment Free - Library Entry Point
//
// Maintenance operations for a local VS Code installation: purge extension
// keys from the state database, rotate the telemetry identifiers in
// storage.json and build the account login URL. Every file mutation runs
// behind a verified backup and is restored from it on failure.

pub mod constants;
pub mod error;
pub mod events;
pub mod hash;
pub mod backup;
pub mod ids;
pub mod transaction;
pub mod db;
pub mod telemetry;
pub mod paths;
pub mod process;
pub mod jobs;
pub mod login;
pub mod logging;

pub use db::{clean_database, CleanOutcome};
pub use error::{ErrorKind, MaintenanceError, Result};
pub use events::{EventSink, NullSink, StatusEvent, StatusLevel};
pub use ids::{generate_device_id, generate_machine_id, IdentifierPair};
pub use jobs::{spawn_job, Job, JobHandle, JobMessage};
pub use login::{build_login_request, LoginRequest};
pub use paths::{EditorFlavor, EditorPaths, PathLocator, SystemPathLocator};
pub use process::{EditorProcess, SystemProcessControl};
pub use telemetry::{rewrite_telemetry_ids, RewriteOutcome};
pub use transaction::{OperationReport, TxState};
