// Augment Free Constants
// File layouts below mirror what VS Code writes. Change only together with the tests.

// Backup
pub const BACKUP_SUFFIX: &str = ".backup";

// Database cleaning
pub const DEFAULT_KEYWORD: &str = "augment";
pub const ITEM_TABLE: &str = "ItemTable";
pub const ITEM_KEY_COLUMN: &str = "key";
pub const LIKE_ESCAPE_CHAR: char = '\\';
pub const DB_BUSY_TIMEOUT_MS: u64 = 5_000;

// Telemetry fields in storage.json
pub const MACHINE_ID_FIELD: &str = "machineId";
pub const TELEMETRY_OBJECT: &str = "telemetry";
pub const DEVICE_ID_FIELD: &str = "devDeviceId";
pub const MACHINE_ID_HEX_LEN: usize = 64;
pub const JSON_INDENT: &[u8] = b"    ";

// Paths (relative to the editor's per-user data folder)
pub const USER_FOLDER: &str = "User";
pub const GLOBAL_STORAGE_FOLDER: &str = "globalStorage";
pub const STATE_DB_FILENAME: &str = "state.vscdb";
pub const STORAGE_JSON_FILENAME: &str = "storage.json";

// Environment overrides
pub const ENV_STATE_DB: &str = "AUGMENT_FREE_STATE_DB";
pub const ENV_STORAGE_JSON: &str = "AUGMENT_FREE_STORAGE_JSON";
pub const ENV_LOG_LEVEL: &str = "AUGMENT_FREE_LOG";

// Background jobs
pub const JOB_THREAD_NAME: &str = "maintenance-job";

// Account login (PKCE authorization request)
pub const AUTH_AUTHORIZE_URL: &str = "https://auth.augmentcode.com/authorize";
pub const AUTH_CLIENT_ID: &str = "augment-vscode-extension";
pub const AUTH_REDIRECT_URI: &str = "vscode://augment.vscode-augment/auth/result";
pub const AUTH_SCOPE: &str = "email";
pub const AUTH_PROMPT: &str = "login";
pub const AUTH_CHALLENGE_METHOD: &str = "S256";
