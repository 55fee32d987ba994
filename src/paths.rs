// Editor path discovery
//
// Resolution order for each target file:
// 1) Explicit path (CLI flag)
// 2) Environment variable override (AUGMENT_FREE_STATE_DB, AUGMENT_FREE_STORAGE_JSON)
// 3) OS per-user config dir: <config>/<product>/User/globalStorage/<file>
//      Windows: %APPDATA%
//      macOS:   ~/Library/Application Support
//      Linux:   $XDG_CONFIG_HOME or ~/.config

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::constants::{
    ENV_STATE_DB, ENV_STORAGE_JSON, GLOBAL_STORAGE_FOLDER, STATE_DB_FILENAME, STORAGE_JSON_FILENAME,
    USER_FOLDER,
};
use crate::error::{MaintenanceError, Result};

/// Which VS Code build owns the files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EditorFlavor {
    #[default]
    Code,
    Insiders,
    Oss,
}

impl EditorFlavor {
    /// Folder name under the OS config dir.
    pub fn data_folder(&self) -> &'static str {
        match self {
            EditorFlavor::Code => "Code",
            EditorFlavor::Insiders => "Code - Insiders",
            EditorFlavor::Oss => "Code - OSS",
        }
    }
}

/// The two files the maintenance operations touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorPaths {
    pub state_db: PathBuf,
    pub storage_json: PathBuf,
}

impl EditorPaths {
    pub fn in_global_storage(global_storage: &Path) -> Self {
        Self {
            state_db: global_storage.join(STATE_DB_FILENAME),
            storage_json: global_storage.join(STORAGE_JSON_FILENAME),
        }
    }
}

/// Capability: find the target files for this machine.
pub trait PathLocator {
    fn locate(&self) -> Result<EditorPaths>;
}

impl PathLocator for EditorPaths {
    fn locate(&self) -> Result<EditorPaths> {
        Ok(self.clone())
    }
}

/// OS-derived locator with env and explicit overrides.
#[derive(Debug, Clone, Default)]
pub struct SystemPathLocator {
    flavor: EditorFlavor,
    state_db: Option<PathBuf>,
    storage_json: Option<PathBuf>,
}

impl SystemPathLocator {
    pub fn new(flavor: EditorFlavor) -> Self {
        Self {
            flavor,
            ..Default::default()
        }
    }

    pub fn with_state_db(mut self, path: Option<PathBuf>) -> Self {
        self.state_db = path;
        self
    }

    pub fn with_storage_json(mut self, path: Option<PathBuf>) -> Self {
        self.storage_json = path;
        self
    }

    /// `<config>/<product>/User/globalStorage`
    pub fn global_storage_dir(&self) -> Result<PathBuf> {
        let base = directories::BaseDirs::new().ok_or_else(|| {
            MaintenanceError::PathDiscovery("could not determine the home directory".to_string())
        })?;
        Ok(global_storage_under(base.config_dir(), self.flavor))
    }
}

impl PathLocator for SystemPathLocator {
    fn locate(&self) -> Result<EditorPaths> {
        let state_db = resolve_override(self.state_db.as_deref(), env::var_os(ENV_STATE_DB));
        let storage_json = resolve_override(self.storage_json.as_deref(), env::var_os(ENV_STORAGE_JSON));

        if let (Some(state_db), Some(storage_json)) = (&state_db, &storage_json) {
            return Ok(EditorPaths {
                state_db: state_db.clone(),
                storage_json: storage_json.clone(),
            });
        }

        let defaults = EditorPaths::in_global_storage(&self.global_storage_dir()?);
        Ok(EditorPaths {
            state_db: state_db.unwrap_or(defaults.state_db),
            storage_json: storage_json.unwrap_or(defaults.storage_json),
        })
    }
}

fn global_storage_under(config_dir: &Path, flavor: EditorFlavor) -> PathBuf {
    config_dir
        .join(flavor.data_folder())
        .join(USER_FOLDER)
        .join(GLOBAL_STORAGE_FOLDER)
}

/// Explicit path wins, then a non-empty env value.
fn resolve_override(explicit: Option<&Path>, env_value: Option<OsString>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }
    env_value.filter(|v| !v.is_empty()).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_storage_layout() {
        let dir = global_storage_under(Path::new("/home/u/.config"), EditorFlavor::Code);
        assert_eq!(dir, PathBuf::from("/home/u/.config/Code/User/globalStorage"));

        let dir = global_storage_under(Path::new("/cfg"), EditorFlavor::Insiders);
        assert_eq!(dir, PathBuf::from("/cfg/Code - Insiders/User/globalStorage"));

        let paths = EditorPaths::in_global_storage(&dir);
        assert_eq!(paths.state_db, dir.join("state.vscdb"));
        assert_eq!(paths.storage_json, dir.join("storage.json"));
    }

    #[test]
    fn test_resolve_override_order() {
        let explicit = PathBuf::from("/explicit/state.vscdb");
        assert_eq!(
            resolve_override(Some(&explicit), Some(OsString::from("/env/state.vscdb"))),
            Some(explicit)
        );
        assert_eq!(
            resolve_override(None, Some(OsString::from("/env/state.vscdb"))),
            Some(PathBuf::from("/env/state.vscdb"))
        );
        assert_eq!(resolve_override(None, Some(OsString::new())), None);
        assert_eq!(resolve_override(None, None), None);
    }

    #[test]
    fn test_explicit_paths_skip_discovery() {
        let locator = SystemPathLocator::new(EditorFlavor::Oss)
            .with_state_db(Some(PathBuf::from("/x/state.vscdb")))
            .with_storage_json(Some(PathBuf::from("/x/storage.json")));

        let paths = locator.locate().unwrap();
        assert_eq!(paths.state_db, PathBuf::from("/x/state.vscdb"));
        assert_eq!(paths.storage_json, PathBuf::from("/x/storage.json"));
    }

    #[test]
    fn test_fixed_paths_locate_themselves() {
        let fixed = EditorPaths::in_global_storage(Path::new("/tmp/gs"));
        assert_eq!(fixed.locate().unwrap(), fixed);
    }
}
