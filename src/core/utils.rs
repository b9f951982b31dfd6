use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::core::errors::AgencyError;

const HOME_ENV: &str = "AGENCY_CORE_HOME";
const APP_DIR_NAME: &str = "agency-core";

pub fn ensure_dir(path: &Path) -> Result<(), AgencyError> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Resolves application directories under a single configurable root.
pub struct PathResolver;

impl PathResolver {
    /// Application root: the `AGENCY_CORE_HOME` override when set, otherwise
    /// a directory under the platform data dir.
    pub fn base_dir() -> PathBuf {
        if let Some(root) = env::var_os(HOME_ENV) {
            return PathBuf::from(root);
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(format!(".{APP_DIR_NAME}")))
    }

    pub fn resolve_base(root: Option<PathBuf>) -> PathBuf {
        root.unwrap_or_else(Self::base_dir)
    }

    pub fn workspace_dir_in(base: &Path) -> PathBuf {
        base.join("workspaces")
    }

    pub fn backup_dir_in(base: &Path) -> PathBuf {
        base.join("backups")
    }

    pub fn config_dir_in(base: &Path) -> PathBuf {
        base.join("config")
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        Self::config_dir_in(base).join("config.json")
    }

    pub fn config_backup_dir_in(base: &Path) -> PathBuf {
        Self::config_dir_in(base).join("backups")
    }

    pub fn state_file_in(base: &Path) -> PathBuf {
        base.join("state.json")
    }
}
