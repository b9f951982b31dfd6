use crate::core::errors::AgencyError;
use crate::storage::{workspace_warnings, StorageBackend};
use crate::workspace::workspace::CURRENT_SCHEMA_VERSION;
use crate::workspace::Workspace;

/// Metadata describing the outcome of a load operation.
#[derive(Debug, Clone)]
pub struct LoadMetadata {
    pub warnings: Vec<String>,
    pub name: String,
    pub schema_version: u8,
}

/// Facade that coordinates workspace state, persistence, and backups.
pub struct WorkspaceManager {
    current: Option<Workspace>,
    current_name: Option<String>,
    storage: Box<dyn StorageBackend>,
}

impl WorkspaceManager {
    pub fn new(storage: Box<dyn StorageBackend>) -> Self {
        Self {
            current: None,
            current_name: None,
            storage,
        }
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current_name.as_deref()
    }

    pub fn has_current(&self) -> bool {
        self.current.is_some()
    }

    pub fn set_current(&mut self, workspace: Workspace, name: Option<String>) {
        self.current = Some(workspace);
        self.current_name = name;
    }

    pub fn clear_name(&mut self) {
        self.current_name = None;
    }

    pub fn load(&mut self, name: &str) -> Result<LoadMetadata, AgencyError> {
        let workspace = self.storage.load(name)?;
        Self::ensure_schema_support(workspace.schema_version)?;
        let metadata = LoadMetadata {
            warnings: workspace_warnings(&workspace),
            name: name.to_string(),
            schema_version: workspace.schema_version,
        };
        self.current = Some(workspace);
        self.current_name = Some(name.to_string());
        tracing::debug!(workspace = name, "workspace loaded");
        Ok(metadata)
    }

    pub fn save_as(&mut self, name: &str) -> Result<(), AgencyError> {
        let workspace = self
            .current
            .as_ref()
            .ok_or(AgencyError::WorkspaceNotLoaded)?;
        self.storage.save(workspace, name)?;
        self.current_name = Some(name.to_string());
        tracing::debug!(workspace = name, "workspace saved");
        Ok(())
    }

    pub fn backup(&self, note: Option<&str>) -> Result<(), AgencyError> {
        let workspace = self
            .current
            .as_ref()
            .ok_or(AgencyError::WorkspaceNotLoaded)?;
        let name = self.current_name.as_deref().ok_or_else(|| {
            AgencyError::InvalidInput("workspace has no name; save it first".into())
        })?;
        self.storage.backup(workspace, name, note)
    }

    pub fn list_backups(&self, name: &str) -> Result<Vec<String>, AgencyError> {
        self.storage.list_backups(name)
    }

    pub fn restore_backup(
        &mut self,
        name: &str,
        backup_name: &str,
    ) -> Result<LoadMetadata, AgencyError> {
        let workspace = self.storage.restore(name, backup_name)?;
        Self::ensure_schema_support(workspace.schema_version)?;
        let metadata = LoadMetadata {
            warnings: workspace_warnings(&workspace),
            name: name.to_string(),
            schema_version: workspace.schema_version,
        };
        self.current = Some(workspace);
        self.current_name = Some(name.to_string());
        Ok(metadata)
    }

    pub fn with_current<T>(&self, f: impl FnOnce(&Workspace) -> T) -> Result<T, AgencyError> {
        match &self.current {
            Some(workspace) => Ok(f(workspace)),
            None => Err(AgencyError::WorkspaceNotLoaded),
        }
    }

    pub fn with_current_mut<T>(
        &mut self,
        f: impl FnOnce(&mut Workspace) -> T,
    ) -> Result<T, AgencyError> {
        match &mut self.current {
            Some(workspace) => Ok(f(workspace)),
            None => Err(AgencyError::WorkspaceNotLoaded),
        }
    }

    fn ensure_schema_support(version: u8) -> Result<(), AgencyError> {
        if version > CURRENT_SCHEMA_VERSION {
            return Err(AgencyError::StorageError(format!(
                "workspace schema v{version} is newer than the supported v{CURRENT_SCHEMA_VERSION}"
            )));
        }
        Ok(())
    }
}
