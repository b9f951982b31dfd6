pub mod json_backend;

use std::collections::HashSet;
use std::path::Path;

use crate::{core::errors::AgencyError, workspace::Workspace};

pub type Result<T> = std::result::Result<T, AgencyError>;

/// Abstraction over persistence backends capable of storing workspaces and
/// their snapshots.
pub trait StorageBackend: Send + Sync {
    fn save(&self, workspace: &Workspace, name: &str) -> Result<()>;
    fn load(&self, name: &str) -> Result<Workspace>;
    fn list_workspaces(&self) -> Result<Vec<String>>;
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    fn backup(&self, workspace: &Workspace, name: &str, note: Option<&str>) -> Result<()>;
    fn restore(&self, name: &str, backup_name: &str) -> Result<Workspace>;

    /// Optional helpers for ad-hoc file operations. Default implementations
    /// forward to managed storage when not overridden.
    fn save_to_path(&self, workspace: &Workspace, path: &Path) -> Result<()> {
        json_backend::save_workspace_to_path(workspace, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<Workspace> {
        json_backend::load_workspace_from_path(path)
    }
}

pub use json_backend::JsonStorage;

/// Scans a loaded workspace for dangling references and duplicate
/// occurrences.
pub fn workspace_warnings(workspace: &Workspace) -> Vec<String> {
    let client_ids: HashSet<_> = workspace.clients.iter().map(|client| client.id).collect();
    let user_ids: HashSet<_> = workspace.users.iter().map(|user| user.id).collect();
    let mut warnings = Vec::new();

    for task in &workspace.tasks {
        if let Some(client_id) = task.client_id {
            if !client_ids.contains(&client_id) {
                warnings.push(format!(
                    "task {} references unknown client {}",
                    task.id, client_id
                ));
            }
        }
        if !user_ids.contains(&task.created_by) {
            warnings.push(format!(
                "task {} was created by unknown user {}",
                task.id, task.created_by
            ));
        }
    }

    for expense in &workspace.expenses {
        if !user_ids.contains(&expense.created_by) {
            warnings.push(format!(
                "expense {} was created by unknown user {}",
                expense.id, expense.created_by
            ));
        }
    }

    let mut seen = HashSet::new();
    for expense in workspace
        .expenses
        .iter()
        .filter(|expense| expense.recurrence.is_none())
    {
        if !seen.insert((expense.name.as_str(), expense.payment_date)) {
            warnings.push(format!(
                "duplicate occurrence `{}` on {}",
                expense.name, expense.payment_date
            ));
        }
    }

    warnings
}
