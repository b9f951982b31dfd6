//! Business logic helpers for managing agency clients.

use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::workspace::{Client, Workspace};

/// Provides validated CRUD helpers for workspace clients.
pub struct ClientService;

impl ClientService {
    /// Adds a new client and returns its identifier. Names must be unique
    /// case-insensitively.
    pub fn add(workspace: &mut Workspace, client: Client) -> ServiceResult<Uuid> {
        let name = client.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Invalid("Client name cannot be empty".into()));
        }
        if workspace
            .clients
            .iter()
            .any(|existing| existing.name.eq_ignore_ascii_case(name))
        {
            return Err(ServiceError::Invalid(format!(
                "Client `{name}` already exists"
            )));
        }
        Ok(workspace.add_client(client))
    }

    /// Updates the client identified by `id` via the provided mutator.
    pub fn update<F>(workspace: &mut Workspace, id: Uuid, mutator: F) -> ServiceResult<()>
    where
        F: FnOnce(&mut Client),
    {
        let client = workspace
            .client_mut(id)
            .ok_or_else(|| ServiceError::Invalid("Client not found".into()))?;
        mutator(client);
        workspace.touch();
        Ok(())
    }

    /// Removes the client identified by `id`, returning the removed instance.
    /// Tasks linked to the client keep existing with the link cleared.
    pub fn remove(workspace: &mut Workspace, id: Uuid) -> ServiceResult<Client> {
        let removed = workspace
            .remove_client(id)
            .ok_or_else(|| ServiceError::Invalid("Client not found".into()))?;
        for task in workspace
            .tasks
            .iter_mut()
            .filter(|task| task.client_id == Some(id))
        {
            task.client_id = None;
        }
        workspace.touch();
        Ok(removed)
    }

    /// Returns a snapshot of the workspace's clients.
    pub fn list(workspace: &Workspace) -> Vec<&Client> {
        workspace.clients.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::{Task, Workspace};

    fn base_workspace() -> Workspace {
        Workspace::new("Clients")
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut workspace = base_workspace();
        let creator = Uuid::new_v4();
        ClientService::add(&mut workspace, Client::new("Acme", creator)).unwrap();
        let err = ClientService::add(&mut workspace, Client::new("acme", creator))
            .expect_err("duplicate name must be rejected");
        assert!(
            matches!(err, ServiceError::Invalid(ref message) if message.contains("already exists")),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn removing_a_client_clears_task_links() {
        let mut workspace = base_workspace();
        let creator = Uuid::new_v4();
        let client_id =
            ClientService::add(&mut workspace, Client::new("Acme", creator)).unwrap();
        let mut task = Task::new("Kickoff", creator);
        task.client_id = Some(client_id);
        let task_id = workspace.add_task(task);

        ClientService::remove(&mut workspace, client_id).unwrap();
        assert!(workspace.client(client_id).is_none());
        assert_eq!(workspace.task(task_id).unwrap().client_id, None);
    }
}
