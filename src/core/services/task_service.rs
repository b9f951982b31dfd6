//! Business logic helpers for managing tasks and their checklists.

use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::workspace::{Task, TaskStatus, Workspace};

/// Provides validated CRUD helpers for workspace tasks.
pub struct TaskService;

impl TaskService {
    /// Adds a new task and returns its identifier.
    pub fn add(workspace: &mut Workspace, task: Task) -> ServiceResult<Uuid> {
        if task.title.trim().is_empty() {
            return Err(ServiceError::Invalid("Task title cannot be empty".into()));
        }
        if let Some(client_id) = task.client_id {
            if workspace.client(client_id).is_none() {
                return Err(ServiceError::Invalid(
                    "Task references an unknown client".into(),
                ));
            }
        }
        Ok(workspace.add_task(task))
    }

    /// Updates the task identified by `id` via the provided mutator.
    pub fn update<F>(workspace: &mut Workspace, id: Uuid, mutator: F) -> ServiceResult<()>
    where
        F: FnOnce(&mut Task),
    {
        let task = workspace
            .task_mut(id)
            .ok_or_else(|| ServiceError::Invalid("Task not found".into()))?;
        mutator(task);
        workspace.touch();
        Ok(())
    }

    pub fn set_status(
        workspace: &mut Workspace,
        id: Uuid,
        status: TaskStatus,
    ) -> ServiceResult<()> {
        Self::update(workspace, id, |task| task.status = status)
    }

    /// Appends a checklist item to the task, returning the item identifier.
    pub fn add_checklist_item(
        workspace: &mut Workspace,
        task_id: Uuid,
        text: impl Into<String>,
    ) -> ServiceResult<Uuid> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ServiceError::Invalid(
                "Checklist item text cannot be empty".into(),
            ));
        }
        let task = workspace
            .task_mut(task_id)
            .ok_or_else(|| ServiceError::Invalid("Task not found".into()))?;
        let item_id = task.add_checklist_item(text);
        workspace.touch();
        Ok(item_id)
    }

    /// Flips a checklist item's done flag, returning the new state.
    pub fn toggle_checklist_item(
        workspace: &mut Workspace,
        task_id: Uuid,
        item_id: Uuid,
    ) -> ServiceResult<bool> {
        let task = workspace
            .task_mut(task_id)
            .ok_or_else(|| ServiceError::Invalid("Task not found".into()))?;
        let state = task
            .toggle_checklist_item(item_id)
            .ok_or_else(|| ServiceError::Invalid("Checklist item not found".into()))?;
        workspace.touch();
        Ok(state)
    }

    /// Removes the task identified by `id`, returning the removed instance.
    pub fn remove(workspace: &mut Workspace, id: Uuid) -> ServiceResult<Task> {
        workspace
            .remove_task(id)
            .ok_or_else(|| ServiceError::Invalid("Task not found".into()))
    }

    /// Returns the workspace's tasks, optionally filtered by status.
    pub fn list(workspace: &Workspace, status: Option<TaskStatus>) -> Vec<&Task> {
        workspace
            .tasks
            .iter()
            .filter(|task| status.map_or(true, |wanted| task.status == wanted))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_workspace() -> Workspace {
        Workspace::new("Tasks")
    }

    #[test]
    fn add_rejects_unknown_client_link() {
        let mut workspace = base_workspace();
        let mut task = Task::new("Design review", Uuid::new_v4());
        task.client_id = Some(Uuid::new_v4());
        let err = TaskService::add(&mut workspace, task).expect_err("unknown client must fail");
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn status_filter_narrows_listing() {
        let mut workspace = base_workspace();
        let creator = Uuid::new_v4();
        let first = TaskService::add(&mut workspace, Task::new("One", creator)).unwrap();
        TaskService::add(&mut workspace, Task::new("Two", creator)).unwrap();
        TaskService::set_status(&mut workspace, first, TaskStatus::Done).unwrap();

        assert_eq!(TaskService::list(&workspace, None).len(), 2);
        assert_eq!(
            TaskService::list(&workspace, Some(TaskStatus::Done)).len(),
            1
        );
    }

    #[test]
    fn checklist_round_trip() {
        let mut workspace = base_workspace();
        let task_id = TaskService::add(&mut workspace, Task::new("Launch", Uuid::new_v4())).unwrap();
        let item_id = TaskService::add_checklist_item(&mut workspace, task_id, "Ship it").unwrap();
        assert!(TaskService::toggle_checklist_item(&mut workspace, task_id, item_id).unwrap());
        assert!(!TaskService::toggle_checklist_item(&mut workspace, task_id, item_id).unwrap());
    }
}
