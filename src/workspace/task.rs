use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn parse(token: &str) -> Option<TaskStatus> {
        match token.to_lowercase().as_str() {
            "todo" | "open" => Some(TaskStatus::Todo),
            "doing" | "in-progress" | "progress" => Some(TaskStatus::InProgress),
            "done" | "closed" => Some(TaskStatus::Done),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "Todo",
            TaskStatus::InProgress => "In progress",
            TaskStatus::Done => "Done",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            done: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: impl Into<String>, created_by: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            client_id: None,
            status: TaskStatus::Todo,
            due_date: None,
            checklist: Vec::new(),
            notes: None,
            created_by,
            created_at: Utc::now(),
        }
    }

    /// Appends a checklist item and returns its identifier.
    pub fn add_checklist_item(&mut self, text: impl Into<String>) -> Uuid {
        let item = ChecklistItem::new(text);
        let id = item.id;
        self.checklist.push(item);
        id
    }

    /// Flips the done flag of a checklist item, returning the new state.
    pub fn toggle_checklist_item(&mut self, item_id: Uuid) -> Option<bool> {
        let item = self.checklist.iter_mut().find(|item| item.id == item_id)?;
        item.done = !item.done;
        Some(item.done)
    }

    pub fn checklist_progress(&self) -> (usize, usize) {
        let done = self.checklist.iter().filter(|item| item.done).count();
        (done, self.checklist.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checklist_toggle_flips_state() {
        let mut task = Task::new("Prepare kickoff", Uuid::new_v4());
        let item = task.add_checklist_item("Send agenda");
        assert_eq!(task.toggle_checklist_item(item), Some(true));
        assert_eq!(task.toggle_checklist_item(item), Some(false));
        assert_eq!(task.toggle_checklist_item(Uuid::new_v4()), None);
    }

    #[test]
    fn checklist_progress_counts_done_items() {
        let mut task = Task::new("Launch site", Uuid::new_v4());
        let first = task.add_checklist_item("Buy domain");
        task.add_checklist_item("Deploy");
        task.toggle_checklist_item(first);
        assert_eq!(task.checklist_progress(), (1, 2));
    }
}
