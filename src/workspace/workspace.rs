use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{client::Client, expense::Expense, task::Task, user::User};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Root document owning every record of one agency workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub users: Vec<User>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Workspace::schema_version_default")]
    pub schema_version: u8,
}

impl Workspace {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            clients: Vec::new(),
            tasks: Vec::new(),
            expenses: Vec::new(),
            users: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_client(&mut self, client: Client) -> Uuid {
        let id = client.id;
        self.clients.push(client);
        self.touch();
        id
    }

    pub fn add_task(&mut self, task: Task) -> Uuid {
        let id = task.id;
        self.tasks.push(task);
        self.touch();
        id
    }

    pub fn add_expense(&mut self, expense: Expense) -> Uuid {
        let id = expense.id;
        self.expenses.push(expense);
        self.touch();
        id
    }

    pub fn add_user(&mut self, user: User) -> Uuid {
        let id = user.id;
        self.users.push(user);
        self.touch();
        id
    }

    pub fn client(&self, id: Uuid) -> Option<&Client> {
        self.clients.iter().find(|client| client.id == id)
    }

    pub fn client_mut(&mut self, id: Uuid) -> Option<&mut Client> {
        self.clients.iter_mut().find(|client| client.id == id)
    }

    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn task_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    pub fn expense(&self, id: Uuid) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    pub fn expense_mut(&mut self, id: Uuid) -> Option<&mut Expense> {
        self.expenses.iter_mut().find(|expense| expense.id == id)
    }

    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn user_mut(&mut self, id: Uuid) -> Option<&mut User> {
        self.users.iter_mut().find(|user| user.id == id)
    }

    pub fn user_by_name(&self, name: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|user| user.name.eq_ignore_ascii_case(name))
    }

    pub fn remove_client(&mut self, id: Uuid) -> Option<Client> {
        let index = self.clients.iter().position(|client| client.id == id)?;
        let removed = self.clients.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn remove_task(&mut self, id: Uuid) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        let removed = self.tasks.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn remove_expense(&mut self, id: Uuid) -> Option<Expense> {
        let index = self.expenses.iter().position(|expense| expense.id == id)?;
        let removed = self.expenses.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn remove_user(&mut self, id: Uuid) -> Option<User> {
        let index = self.users.iter().position(|user| user.id == id)?;
        let removed = self.users.remove(index);
        self.touch();
        Some(removed)
    }

    /// Conditionally inserts a generated occurrence. The occurrence is only
    /// stored when no other non-template expense carries the same name and
    /// payment date; the check and the insert are a single indivisible
    /// operation on the document.
    pub fn insert_occurrence_if_absent(&mut self, occurrence: Expense) -> bool {
        let duplicate = self.expenses.iter().any(|existing| {
            existing.recurrence.is_none()
                && existing.name == occurrence.name
                && existing.payment_date == occurrence.payment_date
        });
        if duplicate {
            return false;
        }
        self.expenses.push(occurrence);
        self.touch();
        true
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
