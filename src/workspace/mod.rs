//! Workspace domain models, persistence-friendly types, and helpers.

pub mod client;
pub mod expense;
pub mod recurring;
pub mod task;
pub mod user;
#[allow(clippy::module_inception)]
pub mod workspace;

pub use client::Client;
pub use expense::{Expense, Frequency, PaymentMethod, Recurrence, GENERATED_NOTE};
pub use recurring::{materialize_recurring_expenses, next_business_day, MaterializeOutcome};
pub use task::{ChecklistItem, Task, TaskStatus};
pub use user::{User, UserRole};
pub use workspace::Workspace;
