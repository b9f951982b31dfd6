//! Business logic helpers layered over the workspace document.

pub mod client_service;
pub mod expense_service;
pub mod task_service;
pub mod user_service;

use thiserror::Error;

pub use client_service::ClientService;
pub use expense_service::ExpenseService;
pub use task_service::TaskService;
pub use user_service::UserService;

/// Validation and authorization failures raised by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid input: {0}")]
    Invalid(String),
    #[error("No active user; log in first")]
    NoActiveUser,
    #[error("{0} requires administrator privileges")]
    NotAuthorized(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
