#![allow(dead_code)]

use chrono::NaiveDate;
use uuid::Uuid;

use agency_core::workspace::{
    Expense, Frequency, PaymentMethod, Recurrence, User, UserRole, Workspace,
};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Workspace pre-seeded with one admin account, returned with its id.
pub fn workspace_with_admin() -> (Workspace, Uuid) {
    let mut workspace = Workspace::new("Test Agency");
    let admin = workspace.add_user(User::new("root", UserRole::Admin));
    (workspace, admin)
}

pub fn flat_expense(name: &str, payment_date: NaiveDate, created_by: Uuid) -> Expense {
    Expense::new(
        name,
        "Infrastructure",
        payment_date,
        PaymentMethod::Transfer,
        100.0,
        1,
        created_by,
    )
}

pub fn template(
    name: &str,
    start: NaiveDate,
    frequency: Frequency,
    end: Option<NaiveDate>,
    created_by: Uuid,
) -> Expense {
    let mut rule = Recurrence::new(start, frequency);
    if let Some(end) = end {
        rule = rule.until(end);
    }
    flat_expense(name, start, created_by).with_recurrence(rule)
}
