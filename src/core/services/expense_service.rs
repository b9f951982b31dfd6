//! Business logic helpers for expenses and the recurring-expense pass.

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::workspace::{
    materialize_recurring_expenses, Expense, MaterializeOutcome, Workspace,
};

/// Provides validated CRUD helpers for workspace expenses and the entry
/// point of the materialization pass.
pub struct ExpenseService;

impl ExpenseService {
    /// Adds a new expense (flat or template) and returns its identifier.
    pub fn add(workspace: &mut Workspace, expense: Expense) -> ServiceResult<Uuid> {
        if expense.name.trim().is_empty() {
            return Err(ServiceError::Invalid("Expense name cannot be empty".into()));
        }
        if expense.unit_value <= 0.0 {
            return Err(ServiceError::Invalid(
                "Unit value must be greater than 0".into(),
            ));
        }
        if expense.quantity == 0 {
            return Err(ServiceError::Invalid("Quantity must be at least 1".into()));
        }
        if let Some(rule) = &expense.recurrence {
            if rule.end_date.is_some_and(|end| end < rule.start_date) {
                return Err(ServiceError::Invalid(
                    "Recurrence end date precedes its start date".into(),
                ));
            }
        }
        Ok(workspace.add_expense(expense))
    }

    /// Updates the expense identified by `id` via the provided mutator.
    pub fn update<F>(workspace: &mut Workspace, id: Uuid, mutator: F) -> ServiceResult<()>
    where
        F: FnOnce(&mut Expense),
    {
        let expense = workspace
            .expense_mut(id)
            .ok_or_else(|| ServiceError::Invalid("Expense not found".into()))?;
        mutator(expense);
        workspace.touch();
        Ok(())
    }

    /// Removes the expense identified by `id`, returning the removed instance.
    /// Templates and occurrences are deleted independently.
    pub fn remove(workspace: &mut Workspace, id: Uuid) -> ServiceResult<Expense> {
        workspace
            .remove_expense(id)
            .ok_or_else(|| ServiceError::Invalid("Expense not found".into()))
    }

    /// Returns a snapshot of the workspace's expenses.
    pub fn list(workspace: &Workspace) -> Vec<&Expense> {
        workspace.expenses.iter().collect()
    }

    /// Sums payable occurrences falling in the given month. Templates never
    /// contribute.
    pub fn total_for_month(workspace: &Workspace, year: i32, month: u32) -> f64 {
        workspace
            .expenses
            .iter()
            .filter(|expense| expense.recurrence.is_none())
            .filter(|expense| {
                expense.payment_date.year() == year && expense.payment_date.month() == month
            })
            .map(Expense::amount)
            .sum()
    }

    /// Runs one materialization pass. The acting user must be resolved by
    /// the caller; without one the pass refuses to start.
    pub fn materialize(
        workspace: &mut Workspace,
        today: NaiveDate,
        acting_user: Option<Uuid>,
    ) -> ServiceResult<MaterializeOutcome> {
        let actor = acting_user.ok_or(ServiceError::NoActiveUser)?;
        Ok(materialize_recurring_expenses(workspace, today, actor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::{Frequency, PaymentMethod, Recurrence};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn sample_expense(name: &str, payment_date: NaiveDate) -> Expense {
        Expense::new(
            name,
            "Infrastructure",
            payment_date,
            PaymentMethod::Transfer,
            100.0,
            1,
            Uuid::new_v4(),
        )
    }

    #[test]
    fn add_rejects_non_positive_unit_value() {
        let mut workspace = Workspace::new("Expenses");
        let mut expense = sample_expense("Hosting", date(2024, 1, 1));
        expense.unit_value = 0.0;
        let err = ExpenseService::add(&mut workspace, expense).expect_err("must fail");
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn add_rejects_end_before_start() {
        let mut workspace = Workspace::new("Expenses");
        let expense = sample_expense("Hosting", date(2024, 5, 1)).with_recurrence(
            Recurrence::new(date(2024, 5, 1), Frequency::Monthly).until(date(2024, 4, 1)),
        );
        let err = ExpenseService::add(&mut workspace, expense).expect_err("must fail");
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn materialize_requires_an_acting_user() {
        let mut workspace = Workspace::new("Expenses");
        let err = ExpenseService::materialize(&mut workspace, date(2024, 1, 1), None)
            .expect_err("missing user must abort before any work");
        assert!(matches!(err, ServiceError::NoActiveUser));
    }

    #[test]
    fn monthly_total_ignores_templates() {
        let mut workspace = Workspace::new("Expenses");
        ExpenseService::add(&mut workspace, sample_expense("Hosting", date(2024, 2, 1))).unwrap();
        let template = sample_expense("Retainer", date(2024, 2, 1))
            .with_recurrence(Recurrence::new(date(2024, 2, 1), Frequency::Monthly));
        ExpenseService::add(&mut workspace, template).unwrap();

        let total = ExpenseService::total_for_month(&workspace, 2024, 2);
        assert!((total - 100.0).abs() < 1e-9);
    }
}
