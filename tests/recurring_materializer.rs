mod common;

use chrono::Datelike;

use agency_core::core::services::{ExpenseService, ServiceError};
use agency_core::workspace::{
    materialize_recurring_expenses, Frequency, GENERATED_NOTE,
};
use common::{date, flat_expense, template, workspace_with_admin};

#[test]
fn monthly_template_fills_the_window_and_stops_at_the_end_date() {
    let (mut workspace, admin) = workspace_with_admin();
    workspace.add_expense(template(
        "Hosting",
        date(2024, 1, 1),
        Frequency::Monthly,
        Some(date(2024, 3, 15)),
        admin,
    ));

    let outcome = materialize_recurring_expenses(&mut workspace, date(2024, 6, 1), admin);
    assert_eq!(outcome.created, 3, "expected Jan, Feb, and Mar occurrences");
    assert_eq!(outcome.skipped, 0);

    let occurrences: Vec<_> = workspace
        .expenses
        .iter()
        .filter(|expense| expense.recurrence.is_none())
        .collect();
    let dates: Vec<_> = occurrences
        .iter()
        .map(|expense| expense.payment_date)
        .collect();
    assert_eq!(
        dates,
        vec![date(2024, 1, 1), date(2024, 2, 1), date(2024, 3, 1)],
        "all on weekdays, nothing in April or later"
    );
    for occurrence in &occurrences {
        assert_eq!(occurrence.notes.as_deref(), Some(GENERATED_NOTE));
        assert_eq!(occurrence.created_by, admin);
    }
}

#[test]
fn generated_payment_dates_avoid_weekends() {
    let (mut workspace, admin) = workspace_with_admin();
    // 2024-01-06 is a Saturday; the occurrence must land on Monday the 8th.
    workspace.add_expense(template(
        "Cleaning",
        date(2024, 1, 6),
        Frequency::Weekly,
        None,
        admin,
    ));

    materialize_recurring_expenses(&mut workspace, date(2024, 1, 6), admin);
    let occurrence = workspace
        .expenses
        .iter()
        .find(|expense| expense.recurrence.is_none())
        .expect("one occurrence");
    assert_eq!(occurrence.payment_date, date(2024, 1, 8));
}

#[test]
fn every_generated_date_is_a_weekday() {
    let (mut workspace, admin) = workspace_with_admin();
    workspace.add_expense(template(
        "Standup snacks",
        date(2024, 1, 3),
        Frequency::Weekly,
        None,
        admin,
    ));
    workspace.add_expense(template(
        "Payroll service",
        date(2024, 1, 6),
        Frequency::Biweekly,
        None,
        admin,
    ));

    materialize_recurring_expenses(&mut workspace, date(2024, 4, 30), admin);
    for occurrence in workspace
        .expenses
        .iter()
        .filter(|expense| expense.recurrence.is_none())
    {
        let weekday = occurrence.payment_date.weekday().num_days_from_monday();
        assert!(
            weekday < 5,
            "{} fell on a weekend",
            occurrence.payment_date
        );
    }
}

#[test]
fn snapped_date_past_the_end_date_stops_the_template() {
    let (mut workspace, admin) = workspace_with_admin();
    // Start and end on Saturday 2024-01-06: snapping moves the candidate to
    // Monday, which is past the end date, so nothing may be created.
    workspace.add_expense(template(
        "One-off retainer",
        date(2024, 1, 6),
        Frequency::Weekly,
        Some(date(2024, 1, 6)),
        admin,
    ));

    let outcome = materialize_recurring_expenses(&mut workspace, date(2024, 2, 1), admin);
    assert_eq!(outcome.created, 0);
    assert_eq!(outcome.skipped, 0);
    assert!(workspace
        .expenses
        .iter()
        .all(|expense| expense.recurrence.is_some()));
}

#[test]
fn second_pass_is_idempotent() {
    let (mut workspace, admin) = workspace_with_admin();
    workspace.add_expense(template(
        "Hosting",
        date(2024, 1, 1),
        Frequency::Monthly,
        None,
        admin,
    ));

    let first = materialize_recurring_expenses(&mut workspace, date(2024, 3, 20), admin);
    assert_eq!(first.created, 3);

    let second = materialize_recurring_expenses(&mut workspace, date(2024, 3, 20), admin);
    assert_eq!(second.created, 0, "no new rows on an unchanged workspace");
    assert_eq!(second.skipped, first.created);
}

#[test]
fn pre_existing_occurrence_is_skipped_not_recreated() {
    let (mut workspace, admin) = workspace_with_admin();
    workspace.add_expense(flat_expense("Hosting", date(2024, 2, 1), admin));
    workspace.add_expense(template(
        "Hosting",
        date(2024, 1, 1),
        Frequency::Monthly,
        Some(date(2024, 3, 15)),
        admin,
    ));

    let outcome = materialize_recurring_expenses(&mut workspace, date(2024, 6, 1), admin);
    assert_eq!(outcome.created, 2, "January and March only");
    assert_eq!(outcome.skipped, 1, "February already present");

    let february: Vec<_> = workspace
        .expenses
        .iter()
        .filter(|expense| {
            expense.recurrence.is_none() && expense.payment_date == date(2024, 2, 1)
        })
        .collect();
    assert_eq!(february.len(), 1);
}

#[test]
fn occurrence_count_matches_the_step_window() {
    let (mut workspace, admin) = workspace_with_admin();
    workspace.add_expense(template(
        "Payroll service",
        date(2024, 1, 1),
        Frequency::Biweekly,
        None,
        admin,
    ));

    // Steps: Jan 1, 15, 29, Feb 12, 26 -- five raw step dates on or before
    // today, all weekdays already.
    let outcome = materialize_recurring_expenses(&mut workspace, date(2024, 3, 1), admin);
    assert_eq!(outcome.created, 5);
}

#[test]
fn templates_without_eligible_steps_produce_zero_counts() {
    let (mut workspace, admin) = workspace_with_admin();
    workspace.add_expense(template(
        "Future retainer",
        date(2030, 1, 1),
        Frequency::Monthly,
        None,
        admin,
    ));

    let outcome = materialize_recurring_expenses(&mut workspace, date(2024, 1, 1), admin);
    assert_eq!(outcome.created, 0);
    assert_eq!(outcome.skipped, 0);
}

#[test]
fn service_entry_point_requires_an_acting_user() {
    let (mut workspace, _admin) = workspace_with_admin();
    let err = ExpenseService::materialize(&mut workspace, date(2024, 1, 1), None)
        .expect_err("must refuse to run without a user");
    assert!(matches!(err, ServiceError::NoActiveUser));
}

#[test]
fn empty_workspace_returns_zero_counts_through_the_service() {
    let (mut workspace, admin) = workspace_with_admin();
    let outcome =
        ExpenseService::materialize(&mut workspace, date(2024, 1, 1), Some(admin)).unwrap();
    assert_eq!(outcome.created, 0);
    assert_eq!(outcome.skipped, 0);
}
