mod common;

use agency_core::core::services::{
    ClientService, ExpenseService, ServiceError, TaskService, UserService,
};
use agency_core::workspace::{Client, Task, TaskStatus, User, UserRole};
use common::{date, flat_expense, workspace_with_admin};

#[test]
fn client_lifecycle_with_linked_tasks() {
    let (mut workspace, admin) = workspace_with_admin();
    let client_id = ClientService::add(&mut workspace, Client::new("Acme", admin)).unwrap();

    let mut task = Task::new("Quarterly report", admin);
    task.client_id = Some(client_id);
    let task_id = TaskService::add(&mut workspace, task).unwrap();
    TaskService::set_status(&mut workspace, task_id, TaskStatus::InProgress).unwrap();

    let removed = ClientService::remove(&mut workspace, client_id).unwrap();
    assert_eq!(removed.name, "Acme");
    let task = workspace.task(task_id).unwrap();
    assert_eq!(task.client_id, None, "link cleared, task kept");
    assert_eq!(task.status, TaskStatus::InProgress);
}

#[test]
fn task_checklist_progress_via_services() {
    let (mut workspace, admin) = workspace_with_admin();
    let task_id = TaskService::add(&mut workspace, Task::new("Onboarding", admin)).unwrap();
    let first = TaskService::add_checklist_item(&mut workspace, task_id, "Create account").unwrap();
    TaskService::add_checklist_item(&mut workspace, task_id, "Grant access").unwrap();
    TaskService::toggle_checklist_item(&mut workspace, task_id, first).unwrap();

    let task = workspace.task(task_id).unwrap();
    assert_eq!(task.checklist_progress(), (1, 2));
}

#[test]
fn expense_monthly_total_sums_occurrences_only() {
    let (mut workspace, admin) = workspace_with_admin();
    ExpenseService::add(&mut workspace, flat_expense("Hosting", date(2024, 2, 1), admin)).unwrap();
    ExpenseService::add(&mut workspace, flat_expense("Licenses", date(2024, 2, 20), admin))
        .unwrap();
    ExpenseService::add(&mut workspace, flat_expense("Rent", date(2024, 3, 1), admin)).unwrap();

    let total = ExpenseService::total_for_month(&workspace, 2024, 2);
    assert!((total - 200.0).abs() < 1e-9);
}

#[test]
fn admin_actions_are_gated_by_role() {
    let (mut workspace, admin) = workspace_with_admin();
    let member =
        UserService::register(&mut workspace, User::new("ana", UserRole::Member)).unwrap();

    // A member cannot run the privileged reset.
    let err = UserService::reset_password(&mut workspace, member, admin)
        .expect_err("member reset must be rejected");
    assert!(matches!(err, ServiceError::NotAuthorized(_)));

    // The admin can, and the flag sticks.
    UserService::reset_password(&mut workspace, admin, member).unwrap();
    assert!(workspace.user(member).unwrap().must_reset_password);

    // Privileged deletion removes the account outright.
    UserService::remove(&mut workspace, admin, member).unwrap();
    assert!(workspace.user(member).is_none());
}

#[test]
fn duplicate_user_names_are_rejected() {
    let (mut workspace, _admin) = workspace_with_admin();
    let err = UserService::register(&mut workspace, User::new("ROOT", UserRole::Member))
        .expect_err("case-insensitive duplicate must fail");
    assert!(matches!(err, ServiceError::Invalid(_)));
}
