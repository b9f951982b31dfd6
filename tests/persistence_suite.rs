mod common;

use tempfile::TempDir;

use agency_core::core::workspace_manager::WorkspaceManager;
use agency_core::storage::{JsonStorage, StorageBackend};
use agency_core::workspace::{Frequency, Workspace};
use common::{date, flat_expense, template, workspace_with_admin};

fn storage_in(temp: &TempDir) -> JsonStorage {
    JsonStorage::new(Some(temp.path().to_path_buf()), Some(3)).expect("json storage")
}

#[test]
fn save_and_load_preserve_the_document() {
    let temp = TempDir::new().unwrap();
    let storage = storage_in(&temp);

    let (mut workspace, admin) = workspace_with_admin();
    workspace.add_expense(template(
        "Hosting",
        date(2024, 1, 1),
        Frequency::Monthly,
        Some(date(2024, 12, 31)),
        admin,
    ));
    workspace.add_expense(flat_expense("Office chairs", date(2024, 2, 5), admin));

    storage.save(&workspace, "agency").unwrap();
    let loaded = storage.load("agency").unwrap();

    let original = serde_json::to_value(&workspace).unwrap();
    let roundtripped = serde_json::to_value(&loaded).unwrap();
    assert_eq!(original, roundtripped);
}

#[test]
fn list_workspaces_reports_saved_names() {
    let temp = TempDir::new().unwrap();
    let storage = storage_in(&temp);
    storage.save(&Workspace::new("One"), "alpha").unwrap();
    storage.save(&Workspace::new("Two"), "beta").unwrap();

    let names = storage.list_workspaces().unwrap();
    assert_eq!(names, vec!["alpha".to_string(), "beta".to_string()]);
}

#[test]
fn backup_then_restore_recovers_earlier_state() {
    let temp = TempDir::new().unwrap();
    let storage = storage_in(&temp);

    let (mut workspace, admin) = workspace_with_admin();
    storage.save(&workspace, "agency").unwrap();
    storage.backup(&workspace, "agency", Some("before")).unwrap();

    workspace.add_expense(flat_expense("Mistake", date(2024, 3, 1), admin));
    storage.save(&workspace, "agency").unwrap();

    let backups = storage.list_backups("agency").unwrap();
    assert!(!backups.is_empty());
    let restored = storage.restore("agency", &backups[backups.len() - 1]).unwrap();
    assert!(restored.expenses.is_empty(), "restored the pre-mistake state");
}

#[test]
fn manager_surfaces_integrity_warnings_on_load() {
    let temp = TempDir::new().unwrap();
    let storage = storage_in(&temp);

    let (mut workspace, admin) = workspace_with_admin();
    // Two identical occurrences violate the (name, payment date) rule; a
    // hand-edited file is the only way to get here.
    workspace.add_expense(flat_expense("Hosting", date(2024, 2, 1), admin));
    workspace.add_expense(flat_expense("Hosting", date(2024, 2, 1), admin));
    storage.save(&workspace, "agency").unwrap();

    let mut manager = WorkspaceManager::new(Box::new(storage));
    let report = manager.load("agency").unwrap();
    assert!(
        report
            .warnings
            .iter()
            .any(|warning| warning.contains("duplicate occurrence")),
        "warnings: {:?}",
        report.warnings
    );
}

#[test]
fn manager_rejects_newer_schema_versions() {
    let temp = TempDir::new().unwrap();
    let storage = storage_in(&temp);

    let mut workspace = Workspace::new("Future");
    workspace.schema_version = u8::MAX;
    storage.save(&workspace, "future").unwrap();

    let mut manager = WorkspaceManager::new(Box::new(storage));
    let err = manager.load("future").expect_err("newer schema must fail");
    assert!(err.to_string().contains("schema"));
}

#[test]
fn save_remembers_the_last_workspace_name() {
    let temp = TempDir::new().unwrap();
    let storage = storage_in(&temp);
    storage.save(&Workspace::new("Agency"), "Main Agency").unwrap();
    assert_eq!(
        storage.last_workspace().unwrap().as_deref(),
        Some("main_agency")
    );
}
