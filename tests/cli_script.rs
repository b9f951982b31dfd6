use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn script_command(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("agency_cli").expect("binary builds");
    cmd.env("AGENCY_CORE_CLI_SCRIPT", "1")
        .env("AGENCY_CORE_HOME", temp.path());
    cmd
}

#[test]
fn full_session_creates_and_materializes_expenses() {
    let temp = TempDir::new().unwrap();
    script_command(&temp)
        .write_stdin(
            [
                "workspace new Demo",
                "user add root admin",
                "user login root",
                "client add Acme Industries",
                "task add Prepare onboarding",
                "expense recurring Hosting Infra 2024-01-01 transfer 120 1 monthly 2024-03-15",
                "expense materialize 2024-06-01",
                "expense materialize 2024-06-01",
                "expense total 2024-02",
                "workspace save demo",
                "exit",
            ]
            .join("\n"),
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("New workspace `Demo` created."))
        .stdout(predicate::str::contains("Logged in as `root`."))
        .stdout(predicate::str::contains("Client `Acme Industries` added."))
        .stdout(predicate::str::contains(
            "Recurring template `Hosting` added (Monthly).",
        ))
        .stdout(predicate::str::contains(
            "Materialized 3 occurrence(s), 0 skipped.",
        ))
        .stdout(predicate::str::contains("No new occurrences (3 skipped)."))
        .stdout(predicate::str::contains("Total for 2024-02: USD 120.00"))
        .stdout(predicate::str::contains("Workspace `demo` saved to"));
}

#[test]
fn materialize_without_login_is_reported_not_fatal() {
    let temp = TempDir::new().unwrap();
    script_command(&temp)
        .write_stdin(
            [
                "workspace new Demo",
                "expense materialize 2024-06-01",
                "exit",
            ]
            .join("\n"),
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("No active user"));
}

#[test]
fn saved_workspace_survives_a_new_session() {
    let temp = TempDir::new().unwrap();
    script_command(&temp)
        .write_stdin(
            [
                "workspace new Demo",
                "user add root admin",
                "user login root",
                "expense add Chairs Office 2024-02-05 card 350 2",
                "workspace save demo",
                "exit",
            ]
            .join("\n"),
        )
        .assert()
        .success();

    script_command(&temp)
        .write_stdin(["workspace load demo", "expense list", "exit"].join("\n"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Workspace `demo` loaded from"))
        .stdout(predicate::str::contains("Chairs"));
}

#[test]
fn config_backup_and_restore_roundtrip() {
    let temp = TempDir::new().unwrap();
    script_command(&temp)
        .write_stdin(
            [
                "config set currency BRL",
                "config backup before-change",
                "config set currency EUR",
                "config restore 1",
                "config show",
                "exit",
            ]
            .join("\n"),
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration backup saved:"))
        .stdout(predicate::str::contains("Configuration restored from"))
        .stdout(predicate::str::contains("Currency: BRL"));
}

#[test]
fn unknown_commands_get_a_suggestion() {
    let temp = TempDir::new().unwrap();
    script_command(&temp)
        .write_stdin("workspce new Demo\nexit\n".to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown command `workspce`"))
        .stdout(predicate::str::contains("Suggestion: `workspace`?"));
}

#[test]
fn commands_requiring_a_workspace_fail_gracefully() {
    let temp = TempDir::new().unwrap();
    script_command(&temp)
        .write_stdin("client list\nexit\n".to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("Workspace not loaded."));
}
