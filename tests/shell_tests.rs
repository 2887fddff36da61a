// Interactive shell tests (commands fed through stdin)

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use std::fs;

fn setup_test_env() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let config_dir = temp_dir.path().join(".taskpad");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("rc"),
        format!("data.location={}\nreminders=off\n", db_path.display()),
    )
    .unwrap();
    temp_dir
}

fn shell(temp_dir: &TempDir, script: &str) -> assert_cmd::assert::Assert {
    Command::cargo_bin("taskpad")
        .unwrap()
        .env("HOME", temp_dir.path())
        .current_dir(temp_dir.path())
        .arg("shell")
        .write_stdin(script)
        .assert()
}

#[test]
fn test_shell_renders_on_start_and_after_add() {
    let temp_dir = setup_test_env();

    shell(&temp_dir, "add \"Buy milk\" -s 'oat, soy'\nquit\n")
        .success()
        .stdout(predicate::str::contains("No tasks."))
        .stdout(predicate::str::contains("Created task"))
        .stdout(predicate::str::contains("2. [ ] soy"));
}

#[test]
fn test_shell_state_is_not_persisted() {
    let temp_dir = setup_test_env();

    shell(&temp_dir, "add Buy Milk\nadd Pay rent\nfilter completed\nsearch milk\ndark\n")
        .success()
        .stdout(predicate::str::contains("(filter: completed, search: \"milk\")"))
        .stdout(predicate::str::contains("Dark mode on."));

    // A new session starts with filter "all", no search and the light palette
    shell(&temp_dir, "list\n")
        .success()
        .stdout(predicate::str::contains("Buy Milk"))
        .stdout(predicate::str::contains("Pay rent"))
        .stdout(predicate::str::contains("(filter:").not());
}

#[test]
fn test_shell_mutations_persist() {
    let temp_dir = setup_test_env();
    shell(&temp_dir, "add Walk dog\n").success();

    let output = Command::cargo_bin("taskpad")
        .unwrap()
        .env("HOME", temp_dir.path())
        .args(["list", "--json"])
        .output()
        .unwrap();
    let tasks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tasks[0]["text"], "Walk dog");
}

#[test]
fn test_shell_clear_confirmation() {
    let temp_dir = setup_test_env();

    shell(&temp_dir, "add One\nclear\nno\nlist\n")
        .success()
        .stdout(predicate::str::contains("Clear all tasks? (y/n): "))
        .stdout(predicate::str::contains("One"));

    shell(&temp_dir, "clear\ny\n")
        .success()
        .stdout(predicate::str::contains("No tasks.\n\n["))
        .stdout(predicate::str::ends_with("] 0% completed\ntaskpad> \n"));
}

#[test]
fn test_shell_reports_errors_and_continues() {
    let temp_dir = setup_test_env();

    shell(&temp_dir, "done nope\nbogus\nadd Still here\n")
        .success()
        .stdout(predicate::str::contains("Error: Invalid task ID"))
        .stdout(predicate::str::contains("unrecognized subcommand"))
        .stdout(predicate::str::contains("Created task"));
}

#[test]
fn test_shell_export_import() {
    let temp_dir = setup_test_env();

    shell(&temp_dir, "add Keep\nexport saved.json\nclear -y\nimport saved.json\n")
        .success()
        .stdout(predicate::str::contains("Exported 1 tasks to saved.json"))
        .stdout(predicate::str::contains("Imported 1 tasks from saved.json"));

    assert!(temp_dir.path().join("saved.json").exists());
}
