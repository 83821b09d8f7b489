mod support;

use predicates::str::contains;
use support::TestHome;

#[test]
fn duplicate_add_is_rejected_with_state_unchanged() {
    let home = TestHome::new();

    home.cmd()
        .args(["add", "Report", "--due", "2099-03-12"])
        .assert()
        .success();

    home.cmd()
        .args(["add", "Report", "--due", "2099-03-12"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("already exists"));

    home.cmd()
        .args(["list", "deadline"])
        .assert()
        .success()
        .stdout(contains("deadline (1):"));
}

#[test]
fn expired_add_is_rejected() {
    let home = TestHome::new();
    home.cmd()
        .args(["add", "Late", "--due", "2000-01-01"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("already past"));

    home.cmd()
        .args(["list", "pending"])
        .assert()
        .success()
        .stdout(contains("no tasks"));
}

#[test]
fn done_moves_a_task_to_completed() {
    let home = TestHome::new();
    home.cmd().args(["add", "Buy milk"]).assert().success();

    home.cmd()
        .args(["done", "Buy milk"])
        .assert()
        .success()
        .stdout(contains("Completed 'Buy milk'"));

    home.cmd()
        .args(["list", "completed"])
        .assert()
        .success()
        .stdout(contains("Buy milk"));

    home.cmd()
        .args(["list", "pending"])
        .assert()
        .success()
        .stdout(contains("no tasks"));
}

#[test]
fn delete_accepts_one_based_indexes() {
    let home = TestHome::new();
    home.cmd().args(["add", "Buy milk"]).assert().success();
    home.cmd()
        .args(["add", "Report", "--due", "2099-03-12"])
        .assert()
        .success();

    // Presented pending order puts the deadline first; index 2 is the
    // floating task.
    home.cmd()
        .args(["delete", "2"])
        .assert()
        .success()
        .stdout(contains("Deleted 'Buy milk'"));

    home.cmd()
        .args(["delete", "9"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("No task at position 9"));

    home.cmd()
        .args(["delete", "0"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("indexes start at 1"));
}

#[test]
fn delete_by_missing_name_reports_name_not_found() {
    let home = TestHome::new();
    home.cmd()
        .args(["delete", "Ghost"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("No task named 'Ghost'"));
}

#[test]
fn update_renames_and_reschedules() {
    let home = TestHome::new();
    home.cmd()
        .args(["add", "Report", "--due", "2099-03-12"])
        .assert()
        .success();

    home.cmd()
        .args(["update", "Report", "--name", "Review", "--floating"])
        .assert()
        .success()
        .stdout(contains("Updated 'Review'"));

    home.cmd()
        .args(["list", "general"])
        .assert()
        .success()
        .stdout(contains("Review"));

    home.cmd()
        .args(["list", "deadline"])
        .assert()
        .success()
        .stdout(contains("no tasks"));
}

#[test]
fn update_of_completed_view_is_rejected() {
    let home = TestHome::new();
    home.cmd().args(["add", "Buy milk"]).assert().success();
    home.cmd().args(["done", "Buy milk"]).assert().success();

    home.cmd()
        .args(["update", "1", "--view", "completed", "--name", "X"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("cannot be edited"));
}

#[test]
fn search_reports_matches_without_failing_on_none() {
    let home = TestHome::new();
    home.cmd()
        .args(["add", "Report", "--due", "2099-03-12"])
        .assert()
        .success();
    home.cmd().args(["add", "Meeting notes"]).assert().success();

    home.cmd()
        .args(["search", "rep"])
        .assert()
        .success()
        .stdout(contains("1 match"));

    home.cmd()
        .args(["search", "zzz"])
        .assert()
        .success()
        .stdout(contains("No matches"));

    home.cmd()
        .args(["--json", "search", "rep"])
        .assert()
        .success()
        .stdout(contains("\"action\""))
        .stdout(contains("Report"));
}

#[test]
fn clear_requires_confirmation() {
    let home = TestHome::new();
    home.cmd().args(["add", "Buy milk"]).assert().success();

    home.cmd()
        .arg("clear")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("--yes"));

    home.cmd()
        .args(["clear", "--yes"])
        .assert()
        .success()
        .stdout(contains("Cleared"));

    home.cmd()
        .args(["list", "pending"])
        .assert()
        .success()
        .stdout(contains("no tasks"));
}

#[test]
fn save_dir_switch_is_remembered_in_config() {
    let home = TestHome::new();
    let first = home.path().join("first");
    let second = home.path().join("second");

    home.cmd_config_only()
        .env("TRAK_SAVE_DIR", &first)
        .args(["add", "Buy milk"])
        .assert()
        .success();

    home.cmd_config_only()
        .env("TRAK_SAVE_DIR", &first)
        .args(["save-dir"])
        .arg(&second)
        .assert()
        .success()
        .stdout(contains("Now tracking tasks in"));

    let config = home.read_file("trak.toml");
    assert!(config.contains("save_dir"));
    assert!(config.contains("second"));

    // Without the env override, later invocations resolve through the
    // rewritten config and see the fresh (empty) directory.
    home.cmd_config_only()
        .args(["list", "pending"])
        .assert()
        .success()
        .stdout(contains("no tasks"));
}
