mod common;

use common::cli::{IbWorkspace, create_issue, extract_json_payload, run_ib};
use serde_json::Value;

fn error_code(stderr: &str) -> String {
    let payload: Value = serde_json::from_str(&extract_json_payload(stderr)).expect("json error");
    payload["error"]["code"].as_str().unwrap_or_default().to_string()
}

#[test]
fn e2e_uninitialized_workspace() {
    let _log = common::test_log("e2e_uninitialized_workspace");
    let workspace = IbWorkspace::new();

    let list = run_ib(&workspace, ["list"], "list_uninitialized");
    assert_eq!(list.code(), Some(2));
    assert_eq!(error_code(&list.stderr), "NOT_INITIALIZED");
}

#[test]
fn e2e_init_twice() {
    let workspace = IbWorkspace::new();
    assert!(run_ib(&workspace, ["init"], "init").status.success());

    let again = run_ib(&workspace, ["init"], "init_again");
    assert_eq!(again.code(), Some(2));
    assert_eq!(error_code(&again.stderr), "ALREADY_INITIALIZED");

    let forced = run_ib(&workspace, ["init", "--force"], "init_force");
    assert!(forced.status.success(), "{}", forced.stderr);
}

#[test]
fn e2e_create_requires_login() {
    let _log = common::test_log("e2e_create_requires_login");
    let workspace = IbWorkspace::new();
    assert!(run_ib(&workspace, ["init"], "init").status.success());

    let create = run_ib(
        &workspace,
        ["create", "Bug", "--description", "Details"],
        "create_anonymous",
    );
    assert_eq!(create.code(), Some(5));
    assert!(
        create.stderr.contains("You must be logged in to create an issue"),
        "{}",
        create.stderr
    );

    let list = run_ib(&workspace, ["list", "--json", "--actor", "alice"], "list");
    let issues: Vec<Value> = serde_json::from_str(&extract_json_payload(&list.stdout)).unwrap();
    assert!(issues.is_empty());
}

#[test]
fn e2e_logged_out_user_cannot_read_or_update() {
    let _log = common::test_log("e2e_logged_out_user_cannot_read_or_update");
    let workspace = IbWorkspace::logged_in("alice@example.com");
    let id = create_issue(&workspace, "Login bug", "Button does nothing", "create");
    assert!(run_ib(&workspace, ["logout"], "logout").status.success());

    let whoami = run_ib(&workspace, ["whoami"], "whoami");
    assert!(whoami.status.success());
    assert_eq!(whoami.stdout.trim(), "Not logged in");

    let list = run_ib(&workspace, ["list"], "list_anonymous");
    assert_eq!(list.code(), Some(5), "{}", list.stdout);
    assert_eq!(error_code(&list.stderr), "NOT_LOGGED_IN");
    assert!(!list.stdout.contains(&id));

    let status = run_ib(&workspace, ["status", &id, "in-progress"], "status_anonymous");
    assert_eq!(status.code(), Some(5), "{}", status.stdout);
    assert_eq!(error_code(&status.stderr), "NOT_LOGGED_IN");

    let show = run_ib(&workspace, ["show", &id], "show_anonymous");
    assert_eq!(show.code(), Some(5));

    let similar = run_ib(
        &workspace,
        ["similar", "--title", "login bug", "--description", "button"],
        "similar_anonymous",
    );
    assert_eq!(similar.code(), Some(5));

    let relogin = run_ib(&workspace, ["login", "alice@example.com"], "relogin");
    assert!(relogin.status.success());
    let check = run_ib(&workspace, ["show", &id, "--json"], "show_after_relogin");
    let issue: Value = serde_json::from_str(&extract_json_payload(&check.stdout)).unwrap();
    assert_eq!(issue["status"], "Open");
}

#[test]
fn e2e_open_to_done_rejected() {
    let _log = common::test_log("e2e_open_to_done_rejected");
    let workspace = IbWorkspace::logged_in("alice@example.com");
    let id = create_issue(&workspace, "Bug", "Details", "create");

    let done = run_ib(&workspace, ["status", &id, "done"], "status_done");
    assert_eq!(done.code(), Some(4));
    assert!(
        done.stderr.contains("Cannot move issue directly from Open to Done"),
        "{}",
        done.stderr
    );
    assert_eq!(error_code(&done.stderr), "TRANSITION_REJECTED");

    let show = run_ib(&workspace, ["show", &id, "--json"], "show");
    let issue: Value = serde_json::from_str(&extract_json_payload(&show.stdout)).unwrap();
    assert_eq!(issue["status"], "Open");
}

#[test]
fn e2e_validation_errors() {
    let workspace = IbWorkspace::logged_in("alice@example.com");

    let blank = run_ib(
        &workspace,
        ["create", "   ", "--description", "Details"],
        "create_blank_title",
    );
    assert_eq!(blank.code(), Some(4));
    assert_eq!(error_code(&blank.stderr), "VALIDATION_FAILED");

    let bad_priority = run_ib(
        &workspace,
        ["create", "Bug", "-d", "Details", "-p", "urgent"],
        "create_bad_priority",
    );
    assert_eq!(bad_priority.code(), Some(4));
    assert_eq!(error_code(&bad_priority.stderr), "INVALID_PRIORITY");

    let bad_status = run_ib(&workspace, ["list", "--status", "closed"], "list_bad_status");
    assert_eq!(bad_status.code(), Some(4));
    assert_eq!(error_code(&bad_status.stderr), "INVALID_STATUS");
}

#[test]
fn e2e_unknown_issue() {
    let workspace = IbWorkspace::logged_in("alice@example.com");
    create_issue(&workspace, "Bug", "Details", "create");

    let show = run_ib(&workspace, ["show", "ib-doesnotexist"], "show_missing");
    assert_eq!(show.code(), Some(3));
    assert_eq!(error_code(&show.stderr), "ISSUE_NOT_FOUND");

    let status = run_ib(&workspace, ["status", "ib-doesnotexist", "done"], "status_missing");
    assert_eq!(status.code(), Some(3));
}

#[test]
fn e2e_unknown_issue_suggests_close_ids() {
    let _log = common::test_log("e2e_unknown_issue_suggests_close_ids");
    let workspace = IbWorkspace::logged_in("alice@example.com");
    let id = create_issue(&workspace, "Bug", "Details", "create");
    let typo = format!("{id}x");

    let show = run_ib(&workspace, ["show", &typo], "show_typo");
    assert_eq!(show.code(), Some(3));
    assert!(
        show.stderr.contains(&format!("Did you mean '{id}'?")),
        "{}",
        show.stderr
    );
    let payload: Value = serde_json::from_str(&extract_json_payload(&show.stderr)).unwrap();
    assert_eq!(payload["error"]["context"]["similar_ids"][0], id.as_str());

    let status = run_ib(&workspace, ["status", &typo, "in-progress"], "status_typo");
    assert_eq!(status.code(), Some(3));
    assert!(status.stderr.contains("Did you mean"), "{}", status.stderr);
}

#[test]
fn e2e_draft_requires_login() {
    let workspace = IbWorkspace::new();
    assert!(run_ib(&workspace, ["init"], "init").status.success());

    let draft = common::cli::run_ib_with_stdin(
        &workspace,
        ["draft"],
        "title Crash on save\ndescription Editor crashes\nsubmit\nquit\n",
        "draft_anonymous",
    );
    assert_eq!(draft.code(), Some(5));
    assert!(
        draft.stderr.contains("You must be logged in to draft an issue"),
        "{}",
        draft.stderr
    );
    assert!(!draft.stdout.contains("Created "));
}

#[test]
fn e2e_error_envelope_has_code_and_hint() {
    let workspace = IbWorkspace::new();
    assert!(run_ib(&workspace, ["init"], "init").status.success());

    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("ib"))
        .current_dir(&workspace.root)
        .env_remove("IB_ACTOR")
        .env_remove("ISSUES_DIR")
        .env("HOME", &workspace.root)
        .args(["create", "Bug", "-d", "Details"])
        .assert()
        .failure()
        .code(5)
        .stdout(predicates::str::is_empty())
        .stderr(predicates::str::contains("NOT_LOGGED_IN"))
        .stderr(predicates::str::contains("Run: ib login <email>"));
}
