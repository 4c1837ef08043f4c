#![allow(dead_code)]

use assert_cmd::Command;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tempfile::TempDir;

#[derive(Debug)]
pub struct IbRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
    pub duration: Duration,
    pub log_path: PathBuf,
}

impl IbRun {
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }
}

pub struct IbWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub log_dir: PathBuf,
}

impl IbWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        let log_dir = root.join("logs");
        fs::create_dir_all(&log_dir).expect("log dir");
        Self {
            temp_dir,
            root,
            log_dir,
        }
    }

    /// A workspace that has run `ib init` and `ib login`.
    pub fn logged_in(email: &str) -> Self {
        let workspace = Self::new();
        let init = run_ib(&workspace, ["init"], "init");
        assert!(init.status.success(), "init failed: {}", init.stderr);
        let login = run_ib(&workspace, ["login", email], "login");
        assert!(login.status.success(), "login failed: {}", login.stderr);
        workspace
    }
}

pub fn run_ib<I, S>(workspace: &IbWorkspace, args: I, label: &str) -> IbRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_ib_with_stdin(workspace, args, "", label)
}

pub fn run_ib_with_stdin<I, S>(workspace: &IbWorkspace, args: I, stdin: &str, label: &str) -> IbRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ib"));
    cmd.current_dir(&workspace.root);
    cmd.args(args);
    cmd.env_remove("IB_ACTOR");
    cmd.env_remove("ISSUES_DIR");
    cmd.env("NO_COLOR", "1");
    cmd.env("RUST_LOG", "issue_board=debug");
    cmd.env("HOME", &workspace.root);
    cmd.write_stdin(stdin.to_string());

    let start = Instant::now();
    let output = cmd.output().expect("run ib");
    let duration = start.elapsed();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let log_path = workspace.log_dir.join(format!("{label}.log"));
    let log_body = format!(
        "label: {label}\nduration: {duration:?}\nstatus: {}\nargs: {:?}\n\nstdout:\n{stdout}\n\nstderr:\n{stderr}\n",
        output.status,
        cmd.get_args().collect::<Vec<_>>(),
    );
    fs::write(&log_path, log_body).expect("write log");

    IbRun {
        stdout,
        stderr,
        status: output.status,
        duration,
        log_path,
    }
}

/// Pull the id out of a `Created <id>: <title>` line.
pub fn parse_created_id(stdout: &str) -> String {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("Created "))
        .and_then(|rest| rest.split(':').next())
        .unwrap_or("")
        .trim()
        .to_string()
}

pub fn create_issue(workspace: &IbWorkspace, title: &str, description: &str, label: &str) -> String {
    let run = run_ib(
        workspace,
        ["create", title, "--description", description, "--no-check"],
        label,
    );
    assert!(run.status.success(), "create failed: {}", run.stderr);
    let id = parse_created_id(&run.stdout);
    assert!(!id.is_empty(), "no id in: {}", run.stdout);
    id
}

pub fn extract_json_payload(stdout: &str) -> String {
    let lines: Vec<&str> = stdout.lines().collect();
    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            return lines[idx..].join("\n").trim().to_string();
        }
    }
    stdout.trim().to_string()
}
