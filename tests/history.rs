use std::io::Write;
use std::process::{Command, Stdio};

fn exec_path() -> String {
    env!("CARGO_BIN_EXE_osh").to_string()
}

fn interactive(input: &str) -> String {
    let mut child = Command::new(exec_path())
        .arg("--interactive")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().expect("failed to wait");
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_bang_bang_before_any_command() {
    let stdout = interactive("!!\nexit\n");
    assert!(stdout.contains("No commands in history."), "stdout: {}", stdout);
}

#[test]
fn test_bang_bang_echoes_and_reruns() {
    let stdout = interactive("echo again\n!!\n!!\n");
    // Original run, then two echoed re-runs each producing output.
    assert_eq!(stdout.matches("echo again").count(), 2, "stdout: {}", stdout);
    assert_eq!(stdout.matches("again\n").count(), 5, "stdout: {}", stdout);
}

#[test]
fn test_prompt_and_exit() {
    let stdout = interactive("exit\necho never\n");
    assert!(stdout.starts_with("osh> "), "stdout: {}", stdout);
    assert!(!stdout.contains("never"));
}

#[test]
fn test_failed_command_does_not_end_session() {
    let stdout = interactive("doesnotexist123\necho still here\n");
    assert!(stdout.contains("still here"), "stdout: {}", stdout);
}
