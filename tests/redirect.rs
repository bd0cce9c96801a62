use std::fs;
use std::process::Command;

fn exec_path() -> String {
    env!("CARGO_BIN_EXE_osh").to_string()
}

fn run_in(dir: &std::path::Path, line: &str) -> std::process::Output {
    Command::new(exec_path())
        .current_dir(dir)
        .args(["-c", line])
        .output()
        .expect("failed to run")
}

#[test]
fn test_input_and_output_redirection() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("in.txt"), "from file\n").unwrap();
    fs::write(dir.path().join("out.txt"), "stale content that is longer\n").unwrap();

    let output = run_in(dir.path(), "cat < in.txt > out.txt");
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), "from file\n");
}

#[test]
fn test_output_file_created_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), "echo fresh > new.txt");
    assert!(output.status.success());

    let path = dir.path().join("new.txt");
    assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\n");
    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o077, 0, "mode {:o}", mode);
}

#[test]
fn test_missing_input_fails_only_that_stage() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), "cat < missing.txt ; echo after");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.txt"), "stderr: {}", stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "after\n");
}

#[test]
fn test_redirection_inside_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("words.txt"), "b\na\nc\n").unwrap();

    let output = run_in(dir.path(), "sort < words.txt | head -n 1 > first.txt");
    assert!(output.status.success());
    assert_eq!(fs::read_to_string(dir.path().join("first.txt")).unwrap(), "a\n");
}
