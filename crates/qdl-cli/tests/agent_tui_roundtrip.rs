use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

fn demos_root() -> PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("demos")
        .join("dialogues")
}

fn demo(name: &str) -> String {
    demos_root()
        .join(name)
        .to_str()
        .expect("path should be utf-8")
        .to_string()
}

fn run_agent(args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_qdl-cli");
    Command::new(bin)
        .arg("agent")
        .args(args)
        .output()
        .expect("agent command should run")
}

fn parse_state_out(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("STATE_OUT:").map(|v| v.to_string()))
        .filter(|value| value != "NONE")
}

fn run_tui(source: &str, extra: &[&str], input: &[u8]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_qdl-cli");
    let state_file = std::env::temp_dir().join("qdl-cli-tui-state.json");
    let mut child = Command::new(bin)
        .arg("tui")
        .arg("--source")
        .arg(source)
        .arg("--state-file")
        .arg(&state_file)
        .args(extra)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("tui should spawn");

    {
        let stdin = child.stdin.as_mut().expect("stdin should be piped");
        stdin.write_all(input).expect("should send key lines");
    }

    child.wait_with_output().expect("tui should finish")
}

#[test]
fn agent_choice_flow_reaches_end() {
    let state_1 = std::env::temp_dir().join("qdl-cli-agent-choice-1.json");
    let state_2 = std::env::temp_dir().join("qdl-cli-agent-choice-2.json");

    let start = run_agent(&[
        "start",
        "--source",
        &demo("greeting.qdl"),
        "--state-out",
        state_1.to_str().expect("path should be utf-8"),
    ]);
    assert!(start.status.success(), "start failed");
    let start_stdout = String::from_utf8_lossy(&start.stdout);
    assert!(start_stdout.contains("RESULT:OK"));
    assert!(start_stdout.contains("EVENT:BRANCH"));
    assert!(start_stdout.contains("MESSAGE_JSON:\"Hello.\""));
    assert!(start_stdout.contains("CHOICE:0|\"Bye\""));
    assert!(parse_state_out(&start_stdout).is_some());

    let choose = run_agent(&[
        "choose",
        "--state-in",
        state_1.to_str().expect("path should be utf-8"),
        "--choice",
        "0",
        "--state-out",
        state_2.to_str().expect("path should be utf-8"),
    ]);
    assert!(choose.status.success(), "choose failed");
    let choose_stdout = String::from_utf8_lossy(&choose.stdout);
    assert!(choose_stdout.contains("RESULT:OK"));
    assert!(choose_stdout.contains("EVENT:END"));
    assert!(choose_stdout.contains("STATE_OUT:NONE"));
}

#[test]
fn agent_forwards_external_commands() {
    let state_1 = std::env::temp_dir().join("qdl-cli-agent-external-1.json");
    let state_2 = std::env::temp_dir().join("qdl-cli-agent-external-2.json");
    let state_3 = std::env::temp_dir().join("qdl-cli-agent-external-3.json");

    let start = run_agent(&[
        "start",
        "--source",
        &demo("tavern.qdl"),
        "--host-command",
        "give",
        "--state-out",
        state_1.to_str().expect("path should be utf-8"),
    ]);
    assert!(start.status.success(), "start failed");

    let choose = run_agent(&[
        "choose",
        "--state-in",
        state_1.to_str().expect("path should be utf-8"),
        "--choice",
        "0",
        "--state-out",
        state_2.to_str().expect("path should be utf-8"),
    ]);
    let stdout = String::from_utf8_lossy(&choose.stdout);
    assert!(choose.status.success(), "choose failed: {}", stdout);
    assert!(stdout.contains("EXTERNAL:give|\"ale\""));
    assert!(stdout.contains("HEADER_JSON:\"ale\""));

    let again = run_agent(&[
        "choose",
        "--state-in",
        state_2.to_str().expect("path should be utf-8"),
        "--choice",
        "0",
        "--state-out",
        state_3.to_str().expect("path should be utf-8"),
    ]);
    let stdout = String::from_utf8_lossy(&again.stdout);
    assert!(!stdout.contains("EXTERNAL:"), "slot resets every turn");
    assert!(stdout.contains("EVENT:END"));
}

#[test]
fn agent_reports_compile_errors_with_location() {
    let source = std::env::temp_dir().join("qdl-cli-agent-broken.qdl");
    std::fs::write(&source, "[T]\n{\"start\" \"Hi.\" \"Bye\" (exit;)}").expect("write source");
    let state = std::env::temp_dir().join("qdl-cli-agent-broken.json");

    let output = run_agent(&[
        "start",
        "--source",
        source.to_str().expect("path should be utf-8"),
        "--state-out",
        state.to_str().expect("path should be utf-8"),
    ]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("RESULT:ERROR"));
    assert!(stdout.contains("ERROR_CODE:QDL_BUILD_UNRECOGNIZED_TOKEN"));
    assert!(stdout.contains("ERROR_AT:2:"));
}

#[test]
fn tui_line_mode_plays_greeting_to_end() {
    let output = run_tui(&demo("greeting.qdl"), &[], b"\n:quit\n");
    assert!(output.status.success(), "tui should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Hello."));
    assert!(stdout.contains("[END]"));
}

#[test]
fn tui_navigation_and_help_paths_are_exercised() {
    let output = run_tui(
        &demo("tavern.qdl"),
        &["--host-command", "give"],
        b":help\nj\nj\nj\nk\n\n",
    );
    assert!(output.status.success(), "tui should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("commands:"));
    assert!(stdout.contains("> [2] Nothing, thanks."));
    assert!(stdout.contains("Wolves on the north road, they say."));
}
