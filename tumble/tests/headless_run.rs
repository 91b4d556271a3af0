use std::process::Command;

fn tumble() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tumble"));
    cmd.env("RUST_LOG", "info").env("NO_COLOR", "1");
    cmd
}

#[test]
fn headless_run_simulates_and_exits() {
    let output = tumble()
        .args(["--headless", "--frames", "120", "--seed", "7"])
        .output()
        .expect("failed to launch tumble");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout:\n{stdout}");
    assert!(stdout.contains("playground ready"), "stdout:\n{stdout}");
    assert!(stdout.contains("headless run finished"), "stdout:\n{stdout}");
}

#[test]
fn a_partial_config_file_is_accepted() {
    let dir = std::env::temp_dir().join(format!("tumble-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("playground.json");
    std::fs::write(
        &path,
        r#"{ "restitution": 0.2, "initial_objects": [ { "kind": "sphere", "radius": 0.3, "position": [0, 2, 0] } ] }"#,
    )
    .unwrap();

    let output = tumble()
        .args(["--headless", "--frames", "10", "--config"])
        .arg(&path)
        .output()
        .expect("failed to launch tumble");

    std::fs::remove_dir_all(&dir).ok();
    assert!(output.status.success());
}

#[test]
fn a_missing_config_file_fails() {
    let output = tumble()
        .args(["--headless", "--config", "no/such/file.json"])
        .output()
        .expect("failed to launch tumble");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no/such/file.json"), "stderr:\n{stderr}");
}
