use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "cultivation-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_writes_json_report_for_each_seed() {
    let exe = env!("CARGO_BIN_EXE_cultivation-tester");
    let output_path = temp_path("json");
    let status = Command::new(exe)
        .args([
            "--seeds",
            "1,0x2a",
            "--duration",
            "120",
            "--strategy",
            "balanced",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(&output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    let runs = report["runs"].as_array().expect("runs array");
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[1]["seed"], 42);
    assert_eq!(report["failed"], 0);
    let _ = std::fs::remove_file(output_path);
}

#[test]
fn cli_persists_saves_to_disk() {
    let exe = env!("CARGO_BIN_EXE_cultivation-tester");
    let save_dir = temp_path("saves");
    let output = Command::new(exe)
        .args(["--seeds", "5", "--duration", "60", "--save-dir"])
        .arg(&save_dir)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Cultivation Automated Tester"));
    let saved = save_dir.join("seed-0000000000000005.json");
    let snapshot = std::fs::read_to_string(&saved).expect("snapshot written");
    assert!(snapshot.contains("\"qi\""));
    let _ = std::fs::remove_dir_all(save_dir);
}

#[test]
fn cli_rejects_bad_seed_and_bad_config() {
    let exe = env!("CARGO_BIN_EXE_cultivation-tester");
    let bad_seed = Command::new(exe)
        .args(["--seeds", "not-a-seed"])
        .output()
        .expect("run cli");
    assert!(!bad_seed.status.success());
    assert!(String::from_utf8_lossy(&bad_seed.stderr).contains("Unrecognized seed token"));

    let config_path = temp_path("config");
    std::fs::write(&config_path, r#"{"events": {"general_chance": 2.0}}"#).expect("write config");
    let bad_config = Command::new(exe)
        .args(["--duration", "10", "--config"])
        .arg(&config_path)
        .output()
        .expect("run cli");
    assert!(!bad_config.status.success());
    assert!(String::from_utf8_lossy(&bad_config.stderr).contains("invalid config"));
    let _ = std::fs::remove_file(config_path);
}
