use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// The binary with every home and key variable pinned to `root`.
fn intake(root: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("intake");
    cmd.current_dir(root)
        .env("HOME", root)
        .env("INTAKE_HOME", root.join("intake"))
        .env("INTAKE_CONFIG_PATH", root.join("intake/intake.toml"))
        .env_remove("INTAKE_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("INTAKE_BASE_URL")
        .env_remove("INTAKE_VERBOSE");
    cmd
}

fn stdout_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("stdout is JSON")
}

#[test]
fn check_trivial_flags_mic_checks_only() {
    let tmp = tempdir().expect("tempdir");

    intake(tmp.path())
        .args(["check-trivial", "--text", "testing testing 1 2 3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("trivial=true"))
        .stdout(predicate::str::contains("pattern=testing"));

    intake(tmp.path())
        .args(["check-trivial", "--text", "two eggs and toast"])
        .assert()
        .success()
        .stdout(predicate::str::contains("trivial=false"));
}

#[test]
fn extract_short_circuits_without_api_key_and_journals_the_turn() {
    let tmp = tempdir().expect("tempdir");

    let output = intake(tmp.path())
        .args(["extract", "--text", "testing testing 1 2 3", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report = stdout_json(&output);
    assert_eq!(report["ok"], true);
    assert_eq!(report["payload"]["actions"], serde_json::json!([]));
    assert!(report["payload"].get("decision").is_none());

    let turns = fs::read_to_string(tmp.path().join("intake/logs/turns.jsonl")).expect("journal");
    assert!(turns.contains("\"source\":\"short_circuit\""));
    assert!(!turns.contains("testing testing"));
}

#[test]
fn conversation_mode_short_circuit_carries_chat_decision() {
    let tmp = tempdir().expect("tempdir");

    let output = intake(tmp.path())
        .args(["extract", "--text", "can you hear me?", "--mode", "conversation", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let decision = &stdout_json(&output)["payload"]["decision"];
    assert_eq!(decision["intent"], "chat");
    assert_eq!(decision["apply"], "none");
    assert_eq!(decision["action_handling"], "keep");
}

#[test]
fn extract_needs_a_key_for_real_notes() {
    let tmp = tempdir().expect("tempdir");

    intake(tmp.path())
        .args(["extract", "--text", "two eggs and toast"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("INTAKE_API_KEY"));
}

#[test]
fn unreachable_service_ends_in_the_single_terminal_failure() {
    let tmp = tempdir().expect("tempdir");

    intake(tmp.path())
        .env("INTAKE_API_KEY", "sk-test")
        .env("INTAKE_BASE_URL", "http://127.0.0.1:9")
        .env("INTAKE_TIMEOUT_SECS", "2")
        .args(["extract", "--text", "two eggs and toast", "--today", "2024-03-09"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("could not understand that, try again"))
        .stderr(predicate::str::contains("INTAKE_WARN code=W001_TRANSPORT"))
        .stderr(predicate::str::contains("code=W007_ESCALATION"));

    let events = fs::read_to_string(tmp.path().join("intake/logs/events.jsonl")).expect("events");
    assert!(events.contains("extraction_failed"));
}

#[test]
fn malformed_request_context_is_rejected() {
    let tmp = tempdir().expect("tempdir");

    intake(tmp.path())
        .args(["extract", "--text", "mic check", "--today", "03/09/2024"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid request"));
}

#[test]
fn validate_reports_valid_and_invalid_envelopes() {
    let tmp = tempdir().expect("tempdir");
    let good = tmp.path().join("good.json");
    fs::write(
        &good,
        r#"{"message":"Logged.","actions":[{"type":"log_sleep","title":"Sleep","confidence":0.8,"data":{"date":"2024-03-09","bedtime":"23:30","wakeTime":"07:00","hours":7.5,"quality":null,"notes":null}}]}"#,
    )
    .expect("write good");
    let bad = tmp.path().join("bad.json");
    fs::write(
        &bad,
        r#"{"message":"Logged.","actions":[{"type":"log_sleep","title":"Sleep","confidence":1.3,"data":{"date":null,"bedtime":null,"wakeTime":null,"hours":null,"quality":null,"notes":null}}]}"#,
    )
    .expect("write bad");

    intake(tmp.path())
        .args(["validate", "--file"])
        .arg(&good)
        .assert()
        .success()
        .stdout(predicate::str::contains("action=log_sleep"));

    intake(tmp.path())
        .args(["validate", "--file"])
        .arg(&bad)
        .assert()
        .failure()
        .stdout(predicate::str::contains("confidence"));

    intake(tmp.path())
        .args(["validate", "--mode", "conversation", "--file"])
        .arg(&good)
        .assert()
        .failure()
        .stdout(predicate::str::contains("decision"));
}

#[test]
fn schema_prints_strict_conversation_format() {
    let tmp = tempdir().expect("tempdir");

    let output = intake(tmp.path())
        .args(["schema", "--mode", "conversation", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let payload = &stdout_json(&output)["payload"];
    assert_eq!(payload["type"], "json_schema");
    assert_eq!(payload["strict"], true);
    assert_eq!(payload["name"], "health_intake_conversation");
    assert!(payload["schema"]["required"]
        .as_array()
        .expect("required list")
        .iter()
        .any(|key| key == "decision"));
}

#[test]
fn status_reports_overrides_and_key_presence() {
    let tmp = tempdir().expect("tempdir");

    intake(tmp.path())
        .env("INTAKE_CHEAP_MODEL", "tiny-model")
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("cheap_model=tiny-model"))
        .stdout(predicate::str::contains("env_set=INTAKE_CHEAP_MODEL"))
        .stdout(predicate::str::contains("api_key_present=false"));
}

#[test]
fn status_flags_an_invalid_config_file() {
    let tmp = tempdir().expect("tempdir");
    let config_dir = tmp.path().join("intake");
    fs::create_dir_all(&config_dir).expect("mkdir intake");
    fs::write(
        config_dir.join("intake.toml"),
        "[escalation]\nconfidence_threshold = 2.0\n",
    )
    .expect("write config");

    intake(tmp.path())
        .arg("status")
        .assert()
        .failure()
        .stdout(predicate::str::contains("config invalid"));
}
