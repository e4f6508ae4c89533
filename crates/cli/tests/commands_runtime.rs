use std::env;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use cartsim_cli::commands::{catalog, config, generate, summarize};
use cartsim_core::config::{ConfigOverrides, LoadOptions};
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn generate_writes_jsonl_and_reports_summary() {
    let dir = TempDir::new().expect("temp dir");
    let output_path = dir.path().join("events.jsonl");
    let output_value = output_path.display().to_string();

    with_env(
        &[
            ("CARTSIM_SIMULATION_USERS", "8"),
            ("CARTSIM_SIMULATION_DAYS", "10"),
            ("CARTSIM_OUTPUT_PATH", output_value.as_str()),
        ],
        || {
            let result = generate::run(LoadOptions::default());
            assert_eq!(result.exit_code, 0, "expected successful generation: {}", result.output);

            let payload = parse_payload(last_line(&result.output));
            assert_eq!(payload["command"], "generate");
            assert_eq!(payload["status"], "ok");

            let summary = parse_payload(first_line(&result.output));
            let lines = event_lines(&output_path);
            assert_eq!(summary["total_events"], lines.len());
            assert_eq!(summary["labels_binary"], true);

            for line in lines {
                let event = parse_payload(&line);
                assert!(event["candidate_accepted"] == 0 || event["candidate_accepted"] == 1);
            }
        },
    );
}

#[test]
fn generate_is_reproducible_for_a_seed() {
    let dir = TempDir::new().expect("temp dir");
    let first = dir.path().join("first.jsonl");
    let second = dir.path().join("second.jsonl");

    with_env(&[("CARTSIM_OUTPUT_SUMMARY", "false")], || {
        for path in [&first, &second] {
            let result = generate::run(overrides(7, 6, path));
            assert_eq!(result.exit_code, 0, "expected successful generation: {}", result.output);
            assert_eq!(result.output.lines().count(), 1, "summary should be suppressed");
        }
    });

    let first_raw = fs::read_to_string(&first).expect("first output");
    let second_raw = fs::read_to_string(&second).expect("second output");
    assert!(!first_raw.is_empty());
    assert_eq!(first_raw, second_raw);
}

#[test]
fn generate_returns_config_failure_for_invalid_days() {
    with_env(&[("CARTSIM_SIMULATION_DAYS", "0")], || {
        let result = generate::run(LoadOptions::default());
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "generate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn generate_with_zero_users_writes_an_empty_file() {
    let dir = TempDir::new().expect("temp dir");
    let output_path = dir.path().join("nested").join("empty.jsonl");

    with_env(&[], || {
        let result = generate::run(overrides(1, 0, &output_path));
        assert_eq!(result.exit_code, 0, "expected successful generation: {}", result.output);

        let summary = parse_payload(first_line(&result.output));
        assert_eq!(summary["total_events"], 0);
    });

    assert!(event_lines(&output_path).is_empty());
}

#[test]
fn summarize_reads_generated_events() {
    let dir = TempDir::new().expect("temp dir");
    let output_path = dir.path().join("events.jsonl");

    with_env(&[], || {
        let generated = generate::run(overrides(42, 10, &output_path));
        assert_eq!(generated.exit_code, 0, "expected successful generation: {}", generated.output);
        let generated_summary = parse_payload(first_line(&generated.output));

        let result = summarize::run(&output_path);
        assert_eq!(result.exit_code, 0, "expected successful summary: {}", result.output);
        let payload = parse_payload(last_line(&result.output));
        assert_eq!(payload["command"], "summarize");
        assert_eq!(payload["status"], "ok");

        let summary = parse_payload(first_line(&result.output));
        assert_eq!(summary, generated_summary);
    });
}

#[test]
fn summarize_reports_output_failure_for_missing_file() {
    let dir = TempDir::new().expect("temp dir");
    let result = summarize::run(&dir.path().join("missing.jsonl"));
    assert_eq!(result.exit_code, 4);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "summarize");
    assert_eq!(payload["error_class"], "output");
}

#[test]
fn summarize_reports_malformed_lines() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("broken.jsonl");
    fs::write(&path, "{\"session_id\":\"S0000001\"}\n").expect("write");

    let result = summarize::run(&path);
    assert_eq!(result.exit_code, 4);
    let payload = parse_payload(&result.output);
    assert!(payload["message"].as_str().unwrap_or_default().contains("line 1"));
}

#[test]
fn catalog_reports_standard_menu_stats() {
    let result = catalog::run();
    assert_eq!(result.exit_code, 0);

    let stats = parse_payload(first_line(&result.output));
    assert_eq!(stats["items"], 58);
    assert_eq!(stats["non_veg_items"], 11);

    let payload = parse_payload(last_line(&result.output));
    assert_eq!(payload["command"], "catalog");
    assert_eq!(payload["status"], "ok");
}

#[test]
fn config_attributes_sources() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("cartsim.toml");
    fs::write(&path, "[simulation]\ndays = 14\n").expect("write config");

    with_env(&[("CARTSIM_LOG_LEVEL", "debug")], || {
        let result = config::run(Some(path.clone()));
        assert_eq!(result.exit_code, 0, "{}", result.output);
        let output = result.output;
        assert!(output.contains("- simulation.seed = 42 (source: default)"), "{output}");
        assert!(output.contains(&format!(
            "- simulation.days = 14 (source: file ({}))",
            path.display()
        )));
        assert!(output.contains("- logging.level = debug (source: env (CARTSIM_LOG_LEVEL))"));

        let payload = parse_payload(last_line(&output));
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn config_returns_classed_failure_for_invalid_values() {
    with_env(&[("CARTSIM_SIMULATION_DAYS", "0")], || {
        let result = config::run(None);
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn generate_applies_the_log_level_override() {
    let dir = TempDir::new().expect("temp dir");
    let output_path = dir.path().join("events.jsonl");

    with_env(&[("CARTSIM_LOG_LEVEL", "warn")], || {
        let mut options = overrides(3, 2, &output_path);
        options.overrides.log_level = Some("verbose".to_string());
        let result = generate::run(options);
        assert_eq!(result.exit_code, 2, "override should beat the env level and fail validation");
        let payload = parse_payload(&result.output);
        assert!(payload["message"].as_str().unwrap_or_default().contains("logging.level"));

        let mut options = overrides(3, 2, &output_path);
        options.overrides.log_level = Some("debug".to_string());
        let result = generate::run(options);
        assert_eq!(result.exit_code, 0, "expected successful generation: {}", result.output);
    });
}

fn overrides(seed: u64, users: usize, output: &Path) -> LoadOptions {
    LoadOptions {
        overrides: ConfigOverrides {
            seed: Some(seed),
            users: Some(users),
            days: Some(14),
            output_path: Some(output.to_path_buf()),
            ..ConfigOverrides::default()
        },
        ..LoadOptions::default()
    }
}

fn event_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("event file should exist")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn first_line(output: &str) -> &str {
    output.lines().next().unwrap_or_default()
}

fn last_line(output: &str) -> &str {
    output.lines().last().unwrap_or_default()
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "CARTSIM_SIMULATION_SEED",
        "CARTSIM_SIMULATION_USERS",
        "CARTSIM_SIMULATION_DAYS",
        "CARTSIM_SIMULATION_START_DATE",
        "CARTSIM_NOISE_ABANDONMENT_RATE",
        "CARTSIM_NOISE_LAST_EVENT_OVERRIDE_RATE",
        "CARTSIM_NOISE_LAST_EVENT_OVERRIDE",
        "CARTSIM_NOISE_MAX_CANDIDATES",
        "CARTSIM_OUTPUT_PATH",
        "CARTSIM_OUTPUT_SUMMARY",
        "CARTSIM_LOGGING_LEVEL",
        "CARTSIM_LOGGING_FORMAT",
        "CARTSIM_LOG_LEVEL",
        "CARTSIM_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
