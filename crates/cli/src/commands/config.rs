use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use cartsim_core::config::{AppConfig, LoadOptions, DEFAULT_CONFIG_FILE};
use toml::Value;

use crate::commands::CommandResult;

struct Field {
    key: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

/// Renders one line per setting, followed by the JSON status line.
pub fn run(config_path: Option<PathBuf>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions {
        config_path: config_path.clone(),
        ..LoadOptions::default()
    }) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let config_file_path = detect_config_path(config_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields = [
        Field {
            key: "simulation.seed",
            env_keys: &["CARTSIM_SIMULATION_SEED"],
            value: config.simulation.seed.to_string(),
        },
        Field {
            key: "simulation.users",
            env_keys: &["CARTSIM_SIMULATION_USERS"],
            value: config.simulation.users.to_string(),
        },
        Field {
            key: "simulation.days",
            env_keys: &["CARTSIM_SIMULATION_DAYS"],
            value: config.simulation.days.to_string(),
        },
        Field {
            key: "simulation.start_date",
            env_keys: &["CARTSIM_SIMULATION_START_DATE"],
            value: config.simulation.start_date.to_string(),
        },
        Field {
            key: "noise.abandonment_rate",
            env_keys: &["CARTSIM_NOISE_ABANDONMENT_RATE"],
            value: config.noise.abandonment_rate.to_string(),
        },
        Field {
            key: "noise.last_event_override_rate",
            env_keys: &["CARTSIM_NOISE_LAST_EVENT_OVERRIDE_RATE"],
            value: config.noise.last_event_override_rate.to_string(),
        },
        Field {
            key: "noise.last_event_override",
            env_keys: &["CARTSIM_NOISE_LAST_EVENT_OVERRIDE"],
            value: format!("{:?}", config.noise.last_event_override),
        },
        Field {
            key: "noise.max_noise_candidates",
            env_keys: &["CARTSIM_NOISE_MAX_CANDIDATES"],
            value: config.noise.max_noise_candidates.to_string(),
        },
        Field {
            key: "output.path",
            env_keys: &["CARTSIM_OUTPUT_PATH"],
            value: config.output.path.display().to_string(),
        },
        Field {
            key: "output.summary",
            env_keys: &["CARTSIM_OUTPUT_SUMMARY"],
            value: config.output.summary.to_string(),
        },
        Field {
            key: "logging.level",
            env_keys: &["CARTSIM_LOGGING_LEVEL", "CARTSIM_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Field {
            key: "logging.format",
            env_keys: &["CARTSIM_LOGGING_FORMAT", "CARTSIM_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format),
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in &fields {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }

    let mut result =
        CommandResult::success("config", format!("{} settings resolved", fields.len()));
    result.output = format!("{}\n{}", lines.join("\n"), result.output);
    result
}

fn detect_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then_some(path);
    }

    let root = PathBuf::from(DEFAULT_CONFIG_FILE);
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config").join(DEFAULT_CONFIG_FILE);
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::contains_path;

    #[test]
    fn nested_keys_are_found_in_the_file_document() {
        let doc = "[noise]\nabandonment_rate = 0.1\n".parse::<Value>().expect("toml");
        assert!(contains_path(&doc, "noise.abandonment_rate"));
        assert!(!contains_path(&doc, "noise.max_noise_candidates"));
        assert!(!contains_path(&doc, "simulation.seed"));
    }
}
