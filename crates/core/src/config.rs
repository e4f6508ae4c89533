use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::noise::{LastEventOverride, NoiseSettings};
use crate::engine::GenerationParams;

pub const DEFAULT_CONFIG_FILE: &str = "cartsim.toml";
pub const MAX_SIMULATION_DAYS: u32 = 3650;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub noise: NoiseSettings,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    pub seed: u64,
    pub users: usize,
    pub days: u32,
    pub start_date: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub summary: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub seed: Option<u64>,
    pub users: Option<usize>,
    pub days: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub output_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            users: 5000,
            days: 30,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or(NaiveDate::MIN),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            noise: NoiseSettings::default(),
            output: OutputConfig { path: PathBuf::from("cartsim_events.jsonl"), summary: true },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            seed: self.simulation.seed,
            start_date: self.simulation.start_date,
            days: self.simulation.days,
        }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(simulation) = patch.simulation {
            if let Some(seed) = simulation.seed {
                self.simulation.seed = seed;
            }
            if let Some(users) = simulation.users {
                self.simulation.users = users;
            }
            if let Some(days) = simulation.days {
                self.simulation.days = days;
            }
            if let Some(start_date) = simulation.start_date {
                self.simulation.start_date = start_date;
            }
        }

        if let Some(noise) = patch.noise {
            if let Some(rate) = noise.abandonment_rate {
                self.noise.abandonment_rate = rate;
            }
            if let Some(rate) = noise.last_event_override_rate {
                self.noise.last_event_override_rate = rate;
            }
            if let Some(policy) = noise.last_event_override {
                self.noise.last_event_override = policy;
            }
            if let Some(max) = noise.max_noise_candidates {
                self.noise.max_noise_candidates = max;
            }
        }

        if let Some(output) = patch.output {
            if let Some(path) = output.path {
                self.output.path = path;
            }
            if let Some(summary) = output.summary {
                self.output.summary = summary;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("CARTSIM_SIMULATION_SEED") {
            self.simulation.seed = parse_env("CARTSIM_SIMULATION_SEED", &value)?;
        }
        if let Some(value) = read_env("CARTSIM_SIMULATION_USERS") {
            self.simulation.users = parse_env("CARTSIM_SIMULATION_USERS", &value)?;
        }
        if let Some(value) = read_env("CARTSIM_SIMULATION_DAYS") {
            self.simulation.days = parse_env("CARTSIM_SIMULATION_DAYS", &value)?;
        }
        if let Some(value) = read_env("CARTSIM_SIMULATION_START_DATE") {
            self.simulation.start_date = parse_env("CARTSIM_SIMULATION_START_DATE", &value)?;
        }

        if let Some(value) = read_env("CARTSIM_NOISE_ABANDONMENT_RATE") {
            self.noise.abandonment_rate = parse_env("CARTSIM_NOISE_ABANDONMENT_RATE", &value)?;
        }
        if let Some(value) = read_env("CARTSIM_NOISE_LAST_EVENT_OVERRIDE_RATE") {
            self.noise.last_event_override_rate =
                parse_env("CARTSIM_NOISE_LAST_EVENT_OVERRIDE_RATE", &value)?;
        }
        if let Some(value) = read_env("CARTSIM_NOISE_LAST_EVENT_OVERRIDE") {
            self.noise.last_event_override = value.parse::<LastEventOverride>().map_err(|_| {
                ConfigError::InvalidEnvOverride {
                    key: "CARTSIM_NOISE_LAST_EVENT_OVERRIDE".to_string(),
                    value: value.clone(),
                }
            })?;
        }
        if let Some(value) = read_env("CARTSIM_NOISE_MAX_CANDIDATES") {
            self.noise.max_noise_candidates = parse_env("CARTSIM_NOISE_MAX_CANDIDATES", &value)?;
        }

        if let Some(value) = read_env("CARTSIM_OUTPUT_PATH") {
            self.output.path = PathBuf::from(value);
        }
        if let Some(value) = read_env("CARTSIM_OUTPUT_SUMMARY") {
            self.output.summary = parse_env("CARTSIM_OUTPUT_SUMMARY", &value)?;
        }

        let log_level = read_env("CARTSIM_LOGGING_LEVEL").or_else(|| read_env("CARTSIM_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("CARTSIM_LOGGING_FORMAT").or_else(|| read_env("CARTSIM_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(seed) = overrides.seed {
            self.simulation.seed = seed;
        }
        if let Some(users) = overrides.users {
            self.simulation.users = users;
        }
        if let Some(days) = overrides.days {
            self.simulation.days = days;
        }
        if let Some(start_date) = overrides.start_date {
            self.simulation.start_date = start_date;
        }
        if let Some(path) = overrides.output_path {
            self.output.path = path;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_simulation(&self.simulation)?;
        validate_noise(&self.noise)?;
        validate_output(&self.output)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from("config").join(DEFAULT_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_simulation(simulation: &SimulationConfig) -> Result<(), ConfigError> {
    if simulation.days == 0 || simulation.days > MAX_SIMULATION_DAYS {
        return Err(ConfigError::Validation(format!(
            "simulation.days must be in range 1..={MAX_SIMULATION_DAYS}"
        )));
    }
    Ok(())
}

fn validate_noise(noise: &NoiseSettings) -> Result<(), ConfigError> {
    for (key, rate) in [
        ("noise.abandonment_rate", noise.abandonment_rate),
        ("noise.last_event_override_rate", noise.last_event_override_rate),
    ] {
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::Validation(format!("{key} must lie in [0, 1]")));
        }
    }
    Ok(())
}

fn validate_output(output: &OutputConfig) -> Result<(), ConfigError> {
    if output.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("output.path must not be empty".to_string()));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    simulation: Option<SimulationPatch>,
    noise: Option<NoisePatch>,
    output: Option<OutputPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct SimulationPatch {
    seed: Option<u64>,
    users: Option<usize>,
    days: Option<u32>,
    start_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
struct NoisePatch {
    abandonment_rate: Option<f64>,
    last_event_override_rate: Option<f64>,
    last_event_override: Option<LastEventOverride>,
    max_noise_candidates: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputPatch {
    path: Option<PathBuf>,
    summary: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
