use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use cartsim_core::config::{AppConfig, LoadOptions};
use cartsim_core::errors::ApplicationError;
use cartsim_core::rng::population_stream;
use cartsim_core::{
    generate_users, summarize, CandidateEvent, GenerationSummary, MenuCatalog, SessionGenerator,
    TemplateBook,
};
use tracing::info;

use crate::commands::CommandResult;

pub fn run(options: LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "generate",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    match execute(&config) {
        Ok(report) => {
            let result = CommandResult::success(
                "generate",
                format!(
                    "wrote {} events from {} sessions to {}",
                    report.summary.total_events,
                    report.sessions,
                    config.output.path.display()
                ),
            );
            if config.output.summary {
                result.with_report(&report.summary)
            } else {
                result
            }
        }
        Err(error) => CommandResult::from_error("generate", &error),
    }
}

struct GenerateReport {
    sessions: u64,
    summary: GenerationSummary,
}

fn execute(config: &AppConfig) -> Result<GenerateReport, ApplicationError> {
    let catalog = MenuCatalog::standard();
    let book = TemplateBook::standard();
    let users =
        generate_users(config.simulation.users, &mut population_stream(config.simulation.seed))?;

    let output = SessionGenerator::new(&catalog, &book, config.noise)
        .generate(&users, &config.generation_params())?;

    let written = write_events(&config.output.path, &output.events)?;
    info!(
        event_name = "cartsim.output.written",
        path = %config.output.path.display(),
        events = written,
        "candidate events written"
    );
    Ok(GenerateReport {
        sessions: output.sessions_started - output.sessions_skipped,
        summary: summarize(&output.events),
    })
}

/// Writes one JSON object per line.
pub fn write_events(path: &Path, events: &[CandidateEvent]) -> Result<usize, ApplicationError> {
    let output_error =
        |error: std::io::Error| ApplicationError::Output(format!("{}: {error}", path.display()));

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(output_error)?;
    }

    let mut writer = BufWriter::new(File::create(path).map_err(output_error)?);
    for event in events {
        serde_json::to_writer(&mut writer, event)
            .map_err(|error| ApplicationError::Output(error.to_string()))?;
        writer.write_all(b"\n").map_err(output_error)?;
    }
    writer.flush().map_err(output_error)?;
    Ok(events.len())
}

pub fn read_events(path: &Path) -> Result<Vec<CandidateEvent>, ApplicationError> {
    let raw = fs::read_to_string(path)
        .map_err(|error| ApplicationError::Output(format!("{}: {error}", path.display())))?;

    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<CandidateEvent>(line).map_err(|error| {
                ApplicationError::Output(format!(
                    "{} line {}: {error}",
                    path.display(),
                    index + 1
                ))
            })
        })
        .collect()
}
