use std::path::Path;

use cartsim_core::summarize;

use crate::commands::generate::read_events;
use crate::commands::CommandResult;

pub fn run(input: &Path) -> CommandResult {
    match read_events(input) {
        Ok(events) => {
            let summary = summarize(&events);
            let verdict = if summary.acceptance_rate_realistic { "realistic" } else { "unrealistic" };
            CommandResult::success(
                "summarize",
                format!(
                    "{} events, acceptance {} ({verdict})",
                    summary.total_events, summary.overall_acceptance_rate
                ),
            )
            .with_report(&summary)
        }
        Err(error) => CommandResult::from_error("summarize", &error),
    }
}
