pub mod dispatcher;
pub mod events;
pub mod state;

use crate::delivery::Deliver;
use anyhow::{Context, Result};
use std::io::BufRead;

pub use dispatcher::{Dispatcher, Phase};
pub use events::{EventError, HookEvent};
pub use state::{RunState, ScenarioFailure};

/// Counters from one replay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    pub documents: usize,
    pub rejected: usize,
}

/// Feed JSON Lines events through `dispatcher`.
///
/// Blank lines are skipped. Lines that fail to parse are reported and
/// skipped; only read errors end the replay early.
pub fn replay_events<R: BufRead, D: Deliver>(
    reader: R,
    dispatcher: &mut Dispatcher<D>,
) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read event on line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }

        summary.events += 1;
        match HookEvent::from_json_line(&line) {
            Ok(event) => {
                if dispatcher.dispatch(&event).is_some() {
                    summary.documents += 1;
                }
            }
            Err(e) => {
                summary.rejected += 1;
                log::debug!("Rejected event on line {}", index + 1);
                dispatcher.reject(&e);
            }
        }
    }

    Ok(summary)
}
