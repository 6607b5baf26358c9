//! Message builder: turns lifecycle events into MessageCard documents.
//!
//! Nothing here performs I/O. The only side effects are on the
//! [`RunState`] passed in by the caller.

use super::types::{Fact, NotificationDocument, Section, ThemeColor};
use crate::hooks::events::{HookEvent, ScenarioResult};
use crate::hooks::state::{RunState, ScenarioFailure};

pub const SUITE_STARTED_SUMMARY: &str = "Automation job started";
pub const SCENARIO_FAILED_SUMMARY: &str = "Scenario failed";
pub const SUITE_FINISHED_SUMMARY: &str = "Automation job finished";

pub const DEFAULT_FAILURE_ICON: &str =
    "https://raw.githubusercontent.com/primer/octicons/main/icons/x-circle-fill-24.svg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderOptions {
    pub notify_on_suite_start: bool,
    pub failure_icon: String,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            notify_on_suite_start: true,
            failure_icon: DEFAULT_FAILURE_ICON.to_string(),
        }
    }
}

/// Build the document for `event`, updating `state` as the event requires.
pub fn build(
    event: &HookEvent,
    state: &mut RunState,
    options: &BuilderOptions,
) -> Option<NotificationDocument> {
    match event {
        HookEvent::SuiteStarted => suite_started(state, options),
        HookEvent::ScenarioFinished(result) => scenario_finished(result, state, options),
        HookEvent::SuiteFinished => Some(suite_finished(state)),
        HookEvent::Unrecognized { .. } => None,
    }
}

pub fn suite_started(
    state: &mut RunState,
    options: &BuilderOptions,
) -> Option<NotificationDocument> {
    state.reset();

    if !options.notify_on_suite_start {
        return None;
    }

    Some(
        NotificationDocument::new(SUITE_STARTED_SUMMARY, ThemeColor::Warning)
            .with_section(Section::new(SUITE_STARTED_SUMMARY, "")),
    )
}

/// Passing scenarios produce nothing and leave `state` untouched.
pub fn scenario_finished(
    result: &ScenarioResult,
    state: &mut RunState,
    options: &BuilderOptions,
) -> Option<NotificationDocument> {
    if result.passed {
        return None;
    }

    let failure = scenario_failure(result);
    state.record(&failure.feature_title);
    Some(failure_card(&failure, options))
}

pub fn scenario_failure(result: &ScenarioResult) -> ScenarioFailure {
    let screenshots = if result.screenshots.is_empty() {
        None
    } else {
        Some(result.screenshots.iter().rev().cloned().collect())
    };

    ScenarioFailure {
        feature_title: result.feature.title.clone(),
        feature_file: result.feature.file.clone().unwrap_or_default(),
        description: result.feature.description.clone().unwrap_or_default(),
        scenario_title: result.scenario.title.clone(),
        line: result.scenario.line,
        steps: result.steps.clone(),
        screenshots,
    }
}

pub fn failure_card(failure: &ScenarioFailure, options: &BuilderOptions) -> NotificationDocument {
    NotificationDocument::new(SCENARIO_FAILED_SUMMARY, ThemeColor::Failure).with_section(
        Section::new(failure.feature_title.as_str(), failure.description.as_str())
            .with_image(options.failure_icon.as_str())
            .with_fact(Fact::new("Feature file", failure.location())),
    )
}

pub fn suite_finished(state: &RunState) -> NotificationDocument {
    let (theme, facts) = if state.has_failures() {
        let mut facts = vec![Fact::new("Outcome", "Failed")];
        facts.extend(
            state
                .snapshot()
                .iter()
                .map(|title| Fact::new("Feature", title.as_str())),
        );
        (ThemeColor::Failure, facts)
    } else {
        (ThemeColor::Success, vec![Fact::new("Outcome", "Passed")])
    };

    let mut section = Section::new(SUITE_FINISHED_SUMMARY, "");
    section.facts = facts;
    NotificationDocument::new(SUITE_FINISHED_SUMMARY, theme).with_section(section)
}
