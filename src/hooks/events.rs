use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub const SUITE_STARTED: &str = "suite_started";
pub const SCENARIO_FINISHED: &str = "scenario_finished";
pub const SUITE_FINISHED: &str = "suite_finished";

#[derive(Debug, Error)]
pub enum EventError {
    #[error("malformed {kind} payload: {reason}")]
    MalformedEventPayload { kind: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeatureInfo {
    pub title: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScenarioInfo {
    pub title: String,
    pub line: u32,
}

/// Result of one scenario, as delivered by the host runner
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScenarioResult {
    pub passed: bool,
    pub feature: FeatureInfo,
    pub scenario: ScenarioInfo,
    #[serde(default)]
    pub steps: Vec<String>,
    /// As captured, oldest first.
    #[serde(default)]
    pub screenshots: Vec<String>,
}

/// Lifecycle events emitted by the host test runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    SuiteStarted,
    ScenarioFinished(ScenarioResult),
    SuiteFinished,
    Unrecognized { kind: String },
}

impl HookEvent {
    pub fn kind(&self) -> &str {
        match self {
            HookEvent::SuiteStarted => SUITE_STARTED,
            HookEvent::ScenarioFinished(_) => SCENARIO_FINISHED,
            HookEvent::SuiteFinished => SUITE_FINISHED,
            HookEvent::Unrecognized { kind } => kind,
        }
    }

    /// Classify a raw event record by its `event` field.
    pub fn from_value(value: Value) -> Result<Self, EventError> {
        let kind = value
            .get("event")
            .and_then(Value::as_str)
            .ok_or_else(|| EventError::MalformedEventPayload {
                kind: "<unknown>".to_string(),
                reason: "missing \"event\" field".to_string(),
            })?
            .to_string();

        match kind.as_str() {
            SUITE_STARTED => Ok(HookEvent::SuiteStarted),
            SUITE_FINISHED => Ok(HookEvent::SuiteFinished),
            SCENARIO_FINISHED => serde_json::from_value::<ScenarioResult>(value)
                .map(HookEvent::ScenarioFinished)
                .map_err(|e| EventError::MalformedEventPayload {
                    kind: kind.clone(),
                    reason: e.to_string(),
                }),
            _ => Ok(HookEvent::Unrecognized { kind: kind.clone() }),
        }
    }

    pub fn from_json_line(line: &str) -> Result<Self, EventError> {
        let value: Value =
            serde_json::from_str(line).map_err(|e| EventError::MalformedEventPayload {
                kind: "<unknown>".to_string(),
                reason: e.to_string(),
            })?;
        Self::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_lifecycle_events() {
        assert_eq!(
            HookEvent::from_json_line(r#"{"event": "suite_started"}"#).unwrap(),
            HookEvent::SuiteStarted
        );
        assert_eq!(
            HookEvent::from_json_line(r#"{"event": "suite_finished"}"#).unwrap(),
            HookEvent::SuiteFinished
        );
    }

    #[test]
    fn test_parse_scenario_with_optional_fields() {
        let event = HookEvent::from_value(json!({
            "event": "scenario_finished",
            "passed": false,
            "feature": {"title": "Login", "file": null},
            "scenario": {"title": "Bad password", "line": 9}
        }))
        .unwrap();

        match event {
            HookEvent::ScenarioFinished(result) => {
                assert!(!result.passed);
                assert_eq!(result.feature.title, "Login");
                assert_eq!(result.feature.file, None);
                assert_eq!(result.feature.description, None);
                assert_eq!(result.scenario.line, 9);
                assert!(result.steps.is_empty());
                assert!(result.screenshots.is_empty());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kind_is_unrecognized() {
        let event = HookEvent::from_json_line(r#"{"event": "step_finished"}"#).unwrap();
        assert_eq!(
            event,
            HookEvent::Unrecognized {
                kind: "step_finished".to_string()
            }
        );
        assert_eq!(event.kind(), "step_finished");
    }

    #[test]
    fn test_missing_scenario_is_malformed() {
        let err = HookEvent::from_value(json!({
            "event": "scenario_finished",
            "passed": false,
            "feature": {"title": "Login"}
        }))
        .unwrap_err();

        assert!(matches!(
            err,
            EventError::MalformedEventPayload { ref kind, .. } if kind == SCENARIO_FINISHED
        ));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        assert!(matches!(
            HookEvent::from_json_line("{not json"),
            Err(EventError::MalformedEventPayload { .. })
        ));
        assert!(matches!(
            HookEvent::from_json_line(r#"{"kind": "suite_started"}"#),
            Err(EventError::MalformedEventPayload { .. })
        ));
    }
}
