use serde::{Deserialize, Serialize};

/// A failed scenario as reported by the host runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioFailure {
    pub feature_title: String,
    pub feature_file: String,
    pub description: String,
    pub scenario_title: String,
    pub line: u32,
    pub steps: Vec<String>,
    /// Newest capture first.
    pub screenshots: Option<Vec<String>>,
}

impl ScenarioFailure {
    /// `"<file>. Line <line>"`
    pub fn location(&self) -> String {
        format!("{}. Line {}", self.feature_file, self.line)
    }
}

/// Failures recorded during one suite execution.
///
/// Owned by the dispatcher. `reset` runs on every suite start so a
/// previous suite never leaks into the next summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    failed_features: Vec<String>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.failed_features.clear();
    }

    pub fn record(&mut self, feature_title: &str) {
        self.failed_features.push(feature_title.to_string());
    }

    pub fn snapshot(&self) -> &[String] {
        &self.failed_features
    }

    pub fn has_failures(&self) -> bool {
        !self.failed_features.is_empty()
    }
}
