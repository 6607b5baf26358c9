use super::events::{EventError, HookEvent};
use super::state::{RunState, ScenarioFailure};
use crate::card::{self, BuilderOptions, NotificationDocument};
use crate::delivery::{Deliver, DeliveryError, DeliveryOutcome, WebhookClient, WebhookTarget};
use crate::utils::NotifierConfig;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    SuiteRunning,
}

/// Routes lifecycle events through the builder and on to delivery.
///
/// Events must arrive serially for one suite run. Delivery failures are
/// logged and swallowed so a broken webhook never fails the test run.
pub struct Dispatcher<D: Deliver> {
    target: WebhookTarget,
    options: BuilderOptions,
    transport: D,
    state: RunState,
    phase: Phase,
    last_failure: Option<ScenarioFailure>,
}

impl Dispatcher<WebhookClient> {
    pub fn from_config(config: &NotifierConfig) -> Result<Self, DeliveryError> {
        let client = WebhookClient::new(config.client_options())?;
        Ok(Self::new(config.target(), config.builder_options(), client))
    }
}

impl<D: Deliver> Dispatcher<D> {
    pub fn new(target: WebhookTarget, options: BuilderOptions, transport: D) -> Self {
        Self {
            target,
            options,
            transport,
            state: RunState::new(),
            phase: Phase::Idle,
            last_failure: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn transport(&self) -> &D {
        &self.transport
    }

    /// Most recent failed scenario in the running suite, screenshots newest first.
    pub fn last_failure(&self) -> Option<&ScenarioFailure> {
        self.last_failure.as_ref()
    }

    /// Handle one event and return the document it produced, if any.
    pub fn dispatch(&mut self, event: &HookEvent) -> Option<NotificationDocument> {
        let accepted = match (self.phase, event) {
            (_, HookEvent::SuiteStarted) => {
                self.phase = Phase::SuiteRunning;
                self.last_failure = None;
                true
            }
            (_, HookEvent::Unrecognized { kind }) => {
                debug!("Ignoring unrecognized event: {}", kind);
                false
            }
            (Phase::Idle, event) => {
                debug!("Ignoring {} outside a running suite", event.kind());
                false
            }
            (Phase::SuiteRunning, HookEvent::ScenarioFinished(_)) => true,
            (Phase::SuiteRunning, HookEvent::SuiteFinished) => {
                self.phase = Phase::Idle;
                true
            }
        };

        let document = if accepted {
            card::build(event, &mut self.state, &self.options)
        } else {
            None
        };

        if let (Some(_), HookEvent::ScenarioFinished(result)) = (&document, event) {
            let failure = card::builder::scenario_failure(result);
            debug!(
                "Scenario \"{}\" failed; steps: {:?}; screenshots: {:?}",
                failure.scenario_title, failure.steps, failure.screenshots
            );
            self.last_failure = Some(failure);
        }

        self.send(document.as_ref());
        document
    }

    /// Report an event that could not be parsed. The run carries on.
    pub fn reject(&self, error: &EventError) {
        warn!("Skipping event: {}", error);
    }

    fn send(&self, document: Option<&NotificationDocument>) {
        match self.transport.deliver(&self.target, document) {
            Ok(DeliveryOutcome::Delivered | DeliveryOutcome::Skipped) => {}
            Err(e) => warn!("Notification dropped: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::ThemeColor;
    use crate::hooks::events::{FeatureInfo, ScenarioInfo, ScenarioResult};
    use std::cell::RefCell;

    /// Captures what would have been posted.
    #[derive(Default)]
    struct Recorder {
        sent: RefCell<Vec<NotificationDocument>>,
        fail: bool,
    }

    impl Deliver for Recorder {
        fn deliver(
            &self,
            target: &WebhookTarget,
            document: Option<&NotificationDocument>,
        ) -> Result<DeliveryOutcome, DeliveryError> {
            let Some(document) = document else {
                return Ok(DeliveryOutcome::Skipped);
            };
            self.sent.borrow_mut().push(document.clone());
            if self.fail {
                return Err(DeliveryError::Status {
                    url: target.url.clone(),
                    status: 503,
                    body_excerpt: "unavailable".to_string(),
                });
            }
            Ok(DeliveryOutcome::Delivered)
        }
    }

    fn dispatcher(recorder: Recorder) -> Dispatcher<Recorder> {
        Dispatcher::new(
            WebhookTarget::new("http://hooks.example.test"),
            BuilderOptions::default(),
            recorder,
        )
    }

    fn failed(feature: &str) -> HookEvent {
        HookEvent::ScenarioFinished(ScenarioResult {
            passed: false,
            feature: FeatureInfo {
                title: feature.to_string(),
                file: Some(format!("features/{}.feature", feature)),
                description: None,
            },
            scenario: ScenarioInfo {
                title: "Scenario".to_string(),
                line: 3,
            },
            steps: vec![],
            screenshots: vec![],
        })
    }

    fn passed(feature: &str) -> HookEvent {
        match failed(feature) {
            HookEvent::ScenarioFinished(mut result) => {
                result.passed = true;
                HookEvent::ScenarioFinished(result)
            }
            _ => unreachable!(),
        }
    }

    fn facts(doc: &NotificationDocument) -> Vec<(&str, &str)> {
        doc.facts()
            .map(|f| (f.name.as_str(), f.value.as_str()))
            .collect()
    }

    #[test]
    fn test_suite_with_two_failures() {
        let mut d = dispatcher(Recorder::default());

        d.dispatch(&HookEvent::SuiteStarted);
        assert_eq!(d.phase(), Phase::SuiteRunning);
        d.dispatch(&failed("Login"));
        d.dispatch(&passed("Search"));
        d.dispatch(&failed("Checkout"));
        let summary = d.dispatch(&HookEvent::SuiteFinished).unwrap();

        assert_eq!(d.phase(), Phase::Idle);
        assert_eq!(summary.summary, "Automation job finished");
        assert_eq!(summary.theme_color, ThemeColor::Failure.hex());
        assert_eq!(
            facts(&summary),
            vec![
                ("Outcome", "Failed"),
                ("Feature", "Login"),
                ("Feature", "Checkout")
            ]
        );

        let sent = d.transport().sent.borrow();
        let summaries: Vec<&str> = sent.iter().map(|doc| doc.summary.as_str()).collect();
        assert_eq!(
            summaries,
            vec![
                "Automation job started",
                "Scenario failed",
                "Scenario failed",
                "Automation job finished"
            ]
        );
    }

    #[test]
    fn test_clean_suite_passes() {
        let mut d = dispatcher(Recorder::default());

        d.dispatch(&HookEvent::SuiteStarted);
        d.dispatch(&passed("Login"));
        let summary = d.dispatch(&HookEvent::SuiteFinished).unwrap();

        assert_eq!(summary.theme_color, ThemeColor::Success.hex());
        assert_eq!(facts(&summary), vec![("Outcome", "Passed")]);
    }

    #[test]
    fn test_failures_do_not_leak_into_next_suite() {
        let mut d = dispatcher(Recorder::default());

        d.dispatch(&HookEvent::SuiteStarted);
        d.dispatch(&failed("Login"));
        d.dispatch(&HookEvent::SuiteFinished);

        d.dispatch(&HookEvent::SuiteStarted);
        assert!(d.state().snapshot().is_empty());
        let summary = d.dispatch(&HookEvent::SuiteFinished).unwrap();
        assert_eq!(facts(&summary), vec![("Outcome", "Passed")]);
    }

    #[test]
    fn test_events_while_idle_are_ignored() {
        let mut d = dispatcher(Recorder::default());

        assert!(d.dispatch(&failed("Login")).is_none());
        assert!(d.dispatch(&HookEvent::SuiteFinished).is_none());
        assert!(d.state().snapshot().is_empty());
        assert_eq!(d.phase(), Phase::Idle);
        assert!(d.transport().sent.borrow().is_empty());
    }

    #[test]
    fn test_unrecognized_event_mid_suite() {
        let mut d = dispatcher(Recorder::default());
        d.dispatch(&HookEvent::SuiteStarted);

        let doc = d.dispatch(&HookEvent::Unrecognized {
            kind: "step_finished".to_string(),
        });

        assert!(doc.is_none());
        assert_eq!(d.phase(), Phase::SuiteRunning);
        assert_eq!(d.transport().sent.borrow().len(), 1);
    }

    #[test]
    fn test_delivery_failure_does_not_stop_the_run() {
        let mut d = dispatcher(Recorder {
            fail: true,
            ..Recorder::default()
        });

        d.dispatch(&HookEvent::SuiteStarted);
        d.dispatch(&failed("Login"));
        let summary = d.dispatch(&HookEvent::SuiteFinished).unwrap();

        assert_eq!(
            facts(&summary),
            vec![("Outcome", "Failed"), ("Feature", "Login")]
        );
        assert_eq!(d.transport().sent.borrow().len(), 3);
    }

    #[test]
    fn test_failed_scenario_keeps_screenshots_newest_first() {
        let mut d = dispatcher(Recorder::default());
        let mut event = failed("Login");
        if let HookEvent::ScenarioFinished(result) = &mut event {
            result.steps = vec!["Given a user".to_string()];
            result.screenshots = vec![
                "1.png".to_string(),
                "2.png".to_string(),
                "3.png".to_string(),
            ];
        }

        d.dispatch(&HookEvent::SuiteStarted);
        d.dispatch(&event);

        let failure = d.last_failure().unwrap();
        assert_eq!(failure.feature_title, "Login");
        assert_eq!(failure.steps, vec!["Given a user".to_string()]);
        assert_eq!(
            failure.screenshots,
            Some(vec!["3.png".to_string(), "2.png".to_string(), "1.png".to_string()])
        );

        d.dispatch(&passed("Search"));
        assert_eq!(d.last_failure().unwrap().feature_title, "Login");

        d.dispatch(&HookEvent::SuiteFinished);
        d.dispatch(&HookEvent::SuiteStarted);
        assert!(d.last_failure().is_none());
    }

    #[test]
    fn test_suite_start_notification_can_be_disabled() {
        let mut d = Dispatcher::new(
            WebhookTarget::new("http://hooks.example.test"),
            BuilderOptions {
                notify_on_suite_start: false,
                ..BuilderOptions::default()
            },
            Recorder::default(),
        );

        assert!(d.dispatch(&HookEvent::SuiteStarted).is_none());
        assert_eq!(d.phase(), Phase::SuiteRunning);
        d.dispatch(&HookEvent::SuiteFinished);
        assert_eq!(d.transport().sent.borrow().len(), 1);
    }
}
