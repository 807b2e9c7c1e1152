//! Call Router - the screening workflow as an explicit state machine
//!
//! ```text
//! CheckTime -> Done(NoAction)
//! CheckTime -> ComposeMessage -> SendNotification -> MarkFollowUp -> Done(Handled)
//! ```
//!
//! After every stage the whole routing rule is re-evaluated against the
//! record ([`next_state`]). The driver is bounded by a step limit, so a stage
//! that fails to advance its flag ends in `Stalled` instead of looping.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::domain::entities::CallRecord;
use crate::domain::errors::{ComposeFailure, DeliveryError};
use crate::domain::value_objects::AfterHoursWindow;
use crate::services::composer::{Composition, MessageComposer};
use crate::services::sender::{DeliveryResult, NotificationSender};

/// Upper bound on executed stages per run
pub const MAX_ROUTER_STEPS: usize = 10;

/// A workflow node that does work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    CheckTime,
    ComposeMessage,
    SendNotification,
    MarkFollowUp,
}

impl Stage {
    /// Node name in the workflow graph
    pub fn node_name(&self) -> &'static str {
        match self {
            Stage::CheckTime => "check_time",
            Stage::ComposeMessage => "generate_message",
            Stage::SendNotification => "send_sms",
            Stage::MarkFollowUp => "schedule_meeting",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.node_name())
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminal {
    /// Call was within hours; nothing happened
    NoAction,
    /// Reply composed, delivery accepted, follow-up marked
    Handled,
    /// Generation failed and the policy is to propagate
    ComposeFailed,
    /// The single delivery attempt failed
    DeliveryFailed,
    /// Step limit reached or a stage broke a record invariant
    Stalled,
}

impl std::fmt::Display for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Terminal::NoAction => write!(f, "no action"),
            Terminal::Handled => write!(f, "handled"),
            Terminal::ComposeFailed => write!(f, "compose failed"),
            Terminal::DeliveryFailed => write!(f, "delivery failed"),
            Terminal::Stalled => write!(f, "stalled"),
        }
    }
}

/// Next thing the driver does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    Run(Stage),
    Done(Terminal),
}

/// The routing rule, evaluated after every stage
pub fn next_state(record: &CallRecord) -> RouteState {
    if !record.is_after_hours() {
        RouteState::Done(Terminal::NoAction)
    } else if !record.has_message() {
        RouteState::Run(Stage::ComposeMessage)
    } else if !record.delivery_attempted() {
        RouteState::Run(Stage::SendNotification)
    } else if !record.follow_up_scheduled() {
        RouteState::Run(Stage::MarkFollowUp)
    } else {
        RouteState::Done(Terminal::Handled)
    }
}

/// Why a run did not end as `NoAction` or `Handled`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineFailure {
    Compose { error: ComposeFailure },
    Delivery { error: DeliveryError },
    InvariantViolated { message: String },
    StepLimit { max_steps: usize },
}

/// Structured result of one run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub status: Terminal,
    /// Stages in execution order
    pub trace: Vec<Stage>,
    pub record: CallRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composition: Option<Composition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<PipelineFailure>,
}

impl PipelineOutcome {
    /// Last stage reached
    pub fn last_stage(&self) -> Option<Stage> {
        self.trace.last().copied()
    }

    /// Composed message, if any
    pub fn message(&self) -> Option<&str> {
        self.record.has_message().then(|| self.record.message())
    }

    pub fn is_handled(&self) -> bool {
        self.status == Terminal::Handled
    }
}

#[derive(Default)]
struct Progress {
    trace: Vec<Stage>,
    composition: Option<Composition>,
    delivery: Option<DeliveryResult>,
    failure: Option<PipelineFailure>,
}

pub struct CallRouter {
    composer: MessageComposer,
    sender: NotificationSender,
    window: AfterHoursWindow,
    max_steps: usize,
}

impl CallRouter {
    pub fn new(composer: MessageComposer, sender: NotificationSender) -> Self {
        Self {
            composer,
            sender,
            window: AfterHoursWindow::default(),
            max_steps: MAX_ROUTER_STEPS,
        }
    }

    /// Override the after-hours window
    pub fn with_window(mut self, window: AfterHoursWindow) -> Self {
        self.window = window;
        self
    }

    /// Override the step limit
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn window(&self) -> &AfterHoursWindow {
        &self.window
    }

    /// Run the workflow for a call
    pub async fn run(&self, record: CallRecord) -> PipelineOutcome {
        self.drive(record, false).await
    }

    /// Run the workflow treating the call as after-hours
    pub async fn run_forced(&self, record: CallRecord) -> PipelineOutcome {
        self.drive(record, true).await
    }

    async fn drive(&self, mut record: CallRecord, force: bool) -> PipelineOutcome {
        let mut progress = Progress::default();
        let mut state = RouteState::Run(Stage::CheckTime);

        let status = loop {
            let stage = match state {
                RouteState::Done(terminal) => break terminal,
                RouteState::Run(stage) => stage,
            };

            if progress.trace.len() >= self.max_steps {
                error!(max_steps = self.max_steps, %stage, "Router step limit reached");
                progress.failure = Some(PipelineFailure::StepLimit {
                    max_steps: self.max_steps,
                });
                break Terminal::Stalled;
            }

            progress.trace.push(stage);
            debug!(%stage, step = progress.trace.len(), "Running stage");
            state = self.step(stage, &mut record, force, &mut progress).await;
        };

        info!(
            call_id = %record.id(),
            caller = %record.caller_number(),
            status = %status,
            steps = progress.trace.len(),
            "Call screening finished"
        );

        PipelineOutcome {
            status,
            trace: progress.trace,
            record,
            composition: progress.composition,
            delivery: progress.delivery,
            failure: progress.failure,
        }
    }

    /// Execute one stage and decide what comes next
    async fn step(
        &self,
        stage: Stage,
        record: &mut CallRecord,
        force: bool,
        progress: &mut Progress,
    ) -> RouteState {
        match stage {
            Stage::CheckTime => {
                if force {
                    record.force_after_hours();
                } else {
                    record.classify(&self.window);
                }
                info!(
                    call_time = %record.call_time(),
                    window = %self.window,
                    forced = force,
                    after_hours = record.is_after_hours(),
                    "Call classified"
                );
            }
            Stage::ComposeMessage => {
                let composition = match self
                    .composer
                    .compose(record.caller_name(), &record.call_time())
                    .await
                {
                    Ok(composition) => composition,
                    Err(error) => {
                        progress.failure = Some(PipelineFailure::Compose { error });
                        return RouteState::Done(Terminal::ComposeFailed);
                    }
                };
                if let Err(e) = record.set_message(composition.text.clone()) {
                    return Self::violated(progress, e.to_string());
                }
                progress.composition = Some(composition);
            }
            Stage::SendNotification => {
                let result = self
                    .sender
                    .send(record.caller_number(), record.message())
                    .await;
                if let Err(e) = record.mark_delivery_attempted() {
                    return Self::violated(progress, e.to_string());
                }
                let failed = result.error().cloned();
                progress.delivery = Some(result);
                if let Some(error) = failed {
                    progress.failure = Some(PipelineFailure::Delivery { error });
                    return RouteState::Done(Terminal::DeliveryFailed);
                }
            }
            Stage::MarkFollowUp => {
                if let Err(e) = record.mark_follow_up() {
                    return Self::violated(progress, e.to_string());
                }
                debug!(call_id = %record.id(), "Follow-up marked");
            }
        }

        next_state(record)
    }

    fn violated(progress: &mut Progress, message: String) -> RouteState {
        warn!(error = %message, "Stage violated a call record invariant");
        progress.failure = Some(PipelineFailure::InvariantViolated { message });
        RouteState::Done(Terminal::Stalled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::GenerationError;
    use crate::domain::value_objects::{GenerationFailurePolicy, DEFAULT_FALLBACK_MESSAGE};
    use crate::services::composer::MessageSource;
    use crate::services::fakes::{
        FailingGenerator, FailingMessenger, RecordingMessenger, ScriptedGenerator,
    };
    use chrono::{NaiveDate, NaiveDateTime};
    use std::sync::Arc;

    const CALLER: &str = "+923075861200";
    const REPLY: &str = "Hi Test Caller, I don't take calls after 2 AM. Reply with your email and a time (9 AM-6 PM) to meet.";

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 14)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn test_call(hour: u32, minute: u32) -> CallRecord {
        CallRecord::new(CALLER, at(hour, minute)).with_caller_name(Some("Test Caller"))
    }

    struct Harness {
        generator: Arc<ScriptedGenerator>,
        messenger: Arc<RecordingMessenger>,
        router: CallRouter,
    }

    fn harness() -> Harness {
        let generator = Arc::new(ScriptedGenerator::new(REPLY));
        let messenger = Arc::new(RecordingMessenger::new());
        let router = CallRouter::new(
            MessageComposer::new(generator.clone(), GenerationFailurePolicy::Propagate),
            NotificationSender::new(messenger.clone(), "+15005550006"),
        );
        Harness {
            generator,
            messenger,
            router,
        }
    }

    #[test]
    fn test_routing_rule() {
        let mut record = test_call(3, 30);
        assert_eq!(next_state(&record), RouteState::Done(Terminal::NoAction));

        record.classify(&AfterHoursWindow::default());
        assert_eq!(next_state(&record), RouteState::Run(Stage::ComposeMessage));

        record.set_message(REPLY).unwrap();
        assert_eq!(next_state(&record), RouteState::Run(Stage::SendNotification));

        record.mark_delivery_attempted().unwrap();
        assert_eq!(next_state(&record), RouteState::Run(Stage::MarkFollowUp));

        record.mark_follow_up().unwrap();
        assert_eq!(next_state(&record), RouteState::Done(Terminal::Handled));
    }

    #[tokio::test]
    async fn test_late_night_call_is_handled() {
        let h = harness();
        let outcome = h.router.run(test_call(3, 30)).await;

        assert_eq!(outcome.status, Terminal::Handled);
        assert_eq!(
            outcome.trace,
            vec![
                Stage::CheckTime,
                Stage::ComposeMessage,
                Stage::SendNotification,
                Stage::MarkFollowUp
            ]
        );
        assert_eq!(outcome.last_stage(), Some(Stage::MarkFollowUp));
        assert_eq!(outcome.message(), Some(REPLY));
        assert!(outcome.record.is_after_hours());
        assert!(outcome.record.delivery_attempted());
        assert!(outcome.record.follow_up_scheduled());
        assert!(outcome.failure.is_none());
        assert_eq!(
            outcome.composition.as_ref().map(|c| c.source),
            Some(MessageSource::Generated)
        );
        assert!(outcome.delivery.as_ref().is_some_and(|d| d.is_accepted()));

        let sent = h.messenger.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, CALLER);
        assert_eq!(sent[0].body, REPLY);
    }

    #[tokio::test]
    async fn test_business_hours_call_has_no_side_effects() {
        let h = harness();
        let outcome = h.router.run(test_call(11, 30)).await;

        assert_eq!(outcome.status, Terminal::NoAction);
        assert_eq!(outcome.trace, vec![Stage::CheckTime]);
        assert!(outcome.message().is_none());
        assert!(!outcome.record.delivery_attempted());
        assert!(!outcome.record.follow_up_scheduled());
        assert!(outcome.delivery.is_none());
        assert!(h.generator.prompts().is_empty());
        assert!(h.messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_every_within_hours_call_is_no_action() {
        let h = harness();
        for hour in (0..24).filter(|h| !(2..8).contains(h)) {
            let outcome = h.router.run(test_call(hour, 15)).await;
            assert_eq!(outcome.status, Terminal::NoAction, "hour {}", hour);
            assert!(!outcome.record.has_message());
            assert!(!outcome.record.delivery_attempted());
        }
        assert!(h.messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_mark_follow_up() {
        let messenger = Arc::new(FailingMessenger::new(DeliveryError::Rejected {
            status: 400,
            code: Some(21211),
            message: "Invalid 'To' Phone Number".into(),
        }));
        let router = CallRouter::new(
            MessageComposer::new(
                Arc::new(ScriptedGenerator::new(REPLY)),
                GenerationFailurePolicy::Propagate,
            ),
            NotificationSender::new(messenger.clone(), "+15005550006"),
        );

        let outcome = router.run(test_call(3, 30)).await;

        assert_eq!(outcome.status, Terminal::DeliveryFailed);
        assert_eq!(outcome.last_stage(), Some(Stage::SendNotification));
        assert!(outcome.record.delivery_attempted());
        assert!(!outcome.record.follow_up_scheduled());
        assert!(matches!(
            outcome.failure,
            Some(PipelineFailure::Delivery {
                error: DeliveryError::Rejected { status: 400, .. }
            })
        ));
        assert_eq!(messenger.attempts(), 1);
    }

    #[tokio::test]
    async fn test_propagated_compose_failure_skips_delivery() {
        let messenger = Arc::new(RecordingMessenger::new());
        let router = CallRouter::new(
            MessageComposer::new(
                Arc::new(FailingGenerator::new(GenerationError::Timeout { secs: 10 })),
                GenerationFailurePolicy::Propagate,
            ),
            NotificationSender::new(messenger.clone(), "+15005550006"),
        );

        let outcome = router.run(test_call(4, 0)).await;

        assert_eq!(outcome.status, Terminal::ComposeFailed);
        assert!(!outcome.record.has_message());
        assert!(!outcome.record.delivery_attempted());
        assert!(outcome.delivery.is_none());
        assert!(matches!(
            outcome.failure,
            Some(PipelineFailure::Compose { ref error })
                if error.source == GenerationError::Timeout { secs: 10 }
        ));
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_fallback_compose_still_handles_call() {
        let messenger = Arc::new(RecordingMessenger::new());
        let router = CallRouter::new(
            MessageComposer::new(
                Arc::new(FailingGenerator::new(GenerationError::RateLimited)),
                GenerationFailurePolicy::fallback(),
            ),
            NotificationSender::new(messenger.clone(), "+15005550006"),
        );

        let outcome = router.run(test_call(5, 45)).await;

        assert_eq!(outcome.status, Terminal::Handled);
        assert_eq!(outcome.message(), Some(DEFAULT_FALLBACK_MESSAGE));
        assert_eq!(
            outcome.composition.as_ref().map(|c| c.source),
            Some(MessageSource::Fallback)
        );
        assert_eq!(messenger.sent()[0].body, DEFAULT_FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn test_forced_run_ignores_clock() {
        let h = harness();
        let outcome = h.router.run_forced(test_call(11, 42)).await;

        assert_eq!(outcome.status, Terminal::Handled);
        assert_eq!(h.messenger.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_window() {
        let h = harness();
        let router = h
            .router
            .with_window(AfterHoursWindow::new(22, 24).unwrap());

        let outcome = router.run(test_call(3, 30)).await;
        assert_eq!(outcome.status, Terminal::NoAction);

        let outcome = router.run(test_call(23, 5)).await;
        assert_eq!(outcome.status, Terminal::Handled);
    }

    #[tokio::test]
    async fn test_step_limit_stops_the_driver() {
        let h = harness();
        let router = h.router.with_max_steps(2);

        let outcome = router.run(test_call(3, 30)).await;

        assert_eq!(outcome.status, Terminal::Stalled);
        assert_eq!(outcome.trace.len(), 2);
        assert_eq!(
            outcome.failure,
            Some(PipelineFailure::StepLimit { max_steps: 2 })
        );
        assert!(!outcome.record.delivery_attempted());
    }

    #[tokio::test]
    async fn test_outcome_serializes() {
        let h = harness();
        let outcome = h.router.run(test_call(3, 30)).await;

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "handled");
        assert_eq!(json["trace"][1], "compose_message");
        assert_eq!(json["delivery"]["result"], "accepted");
        assert_eq!(json["delivery"]["message_id"], "SM0001");
        assert!(json.get("failure").is_none());
    }
}
