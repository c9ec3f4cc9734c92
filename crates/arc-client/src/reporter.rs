//! Pod event reporting for workflow glue.
//!
//! Workflows tell the controller what they are doing by posting pod events.
//! [`WorkflowReporter`] produces the standard start/finish messages for one
//! POD and phase; [`PodEventSink`] is where they go.

use crate::client::{OperationOutcome, RcClient};
use crate::models::{EventLevel, PodEvent, PodState};
use crate::Result;
use async_trait::async_trait;
use tracing::warn;

/// Destination for pod events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PodEventSink: Send {
    /// Deliver one event and return the controller's answer.
    async fn record_event(&mut self, event: &PodEvent) -> Result<OperationOutcome>;
}

#[async_trait]
impl PodEventSink for RcClient {
    async fn record_event(&mut self, event: &PodEvent) -> Result<OperationOutcome> {
        self.create_pod_event(event).await
    }
}

/// Reports the progress of one workflow phase of one POD.
#[derive(Debug)]
pub struct WorkflowReporter<S> {
    sink: S,
    pod: String,
    phase: String,
}

impl<S: PodEventSink> WorkflowReporter<S> {
    /// Create a reporter for `phase` (e.g. `create`, `update`) of POD `pod`.
    pub fn new(sink: S, pod: impl Into<String>, phase: impl Into<String>) -> Self {
        Self {
            sink,
            pod: pod.into(),
            phase: phase.into(),
        }
    }

    /// POD UUID events are recorded against.
    #[must_use]
    pub fn pod(&self) -> &str {
        &self.pod
    }

    /// Workflow phase name.
    #[must_use]
    pub fn phase(&self) -> &str {
        &self.phase
    }

    /// Give back the sink.
    pub fn into_inner(self) -> S {
        self.sink
    }

    /// Announce that the workflow started.
    ///
    /// # Errors
    ///
    /// Returns an error if the event could not be delivered.
    pub async fn preamble(&mut self) -> Result<OperationOutcome> {
        let message = format!("Starting {} workflow for POD {}", self.phase, self.pod);
        self.info(message).await
    }

    /// Announce that the workflow finished and return the POD to `ACTIVE`.
    ///
    /// Both events are sent even if the controller rejects the first one; the
    /// outcome of the state change is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if either event could not be delivered.
    pub async fn postamble(&mut self) -> Result<OperationOutcome> {
        let message = format!("Finishing {} workflow for POD {}", self.phase, self.pod);
        self.info(message).await?;
        self.state_changed(PodState::Active).await
    }

    /// Record an informational message.
    ///
    /// # Errors
    ///
    /// Returns an error if the event could not be delivered.
    pub async fn info(&mut self, message: impl Into<String> + Send) -> Result<OperationOutcome> {
        self.report(EventLevel::Info, message.into()).await
    }

    /// Record a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the event could not be delivered.
    pub async fn warn(&mut self, message: impl Into<String> + Send) -> Result<OperationOutcome> {
        self.report(EventLevel::Warn, message.into()).await
    }

    /// Move the POD into `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if the event could not be delivered.
    pub async fn state_changed(&mut self, state: PodState) -> Result<OperationOutcome> {
        let event = PodEvent::state_change(self.pod.clone(), state);
        self.send(&event).await
    }

    async fn report(&mut self, level: EventLevel, message: String) -> Result<OperationOutcome> {
        let event = PodEvent::new(self.pod.clone(), level, message);
        self.send(&event).await
    }

    async fn send(&mut self, event: &PodEvent) -> Result<OperationOutcome> {
        let outcome = self.sink.record_event(event).await?;
        if !outcome.is_success() {
            warn!(
                pod = %self.pod,
                level = %event.level,
                status = outcome.status.as_u16(),
                "Controller did not accept pod event"
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arc_core::Error;
    use mockall::predicate::function;
    use mockall::Sequence;
    use reqwest::StatusCode;

    fn outcome(status: StatusCode) -> OperationOutcome {
        OperationOutcome {
            status,
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn preamble_message() {
        let mut sink = MockPodEventSink::new();
        sink.expect_record_event()
            .with(function(|event: &PodEvent| {
                event.uuid == "p-42"
                    && event.level == EventLevel::Info
                    && event.message == "Starting create workflow for POD p-42"
            }))
            .times(1)
            .returning(|_| Ok(outcome(StatusCode::CREATED)));

        let mut reporter = WorkflowReporter::new(sink, "p-42", "create");
        let result = reporter.preamble().await.unwrap();
        assert_eq!(result.status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn postamble_finishes_then_activates() {
        let mut sink = MockPodEventSink::new();
        let mut sequence = Sequence::new();

        sink.expect_record_event()
            .with(function(|event: &PodEvent| {
                event.level == EventLevel::Info
                    && event.message == "Finishing update workflow for POD p-7"
            }))
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(outcome(StatusCode::CREATED)));
        sink.expect_record_event()
            .with(function(|event: &PodEvent| {
                event.level == EventLevel::Status && event.message == "State changed to: ACTIVE"
            }))
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(outcome(StatusCode::CREATED)));

        let mut reporter = WorkflowReporter::new(sink, "p-7", "update");
        reporter.postamble().await.unwrap();
    }

    #[tokio::test]
    async fn postamble_continues_after_rejected_event() {
        let mut sink = MockPodEventSink::new();
        let mut sequence = Sequence::new();

        sink.expect_record_event()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(outcome(StatusCode::BAD_REQUEST)));
        sink.expect_record_event()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(outcome(StatusCode::CREATED)));

        let mut reporter = WorkflowReporter::new(sink, "p-7", "delete");
        let result = reporter.postamble().await.unwrap();
        assert_eq!(result.status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn delivery_error_propagates() {
        let mut sink = MockPodEventSink::new();
        sink.expect_record_event()
            .times(1)
            .returning(|_| Err(Error::Transport("connection refused".to_string())));

        let mut reporter = WorkflowReporter::new(sink, "p-1", "create");
        let err = reporter.warn("disk almost full").await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn state_change_event() {
        let mut sink = MockPodEventSink::new();
        sink.expect_record_event()
            .with(function(|event: &PodEvent| {
                event.level == EventLevel::Status && event.message == "State changed to: FAILED"
            }))
            .times(1)
            .returning(|_| Ok(outcome(StatusCode::CREATED)));

        let mut reporter = WorkflowReporter::new(sink, "p-3", "create");
        reporter.state_changed(PodState::Failed).await.unwrap();
        assert_eq!(reporter.pod(), "p-3");
        assert_eq!(reporter.phase(), "create");
    }
}
