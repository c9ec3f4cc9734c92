//! Pod event models shared by the client and workflow reporters.
//!
//! Resource bodies are passed through as opaque text; pod events are the one
//! payload the client itself produces, so they get typed models.

use arc_core::Error;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp layout the controller uses for pod events.
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Severity of a pod event.
///
/// `Status` events are interpreted by the controller: a message of the form
/// `State changed to: <STATE>` moves the POD into that state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventLevel {
    /// Informational progress message
    Info,
    /// Something went wrong but the workflow continues
    Warn,
    /// The workflow failed
    Error,
    /// POD state transition
    Status,
}

impl EventLevel {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Status => "STATUS",
        }
    }
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            "STATUS" => Ok(Self::Status),
            _ => Err(Error::InvalidRequest(format!("Unknown event level: {s}"))),
        }
    }
}

/// Lifecycle states of a POD.
///
/// ```text
/// NEW ----> WORKFLOW <---> ACTIVE
///  |          |  ^
///  |          |  +-------> FAILED
///  |          V
///  +------> DEAD --------> ZOMBIE
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PodState {
    /// No workflow has run yet
    New,
    /// A workflow is running
    Workflow,
    /// Idle, last workflow succeeded
    Active,
    /// Idle, last workflow failed
    Failed,
    /// Deleted
    Dead,
    /// Deleted and its edgesite reused
    Zombie,
}

impl PodState {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Workflow => "WORKFLOW",
            Self::Active => "ACTIVE",
            Self::Failed => "FAILED",
            Self::Dead => "DEAD",
            Self::Zombie => "ZOMBIE",
        }
    }
}

impl fmt::Display for PodState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/v1/podevent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PodEvent {
    /// UUID of the POD the event belongs to.
    pub uuid: String,
    /// Event level.
    pub level: EventLevel,
    /// Free-form message.
    pub message: String,
    /// Event time; the controller stamps the current time when absent.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "event_time")]
    pub time: Option<NaiveDateTime>,
}

impl PodEvent {
    /// Create an event without an explicit time.
    #[must_use]
    pub fn new(uuid: impl Into<String>, level: EventLevel, message: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            level,
            message: message.into(),
            time: None,
        }
    }

    /// Informational event.
    #[must_use]
    pub fn info(uuid: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(uuid, EventLevel::Info, message)
    }

    /// Status event moving the POD into `state`.
    #[must_use]
    pub fn state_change(uuid: impl Into<String>, state: PodState) -> Self {
        Self::new(uuid, EventLevel::Status, format!("State changed to: {state}"))
    }

    /// Attach an explicit event time.
    #[must_use]
    pub fn with_time(mut self, time: NaiveDateTime) -> Self {
        self.time = Some(time);
        self
    }
}

/// One entry of `GET /api/v1/podevent/{uuid}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PodEventRecord {
    /// When the controller recorded the event.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "event_time")]
    pub time: Option<NaiveDateTime>,
    /// Event level.
    pub level: EventLevel,
    /// Message text.
    pub message: String,
}

/// JSON body of `GET /api/v1/podevent/{uuid}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PodEventList {
    /// Events in the order the controller returned them.
    #[serde(default)]
    pub events: Vec<PodEventRecord>,
}

impl PodEventList {
    /// Parse a JSON event listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON event listing.
    pub fn from_json(body: &str) -> crate::Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| Error::MalformedResponse(format!("Invalid pod event listing: {e}")))
    }
}

mod event_time {
    use super::EVENT_TIME_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    // Server timestamps may carry a fractional part ("2019-05-01 12:00:00.0").
    const PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

    pub fn serialize<S>(time: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(time) => serializer.serialize_str(&time.format(EVENT_TIME_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => NaiveDateTime::parse_from_str(text, PARSE_FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn sample_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 5, 1)
            .unwrap()
            .and_hms_opt(12, 30, 5)
            .unwrap()
    }

    #[test]
    fn pod_event_serializes_without_time() {
        let event = PodEvent::info("1234", "Starting create workflow for POD 1234");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "uuid": "1234",
                "level": "INFO",
                "message": "Starting create workflow for POD 1234"
            })
        );
    }

    #[test]
    fn pod_event_serializes_time_in_controller_format() {
        let event = PodEvent::new("1234", EventLevel::Warn, "slow").with_time(sample_time());
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["time"], "2019-05-01 12:30:05");
        assert_eq!(value["level"], "WARN");
    }

    #[test]
    fn state_change_message() {
        let event = PodEvent::state_change("abcd", PodState::Active);
        assert_eq!(event.level, EventLevel::Status);
        assert_eq!(event.message, "State changed to: ACTIVE");
    }

    #[test]
    fn event_listing_parses_server_timestamps() {
        let body = r#"{"events":[
            {"time":"2019-05-01 12:30:05.0","level":"INFO","message":"Workflow fetched"},
            {"time":"2019-05-01 12:31:00","level":"STATUS","message":"State changed to: ACTIVE"}
        ]}"#;

        let list = PodEventList::from_json(body).unwrap();
        assert_eq!(list.events.len(), 2);
        assert_eq!(list.events[0].time, Some(sample_time()));
        assert_eq!(list.events[1].level, EventLevel::Status);
    }

    #[test]
    fn event_listing_rejects_non_json() {
        let err = PodEventList::from_json("events: []").unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_RESPONSE");
    }

    #[test]
    fn event_level_parsing() {
        assert_eq!("status".parse::<EventLevel>().unwrap(), EventLevel::Status);
        assert_eq!("Warning".parse::<EventLevel>().unwrap(), EventLevel::Warn);
        assert!(matches!(
            "debug".parse::<EventLevel>(),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn pod_state_names() {
        assert_eq!(PodState::Workflow.to_string(), "WORKFLOW");
        let parsed: PodState = serde_json::from_str("\"ZOMBIE\"").unwrap();
        assert_eq!(parsed, PodState::Zombie);
    }
}
