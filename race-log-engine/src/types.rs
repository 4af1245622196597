//! Core types for the race log engine
//!
//! This module defines the fundamental types shared by the parser, the engine and
//! the summary builder: timestamps, the closed set of race event kinds, and the
//! error type.

use chrono::NaiveTime;
use serde::Serialize;
use std::fmt;

/// Time-of-day timestamp with millisecond precision used throughout the engine
pub type Timestamp = NaiveTime;

/// Competitor identifier as it appears in the event stream
pub type CompetitorId = i64;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, RaceError>;

/// Errors that can occur while loading a race or parsing its input
#[derive(Debug, thiserror::Error)]
pub enum RaceError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParseError(#[from] serde_json::Error),

    #[error("Malformed event line: {0}")]
    MalformedEvent(String),

    #[error("Invalid time of day: {0:?}")]
    InvalidTime(String),

    #[error("Invalid duration: {0:?}")]
    InvalidDuration(String),
}

/// The closed set of race events, keyed by their numeric type code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    /// 1: the competitor registered
    Registered,
    /// 2: the start time was set by a draw (extra: start time)
    StartTimeAssigned,
    /// 3: the competitor is on the start line
    OnStartLine,
    /// 4: the competitor has started
    Started,
    /// 5: the competitor is on the firing range (extra: range id)
    OnFiringRange,
    /// 6: a target has been hit (extra: target id)
    TargetHit,
    /// 7: the competitor left the firing range
    LeftFiringRange,
    /// 8: the competitor entered the penalty laps
    EnteredPenaltyLaps,
    /// 9: the competitor left the penalty laps
    LeftPenaltyLaps,
    /// 10: the competitor ended the main lap
    EndedMainLap,
    /// 11: the competitor can't continue (extra: free-text reason)
    CannotContinue,
    /// Any other type code; parsed but never acted upon
    Unrecognized(i64),
}

impl EventKind {
    /// Map a numeric type code onto an event kind
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => EventKind::Registered,
            2 => EventKind::StartTimeAssigned,
            3 => EventKind::OnStartLine,
            4 => EventKind::Started,
            5 => EventKind::OnFiringRange,
            6 => EventKind::TargetHit,
            7 => EventKind::LeftFiringRange,
            8 => EventKind::EnteredPenaltyLaps,
            9 => EventKind::LeftPenaltyLaps,
            10 => EventKind::EndedMainLap,
            11 => EventKind::CannotContinue,
            other => EventKind::Unrecognized(other),
        }
    }

    /// The numeric type code of this event kind
    pub fn code(&self) -> i64 {
        match self {
            EventKind::Registered => 1,
            EventKind::StartTimeAssigned => 2,
            EventKind::OnStartLine => 3,
            EventKind::Started => 4,
            EventKind::OnFiringRange => 5,
            EventKind::TargetHit => 6,
            EventKind::LeftFiringRange => 7,
            EventKind::EnteredPenaltyLaps => 8,
            EventKind::LeftPenaltyLaps => 9,
            EventKind::EndedMainLap => 10,
            EventKind::CannotContinue => 11,
            EventKind::Unrecognized(code) => *code,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, EventKind::Unrecognized(_))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Unrecognized(code) => write!(f, "Unrecognized({})", code),
            other => write!(f, "{:?}", other),
        }
    }
}

/// A single parsed line of the event stream
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Time of day the event happened
    pub timestamp: Timestamp,
    /// What happened
    pub kind: EventKind,
    /// Competitor the event refers to
    pub competitor_id: CompetitorId,
    /// Remaining tokens of the line, verbatim
    pub params: Vec<String>,
}

impl Event {
    /// First extra token, if any
    pub fn first_param(&self) -> Option<&str> {
        self.params.first().map(String::as_str)
    }

    /// All extra tokens rejoined with single spaces
    pub fn joined_params(&self) -> String {
        self.params.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_codes() {
        for code in 1..=11 {
            let kind = EventKind::from_code(code);
            assert!(kind.is_recognized());
            assert_eq!(kind.code(), code);
        }

        assert_eq!(EventKind::from_code(0), EventKind::Unrecognized(0));
        assert_eq!(EventKind::from_code(12), EventKind::Unrecognized(12));
        assert!(!EventKind::from_code(-3).is_recognized());
    }

    #[test]
    fn test_event_params() {
        let event = Event {
            timestamp: NaiveTime::from_hms_milli_opt(9, 59, 3, 872).unwrap(),
            kind: EventKind::CannotContinue,
            competitor_id: 1,
            params: vec!["Lost".into(), "in".into(), "the".into(), "forest".into()],
        };
        assert_eq!(event.first_param(), Some("Lost"));
        assert_eq!(event.joined_params(), "Lost in the forest");
    }

    #[test]
    fn test_error_display() {
        let err = RaceError::InvalidTime("9:3".to_string());
        assert_eq!(err.to_string(), "Invalid time of day: \"9:3\"");
    }
}
