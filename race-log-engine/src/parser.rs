//! Event stream parser
//!
//! Turns the raw event text into an ordered list of [`Event`]s. Each line has the
//! shape `[HH:MM:SS.mmm] <type> <competitor> [extra tokens...]`.
//!
//! Malformed lines never abort parsing: they are skipped, counted in
//! [`ParseStats`] and reported at debug level.

use crate::clock;
use crate::types::{CompetitorId, Event, EventKind, RaceError, Result};
use serde::Serialize;

/// Counters describing one pass over the event text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Lines seen, including blank ones
    pub total_lines: usize,
    /// Lines that were empty after trimming
    pub blank_lines: usize,
    /// Non-blank lines that could not be parsed
    pub dropped_lines: usize,
}

impl ParseStats {
    /// Number of lines that became events
    pub fn parsed_lines(&self) -> usize {
        self.total_lines - self.blank_lines - self.dropped_lines
    }
}

/// Parsed events in input order, plus parse counters
#[derive(Debug, Clone, Default)]
pub struct ParsedEvents {
    pub events: Vec<Event>,
    pub stats: ParseStats,
}

/// Parse every line of the event text, keeping input order
pub fn parse_events(input: &str) -> ParsedEvents {
    let mut parsed = ParsedEvents::default();

    for (index, raw) in input.lines().enumerate() {
        parsed.stats.total_lines += 1;

        let line = raw.trim();
        if line.is_empty() {
            parsed.stats.blank_lines += 1;
            continue;
        }

        match parse_event_line(line) {
            Ok(event) => parsed.events.push(event),
            Err(e) => {
                parsed.stats.dropped_lines += 1;
                log::debug!("Dropping event line {}: {}", index + 1, e);
            }
        }
    }

    log::debug!(
        "Parsed {} events from {} lines ({} dropped)",
        parsed.events.len(),
        parsed.stats.total_lines,
        parsed.stats.dropped_lines
    );

    parsed
}

/// Parse a single, already trimmed, event line
pub fn parse_event_line(line: &str) -> Result<Event> {
    let close = line
        .find(']')
        .ok_or_else(|| RaceError::MalformedEvent(format!("missing ']' in {:?}", line)))?;

    let time_str = line[..close].strip_prefix('[').ok_or_else(|| {
        RaceError::MalformedEvent(format!("missing '[' before timestamp in {:?}", line))
    })?;
    let timestamp = clock::parse_timestamp(time_str)?;

    let mut fields = line[close + 1..].split_whitespace();
    let (code, competitor) = match (fields.next(), fields.next()) {
        (Some(code), Some(competitor)) => (code, competitor),
        _ => {
            return Err(RaceError::MalformedEvent(format!(
                "expected event type and competitor id in {:?}",
                line
            )))
        }
    };

    let code: i64 = code
        .parse()
        .map_err(|_| RaceError::MalformedEvent(format!("invalid event type {:?}", code)))?;
    let competitor_id: CompetitorId = competitor.parse().map_err(|_| {
        RaceError::MalformedEvent(format!("invalid competitor id {:?}", competitor))
    })?;

    Ok(Event {
        timestamp,
        kind: EventKind::from_code(code),
        competitor_id,
        params: fields.map(str::to_string).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_parse_simple_line() {
        let event = parse_event_line("[09:05:59.867] 1 1").unwrap();
        assert_eq!(event.timestamp, NaiveTime::from_hms_milli_opt(9, 5, 59, 867).unwrap());
        assert_eq!(event.kind, EventKind::Registered);
        assert_eq!(event.competitor_id, 1);
        assert!(event.params.is_empty());
    }

    #[test]
    fn test_parse_extra_params() {
        let event = parse_event_line("[09:59:03.872] 11 1 Lost in   the forest").unwrap();
        assert_eq!(event.kind, EventKind::CannotContinue);
        assert_eq!(event.params, vec!["Lost", "in", "the", "forest"]);
        assert_eq!(event.joined_params(), "Lost in the forest");

        let event = parse_event_line("[09:15:00.841] 2 1 09:30:00.000").unwrap();
        assert_eq!(event.first_param(), Some("09:30:00.000"));
    }

    #[test]
    fn test_unrecognized_code_still_parses() {
        let event = parse_event_line("[09:15:00.841] 42 7").unwrap();
        assert_eq!(event.kind, EventKind::Unrecognized(42));
        assert_eq!(event.competitor_id, 7);
    }

    #[test]
    fn test_malformed_lines() {
        assert!(parse_event_line("09:05:59.867 1 1").is_err());
        assert!(parse_event_line("09:05:59.867] 1 1").is_err());
        assert!(parse_event_line("[09:05:59] 1 1").is_err());
        assert!(parse_event_line("[9 o'clock] 1 1").is_err());
        assert!(parse_event_line("[09:05:59.867] 1").is_err());
        assert!(parse_event_line("[09:05:59.867]").is_err());
        assert!(parse_event_line("[09:05:59.867] one 1").is_err());
        assert!(parse_event_line("[09:05:59.867] 1 first").is_err());
    }

    #[test]
    fn test_parse_events_keeps_input_order_and_counts_drops() {
        let input = "\
[09:30:01.005] 4 1

[09:05:59.867] 1 1
garbage line
   [09:15:00.841] 2 1 09:30:00.000
[09:15:00.841] 2 x 09:30:00.000";

        let parsed = parse_events(input);
        let kinds: Vec<EventKind> = parsed.events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::Started, EventKind::Registered, EventKind::StartTimeAssigned]
        );

        assert_eq!(parsed.stats.total_lines, 6);
        assert_eq!(parsed.stats.blank_lines, 1);
        assert_eq!(parsed.stats.dropped_lines, 2);
        assert_eq!(parsed.stats.parsed_lines(), 3);
    }

    #[test]
    fn test_parse_empty_input() {
        let parsed = parse_events("");
        assert!(parsed.events.is_empty());
        assert_eq!(parsed.stats, ParseStats::default());
    }
}
