//! Race engine
//!
//! Folds the event stream, in input order, into the competitor table and
//! produces one log line per accepted event:
//!
//! ```text
//! [09:05:59.867] The competitor(1) registered
//! [09:15:00.841] The start time for the competitor(1) was set by a draw to 09:30:00.000
//! ```
//!
//! Handlers never fail. An event whose extra parameter is missing or unusable is
//! skipped (no log line, no state change) and processing carries on.

use crate::clock;
use crate::competitor::{Competitor, CompetitorTable};
use crate::config::RaceConfig;
use crate::types::{Event, EventKind, Timestamp};
use chrono::Duration;
use serde::Serialize;

/// Counters describing what the engine did with the events it was given
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    /// Events that produced a log line
    pub applied_events: usize,
    /// Events with an unrecognized type code
    pub ignored_events: usize,
    /// Recognized events skipped because of a missing or invalid parameter
    pub rejected_events: usize,
}

/// The competitor state machine driven by the global event stream
pub struct RaceEngine {
    config: RaceConfig,
    /// Parsed once; `None` disables the late-start check
    start_delta: Option<Duration>,
    competitors: CompetitorTable,
    /// Timestamp of the last event seen (informational only)
    current_time: Option<Timestamp>,
    stats: EngineStats,
}

impl RaceEngine {
    /// Create an engine for one race
    pub fn new(config: RaceConfig) -> Self {
        let start_delta = config.start_delta();
        if start_delta.is_none() {
            log::warn!(
                "Cannot parse startDelta {:?}, late starts will not be disqualified",
                config.start_delta
            );
        }

        Self {
            config,
            start_delta,
            competitors: CompetitorTable::new(),
            current_time: None,
            stats: EngineStats::default(),
        }
    }

    /// Apply every event in order and collect the produced log lines
    pub fn run<'a, I>(&mut self, events: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        events
            .into_iter()
            .filter_map(|event| self.apply(event))
            .collect()
    }

    /// Apply a single event, returning its log line if it was accepted
    pub fn apply(&mut self, event: &Event) -> Option<String> {
        self.current_time = Some(event.timestamp);
        log::trace!(
            "[{}] {} for competitor {}",
            clock::format_timestamp(&event.timestamp),
            event.kind,
            event.competitor_id
        );

        let laps = self.config.laps as usize;
        let start_delta = self.start_delta;
        let competitor = self.competitors.get_or_insert(event.competitor_id);

        let message = match event.kind {
            EventKind::Registered => handle_registered(competitor),
            EventKind::StartTimeAssigned => handle_start_time_assigned(competitor, event),
            EventKind::OnStartLine => Some(format!(
                "The competitor({}) is on the start line",
                competitor.id
            )),
            EventKind::Started => handle_started(competitor, event, start_delta),
            EventKind::OnFiringRange => event.first_param().map(|range| {
                format!(
                    "The competitor({}) is on the firing range({})",
                    competitor.id, range
                )
            }),
            EventKind::TargetHit => handle_target_hit(competitor, event),
            EventKind::LeftFiringRange => Some(format!(
                "The competitor({}) left the firing range",
                competitor.id
            )),
            EventKind::EnteredPenaltyLaps => {
                competitor.penalty_starts.push(event.timestamp);
                Some(format!(
                    "The competitor({}) entered the penalty laps",
                    competitor.id
                ))
            }
            EventKind::LeftPenaltyLaps => {
                competitor.penalty_ends.push(event.timestamp);
                Some(format!(
                    "The competitor({}) left the penalty laps",
                    competitor.id
                ))
            }
            EventKind::EndedMainLap => handle_ended_main_lap(competitor, event, laps),
            EventKind::CannotContinue => handle_cannot_continue(competitor, event),
            EventKind::Unrecognized(code) => {
                log::debug!(
                    "Ignoring event with unknown type {} for competitor {}",
                    code,
                    event.competitor_id
                );
                self.stats.ignored_events += 1;
                return None;
            }
        };

        match message {
            Some(message) => {
                self.stats.applied_events += 1;
                Some(format!(
                    "[{}] {}",
                    clock::format_timestamp(&event.timestamp),
                    message
                ))
            }
            None => {
                log::debug!(
                    "Skipping {} event for competitor {}: bad parameters {:?}",
                    event.kind,
                    event.competitor_id,
                    event.params
                );
                self.stats.rejected_events += 1;
                None
            }
        }
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// The competitor table as folded so far
    pub fn competitors(&self) -> &CompetitorTable {
        &self.competitors
    }

    /// Timestamp of the last applied event
    pub fn current_time(&self) -> Option<Timestamp> {
        self.current_time
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }
}

fn handle_registered(competitor: &mut Competitor) -> Option<String> {
    competitor.registered = true;
    Some(format!("The competitor({}) registered", competitor.id))
}

fn handle_start_time_assigned(competitor: &mut Competitor, event: &Event) -> Option<String> {
    let raw = event.first_param()?;
    let assigned = clock::parse_timestamp(raw).ok()?;
    competitor.assigned_start = Some(assigned);
    Some(format!(
        "The start time for the competitor({}) was set by a draw to {}",
        competitor.id, raw
    ))
}

fn handle_started(
    competitor: &mut Competitor,
    event: &Event,
    start_delta: Option<Duration>,
) -> Option<String> {
    competitor.actual_start = Some(event.timestamp);

    if let (Some(assigned), Some(delta)) = (competitor.assigned_start, start_delta) {
        // Starting exactly at assigned + delta is still allowed
        if event.timestamp.signed_duration_since(assigned) > delta {
            log::debug!(
                "Competitor {} started late at {} (assigned {})",
                competitor.id,
                clock::format_timestamp(&event.timestamp),
                clock::format_timestamp(&assigned)
            );
            competitor.disqualified = true;
        }
    }

    Some(format!("The competitor({}) has started", competitor.id))
}

fn handle_target_hit(competitor: &mut Competitor, event: &Event) -> Option<String> {
    let target = event.first_param()?;
    competitor.hits += 1;
    Some(format!(
        "The target({}) has been hit by competitor({})",
        target, competitor.id
    ))
}

fn handle_ended_main_lap(
    competitor: &mut Competitor,
    event: &Event,
    laps: usize,
) -> Option<String> {
    competitor.lap_ends.push(event.timestamp);

    if competitor.lap_ends.len() == laps && !competitor.cannot_continue {
        competitor.finished = true;
        competitor.actual_finish = Some(event.timestamp);
    }

    Some(format!("The competitor({}) ended the main lap", competitor.id))
}

fn handle_cannot_continue(competitor: &mut Competitor, event: &Event) -> Option<String> {
    let reason = event.joined_params();
    let message = format!("The competitor({}) can't continue: {}", competitor.id, reason);
    competitor.cannot_continue = true;
    competitor.cannot_continue_reason = Some(reason);
    Some(message)
}
