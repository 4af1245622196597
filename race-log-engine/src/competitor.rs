//! Competitor state and the id-indexed competitor table
//!
//! Records are created on the first event that references an id and live for the
//! whole run. Only the race engine mutates them.

use crate::types::{CompetitorId, Timestamp};
use chrono::Duration;
use serde::Serialize;
use std::collections::HashMap;

/// Race state of a single competitor
#[derive(Debug, Clone, PartialEq)]
pub struct Competitor {
    /// Competitor id from the event stream
    pub id: CompetitorId,
    /// True once a registration event was seen
    pub registered: bool,
    /// Start time set by the draw
    pub assigned_start: Option<Timestamp>,
    /// Time the competitor actually started
    pub actual_start: Option<Timestamp>,
    /// Time the final lap was completed
    pub actual_finish: Option<Timestamp>,
    /// True once the configured number of laps was completed
    pub finished: bool,
    /// True if the competitor started later than allowed
    pub disqualified: bool,
    /// True if the competitor withdrew
    pub cannot_continue: bool,
    /// Free-text withdrawal reason
    pub cannot_continue_reason: Option<String>,
    /// End time of every completed main lap, in order
    pub lap_ends: Vec<Timestamp>,
    /// Times the competitor entered the penalty laps
    pub penalty_starts: Vec<Timestamp>,
    /// Times the competitor left the penalty laps
    pub penalty_ends: Vec<Timestamp>,
    /// Number of targets hit
    pub hits: u32,
}

impl Competitor {
    /// Create a fresh, unregistered competitor
    pub fn new(id: CompetitorId) -> Self {
        Self {
            id,
            registered: false,
            assigned_start: None,
            actual_start: None,
            actual_finish: None,
            finished: false,
            disqualified: false,
            cannot_continue: false,
            cannot_continue_reason: None,
            lap_ends: Vec::new(),
            penalty_starts: Vec::new(),
            penalty_ends: Vec::new(),
            hits: 0,
        }
    }

    /// Finish minus assigned start, for finished competitors with both times known
    pub fn total_time(&self) -> Option<Duration> {
        if !self.finished {
            return None;
        }
        match (self.actual_finish, self.assigned_start) {
            (Some(finish), Some(start)) => Some(finish.signed_duration_since(start)),
            _ => None,
        }
    }

    /// Sum of `end - start` over index-aligned penalty segments
    ///
    /// A penalty start without a matching end contributes nothing.
    pub fn penalty_time(&self) -> Duration {
        self.penalty_starts
            .iter()
            .zip(&self.penalty_ends)
            .fold(Duration::zero(), |acc, (start, end)| {
                acc + end.signed_duration_since(*start)
            })
    }

    /// Final status, checked in precedence order
    pub fn status(&self) -> RaceStatus {
        if self.finished {
            RaceStatus::Finished
        } else if self.disqualified {
            RaceStatus::NotStarted
        } else if self.cannot_continue {
            RaceStatus::NotFinished
        } else {
            RaceStatus::Unknown
        }
    }
}

/// Final status of a competitor in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RaceStatus {
    Finished,
    NotStarted,
    NotFinished,
    Unknown,
}

/// Arena of competitor records addressed by competitor id
#[derive(Debug, Clone, Default)]
pub struct CompetitorTable {
    /// Records in order of first appearance
    competitors: Vec<Competitor>,
    /// Key: competitor id, Value: slot in `competitors`
    index: HashMap<CompetitorId, usize>,
}

impl CompetitorTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the record for `id`, creating it on first reference
    pub fn get_or_insert(&mut self, id: CompetitorId) -> &mut Competitor {
        let slot = match self.index.get(&id) {
            Some(&slot) => slot,
            None => {
                let slot = self.competitors.len();
                self.competitors.push(Competitor::new(id));
                self.index.insert(id, slot);
                log::trace!("Created record for competitor {}", id);
                slot
            }
        };
        &mut self.competitors[slot]
    }

    /// Look up a competitor by id
    pub fn get(&self, id: CompetitorId) -> Option<&Competitor> {
        self.index.get(&id).map(|&slot| &self.competitors[slot])
    }

    /// Iterate over all records in order of first appearance
    pub fn iter(&self) -> impl Iterator<Item = &Competitor> {
        self.competitors.iter()
    }

    /// Iterate over registered competitors only
    pub fn registered(&self) -> impl Iterator<Item = &Competitor> {
        self.competitors.iter().filter(|c| c.registered)
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn t(h: u32, m: u32, s: u32, ms: u32) -> Timestamp {
        NaiveTime::from_hms_milli_opt(h, m, s, ms).unwrap()
    }

    #[test]
    fn test_table_creates_once() {
        let mut table = CompetitorTable::new();
        assert!(table.is_empty());

        table.get_or_insert(3).registered = true;
        table.get_or_insert(1);
        table.get_or_insert(3).hits += 1;

        assert_eq!(table.len(), 2);
        let c3 = table.get(3).unwrap();
        assert!(c3.registered);
        assert_eq!(c3.hits, 1);
        assert!(table.get(2).is_none());

        let ids: Vec<CompetitorId> = table.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 1]);
        let registered: Vec<CompetitorId> = table.registered().map(|c| c.id).collect();
        assert_eq!(registered, vec![3]);
    }

    #[test]
    fn test_total_time_requires_finish_and_assigned_start() {
        let mut c = Competitor::new(1);
        c.assigned_start = Some(t(9, 30, 0, 0));
        c.actual_finish = Some(t(10, 0, 0, 500));
        assert_eq!(c.total_time(), None);

        c.finished = true;
        assert_eq!(c.total_time(), Some(Duration::milliseconds(1_800_500)));

        c.assigned_start = None;
        assert_eq!(c.total_time(), None);
    }

    #[test]
    fn test_penalty_time_ignores_unmatched_start() {
        let mut c = Competitor::new(1);
        c.penalty_starts = vec![t(9, 49, 55, 915), t(10, 10, 0, 0)];
        c.penalty_ends = vec![t(9, 51, 48, 391)];
        assert_eq!(c.penalty_time(), Duration::milliseconds(112_476));

        c.penalty_ends.clear();
        assert_eq!(c.penalty_time(), Duration::zero());
    }

    #[test]
    fn test_status_precedence() {
        let mut c = Competitor::new(1);
        assert_eq!(c.status(), RaceStatus::Unknown);

        c.cannot_continue = true;
        assert_eq!(c.status(), RaceStatus::NotFinished);

        c.disqualified = true;
        assert_eq!(c.status(), RaceStatus::NotStarted);

        c.finished = true;
        assert_eq!(c.status(), RaceStatus::Finished);
    }
}
