//! Final report generation
//!
//! Turns the folded competitor table into ranked per-competitor statistics. Each
//! row renders as one report line:
//!
//! ```text
//! [NotFinished] 1 [{00:29:03.872, 2.094}, {,}] {00:01:52.476, 0.445} 4/5
//! ```

use crate::clock;
use crate::competitor::{Competitor, CompetitorTable, RaceStatus};
use crate::config::RaceConfig;
use crate::types::CompetitorId;
use chrono::Duration;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Duration and average speed over a timed segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentStat {
    #[serde(serialize_with = "serialize_duration")]
    pub duration: Duration,
    /// Meters per second, 0.0 when the duration is not positive
    pub speed: f64,
}

impl SegmentStat {
    /// Stat for `distance` meters covered in `duration`
    pub fn new(duration: Duration, distance: f64) -> Self {
        Self {
            duration,
            speed: clock::speed(distance, duration),
        }
    }
}

impl fmt::Display for SegmentStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}, {:.3}}}",
            clock::format_duration(self.duration),
            self.speed
        )
    }
}

/// One ranked row of the final report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitorSummary {
    pub id: CompetitorId,
    pub status: RaceStatus,
    /// Finish minus assigned start, finished competitors only
    #[serde(serialize_with = "serialize_optional_duration")]
    pub total_time: Option<Duration>,
    /// One entry per configured lap; `None` if the lap has no known duration
    pub laps: Vec<Option<SegmentStat>>,
    /// Aggregate over all matched penalty segments
    pub penalty: SegmentStat,
    pub hits: u32,
    pub total_targets: u64,
    /// Withdrawal reason, if the competitor could not continue
    pub reason: Option<String>,
}

impl CompetitorSummary {
    /// Compute the statistics for one competitor
    pub fn from_competitor(competitor: &Competitor, config: &RaceConfig) -> Self {
        Self {
            id: competitor.id,
            status: competitor.status(),
            total_time: competitor.total_time(),
            laps: lap_stats(competitor, config),
            penalty: SegmentStat::new(competitor.penalty_time(), config.penalty_len),
            hits: competitor.hits,
            total_targets: config.total_targets(),
            reason: competitor.cannot_continue_reason.clone(),
        }
    }

    /// Bracketed status marker at the start of the report line
    pub fn status_prefix(&self) -> String {
        match self.status {
            RaceStatus::Finished => format!(
                "[{}]",
                clock::format_duration(self.total_time.unwrap_or_else(Duration::zero))
            ),
            RaceStatus::NotStarted => "[NotStarted]".to_string(),
            RaceStatus::NotFinished => "[NotFinished]".to_string(),
            RaceStatus::Unknown => "[Unknown]".to_string(),
        }
    }
}

impl fmt::Display for CompetitorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let laps: Vec<String> = self
            .laps
            .iter()
            .map(|lap| match lap {
                Some(stat) => stat.to_string(),
                None => "{,}".to_string(),
            })
            .collect();

        write!(
            f,
            "{} {} [{}] {} {}/{}",
            self.status_prefix(),
            self.id,
            laps.join(", "),
            self.penalty,
            self.hits,
            self.total_targets
        )
    }
}

/// Per-lap statistics for every configured lap
///
/// Lap 0 is measured from the assigned start, and only when the competitor
/// actually started; later laps from the previous lap end.
fn lap_stats(competitor: &Competitor, config: &RaceConfig) -> Vec<Option<SegmentStat>> {
    (0..config.laps as usize)
        .map(|lap| {
            let end = *competitor.lap_ends.get(lap)?;
            let start = if lap == 0 {
                competitor.actual_start.and(competitor.assigned_start)?
            } else {
                competitor.lap_ends[lap - 1]
            };
            Some(SegmentStat::new(
                end.signed_duration_since(start),
                config.lap_len,
            ))
        })
        .collect()
}

/// Ranking order between two registered competitors
///
/// Finished competitors come first by ascending total time. Among the rest, a
/// withdrawn competitor precedes a disqualified one; every other pair falls
/// back to ascending id.
pub fn compare_competitors(a: &Competitor, b: &Competitor) -> Ordering {
    match (a.finished, b.finished) {
        (true, true) => {
            let total = |c: &Competitor| c.total_time().unwrap_or_else(Duration::zero);
            total(a).cmp(&total(b)).then_with(|| a.id.cmp(&b.id))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => {
            let a_first = a.cannot_continue && b.disqualified;
            let b_first = b.cannot_continue && a.disqualified;
            match (a_first, b_first) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => a.id.cmp(&b.id),
            }
        }
    }
}

/// Sort competitors in report order
///
/// `compare_competitors` is not transitive across all status combinations, so
/// this uses a stable insertion sort over id-ordered input instead of
/// `sort_by`, which may panic on such comparators.
pub fn rank(competitors: &mut [&Competitor]) {
    competitors.sort_by_key(|c| c.id);

    for i in 1..competitors.len() {
        let mut j = i;
        while j > 0 && compare_competitors(competitors[j], competitors[j - 1]) == Ordering::Less {
            competitors.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Ranked summaries of all registered competitors
pub fn build_summaries(table: &CompetitorTable, config: &RaceConfig) -> Vec<CompetitorSummary> {
    let mut registered: Vec<&Competitor> = table.registered().collect();
    rank(&mut registered);

    log::debug!(
        "Building report for {} of {} competitors",
        registered.len(),
        table.len()
    );

    registered
        .into_iter()
        .map(|c| CompetitorSummary::from_competitor(c, config))
        .collect()
}

/// Report text: one line per ranked competitor
pub fn format_report(summaries: &[CompetitorSummary]) -> String {
    summaries
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn serialize_duration<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&clock::format_duration(*duration))
}

fn serialize_optional_duration<S: Serializer>(
    duration: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match duration {
        Some(duration) => serialize_duration(duration, serializer),
        None => serializer.serialize_none(),
    }
}
