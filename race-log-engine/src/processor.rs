//! Main race processing API
//!
//! `RaceProcessor` is the entry point for the library: it owns the configuration,
//! the parsed event stream and the engine, and produces the two outputs of a
//! run (the event log and the final report).

use crate::competitor::Competitor;
use crate::config::RaceConfig;
use crate::engine::{EngineStats, RaceEngine};
use crate::parser::{self, ParseStats};
use crate::summary::{self, CompetitorSummary};
use crate::types::{CompetitorId, Event, Result};

/// One race: configuration, events and the resulting competitor state
pub struct RaceProcessor {
    events: Vec<Event>,
    parse_stats: ParseStats,
    engine: RaceEngine,
    /// Log lines, filled by the first `process_events` call
    log_lines: Option<Vec<String>>,
}

impl RaceProcessor {
    /// Create a processor from a validated configuration and raw event text
    pub fn new(config: RaceConfig, events: &str) -> Self {
        let parsed = parser::parse_events(events);
        log::info!(
            "Loaded {} events for a {}-lap race ({} lines dropped)",
            parsed.events.len(),
            config.laps,
            parsed.stats.dropped_lines
        );

        Self {
            events: parsed.events,
            parse_stats: parsed.stats,
            engine: RaceEngine::new(config),
            log_lines: None,
        }
    }

    /// Create a processor from JSON configuration text and raw event text
    ///
    /// Fails without reading any event if the configuration is invalid.
    ///
    /// # Example
    /// ```
    /// use race_log_engine::RaceProcessor;
    ///
    /// let config = r#"{"laps": 1, "lapLen": 3000, "penaltyLen": 150,
    ///     "firingLines": 1, "start": "10:00:00.000", "startDelta": "00:01:30"}"#;
    /// let events = "[09:00:00.000] 1 7";
    ///
    /// let mut processor = RaceProcessor::from_sources(config, events).unwrap();
    /// assert_eq!(processor.process_events(), "[09:00:00.000] The competitor(7) registered");
    /// assert_eq!(
    ///     processor.generate_summary(),
    ///     "[Unknown] 7 [{,}] {00:00:00.000, 0.000} 0/5"
    /// );
    /// ```
    pub fn from_sources(config: &str, events: &str) -> Result<Self> {
        let config = RaceConfig::from_json_str(config)?;
        Ok(Self::new(config, events))
    }

    /// Run the engine over all events and return the log text
    ///
    /// Events are applied once; later calls return the same log.
    pub fn process_events(&mut self) -> String {
        if self.log_lines.is_none() {
            let lines = self.engine.run(&self.events);
            let stats = self.engine.stats();
            log::debug!(
                "Applied {} events ({} unknown, {} rejected)",
                stats.applied_events,
                stats.ignored_events,
                stats.rejected_events
            );
            self.log_lines = Some(lines);
        }

        self.log_lines
            .as_deref()
            .map(|lines| lines.join("\n"))
            .unwrap_or_default()
    }

    /// Ranked summaries of registered competitors
    pub fn summaries(&self) -> Vec<CompetitorSummary> {
        summary::build_summaries(self.engine.competitors(), self.engine.config())
    }

    /// Report text, one line per ranked competitor
    pub fn generate_summary(&self) -> String {
        summary::format_report(&self.summaries())
    }

    pub fn config(&self) -> &RaceConfig {
        self.engine.config()
    }

    /// Parsed events in input order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn parse_stats(&self) -> ParseStats {
        self.parse_stats
    }

    pub fn engine_stats(&self) -> EngineStats {
        self.engine.stats()
    }

    /// Look up a competitor record
    pub fn competitor(&self, id: CompetitorId) -> Option<&Competitor> {
        self.engine.competitors().get(id)
    }

    /// Number of competitor records created so far
    pub fn competitor_count(&self) -> usize {
        self.engine.competitors().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RaceError;

    const CONFIG: &str = r#"{
        "laps": 2,
        "lapLen": 3651,
        "penaltyLen": 50,
        "firingLines": 1,
        "start": "09:30:00.000",
        "startDelta": "00:00:30"
    }"#;

    #[test]
    fn test_invalid_config_is_fatal() {
        let result = RaceProcessor::from_sources("{}", "[09:05:59.867] 1 1");
        assert!(matches!(result, Err(RaceError::ConfigParseError(_))));
    }

    #[test]
    fn test_process_events_is_idempotent() {
        let mut processor = RaceProcessor::from_sources(
            CONFIG,
            "[09:05:59.867] 1 1\n[09:49:33.123] 6 1 1",
        )
        .unwrap();

        let first = processor.process_events();
        let second = processor.process_events();
        assert_eq!(first, second);
        assert_eq!(processor.competitor(1).unwrap().hits, 1);
        assert_eq!(processor.engine_stats().applied_events, 2);
    }

    #[test]
    fn test_summary_before_processing_is_empty() {
        let processor = RaceProcessor::from_sources(CONFIG, "[09:05:59.867] 1 1").unwrap();
        assert_eq!(processor.generate_summary(), "");
        assert_eq!(processor.competitor_count(), 0);
        assert_eq!(processor.events().len(), 1);
    }

    #[test]
    fn test_one_event_per_valid_line() {
        let events = "[09:05:59.867] 1 1
[09:15:00.841] 2 1 09:30:00.000
not an event
[09:29:45.734] 3 1";
        let processor = RaceProcessor::from_sources(CONFIG, events).unwrap();
        assert_eq!(processor.events().len(), 3);
        assert_eq!(processor.parse_stats().dropped_lines, 1);
    }
}
