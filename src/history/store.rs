//! Per-symbol bounded sample store

use super::clock::Clock;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// Samples kept per symbol unless configured otherwise
pub const DEFAULT_MAX_SAMPLES: usize = 50;

/// Rendered in place of a timestamp that does not parse
pub const INVALID_DATE: &str = "Invalid Date";

const TIME_FORMAT: &str = "%H:%M:%S";
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// One retained observation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub price: f64,
    /// Local wall-clock time of the update
    pub timestamp: String,
    /// Milliseconds since session start when the sample was recorded
    pub elapsed_ms: u64,
}

/// In-memory history keyed by symbol
///
/// Each sequence is chronological and never longer than `max_samples`; the
/// oldest sample is evicted first.
pub struct HistoryStore {
    series: HashMap<String, VecDeque<Sample>>,
    /// Symbols in first-seen order
    symbols: Vec<String>,
    max_samples: usize,
    clock: Box<dyn Clock>,
}

impl HistoryStore {
    pub fn new(max_samples: usize, clock: impl Clock + 'static) -> Self {
        Self {
            series: HashMap::new(),
            symbols: Vec::new(),
            max_samples: max_samples.max(1),
            clock: Box::new(clock),
        }
    }

    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    /// Append a sample for `symbol`, evicting the oldest one past the bound
    ///
    /// Non-numeric prices are stored as NaN rather than rejected.
    pub fn record(&mut self, symbol: &str, price: f64, timestamp: &str) -> Sample {
        let sample = Sample {
            price,
            timestamp: local_time(timestamp),
            elapsed_ms: self.clock.elapsed().as_millis() as u64,
        };

        if !self.series.contains_key(symbol) {
            self.symbols.push(symbol.to_string());
        }
        let capacity = self.max_samples + 1;
        let series = self
            .series
            .entry(symbol.to_string())
            .or_insert_with(|| VecDeque::with_capacity(capacity));

        series.push_back(sample.clone());
        while series.len() > self.max_samples {
            series.pop_front();
        }

        sample
    }

    /// Retained samples, oldest first
    pub fn samples(&self, symbol: &str) -> impl Iterator<Item = &Sample> {
        self.series.get(symbol).into_iter().flatten()
    }

    pub fn latest(&self, symbol: &str) -> Option<&Sample> {
        self.series.get(symbol)?.back()
    }

    /// Second-to-last sample
    pub fn previous(&self, symbol: &str) -> Option<&Sample> {
        let series = self.series.get(symbol)?;
        series.len().checked_sub(2).and_then(|i| series.get(i))
    }

    pub fn last_price(&self, symbol: &str) -> Option<f64> {
        self.latest(symbol).map(|s| s.price)
    }

    pub fn len(&self, symbol: &str) -> usize {
        self.series.get(symbol).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in the order they were first recorded
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }
}

/// Format a server timestamp as local wall-clock time
///
/// Accepts RFC 3339 and naive `YYYY-MM-DD HH:MM:SS` (read as local time).
/// Anything else yields [`INVALID_DATE`].
pub fn local_time(raw: &str) -> String {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format(TIME_FORMAT).to_string();
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            // Times skipped by a DST jump have no local mapping; keep the naive clock time
            return match Local.from_local_datetime(&naive).earliest() {
                Some(dt) => dt.format(TIME_FORMAT).to_string(),
                None => naive.format(TIME_FORMAT).to_string(),
            };
        }
    }

    INVALID_DATE.to_string()
}
