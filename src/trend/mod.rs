//! Historical trend of per-run summaries (`trend.json`).
//!
//! The trend grows by one summary per collector run. When a run produces the
//! same counts and package versions as the previous one, the last entry is
//! replaced instead so an idle nightly job does not pad the history.

pub mod versions;

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::collector::report::{Report, TestStatus};
use crate::storage;
use versions::PackageVersion;

pub const TREND_FILE: &str = "trend.json";

/// Test counts of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub passed: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default, alias = "versions")]
    pub package_versions: Vec<PackageVersion>,
}

impl Summary {
    pub fn from_report(report: &Report, package_versions: Vec<PackageVersion>) -> Self {
        Self {
            date: report.date.clone(),
            passed: report.count(TestStatus::Passed),
            failed: report.count(TestStatus::Failed),
            skipped: report.count(TestStatus::Skipped),
            package_versions,
        }
    }

    /// Placeholder used by the renderer when a framework has no trend yet.
    pub fn empty(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Self::default()
        }
    }

    /// Decode one stored trend entry.
    ///
    /// Older trends carry `versions` instead of `package_versions`, sometimes
    /// both, and may hold `null` counts. Those are normalized before decoding;
    /// anything still undecodable yields `None`.
    pub fn from_stored(value: &Value) -> Option<Self> {
        let mut fields = value.as_object()?.clone();
        fields.retain(|_, v| !v.is_null());
        if fields.contains_key("package_versions") {
            fields.remove("versions");
        }
        serde_json::from_value(Value::Object(fields)).ok()
    }

    /// The `date` field parsed with [`crate::DATE_FORMAT`].
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.date, crate::DATE_FORMAT).ok()
    }

    /// Equality on every field except the date.
    pub fn same_results(&self, other: &Summary) -> bool {
        self.passed == other.passed
            && self.failed == other.failed
            && self.skipped == other.skipped
            && self.package_versions == other.package_versions
    }
}

/// Ordered list of summaries, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trend(Vec<Summary>);

impl Trend {
    pub fn new(entries: Vec<Summary>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[Summary] {
        &self.0
    }

    pub fn last(&self) -> Option<&Summary> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether parseable entry dates never go backwards.
    pub fn is_chronological(&self) -> bool {
        let stamps: Vec<NaiveDateTime> = self.0.iter().filter_map(Summary::timestamp).collect();
        stamps.windows(2).all(|w| w[0] <= w[1])
    }
}

impl From<Vec<Summary>> for Trend {
    fn from(entries: Vec<Summary>) -> Self {
        Self(entries)
    }
}

/// Append `summary`, or replace the last entry when nothing changed.
///
/// Replacement only happens once the trend holds at least two entries, so
/// the first two runs are always kept.
///
/// Entries stay in date order only if the caller dates `summary` no earlier
/// than the last entry; the collector stamps it with the current time. An
/// older date is logged, not rejected.
pub fn merge_or_append(trend: Trend, summary: Summary) -> Trend {
    let mut entries = trend.0;
    if let (Some(last), Some(new)) = (
        entries.last().and_then(Summary::timestamp),
        summary.timestamp(),
    ) {
        if new < last {
            warn!(date = %summary.date, "summary is older than the last trend entry");
        }
    }
    let replace = entries.len() >= 2
        && entries
            .last()
            .map_or(false, |last| last.same_results(&summary));

    if replace {
        debug!(date = %summary.date, "results unchanged, refreshing last trend entry");
        if let Some(last) = entries.last_mut() {
            *last = summary;
        }
    } else {
        entries.push(summary);
    }

    Trend(entries)
}

/// Load `dir/trend.json`.
///
/// A missing file or invalid JSON restarts the trend. Valid JSON is kept
/// entry by entry: entries that cannot be decoded are dropped with a warning
/// so one odd record never costs the rest of the history.
pub fn load_trend(dir: &Path) -> Trend {
    let path = dir.join(TREND_FILE);
    let Some(raw) = storage::read_json::<Value>(&path) else {
        return Trend::default();
    };
    let Some(stored) = raw.as_array() else {
        warn!(path = %path.display(), "trend file is not a list, starting a new trend");
        return Trend::default();
    };

    let mut entries = Vec::with_capacity(stored.len());
    for (index, value) in stored.iter().enumerate() {
        match Summary::from_stored(value) {
            Some(summary) => entries.push(summary),
            None => warn!(path = %path.display(), index, "skipping undecodable trend entry"),
        }
    }
    Trend(entries)
}

/// Load `dir/trend.json` for display.
///
/// Falls back to a single zeroed entry dated now, so coverage can always be
/// computed from the last entry.
pub fn load_trend_or_dummy(dir: &Path) -> Trend {
    let trend = load_trend(dir);
    if trend.is_empty() {
        debug!(dir = %dir.display(), "no trend available, using placeholder entry");
        return Trend(vec![Summary::empty(crate::timestamp_now())]);
    }
    trend
}

pub fn save_trend(trend: &Trend, dir: &Path) -> Result<()> {
    let path = dir.join(TREND_FILE);
    storage::write_json(&path, trend)?;
    info!(path = %path.display(), entries = trend.len(), "saved trend");
    Ok(())
}
