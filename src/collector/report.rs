//! Per-run test report (`report.json`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::stats::{normalize_node_id, RunnerStats};

/// Outcome categories tracked by the scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

impl TestStatus {
    pub const ALL: [TestStatus; 3] = [TestStatus::Passed, TestStatus::Failed, TestStatus::Skipped];

    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passed" => Ok(TestStatus::Passed),
            "failed" => Ok(TestStatus::Failed),
            "skipped" => Ok(TestStatus::Skipped),
            other => Err(format!("unknown test status '{}'", other)),
        }
    }
}

/// Dated snapshot of test ids per status. Each list is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub date: String,
    #[serde(default)]
    pub passed: Vec<String>,
    #[serde(default)]
    pub failed: Vec<String>,
    #[serde(default)]
    pub skipped: Vec<String>,
}

impl Report {
    /// Build a report from runner statistics.
    ///
    /// Missing or non-list status groups produce empty lists.
    pub fn from_stats(stats: &RunnerStats, date: impl Into<String>) -> Self {
        let mut report = Report {
            date: date.into(),
            ..Report::default()
        };

        for status in TestStatus::ALL {
            let Some(node_ids) = stats.node_ids(status.as_str()) else {
                tracing::debug!(%status, "no result group in runner statistics");
                continue;
            };
            let mut ids: Vec<String> = node_ids.into_iter().map(normalize_node_id).collect();
            ids.sort();
            *report.ids_mut(status) = ids;
        }

        report
    }

    pub fn ids(&self, status: TestStatus) -> &[String] {
        match status {
            TestStatus::Passed => &self.passed,
            TestStatus::Failed => &self.failed,
            TestStatus::Skipped => &self.skipped,
        }
    }

    fn ids_mut(&mut self, status: TestStatus) -> &mut Vec<String> {
        match status {
            TestStatus::Passed => &mut self.passed,
            TestStatus::Failed => &mut self.failed,
            TestStatus::Skipped => &mut self.skipped,
        }
    }

    pub fn count(&self, status: TestStatus) -> u64 {
        self.ids(status).len() as u64
    }
}
