//! Coverage percentages and letter grades.

use std::fmt;

use serde::Serialize;

use crate::trend::Trend;

/// Letter grade for a passed percentage.
///
/// Bands apply to the integer part of the percentage, so 89.9% is a B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_percentage(percentage: f64) -> Self {
        // NaN and negatives land in F.
        let whole = if percentage.is_finite() && percentage > 0.0 {
            percentage.trunc() as u64
        } else {
            0
        };
        match whole {
            90.. => Grade::A,
            80..=89 => Grade::B,
            70..=79 => Grade::C,
            60..=69 => Grade::D,
            _ => Grade::F,
        }
    }

    /// CSS class used by the templates.
    pub fn css_class(self) -> &'static str {
        match self {
            Grade::A => "mark-a",
            Grade::B => "mark-b",
            Grade::C => "mark-c",
            Grade::D => "mark-d",
            Grade::F => "mark-f",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(s)
    }
}

/// Passed/failed share of the latest run. Skipped tests are not counted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coverage {
    pub total: u64,
    pub passed: f64,
    pub failed: f64,
    pub mark: Grade,
}

impl Coverage {
    pub fn from_counts(passed: u64, failed: u64) -> Self {
        let total = passed.saturating_add(failed);
        let (passed_pct, failed_pct) = if total == 0 {
            (0.0, 0.0)
        } else {
            (
                passed as f64 / total as f64 * 100.0,
                failed as f64 / total as f64 * 100.0,
            )
        };

        Self {
            total,
            passed: passed_pct,
            failed: failed_pct,
            mark: Grade::from_percentage(passed_pct),
        }
    }

    /// Coverage of the last trend entry; an empty trend counts as 0/0.
    pub fn from_trend(trend: &Trend) -> Self {
        trend
            .last()
            .map(|last| Self::from_counts(last.passed, last.failed))
            .unwrap_or_else(|| Self::from_counts(0, 0))
    }
}
