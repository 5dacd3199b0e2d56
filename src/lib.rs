//! onnx-scoreboard -- test-result collector and static scoreboard generator
//! for ONNX framework backends.
//!
//! The collector runs after every backend test session and maintains
//! `report.json` / `trend.json` in the framework's results directory. The
//! renderer reads those files for every configured framework and produces
//! the static scoreboard site.

pub mod collector;
pub mod config;
pub mod render;
pub mod storage;
pub mod trend;

/// Timestamp format used in reports and trends (`08/06/2019 09:37:45`).
pub const DATE_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Current local time formatted with [`DATE_FORMAT`].
pub fn timestamp_now() -> String {
    chrono::Local::now().format(DATE_FORMAT).to_string()
}
