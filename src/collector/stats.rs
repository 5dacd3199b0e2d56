//! Test-runner statistics as handed over at the end of a session.
//!
//! The runner dumps its per-status result groups as a JSON object, e.g.
//!
//! ```json
//! {
//!     "passed": [{"nodeid": "test/test_backend.py::OnnxBackendNodeModelTest::test_abs_cpu"}],
//!     "failed": [],
//!     "warnings": 3
//! }
//! ```
//!
//! Only array-valued groups carry results; records are objects with a
//! `nodeid`. Anything else is ignored.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Separator between node id segments.
pub const NODE_ID_SEPARATOR: &str = "::";

/// Raw end-of-session statistics keyed by status name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RunnerStats(Map<String, Value>);

impl RunnerStats {
    /// Read runner statistics from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runner statistics: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runner statistics: {}", path.display()))
    }

    /// Node ids recorded under `group`.
    ///
    /// Returns `None` when the group is missing or is not a list. Records
    /// without a string `nodeid` are skipped.
    pub fn node_ids(&self, group: &str) -> Option<Vec<&str>> {
        let records = self.0.get(group)?.as_array()?;
        Some(
            records
                .iter()
                .filter_map(|record| record.get("nodeid")?.as_str())
                .collect(),
        )
    }
}

impl From<Map<String, Value>> for RunnerStats {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Strip the file-path segment from a node id.
///
/// `test/test_backend.py::OnnxBackendNodeModelTest::test_abs_cpu` becomes
/// `OnnxBackendNodeModelTest::test_abs_cpu`.
pub fn normalize_node_id(node_id: &str) -> String {
    node_id
        .split(NODE_ID_SEPARATOR)
        .filter(|segment| !is_file_segment(segment))
        .collect::<Vec<_>>()
        .join(NODE_ID_SEPARATOR)
}

/// A segment names a file when its last path component has an extension.
/// Parametrized ids such as `test_pad[1.5]` are not files.
fn is_file_segment(segment: &str) -> bool {
    let file_name = segment.rsplit('/').next().unwrap_or(segment);
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}
