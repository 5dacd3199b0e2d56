//! Per-test status view of the latest `report.json`.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::collector::report::TestStatus;
use crate::collector::REPORT_FILE;
use crate::storage;

/// Test id to status, sorted by test id.
pub type ReportView = BTreeMap<String, TestStatus>;

/// Load `dir/report.json` and invert it into a [`ReportView`].
///
/// A missing or malformed report yields an empty view. The `date` key is
/// optional, and groups that are not known statuses or not lists are ignored.
pub fn load_report_view(dir: &Path) -> ReportView {
    let raw: Option<Value> = storage::read_json(&dir.join(REPORT_FILE));
    raw.map(|v| invert_report(&v)).unwrap_or_default()
}

pub fn invert_report(raw: &Value) -> ReportView {
    let mut view = ReportView::new();
    let Some(groups) = raw.as_object() else {
        debug!("report is not a JSON object, ignoring");
        return view;
    };

    for (key, ids) in groups {
        let Ok(status) = key.parse::<TestStatus>() else {
            continue;
        };
        let Some(ids) = ids.as_array() else {
            continue;
        };
        for id in ids.iter().filter_map(Value::as_str) {
            view.insert(id.to_string(), status);
        }
    }
    view
}
