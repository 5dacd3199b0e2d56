//! Operator coverage table (`nodes.csv`).
//!
//! The ONNX backend test report writes one row per operator. The `Op` column
//! names the operator and the `None` column holds its status, decorated with
//! `!` markers (`"Passed!"`, `"Failed!"`).

use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

pub const OPS_FILE: &str = "nodes.csv";

const OP_COLUMN: &str = "Op";
const STATUS_COLUMN: &str = "None";

/// Operator name to coverage status, in file order.
pub type OpsTable = IndexMap<String, String>;

/// Load `dir/nodes.csv`, empty if the file is missing.
pub fn load_ops_table(dir: &Path) -> OpsTable {
    let path = dir.join(OPS_FILE);
    match std::fs::read_to_string(&path) {
        Ok(content) => parse_ops_table(&content),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no operator table");
            OpsTable::new()
        }
    }
}

pub fn parse_ops_table(content: &str) -> OpsTable {
    let mut rows = split_records(content).into_iter();
    let Some(header) = rows.next() else {
        return OpsTable::new();
    };

    let Some(op_idx) = header.iter().position(|h| h == OP_COLUMN) else {
        debug!("operator table has no '{}' column", OP_COLUMN);
        return OpsTable::new();
    };
    let status_idx = header.iter().position(|h| h == STATUS_COLUMN);

    let mut table = OpsTable::new();
    for row in rows {
        let Some(op) = row.get(op_idx) else {
            continue;
        };
        let status = status_idx
            .and_then(|i| row.get(i))
            .map(|s| s.replace('!', "").to_lowercase())
            .unwrap_or_default();
        table.insert(op.clone(), status);
    }
    table
}

/// Split CSV text into records. Handles quoted fields, doubled quotes and
/// newlines inside quotes; blank lines are dropped.
fn split_records(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        push_record(&mut records, record);
    }
    records
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    if record.len() == 1 && record[0].is_empty() {
        return;
    }
    records.push(record);
}
