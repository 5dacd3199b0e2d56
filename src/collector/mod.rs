//! Report collector: turns end-of-session runner statistics into
//! `report.json` and folds a summary into `trend.json`.

pub mod report;
pub mod stats;

use std::path::PathBuf;

use anyhow::Result;
use clap::ValueEnum;
use serde::{Serialize, Serializer};
use tracing::info;

use crate::config::ScoreboardConfig;
use crate::storage;
use crate::trend::{self, versions, Summary};
use report::Report;
use stats::RunnerStats;

pub const REPORT_FILE: &str = "report.json";

/// Backend modules the ONNX backend test suite can be run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    #[value(name = "ngraph_onnx.onnx_importer.backend")]
    NgraphOnnx,
    #[value(name = "onnxruntime.backend.backend")]
    OnnxRuntime,
    #[value(name = "onnx_tf.backend")]
    OnnxTf,
    #[value(name = "caffe2.python.onnx.backend")]
    Caffe2,
}

impl Backend {
    /// Python module implementing the backend, as accepted by `--onnx_backend`.
    pub fn module(self) -> String {
        self.to_possible_value()
            .map(|value| value.get_name().to_string())
            .unwrap_or_default()
    }
}

impl Serialize for Backend {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.module())
    }
}

/// Inputs of a collector run.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// JSON dump of the runner's end-of-session statistics.
    pub stats_path: PathBuf,
    /// Where `report.json` and `trend.json` live.
    pub results_dir: PathBuf,
    /// Where `pip-list.json` lives.
    pub version_dir: PathBuf,
    /// Scoreboard configuration used to pick core packages.
    pub config_path: PathBuf,
    pub backend: Option<Backend>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectOutcome {
    pub report: Report,
    pub summary: Summary,
    pub trend_len: usize,
    /// True when the last trend entry was refreshed instead of appended.
    pub replaced: bool,
    pub backend: Option<Backend>,
}

/// Run the collector end to end.
///
/// Unreadable trend, version and config inputs fall back to empty defaults.
/// The runner statistics and every output write are required.
pub fn run(opts: &CollectOptions) -> Result<CollectOutcome> {
    if let Some(backend) = opts.backend {
        info!(backend = %backend.module(), "collecting results");
    }

    let stats = RunnerStats::load(&opts.stats_path)?;
    let report = Report::from_stats(&stats, crate::timestamp_now());
    save_report(&report, &opts.results_dir)?;

    let packages = versions::load_package_versions(&opts.version_dir);
    let config = ScoreboardConfig::load_or_default(&opts.config_path);
    let core_packages = versions::filter_core_packages(&packages, &config);
    let summary = Summary::from_report(&report, core_packages);

    let previous = trend::load_trend(&opts.results_dir);
    let previous_len = previous.len();
    let current = trend::merge_or_append(previous, summary.clone());
    trend::save_trend(&current, &opts.results_dir)?;

    info!(
        passed = summary.passed,
        failed = summary.failed,
        skipped = summary.skipped,
        trend_len = current.len(),
        "results collected"
    );

    Ok(CollectOutcome {
        replaced: current.len() == previous_len,
        trend_len: current.len(),
        report,
        summary,
        backend: opts.backend,
    })
}

pub fn save_report(report: &Report, dir: &std::path::Path) -> Result<()> {
    let path = dir.join(REPORT_FILE);
    storage::write_json(&path, report)?;
    info!(path = %path.display(), "saved report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trend::Trend;

    fn options(dir: &std::path::Path) -> CollectOptions {
        CollectOptions {
            stats_path: dir.join("stats.json"),
            results_dir: dir.to_path_buf(),
            version_dir: dir.to_path_buf(),
            config_path: dir.join("config.json"),
            backend: Some(Backend::OnnxRuntime),
        }
    }

    fn write_stats(dir: &std::path::Path, passed: &[&str], failed: &[&str]) {
        let group = |ids: &[&str]| -> serde_json::Value {
            ids.iter()
                .map(|id| serde_json::json!({ "nodeid": id }))
                .collect()
        };
        let stats = serde_json::json!({
            "passed": group(passed),
            "failed": group(failed),
        });
        std::fs::write(dir.join("stats.json"), stats.to_string()).unwrap();
    }

    #[test]
    fn test_run_writes_report_and_trend() {
        let dir = tempfile::TempDir::new().unwrap();
        write_stats(dir.path(), &["t.py::b", "t.py::a"], &["t.py::c"]);
        std::fs::write(
            dir.path().join("pip-list.json"),
            r#"[{"name": "onnx", "version": "1.5"}, {"name": "numpy", "version": "1.0"}]"#,
        )
        .unwrap();

        let outcome = run(&options(dir.path())).unwrap();
        assert_eq!(outcome.report.passed, vec!["a", "b"]);
        assert_eq!(outcome.summary.failed, 1);
        assert_eq!(outcome.summary.package_versions.len(), 1);
        assert!(!outcome.replaced);

        let report: Report = storage::read_json(&dir.path().join(REPORT_FILE)).unwrap();
        assert_eq!(report, outcome.report);
        let trend = trend::load_trend(dir.path());
        assert_eq!(trend.len(), 1);
    }

    #[test]
    fn test_repeated_identical_runs_stop_growing_trend() {
        let dir = tempfile::TempDir::new().unwrap();
        write_stats(dir.path(), &["t.py::a"], &[]);
        let opts = options(dir.path());

        assert_eq!(run(&opts).unwrap().trend_len, 1);
        assert_eq!(run(&opts).unwrap().trend_len, 2);
        let third = run(&opts).unwrap();
        assert_eq!(third.trend_len, 2);
        assert!(third.replaced);
    }

    #[test]
    fn test_broken_trend_is_restarted() {
        let dir = tempfile::TempDir::new().unwrap();
        write_stats(dir.path(), &["t.py::a"], &[]);
        std::fs::write(dir.path().join(trend::TREND_FILE), "[{").unwrap();

        let outcome = run(&options(dir.path())).unwrap();
        assert_eq!(outcome.trend_len, 1);
        let trend: Trend = storage::read_json(&dir.path().join(trend::TREND_FILE)).unwrap();
        assert_eq!(trend.len(), 1);
    }

    #[test]
    fn test_missing_stats_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(run(&options(dir.path())).is_err());
        assert!(!dir.path().join(REPORT_FILE).exists());
    }

    #[test]
    fn test_existing_history_survives_a_run() {
        let dir = tempfile::TempDir::new().unwrap();
        write_stats(dir.path(), &["t.py::a"], &["t.py::b"]);
        std::fs::write(
            dir.path().join(trend::TREND_FILE),
            r#"[
                {"date": "08/06/2019 09:37:45", "passed": 497, "failed": 61, "skipped": 0,
                 "versions": [{"name": "onnx", "version": "1.5.0"}]},
                {"date": "08/07/2019 09:37:45", "passed": 500, "failed": 58, "skipped": null,
                 "package_versions": [], "versions": []},
                {"date": "08/08/2019 08:34:18", "passed": 507, "failed": 51, "skipped": 0,
                 "package_versions": []}
            ]"#,
        )
        .unwrap();

        let outcome = run(&options(dir.path())).unwrap();
        assert_eq!(outcome.trend_len, 4);
        assert!(!outcome.replaced);

        let trend = trend::load_trend(dir.path());
        let passed: Vec<u64> = trend.entries().iter().map(|s| s.passed).collect();
        assert_eq!(passed, vec![497, 500, 507, 1]);
        assert_eq!(trend.entries()[0].package_versions.len(), 1);
    }

    #[test]
    fn test_backend_module_names() {
        assert_eq!(Backend::OnnxTf.module(), "onnx_tf.backend");
        let parsed = Backend::from_str("caffe2.python.onnx.backend", false).unwrap();
        assert_eq!(parsed, Backend::Caffe2);
    }

    #[test]
    fn test_every_backend_module_parses_back() {
        for backend in Backend::value_variants() {
            let module = backend.module();
            assert!(!module.is_empty());
            assert_eq!(Backend::from_str(&module, false).unwrap(), *backend);
            assert_eq!(
                serde_json::to_value(backend).unwrap(),
                serde_json::Value::String(module)
            );
        }
    }
}
