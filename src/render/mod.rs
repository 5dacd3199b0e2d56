//! Page renderer: builds the per-framework scoreboard database from the
//! results directories and renders the static site.

pub mod coverage;
pub mod ops;
pub mod pages;
pub mod report_view;

use std::path::{Path, PathBuf};

use anyhow::Result;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{LifecycleState, ScoreboardConfig};
use crate::trend::{self, versions::PackageVersion, Trend};
use coverage::Coverage;
use ops::OpsTable;
use pages::SiteLayout;
use report_view::ReportView;

/// Everything the templates show about one framework.
#[derive(Debug, Clone, Serialize)]
pub struct FrameworkEntry {
    pub name: String,
    /// Core package versions of the latest run.
    pub versions: Vec<PackageVersion>,
    pub trend: Trend,
    pub coverage: Coverage,
    pub ops: OpsTable,
    pub report: ReportView,
}

impl FrameworkEntry {
    /// Load a framework's results from `results_dir`. Never fails: every
    /// missing input is replaced by its empty default.
    pub fn load(name: impl Into<String>, results_dir: &Path) -> Self {
        let trend = trend::load_trend_or_dummy(results_dir);
        let versions = trend
            .last()
            .map(|last| last.package_versions.clone())
            .unwrap_or_default();

        Self {
            name: name.into(),
            versions,
            coverage: Coverage::from_trend(&trend),
            trend,
            ops: ops::load_ops_table(results_dir),
            report: report_view::load_report_view(results_dir),
        }
    }
}

/// Framework key to entry, best score first.
pub type Database = IndexMap<String, FrameworkEntry>;

/// Build the database for every framework tracked under `state`.
pub fn prepare_database(config: &ScoreboardConfig, state: LifecycleState) -> Database {
    let mut database: Database = config
        .frameworks(state)
        .iter()
        .map(|(key, fw)| {
            let entry = FrameworkEntry::load(fw.display_name(key), &fw.results_dir);
            (key.clone(), entry)
        })
        .collect();

    sort_by_score(&mut database);
    info!(%state, frameworks = database.len(), "prepared scoreboard database");
    database
}

/// Order by descending passed percentage. Ties keep configuration order.
pub fn sort_by_score(database: &mut Database) {
    database.sort_by(|_, a, _, b| {
        b.coverage
            .passed
            .partial_cmp(&a.coverage.passed)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderOutcome {
    /// Every page written, in generation order.
    pub pages: Vec<PathBuf>,
    pub resources: PathBuf,
}

/// Render the whole site described by the configuration at `config_path`.
///
/// A missing or unparsable configuration aborts before anything is written.
/// Links between pages and to the resources are relative to each page's
/// own output directory.
pub fn run(config_path: &Path) -> Result<RenderOutcome> {
    let config = ScoreboardConfig::load(config_path)?;
    let deploy = &config.deploy_paths;

    let stable = prepare_database(&config, LifecycleState::Stable);
    let development = prepare_database(&config, LifecycleState::Development);

    let layout = SiteLayout::from_deploy(deploy);
    let mut written = Vec::new();

    let html = pages::render_index(&stable, false, &deploy.index, &layout, |key| {
        details_path(&config, LifecycleState::Stable, key)
    })?;
    pages::write_page(&deploy.index, "index.html", &html)?;
    written.push(layout.index.clone());

    let html = pages::render_index(&development, true, &deploy.subpages, &layout, |key| {
        details_path(&config, LifecycleState::Development, key)
    })?;
    pages::write_page(&deploy.subpages, "index_dev.html", &html)?;
    written.push(layout.dev_index.clone());

    for (state, database) in [
        (LifecycleState::Stable, &stable),
        (LifecycleState::Development, &development),
    ] {
        let dev = state == LifecycleState::Development;
        for (key, entry) in database {
            let dir = details_dir(&config, state, key);
            let name = details_page_name(key, state);
            let html = pages::render_details(key, entry, dev, &dir, &layout)?;
            pages::write_page(&dir, &name, &html)?;
            written.push(dir.join(name));
        }
    }

    let resources_src = config.resources_dir();
    if resources_src.is_dir() {
        pages::copy_resources(&resources_src, &deploy.resources)?;
    } else {
        warn!(path = %resources_src.display(), "resources directory missing, pages deployed without assets");
    }

    Ok(RenderOutcome {
        pages: written,
        resources: deploy.resources.clone(),
    })
}

/// `<framework>_details_<stable|dev>.html`
pub fn details_page_name(key: &str, state: LifecycleState) -> String {
    format!("{}_details_{}.html", key, state.page_suffix())
}

fn details_path(config: &ScoreboardConfig, state: LifecycleState, key: &str) -> PathBuf {
    details_dir(config, state, key).join(details_page_name(key, state))
}

fn details_dir(config: &ScoreboardConfig, state: LifecycleState, key: &str) -> PathBuf {
    config
        .frameworks(state)
        .get(key)
        .and_then(|fw| fw.deploy_paths.as_ref())
        .map(|paths| paths.subpages.clone())
        .unwrap_or_else(|| config.deploy_paths.subpages.clone())
}
