//! Scoreboard configuration (`config.json`).
//!
//! The configuration lists the tracked frameworks per lifecycle state and
//! where generated pages go. The renderer cannot do anything without it, so
//! [`ScoreboardConfig::load`] fails loudly. The collector only needs it to
//! decide which package versions matter and uses
//! [`ScoreboardConfig::load_or_default`] instead.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't read config file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("can't parse config file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Lifecycle state
// ---------------------------------------------------------------------------

/// Release track a framework is tracked under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Stable,
    Development,
}

impl LifecycleState {
    pub const ALL: [LifecycleState; 2] = [LifecycleState::Stable, LifecycleState::Development];

    /// Suffix used in generated page names (`index_dev.html`, `x_details_stable.html`).
    pub fn page_suffix(self) -> &'static str {
        match self {
            LifecycleState::Stable => "stable",
            LifecycleState::Development => "dev",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Stable => write!(f, "stable"),
            LifecycleState::Development => write!(f, "development"),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root of `config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreboardConfig {
    /// Frameworks built from released packages, keyed by framework id.
    pub stable: IndexMap<String, FrameworkConfig>,
    /// Frameworks built from development snapshots.
    pub development: IndexMap<String, FrameworkConfig>,
    /// Output locations for generated pages and assets.
    pub deploy_paths: DeployPaths,
    /// Static assets copied next to the pages. Defaults to `./resources`.
    pub resources_dir: Option<PathBuf>,
}

impl ScoreboardConfig {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&content).map_err(|source| ConfigError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        info!(
            path = %path.display(),
            stable = config.stable.len(),
            development = config.development.len(),
            "loaded scoreboard configuration"
        );
        Ok(config)
    }

    /// Load configuration, falling back to an empty config on any failure.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(error = %e, "scoreboard configuration unavailable, using empty config");
                Self::default()
            }
        }
    }

    /// Frameworks tracked under `state`, in configuration order.
    pub fn frameworks(&self, state: LifecycleState) -> &IndexMap<String, FrameworkConfig> {
        match state {
            LifecycleState::Stable => &self.stable,
            LifecycleState::Development => &self.development,
        }
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.resources_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("resources"))
    }
}

// ---------------------------------------------------------------------------
// Frameworks
// ---------------------------------------------------------------------------

/// One tracked framework backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Directory holding `trend.json`, `report.json` and `nodes.csv`.
    pub results_dir: PathBuf,
    /// Display name; the framework key is used when absent.
    pub name: Option<String>,
    /// Package names whose versions are recorded in the trend.
    pub core_packages: Vec<String>,
    /// Per-framework override of where detail pages are written.
    pub deploy_paths: Option<DeployPaths>,
}

impl FrameworkConfig {
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(key)
    }
}

// ---------------------------------------------------------------------------
// Deploy paths
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployPaths {
    /// Directory receiving `index.html`.
    pub index: PathBuf,
    /// Directory receiving `index_dev.html` and the detail pages.
    pub subpages: PathBuf,
    /// Destination of the static resources directory.
    pub resources: PathBuf,
}

impl Default for DeployPaths {
    fn default() -> Self {
        Self {
            index: PathBuf::from("./"),
            subpages: PathBuf::from("./"),
            resources: PathBuf::from("./docs/resources"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
