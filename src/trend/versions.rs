//! Installed package versions (`pip-list.json`) and core-package filtering.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{LifecycleState, ScoreboardConfig};
use crate::storage;

pub const VERSIONS_FILE: &str = "pip-list.json";

/// Package every scoreboard tracks regardless of configuration.
pub const BASE_PACKAGE: &str = "onnx";

/// A single `pip list --format=json` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageVersion {
    pub name: String,
    pub version: String,
}

impl PackageVersion {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Load installed package versions from `dir/pip-list.json`, empty on failure.
pub fn load_package_versions(dir: &Path) -> Vec<PackageVersion> {
    let packages: Vec<PackageVersion> =
        storage::read_json(&dir.join(VERSIONS_FILE)).unwrap_or_default();
    debug!(count = packages.len(), dir = %dir.display(), "loaded package versions");
    packages
}

/// `onnx` plus every `core_packages` entry of every configured framework.
pub fn core_package_names(config: &ScoreboardConfig) -> BTreeSet<String> {
    let mut names = BTreeSet::from([BASE_PACKAGE.to_string()]);
    for state in LifecycleState::ALL {
        for framework in config.frameworks(state).values() {
            names.extend(framework.core_packages.iter().cloned());
        }
    }
    names
}

/// Keep only the core packages, preserving input order.
pub fn filter_core_packages(
    packages: &[PackageVersion],
    config: &ScoreboardConfig,
) -> Vec<PackageVersion> {
    let core = core_package_names(config);
    packages
        .iter()
        .filter(|p| core.contains(&p.name))
        .cloned()
        .collect()
}
