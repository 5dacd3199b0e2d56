//! HTML page generation with askama templates, plus static asset deployment.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use askama::Template;
use tracing::{debug, info};

use super::{Database, FrameworkEntry};
use crate::config::DeployPaths;
use crate::storage;

/// Deployed locations every page links to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLayout {
    /// Full path of the stable `index.html`.
    pub index: PathBuf,
    /// Full path of `index_dev.html`.
    pub dev_index: PathBuf,
    /// Deployed resources directory.
    pub resources: PathBuf,
}

impl SiteLayout {
    pub fn from_deploy(deploy: &DeployPaths) -> Self {
        Self {
            index: deploy.index.join("index.html"),
            dev_index: deploy.subpages.join("index_dev.html"),
            resources: deploy.resources.clone(),
        }
    }

    /// Links as seen from a page written into `page_dir`.
    pub fn nav(&self, page_dir: &Path) -> NavLinks {
        NavLinks {
            resources: relative_href(page_dir, &self.resources),
            index: relative_href(page_dir, &self.index),
            dev_index: relative_href(page_dir, &self.dev_index),
        }
    }
}

/// Relative hrefs shared by the base template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLinks {
    pub resources: String,
    pub index: String,
    pub dev_index: String,
}

/// One scoreboard row.
pub struct IndexRow<'a> {
    pub key: &'a str,
    /// Link to the framework's detail page.
    pub href: String,
    pub framework: &'a FrameworkEntry,
}

/// Scoreboard overview: one card per framework.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub rows: Vec<IndexRow<'a>>,
    /// JSON copy of the database for the chart scripts.
    pub database_json: String,
    /// Development-track page.
    pub dev: bool,
    pub nav: NavLinks,
}

/// Detail page for a single framework.
#[derive(Template)]
#[template(path = "details.html")]
pub struct DetailsTemplate<'a> {
    pub key: &'a str,
    pub framework: &'a FrameworkEntry,
    pub framework_json: String,
    pub dev: bool,
    pub nav: NavLinks,
}

/// Render an index page that will be written into `page_dir`.
///
/// `details_path` maps a framework key to the full path of its detail page.
pub fn render_index<F>(
    database: &Database,
    dev: bool,
    page_dir: &Path,
    layout: &SiteLayout,
    details_path: F,
) -> Result<String>
where
    F: Fn(&str) -> PathBuf,
{
    let rows = database
        .iter()
        .map(|(key, framework)| IndexRow {
            key,
            href: relative_href(page_dir, &details_path(key)),
            framework,
        })
        .collect();
    let template = IndexTemplate {
        rows,
        database_json: serde_json::to_string(database).context("failed to encode database")?,
        dev,
        nav: layout.nav(page_dir),
    };
    template.render().context("failed to render index page")
}

pub fn render_details(
    key: &str,
    framework: &FrameworkEntry,
    dev: bool,
    page_dir: &Path,
    layout: &SiteLayout,
) -> Result<String> {
    let template = DetailsTemplate {
        key,
        framework,
        framework_json: serde_json::to_string(framework)
            .with_context(|| format!("failed to encode framework '{}'", key))?,
        dev,
        nav: layout.nav(page_dir),
    };
    template
        .render()
        .with_context(|| format!("failed to render details page for '{}'", key))
}

/// Relative URL from the directory `from_dir` to `to`, `/`-separated.
///
/// Both paths are made absolute against the working directory and `.`/`..`
/// are resolved lexically. Returns `.` when they coincide.
pub fn relative_href(from_dir: &Path, to: &Path) -> String {
    let from = absolute(from_dir);
    let to = absolute(to);
    let from_parts: Vec<Component> = from.components().collect();
    let to_parts: Vec<Component> = to.components().collect();
    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec!["..".to_string(); from_parts.len() - common];
    parts.extend(
        to_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

fn absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    };
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Write a rendered page to `dir/name`, creating `dir` if needed.
pub fn write_page(dir: &Path, name: &str, html: &str) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join(name);
    storage::write_atomic(&path, html.as_bytes())?;
    info!(path = %path.display(), "generated page");
    Ok(())
}

/// Copy the static resources directory to `dest`, replacing it if present.
///
/// `dest` must not be `src`, nor nest with it in either direction.
pub fn copy_resources(src: &Path, dest: &Path) -> Result<()> {
    if !src.is_dir() {
        anyhow::bail!("resources directory not found: {}", src.display());
    }
    let src_real = resolve(src)?;
    let dest_real = resolve(dest)?;
    if dest_real.starts_with(&src_real) || src_real.starts_with(&dest_real) {
        anyhow::bail!(
            "resources destination {} overlaps source {}",
            dest.display(),
            src.display()
        );
    }

    if dest.exists() {
        debug!(path = %dest.display(), "removing previous resources");
        std::fs::remove_dir_all(dest)
            .with_context(|| format!("failed to remove {}", dest.display()))?;
    }
    copy_dir(src, dest)?;
    info!(from = %src.display(), to = %dest.display(), "copied resources");
    Ok(())
}

/// Canonical form of `path`, which need not exist yet.
fn resolve(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return path
            .canonicalize()
            .with_context(|| format!("failed to resolve {}", path.display()));
    }
    let path = absolute(path);
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => Ok(resolve(parent)?.join(name)),
        _ => Ok(path),
    }
}

fn copy_dir(src: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create {}", dest.display()))?;

    for entry in
        std::fs::read_dir(src).with_context(|| format!("failed to list {}", src.display()))?
    {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target).with_context(|| {
                format!("failed to copy {} to {}", entry.path().display(), target.display())
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::coverage::Coverage;
    use crate::trend::{Summary, Trend};

    fn entry(name: &str, passed: u64, failed: u64) -> FrameworkEntry {
        FrameworkEntry {
            name: name.to_string(),
            versions: vec![],
            trend: Trend::new(vec![Summary {
                date: "01/01/2020 00:00:00".into(),
                passed,
                failed,
                ..Summary::default()
            }]),
            coverage: Coverage::from_counts(passed, failed),
            ops: Default::default(),
            report: Default::default(),
        }
    }

    fn layout() -> SiteLayout {
        SiteLayout {
            index: PathBuf::from("/site/index.html"),
            dev_index: PathBuf::from("/site/pages/index_dev.html"),
            resources: PathBuf::from("/site/resources"),
        }
    }

    fn details_in_pages(suffix: &'static str) -> impl Fn(&str) -> PathBuf {
        move |key: &str| PathBuf::from(format!("/site/pages/{}_details_{}.html", key, suffix))
    }

    #[test]
    fn test_index_lists_frameworks_and_escapes_json() {
        let mut db = Database::new();
        db.insert("onnxruntime".into(), entry("ONNX-Runtime", 9, 1));
        db.insert("tf".into(), entry("<Tensorflow>", 1, 1));

        let html = render_index(
            &db,
            false,
            Path::new("/site"),
            &layout(),
            details_in_pages("stable"),
        )
        .unwrap();
        assert!(html.contains("ONNX-Runtime"));
        assert!(html.contains("90.00%"));
        assert!(html.contains("&lt;Tensorflow&gt;"));
        assert!(!html.contains("<Tensorflow>"));
        assert!(html.contains("onnxruntime_details_stable.html"));
    }

    #[test]
    fn test_dev_index_links_dev_details() {
        let mut db = Database::new();
        db.insert("ngraph".into(), entry("nGraph", 1, 0));
        let html = render_index(
            &db,
            true,
            Path::new("/site/pages"),
            &layout(),
            details_in_pages("dev"),
        )
        .unwrap();
        assert!(html.contains("ngraph_details_dev.html"));
        assert!(!html.contains("pages&#x2f;ngraph_details_dev.html"));
        assert!(!html.contains("pages/ngraph_details_dev.html"));
    }

    #[test]
    fn test_details_page_lists_tests() {
        let mut fw = entry("nGraph", 1, 0);
        fw.report
            .insert("Suite::test_abs".into(), crate::collector::report::TestStatus::Passed);
        fw.ops.insert("Abs".into(), "passed".into());

        let html = render_details("ngraph", &fw, true, Path::new("/site/pages"), &layout()).unwrap();
        assert!(html.contains("Suite::test_abs"));
        assert!(html.contains("Abs"));
        assert!(html.contains("nGraph"));
    }

    #[test]
    fn test_relative_href() {
        assert_eq!(
            relative_href(Path::new("/site"), Path::new("/site/pages/index_dev.html")),
            "pages/index_dev.html"
        );
        assert_eq!(
            relative_href(Path::new("/site/pages"), Path::new("/site/index.html")),
            "../index.html"
        );
        assert_eq!(
            relative_href(Path::new("/site/pages/"), Path::new("/site/./resources")),
            "../resources"
        );
        assert_eq!(relative_href(Path::new("/site"), Path::new("/site/")), ".");
        assert_eq!(
            relative_href(Path::new("/a/b"), Path::new("/c/d.html")),
            "../../c/d.html"
        );
    }

    #[test]
    fn test_nav_links_follow_page_directory() {
        let root = layout().nav(Path::new("/site"));
        assert_eq!(root.resources, "resources");
        assert_eq!(root.index, "index.html");
        assert_eq!(root.dev_index, "pages/index_dev.html");

        let sub = layout().nav(Path::new("/site/pages"));
        assert_eq!(sub.resources, "../resources");
        assert_eq!(sub.index, "../index.html");
        assert_eq!(sub.dev_index, "index_dev.html");
    }

    #[test]
    fn test_layout_from_deploy_paths() {
        let deploy = DeployPaths {
            index: PathBuf::from("/out"),
            subpages: PathBuf::from("/out/sub"),
            resources: PathBuf::from("/out/res"),
        };
        let layout = SiteLayout::from_deploy(&deploy);
        assert_eq!(layout.index, PathBuf::from("/out/index.html"));
        assert_eq!(layout.dev_index, PathBuf::from("/out/sub/index_dev.html"));
        assert_eq!(layout.resources, PathBuf::from("/out/res"));
    }

    #[test]
    fn test_copy_resources_replaces_destination() {
        let dir = tempfile::TempDir::new().unwrap();
        let src = dir.path().join("resources");
        std::fs::create_dir_all(src.join("css")).unwrap();
        std::fs::write(src.join("css").join("style.css"), "body {}").unwrap();

        let dest = dir.path().join("docs").join("resources");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("stale.js"), "old").unwrap();

        copy_resources(&src, &dest).unwrap();
        assert!(dest.join("css").join("style.css").exists());
        assert!(!dest.join("stale.js").exists());
    }

    #[test]
    fn test_copy_resources_onto_itself_is_refused() {
        let dir = tempfile::TempDir::new().unwrap();
        let src = dir.path().join("resources");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("style.css"), "body {}").unwrap();

        assert!(copy_resources(&src, &src).is_err());
        assert!(copy_resources(&src, &dir.path().join("./resources/")).is_err());
        assert!(src.join("style.css").exists());
    }

    #[test]
    fn test_copy_resources_into_nested_directory_is_refused() {
        let dir = tempfile::TempDir::new().unwrap();
        let src = dir.path().join("resources");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("style.css"), "body {}").unwrap();

        assert!(copy_resources(&src, &src.join("deployed")).is_err());
        assert!(copy_resources(&src, dir.path()).is_err());
        assert!(src.join("style.css").exists());
        assert!(!src.join("deployed").exists());
    }

    #[test]
    fn test_copy_missing_resources_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(copy_resources(&dir.path().join("nope"), &dir.path().join("out")).is_err());
    }

    #[test]
    fn test_write_page_creates_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("docs");
        write_page(&out, "index.html", "<html></html>").unwrap();
        assert_eq!(
            std::fs::read_to_string(out.join("index.html")).unwrap(),
            "<html></html>"
        );
    }
}
