//! Tree rewriting pipeline (made by FontLab https://www.fontlab.com/)

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::discovery::{Discovered, PathDiscovery, SourceDiscovery, SOURCE_EXTENSIONS};
use crate::patterns::ReferencePatterns;
use crate::prefix::{compute_prefix_with, TargetPrefix, SOURCE_ROOT_MARKER};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Directory name that anchors each file's depth.
    pub marker: String,
    pub extensions: Vec<String>,
    pub follow_symlinks: bool,
    /// Report what would change without touching any file.
    pub dry_run: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            marker: SOURCE_ROOT_MARKER.to_string(),
            extensions: SOURCE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            follow_symlinks: false,
            dry_run: false,
        }
    }
}

/// What happened to one file (or one unreadable walk entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RewriteEvent {
    Rewritten {
        path: PathBuf,
        prefix: TargetPrefix,
        replacements: usize,
    },
    Unchanged {
        path: PathBuf,
    },
    OutsideSourceRoot {
        path: PathBuf,
    },
    Failed {
        path: Option<PathBuf>,
        message: String,
    },
}

impl RewriteEvent {
    pub fn path(&self) -> Option<&Path> {
        match self {
            RewriteEvent::Rewritten { path, .. }
            | RewriteEvent::Unchanged { path }
            | RewriteEvent::OutsideSourceRoot { path } => Some(path),
            RewriteEvent::Failed { path, .. } => path.as_deref(),
        }
    }

    pub fn is_rewritten(&self) -> bool {
        matches!(self, RewriteEvent::Rewritten { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RewriteEvent::Failed { .. })
    }
}

/// Outcome of one pass over a tree, one event per walk entry in the order
/// the walker reached it (unreadable entries included).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteReport {
    pub modified: usize,
    pub events: Vec<RewriteEvent>,
}

impl RewriteReport {
    pub fn record(&mut self, event: RewriteEvent) {
        if event.is_rewritten() {
            self.modified += 1;
        }
        self.events.push(event);
    }

    pub fn rewritten(&self) -> impl Iterator<Item = &RewriteEvent> {
        self.events.iter().filter(|e| e.is_rewritten())
    }

    pub fn failures(&self) -> impl Iterator<Item = &RewriteEvent> {
        self.events.iter().filter(|e| e.is_failure())
    }
}

/// Rewrite every recognized source file below `root`.
///
/// Fails only when the walk cannot start (missing root). Problems with
/// individual files end up as [`RewriteEvent::Failed`] entries and the
/// walk carries on.
pub fn rewrite_tree(root: &Path, options: &RewriteOptions) -> Result<RewriteReport> {
    let discovery = PathDiscovery::new(root)
        .extensions(options.extensions.iter().cloned())
        .follow_symlinks(options.follow_symlinks);
    rewrite_sources(&discovery, options)
}

/// Same as [`rewrite_tree`], over any source of candidate files.
pub fn rewrite_sources(
    discovery: &impl SourceDiscovery,
    options: &RewriteOptions,
) -> Result<RewriteReport> {
    let patterns = ReferencePatterns::new()?;
    let found = discovery.discover()?;
    let mut report = RewriteReport::default();

    for entry in found.entries {
        let event = match entry {
            Discovered::Source(source) => rewrite_file(&source.path, &patterns, options),
            Discovered::Unreadable(failure) => RewriteEvent::Failed {
                path: failure.path,
                message: failure.message,
            },
        };
        report.record(event);
    }

    tracing::info!(
        modified = report.modified,
        failed = report.failures().count(),
        dry_run = options.dry_run,
        "rewrite pass finished"
    );
    Ok(report)
}

/// Process one file: compute its prefix, rewrite, and write back only if changed.
///
/// Files outside the marker are skipped before any I/O happens.
pub fn rewrite_file(
    path: &Path,
    patterns: &ReferencePatterns,
    options: &RewriteOptions,
) -> RewriteEvent {
    let Some(prefix) = compute_prefix_with(path, &options.marker) else {
        tracing::debug!(path = %path.display(), "outside source root, skipping");
        return RewriteEvent::OutsideSourceRoot {
            path: path.to_path_buf(),
        };
    };

    match apply(path, &prefix, patterns, options.dry_run) {
        Ok(Some(replacements)) => {
            tracing::info!(path = %path.display(), %prefix, replacements, "rewrote styles references");
            RewriteEvent::Rewritten {
                path: path.to_path_buf(),
                prefix,
                replacements,
            }
        }
        Ok(None) => {
            tracing::debug!(path = %path.display(), "no styles references to fix");
            RewriteEvent::Unchanged {
                path: path.to_path_buf(),
            }
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %format!("{err:#}"), "failed to process file");
            RewriteEvent::Failed {
                path: Some(path.to_path_buf()),
                message: format!("{err:#}"),
            }
        }
    }
}

fn apply(
    path: &Path,
    prefix: &TargetPrefix,
    patterns: &ReferencePatterns,
    dry_run: bool,
) -> Result<Option<usize>> {
    let original =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let rewritten = patterns.rewrite(&original, prefix);

    if rewritten.text == original {
        return Ok(None);
    }

    if !dry_run {
        write_atomically(path, &rewritten.text)?;
    }
    Ok(Some(rewritten.replacements))
}

/// Replace `path` with `contents` through a sibling temp file, keeping its permissions.
///
/// A symlink is resolved first so the file it points at is replaced and the
/// link itself stays in place.
fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let resolved;
    let path = if fs::symlink_metadata(path)
        .with_context(|| format!("reading metadata of {}", path.display()))?
        .file_type()
        .is_symlink()
    {
        resolved = fs::canonicalize(path)
            .with_context(|| format!("resolving symlink {}", path.display()))?;
        resolved.as_path()
    } else {
        path
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)
        .with_context(|| format!("reading metadata of {}", path.display()))?
        .permissions();

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("writing temp file for {}", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("flushing temp file for {}", path.display()))?;
    fs::set_permissions(tmp.path(), permissions)
        .with_context(|| format!("copying permissions onto temp file for {}", path.display()))?;
    tmp.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}
