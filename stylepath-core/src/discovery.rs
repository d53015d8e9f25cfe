//! Source file discovery helpers for stylepath-core (made by FontLab https://www.fontlab.com/)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use walkdir::{DirEntry, WalkDir};

/// Extensions of the front-end sources we rewrite.
pub const SOURCE_EXTENSIONS: [&str; 2] = ["js", "jsx"];

/// Path to a candidate source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFileRef {
    pub path: PathBuf,
}

/// An entry the walker could not read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkFailure {
    pub path: Option<PathBuf>,
    pub message: String,
}

/// One step of a walk, in the order the walker reached it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovered {
    Source(SourceFileRef),
    Unreadable(WalkFailure),
}

/// Everything one walk turned up, including the entries it had to give up on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredSources {
    pub entries: Vec<Discovered>,
}

impl DiscoveredSources {
    pub fn files(&self) -> impl Iterator<Item = &SourceFileRef> {
        self.entries.iter().filter_map(|e| match e {
            Discovered::Source(source) => Some(source),
            Discovered::Unreadable(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &WalkFailure> {
        self.entries.iter().filter_map(|e| match e {
            Discovered::Unreadable(failure) => Some(failure),
            Discovered::Source(_) => None,
        })
    }
}

/// Trait for enumerating source files from some backing store.
pub trait SourceDiscovery {
    fn discover(&self) -> Result<DiscoveredSources>;
}

/// Recursive filesystem walker that collects files with the recognized extensions.
///
/// Nothing is excluded: dependency and build-output directories below the
/// root are walked like any other. Symlinked files are always picked up;
/// symlinked directories are only entered with `follow_symlinks`.
#[derive(Debug, Clone)]
pub struct PathDiscovery {
    root: PathBuf,
    extensions: Vec<String>,
    follow_symlinks: bool,
}

impl PathDiscovery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: SOURCE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            follow_symlinks: false,
        }
    }

    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }
}

impl SourceDiscovery for PathDiscovery {
    fn discover(&self) -> Result<DiscoveredSources> {
        if !self.root.exists() {
            return Err(anyhow!("root path does not exist: {}", self.root.display()));
        }

        let mut found = DiscoveredSources::default();
        for entry in WalkDir::new(&self.root).follow_links(self.follow_symlinks) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(path = ?err.path(), error = %err, "skipping unreadable entry");
                    found.entries.push(Discovered::Unreadable(WalkFailure {
                        path: err.path().map(Path::to_path_buf),
                        message: err.to_string(),
                    }));
                    continue;
                }
            };

            if is_file_like(&entry) && has_extension(entry.path(), &self.extensions) {
                found.entries.push(Discovered::Source(SourceFileRef {
                    path: entry.path().to_path_buf(),
                }));
            }
        }

        Ok(found)
    }
}

/// A regular file, or a symlink that does not point at a directory.
///
/// Dangling links count too, so reading them surfaces as a per-file failure.
fn is_file_like(entry: &DirEntry) -> bool {
    if entry.file_type().is_file() {
        return true;
    }
    entry.path_is_symlink()
        && !fs::metadata(entry.path())
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
}

/// Exact, case-sensitive suffix match on the file name, so `App.JSX` is not
/// a source file and a file named just `.js` is.
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    extensions.iter().any(|ext| {
        name.strip_suffix(ext.as_str())
            .is_some_and(|stem| stem.ends_with('.'))
    })
}
