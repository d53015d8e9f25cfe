//! Relative prefix computation (made by FontLab https://www.fontlab.com/)

use std::ffi::OsStr;
use std::fmt;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

/// Directory name that anchors the depth calculation.
pub const SOURCE_ROOT_MARKER: &str = "src";

/// Location of the shared styles, relative to the source root.
pub const STYLES_TARGET: &str = "components/styles/";

/// Relative path from a source file back to the shared styles directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TargetPrefix {
    depth: usize,
    text: String,
}

impl TargetPrefix {
    pub fn at_depth(depth: usize) -> Self {
        let text = format!("{}{STYLES_TARGET}", "../".repeat(depth));
        Self { depth, text }
    }

    /// Number of `../` segments leading the prefix.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for TargetPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<TargetPrefix> for String {
    fn from(prefix: TargetPrefix) -> Self {
        prefix.text
    }
}

impl TryFrom<String> for TargetPrefix {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let ups = raw
            .strip_suffix(STYLES_TARGET)
            .ok_or_else(|| format!("prefix must end with {STYLES_TARGET}: {raw}"))?;
        if ups.len() % 3 != 0 || ups.as_bytes().chunks(3).any(|c| c != b"../") {
            return Err(format!("prefix must start with ../ segments only: {raw}"));
        }
        Ok(Self::at_depth(ups.len() / 3))
    }
}

/// Count the directories between `marker` and the file named by `path`.
///
/// Every component counts toward the total (`/`, `.` and normal segments
/// alike), and the first component equal to `marker` is the anchor. Returns
/// `None` when the marker does not occur at all; a marker in the final
/// position clamps to zero instead of going negative.
pub fn depth_below_marker(path: &Path, marker: &str) -> Option<usize> {
    let components: Vec<Component<'_>> = path.components().collect();
    let marker = OsStr::new(marker);
    let index = components
        .iter()
        .position(|c| matches!(c, Component::Normal(name) if *name == marker))?;

    Some(components.len().saturating_sub(index + 2))
}

/// Prefix for `path` anchored at the default `src` marker.
pub fn compute_prefix(path: &Path) -> Option<TargetPrefix> {
    compute_prefix_with(path, SOURCE_ROOT_MARKER)
}

/// Prefix for `path` anchored at a custom marker; `None` means leave the file alone.
pub fn compute_prefix_with(path: &Path, marker: &str) -> Option<TargetPrefix> {
    depth_below_marker(path, marker).map(TargetPrefix::at_depth)
}
