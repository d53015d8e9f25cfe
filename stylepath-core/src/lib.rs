//! stylepath-core: the patient tidier of front-end style imports
//!
//! Front-end trees get reorganized, and every move leaves behind a trail of
//! stale references to the shared styles folder: an `@/` alias the bundler
//! no longer understands here, a `./styles/` that used to sit next door, a
//! `../../styles/` from two folders ago. This library walks the tree and
//! points every one of them back at `components/styles/`, measured from
//! wherever each file now lives.
//!
//! ## How a Pass Unfolds
//!
//! **Discovery**: find every `.js` and `.jsx` file below a root, without
//! skipping any directory along the way.
//!
//! **Measuring**: count how far each file sits below the `src` marker and
//! turn that into the right number of `../` hops.
//!
//! **Rewriting**: run the eight `import`/`from` rules over the text and
//! write the file back, atomically, only when something actually changed.
//!
//! ## A Sample Session
//!
//! ```rust,no_run
//! use std::path::Path;
//! use stylepath_core::rewrite::{rewrite_tree, RewriteOptions};
//!
//! let report = rewrite_tree(Path::new("src"), &RewriteOptions::default())?;
//! for event in report.rewritten() {
//!     println!("Fixed: {}", event.path().unwrap_or(Path::new("?")).display());
//! }
//! println!("Fixed {} files", report.modified);
//! #
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! A second pass over the same tree finds nothing to do: the rewritten form
//! never matches any of the forms it replaces.
//!
//! ---
//!
//! Crafted with care at FontLab https://www.fontlab.com/

pub mod discovery;
pub mod output;
pub mod patterns;
pub mod prefix;
pub mod rewrite;
