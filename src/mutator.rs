//! # Literal Substitution
//!
//! Rewrites the files of a [`ChangeSet`] in place. Each file is processed
//! line by line and every literal occurrence of the target is replaced; line
//! endings (LF, CRLF, a missing final newline) come out exactly as they went
//! in. Nothing outside the change set is opened.
//!
//! A path that vanished between search and rewrite, or that is not valid
//! UTF-8 text, is logged and skipped. Other I/O errors fail the repository.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::Result;
use crate::locator::ChangeSet;

/// Outcome of applying a change set to a working copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationReport {
    /// Files whose content changed, relative to the working copy.
    pub changed: Vec<PathBuf>,
    /// Matched paths that no longer existed.
    pub missing: Vec<PathBuf>,
    /// Matched paths that are not UTF-8 text.
    pub skipped: Vec<PathBuf>,
    /// Total occurrences replaced.
    pub replacements: usize,
}

/// Replace every occurrence of `target` in `content`, one line at a time.
///
/// Returns the new content and the number of replacements made.
pub fn substitute(content: &str, target: &str, replacement: &str) -> (String, usize) {
    if target.is_empty() {
        return (content.to_string(), 0);
    }
    let mut out = String::with_capacity(content.len());
    let mut count = 0;
    for line in content.split_inclusive('\n') {
        let hits = line.matches(target).count();
        if hits == 0 {
            out.push_str(line);
        } else {
            count += hits;
            out.push_str(&line.replace(target, replacement));
        }
    }
    (out, count)
}

/// Apply `change_set` to the working copy at `workspace`.
pub fn apply(workspace: &Path, change_set: &ChangeSet) -> Result<MutationReport> {
    let mut report = MutationReport::default();

    for relative in &change_set.paths {
        let path = workspace.join(relative);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Skipping {}: file no longer exists", path.display());
                report.missing.push(relative.clone());
                continue;
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                warn!("Skipping {}: not UTF-8 text", path.display());
                report.skipped.push(relative.clone());
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let (updated, count) = substitute(&content, &change_set.target, &change_set.replacement);
        report.replacements += count;
        if updated != content {
            fs::write(&path, updated)?;
            debug!("Rewrote {} ({} replacements)", path.display(), count);
            report.changed.push(relative.clone());
        }
    }

    Ok(report)
}
