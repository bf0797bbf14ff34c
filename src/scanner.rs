// SPDX-License-Identifier: PMPL-1.0-or-later
//! Loads exported frames from disk.
//!
//! A path may name a single frame JSON file or a directory, which is walked
//! for `*.json` exports. Files that do not parse as a frame are skipped.

use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::Result;
use crate::node::{from_json_bounded, ElementNode};
use crate::service::AuditEnvelope;

/// Directories to skip
const SKIP_DIRS: &[&str] = &["node_modules", ".git", "target", "dist", "build", "coverage"];

/// A frame and the file it came from
#[derive(Debug, Clone)]
pub struct FrameSource {
    pub path: PathBuf,
    pub frame: ElementNode,
}

/// Audit outcome for one frame file
#[derive(Debug, Clone)]
pub struct FrameAudit {
    pub path: PathBuf,
    pub envelope: AuditEnvelope,
}

/// Read one frame export, keeping nodes down to `max_depth`
pub fn load_frame(path: &Path, max_depth: usize) -> Result<ElementNode> {
    let content = std::fs::read(path)?;
    Ok(from_json_bounded(&content, max_depth)?)
}

/// Collect frames from a file or directory, in path order
pub fn collect_frames(path: &Path, max_depth: usize) -> Result<Vec<FrameSource>> {
    if path.is_file() {
        return Ok(vec![FrameSource {
            path: path.to_path_buf(),
            frame: load_frame(path, max_depth)?,
        }]);
    }

    info!("Scanning directory: {}", path.display());
    let mut frames = Vec::new();

    for entry in WalkDir::new(path)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_str().unwrap_or("");
            if e.file_type().is_dir() && e.depth() > 0 {
                return !SKIP_DIRS.contains(&name) && !name.starts_with('.');
            }
            true
        })
    {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        match load_frame(entry.path(), max_depth) {
            Ok(frame) => frames.push(FrameSource {
                path: entry.path().to_path_buf(),
                frame,
            }),
            Err(e) => warn!("Skipping {}: {}", entry.path().display(), e),
        }
    }

    info!("Found {} frame(s)", frames.len());
    Ok(frames)
}
