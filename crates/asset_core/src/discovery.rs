//! Discovery: the one-time scan that locates every loadable asset file and
//! hashes its logical path. No load request may resolve until every
//! outstanding discovery read has completed — placements routinely reference
//! assets the scanner has not ingested yet, and resolving early would turn
//! those into spurious content-absent failures.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::format::ParsedAsset;
use crate::hash::hash_path;
use crate::io::{AsyncFileLoader, ReadRequest};

/// One discovered asset. Immutable after registration; torn down only in
/// bulk on a full reset.
#[derive(Debug, Clone)]
pub struct DiscoveredAsset {
    pub hash: u32,
    pub logical_path: String,
    pub parsed: ParsedAsset,
}

impl DiscoveredAsset {
    #[must_use]
    pub fn has_physics_shape(&self) -> bool {
        self.parsed.has_physics_shape()
    }
}

/// Tracks the scan lifecycle: how many reads are in flight and whether the
/// gate is open for loading.
#[derive(Debug, Default)]
pub struct DiscoveryScanner {
    started: bool,
    outstanding: usize,
}

impl DiscoveryScanner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enumerate files under `root` by extension, hash their paths relative
    /// to `root`, and queue reads. Returns the number of files queued.
    pub fn begin_scan(
        &mut self,
        io: &AsyncFileLoader,
        root: &Path,
        extensions: &[&str],
    ) -> Result<usize> {
        let mut found = Vec::new();
        walk(root, root, extensions, &mut found)
            .with_context(|| format!("scan asset root: {}", root.display()))?;
        let mut queued = 0;
        for (hash, _logical, abs) in found {
            if io.submit(ReadRequest { hash, path: abs }) {
                queued += 1;
            } else {
                log::error!("discovery: I/O thread gone, scan aborted");
                break;
            }
        }
        self.started = true;
        self.outstanding += queued;
        Ok(queued)
    }

    /// Record one completed discovery read.
    pub fn note_completion(&mut self) {
        self.outstanding = self.outstanding.saturating_sub(1);
    }

    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// True once a scan has been started and every read has come back.
    #[must_use]
    pub fn complete(&self) -> bool {
        self.started && self.outstanding == 0
    }

    /// Mark the scan complete without enumerating anything. Used when every
    /// asset was registered in-process (editor import, tests).
    pub fn mark_complete(&mut self) {
        self.started = true;
        self.outstanding = 0;
    }

    /// Full reset (map unload). A new scan must run before loads resolve.
    pub fn reset(&mut self) {
        self.started = false;
        self.outstanding = 0;
    }
}

/// Recursive enumeration helper; exposed for tooling.
pub fn walk(
    root: &Path,
    dir: &Path,
    extensions: &[&str],
    out: &mut Vec<(u32, String, PathBuf)>,
) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            walk(root, &path, extensions, out)?;
            continue;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            continue;
        }
        let rel = path.strip_prefix(root).unwrap_or(&path);
        let logical = crate::hash::normalize_path(&rel.to_string_lossy());
        out.push((hash_path(&logical), logical, path));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{build, AssetKind};

    #[test]
    fn scan_queues_matching_extensions_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("models")).unwrap();
        std::fs::write(
            dir.path().join("models/a.cmdl"),
            build(AssetKind::Model, 3, 3, &[]),
        )
        .unwrap();
        std::fs::write(dir.path().join("models/readme.txt"), b"x").unwrap();

        let io = AsyncFileLoader::spawn();
        let mut scan = DiscoveryScanner::new();
        let queued = scan.begin_scan(&io, dir.path(), &["cmdl"]).expect("scan");
        assert_eq!(queued, 1);
        assert!(!scan.complete());
        scan.note_completion();
        assert!(scan.complete());
    }

    #[test]
    fn unscanned_state_is_not_complete() {
        let scan = DiscoveryScanner::new();
        assert!(!scan.complete());
    }
}
