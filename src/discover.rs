//! Depth-limited, duplicate-safe image discovery across one or more roots.

use crate::classify::{is_hidden, is_image_file, is_skippable_dir};
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

/// Traversal parameters for one discovery run.
///
/// `max_depth = 0` means "entries directly inside each root only"; root
/// contents are depth 0, and depth is counted relative to the root an entry
/// was reached from.
#[derive(Debug, Clone)]
pub struct TraversalConfig {
    pub roots: Vec<PathBuf>,
    pub max_depth: usize,
}

/// An image file found during traversal. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub path: PathBuf,
    /// Directory levels below the search root this file was found at.
    pub depth: usize,
    /// Ordinal position in discovery order, strictly increasing per run.
    pub discovered_at: usize,
}

/// Identity of the *physical* directory a path resolves to.
///
/// Two path strings that resolve to the same identity are visited at most
/// once per traversal run, which is what makes alias-like entries (symlinks,
/// firmlinks, overlapping roots) safe: no duplicate scans, no cycles. Only
/// equality and hashing are relied upon.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DirectoryIdentity {
    #[cfg(unix)]
    DeviceInode(u64, u64),
    Canonical(PathBuf),
}

impl DirectoryIdentity {
    pub fn of(path: &Path) -> std::io::Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            let metadata = fs::metadata(path)?;
            Ok(DirectoryIdentity::DeviceInode(
                metadata.dev(),
                metadata.ino(),
            ))
        }
        #[cfg(not(unix))]
        {
            Ok(DirectoryIdentity::Canonical(fs::canonicalize(path)?))
        }
    }
}

/// Lazy producer of image candidates.
///
/// Directories are expanded one at a time, so callers that only want a prefix
/// (the `--test-search` preview) never pay for the full walk. Entries within
/// a directory are processed in sorted name order, making the sequence
/// deterministic for a given filesystem snapshot.
#[derive(Debug)]
pub struct Discovery {
    max_depth: usize,
    /// Directories still to expand, with the depth their entries will have.
    dirs: VecDeque<(PathBuf, usize)>,
    /// Files classified as images, not yet handed out.
    ready: VecDeque<(PathBuf, usize)>,
    visited: HashSet<DirectoryIdentity>,
    next_ordinal: usize,
}

/// Starts a traversal over `config.roots` in the order given.
///
/// The visited set is seeded empty per run, not per root: two roots that
/// alias the same physical directory are still visited only once.
pub fn discover(config: &TraversalConfig) -> Discovery {
    let mut discovery = Discovery {
        max_depth: config.max_depth,
        dirs: VecDeque::new(),
        ready: VecDeque::new(),
        visited: HashSet::new(),
        next_ordinal: 0,
    };

    for root in &config.roots {
        discovery.push_dir(root.clone(), 0);
    }

    discovery
}

impl Discovery {
    /// Queues a directory for expansion unless its physical identity was
    /// already visited this run. Unresolvable identities (vanished entry,
    /// permission denied) are skipped silently.
    fn push_dir(&mut self, path: PathBuf, entry_depth: usize) {
        let identity = match DirectoryIdentity::of(&path) {
            Ok(id) => id,
            Err(_) => return,
        };
        if self.visited.insert(identity) {
            self.dirs.push_back((path, entry_depth));
        }
    }

    /// Expands one queued directory, classifying its files and queueing its
    /// eligible subdirectories. A single unreadable entry never aborts the
    /// walk; it is skipped and siblings continue.
    fn expand_next_dir(&mut self) {
        let (dir, entry_depth) = match self.dirs.pop_front() {
            Some(item) => item,
            None => return,
        };

        let read = match fs::read_dir(&dir) {
            Ok(read) => read,
            Err(_) => return,
        };

        let mut entries: Vec<PathBuf> = read
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        entries.sort();

        for path in entries {
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };
            if is_hidden(name) {
                continue;
            }

            let metadata = match fs::metadata(&path) {
                Ok(m) => m,
                Err(_) => continue,
            };

            if metadata.is_dir() {
                if is_skippable_dir(name) {
                    continue;
                }
                // Files at the boundary depth are still classified; only the
                // descent below it is cut off.
                if entry_depth < self.max_depth {
                    self.push_dir(path, entry_depth + 1);
                }
            } else if is_image_file(&path) {
                self.ready.push_back((path, entry_depth));
            }
        }
    }
}

impl Iterator for Discovery {
    type Item = ImageCandidate;

    fn next(&mut self) -> Option<ImageCandidate> {
        loop {
            if let Some((path, depth)) = self.ready.pop_front() {
                let candidate = ImageCandidate {
                    path,
                    depth,
                    discovered_at: self.next_ordinal,
                };
                self.next_ordinal += 1;
                return Some(candidate);
            }
            if self.dirs.is_empty() {
                return None;
            }
            self.expand_next_dir();
        }
    }
}
