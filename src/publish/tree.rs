//! Whole-tree filesystem operations: clear, copy, snapshot

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::hash::Hasher;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::error::{PublishError, PublishResult};

/// Target root entries that survive clearing, e.g. the checkout's `.git`
#[derive(Debug, Clone, Default)]
pub struct Preserve {
    patterns: Vec<glob::Pattern>,
}

impl Preserve {
    pub fn new(patterns: &[String]) -> PublishResult<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|source| PublishError::InvalidPattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<PublishResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Preserve nothing
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether a root entry name is preserved
    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(name))
    }

    fn matches_path(&self, root: &Path, path: &Path) -> bool {
        path.strip_prefix(root)
            .map(|rel| self.matches_relative(rel))
            .unwrap_or(false)
    }

    /// Whether a path relative to the target root lies under a preserved entry
    fn matches_relative(&self, rel: &Path) -> bool {
        rel.components()
            .next()
            .and_then(|c| c.as_os_str().to_str())
            .map(|name| self.matches(name))
            .unwrap_or(false)
    }
}

/// Remove a directory tree; absent is fine. Returns whether anything was removed.
pub fn remove_dir_if_exists(path: &Path) -> PublishResult<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(PublishError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Delete every root entry of `dir` that is not preserved; absent is fine.
/// Returns the number of root entries removed.
pub fn clear_dir(dir: &Path, preserve: &Preserve) -> PublishResult<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(PublishError::io(dir)(e)),
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(PublishError::io(dir))?;
        let name = entry.file_name();
        if preserve.matches(&name.to_string_lossy()) {
            tracing::debug!("Preserved: {:?}", entry.path());
            continue;
        }

        let path = entry.path();
        let file_type = entry.file_type().map_err(PublishError::io(&path))?;
        if file_type.is_dir() {
            fs::remove_dir_all(&path).map_err(PublishError::io(&path))?;
        } else {
            fs::remove_file(&path).map_err(PublishError::io(&path))?;
        }
        removed += 1;
    }

    Ok(removed)
}

/// Recursively copy the contents of `src` into `dst`, creating `dst` as needed.
/// Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path) -> PublishResult<usize> {
    fs::create_dir_all(dst).map_err(PublishError::io(dst))?;

    // A `dst` nested in `src` would otherwise be walked while it is being filled
    let dst_abs = normalize(&std::path::absolute(dst).map_err(PublishError::io(dst))?);
    let walker = WalkDir::new(src)
        .follow_links(true)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| {
            std::path::absolute(e.path())
                .map(|p| !normalize(&p).starts_with(&dst_abs))
                .unwrap_or(true)
        });

    let mut copied = 0;
    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        let relative = path.strip_prefix(src).unwrap_or(path);
        let dest = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(PublishError::io(&dest))?;
        } else {
            fs::copy(path, &dest).map_err(PublishError::io(&dest))?;
            tracing::trace!("Copied: {:?} -> {:?}", path, dest);
            copied += 1;
        }
    }

    Ok(copied)
}

/// Move preserved root entries of `from` into `to`, replacing same-named entries there
pub fn move_preserved(from: &Path, to: &Path, preserve: &Preserve) -> PublishResult<usize> {
    let entries = match fs::read_dir(from) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(PublishError::io(from)(e)),
    };

    let mut moved = 0;
    for entry in entries {
        let entry = entry.map_err(PublishError::io(from))?;
        if !preserve.matches(&entry.file_name().to_string_lossy()) {
            continue;
        }

        let dest = to.join(entry.file_name());
        if dest.is_dir() {
            fs::remove_dir_all(&dest).map_err(PublishError::io(&dest))?;
        } else if dest.exists() {
            fs::remove_file(&dest).map_err(PublishError::io(&dest))?;
        }
        fs::rename(entry.path(), &dest).map_err(PublishError::io(&dest))?;
        moved += 1;
    }

    Ok(moved)
}

/// Content fingerprint of one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileDigest {
    pub size: u64,
    pub hash: u64,
}

/// Relative path -> digest for every file in a tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    files: BTreeMap<PathBuf, FileDigest>,
}

impl Manifest {
    /// Snapshot `root`, skipping preserved root entries. An absent root is empty.
    pub fn scan(root: &Path, preserve: &Preserve) -> PublishResult<Self> {
        let mut files = BTreeMap::new();
        if !root.exists() {
            return Ok(Self { files });
        }

        let walker = WalkDir::new(root)
            .follow_links(true)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| !preserve.matches_path(root, e.path()));

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_dir() {
                continue;
            }
            let path = entry.path();
            let bytes = fs::read(path).map_err(PublishError::io(path))?;
            let mut hasher = DefaultHasher::new();
            hasher.write(&bytes);
            let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
            files.insert(
                relative,
                FileDigest {
                    size: bytes.len() as u64,
                    hash: hasher.finish(),
                },
            );
        }

        Ok(Self { files })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of files outside the preserved root entries
    pub fn count_excluding(&self, preserve: &Preserve) -> usize {
        self.files
            .keys()
            .filter(|path| !preserve.matches_relative(path))
            .count()
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.files.contains_key(path.as_ref())
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    /// Differences of `actual` relative to `self`
    pub fn diff(&self, actual: &Manifest) -> TreeDiff {
        let mut diff = TreeDiff::default();
        for (path, digest) in &self.files {
            match actual.files.get(path) {
                None => diff.missing.push(path.clone()),
                Some(other) if other != digest => diff.changed.push(path.clone()),
                Some(_) => {}
            }
        }
        for path in actual.files.keys() {
            if !self.files.contains_key(path) {
                diff.extra.push(path.clone());
            }
        }
        diff
    }
}

/// Result of comparing two manifests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDiff {
    pub missing: Vec<PathBuf>,
    pub extra: Vec<PathBuf>,
    pub changed: Vec<PathBuf>,
}

impl TreeDiff {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty() && self.changed.is_empty()
    }
}

impl fmt::Display for TreeDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} missing, {} extra, {} changed",
            self.missing.len(),
            self.extra.len(),
            self.changed.len()
        )?;
        if let Some(first) = self
            .missing
            .iter()
            .chain(&self.extra)
            .chain(&self.changed)
            .next()
        {
            write!(f, " (first: {:?})", first)?;
        }
        Ok(())
    }
}

/// Lexically resolve `.` and `..` so paths that do not exist yet can be compared
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Whether one path is equal to or nested inside the other
pub fn overlaps(a: &Path, b: &Path) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    a.starts_with(&b) || b.starts_with(&a)
}
