//! Resolution of configured fact paths into absolute watch targets.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use crate::error::Result;

/// The fixed set of absolute fact file paths a session follows.
///
/// Keeps the configured order (duplicates included) for the initial load and a
/// set for exact-membership checks on incoming events.
#[derive(Debug, Clone, Default)]
pub struct WatchTargets {
    paths: Vec<PathBuf>,
    members: HashSet<PathBuf>,
    /// Canonical spelling -> configured spelling, for engines that report
    /// resolved paths.
    aliases: HashMap<PathBuf, PathBuf>,
}

impl WatchTargets {
    /// Resolve `files` against `base`. Absolute entries are kept, relative ones
    /// are joined onto `base`; both are lexically normalized.
    pub fn resolve<I, P>(files: I, base: &Path) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let paths: Vec<PathBuf> = files
            .into_iter()
            .map(|f| absolutize(f.as_ref(), base))
            .collect();
        let members = paths.iter().cloned().collect();
        Self {
            paths,
            members,
            aliases: HashMap::new(),
        }
    }

    /// Resolve `files` against the current working directory.
    pub fn from_cwd<I, P>(files: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let cwd = std::env::current_dir()?;
        Ok(Self::resolve(files, &cwd))
    }

    /// Targets in configured order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Distinct parent directories, in first-seen order.
    pub fn directories(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        self.paths
            .iter()
            .map(|p| p.parent().unwrap_or(p).to_path_buf())
            .filter(|dir| seen.insert(dir.clone()))
            .collect()
    }

    /// The target an event path refers to, if any.
    pub fn matching(&self, path: &Path) -> Option<&Path> {
        if let Some(hit) = self.members.get(path) {
            return Some(hit.as_path());
        }
        self.aliases.get(path).map(PathBuf::as_path)
    }

    /// Register the canonical spelling of each target whose parent directory
    /// resolves elsewhere (symlinked temp dirs, `/private/var` on macOS).
    /// Directories that cannot be canonicalized are left alone.
    pub fn add_canonical_aliases(&mut self) {
        for path in &self.paths {
            let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
                continue;
            };
            let Ok(canonical_parent) = parent.canonicalize() else {
                continue;
            };
            let canonical = canonical_parent.join(name);
            if canonical != *path && !self.members.contains(&canonical) {
                self.aliases.insert(canonical, path.clone());
            }
        }
    }
}

/// Join `path` onto `base` when relative, then fold `.` and `..` lexically.
/// Symlinks are not resolved.
pub(crate) fn absolutize(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}
