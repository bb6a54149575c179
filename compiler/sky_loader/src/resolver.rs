//! Module name resolution.
//!
//! A [`ModuleResolver`] turns the string in `load("...")` into a canonical
//! [`ModulePath`] and reads its source. Two requests name the same module
//! exactly when they resolve to equal paths, so resolution must be purely
//! lexical and deterministic.

use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Canonical identifier of a module; the cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModulePath(Arc<str>);

impl ModulePath {
    pub fn new(path: &str) -> Self {
        ModulePath(Arc::from(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shared form handed to the evaluator for positions.
    pub fn as_arc(&self) -> &Arc<str> {
        &self.0
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Arc<str>> for ModulePath {
    fn from(path: Arc<str>) -> Self {
        ModulePath(path)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("module name is empty")]
    Empty,
    #[error("module name {0:?} contains '\\'; use '/' as the path separator")]
    Separator(String),
    #[error("module name {0:?} is absolute; names are relative to the root directory")]
    Absolute(String),
    #[error("module name {0:?} leaves the root directory")]
    OutsideRoot(String),
    #[error("cannot determine the working directory: {0}")]
    WorkingDirectory(String),
}

/// Source of modules for one load.
pub trait ModuleResolver {
    /// Resolve `name` as requested by the module at `from` (`None` for the
    /// entry module).
    fn resolve(&self, name: &str, from: Option<&ModulePath>) -> Result<ModulePath, ResolveError>;

    fn read(&self, path: &ModulePath) -> io::Result<String>;
}

fn check_name(name: &str) -> Result<(), ResolveError> {
    if name.is_empty() {
        return Err(ResolveError::Empty);
    }
    if name.contains('\\') {
        return Err(ResolveError::Separator(name.to_string()));
    }
    Ok(())
}

/// Filesystem resolver.
///
/// Every name is relative to one fixed root directory, whichever module
/// asks for it. A leading `//` is accepted and means the same thing.
/// Absolute names and names whose `..` segments climb out of the root are
/// rejected. `.` and `..` are folded lexically; symlinks are not followed.
#[derive(Clone, Debug)]
pub struct FsResolver {
    root: PathBuf,
}

impl FsResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsResolver { root: root.into() }
    }

    /// Resolver rooted at the directory of `entry`, plus the entry's name
    /// relative to that root.
    pub fn for_entry(entry: &Path) -> Result<(Self, String), ResolveError> {
        let absolute = if entry.is_absolute() {
            entry.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| ResolveError::WorkingDirectory(e.to_string()))?
                .join(entry)
        };
        let absolute = normalize_path(&absolute);
        let root = absolute.parent().map(Path::to_path_buf).unwrap_or_default();
        let name = absolute
            .file_name()
            .ok_or_else(|| ResolveError::OutsideRoot(entry.to_string_lossy().into_owned()))?;
        Ok((FsResolver::new(root), name.to_string_lossy().into_owned()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ModuleResolver for FsResolver {
    fn resolve(&self, name: &str, _from: Option<&ModulePath>) -> Result<ModulePath, ResolveError> {
        check_name(name)?;
        let relative = Path::new(name.strip_prefix("//").unwrap_or(name));
        if relative.has_root() || relative.is_absolute() {
            return Err(ResolveError::Absolute(name.to_string()));
        }
        let root = normalize_path(&self.root);
        let resolved = normalize_path(&root.join(relative));
        if resolved == root || !resolved.starts_with(&root) {
            return Err(ResolveError::OutsideRoot(name.to_string()));
        }
        Ok(ModulePath::new(&resolved.to_string_lossy()))
    }

    fn read(&self, path: &ModulePath) -> io::Result<String> {
        std::fs::read_to_string(path.as_str())
    }
}

/// Fold `.` and `..` without touching the filesystem. `..` at the root
/// stays at the root.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            c => result.push(c),
        }
    }
    result
}

/// Resolver over an in-memory map of `/`-separated paths.
///
/// Paths are stored in canonical form (`/lib/util.sky`); the root is `/`.
/// Names resolve against the root the same way as [`FsResolver`]; a
/// leading `/` is allowed since it can only name the virtual root.
#[derive(Clone, Debug, Default)]
pub struct MemoryResolver {
    modules: FxHashMap<String, String>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_module(mut self, path: &str, source: &str) -> Self {
        self.insert(path, source);
        self
    }

    /// `..` segments that climb above the root are dropped.
    pub fn insert(&mut self, path: &str, source: &str) {
        let (key, _) = canonical_slashes(path);
        self.modules.insert(key, source.to_string());
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleResolver for MemoryResolver {
    fn resolve(&self, name: &str, _from: Option<&ModulePath>) -> Result<ModulePath, ResolveError> {
        check_name(name)?;
        match canonical_slashes(name) {
            (path, false) if path != "/" => Ok(ModulePath::new(&path)),
            _ => Err(ResolveError::OutsideRoot(name.to_string())),
        }
    }

    fn read(&self, path: &ModulePath) -> io::Result<String> {
        self.modules.get(path.as_str()).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no such module")
        })
    }
}

/// Fold `.` and `..` in a `/`-separated path. The flag is set when a `..`
/// tried to climb above the root.
fn canonical_slashes(path: &str) -> (String, bool) {
    let mut parts: Vec<&str> = Vec::new();
    let mut escaped = false;
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => escaped |= parts.pop().is_none(),
            part => parts.push(part),
        }
    }
    (format!("/{}", parts.join("/")), escaped)
}

#[cfg(test)]
mod tests;
