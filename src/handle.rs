//! The narrow seam between this crate and a host's file-handle type.
//!
//! The real host (a file manager) has its own notion of a file handle that
//! may point at a local path, a remote `gvfs`-style URI, or something else
//! entirely. This crate does not model that type; it only needs the one bit
//! of information the probe facade cares about: does this handle resolve to
//! a local absolute path, or not?
use std::path::{Path, PathBuf};

/// Resolution result for a host file handle.
///
/// Construct via [`MountHandle::local`] or [`MountHandle::non_local`]; hosts
/// embedding this crate are expected to perform their own handle-to-path
/// resolution and map the result into one of these two variants.
#[derive(Debug, Clone)]
pub enum MountHandle {
    /// Resolved to a local absolute path worth probing.
    Local(PathBuf),
    /// Not a local path (e.g. a remote URI) — assumed reachable by its own
    /// transport and never probed.
    NonLocal,
}

impl MountHandle {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        MountHandle::Local(path.into())
    }

    pub const fn non_local() -> Self {
        MountHandle::NonLocal
    }

    /// Build a handle from an already-resolved path, the way a host would
    /// after calling its own `g_file_get_path`-equivalent. `None` models
    /// extraction failure, treated as non-local per the design notes.
    pub fn from_resolved(path: Option<impl Into<PathBuf>>) -> Self {
        match path {
            Some(p) => MountHandle::Local(p.into()),
            None => MountHandle::NonLocal,
        }
    }

    pub fn as_local_path(&self) -> Option<&Path> {
        match self {
            MountHandle::Local(p) => Some(p.as_path()),
            MountHandle::NonLocal => None,
        }
    }
}
