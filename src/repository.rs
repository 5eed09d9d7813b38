//! File access for the handlers, shaped as continuations so handlers can be
//! chained like any other step. The directory-backed implementation calls
//! `std::fs` directly: stat and small reads are fast enough to run on the
//! reactor thread.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;

use crate::reactor::{Callback, Next};

pub trait AsyncFile {
    /// Whether "other" users may read the file.
    fn is_world_readable(&self, callback: Callback<bool>) -> Next;
    fn read_contents(&self, callback: Callback<io::Result<Vec<u8>>>) -> Next;
    fn read_last_modified(&self, callback: Callback<io::Result<SystemTime>>) -> Next;
}

pub trait AsyncFileRepository {
    /// Looks up `path` (canonical, rooted at `/`). `None` if no such file.
    fn read_file(&self, path: &str, callback: Callback<Option<Rc<dyn AsyncFile>>>) -> Next;
}

/// A regular file on disk.
#[derive(Debug, Clone)]
pub struct PathFile {
    path: PathBuf,
}

impl PathFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AsyncFile for PathFile {
    fn is_world_readable(&self, callback: Callback<bool>) -> Next {
        let readable = fs::metadata(&self.path)
            .map(|meta| meta.permissions().mode() & 0o004 != 0)
            .unwrap_or(false);
        callback(readable)
    }

    fn read_contents(&self, callback: Callback<io::Result<Vec<u8>>>) -> Next {
        callback(fs::read(&self.path))
    }

    fn read_last_modified(&self, callback: Callback<io::Result<SystemTime>>) -> Next {
        callback(fs::metadata(&self.path).and_then(|meta| meta.modified()))
    }
}

/// Files under a document root.
#[derive(Debug, Clone)]
pub struct DirectoryFileRepository {
    root: PathBuf,
}

impl DirectoryFileRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AsyncFileRepository for DirectoryFileRepository {
    fn read_file(&self, path: &str, callback: Callback<Option<Rc<dyn AsyncFile>>>) -> Next {
        let full = self.root.join(path.trim_start_matches('/'));
        let file: Option<Rc<dyn AsyncFile>> = match fs::metadata(&full) {
            Ok(meta) if meta.is_file() => Some(Rc::new(PathFile::new(full))),
            _ => None,
        };
        callback(file)
    }
}
