//! Token persistence in a single file under the console storage directory.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use crate::domain::ports::{TokenStorage, TokenStorageError};

/// File name of the persisted token inside the storage directory.
pub const TOKEN_KEY: &str = "token";

/// Stores the bearer token as `<storage_dir>/token`.
///
/// A missing directory or file reads as "no token". Blank file content is
/// treated the same way.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    root: PathBuf,
}

impl FileTokenStorage {
    /// Storage rooted at `root`; the directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the token file.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn open_dir(&self) -> io::Result<Dir> {
        Dir::open_ambient_dir(&self.root, ambient_authority())
    }

    fn io_error(&self, action: &str, error: &io::Error) -> TokenStorageError {
        TokenStorageError::io(format!(
            "failed to {action} {}: {error}",
            self.root.join(TOKEN_KEY).display()
        ))
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>, TokenStorageError> {
        let dir = match self.open_dir() {
            Ok(dir) => dir,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(self.io_error("open", &error)),
        };
        match dir.read_to_string(TOKEN_KEY) {
            Ok(raw) if raw.trim().is_empty() => Ok(None),
            Ok(raw) => Ok(Some(raw.trim().to_owned())),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(self.io_error("read", &error)),
        }
    }

    fn save(&self, token: &str) -> Result<(), TokenStorageError> {
        Dir::create_ambient_dir_all(&self.root, ambient_authority())
            .map_err(|error| self.io_error("create directory for", &error))?;
        let dir = self
            .open_dir()
            .map_err(|error| self.io_error("open", &error))?;
        dir.write(TOKEN_KEY, token.as_bytes())
            .map_err(|error| self.io_error("write", &error))?;
        debug!(path = %self.root.display(), "token persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStorageError> {
        let dir = match self.open_dir() {
            Ok(dir) => dir,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(error) => return Err(self.io_error("open", &error)),
        };
        match dir.remove_file(TOKEN_KEY) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(self.io_error("remove", &error)),
        }
    }
}
