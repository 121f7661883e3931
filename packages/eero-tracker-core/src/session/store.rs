//! Session token storage.
//!
//! Any persistent key-value backing satisfies the contract; the tracker only
//! needs to read one opaque string at startup and overwrite it on refresh.

use crate::error::PersistenceError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Capability for persisting the opaque session token.
pub trait SessionStorage {
    /// Read the stored token. A missing token is `Ok(None)`, not an error:
    /// it just means the tracker is unauthenticated.
    fn load(&self) -> Result<Option<String>, PersistenceError>;

    /// Overwrite the stored token wholesale.
    fn save(&mut self, token: &str) -> Result<(), PersistenceError>;
}

/// Plain-text file holding the session token verbatim.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileSessionStore {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim_end_matches(['\r', '\n']).to_string();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token))
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistenceError {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn save(&mut self, token: &str) -> Result<(), PersistenceError> {
        let io_err = |source| PersistenceError {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        // Owner read/write only: the token is a credential.
        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .map_err(|source| PersistenceError {
                    path: self.path.clone(),
                    source,
                })?;
            file.write_all(token.as_bytes())
                .map_err(|source| PersistenceError {
                    path: self.path.clone(),
                    source,
                })?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, token).map_err(io_err)?;
        }

        tracing::debug!("Session token saved to {:?}", self.path);
        Ok(())
    }
}

/// In-process token storage, for hosts that manage persistence themselves
/// and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    token: Option<String>,
}

impl MemorySessionStore {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl SessionStorage for MemorySessionStore {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.token.clone())
    }

    fn save(&mut self, token: &str) -> Result<(), PersistenceError> {
        self.token = Some(token.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_unauthenticated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path().join("eero.session"));
        assert_eq!(store.load().expect("load"), None);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FileSessionStore::new(dir.path().join("eero.session"));
        store.save("token-123").expect("save");
        assert_eq!(store.load().expect("load"), Some("token-123".to_string()));
    }

    #[test]
    fn test_trailing_newline_stripped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("eero.session");
        std::fs::write(&path, "token-123\n").expect("write");
        let store = FileSessionStore::new(&path);
        assert_eq!(store.load().expect("load"), Some("token-123".to_string()));
    }

    #[test]
    fn test_empty_file_is_unauthenticated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("eero.session");
        std::fs::write(&path, "\n").expect("write");
        let store = FileSessionStore::new(&path);
        assert_eq!(store.load().expect("load"), None);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("eero.session");
        let mut store = FileSessionStore::new(&path);
        store.save("token-123").expect("save");
        assert_eq!(store.load().expect("load"), Some("token-123".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("eero.session");
        let mut store = FileSessionStore::new(&path);
        store.save("token-123").expect("save");
        let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
