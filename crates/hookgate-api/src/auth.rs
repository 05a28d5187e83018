// Persisted bearer token.
//
// The dashboard keeps exactly one piece of persisted client state: an
// opaque bearer token. Absent means unauthenticated. The transport reads
// it on every request and clears it on a 401.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

/// Storage for the admin API bearer token.
pub trait TokenStore: Send + Sync {
    /// Current token, if any.
    fn token(&self) -> Option<SecretString>;

    /// Replace the stored token.
    fn store(&self, token: SecretString) -> io::Result<()>;

    /// Forget the stored token. Clearing an empty store is not an error.
    fn clear(&self) -> io::Result<()>;
}

// ── In-memory ────────────────────────────────────────────────────────

/// Process-local token storage. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<SecretString>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: SecretString) -> Self {
        Self {
            token: RwLock::new(Some(token)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<SecretString> {
        self.token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn store(&self, token: SecretString) -> io::Result<()> {
        *self
            .token
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(token);
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self
            .token
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        Ok(())
    }
}

// ── File-backed ──────────────────────────────────────────────────────

/// Token persisted to a single file, cached in memory after load.
///
/// Reads never touch disk after construction; writes go through to the
/// file so the next process sees them.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    cached: RwLock<Option<SecretString>>,
}

impl FileTokenStore {
    /// Open the store at `path`, loading an existing token if present.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let cached = match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                (!trimmed.is_empty()).then(|| SecretString::from(trimmed.to_owned()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e),
        };
        debug!(path = %path.display(), present = cached.is_some(), "loaded token store");
        Ok(Self {
            path,
            cached: RwLock::new(cached),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        // `mode` only applies on create; tighten a pre-existing file too
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(token.as_bytes())?;
        file.sync_all()
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<SecretString> {
        self.cached
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn store(&self, token: SecretString) -> io::Result<()> {
        self.write_file(token.expose_secret())?;
        *self
            .cached
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(token);
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self
            .cached
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to remove token file");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert!(store.token().is_none());

        store.store(SecretString::from("abc".to_owned())).unwrap();
        assert_eq!(store.token().unwrap().expose_secret(), "abc");

        store.clear().unwrap();
        assert!(store.token().is_none());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("token");

        let first = FileTokenStore::open(&path).unwrap();
        assert!(first.token().is_none());
        first.store(SecretString::from("persisted".to_owned())).unwrap();

        let second = FileTokenStore::open(&path).unwrap();
        assert_eq!(second.token().unwrap().expose_secret(), "persisted");

        second.clear().unwrap();
        assert!(!path.exists());
        // clearing twice is fine
        second.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fresh = dir.path().join("fresh");
        FileTokenStore::open(&fresh)
            .unwrap()
            .store(SecretString::from("t1".to_owned()))
            .unwrap();
        let mode = std::fs::metadata(&fresh).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        let existing = dir.path().join("existing");
        std::fs::write(&existing, "old").unwrap();
        std::fs::set_permissions(&existing, std::fs::Permissions::from_mode(0o644)).unwrap();
        let store = FileTokenStore::open(&existing).unwrap();
        store.store(SecretString::from("t2".to_owned())).unwrap();
        let mode = std::fs::metadata(&existing).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(std::fs::read_to_string(&existing).unwrap(), "t2");
    }

    #[test]
    fn file_store_ignores_blank_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "  \n").unwrap();

        let store = FileTokenStore::open(&path).unwrap();
        assert!(store.token().is_none());
    }
}
