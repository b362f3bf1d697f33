//! Session holders for the acting user.

use std::io::ErrorKind;
use std::path::PathBuf;

use parking_lot::RwLock;
use tracing::error;

use crate::error::SessionError;
use crate::ports::SessionContext;
use crate::users::UserRecord;

/// Session that lives only as long as the value.
#[derive(Debug, Default)]
pub struct MemorySession {
    current: RwLock<Option<UserRecord>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user: UserRecord) -> Self {
        Self {
            current: RwLock::new(Some(user)),
        }
    }

    pub fn sign_out(&self) {
        *self.current.write() = None;
    }
}

impl SessionContext for MemorySession {
    fn current(&self) -> Option<UserRecord> {
        self.current.read().clone()
    }

    fn persist(&self, user: UserRecord) {
        *self.current.write() = Some(user);
    }
}

/// Session cached in a JSON file so it survives restarts.
///
/// [`SessionContext::persist`] always updates the in-memory copy first; a
/// failed file write is logged and the file is rewritten on the next persist.
#[derive(Debug)]
pub struct FileSession {
    path: PathBuf,
    current: RwLock<Option<UserRecord>>,
}

impl FileSession {
    /// Load the session stored at `path`; a missing file means signed out.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let current = match std::fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => None,
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path,
            current: RwLock::new(current),
        })
    }

    pub fn sign_in(&self, user: UserRecord) -> Result<(), SessionError> {
        self.save(&user)?;
        *self.current.write() = Some(user);
        Ok(())
    }

    pub fn sign_out(&self) -> Result<(), SessionError> {
        *self.current.write() = None;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, user: &UserRecord) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(user)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }
}

impl SessionContext for FileSession {
    fn current(&self) -> Option<UserRecord> {
        self.current.read().clone()
    }

    fn persist(&self, user: UserRecord) {
        if let Err(err) = self.save(&user) {
            error!(
                path = %self.path.display(),
                user_id = %user.id,
                error = %err,
                "failed to write session file"
            );
        }
        *self.current.write() = Some(user);
    }
}
