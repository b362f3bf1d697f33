//! User store backed by a single JSON document on disk.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreError;
use crate::ports::{ClaimWrite, UserStore, find_holder};
use crate::users::{UserId, UserPatch, UserRecord};

/// One stored user object, kept verbatim so keys this crate does not model
/// survive every write.
type Document = Map<String, Value>;

/// Stores every record as one JSON array.
///
/// Records are kept as raw objects; an update rewrites only the fields its
/// [`UserPatch`] names on the target object. Writes replace the file
/// atomically (write to a sibling, then rename) and are serialized through an
/// in-process lock, which also makes [`UserStore::update_if_unclaimed`]
/// atomic for all sessions sharing this instance. Separate processes editing
/// the same file are not coordinated.
#[derive(Debug)]
pub struct JsonFileUserStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileUserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Append a record, creating the document if needed.
    pub async fn insert(&self, user: UserRecord) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut documents = self.read().await?;
        let Value::Object(document) = serde_json::to_value(&user)? else {
            return Err(StoreError::Unavailable(format!(
                "user {} did not serialize to an object",
                user.id
            )));
        };
        documents.push(document);
        self.write(&documents).await
    }

    async fn read(&self) -> Result<Vec<Document>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "user document missing; treating as empty");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write(&self, documents: &[Document]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(documents)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }

    fn decode(documents: &[Document]) -> Result<Vec<UserRecord>, StoreError> {
        documents
            .iter()
            .map(|document| {
                serde_json::from_value(Value::Object(document.clone()))
                    .map_err(StoreError::from)
            })
            .collect()
    }

    /// Merge `patch` into the document whose decoded record is `id`.
    fn merge(
        documents: &mut [Document],
        users: &[UserRecord],
        id: UserId,
        patch: &UserPatch,
    ) -> Result<(), StoreError> {
        let index = users
            .iter()
            .position(|user| user.id == id)
            .ok_or(StoreError::MissingRecord(id))?;
        patch.merge_into(&mut documents[index]);
        Ok(())
    }
}

#[async_trait]
impl UserStore for JsonFileUserStore {
    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let _guard = self.lock.lock().await;
        Self::decode(&self.read().await?)
    }

    async fn update(&self, id: UserId, patch: UserPatch) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut documents = self.read().await?;
        let users = Self::decode(&documents)?;
        Self::merge(&mut documents, &users, id, &patch)?;
        self.write(&documents).await
    }

    async fn update_if_unclaimed(
        &self,
        id: UserId,
        value: &str,
        patch: UserPatch,
    ) -> Result<ClaimWrite, StoreError> {
        let _guard = self.lock.lock().await;
        let mut documents = self.read().await?;
        let users = Self::decode(&documents)?;
        if let Some(holder) = find_holder(&users, &id, value) {
            return Ok(ClaimWrite::Claimed { holder });
        }
        Self::merge(&mut documents, &users, id, &patch)?;
        self.write(&documents).await?;
        Ok(ClaimWrite::Applied)
    }
}
