//! In-memory user store.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::ports::{ClaimWrite, UserStore, find_holder};
use crate::users::{UserId, UserPatch, UserRecord};

/// Keeps records in insertion order behind a single lock, so the conditional
/// write checks and applies atomically.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users<I>(users: I) -> Self
    where
        I: IntoIterator<Item = UserRecord>,
    {
        Self {
            users: Mutex::new(users.into_iter().collect()),
        }
    }

    pub async fn insert(&self, user: UserRecord) {
        self.users.lock().await.push(user);
    }

    pub async fn get(&self, id: &UserId) -> Option<UserRecord> {
        self.users
            .lock()
            .await
            .iter()
            .find(|user| &user.id == id)
            .cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self.users.lock().await.clone())
    }

    async fn update(&self, id: UserId, patch: UserPatch) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or(StoreError::MissingRecord(id))?;
        user.apply(&patch);
        Ok(())
    }

    async fn update_if_unclaimed(
        &self,
        id: UserId,
        value: &str,
        patch: UserPatch,
    ) -> Result<ClaimWrite, StoreError> {
        let mut users = self.users.lock().await;
        if let Some(holder) = find_holder(&users, &id, value) {
            return Ok(ClaimWrite::Claimed { holder });
        }
        let user = users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or(StoreError::MissingRecord(id))?;
        user.apply(&patch);
        Ok(ClaimWrite::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::UserRole;
    use chrono::Utc;

    #[tokio::test]
    async fn conditional_write_refuses_values_held_elsewhere() {
        let holder = UserRecord::new("jun", "jun@example.com", UserRole::User)
            .with_patch(&UserPatch::bind("alpha", Utc::now()));
        let claimant = UserRecord::new("mina", "mina@example.com", UserRole::User);
        let store = MemoryUserStore::with_users([holder.clone(), claimant.clone()]);

        let write = store
            .update_if_unclaimed(
                claimant.id.clone(),
                "alpha",
                UserPatch::bind("alpha", Utc::now()),
            )
            .await
            .unwrap();

        assert_eq!(write, ClaimWrite::Claimed { holder: holder.id });
        assert!(!store.get(&claimant.id).await.unwrap().is_bound());
    }

    #[tokio::test]
    async fn update_of_unknown_record_fails() {
        let store = MemoryUserStore::new();
        let id = UserId::new();

        let err = store
            .update(id.clone(), UserPatch::unbind(Utc::now()))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::MissingRecord(missing) if missing == id));
    }

    #[tokio::test]
    async fn listing_keeps_insertion_order() {
        let store = MemoryUserStore::new();
        let names = ["c", "a", "b"];
        for name in names {
            store
                .insert(UserRecord::new(name, "", UserRole::User))
                .await;
        }

        let listed: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|user| user.username)
            .collect();
        assert_eq!(listed, names);
    }
}
