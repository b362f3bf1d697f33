use async_trait::async_trait;

use crate::error::StoreError;
use crate::users::{UserId, UserPatch, UserRecord};

/// Outcome of a conditional binding write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimWrite {
    /// The patch was merged into the record.
    Applied,
    /// Another record already holds the value; nothing was written.
    Claimed { holder: UserId },
}

/// Durable collection of user records.
///
/// Implementations must be thread-safe (`Send + Sync`); several sessions may
/// share one store.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Every record, in the store's natural listing order.
    async fn list(&self) -> Result<Vec<UserRecord>, StoreError>;

    /// Merge `patch` into the record `id`. Unknown ids fail with
    /// [`StoreError::MissingRecord`].
    async fn update(&self, id: UserId, patch: UserPatch) -> Result<(), StoreError>;

    /// Merge `patch` into `id` only if no other record currently holds
    /// `value`.
    ///
    /// The default implementation lists and then updates, which leaves a
    /// window for a concurrent writer to claim the same value in between.
    /// Stores that can check and write under one lock should override it.
    async fn update_if_unclaimed(
        &self,
        id: UserId,
        value: &str,
        patch: UserPatch,
    ) -> Result<ClaimWrite, StoreError> {
        let users = self.list().await?;
        if let Some(holder) = find_holder(&users, &id, value) {
            return Ok(ClaimWrite::Claimed { holder });
        }
        self.update(id, patch).await?;
        Ok(ClaimWrite::Applied)
    }
}

/// First record other than `claimant` holding `value`.
pub fn find_holder(
    users: &[UserRecord],
    claimant: &UserId,
    value: &str,
) -> Option<UserId> {
    users
        .iter()
        .find(|user| &user.id != claimant && user.holds(value))
        .map(|user| user.id.clone())
}
