use crate::users::UserRecord;

/// Holder of the acting user's cached record for one interactive session.
///
/// The cached record is a copy; the store stays authoritative. Both calls are
/// synchronous so a successful store write for the acting user can always be
/// mirrored before the operation returns.
pub trait SessionContext: Send + Sync {
    /// The acting user, or `None` when nobody is signed in.
    fn current(&self) -> Option<UserRecord>;

    /// Overwrite the cached copy of the acting user.
    fn persist(&self, user: UserRecord);
}
