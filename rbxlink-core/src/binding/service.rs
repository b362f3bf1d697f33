use std::{any::type_name_of_val, fmt, sync::Arc};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::events::BindingEvent;
use super::roblox_username::RobloxUsername;
use super::views::{
    RegisterOutcome, UnregisterConfirmation, UnregisterOutcome, UserDetail,
};
use crate::error::{BindingError, ConflictKind, Result};
use crate::ports::{ClaimWrite, NotificationSink, SessionContext, UserStore};
use crate::users::{Capability, UserId, UserPatch, UserRecord};

/// Binding lifecycle: validation, uniqueness, register/unregister transitions
/// and role-based visibility.
///
/// Every operation takes the caller's [`SessionContext`] explicitly; the
/// acting user is whatever the session currently holds.
#[derive(Clone)]
pub struct BindingService {
    users: Arc<dyn UserStore>,
    notifier: Arc<dyn NotificationSink>,
}

impl fmt::Debug for BindingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingService")
            .field("users", &type_name_of_val(self.users.as_ref()))
            .field("notifier", &type_name_of_val(self.notifier.as_ref()))
            .finish()
    }
}

impl BindingService {
    pub fn new(
        users: Arc<dyn UserStore>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self { users, notifier }
    }

    /// Bind `raw_username` to the acting user.
    ///
    /// A user who already holds a binding gets
    /// [`RegisterOutcome::AlreadyBound`] and no store access happens.
    pub async fn register(
        &self,
        session: &dyn SessionContext,
        raw_username: &str,
    ) -> Result<RegisterOutcome> {
        let actor = Self::actor(session)?;
        let candidate = RobloxUsername::parse(raw_username)?;

        if let Some(current) = actor.binding() {
            debug!(
                user_id = %actor.id,
                current = %current,
                "register refused: account already bound"
            );
            return Ok(RegisterOutcome::AlreadyBound(
                UnregisterConfirmation::new(actor.id.clone(), current),
            ));
        }

        let users = self.users.list().await?;
        if let Some(holder) = users.iter().find(|u| u.holds(candidate.as_str())) {
            debug!(
                user_id = %actor.id,
                holder = %holder.id,
                roblox_username = %candidate,
                "register refused: roblox account taken"
            );
            return Err(BindingError::Conflict(ConflictKind::Taken));
        }

        let patch = UserPatch::bind(candidate.as_str(), Utc::now());
        let write = self
            .users
            .update_if_unclaimed(actor.id.clone(), candidate.as_str(), patch.clone())
            .await?;
        if let ClaimWrite::Claimed { holder } = write {
            warn!(
                user_id = %actor.id,
                holder = %holder,
                roblox_username = %candidate,
                "roblox account claimed concurrently"
            );
            return Err(BindingError::Conflict(ConflictKind::Taken));
        }

        let record = users
            .into_iter()
            .find(|u| u.id == actor.id)
            .unwrap_or(actor)
            .with_patch(&patch);
        session.persist(record.clone());

        info!(
            user_id = %record.id,
            roblox_username = %candidate,
            "roblox account registered"
        );

        self.dispatch(BindingEvent::Registered {
            user_id: record.id.clone(),
            username: record.username.clone(),
            roblox_username: candidate.into_string(),
            timestamp: Utc::now(),
        })
        .await;

        Ok(RegisterOutcome::Registered(record))
    }

    /// First phase of re-binding: ask to release the actor's current binding.
    ///
    /// `None` when the actor holds nothing to release.
    pub fn propose_unregister_then_retry(
        &self,
        session: &dyn SessionContext,
    ) -> Result<Option<UnregisterConfirmation>> {
        let actor = Self::actor(session)?;
        Ok(actor
            .binding()
            .map(|current| UnregisterConfirmation::new(actor.id.clone(), current)))
    }

    /// Second phase of re-binding, called only after the user agreed.
    pub async fn confirm_and_unregister(
        &self,
        session: &dyn SessionContext,
        confirmation: UnregisterConfirmation,
    ) -> Result<UnregisterOutcome> {
        let actor = Self::actor(session)?;
        if confirmation.user_id() != &actor.id {
            return Err(BindingError::Forbidden {
                actor: actor.id,
                action: "confirm a release issued for another account",
            });
        }

        let record = self.find(actor.id.clone()).await?;
        if let Some(current) = record.binding()
            && current != confirmation.roblox_username()
        {
            debug!(
                user_id = %actor.id,
                confirmed = %confirmation.roblox_username(),
                current = %current,
                "release confirmation is stale"
            );
            return Err(BindingError::Conflict(ConflictKind::Stale));
        }

        self.release(session, &actor, record).await
    }

    /// Clear the binding on `target`.
    ///
    /// Users may always release their own binding; releasing anyone else's
    /// needs [`Capability::ReleaseAnyBinding`].
    pub async fn unregister(
        &self,
        session: &dyn SessionContext,
        target: UserId,
    ) -> Result<UnregisterOutcome> {
        let actor = Self::actor(session)?;
        if actor.id != target {
            Self::require(
                &actor,
                Capability::ReleaseAnyBinding,
                "release another account's binding",
            )?;
        }

        let record = self.find(target).await?;
        self.release(session, &actor, record).await
    }

    /// Bound accounts the actor may see, in store order.
    pub async fn list_visible(
        &self,
        session: &dyn SessionContext,
    ) -> Result<Vec<UserRecord>> {
        let actor = Self::actor(session)?;
        let fleet_wide = actor.role.can(Capability::ViewAllBindings);

        let users = self.users.list().await?;
        Ok(users
            .into_iter()
            .filter(|user| user.is_bound())
            .filter(|user| fleet_wide || user.id == actor.id)
            .collect())
    }

    /// Detail view of `target`.
    ///
    /// Fails with [`BindingError::NotFound`] when no stored account has that
    /// id; viewing anyone but the actor needs [`Capability::ViewAllBindings`].
    pub async fn describe(
        &self,
        session: &dyn SessionContext,
        target: UserId,
    ) -> Result<UserDetail> {
        let actor = Self::actor(session)?;
        if actor.id != target {
            Self::require(
                &actor,
                Capability::ViewAllBindings,
                "view another account's details",
            )?;
        }

        let record = self.find(target).await?;
        Ok(UserDetail::from(&record))
    }

    async fn release(
        &self,
        session: &dyn SessionContext,
        actor: &UserRecord,
        record: UserRecord,
    ) -> Result<UnregisterOutcome> {
        let self_initiated = actor.id == record.id;

        let Some(released) = record.binding().map(str::to_string) else {
            debug!(user_id = %record.id, "unregister skipped: not bound");
            // The cached copy still claims a binding the store no longer has.
            if self_initiated && actor.is_bound() {
                session.persist(record.clone());
            }
            return Ok(UnregisterOutcome::AlreadyUnbound(record));
        };

        let patch = UserPatch::unbind(Utc::now());
        self.users.update(record.id.clone(), patch.clone()).await?;
        let record = record.with_patch(&patch);

        if self_initiated {
            session.persist(record.clone());
        }

        info!(
            user_id = %record.id,
            actor_id = %actor.id,
            roblox_username = %released,
            self_initiated,
            "roblox account released"
        );

        let timestamp = Utc::now();
        let event = if self_initiated {
            BindingEvent::SelfUnregistered {
                user_id: record.id.clone(),
                username: record.username.clone(),
                roblox_username: released.clone(),
                timestamp,
            }
        } else {
            BindingEvent::AdminUnregistered {
                admin_id: actor.id.clone(),
                admin_username: actor.username.clone(),
                user_id: record.id.clone(),
                username: record.username.clone(),
                roblox_username: released.clone(),
                timestamp,
            }
        };
        self.dispatch(event).await;

        Ok(UnregisterOutcome::Unregistered { record, released })
    }

    async fn find(&self, id: UserId) -> Result<UserRecord> {
        self.users
            .list()
            .await?
            .into_iter()
            .find(|user| user.id == id)
            .ok_or(BindingError::NotFound(id))
    }

    /// Delivery failures are logged and dropped; the transition is already
    /// committed.
    async fn dispatch(&self, event: BindingEvent) {
        let notification = event.to_notification();
        if let Err(err) = self.notifier.send(&notification).await {
            warn!(
                event = event.event_type(),
                user_id = %event.user_id(),
                error = %err,
                "audit notification not delivered"
            );
        }
    }

    fn actor(session: &dyn SessionContext) -> Result<UserRecord> {
        session.current().ok_or(BindingError::NoSession)
    }

    fn require(
        actor: &UserRecord,
        capability: Capability,
        action: &'static str,
    ) -> Result<()> {
        if actor.role.can(capability) {
            Ok(())
        } else {
            debug!(
                user_id = %actor.id,
                capability = capability.as_str(),
                "capability check failed"
            );
            Err(BindingError::Forbidden {
                actor: actor.id.clone(),
                action,
            })
        }
    }
}
