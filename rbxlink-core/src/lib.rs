//! # rbxlink Core
//!
//! Binds internal accounts to Roblox usernames and keeps every Roblox
//! username held by at most one account.
//!
//! ## Overview
//!
//! - [`binding`]: validation, the register/unregister lifecycle, visibility
//!   and detail projections ([`BindingService`])
//! - [`users`]: account records, partial updates, roles and capabilities
//! - [`ports`]: the user store, session and notification traits the service
//!   drives
//! - [`infra`]: in-memory and file-backed stores and sessions, plus webhook
//!   and log notification sinks
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use rbxlink_core::{
//!     BindingService, RegisterOutcome, UserRecord, UserRole,
//!     infra::{MemorySession, MemoryUserStore, TracingSink},
//! };
//!
//! async fn bind() -> Result<(), Box<dyn std::error::Error>> {
//!     let mina = UserRecord::new("mina", "mina@example.com", UserRole::User);
//!     let store = Arc::new(MemoryUserStore::with_users([mina.clone()]));
//!     let service = BindingService::new(store, Arc::new(TracingSink));
//!     let session = MemorySession::signed_in(mina);
//!
//!     if let RegisterOutcome::AlreadyBound(confirmation) =
//!         service.register(&session, "  BuilderMan ").await?
//!     {
//!         println!("already bound to {}", confirmation.roblox_username());
//!     }
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

pub mod binding;
pub mod error;
pub mod infra;
pub mod ports;
pub mod users;

pub use binding::{
    BindingEvent, BindingService, BindingSummary, RegisterOutcome, RobloxUsername,
    RobloxUsernameError, UnregisterConfirmation, UnregisterOutcome, UserDetail,
};
pub use error::{BindingError, ConflictKind, NotifyError, SessionError, StoreError};
pub use ports::{
    ClaimWrite, Notification, NotificationField, NotificationSink, SessionContext,
    UserStore,
};
pub use users::{Capability, EmptyUserId, UserId, UserPatch, UserRecord, UserRole};
