//! Traits for the collaborators the binding service drives.

pub mod notification;
pub mod session;
pub mod user_store;

pub use notification::{Notification, NotificationField, NotificationSink};
pub use session::SessionContext;
pub use user_store::{ClaimWrite, UserStore, find_holder};
