//! Account records and the role model used for capability checks.

mod record;
mod role;

pub use record::{EmptyUserId, UserId, UserPatch, UserRecord};
pub use role::{Capability, UserRole};
