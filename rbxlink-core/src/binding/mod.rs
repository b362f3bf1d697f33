//! Roblox account binding
//!
//! A binding ties one internal account to one Roblox username. No two
//! accounts may hold the same username at once; a released username is free
//! for anyone, including its previous holder.
//!
//! ```text
//!  Unbound --register(valid, unique)--> Bound
//!  Bound   --unregister--> Unbound
//!  Bound   --register--> Bound (confirmation offered, nothing written)
//!  Unbound --unregister--> Unbound (nothing written)
//! ```

pub mod events;
mod roblox_username;
pub mod service;
pub mod views;

pub use events::BindingEvent;
pub use roblox_username::{MAX_LEN, MIN_LEN, RobloxUsername, RobloxUsernameError};
pub use service::BindingService;
pub use views::{
    BindingSummary, RegisterOutcome, UnregisterConfirmation, UnregisterOutcome,
    UserDetail,
};
