//! Configuration for rbxlink.
//!
//! Values are layered: an optional `.env` file, an optional `rbxlink.toml`,
//! then `RBXLINK_*` environment variables. [`ConfigLoader::load`] resolves the
//! layers, applies guard rails and returns the warnings worth surfacing.

#![allow(missing_docs)]

pub mod error;
pub mod loader;
pub mod models;
pub mod sources;
pub mod validation;

pub use error::ConfigLoadError;
pub use loader::{ConfigLoad, ConfigLoader, ConfigLoaderOptions};
pub use models::{Config, ConfigMetadata, NotificationConfig, SessionConfig, StoreConfig};
pub use sources::{EnvConfig, FileConfig};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
