//! Reference implementations of the ports.

pub mod json_store;
pub mod log_sink;
pub mod memory_store;
pub mod session;
pub mod webhook;

pub use json_store::JsonFileUserStore;
pub use log_sink::{MemorySink, TracingSink};
pub use memory_store::MemoryUserStore;
pub use session::{FileSession, MemorySession};
pub use webhook::WebhookSink;
