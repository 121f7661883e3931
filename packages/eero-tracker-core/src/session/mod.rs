//! Session lifecycle: login, verification, refresh, and token persistence.

mod manager;
mod store;

pub use manager::SessionManager;
pub use store::{FileSessionStore, MemorySessionStore, SessionStorage};
