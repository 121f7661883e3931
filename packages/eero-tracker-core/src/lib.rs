//! eero tracker core library
//!
//! This crate provides everything needed to report which devices are
//! currently connected to a set of eero routers:
//! - Session lifecycle (login, verification, cookie-based refresh)
//! - Device polling (per-network device lists, filtering, name mapping)
//! - Configuration and file-based session persistence
//!
//! All I/O is synchronous and single-threaded: the tracker issues a handful
//! of blocking HTTP calls per poll and is throttled to one poll every 25
//! seconds at most.
//!
//! # Example
//!
//! ```no_run
//! use eero_tracker_core::{
//!     ApiClient, DeviceTracker, FileSessionStore, SessionManager,
//! };
//!
//! fn main() -> Result<(), eero_tracker_core::ApiError> {
//!     let config = eero_tracker_core::load_config().expect("config");
//!     let session = SessionManager::new(
//!         FileSessionStore::new(&config.session_file),
//!         ApiClient::new(&config.api_url),
//!     );
//!     let mut tracker = DeviceTracker::new(session, config.filters());
//!
//!     let result = tracker.poll()?;
//!     println!("{} devices present", result.macs.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod tracker;

// Re-export commonly used types
pub use api::{ApiClient, Transport, DEFAULT_API_URL};
pub use config::{
    config_file_path, config_file_path_string, generate_example_config, load_config,
    ConfigSource, TrackerConfig, MINIMUM_SCAN_INTERVAL_SECS,
};
pub use error::{ApiError, ConfigError, PersistenceError};
pub use session::{FileSessionStore, MemorySessionStore, SessionManager, SessionStorage};
pub use tracker::{
    network_id_from_url, Device, DeviceTracker, EeroApi, ScanFilters, ScanResult,
    ACCOUNT_CACHE_EXPIRY,
};
