// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # QuotaBar Store
//!
//! Persistent state for the QuotaBar application.
//!
//! This crate provides:
//!
//! - **Config**: JSON configuration with defaults and validation
//! - **CachedUsage**: The last successful usage extraction
//! - **AlertTracker**: Threshold crossing detection per usage bar
//! - **Persistence**: Atomic, owner-only JSON file helpers
//!
//! ## Usage
//!
//! ```ignore
//! use quotabar_store::{AlertTracker, CachedUsage, Config};
//!
//! let config = Config::load().await?;
//! let mut alerts = AlertTracker::from_config(&config.general);
//!
//! for alert in alerts.check_all(&result) {
//!     println!("{}", alert.message());
//! }
//! CachedUsage::new(result).save(&default_cache_path()).await?;
//! ```

pub mod alerts;
pub mod cache;
pub mod config;
pub mod error;
pub mod persistence;

pub use alerts::{Alert, AlertLevel, AlertTracker};
pub use cache::CachedUsage;
pub use config::{BillingConfig, Config, GeneralConfig, ScrapeConfig};
pub use error::StoreError;
pub use persistence::{
    default_cache_dir, default_cache_path, default_config_dir, default_config_path, load_json,
    load_json_or_default, save_json,
};
