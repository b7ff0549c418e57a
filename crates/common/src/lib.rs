//! Common utilities and shared types for earthie-hub.
//!
//! This crate provides the foundational components used across all
//! earthie-hub crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//!
//! # Example
//!
//! ```no_run
//! use earthie_common::{AppResult, Config};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     println!("Storage bucket: {}", config.storage.bucket);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;

pub use config::{
    AuthConfig, BackendConfig, Config, MAPBOX_TOKEN_ENV, MapConfig, MapboxAccess, StorageConfig,
};
pub use error::{AppError, AppResult};
