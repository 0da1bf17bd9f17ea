//! Core types, errors, and utilities for the `war` file watcher.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - [`Config`] and [`WatchConfig`] - the immutable startup configuration
//! - [`CommandChain`] and [`CommandSpec`] - the ordered commands run on a trigger
//! - [`ConfigError`] - errors raised while assembling or validating configuration
//! - [`WallClock`] - the fixed-width `HH:MM:SS.ffff` timestamp used for output
//! - An `FxHashMap` alias for path-keyed tables
//!
//! # Crate Dependencies
//!
//! ```text
//! war-cli ──► war-watcher ──► war-core
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod hash;

pub use clock::WallClock;
pub use command::{CommandChain, CommandSpec};
pub use config::{Config, DEFAULT_DEBOUNCE_MS, WatchConfig};
pub use error::ConfigError;
pub use hash::{FxHashMap, fx_hash_map};
