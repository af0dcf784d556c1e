//! Shared types, error model, and configuration for the land-bank pipeline.
//!
//! This crate is the foundation depended on by all other landbank crates.
//! It provides:
//! - [`LandbankError`] — the unified error type
//! - Domain types ([`NormalizedAddress`], [`EnrichedAddress`], [`MeetingRecord`])
//! - Configuration ([`AppConfig`], config loading, key resolution)
//! - Run-level cancellation ([`CancelToken`], [`CancelHandle`])

pub mod cancel;
pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use cancel::{CancelHandle, CancelToken, cancel_pair};
pub use config::{
    AgendaConfig, AisSettings, AppConfig, OutputConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, resolve_gatekeeper_key,
};
pub use error::{LandbankError, Result};
pub use types::{EnrichedAddress, MeetingRecord, NormalizedAddress};
