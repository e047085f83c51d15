//! reelguard - Lifecycle registry for feed video players.
//!
//! Tracks every video player instance mounted in a scrolling feed and keeps
//! them in line with the navigation state:
//!
//! - Single-tab playback: leaving the video tab pauses everything
//! - Safe disposal with timeouts, retries and a detached forced fallback
//! - Bounded recovery of stuck players
//! - Stale player reaping
//! - Failure metrics and a versioned snapshot persisted across restarts
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use reelguard::{config::Config, service_manager::Services, tracing_config};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! tracing_config::init()?;
//! let services = Services::new(Config::load()?)?;
//! services.init();
//!
//! services.video.set_current_tab("Videos");
//! // register handles as feed items mount...
//!
//! services.teardown().await;
//! # Ok(())
//! # }
//! ```

/// Configuration schema definitions and loading.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Command-line interface for inspecting persisted player state.
pub mod cli;

/// Services: the video player registry and shared building blocks.
pub mod services;

/// Service instance container with explicit init and teardown.
pub mod service_manager;

/// Logging setup.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{ReelguardError, Result};
