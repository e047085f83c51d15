//! Lifecycle registry of the video players shown in the feed.
//!
//! Tracks every mounted player handle, enforces single-tab playback,
//! disposes handles safely under failure, recovers stuck players with a
//! bounded budget and persists per-slot intent and health across restarts.

/// Strategy-driven teardown of player handles
pub mod disposal;
/// Player error types and classification
pub mod error;
/// Registry lifecycle notifications
pub mod events;
/// Durable per-slot metadata
pub mod metadata;
/// Process-wide failure counters
pub mod metrics;
/// Versioned persisted snapshot and its stores
pub mod persistence;
/// Capability-checked player handle contract
pub mod playable;
/// Detached task supervision
pub mod supervisor;
/// Player identifiers, states and capabilities
pub mod types;

mod reaper;
mod recovery;
mod registry;
mod tabs;

pub use disposal::{DisposalConfig, DisposalOutcome, DisposalStrategy};
pub use error::*;
pub use events::RegistryEvent;
pub use metadata::*;
pub use metrics::ErrorMetrics;
pub use playable::Playable;
pub use registry::{PlayerReference, VideoPlayerRegistry};
pub use supervisor::{SupervisorStats, TaskSupervisor};
pub use types::*;

#[cfg(test)]
mod tests;
