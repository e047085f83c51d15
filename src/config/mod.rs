//! Configuration schema definitions and loading.
//!
//! Defines the tunables of the video player registry and its persistence
//! layer. All configurations are serializable to/from TOML and every field
//! has a default, so an empty or missing file is valid.

mod loading;
mod paths;
mod persistence;
mod registry;

pub use paths::ConfigPaths;
pub use persistence::PersistenceConfig;
pub use registry::{DisposalPresetConfig, DisposalPresets, RegistryConfig};

use serde::{Deserialize, Serialize};

/// Main configuration structure for reelguard.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Player registry timings, thresholds and disposal presets.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Durable snapshot settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

#[cfg(test)]
mod tests;
