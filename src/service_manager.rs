use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    Result,
    config::{Config, ConfigPaths},
    services::video::{
        VideoPlayerRegistry,
        persistence::{FileStateStore, MemoryStateStore, StateStore},
    },
};

/// Container for all application services
///
/// Services are created once during startup and shared by reference; there
/// is no hidden global. Call [`Services::init`] once before first use and
/// [`Services::teardown`] once at shutdown.
pub struct Services {
    /// Configuration the services were built from
    pub config: Config,
    /// Video player lifecycle registry
    pub video: VideoPlayerRegistry,
}

impl Services {
    /// Create all application services
    ///
    /// The registry persists to the state file from the configuration, or
    /// to memory when persistence is disabled.
    ///
    /// # Errors
    /// Returns error if the state directory cannot be determined
    pub fn new(config: Config) -> Result<Self> {
        let store = Self::state_store(&config)?;
        Ok(Self::with_store(config, store))
    }

    /// Create all application services on an explicit state store
    pub fn with_store(config: Config, store: Arc<dyn StateStore>) -> Self {
        let video = VideoPlayerRegistry::new(
            config.registry.clone(),
            store,
            config.persistence.debounce(),
        );

        Self { config, video }
    }

    /// Store selected by the persistence configuration
    ///
    /// # Errors
    /// Returns error if the state directory cannot be determined
    pub fn state_store(config: &Config) -> Result<Arc<dyn StateStore>> {
        if !config.persistence.enabled {
            return Ok(Arc::new(MemoryStateStore::new()));
        }

        let path = ConfigPaths::state_file(&config.persistence.state_file)?;
        Ok(Arc::new(FileStateStore::new(path)))
    }

    /// Restore persisted state and start background writers
    ///
    /// Must be called inside a Tokio runtime.
    #[instrument(skip(self))]
    pub fn init(&self) {
        info!("Initializing services");
        self.video.init();
    }

    /// Dispose every live player and flush persisted state
    #[instrument(skip(self))]
    pub async fn teardown(&self) {
        self.video.teardown().await;
        info!("Services shut down");
    }
}
