//! Runtime configuration shared between the orchestrator and the adapters.
//!
//! [`ConfigStore`] hands out snapshots. When environment overrides are
//! enabled they are re-applied on every snapshot, so a credential exported
//! after startup is seen by the next publish.

use parking_lot::RwLock;

use super::{apply_env_overrides, Config};

#[derive(Debug)]
pub struct ConfigStore {
    config: RwLock<Config>,
    env_overrides: bool,
}

impl ConfigStore {
    /// Build a store that re-reads environment overrides on every snapshot.
    pub fn new(config: Config) -> Self {
        Self {
            config: RwLock::new(config),
            env_overrides: true,
        }
    }

    /// Build a store whose snapshots never consult the environment.
    pub fn fixed(config: Config) -> Self {
        Self {
            config: RwLock::new(config),
            env_overrides: false,
        }
    }

    /// Current configuration with overrides applied.
    pub fn snapshot(&self) -> Config {
        let mut config = self.config.read().clone();
        if self.env_overrides {
            apply_env_overrides(&mut config);
        }
        config
    }

    /// Edit the stored configuration in place.
    pub fn update<F: FnOnce(&mut Config)>(&self, f: F) {
        f(&mut self.config.write());
    }
}
