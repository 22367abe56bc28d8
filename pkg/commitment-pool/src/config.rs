use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Configuration for a [`CommitmentPool`]
///
/// Values come from an optional TOML file, overridden by `POOL_`-prefixed environment variables
/// (e.g. `POOL_SNAPSHOT_PATH`).
///
/// [`CommitmentPool`]: crate::CommitmentPool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Where the pool is saved and restored from, if anywhere
    pub snapshot_path: Option<PathBuf>,
}

impl PoolConfig {
    /// The prefix of environment variables read by [`PoolConfig`]
    pub const ENV_PREFIX: &'static str = "POOL_";

    /// Load the config from environment variables only
    pub fn from_env() -> Result<Self> {
        Ok(Figment::new()
            .merge(Env::prefixed(Self::ENV_PREFIX))
            .extract()?)
    }

    /// Load the config from a TOML file, then environment variables
    ///
    /// A missing file is treated as empty.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed(Self::ENV_PREFIX))
            .extract()?)
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_to_no_snapshot() {
        Jail::expect_with(|_| {
            let config = PoolConfig::load("missing.toml").unwrap();
            assert_eq!(config, PoolConfig::default());

            Ok(())
        });
    }

    #[test]
    fn reads_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file("pool.toml", r#"snapshot_path = "pool.bin""#)?;

            let config = PoolConfig::load("pool.toml").unwrap();
            assert_eq!(config.snapshot_path, Some(PathBuf::from("pool.bin")));

            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("pool.toml", r#"snapshot_path = "pool.bin""#)?;
            jail.set_env("POOL_SNAPSHOT_PATH", "/var/lib/pool.bin");

            let config = PoolConfig::load("pool.toml").unwrap();
            assert_eq!(config.snapshot_path, Some(PathBuf::from("/var/lib/pool.bin")));

            let config = PoolConfig::from_env().unwrap();
            assert_eq!(config.snapshot_path, Some(PathBuf::from("/var/lib/pool.bin")));

            Ok(())
        });
    }
}
