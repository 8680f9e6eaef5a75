use serde::Deserialize;

use crate::buffer::replacer::PolicyKind;
use crate::error::{Error, Result};
use crate::storage::StoreType;

#[derive(Debug, PartialEq, Deserialize)]
pub struct Config {
    /// backing file of the page store.
    pub db_path: String,
    pub store_type: StoreType,
    /// number of frames in the buffer pool.
    pub pool_size: usize,
    pub policy: PolicyKind,
    /// seed of the random replacement policy.
    pub seed: u64,
    pub log_level: String,
}

impl Config {
    /// Load defaults, then `file` if given, then `BUFMGR_*` environment
    /// variables.
    pub fn new(file: &str) -> Result<Config> {
        Config::load(file, config::Environment::with_prefix("BUFMGR"))
    }

    fn load(file: &str, env: config::Environment) -> Result<Config> {
        let mut cfg = config::Config::builder()
            .set_default("db_path", "data.dbf")?
            .set_default("store_type", "disk")?
            .set_default("pool_size", 1024)?
            .set_default("policy", "lru")?
            .set_default("seed", 2023)?
            .set_default("log_level", "info")?;
        if !file.is_empty() {
            cfg = cfg.add_source(config::File::with_name(file))
        }
        cfg = cfg.add_source(env);
        let cfg: Config = cfg.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(Error::Config("pool_size must be larger than zero".to_string()));
        }
        Ok(())
    }
}
