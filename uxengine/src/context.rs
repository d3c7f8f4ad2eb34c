use blanket::blanket;
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;

use directories::BaseDirs;

use crate::config::Config;
use crate::utils::ensure_dir_exists;
use crate::Error;

pub const HOME_ENV: &'static str = "UXENGINE_HOME";
pub const CONFIG_ENV: &'static str = "UXENGINE_CONFIG";
pub const CONFIG_FILE_NAME: &'static str = "uxengine.toml";
pub const STATE_FILE_NAME: &'static str = "consent_state.json";

/// Context is a trait for an object that can help standardize file locations
/// and lookup env vars.
///
/// Most methods on this trait have a default implementation that is perfectly
/// safe to leave unchanged.
#[blanket(derive(Ref, Box))]
pub trait Context: Send + Sync {
    fn maybe_get_env(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }

    /// The directory holding the configuration, consent state and logs.
    ///
    /// Taken from `UXENGINE_HOME` if set, otherwise the user's local data
    /// directory.
    fn get_home_dir(&self) -> crate::Result<PathBuf> {
        if let Some(home) = self.maybe_get_env(HOME_ENV) {
            return Ok(PathBuf::from(home));
        }
        let bd = BaseDirs::new().ok_or(Error::NoBaseDirs)?;
        Ok(bd.data_local_dir().join("uxengine"))
    }

    fn get_home_dir_child(&self, child: &str) -> crate::Result<PathBuf> {
        self.get_home_dir().map(|x| x.join(child))
    }

    fn get_config_file(&self) -> crate::Result<PathBuf> {
        match self.maybe_get_env(CONFIG_ENV) {
            Some(v) => Ok(PathBuf::from(v)),
            None => self.get_home_dir_child(CONFIG_FILE_NAME),
        }
    }

    fn get_config<'a>(&'a self) -> crate::Result<Option<&'a Config>>;

    /// Location of the persisted consent state
    fn get_state_file(&self) -> crate::Result<PathBuf> {
        if let Some(cfg) = self.get_config()? {
            if let Some(path) = cfg.get_store_path() {
                return Ok(path.to_path_buf());
            }
        }
        self.get_home_dir_child(STATE_FILE_NAME)
    }

    fn get_log_dir(&self) -> crate::Result<PathBuf> {
        let dir = self.get_home_dir_child("log")?;
        ensure_dir_exists(&dir)?;
        Ok(dir)
    }
}

pub struct DefaultContext {
    config: OnceCell<Option<Config>>,
}

impl Clone for DefaultContext {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
        }
    }
}

impl DefaultContext {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for DefaultContext {
    fn default() -> Self {
        Self {
            config: OnceCell::new(),
        }
    }
}

impl Context for DefaultContext {
    fn get_config<'a>(&'a self) -> crate::Result<Option<&'a Config>> {
        let cfg = self
            .config
            .get_or_try_init(|| -> crate::Result<Option<Config>> {
                let path = self.get_config_file()?;
                if !path.exists() {
                    log::debug!("no config file at {:?}", path);
                    Ok(None)
                } else {
                    Ok(Some(Config::parse(&path)?))
                }
            })?;
        Ok(cfg.as_ref())
    }
}
