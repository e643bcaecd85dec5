//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use shoes_cache::Cache;
use shoes_cart::api::HttpStoreApi;
use shoes_cart::config::CartConfig;
use shoes_cart::{CartManager, CartService};

use crate::config::{CliConfig, CONFIG_FILE_NAMES};
use crate::output::{ConsoleNotifier, Output};

/// Execution context for CLI commands.
pub struct Context {
    /// Effective cart configuration.
    pub config: CartConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => (CliConfig::load(path)?, Some(PathBuf::from(path))),
            // Try to find config in current directory or parent directories
            None => match Self::find_config(&cwd) {
                Some(path) => (CliConfig::load(&path)?, Some(path)),
                None => (CliConfig::default(), None),
            },
        };

        if let Some(path) = &config_path {
            output.debug(&format!("Using config: {}", path.display()));
        }

        Ok(Self {
            config: config.cart.with_env_overrides(),
            config_path,
            output,
            cwd,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<PathBuf> {
        start.ancestors().find_map(|dir| {
            CONFIG_FILE_NAMES
                .iter()
                .map(|name| dir.join(name))
                .find(|path| path.is_file())
        })
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// Open the persisted store.
    pub fn open_cache(&self) -> Result<Cache> {
        let path = self.resolve_path(&self.config.storage.path);
        self.output.debug(&format!("Storage: {}", path.display()));
        Cache::open_file(&path).with_context(|| format!("Failed to open storage: {}", path.display()))
    }

    /// Storefront API client.
    pub fn store_api(&self) -> HttpStoreApi {
        self.output.debug(&format!("API: {}", self.config.api.base_url));
        HttpStoreApi::from_config(&self.config.api)
    }

    /// Load the cart manager, printing notices to the terminal.
    pub fn manager(&self) -> Result<CartManager> {
        let manager = CartManager::builder(Arc::new(self.store_api()), self.open_cache()?)
            .with_config(&self.config)
            .with_notifier(Arc::new(ConsoleNotifier::new(self.output.clone())))
            .load()?;
        Ok(manager)
    }

    /// Start the cart service.
    pub fn service(&self) -> Result<CartService> {
        Ok(CartService::spawn(self.manager()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_searches_upward() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".shoes.toml"), "").unwrap();

        let found = Context::find_config(&nested).unwrap();
        assert_eq!(found, dir.path().join(".shoes.toml"));
    }

    #[test]
    fn test_find_config_prefers_first_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("shoes.json"), "{}").unwrap();
        std::fs::write(dir.path().join("shoes.toml"), "").unwrap();

        let found = Context::find_config(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("shoes.toml"));
    }
}
