//! CLI configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shoes_cart::config::CartConfig;

/// File names searched for, in order.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["shoes.toml", ".shoes.toml", "shoes.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Cart settings.
    #[serde(flatten)]
    pub cart: CartConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }
}

/// Generate a default shoes.toml config file.
pub fn generate_default_config() -> String {
    r#"# Shoes cart configuration

# Currency used to price the cart (BRL, USD, EUR)
currency = "BRL"

[api]
# Storefront serving /products and /stock; SHOES_API_URL overrides it
base_url = "http://localhost:3333"
timeout_secs = 10

[storage]
path = ".shoes/storage.json"
key = "@RocketShoes:cart"

[messages]
out_of_stock = "Quantidade solicitada fora de estoque"
add_failed = "Erro na adição do produto"
remove_failed = "Erro na remoção do produto"
update_failed = "Erro na alteração de quantidade do produto"
"#
    .to_string()
}
