//! CLI command implementations.

pub mod cart;
pub mod catalog;
pub mod config;

use clap::{Args, Subcommand};
use shoes_cart::ProductId;

/// Arguments for commands acting on one product.
#[derive(Args)]
pub struct ProductArgs {
    /// Product ID.
    pub id: ProductId,
}

/// Arguments for the update command.
#[derive(Args)]
pub struct UpdateArgs {
    /// Product ID.
    pub id: ProductId,

    /// Quantity delta (may be negative).
    #[arg(allow_negative_numbers = true)]
    pub delta: i64,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}
