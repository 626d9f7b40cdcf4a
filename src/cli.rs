// ABOUTME: Command-line argument definitions for the stockroom binary.
// ABOUTME: Global flags feed configuration; each subcommand maps to one store operation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::ConfigOverrides;

#[derive(Debug, Parser)]
#[command(
    name = "stockroom",
    version,
    about = "A product inventory management tool",
    long_about = "Stockroom manages a product inventory. It supports CRUD operations, \
                  bulk import/export, and in-memory or JSON file storage."
)]
pub struct Cli {
    /// Config file (default is $HOME/.stockroom.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage type (memory|json)
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// File path for the json store
    #[arg(long = "db-file", global = true)]
    pub db_file: Option<PathBuf>,

    /// Log level (debug|info|warn|error)
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Abort the command after this many seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            store: self.store.clone(),
            db_file: self.db_file.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new product
    Create(CreateArgs),

    /// Get a product by ID
    Get { id: String },

    /// List products
    List(ListArgs),

    /// Update a product
    Update(UpdateArgs),

    /// Delete a product
    Delete {
        id: String,

        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },

    /// Import products from a JSON file
    Import {
        /// JSON file to import
        #[arg(long)]
        file: PathBuf,
    },

    /// Export products to a JSON file
    Export {
        /// File to export to
        #[arg(long, default_value = "export.json")]
        file: PathBuf,

        /// Filter by category
        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Product name
    #[arg(long)]
    pub name: String,

    /// Product price
    #[arg(long, allow_negative_numbers = true)]
    pub price: f64,

    /// Product quantity
    #[arg(long, allow_negative_numbers = true)]
    pub quantity: i64,

    /// Product category
    #[arg(long, default_value = "")]
    pub category: String,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    pub id: String,

    /// New product name
    #[arg(long)]
    pub name: Option<String>,

    /// New product price
    #[arg(long, allow_negative_numbers = true)]
    pub price: Option<f64>,

    /// New product quantity
    #[arg(long, allow_negative_numbers = true)]
    pub quantity: Option<i64>,

    /// New product category
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Filter by category
    #[arg(long)]
    pub category: Option<String>,

    /// Minimum price
    #[arg(long = "min-price")]
    pub min_price: Option<f64>,

    /// Maximum price
    #[arg(long = "max-price")]
    pub max_price: Option<f64>,

    /// Output in JSON format (same as --output json)
    #[arg(long)]
    pub json: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

impl ListArgs {
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.output
        }
    }
}
