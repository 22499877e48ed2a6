use clap::{Parser, Subcommand};
use placesearch_core::config::{DEFAULT_API_HOST, DEFAULT_API_URL};

/// CLI arguments for placesearch-cli
#[derive(Debug, Parser)]
#[command(
    name = "placesearch",
    version,
    about = "Search cities by country name against a GeoDB-style cities API"
)]
pub struct CliArgs {
    /// Cities endpoint
    #[arg(
        long = "api-url",
        env = "PLACESEARCH_API_URL",
        default_value = DEFAULT_API_URL,
        global = true
    )]
    pub api_url: String,

    /// Value sent as `x-rapidapi-host`
    #[arg(
        long = "api-host",
        env = "PLACESEARCH_API_HOST",
        default_value = DEFAULT_API_HOST,
        global = true
    )]
    pub api_host: String,

    /// Value sent as `x-rapidapi-key`
    #[arg(long = "api-key", env = "PLACESEARCH_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Optional custom country table (.json or .json.gz) instead of the bundled one
    #[arg(short = 'c', long = "countries", global = true)]
    pub countries: Option<String>,

    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve a country name to its ISO2 code (offline)
    Resolve {
        /// Country name, alias or ISO2 code (e.g. "France", "UK", "de")
        name: String,
    },

    /// Fetch a single page of cities for a country
    Fetch {
        /// Country name, alias or ISO2 code
        name: String,

        /// 1-based page number
        #[arg(short = 'p', long = "page", default_value_t = 1)]
        page: u32,

        /// Cities per page (1 - 10)
        #[arg(short = 's', long = "size", default_value = "5")]
        size: String,
    },

    /// Type country names and page through results interactively
    Interactive {
        /// Quiescence window before a typed search fires
        #[arg(long = "debounce-ms", default_value_t = 600)]
        debounce_ms: u64,
    },
}
