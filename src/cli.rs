use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Character catalog browser and signed upstream proxy
#[derive(Parser)]
#[command(name = "cameo")]
#[command(about = "Browse a character catalog through a signed proxy", long_about = None)]
pub struct Cli {
    /// Config file (defaults to the per-user config.toml if present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Proxy base URL used by the browsing commands
    #[arg(long, global = true, value_name = "URL")]
    pub proxy: Option<String>,

    /// Decide "more pages" from the upstream total instead of page fullness
    #[arg(long, global = true)]
    pub use_total: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the signed request proxy
    Serve {
        /// Address to listen on
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },
    /// Load pages of characters and print them as cards
    List {
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: usize,
    },
    /// Search characters whose name starts with TERM
    Search {
        term: String,
    },
    /// Interactive browsing: typed lines are debounced searches, `:more`
    /// scrolls, `:show` prints the grid, `:open N` / `:close` drive the detail
    /// view, `:quit` exits
    Browse,
    /// Show the detail view of the first character matching NAME
    Show {
        name: String,
    },
}
