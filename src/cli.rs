use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "psperf")]
#[command(author, version, about = "PlayStation game performance catalog")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Look up a title the same way the search endpoint does
    Search {
        /// Title or fragment to search for
        #[arg(required = true)]
        query: String,

        /// Restrict to one console family ("PS4", "PlayStation 5", ...)
        #[arg(long)]
        console: Option<String>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_with_console() {
        let cli = Cli::parse_from(["psperf", "search", "Spider-Man", "--console", "PS5"]);
        match cli.command {
            Commands::Search { query, console } => {
                assert_eq!(query, "Spider-Man");
                assert_eq!(console.as_deref(), Some("PS5"));
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn start_overrides_are_optional() {
        let cli = Cli::parse_from(["psperf", "-v", "start"]);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Start {
                host: None,
                port: None
            }
        ));
    }
}
