//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the wit CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// wit - Filter, page and search work item listings
#[derive(Parser, Debug)]
#[command(name = "wit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Dataset file (default: from config, else the platform data directory)
    #[arg(long, global = true, env = "WIT_DATA", value_name = "PATH")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a JSON filter and print the expression tree
    #[command(alias = "f")]
    Filter {
        /// Filter JSON, e.g. '{"state": "open", "negate": true}'
        expression: String,
    },

    /// Compute the first/prev/next/last links of a page
    Links {
        /// Request path the links are built on
        #[arg(long, default_value = "/")]
        path: String,

        /// Raw page[offset] value (non-numeric or negative becomes 0)
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<String>,

        /// Raw page[limit] value (missing or non-positive uses the default)
        #[arg(long, allow_hyphen_values = true)]
        limit: Option<i64>,

        /// Total number of matching rows
        #[arg(long)]
        count: usize,

        /// Number of rows on the current page
        #[arg(long)]
        result_len: usize,

        /// Query fragment appended to every link (repeatable)
        #[arg(long, action = clap::ArgAction::Append)]
        query: Vec<String>,
    },

    /// List work items of the dataset
    #[command(alias = "l")]
    List {
        /// Filter JSON
        #[arg(short, long)]
        filter: Option<String>,

        /// Raw page[offset] value
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<String>,

        /// Raw page[limit] value
        #[arg(long, allow_hyphen_values = true)]
        limit: Option<i64>,

        /// Restrict to one space (UUID)
        #[arg(short, long)]
        space: Option<String>,

        /// List the backlog of the space instead of all its items
        #[arg(long, requires = "space")]
        backlog: bool,
    },

    /// Search work items by title, number or deep link
    #[command(alias = "s")]
    Search {
        /// Search text: title words, `number:N` or a work item link
        text: String,

        /// Host whose work item links should be recognized
        #[arg(long)]
        host: Option<String>,

        /// Filter JSON
        #[arg(short, long)]
        filter: Option<String>,

        /// Raw page[offset] value
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<String>,

        /// Raw page[limit] value
        #[arg(long, allow_hyphen_values = true)]
        limit: Option<i64>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Shells supported for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Configuration value
        value: String,
    },

    /// Print config file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["wit", "--verbose", "list"]);
        assert!(cli.verbose);
        assert!(!cli.quiet);
        assert!(!cli.json);

        let cli = Cli::parse_from(["wit", "--quiet", "--json", "list"]);
        assert!(!cli.verbose);
        assert!(cli.quiet);
        assert!(cli.json);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["wit", "-v", "-q", "list"]).is_err());
    }

    #[test]
    fn test_data_flag() {
        let cli = Cli::parse_from(["wit", "--data", "/tmp/items.json", "list"]);
        assert_eq!(cli.data, Some(PathBuf::from("/tmp/items.json")));
    }

    #[test]
    fn test_filter_command() {
        let cli = Cli::parse_from(["wit", "f", r#"{"state": "open"}"#]);
        if let Some(Commands::Filter { expression }) = cli.command {
            assert_eq!(expression, r#"{"state": "open"}"#);
        } else {
            panic!("Expected Filter command");
        }
    }

    #[test]
    fn test_links_command() {
        let cli = Cli::parse_from([
            "wit",
            "links",
            "--path",
            "/items",
            "--offset",
            "-3",
            "--limit",
            "5",
            "--count",
            "12",
            "--result-len",
            "5",
            "--query",
            "a=1",
            "--query",
            "b=2",
        ]);
        if let Some(Commands::Links {
            path,
            offset,
            limit,
            count,
            result_len,
            query,
        }) = cli.command
        {
            assert_eq!(path, "/items");
            assert_eq!(offset.as_deref(), Some("-3"));
            assert_eq!(limit, Some(5));
            assert_eq!(count, 12);
            assert_eq!(result_len, 5);
            assert_eq!(query, vec!["a=1", "b=2"]);
        } else {
            panic!("Expected Links command");
        }
    }

    #[test]
    fn test_links_requires_count() {
        assert!(Cli::try_parse_from(["wit", "links", "--result-len", "1"]).is_err());
    }

    #[test]
    fn test_list_with_options() {
        let cli = Cli::parse_from([
            "wit",
            "l",
            "--filter",
            r#"{"type": "bug"}"#,
            "--limit",
            "10",
            "--space",
            "0b6c1f5a-2d3e-4f5a-8b9c-0d1e2f3a4b5c",
            "--backlog",
        ]);
        if let Some(Commands::List {
            filter,
            limit,
            space,
            backlog,
            ..
        }) = cli.command
        {
            assert_eq!(filter.as_deref(), Some(r#"{"type": "bug"}"#));
            assert_eq!(limit, Some(10));
            assert!(space.is_some());
            assert!(backlog);
        } else {
            panic!("Expected List command");
        }
    }

    #[test]
    fn test_backlog_requires_space() {
        assert!(Cli::try_parse_from(["wit", "list", "--backlog"]).is_err());
    }

    #[test]
    fn test_search_command() {
        let cli = Cli::parse_from(["wit", "s", "login", "--host", "tracker.example.io"]);
        if let Some(Commands::Search { text, host, .. }) = cli.command {
            assert_eq!(text, "login");
            assert_eq!(host.as_deref(), Some("tracker.example.io"));
        } else {
            panic!("Expected Search command");
        }
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::parse_from(["wit", "config", "set", "paging.max_limit", "50"]);
        if let Some(Commands::Config {
            command: Some(ConfigCommands::Set { key, value }),
        }) = cli.command
        {
            assert_eq!(key, "paging.max_limit");
            assert_eq!(value, "50");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn test_completions() {
        let cli = Cli::parse_from(["wit", "completions", "zsh"]);
        if let Some(Commands::Completions { shell }) = cli.command {
            assert!(matches!(shell, Shell::Zsh));
        } else {
            panic!("Expected Completions command");
        }
    }
}
