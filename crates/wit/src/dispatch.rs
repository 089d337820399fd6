//! Command dispatch module for routing CLI commands to their handlers.
//!
//! Commands fall into two groups: those that work on their arguments alone
//! and those that read the dataset. The second group loads the dataset
//! asynchronously, so it is dispatched through an async trait.

use crate::cli::{Cli, Commands, ConfigCommands};
use crate::commands::config::{Config, ConfigSetOptions};
use crate::commands::links::LinksOptions;
use crate::commands::list::ListOptions;
use crate::commands::search::SearchOptions;
use crate::commands::{self, CommandContext, CommandError, Result};

/// Trait for commands that do not read the dataset.
pub trait StandaloneCommand {
    /// Execute the command.
    fn execute(&self, ctx: &CommandContext, config: &Config) -> Result<()>;
}

/// Trait for commands that read the dataset.
#[allow(async_fn_in_trait)]
pub trait DatasetCommand {
    /// Execute the command.
    async fn execute(&self, ctx: &CommandContext, config: &Config) -> Result<()>;
}

/// Commands that do not read the dataset.
pub enum StandaloneDispatch<'a> {
    Config(&'a Option<ConfigCommands>),
    Completions(&'a crate::cli::Shell),
    Filter(&'a str),
    Links(LinksOptions),
    Help,
}

impl<'a> StandaloneDispatch<'a> {
    /// Try to create a standalone dispatch from the CLI command.
    /// Returns None if the command reads the dataset.
    pub fn try_from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Config { command }) => Some(Self::Config(command)),
            Some(Commands::Completions { shell }) => Some(Self::Completions(shell)),
            Some(Commands::Filter { expression }) => Some(Self::Filter(expression)),
            Some(Commands::Links {
                path,
                offset,
                limit,
                count,
                result_len,
                query,
            }) => Some(Self::Links(LinksOptions {
                path: path.clone(),
                offset: offset.clone(),
                limit: *limit,
                count: *count,
                result_len: *result_len,
                query: query.clone(),
            })),
            None => Some(Self::Help),
            _ => None,
        }
    }
}

impl StandaloneCommand for StandaloneDispatch<'_> {
    fn execute(&self, ctx: &CommandContext, config: &Config) -> Result<()> {
        match self {
            Self::Config(command) => dispatch_config(ctx, command),
            Self::Completions(shell) => {
                commands::completions::execute(shell).map_err(CommandError::Io)
            }
            Self::Filter(input) => commands::filter::execute(ctx, input),
            Self::Links(opts) => commands::links::execute(ctx, opts, config.page_sizes()),
            Self::Help => {
                if !ctx.quiet {
                    println!("wit - work item filters, listings and paging links");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

/// Dispatch config subcommands.
fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::execute_show(ctx),
        Some(ConfigCommands::Set { key, value }) => {
            let opts = ConfigSetOptions {
                key: key.clone(),
                value: value.clone(),
            };
            commands::config::execute_set(ctx, &opts)
        }
        Some(ConfigCommands::Path) => commands::config::execute_path(ctx),
    }
}

/// Commands that read the dataset.
pub enum DatasetDispatch {
    List(ListOptions),
    Search(SearchOptions),
}

impl DatasetDispatch {
    /// Create a dataset dispatch from the CLI command.
    pub fn from_cli(cli: &Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::List {
                filter,
                offset,
                limit,
                space,
                backlog,
            }) => Some(Self::List(ListOptions {
                filter: filter.clone(),
                offset: offset.clone(),
                limit: *limit,
                space: space.clone(),
                backlog: *backlog,
            })),
            Some(Commands::Search {
                text,
                host,
                filter,
                offset,
                limit,
            }) => Some(Self::Search(SearchOptions {
                text: text.clone(),
                host: host.clone(),
                filter: filter.clone(),
                offset: offset.clone(),
                limit: *limit,
            })),
            _ => None,
        }
    }
}

impl DatasetCommand for DatasetDispatch {
    async fn execute(&self, ctx: &CommandContext, config: &Config) -> Result<()> {
        match self {
            Self::List(opts) => commands::list::execute(ctx, opts, config).await,
            Self::Search(opts) => commands::search::execute(ctx, opts, config).await,
        }
    }
}
