#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use std::path::PathBuf;
use todo_core::config;
use todo_core::error::ErrorCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "td: a small persisted to-do list",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Output format: pretty, text, or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output (shorthand for `--format json`).
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Directory holding the list (overrides TODO_DATA_DIR and config).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Items",
        about = "Add a new item",
        long_about = "Add a new item to the top of the list. Blank text is ignored.",
        after_help = "EXAMPLES:\n    # Add an item\n    td add buy milk\n\n    # Emit machine-readable output\n    td add \"walk dog\" --format json"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Read",
        about = "List items",
        long_about = "List items, newest first, optionally filtered by completion.",
        after_help = "EXAMPLES:\n    # List everything\n    td list\n\n    # Only what is left to do\n    td list --filter active\n\n    # Emit machine-readable output\n    td list --format json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Items",
        about = "Toggle an item's completion",
        long_about = "Mark an active item completed, or a completed item active again.",
        after_help = "EXAMPLES:\n    # Toggle by full ID\n    td toggle td-k3x9q2\n\n    # A unique prefix is enough\n    td toggle k3x"
    )]
    Toggle(cmd::toggle::ToggleArgs),

    #[command(
        next_help_heading = "Items",
        about = "Change an item's text",
        long_about = "Replace an item's text. Empty text deletes the item.",
        after_help = "EXAMPLES:\n    # Rename an item\n    td edit k3x buy oat milk\n\n    # Delete via empty text\n    td edit k3x \"\""
    )]
    Edit(cmd::edit::EditArgs),

    #[command(
        next_help_heading = "Items",
        visible_alias = "rm",
        about = "Delete an item",
        after_help = "EXAMPLES:\n    # Delete an item\n    td delete td-k3x9q2\n    td rm k3x"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Items",
        about = "Remove all completed items",
        after_help = "EXAMPLES:\n    td clear-completed"
    )]
    ClearCompleted,

    #[command(
        next_help_heading = "Read",
        about = "Count remaining items",
        after_help = "EXAMPLES:\n    # Print just the number when piped\n    td count --format text"
    )]
    Count,

    #[command(
        next_help_heading = "Shell",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    td completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TODO_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "todo=debug,info"
        } else {
            "todo=info,warn"
        })
    });

    let format = env::var("TODO_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let user_config = match config::load_user_config() {
        Ok(config) => config,
        Err(e) => {
            let output = output::resolve_output_mode(cli.format, cli.json, None);
            render_error(
                output,
                &CliError::from_code(format!("{e:#}"), ErrorCode::ConfigParseError),
            )?;
            return Err(e.context("Failed to load todo config"));
        }
    };
    let output =
        output::resolve_output_mode(cli.format, cli.json, user_config.output.as_deref());
    let data_dir = match config::resolve_data_dir(cli.data_dir.as_deref(), &user_config) {
        Ok(dir) => dir,
        Err(e) => {
            render_error(
                output,
                &CliError::from_code(e.to_string(), ErrorCode::DataDirUnavailable),
            )?;
            return Err(e);
        }
    };
    debug!(data_dir = %data_dir.display(), ?output, "resolved settings");

    let ctx = cmd::Context {
        data_dir,
        lock_timeout: user_config.lock_timeout(),
        output,
        quiet: cli.quiet,
    };

    match &cli.command {
        Commands::Add(args) => cmd::add::run_add(args, &ctx),
        Commands::List(args) => cmd::list::run_list(args, &ctx),
        Commands::Toggle(args) => cmd::toggle::run_toggle(args, &ctx),
        Commands::Edit(args) => cmd::edit::run_edit(args, &ctx),
        Commands::Delete(args) => cmd::delete::run_delete(args, &ctx),
        Commands::ClearCompleted => cmd::clear::run_clear_completed(&ctx),
        Commands::Count => cmd::count::run_count(&ctx),
        Commands::Completions(_) => Ok(()),
    }
}
