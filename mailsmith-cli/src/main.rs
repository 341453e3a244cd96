//! Mailsmith CLI - render, migrate and watch MJML email templates.
//!
//! # Commands
//!
//! - `mailsmith render <file>` - Render a template to HTML
//! - `mailsmith migrate <file>` - Convert MJML 3 markup to MJML 4
//! - `mailsmith watch <file>` - Re-render whenever the template or its companion script changes
//! - `mailsmith settings` - Show and change stored render settings
//! - `mailsmith completions` - Generate shell completions

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::Colorize;
use mailsmith_config::{JsonFileStore, SettingsStore};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

mod commands;
mod error;
mod output;
mod watcher;

use commands::render::RenderSettings;
use commands::{migrate, render, settings, watch};
use error::{CliError, CliResult};

/// Mailsmith CLI - MJML email rendering tools
#[derive(Parser)]
#[command(name = "mailsmith")]
#[command(version)]
#[command(about = "Render MJML email templates to HTML")]
#[command(long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = format!(
    "{}\n  {} mailsmith render welcome.mjml -o welcome.html\n  {} mailsmith watch welcome.mjml --minify -o welcome.html\n  {} mailsmith migrate legacy.mjml --in-place\n  {} mailsmith settings set-config true",
    "Examples:".bright_cyan().bold(),
    "$".dimmed(),
    "$".dimmed(),
    "$".dimmed(),
    "$".dimmed(),
))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Directory holding stored settings
    #[arg(long, global = true, env = "MAILSMITH_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template to HTML
    #[command(alias = "r")]
    Render(RenderArgs),

    /// Convert MJML 3 markup to MJML 4
    #[command(alias = "m")]
    Migrate(MigrateArgs),

    /// Re-render on every change of a template or its companion script
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Show and change stored render settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
struct RenderOutputArgs {
    /// External mjml binary to render with
    #[arg(long, env = "MAILSMITH_MJML_PATH")]
    mjml_path: Option<PathBuf>,

    /// Minify the generated HTML
    #[arg(long)]
    minify: bool,

    /// Write HTML to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl From<RenderOutputArgs> for RenderSettings {
    fn from(args: RenderOutputArgs) -> Self {
        Self {
            mjml_path: args.mjml_path,
            minify: args.minify,
            output: args.output,
        }
    }
}

#[derive(Args)]
struct RenderArgs {
    /// Template to render
    file: PathBuf,

    #[command(flatten)]
    render: RenderOutputArgs,

    /// Print the full result, diagnostics included, as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct MigrateArgs {
    /// MJML 3 template
    file: PathBuf,

    /// Write the result to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite the template
    #[arg(long, conflicts_with = "output")]
    in_place: bool,
}

#[derive(Args)]
struct WatchArgs {
    /// Template to watch
    file: PathBuf,

    #[command(flatten)]
    render: RenderOutputArgs,
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Print the stored settings
    Show,

    /// Enable or disable .mjmlconfig lookup
    SetConfig {
        #[arg(action = ArgAction::Set, value_parser = clap::value_parser!(bool))]
        enabled: bool,
    },

    /// Set the .mjmlconfig location; omit PATH to use each template's directory
    ConfigPath { path: Option<PathBuf> },

    /// Import settings from a JSON or TOML file
    Import { file: PathBuf },
}

fn open_store(data_dir: Option<PathBuf>) -> CliResult<JsonFileStore> {
    match data_dir {
        Some(dir) => Ok(JsonFileStore::new(dir)),
        None => Ok(JsonFileStore::default_location()?),
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Render(args) => {
            let store: Arc<dyn SettingsStore> = Arc::new(open_store(cli.data_dir)?);
            render::run(store, &args.file, &args.render.into(), args.json).await
        }

        Commands::Migrate(args) => {
            migrate::run(&args.file, args.output.as_deref(), args.in_place).await
        }

        Commands::Watch(args) => {
            let store: Arc<dyn SettingsStore> = Arc::new(open_store(cli.data_dir)?);
            watch::run(store, &args.file, &args.render.into()).await
        }

        Commands::Settings { command } => {
            let store = open_store(cli.data_dir)?;
            match command {
                SettingsCommands::Show => settings::show(&store, store.data_dir()).await,
                SettingsCommands::SetConfig { enabled } => {
                    settings::set_use_config(&store, enabled).await
                }
                SettingsCommands::ConfigPath { path } => {
                    if path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
                        return Err(CliError::InvalidArgument(
                            "config path must not be empty".to_string(),
                        ));
                    }
                    settings::set_config_path(&store, path).await
                }
                SettingsCommands::Import { file } => settings::import(&store, &file).await,
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "mailsmith", &mut io::stdout());
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Handle color preferences
    if cli.no_color {
        colored::control::set_override(false);
    }

    output::set_quiet(cli.quiet);
    if cli.verbose {
        mailsmith_log::set_level(mailsmith_log::Level::Debug);
    } else if cli.quiet {
        mailsmith_log::set_level(mailsmith_log::Level::Error);
    }
    mailsmith_log::init();

    if let Err(e) = run(cli).await {
        eprintln!("\n  {} {}\n", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
