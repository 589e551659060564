//! folio CLI - Flat-file content engine.
//!
//! Provides commands for inspecting a content tree:
//! - `show`: Show one page
//! - `menu`: Print the navigation menu
//! - `articles`: List dated articles
//! - `pages`: List the pages of a category
//! - `list`: List every visible page

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ArticlesArgs, GlobalArgs, MenuArgs, PagesArgs, ShowArgs};
use output::Output;

/// folio - Flat-file content engine.
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a page's title, metadata and optionally its rendered body.
    Show(ShowArgs),
    /// Print the navigation menu, or the subtree for a path.
    Menu(MenuArgs),
    /// List dated articles, newest first.
    Articles(ArticlesArgs),
    /// List the pages of a category in priority order.
    Pages(PagesArgs),
    /// List every visible page.
    List,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let env_filter = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(cli.global.verbose, env_filter.as_deref());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Show(args) => args.execute(&cli.global, &output),
        Commands::Menu(args) => args.execute(&cli.global, &output),
        Commands::Articles(args) => args.execute(&cli.global, &output),
        Commands::Pages(args) => args.execute(&cli.global, &output),
        Commands::List => commands::list::execute(&cli.global, &output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

/// Log filter: `--verbose` enables INFO level, otherwise use RUST_LOG or
/// default to WARN.
fn log_filter(verbose: bool, env: Option<&str>) -> EnvFilter {
    if verbose {
        return EnvFilter::new("info");
    }
    env.filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}
