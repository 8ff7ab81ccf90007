mod cmd;
mod host;
mod logging;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "mdu", version, about = "Terminal host for the mduri:// automation protocol")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Handle one mduri:// call and exit
    Call(CallArgs),

    /// List every registered route
    Routes,

    /// Rebuild the note metadata index for a vault
    Reindex(ReindexArgs),

    /// Validate configuration and print resolved paths
    Doctor,
}

#[derive(Debug, Args)]
pub struct CallArgs {
    /// The request, with or without the mduri:// prefix
    pub uri: String,

    /// Deliver callbacks over HTTP instead of printing them
    #[arg(long)]
    pub fire: bool,
}

#[derive(Debug, Args)]
pub struct ReindexArgs {
    /// Vault name (defaults to the configured default_vault)
    #[arg(long)]
    pub vault: Option<String>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Call(args) => cmd::call::run(cli.config.as_deref(), &args.uri, args.fire),
        Commands::Routes => cmd::routes::run(),
        Commands::Reindex(args) => {
            cmd::reindex::run(cli.config.as_deref(), args.vault.as_deref())
        }
        Commands::Doctor => cmd::doctor::run(cli.config.as_deref()),
    }
}
