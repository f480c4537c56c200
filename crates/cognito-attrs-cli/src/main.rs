use anyhow::Result;
use clap::Parser;

use cognito_attrs_cli::cli::{Cli, Commands};
use cognito_attrs_cli::output::print_error;
use cognito_attrs_cli::{commands, config, observability};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let settings =
        config::loader::load_settings(cli.config.as_deref()).map_err(anyhow::Error::msg)?;
    observability::init_tracing(&settings.logging.level);
    let format = cli.format.unwrap_or_default();

    match &cli.command {
        Commands::Deploy(args) => commands::deploy::deploy(&settings, args).await?,
        Commands::Plan(args) => commands::plan::plan(&settings, args, format).await?,
        Commands::Validate(args) => commands::validate::validate(&settings, args, format)?,
    }

    Ok(())
}
