use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "cognito-attrs")]
#[command(about = "Add custom attributes to Cognito user pools after a deployment")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (defaults to cognito-attrs.toml when present)
    #[arg(short, long, global = true, env = "COGNITO_ATTRS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the after:deploy:deploy hook against the deployed stack
    Deploy(DeployArgs),
    /// Show the changes a deploy would make without applying them
    Plan(DeployArgs),
    /// Check the service's mapping configuration offline
    Validate(ServiceArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServiceArgs {
    /// Service descriptor (JSON or TOML)
    #[arg(short, long, env = "COGNITO_ATTRS_SERVICE")]
    pub service: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DeployArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// CloudFormation stack name (defaults to <service>-<stage>)
    #[arg(long, env = "COGNITO_ATTRS_STACK")]
    pub stack: Option<String>,

    /// Process entries for different user pools concurrently
    #[arg(long)]
    pub parallel: bool,
}
