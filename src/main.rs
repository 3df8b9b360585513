use cartsync::interfaces::cli::{Cli, telemetry};
use clap::Parser;
use miette::{IntoDiagnostic, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();
    telemetry::init(&cli.global.log_level).into_diagnostic()?;

    cli.run().await.into_diagnostic()
}
