//! xdi-connect: build, sign, verify and inspect XDI Connect messages.

use std::process::ExitCode;

use clap::Parser;
use connect_telemetry::{init_telemetry, TelemetryConfig};

use connect_cli::cli::Cli;
use connect_cli::commands;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable.
    init_telemetry(&TelemetryConfig::for_component("cli"))?;

    let output = commands::run(cli.command).await?;
    println!("{}", output.text);

    Ok(if output.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
