//! Command line definition.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use xdi_connect::ReturnUri;

/// XDI Connect: build, sign, verify and inspect connection messages
#[derive(Parser, Debug)]
#[command(name = "xdi-connect", version)]
#[command(about = "Build, sign, verify and inspect XDI Connect messages")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the provider logo for an XDI endpoint
    Logo {
        /// XDI endpoint URL
        endpoint: String,
    },

    /// Create a new connection request envelope
    Build {
        /// Cloud number of the requesting party
        #[arg(long)]
        sender: String,

        /// Cloud number of the peer asked to connect
        #[arg(long)]
        to: String,

        /// Link contract template address, e.g. `+app{$do}`
        #[arg(long)]
        template: String,

        #[command(flatten)]
        parameters: RequestParameters,
    },

    /// Sign a connection request envelope
    Sign {
        /// Envelope JSON file
        #[arg(long)]
        envelope: PathBuf,

        /// Cloud name whose signature key is used, e.g. `=alice`
        #[arg(long)]
        cloud_name: String,

        /// Secret token for key retrieval
        #[arg(long, env = "XDI_SECRET_TOKEN", hide_env_values = true)]
        secret_token: String,

        #[command(flatten)]
        parameters: RequestParameters,

        #[command(flatten)]
        registry: RegistrySource,
    },

    /// Verify the signatures of an envelope against published keys
    Verify {
        /// Envelope JSON file
        #[arg(long)]
        envelope: PathBuf,

        #[command(flatten)]
        registry: RegistrySource,
    },

    /// Show the cloud number and link contracts of a connection result
    Inspect {
        /// Message result JSON file
        #[arg(long)]
        result: PathBuf,
    },
}

/// Optional request parameters applied before output or signing.
#[derive(Args, Debug, Default)]
pub struct RequestParameters {
    /// URI the peer redirects to after answering
    #[arg(long)]
    pub return_uri: Option<ReturnUri>,

    /// Ask for a short-form response
    #[arg(long)]
    pub short: bool,
}

/// Where identities are resolved.
#[derive(Args, Debug, Default)]
pub struct RegistrySource {
    /// Use a JSON registry file instead of the HTTP registry
    #[arg(long)]
    pub registry_file: Option<PathBuf>,
}
