//! Command implementations. Each returns the text to print on stdout.

use crate::cli::{Command, RegistrySource, RequestParameters};
use anyhow::{bail, Context, Result};
use connect_telemetry::{connect_span, log_event, log_identity_event};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::Instrument;
use xdi_connect::adapters::http::{HttpDiscoveryClient, HttpKeyRetrievalClient};
use xdi_connect::adapters::memory::InMemoryRegistry;
use xdi_connect::{
    csp_logo_for_endpoint, ConnectApi, ConnectConfig, ConnectService, ConnectionRequest,
    ConnectionResult, DiscoveryClient, KeyRetrievalClient, VerificationReport,
};
use xdi_types::{CloudName, CloudNumber, MessageEnvelope, MessageResult, XdiAddress};

const COMPONENT: &str = "cli";

/// Outcome of a command: stdout text and whether the process should exit cleanly.
#[derive(Debug)]
pub struct Output {
    pub text: String,
    pub success: bool,
}

impl Output {
    fn ok(text: String) -> Self {
        Self {
            text,
            success: true,
        }
    }
}

pub async fn run(command: Command) -> Result<Output> {
    match command {
        Command::Logo { endpoint } => Ok(Output::ok(csp_logo_for_endpoint(&endpoint).to_string())),
        Command::Build {
            sender,
            to,
            template,
            parameters,
        } => build(&sender, &to, &template, &parameters).map(Output::ok),
        Command::Sign {
            envelope,
            cloud_name,
            secret_token,
            parameters,
            registry,
        } => sign(&envelope, &cloud_name, &secret_token, &parameters, &registry)
            .await
            .map(Output::ok),
        Command::Verify { envelope, registry } => verify(&envelope, &registry).await,
        Command::Inspect { result } => inspect(&result).map(Output::ok),
    }
}

// =============================================================================
// build
// =============================================================================

pub fn build(
    sender: &str,
    to: &str,
    template: &str,
    parameters: &RequestParameters,
) -> Result<String> {
    let sender = CloudNumber::parse(sender).context("--sender")?;
    let to = CloudNumber::parse(to).context("--to")?;
    let template = XdiAddress::parse(template).context("--template")?;

    let mut envelope = ConnectionRequest::build(&sender, &to, &template);
    apply_parameters(&mut ConnectionRequest::from_envelope(&mut envelope)?, parameters);

    log_identity_event!(info, COMPONENT, "Connection request built", sender);
    Ok(envelope.to_json()?)
}

fn apply_parameters(request: &mut ConnectionRequest<'_>, parameters: &RequestParameters) {
    if let Some(uri) = &parameters.return_uri {
        request.set_return_uri(uri);
    }
    if parameters.short {
        request.set_short_flag(true);
    }
}

// =============================================================================
// sign
// =============================================================================

pub async fn sign(
    envelope_path: &Path,
    cloud_name: &str,
    secret_token: &str,
    parameters: &RequestParameters,
    registry: &RegistrySource,
) -> Result<String> {
    let cloud_name = CloudName::parse(cloud_name).context("--cloud-name")?;
    let mut envelope = read_envelope(envelope_path)?;

    match &registry.registry_file {
        Some(path) => {
            let registry = read_registry(path)?;
            let service = ConnectService::new(registry.clone(), registry);
            sign_with(&service, &mut envelope, &cloud_name, secret_token, parameters).await?;
        }
        None => {
            let config = ConnectConfig::from_env()?;
            let service = ConnectService::new(
                HttpDiscoveryClient::new(&config)?,
                HttpKeyRetrievalClient::new(&config)?,
            );
            sign_with(&service, &mut envelope, &cloud_name, secret_token, parameters).await?;
        }
    }

    Ok(envelope.to_json()?)
}

async fn sign_with<D: DiscoveryClient, K: KeyRetrievalClient>(
    service: &ConnectService<D, K>,
    envelope: &mut MessageEnvelope,
    cloud_name: &CloudName,
    secret_token: &str,
    parameters: &RequestParameters,
) -> Result<()> {
    let mut request = ConnectionRequest::from_envelope(envelope)?;
    apply_parameters(&mut request, parameters);

    let span = connect_span!(
        "sign_envelope",
        component = COMPONENT,
        cloud_name = %cloud_name,
        messages = request.envelope().len()
    );
    let report = service
        .sign(&mut request, cloud_name, secret_token)
        .instrument(span)
        .await
        .with_context(|| format!("signing as {cloud_name}"))?;

    log_identity_event!(
        info,
        COMPONENT,
        "Envelope signed",
        report.signer,
        messages = report.messages_signed,
        logo = csp_logo_for_endpoint(report.endpoint.as_str())
    );
    Ok(())
}

// =============================================================================
// verify
// =============================================================================

pub async fn verify(envelope_path: &Path, registry: &RegistrySource) -> Result<Output> {
    let envelope = read_envelope(envelope_path)?;
    let span = connect_span!(
        "verify_envelope",
        component = COMPONENT,
        messages = envelope.len()
    );

    let report: VerificationReport = match &registry.registry_file {
        Some(path) => {
            let registry = read_registry(path)?;
            ConnectService::new(registry.clone(), registry)
                .verify(&envelope)
                .instrument(span)
                .await
        }
        None => {
            let config = ConnectConfig::from_env()?;
            // Key retrieval is never called while verifying.
            ConnectService::new(HttpDiscoveryClient::new(&config)?, InMemoryRegistry::default())
                .verify(&envelope)
                .instrument(span)
                .await
        }
    };

    if !report.all_valid() {
        log_event!(
            warn,
            COMPONENT,
            "Envelope did not verify",
            valid = report.valid_count(),
            messages = report.messages.len()
        );
    }

    Ok(Output {
        text: serde_json::to_string_pretty(&report)?,
        success: report.all_valid(),
    })
}

// =============================================================================
// inspect
// =============================================================================

#[derive(Serialize)]
struct InspectView {
    cloud_number: Option<CloudNumber>,
    link_contracts: Vec<LinkContractView>,
}

#[derive(Serialize)]
struct LinkContractView {
    address: XdiAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    authorizing: Option<XdiAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    requesting: Option<XdiAddress>,
    permissions: Vec<PermissionView>,
}

#[derive(Serialize)]
struct PermissionView {
    permission: &'static str,
    target: XdiAddress,
}

pub fn inspect(result_path: &Path) -> Result<String> {
    let text = fs::read_to_string(result_path)
        .with_context(|| format!("reading {}", result_path.display()))?;
    let result = MessageResult::from_json(&text)
        .with_context(|| format!("parsing {}", result_path.display()))?;
    let connection = ConnectionResult::from_result(&result)?;

    let view = InspectView {
        cloud_number: connection.cloud_number(),
        link_contracts: connection
            .link_contracts()
            .map(|contract| {
                let (authorizing, requesting) = contract.authorities().unzip();
                LinkContractView {
                    address: contract.address().clone(),
                    authorizing,
                    requesting,
                    permissions: contract
                        .permissions()
                        .map(|(permission, target)| PermissionView {
                            permission: permission.as_str(),
                            target: target.clone(),
                        })
                        .collect(),
                }
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&view)?)
}

// =============================================================================
// helpers
// =============================================================================

fn read_envelope(path: &Path) -> Result<MessageEnvelope> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let envelope = MessageEnvelope::from_json(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    if envelope.is_empty() {
        bail!("{} contains no messages", path.display());
    }
    Ok(envelope)
}

fn read_registry(path: &Path) -> Result<InMemoryRegistry> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    InMemoryRegistry::from_json(&text).with_context(|| format!("parsing {}", path.display()))
}
