//! # CLI Flow Tests
//!
//! Drives the `xdi-connect` command line end to end through files:
//! build, sign against a registry file, verify, then inspect a peer result.

#[cfg(test)]
mod tests {
    use clap::Parser;
    use connect_cli::cli::Cli;
    use connect_cli::commands::{run, Output};
    use serde_json::Value;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use url::Url;
    use xdi_connect::adapters::memory::{InMemoryRegistry, RegistryEntry};
    use xdi_connect::{ConnectionRequest, DEFAULT_CSP_LOGO};
    use xdi_crypto::test_utils::{SIGNER_PRIVATE_KEY_PEM, SIGNER_PUBLIC_KEY_PEM};
    use xdi_types::{CloudName, CloudNumber, Graph, MessageEnvelope, MessageResult};

    const ALICE_NUMBER: &str = "[=]!:uuid:1111";
    const APP_NUMBER: &str = "[+]!:uuid:9999";
    const TOKEN: &str = "s3cret";

    /// Run the CLI; parse and command errors come back as text.
    async fn xdi_connect(args: &[&str]) -> Result<Output, String> {
        let cli = Cli::try_parse_from(std::iter::once("xdi-connect").chain(args.iter().copied()))
            .map_err(|e| e.to_string())?;
        run(cli.command).await.map_err(|e| format!("{e:#}"))
    }

    fn write_registry(dir: &Path) -> PathBuf {
        let registry = InMemoryRegistry::new(vec![RegistryEntry::new(
            CloudNumber::parse(ALICE_NUMBER).unwrap(),
        )
        .with_cloud_name(CloudName::parse("=alice").unwrap())
        .with_endpoint(Url::parse("https://xdi.danubeclouds.com/[=]!:uuid:1111/").unwrap())
        .with_public_key(SIGNER_PUBLIC_KEY_PEM)
        .with_private_key(SIGNER_PRIVATE_KEY_PEM, TOKEN)]);

        let path = dir.join("registry.json");
        fs::write(&path, registry.to_json().unwrap()).unwrap();
        path
    }

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_build_sign_verify() {
        let dir = TempDir::new().unwrap();
        let registry = write_registry(dir.path());
        let registry = registry.to_str().unwrap();

        let built = xdi_connect(&[
            "build",
            "--sender",
            ALICE_NUMBER,
            "--to",
            APP_NUMBER,
            "--template",
            "+app{$do}",
            "--return-uri",
            "https://app.example/cb",
        ])
        .await
        .unwrap();
        assert!(built.success);
        let request_file = write(dir.path(), "request.json", &built.text);

        let signed = xdi_connect(&[
            "sign",
            "--envelope",
            request_file.to_str().unwrap(),
            "--cloud-name",
            "=alice",
            "--secret-token",
            TOKEN,
            "--short",
            "--registry-file",
            registry,
        ])
        .await
        .unwrap();
        let signed_path = write(dir.path(), "signed.json", &signed.text);

        let mut envelope = MessageEnvelope::from_json(&signed.text).unwrap();
        assert!(envelope.messages()[0].signature().is_some());
        let request = ConnectionRequest::from_envelope(&mut envelope).unwrap();
        assert_eq!(request.short_flag(), Some(true));
        assert_eq!(
            request.return_uri().unwrap().map(String::from),
            Some("https://app.example/cb".to_string())
        );

        let verified = xdi_connect(&[
            "verify",
            "--envelope",
            signed_path.to_str().unwrap(),
            "--registry-file",
            registry,
        ])
        .await
        .unwrap();
        assert!(verified.success, "{}", verified.text);

        // The unsigned request does not pass
        let unsigned = xdi_connect(&[
            "verify",
            "--envelope",
            request_file.to_str().unwrap(),
            "--registry-file",
            registry,
        ])
        .await
        .unwrap();
        assert!(!unsigned.success);
        let report: Value = serde_json::from_str(&unsigned.text).unwrap();
        assert_eq!(report["messages"][0]["outcome"]["status"], "unsigned");
    }

    #[tokio::test]
    async fn test_sign_with_wrong_token_fails() {
        let dir = TempDir::new().unwrap();
        let registry = write_registry(dir.path());
        let envelope = ConnectionRequest::build(
            &CloudNumber::parse(ALICE_NUMBER).unwrap(),
            &CloudNumber::parse(APP_NUMBER).unwrap(),
            &"+app{$do}".parse().unwrap(),
        );
        let request = write(dir.path(), "request.json", &envelope.to_json().unwrap());

        let err = xdi_connect(&[
            "sign",
            "--envelope",
            request.to_str().unwrap(),
            "--cloud-name",
            "=alice",
            "--secret-token",
            "wrong",
            "--registry-file",
            registry.to_str().unwrap(),
        ])
        .await
        .unwrap_err();

        assert!(err.contains("signing as =alice"), "{err}");
    }

    #[tokio::test]
    async fn test_inspect_peer_result() {
        let dir = TempDir::new().unwrap();
        let graph = Graph::parse(
            "/$is$ref/[=]!:uuid:1111\n\
             ([=]!:uuid:1111/[+]!:uuid:9999)$do/$get/[=]!:uuid:1111<#email>",
        )
        .unwrap();
        let result = write(
            dir.path(),
            "result.json",
            &MessageResult::new(graph).to_json().unwrap(),
        );

        let output = xdi_connect(&["inspect", "--result", result.to_str().unwrap()])
            .await
            .unwrap();
        let view: Value = serde_json::from_str(&output.text).unwrap();

        assert_eq!(view["cloud_number"], ALICE_NUMBER);
        assert_eq!(view["link_contracts"][0]["authorizing"], ALICE_NUMBER);
        assert_eq!(view["link_contracts"][0]["requesting"], APP_NUMBER);
        assert_eq!(view["link_contracts"][0]["permissions"][0]["permission"], "$get");
    }

    #[tokio::test]
    async fn test_logo_command() {
        let output = xdi_connect(&["logo", "https://unknown.example/"])
            .await
            .unwrap();
        assert_eq!(output.text, DEFAULT_CSP_LOGO);
    }
}
