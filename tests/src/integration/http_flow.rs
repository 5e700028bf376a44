//! # HTTP Flow Tests
//!
//! Signs and verifies through the `reqwest` adapters against a local fake
//! provider. The fake answers both the discovery registry and the key
//! retrieval endpoint, backed by an `InMemoryRegistry`.

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;
    use url::Url;
    use xdi_connect::adapters::http::{HttpDiscoveryClient, HttpKeyRetrievalClient};
    use xdi_connect::adapters::memory::{InMemoryRegistry, RegistryEntry};
    use xdi_connect::{
        ConnectApi, ConnectConfig, ConnectError, ConnectService, ConnectionRequest,
        DiscoveryClient, KeyRetrievalClient, KeyRetrievalError, VerificationOutcome,
    };
    use xdi_crypto::test_utils::{SIGNER_PRIVATE_KEY_PEM, SIGNER_PUBLIC_KEY_PEM};
    use xdi_types::{CloudName, CloudNumber, XdiAddress};

    const ALICE_NUMBER: &str = "[=]!:uuid:1111";
    const APP_NUMBER: &str = "[+]!:uuid:9999";
    const TOKEN: &str = "s3cret";

    // =========================================================================
    // FAKE PROVIDER
    // =========================================================================

    struct FakeProvider {
        base: Url,
        _server: JoinHandle<()>,
    }

    impl FakeProvider {
        /// Start a provider hosting Alice at `{base}[=]!:uuid:1111/`.
        async fn start() -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let base = base_url(addr);

            let registry = InMemoryRegistry::new(vec![RegistryEntry::new(
                CloudNumber::parse(ALICE_NUMBER).unwrap(),
            )
            .with_cloud_name(CloudName::parse("=alice").unwrap())
            .with_endpoint(base.join(&format!("{ALICE_NUMBER}/")).unwrap())
            .with_public_key(SIGNER_PUBLIC_KEY_PEM)
            .with_private_key(SIGNER_PRIVATE_KEY_PEM, TOKEN)]);

            let server = tokio::spawn(async move {
                while let Ok((socket, _)) = listener.accept().await {
                    let registry = registry.clone();
                    let base = base.clone();
                    tokio::spawn(async move { handle(socket, &registry, &base).await });
                }
            });

            Self {
                base: base_url(addr),
                _server: server,
            }
        }

        fn config(&self) -> ConnectConfig {
            ConnectConfig {
                discovery_registry: self.base.to_string(),
                ..ConnectConfig::default()
            }
        }
    }

    fn base_url(addr: SocketAddr) -> Url {
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    async fn handle(mut socket: TcpStream, registry: &InMemoryRegistry, base: &Url) {
        let Some((request_line, body)) = read_request(&mut socket).await else {
            return;
        };
        let (status, body) = route(&request_line, &body, registry, base).await;

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    }

    async fn read_request(socket: &mut TcpStream) -> Option<(String, String)> {
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            let n = socket.read(&mut buf).await.ok()?;
            request.extend_from_slice(&buf[..n]);

            let text = String::from_utf8_lossy(&request).into_owned();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                let body_start = header_end + 4;
                if text.len() >= body_start + content_length {
                    let request_line = text.lines().next()?.to_string();
                    return Some((request_line, text[body_start..].to_string()));
                }
            }
            if n == 0 {
                return None;
            }
        }
    }

    async fn route(
        request_line: &str,
        body: &str,
        registry: &InMemoryRegistry,
        base: &Url,
    ) -> (&'static str, String) {
        let mut parts = request_line.split_whitespace();
        let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
            return ("400 Bad Request", String::new());
        };
        let Ok(url) = base.join(target) else {
            return ("400 Bad Request", String::new());
        };

        match (method, url.path()) {
            ("GET", "/discovery") => {
                let query = url
                    .query_pairs()
                    .find(|(k, _)| k == "query")
                    .map(|(_, v)| v.into_owned())
                    .unwrap_or_default();
                let result = match CloudNumber::parse(&query) {
                    Ok(number) => registry.discover_cloud_number(&number).await,
                    Err(_) => match CloudName::parse(&query) {
                        Ok(name) => registry.discover(&name).await,
                        Err(_) => return ("400 Bad Request", String::new()),
                    },
                };
                match result {
                    Ok(result) if !result.is_empty() => {
                        ("200 OK", serde_json::to_string(&result).unwrap())
                    }
                    _ => ("404 Not Found", String::new()),
                }
            }
            ("POST", path) if path.ends_with("/keys/signature") => {
                let endpoint = url.join("./").unwrap().join("../").unwrap();
                let request: Value = serde_json::from_str(body).unwrap_or_default();
                let (Some(number), Some(token)) = (
                    request["cloud_number"].as_str(),
                    request["secret_token"].as_str(),
                ) else {
                    return ("400 Bad Request", String::new());
                };
                let Ok(number) = CloudNumber::parse(number) else {
                    return ("400 Bad Request", String::new());
                };

                match registry
                    .retrieve_signature_private_key(&endpoint, &number, token)
                    .await
                {
                    Ok(Some(key)) => ("200 OK", json!({ "private_key": key }).to_string()),
                    Ok(None) => ("404 Not Found", String::new()),
                    Err(KeyRetrievalError::Unauthorized) => ("401 Unauthorized", String::new()),
                    Err(_) => ("500 Internal Server Error", String::new()),
                }
            }
            _ => ("404 Not Found", String::new()),
        }
    }

    fn http_service(
        config: &ConnectConfig,
    ) -> ConnectService<HttpDiscoveryClient, HttpKeyRetrievalClient> {
        ConnectService::new(
            HttpDiscoveryClient::new(config).unwrap(),
            HttpKeyRetrievalClient::new(config).unwrap(),
        )
    }

    fn new_request() -> xdi_types::MessageEnvelope {
        ConnectionRequest::build(
            &CloudNumber::parse(ALICE_NUMBER).unwrap(),
            &CloudNumber::parse(APP_NUMBER).unwrap(),
            &XdiAddress::parse("+app{$do}").unwrap(),
        )
    }

    // =========================================================================
    // TESTS
    // =========================================================================

    #[tokio::test]
    async fn test_sign_and_verify_over_http() {
        let provider = FakeProvider::start().await;
        let service = http_service(&provider.config());

        let mut envelope = new_request();
        let mut request = ConnectionRequest::from_envelope(&mut envelope).unwrap();
        request.set_short_flag(true);

        let report = service
            .sign(&mut request, &CloudName::parse("=alice").unwrap(), TOKEN)
            .await
            .unwrap();
        assert_eq!(report.messages_signed, 1);
        assert_eq!(
            report.endpoint,
            provider.base.join("[=]!:uuid:1111/").unwrap()
        );

        let verification = service.verify(&envelope).await;
        assert!(verification.all_valid(), "{verification:?}");
    }

    #[tokio::test]
    async fn test_rejected_token_over_http() {
        let provider = FakeProvider::start().await;
        let service = http_service(&provider.config());

        let mut envelope = new_request();
        let mut request = ConnectionRequest::from_envelope(&mut envelope).unwrap();
        let err = service
            .sign(&mut request, &CloudName::parse("=alice").unwrap(), "wrong")
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectError::KeyRetrievalFailed { .. }));
        assert!(envelope.messages()[0].signature().is_none());
    }

    #[tokio::test]
    async fn test_unknown_name_over_http() {
        let provider = FakeProvider::start().await;
        let service = http_service(&provider.config());

        let mut envelope = new_request();
        let mut request = ConnectionRequest::from_envelope(&mut envelope).unwrap();
        let err = service
            .sign(&mut request, &CloudName::parse("=nobody").unwrap(), TOKEN)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "discovery_failed");
    }

    #[tokio::test]
    async fn test_registry_unreachable() {
        // Bind and drop to get a port nobody listens on
        let addr = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap()
            .local_addr()
            .unwrap();
        let config = ConnectConfig {
            discovery_registry: base_url(addr).to_string(),
            http_connect_timeout_secs: 1,
            ..ConnectConfig::default()
        };
        let service = http_service(&config);

        let mut envelope = new_request();
        let mut request = ConnectionRequest::from_envelope(&mut envelope).unwrap();
        let err = service
            .sign(&mut request, &CloudName::parse("=alice").unwrap(), TOKEN)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "discovery_failed");

        let verification = service.verify(&envelope).await;
        assert_eq!(
            verification.messages[0].outcome,
            VerificationOutcome::Unsigned
        );
    }
}
