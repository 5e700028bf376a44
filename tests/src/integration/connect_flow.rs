//! # Connect Flow Tests
//!
//! A requester builds a connection request, signs it with a key held by its
//! provider, ships it as JSON and the peer verifies it against the keys the
//! registry publishes. The peer then answers with a graph the requester reads
//! back through `ConnectionResult`.
//!
//! All identities live in an `InMemoryRegistry`; key retrieval is wrapped in a
//! recorder so the tests can assert how often keys leave the provider.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use url::Url;
    use xdi_connect::adapters::memory::{InMemoryRegistry, RegistryEntry};
    use xdi_connect::{
        csp_logo_for_endpoint, ConnectApi, ConnectError, ConnectService, ConnectionRequest,
        ConnectionResult, KeyRetrievalClient, KeyRetrievalError, ReturnUri, VerificationOutcome,
        RETURN_URI_PARAMETER, SHORT_PARAMETER,
    };
    use xdi_crypto::test_utils::{
        OTHER_PRIVATE_KEY_PEM, OTHER_PUBLIC_KEY_PEM, SIGNER_PRIVATE_KEY_PEM,
        SIGNER_PUBLIC_KEY_PEM,
    };
    use xdi_types::{
        CloudName, CloudNumber, Graph, Literal, Message, MessageEnvelope, MessageResult,
        Permission, XdiAddress,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    const ALICE_NUMBER: &str = "[=]!:uuid:1111";
    const ALICE_ENDPOINT: &str = "https://xdi.danubeclouds.com/[=]!:uuid:1111/";
    const ALICE_TOKEN: &str = "alice-s3cret";

    const BOB_NUMBER: &str = "[=]!:uuid:2222";
    const BOB_ENDPOINT: &str = "https://xdi.example.org/[=]!:uuid:2222/";
    const BOB_TOKEN: &str = "bob-s3cret";

    const APP_NUMBER: &str = "[+]!:uuid:9999";

    fn number(s: &str) -> CloudNumber {
        CloudNumber::parse(s).unwrap()
    }

    fn alice() -> CloudName {
        CloudName::parse("=alice").unwrap()
    }

    fn bob() -> CloudName {
        CloudName::parse("=bob").unwrap()
    }

    fn template() -> XdiAddress {
        XdiAddress::parse("+app{$do}").unwrap()
    }

    fn registry() -> InMemoryRegistry {
        InMemoryRegistry::new(vec![
            RegistryEntry::new(number(ALICE_NUMBER))
                .with_cloud_name(alice())
                .with_endpoint(Url::parse(ALICE_ENDPOINT).unwrap())
                .with_public_key(SIGNER_PUBLIC_KEY_PEM)
                .with_private_key(SIGNER_PRIVATE_KEY_PEM, ALICE_TOKEN),
            RegistryEntry::new(number(BOB_NUMBER))
                .with_cloud_name(bob())
                .with_endpoint(Url::parse(BOB_ENDPOINT).unwrap())
                .with_public_key(OTHER_PUBLIC_KEY_PEM)
                .with_private_key(OTHER_PRIVATE_KEY_PEM, BOB_TOKEN),
            // Registered but never published a key
            RegistryEntry::new(number(APP_NUMBER)),
        ])
    }

    /// Key retrieval that forwards to a registry and counts calls.
    #[derive(Clone)]
    struct RecordingKeys {
        inner: InMemoryRegistry,
        calls: Arc<Mutex<Vec<CloudNumber>>>,
    }

    impl RecordingKeys {
        fn new(inner: InMemoryRegistry) -> Self {
            Self {
                inner,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl KeyRetrievalClient for RecordingKeys {
        async fn retrieve_signature_private_key(
            &self,
            endpoint: &Url,
            cloud_number: &CloudNumber,
            secret_token: &str,
        ) -> Result<Option<String>, KeyRetrievalError> {
            self.calls.lock().unwrap().push(cloud_number.clone());
            self.inner
                .retrieve_signature_private_key(endpoint, cloud_number, secret_token)
                .await
        }
    }

    fn service() -> (ConnectService<InMemoryRegistry, RecordingKeys>, RecordingKeys) {
        let registry = registry();
        let keys = RecordingKeys::new(registry.clone());
        (ConnectService::new(registry, keys.clone()), keys)
    }

    /// Simulates the wire: serialize on one side, parse on the other.
    fn transmit(envelope: &MessageEnvelope) -> MessageEnvelope {
        MessageEnvelope::from_json(&envelope.to_json().unwrap()).unwrap()
    }

    // =========================================================================
    // REQUEST ROUND TRIP
    // =========================================================================

    #[tokio::test]
    async fn test_signed_request_verifies_at_peer() {
        let (service, keys) = service();
        let return_uri: ReturnUri = "https://app.example/connect/callback?state=42".parse().unwrap();

        let mut envelope =
            ConnectionRequest::build(&number(ALICE_NUMBER), &number(APP_NUMBER), &template());
        let mut request = ConnectionRequest::from_envelope(&mut envelope).unwrap();
        request.set_return_uri(&return_uri);
        request.set_short_flag(true);

        let report = service.sign(&mut request, &alice(), ALICE_TOKEN).await.unwrap();
        assert_eq!(report.signer, number(ALICE_NUMBER));
        assert_eq!(report.endpoint.as_str(), ALICE_ENDPOINT);
        assert_eq!(report.messages_signed, 1);
        assert_eq!(keys.call_count(), 1);

        let mut received = transmit(&envelope);
        let verification = service.verify(&received).await;
        assert!(verification.all_valid());
        assert_eq!(verification.messages[0].sender.as_str(), ALICE_NUMBER);

        // Parameters survive the wire
        let request = ConnectionRequest::from_envelope(&mut received).unwrap();
        assert_eq!(request.return_uri().unwrap(), Some(return_uri));
        assert_eq!(request.short_flag(), Some(true));
    }

    #[tokio::test]
    async fn test_parameter_tampering_breaks_signature() {
        let (service, _) = service();

        let mut envelope =
            ConnectionRequest::build(&number(ALICE_NUMBER), &number(APP_NUMBER), &template());
        let mut request = ConnectionRequest::from_envelope(&mut envelope).unwrap();
        request.set_return_uri(Url::parse("https://app.example/cb").unwrap());
        service.sign(&mut request, &alice(), ALICE_TOKEN).await.unwrap();

        let mut received = transmit(&envelope);
        ConnectionRequest::from_envelope(&mut received)
            .unwrap()
            .set_return_uri(Url::parse("https://evil.example/cb").unwrap());

        let verification = service.verify(&received).await;
        assert!(!verification.all_valid());
        assert!(matches!(
            verification.messages[0].outcome,
            VerificationOutcome::Invalid(_)
        ));
    }

    #[tokio::test]
    async fn test_resigning_after_parameter_change_restores_validity() {
        let (service, keys) = service();

        let mut envelope =
            ConnectionRequest::build(&number(ALICE_NUMBER), &number(APP_NUMBER), &template());
        let mut request = ConnectionRequest::from_envelope(&mut envelope).unwrap();
        service.sign(&mut request, &alice(), ALICE_TOKEN).await.unwrap();

        request.set_short_flag(false);
        assert!(!service.verify(request.envelope()).await.all_valid());

        service.sign(&mut request, &alice(), ALICE_TOKEN).await.unwrap();
        assert!(service.verify(&envelope).await.all_valid());
        assert_eq!(keys.call_count(), 2);
    }

    #[tokio::test]
    async fn test_multi_message_envelope_signed_as_a_whole() {
        let (service, _) = service();

        let mut envelope =
            ConnectionRequest::build(&number(ALICE_NUMBER), &number(APP_NUMBER), &template());
        envelope.push(Message::new(number(ALICE_NUMBER).address().clone()));
        envelope.push(Message::new(number(ALICE_NUMBER).address().clone()));

        let mut request = ConnectionRequest::from_envelope(&mut envelope).unwrap();
        request.set_short_flag(true);
        let report = service.sign(&mut request, &alice(), ALICE_TOKEN).await.unwrap();
        assert_eq!(report.messages_signed, 3);

        for message in envelope.messages() {
            assert_eq!(message.parameter(SHORT_PARAMETER), Some(&Literal::Boolean(true)));
            assert!(message.signature().is_some());
        }
        assert_eq!(service.verify(&envelope).await.valid_count(), 3);
    }

    #[tokio::test]
    async fn test_mixed_envelope_reports_each_message() {
        let (service, _) = service();

        let mut envelope =
            ConnectionRequest::build(&number(ALICE_NUMBER), &number(APP_NUMBER), &template());
        let mut request = ConnectionRequest::from_envelope(&mut envelope).unwrap();
        service.sign(&mut request, &alice(), ALICE_TOKEN).await.unwrap();

        // Appended after signing, so unsigned
        envelope.push(Message::new(number(BOB_NUMBER).address().clone()));
        // From an identity without a published key
        envelope.push(Message::new(number(APP_NUMBER).address().clone()));

        let verification = service.verify(&envelope).await;
        let outcomes: Vec<_> = verification
            .messages
            .iter()
            .map(|m| m.outcome.clone())
            .collect();

        assert_eq!(outcomes[0], VerificationOutcome::Valid);
        assert_eq!(outcomes[1], VerificationOutcome::Unsigned);
        assert_eq!(outcomes[2], VerificationOutcome::Unsigned);
        assert_eq!(verification.valid_count(), 1);
        assert!(!verification.all_valid());
    }

    #[tokio::test]
    async fn test_signing_as_someone_else_does_not_verify() {
        let (service, _) = service();

        // Alice's message signed with Bob's key
        let mut envelope =
            ConnectionRequest::build(&number(ALICE_NUMBER), &number(APP_NUMBER), &template());
        let mut request = ConnectionRequest::from_envelope(&mut envelope).unwrap();
        let report = service.sign(&mut request, &bob(), BOB_TOKEN).await.unwrap();
        assert_eq!(report.signer, number(BOB_NUMBER));

        let verification = service.verify(&envelope).await;
        assert!(matches!(
            verification.messages[0].outcome,
            VerificationOutcome::Invalid(_)
        ));
    }

    // =========================================================================
    // FAILURES
    // =========================================================================

    #[tokio::test]
    async fn test_wrong_token_leaves_envelope_untouched() {
        let (service, keys) = service();

        let mut envelope =
            ConnectionRequest::build(&number(ALICE_NUMBER), &number(APP_NUMBER), &template());
        let before = envelope.clone();
        let mut request = ConnectionRequest::from_envelope(&mut envelope).unwrap();

        let err = service
            .sign(&mut request, &alice(), BOB_TOKEN)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "key_retrieval_failed");
        assert_eq!(keys.call_count(), 1);
        assert_eq!(envelope, before);
    }

    #[tokio::test]
    async fn test_unknown_cloud_name_never_requests_a_key() {
        let (service, keys) = service();

        let mut envelope =
            ConnectionRequest::build(&number(ALICE_NUMBER), &number(APP_NUMBER), &template());
        let mut request = ConnectionRequest::from_envelope(&mut envelope).unwrap();

        let err = service
            .sign(&mut request, &CloudName::parse("=carol").unwrap(), ALICE_TOKEN)
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectError::DiscoveryFailed { ref name, .. } if name == "=carol"));
        assert_eq!(keys.call_count(), 0);
    }

    #[test]
    fn test_malformed_return_uri_from_wire() {
        let mut envelope =
            ConnectionRequest::build(&number(ALICE_NUMBER), &number(APP_NUMBER), &template());
        envelope.messages_mut()[0].set_parameter(
            XdiAddress::from_static(RETURN_URI_PARAMETER),
            Literal::from("not a uri"),
        );

        let mut received = transmit(&envelope);
        let request = ConnectionRequest::from_envelope(&mut received).unwrap();
        assert!(matches!(
            request.return_uri(),
            Err(ConnectError::MalformedUri { ref value, .. }) if value == "not a uri"
        ));
    }

    #[tokio::test]
    async fn test_relative_return_uri_signed_verbatim() {
        let (service, _) = service();
        let return_uri = ReturnUri::parse("/connect/callback?state=a%2Fb").unwrap();

        let mut envelope =
            ConnectionRequest::build(&number(ALICE_NUMBER), &number(APP_NUMBER), &template());
        let mut request = ConnectionRequest::from_envelope(&mut envelope).unwrap();
        request.set_return_uri(&return_uri);
        service.sign(&mut request, &alice(), ALICE_TOKEN).await.unwrap();

        let mut received = transmit(&envelope);
        assert!(service.verify(&received).await.all_valid());
        let request = ConnectionRequest::from_envelope(&mut received).unwrap();
        assert_eq!(request.return_uri().unwrap(), Some(return_uri));
    }

    // =========================================================================
    // CONNECTION RESULT
    // =========================================================================

    /// Graph the peer sends back once the connection is approved.
    fn approval_graph(requester: &str, peer: &str) -> Graph {
        Graph::parse(&format!(
            "/$is$ref/{peer}\n\
             ({peer}/{requester})$do/$get/{peer}<#email>\n\
             ({peer}/{requester})$do/$get/{peer}<#name>\n\
             {peer}<#name>/&/\"Alice\"\n\
             ({peer}/{requester})$do/$set/{peer}<#phone>\n\
             $public$do/$get/{peer}$public<$key>"
        ))
        .unwrap()
    }

    #[test]
    fn test_peer_result_after_wire() {
        let result = MessageResult::new(approval_graph(APP_NUMBER, ALICE_NUMBER));
        let received = MessageResult::from_json(&result.to_json().unwrap()).unwrap();

        let connection = ConnectionResult::from_result(&received).unwrap();
        assert_eq!(connection.cloud_number(), Some(number(ALICE_NUMBER)));

        let contracts: Vec<_> = connection.link_contracts().collect();
        assert_eq!(contracts.len(), 2);

        let granted = &contracts[0];
        let (authorizing, requesting) = granted.authorities().unwrap();
        assert_eq!(authorizing.as_str(), ALICE_NUMBER);
        assert_eq!(requesting.as_str(), APP_NUMBER);

        let readable: Vec<_> = granted
            .targets(Permission::Get)
            .map(XdiAddress::as_str)
            .collect();
        assert_eq!(
            readable,
            vec!["[=]!:uuid:1111<#email>", "[=]!:uuid:1111<#name>"]
        );
        assert_eq!(granted.targets(Permission::Set).count(), 1);

        assert_eq!(contracts[1].address().as_str(), "$public$do");
        assert!(contracts[1].authorities().is_none());
    }

    #[test]
    fn test_missing_result_is_rejected() {
        assert!(matches!(
            ConnectionResult::from_optional_result(None),
            Err(ConnectError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_provider_logo_for_signer_endpoint() {
        assert_ne!(
            csp_logo_for_endpoint(ALICE_ENDPOINT),
            csp_logo_for_endpoint(BOB_ENDPOINT)
        );
        assert_eq!(
            csp_logo_for_endpoint(BOB_ENDPOINT),
            xdi_connect::DEFAULT_CSP_LOGO
        );
    }
}
