//! # Resolution Flow Tests
//!
//! Drives `SessionResolver` end to end against scripted providers and
//! checks every settlement path under a paused clock:
//!
//! 1. **Fresh sessions**: settle immediately, wait config ignored
//! 2. **Resumed sessions**: corroborating update, expiry fallback, and
//!    stream-close fallback
//! 3. **Handshake failures**: error carries the provider for disposal

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    use wallet_session::testing::MockSessionProvider;
    use wallet_session::{
        ChainId, ProviderError, ResolveError, ResolverConfig, SessionEvent, SessionEventKind,
        SessionResolver, SessionUpdateParams,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Session update event carrying one account and a chain id.
    fn update_event(account: &str, chain: u64) -> SessionEvent {
        SessionEvent::update(vec![SessionUpdateParams::new(account, ChainId::new(chain))])
    }

    /// Resolver over the given provider, keeping the provider reachable
    /// for event injection.
    fn resolver_for(provider: MockSessionProvider) -> (Arc<MockSessionProvider>, SessionResolver) {
        let provider = Arc::new(provider);
        let resolver = SessionResolver::with_defaults(provider.clone());
        (provider, resolver)
    }

    /// Config with a custom corroboration wait.
    fn config_waiting(millis: u64) -> ResolverConfig {
        ResolverConfig {
            wait_for_initial_update: Duration::from_millis(millis),
            ..ResolverConfig::default()
        }
    }

    // =============================================================================
    // FRESH SESSIONS
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_fresh_session_settles_immediately_on_approved_identity() {
        let (_provider, resolver) = resolver_for(MockSessionProvider::fresh(&["0xAbC123"], 1));

        let started = Instant::now();
        let resolved = resolver.resolve().await.expect("fresh session must resolve");

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(resolved.address.unwrap().as_str(), "0xabc123");
        assert_eq!(resolved.chain_id, Some(ChainId::new(1)));
        assert_eq!(resolved.connection.chain_id(), Some(ChainId::new(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_session_ignores_the_corroboration_wait() {
        let provider = Arc::new(MockSessionProvider::fresh(&["0xAbC123"], 1));
        let resolver = SessionResolver::new(provider, config_waiting(10_000));

        let started = Instant::now();
        let resolved = resolver.resolve().await.expect("must not wait");

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(resolved.address.unwrap().as_str(), "0xabc123");
    }

    // =============================================================================
    // RESUMED SESSIONS
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_resumed_session_with_zero_wait_settles_on_cached_identity() {
        let provider = Arc::new(MockSessionProvider::resumed(&["0xCaFe"], 3));
        let resolver = SessionResolver::new(provider, config_waiting(0));

        let started = Instant::now();
        let resolved = resolver.resolve().await.expect("zero wait must resolve");

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(resolved.address.unwrap().as_str(), "0xcafe");
        assert_eq!(resolved.chain_id, Some(ChainId::new(3)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_corroborating_update_settles_resumed_session() {
        let (provider, resolver) = resolver_for(MockSessionProvider::resumed(&["0xAbC"], 1));
        let handle = provider.handle();

        let injector = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            handle.inject(update_event("0xDeF456", 4))
        });

        let started = Instant::now();
        let resolved = resolver.resolve().await.expect("update must settle");

        assert_eq!(started.elapsed(), Duration::from_millis(200));
        assert_eq!(resolved.address.unwrap().as_str(), "0xdef456");
        assert_eq!(resolved.chain_id, Some(ChainId::new(4)));
        assert_eq!(resolved.connection.chain_id(), Some(ChainId::new(4)));

        let delivered = injector.await.expect("injector must finish");
        assert_eq!(delivered, 1, "resolver should have been subscribed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_resumed_session_times_out_to_cached_identity() {
        let (provider, resolver) = resolver_for(MockSessionProvider::resumed(&["0xAbC"], 1));

        let started = Instant::now();
        let resolved = resolver.resolve().await.expect("timeout must resolve");

        assert_eq!(started.elapsed(), Duration::from_millis(1000));
        assert_eq!(resolved.address.unwrap().as_str(), "0xabc");
        assert_eq!(resolved.chain_id, Some(ChainId::new(1)));

        // A late update is not a second settlement; it surfaces as change
        // notifications instead.
        let mut events = resolved.connection.subscribe();
        provider.handle().inject(update_event("0xDeF", 4));

        let first = tokio::time::timeout(Duration::from_millis(100), events.recv())
            .await
            .expect("notification must arrive")
            .expect("channel must be open");
        assert!(
            matches!(first, wallet_session::ProviderEvent::AccountsChanged(_)),
            "late update should diff, got {first:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_wait_is_honored() {
        let provider = Arc::new(MockSessionProvider::resumed(&["0xAbC"], 1));
        let resolver = SessionResolver::new(provider, config_waiting(1500));

        let started = Instant::now();
        resolver.resolve().await.expect("must resolve at expiry");
        assert_eq!(started.elapsed(), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_update_events_do_not_settle_the_wait() {
        let (provider, resolver) = resolver_for(MockSessionProvider::resumed(&["0xAbC"], 1));
        let handle = provider.handle();

        let injector = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            handle.inject(SessionEvent::of_kind(SessionEventKind::Disconnect));
            tokio::time::sleep(Duration::from_millis(100)).await;
            handle.inject(SessionEvent::of_kind(SessionEventKind::CallRequest));
            tokio::time::sleep(Duration::from_millis(200)).await;
            handle.inject(update_event("0xDeF", 4));
        });

        let started = Instant::now();
        let resolved = resolver.resolve().await.expect("must resolve");

        assert_eq!(started.elapsed(), Duration::from_millis(400));
        assert_eq!(resolved.address.unwrap().as_str(), "0xdef");
        injector.await.expect("injector must finish");
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_without_identity_fields_settles_on_nulls() {
        let (provider, resolver) = resolver_for(MockSessionProvider::resumed(&["0xAbC"], 1));
        let handle = provider.handle();

        let injector = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            handle.inject(SessionEvent::update(vec![]))
        });

        let resolved = resolver.resolve().await.expect("must resolve");

        assert_eq!(resolved.address, None);
        assert_eq!(resolved.chain_id, None);
        assert_eq!(resolved.connection.chain_id(), None);
        injector.await.expect("injector must finish");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_closing_during_wait_falls_back_to_cached_identity() {
        let (provider, resolver) = resolver_for(MockSessionProvider::resumed(&["0xAbC"], 1));
        let handle = provider.handle();

        let closer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            handle.close();
        });

        let started = Instant::now();
        let resolved = resolver.resolve().await.expect("close must not hang");

        // Settles as soon as the stream ends, not at wait expiry.
        assert_eq!(started.elapsed(), Duration::from_millis(300));
        assert_eq!(resolved.address.unwrap().as_str(), "0xabc");
        closer.await.expect("closer must finish");
    }

    // =============================================================================
    // HANDSHAKE FAILURES
    // =============================================================================

    #[tokio::test]
    async fn test_handshake_failure_surfaces_provider_for_disposal() {
        let (provider, resolver) = resolver_for(
            MockSessionProvider::failing(ProviderError::HandshakeRejected(
                "user declined".to_string(),
            ))
            .with_transport_connected(true),
        );

        let error = resolver.resolve().await.expect_err("handshake must fail");

        match &error {
            ResolveError::Handshake { source, provider } => {
                assert_eq!(
                    source,
                    &ProviderError::HandshakeRejected("user declined".to_string())
                );
                assert!(!provider.transport_connected(), "cleanup should run");
            }
            other => panic!("expected handshake error, got {other:?}"),
        }
        assert_eq!(provider.kill_session_calls(), 1);
    }

    #[tokio::test]
    async fn test_resumed_handshake_failure_follows_the_same_path() {
        let provider = Arc::new(
            MockSessionProvider::failing(ProviderError::Transport("bridge down".to_string()))
                .with_transport_connected(false),
        );
        let resolver = SessionResolver::new(provider.clone(), config_waiting(1000));

        let error = resolver.resolve().await.expect_err("handshake must fail");
        assert!(error.provider().is_some());
        assert_eq!(provider.kill_session_calls(), 0, "no transport to clean");
    }
}
