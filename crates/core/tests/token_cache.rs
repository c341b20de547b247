//! Token cache behaviour under concurrent callers

mod support;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use support::{admin_cache, Call, ScriptedRemote};
use vocalis_common::testing::MockClock;
use vocalis_core::{TokenCache, TokenRequest};
use vocalis_domain::{ConsumerCredentials, VocalisError};

#[tokio::test(start_paused = true)]
async fn concurrent_callers_share_one_renewal() {
    let remote = Arc::new(ScriptedRemote::new().with_token_delay(Duration::from_millis(50)));
    let clock = MockClock::new();
    let cache = admin_cache(&remote, &clock);

    let tokens = join_all((0..16).map(|_| {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.get_token().await })
    }))
    .await;

    let values: Vec<String> =
        tokens.into_iter().map(|joined| joined.unwrap().unwrap().value().to_string()).collect();
    assert_eq!(remote.renewals(), 1);
    assert!(values.iter().all(|v| v == "admin-1"));
}

#[tokio::test(start_paused = true)]
async fn concurrent_callers_on_stale_cache_renew_once() {
    let remote = Arc::new(ScriptedRemote::new().with_token_delay(Duration::from_millis(20)));
    let clock = MockClock::new();
    let cache = admin_cache(&remote, &clock);

    let first = cache.get_token().await.unwrap();
    clock.advance(cache.ttl());

    let tokens = join_all((0..8).map(|_| cache.get_token())).await;

    assert_eq!(remote.renewals(), 2);
    for token in tokens {
        let token = token.unwrap();
        assert_ne!(token.value(), first.value());
        assert_eq!(token.value(), "admin-2");
    }
}

#[tokio::test]
async fn token_reused_until_ttl_elapses() {
    let remote = Arc::new(ScriptedRemote::new());
    let clock = MockClock::new();
    let cache = admin_cache(&remote, &clock);

    let first = cache.get_token().await.unwrap();
    clock.advance(Duration::from_secs(3499));
    let second = cache.get_token().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(remote.renewals(), 1);

    clock.advance(Duration::from_secs(1));
    assert!(!cache.is_valid(&first));
    let third = cache.get_token().await.unwrap();
    assert_eq!(third.value(), "admin-2");
    assert_eq!(remote.renewals(), 2);
}

#[tokio::test]
async fn failed_renewal_is_auth_error_and_not_cached() {
    let remote = Arc::new(ScriptedRemote::new().with_token_status(401));
    let clock = MockClock::new();
    let cache = admin_cache(&remote, &clock);

    assert!(matches!(cache.get_token().await, Err(VocalisError::Auth(_))));
    assert!(matches!(cache.get_token().await, Err(VocalisError::Auth(_))));
    assert_eq!(remote.renewals(), 2);
}

#[tokio::test(start_paused = true)]
async fn concurrent_callers_share_one_failed_renewal() {
    let remote = Arc::new(
        ScriptedRemote::new()
            .with_token_status(401)
            .with_token_delay(Duration::from_millis(20)),
    );
    let clock = MockClock::new();
    let cache = admin_cache(&remote, &clock);

    let results = join_all((0..8).map(|_| cache.get_token())).await;

    assert_eq!(remote.renewals(), 1);
    assert_eq!(results.len(), 8);
    for result in &results {
        assert!(matches!(result, Err(VocalisError::Auth(_))));
    }

    // the failure is not cached for callers that arrive afterwards
    assert!(matches!(cache.get_token().await, Err(VocalisError::Auth(_))));
    assert_eq!(remote.renewals(), 2);
}

#[tokio::test]
async fn invalidate_forces_renewal() {
    let remote = Arc::new(ScriptedRemote::new());
    let clock = MockClock::new();
    let cache = admin_cache(&remote, &clock);

    cache.get_token().await.unwrap();
    cache.invalidate().await;
    assert_eq!(cache.get_token().await.unwrap().value(), "admin-2");
}

#[tokio::test]
async fn consumer_scope_authenticates_with_admin_token() {
    let remote = Arc::new(ScriptedRemote::new());
    let clock = MockClock::new();
    let admin = admin_cache(&remote, &clock);
    let consumer = TokenCache::consumer(
        remote.clone(),
        Arc::clone(&admin),
        ConsumerCredentials::new("theo", "walcott"),
        Duration::from_secs(600),
    )
    .with_clock(Arc::new(clock.clone()));

    let token = consumer.get_token().await.unwrap();
    assert_eq!(token.value(), "consumer-2");

    let calls = remote.calls();
    assert_eq!(calls[0], Call::RenewToken(TokenRequest::ClientCredentials));
    match &calls[1] {
        Call::RenewToken(TokenRequest::Consumer { credentials, admin }) => {
            assert_eq!(credentials.username, "theo");
            assert_eq!(admin.bearer, "admin-1");
        }
        other => panic!("unexpected call {other:?}"),
    }

    // both scopes are cached independently
    consumer.get_token().await.unwrap();
    admin.get_token().await.unwrap();
    assert_eq!(remote.renewals(), 2);
}
