mod utils;
use utils::*;

use mock_service::MockConfig;
use shopload::prelude::*;
use std::num::NonZeroU32;
use std::time::Duration;

#[tokio::test]
async fn combined_profile_runs_clean() {
    init();
    let host = mock(MockConfig::default()).await;

    let stats = Runner::new(quick(host, ProfileKind::Combined))
        .unwrap()
        .run()
        .await
        .unwrap();

    println!("{stats}");
    assert_eq!(stats.users, 4);
    assert!(stats.requests > 20, "{}", stats.requests);
    assert_eq!(stats.failures, 0);
    assert_eq!(stats.task_errors, 0);
    assert!(stats
        .endpoint("GET /api/payment-service/actuator/health")
        .is_some());
}

#[tokio::test]
async fn request_metrics_are_recorded() {
    let metrics = init();
    let host = mock(MockConfig::default()).await;

    Runner::new(quick(host, ProfileKind::Favourite).users(1))
        .unwrap()
        .run()
        .await
        .unwrap();

    let rendered = metrics.render();
    assert!(rendered.contains("shopload_request_success"), "{rendered}");
    assert!(rendered.contains("shopload_users"), "{rendered}");
}

#[tokio::test]
async fn combined_workflows_follow_created_records() {
    init();
    let host = mock(MockConfig::default()).await;
    let config = quick(host, ProfileKind::Combined).duration(Duration::from_secs(3));

    let stats = Runner::new(config).unwrap().run().await.unwrap();

    let created = stats
        .endpoint("POST /api/payment-service/payments")
        .map(|e| e.requests)
        .unwrap_or_default();
    let followed = stats
        .endpoint("GET /api/payment-service/payments/{id}")
        .map(|e| e.requests)
        .unwrap_or_default();
    // Users stopped between a create and its follow-up leave at most one
    // unanswered create each.
    assert!(created > 0);
    assert!(followed <= created && created - followed <= 4, "{created} {followed}");
}

#[tokio::test]
async fn service_profiles_create_without_failures() {
    init();

    for (kind, create, health) in [
        (ProfileKind::Payment, "POST /payments", "GET /actuator/health"),
        (ProfileKind::Order, "POST /orders", "GET /actuator/health"),
        (ProfileKind::Favourite, "POST /favourites", "GET /actuator/health"),
    ] {
        let host = mock(MockConfig::default()).await;
        let stats = Runner::new(quick(host, kind).duration(Duration::from_secs(3)))
            .unwrap()
            .run()
            .await
            .unwrap();

        println!("{stats}");
        assert!(stats.requests > 0, "{kind}");
        assert_eq!(stats.task_errors, 0, "{kind}");
        for name in [create, health] {
            if let Some(endpoint) = stats.endpoint(name) {
                assert_eq!(endpoint.failures, 0, "{kind} {name}");
            }
        }
    }
}

#[tokio::test]
async fn unreachable_host_counts_failures() {
    init();
    let host = "http://127.0.0.1:9".parse().unwrap();
    let config = quick(host, ProfileKind::Order)
        .users(1)
        .timeout(Duration::from_millis(200));

    let stats = Runner::new(config).unwrap().run().await.unwrap();

    assert!(stats.requests > 0);
    assert_eq!(stats.failures, stats.requests);
    assert_eq!(stats.task_errors, 0);
}

#[tokio::test]
async fn rate_limited_service_reports_429s() {
    init();
    let host = mock(MockConfig {
        max_rps: NonZeroU32::new(5),
    })
    .await;
    let config = quick(host, ProfileKind::Combined)
        .users(8)
        .wait(WaitTime::none());

    let stats = Runner::new(config).unwrap().run().await.unwrap();

    assert!(stats.failures > 0);
    assert!(stats.error_rate > 0.5, "{}", stats.error_rate);
}

#[tokio::test]
async fn client_side_cap_keeps_under_service_limit() {
    init();
    let host = mock(MockConfig {
        max_rps: NonZeroU32::new(50),
    })
    .await;
    let config = quick(host, ProfileKind::Combined)
        .users(8)
        .wait(WaitTime::none())
        .max_rps(NonZeroU32::new(20).unwrap());

    let stats = Runner::new(config).unwrap().run().await.unwrap();

    assert!(stats.requests > 10);
    assert!(stats.rps < 30., "{}", stats.rps);
    assert_eq!(stats.failures, 0);
}
