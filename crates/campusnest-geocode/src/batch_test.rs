use std::time::Duration;

use super::*;
use crate::testing::{found, Reply, ScriptedGeocoder};

fn resolver(geocoder: Arc<ScriptedGeocoder>, interval_ms: u64) -> BatchResolver {
    BatchResolver::new(
        geocoder,
        Arc::new(RateLimiter::new(Duration::from_millis(interval_ms))),
    )
}

#[tokio::test(start_paused = true)]
async fn edmonton_scenario_keeps_only_resolved_address() {
    let geocoder = Arc::new(
        ScriptedGeocoder::new()
            .on(
                "123 Main St, Edmonton",
                found(53.5461, -113.4938, "123 Main St, Edmonton, AB"),
            )
            .on("invalid-address-xyz", Reply::Empty),
    );
    let result = resolver(Arc::clone(&geocoder), 1100)
        .resolve_all(&["123 Main St, Edmonton", "invalid-address-xyz"])
        .await;

    assert_eq!(result.len(), 1);
    let hit = result.get("123 Main St, Edmonton").expect("first address resolves");
    assert!((hit.latitude - 53.5461).abs() < 1e-9);
    assert!((hit.longitude + 113.4938).abs() < 1e-9);
    assert_eq!(hit.display_name, "123 Main St, Edmonton, AB");
    assert!(!result.contains("invalid-address-xyz"));
    assert_eq!(geocoder.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn requests_are_spaced_by_interval_in_input_order() {
    let geocoder = Arc::new(
        ScriptedGeocoder::new()
            .on("a", found(1.0, 1.0, "A"))
            .on("b", found(2.0, 2.0, "B"))
            .on("c", found(3.0, 3.0, "C")),
    );
    let start = tokio::time::Instant::now();
    resolver(Arc::clone(&geocoder), 1100)
        .resolve_all(&["a", "b", "c"])
        .await;

    let calls = geocoder.calls();
    let order: Vec<&str> = calls.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(order, ["a", "b", "c"]);
    assert_eq!(calls[0].1, start, "first request must not wait");
    for pair in calls.windows(2) {
        assert!(pair[1].1 - pair[0].1 >= Duration::from_millis(1100));
    }
    assert!(start.elapsed() >= Duration::from_millis(2 * 1100));
}

#[tokio::test(start_paused = true)]
async fn explicit_interval_is_honoured() {
    let geocoder = Arc::new(ScriptedGeocoder::new());
    resolver(Arc::clone(&geocoder), 1100)
        .resolve_all_with_interval(&["a", "b"], Duration::from_millis(250))
        .await;
    let calls = geocoder.calls();
    assert_eq!(calls[1].1 - calls[0].1, Duration::from_millis(250));
}

#[tokio::test(start_paused = true)]
async fn failures_do_not_abort_the_batch() {
    let geocoder = Arc::new(
        ScriptedGeocoder::new()
            .on("a", Reply::Fail)
            .on("b", found(2.0, 2.0, "B")),
    );
    let result = resolver(Arc::clone(&geocoder), 10)
        .resolve_all(&["a", "b"])
        .await;
    assert_eq!(result.len(), 1);
    assert!(result.contains("b"));
}

#[tokio::test(start_paused = true)]
async fn result_size_matches_individual_successes() {
    let script = || {
        ScriptedGeocoder::new()
            .on("a", found(1.0, 1.0, "A"))
            .on("b", Reply::Fail)
            .on("c", Reply::Empty)
            .on("d", found(4.0, 4.0, "D"))
    };
    let addresses = ["a", "b", "c", "d"];

    let batch = resolver(Arc::new(script()), 10).resolve_all(&addresses).await;

    let single = Arc::new(script());
    let mut individually = 0;
    for address in addresses {
        if single.geocode_address(address).await.is_some() {
            individually += 1;
        }
    }

    assert!(batch.len() <= addresses.len());
    assert_eq!(batch.len(), individually);
}

#[tokio::test(start_paused = true)]
async fn duplicate_addresses_resolve_independently_last_wins() {
    let geocoder = Arc::new(
        ScriptedGeocoder::new()
            .on("Main St", found(1.0, 1.0, "first"))
            .on("Main St", found(2.0, 2.0, "second")),
    );
    let result = resolver(Arc::clone(&geocoder), 10)
        .resolve_all(&["Main St", "Main St"])
        .await;
    assert_eq!(geocoder.calls().len(), 2);
    assert_eq!(result.len(), 1);
    assert_eq!(result.get("Main St").unwrap().display_name, "second");
}

#[tokio::test(start_paused = true)]
async fn keys_preserve_untrimmed_input() {
    let geocoder = Arc::new(ScriptedGeocoder::new().on("Main St", found(1.0, 1.0, "M")));
    let result = resolver(Arc::clone(&geocoder), 10)
        .resolve_all(&["  Main St  "])
        .await;
    assert!(result.contains("  Main St  "));
    assert_eq!(geocoder.calls()[0].0, "Main St");
}

#[tokio::test(start_paused = true)]
async fn blank_addresses_are_reported_without_a_request() {
    let geocoder = Arc::new(ScriptedGeocoder::new());
    let report = resolver(Arc::clone(&geocoder), 10)
        .resolve_all_detailed(&["   ", "x"], Duration::from_millis(10))
        .await;
    assert_eq!(geocoder.calls().len(), 1);
    assert!(matches!(
        report.failures[0].reason,
        FailureReason::Invalid(_)
    ));
    assert_eq!(report.failures[1].reason, FailureReason::NotFound);
}

#[tokio::test(start_paused = true)]
async fn detailed_report_distinguishes_not_found_from_failure() {
    let geocoder = Arc::new(
        ScriptedGeocoder::new()
            .on("gone", Reply::Empty)
            .on("down", Reply::Fail),
    );
    let report = resolver(geocoder, 10)
        .resolve_all_detailed(&["gone", "down"], Duration::from_millis(10))
        .await;
    assert!(report.resolved.is_empty());
    assert_eq!(report.failures[0].reason, FailureReason::NotFound);
    assert!(matches!(report.failures[1].reason, FailureReason::Failed(_)));
}

#[tokio::test(start_paused = true)]
async fn shared_limiter_paces_first_request_after_other_traffic() {
    let limiter = Arc::new(RateLimiter::new(Duration::from_millis(1100)));
    let geocoder = Arc::new(ScriptedGeocoder::new());
    let start = limiter.await_slot().await;

    BatchResolver::new(Arc::clone(&geocoder) as Arc<dyn Geocoder>, Arc::clone(&limiter))
        .resolve_all(&["a"])
        .await;

    assert!(geocoder.calls()[0].1 - start >= Duration::from_millis(1100));
}

#[tokio::test]
async fn empty_input_yields_empty_result() {
    let geocoder = Arc::new(ScriptedGeocoder::new());
    let empty: [&str; 0] = [];
    let result = resolver(Arc::clone(&geocoder), 10).resolve_all(&empty).await;
    assert!(result.is_empty());
    assert!(geocoder.calls().is_empty());
}
