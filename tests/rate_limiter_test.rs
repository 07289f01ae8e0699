use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use site_api::rate_limit::{RETENTION_MS, RateLimitPolicy, RateLimiter, now_millis};

#[test]
fn admitted_calls_never_exceed_quota_within_any_window() {
    let limiter = RateLimiter::new();
    let policy = RateLimitPolicy::new(1_000, 3);

    // bursty arrivals: clusters every 250ms plus a few stragglers
    let arrivals: Vec<i64> = (0..40)
        .map(|i| (i / 4) * 250 + (i % 4) * 7)
        .chain([2_990, 2_999, 3_000, 3_001])
        .collect();

    let mut admitted = Vec::new();
    for &t in &arrivals {
        if !limiter.check_at("burst", policy, t).limited {
            admitted.push(t);
        }
    }

    for &start in &admitted {
        let in_window = admitted
            .iter()
            .filter(|&&t| t >= start && t - start < policy.window_ms)
            .count();
        assert!(in_window <= policy.max_requests as usize, "window at {start} admitted {in_window}");
    }
    assert!(!admitted.is_empty());
}

#[test]
fn example_scenario_rejects_third_call() {
    let limiter = RateLimiter::new();
    let policy = RateLimitPolicy::new(60_000, 2);
    let results: Vec<bool> = [0, 10, 20]
        .into_iter()
        .map(|t| limiter.check_at("ip1", policy, t).limited)
        .collect();
    assert_eq!(results, vec![false, false, true]);
}

#[test]
fn timestamp_exactly_one_window_old_is_outside() {
    let limiter = RateLimiter::new();
    let policy = RateLimitPolicy::new(1_000, 1);
    assert!(!limiter.check_at("id", policy, 0).limited);
    assert!(!limiter.check_at("id", policy, 1_000).limited);
}

#[test]
fn identifiers_are_independent() {
    let limiter = RateLimiter::new();
    let policy = RateLimitPolicy::new(60_000, 1);
    assert!(!limiter.check_at("a", policy, 0).limited);
    assert!(limiter.check_at("a", policy, 1).limited);
    assert!(!limiter.check_at("b", policy, 1).limited);
}

#[test]
fn rejected_calls_do_not_extend_the_window() {
    let limiter = RateLimiter::new();
    let policy = RateLimitPolicy::new(100, 1);
    assert!(!limiter.check_at("id", policy, 0).limited);
    for t in 1..100 {
        assert!(limiter.check_at("id", policy, t).limited);
    }
    // only the admitted call at t=0 counted
    assert!(!limiter.check_at("id", policy, 100).limited);
}

#[test]
fn wall_clock_wrapper_admits_first_call() {
    let limiter = RateLimiter::new();
    assert!(!limiter.is_rate_limited("fresh", 60_000, 100));
    assert!(limiter.contains("fresh"));
}

#[test]
fn cleanup_removes_keys_once_every_timestamp_expires() {
    let limiter = RateLimiter::new();
    let policy = RateLimitPolicy::default();
    limiter.check_at("gone", policy, 0);
    limiter.check_at("gone", policy, 1_000);
    limiter.check_at("kept", policy, 0);
    limiter.check_at("kept", policy, 250_000);

    assert_eq!(limiter.cleanup_at(RETENTION_MS + 1_000), 1);
    assert!(!limiter.contains("gone"));
    assert!(limiter.contains("kept"));
    assert_eq!(limiter.tracked_identifiers(), 1);
}

#[test]
fn cleanup_horizon_ignores_caller_window() {
    let limiter = RateLimiter::new();
    // a 15 minute policy still loses its history after the 5 minute horizon
    let policy = RateLimitPolicy::per_minutes(15, 1);
    limiter.check_at("login", policy, 0);
    limiter.cleanup_at(RETENTION_MS);
    assert!(!limiter.contains("login"));
    assert!(!limiter.check_at("login", policy, RETENTION_MS).limited);
}

#[tokio::test]
async fn sweeper_evicts_stale_identifiers_until_stopped() {
    let limiter = Arc::new(RateLimiter::new());
    let long_ago = now_millis() - RETENTION_MS - 1_000;
    limiter.check_at("stale", RateLimitPolicy::default(), long_ago);

    assert!(limiter.start(Duration::from_millis(20)));
    assert!(!limiter.start(Duration::from_millis(20)));
    assert!(limiter.is_running());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!limiter.contains("stale"));

    limiter.stop();
    assert!(!limiter.is_running());

    limiter.check_at("stale", RateLimitPolicy::default(), long_ago);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(limiter.contains("stale"));
}

#[tokio::test]
async fn panicking_sweep_does_not_stop_the_timer() {
    let limiter = Arc::new(RateLimiter::new());
    let long_ago = now_millis() - RETENTION_MS - 1_000;
    limiter.check_at("stale", RateLimitPolicy::default(), long_ago);

    let sweeps = Arc::new(AtomicUsize::new(0));
    let counter = sweeps.clone();
    assert!(limiter.start_with(Duration::from_millis(20), move |limiter| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("sweep blew up");
        }
        limiter.cleanup()
    }));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(sweeps.load(Ordering::SeqCst) >= 2);
    assert!(limiter.is_running());
    assert!(!limiter.contains("stale"));
    limiter.stop();
}

#[tokio::test]
async fn dropping_the_limiter_ends_its_sweeper() {
    let limiter = Arc::new(RateLimiter::new());
    // owned by the sweeper task; released once the task is gone
    let marker = Arc::new(());
    let held = marker.clone();
    assert!(limiter.start_with(Duration::from_millis(10), move |limiter| {
        let _held = &held;
        limiter.cleanup()
    }));

    tokio::time::sleep(Duration::from_millis(50)).await;
    let weak = Arc::downgrade(&limiter);
    drop(limiter);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(weak.upgrade().is_none());
    assert_eq!(Arc::strong_count(&marker), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_quota() {
    let limiter = Arc::new(RateLimiter::new());
    let policy = RateLimitPolicy::new(60_000, 25);

    let tasks: Vec<_> = (0..100)
        .map(|_| {
            let limiter = limiter.clone();
            tokio::spawn(async move { !limiter.check("shared", policy).limited })
        })
        .collect();

    let mut admitted = 0;
    for task in tasks {
        if task.await.unwrap() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 25);
}
