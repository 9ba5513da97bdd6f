// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Behavioural tests for the rate limiter over an in-memory store.

use std::sync::Arc;

use chrono::Duration;
use proptest::prelude::*;
use vocalis_core::{Clock, ManualClock};
use vocalis_ratelimit::{RateLimitPolicy, RateLimiter};
use vocalis_store::MemoryKvStore;

fn limiter_with(policy: RateLimitPolicy) -> (RateLimiter, ManualClock) {
    let clock = ManualClock::starting_now();
    let store = Arc::new(MemoryKvStore::new(Arc::new(clock.clone())));
    (
        RateLimiter::new(store, Arc::new(clock.clone()), policy),
        clock,
    )
}

#[tokio::test]
async fn ip_1_block_and_recovery_scenario() {
    let (limiter, clock) = limiter_with(RateLimitPolicy::default());

    // Ten requests within five seconds are all allowed.
    for i in 0..10 {
        let result = limiter.check("ip-1").await.unwrap();
        assert!(result.allowed, "request {} should be allowed", i + 1);
        assert_eq!(result.remaining, 9 - i);
        clock.advance(Duration::milliseconds(500));
    }

    // The 11th in the same minute is rejected and installs a one-hour block.
    let blocked_at = clock.now();
    let eleventh = limiter.check("ip-1").await.unwrap();
    assert!(!eleventh.allowed);
    assert_eq!(eleventh.remaining, 0);
    assert_eq!(eleventh.reset_time, blocked_at + Duration::hours(1));
    assert!(eleventh.reason.is_some());

    // 30 seconds later the block still holds.
    clock.advance_secs(30);
    let twelfth = limiter.check("ip-1").await.unwrap();
    assert!(!twelfth.allowed);
    assert_eq!(twelfth.remaining, 0);
    assert_eq!(twelfth.reset_time, blocked_at + Duration::hours(1));

    // One hour and one second after the block: fresh window.
    clock.set(blocked_at + Duration::hours(1) + Duration::seconds(1));
    let thirteenth = limiter.check("ip-1").await.unwrap();
    assert!(thirteenth.allowed);
    assert_eq!(thirteenth.remaining, 9);

    let stats = limiter.stats();
    assert_eq!(stats.checks, 13);
    assert_eq!(stats.allowed, 11);
    assert_eq!(stats.rejected, 2);
    assert_eq!(stats.blocks_installed, 1);
}

#[tokio::test]
async fn identifiers_are_independent() {
    let (limiter, _) = limiter_with(RateLimitPolicy::default());
    for _ in 0..11 {
        limiter.check("ip-1").await.unwrap();
    }
    assert!(!limiter.check("ip-1").await.unwrap().allowed);
    assert!(limiter.check("ip-2").await.unwrap().allowed);
}

#[tokio::test]
async fn windows_are_request_triggered() {
    let (limiter, clock) = limiter_with(RateLimitPolicy::default());

    let first = limiter.check("ip-1").await.unwrap();
    let started = first.reset_time - Duration::minutes(1);

    // The window runs a full minute from the first request, not to a wall-clock boundary.
    clock.advance_secs(59);
    for _ in 0..9 {
        assert!(limiter.check("ip-1").await.unwrap().allowed);
    }
    clock.set(started + Duration::minutes(1));
    let rolled = limiter.check("ip-1").await.unwrap();
    assert!(rolled.allowed);
    assert_eq!(rolled.remaining, 9);
    assert_eq!(rolled.reset_time, started + Duration::minutes(2));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// For any minute cap, the request after the cap is rejected and blocked
    /// for exactly the configured penalty; every request in the block is rejected.
    #[test]
    fn minute_overflow_always_blocks(
        minute_limit in 1u32..25,
        step_ms in 0i64..(60_000 / 26),
        probes in proptest::collection::vec(0i64..3_600_000, 1..8),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let policy = RateLimitPolicy {
                minute_limit,
                hour_limit: 1000,
                ..RateLimitPolicy::default()
            };
            let (limiter, clock) = limiter_with(policy);

            for _ in 0..minute_limit {
                prop_assert!(limiter.check("id").await.unwrap().allowed);
                clock.advance(Duration::milliseconds(step_ms));
            }

            let blocked_at = clock.now();
            let overflow = limiter.check("id").await.unwrap();
            prop_assert!(!overflow.allowed);
            prop_assert_eq!(overflow.reset_time, blocked_at + Duration::hours(1));

            let mut probes = probes;
            probes.sort_unstable();
            for offset in probes {
                clock.set(blocked_at + Duration::milliseconds(offset));
                let result = limiter.check("id").await.unwrap();
                prop_assert!(!result.allowed);
                prop_assert_eq!(result.remaining, 0);
            }

            clock.set(blocked_at + Duration::hours(1));
            prop_assert!(limiter.check("id").await.unwrap().allowed);
            Ok(())
        })?;
    }
}
