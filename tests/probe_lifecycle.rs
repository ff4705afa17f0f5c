//! Probe lifecycle tests against the public library API.
//!
//! Time is simulated with `ManualClock`, so these run instantly.
//!
//! Run with: cargo test --test probe_lifecycle
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use kube_probe_lab::{ManualClock, Probe, ProbeManager, ProbeOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn manager(min: i64, max: i64, seed: u64) -> ProbeManager<ManualClock> {
    let options = ProbeOptions {
        min_delay_seconds: Some(min),
        max_delay_seconds: Some(max),
    };
    ProbeManager::with_rng(options, &mut StdRng::seed_from_u64(seed), ManualClock::new())
}

#[test]
fn probes_become_ready_at_their_own_delay() {
    let manager = manager(1, 30, 0xC0FFEE);

    for second in 0..=30 {
        for probe in Probe::ALL {
            let status = manager.status(probe);
            let delay = manager.delay(probe);
            assert_eq!(status.elapsed_seconds, second);
            assert_eq!(status.ready, second >= delay, "{probe} at {second}s");
            assert_eq!(status.remaining_seconds, delay.saturating_sub(second));
        }
        manager.clock().advance(Duration::from_secs(1));
    }
}

#[test]
fn every_probe_ready_after_max_delay() {
    for seed in 0..50 {
        let manager = manager(0, 20, seed);
        manager.clock().advance(Duration::from_secs(20));
        assert!(manager.statuses().iter().all(|s| s.ready && s.remaining_seconds == 0));
    }
}

#[test]
fn draws_are_independent_per_probe() {
    // With a wide range, some seed must give probes different delays
    let differs = (0..20).any(|seed| {
        let manager = manager(0, 1_000, seed);
        let first = manager.delay(Probe::Health);
        Probe::ALL.iter().any(|&p| manager.delay(p) != first)
    });
    assert!(differs);
}

#[test]
fn concurrent_readers_see_consistent_delays() {
    let manager = Arc::new(manager(5, 50, 99));
    let expected: Vec<u64> = Probe::ALL.iter().map(|&p| manager.delay(p)).collect();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                let mut previous = [false; 3];
                for _ in 0..1_000 {
                    for (i, status) in manager.statuses().iter().enumerate() {
                        assert!(status.ready || !previous[i]);
                        previous[i] = status.ready;
                    }
                }
                Probe::ALL.iter().map(|&p| manager.delay(p)).collect::<Vec<_>>()
            })
        })
        .collect();

    for step in 0..60 {
        manager.clock().advance(Duration::from_millis(500 + step));
    }

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn unknown_probe_name_is_rejected() {
    let manager = manager(0, 0, 1);
    assert!(manager.status_by_name("startupz").is_err());
    assert!(manager.status_by_name("").is_err());
    assert!(manager.status_by_name("readyz").unwrap().ready);
}
