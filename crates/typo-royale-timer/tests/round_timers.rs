//! Integration tests for the keyed round timers.
//!
//! Uses Tokio's paused clock so delays resolve deterministically: with
//! `start_paused = true`, the runtime auto-advances time whenever every
//! task is idle, and `tokio::time::advance` moves it explicitly.

use std::time::Duration;

use tokio::sync::mpsc::error::TryRecvError;
use typo_royale_timer::RoundTimers;

type Key = (String, u32);

fn key(room: &str, round: u32) -> Key {
    (room.to_string(), round)
}

const DELAY: Duration = Duration::from_secs(3);

// =========================================================================
// Scheduling
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_fires_after_delay() {
    let (mut timers, mut rx) = RoundTimers::<Key>::new();
    assert!(timers.schedule(key("R1", 1), DELAY));
    assert!(timers.is_pending(&key("R1", 1)));

    let fired = rx.recv().await.expect("timer should fire");
    assert_eq!(fired.key, key("R1", 1));
    assert_eq!(timers.claim(fired), Some(key("R1", 1)));
    assert!(timers.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_does_not_fire_early() {
    let (mut timers, mut rx) = RoundTimers::<Key>::new();
    timers.schedule(key("R1", 1), DELAY);

    tokio::time::advance(Duration::from_millis(2_900)).await;
    tokio::task::yield_now().await;
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    tokio::time::advance(Duration::from_millis(200)).await;
    let fired = rx.recv().await.expect("timer should fire");
    assert_eq!(fired.key, key("R1", 1));
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_schedule_is_rejected() {
    let (mut timers, mut rx) = RoundTimers::<Key>::new();
    assert!(timers.schedule(key("R1", 1), DELAY));
    assert!(!timers.schedule(key("R1", 1), DELAY));
    assert_eq!(timers.len(), 1);

    let fired = rx.recv().await.unwrap();
    assert!(timers.claim(fired).is_some());

    // Exactly one notice for the key.
    let second = tokio::time::timeout(Duration::from_secs(10), rx.recv()).await;
    assert!(second.is_err(), "only one notice should be sent");
}

#[tokio::test(start_paused = true)]
async fn test_independent_keys_fire_independently() {
    let (mut timers, mut rx) = RoundTimers::<Key>::new();
    timers.schedule(key("R1", 1), Duration::from_secs(1));
    timers.schedule(key("R2", 1), Duration::from_secs(2));

    let first = rx.recv().await.unwrap();
    assert_eq!(timers.claim(first), Some(key("R1", 1)));
    let second = rx.recv().await.unwrap();
    assert_eq!(timers.claim(second), Some(key("R2", 1)));
}

// =========================================================================
// Cancellation
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_cancel_prevents_fire() {
    let (mut timers, mut rx) = RoundTimers::<Key>::new();
    timers.schedule(key("R1", 1), DELAY);
    assert!(timers.cancel(&key("R1", 1)));
    assert!(!timers.cancel(&key("R1", 1)), "second cancel is a no-op");

    let result = tokio::time::timeout(Duration::from_secs(10), rx.recv()).await;
    assert!(result.is_err(), "cancelled timer must not fire");
}

#[tokio::test(start_paused = true)]
async fn test_cancel_where_cancels_one_room() {
    let (mut timers, mut rx) = RoundTimers::<Key>::new();
    timers.schedule(key("R1", 1), DELAY);
    timers.schedule(key("R1", 2), DELAY);
    timers.schedule(key("R2", 1), DELAY);

    let cancelled = timers.cancel_where(|(room, _)| room == "R1");
    assert_eq!(cancelled, 2);
    assert_eq!(timers.len(), 1);

    let fired = rx.recv().await.unwrap();
    assert_eq!(timers.claim(fired), Some(key("R2", 1)));
}

#[tokio::test(start_paused = true)]
async fn test_notice_in_flight_is_stale_after_cancel() {
    let (mut timers, mut rx) = RoundTimers::<Key>::new();
    timers.schedule(key("R1", 1), DELAY);

    // Let the timer fire, but cancel before the owner claims it.
    let fired = rx.recv().await.unwrap();
    timers.cancel(&key("R1", 1));
    assert_eq!(timers.claim(fired), None);
}

#[tokio::test(start_paused = true)]
async fn test_notice_in_flight_is_stale_after_reschedule() {
    let (mut timers, mut rx) = RoundTimers::<Key>::new();
    timers.schedule(key("R1", 1), DELAY);
    let old = rx.recv().await.unwrap();

    // Same key rescheduled (e.g. the game restarted at round 1).
    timers.cancel(&key("R1", 1));
    timers.schedule(key("R1", 1), DELAY);
    assert_eq!(timers.claim(old), None);
    assert!(timers.is_pending(&key("R1", 1)));

    let fresh = rx.recv().await.unwrap();
    assert_eq!(timers.claim(fresh), Some(key("R1", 1)));
}

#[tokio::test(start_paused = true)]
async fn test_drop_aborts_pending_tasks() {
    let (mut timers, mut rx) = RoundTimers::<Key>::new();
    timers.schedule(key("R1", 1), DELAY);
    drop(timers);

    // Channel closes once the aborted task drops its sender.
    let result = tokio::time::timeout(Duration::from_secs(10), rx.recv()).await;
    assert!(matches!(result, Ok(None)));
}
