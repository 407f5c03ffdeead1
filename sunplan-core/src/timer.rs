//! Countdown timer for an exposure session.
//!
//! The timer owns no thread: the caller drives it with [`ExposureTimer::tick`]
//! (the CLI does so once a second) and the remaining time is always derived
//! from the start instant, so missed ticks never drift.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Snapshots older than this are discarded on restore.
pub const SNAPSHOT_MAX_AGE_HOURS: i64 = 24;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    Ready,
    Running,
    Paused,
    Complete,
}

impl TimerStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TimerStatus::Ready => "Ready to Start",
            TimerStatus::Running => "Timer Running",
            TimerStatus::Paused => "Timer Paused",
            TimerStatus::Complete => "Session Complete!",
        }
    }
}

/// What subscribers see after every change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerState {
    pub is_running: bool,
    pub remaining_secs: u64,
    pub duration_minutes: Option<u32>,
    pub started_at: Option<DateTime<Utc>>,
    pub progress_pct: f64,
    pub status: TimerStatus,
}

/// Persistable form of a timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub duration_minutes: Option<u32>,
    pub remaining_secs: u64,
    pub is_running: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub saved_at: DateTime<Utc>,
}

pub type SubscriptionId = u64;

type Subscriber = Box<dyn FnMut(&TimerState) + Send>;

pub struct ExposureTimer<C = SystemClock> {
    clock: C,
    duration_minutes: Option<u32>,
    remaining_secs: u64,
    is_running: bool,
    started_at: Option<DateTime<Utc>>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: SubscriptionId,
}

impl<C> std::fmt::Debug for ExposureTimer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExposureTimer")
            .field("duration_minutes", &self.duration_minutes)
            .field("remaining_secs", &self.remaining_secs)
            .field("is_running", &self.is_running)
            .field("started_at", &self.started_at)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Default for ExposureTimer<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> ExposureTimer<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            duration_minutes: None,
            remaining_secs: 0,
            is_running: false,
            started_at: None,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Rebuild a timer from a snapshot taken earlier.
    ///
    /// A running timer keeps counting while it was away, and completes if it
    /// ran out in the meantime. Stale snapshots yield a fresh timer.
    pub fn restore(clock: C, snapshot: &TimerSnapshot) -> Self {
        let mut timer = Self::new(clock);
        let now = timer.clock.now();

        if now - snapshot.saved_at > Duration::hours(SNAPSHOT_MAX_AGE_HOURS) {
            debug!(saved_at = %snapshot.saved_at, "Discarding stale timer snapshot");
            return timer;
        }

        timer.duration_minutes = snapshot.duration_minutes;

        match (snapshot.is_running, snapshot.started_at, snapshot.duration_minutes) {
            (true, Some(started_at), Some(_)) => {
                timer.started_at = Some(started_at);
                timer.is_running = true;
                timer.recompute_remaining(now);
                if timer.remaining_secs == 0 {
                    timer.finish();
                }
            }
            _ => {
                timer.remaining_secs = if snapshot.remaining_secs > 0 {
                    snapshot.remaining_secs.min(timer.total_secs())
                } else {
                    timer.total_secs()
                };
            }
        }

        timer
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Select a session length and rewind to it. Zero is treated as one minute.
    pub fn select_duration(&mut self, minutes: u32) {
        let minutes = minutes.max(1);
        self.duration_minutes = Some(minutes);
        self.remaining_secs = u64::from(minutes) * 60;
        self.started_at = None;
        self.is_running = false;
        self.notify();
    }

    /// Start or resume. Does nothing without a selected duration or once complete.
    pub fn start(&mut self) {
        if self.remaining_secs == 0 || self.duration_minutes.is_none() || self.is_running {
            return;
        }

        let elapsed = self.total_secs().saturating_sub(self.remaining_secs);
        self.started_at = Some(self.clock.now() - Duration::seconds(elapsed as i64));
        self.is_running = true;
        self.notify();
    }

    pub fn pause(&mut self) {
        if self.is_running {
            self.recompute_remaining(self.clock.now());
        }
        self.is_running = false;
        self.started_at = None;
        self.notify();
    }

    pub fn reset(&mut self) {
        self.is_running = false;
        self.started_at = None;
        self.remaining_secs = self.total_secs();
        self.notify();
    }

    /// Bring the remaining time up to date. Returns the fresh state.
    pub fn tick(&mut self) -> TimerState {
        if self.is_running && self.started_at.is_some() {
            self.recompute_remaining(self.clock.now());
            if self.remaining_secs == 0 {
                self.finish();
            }
            self.notify();
        }
        self.state()
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            is_running: self.is_running,
            remaining_secs: self.remaining_secs,
            duration_minutes: self.duration_minutes,
            started_at: self.started_at,
            progress_pct: self.progress_pct(),
            status: self.status(),
        }
    }

    pub fn status(&self) -> TimerStatus {
        if self.remaining_secs == 0 && self.duration_minutes.is_some() {
            TimerStatus::Complete
        } else if self.is_running {
            TimerStatus::Running
        } else if self.remaining_secs > 0 && self.remaining_secs < self.total_secs() {
            TimerStatus::Paused
        } else {
            TimerStatus::Ready
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            duration_minutes: self.duration_minutes,
            remaining_secs: self.remaining_secs,
            is_running: self.is_running,
            started_at: self.started_at,
            saved_at: self.clock.now(),
        }
    }

    /// Register an observer; it is called right away with the current state.
    pub fn subscribe<F>(&mut self, mut callback: F) -> SubscriptionId
    where
        F: FnMut(&TimerState) + Send + 'static,
    {
        callback(&self.state());
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn total_secs(&self) -> u64 {
        self.duration_minutes.map(|m| u64::from(m) * 60).unwrap_or(0)
    }

    fn progress_pct(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        let elapsed = total.saturating_sub(self.remaining_secs);
        (elapsed as f64 / total as f64 * 100.0).min(100.0)
    }

    fn recompute_remaining(&mut self, now: DateTime<Utc>) {
        let Some(started_at) = self.started_at else {
            return;
        };
        let elapsed = (now - started_at).num_seconds().max(0) as u64;
        self.remaining_secs = self.total_secs().saturating_sub(elapsed);
    }

    fn finish(&mut self) {
        self.is_running = false;
        self.remaining_secs = 0;
        self.started_at = None;
        info!(minutes = ?self.duration_minutes, "Exposure session complete");
    }

    fn notify(&mut self) {
        let state = self.state();
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&state);
        }
    }
}

/// `MM:SS` rendering of a second count.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicI64, Ordering},
    };

    /// Clock that only moves when told to.
    #[derive(Debug)]
    struct ManualClock {
        millis: AtomicI64,
    }

    impl ManualClock {
        fn new(start: DateTime<Utc>) -> Self {
            Self {
                millis: AtomicI64::new(start.timestamp_millis()),
            }
        }

        fn advance(&self, by: Duration) {
            self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst))
                .expect("timestamp in range")
        }
    }

    fn start_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-18T08:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    fn timer() -> ExposureTimer<ManualClock> {
        ExposureTimer::new(ManualClock::new(start_time()))
    }

    #[test]
    fn start_requires_duration() {
        let mut t = timer();
        t.start();
        assert!(!t.state().is_running);
        assert_eq!(t.status(), TimerStatus::Ready);
    }

    #[test]
    fn counts_down_from_start_instant() {
        let mut t = timer();
        t.select_duration(1);
        t.start();
        t.clock().advance(Duration::seconds(15));

        let state = t.tick();
        assert_eq!(state.remaining_secs, 45);
        assert_eq!(state.status, TimerStatus::Running);
        assert!((state.progress_pct - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn completes_at_zero() {
        let mut t = timer();
        t.select_duration(1);
        t.start();
        t.clock().advance(Duration::seconds(90));

        let state = t.tick();
        assert_eq!(state.remaining_secs, 0);
        assert!(!state.is_running);
        assert_eq!(state.status, TimerStatus::Complete);

        t.start();
        assert!(!t.state().is_running);
    }

    #[test]
    fn pause_freezes_remaining_time() {
        let mut t = timer();
        t.select_duration(2);
        t.start();
        t.clock().advance(Duration::seconds(30));
        t.pause();
        assert_eq!(t.status(), TimerStatus::Paused);

        t.clock().advance(Duration::seconds(300));
        assert_eq!(t.tick().remaining_secs, 90);

        t.start();
        t.clock().advance(Duration::seconds(10));
        assert_eq!(t.tick().remaining_secs, 80);
    }

    #[test]
    fn reset_rewinds() {
        let mut t = timer();
        t.select_duration(1);
        t.start();
        t.clock().advance(Duration::seconds(20));
        t.tick();
        t.reset();

        let state = t.state();
        assert_eq!(state.remaining_secs, 60);
        assert_eq!(state.status, TimerStatus::Ready);
        assert_eq!(state.started_at, None);
    }

    #[test]
    fn subscribers_see_every_change() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut t = timer();
        let id = t.subscribe(move |s| sink.lock().expect("lock").push(s.status));
        t.select_duration(1);
        t.start();
        assert!(t.unsubscribe(id));
        t.pause();
        assert!(!t.unsubscribe(id));

        let seen = seen.lock().expect("lock");
        assert_eq!(
            *seen,
            vec![TimerStatus::Ready, TimerStatus::Ready, TimerStatus::Running]
        );
    }

    #[test]
    fn restore_running_timer_keeps_counting() {
        let mut t = timer();
        t.select_duration(5);
        t.start();
        let snapshot = t.snapshot();

        let clock = ManualClock::new(start_time());
        clock.advance(Duration::seconds(120));
        let restored = ExposureTimer::restore(clock, &snapshot);
        assert!(restored.state().is_running);
        assert_eq!(restored.state().remaining_secs, 180);
    }

    #[test]
    fn restore_completes_expired_timer() {
        let mut t = timer();
        t.select_duration(1);
        t.start();
        let snapshot = t.snapshot();

        let clock = ManualClock::new(start_time());
        clock.advance(Duration::minutes(10));
        let restored = ExposureTimer::restore(clock, &snapshot);
        assert_eq!(restored.status(), TimerStatus::Complete);
    }

    #[test]
    fn restore_paused_timer() {
        let mut t = timer();
        t.select_duration(1);
        t.start();
        t.clock().advance(Duration::seconds(20));
        t.pause();
        let snapshot = t.snapshot();

        let restored = ExposureTimer::restore(ManualClock::new(start_time()), &snapshot);
        assert_eq!(restored.status(), TimerStatus::Paused);
        assert_eq!(restored.state().remaining_secs, 40);
    }

    #[test]
    fn restore_discards_stale_snapshot() {
        let mut t = timer();
        t.select_duration(1);
        let snapshot = t.snapshot();

        let clock = ManualClock::new(start_time());
        clock.advance(Duration::hours(25));
        let restored = ExposureTimer::restore(clock, &snapshot);
        assert_eq!(restored.state().duration_minutes, None);
    }

    #[test]
    fn snapshot_roundtrips_through_json() {
        let mut t = timer();
        t.select_duration(3);
        let json = serde_json::to_string(&t.snapshot()).expect("serialize");
        let back: TimerSnapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.duration_minutes, Some(3));
        assert_eq!(back.remaining_secs, 180);
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(905), "15:05");
    }
}
