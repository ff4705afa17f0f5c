//! Probe readiness model.
//!
//! Each probe is assigned a random activation delay once, when the manager is
//! built. A probe reports ready as soon as the time elapsed since startup reaches
//! its delay. The manager never changes after construction, so a single instance
//! can be shared across request handlers without locking.

use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

/// Default lower bound for a probe delay, in seconds
pub const DEFAULT_MIN_DELAY_SECONDS: i64 = 15;

/// Default upper bound for a probe delay, in seconds
pub const DEFAULT_MAX_DELAY_SECONDS: i64 = 60;

/// The fixed set of probes served by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Probe {
    #[serde(rename = "healthz")]
    Health,
    #[serde(rename = "readyz")]
    Readiness,
    #[serde(rename = "livez")]
    Liveness,
}

impl Probe {
    /// All probes, in the order they are reported.
    pub const ALL: [Probe; 3] = [Probe::Health, Probe::Readiness, Probe::Liveness];

    /// Endpoint name of the probe (without leading slash).
    pub fn as_str(self) -> &'static str {
        match self {
            Probe::Health => "healthz",
            Probe::Readiness => "readyz",
            Probe::Liveness => "livez",
        }
    }

    fn index(self) -> usize {
        match self {
            Probe::Health => 0,
            Probe::Readiness => 1,
            Probe::Liveness => 2,
        }
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Probe {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Probe::ALL
            .into_iter()
            .find(|probe| probe.as_str() == s)
            .ok_or_else(|| ProbeError::UnknownProbe(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("Unknown probe: {0}")]
    UnknownProbe(String),
}

/// Source of the current instant.
///
/// `now` drives elapsed-time computations and must be monotonic. `wall` is only
/// used to report when the manager started.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn wall(&self) -> DateTime<Utc>;
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Useful for simulating elapsed time.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    origin_wall: DateTime<Utc>,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            origin_wall: Utc::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }

    fn offset(&self) -> Duration {
        *self.offset.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset()
    }

    fn wall(&self) -> DateTime<Utc> {
        // Offsets are test-sized, conversion cannot realistically overflow
        let offset = chrono::Duration::from_std(self.offset()).unwrap_or(chrono::Duration::zero());
        self.origin_wall + offset
    }
}

/// Requested delay bounds. Missing values fall back to the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeOptions {
    pub min_delay_seconds: Option<i64>,
    pub max_delay_seconds: Option<i64>,
}

/// Effective, normalized delay bounds (`min <= max`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayBounds {
    pub min_delay_seconds: u64,
    pub max_delay_seconds: u64,
}

impl DelayBounds {
    /// Clamp the requested bounds: `min >= 0` and `max >= min`.
    pub fn from_options(options: &ProbeOptions) -> Self {
        let min = options
            .min_delay_seconds
            .unwrap_or(DEFAULT_MIN_DELAY_SECONDS)
            .max(0);
        let max = options
            .max_delay_seconds
            .unwrap_or(DEFAULT_MAX_DELAY_SECONDS)
            .max(min);

        // Both are non-negative after clamping
        Self {
            min_delay_seconds: min.unsigned_abs(),
            max_delay_seconds: max.unsigned_abs(),
        }
    }

    /// Draw a delay uniformly from `[min, max]`, both inclusive.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        rng.gen_range(self.min_delay_seconds..=self.max_delay_seconds)
    }

    pub fn contains(&self, delay: u64) -> bool {
        (self.min_delay_seconds..=self.max_delay_seconds).contains(&delay)
    }
}

/// Point-in-time status of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeStatus {
    pub probe: Probe,
    #[serde(rename = "ok")]
    pub ready: bool,
    pub delay_seconds: u64,
    pub elapsed_seconds: u64,
    pub remaining_seconds: u64,
    /// Start of the manager, serialized as epoch milliseconds
    #[serde(rename = "since", with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,
}

/// Owns the start instant and the per-probe delays.
#[derive(Debug)]
pub struct ProbeManager<C: Clock = SystemClock> {
    clock: C,
    started: Instant,
    started_at: DateTime<Utc>,
    bounds: DelayBounds,
    delays: [u64; 3],
}

impl ProbeManager<SystemClock> {
    /// Build a manager using the system clock and the thread-local RNG.
    pub fn new(options: ProbeOptions) -> Self {
        Self::with_rng(options, &mut rand::thread_rng(), SystemClock)
    }
}

impl<C: Clock> ProbeManager<C> {
    /// Build a manager from an explicit random source and clock.
    ///
    /// Every delay is drawn before the manager is returned.
    pub fn with_rng<R: Rng + ?Sized>(options: ProbeOptions, rng: &mut R, clock: C) -> Self {
        let bounds = DelayBounds::from_options(&options);
        let started = clock.now();
        let started_at = clock.wall();

        let mut delays = [0; 3];
        for probe in Probe::ALL {
            delays[probe.index()] = bounds.draw(rng);
        }

        Self {
            clock,
            started,
            started_at,
            bounds,
            delays,
        }
    }

    pub fn bounds(&self) -> DelayBounds {
        self.bounds
    }

    pub fn delay(&self, probe: Probe) -> u64 {
        self.delays[probe.index()]
    }

    /// Wall-clock time at which the manager was built.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Whole seconds since startup, rounded down. Never negative.
    pub fn elapsed_seconds(&self) -> u64 {
        self.clock
            .now()
            .saturating_duration_since(self.started)
            .as_secs()
    }

    /// Current status of `probe`.
    ///
    /// An instant before startup counts as zero elapsed seconds. Once ready, a
    /// probe stays ready as long as the clock honors the monotonic contract of
    /// [`Clock::now`]; `SystemClock` and `ManualClock` both do.
    pub fn status(&self, probe: Probe) -> ProbeStatus {
        let delay_seconds = self.delay(probe);
        let elapsed_seconds = self.elapsed_seconds();
        let remaining_seconds = delay_seconds.saturating_sub(elapsed_seconds);

        ProbeStatus {
            probe,
            ready: remaining_seconds == 0,
            delay_seconds,
            elapsed_seconds,
            remaining_seconds,
            started_at: self.started_at,
        }
    }

    /// Current status of the probe named `name` (`healthz`, `readyz` or `livez`).
    pub fn status_by_name(&self, name: &str) -> Result<ProbeStatus, ProbeError> {
        Ok(self.status(name.parse()?))
    }

    /// Status of every probe, in `Probe::ALL` order.
    pub fn statuses(&self) -> [ProbeStatus; 3] {
        Probe::ALL.map(|probe| self.status(probe))
    }
}
