use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Error, PartialEq)]
pub enum BackoffError {
    #[error("backoff multiplier must be >= 1.0, got {0}")]
    Multiplier(f64),

    #[error("backoff base ({base:?}) exceeds the ceiling ({max:?})")]
    BaseAboveCeiling { base: Duration, max: Duration },

    #[error("fetch attempts must be at least 1")]
    NoAttempts,
}

/// Exponential backoff with a hard ceiling, applied to rate-limited (429) responses.
///
/// The n-th rate-limited attempt waits `min(base * multiplier^(n-1), max)` before
/// the next try. After `max_attempts` requests the fetch gives up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    base: Duration,
    multiplier: f64,
    max: Duration,
    max_attempts: u32,
}

impl BackoffPolicy {
    pub fn new(
        base: Duration,
        multiplier: f64,
        max: Duration,
        max_attempts: u32,
    ) -> Result<Self, BackoffError> {
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(BackoffError::Multiplier(multiplier));
        }
        if base > max {
            return Err(BackoffError::BaseAboveCeiling { base, max });
        }
        if max_attempts == 0 {
            return Err(BackoffError::NoAttempts);
        }
        Ok(Self {
            base,
            multiplier,
            max,
            max_attempts,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn ceiling(&self) -> Duration {
        self.max
    }

    /// Delay after the `attempt`-th rate-limited response (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(64) as i32;
        let secs = self.base.as_secs_f64() * self.multiplier.powi(exponent);
        if !secs.is_finite() || secs >= self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        }
    }

    /// The delays actually slept through when every attempt is rate limited.
    /// There is no sleep after the final attempt.
    pub fn schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts).map(|n| self.delay_for(n)).collect()
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(30),
            multiplier: 2.0,
            max: Duration::from_secs(120),
            max_attempts: 3,
        }
    }
}

/// Cooldown shared by every request issued through one listings client.
///
/// A 429 pushes the deadline out; every request waits for it first, so
/// concurrent workers back off together instead of each hammering the source.
#[derive(Debug, Clone, Default)]
pub struct RateGate {
    open_at: Arc<Mutex<Option<Instant>>>,
}

impl RateGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the gate closed for at least `delay` from now.
    pub async fn hold(&self, delay: Duration) {
        let until = Instant::now() + delay;
        let mut open_at = self.open_at.lock().await;
        *open_at = Some(match *open_at {
            Some(existing) if existing > until => existing,
            _ => until,
        });
    }

    /// Waits until the gate is open.
    pub async fn wait(&self) {
        loop {
            let deadline = *self.open_at.lock().await;
            match deadline {
                Some(at) if at > Instant::now() => tokio::time::sleep_until(at).await,
                _ => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_default_schedule_doubles_from_thirty_seconds() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.schedule(), vec![secs(30), secs(60)]);
    }

    #[test]
    fn test_delays_are_non_decreasing_and_capped() {
        let policy = BackoffPolicy::new(secs(45), 1.5, secs(120), 8).unwrap();
        let schedule = policy.schedule();
        assert_eq!(schedule.len(), 7);
        assert!(schedule.windows(2).all(|w| w[0] <= w[1]));
        assert!(schedule.iter().all(|d| *d <= secs(120)));
        assert_eq!(*schedule.last().unwrap(), secs(120));
    }

    #[test]
    fn test_huge_attempt_count_saturates_at_ceiling() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay_for(10_000), secs(120));
    }

    #[test]
    fn test_multiplier_of_one_is_fixed_delay() {
        let policy = BackoffPolicy::new(secs(30), 1.0, secs(120), 4).unwrap();
        assert_eq!(policy.schedule(), vec![secs(30); 3]);
    }

    #[test]
    fn test_invalid_policies_are_rejected() {
        assert_eq!(
            BackoffPolicy::new(secs(30), 0.5, secs(120), 3),
            Err(BackoffError::Multiplier(0.5))
        );
        assert_eq!(
            BackoffPolicy::new(secs(200), 2.0, secs(120), 3),
            Err(BackoffError::BaseAboveCeiling {
                base: secs(200),
                max: secs(120)
            })
        );
        assert_eq!(
            BackoffPolicy::new(secs(30), 2.0, secs(120), 0),
            Err(BackoffError::NoAttempts)
        );
    }

    #[test]
    fn test_single_attempt_never_sleeps() {
        let policy = BackoffPolicy::new(secs(30), 2.0, secs(120), 1).unwrap();
        assert!(policy.schedule().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_blocks_until_cooldown_elapses() {
        let gate = RateGate::new();
        let start = Instant::now();
        gate.hold(secs(30)).await;
        gate.wait().await;
        assert!(start.elapsed() >= secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shorter_hold_does_not_shrink_cooldown() {
        let gate = RateGate::new();
        let start = Instant::now();
        gate.hold(secs(60)).await;
        gate.hold(secs(5)).await;
        gate.wait().await;
        assert!(start.elapsed() >= secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_gate_does_not_wait() {
        let gate = RateGate::new();
        let start = Instant::now();
        gate.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
