use rand::Rng;
use std::time::Duration;

/// How long to wait between reconnect attempts.
///
/// Retries are unbounded under either policy; the connect loop only stops
/// when its cancellation token fires.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconnectPolicy {
    /// Wait the same delay after every disconnect.
    Fixed { delay: Duration },
    /// Double the delay on each consecutive failure up to `max`, with
    /// +/-20% jitter.
    Exponential { initial: Duration, max: Duration },
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy::Fixed {
            delay: Duration::from_secs(5),
        }
    }
}

#[derive(Debug)]
pub struct ReconnectBackoff {
    policy: ReconnectPolicy,
    attempt: u32,
}

impl ReconnectBackoff {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    /// Delay to apply before the next connection attempt. Advances the
    /// attempt counter.
    pub fn next_delay(&mut self) -> Duration {
        let delay = match &self.policy {
            ReconnectPolicy::Fixed { delay } => *delay,
            ReconnectPolicy::Exponential { initial, max } => {
                // Exponent clamp keeps the multiplication well away from overflow.
                let doubled = initial.saturating_mul(1u32 << self.attempt.min(16));
                apply_jitter(doubled.min(*max))
            }
        };
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    /// Call after a successful connection so the next failure starts the
    /// schedule over.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}

fn apply_jitter(base: Duration) -> Duration {
    let factor = rand::thread_rng().gen_range(0.8..=1.2);
    base.mul_f64(factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_policy_never_grows() {
        let mut backoff = ReconnectBackoff::new(ReconnectPolicy::Fixed {
            delay: Duration::from_secs(5),
        });

        for _ in 0..10 {
            assert_eq!(backoff.next_delay(), Duration::from_secs(5));
        }
        assert_eq!(backoff.attempt(), 10);
    }

    #[test]
    fn test_exponential_policy_doubles_and_caps() {
        let mut backoff = ReconnectBackoff::new(ReconnectPolicy::Exponential {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(8),
        });

        let expected_base = [1.0, 2.0, 4.0, 8.0, 8.0, 8.0];
        for base in expected_base {
            let delay = backoff.next_delay().as_secs_f64();
            assert!(delay >= base * 0.8 && delay <= base * 1.2, "delay {} out of range for base {}", delay, base);
        }
    }

    #[test]
    fn test_reset_restarts_schedule() {
        let mut backoff = ReconnectBackoff::new(ReconnectPolicy::Exponential {
            initial: Duration::from_secs(2),
            max: Duration::from_secs(60),
        });

        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.attempt(), 0);

        let delay = backoff.next_delay().as_secs_f64();
        assert!(delay >= 1.6 && delay <= 2.4);
    }
}
