use std::time::Duration;

use rand::Rng;

use crate::config::{DEFAULT_BASE_DELAY_SECS, DEFAULT_JITTER_SCALE_SECS};

/// Delay between enrichment steps: a fixed base plus exponential jitter.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    pub base: Duration,
    /// Mean of the exponential jitter, in seconds.
    pub jitter_scale: f64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(DEFAULT_BASE_DELAY_SECS),
            jitter_scale: DEFAULT_JITTER_SCALE_SECS,
        }
    }
}

impl Pacing {
    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if !(self.jitter_scale.is_finite() && self.jitter_scale > 0.0) {
            return self.base;
        }
        // Inverse CDF of Exp(1 / scale); u in [0, 1) keeps ln finite.
        let u: f64 = rng.gen();
        let jitter = -self.jitter_scale * (1.0 - u).ln();
        let jitter = Duration::try_from_secs_f64(jitter).unwrap_or(Duration::MAX);
        self.base.saturating_add(jitter)
    }

    pub async fn wait(&self) {
        let delay = self.next_delay(&mut rand::thread_rng());
        if !delay.is_zero() {
            tracing::debug!("Sleeping {:.1}s", delay.as_secs_f64());
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn never_below_base() {
        let p = Pacing::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(p.next_delay(&mut rng) >= p.base);
        }
    }

    #[test]
    fn jitter_mean_is_close_to_scale() {
        let p = Pacing {
            base: Duration::ZERO,
            jitter_scale: 20.0,
        };
        let mut rng = StdRng::seed_from_u64(42);
        let n = 20_000;
        let mean: f64 = (0..n).map(|_| p.next_delay(&mut rng).as_secs_f64()).sum::<f64>() / n as f64;
        assert!((mean - 20.0).abs() < 1.0, "{mean}");
    }

    #[test]
    fn zero_pacing_never_sleeps() {
        let p = Pacing {
            base: Duration::ZERO,
            jitter_scale: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(p.next_delay(&mut rng), Duration::ZERO);
    }

    #[test]
    fn non_finite_scale_falls_back_to_base() {
        let mut rng = StdRng::seed_from_u64(3);
        for scale in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let p = Pacing {
                base: Duration::from_secs(2),
                jitter_scale: scale,
            };
            assert_eq!(p.next_delay(&mut rng), Duration::from_secs(2));
        }
    }

    #[test]
    fn huge_scale_saturates() {
        let p = Pacing {
            base: Duration::from_secs(1),
            jitter_scale: f64::MAX,
        };
        let mut rng = StdRng::seed_from_u64(9);
        assert!(p.next_delay(&mut rng) >= p.base);
    }
}
