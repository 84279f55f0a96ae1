use std::time::Duration;

use time::OffsetDateTime;
use tokio::time::Instant;

/// Time source shared by the cache and the logger.
pub trait Clock: Send + Sync {
    /// Elapsed time since the clock origin. Never goes backwards.
    fn monotonic(&self) -> Duration;

    /// Wall-clock time used for capture stamps.
    fn now_utc(&self) -> OffsetDateTime;
}

/// Process clock. Monotonic readings follow tokio time so paused-time tests stay deterministic.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }

    fn now_utc(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[cfg(any(test, feature = "mock"))]
pub use manual::ManualClock;

#[cfg(any(test, feature = "mock"))]
mod manual {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    use time::OffsetDateTime;

    use super::Clock;

    /// Clock that only moves when told to.
    #[derive(Debug)]
    pub struct ManualClock {
        elapsed_ms: AtomicU64,
        wall_origin: OffsetDateTime,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self::starting_at(OffsetDateTime::now_utc())
        }

        pub fn starting_at(wall_origin: OffsetDateTime) -> Self {
            Self {
                elapsed_ms: AtomicU64::new(0),
                wall_origin,
            }
        }

        pub fn advance(&self, by: Duration) {
            self.elapsed_ms.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
        }
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for ManualClock {
        fn monotonic(&self) -> Duration {
            Duration::from_millis(self.elapsed_ms.load(Ordering::SeqCst))
        }

        fn now_utc(&self) -> OffsetDateTime {
            self.wall_origin + self.monotonic()
        }
    }
}
