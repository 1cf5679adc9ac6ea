use std::time::{SystemTime, UNIX_EPOCH};

/// Time source for epoch and grace arithmetic.
///
/// All windows in the hub are exact integer math over unix seconds, so the
/// clock is a trait and tests drive it manually.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
