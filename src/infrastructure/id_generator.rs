// Item ID Generator - time-based string tokens
// IDs are epoch milliseconds rendered as decimal strings, bumped past the last
// issued value so that two creations in the same millisecond never collide.

use std::sync::atomic::{AtomicU64, Ordering};

/// Generates strictly increasing, time-based item IDs
#[derive(Debug, Default)]
pub struct ItemIdGenerator {
    last_issued: AtomicU64,
}

impl ItemIdGenerator {
    pub fn new() -> Self {
        Self {
            last_issued: AtomicU64::new(0),
        }
    }

    /// Generate the next ID as a string token
    pub fn next_id(&self) -> String {
        self.next_raw().to_string()
    }

    fn next_raw(&self) -> u64 {
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;

        let mut last = self.last_issued.load(Ordering::Relaxed);
        loop {
            // Same (or earlier, after a clock step back) millisecond - move past last
            let candidate = if now > last { now } else { last + 1 };
            match self.last_issued.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }
}
