// Time Provider Port (for testability)

/// Time provider interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> i64;
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock that starts at a fixed instant and advances by `step` on every read
pub struct SteppingTimeProvider {
    now: std::sync::atomic::AtomicI64,
    step: i64,
}

impl SteppingTimeProvider {
    pub fn new(start: i64, step: i64) -> Self {
        Self {
            now: std::sync::atomic::AtomicI64::new(start),
            step,
        }
    }

    /// Jump the clock forward
    pub fn advance(&self, millis: i64) {
        self.now
            .fetch_add(millis, std::sync::atomic::Ordering::SeqCst);
    }
}

impl TimeProvider for SteppingTimeProvider {
    fn now_millis(&self) -> i64 {
        self.now
            .fetch_add(self.step, std::sync::atomic::Ordering::SeqCst)
    }
}
