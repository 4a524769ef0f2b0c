//! Process start time, shared read-only with anything that reports ages or
//! uptime.

use std::sync::OnceLock;
use std::time::{Duration, SystemTime};

static START_TIME: OnceLock<SystemTime> = OnceLock::new();

/// Record the start time. Only the first call has an effect; every call
/// returns the recorded value.
pub fn init() -> SystemTime {
    *START_TIME.get_or_init(SystemTime::now)
}

/// The recorded start time, recorded now if `init` was never called.
pub fn get() -> SystemTime {
    init()
}

pub fn uptime() -> Duration {
    SystemTime::now()
        .duration_since(get())
        .unwrap_or(Duration::ZERO)
}
