use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::models::cache::{Clock, SystemClock};

pub const COMMAND_COOLDOWN: Duration = Duration::from_secs(60);

/// One use per `period`, tracked per (user, command).
pub struct Cooldown {
    period: Duration,
    last_used: Mutex<HashMap<(String, String), std::time::SystemTime>>,
    clock: Arc<dyn Clock>,
}

impl Cooldown {
    pub fn new(period: Duration) -> Self {
        Self::with_clock(period, Arc::new(SystemClock))
    }

    pub fn with_clock(period: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            period,
            last_used: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Records a use, or returns how long the caller still has to wait.
    pub fn check(&self, user: &str, command: &str) -> Result<(), Duration> {
        let now = self.clock.now();
        let mut last_used = self.last_used.lock().unwrap_or_else(|e| e.into_inner());
        let key = (user.to_string(), command.to_string());

        if let Some(prev) = last_used.get(&key) {
            if let Ok(elapsed) = now.duration_since(*prev) {
                if elapsed < self.period {
                    return Err(self.period - elapsed);
                }
            }
        }
        last_used.insert(key, now);
        Ok(())
    }
}
