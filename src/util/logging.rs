//! Rate-limited logging helper, used to keep handshake/crypto warnings from
//! spamming the log on a misbehaving connection.

use std::time::Instant;

/// Allows at most `cap` messages per `window_ms`, then drops the rest until
/// the window rolls over.
#[derive(Debug)]
pub struct LogThrottle {
    window_ms: u64,
    cap: u32,
    count: u32,
    t0: Instant,
}

impl LogThrottle {
    pub fn new(window_ms: u64, cap: u32) -> Self {
        Self {
            window_ms,
            cap,
            count: 0,
            t0: Instant::now(),
        }
    }

    /// Returns `true` if this message should be logged.
    pub fn allow(&mut self) -> bool {
        let elapsed_ms = self.t0.elapsed().as_millis() as u64;
        if elapsed_ms > self.window_ms {
            self.t0 = Instant::now();
            self.count = 0;
        }
        self.count += 1;
        self.count <= self.cap
    }
}

/// Log frame bytes at debug level, truncating long payloads.
pub fn log_frame_hex(prefix: &str, data: &[u8]) {
    const MAX_LOG_BYTES: usize = 64;
    let display = if data.len() > MAX_LOG_BYTES {
        &data[..MAX_LOG_BYTES]
    } else {
        data
    };
    let suffix = if data.len() > MAX_LOG_BYTES {
        format!(" ... ({} bytes total)", data.len())
    } else {
        String::new()
    };
    log::debug!("{prefix}: {}{suffix}", super::hex::format_hex_compact(display));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_caps_within_window() {
        let mut t = LogThrottle::new(60_000, 2);
        assert!(t.allow());
        assert!(t.allow());
        assert!(!t.allow());
    }
}
