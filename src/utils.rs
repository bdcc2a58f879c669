//! Utility functions shared by the session and sample sources.

pub mod safe_cast;

use std::time::Duration;

/// Turn a millisecond setting into an optional timeout, where 0 disables it
#[must_use]
pub const fn timeout_from_millis(millis: u64) -> Option<Duration> {
    if millis == 0 {
        None
    } else {
        Some(Duration::from_millis(millis))
    }
}

/// Interval between frames for a paced source
///
/// A rate of 0 is treated as 1 frame per second.
#[must_use]
pub fn frame_interval(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(fps.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_from_millis() {
        assert_eq!(timeout_from_millis(0), None);
        assert_eq!(timeout_from_millis(250), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_frame_interval() {
        assert_eq!(frame_interval(1), Duration::from_secs(1));
        assert_eq!(frame_interval(0), Duration::from_secs(1));
        let thirty = frame_interval(30);
        assert!(thirty > Duration::from_millis(33) && thirty < Duration::from_millis(34));
    }
}
