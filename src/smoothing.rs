//! Sliding-window smoothing of raw orientation samples.
//!
//! The window keeps the most recent samples in arrival order and reports
//! their mean. The mean is scaled and truncated toward zero to produce the
//! integer control value sent downstream.

use std::collections::VecDeque;

use crate::constants::{DEFAULT_SCALE_FACTOR, DEFAULT_WINDOW_SIZE};
use crate::utils::safe_cast::{f64_to_i32_saturating, usize_to_f64};

/// Fixed-capacity moving average over recent samples
#[derive(Debug, Clone)]
pub struct SmoothingWindow {
    capacity: usize,
    scale: f64,
    buffer: VecDeque<f64>,
}

impl SmoothingWindow {
    /// Create a window holding at most `capacity` samples
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize, scale: f64) -> Self {
        assert!(capacity > 0, "Window size must be greater than 0");
        Self {
            capacity,
            scale,
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a sample, evicting the oldest one when full
    pub fn append(&mut self, sample: f64) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(sample);
    }

    /// Arithmetic mean of the current contents, 0.0 when empty
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.buffer.is_empty() {
            return 0.0;
        }
        self.buffer.iter().sum::<f64>() / usize_to_f64(self.buffer.len())
    }

    /// Mean multiplied by the scale factor and truncated toward zero
    #[must_use]
    pub fn scaled_int(&self) -> i32 {
        f64_to_i32_saturating(self.mean() * self.scale)
    }

    /// Append a sample and return the resulting control value
    pub fn push(&mut self, sample: f64) -> i32 {
        self.append(sample);
        self.scaled_int()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Samples currently held, oldest first
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.buffer.iter().copied()
    }

    /// Drop all samples
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for SmoothingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE, DEFAULT_SCALE_FACTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_moving_average() {
        let mut window = SmoothingWindow::new(3, 1.0);

        window.append(10.0);
        assert_eq!(window.mean(), 10.0);

        window.append(20.0);
        assert_eq!(window.mean(), 15.0);

        window.append(30.0);
        assert_eq!(window.mean(), 20.0);

        // Window is full, oldest value should be dropped
        window.append(40.0);
        assert_eq!(window.mean(), 30.0);
        assert_eq!(window.len(), 3);
        assert_eq!(window.samples().collect::<Vec<_>>(), vec![20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_empty_window() {
        let window = SmoothingWindow::default();
        assert!(window.is_empty());
        assert_eq!(window.mean(), 0.0);
        assert_eq!(window.scaled_int(), 0);
        assert_eq!(window.capacity(), 8);
        assert_eq!(window.scale(), 50.0);
    }

    #[test]
    fn test_scaled_int_truncates() {
        let mut window = SmoothingWindow::default();
        // 0.059 * 50 = 2.95
        assert_eq!(window.push(0.059), 2);

        window.clear();
        // -0.059 * 50 = -2.95
        assert_eq!(window.push(-0.059), -2);
    }

    #[test]
    fn test_mixed_signs() {
        let mut window = SmoothingWindow::default();
        window.append(-4.0);
        window.append(2.0);
        // mean -1.0, scaled -50
        assert_eq!(window.scaled_int(), -50);
    }

    #[test]
    #[should_panic(expected = "Window size must be greater than 0")]
    fn test_zero_window() {
        let _ = SmoothingWindow::new(0, 50.0);
    }

    proptest! {
        #[test]
        fn prop_mean_covers_last_eight(samples in prop::collection::vec(-90.0f64..90.0, 9..64)) {
            let mut window = SmoothingWindow::default();
            for &s in &samples {
                window.append(s);
            }
            let tail = &samples[samples.len() - 8..];
            let expected = tail.iter().sum::<f64>() / 8.0;
            prop_assert_eq!(window.len(), 8);
            prop_assert!((window.mean() - expected).abs() < 1e-9);
        }

        #[test]
        fn prop_constant_window_scales_exactly(k in -1_000_000i32..1_000_000) {
            // Dyadic values keep every partial sum exact
            let v = f64::from(k) / 64.0;
            let mut window = SmoothingWindow::default();
            for _ in 0..8 {
                window.append(v);
            }
            prop_assert_eq!(window.mean(), v);
            prop_assert_eq!(window.scaled_int(), (v * 50.0).trunc() as i32);
        }

        #[test]
        fn prop_length_never_exceeds_capacity(
            capacity in 1usize..16,
            samples in prop::collection::vec(any::<f64>(), 0..64)
        ) {
            let mut window = SmoothingWindow::new(capacity, 50.0);
            for s in samples {
                window.append(s);
                prop_assert!(window.len() <= capacity);
            }
        }
    }
}
