//! Frame-rate measurement over a sliding window of frame timestamps

/// Frames per measurement window
pub const FPS_WINDOW: usize = 100;

#[derive(Debug, Clone)]
pub struct FpsTracker {
    frame_times: [u64; FPS_WINDOW],
    index: usize,
    filled: bool,
    fps: Option<f64>,
}

impl Default for FpsTracker {
    fn default() -> Self {
        Self {
            frame_times: [0; FPS_WINDOW],
            index: 0,
            filled: false,
            fps: None,
        }
    }
}

impl FpsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame at `now_ms`; returns the frame rate once a window is full
    pub fn track(&mut self, now_ms: u64) -> Option<f64> {
        let oldest = self.frame_times[self.index];
        self.frame_times[self.index] = now_ms;
        self.index = (self.index + 1) % FPS_WINDOW;
        if self.index == 0 {
            if !self.filled {
                self.filled = true;
                // The slot just overwritten was the unset initial value
                return None;
            }
            if let Some(fps) = self.fps {
                log::debug!("Current frame rate: {fps:.3}");
            }
        }
        if self.filled {
            let elapsed = now_ms.saturating_sub(oldest);
            self.fps = (elapsed > 0).then(|| FPS_WINDOW as f64 * 1000.0 / elapsed as f64);
        }
        self.fps
    }

    pub fn fps(&self) -> Option<f64> {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rate_until_window_full() {
        let mut tracker = FpsTracker::new();
        for i in 0..FPS_WINDOW as u64 {
            assert_eq!(tracker.track(1_000 + i * 10), None);
        }
        assert_eq!(tracker.fps(), None);
    }

    #[test]
    fn test_steady_frames_report_rate() {
        let mut tracker = FpsTracker::new();
        let mut now = 1_000;
        for _ in 0..FPS_WINDOW * 2 {
            now += 10;
            tracker.track(now);
        }
        let fps = tracker.fps().unwrap();
        assert!((fps - 100.0).abs() < 1e-9);
    }
}
