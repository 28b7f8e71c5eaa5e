use crate::LoadSample;

/// Fixed-window moving average over raw load samples.
///
/// The history is a ring overwritten in place. Slots start at zero, so the
/// smoothed value ramps up until the window has filled once; after that it is
/// the plain mean of the last `window` samples.
#[derive(Debug)]
pub struct LoadSampler {
    history: Vec<LoadSample>,
    cursor: usize,
}

impl LoadSampler {
    pub fn new(window: usize) -> Self {
        Self {
            history: vec![0.0; window.max(1)],
            cursor: 0,
        }
    }

    /// Insert `raw` at the cursor and return the mean over the full window.
    ///
    /// No plausibility check happens here; a caller whose platform read
    /// failed substitutes the previous raw value (or zero) before calling.
    pub fn tick(&mut self, raw: LoadSample) -> LoadSample {
        self.history[self.cursor] = raw;
        self.cursor = (self.cursor + 1) % self.history.len();
        self.history.iter().sum::<LoadSample>() / self.history.len() as f64
    }

    /// Change the window size. The history restarts from zero.
    pub fn resize(&mut self, window: usize) {
        let window = window.max(1);
        if window != self.history.len() {
            self.history = vec![0.0; window];
            self.cursor = 0;
        }
    }

    pub fn window(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_up_counts_empty_slots_as_zero() {
        let mut s = LoadSampler::new(10);
        assert_eq!(s.tick(100.0), 10.0);
        assert_eq!(s.tick(100.0), 20.0);
        for _ in 0..8 {
            s.tick(100.0);
        }
        // window full now
        assert_eq!(s.tick(100.0), 100.0);
    }

    #[test]
    fn mean_of_last_window_after_wraparound() {
        let mut s = LoadSampler::new(4);
        for v in [10.0, 20.0, 30.0, 40.0] {
            s.tick(v);
        }
        // overwrites the 10.0 slot
        assert_eq!(s.tick(50.0), (20.0 + 30.0 + 40.0 + 50.0) / 4.0);
    }

    #[test]
    fn resize_resets_history() {
        let mut s = LoadSampler::new(4);
        s.tick(80.0);
        s.resize(2);
        assert_eq!(s.window(), 2);
        assert_eq!(s.tick(10.0), 5.0);
    }

    #[test]
    fn resize_to_same_window_keeps_history() {
        let mut s = LoadSampler::new(2);
        s.tick(10.0);
        s.resize(2);
        assert_eq!(s.tick(30.0), 20.0);
    }
}
