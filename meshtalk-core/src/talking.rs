//! Threshold logic for the talking detector. The platform side feeds in the
//! mean magnitude of each analysis window; this half only decides when the
//! boolean actually flips, so downstream renders are not churned with
//! redundant writes.

/// Mean spectral magnitude above which a stream counts as talking. Fixed,
/// not adaptive.
pub const VOLUME_THRESHOLD: f32 = 24.0;

/// Analyser FFT window size in bins.
pub const AUDIO_WINDOW_SIZE: u32 = 256;

#[derive(Debug, Default, Clone, Copy)]
pub struct TalkState {
    talking: bool,
}

impl TalkState {
    pub fn is_talking(&self) -> bool {
        self.talking
    }

    /// Feed one analysis window's mean magnitude. Returns the new value only
    /// when it changed.
    pub fn update(&mut self, mean_magnitude: f32) -> Option<bool> {
        let talking = mean_magnitude > VOLUME_THRESHOLD;
        if talking == self.talking {
            None
        } else {
            self.talking = talking;
            Some(talking)
        }
    }
}
