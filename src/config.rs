use std::time::Duration;

use crate::constants::*;
use crate::letter::Signature;
use crate::sequencer::Pacing;

/// Construction options of the slide sequence.
#[derive(Debug, Clone)]
pub struct SlideConfig {
    pub messages: Vec<String>,
    pub pacing: Pacing,
    pub hide_delay: Duration,
    pub autostart: bool,
    pub reduced_motion: bool,
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            pacing: Pacing::default(),
            hide_delay: HIDE_DELAY,
            autostart: true,
            reduced_motion: false,
        }
    }
}

impl SlideConfig {
    pub fn effective_pacing(&self) -> Pacing {
        if self.reduced_motion {
            self.pacing.reduced()
        } else {
            self.pacing
        }
    }
}

/// Construction options of the letter.
#[derive(Debug, Clone)]
pub struct LetterConfig {
    pub paragraphs: Vec<String>,
    pub signature: Signature,
    pub word_delay: Duration,
    pub paragraph_delay: Duration,
    pub entrance_delay: Duration,
    pub entrance_duration: Duration,
    pub signature_delay: Duration,
    pub signature_step: Duration,
    pub particle_lifetime: Duration,
    pub ambient_interval: Duration,
    /// Accessibility mode: everything appears at once and particles stay off.
    pub reduced_motion: bool,
    pub particles: bool,
}

impl Default for LetterConfig {
    fn default() -> Self {
        Self {
            paragraphs: Vec::new(),
            signature: Signature::default(),
            word_delay: WORD_DELAY,
            paragraph_delay: PARAGRAPH_DELAY,
            entrance_delay: ENTRANCE_DELAY,
            entrance_duration: ENTRANCE_DURATION,
            signature_delay: SIGNATURE_DELAY,
            signature_step: SIGNATURE_STEP,
            particle_lifetime: PARTICLE_LIFETIME,
            ambient_interval: AMBIENT_INTERVAL,
            reduced_motion: false,
            particles: true,
        }
    }
}

impl LetterConfig {
    pub fn particles_enabled(&self) -> bool {
        self.particles && !self.reduced_motion
    }

    /// Entrance timings, shortened in reduced-motion mode.
    pub fn entrance(&self) -> (Duration, Duration) {
        if self.reduced_motion {
            (
                self.entrance_delay / REDUCED_MOTION_DIVISOR,
                self.entrance_duration / REDUCED_MOTION_DIVISOR,
            )
        } else {
            (self.entrance_delay, self.entrance_duration)
        }
    }
}
