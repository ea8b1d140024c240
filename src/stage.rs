//! Builds the containers both components are mounted on.

use crate::config::{LetterConfig, SlideConfig};
use crate::letter::LetterSheet;
use crate::slideshow::SlideDeck;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Bottom `fraction` of the rectangle.
    pub fn lower_band(&self, fraction: f32) -> Rect {
        let height = self.height * fraction.clamp(0.0, 1.0);
        Rect::new(self.x, self.y + self.height - height, self.width, height)
    }
}

/// Which containers the composition root mounts.
#[derive(Debug, Clone, Copy)]
pub struct MountOptions {
    pub slides: bool,
    pub letter: bool,
    pub progress: bool,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            slides: true,
            letter: true,
            progress: true,
        }
    }
}

pub struct Mounts {
    pub slides: Option<SlideDeck>,
    pub letter: Option<LetterSheet>,
}

pub struct Stage {
    pub width: f32,
    pub height: f32,
}

impl Stage {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Centre column the letter is laid out in.
    pub fn letter_area(&self) -> Rect {
        Rect::new(
            self.width * 0.15,
            self.height * 0.08,
            self.width * 0.7,
            self.height * 0.84,
        )
    }

    pub fn mount(&self, slides: &SlideConfig, letter: &LetterConfig, options: MountOptions) -> Mounts {
        let slide_deck = options.slides.then(|| {
            SlideDeck::new(
                &slides.messages,
                slides.effective_pacing().transition,
                options.progress,
            )
        });
        let letter_sheet = options.letter.then(|| {
            let (_, fade) = letter.entrance();
            let particle_area = letter.particles_enabled().then(|| self.bounds());
            LetterSheet::new(self.letter_area(), particle_area, fade)
        });
        Mounts {
            slides: slide_deck,
            letter: letter_sheet,
        }
    }
}
