use std::time::Duration;

use crate::error::RevealError;
use crate::letter::Signature;
use crate::stage::Rect;

pub const SIGNATURE_MARK: &str = "♥";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignaturePart {
    Closing,
    Name,
    Mark,
}

/// What the letter draws on.
pub trait LetterSurface {
    /// Rebuilds the paragraph views, dropping anything a previous run left behind.
    fn load(&mut self, paragraphs: &[String], signature: &Signature);
    fn set_visible(&mut self, visible: bool) -> Result<(), RevealError>;
    fn show_words(&mut self, index: usize, text: &str) -> Result<(), RevealError>;
    fn finish_paragraph(&mut self, index: usize, text: &str);
    fn show_signature(&mut self, part: SignaturePart);
    fn particle_area(&self) -> Option<Rect>;
    fn update(&mut self, _dt: Duration) {}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphView {
    pub text: String,
    pub complete: bool,
    /// Inline opacity set while revealing; `None` means the stylesheet default (hidden).
    pub opacity: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignatureView {
    pub closing: String,
    pub name: String,
    pub closing_shown: bool,
    pub name_shown: bool,
    pub mark_shown: bool,
}

impl SignatureView {
    pub fn is_complete(&self) -> bool {
        self.closing_shown && self.name_shown && self.mark_shown
    }
}

/// Retained letter container the presenters draw from.
#[derive(Debug, Clone)]
pub struct LetterSheet {
    pub visible: bool,
    area: Rect,
    particle_area: Option<Rect>,
    opacity: f32,
    fade: Duration,
    fade_timer: Duration,
    paragraphs: Vec<ParagraphView>,
    signature: SignatureView,
}

impl LetterSheet {
    pub fn new(area: Rect, particle_area: Option<Rect>, fade: Duration) -> Self {
        Self {
            visible: false,
            area,
            particle_area,
            opacity: 0.0,
            fade,
            fade_timer: Duration::ZERO,
            paragraphs: Vec::new(),
            signature: SignatureView::default(),
        }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn paragraphs(&self) -> &[ParagraphView] {
        &self.paragraphs
    }

    pub fn signature(&self) -> &SignatureView {
        &self.signature
    }
}

impl LetterSurface for LetterSheet {
    fn load(&mut self, paragraphs: &[String], signature: &Signature) {
        self.paragraphs = vec![ParagraphView::default(); paragraphs.len()];
        self.signature = SignatureView {
            closing: signature.closing.clone(),
            name: signature.name.clone(),
            ..SignatureView::default()
        };
    }

    fn set_visible(&mut self, visible: bool) -> Result<(), RevealError> {
        if !visible {
            self.visible = false;
            self.opacity = 0.0;
            return Ok(());
        }
        if self.area.is_empty() {
            return Err(RevealError::Collapsed);
        }
        self.visible = true;
        self.fade_timer = Duration::ZERO;
        if self.fade.is_zero() {
            self.opacity = 1.0;
        }
        Ok(())
    }

    fn show_words(&mut self, index: usize, text: &str) -> Result<(), RevealError> {
        if let Some(view) = self.paragraphs.get_mut(index) {
            view.text.clear();
            view.text.push_str(text);
            view.complete = false;
            view.opacity = Some(1.0);
        }
        Ok(())
    }

    fn finish_paragraph(&mut self, index: usize, text: &str) {
        if let Some(view) = self.paragraphs.get_mut(index) {
            view.text = text.to_owned();
            view.complete = true;
            view.opacity = Some(1.0);
        }
    }

    fn show_signature(&mut self, part: SignaturePart) {
        match part {
            SignaturePart::Closing => self.signature.closing_shown = true,
            SignaturePart::Name => self.signature.name_shown = true,
            SignaturePart::Mark => self.signature.mark_shown = true,
        }
    }

    fn particle_area(&self) -> Option<Rect> {
        self.particle_area
    }

    fn update(&mut self, dt: Duration) {
        if !self.visible || self.opacity >= 1.0 {
            return;
        }
        self.fade_timer += dt;
        self.opacity = if self.fade.is_zero() {
            1.0
        } else {
            (self.fade_timer.as_secs_f32() / self.fade.as_secs_f32()).min(1.0)
        };
    }
}
