//! The letter: waits for the slides, fades in, types its paragraphs and signs.

mod sheet;
mod typewriter;

pub use sheet::{LetterSheet, LetterSurface, ParagraphView, SIGNATURE_MARK, SignaturePart, SignatureView};
use typewriter::{Typewriter, typing_duration};

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::LetterConfig;
use crate::content::LetterContent;
use crate::error::{InitError, RevealError};
use crate::events::{CompletionBus, CompletionListener, LetterHooks, SequenceSummary};
use crate::particles::ParticleField;
use crate::sequencer::{Cue, Sequencer, SequencerState};
use crate::timers::Timers;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub closing: String,
    pub name: String,
}

impl Default for Signature {
    fn default() -> Self {
        Self {
            closing: "With all my love,".to_string(),
            name: "Me".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterPhase {
    Hidden,    // Container hidden, waiting for the slides
    Waiting,   // Notified, entrance delay running
    Entering,  // Container fading in
    Revealing, // Paragraphs being typed
    Signing,   // Signature appearing
    Complete,  // Everything shown
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LetterStep {
    Show,
    EntranceDone,
    Signature(SignaturePart),
}

pub struct LetterRevealer<S: LetterSurface> {
    config: LetterConfig,
    core: Sequencer,
    typewriter: Option<(usize, Typewriter)>,
    surface: S,
    particles: Option<ParticleField>,
    listener: CompletionListener,
    hooks: LetterHooks,
    timers: Timers<LetterStep>,
    phase: LetterPhase,
    hurry: bool,
}

fn paragraph_sequencer(config: &LetterConfig) -> Sequencer {
    let transitions = config
        .paragraphs
        .iter()
        .map(|paragraph| typing_duration(paragraph, config.word_delay))
        .collect();
    Sequencer::new(
        "letter",
        transitions,
        config.paragraph_delay,
        config.signature_delay,
    )
}

impl<S: LetterSurface> LetterRevealer<S> {
    /// Subscribes to `bus`; fails fast when the root container is missing.
    pub fn new(
        config: LetterConfig,
        surface: Option<S>,
        bus: &CompletionBus,
        hooks: LetterHooks,
    ) -> Result<Self, InitError> {
        let Some(mut surface) = surface else {
            error!("letter container missing; letter disabled");
            return Err(InitError::MissingContainer {
                component: "letter",
                element: "root",
            });
        };
        surface.load(&config.paragraphs, &config.signature);

        let particles = match surface.particle_area() {
            Some(area) if config.particles_enabled() => Some(ParticleField::new(
                area,
                config.particle_lifetime,
                config.ambient_interval,
            )),
            _ => None,
        };
        info!(
            paragraphs = config.paragraphs.len(),
            reduced_motion = config.reduced_motion,
            particles = particles.is_some(),
            "letter ready"
        );

        Ok(Self {
            core: paragraph_sequencer(&config),
            config,
            typewriter: None,
            surface,
            particles,
            listener: bus.subscribe(),
            hooks,
            timers: Timers::new(),
            phase: LetterPhase::Hidden,
            hurry: false,
        })
    }

    /// Swaps in a seeded particle field so tests see a fixed sequence.
    #[cfg(test)]
    fn with_particles(mut self, particles: ParticleField) -> Self {
        self.particles = Some(particles);
        self
    }

    pub fn phase(&self) -> LetterPhase {
        self.phase
    }

    pub fn state(&self) -> SequencerState {
        self.core.state()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.core.current_index()
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.config.paragraphs
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn particles(&self) -> Option<&ParticleField> {
        self.particles.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.phase == LetterPhase::Complete
    }

    pub fn pause(&mut self) -> bool {
        if !self.core.pause() {
            return false;
        }
        if let Some((_, typewriter)) = self.typewriter.as_mut() {
            typewriter.cancel();
        }
        true
    }

    pub fn resume(&mut self) -> bool {
        let resumed = self.core.resume();
        self.flush();
        resumed
    }

    /// Shows whatever is left at once.
    pub fn skip(&mut self) -> bool {
        if matches!(self.phase, LetterPhase::Hidden | LetterPhase::Complete) {
            return false;
        }
        self.timers.cancel_all();
        if matches!(self.phase, LetterPhase::Waiting | LetterPhase::Entering) {
            self.show_container();
        }
        self.hurry = true;
        if self.core.complete() {
            self.flush();
        } else {
            self.reveal_everything();
        }
        true
    }

    pub fn hide(&mut self) {
        if self.phase == LetterPhase::Hidden {
            return;
        }
        self.rewind();
        if let Some(hook) = self.hooks.on_hide.as_mut() {
            hook();
        }
        info!("letter hidden");
    }

    /// Reveals again from the start without waiting for the slides.
    pub fn replay(&mut self) {
        self.rewind();
        self.phase = LetterPhase::Waiting;
        self.timers.schedule(Duration::ZERO, LetterStep::Show);
    }

    pub fn set_content(&mut self, content: LetterContent) {
        self.config.paragraphs = content.into_paragraphs();
        self.core = paragraph_sequencer(&self.config);
        self.core.advance_to(self.timers.now());
        self.rewind();
        info!(paragraphs = self.config.paragraphs.len(), "letter content replaced");
    }

    pub fn set_signature(&mut self, name: impl Into<String>) {
        self.config.signature.name = name.into();
        self.rewind();
    }

    /// Spawns a heart at a pointer position while the letter is on screen.
    pub fn pointer(&mut self, x: f32, y: f32) -> bool {
        if self.phase == LetterPhase::Hidden {
            return false;
        }
        let Some(particle) = self.particles.as_mut().and_then(|field| field.spawn_at(x, y)) else {
            return false;
        };
        if let Some(hook) = self.hooks.on_heart_spawn.as_mut() {
            hook(&particle);
        }
        true
    }

    /// Returns whether particles are on afterwards.
    pub fn toggle_particles(&mut self) -> bool {
        let Some(field) = self.particles.as_mut() else {
            return false;
        };
        field.set_enabled(!field.is_enabled());
        debug!(enabled = field.is_enabled(), "particles toggled");
        field.is_enabled()
    }

    pub fn update(&mut self, dt: Duration) {
        while let Some(summary) = self.listener.poll() {
            self.on_slides_complete(summary);
        }

        // Letter steps and paragraph steps share one timeline: whichever is due
        // first runs first, with both clocks reading its due time.
        let until = self.timers.now() + dt;
        while let Some(at) = self.next_due(until) {
            self.core.advance_to(at);
            self.timers.advance_to(at);
            self.flush();
            while let Some(step) = self.timers.pop_due(at) {
                self.run(step);
            }
        }
        self.core.advance_to(until);
        self.timers.advance_to(until);

        self.surface.update(dt);
        self.flush();
        self.type_words();

        if let Some(field) = self.particles.as_mut() {
            let spawned = field.update(dt, self.phase != LetterPhase::Hidden);
            if let Some(hook) = self.hooks.on_heart_spawn.as_mut() {
                for particle in spawned.iter() {
                    hook(particle);
                }
            }
        }
    }

    fn next_due(&self, until: Duration) -> Option<Duration> {
        [self.timers.next_due(), self.core.next_due()]
            .into_iter()
            .flatten()
            .min()
            .filter(|due| *due <= until)
    }

    fn on_slides_complete(&mut self, summary: SequenceSummary) {
        if self.phase != LetterPhase::Hidden {
            debug!(?summary, "letter already running; notification ignored");
            return;
        }
        let (delay, _) = self.config.entrance();
        info!(
            slides_ms = summary.duration_ms,
            slides = summary.item_count,
            "slides finished; letter entrance scheduled"
        );
        self.phase = LetterPhase::Waiting;
        self.timers.schedule(delay, LetterStep::Show);
    }

    fn run(&mut self, step: LetterStep) {
        match step {
            LetterStep::Show => {
                if !self.show_container() {
                    self.hurry = true;
                    self.core.complete();
                    self.flush();
                    return;
                }
                let (_, duration) = self.config.entrance();
                self.phase = LetterPhase::Entering;
                self.timers.schedule(duration, LetterStep::EntranceDone);
            }
            LetterStep::EntranceDone => {
                self.phase = LetterPhase::Revealing;
                if self.config.reduced_motion {
                    self.hurry = true;
                    self.core.complete();
                } else {
                    self.core.start();
                }
                self.flush();
            }
            LetterStep::Signature(part) => {
                self.surface.show_signature(part);
                match part {
                    SignaturePart::Closing => {
                        self.timers.schedule(
                            self.config.signature_step,
                            LetterStep::Signature(SignaturePart::Name),
                        );
                    }
                    SignaturePart::Name => {
                        self.timers.schedule(
                            self.config.signature_step,
                            LetterStep::Signature(SignaturePart::Mark),
                        );
                    }
                    SignaturePart::Mark => self.finish(),
                }
            }
        }
    }

    /// Makes the container visible. Returns false when it cannot be shown.
    fn show_container(&mut self) -> bool {
        match self.surface.set_visible(true) {
            Ok(()) => {
                if let Some(hook) = self.hooks.on_show.as_mut() {
                    hook();
                }
                true
            }
            Err(error) => {
                warn!(%error, "letter entrance failed; showing everything at once");
                false
            }
        }
    }

    fn flush(&mut self) {
        while let Some(cue) = self.core.next_cue() {
            if let Err(error) = self.apply(cue) {
                warn!(%error, "paragraph reveal failed; showing everything at once");
                self.hurry = true;
                let remaining = self.core.abandon();
                debug!(?remaining, "paragraphs revealed without animation");
            }
        }
    }

    fn apply(&mut self, cue: Cue) -> Result<(), RevealError> {
        match cue {
            Cue::Enter { index, .. } => {
                let mut typewriter = Typewriter::new(
                    &self.config.paragraphs[index],
                    self.config.word_delay,
                    self.core.now(),
                );
                typewriter.advance_to(self.core.now());
                self.surface.show_words(index, &typewriter.visible_text())?;
                self.typewriter = Some((index, typewriter));
                debug!(index, "paragraph typing");
            }
            Cue::Settled { index } => {
                match self.typewriter.take() {
                    Some((typing, mut typewriter)) if typing == index => {
                        self.surface.finish_paragraph(index, typewriter.finish());
                    }
                    other => {
                        self.typewriter = other;
                        self.surface.finish_paragraph(index, &self.config.paragraphs[index]);
                    }
                }
                debug!(index, "paragraph complete");
            }
            Cue::Completed(_) => {
                if self.hurry {
                    self.reveal_everything();
                } else {
                    self.phase = LetterPhase::Signing;
                    self.run(LetterStep::Signature(SignaturePart::Closing));
                }
            }
        }
        Ok(())
    }

    fn type_words(&mut self) {
        let now = self.core.now();
        let Some((index, typewriter)) = self.typewriter.as_mut() else {
            return;
        };
        if !typewriter.advance_to(now) {
            return;
        }
        if let Err(error) = self.surface.show_words(*index, &typewriter.visible_text()) {
            warn!(%error, "paragraph reveal failed; showing everything at once");
            self.hurry = true;
            self.core.abandon();
            self.flush();
        }
    }

    fn reveal_everything(&mut self) {
        self.timers.cancel_all();
        self.typewriter = None;
        for (index, paragraph) in self.config.paragraphs.iter().enumerate() {
            self.surface.finish_paragraph(index, paragraph);
        }
        for part in [SignaturePart::Closing, SignaturePart::Name, SignaturePart::Mark] {
            self.surface.show_signature(part);
        }
        self.finish();
    }

    fn finish(&mut self) {
        if self.phase == LetterPhase::Complete {
            return;
        }
        self.phase = LetterPhase::Complete;
        info!(paragraphs = self.config.paragraphs.len(), "letter complete");
        if let Some(hook) = self.hooks.on_content_complete.as_mut() {
            hook();
        }
    }

    /// Back to hidden with a clean view of the current content.
    fn rewind(&mut self) {
        self.timers.cancel_all();
        self.core.stop();
        self.core.reset();
        self.typewriter = None;
        self.hurry = false;
        self.surface.load(&self.config.paragraphs, &self.config.signature);
        let _ = self.surface.set_visible(false);
        if let Some(field) = self.particles.as_mut() {
            field.clear();
        }
        self.phase = LetterPhase::Hidden;
    }
}
