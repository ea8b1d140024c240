//! Composition root: builds both components on one completion bus and routes controls.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{LetterConfig, SlideConfig};
use crate::content::Customization;
use crate::error::AppError;
use crate::events::{CompletionBus, LetterHooks, SEQUENCE_COMPLETE, SequenceSummary, SlideHooks};
use crate::letter::{LetterPhase, LetterRevealer, LetterSheet, SIGNATURE_MARK};
use crate::particles::Particle;
use crate::sequencer::SequencerState;
use crate::slideshow::{SlideDeck, SlideSequencer};
use crate::stage::Mounts;

fn slide_hooks() -> SlideHooks {
    SlideHooks {
        on_item_start: None,
        on_item_complete: Some(Box::new(|index| debug!(index, "slide settled"))),
        on_progress: Some(Box::new(|fraction| debug!(fraction, "slide progress"))),
        on_sequence_complete: Some(Box::new(|summary| {
            let payload = serde_json::to_string(&summary).unwrap_or_default();
            info!(event = SEQUENCE_COMPLETE, %payload, "slides done");
        })),
    }
}

fn letter_hooks() -> LetterHooks {
    LetterHooks {
        on_show: Some(Box::new(|| debug!("letter shown"))),
        on_hide: None,
        on_content_complete: Some(Box::new(|| info!("greeting finished"))),
        on_heart_spawn: Some(Box::new(|particle: &Particle| {
            debug!(id = particle.id, x = particle.x, y = particle.y, "heart")
        })),
    }
}

pub struct AppContext {
    bus: CompletionBus,
    slides: Option<SlideSequencer<SlideDeck>>,
    letter: Option<LetterRevealer<LetterSheet>>,
}

impl AppContext {
    /// Either component may be missing; with neither there is nothing to show.
    pub fn new(slides: SlideConfig, letter: LetterConfig, mounts: Mounts) -> Result<Self, AppError> {
        let bus = CompletionBus::new();
        // The letter subscribes before the slides can possibly finish.
        let letter = LetterRevealer::new(letter, mounts.letter, &bus, letter_hooks());
        let slides = SlideSequencer::new(slides, mounts.slides, bus.clone(), slide_hooks());

        match (slides, letter) {
            (Err(slides), Err(letter)) => Err(AppError::NothingToShow { slides, letter }),
            (slides, letter) => {
                let letter = letter
                    .inspect_err(|error| warn!(%error, "continuing without the letter"))
                    .ok();
                let slides = match slides {
                    Ok(slides) => Some(slides),
                    Err(error) => {
                        warn!(%error, "continuing without slides; releasing the letter");
                        bus.publish(SequenceSummary {
                            duration_ms: 0,
                            item_count: 0,
                        });
                        None
                    }
                };
                Ok(Self { bus, slides, letter })
            }
        }
    }

    pub fn bus(&self) -> &CompletionBus {
        &self.bus
    }

    pub fn slides(&self) -> Option<&SlideSequencer<SlideDeck>> {
        self.slides.as_ref()
    }

    pub fn letter(&self) -> Option<&LetterRevealer<LetterSheet>> {
        self.letter.as_ref()
    }

    pub fn start(&mut self) {
        if let Some(slides) = self.slides.as_mut() {
            slides.start();
        }
    }

    /// Slides first, so a completion broadcast reaches the letter in the same frame.
    pub fn update(&mut self, dt: Duration) {
        if let Some(slides) = self.slides.as_mut() {
            slides.update(dt);
        }
        if let Some(letter) = self.letter.as_mut() {
            letter.update(dt);
        }
    }

    /// Pauses or resumes whichever component is running, or starts slides that
    /// were never started. Returns whether something is paused now.
    pub fn toggle_pause(&mut self) -> bool {
        if let Some(letter) = self.letter.as_mut().filter(|letter| letter_running(letter)) {
            if letter.state() == SequencerState::Paused {
                letter.resume();
            } else {
                letter.pause();
            }
            return letter.state() == SequencerState::Paused;
        }
        let Some(slides) = self.slides.as_mut() else {
            return false;
        };
        match slides.state() {
            SequencerState::Idle => {
                slides.start();
            }
            SequencerState::Paused => {
                slides.resume();
            }
            SequencerState::Playing | SequencerState::Completed => {
                slides.pause();
            }
        }
        slides.state() == SequencerState::Paused
    }

    pub fn next(&mut self) -> bool {
        self.slides.as_mut().is_some_and(|slides| slides.next_slide())
    }

    /// Skips the slides, or the letter once the slides are done.
    pub fn skip(&mut self) -> bool {
        if let Some(letter) = self.letter.as_mut().filter(|letter| letter_running(letter)) {
            return letter.skip();
        }
        self.slides.as_mut().is_some_and(|slides| slides.skip())
    }

    pub fn pointer(&mut self, x: f32, y: f32) -> bool {
        self.letter.as_mut().is_some_and(|letter| letter.pointer(x, y))
    }

    pub fn toggle_particles(&mut self) -> bool {
        self.letter.as_mut().is_some_and(|letter| letter.toggle_particles())
    }

    pub fn replay(&mut self) {
        if let Some(letter) = self.letter.as_mut() {
            info!("letter replay");
            letter.replay();
        }
    }

    pub fn is_finished(&self) -> bool {
        match (&self.letter, &self.slides) {
            (Some(letter), _) => letter.is_complete(),
            (None, Some(slides)) => slides.state() == SequencerState::Completed,
            (None, None) => true,
        }
    }
}

fn letter_running(letter: &LetterRevealer<LetterSheet>) -> bool {
    !matches!(letter.phase(), LetterPhase::Hidden | LetterPhase::Complete)
}

/// Non-animated rendition of the whole greeting, used when nothing can be mounted.
pub fn static_fallback(content: &Customization) -> String {
    let mut out = String::new();
    for message in content.messages.iter() {
        out.push_str(message);
        out.push('\n');
    }
    for paragraph in content.paragraphs() {
        out.push('\n');
        out.push_str(&paragraph);
        out.push('\n');
    }
    let signature = content.signature();
    out.push_str(&format!(
        "\n{}\n{} {}\n",
        signature.closing, signature.name, SIGNATURE_MARK
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::LetterContent;
    use crate::error::InitError;
    use crate::sequencer::Pacing;
    use crate::stage::{MountOptions, Stage};

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn configs() -> (SlideConfig, LetterConfig) {
        let slides = SlideConfig {
            messages: vec!["Happy".to_string(), "Birthday".to_string()],
            pacing: Pacing {
                transition: ms(50),
                item_delay: ms(100),
                completion_delay: ms(100),
            },
            hide_delay: ms(100),
            autostart: true,
            reduced_motion: false,
        };
        let letter = LetterConfig {
            paragraphs: vec!["Dear you.".to_string(), "Love it".to_string()],
            word_delay: ms(10),
            paragraph_delay: ms(20),
            entrance_delay: ms(50),
            entrance_duration: ms(50),
            signature_delay: ms(20),
            signature_step: ms(20),
            particles: false,
            ..LetterConfig::default()
        };
        (slides, letter)
    }

    fn app(options: MountOptions) -> Result<AppContext, AppError> {
        let (slides, letter) = configs();
        let mounts = Stage::new(800.0, 600.0).mount(&slides, &letter, options);
        AppContext::new(slides, letter, mounts)
    }

    fn run_until_finished(app: &mut AppContext) -> Duration {
        let mut elapsed = Duration::ZERO;
        while !app.is_finished() {
            app.update(ms(10));
            elapsed += ms(10);
            assert!(elapsed < Duration::from_secs(10), "greeting never finished");
        }
        elapsed
    }

    #[test]
    fn slides_hand_over_to_the_letter() {
        let mut app = app(MountOptions::default()).unwrap();
        app.start();

        app.update(ms(10));
        assert_eq!(app.slides().map(|slides| slides.state()), Some(SequencerState::Playing));
        assert_eq!(app.letter().map(|letter| letter.phase()), Some(LetterPhase::Hidden));

        run_until_finished(&mut app);
        assert_eq!(
            app.slides().map(|slides| slides.state()),
            Some(SequencerState::Completed)
        );
        let sheet = app.letter().map(|letter| letter.surface().paragraphs().to_vec());
        assert!(sheet.is_some_and(|views| views.iter().all(|view| view.complete)));
    }

    #[test]
    fn missing_slides_release_the_letter_at_once() {
        let mut app = app(MountOptions {
            slides: false,
            ..MountOptions::default()
        })
        .unwrap();
        assert!(app.slides().is_none());

        app.update(ms(10));
        assert_eq!(app.letter().map(|letter| letter.phase()), Some(LetterPhase::Waiting));
        run_until_finished(&mut app);
    }

    #[test]
    fn missing_letter_still_plays_the_slides() {
        let mut app = app(MountOptions {
            letter: false,
            ..MountOptions::default()
        })
        .unwrap();
        assert!(app.letter().is_none());
        assert!(!app.pointer(1.0, 1.0));
        run_until_finished(&mut app);
    }

    #[test]
    fn nothing_mounted_is_an_error() {
        let result = app(MountOptions {
            slides: false,
            letter: false,
            progress: false,
        });
        match result {
            Err(AppError::NothingToShow { slides, letter }) => {
                assert!(matches!(slides, InitError::MissingContainer { component: "slides", .. }));
                assert!(matches!(letter, InitError::MissingContainer { component: "letter", .. }));
            }
            Ok(_) => panic!("expected NothingToShow"),
        }
    }

    #[test]
    fn controls_reach_the_running_component() {
        let mut app = app(MountOptions::default()).unwrap();
        app.update(ms(10));
        assert!(app.next());
        assert!(!app.next());

        assert!(app.toggle_pause());
        assert_eq!(app.slides().map(|slides| slides.state()), Some(SequencerState::Paused));
        assert!(!app.toggle_pause());

        assert!(app.skip());
        assert_eq!(
            app.slides().map(|slides| slides.state()),
            Some(SequencerState::Completed)
        );

        // Slides are done; once the letter is underway the controls move to it.
        while app.letter().map(|letter| letter.phase()) == Some(LetterPhase::Hidden) {
            app.update(ms(10));
        }
        assert!(app.skip());
        assert!(app.is_finished());

        app.replay();
        assert!(!app.is_finished());
        run_until_finished(&mut app);
    }

    #[test]
    fn space_starts_slides_that_were_held_back() {
        let (mut slides, letter) = configs();
        slides.autostart = false;
        let mounts = Stage::new(800.0, 600.0).mount(&slides, &letter, MountOptions::default());
        let mut app = AppContext::new(slides, letter, mounts).unwrap();

        app.update(ms(500));
        assert_eq!(app.slides().map(|slides| slides.state()), Some(SequencerState::Idle));
        assert!(!app.toggle_pause());
        assert_eq!(app.slides().map(|slides| slides.state()), Some(SequencerState::Playing));
        run_until_finished(&mut app);
    }

    #[test]
    fn fallback_lists_the_whole_greeting() {
        let content = Customization {
            messages: vec!["Hi".to_string(), "There".to_string()],
            letter_text: LetterContent::Html("<p>One</p><p>Two</p>".to_string()),
            signature: "Sam".to_string(),
            last_modified: None,
        };
        let text = static_fallback(&content);
        assert!(text.starts_with("Hi\nThere\n"));
        assert!(text.contains("\nOne\n"));
        assert!(text.contains("\nTwo\n"));
        assert!(text.ends_with("Sam ♥\n"));
    }
}
