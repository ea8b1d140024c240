//! The greeting slides: one message at a time, then the completion broadcast.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::SlideConfig;
use crate::error::{InitError, RevealError};
use crate::events::{CompletionBus, SlideHooks};
use crate::sequencer::{Cue, Sequencer, SequencerState};
use crate::slide::SlideCard;
use crate::timers::Timers;

/// What the slide sequence draws on.
///
/// Slots that do not exist are skipped silently, so a surface may hold fewer
/// slots than there are messages.
pub trait SlideSurface {
    fn slot_count(&self) -> usize;
    fn load(&mut self, messages: &[String]);
    fn enter(&mut self, index: usize, previous: Option<usize>) -> Result<(), RevealError>;
    fn show_immediately(&mut self, index: usize);
    fn set_progress(&mut self, _fraction: f32) {}
    fn set_visible(&mut self, visible: bool);
    fn clear(&mut self);
    fn update(&mut self, _dt: Duration) {}
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressBar {
    pub fraction: f32,
}

/// Retained slide container the presenters draw from.
#[derive(Debug, Clone)]
pub struct SlideDeck {
    pub visible: bool,
    cards: Vec<SlideCard>,
    progress: Option<ProgressBar>,
    transition: Duration,
}

impl SlideDeck {
    pub fn new(messages: &[String], transition: Duration, with_progress: bool) -> Self {
        Self {
            visible: true,
            cards: messages
                .iter()
                .map(|message| SlideCard::new(message.as_str(), transition))
                .collect(),
            progress: with_progress.then(ProgressBar::default),
            transition,
        }
    }

    pub fn cards(&self) -> &[SlideCard] {
        &self.cards
    }

    pub fn progress(&self) -> Option<f32> {
        self.progress.map(|bar| bar.fraction)
    }
}

impl SlideSurface for SlideDeck {
    fn slot_count(&self) -> usize {
        self.cards.len()
    }

    fn load(&mut self, messages: &[String]) {
        self.cards = messages
            .iter()
            .map(|message| SlideCard::new(message.as_str(), self.transition))
            .collect();
        self.set_progress(0.0);
    }

    fn enter(&mut self, index: usize, previous: Option<usize>) -> Result<(), RevealError> {
        if let Some(card) = previous.and_then(|previous| self.cards.get_mut(previous)) {
            card.start_exiting();
        }
        let Some(card) = self.cards.get_mut(index) else {
            return Ok(());
        };
        if card.text.trim().is_empty() {
            return Err(RevealError::Blank { index });
        }
        card.start_entering();
        Ok(())
    }

    fn show_immediately(&mut self, index: usize) {
        if let Some(card) = self.cards.get_mut(index) {
            card.show_now();
        }
    }

    fn set_progress(&mut self, fraction: f32) {
        if let Some(bar) = self.progress.as_mut() {
            bar.fraction = fraction.clamp(0.0, 1.0);
        }
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn clear(&mut self) {
        for card in self.cards.iter_mut() {
            card.hide_now();
        }
        self.set_progress(0.0);
    }

    fn update(&mut self, dt: Duration) {
        for card in self.cards.iter_mut() {
            card.update(dt);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chore {
    HideContainer,
}

pub struct SlideSequencer<S: SlideSurface> {
    config: SlideConfig,
    core: Sequencer,
    surface: S,
    hooks: SlideHooks,
    bus: CompletionBus,
    chores: Timers<Chore>,
}

impl<S: SlideSurface> SlideSequencer<S> {
    /// Fails fast when the root container is missing.
    pub fn new(
        config: SlideConfig,
        surface: Option<S>,
        bus: CompletionBus,
        hooks: SlideHooks,
    ) -> Result<Self, InitError> {
        let Some(surface) = surface else {
            error!("slide container missing; slides disabled");
            return Err(InitError::MissingContainer {
                component: "slides",
                element: "root",
            });
        };
        if surface.slot_count() != config.messages.len() {
            warn!(
                slots = surface.slot_count(),
                messages = config.messages.len(),
                "slot count differs from message count; missing slots are skipped"
            );
        }

        let core = Sequencer::uniform("slides", config.messages.len(), config.effective_pacing());
        let autostart = config.autostart;
        let mut sequencer = Self {
            config,
            core,
            surface,
            hooks,
            bus,
            chores: Timers::new(),
        };
        info!(
            messages = sequencer.config.messages.len(),
            reduced_motion = sequencer.config.reduced_motion,
            "slide sequence ready"
        );
        if autostart {
            sequencer.start();
        }
        Ok(sequencer)
    }

    pub fn state(&self) -> SequencerState {
        self.core.state()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.core.current_index()
    }

    pub fn progress(&self) -> f32 {
        self.core.progress()
    }

    pub fn messages(&self) -> &[String] {
        &self.config.messages
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn start(&mut self) {
        let leftover = self.core.current_index().is_some();
        if self.core.start() {
            self.chores.cancel_all();
            if leftover {
                self.surface.clear();
            }
            self.surface.set_visible(true);
        }
        self.flush();
    }

    pub fn pause(&mut self) -> bool {
        self.core.pause()
    }

    pub fn resume(&mut self) -> bool {
        let resumed = self.core.resume();
        self.flush();
        resumed
    }

    pub fn next_slide(&mut self) -> bool {
        let advanced = self.core.next();
        self.flush();
        advanced
    }

    pub fn skip(&mut self) -> bool {
        let skipped = self.core.skip();
        self.flush();
        skipped
    }

    pub fn complete(&mut self) -> bool {
        let completed = self.core.complete();
        self.flush();
        completed
    }

    pub fn stop(&mut self) -> bool {
        self.core.stop()
    }

    pub fn reset(&mut self) -> bool {
        if !self.core.reset() {
            return false;
        }
        self.chores.cancel_all();
        self.surface.clear();
        self.surface.set_visible(true);
        true
    }

    pub fn restart(&mut self) {
        self.core.stop();
        self.reset();
        self.start();
    }

    /// Replaces the messages for the next play-through.
    pub fn set_messages(&mut self, messages: Vec<String>) {
        self.core.stop();
        self.chores.cancel_all();
        self.core = Sequencer::uniform("slides", messages.len(), self.config.effective_pacing());
        self.core.advance_to(self.chores.now());
        self.surface.load(&messages);
        self.surface.set_visible(true);
        self.config.messages = messages;
        info!(messages = self.config.messages.len(), "slide messages replaced");
    }

    pub fn update(&mut self, dt: Duration) {
        let until = self.chores.now() + dt;
        while let Some(at) = [self.chores.next_due(), self.core.next_due()]
            .into_iter()
            .flatten()
            .min()
            .filter(|due| *due <= until)
        {
            self.core.advance_to(at);
            self.chores.advance_to(at);
            self.flush();
            while let Some(chore) = self.chores.pop_due(at) {
                match chore {
                    Chore::HideContainer => {
                        self.surface.set_visible(false);
                        debug!("slide container hidden");
                    }
                }
            }
        }
        self.core.advance_to(until);
        self.chores.advance_to(until);

        self.surface.update(dt);
        self.flush();
    }

    fn flush(&mut self) {
        while let Some(cue) = self.core.next_cue() {
            if let Err(error) = self.apply(cue) {
                warn!(%error, "slide reveal failed; showing the remaining slides at once");
                for index in self.core.abandon() {
                    self.surface.show_immediately(index);
                }
            }
        }
    }

    fn apply(&mut self, cue: Cue) -> Result<(), RevealError> {
        let count = self.config.messages.len();
        match cue {
            Cue::Enter { index, previous } => {
                self.surface.enter(index, previous)?;
                self.surface.set_progress((index + 1) as f32 / count as f32);
                let message = &self.config.messages[index];
                debug!(index, message = message.as_str(), "slide entering");
                if let Some(hook) = self.hooks.on_item_start.as_mut() {
                    hook(index, message);
                }
            }
            Cue::Settled { index } => {
                if let Some(hook) = self.hooks.on_item_complete.as_mut() {
                    hook(index);
                }
                if let Some(hook) = self.hooks.on_progress.as_mut() {
                    hook((index + 1) as f32 / count as f32);
                }
            }
            Cue::Completed(summary) => {
                self.surface.set_progress(1.0);
                if let Some(hook) = self.hooks.on_sequence_complete.as_mut() {
                    hook(summary);
                }
                self.bus.publish(summary);
                self.chores.schedule(self.config.hide_delay, Chore::HideContainer);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::events::SequenceSummary;
    use crate::sequencer::Pacing;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn messages(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    fn config(items: &[&str]) -> SlideConfig {
        SlideConfig {
            messages: messages(items),
            pacing: Pacing {
                transition: ms(50),
                item_delay: ms(100),
                completion_delay: ms(400),
            },
            hide_delay: ms(200),
            autostart: false,
            reduced_motion: false,
        }
    }

    type Log = Rc<RefCell<Vec<String>>>;

    fn recording_hooks(log: &Log) -> SlideHooks {
        let starts = log.clone();
        let completes = log.clone();
        let done = log.clone();
        SlideHooks {
            on_item_start: Some(Box::new(move |index, message: &str| {
                starts.borrow_mut().push(format!("start {index} {message}"))
            })),
            on_item_complete: Some(Box::new(move |index| {
                completes.borrow_mut().push(format!("complete {index}"))
            })),
            on_progress: None,
            on_sequence_complete: Some(Box::new(move |summary| {
                done.borrow_mut()
                    .push(format!("done {} {}", summary.duration_ms, summary.item_count))
            })),
        }
    }

    fn sequencer(
        items: &[&str],
        log: &Log,
        bus: &CompletionBus,
    ) -> SlideSequencer<SlideDeck> {
        let cfg = config(items);
        let deck = SlideDeck::new(&cfg.messages, cfg.pacing.transition, true);
        SlideSequencer::new(cfg, Some(deck), bus.clone(), recording_hooks(log)).unwrap()
    }

    fn run(sequencer: &mut SlideSequencer<SlideDeck>, total: Duration) {
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            sequencer.update(ms(10));
            elapsed += ms(10);
        }
    }

    #[test]
    fn plays_through_and_broadcasts_once() {
        let log = Log::default();
        let bus = CompletionBus::new();
        let mut listener = bus.subscribe();
        let mut slides = sequencer(&["Hi", "Happy", "Day"], &log, &bus);

        slides.start();
        run(&mut slides, ms(740));
        assert_eq!(listener.poll(), None);
        run(&mut slides, ms(10));

        assert_eq!(
            *log.borrow(),
            vec![
                "start 0 Hi",
                "complete 0",
                "start 1 Happy",
                "complete 1",
                "start 2 Day",
                "complete 2",
                "done 750 3",
            ]
        );
        assert_eq!(
            listener.poll(),
            Some(SequenceSummary {
                duration_ms: 750,
                item_count: 3
            })
        );
        assert_eq!(listener.poll(), None);
        assert_eq!(slides.surface().progress(), Some(1.0));
        assert_eq!(slides.state(), SequencerState::Completed);
    }

    #[test]
    fn container_hides_after_the_hide_delay() {
        let log = Log::default();
        let bus = CompletionBus::new();
        let mut slides = sequencer(&["Hi"], &log, &bus);
        slides.start();
        slides.skip();

        assert!(slides.surface().visible);
        run(&mut slides, ms(190));
        assert!(slides.surface().visible);
        run(&mut slides, ms(20));
        assert!(!slides.surface().visible);
    }

    #[test]
    fn skipping_twice_completes_once() {
        let log = Log::default();
        let bus = CompletionBus::new();
        let mut listener = bus.subscribe();
        let mut slides = sequencer(&["Hi", "Happy", "Day"], &log, &bus);
        slides.start();

        assert!(slides.skip());
        assert!(!slides.skip());
        assert!(!slides.complete());
        run(&mut slides, ms(2000));

        let entries = log.borrow();
        assert_eq!(entries.iter().filter(|entry| entry.starts_with("done")).count(), 1);
        assert_eq!(entries.iter().filter(|entry| entry.starts_with("start")).count(), 1);
        assert!(listener.poll().is_some());
        assert!(listener.poll().is_none());
    }

    #[test]
    fn pause_and_resume_never_restart_a_slide() {
        let log = Log::default();
        let bus = CompletionBus::new();
        let mut slides = sequencer(&["Hi", "Happy", "Day"], &log, &bus);
        slides.start();
        run(&mut slides, ms(20));

        assert!(slides.pause());
        run(&mut slides, ms(1000));
        assert!(slides.resume());
        run(&mut slides, ms(1000));

        let starts: Vec<String> = log
            .borrow()
            .iter()
            .filter(|entry| entry.starts_with("start"))
            .cloned()
            .collect();
        assert_eq!(starts, vec!["start 0 Hi", "start 1 Happy", "start 2 Day"]);
    }

    #[test]
    fn blank_slide_falls_back_to_showing_everything() {
        let log = Log::default();
        let bus = CompletionBus::new();
        let mut listener = bus.subscribe();
        let mut slides = sequencer(&["Hi", "   ", "Day"], &log, &bus);
        slides.start();
        run(&mut slides, ms(160));

        assert_eq!(slides.state(), SequencerState::Completed);
        assert_eq!(slides.current_index(), Some(2));
        assert!(slides.surface().cards()[2].visible);
        assert!(listener.poll().is_some());

        run(&mut slides, ms(2000));
        let entries = log.borrow();
        assert_eq!(entries.iter().filter(|entry| entry.starts_with("done")).count(), 1);
        assert!(!entries.iter().any(|entry| entry.starts_with("start 2")));
    }

    #[test]
    fn missing_container_fails_initialization() {
        let result = SlideSequencer::<SlideDeck>::new(
            config(&["Hi"]),
            None,
            CompletionBus::new(),
            SlideHooks::default(),
        );
        assert_eq!(
            result.err(),
            Some(InitError::MissingContainer {
                component: "slides",
                element: "root"
            })
        );
    }

    #[test]
    fn missing_slots_are_skipped() {
        let cfg = config(&["Hi", "Happy", "Day"]);
        let deck = SlideDeck::new(&cfg.messages[..1], cfg.pacing.transition, false);
        let bus = CompletionBus::new();
        let mut listener = bus.subscribe();
        let mut slides = SlideSequencer::new(cfg, Some(deck), bus, SlideHooks::default()).unwrap();

        slides.start();
        run(&mut slides, ms(800));
        assert!(listener.poll().is_some());
        assert_eq!(slides.surface().progress(), None);
    }

    #[test]
    fn reset_clears_the_deck() {
        let log = Log::default();
        let bus = CompletionBus::new();
        let mut slides = sequencer(&["Hi", "Happy"], &log, &bus);
        slides.start();
        run(&mut slides, ms(100));
        assert!(!slides.reset());

        slides.skip();
        assert!(slides.reset());
        assert_eq!(slides.state(), SequencerState::Idle);
        assert_eq!(slides.current_index(), None);
        assert!(slides.surface().cards().iter().all(|card| !card.visible));
        assert_eq!(slides.surface().progress(), Some(0.0));
    }

    #[test]
    fn starting_again_mid_run_clears_the_old_slide() {
        let log = Log::default();
        let bus = CompletionBus::new();
        let mut slides = sequencer(&["Hi", "Happy", "Day"], &log, &bus);

        slides.start();
        run(&mut slides, ms(200));
        assert_eq!(slides.current_index(), Some(1));
        assert!(slides.stop());
        slides.start();
        run(&mut slides, ms(100));
        let visible: Vec<bool> = slides.surface().cards().iter().map(|card| card.visible).collect();
        assert_eq!(visible, vec![true, false, false]);

        run(&mut slides, ms(100));
        assert_eq!(slides.current_index(), Some(1));
        assert!(slides.pause());
        slides.start();
        assert_eq!(slides.state(), SequencerState::Playing);
        run(&mut slides, ms(100));
        let visible: Vec<bool> = slides.surface().cards().iter().map(|card| card.visible).collect();
        assert_eq!(visible, vec![true, false, false]);
    }

    #[test]
    fn restart_runs_a_second_play_through() {
        let log = Log::default();
        let bus = CompletionBus::new();
        let mut listener = bus.subscribe();
        let mut slides = sequencer(&["Hi"], &log, &bus);
        slides.start();
        run(&mut slides, ms(500));
        slides.restart();
        run(&mut slides, ms(500));

        assert!(listener.poll().is_some());
        assert!(listener.poll().is_some());
        assert!(listener.poll().is_none());
    }

    #[test]
    fn reduced_motion_shortens_the_timeline() {
        let mut cfg = config(&["Hi", "Happy", "Day"]);
        cfg.reduced_motion = true;
        cfg.autostart = true;
        let deck = SlideDeck::new(&cfg.messages, cfg.effective_pacing().transition, true);
        let bus = CompletionBus::new();
        let mut listener = bus.subscribe();
        let mut slides = SlideSequencer::new(cfg, Some(deck), bus, SlideHooks::default()).unwrap();

        assert_eq!(slides.state(), SequencerState::Playing);
        run(&mut slides, ms(150));
        assert_eq!(
            listener.poll(),
            Some(SequenceSummary {
                duration_ms: 150,
                item_count: 3
            })
        );
    }

    #[test]
    fn replacing_messages_prepares_a_fresh_run() {
        let log = Log::default();
        let bus = CompletionBus::new();
        let mut slides = sequencer(&["Hi"], &log, &bus);
        slides.start();
        run(&mut slides, ms(500));

        slides.set_messages(messages(&["One", "Two"]));
        assert_eq!(slides.state(), SequencerState::Idle);
        assert_eq!(slides.surface().cards().len(), 2);
        slides.start();
        assert_eq!(log.borrow().last().map(String::as_str), Some("start 0 One"));
    }
}
