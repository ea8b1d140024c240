//! The cooperative state machine shared by the slide sequence and the letter.
//!
//! A [`Sequencer`] only knows about item indices and durations. It queues
//! [`Cue`]s that its owner drains with [`Sequencer::next_cue`] and applies to
//! whatever it draws on, so the same core drives slides (fixed transition per
//! item) and letter paragraphs (transition = time needed to type the words).

use std::collections::VecDeque;
use std::ops::Range;
use std::time::Duration;

use tracing::{debug, info};

use crate::constants::*;
use crate::events::SequenceSummary;
use crate::timers::Timers;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Playing,
    Paused,
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pacing {
    pub transition: Duration,
    pub item_delay: Duration,
    pub completion_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            transition: SLIDE_TRANSITION,
            item_delay: SLIDE_DELAY,
            completion_delay: COMPLETION_DELAY,
        }
    }
}

impl Pacing {
    /// Shortened timings for reduced-motion mode.
    pub fn reduced(self) -> Self {
        Self {
            transition: self.transition / REDUCED_MOTION_DIVISOR,
            item_delay: self.item_delay / REDUCED_MOTION_DIVISOR,
            completion_delay: self.completion_delay / REDUCED_MOTION_DIVISOR,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Reveal(usize),
    Settle(usize),
    Finish,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// Item `index` starts its entrance; `previous` starts leaving.
    Enter {
        index: usize,
        previous: Option<usize>,
    },
    /// The entrance of `index` is over.
    Settled { index: usize },
    Completed(SequenceSummary),
}

#[derive(Debug)]
pub struct Sequencer {
    label: &'static str,
    transitions: Vec<Duration>,
    item_delay: Duration,
    completion_delay: Duration,

    state: SequencerState,
    current: Option<usize>,
    settled: Option<usize>,
    started_at: Option<Duration>,

    timers: Timers<Step>,
    cues: VecDeque<Cue>,
}

impl Sequencer {
    pub fn new(
        label: &'static str,
        transitions: Vec<Duration>,
        item_delay: Duration,
        completion_delay: Duration,
    ) -> Self {
        Self {
            label,
            transitions,
            item_delay,
            completion_delay,
            state: SequencerState::Idle,
            current: None,
            settled: None,
            started_at: None,
            timers: Timers::new(),
            cues: VecDeque::new(),
        }
    }

    /// Every item uses the same transition.
    pub fn uniform(label: &'static str, len: usize, pacing: Pacing) -> Self {
        Self::new(
            label,
            vec![pacing.transition; len],
            pacing.item_delay,
            pacing.completion_delay,
        )
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// `None` before the first item is shown.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at
            .map_or(Duration::ZERO, |start| self.timers.now().saturating_sub(start))
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn progress(&self) -> f32 {
        if self.state == SequencerState::Completed {
            return 1.0;
        }
        match self.current {
            Some(index) if !self.is_empty() => (index + 1) as f32 / self.len() as f32,
            _ => 0.0,
        }
    }

    pub fn next_cue(&mut self) -> Option<Cue> {
        self.cues.pop_front()
    }

    pub fn start(&mut self) -> bool {
        if matches!(self.state, SequencerState::Playing | SequencerState::Completed) {
            return false;
        }
        self.timers.cancel_all();
        self.state = SequencerState::Playing;
        self.started_at = Some(self.timers.now());
        self.current = None;
        self.settled = None;
        info!(sequence = self.label, items = self.len(), "sequence started");
        self.play_from(0);
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.state != SequencerState::Playing {
            return false;
        }
        let cancelled = self.timers.cancel_all();
        self.state = SequencerState::Paused;
        debug!(sequence = self.label, index = ?self.current, cancelled, "paused");
        true
    }

    /// Continues with the item after the current one; the current item is not shown again.
    pub fn resume(&mut self) -> bool {
        if self.state != SequencerState::Paused {
            return false;
        }
        self.state = SequencerState::Playing;
        debug!(sequence = self.label, index = ?self.current, "resumed");
        self.settle_current();
        self.play_from(self.following());
        true
    }

    /// Manual advance. Ignored outside `Playing` and on the last item.
    pub fn next(&mut self) -> bool {
        if self.state != SequencerState::Playing {
            return false;
        }
        let next = self.following();
        if next >= self.len() {
            return false;
        }
        self.timers.cancel_all();
        self.settle_current();
        self.reveal(next);
        true
    }

    pub fn skip(&mut self) -> bool {
        if !matches!(self.state, SequencerState::Playing | SequencerState::Paused) {
            return false;
        }
        debug!(sequence = self.label, index = ?self.current, "skipped");
        self.complete()
    }

    pub fn complete(&mut self) -> bool {
        if self.state == SequencerState::Completed {
            return false;
        }
        self.timers.cancel_all();
        self.state = SequencerState::Completed;
        let summary = SequenceSummary {
            duration_ms: self.elapsed().as_millis() as u64,
            item_count: self.len(),
        };
        info!(
            sequence = self.label,
            duration_ms = summary.duration_ms,
            items = summary.item_count,
            "sequence complete"
        );
        self.cues.push_back(Cue::Completed(summary));
        true
    }

    /// Cancels pending work and returns to `Idle`, keeping whatever is shown.
    pub fn stop(&mut self) -> bool {
        if !matches!(self.state, SequencerState::Playing | SequencerState::Paused) {
            return false;
        }
        self.timers.cancel_all();
        self.state = SequencerState::Idle;
        true
    }

    pub fn reset(&mut self) -> bool {
        if self.state == SequencerState::Playing {
            return false;
        }
        self.timers.cancel_all();
        self.cues.clear();
        self.state = SequencerState::Idle;
        self.current = None;
        self.settled = None;
        self.started_at = None;
        true
    }

    pub fn restart(&mut self) -> bool {
        self.stop();
        self.reset();
        self.start()
    }

    /// Failure path: drops queued work, completes, and hands back the items
    /// the owner still has to show without animation.
    pub fn abandon(&mut self) -> Range<usize> {
        self.timers.cancel_all();
        self.cues.clear();
        let from = self.current.unwrap_or(0);
        if !self.is_empty() {
            self.current = Some(self.len() - 1);
        }
        self.complete();
        from..self.len()
    }

    pub fn update(&mut self, dt: Duration) {
        self.advance_to(self.timers.now() + dt);
    }

    /// Fires every step due by `until`, then moves the clock there. Owners with
    /// timers of their own use this with [`Sequencer::next_due`] to keep both
    /// clocks on the same instant.
    pub fn advance_to(&mut self, until: Duration) {
        while let Some(step) = self.timers.pop_due(until) {
            self.fire(step);
        }
        self.timers.advance_to(until);
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    fn fire(&mut self, step: Step) {
        if self.state != SequencerState::Playing {
            return;
        }
        match step {
            Step::Reveal(index) => self.reveal(index),
            Step::Settle(index) => {
                self.settle(index);
                if index + 1 < self.len() {
                    self.timers.schedule(self.item_delay, Step::Reveal(index + 1));
                } else {
                    self.timers.schedule(self.completion_delay, Step::Finish);
                }
            }
            Step::Finish => {
                self.complete();
            }
        }
    }

    fn following(&self) -> usize {
        self.current.map_or(0, |index| index + 1)
    }

    fn play_from(&mut self, index: usize) {
        if index < self.len() {
            self.reveal(index);
        } else {
            self.timers.schedule(self.completion_delay, Step::Finish);
        }
    }

    fn reveal(&mut self, index: usize) {
        let previous = self.current;
        self.current = Some(index);
        self.cues.push_back(Cue::Enter { index, previous });
        self.timers.schedule(self.transitions[index], Step::Settle(index));
    }

    fn settle_current(&mut self) {
        if let Some(index) = self.current {
            self.settle(index);
        }
    }

    fn settle(&mut self, index: usize) {
        if self.settled.is_some_and(|settled| settled >= index) {
            return;
        }
        self.settled = Some(index);
        self.cues.push_back(Cue::Settled { index });
    }
}
