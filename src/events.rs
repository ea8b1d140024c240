//! Completion broadcast and the optional hook sets of both components.

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::debug;

use crate::particles::Particle;

pub const SEQUENCE_COMPLETE: &str = "slideSequenceComplete";

/// Payload of the one-shot "sequence complete" notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceSummary {
    pub duration_ms: u64,
    pub item_count: usize,
}

/// Zero-or-more subscriber broadcast owned by the composition root.
///
/// Publishers never learn who listens and never wait for an acknowledgment,
/// so either side can be absent without the other failing.
#[derive(Clone, Debug)]
pub struct CompletionBus {
    tx: broadcast::Sender<SequenceSummary>,
}

impl Default for CompletionBus {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(8);
        Self { tx }
    }

    pub fn subscribe(&self) -> CompletionListener {
        CompletionListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Returns how many listeners received the notification.
    pub fn publish(&self, summary: SequenceSummary) -> usize {
        match self.tx.send(summary) {
            Ok(receivers) => {
                debug!(event = SEQUENCE_COMPLETE, receivers, ?summary, "broadcast");
                receivers
            }
            Err(_) => {
                debug!(event = SEQUENCE_COMPLETE, "broadcast without listeners");
                0
            }
        }
    }
}

#[derive(Debug)]
pub struct CompletionListener {
    rx: broadcast::Receiver<SequenceSummary>,
}

impl CompletionListener {
    /// Non-blocking; meant to be called once per frame.
    pub fn poll(&mut self) -> Option<SequenceSummary> {
        loop {
            match self.rx.try_recv() {
                Ok(summary) => return Some(summary),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

#[derive(Default)]
pub struct SlideHooks {
    pub on_item_start: Option<Box<dyn FnMut(usize, &str)>>,
    pub on_item_complete: Option<Box<dyn FnMut(usize)>>,
    pub on_progress: Option<Box<dyn FnMut(f32)>>,
    pub on_sequence_complete: Option<Box<dyn FnMut(SequenceSummary)>>,
}

#[derive(Default)]
pub struct LetterHooks {
    pub on_show: Option<Box<dyn FnMut()>>,
    pub on_hide: Option<Box<dyn FnMut()>>,
    pub on_content_complete: Option<Box<dyn FnMut()>>,
    pub on_heart_spawn: Option<Box<dyn FnMut(&Particle)>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listener_sees_each_notification_once() {
        let bus = CompletionBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        let summary = SequenceSummary {
            duration_ms: 750,
            item_count: 3,
        };

        assert_eq!(bus.publish(summary), 2);
        assert_eq!(first.poll(), Some(summary));
        assert_eq!(first.poll(), None);
        assert_eq!(second.poll(), Some(summary));
    }

    #[test]
    fn publishing_without_listeners_is_harmless() {
        let bus = CompletionBus::new();
        let summary = SequenceSummary {
            duration_ms: 0,
            item_count: 0,
        };
        assert_eq!(bus.publish(summary), 0);

        // Subscribers only see what is published after they subscribe.
        let mut late = bus.subscribe();
        assert_eq!(late.poll(), None);
    }

    #[test]
    fn payload_serializes_in_camel_case() {
        let summary = SequenceSummary {
            duration_ms: 12,
            item_count: 2,
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(json, r#"{"durationMs":12,"itemCount":2}"#);
    }
}
