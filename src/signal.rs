//! One-shot UI signals broadcast by the managers

use tokio::sync::broadcast;
use tracing::trace;
use uuid::Uuid;

/// Transient cues the view layer reacts to once and discards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiSignal {
    /// An event was created; show the celebration animation
    Celebrate,

    /// A locked chapter was tapped; present the paywall
    PaywallPrompt,

    /// A past event still needs its review collected
    ReviewPrompt(Uuid),
}

/// Fan-out hub for [`UiSignal`] values.
///
/// Cloning shares the underlying channel, so every manager holding a clone
/// feeds the same subscribers.
#[derive(Clone)]
pub struct SignalHub {
    tx: broadcast::Sender<UiSignal>,
}

impl SignalHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Subscribe to signals emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<UiSignal> {
        self.tx.subscribe()
    }

    /// Emit a signal. Dropped silently when nobody is listening.
    pub fn emit(&self, signal: UiSignal) {
        if self.tx.send(signal).is_err() {
            trace!("no subscribers for {signal:?}");
        }
    }
}

impl Default for SignalHub {
    fn default() -> Self {
        Self::new()
    }
}
