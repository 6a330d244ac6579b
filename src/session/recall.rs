use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;

use crate::audio::{AudioResolver, Outcome};
use crate::config::Settings;
use crate::inventory::{Inventory, Symbol};
use crate::queue::{SessionQueue, recall_order};
use crate::session::countdown::RevealCountdown;

/// Flash-card practice: the child names the letter aloud before the
/// countdown runs out, then hears the answer.
pub struct RecallSession {
    order: SessionQueue,
    index: usize,
    settings: Settings,
    resolver: AudioResolver,
    countdown: Option<RevealCountdown>,
    revealed: Arc<AtomicBool>,
    viewed: usize,
}

impl RecallSession {
    pub fn new<R: Rng + ?Sized>(
        inventory: &Inventory,
        settings: Settings,
        resolver: AudioResolver,
        rng: &mut R,
    ) -> Self {
        Self {
            order: recall_order(inventory, rng),
            index: 0,
            settings,
            resolver,
            countdown: None,
            revealed: Arc::new(AtomicBool::new(false)),
            viewed: 0,
        }
    }

    /// Shows the first card and starts its countdown.
    pub fn start(&mut self) {
        if self.order.is_empty() {
            return;
        }
        self.viewed = 1;
        self.restart_countdown();
    }

    pub fn current(&self) -> Option<&Symbol> {
        self.order.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Cards shown since `start`, counting repeats after wrapping around.
    pub fn viewed(&self) -> usize {
        self.viewed
    }

    pub fn remaining_secs(&self) -> Option<u32> {
        self.countdown.as_ref().map(|c| c.remaining())
    }

    pub fn countdown(&self) -> Option<&RevealCountdown> {
        self.countdown.as_ref()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed.load(Ordering::SeqCst)
    }

    /// Moves to the next card, wrapping around at the end.
    pub fn advance(&mut self) {
        if self.order.is_empty() {
            return;
        }
        self.index = (self.index + 1) % self.order.len();
        self.viewed += 1;
        self.resolver.advance();
        self.restart_countdown();
    }

    /// Plays the current card's pronunciation now, e.g. on a repeat tap.
    pub async fn reveal(&self) -> Outcome {
        let Some(symbol) = self.current() else {
            return Outcome::Silent;
        };
        self.revealed.store(true, Ordering::SeqCst);
        self.resolver.resolve(symbol, &self.settings).await
    }

    pub fn stop(&mut self) {
        self.countdown = None;
        self.resolver.advance();
    }

    fn restart_countdown(&mut self) {
        // Drop the old countdown first so its reveal can never fire late.
        self.countdown = None;
        self.revealed = Arc::new(AtomicBool::new(false));
        let Some(symbol) = self.current().cloned() else {
            return;
        };
        let resolver = self.resolver.clone();
        let settings = self.settings.clone();
        let revealed = self.revealed.clone();
        self.countdown = Some(RevealCountdown::start(
            self.settings.reveal_after_secs,
            async move {
                revealed.store(true, Ordering::SeqCst);
                resolver.resolve(&symbol, &settings).await;
            },
        ));
    }
}
