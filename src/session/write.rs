use image::RgbaImage;
use rand::Rng;

use crate::audio::{AudioResolver, Outcome};
use crate::config::Settings;
use crate::drawing::DrawingVerifier;
use crate::inventory::{Inventory, Symbol};
use crate::queue::{SessionQueue, build_queue};
use crate::session::result::{PracticeMode, SessionResult};

/// Dictation: a letter is spoken, the child draws it and the drawing is
/// checked remotely. An item scores at most once, however many retries.
pub struct WriteSession {
    settings: Settings,
    resolver: AudioResolver,
    verifier: DrawingVerifier,
    queue: SessionQueue,
    index: usize,
    verdict: Option<bool>,
    credited: bool,
    score: usize,
}

impl WriteSession {
    pub fn new<R: Rng + ?Sized>(
        inventory: &Inventory,
        settings: Settings,
        resolver: AudioResolver,
        verifier: DrawingVerifier,
        rng: &mut R,
    ) -> Self {
        Self {
            queue: build_queue(inventory, &settings, rng),
            settings,
            resolver,
            verifier,
            index: 0,
            verdict: None,
            credited: false,
            score: 0,
        }
    }

    pub fn current(&self) -> Option<&Symbol> {
        self.queue.get(self.index)
    }

    /// Verdict for the current attempt, if it has been checked.
    pub fn verdict(&self) -> Option<bool> {
        self.verdict
    }

    /// Whether the visual hint may be drawn behind the canvas.
    pub fn show_hint(&self) -> bool {
        self.settings.show_visual_hint
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.queue.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.queue.len()
    }

    pub async fn play_prompt(&self) -> Outcome {
        match self.current() {
            Some(symbol) => self.resolver.resolve(symbol, &self.settings).await,
            None => Outcome::Silent,
        }
    }

    /// Checks the drawing for the current item. Once a verdict exists it is
    /// returned as-is until [`retry`](Self::retry) clears it.
    pub async fn check(&mut self, drawing: &RgbaImage) -> bool {
        if let Some(verdict) = self.verdict {
            return verdict;
        }
        let Some(symbol) = self.queue.get(self.index) else {
            return false;
        };
        let verdict = self.verifier.verify(drawing, symbol, &self.settings).await;
        if verdict && !self.credited {
            self.credited = true;
            self.score += 1;
        }
        self.verdict = Some(verdict);
        verdict
    }

    /// Erase and try the same item again.
    pub fn retry(&mut self) {
        self.verdict = None;
    }

    /// Returns `false` once the queue is exhausted.
    pub fn next(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.index += 1;
        self.verdict = None;
        self.credited = false;
        self.resolver.advance();
        !self.is_finished()
    }

    pub fn result(&self) -> SessionResult {
        SessionResult::new(PracticeMode::Write, self.score, self.total())
    }
}
