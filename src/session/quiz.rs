use rand::Rng;

use crate::audio::{AudioResolver, Outcome};
use crate::config::Settings;
use crate::inventory::{Inventory, Symbol};
use crate::queue::{OptionSet, SessionQueue, build_option_set, build_queue};
use crate::session::result::{PracticeMode, SessionResult};

/// Listening quiz: a letter is spoken and the child picks it from a set of
/// options. Only the first answer to each question counts.
pub struct QuizSession {
    inventory: Inventory,
    settings: Settings,
    resolver: AudioResolver,
    queue: SessionQueue,
    index: usize,
    options: Option<OptionSet>,
    selected: Option<String>,
    score: usize,
}

impl QuizSession {
    pub fn new<R: Rng + ?Sized>(
        inventory: Inventory,
        settings: Settings,
        resolver: AudioResolver,
        rng: &mut R,
    ) -> Self {
        let queue = build_queue(&inventory, &settings, rng);
        let mut session = Self {
            inventory,
            settings,
            resolver,
            queue,
            index: 0,
            options: None,
            selected: None,
            score: 0,
        };
        session.options = session.build_options(rng);
        session
    }

    fn build_options<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<OptionSet> {
        let target = self.queue.get(self.index)?;
        Some(build_option_set(
            target,
            &self.inventory,
            &self.settings,
            self.settings.quiz_option_count,
            rng,
        ))
    }

    pub fn current(&self) -> Option<&Symbol> {
        self.queue.get(self.index)
    }

    pub fn options(&self) -> Option<&OptionSet> {
        self.options.as_ref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
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

    pub fn progress(&self) -> f64 {
        if self.queue.is_empty() {
            return 1.0;
        }
        (self.index as f64 / self.queue.len() as f64).min(1.0)
    }

    /// Speaks the current question's letter.
    pub async fn play_prompt(&self) -> Outcome {
        match self.current() {
            Some(symbol) => self.resolver.resolve(symbol, &self.settings).await,
            None => Outcome::Silent,
        }
    }

    /// Records the first answer to the current question. Returns whether it
    /// was correct, or `None` if the question was already answered or the
    /// session is over.
    pub fn answer(&mut self, id: &str) -> Option<bool> {
        if self.selected.is_some() {
            return None;
        }
        let options = self.options.as_ref()?;
        let correct = options.is_correct(id);
        if correct {
            self.score += 1;
        }
        self.selected = Some(id.to_string());
        Some(correct)
    }

    /// Moves to the next question. Returns `false` once the queue is exhausted.
    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.is_finished() {
            return false;
        }
        self.index += 1;
        self.selected = None;
        self.resolver.advance();
        self.options = self.build_options(rng);
        !self.is_finished()
    }

    pub fn result(&self) -> SessionResult {
        SessionResult::new(PracticeMode::Quiz, self.score, self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullSink;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::sync::Arc;

    fn quiz(limit: i64, rng: &mut SmallRng) -> QuizSession {
        let settings = Settings {
            session_limit: Some(limit),
            quiz_option_count: 4,
            ..Settings::default()
        };
        let resolver = AudioResolver::with_strategies(Arc::new(NullSink), Vec::new());
        QuizSession::new(Inventory::ukrainian(), settings, resolver, rng)
    }

    #[test]
    fn test_first_answer_only_counts() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut session = quiz(5, &mut rng);
        let target = session.current().unwrap().id.clone();
        assert_eq!(session.answer(&target), Some(true));
        assert_eq!(session.answer(&target), None);
        assert_eq!(session.score(), 1);
        assert_eq!(session.selected(), Some(target.as_str()));
    }

    #[test]
    fn test_wrong_answer_scores_nothing() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut session = quiz(5, &mut rng);
        let target = session.current().unwrap().id.clone();
        let wrong = session
            .options()
            .unwrap()
            .options()
            .iter()
            .find(|s| s.id != target)
            .unwrap()
            .id
            .clone();
        assert_eq!(session.answer(&wrong), Some(false));
        assert_eq!(session.answer(&target), None);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_every_question_holds_its_target() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut session = quiz(10, &mut rng);
        loop {
            let target = session.current().unwrap().id.clone();
            let options = session.options().unwrap();
            assert_eq!(options.len(), 4);
            assert!(options.contains(&target));
            if !session.next(&mut rng) {
                break;
            }
        }
        assert!(session.is_finished());
        assert!(session.options().is_none());
        assert_eq!(session.progress(), 1.0);
    }

    #[test]
    fn test_full_run_result() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut session = quiz(6, &mut rng);
        let mut answered = 0;
        while !session.is_finished() {
            if answered % 2 == 0 {
                let target = session.current().unwrap().id.clone();
                session.answer(&target);
            }
            answered += 1;
            session.next(&mut rng);
        }
        assert_eq!(answered, 6);
        let result = session.result();
        assert_eq!(result.mode, PracticeMode::Quiz);
        assert_eq!(result.score, 3);
        assert_eq!(result.total, 6);
        assert!(!session.next(&mut rng));
        assert_eq!(session.answer("А"), None);
    }

    #[tokio::test]
    async fn test_next_marks_audio_stale() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut session = quiz(3, &mut rng);
        let before = session.resolver.generation();
        session.next(&mut rng);
        assert_eq!(session.resolver.generation(), before + 1);
        // No tiers configured: nothing to play.
        assert_eq!(session.play_prompt().await, Outcome::Silent);
    }
}
