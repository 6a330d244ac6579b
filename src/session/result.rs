use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeMode {
    Recall,
    Quiz,
    Write,
}

/// Summary of one finished session, appended to the history store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub mode: PracticeMode,
    pub score: usize,
    pub total: usize,
    pub timestamp: DateTime<Utc>,
}

impl SessionResult {
    pub fn new(mode: PracticeMode, score: usize, total: usize) -> Self {
        Self {
            mode,
            score: score.min(total),
            total,
            timestamp: Utc::now(),
        }
    }

    /// Percentage of correct answers; an empty session counts as 0.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.score as f64 / self.total as f64 * 100.0
    }
}
