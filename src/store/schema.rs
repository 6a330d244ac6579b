use serde::{Deserialize, Serialize};

use crate::session::result::SessionResult;

const SCHEMA_VERSION: u32 = 1;

/// Oldest results are dropped beyond this many.
pub const MAX_HISTORY: usize = 500;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryData {
    pub schema_version: u32,
    #[serde(default)]
    pub sessions: Vec<SessionResult>,
}

impl Default for HistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sessions: Vec::new(),
        }
    }
}

impl HistoryData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }

    pub fn push(&mut self, result: SessionResult) {
        self.sessions.push(result);
        if self.sessions.len() > MAX_HISTORY {
            let excess = self.sessions.len() - MAX_HISTORY;
            self.sessions.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::result::PracticeMode;

    #[test]
    fn test_push_caps_history() {
        let mut history = HistoryData::default();
        for i in 0..(MAX_HISTORY + 3) {
            history.push(SessionResult::new(PracticeMode::Quiz, i, MAX_HISTORY + 3));
        }
        assert_eq!(history.sessions.len(), MAX_HISTORY);
        assert_eq!(history.sessions[0].score, 3);
    }

    #[test]
    fn test_stale_schema_needs_reset() {
        let history: HistoryData =
            serde_json::from_str(r#"{"schemaVersion": 0, "sessions": []}"#).unwrap();
        assert!(history.needs_reset());
        assert!(!HistoryData::default().needs_reset());
    }
}
