use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::inventory::{self, DEFAULT_CONFUSING_PAIRS, Inventory};

/// Longest queue a session may ask for.
pub const MAX_SESSION_LIMIT: usize = 1000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TtsProvider {
    #[default]
    Gemini,
    OpenaiCompatible,
}

/// Practice settings as persisted by the host. Every field has its own
/// default so partial or stale blobs still load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub session_limit: Option<i64>,
    #[serde(default)]
    pub priority_letters: String,
    #[serde(default = "default_confusing_pairs")]
    pub confusing_pairs: String,
    #[serde(default)]
    pub tts_provider: TtsProvider,
    #[serde(default = "default_gemini_api_key")]
    pub gemini_api_key: String,
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
    #[serde(default = "default_gemini_speech_model")]
    pub gemini_speech_model: String,
    #[serde(default = "default_gemini_vision_model")]
    pub gemini_vision_model: String,
    #[serde(default = "default_voice_name")]
    pub voice_name: String,
    #[serde(default = "default_custom_base_url")]
    pub custom_base_url: String,
    #[serde(default)]
    pub custom_api_key: String,
    #[serde(default = "default_custom_model")]
    pub custom_model: String,
    #[serde(default = "default_custom_vision_model")]
    pub custom_vision_model: String,
    #[serde(default = "default_custom_voice")]
    pub custom_voice: String,
    #[serde(default = "default_audio_asset_base")]
    pub audio_asset_base: String,
    #[serde(default = "default_on_device_command")]
    pub on_device_command: String,
    #[serde(default = "default_on_device_locale")]
    pub on_device_locale: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_show_visual_hint")]
    pub show_visual_hint: bool,
    #[serde(default = "default_reveal_after_secs")]
    pub reveal_after_secs: u32,
    #[serde(default = "default_quiz_option_count")]
    pub quiz_option_count: usize,
    #[serde(default = "default_inventory")]
    pub inventory: String,
}

fn default_confusing_pairs() -> String {
    DEFAULT_CONFUSING_PAIRS
        .iter()
        .map(|(a, b)| format!("{a}-{b}"))
        .collect::<Vec<_>>()
        .join(",")
}
fn default_gemini_api_key() -> String {
    env::var("GEMINI_API_KEY")
        .or_else(|_| env::var("API_KEY"))
        .unwrap_or_default()
}
fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_gemini_speech_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}
fn default_gemini_vision_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_voice_name() -> String {
    "Kore".to_string()
}
fn default_custom_base_url() -> String {
    "http://localhost:11434/v1".to_string()
}
fn default_custom_model() -> String {
    "tts-1".to_string()
}
fn default_custom_vision_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_custom_voice() -> String {
    "alloy".to_string()
}
fn default_audio_asset_base() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("azbuka")
        .join("audio")
        .to_string_lossy()
        .to_string()
}
fn default_on_device_command() -> String {
    "espeak-ng".to_string()
}
fn default_on_device_locale() -> String {
    "uk".to_string()
}
fn default_request_timeout_secs() -> u64 {
    15
}
fn default_show_visual_hint() -> bool {
    true
}
fn default_reveal_after_secs() -> u32 {
    7
}
fn default_quiz_option_count() -> usize {
    6
}
fn default_inventory() -> String {
    inventory::DEFAULT_INVENTORY.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_limit: None,
            priority_letters: String::new(),
            confusing_pairs: default_confusing_pairs(),
            tts_provider: TtsProvider::default(),
            gemini_api_key: default_gemini_api_key(),
            gemini_base_url: default_gemini_base_url(),
            gemini_speech_model: default_gemini_speech_model(),
            gemini_vision_model: default_gemini_vision_model(),
            voice_name: default_voice_name(),
            custom_base_url: default_custom_base_url(),
            custom_api_key: String::new(),
            custom_model: default_custom_model(),
            custom_vision_model: default_custom_vision_model(),
            custom_voice: default_custom_voice(),
            audio_asset_base: default_audio_asset_base(),
            on_device_command: default_on_device_command(),
            on_device_locale: default_on_device_locale(),
            request_timeout_secs: default_request_timeout_secs(),
            show_visual_hint: default_show_visual_hint(),
            reveal_after_secs: default_reveal_after_secs(),
            quiz_option_count: default_quiz_option_count(),
            inventory: default_inventory(),
        }
    }
}

/// Two letters that are easy to mix up. Order does not matter.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConfusingPair {
    first: String,
    second: String,
}

impl ConfusingPair {
    pub fn new(a: &str, b: &str) -> Option<Self> {
        let a = normalize_token(a);
        let b = normalize_token(b);
        if a.is_empty() || b.is_empty() || a == b {
            return None;
        }
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Some(Self { first, second })
    }

    /// Matches `id` case-insensitively.
    pub fn partner_of(&self, id: &str) -> Option<&str> {
        let id = inventory::fold_id(id);
        if self.first == id {
            Some(&self.second)
        } else if self.second == id {
            Some(&self.first)
        } else {
            None
        }
    }

    pub fn ids(&self) -> (&str, &str) {
        (&self.first, &self.second)
    }
}

impl Settings {
    /// Effective queue length: missing or non-positive limits fall back to
    /// one pass over the inventory. Capped at [`MAX_SESSION_LIMIT`].
    pub fn session_limit_for(&self, inventory_len: usize) -> usize {
        match self.session_limit {
            Some(limit) if limit > 0 => {
                usize::try_from(limit).map_or(MAX_SESSION_LIMIT, |l| l.min(MAX_SESSION_LIMIT))
            }
            _ => inventory_len,
        }
    }

    pub fn priority_ids(&self) -> BTreeSet<String> {
        split_tokens(&self.priority_letters)
            .map(normalize_token)
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Parses `"Б-В, Ч-Ц"` style pair lists. Malformed tokens are skipped.
    pub fn confusing_pairs(&self) -> Vec<ConfusingPair> {
        let mut pairs: Vec<ConfusingPair> = Vec::new();
        for token in split_tokens(&self.confusing_pairs) {
            let sides: Vec<&str> = token
                .split(['-', '–', '/'])
                .filter(|s| !s.trim().is_empty())
                .collect();
            if sides.len() != 2 {
                continue;
            }
            if let Some(pair) = ConfusingPair::new(sides[0], sides[1])
                && !pairs.contains(&pair)
            {
                pairs.push(pair);
            }
        }
        pairs
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Clamp numeric fields and reset references that no longer resolve.
    /// Call after deserializing a stored blob.
    pub fn normalize(&mut self) {
        match self.session_limit {
            Some(limit) if limit <= 0 => self.session_limit = None,
            Some(limit) if limit > MAX_SESSION_LIMIT as i64 => {
                self.session_limit = Some(MAX_SESSION_LIMIT as i64);
            }
            _ => {}
        }
        self.request_timeout_secs = self.request_timeout_secs.clamp(1, 120);
        self.reveal_after_secs = self.reveal_after_secs.min(60);
        self.quiz_option_count = self.quiz_option_count.clamp(2, 12);
        if Inventory::load(&self.inventory).is_none() {
            self.inventory = default_inventory();
        }
    }
}

fn split_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|t| !t.is_empty())
}

fn normalize_token(token: &str) -> String {
    inventory::fold_id(token)
}
