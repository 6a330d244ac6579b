use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::Settings;
use crate::session::result::SessionResult;
use crate::store::schema::HistoryData;

/// Fixed storage key of the settings blob.
pub const SETTINGS_KEY: &str = "alphabet_settings";
const HISTORY_FILE: &str = "session_history.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("azbuka");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn settings_path(&self) -> PathBuf {
        self.file_path(&format!("{SETTINGS_KEY}.json"))
    }

    fn save<T: Serialize>(&self, path: PathBuf, data: &T) -> Result<()> {
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Never fails: a missing, unreadable or malformed blob yields defaults,
    /// and individual bad fields fall back one by one.
    pub fn load_settings(&self) -> Settings {
        let path = self.settings_path();
        if !path.exists() {
            return Settings::default();
        }
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("could not read {}: {e}", path.display());
                return Settings::default();
            }
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(saved) => merge_over_defaults(&saved),
            Err(e) => {
                log::warn!("settings blob is not JSON, using defaults: {e}");
                Settings::default()
            }
        }
    }

    /// Overwrites the whole blob.
    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.save(self.settings_path(), settings)?;
        log::info!("saved settings to {}", self.settings_path().display());
        Ok(())
    }

    pub fn load_history(&self) -> HistoryData {
        let path = self.file_path(HISTORY_FILE);
        let loaded: Option<HistoryData> = fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok());
        match loaded {
            Some(history) if !history.needs_reset() => history,
            _ => HistoryData::default(),
        }
    }

    pub fn append_result(&self, result: SessionResult) -> Result<()> {
        let mut history = self.load_history();
        history.push(result);
        self.save(self.file_path(HISTORY_FILE), &history)
    }
}

/// Overlays each stored key onto the serialized defaults, keeping a key only
/// if the merged object still deserializes. Unknown keys are ignored.
pub fn merge_over_defaults(saved: &Value) -> Settings {
    let Some(saved) = saved.as_object() else {
        log::warn!("settings blob is not an object, using defaults");
        return Settings::default();
    };
    let mut merged: Map<String, Value> = match serde_json::to_value(Settings::default()) {
        Ok(Value::Object(map)) => map,
        _ => return Settings::default(),
    };

    for (key, value) in saved {
        if !merged.contains_key(key) {
            continue;
        }
        let mut candidate = merged.clone();
        candidate.insert(key.clone(), value.clone());
        match serde_json::from_value::<Settings>(Value::Object(candidate.clone())) {
            Ok(_) => merged = candidate,
            Err(e) => log::warn!("ignoring settings field {key}: {e}"),
        }
    }

    let mut settings: Settings = serde_json::from_value(Value::Object(merged)).unwrap_or_default();
    settings.normalize();
    settings
}
