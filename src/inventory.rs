use std::collections::HashSet;
use std::fs;

use icu_normalizer::ComposingNormalizerBorrowed;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

#[derive(Embed)]
#[folder = "assets/inventory/"]
struct InventoryAssets;

pub const DEFAULT_INVENTORY: &str = "ukrainian";

/// Pairs of letters children commonly mix up, used as forced distractors.
pub const DEFAULT_CONFUSING_PAIRS: &[(&str, &str)] = &[
    ("Б", "В"),
    ("Ч", "Ц"),
    ("Н", "М"),
    ("Ш", "Щ"),
    ("Й", "И"),
];

/// One practice unit: a letter plus how it is read aloud.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: String,
    #[serde(default)]
    pub pronunciation: String,
    #[serde(default, alias = "is_priority")]
    pub difficult: bool,
    #[serde(default)]
    pub word: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Symbol {
    pub fn new(id: &str, pronunciation: &str) -> Self {
        Self {
            id: normalize_id(id),
            pronunciation: pronunciation.to_string(),
            difficult: false,
            word: None,
            image: None,
        }
    }

    pub fn difficult(mut self) -> Self {
        self.difficult = true;
        self
    }

    /// Text handed to speech engines. Falls back to the letter itself.
    pub fn spoken_text(&self) -> &str {
        let trimmed = self.pronunciation.trim();
        if trimmed.is_empty() { &self.id } else { trimmed }
    }
}

#[derive(Clone, Debug, Deserialize)]
struct InventoryFile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    locale: String,
    #[serde(default)]
    symbols: Vec<Symbol>,
}

/// Immutable, ordered set of symbols with unique ids.
#[derive(Clone, Debug)]
pub struct Inventory {
    pub name: String,
    pub locale: String,
    symbols: Vec<Symbol>,
}

impl Inventory {
    /// Builds an inventory, dropping empty and duplicate ids (first wins).
    pub fn new(symbols: Vec<Symbol>) -> Self {
        let mut seen = HashSet::new();
        let symbols = symbols
            .into_iter()
            .map(|mut s| {
                s.id = normalize_id(&s.id);
                s
            })
            .filter(|s| !s.id.is_empty() && seen.insert(s.id.clone()))
            .collect();
        Self {
            name: String::new(),
            locale: String::new(),
            symbols,
        }
    }

    /// Loads an inventory by name: user override first, then the bundled copy.
    pub fn load(name: &str) -> Option<Self> {
        if let Some(config_dir) = dirs::config_dir() {
            let user_path = config_dir
                .join("azbuka")
                .join("inventory")
                .join(format!("{name}.toml"));
            if let Ok(content) = fs::read_to_string(&user_path) {
                match Self::from_toml(&content) {
                    Some(inv) => return Some(inv),
                    None => log::warn!("ignoring unreadable inventory {}", user_path.display()),
                }
            }
        }

        let filename = format!("{name}.toml");
        let file = InventoryAssets::get(&filename)?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        Self::from_toml(content)
    }

    pub fn from_toml(content: &str) -> Option<Self> {
        let file: InventoryFile = toml::from_str(content).ok()?;
        let mut inv = Self::new(file.symbols);
        if inv.is_empty() {
            return None;
        }
        inv.name = file.name;
        inv.locale = file.locale;
        Some(inv)
    }

    /// The bundled 33-letter Ukrainian alphabet.
    pub fn ukrainian() -> Self {
        Self::load(DEFAULT_INVENTORY).unwrap_or_else(|| Self::new(Vec::new()))
    }

    pub fn available() -> Vec<String> {
        InventoryAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Case-insensitive lookup for user-typed tokens such as priority letters.
    pub fn find(&self, token: &str) -> Option<&Symbol> {
        let key = fold_id(token);
        self.symbols.iter().find(|s| fold_id(&s.id) == key)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// NFC-normalizes a letter id so decomposed input (e.g. И + combining breve)
/// matches the precomposed inventory entry.
pub fn normalize_id(raw: &str) -> String {
    ComposingNormalizerBorrowed::new_nfc()
        .normalize(raw.trim())
        .into_owned()
}

/// Comparison key for ids: NFC plus upper case.
pub fn fold_id(raw: &str) -> String {
    normalize_id(&raw.trim().to_uppercase())
}
