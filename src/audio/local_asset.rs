use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::audio::buffer::AudioBuffer;
use crate::audio::strategy::{AudioStrategy, Rendition, Tier};
use crate::config::Settings;
use crate::error::AudioError;
use crate::inventory::Symbol;

/// Where pre-recorded clips live, derived from `audioAssetBase`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetLocation {
    Remote(String),
    Directory(PathBuf),
}

impl AssetLocation {
    pub fn parse(base: &str) -> Option<Self> {
        let base = base.trim();
        if base.is_empty() {
            return None;
        }
        if base.starts_with("http://") || base.starts_with("https://") {
            Some(Self::Remote(base.trim_end_matches('/').to_string()))
        } else {
            Some(Self::Directory(PathBuf::from(base)))
        }
    }
}

pub fn clip_url(base: &str, id: &str) -> String {
    format!(
        "{}/{}.wav",
        base.trim_end_matches('/'),
        urlencoding::encode(id)
    )
}

/// First network-or-disk tier: one `<id>.wav` per symbol.
pub struct LocalAssetStrategy {
    client: Client,
}

impl LocalAssetStrategy {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, base: &str, id: &str) -> Result<Vec<u8>, AudioError> {
        let response = self.client.get(clip_url(base, id)).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(AudioError::NotFound(id.to_string())),
            status if !status.is_success() => Err(AudioError::Status(status)),
            _ => Ok(response.bytes().await?.to_vec()),
        }
    }

    async fn read(dir: &Path, id: &str) -> Result<Vec<u8>, AudioError> {
        let path = dir.join(format!("{id}.wav"));
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AudioError::NotFound(id.to_string()),
            _ => AudioError::Io(e),
        })
    }
}

#[async_trait]
impl AudioStrategy for LocalAssetStrategy {
    fn tier(&self) -> Tier {
        Tier::LocalAsset
    }

    async fn attempt(&self, symbol: &Symbol, settings: &Settings) -> Result<Rendition, AudioError> {
        let bytes = match AssetLocation::parse(&settings.audio_asset_base) {
            None => return Err(AudioError::NotFound(symbol.id.clone())),
            Some(AssetLocation::Remote(base)) => self.fetch(&base, &symbol.id).await?,
            Some(AssetLocation::Directory(dir)) => Self::read(&dir, &symbol.id).await?,
        };
        Ok(Rendition::Buffer(AudioBuffer::from_wav(&bytes)?))
    }
}
