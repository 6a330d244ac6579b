use async_trait::async_trait;

use crate::audio::buffer::AudioBuffer;
use crate::config::Settings;
use crate::error::AudioError;
use crate::inventory::Symbol;

/// Where a played sound came from, in resolution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
    Cache,
    LocalAsset,
    RemoteSynthesis,
    OnDevice,
}

pub enum Rendition {
    /// Decoded audio for the resolver to cache and play.
    Buffer(AudioBuffer),
    /// The strategy already produced sound itself.
    Spoken,
    /// Nothing was produced but the failure was swallowed.
    Silent,
}

/// One fallback tier. An `Err` or `Silent` result moves the resolver on to
/// the next strategy.
#[async_trait]
pub trait AudioStrategy: Send + Sync {
    fn tier(&self) -> Tier;

    async fn attempt(&self, symbol: &Symbol, settings: &Settings) -> Result<Rendition, AudioError>;
}
