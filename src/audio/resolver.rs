use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::audio::buffer::AudioBuffer;
use crate::audio::cache::AudioCache;
use crate::audio::local_asset::LocalAssetStrategy;
use crate::audio::on_device::OnDeviceStrategy;
use crate::audio::remote_synthesis::RemoteSynthesisStrategy;
use crate::audio::sink::AudioSink;
use crate::audio::strategy::{AudioStrategy, Rendition, Tier};
use crate::config::Settings;
use crate::error::AudioError;
use crate::inventory::Symbol;
use crate::remote::http_client;

type Pending = Shared<BoxFuture<'static, Outcome>>;

/// What a call to [`AudioResolver::resolve`] ended up doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Played(Tier),
    /// Every tier failed or produced nothing.
    Silent,
    /// The active item changed first. Any decoded buffer was cached, not played.
    Stale,
    /// Another request for the same id was already running and did the playing.
    Coalesced,
}

enum Step {
    Hit(Arc<AudioBuffer>),
    Lead(Pending),
    Join(Pending),
}

/// Plays a symbol's pronunciation through the first tier that can produce it:
/// cache, local asset, remote synthesis, then on-device speech.
///
/// Concurrent requests for the same id share one run of the chain. Every
/// request is tagged with the generation current when it started; once
/// [`advance`](Self::advance) moves past it the result is kept but not played.
#[derive(Clone)]
pub struct AudioResolver {
    strategies: Arc<Vec<Arc<dyn AudioStrategy>>>,
    cache: AudioCache,
    sink: Arc<dyn AudioSink>,
    inflight: Arc<Mutex<HashMap<String, Pending>>>,
    generation: Arc<AtomicU64>,
}

impl AudioResolver {
    pub fn new(sink: Arc<dyn AudioSink>, settings: &Settings) -> Self {
        let client = http_client(settings.request_timeout());
        let strategies: Vec<Arc<dyn AudioStrategy>> = vec![
            Arc::new(LocalAssetStrategy::new(client.clone())),
            Arc::new(RemoteSynthesisStrategy::new(client)),
            Arc::new(OnDeviceStrategy::new()),
        ];
        Self::with_strategies(sink, strategies)
    }

    pub fn with_strategies(
        sink: Arc<dyn AudioSink>,
        strategies: Vec<Arc<dyn AudioStrategy>>,
    ) -> Self {
        Self {
            strategies: Arc::new(strategies),
            cache: AudioCache::new(),
            sink,
            inflight: Arc::new(Mutex::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Tiers tried after the cache, in order.
    pub fn tiers(&self) -> Vec<Tier> {
        self.strategies.iter().map(|s| s.tier()).collect()
    }

    pub fn cache(&self) -> &AudioCache {
        &self.cache
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Marks every pending resolution stale. Call whenever the active item changes.
    pub fn advance(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn lock_inflight(&self) -> MutexGuard<'_, HashMap<String, Pending>> {
        self.inflight.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub async fn resolve(&self, symbol: &Symbol, settings: &Settings) -> Outcome {
        let generation = self.generation();
        loop {
            let step = {
                let mut inflight = self.lock_inflight();
                if let Some(buffer) = self.cache.get(&symbol.id) {
                    Step::Hit(buffer)
                } else if let Some(pending) = inflight.get(&symbol.id) {
                    Step::Join(pending.clone())
                } else {
                    let pending = self.spawn_chain(symbol.clone(), settings.clone(), generation);
                    inflight.insert(symbol.id.clone(), pending.clone());
                    Step::Lead(pending)
                }
            };

            match step {
                Step::Hit(buffer) => {
                    log::debug!("audio cache hit for {}", symbol.id);
                    self.sink.play(&buffer);
                    return Outcome::Played(Tier::Cache);
                }
                Step::Lead(pending) => return pending.await,
                Step::Join(pending) => {
                    log::debug!("joining in-flight resolution for {}", symbol.id);
                    let outcome = pending.await;
                    if outcome != Outcome::Stale || self.is_stale(generation) {
                        return Outcome::Coalesced;
                    }
                    // The joined run belonged to an earlier item. Play its
                    // cached buffer, or run the chain again for this one.
                    log::debug!("joined run for {} went stale, resolving again", symbol.id);
                }
            }
        }
    }

    /// Runs the chain on its own task so a dropped caller cannot strand
    /// requests that joined it.
    fn spawn_chain(&self, symbol: Symbol, settings: Settings, generation: u64) -> Pending {
        let this = self.clone();
        let handle = tokio::spawn(async move {
            let outcome = this.run_chain(&symbol, &settings, generation).await;
            this.lock_inflight().remove(&symbol.id);
            outcome
        });
        async move {
            handle.await.unwrap_or_else(|e| {
                log::warn!("audio resolution task failed: {e}");
                Outcome::Silent
            })
        }
        .boxed()
        .shared()
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation() != generation
    }

    async fn run_chain(&self, symbol: &Symbol, settings: &Settings, generation: u64) -> Outcome {
        let limit = settings.request_timeout();
        for strategy in self.strategies.iter() {
            let tier = strategy.tier();
            if tier == Tier::OnDevice && self.is_stale(generation) {
                return Outcome::Stale;
            }
            log::debug!("resolving {} via {tier:?}", symbol.id);
            let result = tokio::time::timeout(limit, strategy.attempt(symbol, settings))
                .await
                .unwrap_or(Err(AudioError::Timeout(limit)));
            match result {
                Ok(Rendition::Buffer(buffer)) => {
                    let buffer = self.cache.put(&symbol.id, Arc::new(buffer));
                    if self.is_stale(generation) {
                        log::debug!("{} resolved after the item changed, not playing", symbol.id);
                        return Outcome::Stale;
                    }
                    self.sink.play(&buffer);
                    return Outcome::Played(tier);
                }
                Ok(Rendition::Spoken) => return Outcome::Played(tier),
                Ok(Rendition::Silent) => {
                    log::debug!("{tier:?} produced nothing for {}", symbol.id);
                }
                Err(AudioError::NotFound(_)) => {
                    log::debug!("{tier:?} has no clip for {}", symbol.id);
                }
                Err(e) => log::warn!("{tier:?} failed for {}: {e}", symbol.id),
            }
        }
        log::warn!("no audio tier could voice {}", symbol.id);
        Outcome::Silent
    }
}
