use async_trait::async_trait;
use reqwest::Client;

use crate::audio::buffer::{AudioBuffer, SYNTH_CHANNELS, SYNTH_SAMPLE_RATE};
use crate::audio::strategy::{AudioStrategy, Rendition, Tier};
use crate::config::{Settings, TtsProvider};
use crate::error::AudioError;
use crate::inventory::Symbol;
use crate::remote::{GeminiClient, OpenAiClient};

/// Speech synthesis through whichever provider `ttsProvider` selects.
pub struct RemoteSynthesisStrategy {
    gemini: GeminiClient,
    openai: OpenAiClient,
}

impl RemoteSynthesisStrategy {
    pub fn new(client: Client) -> Self {
        Self {
            gemini: GeminiClient::new(client.clone()),
            openai: OpenAiClient::new(client),
        }
    }
}

#[async_trait]
impl AudioStrategy for RemoteSynthesisStrategy {
    fn tier(&self) -> Tier {
        Tier::RemoteSynthesis
    }

    async fn attempt(&self, symbol: &Symbol, settings: &Settings) -> Result<Rendition, AudioError> {
        let buffer = match settings.tts_provider {
            TtsProvider::Gemini => {
                let audio = self
                    .gemini
                    .synthesize_speech(&symbol.id, symbol.spoken_text(), settings)
                    .await?;
                AudioBuffer::from_base64_pcm16(&audio.data, audio.sample_rate, SYNTH_CHANNELS)?
            }
            TtsProvider::OpenaiCompatible => {
                let bytes = self
                    .openai
                    .synthesize_speech(symbol.spoken_text(), settings)
                    .await?;
                AudioBuffer::from_pcm16_le(&bytes, SYNTH_SAMPLE_RATE, SYNTH_CHANNELS)?
            }
        };
        Ok(Rendition::Buffer(buffer))
    }
}
