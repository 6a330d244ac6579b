use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::audio::buffer::{SYNTH_SAMPLE_RATE, sample_rate_from_mime};
use crate::config::Settings;
use crate::error::{AudioError, VerifyError};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

/// Base64 PCM16 payload plus the rate it was rendered at.
#[derive(Clone, Debug, PartialEq)]
pub struct InlineAudio {
    pub data: String,
    pub sample_rate: u32,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    pub fn inline_audio(&self) -> Option<InlineAudio> {
        self.first_parts()
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| !d.data.trim().is_empty())
            .map(|d| InlineAudio {
                data: d.data.clone(),
                sample_rate: sample_rate_from_mime(&d.mime_type).unwrap_or(SYNTH_SAMPLE_RATE),
            })
    }

    pub fn text(&self) -> Option<String> {
        let text: String = self
            .first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n");
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

pub fn speech_request(letter: &str, spoken: &str, voice_name: &str) -> Value {
    json!({
        "contents": [{
            "parts": [{
                "text": format!(
                    "Ти вчителька початкових класів. Чітко і коротко вимови назву української літери: \"{letter}\". \
                     Вимови її саме як \"{spoken}\". Не кажи нічого зайвого, тільки один короткий звук."
                )
            }]
        }],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": voice_name }
                }
            }
        }
    })
}

pub fn vision_request(png_base64: &str, prompt: &str) -> Value {
    json!({
        "contents": [{
            "parts": [
                { "inlineData": { "mimeType": "image/png", "data": png_base64 } },
                { "text": prompt }
            ]
        }]
    })
}

/// `generateContent` client for speech and drawing classification.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
}

impl GeminiClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn endpoint(settings: &Settings, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            settings.gemini_base_url.trim_end_matches('/'),
            model
        )
    }

    pub async fn synthesize_speech(
        &self,
        letter: &str,
        spoken: &str,
        settings: &Settings,
    ) -> Result<InlineAudio, AudioError> {
        let key = settings.gemini_api_key.trim();
        if key.is_empty() {
            return Err(AudioError::MissingCredentials("gemini"));
        }
        let response = self
            .client
            .post(Self::endpoint(settings, &settings.gemini_speech_model))
            .header(API_KEY_HEADER, key)
            .json(&speech_request(letter, spoken, &settings.voice_name))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AudioError::Status(response.status()));
        }
        let parsed: GenerateContentResponse = response.json().await?;
        parsed.inline_audio().ok_or(AudioError::NoAudio)
    }

    pub async fn classify_drawing(
        &self,
        png_base64: &str,
        prompt: &str,
        settings: &Settings,
    ) -> Result<String, VerifyError> {
        let key = settings.gemini_api_key.trim();
        if key.is_empty() {
            return Err(VerifyError::MissingCredentials("gemini"));
        }
        let response = self
            .client
            .post(Self::endpoint(settings, &settings.gemini_vision_model))
            .header(API_KEY_HEADER, key)
            .json(&vision_request(png_base64, prompt))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(VerifyError::Status(response.status()));
        }
        let parsed: GenerateContentResponse = response.json().await?;
        parsed.text().ok_or(VerifyError::EmptyResponse)
    }
}
