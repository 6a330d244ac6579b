use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::Settings;
use crate::error::{AudioError, VerifyError};

#[derive(Debug, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    pub fn text(&self) -> Option<String> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.clone())
            .filter(|t| !t.trim().is_empty())
    }
}

pub fn speech_request(spoken: &str, settings: &Settings) -> Value {
    json!({
        "model": settings.custom_model,
        "input": spoken,
        "voice": settings.custom_voice,
        "response_format": "pcm"
    })
}

pub fn vision_request(png_base64: &str, prompt: &str, settings: &Settings) -> Value {
    json!({
        "model": settings.custom_vision_model,
        "temperature": 0,
        "max_tokens": 16,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "text", "text": prompt },
                {
                    "type": "image_url",
                    "image_url": { "url": format!("data:image/png;base64,{png_base64}") }
                }
            ]
        }]
    })
}

/// Client for self-hosted or third-party OpenAI-compatible servers. The key
/// is optional since local servers usually run without one.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
}

impl OpenAiClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn post(&self, settings: &Settings, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", settings.custom_base_url.trim_end_matches('/'), path);
        let request = self.client.post(url);
        let key = settings.custom_api_key.trim();
        if key.is_empty() {
            request
        } else {
            request.bearer_auth(key)
        }
    }

    /// Raw PCM16 LE bytes at 24 kHz mono.
    pub async fn synthesize_speech(
        &self,
        spoken: &str,
        settings: &Settings,
    ) -> Result<Vec<u8>, AudioError> {
        let response = self
            .post(settings, "audio/speech")
            .json(&speech_request(spoken, settings))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AudioError::Status(response.status()));
        }
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(AudioError::NoAudio);
        }
        Ok(bytes.to_vec())
    }

    pub async fn classify_drawing(
        &self,
        png_base64: &str,
        prompt: &str,
        settings: &Settings,
    ) -> Result<String, VerifyError> {
        let response = self
            .post(settings, "chat/completions")
            .json(&vision_request(png_base64, prompt, settings))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(VerifyError::Status(response.status()));
        }
        let parsed: ChatResponse = response.json().await?;
        parsed.text().ok_or(VerifyError::EmptyResponse)
    }
}
