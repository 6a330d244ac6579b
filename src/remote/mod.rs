pub mod gemini;
pub mod openai;

use std::time::Duration;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// Shared HTTP client for every remote tier. Carries the request timeout so a
/// hung connection fails the tier instead of stalling the session.
pub fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to default HTTP client: {e}");
            reqwest::Client::new()
        })
}
