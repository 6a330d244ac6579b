use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use reqwest::Client;

use crate::config::{Settings, TtsProvider};
use crate::drawing::canvas::{encode_png, flatten_on_white};
use crate::error::VerifyError;
use crate::inventory::Symbol;
use crate::remote::{GeminiClient, OpenAiClient, http_client};

pub fn verification_prompt(target: &str) -> String {
    format!(
        "This is a child's hand drawing of a single letter. Does it resemble the Ukrainian \
         letter \"{target}\"? Strokes may be broken, shaky or uneven; ignore that and judge \
         the overall shape and topology of the letter. Answer with exactly one word: TRUE or FALSE."
    )
}

/// Affirmative only on a clear `TRUE` with no `FALSE` anywhere in the reply.
pub fn parse_verdict(text: &str) -> bool {
    let upper = text.to_uppercase();
    upper.contains("TRUE") && !upper.contains("FALSE")
}

/// Remote model that answers a yes/no question about a PNG.
#[async_trait]
pub trait DrawingClassifier: Send + Sync {
    async fn classify(
        &self,
        png_base64: &str,
        prompt: &str,
        settings: &Settings,
    ) -> Result<String, VerifyError>;
}

/// Routes to the vision model of the configured provider.
pub struct RemoteClassifier {
    gemini: GeminiClient,
    openai: OpenAiClient,
}

impl RemoteClassifier {
    pub fn new(client: Client) -> Self {
        Self {
            gemini: GeminiClient::new(client.clone()),
            openai: OpenAiClient::new(client),
        }
    }
}

#[async_trait]
impl DrawingClassifier for RemoteClassifier {
    async fn classify(
        &self,
        png_base64: &str,
        prompt: &str,
        settings: &Settings,
    ) -> Result<String, VerifyError> {
        match settings.tts_provider {
            TtsProvider::Gemini => {
                self.gemini
                    .classify_drawing(png_base64, prompt, settings)
                    .await
            }
            TtsProvider::OpenaiCompatible => {
                self.openai
                    .classify_drawing(png_base64, prompt, settings)
                    .await
            }
        }
    }
}

#[derive(Clone)]
pub struct DrawingVerifier {
    classifier: Arc<dyn DrawingClassifier>,
}

impl DrawingVerifier {
    pub fn new(settings: &Settings) -> Self {
        Self::with_classifier(Arc::new(RemoteClassifier::new(http_client(
            settings.request_timeout(),
        ))))
    }

    pub fn with_classifier(classifier: Arc<dyn DrawingClassifier>) -> Self {
        Self { classifier }
    }

    /// Never errors: anything short of a clear affirmative is `false`.
    pub async fn verify(&self, drawing: &RgbaImage, target: &Symbol, settings: &Settings) -> bool {
        match self.try_verify(drawing, target, settings).await {
            Ok(text) => {
                let verdict = parse_verdict(&text);
                log::debug!("drawing of {} judged {verdict} ({})", target.id, text.trim());
                verdict
            }
            Err(e) => {
                log::warn!("could not verify drawing of {}: {e}", target.id);
                false
            }
        }
    }

    async fn try_verify(
        &self,
        drawing: &RgbaImage,
        target: &Symbol,
        settings: &Settings,
    ) -> Result<String, VerifyError> {
        let png = encode_png(&flatten_on_white(drawing))?;
        let payload = STANDARD.encode(png);
        let prompt = verification_prompt(&target.id);
        let limit = settings.request_timeout();
        tokio::time::timeout(limit, self.classifier.classify(&payload, &prompt, settings))
            .await
            .unwrap_or(Err(VerifyError::Timeout(limit)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Canned {
        reply: fn() -> Result<String, VerifyError>,
        delay: Duration,
        calls: AtomicUsize,
        last_prompt: Mutex<String>,
    }

    impl Canned {
        fn new(reply: fn() -> Result<String, VerifyError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(String::new()),
            })
        }
    }

    #[async_trait]
    impl DrawingClassifier for Canned {
        async fn classify(
            &self,
            png_base64: &str,
            prompt: &str,
            _: &Settings,
        ) -> Result<String, VerifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(STANDARD.decode(png_base64).unwrap().starts_with(b"\x89PNG"));
            *self.last_prompt.lock().unwrap() = prompt.to_string();
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            (self.reply)()
        }
    }

    fn drawing() -> RgbaImage {
        let mut img = RgbaImage::new(16, 16);
        for y in 2..14 {
            img.put_pixel(8, y, Rgba([0, 0, 0, 255]));
        }
        img
    }

    async fn verdict(reply: fn() -> Result<String, VerifyError>) -> bool {
        let verifier = DrawingVerifier::with_classifier(Canned::new(reply));
        verifier
            .verify(&drawing(), &Symbol::new("І", "І"), &Settings::default())
            .await
    }

    #[test]
    fn test_parse_verdict() {
        assert!(parse_verdict("TRUE"));
        assert!(parse_verdict("  true.\n"));
        assert!(!parse_verdict("FALSE"));
        assert!(!parse_verdict("yes"));
        assert!(!parse_verdict("TRUE or FALSE, hard to say"));
        assert!(!parse_verdict(""));
    }

    #[test]
    fn test_prompt_names_target_and_tolerance() {
        let prompt = verification_prompt("Щ");
        assert!(prompt.contains("\"Щ\""));
        assert!(prompt.contains("broken"));
        assert!(prompt.contains("TRUE or FALSE"));
    }

    #[tokio::test]
    async fn test_affirmative_reply_passes() {
        assert!(verdict(|| Ok("TRUE".to_string())).await);
    }

    #[tokio::test]
    async fn test_non_affirmative_replies_fail() {
        assert!(!verdict(|| Ok("yes".to_string())).await);
        assert!(!verdict(|| Ok("FALSE".to_string())).await);
    }

    #[tokio::test]
    async fn test_classifier_error_fails() {
        assert!(!verdict(|| Err(VerifyError::MissingCredentials("gemini"))).await);
        assert!(!verdict(|| Err(VerifyError::EmptyResponse)).await);
    }

    #[tokio::test]
    async fn test_prompt_sent_for_target() {
        let classifier = Canned::new(|| Ok("TRUE".to_string()));
        let verifier = DrawingVerifier::with_classifier(classifier.clone());
        verifier
            .verify(&drawing(), &Symbol::new("Ж", "Же"), &Settings::default())
            .await;
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
        assert!(classifier.last_prompt.lock().unwrap().contains("\"Ж\""));
    }

    #[tokio::test]
    async fn test_empty_canvas_never_reaches_classifier() {
        let classifier = Canned::new(|| Ok("TRUE".to_string()));
        let verifier = DrawingVerifier::with_classifier(classifier.clone());
        let ok = verifier
            .verify(&RgbaImage::new(0, 0), &Symbol::new("А", "А"), &Settings::default())
            .await;
        assert!(!ok);
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_classifier_times_out() {
        let classifier = Arc::new(Canned {
            reply: || Ok("TRUE".to_string()),
            delay: Duration::from_secs(300),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(String::new()),
        });
        let verifier = DrawingVerifier::with_classifier(classifier);
        let settings = Settings {
            request_timeout_secs: 5,
            ..Settings::default()
        };
        assert!(!verifier.verify(&drawing(), &Symbol::new("А", "А"), &settings).await);
    }

    #[tokio::test]
    async fn test_remote_without_key_is_false() {
        let settings = Settings {
            tts_provider: TtsProvider::Gemini,
            gemini_api_key: String::new(),
            ..Settings::default()
        };
        let verifier = DrawingVerifier::new(&settings);
        assert!(!verifier.verify(&drawing(), &Symbol::new("А", "А"), &settings).await);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_false() {
        let settings = Settings {
            tts_provider: TtsProvider::OpenaiCompatible,
            custom_base_url: "http://127.0.0.1:9/v1".to_string(),
            ..Settings::default()
        };
        let classifier = RemoteClassifier::new(Client::new());
        let err = classifier
            .classify("AAAA", "prompt", &settings)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::Http(_)));

        let verifier = DrawingVerifier::new(&settings);
        assert!(!verifier.verify(&drawing(), &Symbol::new("А", "А"), &settings).await);
    }
}
