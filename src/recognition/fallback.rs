//! Ordered model fallback
//!
//! Candidates are tried one after another. The first success wins; an
//! error on one candidate moves straight on to the next, with no retry of
//! the same model.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use super::service::{RecognitionError, RecognitionService};
use crate::api::payload::DecodedImage;
use crate::metrics::METRICS;

/// Diagnostics for a failed candidate are cut to this many characters
const DIAGNOSTIC_MAX_CHARS: usize = 100;

/// A named model configuration, tried in preference order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidate {
    pub name: String,
}

impl ModelCandidate {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Transcribed text and the model that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
    pub text: String,
    pub model: String,
}

/// Recognition client walking a fixed candidate list
pub struct ModelFallback {
    service: Arc<dyn RecognitionService>,
    candidates: Vec<ModelCandidate>,
}

impl ModelFallback {
    pub fn new(service: Arc<dyn RecognitionService>, candidates: Vec<ModelCandidate>) -> Self {
        Self {
            service,
            candidates,
        }
    }

    /// Build from plain model names
    pub fn from_names<S: AsRef<str>>(service: Arc<dyn RecognitionService>, names: &[S]) -> Self {
        Self::new(
            service,
            names.iter().map(|n| ModelCandidate::new(n.as_ref())).collect(),
        )
    }

    pub fn candidates(&self) -> &[ModelCandidate] {
        &self.candidates
    }

    /// Transcribe `image`, falling back across candidates
    pub async fn recognize(
        &self,
        image: &DecodedImage,
        prompt: &str,
    ) -> Result<Recognition, RecognitionError> {
        for candidate in &self.candidates {
            info!(model = %candidate.name, "Attempting recognition with OCR model");
            let start = Instant::now();

            match self.service.generate(&candidate.name, prompt, image).await {
                Ok(text) => {
                    METRICS.record_model_attempt(&candidate.name, true);
                    info!(
                        model = %candidate.name,
                        latency_ms = start.elapsed().as_millis() as u64,
                        "OCR model successfully processed request"
                    );
                    return Ok(Recognition {
                        text: text.trim().to_string(),
                        model: candidate.name.clone(),
                    });
                }
                Err(e) => {
                    METRICS.record_model_attempt(&candidate.name, false);
                    let diagnostic = e.to_string();
                    warn!(
                        model = %candidate.name,
                        error = %truncate(&diagnostic, DIAGNOSTIC_MAX_CHARS),
                        "OCR model failed"
                    );
                }
            }
        }

        self.log_available_models().await;

        Err(RecognitionError::NoModelAvailable {
            tried: self.candidates.iter().map(|c| c.name.clone()).collect(),
        })
    }

    /// Best-effort: log the catalog so an operator can fix the candidate list
    async fn log_available_models(&self) {
        match self.service.list_models().await {
            Ok(models) => {
                METRICS.record_catalog_lookup(true);
                let usable: Vec<&str> = models
                    .iter()
                    .filter(|m| m.supports_generate_content())
                    .map(|m| m.name.as_str())
                    .collect();
                warn!(
                    count = usable.len(),
                    "No OCR models worked. Available models: [{}]",
                    usable.join(", ")
                );
            }
            Err(e) => {
                METRICS.record_catalog_lookup(false);
                error!(error = %e, "No OCR models worked and listing available models failed");
            }
        }
    }
}

/// Cut `s` to at most `max` characters on a char boundary
pub(crate) fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::service::ModelInfo;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Fails for every model in `failing`, answers `text` otherwise
    struct ScriptedService {
        failing: Vec<&'static str>,
        text: &'static str,
        catalog_fails: bool,
        calls: Mutex<Vec<String>>,
        catalog_calls: Mutex<usize>,
    }

    impl ScriptedService {
        fn new(failing: Vec<&'static str>, text: &'static str) -> Self {
            Self {
                failing,
                text,
                catalog_fails: false,
                calls: Mutex::new(Vec::new()),
                catalog_calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RecognitionService for ScriptedService {
        async fn generate(
            &self,
            model: &str,
            _prompt: &str,
            _image: &DecodedImage,
        ) -> Result<String, RecognitionError> {
            self.calls.lock().unwrap().push(model.to_string());
            if self.failing.iter().any(|m| *m == model) {
                Err(RecognitionError::UpstreamError(format!("Status 404: {} not found", model)))
            } else {
                Ok(self.text.to_string())
            }
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>, RecognitionError> {
            *self.catalog_calls.lock().unwrap() += 1;
            if self.catalog_fails {
                return Err(RecognitionError::RequestFailed("catalog down".to_string()));
            }
            Ok(vec![ModelInfo {
                name: "models/gemini-1.5-flash".to_string(),
                display_name: None,
                supported_generation_methods: vec!["generateContent".to_string()],
            }])
        }
    }

    const MODELS: [&str; 3] = ["m1", "m2", "m3"];

    #[tokio::test]
    async fn test_first_candidate_succeeds() {
        let service = Arc::new(ScriptedService::new(vec![], "  text \n"));
        let fallback = ModelFallback::from_names(service.clone(), &MODELS);

        let result = fallback
            .recognize(&DecodedImage::for_tests(), "prompt")
            .await
            .unwrap();

        assert_eq!(result.text, "text");
        assert_eq!(result.model, "m1");
        assert_eq!(service.calls(), vec!["m1"]);
    }

    #[tokio::test]
    async fn test_falls_back_in_order() {
        let service = Arc::new(ScriptedService::new(vec!["m1", "m2"], "\tHello world\n"));
        let fallback = ModelFallback::from_names(service.clone(), &MODELS);

        let result = fallback
            .recognize(&DecodedImage::for_tests(), "prompt")
            .await
            .unwrap();

        assert_eq!(result.text, "Hello world");
        assert_eq!(result.model, "m3");
        assert_eq!(service.calls(), vec!["m1", "m2", "m3"]);
        assert_eq!(*service.catalog_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_all_candidates_fail() {
        let service = Arc::new(ScriptedService::new(MODELS.to_vec(), "unused"));
        let fallback = ModelFallback::from_names(service.clone(), &MODELS);

        let result = fallback.recognize(&DecodedImage::for_tests(), "prompt").await;

        match result {
            Err(RecognitionError::NoModelAvailable { tried }) => {
                assert_eq!(tried, vec!["m1", "m2", "m3"]);
            }
            other => panic!("Expected NoModelAvailable, got {:?}", other),
        }
        assert_eq!(service.calls(), vec!["m1", "m2", "m3"]);
        assert_eq!(*service.catalog_calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_catalog_failure_keeps_original_error() {
        let mut service = ScriptedService::new(MODELS.to_vec(), "unused");
        service.catalog_fails = true;
        let service = Arc::new(service);
        let fallback = ModelFallback::from_names(service.clone(), &MODELS);

        let result =
            tokio_test::block_on(fallback.recognize(&DecodedImage::for_tests(), "prompt"));

        assert!(matches!(result, Err(RecognitionError::NoModelAvailable { .. })));
        assert_eq!(*service.catalog_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_candidate_list() {
        let service = Arc::new(ScriptedService::new(vec![], "unused"));
        let fallback = ModelFallback::new(service.clone(), Vec::new());

        let result = fallback.recognize(&DecodedImage::for_tests(), "prompt").await;

        assert!(matches!(result, Err(RecognitionError::NoModelAvailable { .. })));
        assert!(service.calls().is_empty());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 3), "ab");
        assert_eq!(truncate("ééé", 2), "éé");
    }
}
