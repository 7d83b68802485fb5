use thiserror::Error;
use tracing::debug;

use crate::preprocess::{self, PreprocessConfig};
use crate::recognizer::{OcrBackend, OcrError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] crate::preprocess::PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// Rendered page in, recognized text out: preprocess, then recognize.
pub struct OcrPipeline {
    backend: Box<dyn OcrBackend>,
    preprocess: PreprocessConfig,
}

impl OcrPipeline {
    pub fn new(backend: Box<dyn OcrBackend>) -> Self {
        Self::with_preprocess(backend, PreprocessConfig::default())
    }

    pub fn with_preprocess(backend: Box<dyn OcrBackend>, preprocess: PreprocessConfig) -> Self {
        Self { backend, preprocess }
    }

    /// Recognize the text of a rendered page image.
    pub fn recognize_page(&self, image_bytes: &[u8]) -> Result<String, PipelineError> {
        let prepared = preprocess::prepare_for_ocr(image_bytes, &self.preprocess)?;
        let text = self.backend.recognize(&prepared)?;
        debug!(backend = self.backend.name(), input = image_bytes.len(), chars = text.len(), "page recognized");
        Ok(text)
    }
}

impl std::fmt::Debug for OcrPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrPipeline")
            .field("backend", &self.backend.name())
            .field("preprocess", &self.preprocess)
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
