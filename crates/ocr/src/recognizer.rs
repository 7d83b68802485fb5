use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Page image could not be read: {0}")]
    ImageDecode(String),
    #[error("OCR engine failed: {0}")]
    Engine(String),
    #[error("No OCR engine in this build (enable the `tesseract` feature)")]
    NotAvailable,
}

/// Turns one rendered statement page (PNG or JPEG bytes) into plain text.
///
/// Column gaps matter downstream: backends should keep runs of spaces between
/// words instead of collapsing them.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        (**self).recognize(image_bytes)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

// ── Fixed-text backend ────────────────────────────────────────────────────────

/// Answers every page with the same text. For tests.
pub struct MockRecognizer {
    pub text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _: &[u8]) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ── No engine ─────────────────────────────────────────────────────────────────

/// Every call fails with [`OcrError::NotAvailable`]; scanned pages then yield nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledRecognizer;

impl OcrBackend for DisabledRecognizer {
    fn recognize(&self, _: &[u8]) -> Result<String, OcrError> {
        Err(OcrError::NotAvailable)
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Tesseract when built with the `tesseract` feature, otherwise [`DisabledRecognizer`].
#[cfg(feature = "tesseract")]
pub fn system_backend(data_path: Option<String>, lang: &str) -> Box<dyn OcrBackend> {
    Box::new(tesseract::StatementTesseract::new(data_path, lang))
}

#[cfg(not(feature = "tesseract"))]
pub fn system_backend(_data_path: Option<String>, _lang: &str) -> Box<dyn OcrBackend> {
    Box::new(DisabledRecognizer)
}

// ── Tesseract ─────────────────────────────────────────────────────────────────

#[cfg(feature = "tesseract")]
pub mod tesseract {
    use super::{OcrBackend, OcrError};
    use leptess::{LepTess, Variable};

    /// Single uniform block of text: statement pages are one long column layout.
    const PAGE_SEGMENTATION: &str = "6";

    pub struct StatementTesseract {
        data_path: Option<String>,
        language: String,
    }

    impl StatementTesseract {
        pub fn new(data_path: Option<String>, language: &str) -> Self {
            Self {
                data_path,
                language: language.to_string(),
            }
        }

        fn engine(&self) -> Result<LepTess, OcrError> {
            let engine_err = |e: &dyn std::fmt::Display| OcrError::Engine(e.to_string());
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.language).map_err(|e| engine_err(&e))?;
            lt.set_variable(Variable::TesseditPagesegMode, PAGE_SEGMENTATION)
                .map_err(|e| engine_err(&e))?;
            lt.set_variable(Variable::PreserveInterwordSpaces, "1")
                .map_err(|e| engine_err(&e))?;
            Ok(lt)
        }
    }

    impl OcrBackend for StatementTesseract {
        fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
            let mut lt = self.engine()?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))
        }

        fn name(&self) -> &'static str {
            "tesseract"
        }
    }
}
