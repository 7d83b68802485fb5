pub mod pipeline;
pub mod preprocess;
pub mod recognizer;

pub use pipeline::{OcrPipeline, PipelineError};
pub use preprocess::{prepare_for_ocr, PreprocessConfig, PreprocessError};
pub use recognizer::{system_backend, DisabledRecognizer, MockRecognizer, OcrBackend, OcrError};
