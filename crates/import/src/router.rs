use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use taxwise_core::Transaction;
use taxwise_ocr::OcrPipeline;
use taxwise_pdf::{PdfDocument, PdfError};
use thiserror::Error;
use tracing::{debug, info};

use crate::classify::Classifier;
use crate::dataset::{Dataset, DatasetError};
use crate::document::{DocumentError, DocumentExtractor};
use crate::fingerprint::fingerprint;
use crate::normalize::Normalizer;
use crate::outcome::{self, DropReason, DroppedRow, Extraction};
use crate::tabular::{TabularError, TabularExtractor};

const PDF_MAGIC: &[u8] = b"%PDF";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Excel,
    Pdf,
}

impl SourceFormat {
    /// Extension first, then magic bytes. Anything else is read as CSV.
    pub fn detect(filename: &str, content: &[u8]) -> Self {
        Self::from_extension(filename)
            .or_else(|| Self::sniff(content))
            .unwrap_or(SourceFormat::Csv)
    }

    pub fn from_extension(filename: &str) -> Option<Self> {
        let ext = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Some(SourceFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "ods" => Some(SourceFormat::Excel),
            "pdf" => Some(SourceFormat::Pdf),
            _ => None,
        }
    }

    pub fn sniff(content: &[u8]) -> Option<Self> {
        if content.starts_with(PDF_MAGIC) {
            Some(SourceFormat::Pdf)
        } else if content.starts_with(ZIP_MAGIC) || content.starts_with(OLE_MAGIC) {
            Some(SourceFormat::Excel)
        } else {
            None
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Excel => "excel",
            SourceFormat::Pdf => "pdf",
        })
    }
}

/// Root cause of a failed ingestion.
#[derive(Debug, Error)]
pub enum ExtractionFailure {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Tabular(#[from] TabularError),
    #[error(transparent)]
    Pdf(#[from] PdfError),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to extract transactions from '{filename}': {source}")]
    Extraction {
        filename: String,
        #[source]
        source: ExtractionFailure,
    },
}

/// Everything read from one uploaded file.
#[derive(Debug, Clone, Serialize)]
pub struct Ingestion {
    pub filename: String,
    pub format: SourceFormat,
    /// SHA-256 of the raw content, hex encoded.
    pub fingerprint: String,
    pub transactions: Vec<Transaction>,
    pub dropped: Vec<DroppedRow>,
}

impl Ingestion {
    pub fn drop_counts(&self) -> BTreeMap<DropReason, usize> {
        outcome::tally(&self.dropped)
    }
}

/// Entry point: one file in, one transaction list out.
pub struct IngestionRouter {
    normalizer: Normalizer,
    classifier: Classifier,
    ocr: Option<OcrPipeline>,
}

impl Default for IngestionRouter {
    fn default() -> Self {
        Self::new(Normalizer::default(), Classifier::default())
    }
}

impl IngestionRouter {
    pub fn new(normalizer: Normalizer, classifier: Classifier) -> Self {
        Self {
            normalizer,
            classifier,
            ocr: None,
        }
    }

    pub fn with_ocr(mut self, ocr: OcrPipeline) -> Self {
        self.ocr = Some(ocr);
        self
    }

    /// All or nothing: any document-level failure discards what was read so far.
    pub fn ingest(&self, content: &[u8], filename: &str) -> Result<Ingestion, IngestError> {
        let format = SourceFormat::detect(filename, content);
        debug!(filename, %format, bytes = content.len(), "ingesting");

        let extraction = self
            .extract(format, content)
            .map_err(|source| IngestError::Extraction {
                filename: filename.to_string(),
                source,
            })?;

        info!(
            filename,
            %format,
            transactions = extraction.transactions.len(),
            dropped = extraction.dropped.len(),
            "statement ingested"
        );

        Ok(Ingestion {
            filename: filename.to_string(),
            format,
            fingerprint: fingerprint(content),
            transactions: extraction.transactions,
            dropped: extraction.dropped,
        })
    }

    fn extract(&self, format: SourceFormat, content: &[u8]) -> Result<Extraction, ExtractionFailure> {
        match format {
            SourceFormat::Csv => self.extract_dataset(&Dataset::from_csv(content)?),
            SourceFormat::Excel => self.extract_dataset(&Dataset::from_excel(content)?),
            SourceFormat::Pdf => {
                let pdf = PdfDocument::from_bytes(content)?;
                let pages = pdf.pages();
                let mut extractor = DocumentExtractor::new(&self.normalizer, &self.classifier);
                if let Some(ocr) = &self.ocr {
                    extractor = extractor.with_ocr(ocr);
                }
                Ok(extractor.extract(&pages)?)
            }
        }
    }

    fn extract_dataset(&self, dataset: &Dataset) -> Result<Extraction, ExtractionFailure> {
        let extractor = TabularExtractor::new(&self.normalizer, &self.classifier);
        Ok(extractor.extract(dataset)?)
    }
}
