use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use taxwise_import::{Classifier, IngestionRouter, Normalizer};
use taxwise_ocr::{system_backend, OcrPipeline, PreprocessConfig};

/// Settings read from the optional `--config` TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Year for statement dates printed without one. Inferred per page when unset.
    pub reference_year: Option<i32>,
    /// Classifier rules TOML replacing the built-in tables.
    pub classifier_rules: Option<PathBuf>,
    pub ocr: OcrSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    pub language: String,
    pub data_path: Option<String>,
    pub preprocess: PreprocessConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            reference_year: None,
            classifier_rules: None,
            ocr: OcrSettings::default(),
        }
    }
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            data_path: None,
            preprocess: PreprocessConfig::default(),
        }
    }
}

impl AppConfig {
    /// No path means built-in defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn normalizer(&self) -> Normalizer {
        let normalizer = Normalizer::default();
        match self.reference_year {
            Some(year) => normalizer.with_reference_year(year),
            None => normalizer,
        }
    }

    pub fn classifier(&self) -> anyhow::Result<Classifier> {
        let Some(path) = &self.classifier_rules else {
            return Ok(Classifier::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read classifier rules {}", path.display()))?;
        Classifier::from_toml(&content).with_context(|| format!("Invalid classifier rules {}", path.display()))
    }

    pub fn ocr_pipeline(&self) -> OcrPipeline {
        let backend = system_backend(self.ocr.data_path.clone(), &self.ocr.language);
        OcrPipeline::with_preprocess(backend, self.ocr.preprocess)
    }

    pub fn router(&self) -> anyhow::Result<IngestionRouter> {
        Ok(IngestionRouter::new(self.normalizer(), self.classifier()?).with_ocr(self.ocr_pipeline()))
    }
}
