pub mod classify;
pub mod dataset;
pub mod decode;
pub mod document;
pub mod fingerprint;
pub mod normalize;
pub mod outcome;
pub mod patterns;
pub mod roles;
pub mod router;
pub mod tabular;

pub use classify::{CategoryRule, Classifier, ClassifierError, ClassifierRules, TagRule};
pub use dataset::{Dataset, DatasetError};
pub use decode::{decode_text, TextEncoding};
pub use document::{
    infer_statement_year, DocumentConfig, DocumentError, DocumentExtractor, PageStrategy, StatementPage,
    StrategyOutcome,
};
pub use fingerprint::fingerprint;
pub use normalize::{AmountMatch, DateMatch, Direction, Normalizer, NormalizerConfig, ParseError, SignedAmount};
pub use outcome::{DropReason, DroppedRow, Extraction};
pub use patterns::PatternError;
pub use roles::{infer_roles, AmountColumn, AmountKind, ColumnRoles, MissingRoles, RoleResolver, SamplingConfig};
pub use router::{ExtractionFailure, IngestError, Ingestion, IngestionRouter, SourceFormat};
pub use tabular::{TabularConfig, TabularError, TabularExtractor};
