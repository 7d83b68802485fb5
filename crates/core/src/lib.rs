pub mod analysis;
pub mod category;
pub mod money;
pub mod period;
pub mod transaction;

pub use analysis::{analyze, AnalysisReport, CategoryStats, FlowSummary, MonthlyTrend, RecurringSummary};
pub use category::Category;
pub use money::Money;
pub use period::{DateRange, YearMonth};
pub use transaction::{
    Classification, Provenance, Transaction, TransactionError, UnclassifiedTransaction,
    PLACEHOLDER_DESCRIPTION,
};
