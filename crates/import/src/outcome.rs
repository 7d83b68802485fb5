use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use taxwise_core::{Transaction, TransactionError, UnclassifiedTransaction};

use crate::classify::Classifier;

/// Why a row was discarded instead of emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    UnparsableDate,
    ZeroAmount,
    MissingDescription,
    /// The row ends before the date or description column.
    ShortRow,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DropReason::UnparsableDate => "unparsable date",
            DropReason::ZeroAmount => "zero or missing amount",
            DropReason::MissingDescription => "missing description",
            DropReason::ShortRow => "short row",
        })
    }
}

/// A discarded row. `row` is zero-based within its table, dataset or page text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRow {
    pub page: Option<usize>,
    pub row: usize,
    pub reason: DropReason,
}

/// Dropped rows per reason.
pub(crate) fn tally(dropped: &[DroppedRow]) -> BTreeMap<DropReason, usize> {
    let mut counts = BTreeMap::new();
    for d in dropped {
        *counts.entry(d.reason).or_insert(0) += 1;
    }
    counts
}

/// Transactions plus the log of everything dropped on the way.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Extraction {
    pub transactions: Vec<Transaction>,
    pub dropped: Vec<DroppedRow>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn merge(&mut self, other: Extraction) {
        self.transactions.extend(other.transactions);
        self.dropped.extend(other.dropped);
    }

    pub fn drop_counts(&self) -> BTreeMap<DropReason, usize> {
        tally(&self.dropped)
    }

    pub(crate) fn drop_row(&mut self, page: Option<usize>, row: usize, reason: DropReason) {
        self.dropped.push(DroppedRow { page, row, reason });
    }

    /// Classify and keep `raw`, or log it as dropped.
    pub(crate) fn accept(
        &mut self,
        raw: UnclassifiedTransaction,
        classifier: &Classifier,
        page: Option<usize>,
        row: usize,
    ) {
        let classification = classifier.classify(&raw.description, raw.amount);
        match Transaction::from_parts(raw, classification) {
            Ok(tx) => self.transactions.push(tx),
            Err(TransactionError::ZeroAmount) => self.drop_row(page, row, DropReason::ZeroAmount),
        }
    }
}
