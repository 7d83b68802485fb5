use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use super::category::Category;
use super::money::Money;

/// Description used when extraction yields no usable text.
pub const PLACEHOLDER_DESCRIPTION: &str = "Transaction";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Transaction amount is zero")]
    ZeroAmount,
}

/// Which extraction strategy produced a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// A row of a CSV or spreadsheet export.
    Tabular,
    /// A row of a table detected inside a document page.
    Table,
    /// A free-text line of a document page.
    TextLine,
    /// A text line recognized from a rendered page image.
    Ocr,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Tabular => write!(f, "tabular"),
            Provenance::Table => write!(f, "table"),
            Provenance::TextLine => write!(f, "text_line"),
            Provenance::Ocr => write!(f, "ocr"),
        }
    }
}

/// A parsed row before classification. `amount` is signed: negative is money out.
#[derive(Debug, Clone, PartialEq)]
pub struct UnclassifiedTransaction {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
    pub source: Provenance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    pub is_recurring: bool,
    pub tags: BTreeSet<String>,
}

/// A normalized, categorized statement entry.
///
/// Records leave the ingestion core anonymous: identity and ownership are
/// assigned by whoever persists them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    /// Always a non-negative magnitude; direction lives in `category`.
    pub amount: Money,
    pub description: String,
    pub category: Category,
    pub is_recurring: bool,
    pub tags: BTreeSet<String>,
    pub source: Provenance,
}

impl Transaction {
    pub fn from_parts(
        raw: UnclassifiedTransaction,
        classification: Classification,
    ) -> Result<Transaction, TransactionError> {
        let amount = Money::from_decimal(raw.amount).abs();
        if amount.is_zero() {
            return Err(TransactionError::ZeroAmount);
        }

        let description = raw.description.trim();
        let description = if description.is_empty() {
            PLACEHOLDER_DESCRIPTION.to_string()
        } else {
            description.to_string()
        };

        Ok(Transaction {
            date: raw.date,
            amount,
            description,
            category: classification.category,
            is_recurring: classification.is_recurring,
            tags: classification.tags,
            source: raw.source,
        })
    }

    pub fn is_income(&self) -> bool {
        self.category.is_income()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn raw(amount: &str, description: &str) -> UnclassifiedTransaction {
        UnclassifiedTransaction {
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            amount: Decimal::from_str(amount).unwrap(),
            description: description.to_string(),
            source: Provenance::Tabular,
        }
    }

    fn expense() -> Classification {
        Classification {
            category: Category::Utilities,
            is_recurring: false,
            tags: BTreeSet::new(),
        }
    }

    #[test]
    fn negative_amount_is_stored_as_magnitude() {
        let tx = Transaction::from_parts(raw("-1200.00", "Electricity Bill"), expense()).unwrap();
        assert_eq!(tx.amount.to_string(), "1200.00");
        assert!(!tx.amount.is_negative());
    }

    #[test]
    fn zero_amount_is_rejected() {
        assert_eq!(
            Transaction::from_parts(raw("0.00", "Nothing"), expense()),
            Err(TransactionError::ZeroAmount)
        );
        // Rounds to zero at two decimal places.
        assert_eq!(
            Transaction::from_parts(raw("0.001", "Dust"), expense()),
            Err(TransactionError::ZeroAmount)
        );
    }

    #[test]
    fn description_is_trimmed() {
        let tx = Transaction::from_parts(raw("10", "  ATM Withdrawal \n"), expense()).unwrap();
        assert_eq!(tx.description, "ATM Withdrawal");
    }

    #[test]
    fn empty_description_gets_placeholder() {
        let tx = Transaction::from_parts(raw("10", "   "), expense()).unwrap();
        assert_eq!(tx.description, PLACEHOLDER_DESCRIPTION);
    }

    #[test]
    fn provenance_display() {
        assert_eq!(Provenance::Ocr.to_string(), "ocr");
        assert_eq!(Provenance::TextLine.to_string(), "text_line");
    }
}
