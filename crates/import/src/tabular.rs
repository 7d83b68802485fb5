use chrono::NaiveDate;
use rust_decimal::Decimal;
use taxwise_core::{Provenance, UnclassifiedTransaction};
use thiserror::Error;
use tracing::debug;

use crate::classify::Classifier;
use crate::dataset::Dataset;
use crate::normalize::Normalizer;
use crate::outcome::{DropReason, Extraction};
use crate::roles::{
    infer_roles, AmountColumn, AmountKind, ColumnRoles, MissingRoles, RoleResolver, SamplingConfig,
    DEFAULT_RESOLVERS,
};

#[derive(Error, Debug)]
pub enum TabularError {
    #[error("Unresolved columns: {0}")]
    UnresolvedRoles(#[from] MissingRoles),
}

#[derive(Debug, Clone)]
pub struct TabularConfig {
    pub sampling: SamplingConfig,
    pub resolvers: Vec<RoleResolver>,
}

impl Default for TabularConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::with_sample_size(10),
            resolvers: DEFAULT_RESOLVERS.to_vec(),
        }
    }
}

/// Turns a CSV or spreadsheet dataset into transactions.
pub struct TabularExtractor<'a> {
    normalizer: &'a Normalizer,
    classifier: &'a Classifier,
    config: TabularConfig,
}

impl<'a> TabularExtractor<'a> {
    pub fn new(normalizer: &'a Normalizer, classifier: &'a Classifier) -> Self {
        Self::with_config(normalizer, classifier, TabularConfig::default())
    }

    pub fn with_config(normalizer: &'a Normalizer, classifier: &'a Classifier, config: TabularConfig) -> Self {
        Self {
            normalizer,
            classifier,
            config,
        }
    }

    pub fn extract(&self, dataset: &Dataset) -> Result<Extraction, TabularError> {
        let roles = infer_roles(
            &dataset.headers,
            &dataset.rows,
            self.normalizer,
            self.config.sampling,
            &self.config.resolvers,
        )?;
        debug!(?roles, rows = dataset.rows.len(), "tabular roles resolved");

        Ok(RowReader {
            roles: &roles,
            normalizer: self.normalizer,
            classifier: self.classifier,
            source: Provenance::Tabular,
            page: None,
        }
        .read(&dataset.rows))
    }
}

/// Row-to-transaction conversion shared by datasets and document tables.
pub(crate) struct RowReader<'a> {
    pub roles: &'a ColumnRoles,
    pub normalizer: &'a Normalizer,
    pub classifier: &'a Classifier,
    pub source: Provenance,
    pub page: Option<usize>,
}

impl RowReader<'_> {
    /// Debit-column rows come out first, then credit-column rows.
    pub fn read(&self, rows: &[Vec<String>]) -> Extraction {
        let mut out = Extraction::default();
        let valid: Vec<Option<(NaiveDate, &str)>> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| match self.validate(row) {
                Ok(v) => Some(v),
                Err(reason) => {
                    out.drop_row(self.page, i, reason);
                    None
                }
            })
            .collect();

        let mut emitted = vec![false; rows.len()];
        for stream in self.roles.amount_streams() {
            for (i, row) in rows.iter().enumerate() {
                let Some((date, description)) = valid[i] else {
                    continue;
                };
                let amount = self.signed_value(row, stream);
                if amount.is_zero() {
                    continue;
                }
                emitted[i] = true;
                let raw = UnclassifiedTransaction {
                    date,
                    amount,
                    description: description.to_string(),
                    source: self.source,
                };
                out.accept(raw, self.classifier, self.page, i);
            }
        }

        for (i, v) in valid.iter().enumerate() {
            if v.is_some() && !emitted[i] {
                out.drop_row(self.page, i, DropReason::ZeroAmount);
            }
        }
        out
    }

    fn validate<'r>(&self, row: &'r [String]) -> Result<(NaiveDate, &'r str), DropReason> {
        if row.len() < self.roles.required_width() {
            return Err(DropReason::ShortRow);
        }
        let date = self
            .normalizer
            .parse_date(&row[self.roles.date])
            .map_err(|_| DropReason::UnparsableDate)?;
        let description = row[self.roles.description].trim();
        if description.is_empty() {
            return Err(DropReason::MissingDescription);
        }
        Ok((date, description))
    }

    /// Negative is money out. Zero when the cell is blank or unparsable.
    fn signed_value(&self, row: &[String], column: AmountColumn) -> Decimal {
        let cell = row.get(column.index).map_or("", String::as_str);
        let value = self.normalizer.parse_amount(cell);
        match column.kind {
            AmountKind::Debit => -value.abs(),
            AmountKind::Credit => value.abs(),
            AmountKind::Signed | AmountKind::Balance => {
                let declared = self
                    .roles
                    .type_column
                    .and_then(|t| row.get(t))
                    .and_then(|t| direction_word(t));
                match declared {
                    Some(true) => value.abs(),
                    Some(false) => -value.abs(),
                    None => value,
                }
            }
        }
    }
}

/// `Some(true)` for credit, `Some(false)` for debit.
fn direction_word(cell: &str) -> Option<bool> {
    match cell.trim().trim_end_matches('.').to_lowercase().as_str() {
        "cr" | "credit" | "c" => Some(true),
        "dr" | "debit" | "d" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxwise_core::Category;

    fn dataset(csv: &str) -> Dataset {
        Dataset::from_csv(csv.as_bytes()).unwrap()
    }

    fn run(csv: &str) -> Extraction {
        let normalizer = Normalizer::default().with_reference_year(2024);
        let classifier = Classifier::default();
        TabularExtractor::new(&normalizer, &classifier)
            .extract(&dataset(csv))
            .unwrap()
    }

    // ── debit / credit streams ────────────────────────────────────────────────

    #[test]
    fn debit_row_becomes_utility_expense() {
        let out = run("Date, Description, Debit, Credit\n01-02-2024, Electricity Bill, 1200, \n");
        assert_eq!(out.transactions.len(), 1);
        let tx = &out.transactions[0];
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(tx.amount.to_string(), "1200.00");
        assert_eq!(tx.category, Category::Utilities);
        assert!(!tx.is_recurring);
        assert_eq!(tx.source, Provenance::Tabular);
    }

    #[test]
    fn credit_row_becomes_recurring_income() {
        let out = run("Date, Description, Debit, Credit\n02-02-2024, Salary Credit, , 50000\n");
        let tx = &out.transactions[0];
        assert_eq!(tx.category, Category::Income);
        assert!(tx.is_recurring);
        assert_eq!(tx.amount.to_string(), "50000.00");
    }

    #[test]
    fn debit_stream_precedes_credit_stream() {
        let out = run(
            "Date,Description,Debit,Credit\n\
             01-02-2024,Cashback offer,,25\n\
             02-02-2024,Swiggy,350,\n\
             03-02-2024,Rent,15000,\n",
        );
        let descriptions: Vec<&str> = out.transactions.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Swiggy", "Rent", "Cashback offer"]);
        assert_eq!(out.transactions[2].category, Category::Income);
    }

    #[test]
    fn debit_values_are_magnitudes() {
        let out = run("Date,Description,Withdrawal,Deposit\n01-02-2024,Fuel,-800,\n");
        assert_eq!(out.transactions[0].category, Category::Transport);
        assert_eq!(out.transactions[0].amount.to_string(), "800.00");
    }

    // ── signed column ─────────────────────────────────────────────────────────

    #[test]
    fn signed_column_sign_decides_direction() {
        let out = run("Date,Narration,Amount\n2024-01-05,NEFT from client,25000\n2024-01-06,Netflix,-649\n");
        assert_eq!(out.transactions[0].category, Category::Income);
        assert_eq!(out.transactions[1].category, Category::Entertainment);
        assert!(out.transactions[1].tags.contains("netflix"));
    }

    #[test]
    fn type_column_overrides_sign() {
        let out = run("Date,Remarks,Amount,Dr/Cr\n2024-01-05,Mobile recharge,299,DR\n2024-01-07,Client payment,9000,CR\n");
        assert_eq!(out.transactions[0].category, Category::Utilities);
        assert_eq!(out.transactions[1].category, Category::Income);
    }

    #[test]
    fn suffix_markers_in_amount_cells() {
        let out = run("Date,Details,Amount\n2024-01-05,Apollo Pharmacy,\"Rs. 1,250.00 Dr\"\n");
        assert_eq!(out.transactions[0].category, Category::Healthcare);
        assert_eq!(out.transactions[0].amount.to_string(), "1250.00");
    }

    // ── workbooks ─────────────────────────────────────────────────────────────

    #[test]
    fn workbook_date_and_number_cells_become_transactions() {
        let workbook = Dataset::from_excel(include_bytes!("../tests/fixtures/feb_statement.xlsx")).unwrap();
        assert_eq!(workbook.headers, vec!["Date", "Description", "Debit", "Credit"]);
        assert_eq!(workbook.rows[0], vec!["2024-02-01", "Electricity Bill", "1200", ""]);

        let normalizer = Normalizer::default();
        let classifier = Classifier::default();
        let out = TabularExtractor::new(&normalizer, &classifier).extract(&workbook).unwrap();
        assert!(out.dropped.is_empty());
        let got: Vec<(String, &str, String, Category, bool)> = out
            .transactions
            .iter()
            .map(|t| (t.date.to_string(), t.description.as_str(), t.amount.to_string(), t.category, t.is_recurring))
            .collect();
        assert_eq!(
            got,
            vec![
                ("2024-02-01".to_string(), "Electricity Bill", "1200.00".to_string(), Category::Utilities, false),
                ("2024-02-03".to_string(), "Swiggy order", "349.50".to_string(), Category::Food, false),
                ("2024-02-02".to_string(), "Salary Credit", "50000.00".to_string(), Category::Income, true),
            ]
        );
    }

    #[test]
    fn header_only_resolution_rejects_unnamed_columns() {
        let normalizer = Normalizer::default();
        let classifier = Classifier::default();
        let unnamed = dataset("On,Narrative,Value
01-03-2024,Swiggy order,-350
02-03-2024,Salary March,50000
");

        let strict = TabularConfig {
            resolvers: vec![RoleResolver::HeaderKeywords],
            ..TabularConfig::default()
        };
        let result = TabularExtractor::with_config(&normalizer, &classifier, strict).extract(&unnamed);
        assert!(matches!(result, Err(TabularError::UnresolvedRoles(_))));

        let out = TabularExtractor::new(&normalizer, &classifier).extract(&unnamed).unwrap();
        assert_eq!(out.transactions.len(), 2);
    }

    // ── drops ─────────────────────────────────────────────────────────────────

    #[test]
    fn bad_rows_are_dropped_with_reasons() {
        let out = run(
            "Date,Description,Amount\n\
             not a date,Coffee,-120\n\
             2024-01-02,,-50\n\
             2024-01-03,Opening balance,0\n\
             2024-01-04\n\
             2024-01-05,Parking,-40\n",
        );
        assert_eq!(out.transactions.len(), 1);
        assert_eq!(out.transactions[0].description, "Parking");
        let reasons: Vec<(usize, DropReason)> = out.dropped.iter().map(|d| (d.row, d.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                (0, DropReason::UnparsableDate),
                (1, DropReason::MissingDescription),
                (3, DropReason::ShortRow),
                (2, DropReason::ZeroAmount),
            ]
        );
    }

    #[test]
    fn unresolved_roles_fail_the_dataset() {
        let normalizer = Normalizer::default();
        let classifier = Classifier::default();
        let result = TabularExtractor::new(&normalizer, &classifier).extract(&dataset("Name,Team\nAsha,Blue\n"));
        assert!(matches!(result, Err(TabularError::UnresolvedRoles(_))));
    }

    #[test]
    fn direction_words() {
        assert_eq!(direction_word(" Cr. "), Some(true));
        assert_eq!(direction_word("DEBIT"), Some(false));
        assert_eq!(direction_word("neft"), None);
    }
}
