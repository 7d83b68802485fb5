use regex::Regex;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::OnceLock;
use taxwise_core::{Provenance, UnclassifiedTransaction, PLACEHOLDER_DESCRIPTION};
use taxwise_ocr::OcrPipeline;
use taxwise_pdf::{PdfPage, TextTable};
use thiserror::Error;
use tracing::{debug, warn};

use crate::classify::Classifier;
use crate::normalize::{AmountMatch, Direction, Normalizer};
use crate::outcome::{DropReason, Extraction};
use crate::roles::{infer_roles, RoleResolver, SamplingConfig, DEFAULT_RESOLVERS};
use crate::tabular::RowReader;

/// Shortest description kept as-is; anything shorter becomes the placeholder.
const MIN_DESCRIPTION_CHARS: usize = 3;

fn re_statement_year() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(
            r"(?i)\b\d{1,2}[-/.\s]+(?:\d{1,2}|[a-z]{3,9})[-/.,\s]+((?:19|20)\d{2})\b|\b((?:19|20)\d{2})[-/.]\d{1,2}[-/.]\d{1,2}\b",
        )
        .expect("invalid regex")
    })
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("No transactions found on any of {pages} page(s)")]
    NoTransactions { pages: usize },
}

/// One page of a statement, from a PDF or anything else that can supply text.
pub trait StatementPage {
    /// 1-based page number.
    fn number(&self) -> usize;
    /// Extracted text; `None` when the page carries none.
    fn text(&self) -> Option<String>;
    fn tables(&self) -> Vec<TextTable>;
    /// The page as PNG or JPEG bytes, for OCR.
    fn render(&self) -> Option<Vec<u8>>;
}

impl StatementPage for PdfPage<'_> {
    fn number(&self) -> usize {
        PdfPage::number(self) as usize
    }

    fn text(&self) -> Option<String> {
        PdfPage::text(self).unwrap_or_else(|e| {
            warn!(page = PdfPage::number(self), error = %e, "unreadable page text");
            None
        })
    }

    fn tables(&self) -> Vec<TextTable> {
        PdfPage::tables(self).unwrap_or_else(|e| {
            warn!(page = PdfPage::number(self), error = %e, "unreadable page tables");
            Vec::new()
        })
    }

    fn render(&self) -> Option<Vec<u8>> {
        self.render_png().unwrap_or_else(|e| {
            warn!(page = PdfPage::number(self), error = %e, "page could not be rendered");
            None
        })
    }
}

/// Per-page extraction strategies, run in order with results merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStrategy {
    Tables,
    TextLines,
    /// Only for pages without text.
    Ocr,
}

#[derive(Debug)]
pub enum StrategyOutcome {
    Matched(Extraction),
    NoMatch,
}

#[derive(Debug, Clone)]
pub struct DocumentConfig {
    pub strategies: Vec<PageStrategy>,
    pub table_sampling: SamplingConfig,
    pub resolvers: Vec<RoleResolver>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            strategies: vec![PageStrategy::Tables, PageStrategy::TextLines, PageStrategy::Ocr],
            table_sampling: SamplingConfig::with_sample_size(5),
            resolvers: DEFAULT_RESOLVERS.to_vec(),
        }
    }
}

/// Turns statement pages into transactions.
pub struct DocumentExtractor<'a> {
    normalizer: &'a Normalizer,
    classifier: &'a Classifier,
    ocr: Option<&'a OcrPipeline>,
    config: DocumentConfig,
}

impl<'a> DocumentExtractor<'a> {
    pub fn new(normalizer: &'a Normalizer, classifier: &'a Classifier) -> Self {
        Self {
            normalizer,
            classifier,
            ocr: None,
            config: DocumentConfig::default(),
        }
    }

    pub fn with_ocr(mut self, ocr: &'a OcrPipeline) -> Self {
        self.ocr = Some(ocr);
        self
    }

    pub fn with_config(mut self, config: DocumentConfig) -> Self {
        self.config = config;
        self
    }

    /// Extract every page; fails only when no page yields a transaction.
    pub fn extract<P: StatementPage>(&self, pages: &[P]) -> Result<Extraction, DocumentError> {
        let mut out = Extraction::default();
        for page in pages {
            out.merge(self.extract_page(page));
        }
        if out.is_empty() {
            return Err(DocumentError::NoTransactions { pages: pages.len() });
        }
        Ok(out)
    }

    /// All configured strategies for one page. Never fails; a page with nothing
    /// recognizable yields an empty result.
    pub fn extract_page<P: StatementPage + ?Sized>(&self, page: &P) -> Extraction {
        let number = page.number();
        let text = page.text();
        let normalizer = self.normalizer_for(text.as_deref());
        let mut consumed: Vec<Range<usize>> = Vec::new();
        let mut out = Extraction::default();

        for strategy in &self.config.strategies {
            let outcome = match strategy {
                PageStrategy::Tables => self.run_tables(page, &normalizer, &mut consumed),
                PageStrategy::TextLines => match &text {
                    Some(t) => self.run_text_lines(t, &normalizer, Provenance::TextLine, number, &consumed),
                    None => StrategyOutcome::NoMatch,
                },
                PageStrategy::Ocr if text.is_none() => self.run_ocr(page),
                PageStrategy::Ocr => StrategyOutcome::NoMatch,
            };
            match outcome {
                StrategyOutcome::Matched(found) => {
                    debug!(page = number, ?strategy, transactions = found.transactions.len(), "strategy matched");
                    out.merge(found);
                }
                StrategyOutcome::NoMatch => debug!(page = number, ?strategy, "no match"),
            }
        }
        out
    }

    /// Parse free text line by line. Lines without both a date and an amount are skipped.
    pub fn extract_text(&self, text: &str, source: Provenance, page: usize) -> Extraction {
        let normalizer = self.normalizer_for(Some(text));
        match self.run_text_lines(text, &normalizer, source, page, &[]) {
            StrategyOutcome::Matched(found) => found,
            StrategyOutcome::NoMatch => Extraction::default(),
        }
    }

    fn normalizer_for(&self, text: Option<&str>) -> Normalizer {
        if self.normalizer.config().reference_year.is_some() {
            return self.normalizer.clone();
        }
        match text.and_then(infer_statement_year) {
            Some(year) => self.normalizer.with_reference_year(year),
            None => self.normalizer.clone(),
        }
    }

    fn run_tables<P: StatementPage + ?Sized>(
        &self,
        page: &P,
        normalizer: &Normalizer,
        consumed: &mut Vec<Range<usize>>,
    ) -> StrategyOutcome {
        let mut out = Extraction::default();
        let mut matched = false;

        for table in page.tables() {
            if header_reads_as_entry(&table.header, normalizer) {
                debug!(page = page.number(), lines = ?table.lines, "table header is itself an entry, left to text lines");
                continue;
            }
            let infer = |resolvers: &[RoleResolver]| {
                infer_roles(&table.header, &table.rows, normalizer, self.config.table_sampling, resolvers)
            };
            let keyed = if self.config.resolvers.contains(&RoleResolver::HeaderKeywords) {
                infer(&[RoleResolver::HeaderKeywords][..]).ok()
            } else {
                None
            };
            let (roles, header_named) = match keyed {
                Some(roles) => (roles, true),
                None => match infer(self.config.resolvers.as_slice()) {
                    Ok(roles) => (roles, false),
                    Err(missing) => {
                        debug!(page = page.number(), %missing, "table skipped");
                        continue;
                    }
                },
            };
            let found = RowReader {
                roles: &roles,
                normalizer,
                classifier: self.classifier,
                source: Provenance::Table,
                page: Some(page.number()),
            }
            .read(&table.rows);

            if !found.is_empty() {
                // A header found only by sampling stays with the text-line pass.
                let first = if header_named { table.lines.start } else { table.lines.start + 1 };
                consumed.push(first..table.lines.end);
            }
            matched = true;
            out.merge(found);
        }

        if matched {
            StrategyOutcome::Matched(out)
        } else {
            StrategyOutcome::NoMatch
        }
    }

    fn run_text_lines(
        &self,
        text: &str,
        normalizer: &Normalizer,
        source: Provenance,
        page: usize,
        consumed: &[Range<usize>],
    ) -> StrategyOutcome {
        let mut out = Extraction::default();
        let mut matched = false;

        for (i, line) in text.lines().enumerate() {
            if consumed.iter().any(|r| r.contains(&i)) {
                continue;
            }
            let Some(parsed) = parse_line(line, normalizer) else {
                continue;
            };
            matched = true;
            match parsed {
                Ok(raw) => out.accept(
                    UnclassifiedTransaction { source, ..raw },
                    self.classifier,
                    Some(page),
                    i,
                ),
                Err(reason) => out.drop_row(Some(page), i, reason),
            }
        }

        if matched {
            StrategyOutcome::Matched(out)
        } else {
            StrategyOutcome::NoMatch
        }
    }

    fn run_ocr<P: StatementPage + ?Sized>(&self, page: &P) -> StrategyOutcome {
        let Some(ocr) = self.ocr else {
            debug!(page = page.number(), "page has no text and OCR is not configured");
            return StrategyOutcome::NoMatch;
        };
        let Some(image) = page.render() else {
            debug!(page = page.number(), "page has no text and nothing to render");
            return StrategyOutcome::NoMatch;
        };
        let text = match ocr.recognize_page(&image) {
            Ok(text) => text,
            Err(e) => {
                warn!(page = page.number(), error = %e, "OCR failed");
                return StrategyOutcome::NoMatch;
            }
        };
        let normalizer = self.normalizer_for(Some(&text));
        self.run_text_lines(&text, &normalizer, Provenance::Ocr, page.number(), &[])
    }
}

/// A first row holding both a date and an amount is data, not column names.
fn header_reads_as_entry(header: &[String], normalizer: &Normalizer) -> bool {
    let dated = header
        .iter()
        .any(|cell| !normalizer.looks_like_amount(cell) && normalizer.parse_date(cell).is_ok());
    dated && header.iter().any(|cell| normalizer.looks_like_amount(cell))
}

/// `None` when the line lacks a date or an amount; `Err` when it has both but
/// no usable value.
fn parse_line(line: &str, normalizer: &Normalizer) -> Option<Result<UnclassifiedTransaction, DropReason>> {
    let date = normalizer.find_date(line)?;

    let mut blanked = line.to_string();
    for span in normalizer.date_spans(line).into_iter().chain(std::iter::once(date.span.clone())) {
        blank(&mut blanked, span);
    }
    let amounts = normalizer.find_amounts(&blanked);
    if amounts.is_empty() {
        return None;
    }

    let (amount, used) = match passbook_columns(&blanked, &amounts) {
        Some([withdrawal, deposit, balance]) => {
            let amount = if !withdrawal.amount.value.is_zero() {
                -withdrawal.amount.value.abs()
            } else {
                deposit.amount.value.abs()
            };
            (amount, vec![withdrawal, deposit, balance])
        }
        None => match pick_amount(&amounts) {
            Some(chosen) => (directed(chosen), vec![chosen]),
            None => (Decimal::ZERO, Vec::new()),
        },
    };
    if amount.is_zero() {
        return Some(Err(DropReason::ZeroAmount));
    }

    let mut rest = blanked;
    for a in amounts.iter().filter(|a| a.is_formatted() || a.pattern == 0).chain(used) {
        blank(&mut rest, a.span.clone());
    }
    let description = rest.split_whitespace().collect::<Vec<_>>().join(" ");
    let description = if description.chars().count() < MIN_DESCRIPTION_CHARS {
        PLACEHOLDER_DESCRIPTION.to_string()
    } else {
        description
    };

    Some(Ok(UnclassifiedTransaction {
        date: date.date,
        amount,
        description,
        source: Provenance::TextLine,
    }))
}

/// Withdrawal, deposit and balance columns closing the line, all formatted.
fn passbook_columns<'m>(line: &str, amounts: &'m [AmountMatch]) -> Option<[&'m AmountMatch; 3]> {
    let [.., w, d, b] = amounts else {
        return None;
    };
    let only_space = |r: Range<usize>| line[r].trim().is_empty();
    let aligned = [w, d, b].iter().all(|a| a.is_formatted())
        && only_space(w.span.end..d.span.start)
        && only_space(d.span.end..b.span.start)
        && only_space(b.span.end..line.len());
    aligned.then_some([w, d, b])
}

/// Currency-prefixed amounts first, then the leftmost formatted one, then the
/// leftmost of any kind. Zeros never win.
fn pick_amount(amounts: &[AmountMatch]) -> Option<&AmountMatch> {
    let nonzero = || amounts.iter().filter(|a| !a.amount.value.is_zero());
    nonzero()
        .find(|a| a.pattern == 0)
        .or_else(|| nonzero().find(|a| a.is_formatted()))
        .or_else(|| nonzero().next())
}

/// Statement lines print money out without a marker; only `CR` means money in.
fn directed(a: &AmountMatch) -> Decimal {
    match a.amount.marker {
        Some(Direction::Credit) => a.amount.value.abs(),
        _ => -a.amount.value.abs(),
    }
}

/// Overwrite a byte range with spaces, keeping every other offset stable.
fn blank(text: &mut String, span: Range<usize>) {
    if let Some(part) = text.get(span.clone()) {
        let spaces = " ".repeat(part.len());
        text.replace_range(span, &spaces);
    }
}

/// The year most dates on the page carry; the latest wins a tie.
pub fn infer_statement_year(text: &str) -> Option<i32> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for caps in re_statement_year().captures_iter(text) {
        let year: Option<i32> = caps.get(1).or_else(|| caps.get(2)).and_then(|m| m.as_str().parse().ok());
        if let Some(y) = year {
            *counts.entry(y).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by_key(|(year, n)| (*n, *year))
        .map(|(year, _)| year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
    use std::io::Cursor;
    use taxwise_core::Category;
    use taxwise_ocr::MockRecognizer;
    use taxwise_pdf::detect_tables;

    /// An in-memory page.
    #[derive(Default)]
    struct FakePage {
        number: usize,
        text: Option<String>,
        image: Option<Vec<u8>>,
    }

    impl FakePage {
        fn with_text(number: usize, text: &str) -> Self {
            Self {
                number,
                text: Some(text.to_string()),
                image: None,
            }
        }

        fn scanned(number: usize) -> Self {
            Self {
                number,
                text: None,
                image: Some(tiny_png()),
            }
        }
    }

    impl StatementPage for FakePage {
        fn number(&self) -> usize {
            self.number
        }

        fn text(&self) -> Option<String> {
            self.text.clone()
        }

        fn tables(&self) -> Vec<TextTable> {
            self.text.as_deref().map(detect_tables).unwrap_or_default()
        }

        fn render(&self) -> Option<Vec<u8>> {
            self.image.clone()
        }
    }

    fn tiny_png() -> Vec<u8> {
        let img: GrayImage = ImageBuffer::from_fn(8, 8, |x, _| Luma([if x < 4 { 30 } else { 220 }]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn normalizer() -> Normalizer {
        Normalizer::default().with_reference_year(2024)
    }

    // ── text lines ────────────────────────────────────────────────────────────

    #[test]
    fn passbook_line_uses_withdrawal_column() {
        let (n, c) = (normalizer(), Classifier::default());
        let out = DocumentExtractor::new(&n, &c).extract_text(
            "15 Mar  Home Loan EMI  11000.00  0.00  88,000.00",
            Provenance::TextLine,
            1,
        );
        assert_eq!(out.transactions.len(), 1);
        let tx = &out.transactions[0];
        assert_eq!(tx.amount.to_string(), "11000.00");
        assert_eq!(tx.category, Category::Emi);
        assert!(tx.is_recurring);
        assert_eq!(tx.description, "Home Loan EMI");
        assert_eq!(tx.date.to_string(), "2024-03-15");
    }

    #[test]
    fn passbook_line_deposit_is_income() {
        let (n, c) = (normalizer(), Classifier::default());
        let out = DocumentExtractor::new(&n, &c).extract_text(
            "01 Apr  ACME PAYROLL  0.00  65,000.00  1,53,000.00",
            Provenance::TextLine,
            1,
        );
        assert_eq!(out.transactions[0].category, Category::Income);
        assert_eq!(out.transactions[0].amount.to_string(), "65000.00");
    }

    #[test]
    fn single_amount_lines_read_markers() {
        let (n, c) = (normalizer(), Classifier::default());
        let out = DocumentExtractor::new(&n, &c).extract_text(
            "05/03/2024 UPI/4521/SWIGGY 350.00\n\
             06/03/2024 IMPS from Ravi 2,000.00 CR\n\
             07/03/2024 Uber trip Rs. 412.50 Dr",
            Provenance::TextLine,
            2,
        );
        let got: Vec<(&str, Category, String)> = out
            .transactions
            .iter()
            .map(|t| (t.description.as_str(), t.category, t.amount.to_string()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("UPI/4521/SWIGGY", Category::Food, "350.00".to_string()),
                ("IMPS from Ravi", Category::Income, "2000.00".to_string()),
                ("Uber trip", Category::Transport, "412.50".to_string()),
            ]
        );
    }

    #[test]
    fn lines_without_date_or_amount_are_ignored() {
        let (n, c) = (normalizer(), Classifier::default());
        let out = DocumentExtractor::new(&n, &c).extract_text(
            "Statement period 01/01/2024 to 31/01/2024\nCustomer care 1800 123 456\nOpening balance",
            Provenance::TextLine,
            1,
        );
        assert!(out.transactions.is_empty());
        assert!(out.dropped.is_empty());
    }

    #[test]
    fn zero_amount_line_is_logged() {
        let (n, c) = (normalizer(), Classifier::default());
        let out = DocumentExtractor::new(&n, &c).extract_text("03/03/2024 Reversal 0.00", Provenance::TextLine, 4);
        assert!(out.transactions.is_empty());
        assert_eq!(out.dropped[0].reason, DropReason::ZeroAmount);
        assert_eq!(out.dropped[0].page, Some(4));
    }

    #[test]
    fn short_description_gets_placeholder() {
        let (n, c) = (normalizer(), Classifier::default());
        let out = DocumentExtractor::new(&n, &c).extract_text("03/03/2024 X 99.00", Provenance::TextLine, 1);
        assert_eq!(out.transactions[0].description, PLACEHOLDER_DESCRIPTION);
    }

    #[test]
    fn statement_year_comes_from_page_dates() {
        assert_eq!(infer_statement_year("Period: 01 Jan 2023 to 31 Mar 2023\n15 Mar  Rent"), Some(2023));
        assert_eq!(infer_statement_year("Generated 2024-04-02"), Some(2024));
        assert_eq!(infer_statement_year("15 Mar  Rent  5,000.00"), None);

        let c = Classifier::default();
        let n = Normalizer::default();
        let out = DocumentExtractor::new(&n, &c).extract_text(
            "Statement 01/01/2022 - 31/03/2022\n15 Mar  House rent  15,000.00  0.00  40,000.00",
            Provenance::TextLine,
            1,
        );
        assert_eq!(out.transactions[0].date.to_string(), "2022-03-15");
        assert_eq!(out.transactions[0].category, Category::Rent);
    }

    // ── pages ─────────────────────────────────────────────────────────────────

    #[test]
    fn table_rows_are_not_read_twice() {
        let (n, c) = (normalizer(), Classifier::default());
        let page = FakePage::with_text(
            1,
            "Date        Particulars      Withdrawal   Deposit     Balance\n\
             01-03-2024  Swiggy order     350.00       0.00        9,650.00\n\
             02-03-2024  Salary           0.00         50,000.00   59,650.00\n\
             \n\
             05-03-2024  ATM cash withdrawal 2,000.00",
        );
        let out = DocumentExtractor::new(&n, &c).extract_page(&page);
        let sources: Vec<Provenance> = out.transactions.iter().map(|t| t.source).collect();
        assert_eq!(sources, vec![Provenance::Table, Provenance::Table, Provenance::TextLine]);
        assert_eq!(out.transactions[1].category, Category::Income);
        assert_eq!(out.transactions[2].amount.to_string(), "2000.00");
    }

    #[test]
    fn headerless_passbook_lines_are_not_taken_for_a_table() {
        let (n, c) = (normalizer(), Classifier::default());
        let page = FakePage::with_text(
            1,
            "15 Mar  Home Loan EMI  11000.00  0.00  88,000.00\n\
             16 Mar  Swiggy order  350.00  0.00  87,650.00",
        );
        let out = DocumentExtractor::new(&n, &c).extract_page(&page);
        assert!(out.dropped.is_empty());
        let got: Vec<(&str, Category, String, Provenance)> = out
            .transactions
            .iter()
            .map(|t| (t.description.as_str(), t.category, t.amount.to_string(), t.source))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Home Loan EMI", Category::Emi, "11000.00".to_string(), Provenance::TextLine),
                ("Swiggy order", Category::Food, "350.00".to_string(), Provenance::TextLine),
            ]
        );
    }

    #[test]
    fn sampled_table_keeps_only_its_rows() {
        let (n, c) = (normalizer(), Classifier::default());
        let page = FakePage::with_text(
            1,
            "On          Narrative        Value\n\
             01-03-2024  Swiggy order     -350.00\n\
             02-03-2024  Salary March     50,000.00",
        );
        let out = DocumentExtractor::new(&n, &c).extract_page(&page);
        let got: Vec<(Category, Provenance)> = out.transactions.iter().map(|t| (t.category, t.source)).collect();
        assert_eq!(got, vec![(Category::Food, Provenance::Table), (Category::Income, Provenance::Table)]);
        assert!(out.dropped.is_empty());
    }

    #[test]
    fn blank_page_with_garbled_ocr_yields_nothing() {
        let (n, c) = (normalizer(), Classifier::default());
        let ocr = OcrPipeline::new(Box::new(MockRecognizer::new("~~ ##%% lllI1 ..")));
        let out = DocumentExtractor::new(&n, &c).with_ocr(&ocr).extract_page(&FakePage::scanned(3));
        assert!(out.transactions.is_empty());
        assert!(out.dropped.is_empty());
    }

    #[test]
    fn ocr_text_is_tagged_with_its_source() {
        let (n, c) = (normalizer(), Classifier::default());
        let ocr = OcrPipeline::new(Box::new(MockRecognizer::new("12/03/2024 Apollo Pharmacy 1,250.00")));
        let out = DocumentExtractor::new(&n, &c).with_ocr(&ocr).extract_page(&FakePage::scanned(1));
        assert_eq!(out.transactions.len(), 1);
        assert_eq!(out.transactions[0].source, Provenance::Ocr);
        assert_eq!(out.transactions[0].category, Category::Healthcare);
    }

    #[test]
    fn ocr_is_skipped_when_page_has_text() {
        let (n, c) = (normalizer(), Classifier::default());
        let ocr = OcrPipeline::new(Box::new(MockRecognizer::new("12/03/2024 Should not appear 1,250.00")));
        let page = FakePage {
            image: Some(tiny_png()),
            ..FakePage::with_text(1, "12/03/2024 Netflix 649.00")
        };
        let out = DocumentExtractor::new(&n, &c).with_ocr(&ocr).extract_page(&page);
        assert_eq!(out.transactions.len(), 1);
        assert_eq!(out.transactions[0].description, "Netflix");
    }

    #[test]
    fn ocr_backend_failure_is_not_fatal() {
        let (n, c) = (normalizer(), Classifier::default());
        let ocr = OcrPipeline::new(Box::new(taxwise_ocr::DisabledRecognizer));
        let pages = vec![FakePage::with_text(1, "12/03/2024 Netflix 649.00"), FakePage::scanned(2)];
        let out = DocumentExtractor::new(&n, &c).with_ocr(&ocr).extract(&pages).unwrap();
        assert_eq!(out.transactions.len(), 1);
    }

    #[test]
    fn document_without_any_transaction_fails() {
        let (n, c) = (normalizer(), Classifier::default());
        let pages = vec![FakePage::with_text(1, "Thank you for banking with us"), FakePage::default()];
        let err = DocumentExtractor::new(&n, &c).extract(&pages).unwrap_err();
        assert!(matches!(err, DocumentError::NoTransactions { pages: 2 }));
    }

    #[test]
    fn strategies_can_be_restricted() {
        let (n, c) = (normalizer(), Classifier::default());
        let page = FakePage::with_text(1, "12/03/2024 Netflix 649.00");
        let config = DocumentConfig {
            strategies: vec![PageStrategy::Tables],
            ..DocumentConfig::default()
        };
        let out = DocumentExtractor::new(&n, &c).with_config(config).extract_page(&page);
        assert!(out.transactions.is_empty());
    }
}
