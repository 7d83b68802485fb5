use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::category::Category;
use super::money::Money;
use super::period::{DateRange, YearMonth};
use super::transaction::Transaction;

/// Totals for one side of the ledger (income or everything else).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlowSummary {
    pub total: Money,
    pub average: Money,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryStats {
    pub sum: Money,
    pub count: usize,
    pub mean: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecurringSummary {
    pub count: usize,
    pub total_amount: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub income: Money,
    pub expense: Money,
    pub net: Money,
}

/// Summary analytics over a transaction list.
///
/// Always rebuilt from scratch by [`analyze`]; never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub total_transactions: usize,
    pub date_range: Option<DateRange>,
    pub income_analysis: FlowSummary,
    pub expense_analysis: FlowSummary,
    pub category_breakdown: BTreeMap<Category, CategoryStats>,
    pub recurring_transactions: RecurringSummary,
    pub monthly_trend: BTreeMap<YearMonth, MonthlyTrend>,
    pub emi: FlowSummary,
    pub sip: FlowSummary,
    pub rent: FlowSummary,
    pub insurance: FlowSummary,
}

/// Build an [`AnalysisReport`]. Total: an empty slice yields a zeroed report.
pub fn analyze(transactions: &[Transaction]) -> AnalysisReport {
    let income = summarize(transactions.iter().filter(|t| t.is_income()));
    let expense = summarize(transactions.iter().filter(|t| !t.is_income()));
    let of_category = |c: Category| summarize(transactions.iter().filter(move |t| t.category == c));

    let recurring = transactions.iter().filter(|t| t.is_recurring);
    let recurring_transactions = RecurringSummary {
        count: recurring.clone().count(),
        total_amount: recurring.map(|t| t.amount).sum(),
    };

    AnalysisReport {
        total_transactions: transactions.len(),
        date_range: DateRange::spanning(transactions.iter().map(|t| t.date)),
        income_analysis: income,
        expense_analysis: expense,
        category_breakdown: category_breakdown(transactions),
        recurring_transactions,
        monthly_trend: monthly_trend(transactions),
        emi: of_category(Category::Emi),
        sip: of_category(Category::Sip),
        rent: of_category(Category::Rent),
        insurance: of_category(Category::Insurance),
    }
}

fn summarize<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> FlowSummary {
    let (total, count) = transactions.fold((Money::zero(), 0usize), |(sum, n), t| (sum + t.amount, n + 1));
    FlowSummary {
        total,
        average: Money::mean(total, count),
        count,
    }
}

fn category_breakdown(transactions: &[Transaction]) -> BTreeMap<Category, CategoryStats> {
    let mut groups: BTreeMap<Category, CategoryStats> = BTreeMap::new();
    for t in transactions {
        let stats = groups.entry(t.category).or_default();
        stats.sum = stats.sum + t.amount;
        stats.count += 1;
    }
    for stats in groups.values_mut() {
        stats.mean = Money::mean(stats.sum, stats.count);
    }
    groups
}

fn monthly_trend(transactions: &[Transaction]) -> BTreeMap<YearMonth, MonthlyTrend> {
    let mut trend: BTreeMap<YearMonth, MonthlyTrend> = BTreeMap::new();
    for t in transactions {
        let bucket = trend.entry(YearMonth::of(t.date)).or_default();
        if t.is_income() {
            bucket.income = bucket.income + t.amount;
        } else {
            bucket.expense = bucket.expense + t.amount;
        }
    }
    for bucket in trend.values_mut() {
        bucket.net = bucket.income - bucket.expense;
    }
    trend
}
