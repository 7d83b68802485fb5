use std::fmt;
use tracing::debug;

use crate::dataset::sample_column;
use crate::normalize::Normalizer;

const DATE_KEYWORDS: &[&str] = &["date", "time", "day"];
const DESCRIPTION_KEYWORDS: &[&str] = &[
    "description", "particular", "detail", "narration", "remark", "memo",
];
const TYPE_HEADERS: &[&str] = &["type", "txn_type", "transaction_type", "dr_cr", "cr_dr", "dr/cr", "cr/dr"];
const DEBIT_KEYWORDS: &[&str] = &["debit", "withdrawal"];
const CREDIT_KEYWORDS: &[&str] = &["credit", "deposit"];
const BALANCE_KEYWORDS: &[&str] = &["balance"];
const AMOUNT_KEYWORDS: &[&str] = &["amount", "amt"];

/// How an amount column's values map to direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountKind {
    /// Money out; values are magnitudes.
    Debit,
    /// Money in; values are magnitudes.
    Credit,
    /// Sign carries direction, unless a type column says otherwise.
    Signed,
    /// Running balance. Only used when nothing better exists.
    Balance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountColumn {
    pub index: usize,
    pub kind: AmountKind,
}

/// Resolved column positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRoles {
    pub date: usize,
    pub description: usize,
    pub amounts: Vec<AmountColumn>,
    pub type_column: Option<usize>,
}

impl ColumnRoles {
    /// The columns transactions are read from: debit and credit streams when
    /// present, else the first signed column, else the first balance column.
    pub fn amount_streams(&self) -> Vec<AmountColumn> {
        let of = |kind: AmountKind| self.amounts.iter().filter(move |a| a.kind == kind).copied();

        let split: Vec<AmountColumn> = of(AmountKind::Debit).chain(of(AmountKind::Credit)).collect();
        if !split.is_empty() {
            return split;
        }
        of(AmountKind::Signed)
            .next()
            .or_else(|| of(AmountKind::Balance).next())
            .into_iter()
            .collect()
    }

    /// Highest index a row must reach to carry a date and description.
    pub(crate) fn required_width(&self) -> usize {
        self.date.max(self.description) + 1
    }
}

/// Roles that stayed unresolved after every resolver ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingRoles(pub Vec<&'static str>);

impl fmt::Display for MissingRoles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not identify {} column(s)", self.0.join(", "))
    }
}

impl std::error::Error for MissingRoles {}

/// One way of deciding which column plays which role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleResolver {
    HeaderKeywords,
    DataSampling,
}

pub const DEFAULT_RESOLVERS: &[RoleResolver] = &[RoleResolver::HeaderKeywords, RoleResolver::DataSampling];

/// Tuning for [`infer_roles`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    /// Non-empty cells inspected per column.
    pub sample_size: usize,
    /// Share of sampled cells that must qualify.
    pub threshold: f64,
    /// Description columns need a longer average cell than this.
    pub min_description_len: f64,
}

impl SamplingConfig {
    pub const fn with_sample_size(sample_size: usize) -> Self {
        Self {
            sample_size,
            threshold: 0.5,
            min_description_len: 5.0,
        }
    }
}

#[derive(Debug, Default)]
struct PartialRoles {
    date: Option<usize>,
    description: Option<usize>,
    amounts: Vec<AmountColumn>,
    type_column: Option<usize>,
}

impl PartialRoles {
    fn is_complete(&self) -> bool {
        self.date.is_some() && self.description.is_some() && !self.amounts.is_empty()
    }

    fn is_taken(&self, index: usize) -> bool {
        self.date == Some(index)
            || self.description == Some(index)
            || self.type_column == Some(index)
            || self.amounts.iter().any(|a| a.index == index)
    }

    fn finish(self) -> Result<ColumnRoles, MissingRoles> {
        match (self.date, self.description, self.amounts.is_empty()) {
            (Some(date), Some(description), false) => Ok(ColumnRoles {
                date,
                description,
                amounts: self.amounts,
                type_column: self.type_column,
            }),
            _ => {
                let mut missing = Vec::new();
                if self.date.is_none() {
                    missing.push("date");
                }
                if self.amounts.is_empty() {
                    missing.push("amount");
                }
                if self.description.is_none() {
                    missing.push("description");
                }
                Err(MissingRoles(missing))
            }
        }
    }
}

struct Context<'a> {
    headers: Vec<String>,
    rows: &'a [Vec<String>],
    normalizer: &'a Normalizer,
    sampling: SamplingConfig,
    width: usize,
}

impl Context<'_> {
    fn sample(&self, column: usize) -> Vec<&str> {
        sample_column(self.rows, column, self.sampling.sample_size)
    }

    fn share(&self, column: usize, qualifies: impl Fn(&str) -> bool) -> Option<f64> {
        let cells = self.sample(column);
        if cells.is_empty() {
            return None;
        }
        let hits = cells.iter().filter(|c| qualifies(c)).count();
        Some(hits as f64 / cells.len() as f64)
    }

    fn is_date(&self, cell: &str) -> bool {
        !self.normalizer.looks_like_amount(cell) && self.normalizer.parse_date(cell).is_ok()
    }

    fn is_amount(&self, cell: &str) -> bool {
        self.normalizer.looks_like_amount(cell)
    }

    /// Header-matched amount columns must not contradict their header; an
    /// all-empty sample is accepted.
    fn numeric_or_empty(&self, column: usize) -> bool {
        self.share(column, |c| self.is_amount(c))
            .map_or(true, |s| s >= self.sampling.threshold)
    }

    fn mostly(&self, column: usize, qualifies: impl Fn(&str) -> bool) -> bool {
        self.share(column, qualifies)
            .is_some_and(|s| s >= self.sampling.threshold)
    }

    fn mean_len(&self, column: usize) -> f64 {
        let cells = self.sample(column);
        if cells.is_empty() {
            return 0.0;
        }
        cells.iter().map(|c| c.chars().count()).sum::<usize>() as f64 / cells.len() as f64
    }
}

impl RoleResolver {
    fn fill(self, ctx: &Context<'_>, roles: &mut PartialRoles) {
        match self {
            RoleResolver::HeaderKeywords => by_header(ctx, roles),
            RoleResolver::DataSampling => by_sampling(ctx, roles),
        }
    }
}

/// Infer column roles, running `resolvers` in order until all roles resolve.
pub fn infer_roles(
    headers: &[String],
    rows: &[Vec<String>],
    normalizer: &Normalizer,
    sampling: SamplingConfig,
    resolvers: &[RoleResolver],
) -> Result<ColumnRoles, MissingRoles> {
    let width = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(headers.len()))
        .max()
        .unwrap_or(0);
    let ctx = Context {
        headers: headers.iter().map(|h| normalize_header(h)).collect(),
        rows,
        normalizer,
        sampling,
        width,
    };

    let mut roles = PartialRoles::default();
    for resolver in resolvers {
        if roles.is_complete() {
            break;
        }
        resolver.fill(&ctx, &mut roles);
        debug!(
            ?resolver,
            date = ?roles.date,
            description = ?roles.description,
            amounts = roles.amounts.len(),
            "column roles"
        );
    }
    roles.finish()
}

/// Trimmed, lowercased, spaces to underscores.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
}

fn has_any(header: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| header.contains(k))
}

fn has_token(header: &str, token: &str) -> bool {
    header
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|t| t == token)
}

fn by_header(ctx: &Context<'_>, roles: &mut PartialRoles) {
    let headers = &ctx.headers;

    if roles.type_column.is_none() {
        roles.type_column = headers
            .iter()
            .position(|h| TYPE_HEADERS.contains(&h.as_str()));
    }

    if roles.date.is_none() {
        roles.date = (0..headers.len())
            .find(|&i| !roles.is_taken(i) && has_any(&headers[i], DATE_KEYWORDS));
    }

    if roles.amounts.is_empty() {
        for (i, h) in headers.iter().enumerate() {
            if roles.is_taken(i) {
                continue;
            }
            let kind = if has_any(h, DEBIT_KEYWORDS) || has_token(h, "dr") {
                AmountKind::Debit
            } else if has_any(h, CREDIT_KEYWORDS) || has_token(h, "cr") {
                AmountKind::Credit
            } else if has_any(h, BALANCE_KEYWORDS) {
                AmountKind::Balance
            } else if has_any(h, AMOUNT_KEYWORDS) {
                AmountKind::Signed
            } else {
                continue;
            };
            if ctx.numeric_or_empty(i) {
                roles.amounts.push(AmountColumn { index: i, kind });
            }
        }
    }

    if roles.description.is_none() {
        roles.description = (0..headers.len())
            .find(|&i| !roles.is_taken(i) && has_any(&headers[i], DESCRIPTION_KEYWORDS));
    }
}

fn by_sampling(ctx: &Context<'_>, roles: &mut PartialRoles) {
    if roles.date.is_none() {
        roles.date = (0..ctx.width).find(|&i| !roles.is_taken(i) && ctx.mostly(i, |c| ctx.is_date(c)));
    }

    if roles.amounts.is_empty() {
        if let Some(index) =
            (0..ctx.width).find(|&i| !roles.is_taken(i) && ctx.mostly(i, |c| ctx.is_amount(c)))
        {
            roles.amounts.push(AmountColumn {
                index,
                kind: AmountKind::Signed,
            });
        }
    }

    if roles.description.is_none() {
        let min_len = ctx.sampling.min_description_len;
        let mut best: Option<(usize, f64)> = None;
        for i in (0..ctx.width).filter(|&i| !roles.is_taken(i)) {
            if ctx.mostly(i, |c| ctx.is_date(c) || ctx.is_amount(c)) {
                continue;
            }
            let len = ctx.mean_len(i);
            if len > min_len && best.map_or(true, |(_, b)| len > b) {
                best = Some((i, len));
            }
        }
        roles.description = best.map(|(i, _)| i);
    }
}
