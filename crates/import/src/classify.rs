use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use taxwise_core::{Category, Classification};
use thiserror::Error;

use crate::patterns::{self, PatternError};

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Failed to parse rules TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Patterns that assign one category. Rules are tried in declared order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: Category,
    pub patterns: Vec<String>,
}

/// A merchant or payment-rail identifier found in descriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRule {
    pub tag: String,
    pub pattern: String,
}

/// The keyword tables behind the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierRules {
    pub income: Vec<String>,
    pub recurring: Vec<String>,
    pub categories: Vec<CategoryRule>,
    pub tags: Vec<TagRule>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        fn rule(category: Category, pats: &[&str]) -> CategoryRule {
            CategoryRule {
                category,
                patterns: patterns::owned(pats),
            }
        }
        fn tag(tag: &str, pattern: &str) -> TagRule {
            TagRule {
                tag: tag.to_string(),
                pattern: pattern.to_string(),
            }
        }

        Self {
            income: patterns::owned(&[
                r"salary", r"credit", r"deposit", r"transfer.*\bin\b", r"interest.*credit",
                r"dividend", r"refund", r"cashback", r"reward", r"bonus",
            ]),
            recurring: patterns::owned(&[
                r"\bemi\b", r"\bsip\b", r"\brent\b", r"salary", r"insurance", r"premium",
                r"subscription", r"monthly", r"recurring",
            ]),
            categories: vec![
                rule(Category::Emi, &[
                    r"\bemi\b", r"loan.*payment", r"mortgage", r"car.*loan", r"home.*loan",
                    r"personal.*loan", r"education.*loan",
                ]),
                rule(Category::Sip, &[
                    r"\bsip\b", r"mutual.*fund", r"systematic.*investment", r"\bmf\b.*purchase",
                ]),
                rule(Category::Rent, &[
                    r"\brent\b", r"house.*rent", r"flat.*rent", r"\bpg\b", r"accommodation",
                ]),
                rule(Category::Insurance, &[
                    r"insurance", r"\bpolicy\b", r"premium", r"\blic\b",
                ]),
                rule(Category::Utilities, &[
                    r"electricity", r"\bwater\b", r"\bgas\b", r"internet", r"broadband",
                    r"mobile", r"\bphone\b", r"\bdth\b", r"\bcable\b",
                ]),
                rule(Category::Food, &[
                    r"restaurant", r"swiggy", r"zomato", r"uber.*eats", r"\bfood", r"grocer",
                    r"supermarket", r"bigbasket", r"dmart",
                ]),
                rule(Category::Transport, &[
                    r"\buber\b", r"\bola\b", r"rapido", r"fuel", r"petrol", r"diesel",
                    r"parking", r"\btoll\b", r"\bmetro\b", r"\bbus\b",
                ]),
                rule(Category::Shopping, &[
                    r"amazon", r"flipkart", r"myntra", r"shopping", r"\bmall\b", r"retail",
                    r"\bstore\b", r"purchase",
                ]),
                rule(Category::Entertainment, &[
                    r"netflix", r"spotify", r"hotstar", r"prime.*video", r"cinema", r"movie",
                    r"bookmyshow", r"\bpvr\b",
                ]),
                rule(Category::Healthcare, &[
                    r"hospital", r"doctor", r"clinic", r"pharmacy", r"medical", r"diagnostic",
                    r"\blab\b", r"\bhealth",
                ]),
                rule(Category::Education, &[
                    r"school", r"college", r"university", r"tuition", r"\bfees?\b", r"course",
                    r"training", r"\bbooks?\b",
                ]),
            ],
            tags: vec![
                tag("swiggy", r"swiggy"),
                tag("zomato", r"zomato"),
                tag("uber", r"\buber"),
                tag("ola", r"\bola\b"),
                tag("amazon", r"amazon"),
                tag("flipkart", r"flipkart"),
                tag("myntra", r"myntra"),
                tag("netflix", r"netflix"),
                tag("spotify", r"spotify"),
                tag("bigbasket", r"bigbasket"),
                tag("paytm", r"paytm"),
                tag("phonepe", r"phonepe"),
                tag("gpay", r"\bgpay\b|google\s*pay"),
                tag("upi", r"\bupi\b"),
                tag("neft", r"\bneft\b"),
                tag("imps", r"\bimps\b"),
                tag("rtgs", r"\brtgs\b"),
            ],
        }
    }
}

/// Internal pairing of a category with its precompiled patterns.
#[derive(Debug, Clone)]
struct CompiledRule {
    category: Category,
    patterns: Vec<Regex>,
}

/// Rule-based categorization. Deterministic: output depends only on the inputs.
#[derive(Debug, Clone)]
pub struct Classifier {
    income: Vec<Regex>,
    recurring: Vec<Regex>,
    categories: Vec<CompiledRule>,
    tags: Vec<(String, Regex)>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassifierRules::default()).expect("built-in patterns compile")
    }
}

impl Classifier {
    pub fn new(rules: &ClassifierRules) -> Result<Self, ClassifierError> {
        let categories = rules
            .categories
            .iter()
            .map(|r| {
                Ok(CompiledRule {
                    category: r.category,
                    patterns: patterns::compile_all(&r.patterns)?,
                })
            })
            .collect::<Result<Vec<_>, PatternError>>()?;
        let tags = rules
            .tags
            .iter()
            .map(|t| Ok((t.tag.to_lowercase(), patterns::compile(&t.pattern)?)))
            .collect::<Result<Vec<_>, PatternError>>()?;

        Ok(Self {
            income: patterns::compile_all(&rules.income)?,
            recurring: patterns::compile_all(&rules.recurring)?,
            categories,
            tags,
        })
    }

    pub fn from_toml(toml_content: &str) -> Result<Self, ClassifierError> {
        let rules: ClassifierRules = toml::from_str(toml_content)?;
        Self::new(&rules)
    }

    /// Money in, or an income keyword, wins before any other category is considered.
    pub fn categorize(&self, description: &str, amount: Decimal) -> Category {
        if amount > Decimal::ZERO || any_match(&self.income, description) {
            return Category::Income;
        }
        self.categories
            .iter()
            .find(|r| any_match(&r.patterns, description))
            .map(|r| r.category)
            .unwrap_or(Category::Expense)
    }

    pub fn is_recurring(&self, description: &str) -> bool {
        any_match(&self.recurring, description)
    }

    /// All matching tags, not just the first.
    pub fn tags(&self, description: &str) -> BTreeSet<String> {
        self.tags
            .iter()
            .filter(|(_, re)| re.is_match(description))
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    pub fn classify(&self, description: &str, amount: Decimal) -> Classification {
        Classification {
            category: self.categorize(description, amount),
            is_recurring: self.is_recurring(description),
            tags: self.tags(description),
        }
    }
}

fn any_match(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|re| re.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debit(n: i64) -> Decimal {
        Decimal::from(-n)
    }

    #[test]
    fn positive_amount_is_income() {
        let c = Classifier::default();
        assert_eq!(c.categorize("Electricity Bill", Decimal::from(1200)), Category::Income);
    }

    #[test]
    fn income_keyword_beats_other_categories() {
        let c = Classifier::default();
        assert_eq!(c.categorize("Insurance refund", debit(500)), Category::Income);
        assert_eq!(c.categorize("Amazon cashback", debit(50)), Category::Income);
        assert_eq!(c.categorize("NEFT Salary Credit", debit(1)), Category::Income);
    }

    #[test]
    fn declared_order_decides_first_match() {
        let c = Classifier::default();
        // "home loan" (emi) is declared before "insurance".
        assert_eq!(c.categorize("Home loan insurance", debit(900)), Category::Emi);
        // "uber eats" is food, declared before transport's "uber".
        assert_eq!(c.categorize("UBER EATS ORDER", debit(300)), Category::Food);
        assert_eq!(c.categorize("Uber trip", debit(300)), Category::Transport);
    }

    #[test]
    fn category_examples() {
        let c = Classifier::default();
        let cases = [
            ("Electricity Bill", Category::Utilities),
            ("Home Loan EMI", Category::Emi),
            ("SIP HDFC Mutual Fund", Category::Sip),
            ("House rent March", Category::Rent),
            ("LIC premium", Category::Insurance),
            ("Swiggy order", Category::Food),
            ("Petrol pump", Category::Transport),
            ("Flipkart", Category::Shopping),
            ("Netflix", Category::Entertainment),
            ("Apollo Pharmacy", Category::Healthcare),
            ("College fees", Category::Education),
            ("ATM withdrawal", Category::Expense),
        ];
        for (desc, expected) in cases {
            assert_eq!(c.categorize(desc, debit(100)), expected, "{desc}");
        }
    }

    #[test]
    fn short_keywords_need_word_boundaries() {
        let c = Classifier::default();
        assert_eq!(c.categorize("Coca cola", debit(40)), Category::Expense);
        assert_eq!(c.categorize("Current account charges", debit(40)), Category::Expense);
        assert!(!c.is_recurring("Premier league tickets"));
    }

    #[test]
    fn recurrence_is_independent_of_category() {
        let c = Classifier::default();
        let salary = c.classify("Salary Credit", Decimal::from(50_000));
        assert_eq!(salary.category, Category::Income);
        assert!(salary.is_recurring);
        assert!(c.is_recurring("Netflix monthly subscription"));
        assert!(!c.is_recurring("Electricity Bill"));
    }

    #[test]
    fn tags_collect_every_match() {
        let c = Classifier::default();
        let tags = c.tags("UPI/SWIGGY via PhonePe");
        let expected: BTreeSet<String> =
            ["phonepe", "swiggy", "upi"].iter().map(|s| s.to_string()).collect();
        assert_eq!(tags, expected);
        assert!(c.tags("Cash deposit").is_empty());
    }

    #[test]
    fn classify_is_deterministic() {
        let c = Classifier::default();
        let a = c.classify("IMPS Amazon Prime Video monthly", debit(179));
        let b = c.classify("IMPS Amazon Prime Video monthly", debit(179));
        assert_eq!(a, b);
    }

    #[test]
    fn from_toml_replaces_tables() {
        let toml = r#"
            income = ["payout"]
            recurring = ["every month"]

            [[categories]]
            category = "entertainment"
            patterns = ["steam"]

            [[tags]]
            tag = "Steam"
            pattern = "steam"
        "#;
        let c = Classifier::from_toml(toml).unwrap();
        assert_eq!(c.categorize("Steam purchase", debit(10)), Category::Entertainment);
        assert_eq!(c.categorize("Salary", debit(10)), Category::Expense);
        assert_eq!(c.categorize("Partner payout", debit(10)), Category::Income);
        assert!(c.is_recurring("charged every month"));
        assert!(c.tags("STEAM").contains("steam"));
    }

    #[test]
    fn from_toml_rejects_bad_pattern() {
        let toml = r#"income = ["(oops"]"#;
        assert!(matches!(Classifier::from_toml(toml), Err(ClassifierError::Pattern(_))));
    }

    #[test]
    fn default_rules_serialize_to_toml() {
        let text = toml::to_string(&ClassifierRules::default()).unwrap();
        let back: ClassifierRules = toml::from_str(&text).unwrap();
        assert_eq!(back, ClassifierRules::default());
    }
}
