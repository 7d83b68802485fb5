use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Income,
    Emi,
    Sip,
    Rent,
    Insurance,
    Utilities,
    Food,
    Transport,
    Shopping,
    Entertainment,
    Healthcare,
    Education,
    #[default]
    Expense,
    Other,
}

impl Category {
    pub const ALL: [Category; 14] = [
        Category::Income,
        Category::Emi,
        Category::Sip,
        Category::Rent,
        Category::Insurance,
        Category::Utilities,
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Entertainment,
        Category::Healthcare,
        Category::Education,
        Category::Expense,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Income => "income",
            Category::Emi => "emi",
            Category::Sip => "sip",
            Category::Rent => "rent",
            Category::Insurance => "insurance",
            Category::Utilities => "utilities",
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Shopping => "shopping",
            Category::Entertainment => "entertainment",
            Category::Healthcare => "healthcare",
            Category::Education => "education",
            Category::Expense => "expense",
            Category::Other => "other",
        }
    }

    pub fn is_income(self) -> bool {
        self == Category::Income
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| format!("Unknown category: '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_through_from_str() {
        for c in Category::ALL {
            assert_eq!(c.to_string().parse::<Category>().unwrap(), c);
        }
    }

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!("EMI".parse::<Category>().unwrap(), Category::Emi);
        assert_eq!(" Utilities ".parse::<Category>().unwrap(), Category::Utilities);
        assert!("groceries".parse::<Category>().is_err());
    }

    #[test]
    fn default_is_expense() {
        assert_eq!(Category::default(), Category::Expense);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Category::Healthcare).unwrap(), "\"healthcare\"");
    }
}
