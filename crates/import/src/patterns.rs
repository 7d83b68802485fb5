use regex::{Regex, RegexBuilder};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Invalid pattern '{pattern}': {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Compile a case-insensitive pattern.
pub fn compile(pattern: &str) -> Result<Regex, PatternError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| PatternError {
            pattern: pattern.to_string(),
            source,
        })
}

pub fn compile_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>, PatternError> {
    patterns.iter().map(|p| compile(p.as_ref())).collect()
}

/// Owned copies of a static pattern table.
pub(crate) fn owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiled_patterns_ignore_case() {
        let re = compile("salary").unwrap();
        assert!(re.is_match("MONTHLY SALARY CREDIT"));
    }

    #[test]
    fn invalid_pattern_reports_source() {
        let err = compile_all(&["ok", "(unclosed"]).unwrap_err();
        assert_eq!(err.pattern, "(unclosed");
        assert!(err.to_string().contains("(unclosed"));
    }
}
