//! File name predicate for the matcher.

use crate::error::ConfigError;
use regex::Regex;
use std::path::Path;

/// Unanchored regular expression tested against lowercased file names.
///
/// Only the file name is lowercased. The pattern is compiled as given, so
/// `Report` never matches anything while `report` matches `REPORT.TXT`.
#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    regex: Regex,
}

impl NamePattern {
    /// Compile a pattern fragment
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        // Grouped so alternations stay inside the unanchored search.
        let regex = Regex::new(&format!("(?:{pattern})")).map_err(|source| {
            ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as given by the user
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Test a bare file name
    pub fn matches(&self, file_name: &str) -> bool {
        self.regex.is_match(&file_name.to_lowercase())
    }

    /// Test the final component of a path
    pub fn matches_path(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.matches(&name.to_string_lossy()))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_matches_anywhere() {
        let pattern = NamePattern::new("report").unwrap();
        assert!(pattern.matches("report.txt"));
        assert!(pattern.matches("annual_report_2024.pdf"));
        assert!(!pattern.matches("summary.txt"));
    }

    #[test]
    fn file_name_is_lowercased() {
        let pattern = NamePattern::new("report").unwrap();
        assert!(pattern.matches("REPORT.TXT"));
        assert!(pattern.matches("Quarterly-Report.md"));
    }

    #[test]
    fn pattern_case_is_not_normalized() {
        let pattern = NamePattern::new("Report").unwrap();
        assert!(!pattern.matches("Report.txt"));
        assert!(!pattern.matches("report.txt"));
    }

    #[test]
    fn pattern_is_a_regex_fragment() {
        let pattern = NamePattern::new(r"\d{4}\.log$").unwrap();
        assert!(pattern.matches("server-2024.log"));
        assert!(!pattern.matches("server.log"));
    }

    #[test]
    fn alternation_is_unanchored() {
        let pattern = NamePattern::new("draft|final").unwrap();
        assert!(pattern.matches("my_final_copy.doc"));
        assert!(pattern.matches("a-draft"));
        assert!(!pattern.matches("notes.doc"));
    }

    #[test]
    fn invalid_pattern_is_config_error() {
        let error = NamePattern::new("(unclosed").unwrap_err();
        assert!(matches!(error, ConfigError::InvalidPattern { .. }));
        assert!(error.to_string().contains("(unclosed"));
    }

    #[test]
    fn matches_path_uses_final_component() {
        let pattern = NamePattern::new("report").unwrap();
        assert!(pattern.matches_path(Path::new("/archive/2024/report.txt")));
        assert!(!pattern.matches_path(Path::new("/report/summary.txt")));
        assert!(!pattern.matches_path(Path::new("/")));
    }
}
