//! Benign endpoint classification
use crate::error::WatchResult;
use regex::Regex;

/// Resolved-hostname suffix of Google's infrastructure. Those connections go
/// through Private Google Access rather than the NAT port pool.
pub const GOOGLE_SUFFIX: &str = ".1e100.net";

/// Decides whether a remote host is a known-safe endpoint that does not
/// consume NAT ports.
#[derive(Debug, Clone)]
pub struct BenignFilter {
    suffixes: Vec<String>,
    patterns: Vec<Regex>,
}

impl Default for BenignFilter {
    fn default() -> Self {
        Self {
            suffixes: vec![GOOGLE_SUFFIX.to_string()],
            patterns: Vec::new(),
        }
    }
}

impl BenignFilter {
    /// Add another host suffix treated as benign.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffixes.push(suffix.into());
        self
    }

    /// Add a host regex treated as benign.
    pub fn with_pattern(mut self, pattern: &str) -> WatchResult<Self> {
        self.patterns.push(Regex::new(pattern)?);
        Ok(self)
    }

    pub fn is_benign(&self, host: &str) -> bool {
        self.suffixes.iter().any(|s| host.ends_with(s.as_str()))
            || self.patterns.iter().any(|re| re.is_match(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_google_suffix() {
        let filter = BenignFilter::default();
        assert!(filter.is_benign("lga25s71-in-f14.1e100.net"));
        assert!(!filter.is_benign("1e100.net.example.com"));
        assert!(!filter.is_benign("93.184.216.34"));
    }

    #[test]
    fn test_extra_suffix_and_pattern() {
        let filter = BenignFilter::default()
            .with_suffix(".internal")
            .with_pattern(r"^10\.")
            .unwrap();
        assert!(filter.is_benign("metadata.google.internal"));
        assert!(filter.is_benign("10.0.0.9"));
        assert!(!filter.is_benign("110.0.0.9"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(BenignFilter::default().with_pattern("(").is_err());
    }
}
