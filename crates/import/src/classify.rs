use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ImportError;

/// One `pattern -> account` entry of a keyword map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRule {
    pub pattern: String,
    pub account: String,
}

impl AccountRule {
    pub fn new(pattern: &str, account: &str) -> Self {
        AccountRule {
            pattern: pattern.to_string(),
            account: account.to_string(),
        }
    }
}

/// Ordered keyword-to-account map with a mandatory fallback.
///
/// Lookup is first match in list order, not the most specific match.
#[derive(Debug, Clone)]
pub struct AccountMap {
    rules: Vec<(Regex, String)>,
    default: String,
}

impl AccountMap {
    pub fn new(rules: &[AccountRule], default: impl Into<String>) -> Result<Self, ImportError> {
        let default = default.into();
        if default.trim().is_empty() {
            return Err(ImportError::MissingDefaultAccount);
        }
        let rules = rules
            .iter()
            .map(|rule| {
                Regex::new(&rule.pattern)
                    .map(|re| (re, rule.account.clone()))
                    .map_err(|source| ImportError::InvalidPattern {
                        pattern: rule.pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AccountMap { rules, default })
    }

    pub fn default_account(&self) -> &str {
        &self.default
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn classify(&self, keyword: &str) -> &str {
        if keyword.is_empty() {
            return &self.default;
        }
        self.rules
            .iter()
            .find(|(re, _)| re.is_match(keyword))
            .map(|(_, account)| account.as_str())
            .unwrap_or(self.default.as_str())
    }
}
