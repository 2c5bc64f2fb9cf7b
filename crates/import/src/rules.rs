use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tabula_core::{Posting, Transaction};

use crate::categorize::Categorizer;
use crate::error::ImportError;
use crate::util::similarity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    #[serde(default)]
    pub priority: i32,
    pub pattern: String,
    #[serde(default)]
    pub match_type: MatchType,
    pub account: String,
    #[serde(default)]
    pub amount_min: Option<Decimal>,
    #[serde(default)]
    pub amount_max: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(try_from = "String", into = "String")]
pub enum MatchType {
    #[default]
    Contains,
    Exact,
    Regex,
    Fuzzy {
        threshold: f32,
    },
}

impl std::str::FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contains" => Ok(MatchType::Contains),
            "exact" => Ok(MatchType::Exact),
            "regex" => Ok(MatchType::Regex),
            s if s.starts_with("fuzzy:") => {
                let threshold = s[6..]
                    .parse::<f32>()
                    .map_err(|_| "Invalid fuzzy threshold".to_string())?;
                Ok(MatchType::Fuzzy { threshold })
            }
            other => Err(format!("Unknown match type: '{other}'")),
        }
    }
}

impl TryFrom<String> for MatchType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MatchType> for String {
    fn from(m: MatchType) -> Self {
        match m {
            MatchType::Contains => "contains".to_string(),
            MatchType::Exact => "exact".to_string(),
            MatchType::Regex => "regex".to_string(),
            MatchType::Fuzzy { threshold } => format!("fuzzy:{threshold}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<CategoryRule>,
}

struct CompiledRule {
    rule: CategoryRule,
    compiled_regex: Option<regex::Regex>,
}

/// Attaches the counter posting to single-leg transactions from a
/// prioritized rule list.
pub struct RuleCategorizer {
    rules: Vec<CompiledRule>,
}

impl RuleCategorizer {
    pub fn new(rules: Vec<CategoryRule>) -> Result<Self, ImportError> {
        let mut compiled = rules
            .into_iter()
            .map(|rule| {
                let compiled_regex = match rule.match_type {
                    MatchType::Regex => Some(regex::Regex::new(&rule.pattern).map_err(|source| {
                        ImportError::InvalidPattern {
                            pattern: rule.pattern.clone(),
                            source,
                        }
                    })?),
                    _ => None,
                };
                Ok(CompiledRule { rule, compiled_regex })
            })
            .collect::<Result<Vec<_>, ImportError>>()?;
        // Highest priority first; stable, so equal priorities keep file order.
        compiled.sort_by(|a, b| b.rule.priority.cmp(&a.rule.priority));
        Ok(Self { rules: compiled })
    }

    /// Rules are read from `[[rules]]` tables.
    pub fn from_toml(toml_content: &str) -> Result<Self, ImportError> {
        let file: RuleFile = toml::from_str(toml_content)?;
        Self::new(file.rules)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The best rule for `text` moving `amount` (compared by absolute value).
    pub fn find_matching_rule(&self, text: &str, amount: Decimal) -> Option<&CategoryRule> {
        self.rules
            .iter()
            .find(|cr| rule_matches(cr, text, amount.abs()))
            .map(|cr| &cr.rule)
    }
}

impl Categorizer for RuleCategorizer {
    fn categorize(&self, mut txn: Transaction) -> Transaction {
        let [posting] = txn.postings.as_slice() else {
            return txn;
        };
        let amount = posting.units.as_ref().map(|u| u.number).unwrap_or_default();
        let text = match &txn.payee {
            Some(payee) => format!("{payee} {}", txn.narration),
            None => txn.narration.clone(),
        };
        if let Some(rule) = self.find_matching_rule(text.trim(), amount) {
            debug!(rule = %rule.name, account = %rule.account, "categorized transaction");
            txn.postings.push(Posting::inferred(rule.account.clone()));
        }
        txn
    }
}

fn rule_matches(cr: &CompiledRule, text: &str, amount: Decimal) -> bool {
    let rule = &cr.rule;

    if rule.amount_min.is_some_and(|min| amount < min) {
        return false;
    }
    if rule.amount_max.is_some_and(|max| amount > max) {
        return false;
    }

    let lowered = text.to_lowercase();
    let pattern = rule.pattern.to_lowercase();

    match &rule.match_type {
        MatchType::Contains => lowered.contains(&pattern),
        MatchType::Exact => lowered == pattern,
        MatchType::Regex => cr
            .compiled_regex
            .as_ref()
            .is_some_and(|re| re.is_match(text)),
        MatchType::Fuzzy { threshold } => similarity(&lowered, &pattern) >= *threshold,
    }
}
