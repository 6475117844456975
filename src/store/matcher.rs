//! Configurable identifier matching.
//!
//! Matching used to be an unanchored substring scan over the entity's
//! attribute bag, which merged distinct subjects whenever one identifier
//! contained another (two people sharing the SSN-last-4 suffix "1234" and
//! "41234", say). [`MatchStrategy::ExactNormalized`] is the default;
//! [`MatchStrategy::Substring`] is kept selectable for callers that want
//! the old behavior.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::EntityRecord;

/// How a candidate identifier is compared against stored entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "strategy")]
pub enum MatchStrategy {
    /// Equality on normalized identifiers. The default.
    ExactNormalized,
    /// Case-insensitive containment against the entity's serialized
    /// attribute bag. Prone to over-merging short identifiers.
    Substring,
    /// Levenshtein distance on normalized identifiers, at most
    /// `max_distance` edits apart.
    EditDistance { max_distance: usize },
}

impl Default for MatchStrategy {
    fn default() -> Self {
        MatchStrategy::ExactNormalized
    }
}

impl MatchStrategy {
    /// Whether `identifier` (already normalized) matches the stored record.
    pub fn matches(&self, identifier: &str, record: &EntityRecord) -> bool {
        match self {
            MatchStrategy::ExactNormalized => record.identifier == identifier,
            MatchStrategy::Substring => record
                .additional_info
                .to_string()
                .to_lowercase()
                .contains(identifier),
            MatchStrategy::EditDistance { max_distance } => {
                strsim::levenshtein(&record.identifier, identifier) <= *max_distance
            }
        }
    }
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStrategy::ExactNormalized => f.write_str("exact"),
            MatchStrategy::Substring => f.write_str("substring"),
            MatchStrategy::EditDistance { max_distance } => write!(f, "edit:{max_distance}"),
        }
    }
}

/// Parse failure for a strategy string such as `exact` or `edit:2`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid match strategy '{value}' (expected exact, substring, or edit:<n>)")]
pub struct ParseMatchStrategyError {
    pub value: String,
}

impl FromStr for MatchStrategy {
    type Err = ParseMatchStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "exact" | "exact_normalized" => Ok(MatchStrategy::ExactNormalized),
            "substring" => Ok(MatchStrategy::Substring),
            other => {
                if let Some(n) = other.strip_prefix("edit:") {
                    if let Ok(max_distance) = n.parse::<usize>() {
                        return Ok(MatchStrategy::EditDistance { max_distance });
                    }
                }
                Err(ParseMatchStrategyError {
                    value: other.to_string(),
                })
            }
        }
    }
}
