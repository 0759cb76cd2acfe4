//! Series-splitting rules.
//!
//! Stackable instances of a series are split into separate display sets
//! when they disagree on selected attributes, such as the presence of a
//! contrast agent or the echo number.

use crate::error::{Result, UnknownCriterionSnafu, UnknownKeywordSnafu};
use crate::model::Instance;
use dicom::core::dictionary::DataDictionary;
use dicom::dictionary_std::StandardDataDictionary;
use serde::{Deserialize, Serialize};
use snafu::OptionExt;
use std::fmt;
use std::str::FromStr;

/// What a rule takes from its attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitCriterion {
    /// Only whether the attribute is present.
    Presence,
    /// The attribute value itself.
    Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRule {
    pub keyword: String,
    pub criterion: SplitCriterion,
}

impl SplitRule {
    /// Creates a rule for a keyword of the standard data dictionary.
    pub fn new(keyword: &str, criterion: SplitCriterion) -> Result<Self> {
        let entry = StandardDataDictionary
            .by_name(keyword)
            .context(UnknownKeywordSnafu { keyword })?;
        Ok(SplitRule {
            keyword: entry.alias.to_string(),
            criterion,
        })
    }

    /// `ContrastBolusAgent` by presence, then `EchoNumbers` by value.
    pub fn defaults() -> Vec<SplitRule> {
        vec![
            SplitRule {
                keyword: "ContrastBolusAgent".to_string(),
                criterion: SplitCriterion::Presence,
            },
            SplitRule {
                keyword: "EchoNumbers".to_string(),
                criterion: SplitCriterion::Value,
            },
        ]
    }

    fn key_part(&self, instance: &Instance) -> KeyPart {
        match (instance.split_attribute(&self.keyword), self.criterion) {
            (None, _) => KeyPart::Absent,
            (Some(_), SplitCriterion::Presence) => KeyPart::Present,
            (Some(value), SplitCriterion::Value) => KeyPart::Value(value.to_string()),
        }
    }
}

impl FromStr for SplitRule {
    type Err = crate::error::Error;

    /// Parses `KEYWORD` (value rule) or `KEYWORD=presence|value`.
    fn from_str(s: &str) -> Result<Self> {
        let (keyword, criterion) = match s.split_once('=') {
            Some((keyword, criterion)) => (keyword.trim(), criterion.trim()),
            None => (s.trim(), "value"),
        };
        let criterion = match criterion.to_ascii_lowercase().as_str() {
            "presence" => SplitCriterion::Presence,
            "value" => SplitCriterion::Value,
            _ => return UnknownCriterionSnafu { criterion }.fail(),
        };
        SplitRule::new(keyword, criterion)
    }
}

impl fmt::Display for SplitRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let criterion = match self.criterion {
            SplitCriterion::Presence => "presence",
            SplitCriterion::Value => "value",
        };
        write!(f, "{}={}", self.keyword, criterion)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    Absent,
    Present,
    Value(String),
}

/// Composite key of one instance under an ordered list of rules.
///
/// Instances with equal keys belong to the same display set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SplitKey(Vec<KeyPart>);

impl SplitKey {
    pub fn of(instance: &Instance, rules: &[SplitRule]) -> Self {
        SplitKey(rules.iter().map(|rule| rule.key_part(instance)).collect())
    }
}

impl fmt::Display for SplitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.0 {
            match part {
                KeyPart::Absent => f.write_str("[-]")?,
                KeyPart::Present => f.write_str("[+]")?,
                KeyPart::Value(value) => write!(f, "[{value}]")?,
            }
        }
        Ok(())
    }
}
