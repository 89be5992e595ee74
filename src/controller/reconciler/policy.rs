//! # Exclusion Policy
//!
//! Decides whether a namespace is administrative and must be left alone.
//!
//! The policy is a single delimited string of regular expressions, e.g.
//! `kube-.*,openshift-.*,default`. Whitespace around each rule is ignored,
//! so `" team-a "` behaves like `team-a`. Rules match anywhere in the namespace name
//! (`kube` excludes `my-kube-tools`); anchor a rule with `^...$` to match the
//! whole name.

use crate::constants::POLICY_RULE_DELIMITER;
use crate::controller::reconciler::config_loader::PolicyDocument;
use regex::Regex;
use tracing::warn;

/// Compiled exclusion rules, in the order they were written
#[derive(Debug, Clone, Default)]
pub struct ExclusionPolicy {
    rules: Vec<Regex>,
}

impl ExclusionPolicy {
    /// A policy that excludes nothing
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile every rule in `field`
    ///
    /// Blank segments are dropped so an empty field can never turn into a
    /// match-everything rule. Rules that fail to compile are logged and
    /// skipped; they never match.
    #[must_use]
    pub fn parse(field: &str) -> Self {
        let rules = field
            .split(POLICY_RULE_DELIMITER)
            .map(str::trim)
            .filter(|rule| !rule.is_empty())
            .filter_map(|rule| match Regex::new(rule) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    warn!(rule, error = %e, "Ignoring invalid exclusion rule");
                    None
                }
            })
            .collect();
        Self { rules }
    }

    /// Compile the rules stored under `field`, or nothing if the field is absent
    #[must_use]
    pub fn from_document(document: &PolicyDocument, field: &str) -> Self {
        document.field(field).map(Self::parse).unwrap_or_default()
    }

    /// First rule matching `identifier`
    #[must_use]
    pub fn matching_rule(&self, identifier: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.is_match(identifier))
            .map(Regex::as_str)
    }

    #[must_use]
    pub fn matches(&self, identifier: &str) -> bool {
        self.matching_rule(identifier).is_some()
    }

    /// Number of valid rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(Regex::as_str)
    }
}

/// Whether `identifier` is excluded by the raw policy field
#[must_use]
pub fn is_excluded(identifier: &str, policy_field: &str) -> bool {
    ExclusionPolicy::parse(policy_field).matches(identifier)
}
