// Static approval table curated by the operator

use crate::error::GateError;
use crate::fingerprint::FingerprintToken;
use std::collections::{BTreeMap, HashSet};

/// Tokens the operator has approved. Absent or `false` entries are not
/// approved.
#[derive(Debug, Clone, Default)]
pub struct ApprovalRegistry {
    approved: HashSet<String>,
}

impl ApprovalRegistry {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            approved: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from a `token -> approved` table.
    pub fn from_table(table: &BTreeMap<String, bool>) -> Self {
        Self::new(
            table
                .iter()
                .filter(|(_, approved)| **approved)
                .map(|(token, _)| token.clone()),
        )
    }

    /// Parse a JSON object literal of `token -> bool` entries.
    pub fn from_json(json: &str) -> Result<Self, GateError> {
        let table: BTreeMap<String, bool> =
            serde_json::from_str(json).map_err(|e| GateError::Encoding(e.to_string()))?;
        Ok(Self::from_table(&table))
    }

    pub fn is_approved(&self, token: &FingerprintToken) -> bool {
        self.approved.contains(token.as_str())
    }

    pub fn len(&self) -> usize {
        self.approved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.approved.is_empty()
    }
}
