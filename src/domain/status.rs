use super::invoice::InvoiceStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Gateway status string to invoice status.
///
/// Statuses missing from the table are acknowledged without an invoice, so new
/// gateway vocabulary never makes the gateway retry forever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusTable {
    entries: BTreeMap<String, InvoiceStatus>,
}

impl Default for StatusTable {
    /// The mapping for API version 3.
    fn default() -> Self {
        Self::from_entries([
            ("failure", InvoiceStatus::Failure),
            ("success", InvoiceStatus::Successful),
            ("sandbox", InvoiceStatus::Successful),
            ("reversed", InvoiceStatus::Refund),
            ("refund", InvoiceStatus::Refund),
            ("subscribed", InvoiceStatus::Successful),
            ("unsubscribed", InvoiceStatus::Canceled),
        ])
    }
}

impl StatusTable {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, InvoiceStatus)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(status, mapped)| (status.to_string(), mapped))
                .collect(),
        }
    }

    pub fn with(mut self, status: impl Into<String>, mapped: InvoiceStatus) -> Self {
        self.entries.insert(status.into(), mapped);
        self
    }

    /// Layers `overrides` on top of this table.
    pub fn merged(mut self, overrides: &StatusTable) -> Self {
        for (status, mapped) in &overrides.entries {
            self.entries.insert(status.clone(), *mapped);
        }
        self
    }

    pub fn resolve(&self, status: &str) -> Option<InvoiceStatus> {
        self.entries.get(status).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
