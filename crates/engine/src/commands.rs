//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ledger_entries::EntryKind;

/// Create a ledger entry against a bank account or a cash box.
///
/// Exactly one of `bank_account_id`/`cash_box_id` must be set.
#[derive(Clone, Debug)]
pub struct CreateEntryCmd {
    pub bank_account_id: Option<Uuid>,
    pub cash_box_id: Option<Uuid>,
    pub date: DateTime<Utc>,
    pub kind: EntryKind,
    pub amount_minor: i64,
    pub description: String,
    pub memo: Option<String>,
    pub cost_center_id: Option<Uuid>,
    pub document_number: Option<String>,
}

impl CreateEntryCmd {
    #[must_use]
    pub fn new(
        kind: EntryKind,
        amount_minor: i64,
        description: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            bank_account_id: None,
            cash_box_id: None,
            date,
            kind,
            amount_minor,
            description: description.into(),
            memo: None,
            cost_center_id: None,
            document_number: None,
        }
    }

    #[must_use]
    pub fn bank_account(mut self, account_id: Uuid) -> Self {
        self.bank_account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn cash_box(mut self, cash_box_id: Uuid) -> Self {
        self.cash_box_id = Some(cash_box_id);
        self
    }

    #[must_use]
    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    #[must_use]
    pub fn cost_center(mut self, cost_center_id: Uuid) -> Self {
        self.cost_center_id = Some(cost_center_id);
        self
    }

    #[must_use]
    pub fn document_number(mut self, document_number: impl Into<String>) -> Self {
        self.document_number = Some(document_number.into());
        self
    }
}
