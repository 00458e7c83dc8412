//! Ledger entries.
//!
//! A [`LedgerEntry`] is one dated credit/debit movement against a bank
//! account or a cash box. Amounts are stored as positive integer **minor
//! units** (cents); the direction lives in [`EntryKind`].
//!
//! `balance_minor` is the *stored* running balance at this entry. It is
//! written once at insert time from the then most recent entry and is only
//! ever rewritten by the balance repair job, so after a backdated insert it
//! can disagree with the authoritative chronological chain until that job
//! runs.
//!
//! Ordering: `date` is the business-significant calendar timestamp;
//! `created_at` is the physical insertion timestamp and acts purely as a
//! tie-breaker between entries sharing a date.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, OwnerRef, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Credit,
    Debit,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }

    /// Applies the direction to a positive amount: credits add, debits
    /// subtract.
    pub fn signed(self, amount_minor: i64) -> i64 {
        match self {
            Self::Credit => amount_minor,
            Self::Debit => -amount_minor,
        }
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            other => Err(EngineError::Validation(format!(
                "invalid entry kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub owner: OwnerRef,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub kind: EntryKind,
    /// Positive amount in cents; direction comes from `kind`.
    pub amount_minor: i64,
    /// Stored running balance at this entry, in cents.
    pub balance_minor: i64,
    pub description: String,
    pub memo: Option<String>,
    pub cost_center_id: Option<Uuid>,
    pub document_number: Option<String>,
}

impl LedgerEntry {
    /// The signed effect of this entry on its owner's balance.
    pub fn signed_amount_minor(&self) -> i64 {
        self.kind.signed(self.amount_minor)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub date: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub kind: String,
    pub amount_minor: i64,
    pub balance_minor: i64,
    pub description: String,
    pub memo: Option<String>,
    pub cost_center_id: Option<String>,
    pub document_number: Option<String>,
    pub bank_account_id: Option<String>,
    pub cash_box_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_accounts::Entity",
        from = "Column::BankAccountId",
        to = "super::bank_accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    BankAccounts,
    #[sea_orm(
        belongs_to = "super::cash_boxes::Entity",
        from = "Column::CashBoxId",
        to = "super::cash_boxes::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    CashBoxes,
    #[sea_orm(
        belongs_to = "super::cost_centers::Entity",
        from = "Column::CostCenterId",
        to = "super::cost_centers::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    CostCenters,
}

impl Related<super::bank_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankAccounts.def()
    }
}

impl Related<super::cash_boxes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashBoxes.def()
    }
}

impl Related<super::cost_centers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CostCenters.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        let (bank_account_id, cash_box_id) = match entry.owner {
            OwnerRef::BankAccount { account_id } => (Some(account_id.to_string()), None),
            OwnerRef::CashBox { cash_box_id } => (None, Some(cash_box_id.to_string())),
        };
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            date: ActiveValue::Set(entry.date),
            created_at: ActiveValue::Set(entry.created_at),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(entry.amount_minor),
            balance_minor: ActiveValue::Set(entry.balance_minor),
            description: ActiveValue::Set(entry.description.clone()),
            memo: ActiveValue::Set(entry.memo.clone()),
            cost_center_id: ActiveValue::Set(entry.cost_center_id.map(|id| id.to_string())),
            document_number: ActiveValue::Set(entry.document_number.clone()),
            bank_account_id: ActiveValue::Set(bank_account_id),
            cash_box_id: ActiveValue::Set(cash_box_id),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let owner = match (&model.bank_account_id, &model.cash_box_id) {
            (Some(raw), None) => OwnerRef::BankAccount {
                account_id: parse_uuid(raw, "bank account")?,
            },
            (None, Some(raw)) => OwnerRef::CashBox {
                cash_box_id: parse_uuid(raw, "cash box")?,
            },
            _ => {
                return Err(EngineError::Consistency(format!(
                    "ledger entry {} has no single owner",
                    model.id
                )));
            }
        };

        Ok(Self {
            id: parse_uuid(&model.id, "ledger entry")?,
            owner,
            date: model.date,
            created_at: model.created_at,
            kind: EntryKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            balance_minor: model.balance_minor,
            description: model.description,
            memo: model.memo,
            cost_center_id: model
                .cost_center_id
                .as_deref()
                .map(|raw| parse_uuid(raw, "cost center"))
                .transpose()?,
            document_number: model.document_number,
        })
    }
}
