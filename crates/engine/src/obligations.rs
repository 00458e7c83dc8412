//! Payable and receivable obligations.
//!
//! Obligations live outside the ledger until a ledger entry is linked to
//! them by document number. Payables settle against debits, receivables
//! against credits; both kinds share one table with a `kind` column, the
//! polarity rule is enforced by the linker.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ledger_entries::EntryKind, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationKind {
    Payable,
    Receivable,
}

impl ObligationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Payable => "payable",
            Self::Receivable => "receivable",
        }
    }

    /// The entry kind allowed to settle this obligation kind.
    pub fn settling_entry_kind(self) -> EntryKind {
        match self {
            Self::Payable => EntryKind::Debit,
            Self::Receivable => EntryKind::Credit,
        }
    }

    /// The obligation kind an entry of the given kind may settle.
    pub fn for_entry_kind(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Debit => Self::Payable,
            EntryKind::Credit => Self::Receivable,
        }
    }
}

impl TryFrom<&str> for ObligationKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "payable" => Ok(Self::Payable),
            "receivable" => Ok(Self::Receivable),
            other => Err(EngineError::Validation(format!(
                "invalid obligation kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationStatus {
    Pending,
    Paid,
}

impl ObligationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

impl TryFrom<&str> for ObligationStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            other => Err(EngineError::Validation(format!(
                "invalid obligation status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obligation {
    pub id: Uuid,
    pub kind: ObligationKind,
    pub document_number: String,
    pub description: String,
    pub amount_minor: i64,
    pub status: ObligationStatus,
    pub settled_amount_minor: i64,
    pub settlement_date: Option<DateTime<Utc>>,
    pub observation: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Obligation {
    pub fn new(
        kind: ObligationKind,
        document_number: String,
        description: String,
        amount_minor: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            document_number,
            description,
            amount_minor,
            status: ObligationStatus::Pending,
            settled_amount_minor: 0,
            settlement_date: None,
            observation: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "obligations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub document_number: String,
    pub description: String,
    pub amount_minor: i64,
    pub status: String,
    pub settled_amount_minor: i64,
    pub settlement_date: Option<DateTimeUtc>,
    pub observation: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Obligation> for ActiveModel {
    fn from(obligation: &Obligation) -> Self {
        Self {
            id: ActiveValue::Set(obligation.id.to_string()),
            kind: ActiveValue::Set(obligation.kind.as_str().to_string()),
            document_number: ActiveValue::Set(obligation.document_number.clone()),
            description: ActiveValue::Set(obligation.description.clone()),
            amount_minor: ActiveValue::Set(obligation.amount_minor),
            status: ActiveValue::Set(obligation.status.as_str().to_string()),
            settled_amount_minor: ActiveValue::Set(obligation.settled_amount_minor),
            settlement_date: ActiveValue::Set(obligation.settlement_date),
            observation: ActiveValue::Set(obligation.observation.clone()),
            created_at: ActiveValue::Set(obligation.created_at),
        }
    }
}

impl TryFrom<Model> for Obligation {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "obligation")?,
            kind: ObligationKind::try_from(model.kind.as_str())?,
            document_number: model.document_number,
            description: model.description,
            amount_minor: model.amount_minor,
            status: ObligationStatus::try_from(model.status.as_str())?,
            settled_amount_minor: model.settled_amount_minor,
            settlement_date: model.settlement_date,
            observation: model.observation,
            created_at: model.created_at,
        })
    }
}
