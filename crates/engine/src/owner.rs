//! Ledger owners.
//!
//! Every ledger entry belongs to exactly one owner: a bank account or a
//! physical cash box. [`OwnerRef`] is the strongly typed reference used
//! throughout the engine; the pair of optional ids accepted at the API
//! boundary is collapsed into it by [`OwnerRef::resolve`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    BankAccount,
    CashBox,
}

impl OwnerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BankAccount => "bank_account",
            Self::CashBox => "cash_box",
        }
    }
}

impl TryFrom<&str> for OwnerKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "bank_account" => Ok(Self::BankAccount),
            "cash_box" => Ok(Self::CashBox),
            other => Err(EngineError::Validation(format!(
                "invalid owner kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "owner", rename_all = "snake_case")]
pub enum OwnerRef {
    BankAccount { account_id: Uuid },
    CashBox { cash_box_id: Uuid },
}

impl OwnerRef {
    /// Collapses the `(bank_account_id, cash_box_id)` pair accepted at the
    /// API boundary into a single owner reference.
    ///
    /// Exactly one id must be given; both or neither is a validation error.
    pub fn resolve(
        bank_account_id: Option<Uuid>,
        cash_box_id: Option<Uuid>,
    ) -> Result<Self, EngineError> {
        match (bank_account_id, cash_box_id) {
            (Some(account_id), None) => Ok(Self::BankAccount { account_id }),
            (None, Some(cash_box_id)) => Ok(Self::CashBox { cash_box_id }),
            (Some(_), Some(_)) => Err(EngineError::Validation(
                "entry must target a bank account or a cash box, not both".to_string(),
            )),
            (None, None) => Err(EngineError::Validation(
                "entry must target a bank account or a cash box".to_string(),
            )),
        }
    }

    pub fn kind(self) -> OwnerKind {
        match self {
            Self::BankAccount { .. } => OwnerKind::BankAccount,
            Self::CashBox { .. } => OwnerKind::CashBox,
        }
    }

    pub fn id(self) -> Uuid {
        match self {
            Self::BankAccount { account_id } => account_id,
            Self::CashBox { cash_box_id } => cash_box_id,
        }
    }
}
