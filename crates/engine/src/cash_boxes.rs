//! Physical cash boxes.
//!
//! Shaped like a bank account but kept as its own table: audit movements and
//! some back-office reports treat cash separately from banked money. The
//! `balance_minor` column is the balance aggregate, updated atomically on
//! every insert.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashBox {
    pub id: Uuid,
    pub name: String,
    pub balance_minor: i64,
}

impl CashBox {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            balance_minor: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_boxes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub balance_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ledger_entries::Entity")]
    LedgerEntries,
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CashBox> for ActiveModel {
    fn from(cash_box: &CashBox) -> Self {
        Self {
            id: ActiveValue::Set(cash_box.id.to_string()),
            name: ActiveValue::Set(cash_box.name.clone()),
            balance_minor: ActiveValue::Set(cash_box.balance_minor),
        }
    }
}

impl TryFrom<Model> for CashBox {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "cash box")?,
            name: model.name,
            balance_minor: model.balance_minor,
        })
    }
}
