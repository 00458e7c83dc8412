//! Write-only audit trail.
//!
//! Every ledger entry insert appends one movement row here, tagged with the
//! owner kind (bank transaction vs cash transaction). These rows are never
//! consulted by balance computation or the repair job.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{OwnerRef, ledger_entries::EntryKind};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_kind: String,
    pub owner_id: String,
    pub entry_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub recorded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ledger_entries::Entity",
        from = "Column::EntryId",
        to = "super::ledger_entries::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    LedgerEntries,
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Builds the movement row recorded alongside an entry insert.
pub(crate) fn movement(
    owner: OwnerRef,
    entry_id: Uuid,
    kind: EntryKind,
    amount_minor: i64,
    recorded_at: DateTime<Utc>,
) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        owner_kind: ActiveValue::Set(owner.kind().as_str().to_string()),
        owner_id: ActiveValue::Set(owner.id().to_string()),
        entry_id: ActiveValue::Set(entry_id.to_string()),
        kind: ActiveValue::Set(kind.as_str().to_string()),
        amount_minor: ActiveValue::Set(amount_minor),
        recorded_at: ActiveValue::Set(recorded_at),
    }
}
