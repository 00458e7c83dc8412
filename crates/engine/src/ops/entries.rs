use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::SimpleExpr,
};

use crate::{
    CreateEntryCmd, EngineError, LedgerEntry, MoneyCents, OwnerRef, ResultEngine, audit_log,
    ledger_entries, util::validate_positive_amount,
};

use super::{Engine, normalize_optional_text, normalize_required_text, with_tx};

/// Filter expression selecting one owner's entries.
pub(super) fn owner_filter(owner: OwnerRef) -> SimpleExpr {
    match owner {
        OwnerRef::BankAccount { account_id } => {
            ledger_entries::Column::BankAccountId.eq(account_id.to_string())
        }
        OwnerRef::CashBox { cash_box_id } => {
            ledger_entries::Column::CashBoxId.eq(cash_box_id.to_string())
        }
    }
}

impl Engine {
    /// Records a credit/debit movement against a bank account or cash box.
    ///
    /// The whole operation is one transaction: entry insert, owner balance
    /// aggregate update, and audit movement commit together or not at all.
    ///
    /// The stored running balance is derived from the *currently most
    /// recent* entry (date desc, created_at desc), not from the entry's true
    /// chronological predecessor. Backdated inserts therefore leave the
    /// stored chain locally inconsistent until [`Engine::reconcile_owner`]
    /// runs; the balance aggregate is unaffected since it is a plain signed
    /// sum.
    pub async fn create_entry(&self, cmd: CreateEntryCmd) -> ResultEngine<LedgerEntry> {
        let owner = OwnerRef::resolve(cmd.bank_account_id, cmd.cash_box_id)?;
        validate_positive_amount(cmd.amount_minor)?;
        let description = normalize_required_text(&cmd.description, "description")?;
        let memo = normalize_optional_text(cmd.memo.as_deref());
        let document_number = normalize_optional_text(cmd.document_number.as_deref());

        with_tx!(self, |db_tx| {
            let aggregate_minor = self.require_owner_balance(&db_tx, owner).await?;
            if let Some(cost_center_id) = cmd.cost_center_id {
                self.require_cost_center(&db_tx, cost_center_id).await?;
            }

            let last = ledger_entries::Entity::find()
                .filter(owner_filter(owner))
                .order_by_desc(ledger_entries::Column::Date)
                .order_by_desc(ledger_entries::Column::CreatedAt)
                .one(&db_tx)
                .await?;
            let prior_balance_minor = last.map_or(0, |model| model.balance_minor);

            let signed_minor = cmd.kind.signed(cmd.amount_minor);
            let balance_minor = MoneyCents::new(prior_balance_minor)
                .checked_add(MoneyCents::new(signed_minor))
                .ok_or_else(|| EngineError::Consistency("running balance overflow".to_string()))?
                .cents();
            let entry = LedgerEntry {
                id: Uuid::new_v4(),
                owner,
                date: cmd.date,
                created_at: Utc::now(),
                kind: cmd.kind,
                amount_minor: cmd.amount_minor,
                balance_minor,
                description,
                memo,
                cost_center_id: cmd.cost_center_id,
                document_number,
            };

            ledger_entries::ActiveModel::from(&entry).insert(&db_tx).await?;
            let aggregate_minor = MoneyCents::new(aggregate_minor)
                .checked_add(MoneyCents::new(entry.signed_amount_minor()))
                .ok_or_else(|| EngineError::Consistency("balance aggregate overflow".to_string()))?
                .cents();
            self.set_owner_balance(&db_tx, owner, aggregate_minor).await?;
            audit_log::movement(owner, entry.id, entry.kind, entry.amount_minor, entry.created_at)
                .insert(&db_tx)
                .await?;

            Ok(entry)
        })
    }

    /// Returns a single ledger entry by id.
    pub async fn ledger_entry(&self, entry_id: Uuid) -> ResultEngine<LedgerEntry> {
        let model = ledger_entries::Entity::find_by_id(entry_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("ledger entry".to_string()))?;
        LedgerEntry::try_from(model)
    }

    pub(super) async fn require_entry(
        &self,
        db: &DatabaseTransaction,
        entry_id: Uuid,
    ) -> ResultEngine<LedgerEntry> {
        let model = ledger_entries::Entity::find_by_id(entry_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("ledger entry".to_string()))?;
        LedgerEntry::try_from(model)
    }
}
