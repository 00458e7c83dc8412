use sea_orm::{
    ActiveValue, Condition, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    EntryKind, OwnerRef, ResultEngine, bank_accounts, cash_boxes, ledger_entries, util::parse_uuid,
};

use super::{Engine, entries::owner_filter, with_tx};

/// Outcome of a balance repair pass over one owner's ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Entries whose stored balance was rewritten.
    pub corrected: u64,
    /// Malformed entries that were skipped (logged, left untouched).
    pub uncorrectable: u64,
}

/// Outcome of a repair pass over every bank account and cash box.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReconcileReport {
    pub owners: Vec<(OwnerRef, ReconcileReport)>,
    /// Entries referencing no owner at all; they belong to no chain and are
    /// only surfaced, never rewritten.
    pub orphaned: u64,
}

impl BatchReconcileReport {
    pub fn corrected_total(&self) -> u64 {
        self.owners.iter().map(|(_, report)| report.corrected).sum()
    }
}

impl Engine {
    /// Recomputes the stored running-balance chain for one owner.
    ///
    /// Entries are replayed in authoritative order (date asc, created_at
    /// asc) starting from zero; any stored balance that disagrees with the
    /// replayed value is overwritten. The owner's balance aggregate is left
    /// alone: it is maintained transactionally on insert and does not
    /// depend on entry order.
    ///
    /// Idempotent: a second pass with no intervening writes corrects
    /// nothing.
    pub async fn reconcile_owner(&self, owner: OwnerRef) -> ResultEngine<ReconcileReport> {
        with_tx!(self, |db_tx| {
            self.require_owner(&db_tx, owner).await?;

            let models: Vec<ledger_entries::Model> = ledger_entries::Entity::find()
                .filter(owner_filter(owner))
                .order_by_asc(ledger_entries::Column::Date)
                .order_by_asc(ledger_entries::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            let mut report = ReconcileReport::default();
            let mut running_minor = 0i64;
            for model in models {
                let kind = match EntryKind::try_from(model.kind.as_str()) {
                    Ok(kind) => kind,
                    Err(err) => {
                        tracing::warn!(entry_id = %model.id, %err, "skipping malformed entry");
                        report.uncorrectable += 1;
                        continue;
                    }
                };

                running_minor += kind.signed(model.amount_minor);
                if model.balance_minor != running_minor {
                    let patch = ledger_entries::ActiveModel {
                        id: ActiveValue::Set(model.id.clone()),
                        balance_minor: ActiveValue::Set(running_minor),
                        ..Default::default()
                    };
                    patch.update(&db_tx).await?;
                    report.corrected += 1;
                }
            }

            if report.corrected > 0 {
                tracing::info!(
                    owner = ?owner,
                    corrected = report.corrected,
                    "repaired running-balance drift"
                );
            }
            Ok(report)
        })
    }

    /// Runs [`Engine::reconcile_owner`] for every bank account and cash box.
    ///
    /// Each owner gets its own transaction, so a long batch never holds a
    /// lock across the whole ledger. Orphaned entries (no owner columns
    /// set) are counted and logged but do not abort the batch; only
    /// infrastructure failures do.
    pub async fn reconcile_all(&self) -> ResultEngine<BatchReconcileReport> {
        let mut batch = BatchReconcileReport::default();

        let account_models: Vec<bank_accounts::Model> = bank_accounts::Entity::find()
            .all(&self.database)
            .await?;
        for model in account_models {
            let owner = OwnerRef::BankAccount {
                account_id: parse_uuid(&model.id, "bank account")?,
            };
            let report = self.reconcile_owner(owner).await?;
            batch.owners.push((owner, report));
        }

        let cash_box_models: Vec<cash_boxes::Model> =
            cash_boxes::Entity::find().all(&self.database).await?;
        for model in cash_box_models {
            let owner = OwnerRef::CashBox {
                cash_box_id: parse_uuid(&model.id, "cash box")?,
            };
            let report = self.reconcile_owner(owner).await?;
            batch.owners.push((owner, report));
        }

        batch.orphaned = ledger_entries::Entity::find()
            .filter(
                Condition::all()
                    .add(ledger_entries::Column::BankAccountId.is_null())
                    .add(ledger_entries::Column::CashBoxId.is_null()),
            )
            .count(&self.database)
            .await?;
        if batch.orphaned > 0 {
            tracing::warn!(
                orphaned = batch.orphaned,
                "ledger entries without an owner cannot be reconciled"
            );
        }

        Ok(batch)
    }
}
