use uuid::Uuid;

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, LedgerEntry, Obligation, ObligationKind, ObligationStatus, ResultEngine,
    ledger_entries, obligations, util::validate_positive_amount,
};

use super::{Engine, normalize_required_text, with_tx};

impl Engine {
    /// Registers a pending payable or receivable obligation.
    pub async fn new_obligation(
        &self,
        kind: ObligationKind,
        document_number: &str,
        description: &str,
        amount_minor: i64,
    ) -> ResultEngine<Uuid> {
        let document_number = normalize_required_text(document_number, "document number")?;
        let description = normalize_required_text(description, "description")?;
        validate_positive_amount(amount_minor)?;

        let obligation = Obligation::new(kind, document_number, description, amount_minor);
        let obligation_id = obligation.id;
        obligations::ActiveModel::from(&obligation)
            .insert(&self.database)
            .await?;
        Ok(obligation_id)
    }

    /// Returns an obligation by id.
    pub async fn obligation(&self, obligation_id: Uuid) -> ResultEngine<Obligation> {
        let model = obligations::Entity::find_by_id(obligation_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("obligation".to_string()))?;
        Obligation::try_from(model)
    }

    /// Binds a ledger entry to a pending obligation by document number and
    /// settles it.
    ///
    /// Polarity is enforced: a debit entry settles a payable, a credit entry
    /// settles a receivable. The entry's document number and the
    /// obligation's settlement fields change in one transaction.
    pub async fn link_obligation(
        &self,
        entry_id: Uuid,
        document_number: &str,
    ) -> ResultEngine<LedgerEntry> {
        let document_number = normalize_required_text(document_number, "document number")?;

        with_tx!(self, |db_tx| {
            let mut entry = self.require_entry(&db_tx, entry_id).await?;
            if entry.document_number.is_some() {
                return Err(EngineError::InvalidOperation(
                    "entry is already linked to a document".to_string(),
                ));
            }

            let obligation = self
                .find_pending_obligation(&db_tx, &document_number, entry.kind)
                .await?;

            let observation = format!(
                "settled automatically by ledger entry {} on {}",
                entry.id,
                entry.date.format("%Y-%m-%d")
            );
            let obligation_patch = obligations::ActiveModel {
                id: ActiveValue::Set(obligation.id.to_string()),
                status: ActiveValue::Set(ObligationStatus::Paid.as_str().to_string()),
                settlement_date: ActiveValue::Set(Some(entry.date)),
                settled_amount_minor: ActiveValue::Set(entry.amount_minor),
                observation: ActiveValue::Set(Some(observation)),
                ..Default::default()
            };
            obligation_patch.update(&db_tx).await?;

            let entry_patch = ledger_entries::ActiveModel {
                id: ActiveValue::Set(entry.id.to_string()),
                document_number: ActiveValue::Set(Some(document_number.clone())),
                ..Default::default()
            };
            entry_patch.update(&db_tx).await?;

            entry.document_number = Some(document_number);
            Ok(entry)
        })
    }

    /// Reverts the link between a ledger entry and its obligation.
    ///
    /// The entry's document number is always cleared; the obligation lookup
    /// is best-effort so an obligation removed by the AP/AR side cannot
    /// leave the entry stuck linked. Unlinking an entry with no document
    /// number is an error, not a no-op.
    pub async fn unlink_obligation(&self, entry_id: Uuid) -> ResultEngine<LedgerEntry> {
        with_tx!(self, |db_tx| {
            let mut entry = self.require_entry(&db_tx, entry_id).await?;
            let Some(document_number) = entry.document_number.clone() else {
                return Err(EngineError::InvalidOperation(
                    "entry has no linked document".to_string(),
                ));
            };

            let kind = ObligationKind::for_entry_kind(entry.kind);
            let found = obligations::Entity::find()
                .filter(obligations::Column::Kind.eq(kind.as_str()))
                .filter(obligations::Column::DocumentNumber.eq(document_number.clone()))
                .filter(obligations::Column::Status.eq(ObligationStatus::Paid.as_str()))
                .one(&db_tx)
                .await?;

            let entry_patch = ledger_entries::ActiveModel {
                id: ActiveValue::Set(entry.id.to_string()),
                document_number: ActiveValue::Set(None),
                ..Default::default()
            };
            entry_patch.update(&db_tx).await?;

            match found {
                Some(model) => {
                    let obligation = Obligation::try_from(model)?;
                    if obligation.settled_amount_minor != entry.amount_minor {
                        tracing::warn!(
                            obligation_id = %obligation.id,
                            entry_id = %entry.id,
                            settled_minor = obligation.settled_amount_minor,
                            entry_minor = entry.amount_minor,
                            "unlinking despite settled amount mismatch"
                        );
                    }
                    let observation = format!("reopened automatically by ledger entry {}", entry.id);
                    let obligation_patch = obligations::ActiveModel {
                        id: ActiveValue::Set(obligation.id.to_string()),
                        status: ActiveValue::Set(ObligationStatus::Pending.as_str().to_string()),
                        settlement_date: ActiveValue::Set(None),
                        settled_amount_minor: ActiveValue::Set(0),
                        observation: ActiveValue::Set(Some(observation)),
                        ..Default::default()
                    };
                    obligation_patch.update(&db_tx).await?;
                }
                None => {
                    tracing::warn!(
                        entry_id = %entry.id,
                        document_number = %document_number,
                        "no paid obligation matches the unlinked entry; entry side cleared anyway"
                    );
                }
            }

            entry.document_number = None;
            Ok(entry)
        })
    }

    /// Finds the pending obligation settled by the given document number.
    ///
    /// A pending obligation of the opposite polarity is a distinct failure
    /// (`InvalidOperation`) from no matching obligation at all (`NotFound`).
    async fn find_pending_obligation(
        &self,
        db: &DatabaseTransaction,
        document_number: &str,
        entry_kind: crate::EntryKind,
    ) -> ResultEngine<Obligation> {
        let pending: Vec<obligations::Model> = obligations::Entity::find()
            .filter(obligations::Column::DocumentNumber.eq(document_number.to_string()))
            .filter(obligations::Column::Status.eq(ObligationStatus::Pending.as_str()))
            .all(db)
            .await?;

        let mut mismatched: Option<ObligationKind> = None;
        for model in pending {
            let obligation = Obligation::try_from(model)?;
            if obligation.kind.settling_entry_kind() == entry_kind {
                return Ok(obligation);
            }
            mismatched.get_or_insert(obligation.kind);
        }

        match mismatched {
            Some(kind) => Err(EngineError::InvalidOperation(format!(
                "a {} entry cannot settle a {} obligation",
                entry_kind.as_str(),
                kind.as_str()
            ))),
            None => Err(EngineError::NotFound(format!(
                "pending obligation for document {document_number}"
            ))),
        }
    }
}
