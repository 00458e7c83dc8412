use sea_orm::{ActiveValue, DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{EngineError, OwnerRef, ResultEngine, bank_accounts, cash_boxes, cost_centers};

use super::Engine;

/// Generates `_exists` and `require_` lookup methods for a directory entity.
macro_rules! impl_directory_lookup {
    ($exists_fn:ident, $require_fn:ident, $entity:path, $err_msg:literal) => {
        async fn $exists_fn(
            &self,
            db: &DatabaseTransaction,
            target_id: Uuid,
        ) -> ResultEngine<bool> {
            <$entity>::find_by_id(target_id.to_string())
                .one(db)
                .await
                .map(|model| model.is_some())
                .map_err(Into::into)
        }

        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            target_id: Uuid,
        ) -> ResultEngine<()> {
            if !self.$exists_fn(db, target_id).await? {
                return Err(EngineError::NotFound($err_msg.to_string()));
            }
            Ok(())
        }
    };
}

impl Engine {
    impl_directory_lookup!(
        bank_account_exists,
        require_bank_account,
        bank_accounts::Entity,
        "bank account"
    );

    impl_directory_lookup!(
        cash_box_exists,
        require_cash_box,
        cash_boxes::Entity,
        "cash box"
    );

    impl_directory_lookup!(
        cost_center_exists,
        require_cost_center,
        cost_centers::Entity,
        "cost center"
    );

    /// Fails with `NotFound` unless the referenced owner exists.
    pub(super) async fn require_owner(
        &self,
        db: &DatabaseTransaction,
        owner: OwnerRef,
    ) -> ResultEngine<()> {
        match owner {
            OwnerRef::BankAccount { account_id } => self.require_bank_account(db, account_id).await,
            OwnerRef::CashBox { cash_box_id } => self.require_cash_box(db, cash_box_id).await,
        }
    }

    /// Loads the owner's balance aggregate, failing with `NotFound` when the
    /// owner does not exist. Runs inside the caller's transaction so the
    /// value read cannot be lost to a concurrent insert.
    pub(super) async fn require_owner_balance(
        &self,
        db: &DatabaseTransaction,
        owner: OwnerRef,
    ) -> ResultEngine<i64> {
        match owner {
            OwnerRef::BankAccount { account_id } => {
                let model = bank_accounts::Entity::find_by_id(account_id.to_string())
                    .one(db)
                    .await?
                    .ok_or_else(|| EngineError::NotFound("bank account".to_string()))?;
                Ok(model.balance_minor)
            }
            OwnerRef::CashBox { cash_box_id } => {
                let model = cash_boxes::Entity::find_by_id(cash_box_id.to_string())
                    .one(db)
                    .await?
                    .ok_or_else(|| EngineError::NotFound("cash box".to_string()))?;
                Ok(model.balance_minor)
            }
        }
    }

    /// Persists a new value for the owner's balance aggregate.
    pub(super) async fn set_owner_balance(
        &self,
        db: &DatabaseTransaction,
        owner: OwnerRef,
        balance_minor: i64,
    ) -> ResultEngine<()> {
        match owner {
            OwnerRef::BankAccount { account_id } => {
                let model = bank_accounts::ActiveModel {
                    id: ActiveValue::Set(account_id.to_string()),
                    balance_minor: ActiveValue::Set(balance_minor),
                    ..Default::default()
                };
                model.update(db).await?;
            }
            OwnerRef::CashBox { cash_box_id } => {
                let model = cash_boxes::ActiveModel {
                    id: ActiveValue::Set(cash_box_id.to_string()),
                    balance_minor: ActiveValue::Set(balance_minor),
                    ..Default::default()
                };
                model.update(db).await?;
            }
        }
        Ok(())
    }
}
