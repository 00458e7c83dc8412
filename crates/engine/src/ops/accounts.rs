use uuid::Uuid;

use sea_orm::prelude::*;

use crate::{
    BankAccount, CashBox, CostCenter, EngineError, ResultEngine, bank_accounts, cash_boxes,
    cost_centers,
};

use super::{Engine, normalize_required_text};

impl Engine {
    /// Registers a new bank account with a zero balance aggregate.
    pub async fn new_bank_account(&self, name: &str) -> ResultEngine<Uuid> {
        let name = normalize_required_text(name, "bank account name")?;
        let account = BankAccount::new(name);
        let account_id = account.id;
        bank_accounts::ActiveModel::from(&account)
            .insert(&self.database)
            .await?;
        Ok(account_id)
    }

    /// Registers a new cash box with a zero balance aggregate.
    pub async fn new_cash_box(&self, name: &str) -> ResultEngine<Uuid> {
        let name = normalize_required_text(name, "cash box name")?;
        let cash_box = CashBox::new(name);
        let cash_box_id = cash_box.id;
        cash_boxes::ActiveModel::from(&cash_box)
            .insert(&self.database)
            .await?;
        Ok(cash_box_id)
    }

    /// Registers a new cost center.
    pub async fn new_cost_center(&self, name: &str) -> ResultEngine<Uuid> {
        let name = normalize_required_text(name, "cost center name")?;
        let cost_center = CostCenter::new(name);
        let cost_center_id = cost_center.id;
        cost_centers::ActiveModel::from(&cost_center)
            .insert(&self.database)
            .await?;
        Ok(cost_center_id)
    }

    /// Returns a bank account with its current balance aggregate.
    pub async fn bank_account(&self, account_id: Uuid) -> ResultEngine<BankAccount> {
        let model = bank_accounts::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("bank account".to_string()))?;
        BankAccount::try_from(model)
    }

    /// Returns a cash box with its current balance aggregate.
    pub async fn cash_box(&self, cash_box_id: Uuid) -> ResultEngine<CashBox> {
        let model = cash_boxes::Entity::find_by_id(cash_box_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("cash box".to_string()))?;
        CashBox::try_from(model)
    }
}
