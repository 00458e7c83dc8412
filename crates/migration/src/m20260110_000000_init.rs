//! Initial schema migration - creates all tables from scratch.
//!
//! Complete schema for Registro:
//!
//! - `bank_accounts`: bank-held balance owners
//! - `cash_boxes`: physical cash balance owners
//! - `cost_centers`: classification directory for entries
//! - `ledger_entries`: dated credit/debit movements with a stored running balance
//! - `obligations`: payable/receivable documents entries can settle
//! - `audit_movements`: append-only record of every posted movement

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum BankAccounts {
    Table,
    Id,
    Name,
    BalanceMinor,
}

#[derive(Iden)]
enum CashBoxes {
    Table,
    Id,
    Name,
    BalanceMinor,
}

#[derive(Iden)]
enum CostCenters {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum LedgerEntries {
    Table,
    Id,
    Date,
    CreatedAt,
    Kind,
    AmountMinor,
    BalanceMinor,
    Description,
    Memo,
    CostCenterId,
    DocumentNumber,
    BankAccountId,
    CashBoxId,
}

#[derive(Iden)]
enum Obligations {
    Table,
    Id,
    Kind,
    DocumentNumber,
    Description,
    AmountMinor,
    Status,
    SettledAmountMinor,
    SettlementDate,
    Observation,
    CreatedAt,
}

#[derive(Iden)]
enum AuditMovements {
    Table,
    Id,
    OwnerKind,
    OwnerId,
    EntryId,
    Kind,
    AmountMinor,
    RecordedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Bank accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BankAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BankAccounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BankAccounts::Name).string().not_null())
                    .col(
                        ColumnDef::new(BankAccounts::BalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Cash boxes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CashBoxes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashBoxes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CashBoxes::Name).string().not_null())
                    .col(
                        ColumnDef::new(CashBoxes::BalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Cost centers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CostCenters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CostCenters::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CostCenters::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Obligations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Obligations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Obligations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Obligations::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Obligations::DocumentNumber)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Obligations::Description).string().not_null())
                    .col(
                        ColumnDef::new(Obligations::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Obligations::Status).string().not_null())
                    .col(
                        ColumnDef::new(Obligations::SettledAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Obligations::SettlementDate).timestamp())
                    .col(ColumnDef::new(Obligations::Observation).string())
                    .col(
                        ColumnDef::new(Obligations::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-obligations-document_number-status")
                    .table(Obligations::Table)
                    .col(Obligations::DocumentNumber)
                    .col(Obligations::Status)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Ledger entries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerEntries::Date).timestamp().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::Kind).string().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::BalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::Memo).string())
                    .col(ColumnDef::new(LedgerEntries::CostCenterId).string())
                    .col(ColumnDef::new(LedgerEntries::DocumentNumber).string())
                    .col(ColumnDef::new(LedgerEntries::BankAccountId).string())
                    .col(ColumnDef::new(LedgerEntries::CashBoxId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ledger_entries-bank_account_id")
                            .from(LedgerEntries::Table, LedgerEntries::BankAccountId)
                            .to(BankAccounts::Table, BankAccounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ledger_entries-cash_box_id")
                            .from(LedgerEntries::Table, LedgerEntries::CashBoxId)
                            .to(CashBoxes::Table, CashBoxes::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ledger_entries-cost_center_id")
                            .from(LedgerEntries::Table, LedgerEntries::CostCenterId)
                            .to(CostCenters::Table, CostCenters::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-bank_account_id-date")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::BankAccountId)
                    .col(LedgerEntries::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-cash_box_id-date")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::CashBoxId)
                    .col(LedgerEntries::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-document_number")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::DocumentNumber)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Audit movements
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AuditMovements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditMovements::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuditMovements::OwnerKind).string().not_null())
                    .col(ColumnDef::new(AuditMovements::OwnerId).string().not_null())
                    .col(ColumnDef::new(AuditMovements::EntryId).string().not_null())
                    .col(ColumnDef::new(AuditMovements::Kind).string().not_null())
                    .col(
                        ColumnDef::new(AuditMovements::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuditMovements::RecordedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-audit_movements-owner")
                    .table(AuditMovements::Table)
                    .col(AuditMovements::OwnerKind)
                    .col(AuditMovements::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(AuditMovements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Obligations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CostCenters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CashBoxes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BankAccounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
