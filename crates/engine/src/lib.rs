//! Cash-flow ledger engine.
//!
//! Records chronological credit/debit movements against bank accounts and
//! cash boxes, maintains a stored running balance per entry plus a balance
//! aggregate per owner, links entries to payable/receivable obligations, and
//! repairs running-balance drift caused by backdated inserts.
//!
//! All operations hang off [`Engine`], which wraps a SeaORM
//! [`DatabaseConnection`](sea_orm::DatabaseConnection); every mutation runs
//! inside a single database transaction.

pub use bank_accounts::BankAccount;
pub use cash_boxes::CashBox;
pub use commands::CreateEntryCmd;
pub use cost_centers::CostCenter;
pub use error::EngineError;
pub use ledger_entries::{EntryKind, LedgerEntry};
pub use money::MoneyCents;
pub use obligations::{Obligation, ObligationKind, ObligationStatus};
pub use ops::{
    BatchReconcileReport, Engine, EngineBuilder, EntryListFilter, EntryWithBalance, Page,
    ReconcileReport,
};
pub use owner::{OwnerKind, OwnerRef};

mod audit_log;
mod bank_accounts;
mod cash_boxes;
mod commands;
mod cost_centers;
mod error;
mod ledger_entries;
mod money;
mod obligations;
mod ops;
mod owner;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
