use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    CreateEntryCmd, Engine, EngineError, EntryKind, LedgerEntry, ObligationKind, ObligationStatus,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, d, 0, 0, 0).unwrap()
}

async fn debit_entry(engine: &Engine, amount_minor: i64) -> LedgerEntry {
    let account_id = engine.new_bank_account("Operating").await.unwrap();
    engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Debit, amount_minor, "supplier payment", day(5))
                .bank_account(account_id),
        )
        .await
        .unwrap()
}

async fn credit_entry(engine: &Engine, amount_minor: i64) -> LedgerEntry {
    let account_id = engine.new_bank_account("Operating").await.unwrap();
    engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Credit, amount_minor, "customer payment", day(5))
                .bank_account(account_id),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn link_settles_a_pending_payable() {
    let (engine, _db) = engine_with_db().await;

    let obligation_id = engine
        .new_obligation(ObligationKind::Payable, "NF-100", "office chairs", 4_000)
        .await
        .unwrap();
    let entry = debit_entry(&engine, 4_000).await;

    let linked = engine.link_obligation(entry.id, "NF-100").await.unwrap();
    assert_eq!(linked.document_number.as_deref(), Some("NF-100"));

    let obligation = engine.obligation(obligation_id).await.unwrap();
    assert_eq!(obligation.status, ObligationStatus::Paid);
    assert_eq!(obligation.settled_amount_minor, 4_000);
    assert_eq!(obligation.settlement_date, Some(entry.date));
}

#[tokio::test]
async fn receivables_settle_against_credits() {
    let (engine, _db) = engine_with_db().await;

    let obligation_id = engine
        .new_obligation(ObligationKind::Receivable, "INV-7", "consulting", 9_000)
        .await
        .unwrap();
    let entry = credit_entry(&engine, 9_000).await;

    engine.link_obligation(entry.id, "INV-7").await.unwrap();

    let obligation = engine.obligation(obligation_id).await.unwrap();
    assert_eq!(obligation.status, ObligationStatus::Paid);
}

#[tokio::test]
async fn unlink_reopens_the_obligation() {
    let (engine, _db) = engine_with_db().await;

    let obligation_id = engine
        .new_obligation(ObligationKind::Payable, "NF-100", "office chairs", 4_000)
        .await
        .unwrap();
    let entry = debit_entry(&engine, 4_000).await;
    engine.link_obligation(entry.id, "NF-100").await.unwrap();

    let unlinked = engine.unlink_obligation(entry.id).await.unwrap();
    assert_eq!(unlinked.document_number, None);

    let obligation = engine.obligation(obligation_id).await.unwrap();
    assert_eq!(obligation.status, ObligationStatus::Pending);
    assert_eq!(obligation.settled_amount_minor, 0);
    assert_eq!(obligation.settlement_date, None);
}

#[tokio::test]
async fn polarity_mismatch_is_rejected_without_side_effects() {
    let (engine, _db) = engine_with_db().await;

    let obligation_id = engine
        .new_obligation(ObligationKind::Payable, "NF-100", "office chairs", 4_000)
        .await
        .unwrap();
    let entry = credit_entry(&engine, 4_000).await;

    let err = engine.link_obligation(entry.id, "NF-100").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidOperation(_)));

    let obligation = engine.obligation(obligation_id).await.unwrap();
    assert_eq!(obligation.status, ObligationStatus::Pending);
    let entry = engine.ledger_entry(entry.id).await.unwrap();
    assert_eq!(entry.document_number, None);
}

#[tokio::test]
async fn link_with_no_pending_obligation_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let entry = debit_entry(&engine, 4_000).await;

    let err = engine.link_obligation(entry.id, "NF-404").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn an_entry_links_to_at_most_one_document() {
    let (engine, _db) = engine_with_db().await;

    engine
        .new_obligation(ObligationKind::Payable, "NF-1", "first", 4_000)
        .await
        .unwrap();
    engine
        .new_obligation(ObligationKind::Payable, "NF-2", "second", 4_000)
        .await
        .unwrap();
    let entry = debit_entry(&engine, 4_000).await;

    engine.link_obligation(entry.id, "NF-1").await.unwrap();
    let err = engine.link_obligation(entry.id, "NF-2").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidOperation(_)));
}

#[tokio::test]
async fn unlink_without_a_document_is_an_error() {
    let (engine, _db) = engine_with_db().await;
    let entry = debit_entry(&engine, 4_000).await;

    let err = engine.unlink_obligation(entry.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidOperation(_)));
}

#[tokio::test]
async fn unlink_survives_a_deleted_obligation() {
    let (engine, db) = engine_with_db().await;

    let obligation_id = engine
        .new_obligation(ObligationKind::Payable, "NF-100", "office chairs", 4_000)
        .await
        .unwrap();
    let entry = debit_entry(&engine, 4_000).await;
    engine.link_obligation(entry.id, "NF-100").await.unwrap();

    // The AP side removed the obligation out from under the ledger.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "DELETE FROM obligations WHERE id = ?",
        vec![obligation_id.to_string().into()],
    ))
    .await
    .unwrap();

    let unlinked = engine.unlink_obligation(entry.id).await.unwrap();
    assert_eq!(unlinked.document_number, None);
}

#[tokio::test]
async fn unknown_entries_and_obligations_are_not_found() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .link_obligation(Uuid::new_v4(), "NF-1")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let err = engine.unlink_obligation(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let err = engine.obligation(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn obligation_creation_validates_input() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .new_obligation(ObligationKind::Payable, "  ", "desc", 100)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .new_obligation(ObligationKind::Payable, "NF-1", "desc", 0)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}
