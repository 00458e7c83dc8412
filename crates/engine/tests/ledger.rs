use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{CreateEntryCmd, Engine, EngineError, EntryKind, EntryListFilter, OwnerRef};
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
    Utc.with_ymd_and_hms(2026, 1, d, 0, 0, 0).unwrap()
}

async fn count_rows(db: &DatabaseConnection, table: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "n").unwrap()
}

#[tokio::test]
async fn in_order_entries_chain_their_balances() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine.new_bank_account("Operating").await.unwrap();

    let credit = engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Credit, 10_000, "invoice paid", day(1))
                .bank_account(account_id),
        )
        .await
        .unwrap();
    assert_eq!(credit.balance_minor, 10_000);

    let debit = engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Debit, 4_000, "rent", day(2))
                .bank_account(account_id),
        )
        .await
        .unwrap();
    assert_eq!(debit.balance_minor, 6_000);

    let account = engine.bank_account(account_id).await.unwrap();
    assert_eq!(account.balance_minor, 6_000);
}

#[tokio::test]
async fn backdated_insert_chains_off_the_latest_entry() {
    let (engine, _db) = engine_with_db().await;
    let cash_box_id = engine.new_cash_box("Register").await.unwrap();

    engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Credit, 1_000, "opening float", day(1))
                .cash_box(cash_box_id),
        )
        .await
        .unwrap();
    engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Credit, 2_000, "sales", day(3))
                .cash_box(cash_box_id),
        )
        .await
        .unwrap();

    // Backdated to day 2: the stored balance derives from the day-3 entry,
    // not from the true chronological predecessor.
    let backdated = engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Debit, 500, "supplies", day(2))
                .cash_box(cash_box_id),
        )
        .await
        .unwrap();
    assert_eq!(backdated.balance_minor, 2_500);

    // The aggregate is a plain signed sum and stays correct regardless.
    let cash_box = engine.cash_box(cash_box_id).await.unwrap();
    assert_eq!(cash_box.balance_minor, 2_500);
}

#[tokio::test]
async fn reconcile_repairs_backdated_drift_and_is_idempotent() {
    let (engine, _db) = engine_with_db().await;
    let cash_box_id = engine.new_cash_box("Register").await.unwrap();
    let owner = OwnerRef::CashBox { cash_box_id };

    let first = engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Credit, 1_000, "opening float", day(1))
                .cash_box(cash_box_id),
        )
        .await
        .unwrap();
    let latest = engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Credit, 2_000, "sales", day(3))
                .cash_box(cash_box_id),
        )
        .await
        .unwrap();
    let backdated = engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Debit, 500, "supplies", day(2))
                .cash_box(cash_box_id),
        )
        .await
        .unwrap();

    // Chronological replay: 1000, then 500, then 2500. The backdated entry
    // and the day-3 entry both carry stale balances.
    let report = engine.reconcile_owner(owner).await.unwrap();
    assert_eq!(report.corrected, 2);
    assert_eq!(report.uncorrectable, 0);

    assert_eq!(
        engine.ledger_entry(first.id).await.unwrap().balance_minor,
        1_000
    );
    assert_eq!(
        engine.ledger_entry(backdated.id).await.unwrap().balance_minor,
        500
    );
    assert_eq!(
        engine.ledger_entry(latest.id).await.unwrap().balance_minor,
        2_500
    );

    // A second pass has nothing left to repair.
    let report = engine.reconcile_owner(owner).await.unwrap();
    assert_eq!(report.corrected, 0);

    // Reconciliation never touches the aggregate.
    let cash_box = engine.cash_box(cash_box_id).await.unwrap();
    assert_eq!(cash_box.balance_minor, 2_500);
}

#[tokio::test]
async fn reconcile_all_covers_every_owner() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine.new_bank_account("Operating").await.unwrap();
    let cash_box_id = engine.new_cash_box("Register").await.unwrap();

    engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Credit, 5_000, "invoice paid", day(2))
                .bank_account(account_id),
        )
        .await
        .unwrap();
    engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Credit, 3_000, "sales", day(3))
                .cash_box(cash_box_id),
        )
        .await
        .unwrap();
    engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Debit, 1_000, "refund", day(1))
                .bank_account(account_id),
        )
        .await
        .unwrap();

    let batch = engine.reconcile_all().await.unwrap();
    assert_eq!(batch.owners.len(), 2);
    assert_eq!(batch.corrected_total(), 2);
    assert_eq!(batch.orphaned, 0);
}

#[tokio::test]
async fn reconcile_skips_malformed_entries_without_breaking_the_chain() {
    let (engine, db) = engine_with_db().await;
    let cash_box_id = engine.new_cash_box("Register").await.unwrap();
    let owner = OwnerRef::CashBox { cash_box_id };

    engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Credit, 1_000, "opening float", day(1))
                .cash_box(cash_box_id),
        )
        .await
        .unwrap();
    let latest = engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Credit, 2_000, "sales", day(3))
                .cash_box(cash_box_id),
        )
        .await
        .unwrap();

    // A row with a kind no release ever wrote, wedged between the two.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO ledger_entries \
         (id, date, created_at, kind, amount_minor, balance_minor, description, cash_box_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        vec![
            Uuid::new_v4().to_string().into(),
            day(2).into(),
            day(2).into(),
            "bogus".into(),
            500i64.into(),
            0i64.into(),
            "corrupt import".into(),
            cash_box_id.to_string().into(),
        ],
    ))
    .await
    .unwrap();

    let report = engine.reconcile_owner(owner).await.unwrap();
    assert_eq!(report.uncorrectable, 1);
    // The bogus row contributes nothing to the chain, so the good entries
    // are already in order and stay untouched.
    assert_eq!(report.corrected, 0);
    assert_eq!(
        engine.ledger_entry(latest.id).await.unwrap().balance_minor,
        3_000
    );
}

#[tokio::test]
async fn reconcile_all_surfaces_ownerless_entries() {
    let (engine, db) = engine_with_db().await;
    let account_id = engine.new_bank_account("Operating").await.unwrap();
    engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Credit, 1_000, "invoice paid", day(1))
                .bank_account(account_id),
        )
        .await
        .unwrap();

    // A stray row with neither owner column set.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO ledger_entries \
         (id, date, created_at, kind, amount_minor, balance_minor, description) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        vec![
            Uuid::new_v4().to_string().into(),
            day(2).into(),
            day(2).into(),
            "credit".into(),
            500i64.into(),
            500i64.into(),
            "stray row".into(),
        ],
    ))
    .await
    .unwrap();

    let batch = engine.reconcile_all().await.unwrap();
    assert_eq!(batch.orphaned, 1);
    assert_eq!(batch.owners.len(), 1);
    assert_eq!(batch.corrected_total(), 0);
}

#[tokio::test]
async fn create_entry_rejects_bad_input() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine.new_bank_account("Operating").await.unwrap();
    let cash_box_id = engine.new_cash_box("Register").await.unwrap();

    // Both owners set.
    let err = engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Credit, 100, "x", day(1))
                .bank_account(account_id)
                .cash_box(cash_box_id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // No owner set.
    let err = engine
        .create_entry(CreateEntryCmd::new(EntryKind::Credit, 100, "x", day(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Non-positive amounts.
    for amount in [0, -100] {
        let err = engine
            .create_entry(
                CreateEntryCmd::new(EntryKind::Credit, amount, "x", day(1))
                    .bank_account(account_id),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    // Blank description.
    let err = engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Credit, 100, "   ", day(1))
                .bank_account(account_id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Unknown owner.
    let err = engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Credit, 100, "x", day(1))
                .bank_account(Uuid::new_v4()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    // Unknown cost center.
    let err = engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Credit, 100, "x", day(1))
                .bank_account(account_id)
                .cost_center(Uuid::new_v4()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn failed_create_writes_nothing() {
    let (engine, db) = engine_with_db().await;
    let account_id = engine.new_bank_account("Operating").await.unwrap();

    engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Credit, 100, "x", day(1))
                .bank_account(account_id)
                .cost_center(Uuid::new_v4()),
        )
        .await
        .unwrap_err();

    assert_eq!(count_rows(&db, "ledger_entries").await, 0);
    assert_eq!(count_rows(&db, "audit_movements").await, 0);
    let account = engine.bank_account(account_id).await.unwrap();
    assert_eq!(account.balance_minor, 0);
}

#[tokio::test]
async fn every_entry_leaves_an_audit_movement() {
    let (engine, db) = engine_with_db().await;
    let account_id = engine.new_bank_account("Operating").await.unwrap();

    for (kind, amount) in [(EntryKind::Credit, 10_000), (EntryKind::Debit, 4_000)] {
        engine
            .create_entry(
                CreateEntryCmd::new(kind, amount, "movement", day(1)).bank_account(account_id),
            )
            .await
            .unwrap();
    }

    assert_eq!(count_rows(&db, "audit_movements").await, 2);
}

#[tokio::test]
async fn list_returns_newest_first_with_running_balances() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine.new_bank_account("Operating").await.unwrap();
    let owner = OwnerRef::BankAccount { account_id };

    engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Credit, 10_000, "invoice paid", day(1))
                .bank_account(account_id),
        )
        .await
        .unwrap();
    engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Debit, 4_000, "rent", day(2))
                .bank_account(account_id),
        )
        .await
        .unwrap();

    let page = engine
        .list_entries(owner, &EntryListFilter::default(), 1, 10)
        .await
        .unwrap();

    assert_eq!(page.total_count, 2);
    assert_eq!(page.total_pages, 1);
    assert!(!page.has_next_page);
    assert!(!page.has_previous_page);
    assert_eq!(page.items.len(), 2);

    assert_eq!(page.items[0].entry.kind, EntryKind::Debit);
    assert_eq!(page.items[0].running_balance_minor, 6_000);
    assert_eq!(page.items[1].entry.kind, EntryKind::Credit);
    assert_eq!(page.items[1].running_balance_minor, 10_000);
}

#[tokio::test]
async fn list_filters_narrow_items_but_not_balances() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine.new_bank_account("Operating").await.unwrap();
    let owner = OwnerRef::BankAccount { account_id };

    engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Credit, 10_000, "invoice paid", day(1))
                .bank_account(account_id),
        )
        .await
        .unwrap();
    engine
        .create_entry(
            CreateEntryCmd::new(EntryKind::Debit, 4_000, "rent", day(2))
                .bank_account(account_id)
                .memo("march office rent"),
        )
        .await
        .unwrap();

    let filter = EntryListFilter {
        kind: Some(EntryKind::Debit),
        ..Default::default()
    };
    let page = engine.list_entries(owner, &filter, 1, 10).await.unwrap();
    assert_eq!(page.total_count, 1);
    // The running balance still reflects the full history, filtered or not.
    assert_eq!(page.items[0].running_balance_minor, 6_000);

    // Free text matches the memo as well as the description.
    let filter = EntryListFilter {
        text: Some("office".to_string()),
        ..Default::default()
    };
    let page = engine.list_entries(owner, &filter, 1, 10).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].entry.kind, EntryKind::Debit);
}

#[tokio::test]
async fn free_text_treats_like_wildcards_as_literals() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine.new_bank_account("Operating").await.unwrap();
    let owner = OwnerRef::BankAccount { account_id };

    let entries = [
        ("fee a_c", 1),
        ("fee abc", 2),
        ("50% deposit", 3),
        ("500 deposit", 4),
    ];
    for (description, d) in entries {
        engine
            .create_entry(
                CreateEntryCmd::new(EntryKind::Debit, 1_000, description, day(d))
                    .bank_account(account_id),
            )
            .await
            .unwrap();
    }

    // `_` must not match an arbitrary character.
    let filter = EntryListFilter {
        text: Some("a_c".to_string()),
        ..Default::default()
    };
    let page = engine.list_entries(owner, &filter, 1, 10).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].entry.description, "fee a_c");

    // `%` must not match an arbitrary run.
    let filter = EntryListFilter {
        text: Some("50%".to_string()),
        ..Default::default()
    };
    let page = engine.list_entries(owner, &filter, 1, 10).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].entry.description, "50% deposit");
}

#[tokio::test]
async fn list_paginates_and_validates_page_numbers() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine.new_bank_account("Operating").await.unwrap();
    let owner = OwnerRef::BankAccount { account_id };

    for d in 1..=5 {
        engine
            .create_entry(
                CreateEntryCmd::new(EntryKind::Credit, 1_000, "sales", day(d))
                    .bank_account(account_id),
            )
            .await
            .unwrap();
    }

    let page = engine
        .list_entries(owner, &EntryListFilter::default(), 2, 2)
        .await
        .unwrap();
    assert_eq!(page.total_count, 5);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 2);
    assert!(page.has_next_page);
    assert!(page.has_previous_page);
    // Newest first: page 2 of size 2 holds days 3 and 2.
    assert_eq!(page.items[0].entry.date, day(3));
    assert_eq!(page.items[1].entry.date, day(2));

    let err = engine
        .list_entries(owner, &EntryListFilter::default(), 0, 2)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .list_entries(owner, &EntryListFilter::default(), 1, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}
