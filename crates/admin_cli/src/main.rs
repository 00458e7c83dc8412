use std::error::Error;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use engine::{
    CreateEntryCmd, Engine, EntryKind, EntryListFilter, MoneyCents, ObligationKind, OwnerRef,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "registro_admin")]
#[command(about = "Admin utilities for Registro (accounts, entries, obligations)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./registro.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Account(Account),
    Cashbox(Cashbox),
    CostCenter(CostCenter),
    Obligation(Obligation),
    Entry(Entry),
    /// Settle a pending obligation with an existing ledger entry.
    Link(LinkArgs),
    /// Detach a ledger entry from its obligation and reopen it.
    Unlink(UnlinkArgs),
    /// Page through one owner's ledger, newest first.
    List(ListArgs),
    /// Repair stored running balances after backdated inserts.
    Reconcile(ReconcileArgs),
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Create(NameArgs),
    Show(IdArgs),
}

#[derive(Args, Debug)]
struct Cashbox {
    #[command(subcommand)]
    command: CashboxCommand,
}

#[derive(Subcommand, Debug)]
enum CashboxCommand {
    Create(NameArgs),
    Show(IdArgs),
}

#[derive(Args, Debug)]
struct CostCenter {
    #[command(subcommand)]
    command: CostCenterCommand,
}

#[derive(Subcommand, Debug)]
enum CostCenterCommand {
    Create(NameArgs),
}

#[derive(Args, Debug)]
struct NameArgs {
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct IdArgs {
    #[arg(long)]
    id: Uuid,
}

#[derive(Args, Debug)]
struct Obligation {
    #[command(subcommand)]
    command: ObligationCommand,
}

#[derive(Subcommand, Debug)]
enum ObligationCommand {
    Create(ObligationCreateArgs),
}

#[derive(Args, Debug)]
struct ObligationCreateArgs {
    /// `payable` or `receivable`.
    #[arg(long, value_parser = parse_obligation_kind)]
    kind: ObligationKind,
    #[arg(long)]
    document_number: String,
    #[arg(long)]
    description: String,
    /// Decimal amount, e.g. `123.45`.
    #[arg(long, value_parser = parse_money)]
    amount: MoneyCents,
}

#[derive(Args, Debug)]
struct Entry {
    #[command(subcommand)]
    command: EntryCommand,
}

#[derive(Subcommand, Debug)]
enum EntryCommand {
    Create(EntryCreateArgs),
}

#[derive(Args, Debug)]
struct EntryCreateArgs {
    #[command(flatten)]
    owner: OwnerArgs,
    /// Calendar date of the movement, `YYYY-MM-DD`.
    #[arg(long, value_parser = parse_date)]
    date: DateTime<Utc>,
    /// `credit` or `debit`.
    #[arg(long, value_parser = parse_entry_kind)]
    kind: EntryKind,
    /// Decimal amount, e.g. `123.45`.
    #[arg(long, value_parser = parse_money)]
    amount: MoneyCents,
    #[arg(long)]
    description: String,
    #[arg(long)]
    memo: Option<String>,
    #[arg(long)]
    cost_center: Option<Uuid>,
}

#[derive(Args, Debug)]
struct OwnerArgs {
    #[arg(long, conflicts_with = "cash_box")]
    bank_account: Option<Uuid>,
    #[arg(long)]
    cash_box: Option<Uuid>,
}

impl OwnerArgs {
    fn resolve(&self) -> Result<OwnerRef, Box<dyn Error + Send + Sync>> {
        Ok(OwnerRef::resolve(self.bank_account, self.cash_box)?)
    }
}

#[derive(Args, Debug)]
struct LinkArgs {
    #[arg(long)]
    entry: Uuid,
    #[arg(long)]
    document_number: String,
}

#[derive(Args, Debug)]
struct UnlinkArgs {
    #[arg(long)]
    entry: Uuid,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[command(flatten)]
    owner: OwnerArgs,
    #[arg(long, default_value_t = 1)]
    page: u64,
    #[arg(long, default_value_t = 20)]
    page_size: u64,
    /// Restrict to `credit` or `debit` entries.
    #[arg(long, value_parser = parse_entry_kind)]
    kind: Option<EntryKind>,
    /// Free-text match against description and memo.
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    cost_center: Option<Uuid>,
}

#[derive(Args, Debug)]
struct ReconcileArgs {
    #[arg(long, conflicts_with_all = ["cash_box", "all"])]
    bank_account: Option<Uuid>,
    #[arg(long, conflicts_with = "all")]
    cash_box: Option<Uuid>,
    /// Reconcile every bank account and cash box.
    #[arg(long)]
    all: bool,
}

fn parse_money(raw: &str) -> Result<MoneyCents, String> {
    raw.parse::<MoneyCents>().map_err(|err| err.to_string())
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|err| format!("invalid date (expected YYYY-MM-DD): {err}"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| "invalid date".to_string())?;
    Ok(midnight.and_utc())
}

fn parse_entry_kind(raw: &str) -> Result<EntryKind, String> {
    EntryKind::try_from(raw).map_err(|err| err.to_string())
}

fn parse_obligation_kind(raw: &str) -> Result<ObligationKind, String> {
    ObligationKind::try_from(raw).map_err(|err| err.to_string())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Account(Account {
            command: AccountCommand::Create(args),
        }) => {
            let account_id = engine.new_bank_account(&args.name).await?;
            println!("created bank account: {} ({account_id})", args.name);
        }
        Command::Account(Account {
            command: AccountCommand::Show(args),
        }) => {
            let account = engine.bank_account(args.id).await?;
            println!(
                "{} balance {}",
                account.name,
                MoneyCents::from(account.balance_minor)
            );
        }
        Command::Cashbox(Cashbox {
            command: CashboxCommand::Create(args),
        }) => {
            let cash_box_id = engine.new_cash_box(&args.name).await?;
            println!("created cash box: {} ({cash_box_id})", args.name);
        }
        Command::Cashbox(Cashbox {
            command: CashboxCommand::Show(args),
        }) => {
            let cash_box = engine.cash_box(args.id).await?;
            println!(
                "{} balance {}",
                cash_box.name,
                MoneyCents::from(cash_box.balance_minor)
            );
        }
        Command::CostCenter(CostCenter {
            command: CostCenterCommand::Create(args),
        }) => {
            let cost_center_id = engine.new_cost_center(&args.name).await?;
            println!("created cost center: {} ({cost_center_id})", args.name);
        }
        Command::Obligation(Obligation {
            command: ObligationCommand::Create(args),
        }) => {
            let obligation_id = engine
                .new_obligation(
                    args.kind,
                    &args.document_number,
                    &args.description,
                    args.amount.cents(),
                )
                .await?;
            println!(
                "created {} obligation {} ({obligation_id})",
                args.kind.as_str(),
                args.document_number
            );
        }
        Command::Entry(Entry {
            command: EntryCommand::Create(args),
        }) => {
            let mut cmd = CreateEntryCmd::new(
                args.kind,
                args.amount.cents(),
                &args.description,
                args.date,
            );
            if let Some(account_id) = args.owner.bank_account {
                cmd = cmd.bank_account(account_id);
            }
            if let Some(cash_box_id) = args.owner.cash_box {
                cmd = cmd.cash_box(cash_box_id);
            }
            if let Some(memo) = args.memo.as_deref() {
                cmd = cmd.memo(memo);
            }
            if let Some(cost_center_id) = args.cost_center {
                cmd = cmd.cost_center(cost_center_id);
            }

            let entry = engine.create_entry(cmd).await?;
            println!(
                "recorded {} of {} ({})",
                entry.kind.as_str(),
                MoneyCents::from(entry.amount_minor),
                entry.id
            );
        }
        Command::Link(args) => {
            let entry = engine
                .link_obligation(args.entry, &args.document_number)
                .await?;
            println!("linked entry {} to {}", entry.id, args.document_number);
        }
        Command::Unlink(args) => {
            let entry = engine.unlink_obligation(args.entry).await?;
            println!("unlinked entry {}", entry.id);
        }
        Command::List(args) => {
            let owner = args.owner.resolve()?;
            let filter = EntryListFilter {
                kind: args.kind,
                text: args.text.clone(),
                cost_center_id: args.cost_center,
                ..Default::default()
            };
            let page = engine
                .list_entries(owner, &filter, args.page, args.page_size)
                .await?;

            for item in &page.items {
                let entry = &item.entry;
                println!(
                    "{}  {:>6}  {:>12}  {:>12}  {}",
                    entry.date.format("%Y-%m-%d"),
                    entry.kind.as_str(),
                    MoneyCents::from(entry.amount_minor).to_string(),
                    MoneyCents::from(item.running_balance_minor).to_string(),
                    entry.description
                );
            }
            println!(
                "page {}/{} ({} entries)",
                page.page, page.total_pages, page.total_count
            );
        }
        Command::Reconcile(args) => {
            if args.all {
                let batch = engine.reconcile_all().await?;
                println!(
                    "reconciled {} owners, corrected {} entries",
                    batch.owners.len(),
                    batch.corrected_total()
                );
                if batch.orphaned > 0 {
                    eprintln!("warning: {} entries have no owner", batch.orphaned);
                }
            } else {
                let owner = OwnerRef::resolve(args.bank_account, args.cash_box)?;
                let report = engine.reconcile_owner(owner).await?;
                println!(
                    "corrected {} entries ({} uncorrectable)",
                    report.corrected, report.uncorrectable
                );
            }
        }
    }

    Ok(())
}
