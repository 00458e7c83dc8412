use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use sea_orm::{
    Condition, PaginatorTrait, QueryFilter, QueryOrder, Select, TransactionTrait, prelude::*,
    sea_query::{Expr, LikeExpr},
};

use crate::{
    EngineError, EntryKind, LedgerEntry, OwnerRef, ResultEngine, ledger_entries,
};

use super::{Engine, entries::owner_filter, with_tx};

/// Optional criteria narrowing a ledger page. All fields compose with AND;
/// `text` alone matches either the description or the memo.
#[derive(Clone, Debug, Default)]
pub struct EntryListFilter {
    pub kind: Option<EntryKind>,
    pub text: Option<String>,
    pub cost_center_id: Option<Uuid>,
    /// Inclusive lower bound on the entry date.
    pub date_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the entry date.
    pub date_to: Option<DateTime<Utc>>,
    pub amount_min_minor: Option<i64>,
    pub amount_max_minor: Option<i64>,
}

/// One page of results plus the metadata needed to render a pager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub total_pages: u64,
    pub page: u64,
    pub page_size: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// A ledger entry paired with its replayed running balance.
///
/// The stored `balance_minor` on the entry may be stale after backdated
/// inserts; `running_balance_minor` is always recomputed from the full
/// chronological history and is the value to show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryWithBalance {
    pub entry: LedgerEntry,
    pub running_balance_minor: i64,
}

trait ApplyEntryFilters: Sized {
    fn apply_filters(self, filter: &EntryListFilter) -> Self;
}

impl ApplyEntryFilters for Select<ledger_entries::Entity> {
    fn apply_filters(mut self, filter: &EntryListFilter) -> Self {
        if let Some(kind) = filter.kind {
            self = self.filter(ledger_entries::Column::Kind.eq(kind.as_str()));
        }
        if let Some(text) = filter.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            // `%` and `_` in the search text must match literally.
            let escaped = text
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            let pattern = format!("%{escaped}%");
            self = self.filter(
                Condition::any()
                    .add(
                        Expr::col(ledger_entries::Column::Description)
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::col(ledger_entries::Column::Memo)
                            .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            );
        }
        if let Some(cost_center_id) = filter.cost_center_id {
            self = self.filter(
                ledger_entries::Column::CostCenterId.eq(cost_center_id.to_string()),
            );
        }
        if let Some(date_from) = filter.date_from {
            self = self.filter(ledger_entries::Column::Date.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            self = self.filter(ledger_entries::Column::Date.lt(date_to));
        }
        if let Some(amount_min_minor) = filter.amount_min_minor {
            self = self.filter(ledger_entries::Column::AmountMinor.gte(amount_min_minor));
        }
        if let Some(amount_max_minor) = filter.amount_max_minor {
            self = self.filter(ledger_entries::Column::AmountMinor.lte(amount_max_minor));
        }
        self
    }
}

impl Engine {
    /// Lists one owner's entries in reverse chronological order (date desc,
    /// created_at desc), paginated. `page` is 1-based.
    ///
    /// Filters narrow the page but never the running balance: each returned
    /// entry carries the balance replayed over the owner's *entire* history,
    /// so a filtered view still shows true positions.
    pub async fn list_entries(
        &self,
        owner: OwnerRef,
        filter: &EntryListFilter,
        page: u64,
        page_size: u64,
    ) -> ResultEngine<Page<EntryWithBalance>> {
        if page < 1 {
            return Err(EngineError::Validation("page must be >= 1".to_string()));
        }
        if page_size < 1 {
            return Err(EngineError::Validation(
                "page size must be >= 1".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_owner(&db_tx, owner).await?;

            let balances = self.replay_balances(&db_tx, owner).await?;

            let paginator = ledger_entries::Entity::find()
                .filter(owner_filter(owner))
                .apply_filters(filter)
                .order_by_desc(ledger_entries::Column::Date)
                .order_by_desc(ledger_entries::Column::CreatedAt)
                .paginate(&db_tx, page_size);

            let totals = paginator.num_items_and_pages().await?;
            let models = paginator.fetch_page(page - 1).await?;

            let mut items = Vec::with_capacity(models.len());
            for model in models {
                let running_balance_minor = *balances.get(&model.id).ok_or_else(|| {
                    EngineError::Consistency(format!(
                        "ledger entry {} missing from replayed history",
                        model.id
                    ))
                })?;
                items.push(EntryWithBalance {
                    entry: LedgerEntry::try_from(model)?,
                    running_balance_minor,
                });
            }

            Ok(Page {
                items,
                total_count: totals.number_of_items,
                total_pages: totals.number_of_pages,
                page,
                page_size,
                has_next_page: page < totals.number_of_pages,
                has_previous_page: page > 1 && totals.number_of_pages > 0,
            })
        })
    }

    /// Replays the owner's full history in authoritative order and returns
    /// the running balance keyed by entry id.
    async fn replay_balances(
        &self,
        db: &sea_orm::DatabaseTransaction,
        owner: OwnerRef,
    ) -> ResultEngine<HashMap<String, i64>> {
        let models: Vec<ledger_entries::Model> = ledger_entries::Entity::find()
            .filter(owner_filter(owner))
            .order_by_asc(ledger_entries::Column::Date)
            .order_by_asc(ledger_entries::Column::CreatedAt)
            .all(db)
            .await?;

        let mut balances = HashMap::with_capacity(models.len());
        let mut running_minor = 0i64;
        for model in models {
            let kind = EntryKind::try_from(model.kind.as_str())?;
            running_minor += kind.signed(model.amount_minor);
            balances.insert(model.id, running_minor);
        }
        Ok(balances)
    }
}
