//! Data-access contracts consumed by the budget aggregator and the budget
//! CRUD operations. `db::Database` implements both over SQLite.

use crate::error::Result;
use crate::models::{Budget, BudgetChanges, DateRange, Transaction};

/// Query for [`TransactionStore::find_transactions`]. Empty filter matches all.
#[derive(Debug, Clone, Default)]
pub(crate) struct TransactionFilter {
    pub(crate) category: Option<String>,
    pub(crate) range: Option<DateRange>,
}

impl TransactionFilter {
    pub(crate) fn in_range(range: DateRange) -> Self {
        Self {
            category: None,
            range: Some(range),
        }
    }

    pub(crate) fn for_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            range: None,
        }
    }

    pub(crate) fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct BudgetFilter {
    pub(crate) category: Option<String>,
}

pub(crate) trait TransactionStore {
    fn find_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>>;
    fn insert_transaction(&self, txn: &Transaction) -> Result<i64>;
    /// Inserts all rows not already present by import hash; returns how many were new.
    fn insert_transactions_batch(&mut self, txns: &[Transaction]) -> Result<usize>;
    fn delete_transaction(&self, id: i64) -> Result<()>;
}

pub(crate) trait BudgetStore {
    fn find_budgets(&self, filter: &BudgetFilter) -> Result<Vec<Budget>>;
    fn find_budget_by_id(&self, id: i64) -> Result<Option<Budget>>;
    /// When several budgets share a category the most recently created wins.
    fn find_budget_by_category(&self, category: &str) -> Result<Option<Budget>>;
    fn create_budget(&self, budget: &Budget) -> Result<Budget>;
    /// Returns `None` when no budget has this id.
    fn update_budget(&self, id: i64, changes: &BudgetChanges) -> Result<Option<Budget>>;
    /// Returns `false` when no budget has this id.
    fn delete_budget(&self, id: i64) -> Result<bool>;
}
