//! Budget-vs-spending aggregation.

use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{BudgetError, Result};
use crate::models::{Budget, Month, Transaction};
use crate::store::{BudgetFilter, BudgetStore, TransactionFilter, TransactionStore};

/// One budget joined with the month's spending in its category.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategoryStatus {
    pub(crate) budget_id: Option<i64>,
    pub(crate) category: String,
    pub(crate) budget_amount: Decimal,
    /// Absolute value of the category's net amount for the month.
    pub(crate) total_spent: Decimal,
    pub(crate) remainder: Decimal,
    pub(crate) is_over: bool,
}

impl CategoryStatus {
    fn new(budget: &Budget, net: Decimal) -> Self {
        let total_spent = net.abs();
        Self {
            budget_id: budget.id,
            category: budget.category.clone(),
            budget_amount: budget.amount,
            total_spent,
            remainder: budget.amount - total_spent,
            is_over: total_spent > budget.amount,
        }
    }

    /// Fraction of the budget used, clamped to 0..=1 for progress bars.
    pub(crate) fn used_ratio(&self) -> Decimal {
        if self.budget_amount <= Decimal::ZERO {
            return if self.total_spent > Decimal::ZERO {
                Decimal::ONE
            } else {
                Decimal::ZERO
            };
        }
        (self.total_spent / self.budget_amount).min(Decimal::ONE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Totals {
    pub(crate) budget: Decimal,
    /// Sum of expenses only, so always zero or negative.
    pub(crate) spent: Decimal,
    pub(crate) remainder: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MonthlyStatus {
    pub(crate) month: Month,
    /// One entry per stored budget, in store order.
    pub(crate) budgets: Vec<CategoryStatus>,
    pub(crate) totals: Totals,
    /// Categories with transactions this month but no budget.
    pub(crate) uncovered: Vec<String>,
}

impl MonthlyStatus {
    /// Budgets by category (case-insensitive), uncovered categories lexicographically.
    pub(crate) fn sorted_for_display(mut self) -> Self {
        self.budgets.sort_by_cached_key(|s| s.category.to_lowercase());
        self.uncovered.sort();
        self
    }

    pub(crate) fn over_budget_count(&self) -> usize {
        self.budgets.iter().filter(|s| s.is_over).count()
    }
}

/// Result of checking a single category against its budget over all time.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategoryLookup {
    pub(crate) budget: Budget,
    pub(crate) is_over: bool,
    pub(crate) difference: Decimal,
}

pub(crate) fn monthly_status<T, B>(transactions: &T, budgets: &B, month: Month) -> Result<MonthlyStatus>
where
    T: TransactionStore + ?Sized,
    B: BudgetStore + ?Sized,
{
    let txns = transactions.find_transactions(&TransactionFilter::in_range(month.range()))?;
    let all_budgets = budgets.find_budgets(&BudgetFilter::default())?;
    let status = summarize(month, &txns, &all_budgets);
    tracing::debug!(
        month = %month,
        transactions = txns.len(),
        budgets = status.budgets.len(),
        uncovered = status.uncovered.len(),
        "computed monthly status"
    );
    Ok(status)
}

/// Joins a month's transactions against every budget. Pure; `monthly_status`
/// does the fetching.
pub(crate) fn summarize(month: Month, txns: &[Transaction], budgets: &[Budget]) -> MonthlyStatus {
    let mut by_category: BTreeMap<&str, Decimal> = BTreeMap::new();
    for txn in txns {
        *by_category.entry(txn.category.as_str()).or_default() += txn.amount;
    }

    let statuses: Vec<CategoryStatus> = budgets
        .iter()
        .map(|b| {
            let net = by_category
                .get(b.category.as_str())
                .copied()
                .unwrap_or_default();
            CategoryStatus::new(b, net)
        })
        .collect();

    let budget_total: Decimal = budgets.iter().map(|b| b.amount).sum();
    let spent: Decimal = txns
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| t.amount)
        .sum();

    let budgeted: BTreeSet<&str> = budgets.iter().map(|b| b.category.as_str()).collect();
    let uncovered = by_category
        .keys()
        .filter(|c| !budgeted.contains(*c))
        .map(|c| c.to_string())
        .collect();

    MonthlyStatus {
        month,
        budgets: statuses,
        totals: Totals {
            budget: budget_total,
            spent,
            remainder: budget_total + spent,
        },
        uncovered,
    }
}

/// Compares a category's all-time signed total against its budget.
pub(crate) fn category_status<T, B>(
    transactions: &T,
    budgets: &B,
    category: &str,
) -> Result<CategoryLookup>
where
    T: TransactionStore + ?Sized,
    B: BudgetStore + ?Sized,
{
    if category.trim().is_empty() {
        return Err(BudgetError::invalid("category is required"));
    }

    let txns = transactions.find_transactions(&TransactionFilter::for_category(category))?;
    let Some(budget) = budgets.find_budget_by_category(category)? else {
        tracing::warn!(category, "no budget for category");
        return Err(BudgetError::not_found(format!("no budget for category '{category}'")));
    };

    let total: Decimal = txns.iter().map(|t| t.amount).sum();
    Ok(CategoryLookup {
        is_over: total > budget.amount,
        difference: (total - budget.amount).abs(),
        budget,
    })
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
