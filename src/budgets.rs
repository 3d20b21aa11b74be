//! Budget record operations: create with defaults, partial update, delete, list.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{BudgetError, Result};
use crate::models::{Budget, BudgetChanges, DEFAULT_CATEGORY};
use crate::store::{BudgetFilter, BudgetStore};

/// Raw update request as it arrives from the command line or a form.
/// `amount` may be a display string such as `"$1,234.56"`.
#[derive(Debug, Clone, Default)]
pub(crate) struct BudgetUpdate {
    pub(crate) id: i64,
    pub(crate) amount: Option<String>,
    pub(crate) category: Option<String>,
}

/// Parse a currency string by stripping `$` and thousands separators.
pub(crate) fn parse_currency(s: &str) -> Result<Decimal> {
    let cleaned = s.replace(['$', ','], "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(BudgetError::invalid(format!("'{s}' is not an amount")));
    }
    Decimal::from_str(cleaned).map_err(|_| BudgetError::invalid(format!("'{s}' is not an amount")))
}

pub(crate) fn list_budgets<B>(store: &B, category: Option<&str>) -> Result<Vec<Budget>>
where
    B: BudgetStore + ?Sized,
{
    store.find_budgets(&BudgetFilter {
        category: category.map(str::to_string),
    })
}

/// Empty or missing fields fall back to amount 0 and category "Default".
pub(crate) fn create_budget<B>(store: &B, amount: Option<&str>, category: Option<&str>) -> Result<Budget>
where
    B: BudgetStore + ?Sized,
{
    let amount = match amount.map(str::trim).filter(|a| !a.is_empty()) {
        Some(raw) => parse_currency(raw)?,
        None => Decimal::ZERO,
    };
    let category = category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CATEGORY);

    store.create_budget(&Budget::new(category.to_string(), amount))
}

pub(crate) fn update_budget<B>(store: &B, update: &BudgetUpdate) -> Result<Budget>
where
    B: BudgetStore + ?Sized,
{
    let amount = match update.amount.as_deref().filter(|a| !a.trim().is_empty()) {
        Some(raw) => Some(parse_currency(raw)?),
        None => None,
    };
    let category = match update.category.as_deref().filter(|c| !c.is_empty()) {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(BudgetError::invalid("category cannot be blank"));
            }
            Some(trimmed.to_string())
        }
        None => None,
    };

    let changes = BudgetChanges { amount, category };
    store.update_budget(update.id, &changes)?.ok_or_else(|| {
        tracing::warn!(id = update.id, "update for unknown budget");
        BudgetError::not_found(format!("budget {}", update.id))
    })
}

pub(crate) fn delete_budget<B>(store: &B, id: i64) -> Result<()>
where
    B: BudgetStore + ?Sized,
{
    if store.delete_budget(id)? {
        Ok(())
    } else {
        tracing::warn!(id, "delete for unknown budget");
        Err(BudgetError::not_found(format!("budget {id}")))
    }
}

#[cfg(test)]
#[path = "budgets_tests.rs"]
mod tests;
