use rust_decimal::Decimal;

pub(crate) const DEFAULT_CATEGORY: &str = "Default";

/// A spending ceiling for one category. Budgets are not scoped to a month;
/// the same amount applies to every month.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Budget {
    pub(crate) id: Option<i64>,
    pub(crate) category: String,
    pub(crate) amount: Decimal,
    pub(crate) created_at: String,
}

impl Budget {
    pub(crate) fn new(category: String, amount: Decimal) -> Self {
        Self {
            id: None,
            category,
            amount,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Partial update for a stored budget. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct BudgetChanges {
    pub(crate) amount: Option<Decimal>,
    pub(crate) category: Option<String>,
}

impl BudgetChanges {
    pub(crate) fn is_empty(&self) -> bool {
        self.amount.is_none() && self.category.is_none()
    }

    pub(crate) fn apply(&self, budget: &mut Budget) {
        if let Some(amount) = self.amount {
            budget.amount = amount;
        }
        if let Some(ref category) = self.category {
            budget.category = category.clone();
        }
    }
}
