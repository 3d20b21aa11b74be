pub(crate) mod budgets;
pub(crate) mod transactions;
