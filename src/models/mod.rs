mod budget;
mod month;
mod transaction;

pub(crate) use budget::{Budget, BudgetChanges, DEFAULT_CATEGORY};
pub(crate) use month::{DateRange, Month};
pub(crate) use transaction::{Transaction, DATE_FORMAT};
