use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// Storage format for transaction timestamps. Fixed width so that text
/// comparison in SQLite matches chronological order.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Transaction {
    pub(crate) id: Option<i64>,
    pub(crate) category: String,
    pub(crate) amount: Decimal,
    pub(crate) date: NaiveDateTime,
    pub(crate) description: String,
    pub(crate) import_hash: String,
    pub(crate) created_at: String,
}

impl Transaction {
    pub(crate) fn new(category: String, amount: Decimal, date: NaiveDateTime) -> Self {
        Self {
            id: None,
            category,
            amount,
            date,
            description: String::new(),
            import_hash: String::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub(crate) fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub(crate) fn is_expense(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    pub(crate) fn date_key(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}
