mod schema;

use anyhow::Context;
use chrono::NaiveDateTime;
use rusqlite::types::{ToSql, Type};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::error::Result;
use crate::models::{Budget, BudgetChanges, Transaction, DATE_FORMAT};
use crate::store::{BudgetFilter, BudgetStore, TransactionFilter, TransactionStore};

const TRANSACTION_COLUMNS: &str = "id, category, amount, date, description, import_hash, created_at";
const BUDGET_COLUMNS: &str = "id, category, amount, created_at";

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> anyhow::Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(version = schema::CURRENT_VERSION, "created database schema");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(from = current, to = schema::CURRENT_VERSION, "migrated database");
        }

        Ok(())
    }
}

// ── Row mapping ───────────────────────────────────────────────

fn decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn date_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: Some(row.get(0)?),
        category: row.get(1)?,
        amount: decimal_at(row, 2)?,
        date: date_at(row, 3)?,
        description: row.get(4)?,
        import_hash: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn budget_from_row(row: &Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: Some(row.get(0)?),
        category: row.get(1)?,
        amount: decimal_at(row, 2)?,
        created_at: row.get(3)?,
    })
}

// ── Transactions ──────────────────────────────────────────────

impl TransactionStore for Database {
    fn find_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE 1=1");
        let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(ref category) = filter.category {
            sql.push_str(&format!(" AND category = ?{}", param_values.len() + 1));
            param_values.push(Box::new(category.clone()));
        }
        if let Some(range) = filter.range {
            sql.push_str(&format!(
                " AND date >= ?{} AND date <= ?{}",
                param_values.len() + 1,
                param_values.len() + 2
            ));
            param_values.push(Box::new(range.start.format(DATE_FORMAT).to_string()));
            param_values.push(Box::new(range.end.format(DATE_FORMAT).to_string()));
        }

        sql.push_str(" ORDER BY date DESC, id DESC");

        let params_ref: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), transaction_from_row)?;
        let txns = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        tracing::debug!(
            category = ?filter.category,
            ranged = filter.range.is_some(),
            count = txns.len(),
            "queried transactions"
        );
        Ok(txns)
    }

    fn insert_transaction(&self, txn: &Transaction) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO transactions (category, amount, date, description, import_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                txn.category,
                txn.amount.to_string(),
                txn.date_key(),
                txn.description,
                txn.import_hash,
                txn.created_at,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, category = %txn.category, amount = %txn.amount, "inserted transaction");
        Ok(id)
    }

    fn insert_transactions_batch(&mut self, txns: &[Transaction]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut count = 0;
        for txn in txns {
            // Skip duplicates based on import_hash (only when hash is non-empty)
            if !txn.import_hash.is_empty() {
                let exists: bool = tx.query_row(
                    "SELECT EXISTS(SELECT 1 FROM transactions WHERE import_hash = ?1)",
                    params![txn.import_hash],
                    |row| row.get(0),
                )?;
                if exists {
                    continue;
                }
            }
            tx.execute(
                "INSERT INTO transactions (category, amount, date, description, import_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    txn.category,
                    txn.amount.to_string(),
                    txn.date_key(),
                    txn.description,
                    txn.import_hash,
                    txn.created_at,
                ],
            )?;
            count += 1;
        }
        tx.commit()?;
        tracing::info!(inserted = count, skipped = txns.len() - count, "imported transactions");
        Ok(count)
    }

    fn delete_transaction(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
        tracing::info!(id, "deleted transaction");
        Ok(())
    }
}

// ── Budgets ───────────────────────────────────────────────────

impl BudgetStore for Database {
    fn find_budgets(&self, filter: &BudgetFilter) -> Result<Vec<Budget>> {
        let budgets = if let Some(ref category) = filter.category {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {BUDGET_COLUMNS} FROM budgets WHERE category = ?1 ORDER BY id"
            ))?;
            let rows = stmt.query_map(params![category], budget_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        } else {
            let mut stmt = self
                .conn
                .prepare(&format!("SELECT {BUDGET_COLUMNS} FROM budgets ORDER BY id"))?;
            let rows = stmt.query_map([], budget_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        tracing::debug!(category = ?filter.category, count = budgets.len(), "queried budgets");
        Ok(budgets)
    }

    fn find_budget_by_id(&self, id: i64) -> Result<Option<Budget>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE id = ?1"),
                params![id],
                budget_from_row,
            )
            .optional()?)
    }

    fn find_budget_by_category(&self, category: &str) -> Result<Option<Budget>> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {BUDGET_COLUMNS} FROM budgets WHERE category = ?1 ORDER BY id DESC LIMIT 1"
                ),
                params![category],
                budget_from_row,
            )
            .optional()?)
    }

    fn create_budget(&self, budget: &Budget) -> Result<Budget> {
        self.conn.execute(
            "INSERT INTO budgets (category, amount, created_at) VALUES (?1, ?2, ?3)",
            params![budget.category, budget.amount.to_string(), budget.created_at],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, category = %budget.category, amount = %budget.amount, "created budget");
        Ok(Budget {
            id: Some(id),
            ..budget.clone()
        })
    }

    fn update_budget(&self, id: i64, changes: &BudgetChanges) -> Result<Option<Budget>> {
        let Some(mut budget) = self.find_budget_by_id(id)? else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(budget));
        }
        changes.apply(&mut budget);
        self.conn.execute(
            "UPDATE budgets SET category = ?1, amount = ?2 WHERE id = ?3",
            params![budget.category, budget.amount.to_string(), id],
        )?;
        tracing::info!(id, category = %budget.category, amount = %budget.amount, "updated budget");
        Ok(Some(budget))
    }

    fn delete_budget(&self, id: i64) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM budgets WHERE id = ?1", params![id])?;
        tracing::info!(id, removed, "deleted budget");
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests;
