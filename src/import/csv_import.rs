use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::models::Transaction;

/// Column layout of a transactions CSV. Defaults to `date,category,amount,description`.
#[derive(Debug, Clone)]
pub(crate) struct CsvProfile {
    pub(crate) date_column: usize,
    pub(crate) category_column: usize,
    pub(crate) amount_column: usize,
    pub(crate) description_column: Option<usize>,
    pub(crate) date_format: String,
    pub(crate) negate_amounts: bool,
}

impl Default for CsvProfile {
    fn default() -> Self {
        Self {
            date_column: 0,
            category_column: 1,
            amount_column: 2,
            description_column: Some(3),
            date_format: "%Y-%m-%d".into(),
            negate_amounts: false,
        }
    }
}

impl CsvProfile {
    /// Picks columns by header name when the file has a recognizable header.
    pub(crate) fn from_headers(headers: &[String]) -> Self {
        let mut profile = Self::default();
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
        };
        if let Some(i) = find(&["date", "posted", "transaction date"]) {
            profile.date_column = i;
        }
        if let Some(i) = find(&["category", "cat"]) {
            profile.category_column = i;
        }
        if let Some(i) = find(&["amount", "value"]) {
            profile.amount_column = i;
        }
        profile.description_column = find(&["description", "memo", "payee", "name"]);
        profile
    }
}

pub(crate) struct CsvImporter;

impl CsvImporter {
    /// Read the CSV and return headers + data rows. Files without a header
    /// row get generic column names.
    pub(crate) fn preview(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_path(path)
            .context("Failed to open CSV file")?;

        let mut all_rows: Vec<Vec<String>> = Vec::new();
        for result in rdr.records() {
            let record = result.context("Failed to read CSV record")?;
            all_rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        if all_rows.is_empty() {
            anyhow::bail!("CSV file is empty");
        }

        let first_row = &all_rows[0];
        let looks_like_header = first_row.iter().all(|field| {
            let trimmed = field.trim();
            parse_decimal(trimmed).is_err() && parse_date(trimmed, "%Y-%m-%d").is_err()
        });

        if looks_like_header {
            let headers = all_rows.remove(0);
            Ok((headers, all_rows))
        } else {
            let headers: Vec<String> = (0..first_row.len())
                .map(|i| format!("Column {}", i + 1))
                .collect();
            Ok((headers, all_rows))
        }
    }

    /// Parse rows into Transactions using the given profile. Rows without a
    /// date are skipped; rows without a category are filed under "Uncategorized".
    pub(crate) fn parse(rows: &[Vec<String>], profile: &CsvProfile) -> Result<Vec<Transaction>> {
        let mut transactions = Vec::new();

        for (i, row) in rows.iter().enumerate() {
            let field = |col: usize| row.get(col).map(|s| s.trim()).unwrap_or_default();

            let date_str = field(profile.date_column);
            if date_str.is_empty() {
                continue;
            }

            let date = parse_date(date_str, &profile.date_format)
                .with_context(|| format!("Row {}: failed to parse date '{}'", i + 1, date_str))?;

            let category = match field(profile.category_column) {
                "" => "Uncategorized".to_string(),
                c => c.to_string(),
            };

            let raw_amount = field(profile.amount_column);
            let mut amount = parse_decimal(raw_amount)
                .with_context(|| format!("Row {}: failed to parse amount '{}'", i + 1, raw_amount))?;
            if profile.negate_amounts {
                amount = -amount;
            }

            let description = profile
                .description_column
                .map(|c| field(c).to_string())
                .unwrap_or_default();

            let mut txn = Transaction::new(category, amount, date);
            txn.import_hash = compute_hash(date_str, &txn.category, &description, &amount);
            txn.description = description;
            transactions.push(txn);
        }

        Ok(transactions)
    }
}

fn parse_date(s: &str, fmt: &str) -> Result<NaiveDateTime> {
    for full in [fmt, "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, full) {
            return Ok(dt);
        }
    }
    for date_only in [fmt, "%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y", "%m/%d/%y", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, date_only) {
            return Ok(d.and_time(Default::default()));
        }
    }
    anyhow::bail!("Could not parse date: {}", s)
}

fn parse_decimal(s: &str) -> Result<Decimal> {
    let cleaned = s
        .replace(['$', ',', '"'], "")
        .replace('(', "-")
        .replace(')', "")
        .trim()
        .to_string();
    if cleaned.is_empty() {
        anyhow::bail!("Missing amount");
    }
    Decimal::from_str(&cleaned).with_context(|| format!("Failed to parse '{}' as decimal", s))
}

/// Stable hash for deduplication: FNV-1a, which does not change between
/// Rust releases the way `DefaultHasher` may.
fn compute_hash(date: &str, category: &str, description: &str, amount: &Decimal) -> String {
    let input = format!("{date}|{category}|{description}|{amount}");
    let hash = fnv1a(input.as_bytes());
    format!("{hash:016x}")
}

fn fnv1a(data: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &byte in data {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
