#![allow(clippy::unwrap_used)]

use super::*;
use crate::models::Month;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal_macros::dec;

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn make_txn(category: &str, amount: Decimal, date: NaiveDateTime, hash: &str) -> Transaction {
    let mut txn = Transaction::new(category.into(), amount, date);
    txn.import_hash = hash.into();
    txn
}

fn setup_test_data(db: &mut Database) {
    let txns = vec![
        make_txn("Coffee Shops", dec!(-5.25), at(2024, 1, 10), "hash-1"),
        make_txn("Shopping", dec!(-42.99), at(2024, 1, 15), "hash-2"),
        make_txn("Income", dec!(3000.00), at(2024, 1, 20), "hash-3"),
        make_txn("Groceries", dec!(-87.30), at(2024, 2, 5), "hash-4"),
    ];
    for txn in &txns {
        db.insert_transaction(txn).unwrap();
    }
}

// ── Schema ────────────────────────────────────────────────────

#[test]
fn test_fresh_database_is_empty() {
    let db = Database::open_in_memory().unwrap();
    assert!(db
        .find_transactions(&TransactionFilter::default())
        .unwrap()
        .is_empty());
    assert!(db.find_budgets(&BudgetFilter::default()).unwrap().is_empty());
}

#[test]
fn test_reopen_file_database_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    {
        let db = Database::open(&path).unwrap();
        db.create_budget(&Budget::new("Food".into(), dec!(10)))
            .unwrap();
    }
    let db = Database::open(&path).unwrap();
    let budgets = db.find_budgets(&BudgetFilter::default()).unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].amount, dec!(10));
}

// ── Transactions ──────────────────────────────────────────────

#[test]
fn test_transaction_insert_and_query() {
    let db = Database::open_in_memory().unwrap();
    let txn = make_txn("Coffee Shops", dec!(-4.50), at(2024, 1, 15), "");
    let id = db.insert_transaction(&txn).unwrap();
    assert!(id > 0);

    let all = db.find_transactions(&TransactionFilter::default()).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, Some(id));
    assert_eq!(all[0].category, "Coffee Shops");
    assert_eq!(all[0].amount, dec!(-4.50));
    assert_eq!(all[0].date, at(2024, 1, 15));
}

#[test]
fn test_transactions_by_month_range() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&mut db);

    let jan = Month::new(2024, 0).unwrap();
    let txns = db
        .find_transactions(&TransactionFilter::in_range(jan.range()))
        .unwrap();
    assert_eq!(txns.len(), 3);
    // Newest first
    assert_eq!(txns[0].category, "Income");

    let feb = db
        .find_transactions(&TransactionFilter::in_range(jan.next().range()))
        .unwrap();
    assert_eq!(feb.len(), 1);
    assert_eq!(feb[0].category, "Groceries");
}

#[test]
fn test_transactions_by_category() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&mut db);
    db.insert_transaction(&make_txn("Shopping", dec!(-1), at(2023, 5, 5), ""))
        .unwrap();

    let shopping = db
        .find_transactions(&TransactionFilter::for_category("Shopping"))
        .unwrap();
    assert_eq!(shopping.len(), 2);

    let jan = Month::new(2024, 0).unwrap();
    let jan_shopping = db
        .find_transactions(
            &TransactionFilter::in_range(jan.range()).with_category(Some("Shopping".into())),
        )
        .unwrap();
    assert_eq!(jan_shopping.len(), 1);
    assert_eq!(jan_shopping[0].amount, dec!(-42.99));
}

#[test]
fn test_category_match_is_exact() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&mut db);
    assert!(db
        .find_transactions(&TransactionFilter::for_category("shopping"))
        .unwrap()
        .is_empty());
}

#[test]
fn test_batch_insert_skips_duplicates() {
    let mut db = Database::open_in_memory().unwrap();
    let txns = vec![
        make_txn("Food", dec!(-1), at(2024, 1, 1), "a"),
        make_txn("Food", dec!(-2), at(2024, 1, 2), "b"),
    ];
    assert_eq!(db.insert_transactions_batch(&txns).unwrap(), 2);
    assert_eq!(db.insert_transactions_batch(&txns).unwrap(), 0);

    // Rows without a hash are never treated as duplicates
    let manual = vec![
        make_txn("Food", dec!(-3), at(2024, 1, 3), ""),
        make_txn("Food", dec!(-3), at(2024, 1, 3), ""),
    ];
    assert_eq!(db.insert_transactions_batch(&manual).unwrap(), 2);
    assert_eq!(
        db.find_transactions(&TransactionFilter::default())
            .unwrap()
            .len(),
        4
    );
}

#[test]
fn test_delete_transaction() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .insert_transaction(&make_txn("Food", dec!(-1), at(2024, 1, 1), ""))
        .unwrap();
    db.delete_transaction(id).unwrap();
    assert!(db
        .find_transactions(&TransactionFilter::default())
        .unwrap()
        .is_empty());
}

#[test]
fn test_decimal_precision_preserved() {
    let db = Database::open_in_memory().unwrap();
    db.insert_transaction(&make_txn("Food", dec!(-0.01), at(2024, 1, 1), ""))
        .unwrap();
    db.insert_transaction(&make_txn("Food", dec!(-1234567.89), at(2024, 1, 1), ""))
        .unwrap();
    let amounts: Vec<Decimal> = db
        .find_transactions(&TransactionFilter::default())
        .unwrap()
        .iter()
        .map(|t| t.amount)
        .collect();
    assert!(amounts.contains(&dec!(-0.01)));
    assert!(amounts.contains(&dec!(-1234567.89)));
}

#[test]
fn test_corrupt_amount_surfaces_as_store_error() {
    let db = Database::open_in_memory().unwrap();
    db.conn
        .execute(
            "INSERT INTO budgets (category, amount, created_at) VALUES ('Food', 'lots', '')",
            [],
        )
        .unwrap();
    let err = db.find_budgets(&BudgetFilter::default()).unwrap_err();
    assert!(matches!(err, crate::error::BudgetError::StoreUnavailable(_)));
}

// ── Budgets ───────────────────────────────────────────────────

#[test]
fn test_budget_crud() {
    let db = Database::open_in_memory().unwrap();
    let created = db
        .create_budget(&Budget::new("Food".into(), dec!(300)))
        .unwrap();
    let id = created.id.unwrap();

    let fetched = db.find_budget_by_id(id).unwrap().unwrap();
    assert_eq!(fetched, created);

    let updated = db
        .update_budget(
            id,
            &BudgetChanges {
                amount: Some(dec!(350)),
                category: None,
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(updated.amount, dec!(350));
    assert_eq!(updated.category, "Food");

    assert!(db.delete_budget(id).unwrap());
    assert!(db.find_budget_by_id(id).unwrap().is_none());
}

#[test]
fn test_budget_missing_id() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.find_budget_by_id(99999).unwrap().is_none());
    assert!(db
        .update_budget(99999, &BudgetChanges::default())
        .unwrap()
        .is_none());
    assert!(!db.delete_budget(99999).unwrap());
}

#[test]
fn test_find_budgets_by_category() {
    let db = Database::open_in_memory().unwrap();
    db.create_budget(&Budget::new("Food".into(), dec!(1)))
        .unwrap();
    db.create_budget(&Budget::new("Rent".into(), dec!(2)))
        .unwrap();

    let food = db
        .find_budgets(&BudgetFilter {
            category: Some("Food".into()),
        })
        .unwrap();
    assert_eq!(food.len(), 1);
    assert_eq!(food[0].category, "Food");
    assert_eq!(db.find_budgets(&BudgetFilter::default()).unwrap().len(), 2);
}

#[test]
fn test_find_budget_by_category_prefers_latest() {
    let db = Database::open_in_memory().unwrap();
    db.create_budget(&Budget::new("Food".into(), dec!(1)))
        .unwrap();
    let latest = db
        .create_budget(&Budget::new("Food".into(), dec!(2)))
        .unwrap();
    assert_eq!(db.find_budget_by_category("Food").unwrap(), Some(latest));
    assert!(db.find_budget_by_category("Rent").unwrap().is_none());
}
