#![allow(clippy::unwrap_used)]

use super::*;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::Write;

fn make_csv_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
    data.iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect()
}

// ── parse_decimal ─────────────────────────────────────────────

#[test]
fn test_parse_decimal_basic() {
    assert_eq!(parse_decimal("100.50").unwrap(), dec!(100.50));
    assert_eq!(parse_decimal("-42.99").unwrap(), dec!(-42.99));
}

#[test]
fn test_parse_decimal_with_currency() {
    assert_eq!(parse_decimal("$1,234.56").unwrap(), dec!(1234.56));
    assert_eq!(parse_decimal("-$99.99").unwrap(), dec!(-99.99));
}

#[test]
fn test_parse_decimal_parentheses_negative() {
    assert_eq!(parse_decimal("(500.00)").unwrap(), dec!(-500.00));
}

#[test]
fn test_parse_decimal_quoted() {
    assert_eq!(parse_decimal("\"100.00\"").unwrap(), dec!(100.00));
}

#[test]
fn test_parse_decimal_empty_and_invalid() {
    assert!(parse_decimal("").is_err());
    assert!(parse_decimal("not_a_number").is_err());
}

// ── parse_date ────────────────────────────────────────────────

#[test]
fn test_parse_date_iso() {
    let d = parse_date("2024-01-15", "%Y-%m-%d").unwrap();
    assert_eq!(d.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    assert_eq!(d.format("%H:%M:%S").to_string(), "00:00:00");
}

#[test]
fn test_parse_date_us_fallback() {
    let d = parse_date("01/15/2024", "%Y-%m-%d").unwrap();
    assert_eq!(d.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
}

#[test]
fn test_parse_date_with_time() {
    let d = parse_date("2024-01-15 18:45:00", "%Y-%m-%d").unwrap();
    assert_eq!(d.format("%H:%M").to_string(), "18:45");
}

#[test]
fn test_parse_date_invalid() {
    assert!(parse_date("yesterday", "%Y-%m-%d").is_err());
}

// ── hash ──────────────────────────────────────────────────────

#[test]
fn test_hash_is_deterministic_and_field_sensitive() {
    let a = compute_hash("2024-01-01", "Food", "", &dec!(-1));
    let b = compute_hash("2024-01-01", "Food", "", &dec!(-1));
    let c = compute_hash("2024-01-01", "Rent", "", &dec!(-1));
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.len(), 16);
}

// ── preview ───────────────────────────────────────────────────

#[test]
fn test_preview_detects_header() {
    let file = make_csv_file("Date,Category,Amount\n2024-01-05,Food,-12.50\n");
    let (headers, data) = CsvImporter::preview(file.path()).unwrap();
    assert_eq!(headers, vec!["Date", "Category", "Amount"]);
    assert_eq!(data.len(), 1);
}

#[test]
fn test_preview_without_header() {
    let file = make_csv_file("2024-01-05,Food,-12.50\n2024-01-06,Rent,-900\n");
    let (headers, data) = CsvImporter::preview(file.path()).unwrap();
    assert_eq!(headers, vec!["Column 1", "Column 2", "Column 3"]);
    assert_eq!(data.len(), 2);
}

#[test]
fn test_preview_empty_file() {
    let file = make_csv_file("");
    assert!(CsvImporter::preview(file.path()).is_err());
}

// ── profile ───────────────────────────────────────────────────

#[test]
fn test_profile_from_headers_reorders_columns() {
    let headers: Vec<String> = ["Amount", "Memo", "Date", "Category"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let profile = CsvProfile::from_headers(&headers);
    assert_eq!(profile.amount_column, 0);
    assert_eq!(profile.description_column, Some(1));
    assert_eq!(profile.date_column, 2);
    assert_eq!(profile.category_column, 3);
}

// ── parse ─────────────────────────────────────────────────────

#[test]
fn test_parse_rows() {
    let data = rows(&[
        &["2024-01-05", "Food", "-12.50", "Corner deli"],
        &["2024-01-06", "Rent", "$-900.00"],
        &["", "Food", "-1"],
    ]);
    let txns = CsvImporter::parse(&data, &CsvProfile::default()).unwrap();
    assert_eq!(txns.len(), 2);
    assert_eq!(txns[0].category, "Food");
    assert_eq!(txns[0].amount, dec!(-12.50));
    assert_eq!(txns[0].description, "Corner deli");
    assert!(!txns[0].import_hash.is_empty());
    assert_eq!(txns[1].amount, dec!(-900.00));
    assert!(txns[1].description.is_empty());
    assert_ne!(txns[0].import_hash, txns[1].import_hash);
}

#[test]
fn test_parse_blank_category_is_uncategorized() {
    let data = rows(&[&["2024-01-05", "  ", "-3"]]);
    let txns = CsvImporter::parse(&data, &CsvProfile::default()).unwrap();
    assert_eq!(txns[0].category, "Uncategorized");
}

#[test]
fn test_parse_negate_amounts() {
    let data = rows(&[&["2024-01-05", "Food", "12.50"]]);
    let profile = CsvProfile {
        negate_amounts: true,
        ..CsvProfile::default()
    };
    let txns = CsvImporter::parse(&data, &profile).unwrap();
    assert_eq!(txns[0].amount, dec!(-12.50));
}

#[test]
fn test_parse_reports_row_on_bad_amount() {
    let data = rows(&[
        &["2024-01-05", "Food", "-1"],
        &["2024-01-06", "Food", "oops"],
    ]);
    let err = CsvImporter::parse(&data, &CsvProfile::default()).unwrap_err();
    assert!(format!("{err:#}").contains("Row 2"));
}

#[test]
fn test_parse_missing_amount_column_fails() {
    let data = rows(&[&["2024-01-05", "Food"]]);
    assert!(CsvImporter::parse(&data, &CsvProfile::default()).is_err());
}

#[test]
fn test_import_file_end_to_end() {
    let file = make_csv_file(
        "date,category,amount,description\n\
         2024-01-05,Food,-12.50,Deli\n\
         01/07/2024,Food,\"$1,000.00\",Refund\n",
    );
    let (headers, data) = CsvImporter::preview(file.path()).unwrap();
    let profile = CsvProfile::from_headers(&headers);
    let txns = CsvImporter::parse(&data, &profile).unwrap();
    assert_eq!(txns.len(), 2);
    let total: Decimal = txns.iter().map(|t| t.amount).sum();
    assert_eq!(total, dec!(987.50));
}
