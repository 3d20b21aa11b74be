use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::path::Path;

use crate::budgets::{self, BudgetUpdate};
use crate::db::Database;
use crate::import::{CsvImporter, CsvProfile};
use crate::models::{Budget, Month, Transaction};
use crate::status::{self, CategoryLookup, MonthlyStatus};
use crate::store::{TransactionFilter, TransactionStore};
use crate::ui::util::format_amount;

pub(crate) fn as_cli(args: &[String], db: &mut Database) -> Result<()> {
    let rest = &args[2..];
    match args[1].as_str() {
        "status" | "s" => cli_status(rest, db),
        "budgets" | "b" => cli_budgets(rest, db),
        "budget-status" => cli_budget_status(rest, db),
        "add-budget" => cli_add_budget(rest, db),
        "update-budget" => cli_update_budget(rest, db),
        "delete-budget" => cli_delete_budget(rest, db),
        "add-txn" => cli_add_txn(rest, db),
        "transactions" | "t" => cli_transactions(rest, db),
        "import" => cli_import(rest, db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("budgetwatch {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("budgetwatch - local-only budget tracker");
    println!();
    println!("Usage: budgetwatch [command]");
    println!();
    println!("Commands:");
    println!("  (none)                              Launch interactive TUI");
    println!("  status [YYYY-MM | YYYY MM]          Budget status for a month (default: current)");
    println!("  budgets [category]                  List budgets, optionally for one category");
    println!("  budget-status <category>            All-time spending vs. budget for a category");
    println!("  add-budget [category] [amount]      Create a budget (defaults: Default, 0)");
    println!("                                      A lone numeric argument is the amount");
    println!("  update-budget <id> [--amount X] [--category Y]");
    println!("                                      Change a budget's amount and/or category");
    println!("  delete-budget <id>                  Delete a budget");
    println!("  add-txn <date> <category> <amount> [description]");
    println!("                                      Record a transaction (negative = expense)");
    println!("  transactions [YYYY-MM] [--category C]");
    println!("                                      List transactions for a month");
    println!("  import <file.csv> [--negate] [--date-format FMT]");
    println!("                                      Import transactions (date,category,amount[,description])");
    println!("                                      --negate flips signs for banks that export spending as positive");
    println!("  --help, -h                          Show this help");
    println!("  --version, -V                       Show version");
    println!();
    println!("Environment: BUDGETWATCH_DB, BUDGETWATCH_DATA_DIR, BUDGETWATCH_LOG");
}

// ── Argument helpers ─────────────────────────────────────────

/// `[]` → current month, `["2024-03"]` → March 2024, `["2024", "3"]` → March 2024.
pub(crate) fn parse_month_args(args: &[String]) -> Result<Month> {
    let positional: Vec<&String> = args.iter().take_while(|a| !a.starts_with("--")).collect();
    match positional.as_slice() {
        [] => Ok(Month::current()),
        [ym] => Ok(Month::parse(ym)?),
        [year, month, ..] => {
            let year: i32 = year
                .parse()
                .with_context(|| format!("Invalid year: {year}"))?;
            let month: u32 = month
                .parse()
                .with_context(|| format!("Invalid month: {month}"))?;
            Ok(Month::from_external(year, month)?)
        }
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_id(raw: Option<&String>, usage: &str) -> Result<i64> {
    let raw = raw.ok_or_else(|| anyhow::anyhow!("{usage}"))?;
    raw.parse()
        .with_context(|| format!("Invalid budget id: {raw}"))
}

pub(crate) fn parse_txn_date(s: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Ok(dt);
    }
    let date = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{s}', expected YYYY-MM-DD"))?;
    Ok(date.and_time(chrono::NaiveTime::default()))
}

// ── Formatting ───────────────────────────────────────────────

pub(crate) fn format_status(status: &MonthlyStatus) -> String {
    let mut lines = vec![
        format!("Budgets for {}", status.month.title()),
        "─".repeat(64),
    ];

    if status.budgets.is_empty() {
        lines.push("  No budgets. Create one with: budgetwatch add-budget <category> <amount>".into());
    } else {
        lines.push(format!(
            "  {:<22} {:>12} {:>12} {:>12}",
            "Category", "Spent", "Budget", "Remaining"
        ));
        lines.extend(status.budgets.iter().map(|s| {
            format!(
                "  {:<22} {:>12} {:>12} {:>12}{}",
                crate::ui::util::truncate(&s.category, 22),
                format_amount(s.total_spent),
                format_amount(s.budget_amount),
                format_amount(s.remainder),
                if s.is_over { "  OVER" } else { "" }
            )
        }));
    }

    lines.push(String::new());
    lines.push(format!("  Budgeted:   {}", format_amount(status.totals.budget)));
    lines.push(format!("  Spent:      {}", format_amount(status.totals.spent)));
    lines.push(format!("  Remaining:  {}", format_amount(status.totals.remainder)));

    if !status.uncovered.is_empty() {
        lines.push(String::new());
        lines.push("Spending without a budget:".into());
        lines.extend(status.uncovered.iter().map(|c| format!("  {c}")));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub(crate) fn format_budget(budget: &Budget) -> String {
    format!(
        "{:<4} {:<24} {}",
        budget.id.unwrap_or(0),
        budget.category,
        format_amount(budget.amount)
    )
}

pub(crate) fn format_lookup(lookup: &CategoryLookup) -> String {
    format!(
        "{}: budget {}, {} by {}",
        lookup.budget.category,
        format_amount(lookup.budget.amount),
        if lookup.is_over { "over" } else { "within budget" },
        format_amount(lookup.difference)
    )
}

// ── Commands ─────────────────────────────────────────────────

fn cli_status(args: &[String], db: &Database) -> Result<()> {
    let month = parse_month_args(args)?;
    let status = status::monthly_status(db, db, month)?.sorted_for_display();
    print!("{}", format_status(&status));
    Ok(())
}

fn cli_budgets(args: &[String], db: &Database) -> Result<()> {
    let category = (!args.is_empty()).then(|| args.join(" "));
    let list = budgets::list_budgets(db, category.as_deref())?;
    if list.is_empty() {
        println!("No budgets");
        return Ok(());
    }

    println!("{:<4} {:<24} Amount", "ID", "Category");
    println!("{}", "─".repeat(44));
    for budget in &list {
        println!("{}", format_budget(budget));
    }
    Ok(())
}

fn cli_budget_status(args: &[String], db: &Database) -> Result<()> {
    if args.is_empty() {
        anyhow::bail!("Usage: budgetwatch budget-status <category>");
    }
    let category = args.join(" ");
    let lookup = status::category_status(db, db, &category)?;
    println!("{}", format_lookup(&lookup));
    Ok(())
}

fn cli_add_budget(args: &[String], db: &Database) -> Result<()> {
    // Last argument is the amount when it parses as one; everything before is the category.
    // A lone amount goes to the default category.
    let (category, amount) = match args.split_last() {
        Some((last, init)) if budgets::parse_currency(last).is_ok() => {
            ((!init.is_empty()).then(|| init.join(" ")), Some(last.as_str()))
        }
        Some(_) => (Some(args.join(" ")), None),
        None => (None, None),
    };

    let budget = budgets::create_budget(db, amount, category.as_deref())?;
    println!("Created budget {}", format_budget(&budget));
    Ok(())
}

fn cli_update_budget(args: &[String], db: &Database) -> Result<()> {
    let usage = "Usage: budgetwatch update-budget <id> [--amount X] [--category Y]";
    let id = parse_id(args.first(), usage)?;
    let update = BudgetUpdate {
        id,
        amount: flag_value(args, "--amount").map(str::to_string),
        category: flag_value(args, "--category").map(str::to_string),
    };
    if update.amount.is_none() && update.category.is_none() {
        anyhow::bail!("{usage}");
    }

    let budget = budgets::update_budget(db, &update)?;
    println!("Updated budget {}", format_budget(&budget));
    Ok(())
}

fn cli_delete_budget(args: &[String], db: &Database) -> Result<()> {
    let id = parse_id(args.first(), "Usage: budgetwatch delete-budget <id>")?;
    budgets::delete_budget(db, id)?;
    println!("Successfully removed budget {id}");
    Ok(())
}

fn cli_add_txn(args: &[String], db: &Database) -> Result<()> {
    let [date, category, amount, description @ ..] = args else {
        anyhow::bail!("Usage: budgetwatch add-txn <date> <category> <amount> [description]");
    };

    let date = parse_txn_date(date)?;
    let amount = budgets::parse_currency(amount)?;
    let mut txn = Transaction::new(category.trim().to_string(), amount, date);
    txn.description = description.join(" ");

    db.insert_transaction(&txn)?;
    println!(
        "Added {} {} on {}",
        txn.category,
        format_amount(txn.amount),
        txn.date.format("%Y-%m-%d")
    );
    Ok(())
}

fn cli_transactions(args: &[String], db: &Database) -> Result<()> {
    let month = parse_month_args(args)?;
    let category = flag_value(args, "--category").map(str::to_string);
    let filter = TransactionFilter::in_range(month.range()).with_category(category);
    let txns = db.find_transactions(&filter)?;

    if txns.is_empty() {
        println!("No transactions for {}", month.title());
        return Ok(());
    }

    println!("{:<12} {:<20} {:>12}  Description", "Date", "Category", "Amount");
    println!("{}", "─".repeat(64));
    for txn in &txns {
        println!(
            "{:<12} {:<20} {:>12}  {}",
            txn.date.format("%Y-%m-%d"),
            crate::ui::util::truncate(&txn.category, 20),
            format_amount(txn.amount),
            txn.description
        );
    }
    Ok(())
}

fn cli_import(args: &[String], db: &mut Database) -> Result<()> {
    let Some(file_path) = args.first().filter(|a| !a.starts_with("--")) else {
        anyhow::bail!("Usage: budgetwatch import <file.csv> [--negate] [--date-format FMT]");
    };
    let expanded = crate::run::shellexpand(file_path);
    let path = Path::new(&expanded);
    if !path.exists() {
        anyhow::bail!("File not found: {file_path}");
    }

    let (headers, rows) = CsvImporter::preview(path)?;
    let mut profile = if headers.iter().all(|h| h.starts_with("Column ")) {
        CsvProfile::default()
    } else {
        CsvProfile::from_headers(&headers)
    };
    profile.negate_amounts = args.iter().any(|a| a == "--negate");
    if let Some(fmt) = flag_value(args, "--date-format") {
        profile.date_format = fmt.to_string();
    }

    let txns = CsvImporter::parse(&rows, &profile)?;
    println!("Parsed {} transactions", txns.len());

    let count = db.insert_transactions_batch(&txns)?;
    let dupes = txns.len() - count;
    println!("Imported {count} new transactions ({dupes} duplicates skipped)");
    Ok(())
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
