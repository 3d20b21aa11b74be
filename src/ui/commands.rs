use std::collections::HashMap;
use std::sync::LazyLock;

use super::app::{App, InputMode, PendingAction, Screen};
use crate::budgets::{self, BudgetUpdate};
use crate::db::Database;
use crate::models::{Month, Transaction};
use crate::store::TransactionStore;
use crate::ui::util::format_amount;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit budgetwatch", cmd_quit, r);
    register_command!("quit", "Quit budgetwatch", cmd_quit, r);
    register_command!("b", "Go to Budgets", cmd_budgets, r);
    register_command!("budgets", "Go to Budgets", cmd_budgets, r);
    register_command!("t", "Go to Transactions", cmd_transactions, r);
    register_command!("transactions", "Go to Transactions", cmd_transactions, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("month", "Set month (e.g. :month 2024-01)", cmd_month, r);
    register_command!("m", "Set month (e.g. :m 2024-01)", cmd_month, r);
    register_command!("next-month", "Go to next month", cmd_next_month, r);
    register_command!("prev-month", "Go to previous month", cmd_prev_month, r);
    register_command!(
        "budget",
        "Create budget (e.g. :budget Food & Dining 500)",
        cmd_budget,
        r
    );
    register_command!(
        "update-budget",
        "Update selected budget (e.g. :update-budget --amount 450 --category Food)",
        cmd_update_budget,
        r
    );
    register_command!(
        "delete-budget",
        "Delete selected budget",
        cmd_delete_budget,
        r
    );
    register_command!(
        "delete-txn",
        "Delete selected transaction",
        cmd_delete_txn,
        r
    );
    register_command!(
        "add-txn",
        "Add transaction (e.g. :add-txn 2024-01-15 Coffee -4.50 latte)",
        cmd_add_txn,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, db)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[derive(Clone, Copy)]
enum Flag {
    Amount,
    Category,
}

/// Pull `--amount` and `--category` values out of an argument string.
/// Flag values run until the next flag, so categories may contain spaces.
fn parse_update_flags(args: &str) -> (Option<String>, Option<String>) {
    let mut amount: Vec<&str> = Vec::new();
    let mut category: Vec<&str> = Vec::new();
    let mut target = None;

    for token in args.split_whitespace() {
        match (token, target) {
            ("--amount", _) => target = Some(Flag::Amount),
            ("--category", _) => target = Some(Flag::Category),
            (word, Some(Flag::Amount)) => amount.push(word),
            (word, Some(Flag::Category)) => category.push(word),
            (_, None) => {}
        }
    }

    let join = |words: Vec<&str>| (!words.is_empty()).then(|| words.join(" "));
    (join(amount), join(category))
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_budgets(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Budgets;
    app.refresh_status(db)?;
    Ok(())
}

fn cmd_transactions(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Transactions;
    app.refresh_transactions(db)?;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_month(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        return app.set_month(Month::current(), db);
    }

    // "2024-01", or a bare "1".."12" within the viewed year
    let parsed = if args.len() <= 2 {
        args.parse::<u32>()
            .ok()
            .and_then(|m| Month::from_external(app.month.year(), m).ok())
    } else {
        Month::parse(args).ok()
    };

    match parsed {
        Some(month) => app.set_month(month, db)?,
        None => app.set_status("Invalid month format. Use YYYY-MM (e.g. 2024-01)"),
    }
    Ok(())
}

fn cmd_next_month(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.set_month(app.month.next(), db)
}

fn cmd_prev_month(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.set_month(app.month.prev(), db)
}

fn cmd_budget(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :budget [category] <amount>. Example: :budget Food & Dining 500");
        return Ok(());
    }

    // Last token is the amount when it parses as one, everything before is the category.
    // A lone amount goes to the default category.
    let (category, amount) = match args.rsplit_once(' ') {
        Some((name, amount)) if budgets::parse_currency(amount).is_ok() => (Some(name), Some(amount)),
        None if budgets::parse_currency(args).is_ok() => (None, Some(args)),
        _ => (Some(args), None),
    };

    match budgets::create_budget(db, amount, category) {
        Ok(budget) => {
            app.screen = Screen::Budgets;
            app.refresh_status(db)?;
            app.set_status(format!(
                "Budget created: {} = {}",
                budget.category,
                format_amount(budget.amount)
            ));
        }
        Err(e) => app.set_status(e.to_string()),
    }
    Ok(())
}

fn cmd_update_budget(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some(id) = selected_budget_id(app) else {
        return Ok(());
    };

    let (amount, category) = parse_update_flags(args);
    if amount.is_none() && category.is_none() {
        app.set_status("Usage: :update-budget [--amount X] [--category Y]");
        return Ok(());
    }

    let update = BudgetUpdate {
        id,
        amount,
        category,
    };
    match budgets::update_budget(db, &update) {
        Ok(budget) => {
            app.refresh_status(db)?;
            app.set_status(format!(
                "Budget updated: {} = {}",
                budget.category,
                format_amount(budget.amount)
            ));
        }
        Err(e) => app.set_status(e.to_string()),
    }
    Ok(())
}

fn cmd_delete_budget(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    let Some(id) = selected_budget_id(app) else {
        return Ok(());
    };
    let category = app
        .selected_budget()
        .map(|s| s.category.clone())
        .unwrap_or_default();

    app.confirm_message = format!("Delete budget '{category}'?");
    app.pending_action = Some(PendingAction::DeleteBudget { id, category });
    app.input_mode = InputMode::Confirm;
    Ok(())
}

fn cmd_add_txn(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let usage = "Usage: :add-txn <YYYY-MM-DD> <category> <amount> [description]";
    let tokens: Vec<&str> = args.split_whitespace().collect();
    let [date, category, amount, description @ ..] = tokens.as_slice() else {
        app.set_status(usage);
        return Ok(());
    };

    let Ok(date) = crate::run::parse_txn_date(date) else {
        app.set_status(format!("Invalid date: {date}. {usage}"));
        return Ok(());
    };
    let amount = match budgets::parse_currency(amount) {
        Ok(a) => a,
        Err(e) => {
            app.set_status(e.to_string());
            return Ok(());
        }
    };

    let mut txn = Transaction::new((*category).to_string(), amount, date);
    txn.description = description.join(" ");
    db.insert_transaction(&txn)?;

    if app.month.range().contains(txn.date) {
        app.refresh_all(db)?;
    }
    app.set_status(format!(
        "Added {} {} on {}",
        txn.category,
        format_amount(txn.amount),
        txn.date.format("%Y-%m-%d")
    ));
    Ok(())
}

fn cmd_delete_txn(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if app.screen != Screen::Transactions || app.transactions.is_empty() {
        app.set_status("Navigate to Transactions and select one first");
        return Ok(());
    }

    if let Some(txn) = app.transactions.get(app.transaction_index) {
        if let Some(id) = txn.id {
            let label = if txn.description.is_empty() {
                format!("{} {}", txn.category, format_amount(txn.amount))
            } else {
                txn.description.clone()
            };
            app.confirm_message = format!("Delete '{label}'?");
            app.pending_action = Some(PendingAction::DeleteTransaction { id, label });
            app.input_mode = InputMode::Confirm;
        }
    }
    Ok(())
}

fn selected_budget_id(app: &mut App) -> Option<i64> {
    if app.screen != Screen::Budgets {
        app.set_status("Navigate to Budgets and select one first");
        return None;
    }
    let id = app.selected_budget().and_then(|s| s.budget_id);
    if id.is_none() {
        app.set_status("No budget selected");
    }
    id
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
