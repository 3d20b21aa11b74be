use anyhow::Result;

use crate::db::Database;
use crate::models::{Month, Transaction};
use crate::status::{self, CategoryStatus, MonthlyStatus};
use crate::store::{TransactionFilter, TransactionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Budgets,
    Transactions,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Budgets, Self::Transactions]
    }

    pub(crate) fn next(self) -> Self {
        match self {
            Self::Budgets => Self::Transactions,
            Self::Transactions => Self::Budgets,
        }
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Budgets => write!(f, "Budgets"),
            Self::Transactions => write!(f, "Transactions"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PendingAction {
    DeleteBudget { id: i64, category: String },
    DeleteTransaction { id: i64, label: String },
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) month: Month,

    // Budgets
    pub(crate) status: MonthlyStatus,
    pub(crate) budget_index: usize,
    pub(crate) budget_scroll: usize,

    // Transactions
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) transaction_index: usize,
    pub(crate) transaction_scroll: usize,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(month: Month) -> Self {
        Self {
            running: true,
            screen: Screen::Budgets,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,
            month,

            status: status::summarize(month, &[], &[]),
            budget_index: 0,
            budget_scroll: 0,

            transactions: Vec::new(),
            transaction_index: 0,
            transaction_scroll: 0,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    pub(crate) fn refresh_status(&mut self, db: &Database) -> Result<()> {
        self.status = status::monthly_status(db, db, self.month)?.sorted_for_display();
        clamp_index(&mut self.budget_index, &mut self.budget_scroll, self.status.budgets.len());
        Ok(())
    }

    pub(crate) fn refresh_transactions(&mut self, db: &Database) -> Result<()> {
        // Store returns newest first, which is the on-screen order
        self.transactions = db.find_transactions(&TransactionFilter::in_range(self.month.range()))?;
        clamp_index(
            &mut self.transaction_index,
            &mut self.transaction_scroll,
            self.transactions.len(),
        );
        Ok(())
    }

    pub(crate) fn refresh_all(&mut self, db: &Database) -> Result<()> {
        self.refresh_status(db)?;
        self.refresh_transactions(db)?;
        Ok(())
    }

    /// Switch the viewed month and reload everything for it.
    pub(crate) fn set_month(&mut self, month: Month, db: &Database) -> Result<()> {
        self.month = month;
        self.budget_index = 0;
        self.budget_scroll = 0;
        self.transaction_index = 0;
        self.transaction_scroll = 0;
        self.refresh_all(db)?;
        self.set_status(format!("Month: {}", month.title()));
        Ok(())
    }

    pub(crate) fn selected_budget(&self) -> Option<&CategoryStatus> {
        self.status.budgets.get(self.budget_index)
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

fn clamp_index(index: &mut usize, scroll: &mut usize, len: usize) {
    if len == 0 {
        *index = 0;
        *scroll = 0;
    } else if *index >= len {
        *index = len - 1;
        *scroll = (*scroll).min(*index);
    }
}
