use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::status::{CategoryStatus, MonthlyStatus};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, progress_bar, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let status = &app.status;
    let uncovered_height = if status.uncovered.is_empty() {
        0
    } else {
        (status.uncovered.len() as u16 + 2).min(8)
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),                // Totals card
            Constraint::Min(3),                   // Budget list
            Constraint::Length(uncovered_height), // Uncovered categories
        ])
        .split(area);

    render_totals(f, chunks[0], status);
    if status.budgets.is_empty() {
        render_empty(f, chunks[1]);
    } else {
        render_list(f, chunks[1], app);
    }
    if uncovered_height > 0 {
        render_uncovered(f, chunks[2], &status.uncovered);
    }
}

fn block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ))
}

fn render_totals(f: &mut Frame, area: Rect, status: &MonthlyStatus) {
    let totals = status.totals;
    let remaining_style = if totals.remainder < Decimal::ZERO {
        theme::expense_style()
    } else {
        theme::income_style()
    };

    let over = status.over_budget_count();
    let over_line = if over == 0 {
        Span::styled("All budgets on track", theme::income_style())
    } else {
        Span::styled(format!("{over} over budget"), theme::over_budget_style())
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(" Budgeted  ", theme::dim_style()),
            Span::styled(format!("{:>14}", format_amount(totals.budget)), theme::normal_style()),
            Span::styled("    Spent  ", theme::dim_style()),
            Span::styled(format!("{:>14}", format_amount(totals.spent)), theme::expense_style()),
        ]),
        Line::from(vec![
            Span::styled(" Remaining ", theme::dim_style()),
            Span::styled(format!("{:>14}", format_amount(totals.remainder)), remaining_style),
            Span::raw("    "),
            over_line,
        ]),
    ];

    let card = Paragraph::new(lines).block(block(format!(" {} ", status.month.title())));
    f.render_widget(card, area);
}

fn usage_color(s: &CategoryStatus) -> ratatui::style::Color {
    theme::usage_color(s.used_ratio().to_f64().unwrap_or(0.0), s.is_over)
}

fn render_list(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .status
        .budgets
        .iter()
        .enumerate()
        .skip(app.budget_scroll)
        .take(area.height.saturating_sub(2) as usize)
        .map(|(i, s)| {
            let color = usage_color(s);
            let style = if i == app.budget_index {
                theme::selected_style()
            } else if i % 2 == 0 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            let marker = if s.is_over {
                Span::styled(" OVER", theme::over_budget_style())
            } else {
                Span::raw("")
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<18}", truncate(&s.category, 17)), style),
                Span::styled(
                    format!(
                        "{}/{} ",
                        format_amount(s.total_spent),
                        format_amount(s.budget_amount)
                    ),
                    Style::default().fg(color),
                ),
                Span::styled(progress_bar(s.used_ratio(), 20), Style::default().fg(color)),
                Span::styled(
                    format!(" {} left", format_amount(s.remainder)),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                marker,
            ]))
        })
        .collect();

    let list = List::new(items).block(block(" Budgets ".to_string()));
    f.render_widget(list, area);
}

fn render_uncovered(f: &mut Frame, area: Rect, uncovered: &[String]) {
    let items: Vec<ListItem> = uncovered
        .iter()
        .map(|c| ListItem::new(Span::styled(format!(" {c}"), theme::normal_style())))
        .collect();
    let list = List::new(items).block(block(" Spending without a budget ".to_string()));
    f.render_widget(list, area);
}

fn render_empty(f: &mut Frame, area: Rect) {
    let msg = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("No budgets yet", theme::dim_style())),
        Line::from(""),
        Line::from(Span::styled(
            "Use :budget <category> <amount> to set a spending limit",
            theme::dim_style(),
        )),
    ])
    .centered()
    .block(block(" Budgets ".to_string()));
    f.render_widget(msg, area);
}
