mod budgets;
mod config;
mod db;
mod error;
mod import;
mod logging;
mod models;
mod run;
mod status;
mod store;
mod ui;

use anyhow::Result;

use crate::logging::LogTarget;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = config::Config::load()?;

    let target = if args.len() > 1 {
        LogTarget::Stderr
    } else {
        LogTarget::File
    };
    logging::init(&config.log_filter, target, &config.log_path())?;

    let mut db = db::Database::open(&config.db_path)?;

    match args.len() {
        1 => run::as_tui(&mut db),
        2.. => run::as_cli(&args, &mut db),
        _ => {
            eprintln!("Usage: budgetwatch [command]");
            Ok(())
        }
    }
}
