//! Fintrack CLI
//!
//! Command-line interface working directly on the local data directory:
//! - Show the dashboard and net worth
//! - Record, list and delete transactions
//! - Manage budgets and savings goals
//! - Import bank CSV exports
//! - Run the rollover catch-up

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use fintrack::api::state::build_importer;
use fintrack::config::{generate_default_config, Config};
use fintrack::import::{ColumnMapping, DateOrderSetting};
use fintrack::ledger::{format_money, BudgetStatus, Ledger};
use fintrack::storage::{HoldingKind, NewTransaction, Transaction, TransactionKind, YearMonth};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fintrack-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Local-first personal finance tracker")]
#[command(long_about = "Fintrack keeps budgets with monthly rollover, net worth history and\nimported bank transactions in a local SQLite database.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the usual locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory, overriding the config
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show this month's summary
    Dashboard,

    /// Record a transaction
    Add {
        /// Amount, always positive
        amount: f64,
        /// Payee or description
        payee: String,
        /// income, expense or transfer
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: TransactionKind,
        #[arg(short, long, default_value = "Other")]
        category: String,
        /// Date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// List transactions, newest first
    List {
        /// Month (YYYY-MM)
        #[arg(short, long)]
        month: Option<YearMonth>,
        /// Show at most this many
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Delete a transaction by id
    Delete { id: String },

    /// Manage budgets
    Budget {
        #[command(subcommand)]
        action: BudgetAction,
    },

    /// Import transactions from a CSV file
    Import {
        /// Path to CSV file
        path: PathBuf,
        /// Column mapping as JSON, e.g. '{"date":0,"amount":1}'
        #[arg(long)]
        mapping: Option<String>,
        /// How to read ambiguous dates (auto, dmy, mdy)
        #[arg(long)]
        date_order: Option<DateOrderSetting>,
        /// Dry run (don't actually import)
        #[arg(long)]
        dry_run: bool,
    },

    /// Net worth, holdings and history
    Networth {
        #[command(subcommand)]
        action: Option<NetworthAction>,
    },

    /// Replay rollover processing for months not yet processed
    CatchUp,

    /// Manage savings goals
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the effective config instead of the template
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
pub enum BudgetAction {
    /// Set the budget for a category in a month
    Set {
        category: String,
        amount: f64,
        /// Month (YYYY-MM, default: current)
        #[arg(short, long)]
        month: Option<YearMonth>,
    },
    /// List budgets
    List {
        #[arg(short, long)]
        month: Option<YearMonth>,
    },
    /// Budget, rollover, spent and available per category
    Status {
        #[arg(short, long)]
        month: Option<YearMonth>,
    },
    /// Delete a budget by id (`YYYY-MM-Category`)
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum NetworthAction {
    /// Current value and history (default)
    Show,
    /// Add an asset, liability or investment
    Add {
        kind: HoldingKind,
        name: String,
        value: f64,
    },
    /// Remove a holding
    Remove { kind: HoldingKind, id: String },
    /// List holdings of one kind
    List { kind: HoldingKind },
    /// Fill missing months of history
    Rebuild,
    /// Write the history sparkline as SVG
    Sparkline {
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = "320")]
        width: f64,
        #[arg(long, default_value = "96")]
        height: f64,
    },
}

#[derive(Subcommand)]
pub enum GoalAction {
    /// List goals
    List,
    /// Create a goal
    Add {
        name: String,
        target: f64,
        /// Due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: Option<NaiveDate>,
    },
    /// Add progress; negative amounts withdraw
    Progress {
        id: String,
        #[arg(allow_hyphen_values = true)]
        amount: f64,
    },
    /// Reset progress to zero
    Reset { id: String },
    /// Delete a goal
    Delete { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.clone();
    }
    // keep stdout for command output
    if std::env::var("RUST_LOG").is_err() {
        config.logging.level = "warn".to_string();
    }
    config.logging.init();

    let json = cli.format == "json";

    if let Commands::Config { output, show } = &cli.command {
        let content = if *show {
            toml::to_string_pretty(&config)?
        } else {
            generate_default_config()
        };
        match output {
            Some(path) => {
                // Create parent directory if needed
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, &content)?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let data_dir = config.storage.data_path();
    let ledger = Ledger::open(&data_dir, config.ledger_options())
        .with_context(|| format!("opening finance store in {}", data_dir.display()))?;
    let currency = ledger.settings()?.currency;

    match cli.command {
        Commands::Dashboard => {
            let summary = ledger.dashboard().await?;
            if json {
                return print_json(&summary);
            }

            println!("{}", summary.month);
            println!();
            println!("  Income:    {:>14}", format_money(summary.income, &currency));
            println!("  Expenses:  {:>14}", format_money(summary.expenses, &currency));
            println!("  Net:       {:>14}", format_money(summary.net, &currency));
            println!("  Net worth: {:>14}", format_money(summary.net_worth, &currency));

            if !summary.budgets.is_empty() {
                println!();
                print_budget_status(&summary.budgets, &currency);
            }
            if !summary.recent_transactions.is_empty() {
                println!();
                println!("Recent transactions:");
                print_transactions(&summary.recent_transactions, &currency);
            }
        }

        Commands::Add {
            amount,
            payee,
            kind,
            category,
            date,
        } => {
            let date = date.unwrap_or_else(|| ledger.clock().today());
            let tx = ledger
                .add_transaction(NewTransaction::new(date, payee, amount, kind, category))
                .await?;
            if json {
                return print_json(&tx);
            }
            println!(
                "Added {} {} ({}) on {} [{}]",
                tx.kind,
                format_money(tx.amount, &currency),
                tx.payee,
                tx.date,
                tx.id
            );
        }

        Commands::List { month, limit } => {
            let mut transactions = ledger.transactions(month)?;
            if let Some(limit) = limit {
                transactions.truncate(limit);
            }
            if json {
                return print_json(&transactions);
            }
            if transactions.is_empty() {
                println!("No transactions yet.");
                println!();
                println!("Record one with:");
                println!("  fintrack-cli add 12.50 \"Corner Shop\" --category Groceries");
            } else {
                print_transactions(&transactions, &currency);
            }
        }

        Commands::Delete { id } => {
            let tx = ledger.delete_transaction(&id).await?;
            println!("Deleted {} {} on {}", tx.payee, format_money(tx.amount, &currency), tx.date);
        }

        Commands::Budget { action } => match action {
            BudgetAction::Set {
                category,
                amount,
                month,
            } => {
                let month = month.unwrap_or_else(|| ledger.clock().current_month());
                let budget = ledger.set_budget(month, &category, amount).await?;
                println!(
                    "Budget for {} in {}: {}",
                    budget.category,
                    budget.month,
                    format_money(budget.amount, &currency)
                );
            }
            BudgetAction::List { month } => {
                let budgets = ledger.budgets(month)?;
                if json {
                    return print_json(&budgets);
                }
                println!("{:<10} {:<16} {:>12}", "Month", "Category", "Amount");
                println!("{}", "-".repeat(40));
                for budget in budgets {
                    println!(
                        "{:<10} {:<16} {:>12}",
                        budget.month.to_string(),
                        budget.category,
                        format_money(budget.amount, &currency)
                    );
                }
            }
            BudgetAction::Status { month } => {
                ledger.ensure_rollover_processing().await?;
                let month = month.unwrap_or_else(|| ledger.clock().current_month());
                let status = ledger.budget_status(month)?;
                if json {
                    return print_json(&status);
                }
                if status.is_empty() {
                    println!("No budgets for {}", month);
                } else {
                    print_budget_status(&status, &currency);
                }
            }
            BudgetAction::Delete { id } => {
                let budget = ledger.delete_budget(&id).await?;
                println!("Deleted budget {} for {}", budget.category, budget.month);
            }
        },

        Commands::Import {
            path,
            mapping,
            date_order,
            dry_run,
        } => {
            if !path.exists() {
                bail!("File not found: {:?}", path);
            }
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let mapping: Option<ColumnMapping> = mapping
                .map(|m| serde_json::from_str(&m))
                .transpose()
                .context("parsing --mapping")?;
            if let Some(order) = date_order {
                config.import.date_order = order;
            }
            let importer = build_importer(&config, &config.storage.local_path());

            let preview = importer.preview(&text, &currency, mapping)?;
            if json && dry_run {
                return print_json(&preview);
            }

            println!("Detected columns:");
            for (i, header) in preview.headers.iter().enumerate() {
                let role = [
                    ("date", preview.mapping.date),
                    ("amount", preview.mapping.amount),
                    ("payee", preview.mapping.payee),
                    ("type", preview.mapping.kind),
                    ("category", preview.mapping.category),
                ]
                .iter()
                .find(|(_, idx)| *idx == Some(i))
                .map(|(name, _)| format!(" ({})", name))
                .unwrap_or_default();
                println!("  {}: {}{}", i, header, role);
            }
            println!();
            println!("Import preview:");
            println!("  Delimiter: {:?}", preview.delimiter);
            println!("  Dates: {}", preview.date_order.label());
            println!("  Valid rows: {}", preview.rows.len());
            println!("  Skipped: {}", preview.skipped.total());

            if !preview.errors.is_empty() {
                println!();
                println!("Errors (first 10):");
                for error in preview.errors.iter().take(10) {
                    println!("  {}", error);
                }
            }

            if dry_run {
                println!();
                println!("(Dry run - no data was imported)");
            } else {
                let summary = importer.commit(&ledger, &text, Some(preview.mapping)).await?;
                println!();
                println!("  Imported: {}", summary.imported);
                if summary.mapping_saved {
                    println!("  Mapping saved for next time");
                }
            }
        }

        Commands::Networth { action } => match action.unwrap_or(NetworthAction::Show) {
            NetworthAction::Show => {
                ledger.ensure_current_month_snapshot()?;
                let summary = ledger.net_worth_summary()?;
                if json {
                    return print_json(&summary);
                }
                println!("Net worth: {}", format_money(summary.current, &currency));
                if summary.snapshots.len() > 1 {
                    println!(
                        "Change over {} months: {}",
                        summary.snapshots.len(),
                        format_money(summary.change, &currency)
                    );
                }
                println!();
                for snapshot in &summary.snapshots {
                    println!(
                        "  {}  {:>14}",
                        snapshot.ym,
                        format_money(snapshot.net_worth, &currency)
                    );
                }
            }
            NetworthAction::Add { kind, name, value } => {
                let holding = ledger.add_holding(kind, &name, value)?;
                ledger.ensure_current_month_snapshot()?;
                println!(
                    "Added {} {}: {} [{}]",
                    kind.label().to_lowercase(),
                    holding.name,
                    format_money(holding.value, &currency),
                    holding.id
                );
            }
            NetworthAction::Remove { kind, id } => {
                ledger.delete_holding(kind, &id)?;
                ledger.ensure_current_month_snapshot()?;
                println!("Removed {} {}", kind.label().to_lowercase(), id);
            }
            NetworthAction::List { kind } => {
                let holdings = ledger.holdings(kind)?;
                if json {
                    return print_json(&holdings);
                }
                for holding in holdings {
                    println!(
                        "{:<36}  {:<20} {:>14}",
                        holding.id,
                        holding.name,
                        format_money(holding.value, &currency)
                    );
                }
            }
            NetworthAction::Rebuild => {
                let filled = ledger.rebuild_history()?;
                println!("Filled {} month(s) of history", filled);
            }
            NetworthAction::Sparkline {
                output,
                width,
                height,
            } => {
                let svg = ledger.sparkline_svg(width, height, &config.theme)?;
                match output {
                    Some(path) => {
                        std::fs::write(&path, svg)?;
                        println!("Sparkline written to {:?}", path);
                    }
                    None => println!("{}", svg),
                }
            }
        },

        Commands::CatchUp => {
            let report = ledger.ensure_rollover_processing().await?;
            if json {
                return print_json(&report);
            }
            if !report.enabled {
                println!("Rollover is disabled");
            } else if report.months_processed == 0 {
                println!("Rollovers are up to date through {}", report.through);
            } else {
                println!(
                    "Processed {} month(s) through {}",
                    report.months_processed, report.through
                );
            }
        }

        Commands::Goal { action } => match action {
            GoalAction::List => {
                let goals = ledger.goals()?;
                if json {
                    return print_json(&goals);
                }
                if goals.is_empty() {
                    println!("No goals yet.");
                }
                for goal in goals {
                    let due = goal
                        .due
                        .map(|d| format!(" due {}", d))
                        .unwrap_or_default();
                    println!(
                        "{:<20} {:>12} / {:<12} {:>5.1}%{}  [{}]",
                        goal.name,
                        format_money(goal.progress, &currency),
                        format_money(goal.target, &currency),
                        goal.completion() * 100.0,
                        due,
                        goal.id
                    );
                }
            }
            GoalAction::Add { name, target, due } => {
                let goal = ledger.add_goal(&name, target, due)?;
                println!("Created goal {} [{}]", goal.name, goal.id);
            }
            GoalAction::Progress { id, amount } => {
                let goal = ledger.add_goal_progress(&id, amount)?;
                println!(
                    "{}: {} of {}",
                    goal.name,
                    format_money(goal.progress, &currency),
                    format_money(goal.target, &currency)
                );
            }
            GoalAction::Reset { id } => {
                let goal = ledger.reset_goal(&id)?;
                println!("Reset {}", goal.name);
            }
            GoalAction::Delete { id } => {
                ledger.delete_goal(&id)?;
                println!("Deleted goal {}", id);
            }
        },

        Commands::Config { .. } => {}
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_transactions(transactions: &[Transaction], currency: &str) {
    println!(
        "{:<12} {:<24} {:<10} {:<14} {:>12}",
        "Date", "Payee", "Type", "Category", "Amount"
    );
    println!("{}", "-".repeat(76));

    for tx in transactions {
        let signed = match tx.kind {
            TransactionKind::Expense => -tx.amount,
            _ => tx.amount,
        };
        println!(
            "{:<12} {:<24} {:<10} {:<14} {:>12}",
            tx.date.to_string(),
            truncate(&tx.payee, 24),
            tx.kind.as_str(),
            truncate(&tx.category, 14),
            format_money(signed, currency)
        );
    }
}

fn print_budget_status(status: &[BudgetStatus], currency: &str) {
    println!(
        "{:<16} {:>12} {:>12} {:>12} {:>12} {:>6}",
        "Category", "Budget", "Rollover", "Spent", "Available", "Used"
    );
    println!("{}", "-".repeat(76));

    for row in status {
        let marker = if row.is_overspent() { " !" } else { "" };
        println!(
            "{:<16} {:>12} {:>12} {:>12} {:>12} {:>5.0}%{}",
            truncate(&row.category, 16),
            format_money(row.budgeted, currency),
            format_money(row.rollover, currency),
            format_money(row.spent, currency),
            format_money(row.available, currency),
            row.percent_used,
            marker
        );
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
