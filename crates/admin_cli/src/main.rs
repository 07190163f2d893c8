use std::{error::Error, io::Write, path::PathBuf};

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{
    Category, CategoryFilter, Engine, EngineError, Expense, ExpenseFilter, ExpenseId,
    ExportFormat, ExportScope, MoneyCents, NewExpense, RecencyWindow, SortOrder, UserId,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "spesa_admin")]
#[command(about = "Admin utilities for Spesa (users, expenses, reports)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./spesa.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Expense(ExpenseCmd),
    Report(Report),
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: Option<String>,
}

/// Account a user-scoped command runs as. The password is prompted.
#[derive(Args, Debug)]
struct Login {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct ExpenseCmd {
    #[command(subcommand)]
    command: ExpenseCommand,
}

#[derive(Subcommand, Debug)]
enum ExpenseCommand {
    Add(ExpenseAddArgs),
    List(ExpenseListArgs),
    Delete(ExpenseDeleteArgs),
}

#[derive(Args, Debug)]
struct ExpenseAddArgs {
    #[command(flatten)]
    login: Login,
    /// Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    category: Category,
    /// Decimal amount, e.g. `12.50`.
    #[arg(long)]
    amount: MoneyCents,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args, Debug)]
struct ExpenseListArgs {
    #[command(flatten)]
    login: Login,
    /// Category name, or `All`.
    #[arg(long, default_value = "All")]
    category: CategoryFilter,
    /// `all`, `7`, `30` or `90`.
    #[arg(long, default_value = "all")]
    period: RecencyWindow,
    /// `date_newest`, `date_oldest`, `amount_high_low` or `amount_low_high`.
    #[arg(long, default_value = "date_newest")]
    sort: SortOrder,
}

#[derive(Args, Debug)]
struct ExpenseDeleteArgs {
    #[command(flatten)]
    login: Login,
    #[arg(long)]
    id: i64,
}

#[derive(Args, Debug)]
struct Report {
    #[command(subcommand)]
    command: ReportCommand,
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    Month(ReportMonthArgs),
    Dashboard(Login),
}

#[derive(Args, Debug)]
struct ReportMonthArgs {
    #[command(flatten)]
    login: Login,
    #[arg(long)]
    year: i32,
    #[arg(long)]
    month: u32,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    login: Login,
    /// `csv` or `json`.
    #[arg(long, default_value = "csv")]
    kind: ExportFormat,
    /// Output file, or a directory to write the suggested file name into.
    #[arg(long)]
    out: PathBuf,
    #[arg(long, requires = "month")]
    year: Option<i32>,
    #[arg(long, requires = "year")]
    month: Option<u32>,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Prompts for the password of `login` and resolves the account.
async fn login(engine: &Engine, login: &Login) -> Result<UserId, Box<dyn Error + Send + Sync>> {
    let password = prompt_password(&format!("Password for {}: ", login.username))?;
    let user_id = engine.authenticate(&login.username, &password).await?;
    match user_id {
        Some(user_id) => {
            tracing::debug!(%user_id, "authenticated");
            Ok(user_id)
        }
        None => {
            tracing::warn!(username = %login.username, "authentication failed");
            Err("invalid username or password".into())
        }
    }
}

fn print_expenses(expenses: &[Expense]) {
    println!(
        "{:>6}  {:<10}  {:<13}  {:>10}  description",
        "id", "date", "category", "amount"
    );
    for expense in expenses {
        println!(
            "{:>6}  {:<10}  {:<13}  {:>10}  {}",
            expense.id,
            expense.date,
            expense.category,
            expense.amount,
            expense.description.as_deref().unwrap_or("")
        );
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing::debug!(command = ?cli.command, "running admin command");
    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;
            match engine
                .create_user(&args.username, &password, args.email.as_deref())
                .await
            {
                Ok(id) => println!("created user: {} ({id})", args.username),
                Err(EngineError::DuplicateUsername(username)) => {
                    return Err(format!("user already exists: {username}").into());
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Expense(ExpenseCmd { command }) => match command {
            ExpenseCommand::Add(args) => {
                let user_id = login(&engine, &args.login).await?;
                let date = args.date.unwrap_or_else(|| Utc::now().date_naive());
                let expense =
                    NewExpense::new(date, args.category, args.amount, args.description.as_deref());
                let id = engine.add_expense(user_id, expense).await?;
                println!("added expense {id}: {} {} on {date}", args.category, args.amount);
            }
            ExpenseCommand::List(args) => {
                let user_id = login(&engine, &args.login).await?;
                let filter = ExpenseFilter {
                    category: args.category,
                    since_days: args.period.days(),
                };
                let expenses = engine
                    .filtered_expenses(user_id, &filter, args.sort, Utc::now().naive_utc())
                    .await?;
                print_expenses(&expenses);
                let total: MoneyCents = expenses.iter().map(|e| e.amount).sum();
                println!("{} expenses, total {total}", expenses.len());
            }
            ExpenseCommand::Delete(args) => {
                let user_id = login(&engine, &args.login).await?;
                let deletion = engine.delete_expense(user_id, ExpenseId(args.id)).await?;
                if !deletion.is_removed() {
                    return Err("invalid id or permission denied".into());
                }
                println!("deleted expense {}", args.id);
            }
        },
        Command::Report(Report { command }) => match command {
            ReportCommand::Month(args) => {
                let user_id = login(&engine, &args.login).await?;
                let report = engine
                    .monthly_report(user_id, args.month, args.year)
                    .await?;
                if report.is_empty() {
                    println!("no expenses in {}-{:02}", args.year, args.month);
                    return Ok(());
                }
                println!(
                    "total {}  count {}  average {}",
                    report.stats.total, report.stats.count, report.stats.average
                );
                for category in &report.categories {
                    println!(
                        "{:<13} {:>10} {:>4} {:>6.2}%",
                        category.category, category.total, category.count, category.percentage
                    );
                }
                println!("top expenses:");
                print_expenses(&report.top);
            }
            ReportCommand::Dashboard(args) => {
                let user_id = login(&engine, &args).await?;
                let dashboard = engine.dashboard(user_id, Utc::now().naive_utc()).await?;
                println!(
                    "total {}  count {}  average {}  last 30 days {}",
                    dashboard.stats.total,
                    dashboard.stats.count,
                    dashboard.stats.average,
                    dashboard.last_30_days_total
                );
                for category in &dashboard.categories {
                    println!(
                        "{:<13} {:>10} {:>6.2}%",
                        category.category, category.total, category.percentage
                    );
                }
                for day in &dashboard.daily {
                    println!("{}  {:>10}", day.date, day.total);
                }
            }
        },
        Command::Export(args) => {
            let user_id = login(&engine, &args.login).await?;
            let scope = match (args.year, args.month) {
                (Some(year), Some(month)) => ExportScope::Month { year, month },
                _ => ExportScope::All {
                    generated_on: Utc::now().date_naive(),
                },
            };
            let report = engine.export_report(user_id, scope).await?;
            let rendered = args.kind.renderer().render(&report)?;
            let path = if args.out.is_dir() {
                args.out.join(&rendered.file_name)
            } else {
                args.out
            };
            std::fs::write(&path, &rendered.bytes)?;
            println!(
                "exported {} expenses to {}",
                report.rows.len(),
                path.display()
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
