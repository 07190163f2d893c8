//! Expense persistence and aggregation engine.
//!
//! [`Engine`] owns the database connection and exposes the record store
//! (add/list/delete expenses) and the user store (signup/authenticate). The
//! [`query`] and [`stats`] modules are pure functions over loaded records,
//! and [`export`] defines the hand-off to file renderers.
//!
//! Every call that touches expenses takes the caller's [`UserId`]
//! explicitly; reads and deletes are scoped to that user inside SQL.

pub use category::{Category, CategoryFilter};
pub use error::EngineError;
pub use expenses::{Deletion, Expense, ExpenseId, NewExpense};
pub use export::{
    CsvRenderer, ExportFormat, ExportKind, ExportReport, ExportRow, ExportScope, ExportSummary,
    JsonRenderer, RenderedReport, ReportRenderer,
};
pub use money::MoneyCents;
pub use ops::{Dashboard, Engine, EngineBuilder, MonthlyReport};
pub use query::{ExpenseFilter, RecencyWindow, SortKey, SortOrder};
pub use stats::{CategoryTotal, DailyTotal, MonthlyTotal, OverallStats, YearMonth};
pub use users::{User, UserId};

mod category;
mod error;
mod expenses;
pub mod export;
mod money;
mod ops;
mod password;
pub mod query;
pub mod stats;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
