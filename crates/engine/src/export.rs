//! Export adapter.
//!
//! The engine computes an [`ExportReport`] (rows plus summary figures) and
//! hands it to a [`ReportRenderer`], which turns it into an opaque byte
//! payload and a suggested file name. Spreadsheet or PDF writers live outside
//! the engine and only need to implement [`ReportRenderer`]; the CSV and JSON
//! renderers shipped here also parse their own output back.
//!
//! Descriptions are always handed over untruncated. Shortening them for a
//! fixed-width layout is up to the renderer.

use std::str::FromStr;

use chrono::{Month, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    Category, CategoryTotal, EngineError, Expense, MoneyCents, ResultEngine,
    query::validate_month, stats,
};

/// What an export covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum ExportScope {
    /// Every expense of the user, stamped with the generation date.
    All { generated_on: NaiveDate },
    /// A single calendar month.
    Month { year: i32, month: u32 },
}

impl ExportScope {
    pub fn title(&self) -> ResultEngine<String> {
        match *self {
            Self::All { .. } => Ok("Expense Report".to_string()),
            Self::Month { year, month } => {
                Ok(format!("Expense Report - {} {year}", month_name(month)?))
            }
        }
    }

    /// File name without extension.
    pub fn file_stem(&self) -> String {
        match *self {
            Self::All { generated_on } => format!("expenses_{}", generated_on.format("%Y%m%d")),
            Self::Month { year, month } => format!("report_{year}_{month:02}"),
        }
    }
}

pub(crate) fn month_name(month: u32) -> ResultEngine<&'static str> {
    validate_month(month)?;
    let month = u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or_else(|| EngineError::InvalidInput(format!("invalid month: {month}")))?;
    Ok(month.name())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    pub date: NaiveDate,
    pub category: Category,
    pub amount: MoneyCents,
    pub description: Option<String>,
}

impl From<&Expense> for ExportRow {
    fn from(expense: &Expense) -> Self {
        Self {
            date: expense.date,
            category: expense.category,
            amount: expense.amount,
            description: expense.description.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub total_spent: MoneyCents,
    pub transaction_count: u64,
    pub average_transaction: MoneyCents,
    pub category_breakdown: Vec<CategoryTotal>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportReport {
    pub title: String,
    pub scope: ExportScope,
    pub rows: Vec<ExportRow>,
    pub summary: ExportSummary,
}

impl ExportReport {
    /// Builds the report from records already restricted to `scope`. Row
    /// order follows `records`.
    pub fn build(scope: ExportScope, records: &[Expense]) -> ResultEngine<Self> {
        let overall = stats::overall_stats(records);
        Ok(Self {
            title: scope.title()?,
            scope,
            rows: records.iter().map(ExportRow::from).collect(),
            summary: ExportSummary {
                total_spent: overall.total,
                transaction_count: overall.count,
                average_transaction: overall.average,
                category_breakdown: stats::category_summary(records),
            },
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    Spreadsheet,
    Document,
}

/// Payload produced by a renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedReport {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Serializes an [`ExportReport`] into a file format.
pub trait ReportRenderer {
    fn kind(&self) -> ExportKind;

    fn render(&self, report: &ExportReport) -> ResultEngine<RenderedReport>;
}

/// Built-in renderers, selectable by name (`csv`, `json`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn renderer(self) -> Box<dyn ReportRenderer + Send + Sync> {
        match self {
            Self::Csv => Box::new(CsvRenderer),
            Self::Json => Box::new(JsonRenderer),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(EngineError::InvalidInput(format!(
                "unsupported export format: {other}"
            ))),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    category: Category,
    amount: String,
    description: Option<String>,
}

/// Spreadsheet-style export of the rows: `date,category,amount,description`
/// with amounts written as decimals (`12.50`).
///
/// An empty description reads back as `None`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CsvRenderer;

impl CsvRenderer {
    pub fn parse(bytes: &[u8]) -> ResultEngine<Vec<ExportRow>> {
        let mut reader = csv::Reader::from_reader(bytes);
        reader
            .deserialize::<CsvRow>()
            .map(|row| {
                let row = row.map_err(export_error)?;
                Ok(ExportRow {
                    date: row.date,
                    category: row.category,
                    amount: row.amount.parse()?,
                    description: row.description,
                })
            })
            .collect()
    }
}

impl ReportRenderer for CsvRenderer {
    fn kind(&self) -> ExportKind {
        ExportKind::Spreadsheet
    }

    fn render(&self, report: &ExportReport) -> ResultEngine<RenderedReport> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &report.rows {
            writer
                .serialize(CsvRow {
                    date: row.date,
                    category: row.category,
                    amount: row.amount.to_string(),
                    description: row.description.clone(),
                })
                .map_err(export_error)?;
        }
        if report.rows.is_empty() {
            writer
                .write_record(["date", "category", "amount", "description"])
                .map_err(export_error)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| EngineError::Export(err.to_string()))?;

        Ok(RenderedReport {
            file_name: format!("{}.csv", report.scope.file_stem()),
            content_type: "text/csv",
            bytes,
        })
    }
}

/// Document-style export of the whole report as JSON.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    pub fn parse(bytes: &[u8]) -> ResultEngine<ExportReport> {
        serde_json::from_slice(bytes).map_err(|err| EngineError::Export(err.to_string()))
    }
}

impl ReportRenderer for JsonRenderer {
    fn kind(&self) -> ExportKind {
        ExportKind::Document
    }

    fn render(&self, report: &ExportReport) -> ResultEngine<RenderedReport> {
        let bytes =
            serde_json::to_vec_pretty(report).map_err(|err| EngineError::Export(err.to_string()))?;
        Ok(RenderedReport {
            file_name: format!("{}.json", report.scope.file_stem()),
            content_type: "application/json",
            bytes,
        })
    }
}

fn export_error(err: csv::Error) -> EngineError {
    EngineError::Export(err.to_string())
}
