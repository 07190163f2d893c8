//! Read-side views combining the store with [`query`] and [`stats`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    CategoryTotal, DailyTotal, Expense, ExpenseFilter, ExportReport, ExportScope, MoneyCents,
    MonthlyTotal, OverallStats, ResultEngine, UserId, query, stats,
};

use super::Engine;

/// Window of the dashboard's daily trend, in dates with data.
const DASHBOARD_DAILY_WINDOW: usize = 30;
/// Recency window of the dashboard's "last days" total, in calendar days.
const DASHBOARD_RECENT_DAYS: u32 = 30;
/// Length of the ranking in a monthly report.
const MONTHLY_TOP: usize = 5;

/// Overview of all of a user's spending.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub stats: OverallStats,
    pub last_30_days_total: MoneyCents,
    pub categories: Vec<CategoryTotal>,
    pub daily: Vec<DailyTotal>,
}

/// Spending in one calendar month.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub expenses: Vec<Expense>,
    pub stats: OverallStats,
    /// Percentages are shares of the month's total.
    pub categories: Vec<CategoryTotal>,
    pub top: Vec<Expense>,
}

impl MonthlyReport {
    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }
}

impl Engine {
    pub async fn category_summary(&self, user_id: UserId) -> ResultEngine<Vec<CategoryTotal>> {
        let records = self.list_expenses(user_id).await?;
        Ok(stats::category_summary(&records))
    }

    pub async fn overall_stats(&self, user_id: UserId) -> ResultEngine<OverallStats> {
        let records = self.list_expenses(user_id).await?;
        Ok(stats::overall_stats(&records))
    }

    pub async fn monthly_series(&self, user_id: UserId) -> ResultEngine<Vec<MonthlyTotal>> {
        let records = self.list_expenses(user_id).await?;
        Ok(stats::monthly_series(&records))
    }

    pub async fn daily_series(
        &self,
        user_id: UserId,
        window_days: usize,
    ) -> ResultEngine<Vec<DailyTotal>> {
        let records = self.list_expenses(user_id).await?;
        Ok(stats::daily_series(&records, window_days))
    }

    pub async fn dashboard(&self, user_id: UserId, now: NaiveDateTime) -> ResultEngine<Dashboard> {
        let records = self.list_expenses(user_id).await?;
        let recent = query::filter(
            &records,
            &ExpenseFilter {
                since_days: Some(DASHBOARD_RECENT_DAYS),
                ..ExpenseFilter::default()
            },
            now,
        );

        Ok(Dashboard {
            stats: stats::overall_stats(&records),
            last_30_days_total: stats::total(&recent),
            categories: stats::category_summary(&records),
            daily: stats::daily_series(&records, DASHBOARD_DAILY_WINDOW),
        })
    }

    pub async fn monthly_report(
        &self,
        user_id: UserId,
        month: u32,
        year: i32,
    ) -> ResultEngine<MonthlyReport> {
        let expenses = self.monthly_expenses(user_id, month, year).await?;
        Ok(MonthlyReport {
            year,
            month,
            stats: stats::overall_stats(&expenses),
            categories: stats::category_summary(&expenses),
            top: stats::top_n(&expenses, MONTHLY_TOP),
            expenses,
        })
    }

    /// Builds the export representation for `scope`, rows most recent first.
    pub async fn export_report(
        &self,
        user_id: UserId,
        scope: ExportScope,
    ) -> ResultEngine<ExportReport> {
        let records = match scope {
            ExportScope::All { .. } => self.list_expenses(user_id).await?,
            ExportScope::Month { year, month } => {
                self.monthly_expenses(user_id, month, year).await?
            }
        };
        ExportReport::build(scope, &records)
    }
}
