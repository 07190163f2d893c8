//! Aggregations over a user's expenses.
//!
//! These are pure functions: callers load records from the store and pass
//! them in. Nothing is cached between calls.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Category, Expense, MoneyCents, money::div_round_half_even};

/// Share of one category in a set of expenses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: MoneyCents,
    pub count: u64,
    /// Percentage of the grand total, rounded to 2 decimals.
    pub percentage: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallStats {
    pub total: MoneyCents,
    pub count: u64,
    /// `total / count` to the nearest cent; zero for an empty set.
    pub average: MoneyCents,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: MoneyCents,
}

/// A calendar month, ordered chronologically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: YearMonth,
    pub total: MoneyCents,
}

/// Per-category totals, counts and percentages.
///
/// Sorted by total descending, ties by category name ascending. Empty input
/// gives an empty summary.
pub fn category_summary(records: &[Expense]) -> Vec<CategoryTotal> {
    let mut groups: HashMap<Category, (MoneyCents, u64)> = HashMap::new();
    for expense in records {
        let entry = groups
            .entry(expense.category)
            .or_insert((MoneyCents::ZERO, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    let grand_total: MoneyCents = groups.values().map(|(total, _)| *total).sum();

    let mut summary: Vec<CategoryTotal> = groups
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category,
            total,
            count,
            percentage: percentage_of(total, grand_total),
        })
        .collect();

    summary.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category.as_str().cmp(b.category.as_str()))
    });
    summary
}

/// `100 * part / whole` rounded half to even at 2 decimals, computed on
/// integers.
fn percentage_of(part: MoneyCents, whole: MoneyCents) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    let basis_points =
        div_round_half_even(i128::from(part.cents()) * 10_000, i128::from(whole.cents()));
    basis_points as f64 / 100.0
}

pub fn overall_stats(records: &[Expense]) -> OverallStats {
    let total: MoneyCents = records.iter().map(|e| e.amount).sum();
    let count = records.len() as u64;
    OverallStats {
        total,
        count,
        average: total.div_round(count),
    }
}

/// Daily totals for the most recent `window_days` dates **that have data**,
/// ascending by date.
pub fn daily_series(records: &[Expense], window_days: usize) -> Vec<DailyTotal> {
    let mut by_date: BTreeMap<NaiveDate, MoneyCents> = BTreeMap::new();
    for expense in records {
        *by_date.entry(expense.date).or_default() += expense.amount;
    }

    let skip = by_date.len().saturating_sub(window_days);
    by_date
        .into_iter()
        .skip(skip)
        .map(|(date, total)| DailyTotal { date, total })
        .collect()
}

/// Totals per calendar month, ascending.
pub fn monthly_series(records: &[Expense]) -> Vec<MonthlyTotal> {
    let mut by_month: BTreeMap<YearMonth, MoneyCents> = BTreeMap::new();
    for expense in records {
        *by_month.entry(YearMonth::of(expense.date)).or_default() += expense.amount;
    }
    by_month
        .into_iter()
        .map(|(month, total)| MonthlyTotal { month, total })
        .collect()
}

/// The `n` largest expenses by amount, descending. Equal amounts keep their
/// input order.
pub fn top_n(records: &[Expense], n: usize) -> Vec<Expense> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| b.amount.cmp(&a.amount));
    ranked.truncate(n);
    ranked
}

/// Sum of amounts, for views that only need the figure.
pub fn total(records: &[Expense]) -> MoneyCents {
    records.iter().map(|e| e.amount).sum()
}
