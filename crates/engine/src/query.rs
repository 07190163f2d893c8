//! Filtering, slicing and sorting of a user's expenses.
//!
//! Everything here is a pure function over an already-loaded sequence
//! (normally the date-descending output of
//! [`Engine::list_expenses`](crate::Engine::list_expenses)). Inputs are never
//! mutated and relative order is preserved unless the function sorts.

use std::{cmp::Ordering, str::FromStr};

use chrono::{Datelike, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::{CategoryFilter, EngineError, Expense, ResultEngine};

/// Filters for [`filter`]. The default keeps everything.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub category: CategoryFilter,
    /// Keep only the last `n` days. `None` and `Some(0)` disable the filter.
    pub since_days: Option<u32>,
}

impl ExpenseFilter {
    pub fn is_empty(&self) -> bool {
        self.category == CategoryFilter::All && self.since_days.unwrap_or(0) == 0
    }
}

/// Applies the category and recency filters (logical AND).
///
/// A record passes the recency filter when its date, taken at midnight, is
/// not before `now - since_days`.
pub fn filter(records: &[Expense], filter: &ExpenseFilter, now: NaiveDateTime) -> Vec<Expense> {
    if filter.is_empty() {
        return records.to_vec();
    }

    let cutoff = filter
        .since_days
        .filter(|days| *days > 0)
        .map(|days| {
            now.checked_sub_signed(TimeDelta::days(i64::from(days)))
                .unwrap_or(NaiveDateTime::MIN)
        });

    records
        .iter()
        .filter(|expense| filter.category.matches(expense.category))
        .filter(|expense| match cutoff {
            Some(cutoff) => expense.date.and_time(NaiveTime::MIN) >= cutoff,
            None => true,
        })
        .cloned()
        .collect()
}

/// Keeps the records dated within `month` (1-12) of `year`.
pub fn month_slice(records: &[Expense], month: u32, year: i32) -> ResultEngine<Vec<Expense>> {
    validate_month(month)?;
    Ok(records
        .iter()
        .filter(|expense| expense.date.month() == month && expense.date.year() == year)
        .cloned()
        .collect())
}

pub(crate) fn validate_month(month: u32) -> ResultEngine<()> {
    if !(1..=12).contains(&month) {
        return Err(EngineError::InvalidInput(format!(
            "month must be between 1 and 12, got {month}"
        )));
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Date,
    Amount,
}

/// Returns a stably sorted copy of `records`.
pub fn sort_by(records: &[Expense], key: SortKey, ascending: bool) -> Vec<Expense> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        let ord = compare(a, b, key);
        if ascending { ord } else { ord.reverse() }
    });
    sorted
}

fn compare(a: &Expense, b: &Expense, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => a.date.cmp(&b.date),
        SortKey::Amount => a.amount.cmp(&b.amount),
    }
}

/// Sort presets offered by listing views.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    DateNewest,
    DateOldest,
    AmountHighLow,
    AmountLowHigh,
}

impl SortOrder {
    pub fn key(self) -> SortKey {
        match self {
            Self::DateNewest | Self::DateOldest => SortKey::Date,
            Self::AmountHighLow | Self::AmountLowHigh => SortKey::Amount,
        }
    }

    pub fn ascending(self) -> bool {
        matches!(self, Self::DateOldest | Self::AmountLowHigh)
    }

    pub fn apply(self, records: &[Expense]) -> Vec<Expense> {
        sort_by(records, self.key(), self.ascending())
    }
}

impl FromStr for SortOrder {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date_newest" | "date-newest" => Ok(Self::DateNewest),
            "date_oldest" | "date-oldest" => Ok(Self::DateOldest),
            "amount_high_low" | "amount-high-low" => Ok(Self::AmountHighLow),
            "amount_low_high" | "amount-low-high" => Ok(Self::AmountLowHigh),
            other => Err(EngineError::InvalidInput(format!(
                "invalid sort order: {other}"
            ))),
        }
    }
}

/// Time period presets offered by listing views.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecencyWindow {
    #[default]
    AllTime,
    Last7Days,
    Last30Days,
    Last90Days,
}

impl RecencyWindow {
    pub fn days(self) -> Option<u32> {
        match self {
            Self::AllTime => None,
            Self::Last7Days => Some(7),
            Self::Last30Days => Some(30),
            Self::Last90Days => Some(90),
        }
    }
}

impl FromStr for RecencyWindow {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" | "all-time" => Ok(Self::AllTime),
            "7" | "last-7-days" => Ok(Self::Last7Days),
            "30" | "last-30-days" => Ok(Self::Last30Days),
            "90" | "last-90-days" => Ok(Self::Last90Days),
            other => Err(EngineError::InvalidInput(format!(
                "invalid time period: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::{Category, ExpenseId, MoneyCents, UserId};

    fn expense(id: i64, date: (i32, u32, u32), category: Category, cents: i64) -> Expense {
        Expense {
            id: ExpenseId(id),
            user_id: UserId(1),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            category,
            amount: MoneyCents::new(cents),
            description: None,
            created_at: Utc::now(),
        }
    }

    fn ids(records: &[Expense]) -> Vec<i64> {
        records.iter().map(|e| e.id.0).collect()
    }

    fn sample() -> Vec<Expense> {
        vec![
            expense(4, (2024, 3, 10), Category::Food, 500),
            expense(3, (2024, 2, 1), Category::Transport, 3000),
            expense(2, (2024, 1, 20), Category::Food, 750),
            expense(1, (2024, 1, 5), Category::Food, 1250),
        ]
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn empty_filter_returns_input() {
        let records = sample();
        let out = filter(&records, &ExpenseFilter::default(), at(2024, 3, 10, 12));
        assert_eq!(out, records);
    }

    #[test]
    fn category_filter_is_exact_and_keeps_order() {
        let out = filter(
            &sample(),
            &ExpenseFilter {
                category: CategoryFilter::Only(Category::Food),
                since_days: None,
            },
            at(2024, 3, 10, 12),
        );
        assert_eq!(ids(&out), vec![4, 2, 1]);
    }

    #[test]
    fn recency_compares_midnight_against_now_minus_days() {
        // cutoff = 2024-01-20 12:00, so 2024-01-20 itself falls out.
        let out = filter(
            &sample(),
            &ExpenseFilter {
                category: CategoryFilter::All,
                since_days: Some(50),
            },
            at(2024, 3, 10, 12),
        );
        assert_eq!(ids(&out), vec![4, 3]);

        // At midnight the boundary date is kept.
        let out = filter(
            &sample(),
            &ExpenseFilter {
                category: CategoryFilter::All,
                since_days: Some(50),
            },
            at(2024, 3, 10, 0),
        );
        assert_eq!(ids(&out), vec![4, 3, 2]);
    }

    #[test]
    fn filters_compose_with_and() {
        let out = filter(
            &sample(),
            &ExpenseFilter {
                category: CategoryFilter::Only(Category::Food),
                since_days: Some(50),
            },
            at(2024, 3, 10, 12),
        );
        assert_eq!(ids(&out), vec![4]);
    }

    #[test]
    fn month_slice_selects_month_and_year() {
        let mut records = sample();
        records.push(expense(0, (2023, 1, 15), Category::Bills, 100));
        let january = month_slice(&records, 1, 2024).unwrap();
        assert_eq!(ids(&january), vec![2, 1]);
        assert!(month_slice(&records, 6, 2024).unwrap().is_empty());
        assert!(matches!(
            month_slice(&records, 13, 2024),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn sort_is_stable_and_leaves_input_alone() {
        let records = vec![
            expense(1, (2024, 1, 1), Category::Food, 100),
            expense(2, (2024, 1, 2), Category::Food, 300),
            expense(3, (2024, 1, 3), Category::Food, 100),
        ];
        let asc = sort_by(&records, SortKey::Amount, true);
        assert_eq!(ids(&asc), vec![1, 3, 2]);
        let desc = sort_by(&records, SortKey::Amount, false);
        assert_eq!(ids(&desc), vec![2, 1, 3]);
        assert_eq!(ids(&records), vec![1, 2, 3]);

        assert_eq!(ids(&SortOrder::DateOldest.apply(&sample())), vec![1, 2, 3, 4]);
    }

    #[test]
    fn presets_parse() {
        assert_eq!("amount-high-low".parse::<SortOrder>().unwrap(), SortOrder::AmountHighLow);
        assert_eq!("30".parse::<RecencyWindow>().unwrap().days(), Some(30));
        assert!("weekly".parse::<RecencyWindow>().is_err());
    }
}
