use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignUp {
        pub username: String,
        pub password: String,
        pub email: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserCreated {
        pub id: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Me {
        pub id: i64,
        pub username: String,
        pub email: Option<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub date: NaiveDate,
        /// One of the category names (`Food`, `Transport`, ...).
        pub category: String,
        /// Must be > 0.
        pub amount_minor: i64,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub id: i64,
    }

    /// Query string of `GET /expenses`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseList {
        /// Category name, or `All`.
        pub category: Option<String>,
        /// Keep only the last `days` days.
        pub days: Option<u32>,
        /// `date_newest` (default), `date_oldest`, `amount_high_low`,
        /// `amount_low_high`.
        pub sort: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: i64,
        pub date: NaiveDate,
        pub category: String,
        pub amount_minor: i64,
        pub description: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
        /// Sum of the listed amounts.
        pub total_minor: i64,
    }
}

pub mod stats {
    use super::*;

    /// Query string of `GET /stats/daily`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DailyQuery {
        /// Number of most recent dates with data (default 30).
        pub window: Option<usize>,
    }
}

pub mod export {
    use super::*;

    /// Query string of `GET /export`.
    ///
    /// Without `year`/`month` every expense is exported.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExportQuery {
        /// `csv` (default) or `json`.
        pub kind: Option<String>,
        pub year: Option<i32>,
        pub month: Option<u32>,
    }
}
