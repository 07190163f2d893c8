//! Expense records.
//!
//! An [`Expense`] belongs to exactly one user for its whole life. Rows are
//! created and deleted, never edited. Amounts are stored as integer cents.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Category, EngineError, MoneyCents, ResultEngine, UserId};

/// Surrogate id of an expense, unique across all users.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(pub i64);

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub category: Category,
    pub amount: MoneyCents,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input of [`Engine::add_expense`](crate::Engine::add_expense).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub category: Category,
    pub amount: MoneyCents,
    pub description: Option<String>,
}

impl NewExpense {
    /// A blank description is stored as no description.
    pub fn new(
        date: NaiveDate,
        category: Category,
        amount: MoneyCents,
        description: Option<&str>,
    ) -> Self {
        Self {
            date,
            category,
            amount,
            description: description
                .filter(|text| !text.trim().is_empty())
                .map(ToString::to_string),
        }
    }

    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if !self.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        if self.amount > MoneyCents::MAX_EXPENSE {
            return Err(EngineError::InvalidAmount(format!(
                "amount must be at most {}",
                MoneyCents::MAX_EXPENSE
            )));
        }
        Ok(())
    }
}

/// Outcome of a delete request.
///
/// A missing id and an id owned by another user are reported the same way,
/// and neither is an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deletion {
    Removed,
    NotFoundOrUnauthorized,
}

impl Deletion {
    pub fn is_removed(self) -> bool {
        matches!(self, Self::Removed)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub date: Date,
    pub category: String,
    /// Integer cents.
    pub amount: i64,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn new(user_id: UserId, expense: &NewExpense, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(user_id.0),
            date: ActiveValue::Set(expense.date),
            category: ActiveValue::Set(expense.category.as_str().to_string()),
            amount: ActiveValue::Set(expense.amount.cents()),
            description: ActiveValue::Set(
                expense
                    .description
                    .clone()
                    .filter(|text| !text.trim().is_empty()),
            ),
            created_at: ActiveValue::Set(created_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ExpenseId(model.id),
            user_id: UserId(model.user_id),
            date: model.date,
            category: Category::try_from(model.category.as_str())?,
            amount: MoneyCents::new(model.amount),
            description: model.description,
            created_at: model.created_at,
        })
    }
}
