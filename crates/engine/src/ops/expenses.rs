use chrono::{NaiveDateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Deletion, EngineError, Expense, ExpenseFilter, ExpenseId, NewExpense, ResultEngine, SortOrder,
    UserId, expenses, query, users,
};

use super::{Engine, with_tx};

impl Engine {
    /// Stores a new expense for `user_id` and returns its id.
    ///
    /// Validation happens before the write: a non-positive amount is rejected
    /// with [`EngineError::InvalidAmount`].
    pub async fn add_expense(&self, user_id: UserId, expense: NewExpense) -> ResultEngine<ExpenseId> {
        expense.validate()?;

        let id = with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(user_id.0)
                .one(&db_tx)
                .await?
                .is_none()
            {
                return Err(EngineError::KeyNotFound("user not exists".to_string()));
            }

            let model = expenses::ActiveModel::new(user_id, &expense, Utc::now())
                .insert(&db_tx)
                .await?;
            Ok::<_, EngineError>(ExpenseId(model.id))
        })?;

        tracing::debug!(user_id = %user_id, expense_id = %id, "added expense");
        Ok(id)
    }

    /// Lists every expense owned by `user_id`, most recent date first.
    ///
    /// Rows sharing a date come newest insert first. Unknown users simply
    /// have no rows.
    pub async fn list_expenses(&self, user_id: UserId) -> ResultEngine<Vec<Expense>> {
        expenses::Entity::find()
            .filter(expenses::Column::UserId.eq(user_id.0))
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect()
    }

    /// Returns one expense if it exists and belongs to `user_id`.
    pub async fn expense(
        &self,
        user_id: UserId,
        expense_id: ExpenseId,
    ) -> ResultEngine<Option<Expense>> {
        expenses::Entity::find_by_id(expense_id.0)
            .filter(expenses::Column::UserId.eq(user_id.0))
            .one(&self.database)
            .await?
            .map(Expense::try_from)
            .transpose()
    }

    /// Deletes an expense owned by `user_id`.
    ///
    /// Ids that do not exist or belong to someone else are left alone and
    /// reported as [`Deletion::NotFoundOrUnauthorized`].
    pub async fn delete_expense(
        &self,
        user_id: UserId,
        expense_id: ExpenseId,
    ) -> ResultEngine<Deletion> {
        let result = expenses::Entity::delete_many()
            .filter(expenses::Column::Id.eq(expense_id.0))
            .filter(expenses::Column::UserId.eq(user_id.0))
            .exec(&self.database)
            .await?;

        if result.rows_affected > 0 {
            tracing::debug!(user_id = %user_id, expense_id = %expense_id, "deleted expense");
            Ok(Deletion::Removed)
        } else {
            Ok(Deletion::NotFoundOrUnauthorized)
        }
    }

    /// Lists the user's expenses after applying `filter`, then `sort`.
    pub async fn filtered_expenses(
        &self,
        user_id: UserId,
        filter: &ExpenseFilter,
        sort: SortOrder,
        now: NaiveDateTime,
    ) -> ResultEngine<Vec<Expense>> {
        let records = self.list_expenses(user_id).await?;
        let filtered = query::filter(&records, filter, now);
        Ok(sort.apply(&filtered))
    }

    /// Lists the user's expenses dated within `month` of `year`, most recent first.
    pub async fn monthly_expenses(
        &self,
        user_id: UserId,
        month: u32,
        year: i32,
    ) -> ResultEngine<Vec<Expense>> {
        query::validate_month(month)?;
        let records = self.list_expenses(user_id).await?;
        query::month_slice(&records, month, year)
    }
}
