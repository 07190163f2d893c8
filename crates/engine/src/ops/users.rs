use chrono::Utc;
use sea_orm::{ActiveValue, DbErr, QueryFilter, SqlErr, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, User, UserId,
    password::{hash_password, verify_password},
    users,
};

use super::{Engine, normalize_optional_text, require_non_blank, with_tx};

impl Engine {
    /// Registers a new account and returns its id.
    ///
    /// The password is hashed before anything touches the database. A taken
    /// username yields [`EngineError::DuplicateUsername`] and writes nothing.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> ResultEngine<UserId> {
        require_non_blank(username, "username")?;
        if password.is_empty() {
            return Err(EngineError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        let password_hash = hash_password(password)?;
        let email = normalize_optional_text(email);

        let id = with_tx!(self, |db_tx| {
            let existing = users::Entity::find()
                .filter(users::Column::Username.eq(username))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::DuplicateUsername(username.to_string()));
            }

            let model = users::ActiveModel {
                id: ActiveValue::NotSet,
                username: ActiveValue::Set(username.to_string()),
                password_hash: ActiveValue::Set(password_hash),
                email: ActiveValue::Set(email),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await
            .map_err(|err| duplicate_or_db(err, username))?;

            Ok::<_, EngineError>(UserId(model.id))
        })?;

        tracing::info!(user_id = %id, "created user");
        Ok(id)
    }

    /// Resolves credentials to a user id.
    ///
    /// Unknown usernames and wrong passwords both return `Ok(None)`.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<Option<UserId>> {
        let Some(user) = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.database)
            .await?
        else {
            return Ok(None);
        };

        if verify_password(password, &user.password_hash)? {
            Ok(Some(UserId(user.id)))
        } else {
            Ok(None)
        }
    }

    /// Returns the public profile of a user.
    pub async fn user(&self, user_id: UserId) -> ResultEngine<Option<User>> {
        let model = users::Entity::find_by_id(user_id.0)
            .one(&self.database)
            .await?;
        Ok(model.map(User::from))
    }
}

/// A concurrent signup can still hit the unique index after the lookup.
fn duplicate_or_db(err: DbErr, username: &str) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            EngineError::DuplicateUsername(username.to_string())
        }
        _ => EngineError::Database(err),
    }
}
