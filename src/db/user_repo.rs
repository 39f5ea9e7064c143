// src/db/user_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::users::{NewUser, User},
};

// Só o que o fluxo de pedidos precisa da tabela 'users'.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserRepository;

impl UserRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe_user = sqlx::query_as::<_, User>(
            "SELECT id, email, first_name, middle_name, last_name, created_at FROM users WHERE id = $1",
        )
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(maybe_user)
    }

    pub async fn create_user<'e, E>(&self, executor: E, new: NewUser) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, first_name, middle_name, last_name)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, first_name, middle_name, last_name, created_at
            "#,
        )
            .bind(&new.email)
            .bind(&new.first_name)
            .bind(&new.middle_name)
            .bind(&new.last_name)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::EmailAlreadyExists(new.email.clone());
                    }
                }
                e.into()
            })?;
        Ok(user)
    }
}
