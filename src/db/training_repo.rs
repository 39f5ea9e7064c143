// src/db/training_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::training::{
        DentalTraining, DentalTrainingRegistration, Event, EventRegistration, NewDentalTraining, NewEvent,
    },
};

#[derive(Debug, Clone, Copy, Default)]
pub struct TrainingRepository;

impl TrainingRepository {
    pub fn new() -> Self {
        Self
    }

    // --- Treinamentos ---

    pub async fn find_training<'e, E>(&self, executor: E, id: i32) -> Result<Option<DentalTraining>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let training = sqlx::query_as::<_, DentalTraining>(
            r#"
            SELECT id, title, description, date, location, price, capacity
            FROM dental_trainings
            WHERE id = $1
            FOR UPDATE
            "#,
        )
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(training)
    }

    pub async fn update_capacity<'e, E>(&self, executor: E, id: i32, capacity: Option<i32>) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE dental_trainings SET capacity = $2 WHERE id = $1")
            .bind(id)
            .bind(capacity)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::TrainingNotFound(id));
        }
        Ok(())
    }

    pub async fn insert_training<'e, E>(&self, executor: E, new: NewDentalTraining) -> Result<DentalTraining, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let training = sqlx::query_as::<_, DentalTraining>(
            r#"
            INSERT INTO dental_trainings (title, description, date, location, price, capacity)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, description, date, location, price, capacity
            "#,
        )
            .bind(&new.title)
            .bind(&new.description)
            .bind(new.date)
            .bind(&new.location)
            .bind(new.price)
            .bind(new.capacity)
            .fetch_one(executor)
            .await?;
        Ok(training)
    }

    // --- Inscrições em treinamentos ---

    pub async fn find_registration<'e, E>(
        &self,
        executor: E,
        user_id: i32,
        training_id: i32,
    ) -> Result<Option<DentalTrainingRegistration>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let registration = sqlx::query_as::<_, DentalTrainingRegistration>(
            r#"
            SELECT id, user_id, dental_training_id, order_id, confirmed, registered_at
            FROM dental_training_registrations
            WHERE user_id = $1 AND dental_training_id = $2
            "#,
        )
            .bind(user_id)
            .bind(training_id)
            .fetch_optional(executor)
            .await?;
        Ok(registration)
    }

    pub async fn upsert_registration<'e, E>(
        &self,
        executor: E,
        user_id: i32,
        training_id: i32,
        order_id: Option<i32>,
    ) -> Result<DentalTrainingRegistration, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let registration = sqlx::query_as::<_, DentalTrainingRegistration>(
            r#"
            INSERT INTO dental_training_registrations (user_id, dental_training_id, order_id, confirmed)
            VALUES ($1, $2, $3, FALSE)
            ON CONFLICT (user_id, dental_training_id)
            DO UPDATE SET order_id = EXCLUDED.order_id, confirmed = FALSE
            RETURNING id, user_id, dental_training_id, order_id, confirmed, registered_at
            "#,
        )
            .bind(user_id)
            .bind(training_id)
            .bind(order_id)
            .fetch_one(executor)
            .await?;
        Ok(registration)
    }

    pub async fn set_registration_confirmed<'e, E>(
        &self,
        executor: E,
        order_id: i32,
        user_id: i32,
        training_id: i32,
        confirmed: bool,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE dental_training_registrations
            SET confirmed = $4
            WHERE order_id = $1 AND user_id = $2 AND dental_training_id = $3
            "#,
        )
            .bind(order_id)
            .bind(user_id)
            .bind(training_id)
            .bind(confirmed)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Eventos ---

    pub async fn find_event<'e, E>(&self, executor: E, id: i32) -> Result<Option<Event>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let event = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, date, location, capacity, created_at
            FROM events
            WHERE id = $1
            FOR UPDATE
            "#,
        )
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(event)
    }

    pub async fn insert_event<'e, E>(&self, executor: E, new: NewEvent) -> Result<Event, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, description, date, location, capacity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, date, location, capacity, created_at
            "#,
        )
            .bind(&new.title)
            .bind(&new.description)
            .bind(new.date)
            .bind(&new.location)
            .bind(new.capacity)
            .fetch_one(executor)
            .await?;
        Ok(event)
    }

    pub async fn count_event_registrations<'e, E>(&self, executor: E, event_id: i32) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event_registrations WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(executor)
            .await?;
        Ok(count)
    }

    pub async fn find_event_registration<'e, E>(
        &self,
        executor: E,
        user_id: i32,
        event_id: i32,
    ) -> Result<Option<EventRegistration>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let registration = sqlx::query_as::<_, EventRegistration>(
            r#"
            SELECT id, user_id, event_id, registered_at
            FROM event_registrations
            WHERE user_id = $1 AND event_id = $2
            "#,
        )
            .bind(user_id)
            .bind(event_id)
            .fetch_optional(executor)
            .await?;
        Ok(registration)
    }

    pub async fn insert_event_registration<'e, E>(
        &self,
        executor: E,
        user_id: i32,
        event_id: i32,
    ) -> Result<EventRegistration, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, EventRegistration>(
            r#"
            INSERT INTO event_registrations (user_id, event_id)
            VALUES ($1, $2)
            RETURNING id, user_id, event_id, registered_at
            "#,
        )
            .bind(user_id)
            .bind(event_id)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::AlreadyRegistered {
                            user_id,
                            target: format!("evento {event_id}"),
                        };
                    }
                }
                e.into()
            })
    }
}
