// src/services/training_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{Store, UnitOfWork},
    models::{
        orders::OrderStatus,
        training::{
            DentalTraining, DentalTrainingRegistration, Event, EventRegistration, NewDentalTraining, NewEvent,
        },
    },
};

#[derive(Clone)]
pub struct TrainingService {
    store: Arc<dyn Store>,
}

impl TrainingService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create_training(&self, new: NewDentalTraining) -> Result<DentalTraining, AppError> {
        let mut uow = self.store.begin().await?;
        let training = uow.insert_training(new).await?;
        uow.commit().await?;
        Ok(training)
    }

    pub async fn create_event(&self, new: NewEvent) -> Result<Event, AppError> {
        let mut uow = self.store.begin().await?;
        let event = uow.insert_event(new).await?;
        uow.commit().await?;
        Ok(event)
    }

    // --- Inscrição em treinamento ---
    // Fica pendente até a confirmação do pedido que a pagou.
    pub async fn register_for_training(
        &self,
        user_id: i32,
        training_id: i32,
        order_id: Option<i32>,
    ) -> Result<DentalTrainingRegistration, AppError> {
        let mut uow = self.store.begin().await?;
        let registration = Self::register_pending(uow.as_mut(), user_id, training_id, order_id).await?;
        uow.commit().await?;
        Ok(registration)
    }

    /// Versão usada dentro de outra unidade de trabalho (checkout).
    pub async fn register_pending(
        uow: &mut dyn UnitOfWork,
        user_id: i32,
        training_id: i32,
        order_id: Option<i32>,
    ) -> Result<DentalTrainingRegistration, AppError> {
        uow.get_user(user_id).await?.ok_or(AppError::UserNotFound(user_id))?;
        uow.get_training(training_id)
            .await?
            .ok_or(AppError::TrainingNotFound(training_id))?;

        if let Some(existing) = uow.get_registration(user_id, training_id).await? {
            let already_registered = || AppError::AlreadyRegistered {
                user_id,
                target: format!("treinamento {training_id}"),
            };
            if existing.confirmed {
                return Err(already_registered());
            }
            // Pendente de outro pedido: só troca de dono se esse pedido foi cancelado.
            if let Some(held_by) = existing.order_id.filter(|id| Some(*id) != order_id) {
                let held_open = uow
                    .get_order(held_by)
                    .await?
                    .is_some_and(|order| order.status != OrderStatus::Cancelled);
                if held_open {
                    tracing::warn!(
                        "⚠️ Inscrição de {} no treinamento {} já pertence ao pedido {}",
                        user_id,
                        training_id,
                        held_by
                    );
                    return Err(already_registered());
                }
            }
        }

        uow.upsert_registration(user_id, training_id, order_id).await
    }

    // --- Inscrição em evento ---
    pub async fn register_for_event(&self, user_id: i32, event_id: i32) -> Result<EventRegistration, AppError> {
        let mut uow = self.store.begin().await?;

        uow.get_user(user_id).await?.ok_or(AppError::UserNotFound(user_id))?;
        let event = uow.get_event(event_id).await?.ok_or(AppError::EventNotFound(event_id))?;

        if uow.find_event_registration(user_id, event_id).await?.is_some() {
            return Err(AppError::AlreadyRegistered {
                user_id,
                target: format!("evento {event_id}"),
            });
        }

        if let Some(capacity) = event.capacity {
            let taken = uow.count_event_registrations(event_id).await?;
            if taken >= i64::from(capacity) {
                return Err(AppError::EventFull(event_id));
            }
        }

        let registration = uow.insert_event_registration(user_id, event_id).await?;
        uow.commit().await?;

        tracing::info!("✅ Usuário {} inscrito no evento {}", user_id, event_id);
        Ok(registration)
    }
}
