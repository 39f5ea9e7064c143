// src/services/user_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::Store,
    models::users::{NewUser, User},
};

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn register_user(&self, mut new: NewUser) -> Result<User, AppError> {
        new.email = new.email.trim().to_lowercase();

        let mut uow = self.store.begin().await?;
        let user = uow.insert_user(new).await?;
        uow.commit().await?;

        tracing::info!("👤 Usuário {} cadastrado", user.id);
        Ok(user)
    }

    pub async fn get_user(&self, user_id: i32) -> Result<User, AppError> {
        let mut uow = self.store.begin().await?;
        let user = uow.get_user(user_id).await?.ok_or(AppError::UserNotFound(user_id))?;
        uow.rollback().await?;
        Ok(user)
    }
}
