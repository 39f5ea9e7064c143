mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::*;
use rust_decimal::Decimal;
use tiara_backend::{
    common::error::AppError,
    models::{
        catalog::{NewCategory, NewProduct, NewProductVariant, ProductSide},
        orders::OrderStatus,
        training::NewEvent,
    },
    services::CatalogService,
};

fn new_event(capacity: Option<i32>) -> NewEvent {
    NewEvent {
        title: "Congresso de Odontopediatria".into(),
        description: "Palestras e workshops".into(),
        date: Utc::now() + Duration::days(60),
        location: Some("Alexandria".into()),
        capacity,
    }
}

#[tokio::test]
async fn event_registration_is_unique_per_user() {
    let h = harness();
    h.store.put_user(user(4)).await;
    let event = h.trainings.create_event(new_event(None)).await.unwrap();

    let registration = h.trainings.register_for_event(4, event.id).await.unwrap();
    assert_eq!(registration.event_id, event.id);

    let err = h.trainings.register_for_event(4, event.id).await.unwrap_err();
    assert!(matches!(err, AppError::AlreadyRegistered { user_id: 4, .. }));
}

#[tokio::test]
async fn full_event_refuses_new_registrations() {
    let h = harness();
    h.store.put_user(user(4)).await;
    h.store.put_user(user(5)).await;
    let event = h.trainings.create_event(new_event(Some(1))).await.unwrap();
    h.trainings.register_for_event(4, event.id).await.unwrap();

    let err = h.trainings.register_for_event(5, event.id).await.unwrap_err();

    assert!(matches!(err, AppError::EventFull(id) if id == event.id));
}

#[tokio::test]
async fn unknown_event_or_user_is_not_found() {
    let h = harness();
    h.store.put_user(user(4)).await;

    assert!(matches!(h.trainings.register_for_event(4, 99).await, Err(AppError::EventNotFound(99))));
    assert!(matches!(h.trainings.register_for_event(8, 99).await, Err(AppError::UserNotFound(8))));
}

#[tokio::test]
async fn pending_registration_stays_with_its_open_order() {
    let h = harness();
    h.store.put_user(user(4)).await;
    h.store.put_training(training(7, Some(3), 2500)).await;
    h.store.put_order(order(1, Some(4), vec![item(11, 1, training_line(7), 1, 2500)])).await;

    let first = h.trainings.register_for_training(4, 7, Some(1)).await.unwrap();
    let err = h.trainings.register_for_training(4, 7, Some(2)).await.unwrap_err();

    assert!(matches!(err, AppError::AlreadyRegistered { user_id: 4, .. }));
    let kept = h.store.registration(4, 7).await.unwrap();
    assert_eq!(kept.id, first.id);
    assert_eq!(kept.order_id, Some(1));

    // Repetir com o mesmo pedido não é conflito.
    assert_eq!(h.trainings.register_for_training(4, 7, Some(1)).await.unwrap().id, first.id);
}

#[tokio::test]
async fn registration_of_a_cancelled_order_moves_to_the_new_one() {
    let h = harness();
    h.store.put_user(user(4)).await;
    h.store.put_training(training(7, Some(3), 2500)).await;
    let mut cancelled = order(1, Some(4), vec![item(11, 1, training_line(7), 1, 2500)]);
    cancelled.status = OrderStatus::Cancelled;
    h.store.put_order(cancelled).await;

    let first = h.trainings.register_for_training(4, 7, Some(1)).await.unwrap();
    let second = h.trainings.register_for_training(4, 7, Some(2)).await.unwrap();

    assert_eq!(first.id, second.id);
    assert!(!second.confirmed);
    assert_eq!(h.store.registration(4, 7).await.unwrap().order_id, Some(2));
}

#[tokio::test]
async fn confirmed_training_registration_cannot_be_repeated() {
    let h = harness();
    h.store.put_user(user(4)).await;
    h.store.put_training(training(7, Some(3), 2500)).await;
    let mut confirmed = registration(20, 4, 7, 1);
    confirmed.confirmed = true;
    h.store.put_registration(confirmed).await;

    let err = h.trainings.register_for_training(4, 7, Some(2)).await.unwrap_err();

    assert!(matches!(err, AppError::AlreadyRegistered { user_id: 4, .. }));
    assert_eq!(h.store.registration(4, 7).await.unwrap().order_id, Some(1));
}

#[tokio::test]
async fn product_with_variants_is_created_and_read_back() {
    let h = harness();
    let catalog = CatalogService::new(Arc::new(h.store.clone()));

    let category = catalog
        .create_category(NewCategory {
            name: "Coroas".into(),
            description: None,
            parent_id: None,
        })
        .await
        .unwrap();
    let variant = |sku: &str, size: i32| NewProductVariant {
        sku: sku.into(),
        quantity: 4,
        side: Some(ProductSide::LowerLeft),
        size: Some(size),
        variant_option: None,
    };
    let created = catalog
        .create_product(NewProduct {
            name: "Coroa de Aço".into(),
            sku: "CA-01".into(),
            quantity: 8,
            price: Decimal::from(80),
            description: None,
            category_id: Some(category.id),
            brand: Some("Tiara".into()),
            logo_url: None,
            variants: vec![variant("CA-01-S1", 1), variant("CA-01-S2", 2)],
        })
        .await
        .unwrap();

    let product = catalog.get_product(created.id).await.unwrap();
    assert!(product.is_variant);
    assert_eq!(product.variants.len(), 2);
    assert_eq!(product.category_id, Some(category.id));
    assert_eq!(catalog.list_categories().await.unwrap().len(), 1);
    assert!(matches!(catalog.get_product(9999).await, Err(AppError::ProductNotFound(9999))));
}
