mod common;

use common::*;
use proptest::prelude::*;
use tiara_backend::{common::error::AppError, models::orders::OrderStatus};

async fn seed_scenario(capacity: i32) -> Harness {
    let h = harness();
    h.store.put_user(user(4)).await;
    h.store.put_product(product(5, 10, 45)).await;
    h.store.put_training(training(7, Some(capacity), 2500)).await;
    h.store
        .put_order(order(
            1,
            Some(4),
            vec![item(11, 1, product_line(5, None), 2, 45), item(12, 1, training_line(7), 1, 2500)],
        ))
        .await;
    h.store.put_registration(registration(20, 4, 7, 1)).await;
    h
}

#[tokio::test]
async fn confirmation_reserves_stock_and_seats_in_one_commit() {
    let h = seed_scenario(3).await;

    let receipt = h.orders.confirm_order(1).await.unwrap();

    assert_eq!(receipt.status, OrderStatus::Confirmed);
    assert!(receipt.notification_sent);
    assert_eq!(h.store.commit_count(), 1);
    assert_eq!(h.store.product(5).await.unwrap().quantity, 8);
    assert_eq!(h.store.training(7).await.unwrap().capacity, Some(2));
    assert!(h.store.registration(4, 7).await.unwrap().confirmed);
    assert_eq!(h.store.order(1).await.unwrap().status, OrderStatus::Confirmed);

    let sent = h.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "dentista4@example.com");
    assert_eq!(sent[0].subject, "Order Confirmation - #1");
    assert_eq!(sent[0].cc.as_deref(), Some("dentaltraining@tiarapro.com"));
    assert!(sent[0].html_body.contains("Marina Costa"));
}

#[tokio::test]
async fn full_training_rolls_back_the_product_lines() {
    let h = seed_scenario(0).await;

    let err = h.orders.confirm_order(1).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::InsufficientCapacity { training_id: 7, available: 0, requested: 1 }
    ));
    assert_eq!(h.store.commit_count(), 0);
    assert_eq!(h.store.product(5).await.unwrap().quantity, 10);
    assert_eq!(h.store.training(7).await.unwrap().capacity, Some(0));
    assert!(!h.store.registration(4, 7).await.unwrap().confirmed);
    assert_eq!(h.store.order(1).await.unwrap().status, OrderStatus::Pending);
    assert!(h.mailer.sent().is_empty());
}

#[tokio::test]
async fn insufficient_stock_leaves_every_quantity_untouched() {
    let h = harness();
    h.store.put_product(product(5, 10, 45)).await;
    h.store.put_product(product(6, 1, 30)).await;
    h.store
        .put_order(order(
            1,
            None,
            vec![item(11, 1, product_line(5, None), 4, 45), item(12, 1, product_line(6, None), 2, 30)],
        ))
        .await;

    let err = h.orders.confirm_order(1).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::InsufficientStock { product_id: 6, available: 1, requested: 2 }
    ));
    assert_eq!(h.store.product(5).await.unwrap().quantity, 10);
    assert_eq!(h.store.product(6).await.unwrap().quantity, 1);
    assert_eq!(h.store.commit_count(), 0);
}

#[tokio::test]
async fn second_confirmation_is_rejected() {
    let h = seed_scenario(3).await;
    h.orders.confirm_order(1).await.unwrap();

    let err = h.orders.confirm_order(1).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidStatusTransition { .. }));
    assert_eq!(h.store.product(5).await.unwrap().quantity, 8);
    assert_eq!(h.store.training(7).await.unwrap().capacity, Some(2));
    assert_eq!(h.store.commit_count(), 1);
}

#[tokio::test]
async fn unknown_and_empty_orders_are_rejected() {
    let h = harness();
    h.store.put_order(order(3, None, Vec::new())).await;

    assert!(matches!(h.orders.confirm_order(99).await, Err(AppError::OrderNotFound(99))));
    assert!(matches!(h.orders.confirm_order(3).await, Err(AppError::EmptyOrder(3))));
}

#[tokio::test]
async fn missing_product_fails_the_confirmation() {
    let h = harness();
    h.store
        .put_order(order(1, None, vec![item(11, 1, product_line(42, None), 1, 45)]))
        .await;

    assert!(matches!(h.orders.confirm_order(1).await, Err(AppError::ProductNotFound(42))));
    assert_eq!(h.store.commit_count(), 0);
}

#[tokio::test]
async fn training_without_pending_registration_is_rejected() {
    let h = harness();
    h.store.put_user(user(4)).await;
    h.store.put_training(training(7, Some(3), 2500)).await;
    h.store
        .put_order(order(1, Some(4), vec![item(12, 1, training_line(7), 1, 2500)]))
        .await;

    let err = h.orders.confirm_order(1).await.unwrap_err();

    assert!(matches!(err, AppError::RegistrationNotFound { order_id: 1, user_id: 4 }));
    assert_eq!(h.store.training(7).await.unwrap().capacity, Some(3));
}

#[tokio::test]
async fn unlimited_training_keeps_no_capacity() {
    let h = harness();
    h.store.put_user(user(4)).await;
    h.store.put_training(training(7, None, 2500)).await;
    h.store
        .put_order(order(1, Some(4), vec![item(12, 1, training_line(7), 5, 2500)]))
        .await;
    h.store.put_registration(registration(20, 4, 7, 1)).await;

    h.orders.confirm_order(1).await.unwrap();

    assert_eq!(h.store.training(7).await.unwrap().capacity, None);
    assert!(h.store.registration(4, 7).await.unwrap().confirmed);
}

#[tokio::test]
async fn variant_line_decrements_variant_and_parent() {
    let h = harness();
    h.store.put_product(crown(8, 5)).await;
    h.store
        .put_order(order(1, None, vec![item(11, 1, product_line(8, Some(803)), 2, 80)]))
        .await;

    h.orders.confirm_order(1).await.unwrap();

    let crown = h.store.product(8).await.unwrap();
    assert_eq!(crown.quantity, 8);
    assert_eq!(crown.variant(803).unwrap().quantity, 3);
    assert_eq!(crown.variant(802).unwrap().quantity, 5);
}

#[tokio::test]
async fn guest_order_mails_the_shipping_address() {
    let h = harness();
    h.store.put_product(product(5, 10, 45)).await;
    h.store
        .put_order(order(1, None, vec![item(11, 1, product_line(5, None), 1, 45)]))
        .await;

    h.orders.confirm_order(1).await.unwrap();

    let sent = h.mailer.sent();
    assert_eq!(sent[0].to, "cliente@example.com");
    assert_eq!(sent[0].cc.as_deref(), Some("sales@tiarapro.com"));
    assert!(sent[0].html_body.contains("<strong>Shipping</strong>"));
}

#[tokio::test]
async fn mail_failure_does_not_undo_the_confirmation() {
    let h = harness_with_failing_mailer();
    h.store.put_product(product(5, 10, 45)).await;
    h.store
        .put_order(order(1, None, vec![item(11, 1, product_line(5, None), 3, 45)]))
        .await;

    let receipt = h.orders.confirm_order(1).await.unwrap();

    assert!(!receipt.notification_sent);
    assert_eq!(h.store.product(5).await.unwrap().quantity, 7);
    assert_eq!(h.store.order(1).await.unwrap().status, OrderStatus::Confirmed);
}

#[tokio::test(start_paused = true)]
async fn slow_mailer_times_out_without_undoing_the_confirmation() {
    let h = harness_with_slow_mailer();
    h.store.put_product(product(5, 10, 45)).await;
    h.store
        .put_order(order(1, None, vec![item(11, 1, product_line(5, None), 3, 45)]))
        .await;

    let started = tokio::time::Instant::now();
    let receipt = h.orders.confirm_order(1).await.unwrap();

    assert!(!receipt.notification_sent);
    assert!(started.elapsed() < std::time::Duration::from_secs(60));
    assert_eq!(receipt.status, OrderStatus::Confirmed);
    assert_eq!(h.store.product(5).await.unwrap().quantity, 7);
    assert_eq!(h.store.order(1).await.unwrap().status, OrderStatus::Confirmed);
    assert_eq!(h.store.commit_count(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // Confirmação é tudo ou nada: ou cada linha desconta exatamente a sua quantidade, ou nada muda.
    #[test]
    fn confirmation_is_all_or_nothing(
        lines in proptest::collection::vec((0i32..12, 1i32..6), 1..4)
    ) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        rt.block_on(async {
            let h = harness();
            let mut items = Vec::new();
            for (idx, (stock, quantity)) in lines.iter().enumerate() {
                let product_id = 100 + idx as i32;
                h.store.put_product(product(product_id, *stock, 10)).await;
                items.push(item(200 + idx as i32, 1, product_line(product_id, None), *quantity, 10));
            }
            h.store.put_order(order(1, None, items)).await;

            let enough = lines.iter().all(|(stock, quantity)| stock >= quantity);
            let result = h.orders.confirm_order(1).await;

            prop_assert_eq!(result.is_ok(), enough);
            for (idx, (stock, quantity)) in lines.iter().enumerate() {
                let current = h.store.product(100 + idx as i32).await.unwrap().quantity;
                let expected = if enough { stock - quantity } else { *stock };
                prop_assert_eq!(current, expected);
            }
            prop_assert_eq!(h.store.commit_count(), usize::from(enough));
            Ok(())
        })?;
    }
}
