mod common;

use common::*;
use rust_decimal::Decimal;
use tiara_backend::{
    common::error::AppError,
    models::{
        orders::{Checkout, CheckoutLine, LineItemKind, OrderStatus},
        promo::MSG_INVALID,
    },
};

fn line(product_id: i32, quantity: i32) -> CheckoutLine {
    CheckoutLine {
        product_id,
        variant_id: None,
        quantity,
        product_name: None,
    }
}

fn checkout(user_id: Option<i32>, lines: Vec<CheckoutLine>) -> Checkout {
    Checkout {
        user_id,
        shipping: shipping("cliente@example.com"),
        promo_code: None,
        lines,
    }
}

#[tokio::test]
async fn guest_product_order_is_created_pending_with_shipping() {
    let h = harness();
    h.store.put_product(product(5, 10, 45)).await;

    let order = h.orders.create_order(checkout(None, vec![line(5, 2)])).await.unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, Decimal::from(240));
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].kind, LineItemKind::Product { product_id: 5, variant_id: None });
    assert_eq!(order.items[0].product_name.as_deref(), Some("Produto 5"));
    assert_eq!(order.items[0].unit_price, Decimal::from(45));
    // Checkout não reserva estoque.
    assert_eq!(h.store.product(5).await.unwrap().quantity, 10);
    assert!(h.store.order(order.id).await.is_some());
}

#[tokio::test]
async fn variant_is_resolved_from_the_cart_label() {
    let h = harness();
    h.store.put_product(crown(8, 5)).await;

    let mut cart_line = line(8, 1);
    cart_line.product_name = Some("Coroa Pediátrica, Upper Right, S3".into());
    let order = h.orders.create_order(checkout(None, vec![cart_line])).await.unwrap();

    assert_eq!(order.items[0].kind, LineItemKind::Product { product_id: 8, variant_id: Some(803) });
    assert_eq!(order.items[0].product_name.as_deref(), Some("Coroa Pediátrica, Upper Right, S3"));
}

#[tokio::test]
async fn unresolvable_variant_is_rejected() {
    let h = harness();
    h.store.put_product(crown(8, 5)).await;

    let mut cart_line = line(8, 1);
    cart_line.product_name = Some("Coroa Pediátrica, S9".into());
    let err = h.orders.create_order(checkout(None, vec![cart_line])).await.unwrap_err();

    assert!(matches!(err, AppError::VariantNotResolved { product_id: 8, .. }));
    assert_eq!(h.store.commit_count(), 0);
}

#[tokio::test]
async fn legacy_ids_create_pending_registration_and_subscription() {
    let h = harness();
    h.store.put_user(user(4)).await;
    h.store.put_training(training(7, Some(3), 2500)).await;
    h.store.put_plan(plan(2, "Pro", 6100, 25)).await;

    let order = h
        .orders
        .create_order(checkout(Some(4), vec![line(2_000_007, 1), line(1_000_001, 1)]))
        .await
        .unwrap();

    assert_eq!(order.items[0].kind, LineItemKind::TrainingPackage { training_id: 7 });
    assert_eq!(order.items[1].kind, LineItemKind::AiSubscription { plan_id: 2 });
    assert_eq!(order.items[1].product_name.as_deref(), Some("Tiara AI Pro"));
    // Sem itens físicos, sem frete.
    assert_eq!(order.total_amount, Decimal::from(8600));

    let registration = h.store.registration(4, 7).await.unwrap();
    assert_eq!(registration.order_id, Some(order.id));
    assert!(!registration.confirmed);

    let subscriptions = h.store.user_subscriptions(4).await;
    assert_eq!(subscriptions.len(), 1);
    assert_eq!(subscriptions[0].order_id, order.id);
    assert_eq!(subscriptions[0].segmentations_allowed, 25);
    assert!(!subscriptions[0].is_active);
    // Capacidade só muda na confirmação.
    assert_eq!(h.store.training(7).await.unwrap().capacity, Some(3));
}

#[tokio::test]
async fn guests_cannot_buy_trainings_or_plans() {
    let h = harness();
    h.store.put_training(training(7, Some(3), 2500)).await;
    h.store.put_plan(plan(1, "Light", 2900, 10)).await;

    let err = h.orders.create_order(checkout(None, vec![line(2_000_007, 1)])).await.unwrap_err();
    assert!(matches!(err, AppError::GuestCheckoutNotAllowed(ref email) if email == "cliente@example.com"));

    let err = h.orders.create_order(checkout(None, vec![line(1_000_000, 1)])).await.unwrap_err();
    assert!(matches!(err, AppError::GuestCheckoutNotAllowed(_)));
}

#[tokio::test]
async fn valid_promo_discounts_the_total() {
    let h = harness();
    h.store.put_user(user(4)).await;
    h.store.put_product(product(5, 10, 45)).await;
    h.store.put_promo(promo(30, "TIARA10", 10)).await;

    let mut request = checkout(Some(4), vec![line(5, 2)]);
    request.promo_code = Some(" TIARA10 ".into());
    let order = h.orders.create_order(request).await.unwrap();

    // (2 x 45 + 150) - 10%
    assert_eq!(order.total_amount, Decimal::from(216));
    assert_eq!(order.promo_code_id, Some(30));
    // O resgate só acontece quando o pagamento é confirmado.
    assert_eq!(h.store.promo(30).await.unwrap().current_uses, 0);
}

#[tokio::test]
async fn unknown_promo_rejects_the_checkout() {
    let h = harness();
    h.store.put_user(user(4)).await;
    h.store.put_product(product(5, 10, 45)).await;

    let mut request = checkout(Some(4), vec![line(5, 1)]);
    request.promo_code = Some("NOPE".into());
    let err = h.orders.create_order(request).await.unwrap_err();

    assert!(matches!(err, AppError::PromoCodeRejected(ref msg) if msg == MSG_INVALID));
    assert_eq!(h.store.commit_count(), 0);
}

#[tokio::test]
async fn promo_requires_an_account() {
    let h = harness();
    h.store.put_product(product(5, 10, 45)).await;
    h.store.put_promo(promo(30, "TIARA10", 10)).await;

    let mut request = checkout(None, vec![line(5, 1)]);
    request.promo_code = Some("TIARA10".into());

    assert!(matches!(
        h.orders.create_order(request).await,
        Err(AppError::GuestCheckoutNotAllowed(_))
    ));
}

#[tokio::test]
async fn empty_or_zero_quantity_cart_is_invalid() {
    let h = harness();
    h.store.put_product(product(5, 10, 45)).await;

    assert!(matches!(
        h.orders.create_order(checkout(None, Vec::new())).await,
        Err(AppError::ValidationError(_))
    ));
    assert!(matches!(
        h.orders.create_order(checkout(None, vec![line(5, 0)])).await,
        Err(AppError::ValidationError(_))
    ));
}

#[tokio::test]
async fn total_beyond_decimal_range_is_invalid() {
    let h = harness();
    let mut expensive = product(5, 10, 45);
    expensive.price = Decimal::MAX;
    h.store.put_product(expensive).await;

    let err = h.orders.create_order(checkout(None, vec![line(5, 2)])).await.unwrap_err();

    assert!(matches!(err, AppError::ValidationError(ref e) if e.field_errors().contains_key("total")));
    assert_eq!(h.store.commit_count(), 0);
}

#[tokio::test]
async fn training_line_buys_a_single_seat() {
    let h = harness();
    h.store.put_user(user(4)).await;
    h.store.put_training(training(7, Some(3), 2500)).await;

    let err = h
        .orders
        .create_order(checkout(Some(4), vec![line(2_000_007, 2)]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ValidationError(ref e) if e.field_errors().contains_key("quantity")));
    assert!(h.store.registration(4, 7).await.is_none());
    assert_eq!(h.store.commit_count(), 0);
}

#[tokio::test]
async fn unknown_user_or_product_is_not_found() {
    let h = harness();
    h.store.put_product(product(5, 10, 45)).await;

    assert!(matches!(
        h.orders.create_order(checkout(Some(77), vec![line(5, 1)])).await,
        Err(AppError::UserNotFound(77))
    ));
    assert!(matches!(
        h.orders.create_order(checkout(None, vec![line(6, 1)])).await,
        Err(AppError::ProductNotFound(6))
    ));
}

#[tokio::test]
async fn active_subscriber_cannot_buy_another_plan() {
    let h = harness();
    h.store.put_user(user(4)).await;
    h.store.put_plan(plan(1, "Light", 2900, 10)).await;
    h.store.put_plan(plan(2, "Pro", 6100, 25)).await;
    h.store.put_subscription(subscription(40, 4, 1, 90, true)).await;

    let err = h.orders.create_order(checkout(Some(4), vec![line(1_000_001, 1)])).await.unwrap_err();

    assert!(matches!(err, AppError::SubscriptionAlreadyActive { user_id: 4, plan_id: 1 }));
}

#[tokio::test]
async fn checkout_then_confirm_round_trip() {
    let h = harness();
    h.store.put_user(user(4)).await;
    h.store.put_product(product(5, 10, 45)).await;
    h.store.put_training(training(7, Some(3), 2500)).await;

    let order = h
        .orders
        .create_order(checkout(Some(4), vec![line(5, 2), line(2_000_007, 1)]))
        .await
        .unwrap();
    h.orders.confirm_order(order.id).await.unwrap();

    assert_eq!(h.store.product(5).await.unwrap().quantity, 8);
    assert_eq!(h.store.training(7).await.unwrap().capacity, Some(2));
    assert!(h.store.registration(4, 7).await.unwrap().confirmed);
}
