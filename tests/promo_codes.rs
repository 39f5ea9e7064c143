mod common;

use chrono::{Duration, Utc};
use common::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tiara_backend::{
    common::error::AppError,
    models::promo::{
        NewPromoCode, MSG_ALREADY_USED, MSG_AMOUNT_OUT_OF_RANGE, MSG_APPLIED, MSG_EXHAUSTED, MSG_EXPIRED,
        MSG_INACTIVE, MSG_INVALID,
    },
};

fn new_code(code: &str, percent: i64) -> NewPromoCode {
    let now = Utc::now();
    NewPromoCode {
        code: code.into(),
        discount_percent: Decimal::from(percent),
        start_date: now - Duration::days(1),
        end_date: now + Duration::days(7),
        is_active: true,
        max_uses: Some(10),
        minimum_order_amount: None,
    }
}

#[tokio::test]
async fn amount_beyond_decimal_range_is_refused() {
    let h = harness();
    h.store.put_promo(promo(31, "METADE", 50)).await;

    let result = h.promos.validate("METADE", Decimal::MAX, 4).await.unwrap();

    assert!(!result.is_valid);
    assert_eq!(result.message, MSG_AMOUNT_OUT_OF_RANGE);
    assert_eq!(result.promo_code_id, None);
}

#[tokio::test]
async fn valid_code_reports_discount_and_final_amount() {
    let h = harness();
    h.store.put_promo(promo(30, "TIARA10", 10)).await;

    let result = h.promos.validate("TIARA10", Decimal::from(500), 4).await.unwrap();

    assert!(result.is_valid);
    assert_eq!(result.message, MSG_APPLIED);
    assert_eq!(result.discount_amount, Decimal::from(50));
    assert_eq!(result.final_amount, Decimal::from(450));
    assert_eq!(result.promo_code_id, Some(30));
    // Validar não grava nada.
    assert_eq!(h.store.commit_count(), 0);
}

#[tokio::test]
async fn rejections_carry_the_customer_message() {
    let h = harness();
    let now = Utc::now();
    let mut exhausted = promo(31, "CHEIO", 10);
    exhausted.current_uses = 100;
    h.store.put_promo(exhausted).await;
    let mut expired = promo(32, "VELHO", 10);
    expired.end_date = now - Duration::hours(1);
    h.store.put_promo(expired).await;
    let mut inactive = promo(33, "PAUSADO", 10);
    inactive.is_active = false;
    h.store.put_promo(inactive).await;
    let mut minimum = promo(34, "MINIMO", 10);
    minimum.minimum_order_amount = Some(Decimal::from(1000));
    h.store.put_promo(minimum).await;

    let amount = Decimal::from(500);
    let message = |code: &'static str| {
        let promos = h.promos.clone();
        async move { promos.validate(code, amount, 4).await.unwrap() }
    };

    let invalid = message("NOPE").await;
    assert!(!invalid.is_valid);
    assert_eq!(invalid.message, MSG_INVALID);
    assert_eq!(message("CHEIO").await.message, MSG_EXHAUSTED);
    assert_eq!(message("VELHO").await.message, MSG_EXPIRED);
    assert_eq!(message("PAUSADO").await.message, MSG_INACTIVE);
    assert_eq!(message("MINIMO").await.message, "Minimum order amount of 1000 EGP required");
}

#[tokio::test]
async fn redeem_counts_the_use_and_blocks_a_second_one() {
    let h = harness();
    h.store.put_promo(promo(30, "TIARA10", 10)).await;

    let usage = h.promos.redeem(4, 30, Some(1)).await.unwrap();

    assert_eq!(usage.user_id, 4);
    assert_eq!(usage.order_id, Some(1));
    assert_eq!(h.store.promo(30).await.unwrap().current_uses, 1);
    assert_eq!(h.store.promo_usages(4).await.len(), 1);

    let err = h.promos.redeem(4, 30, Some(2)).await.unwrap_err();
    assert!(matches!(err, AppError::PromoCodeAlreadyUsed { user_id: 4, promo_code_id: 30 }));
    assert_eq!(h.store.promo(30).await.unwrap().current_uses, 1);

    let again = h.promos.validate("TIARA10", Decimal::from(500), 4).await.unwrap();
    assert_eq!(again.message, MSG_ALREADY_USED);

    // Outro usuário ainda pode usar.
    let other = h.promos.validate("TIARA10", Decimal::from(500), 5).await.unwrap();
    assert!(other.is_valid);
}

#[tokio::test]
async fn redeeming_an_unknown_code_is_not_found() {
    let h = harness();

    assert!(matches!(h.promos.redeem(4, 99, None).await, Err(AppError::PromoCodeNotFound(_))));
}

#[tokio::test]
async fn create_trims_and_rejects_duplicates() {
    let h = harness();

    let created = h.promos.create_promo_code(new_code(" VERAO15 ", 15)).await.unwrap();
    assert_eq!(created.code, "VERAO15");
    assert_eq!(created.current_uses, 0);
    assert_eq!(h.promos.get_promo_code("VERAO15").await.unwrap().id, created.id);

    let err = h.promos.create_promo_code(new_code("VERAO15", 20)).await.unwrap_err();
    assert!(matches!(err, AppError::PromoCodeAlreadyExists(ref code) if code == "VERAO15"));
    assert_eq!(h.promos.list_promo_codes().await.unwrap().len(), 1);
}

#[tokio::test]
async fn create_rejects_bad_dates_and_percentages() {
    let h = harness();

    let mut backwards = new_code("AVESSO", 10);
    backwards.end_date = backwards.start_date - Duration::days(1);
    assert!(matches!(
        h.promos.create_promo_code(backwards).await,
        Err(AppError::PromoCodeRejected(_))
    ));
    assert!(matches!(
        h.promos.create_promo_code(new_code("ZERO", 0)).await,
        Err(AppError::PromoCodeRejected(_))
    ));
    assert!(matches!(
        h.promos.create_promo_code(new_code("DEMAIS", 101)).await,
        Err(AppError::PromoCodeRejected(_))
    ));
}

proptest! {
    // O desconto nunca é negativo e o valor final nunca passa do valor original.
    #[test]
    fn discount_is_bounded_by_the_order_amount(
        cents in 0i64..10_000_000,
        percent in 1i64..=100,
    ) {
        let code = promo(1, "P", percent);
        let amount = Decimal::new(cents, 2);

        let result = code.evaluate(amount, false, Utc::now());

        prop_assert!(result.is_valid);
        prop_assert!(result.discount_amount >= Decimal::ZERO);
        prop_assert!(result.final_amount >= Decimal::ZERO);
        prop_assert!(result.final_amount <= amount);
    }
}
