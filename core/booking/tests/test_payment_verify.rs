mod common;

use bigdecimal::BigDecimal;

use servease_booking::api::model::VerifyPaymentRequest;
use servease_booking::dao::{EngagementDao, PaymentDao, Settlement, WalletDao};
use servease_booking::error::Error;
use servease_booking::models::payment::PaymentStatus;
use servease_booking::models::wallet::OwnerKind;

use common::{date, monthly_request, spawn_node};

fn signed_callback(
    node: &common::TestNode,
    order_ref: &str,
    payment_ref: &str,
) -> VerifyPaymentRequest {
    VerifyPaymentRequest {
        order_ref: order_ref.to_string(),
        payment_ref: payment_ref.to_string(),
        signature: node.gateway.sign(order_ref, payment_ref),
    }
}

#[actix_rt::test]
async fn settlement_credits_the_provider_and_retires_the_engagement() -> anyhow::Result<()> {
    let node = spawn_node("verify-settle")?;

    let created = node
        .processor
        .create_booking(monthly_request(
            1,
            7,
            1000,
            date(2025, 8, 10),
            date(2025, 8, 20),
            "09:00",
        ))
        .await?;
    let order_ref = created.payment.order_ref.clone().expect("order ref");

    let settlement = node
        .processor
        .verify_payment(signed_callback(&node, &order_ref, "pay_001"))
        .await?;
    let receipt = match settlement {
        Settlement::Settled(receipt) => receipt,
        other => panic!("expected a fresh settlement, got {:?}", other),
    };
    assert_eq!(receipt.payment.status, PaymentStatus::Success);
    assert_eq!(receipt.payment.transaction_id.as_deref(), Some("pay_001"));
    assert_eq!(receipt.provider_credit, BigDecimal::from(900));

    // 900 payout at creation (100 deposit withheld) plus 900 settlement.
    let wallet = node
        .db
        .as_dao::<WalletDao>()
        .get(OwnerKind::Provider, 7)
        .await?
        .expect("provider wallet");
    assert_eq!(wallet.balance.0, BigDecimal::from(1800));

    let engagement = node
        .db
        .as_dao::<EngagementDao>()
        .get(created.engagement.id.clone())
        .await?
        .expect("engagement");
    assert!(!engagement.active, "settled engagements are retired");
    Ok(())
}

#[actix_rt::test]
async fn resubmitting_a_settled_payment_does_not_double_credit() -> anyhow::Result<()> {
    let node = spawn_node("verify-idempotent")?;

    let created = node
        .processor
        .create_booking(monthly_request(
            1,
            7,
            1000,
            date(2025, 8, 10),
            date(2025, 8, 20),
            "09:00",
        ))
        .await?;
    let order_ref = created.payment.order_ref.clone().expect("order ref");

    node.processor
        .verify_payment(signed_callback(&node, &order_ref, "pay_001"))
        .await?;
    let second = node
        .processor
        .verify_payment(signed_callback(&node, &order_ref, "pay_001"))
        .await?;
    assert!(matches!(second, Settlement::AlreadySettled(_)));

    let wallet = node
        .db
        .as_dao::<WalletDao>()
        .get(OwnerKind::Provider, 7)
        .await?
        .expect("provider wallet");
    assert_eq!(wallet.balance.0, BigDecimal::from(1800));
    let txs = node
        .db
        .as_dao::<WalletDao>()
        .transactions(wallet.id.clone())
        .await?;
    assert_eq!(txs.len(), 2, "creation payout + one settlement credit");
    Ok(())
}

#[actix_rt::test]
async fn a_bad_signature_rejects_the_callback_without_any_write() -> anyhow::Result<()> {
    let node = spawn_node("verify-bad-signature")?;

    let created = node
        .processor
        .create_booking(monthly_request(
            1,
            7,
            1000,
            date(2025, 8, 10),
            date(2025, 8, 20),
            "09:00",
        ))
        .await?;
    let order_ref = created.payment.order_ref.clone().expect("order ref");

    let err = node
        .processor
        .verify_payment(VerifyPaymentRequest {
            order_ref: order_ref.clone(),
            payment_ref: "pay_001".to_string(),
            signature: "deadbeef".to_string(),
        })
        .await
        .expect_err("forged signature");
    assert!(matches!(err, Error::PaymentRejected(_)));

    let payment = node
        .db
        .as_dao::<PaymentDao>()
        .get_by_order_ref(order_ref)
        .await?
        .expect("payment");
    assert_eq!(payment.status, PaymentStatus::Pending);

    let wallet = node
        .db
        .as_dao::<WalletDao>()
        .get(OwnerKind::Provider, 7)
        .await?
        .expect("provider wallet");
    assert_eq!(wallet.balance.0, BigDecimal::from(900));
    Ok(())
}

#[actix_rt::test]
async fn failed_callbacks_never_revert_a_success() -> anyhow::Result<()> {
    let node = spawn_node("verify-failed")?;

    let created = node
        .processor
        .create_booking(monthly_request(
            1,
            7,
            1000,
            date(2025, 8, 10),
            date(2025, 8, 20),
            "09:00",
        ))
        .await?;
    let order_ref = created.payment.order_ref.clone().expect("order ref");

    let failed = node.processor.fail_payment(order_ref.clone()).await?;
    assert_eq!(failed.status, PaymentStatus::Failed);

    // FAILED is terminal for settlement.
    let err = node
        .processor
        .verify_payment(signed_callback(&node, &order_ref, "pay_001"))
        .await
        .expect_err("failed payments cannot settle");
    assert!(matches!(err, Error::Conflict(_)));

    // And SUCCESS is terminal for failure callbacks.
    let second = node
        .processor
        .create_booking(monthly_request(
            2,
            8,
            1000,
            date(2025, 9, 10),
            date(2025, 9, 20),
            "09:00",
        ))
        .await?;
    let order_ref = second.payment.order_ref.clone().expect("order ref");
    node.processor
        .verify_payment(signed_callback(&node, &order_ref, "pay_002"))
        .await?;
    let err = node
        .processor
        .fail_payment(order_ref)
        .await
        .expect_err("settled payments cannot fail");
    assert!(matches!(err, Error::Conflict(_)));
    Ok(())
}

#[actix_rt::test]
async fn unknown_orders_are_reported_as_missing() -> anyhow::Result<()> {
    let node = spawn_node("verify-unknown")?;
    let err = node
        .processor
        .verify_payment(signed_callback(&node, "order_unknown", "pay_x"))
        .await
        .expect_err("unknown order");
    assert!(matches!(err, Error::NotFound(_)));
    Ok(())
}
