use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::prelude::*;

use servease_persistence::executor::{
    do_with_transaction, readonly_transaction, AsDao, PoolType,
};

use crate::error::{Error, Result};
use crate::models::engagement;
use crate::models::payment::{PaymentStatus, ReadObj};
use crate::models::wallet::{OwnerKind, TxType};
use crate::schema::bk_engagement::dsl as eng_dsl;
use crate::schema::bk_payment::dsl;

use super::wallet;

#[derive(Debug)]
pub struct SettlementReceipt {
    pub payment: ReadObj,
    pub provider_id: i64,
    pub provider_credit: BigDecimal,
}

/// A repeated callback for an already-settled payment is not an error; it
/// just must not credit the provider twice.
#[derive(Debug)]
pub enum Settlement {
    Settled(SettlementReceipt),
    AlreadySettled(ReadObj),
}

pub struct PaymentDao<'c> {
    pool: &'c PoolType,
}

impl<'c> AsDao<'c> for PaymentDao<'c> {
    fn as_dao(pool: &'c PoolType) -> Self {
        Self { pool }
    }
}

impl<'c> PaymentDao<'c> {
    pub async fn get_by_order_ref(&self, order_ref: String) -> Result<Option<ReadObj>> {
        readonly_transaction(self.pool, move |conn| {
            Ok(dsl::bk_payment
                .filter(dsl::order_ref.eq(order_ref))
                .first(conn)
                .optional()?)
        })
        .await
    }

    pub async fn for_engagement(&self, engagement_id: String) -> Result<Option<ReadObj>> {
        readonly_transaction(self.pool, move |conn| {
            Ok(dsl::bk_payment
                .filter(dsl::engagement_id.eq(engagement_id))
                .first(conn)
                .optional()?)
        })
        .await
    }

    /// Settlement: PENDING -> SUCCESS, credit the provider wallet with
    /// base minus platform fee, and retire the engagement. One unit; a
    /// second call for the same order is a no-op.
    pub async fn settle(&self, order_ref: String, payment_ref: String) -> Result<Settlement> {
        do_with_transaction(self.pool, move |conn| {
            let payment: ReadObj = dsl::bk_payment
                .filter(dsl::order_ref.eq(&order_ref))
                .first(conn)
                .optional()?
                .ok_or_else(|| Error::not_found(format!("payment for order {}", order_ref)))?;

            match payment.status {
                PaymentStatus::Success => return Ok(Settlement::AlreadySettled(payment)),
                PaymentStatus::Failed => {
                    return Err(Error::conflict(format!(
                        "payment for order {} already failed",
                        order_ref
                    )))
                }
                PaymentStatus::Pending => {}
            }

            let engagement: engagement::ReadObj = eng_dsl::bk_engagement
                .find(&payment.engagement_id)
                .first(conn)?;
            let provider_id = engagement.provider_id.ok_or_else(|| {
                Error::conflict(format!(
                    "engagement {} has no provider to credit",
                    engagement.id
                ))
            })?;

            diesel::update(dsl::bk_payment.find(&payment.id))
                .set((
                    dsl::status.eq(PaymentStatus::Success),
                    dsl::transaction_id.eq(Some(payment_ref.clone())),
                ))
                .execute(conn)?;

            let credit = &payment.base_amount.0 - &payment.platform_fee.0;
            let provider_wallet = wallet::get_or_create(conn, OwnerKind::Provider, provider_id)?;
            wallet::apply_entry(
                conn,
                &provider_wallet.id,
                Some(&engagement.id),
                TxType::Credit,
                &credit,
                &format!("Settlement for engagement {}", engagement.id),
            )?;

            diesel::update(eng_dsl::bk_engagement.find(&engagement.id))
                .set((
                    eng_dsl::active.eq(false),
                    eng_dsl::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;

            let payment: ReadObj = dsl::bk_payment.find(&payment.id).first(conn)?;
            Ok(Settlement::Settled(SettlementReceipt {
                payment,
                provider_id,
                provider_credit: credit,
            }))
        })
        .await
    }

    /// Failed gateway callback: PENDING -> FAILED. SUCCESS never reverts.
    pub async fn mark_failed(&self, order_ref: String) -> Result<ReadObj> {
        do_with_transaction(self.pool, move |conn| {
            let payment: ReadObj = dsl::bk_payment
                .filter(dsl::order_ref.eq(&order_ref))
                .first(conn)
                .optional()?
                .ok_or_else(|| Error::not_found(format!("payment for order {}", order_ref)))?;
            match payment.status {
                PaymentStatus::Success => Err(Error::conflict(format!(
                    "payment for order {} already settled",
                    order_ref
                ))),
                PaymentStatus::Failed => Ok(payment),
                PaymentStatus::Pending => {
                    diesel::update(dsl::bk_payment.find(&payment.id))
                        .set(dsl::status.eq(PaymentStatus::Failed))
                        .execute(conn)?;
                    Ok(dsl::bk_payment.find(&payment.id).first(conn)?)
                }
            }
        })
        .await
    }
}
