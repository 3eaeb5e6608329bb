use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use lazy_static::lazy_static;

use servease_persistence::executor::{do_with_transaction, AsDao, PoolType};

use crate::error::{Error, Result};
use crate::models::availability::SlotStatus;
use crate::models::engagement::{self, BookingType};
use crate::models::leave::{CustomerLeave, LeaveStatus};
use crate::models::modification::{Actor, Modification, ModificationPayload};
use crate::models::wallet::{OwnerKind, TxType, Wallet, WalletTx};
use crate::schema::bk_customer_leave::dsl as leave_dsl;
use crate::schema::bk_engagement::dsl as eng_dsl;
use crate::schema::bk_modification::dsl as mod_dsl;

use super::{availability, payout, wallet};

lazy_static! {
    static ref SERVICE_DAYS: BigDecimal = BigDecimal::from(30);
    static ref REFUND_SHARE: BigDecimal = "0.75".parse().unwrap();
}

#[derive(Debug)]
pub struct LeaveOutcome {
    pub leave: CustomerLeave,
    pub vacation_amount: BigDecimal,
    pub wallet_credit: BigDecimal,
    /// The platform keeps the rest of the vacation amount. Informational
    /// only; no ledger row is written for it.
    pub platform_share: BigDecimal,
    pub penalty: Option<BigDecimal>,
    pub customer_wallet: Wallet,
    pub credit_tx: WalletTx,
}

#[derive(Debug)]
pub struct LeaveReversal {
    pub engagement_id: String,
    pub total_days: i32,
    pub reversed_amount: BigDecimal,
}

pub struct LeaveDao<'c> {
    pool: &'c PoolType,
}

impl<'c> AsDao<'c> for LeaveDao<'c> {
    fn as_dao(pool: &'c PoolType) -> Self {
        Self { pool }
    }
}

fn per_day_cost(base_amount: &BigDecimal) -> BigDecimal {
    base_amount / &*SERVICE_DAYS
}

/// Whole days, both endpoints included, computed on plain calendar dates so
/// the count cannot drift with the server timezone.
fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i32 {
    ((end - start).num_days() + 1) as i32
}

impl<'c> LeaveDao<'c> {
    /// Vacation request. Prorated refund to the customer, full-amount
    /// debit against the provider, payout adjustment, availability release
    /// and the APPROVED leave record, all in one unit. A leave requested on
    /// top of an existing one additionally costs `modification_penalty`.
    pub async fn apply(
        &self,
        engagement_id: String,
        customer_id: i64,
        leave_start: NaiveDate,
        leave_end: NaiveDate,
        modification_penalty: BigDecimal,
        actor: Actor,
    ) -> Result<LeaveOutcome> {
        do_with_transaction(self.pool, move |conn| {
            let engagement: engagement::ReadObj = eng_dsl::bk_engagement
                .find(&engagement_id)
                .filter(eng_dsl::customer_id.eq(customer_id))
                .first(conn)
                .optional()?
                .ok_or_else(|| Error::not_found(format!("engagement {}", engagement_id)))?;

            if !matches!(
                engagement.booking_type,
                BookingType::Monthly | BookingType::ShortTerm
            ) {
                return Err(Error::bad_request(
                    "vacation only applies to SHORT_TERM or MONTHLY bookings",
                ));
            }
            let provider_id = engagement.provider_id.ok_or_else(|| {
                Error::bad_request("vacation requires an assigned provider")
            })?;
            if leave_end < leave_start {
                return Err(Error::bad_request("leave end date precedes its start date"));
            }

            let total_days = inclusive_days(leave_start, leave_end);
            let vacation_amount =
                per_day_cost(&engagement.base_amount.0) * BigDecimal::from(total_days);
            let wallet_credit = (&vacation_amount * &*REFUND_SHARE).round(0);
            let platform_share = &vacation_amount - &wallet_credit;
            let penalty = if engagement.leave_days.is_some() {
                Some(modification_penalty)
            } else {
                None
            };

            let customer_wallet = wallet::get_or_create(conn, OwnerKind::Customer, customer_id)?;
            let credit_tx = wallet::apply_entry(
                conn,
                &customer_wallet.id,
                Some(&engagement.id),
                TxType::Credit,
                &wallet_credit,
                &format!("Vacation refund for {} days", total_days),
            )?;
            if let Some(penalty) = &penalty {
                wallet::apply_entry(
                    conn,
                    &customer_wallet.id,
                    Some(&engagement.id),
                    TxType::Debit,
                    penalty,
                    "Leave modification penalty",
                )?;
            }

            let provider_wallet = wallet::get_or_create(conn, OwnerKind::Provider, provider_id)?;
            wallet::apply_entry(
                conn,
                &provider_wallet.id,
                Some(&engagement.id),
                TxType::Debit,
                &vacation_amount,
                &format!("Vacation adjustment for engagement {}", engagement.id),
            )?;
            payout::decrement_net(conn, &engagement.id, &vacation_amount)?;
            availability::set_window_status(
                conn,
                &engagement.id,
                leave_start,
                leave_end,
                SlotStatus::Free,
            )?;

            let leave = CustomerLeave::approved(
                customer_id,
                engagement.id.clone(),
                leave_start,
                leave_end,
                total_days,
                vacation_amount.clone(),
            );
            diesel::insert_into(leave_dsl::bk_customer_leave)
                .values(&leave)
                .execute(conn)?;

            diesel::update(eng_dsl::bk_engagement.find(&engagement.id))
                .set((
                    eng_dsl::vacation_start.eq(Some(leave_start)),
                    eng_dsl::vacation_end.eq(Some(leave_end)),
                    eng_dsl::leave_days.eq(Some(total_days)),
                    eng_dsl::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;

            let audit = Modification::new(
                &engagement.id,
                &ModificationPayload::Vacation {
                    start: leave_start,
                    end: leave_end,
                    total_days,
                    vacation_amount: vacation_amount.clone(),
                    wallet_credit: wallet_credit.clone(),
                    penalty: penalty.clone(),
                },
                actor,
            )?;
            diesel::insert_into(mod_dsl::bk_modification)
                .values(&audit)
                .execute(conn)?;

            let customer_wallet = wallet::get_by_id(conn, &customer_wallet.id)?;
            Ok(LeaveOutcome {
                leave,
                vacation_amount,
                wallet_credit,
                platform_share,
                penalty,
                customer_wallet,
                credit_tx,
            })
        })
        .await
    }

    /// Reverses the engagement's most recent leave: both wallets move by
    /// the recorded `leave_days x dailyRate`, the availability window goes
    /// back to BOOKED and the leave record flips to CANCELLED.
    pub async fn cancel(
        &self,
        engagement_id: String,
        customer_id: i64,
        actor: Actor,
    ) -> Result<LeaveReversal> {
        do_with_transaction(self.pool, move |conn| {
            let engagement: engagement::ReadObj = eng_dsl::bk_engagement
                .find(&engagement_id)
                .filter(eng_dsl::customer_id.eq(customer_id))
                .first(conn)
                .optional()?
                .ok_or_else(|| Error::not_found(format!("engagement {}", engagement_id)))?;

            let total_days = engagement
                .leave_days
                .ok_or_else(|| Error::bad_request("engagement has no leave to cancel"))?;
            let (leave_start, leave_end) =
                match (engagement.vacation_start, engagement.vacation_end) {
                    (Some(start), Some(end)) => (start, end),
                    _ => return Err(Error::bad_request("engagement has no leave to cancel")),
                };
            let provider_id = engagement
                .provider_id
                .ok_or_else(|| Error::bad_request("engagement has no provider"))?;

            let reversed_amount =
                per_day_cost(&engagement.base_amount.0) * BigDecimal::from(total_days);

            let customer_wallet = wallet::get_or_create(conn, OwnerKind::Customer, customer_id)?;
            wallet::apply_entry(
                conn,
                &customer_wallet.id,
                Some(&engagement.id),
                TxType::Debit,
                &reversed_amount,
                &format!("Vacation refund reversal for {} days", total_days),
            )?;
            let provider_wallet = wallet::get_or_create(conn, OwnerKind::Provider, provider_id)?;
            wallet::apply_entry(
                conn,
                &provider_wallet.id,
                Some(&engagement.id),
                TxType::Credit,
                &reversed_amount,
                &format!("Vacation adjustment reversal for engagement {}", engagement.id),
            )?;

            availability::set_window_status(
                conn,
                &engagement.id,
                leave_start,
                leave_end,
                SlotStatus::Booked,
            )?;

            let latest: Option<CustomerLeave> = leave_dsl::bk_customer_leave
                .filter(leave_dsl::engagement_id.eq(&engagement.id))
                .filter(leave_dsl::status.eq(LeaveStatus::Approved))
                .order(leave_dsl::created_at.desc())
                .first(conn)
                .optional()?;
            if let Some(leave) = latest {
                diesel::update(leave_dsl::bk_customer_leave.find(&leave.id))
                    .set(leave_dsl::status.eq(LeaveStatus::Cancelled))
                    .execute(conn)?;
            }

            diesel::update(eng_dsl::bk_engagement.find(&engagement.id))
                .set((
                    eng_dsl::vacation_start.eq(None::<NaiveDate>),
                    eng_dsl::vacation_end.eq(None::<NaiveDate>),
                    eng_dsl::leave_days.eq(None::<i32>),
                    eng_dsl::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;

            let audit = Modification::new(
                &engagement.id,
                &ModificationPayload::VacationCancelled {
                    start: leave_start,
                    end: leave_end,
                    total_days,
                    reversed_amount: reversed_amount.clone(),
                },
                actor,
            )?;
            diesel::insert_into(mod_dsl::bk_modification)
                .values(&audit)
                .execute(conn)?;

            Ok(LeaveReversal {
                engagement_id: engagement.id,
                total_days,
                reversed_amount,
            })
        })
        .await
    }
}
