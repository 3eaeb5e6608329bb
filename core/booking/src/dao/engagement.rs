use chrono::{Duration, NaiveDate, Utc};
use diesel::prelude::*;

use servease_persistence::executor::{
    do_with_exclusive_transaction, do_with_transaction, readonly_transaction, AsDao, PoolType,
};

use crate::error::{Error, Result};
use crate::models::engagement::{self, AssignmentStatus, Patch, TaskStatus};
use crate::models::modification::{Actor, Modification, ModificationPayload};
use crate::models::payment;
use crate::models::payout::Payout;
use crate::models::wallet::{OwnerKind, TxType, Wallet};
use crate::schema::bk_customer_leave::dsl as leave_dsl;
use crate::schema::bk_engagement::dsl as eng_dsl;
use crate::schema::bk_modification::dsl as mod_dsl;
use crate::schema::bk_payment::dsl as pay_dsl;
use crate::schema::bk_payout::dsl as payout_dsl;

use super::{availability, wallet};

/// Everything the creation transaction produced, read back after commit so
/// callers see exactly what the ledger recorded.
#[derive(Debug)]
pub struct CreatedBooking {
    pub engagement: engagement::ReadObj,
    pub payment: payment::ReadObj,
    pub payout: Option<Payout>,
    pub provider_wallet: Option<Wallet>,
}

pub struct EngagementDao<'c> {
    pool: &'c PoolType,
}

impl<'c> AsDao<'c> for EngagementDao<'c> {
    fn as_dao(pool: &'c PoolType) -> Self {
        Self { pool }
    }
}

impl<'c> EngagementDao<'c> {
    /// The orchestrator's atomic unit: availability guard, engagement,
    /// pending payment, deposit-aware payout, provider wallet credit and
    /// availability reservation all commit or roll back together.
    pub async fn create(
        &self,
        engagement: engagement::WriteObj,
        payment: payment::WriteObj,
    ) -> Result<CreatedBooking> {
        do_with_transaction(self.pool, move |conn| {
            if let Some(provider_id) = engagement.provider_id {
                let mut day = engagement.start_date;
                while day <= engagement.end_date {
                    if availability::has_conflict(
                        conn,
                        provider_id,
                        day,
                        engagement.start_time,
                        engagement.end_time,
                    )? {
                        return Err(Error::conflict(format!(
                            "provider {} is already booked on {} between {} and {}",
                            provider_id, day, engagement.start_time, engagement.end_time
                        )));
                    }
                    day = day + Duration::days(1);
                }
            }

            diesel::insert_into(eng_dsl::bk_engagement)
                .values(&engagement)
                .execute(conn)?;
            diesel::insert_into(pay_dsl::bk_payment)
                .values(&payment)
                .execute(conn)?;

            let mut payout_row = None;
            let mut provider_wallet = None;
            if let Some(provider_id) = engagement.provider_id {
                let wallet = wallet::get_or_create(conn, OwnerKind::Provider, provider_id)?;
                let deduction = wallet::deposit_deduction(
                    &engagement.base_amount.0,
                    &wallet.security_deposit_collected.0,
                );
                let net = &engagement.base_amount.0 - &deduction;
                wallet::apply_entry(
                    conn,
                    &wallet.id,
                    Some(&engagement.id),
                    TxType::Credit,
                    &net,
                    &format!("Payout for engagement {}", engagement.id),
                )?;
                if deduction > bigdecimal::BigDecimal::from(0) {
                    wallet::add_security_deposit(conn, &wallet.id, &deduction)?;
                }
                let payout = Payout::initiated(
                    provider_id,
                    engagement.id.clone(),
                    engagement.base_amount.0.clone(),
                    deduction,
                    net,
                );
                diesel::insert_into(payout_dsl::bk_payout)
                    .values(&payout)
                    .execute(conn)?;
                availability::book(
                    conn,
                    provider_id,
                    &engagement.id,
                    engagement.start_date,
                    engagement.end_date,
                    engagement.start_time,
                    engagement.end_time,
                )?;
                provider_wallet = Some(wallet::get_by_id(conn, &wallet.id)?);
                payout_row = Some(payout);
            }

            let engagement: engagement::ReadObj =
                eng_dsl::bk_engagement.find(&engagement.id).first(conn)?;
            let payment: payment::ReadObj = pay_dsl::bk_payment.find(&payment.id).first(conn)?;
            Ok(CreatedBooking {
                engagement,
                payment,
                payout: payout_row,
                provider_wallet,
            })
        })
        .await
    }

    /// The assignment arbiter. The EXCLUSIVE transaction plays the role of
    /// a row lock: every concurrent accept serializes here, the first one
    /// flips UNASSIGNED -> ASSIGNED and everyone after it loses with a
    /// conflict.
    pub async fn accept(
        &self,
        engagement_id: String,
        provider_id: i64,
    ) -> Result<engagement::ReadObj> {
        do_with_exclusive_transaction(self.pool, move |conn| {
            let engagement: engagement::ReadObj = eng_dsl::bk_engagement
                .find(&engagement_id)
                .first(conn)
                .optional()?
                .ok_or_else(|| Error::not_found(format!("engagement {}", engagement_id)))?;

            if engagement.assignment_status != AssignmentStatus::Unassigned {
                return Err(Error::conflict(format!(
                    "engagement {} is already assigned",
                    engagement_id
                )));
            }

            let mut day = engagement.start_date;
            while day <= engagement.end_date {
                if availability::has_conflict(
                    conn,
                    provider_id,
                    day,
                    engagement.start_time,
                    engagement.end_time,
                )? {
                    return Err(Error::conflict(format!(
                        "provider {} is already booked on {}",
                        provider_id, day
                    )));
                }
                day = day + Duration::days(1);
            }

            diesel::update(eng_dsl::bk_engagement.find(&engagement_id))
                .set((
                    eng_dsl::provider_id.eq(Some(provider_id)),
                    eng_dsl::assignment_status.eq(AssignmentStatus::Assigned),
                    eng_dsl::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;
            availability::book(
                conn,
                provider_id,
                &engagement_id,
                engagement.start_date,
                engagement.end_date,
                engagement.start_time,
                engagement.end_time,
            )?;
            let audit = Modification::new(
                &engagement_id,
                &ModificationPayload::Assigned { provider_id },
                Actor::default(),
            )?;
            diesel::insert_into(mod_dsl::bk_modification)
                .values(&audit)
                .execute(conn)?;

            Ok(eng_dsl::bk_engagement.find(&engagement_id).first(conn)?)
        })
        .await
    }

    pub async fn get(&self, engagement_id: String) -> Result<Option<engagement::ReadObj>> {
        readonly_transaction(self.pool, move |conn| {
            Ok(eng_dsl::bk_engagement
                .find(engagement_id)
                .first(conn)
                .optional()?)
        })
        .await
    }

    pub async fn list(&self) -> Result<Vec<engagement::ReadObj>> {
        readonly_transaction(self.pool, move |conn| {
            Ok(eng_dsl::bk_engagement
                .order(eng_dsl::created_at.desc())
                .load(conn)?)
        })
        .await
    }

    /// Customer's engagements plus their modification history, newest
    /// modification first.
    pub async fn list_for_customer(
        &self,
        customer_id: i64,
    ) -> Result<(Vec<engagement::ReadObj>, Vec<Modification>)> {
        readonly_transaction(self.pool, move |conn| {
            let engagements: Vec<engagement::ReadObj> = eng_dsl::bk_engagement
                .filter(eng_dsl::customer_id.eq(customer_id))
                .order(eng_dsl::start_date.asc())
                .load(conn)?;
            let ids: Vec<&String> = engagements.iter().map(|e| &e.id).collect();
            let modifications: Vec<Modification> = mod_dsl::bk_modification
                .filter(mod_dsl::engagement_id.eq_any(ids))
                .order(mod_dsl::created_at.desc())
                .load(conn)?;
            Ok((engagements, modifications))
        })
        .await
    }

    pub async fn list_for_provider(
        &self,
        provider_id: i64,
        status: Option<TaskStatus>,
        month: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<engagement::ReadObj>> {
        readonly_transaction(self.pool, move |conn| {
            let mut query = eng_dsl::bk_engagement
                .filter(eng_dsl::provider_id.eq(provider_id))
                .into_boxed();
            if let Some(status) = status {
                query = query.filter(eng_dsl::task_status.eq(status));
            }
            if let Some((from, to)) = month {
                query = query.filter(eng_dsl::start_date.between(from, to));
            }
            Ok(query
                .order((eng_dsl::start_date.desc(), eng_dsl::start_time.asc()))
                .load(conn)?)
        })
        .await
    }

    /// Field-update mode: applies the non-empty patch and records the raw
    /// request payload in the audit trail, in one unit.
    pub async fn update_fields(
        &self,
        engagement_id: String,
        patch: Patch,
        raw_patch: serde_json::Value,
        actor: Actor,
    ) -> Result<engagement::ReadObj> {
        do_with_transaction(self.pool, move |conn| {
            let existing: Option<engagement::ReadObj> = eng_dsl::bk_engagement
                .find(&engagement_id)
                .first(conn)
                .optional()?;
            if existing.is_none() {
                return Err(Error::not_found(format!("engagement {}", engagement_id)));
            }
            diesel::update(eng_dsl::bk_engagement.find(&engagement_id))
                .set((&patch, eng_dsl::updated_at.eq(Utc::now().naive_utc())))
                .execute(conn)?;
            let audit = Modification::new(
                &engagement_id,
                &ModificationPayload::FieldUpdate { patch: raw_patch },
                actor,
            )?;
            diesel::insert_into(mod_dsl::bk_modification)
                .values(&audit)
                .execute(conn)?;
            Ok(eng_dsl::bk_engagement.find(&engagement_id).first(conn)?)
        })
        .await
    }

    pub async fn cancel(&self, engagement_id: String, actor: Actor) -> Result<engagement::ReadObj> {
        do_with_transaction(self.pool, move |conn| {
            let updated = diesel::update(eng_dsl::bk_engagement.find(&engagement_id))
                .set((
                    eng_dsl::task_status.eq(TaskStatus::Cancelled),
                    eng_dsl::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;
            if updated == 0 {
                return Err(Error::not_found(format!("engagement {}", engagement_id)));
            }
            let audit = Modification::new(&engagement_id, &ModificationPayload::Cancelled, actor)?;
            diesel::insert_into(mod_dsl::bk_modification)
                .values(&audit)
                .execute(conn)?;
            Ok(eng_dsl::bk_engagement.find(&engagement_id).first(conn)?)
        })
        .await
    }

    /// Hard delete. Dependent booking rows go with the engagement; wallet
    /// ledger rows survive as history (their engagement ref is informative,
    /// not a constraint).
    pub async fn delete(&self, engagement_id: String) -> Result<()> {
        do_with_transaction(self.pool, move |conn| {
            use crate::schema::bk_availability::dsl as avail_dsl;

            diesel::delete(mod_dsl::bk_modification.filter(mod_dsl::engagement_id.eq(&engagement_id)))
                .execute(conn)?;
            diesel::delete(
                avail_dsl::bk_availability.filter(avail_dsl::engagement_id.eq(&engagement_id)),
            )
            .execute(conn)?;
            diesel::delete(
                leave_dsl::bk_customer_leave.filter(leave_dsl::engagement_id.eq(&engagement_id)),
            )
            .execute(conn)?;
            diesel::delete(payout_dsl::bk_payout.filter(payout_dsl::engagement_id.eq(&engagement_id)))
                .execute(conn)?;
            diesel::delete(pay_dsl::bk_payment.filter(pay_dsl::engagement_id.eq(&engagement_id)))
                .execute(conn)?;
            let deleted =
                diesel::delete(eng_dsl::bk_engagement.find(&engagement_id)).execute(conn)?;
            if deleted == 0 {
                return Err(Error::not_found(format!("engagement {}", engagement_id)));
            }
            Ok(())
        })
        .await
    }
}
