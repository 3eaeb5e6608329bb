use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use diesel::prelude::*;

use servease_persistence::executor::{readonly_transaction, AsDao, ConnType, PoolType};
use servease_persistence::types::BigDecimalField;

use crate::error::Result;
use crate::models::payout::Payout;
use crate::schema::bk_payout::dsl;

/// Shrinks the engagement's payout by a vacation adjustment. Runs on the
/// caller's connection, inside the leave transaction.
pub fn decrement_net(conn: &ConnType, engagement_id: &str, amount: &BigDecimal) -> Result<()> {
    let payout: Option<Payout> = dsl::bk_payout
        .filter(dsl::engagement_id.eq(engagement_id))
        .first(conn)
        .optional()?;
    match payout {
        Some(payout) => {
            let net = &payout.net_amount.0 - amount;
            diesel::update(dsl::bk_payout.find(&payout.id))
                .set(dsl::net_amount.eq(BigDecimalField(net)))
                .execute(conn)?;
            Ok(())
        }
        None => {
            log::warn!(
                "no payout recorded for engagement {}, skipping adjustment",
                engagement_id
            );
            Ok(())
        }
    }
}

pub struct PayoutDao<'c> {
    pool: &'c PoolType,
}

impl<'c> AsDao<'c> for PayoutDao<'c> {
    fn as_dao(pool: &'c PoolType) -> Self {
        Self { pool }
    }
}

impl<'c> PayoutDao<'c> {
    /// Payouts for a provider, oldest first, optionally limited to one
    /// calendar month (matched on creation time).
    pub async fn for_provider(
        &self,
        provider_id: i64,
        month: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<Payout>> {
        readonly_transaction(self.pool, move |conn| {
            let mut query = dsl::bk_payout
                .filter(dsl::provider_id.eq(provider_id))
                .into_boxed();
            if let Some((from, to)) = month {
                let from = from.and_hms(0, 0, 0);
                let until = (to + chrono::Duration::days(1)).and_hms(0, 0, 0);
                query = query
                    .filter(dsl::created_at.ge(from))
                    .filter(dsl::created_at.lt(until));
            }
            Ok(query.order(dsl::created_at.asc()).load(conn)?)
        })
        .await
    }

    pub async fn for_engagement(&self, engagement_id: String) -> Result<Option<Payout>> {
        readonly_transaction(self.pool, move |conn| {
            Ok(dsl::bk_payout
                .filter(dsl::engagement_id.eq(engagement_id))
                .first(conn)
                .optional()?)
        })
        .await
    }
}
