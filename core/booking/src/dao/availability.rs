use chrono::{Duration, NaiveDate, NaiveTime};
use diesel::prelude::*;

use servease_persistence::executor::{readonly_transaction, AsDao, ConnType, PoolType};

use crate::error::Result;
use crate::models::availability::{Slot, SlotStatus};
use crate::schema::bk_availability::dsl;

/// True if the provider already has a BOOKED slot on `day` whose half-open
/// window `[start, end)` intersects the given one. Runs on the caller's
/// connection so the check stays inside the owning transaction.
pub fn has_conflict(
    conn: &ConnType,
    provider_id: i64,
    day: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Result<bool> {
    let slots: Vec<Slot> = dsl::bk_availability
        .filter(dsl::provider_id.eq(provider_id))
        .filter(dsl::day.eq(day))
        .filter(dsl::status.eq(SlotStatus::Booked))
        .load(conn)?;
    Ok(slots.iter().any(|slot| slot.overlaps(start, end)))
}

/// Inserts one BOOKED row per calendar day in `[start_date, end_date]`.
pub fn book(
    conn: &ConnType,
    provider_id: i64,
    engagement_id: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> Result<usize> {
    let mut inserted = 0;
    let mut day = start_date;
    while day <= end_date {
        let slot = Slot::booked(
            provider_id,
            engagement_id.to_string(),
            day,
            start_time,
            end_time,
        );
        diesel::insert_into(dsl::bk_availability)
            .values(&slot)
            .execute(conn)?;
        inserted += 1;
        day = day + Duration::days(1);
    }
    Ok(inserted)
}

/// Flips the engagement's rows in `[from, to]` to the given status;
/// BOOKED -> FREE on leave, back to BOOKED on leave cancellation.
pub fn set_window_status(
    conn: &ConnType,
    engagement_id: &str,
    from: NaiveDate,
    to: NaiveDate,
    status: SlotStatus,
) -> Result<usize> {
    Ok(diesel::update(
        dsl::bk_availability
            .filter(dsl::engagement_id.eq(engagement_id))
            .filter(dsl::day.ge(from))
            .filter(dsl::day.le(to)),
    )
    .set(dsl::status.eq(status))
    .execute(conn)?)
}

pub struct AvailabilityDao<'c> {
    pool: &'c PoolType,
}

impl<'c> AsDao<'c> for AvailabilityDao<'c> {
    fn as_dao(pool: &'c PoolType) -> Self {
        Self { pool }
    }
}

impl<'c> AvailabilityDao<'c> {
    pub async fn for_provider_on(&self, provider_id: i64, day: NaiveDate) -> Result<Vec<Slot>> {
        readonly_transaction(self.pool, move |conn| {
            Ok(dsl::bk_availability
                .filter(dsl::provider_id.eq(provider_id))
                .filter(dsl::day.eq(day))
                .load(conn)?)
        })
        .await
    }

    pub async fn for_engagement(&self, engagement_id: String) -> Result<Vec<Slot>> {
        readonly_transaction(self.pool, move |conn| {
            Ok(dsl::bk_availability
                .filter(dsl::engagement_id.eq(engagement_id))
                .order(dsl::day.asc())
                .load(conn)?)
        })
        .await
    }
}
