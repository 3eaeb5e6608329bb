use chrono::{NaiveDate, NaiveTime};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::db_text_enum;
use crate::schema::bk_availability;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    AsExpression,
    FromSqlRow,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sql_type = "Text"]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    Booked,
    Free,
}

db_text_enum!(SlotStatus);

/// One row per calendar day covered by an engagement.
#[derive(Queryable, Insertable, Identifiable, Debug, Clone)]
#[table_name = "bk_availability"]
pub struct Slot {
    pub id: String,
    pub provider_id: i64,
    pub engagement_id: String,
    pub day: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: SlotStatus,
}

impl Slot {
    pub fn booked(
        provider_id: i64,
        engagement_id: String,
        day: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            provider_id,
            engagement_id,
            day,
            start_time,
            end_time,
            status: SlotStatus::Booked,
        }
    }

    /// Half-open interval overlap; rows that merely touch do not conflict.
    pub fn overlaps(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start_time < end && start < self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(start: (u32, u32), end: (u32, u32)) -> Slot {
        Slot::booked(
            1,
            "e".into(),
            NaiveDate::from_ymd(2025, 7, 14),
            NaiveTime::from_hms(start.0, start.1, 0),
            NaiveTime::from_hms(end.0, end.1, 0),
        )
    }

    #[test]
    fn overlapping_windows_conflict() {
        let s = slot((9, 0), (11, 0));
        assert!(s.overlaps(NaiveTime::from_hms(10, 0, 0), NaiveTime::from_hms(12, 0, 0)));
        assert!(s.overlaps(NaiveTime::from_hms(8, 0, 0), NaiveTime::from_hms(9, 30, 0)));
    }

    #[test]
    fn adjacent_windows_do_not_conflict() {
        let s = slot((9, 0), (11, 0));
        assert!(!s.overlaps(NaiveTime::from_hms(11, 0, 0), NaiveTime::from_hms(13, 0, 0)));
        assert!(!s.overlaps(NaiveTime::from_hms(7, 0, 0), NaiveTime::from_hms(9, 0, 0)));
    }
}
