use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use servease_persistence::types::BigDecimalField;

use crate::models::db_text_enum;
use crate::schema::bk_engagement;

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
pub enum BookingType {
    OnDemand,
    Monthly,
    ShortTerm,
}

db_text_enum!(BookingType);

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
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Completed,
    Cancelled,
}

db_text_enum!(TaskStatus);

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
pub enum AssignmentStatus {
    Unassigned,
    Assigned,
}

db_text_enum!(AssignmentStatus);

/// Where an engagement sits relative to the business calendar "today".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookingPhase {
    Upcoming,
    Ongoing,
    Past,
}

#[derive(Queryable, Debug, Identifiable, Clone)]
#[table_name = "bk_engagement"]
pub struct ReadObj {
    pub id: String,
    pub customer_id: i64,
    pub provider_id: Option<i64>,
    pub booking_type: BookingType,
    pub service_type: String,
    pub responsibilities: String,
    pub base_amount: BigDecimalField,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub task_status: TaskStatus,
    pub assignment_status: AssignmentStatus,
    pub active: bool,
    pub vacation_start: Option<NaiveDate>,
    pub vacation_end: Option<NaiveDate>,
    pub leave_days: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ReadObj {
    pub fn phase(&self, today: NaiveDate) -> BookingPhase {
        if today < self.start_date {
            BookingPhase::Upcoming
        } else if today > self.end_date {
            BookingPhase::Past
        } else {
            BookingPhase::Ongoing
        }
    }
}

#[derive(Debug, Insertable)]
#[table_name = "bk_engagement"]
pub struct WriteObj {
    pub id: String,
    pub customer_id: i64,
    pub provider_id: Option<i64>,
    pub booking_type: BookingType,
    pub service_type: String,
    pub responsibilities: String,
    pub base_amount: BigDecimalField,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub task_status: TaskStatus,
    pub assignment_status: AssignmentStatus,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl WriteObj {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        customer_id: i64,
        provider_id: Option<i64>,
        booking_type: BookingType,
        service_type: String,
        responsibilities: String,
        base_amount: BigDecimalField,
        start_date: NaiveDate,
        end_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        assignment_status: AssignmentStatus,
    ) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            customer_id,
            provider_id,
            booking_type,
            service_type,
            responsibilities,
            base_amount,
            start_date,
            end_date,
            start_time,
            end_time,
            task_status: TaskStatus::NotStarted,
            assignment_status,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Field-update patch. `None` fields are left untouched, which makes the
/// dynamic field list injection-safe by construction.
#[derive(AsChangeset, Debug, Default)]
#[table_name = "bk_engagement"]
pub struct Patch {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub responsibilities: Option<String>,
    pub booking_type: Option<BookingType>,
    pub service_type: Option<String>,
    pub task_status: Option<TaskStatus>,
    pub active: Option<bool>,
    pub base_amount: Option<BigDecimalField>,
}

impl Patch {
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.responsibilities.is_none()
            && self.booking_type.is_none()
            && self.service_type.is_none()
            && self.task_status.is_none()
            && self.active.is_none()
            && self.base_amount.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_type_round_trips_through_text() {
        assert_eq!(BookingType::OnDemand.to_string(), "ON_DEMAND");
        assert_eq!(
            "SHORT_TERM".parse::<BookingType>().unwrap(),
            BookingType::ShortTerm
        );
        assert!("GIG".parse::<BookingType>().is_err());
    }

    #[test]
    fn phase_is_derived_from_date_range() {
        let e = WriteObj::new(
            1,
            Some(2),
            BookingType::Monthly,
            "MAID".into(),
            "[]".into(),
            bigdecimal::BigDecimal::from(3000).into(),
            NaiveDate::from_ymd(2025, 7, 10),
            NaiveDate::from_ymd(2025, 7, 20),
            NaiveTime::from_hms(9, 0, 0),
            NaiveTime::from_hms(10, 0, 0),
            AssignmentStatus::Assigned,
        );
        let read = ReadObj {
            id: e.id.clone(),
            customer_id: e.customer_id,
            provider_id: e.provider_id,
            booking_type: e.booking_type,
            service_type: e.service_type.clone(),
            responsibilities: e.responsibilities.clone(),
            base_amount: e.base_amount.clone(),
            start_date: e.start_date,
            end_date: e.end_date,
            start_time: e.start_time,
            end_time: e.end_time,
            task_status: e.task_status,
            assignment_status: e.assignment_status,
            active: e.active,
            vacation_start: None,
            vacation_end: None,
            leave_days: None,
            created_at: e.created_at,
            updated_at: e.updated_at,
        };
        assert_eq!(read.phase(NaiveDate::from_ymd(2025, 7, 1)), BookingPhase::Upcoming);
        assert_eq!(read.phase(NaiveDate::from_ymd(2025, 7, 15)), BookingPhase::Ongoing);
        assert_eq!(read.phase(NaiveDate::from_ymd(2025, 8, 1)), BookingPhase::Past);
    }
}
