use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use servease_persistence::types::BigDecimalField;

use crate::models::db_text_enum;
use crate::schema::bk_customer_leave;

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
pub enum LeaveStatus {
    Approved,
    Cancelled,
}

db_text_enum!(LeaveStatus);

#[derive(Queryable, Insertable, Identifiable, Debug, Clone)]
#[table_name = "bk_customer_leave"]
pub struct CustomerLeave {
    pub id: String,
    pub customer_id: i64,
    pub engagement_id: String,
    pub leave_start: NaiveDate,
    pub leave_end: NaiveDate,
    pub total_days: i32,
    pub refund_amount: BigDecimalField,
    pub status: LeaveStatus,
    pub created_at: NaiveDateTime,
}

impl CustomerLeave {
    pub fn approved(
        customer_id: i64,
        engagement_id: String,
        leave_start: NaiveDate,
        leave_end: NaiveDate,
        total_days: i32,
        refund_amount: BigDecimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            customer_id,
            engagement_id,
            leave_start,
            leave_end,
            total_days,
            refund_amount: refund_amount.into(),
            status: LeaveStatus::Approved,
            created_at: Utc::now().naive_utc(),
        }
    }
}
