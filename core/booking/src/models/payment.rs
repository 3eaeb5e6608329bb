use chrono::{NaiveDateTime, Utc};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use servease_persistence::types::BigDecimalField;

use crate::fees::FeeBreakdown;
use crate::models::db_text_enum;
use crate::schema::bk_payment;

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
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

db_text_enum!(PaymentStatus);

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
pub enum PaymentMode {
    Gateway,
    Wallet,
    Cash,
}

db_text_enum!(PaymentMode);

#[derive(Queryable, Debug, Identifiable, Clone)]
#[table_name = "bk_payment"]
pub struct ReadObj {
    pub id: String,
    pub engagement_id: String,
    pub base_amount: BigDecimalField,
    pub platform_fee: BigDecimalField,
    pub gst: BigDecimalField,
    pub total_amount: BigDecimalField,
    pub payment_mode: PaymentMode,
    pub order_ref: Option<String>,
    pub transaction_id: Option<String>,
    pub status: PaymentStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[table_name = "bk_payment"]
pub struct WriteObj {
    pub id: String,
    pub engagement_id: String,
    pub base_amount: BigDecimalField,
    pub platform_fee: BigDecimalField,
    pub gst: BigDecimalField,
    pub total_amount: BigDecimalField,
    pub payment_mode: PaymentMode,
    pub order_ref: Option<String>,
    pub status: PaymentStatus,
    pub created_at: NaiveDateTime,
}

impl WriteObj {
    pub fn new_pending(
        engagement_id: String,
        fees: &FeeBreakdown,
        payment_mode: PaymentMode,
        order_ref: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            engagement_id,
            base_amount: fees.base_amount.clone().into(),
            platform_fee: fees.platform_fee.clone().into(),
            gst: fees.gst.clone().into(),
            total_amount: fees.total_amount.clone().into(),
            payment_mode,
            order_ref,
            status: PaymentStatus::Pending,
            created_at: Utc::now().naive_utc(),
        }
    }
}
