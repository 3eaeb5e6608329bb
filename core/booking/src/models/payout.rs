use chrono::{NaiveDateTime, Utc};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bigdecimal::BigDecimal;
use servease_persistence::types::BigDecimalField;

use crate::models::db_text_enum;
use crate::schema::bk_payout;

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
pub enum PayoutStatus {
    Initiated,
    Success,
    Failed,
}

db_text_enum!(PayoutStatus);

#[derive(Queryable, Insertable, Identifiable, Debug, Clone)]
#[table_name = "bk_payout"]
pub struct Payout {
    pub id: String,
    pub provider_id: i64,
    pub engagement_id: String,
    pub gross_amount: BigDecimalField,
    pub provider_fee: BigDecimalField,
    pub tds_amount: BigDecimalField,
    pub net_amount: BigDecimalField,
    pub payout_mode: Option<String>,
    pub status: PayoutStatus,
    pub created_at: NaiveDateTime,
}

impl Payout {
    pub fn initiated(
        provider_id: i64,
        engagement_id: String,
        gross_amount: BigDecimal,
        provider_fee: BigDecimal,
        net_amount: BigDecimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            provider_id,
            engagement_id,
            gross_amount: gross_amount.into(),
            provider_fee: provider_fee.into(),
            tds_amount: Default::default(),
            net_amount: net_amount.into(),
            payout_mode: None,
            status: PayoutStatus::Initiated,
            created_at: Utc::now().naive_utc(),
        }
    }
}
