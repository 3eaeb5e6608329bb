use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::models::db_text_enum;
use crate::schema::bk_modification;

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
pub enum ModificationType {
    FieldUpdate,
    Vacation,
    VacationCancelled,
    Cancelled,
    Assigned,
}

db_text_enum!(ModificationType);

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
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Customer,
    Provider,
    Admin,
}

db_text_enum!(ActorRole);

/// Who performed a mutating action, as reported by the caller.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Actor {
    pub id: Option<i64>,
    pub role: Option<ActorRole>,
}

/// Typed audit payload, one variant per modification kind, replacing the
/// untyped JSON blobs the original kept.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModificationPayload {
    FieldUpdate {
        patch: serde_json::Value,
    },
    Vacation {
        start: NaiveDate,
        end: NaiveDate,
        total_days: i32,
        vacation_amount: BigDecimal,
        wallet_credit: BigDecimal,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        penalty: Option<BigDecimal>,
    },
    VacationCancelled {
        start: NaiveDate,
        end: NaiveDate,
        total_days: i32,
        reversed_amount: BigDecimal,
    },
    Cancelled,
    Assigned {
        provider_id: i64,
    },
}

impl ModificationPayload {
    pub fn kind(&self) -> ModificationType {
        match self {
            ModificationPayload::FieldUpdate { .. } => ModificationType::FieldUpdate,
            ModificationPayload::Vacation { .. } => ModificationType::Vacation,
            ModificationPayload::VacationCancelled { .. } => ModificationType::VacationCancelled,
            ModificationPayload::Cancelled => ModificationType::Cancelled,
            ModificationPayload::Assigned { .. } => ModificationType::Assigned,
        }
    }
}

#[derive(Queryable, Insertable, Identifiable, Debug, Clone)]
#[table_name = "bk_modification"]
pub struct Modification {
    pub id: String,
    pub engagement_id: String,
    pub modification_type: ModificationType,
    pub payload: String,
    pub actor_id: Option<i64>,
    pub actor_role: Option<ActorRole>,
    pub created_at: NaiveDateTime,
}

impl Modification {
    pub fn new(
        engagement_id: &str,
        payload: &ModificationPayload,
        actor: Actor,
    ) -> Result<Self, Error> {
        let serialized = serde_json::to_string(payload)
            .map_err(|e| Error::internal(format!("audit payload serialization: {}", e)))?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            engagement_id: engagement_id.to_string(),
            modification_type: payload.kind(),
            payload: serialized,
            actor_id: actor.id,
            actor_role: actor.role,
            created_at: Utc::now().naive_utc(),
        })
    }
}
