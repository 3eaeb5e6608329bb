use chrono::{NaiveDateTime, Utc};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use servease_persistence::types::BigDecimalField;

use crate::models::db_text_enum;
use crate::schema::{bk_wallet, bk_wallet_tx};

/// Stored as a single character, like the original schema splits customer
/// and provider wallets into two tables keyed by owner.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, AsExpression, FromSqlRow, Serialize, Deserialize,
    strum::Display, strum::EnumString,
)]
#[sql_type = "Text"]
pub enum OwnerKind {
    #[strum(serialize = "C")]
    Customer,
    #[strum(serialize = "P")]
    Provider,
}

db_text_enum!(OwnerKind);

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
pub enum TxType {
    Credit,
    Debit,
    Refund,
    Adjustment,
}

impl TxType {
    /// CREDIT and REFUND add to the balance, DEBIT and ADJUSTMENT subtract.
    pub fn is_credit(self) -> bool {
        matches!(self, TxType::Credit | TxType::Refund)
    }
}

db_text_enum!(TxType);

#[derive(Queryable, Insertable, Identifiable, Debug, Clone)]
#[table_name = "bk_wallet"]
pub struct Wallet {
    pub id: String,
    pub owner_kind: OwnerKind,
    pub owner_id: i64,
    pub balance: BigDecimalField,
    pub security_deposit_collected: BigDecimalField,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Wallet {
    pub fn new(owner_kind: OwnerKind, owner_id: i64) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_kind,
            owner_id,
            balance: Default::default(),
            security_deposit_collected: Default::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// One immutable ledger row. Never updated, never deleted; replaying them
/// in creation order must reproduce the wallet balance.
#[derive(Queryable, Insertable, Identifiable, Debug, Clone)]
#[table_name = "bk_wallet_tx"]
pub struct WalletTx {
    pub id: String,
    pub wallet_id: String,
    pub engagement_id: Option<String>,
    pub tx_type: TxType,
    pub amount: BigDecimalField,
    pub description: String,
    pub balance_after: BigDecimalField,
    pub created_at: NaiveDateTime,
}
