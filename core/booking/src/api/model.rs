//! Wire representations of the booking entities. Database rows keep their
//! storage-oriented field types; everything crossing the HTTP boundary is
//! mapped through the structs here.

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::dao;
use crate::models::engagement::{self, AssignmentStatus, BookingType, TaskStatus};
use crate::models::leave::{CustomerLeave, LeaveStatus};
use crate::models::modification::{ActorRole, Modification, ModificationType};
use crate::models::payment::{self, PaymentMode, PaymentStatus};
use crate::models::payout::{self, PayoutStatus};
use crate::models::wallet::{TxType, Wallet, WalletTx};

fn parse_json(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or(serde_json::Value::Null)
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateEngagementRequest {
    pub customer_id: i64,
    /// 0 and absent both mean "no provider yet".
    #[serde(default)]
    pub provider_id: Option<i64>,
    pub booking_type: BookingType,
    pub service_type: String,
    pub base_amount: BigDecimal,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// "HH:MM" or "HH:MM:SS".
    pub start_time: String,
    #[serde(default)]
    pub responsibilities: Option<serde_json::Value>,
    #[serde(default)]
    pub payment_mode: Option<PaymentMode>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveAction {
    Apply,
    Cancel,
}

impl Default for LeaveAction {
    fn default() -> Self {
        LeaveAction::Apply
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VacationPatch {
    #[serde(default)]
    pub action: LeaveAction,
    #[serde(default)]
    pub leave_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub leave_end_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateEngagementRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsibilities: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_type: Option<BookingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_amount: Option<BigDecimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vacation: Option<VacationPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by_role: Option<ActorRole>,
}

impl UpdateEngagementRequest {
    pub fn has_field_updates(&self) -> bool {
        self.start_date.is_some()
            || self.end_date.is_some()
            || self.start_time.is_some()
            || self.end_time.is_some()
            || self.responsibilities.is_some()
            || self.booking_type.is_some()
            || self.service_type.is_some()
            || self.task_status.is_some()
            || self.active.is_some()
            || self.base_amount.is_some()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct LeaveRequest {
    pub engagement_id: String,
    pub leave_start_date: NaiveDate,
    pub leave_end_date: NaiveDate,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AcceptRequest {
    pub provider_id: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub order_ref: String,
    pub payment_ref: String,
    #[serde(default)]
    pub signature: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FailPaymentRequest {
    pub order_ref: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Engagement {
    pub id: String,
    pub customer_id: i64,
    pub provider_id: Option<i64>,
    pub booking_type: BookingType,
    pub service_type: String,
    pub responsibilities: serde_json::Value,
    pub base_amount: BigDecimal,
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

impl From<engagement::ReadObj> for Engagement {
    fn from(e: engagement::ReadObj) -> Self {
        Self {
            responsibilities: parse_json(&e.responsibilities),
            id: e.id,
            customer_id: e.customer_id,
            provider_id: e.provider_id,
            booking_type: e.booking_type,
            service_type: e.service_type,
            base_amount: e.base_amount.into(),
            start_date: e.start_date,
            end_date: e.end_date,
            start_time: e.start_time,
            end_time: e.end_time,
            task_status: e.task_status,
            assignment_status: e.assignment_status,
            active: e.active,
            vacation_start: e.vacation_start,
            vacation_end: e.vacation_end,
            leave_days: e.leave_days,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Payment {
    pub id: String,
    pub engagement_id: String,
    pub base_amount: BigDecimal,
    pub platform_fee: BigDecimal,
    pub gst: BigDecimal,
    pub total_amount: BigDecimal,
    pub payment_mode: PaymentMode,
    pub order_ref: Option<String>,
    pub transaction_id: Option<String>,
    pub status: PaymentStatus,
    pub created_at: NaiveDateTime,
}

impl From<payment::ReadObj> for Payment {
    fn from(p: payment::ReadObj) -> Self {
        Self {
            id: p.id,
            engagement_id: p.engagement_id,
            base_amount: p.base_amount.into(),
            platform_fee: p.platform_fee.into(),
            gst: p.gst.into(),
            total_amount: p.total_amount.into(),
            payment_mode: p.payment_mode,
            order_ref: p.order_ref,
            transaction_id: p.transaction_id,
            status: p.status,
            created_at: p.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Payout {
    pub id: String,
    pub provider_id: i64,
    pub engagement_id: String,
    pub gross_amount: BigDecimal,
    pub provider_fee: BigDecimal,
    pub tds_amount: BigDecimal,
    pub net_amount: BigDecimal,
    pub payout_mode: Option<String>,
    pub status: PayoutStatus,
    pub created_at: NaiveDateTime,
}

impl From<payout::Payout> for Payout {
    fn from(p: payout::Payout) -> Self {
        Self {
            id: p.id,
            provider_id: p.provider_id,
            engagement_id: p.engagement_id,
            gross_amount: p.gross_amount.into(),
            provider_fee: p.provider_fee.into(),
            tds_amount: p.tds_amount.into(),
            net_amount: p.net_amount.into(),
            payout_mode: p.payout_mode,
            status: p.status,
            created_at: p.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct WalletInfo {
    pub wallet_id: String,
    pub owner_id: i64,
    pub balance: BigDecimal,
    pub security_deposit_collected: BigDecimal,
}

impl From<Wallet> for WalletInfo {
    fn from(w: Wallet) -> Self {
        Self {
            wallet_id: w.id,
            owner_id: w.owner_id,
            balance: w.balance.into(),
            security_deposit_collected: w.security_deposit_collected.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct WalletTxInfo {
    pub id: String,
    pub engagement_id: Option<String>,
    pub tx_type: TxType,
    pub amount: BigDecimal,
    pub description: String,
    pub balance_after: BigDecimal,
    pub created_at: NaiveDateTime,
}

impl From<WalletTx> for WalletTxInfo {
    fn from(tx: WalletTx) -> Self {
        Self {
            id: tx.id,
            engagement_id: tx.engagement_id,
            tx_type: tx.tx_type,
            amount: tx.amount.into(),
            description: tx.description,
            balance_after: tx.balance_after.into(),
            created_at: tx.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ModificationInfo {
    pub id: String,
    pub modification_type: ModificationType,
    pub payload: serde_json::Value,
    pub actor_id: Option<i64>,
    pub actor_role: Option<ActorRole>,
    pub modified_at: NaiveDateTime,
}

impl From<Modification> for ModificationInfo {
    fn from(m: Modification) -> Self {
        Self {
            payload: parse_json(&m.payload),
            id: m.id,
            modification_type: m.modification_type,
            actor_id: m.actor_id,
            actor_role: m.actor_role,
            modified_at: m.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct LeaveInfo {
    pub id: String,
    pub customer_id: i64,
    pub engagement_id: String,
    pub leave_start_date: NaiveDate,
    pub leave_end_date: NaiveDate,
    pub total_days: i32,
    pub refund_amount: BigDecimal,
    pub status: LeaveStatus,
}

impl From<CustomerLeave> for LeaveInfo {
    fn from(l: CustomerLeave) -> Self {
        Self {
            id: l.id,
            customer_id: l.customer_id,
            engagement_id: l.engagement_id,
            leave_start_date: l.leave_start,
            leave_end_date: l.leave_end,
            total_days: l.total_days,
            refund_amount: l.refund_amount.into(),
            status: l.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedBookingResponse {
    pub message: String,
    pub engagement: Engagement,
    pub payment: Payment,
    pub payout: Option<Payout>,
    pub provider_wallet: Option<WalletInfo>,
}

impl From<dao::CreatedBooking> for CreatedBookingResponse {
    fn from(created: dao::CreatedBooking) -> Self {
        Self {
            message: "Engagement, payment, provider wallet, and payout created successfully"
                .to_string(),
            engagement: created.engagement.into(),
            payment: created.payment.into(),
            payout: created.payout.map(Into::into),
            provider_wallet: created.provider_wallet.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EngagementWithHistory {
    #[serde(flatten)]
    pub engagement: Engagement,
    pub modifications: Vec<ModificationInfo>,
}

#[derive(Debug, Serialize)]
pub struct CustomerBookingsResponse {
    pub success: bool,
    pub upcoming: Vec<EngagementWithHistory>,
    pub ongoing: Vec<EngagementWithHistory>,
    pub past: Vec<EngagementWithHistory>,
}

#[derive(Debug, Serialize)]
pub struct RefundInfo {
    pub vacation_amount: BigDecimal,
    pub wallet_credit: BigDecimal,
    pub platform_share: BigDecimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalty: Option<BigDecimal>,
}

#[derive(Debug, Serialize)]
pub struct LeaveResponse {
    pub message: String,
    pub leave: LeaveInfo,
    pub refund: RefundInfo,
    pub wallet: WalletInfo,
    pub transaction: WalletTxInfo,
}

impl From<dao::LeaveOutcome> for LeaveResponse {
    fn from(outcome: dao::LeaveOutcome) -> Self {
        Self {
            message: "Vacation applied successfully".to_string(),
            leave: outcome.leave.into(),
            refund: RefundInfo {
                vacation_amount: outcome.vacation_amount,
                wallet_credit: outcome.wallet_credit,
                platform_share: outcome.platform_share,
                penalty: outcome.penalty,
            },
            wallet: outcome.customer_wallet.into(),
            transaction: outcome.credit_tx.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LeaveCancelledResponse {
    pub message: String,
    pub engagement_id: String,
    pub total_days: i32,
    pub reversed_amount: BigDecimal,
}

impl From<dao::LeaveReversal> for LeaveCancelledResponse {
    fn from(reversal: dao::LeaveReversal) -> Self {
        Self {
            message: "Vacation cancelled".to_string(),
            engagement_id: reversal.engagement_id,
            total_days: reversal.total_days,
            reversed_amount: reversal.reversed_amount,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WalletResponse {
    pub customer_id: i64,
    pub wallet_id: String,
    pub balance: BigDecimal,
    pub transactions: Vec<WalletTxInfo>,
}

#[derive(Debug, Serialize)]
pub struct SettlementResponse {
    pub message: String,
    pub payment: Payment,
}

#[derive(Debug, Serialize)]
pub struct PayoutSummary {
    pub total_earned: BigDecimal,
    pub total_withdrawn: BigDecimal,
    pub available_to_withdraw: BigDecimal,
    pub security_deposit_paid: bool,
    pub security_deposit_amount: BigDecimal,
}

#[derive(Debug, Serialize)]
pub struct PayoutSummaryResponse {
    pub success: bool,
    pub provider_id: i64,
    pub month: Option<String>,
    pub summary: PayoutSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payouts: Option<Vec<Payout>>,
}

#[derive(Debug, Serialize)]
pub struct ProviderEngagementsResponse {
    pub success: bool,
    pub provider_id: i64,
    pub current: Vec<Engagement>,
    pub past: Vec<Engagement>,
}
