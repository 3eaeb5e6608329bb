use std::sync::Arc;

use chrono::{Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use metrics::counter;
use uuid::Uuid;

use servease_persistence::executor::DbExecutor;

use crate::api::model::{
    CreateEngagementRequest, LeaveAction, LeaveRequest, UpdateEngagementRequest,
    VerifyPaymentRequest,
};
use crate::config::Config;
use crate::dao::{
    CreatedBooking, EngagementDao, LeaveDao, LeaveOutcome, LeaveReversal, PaymentDao, Settlement,
};
use crate::discovery;
use crate::error::{Error, Result};
use crate::fees::FeeBreakdown;
use crate::gateway::PaymentGateway;
use crate::models::engagement::{self, AssignmentStatus, BookingType, Patch};
use crate::models::modification::{Actor, ActorRole};
use crate::models::payment::{self, PaymentMode};
use crate::notify::{BookingNotifier, ProviderEvent};

const ON_DEMAND_DURATION_HOURS: i64 = 2;
const STANDARD_DURATION_HOURS: i64 = 1;

/// The business calendar is pinned to IST, like the original deployment;
/// "today" must not drift with the server timezone.
const BUSINESS_UTC_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

pub fn business_today() -> NaiveDate {
    Utc::now()
        .with_timezone(&FixedOffset::east(BUSINESS_UTC_OFFSET_SECS))
        .date_naive()
}

pub fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| Error::bad_request(format!("invalid time '{}', expected HH:MM", value)))
}

#[derive(Debug)]
pub enum UpdateOutcome {
    Updated(engagement::ReadObj),
    LeaveApplied(LeaveOutcome),
    LeaveCancelled(LeaveReversal),
}

/// Owns every multi-step booking flow. Database atomicity lives in the
/// DAOs; this layer adds validation, the injected gateway, and the
/// advisory side effects (discovery fan-out, notifications, counters) that
/// must stay outside the transactions.
#[derive(Clone)]
pub struct BookingProcessor {
    db: DbExecutor,
    gateway: Arc<dyn PaymentGateway>,
    notifier: BookingNotifier,
    config: Arc<Config>,
}

impl BookingProcessor {
    pub fn new(
        db: DbExecutor,
        gateway: Arc<dyn PaymentGateway>,
        notifier: BookingNotifier,
        config: Config,
    ) -> Self {
        Self {
            db,
            gateway,
            notifier,
            config: Arc::new(config),
        }
    }

    pub fn notifier(&self) -> &BookingNotifier {
        &self.notifier
    }

    pub async fn create_booking(&self, request: CreateEngagementRequest) -> Result<CreatedBooking> {
        if request.customer_id <= 0 {
            return Err(Error::bad_request("customer_id is required"));
        }
        let provider_id = request.provider_id.filter(|id| *id > 0);
        let assignment_status = match provider_id {
            Some(_) => AssignmentStatus::Assigned,
            None if request.booking_type == BookingType::OnDemand => AssignmentStatus::Unassigned,
            None => {
                return Err(Error::bad_request(format!(
                    "{} bookings require a provider",
                    request.booking_type
                )))
            }
        };

        let start_time = parse_time(&request.start_time)?;
        let duration = match request.booking_type {
            BookingType::OnDemand => ON_DEMAND_DURATION_HOURS,
            _ => STANDARD_DURATION_HOURS,
        };
        let (end_time, wrapped) = start_time.overflowing_add_signed(Duration::hours(duration));
        if wrapped != 0 || end_time <= start_time {
            return Err(Error::bad_request(
                "engagement time window cannot run past midnight",
            ));
        }

        let start_date = request.start_date;
        let end_date = match request.booking_type {
            // A single visit; the availability reservation is one row.
            BookingType::OnDemand => start_date,
            _ => request.end_date.unwrap_or(start_date),
        };
        if end_date < start_date {
            return Err(Error::bad_request("end_date precedes start_date"));
        }

        let fees = FeeBreakdown::from_base(&request.base_amount)?;
        let payment_mode = request.payment_mode.unwrap_or(PaymentMode::Gateway);
        let order_ref = match payment_mode {
            PaymentMode::Gateway => {
                // Outside the DB transaction on purpose: an abort after this
                // point leaves a dangling, never-settled order at the
                // gateway, which reconciles through the recorded order ref.
                let receipt = format!("bk_{}", Uuid::new_v4().to_simple());
                Some(
                    self.gateway
                        .create_order(
                            fees.total_minor_units()?,
                            &self.config.gateway.currency,
                            &receipt,
                        )
                        .await?,
                )
            }
            _ => None,
        };

        let responsibilities = request
            .responsibilities
            .map(|v| v.to_string())
            .unwrap_or_else(|| "[]".to_string());
        let engagement = engagement::WriteObj::new(
            request.customer_id,
            provider_id,
            request.booking_type,
            request.service_type,
            responsibilities,
            request.base_amount.into(),
            start_date,
            end_date,
            start_time,
            end_time,
            assignment_status,
        );
        let payment =
            payment::WriteObj::new_pending(engagement.id.clone(), &fees, payment_mode, order_ref);

        let created = self
            .db
            .as_dao::<EngagementDao>()
            .create(engagement, payment)
            .await?;
        counter!("booking.engagement.created", 1);

        if created.engagement.assignment_status == AssignmentStatus::Unassigned {
            self.fan_out_available(&created, request.latitude, request.longitude)
                .await;
        }
        Ok(created)
    }

    /// Advisory discovery fan-out after commit. Nothing here may fail the
    /// booking; problems are only logged.
    async fn fan_out_available(
        &self,
        created: &CreatedBooking,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) {
        let (lat, lon) = match (latitude, longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                log::debug!(
                    "engagement {} has no customer coordinates, skipping discovery",
                    created.engagement.id
                );
                return;
            }
        };
        let radius = self.config.booking.discovery_radius_km;
        match discovery::nearby_providers(&self.db, lat, lon, radius).await {
            Ok(provider_ids) => {
                log::info!(
                    "engagement {}: notifying {} providers within {} km",
                    created.engagement.id,
                    provider_ids.len(),
                    radius
                );
                for provider_id in provider_ids {
                    self.notifier.publish(ProviderEvent::BookingAvailable {
                        provider_id,
                        engagement_id: created.engagement.id.clone(),
                        service_type: created.engagement.service_type.clone(),
                        start_date: created.engagement.start_date,
                        end_date: created.engagement.end_date,
                        start_time: created.engagement.start_time,
                        total_amount: created.payment.total_amount.0.clone(),
                    });
                }
            }
            Err(e) => log::warn!(
                "provider discovery failed for engagement {}: {}",
                created.engagement.id,
                e
            ),
        }
    }

    /// Assignment race entry point; at most one caller per engagement ever
    /// gets an `Ok` out of this.
    pub async fn accept(&self, engagement_id: String, provider_id: i64) -> Result<engagement::ReadObj> {
        if provider_id <= 0 {
            return Err(Error::bad_request("provider_id is required"));
        }
        let engagement = self
            .db
            .as_dao::<EngagementDao>()
            .accept(engagement_id, provider_id)
            .await?;
        counter!("booking.engagement.accepted", 1);
        self.notifier.publish(ProviderEvent::BookingAssigned {
            provider_id,
            engagement_id: engagement.id.clone(),
        });
        Ok(engagement)
    }

    pub async fn verify_payment(&self, request: VerifyPaymentRequest) -> Result<Settlement> {
        if self.config.gateway.skip_signature_verification {
            log::warn!("skipping gateway signature verification (dev mode)");
        } else if !self.gateway.verify_signature(
            &request.order_ref,
            &request.payment_ref,
            &request.signature,
        ) {
            return Err(Error::PaymentRejected("invalid payment signature".into()));
        }
        let settlement = self
            .db
            .as_dao::<PaymentDao>()
            .settle(request.order_ref, request.payment_ref)
            .await?;
        if let Settlement::Settled(receipt) = &settlement {
            counter!("booking.payment.settled", 1);
            log::info!(
                "settled payment {} and credited provider {} with {}",
                receipt.payment.id,
                receipt.provider_id,
                receipt.provider_credit
            );
        }
        Ok(settlement)
    }

    pub async fn fail_payment(&self, order_ref: String) -> Result<payment::ReadObj> {
        let payment = self.db.as_dao::<PaymentDao>().mark_failed(order_ref).await?;
        counter!("booking.payment.failed", 1);
        Ok(payment)
    }

    pub async fn apply_leave(
        &self,
        customer_id: i64,
        request: LeaveRequest,
        actor: Actor,
    ) -> Result<LeaveOutcome> {
        let outcome = self
            .db
            .as_dao::<LeaveDao>()
            .apply(
                request.engagement_id,
                customer_id,
                request.leave_start_date,
                request.leave_end_date,
                self.config.booking.leave_modification_penalty.clone(),
                actor,
            )
            .await?;
        counter!("booking.leave.applied", 1);
        Ok(outcome)
    }

    pub async fn cancel_leave(
        &self,
        engagement_id: String,
        customer_id: i64,
        actor: Actor,
    ) -> Result<LeaveReversal> {
        let reversal = self
            .db
            .as_dao::<LeaveDao>()
            .cancel(engagement_id, customer_id, actor)
            .await?;
        counter!("booking.leave.cancelled", 1);
        Ok(reversal)
    }

    /// `PUT /engagements/{id}`: field-update mode and vacation mode are
    /// mutually exclusive, chosen by the presence of the vacation block.
    pub async fn update_booking(
        &self,
        engagement_id: String,
        request: UpdateEngagementRequest,
    ) -> Result<UpdateOutcome> {
        let actor = Actor {
            id: request.modified_by_id,
            role: request.modified_by_role,
        };

        if let Some(vacation) = request.vacation.clone() {
            if request.has_field_updates() {
                return Err(Error::bad_request(
                    "field updates and vacation changes are mutually exclusive",
                ));
            }
            let engagement = self
                .db
                .as_dao::<EngagementDao>()
                .get(engagement_id.clone())
                .await?
                .ok_or_else(|| Error::not_found(format!("engagement {}", engagement_id)))?;
            return match vacation.action {
                LeaveAction::Apply => {
                    let (start, end) = match (vacation.leave_start_date, vacation.leave_end_date) {
                        (Some(start), Some(end)) => (start, end),
                        _ => {
                            return Err(Error::bad_request(
                                "vacation requires leave_start_date and leave_end_date",
                            ))
                        }
                    };
                    let outcome = self
                        .db
                        .as_dao::<LeaveDao>()
                        .apply(
                            engagement.id,
                            engagement.customer_id,
                            start,
                            end,
                            self.config.booking.leave_modification_penalty.clone(),
                            actor,
                        )
                        .await?;
                    counter!("booking.leave.applied", 1);
                    Ok(UpdateOutcome::LeaveApplied(outcome))
                }
                LeaveAction::Cancel => {
                    let reversal = self
                        .db
                        .as_dao::<LeaveDao>()
                        .cancel(engagement.id, engagement.customer_id, actor)
                        .await?;
                    counter!("booking.leave.cancelled", 1);
                    Ok(UpdateOutcome::LeaveCancelled(reversal))
                }
            };
        }

        let patch = Patch {
            start_date: request.start_date,
            end_date: request.end_date,
            start_time: request.start_time.as_deref().map(parse_time).transpose()?,
            end_time: request.end_time.as_deref().map(parse_time).transpose()?,
            responsibilities: request.responsibilities.as_ref().map(|v| v.to_string()),
            booking_type: request.booking_type,
            service_type: request.service_type.clone(),
            task_status: request.task_status,
            active: request.active,
            base_amount: match &request.base_amount {
                Some(amount) if amount <= &bigdecimal::BigDecimal::from(0) => {
                    return Err(Error::bad_request("base_amount must be positive"))
                }
                other => other.clone().map(Into::into),
            },
        };
        if patch.is_empty() {
            return Err(Error::bad_request("no fields provided for update"));
        }
        let raw_patch = serde_json::to_value(&request)
            .map_err(|e| Error::internal(format!("patch serialization: {}", e)))?;
        let updated = self
            .db
            .as_dao::<EngagementDao>()
            .update_fields(engagement_id, patch, raw_patch, actor)
            .await?;
        Ok(UpdateOutcome::Updated(updated))
    }

    pub async fn cancel_booking(
        &self,
        engagement_id: String,
        actor_id: Option<i64>,
        actor_role: Option<ActorRole>,
    ) -> Result<engagement::ReadObj> {
        self.db
            .as_dao::<EngagementDao>()
            .cancel(
                engagement_id,
                Actor {
                    id: actor_id,
                    role: actor_role,
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn times_accept_both_precisions() {
        assert_eq!(parse_time("09:30").unwrap(), NaiveTime::from_hms(9, 30, 0));
        assert_eq!(
            parse_time("09:30:15").unwrap(),
            NaiveTime::from_hms(9, 30, 15)
        );
        assert!(parse_time("9 am").is_err());
    }
}
