use actix_web::web::{get, Data, Path, Query};
use actix_web::{HttpResponse, Scope};
use bigdecimal::{BigDecimal, Zero};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Deserialize;

use servease_persistence::executor::DbExecutor;

use crate::dao::{EngagementDao, PayoutDao, ProviderDao, WalletDao};
use crate::error::{Error, Result};
use crate::models::engagement::{BookingPhase, TaskStatus};
use crate::models::payout::PayoutStatus;
use crate::models::wallet::OwnerKind;
use crate::processor::business_today;
use crate::utils::response;

use super::model;

pub fn register_endpoints(scope: Scope) -> Scope {
    scope
        .route("/providers/{provider_id}/payouts", get().to(provider_payouts))
        .route(
            "/providers/{provider_id}/engagements",
            get().to(provider_engagements),
        )
}

#[derive(Deserialize)]
struct PayoutQuery {
    month: Option<String>,
    detailed: Option<bool>,
}

#[derive(Deserialize)]
struct EngagementQuery {
    month: Option<String>,
    status: Option<String>,
}

/// Inclusive first/last day of a `YYYY-MM` filter.
fn month_range(month: &str) -> Result<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .map_err(|_| Error::bad_request("Invalid month format. Use YYYY-MM"))?;
    let next_first = if first.month() == 12 {
        NaiveDate::from_ymd(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd(first.year(), first.month() + 1, 1)
    };
    Ok((first, next_first - Duration::days(1)))
}

async fn provider_payouts(
    db: Data<DbExecutor>,
    path: Path<i64>,
    query: Query<PayoutQuery>,
) -> HttpResponse {
    let provider_id = path.into_inner();

    match db.as_dao::<ProviderDao>().get(provider_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return response::not_found(),
        Err(e) => return response::server_error(&e),
    }

    let month = match query.month.as_deref().map(month_range).transpose() {
        Ok(month) => month,
        Err(e) => return response::bad_request(&e),
    };

    let payouts = match db.as_dao::<PayoutDao>().for_provider(provider_id, month).await {
        Ok(payouts) => payouts,
        Err(e) => return response::server_error(&e),
    };

    let total_earned: BigDecimal = payouts
        .iter()
        .fold(BigDecimal::zero(), |acc, p| acc + &p.net_amount.0);
    let total_withdrawn: BigDecimal = payouts
        .iter()
        .filter(|p| p.status == PayoutStatus::Success)
        .fold(BigDecimal::zero(), |acc, p| acc + &p.net_amount.0);
    let available_to_withdraw = &total_earned - &total_withdrawn;

    let deposit = match db
        .as_dao::<WalletDao>()
        .get(OwnerKind::Provider, provider_id)
        .await
    {
        Ok(wallet) => wallet
            .map(|w| BigDecimal::from(w.security_deposit_collected))
            .unwrap_or_else(BigDecimal::zero),
        Err(e) => return response::server_error(&e),
    };

    response::ok(model::PayoutSummaryResponse {
        success: true,
        provider_id,
        month: query.month.clone(),
        summary: model::PayoutSummary {
            total_earned,
            total_withdrawn,
            available_to_withdraw,
            security_deposit_paid: &deposit >= crate::dao::security_deposit_cap(),
            security_deposit_amount: deposit,
        },
        payouts: match query.detailed {
            Some(true) => Some(payouts.into_iter().map(Into::into).collect()),
            _ => None,
        },
    })
}

async fn provider_engagements(
    db: Data<DbExecutor>,
    path: Path<i64>,
    query: Query<EngagementQuery>,
) -> HttpResponse {
    let provider_id = path.into_inner();

    let month = match query.month.as_deref().map(month_range).transpose() {
        Ok(month) => month,
        Err(e) => return response::bad_request(&e),
    };
    let status = match query
        .status
        .as_deref()
        .map(|s| s.parse::<TaskStatus>())
        .transpose()
    {
        Ok(status) => status,
        Err(_) => return response::bad_request(&"invalid status filter"),
    };

    let engagements = match db
        .as_dao::<EngagementDao>()
        .list_for_provider(provider_id, status, month)
        .await
    {
        Ok(engagements) => engagements,
        Err(e) => return response::server_error(&e),
    };

    let today = business_today();
    let mut current = vec![];
    let mut past = vec![];
    for engagement in engagements {
        match engagement.phase(today) {
            BookingPhase::Ongoing => current.push(engagement.into()),
            BookingPhase::Past => past.push(engagement.into()),
            // Future bookings are not part of the provider's worklist view.
            BookingPhase::Upcoming => {}
        }
    }

    response::ok(model::ProviderEngagementsResponse {
        success: true,
        provider_id,
        current,
        past,
    })
}
