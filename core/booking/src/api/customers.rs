use std::collections::HashMap;

use actix_web::error::ResponseError;
use actix_web::web::{get, post, Data, Json, Path};
use actix_web::{HttpResponse, Scope};

use servease_persistence::executor::DbExecutor;

use crate::dao::EngagementDao;
use crate::models::engagement::BookingPhase;
use crate::models::modification::{Actor, ActorRole};
use crate::processor::{business_today, BookingProcessor};
use crate::utils::response;

use super::model;

pub fn register_endpoints(scope: Scope) -> Scope {
    scope
        .route(
            "/customers/{customer_id}/engagements",
            get().to(customer_engagements),
        )
        .route("/customers/{customer_id}/leaves", post().to(apply_leave))
}

/// Bookings categorized against the business calendar, each with its
/// modification history attached.
async fn customer_engagements(db: Data<DbExecutor>, path: Path<i64>) -> HttpResponse {
    let dao: EngagementDao = db.as_dao();
    let (engagements, modifications) = match dao.list_for_customer(path.into_inner()).await {
        Ok(loaded) => loaded,
        Err(e) => return response::server_error(&e),
    };

    let mut history: HashMap<String, Vec<model::ModificationInfo>> = HashMap::new();
    for modification in modifications {
        history
            .entry(modification.engagement_id.clone())
            .or_default()
            .push(modification.into());
    }

    let today = business_today();
    let mut upcoming = vec![];
    let mut ongoing = vec![];
    let mut past = vec![];
    for engagement in engagements {
        let phase = engagement.phase(today);
        let entry = model::EngagementWithHistory {
            modifications: history.remove(&engagement.id).unwrap_or_default(),
            engagement: engagement.into(),
        };
        match phase {
            BookingPhase::Upcoming => upcoming.push(entry),
            BookingPhase::Ongoing => ongoing.push(entry),
            BookingPhase::Past => past.push(entry),
        }
    }

    response::ok(model::CustomerBookingsResponse {
        success: true,
        upcoming,
        ongoing,
        past,
    })
}

async fn apply_leave(
    processor: Data<BookingProcessor>,
    path: Path<i64>,
    body: Json<model::LeaveRequest>,
) -> HttpResponse {
    let customer_id = path.into_inner();
    let actor = Actor {
        id: Some(customer_id),
        role: Some(ActorRole::Customer),
    };
    match processor
        .apply_leave(customer_id, body.into_inner(), actor)
        .await
    {
        Ok(outcome) => response::ok(model::LeaveResponse::from(outcome)),
        Err(e) => e.error_response(),
    }
}
