use actix_web::error::ResponseError;
use actix_web::web::{delete, get, patch, post, put, Data, Json, Path};
use actix_web::{HttpResponse, Scope};

use servease_persistence::executor::DbExecutor;

use crate::dao::EngagementDao;
use crate::processor::{BookingProcessor, UpdateOutcome};
use crate::utils::response;

use super::model;

pub fn register_endpoints(scope: Scope) -> Scope {
    scope
        .route("/engagements", post().to(create_engagement))
        .route("/engagements", get().to(list_engagements))
        .route("/engagements/{engagement_id}", get().to(get_engagement))
        .route("/engagements/{engagement_id}", put().to(update_engagement))
        .route("/engagements/{engagement_id}", delete().to(delete_engagement))
        .route(
            "/engagements/{engagement_id}/cancel",
            patch().to(cancel_engagement),
        )
        .route(
            "/engagements/{engagement_id}/accept",
            post().to(accept_engagement),
        )
        .route(
            "/engagements/{engagement_id}/accept",
            patch().to(accept_engagement),
        )
}

async fn create_engagement(
    processor: Data<BookingProcessor>,
    body: Json<model::CreateEngagementRequest>,
) -> HttpResponse {
    match processor.create_booking(body.into_inner()).await {
        Ok(created) => response::created(model::CreatedBookingResponse::from(created)),
        Err(e) => e.error_response(),
    }
}

async fn list_engagements(db: Data<DbExecutor>) -> HttpResponse {
    let dao: EngagementDao = db.as_dao();
    match dao.list().await {
        Ok(engagements) => response::ok(
            engagements
                .into_iter()
                .map(model::Engagement::from)
                .collect::<Vec<_>>(),
        ),
        Err(e) => response::server_error(&e),
    }
}

async fn get_engagement(db: Data<DbExecutor>, path: Path<String>) -> HttpResponse {
    let dao: EngagementDao = db.as_dao();
    match dao.get(path.into_inner()).await {
        Ok(Some(engagement)) => response::ok(model::Engagement::from(engagement)),
        Ok(None) => response::not_found(),
        Err(e) => response::server_error(&e),
    }
}

async fn update_engagement(
    processor: Data<BookingProcessor>,
    path: Path<String>,
    body: Json<model::UpdateEngagementRequest>,
) -> HttpResponse {
    match processor
        .update_booking(path.into_inner(), body.into_inner())
        .await
    {
        Ok(UpdateOutcome::Updated(engagement)) => {
            response::ok(model::Engagement::from(engagement))
        }
        Ok(UpdateOutcome::LeaveApplied(outcome)) => {
            response::ok(model::LeaveResponse::from(outcome))
        }
        Ok(UpdateOutcome::LeaveCancelled(reversal)) => {
            response::ok(model::LeaveCancelledResponse::from(reversal))
        }
        Err(e) => e.error_response(),
    }
}

async fn cancel_engagement(
    processor: Data<BookingProcessor>,
    path: Path<String>,
) -> HttpResponse {
    match processor
        .cancel_booking(path.into_inner(), None, None)
        .await
    {
        Ok(engagement) => response::ok(model::Engagement::from(engagement)),
        Err(e) => e.error_response(),
    }
}

async fn delete_engagement(db: Data<DbExecutor>, path: Path<String>) -> HttpResponse {
    let dao: EngagementDao = db.as_dao();
    match dao.delete(path.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.error_response(),
    }
}

async fn accept_engagement(
    processor: Data<BookingProcessor>,
    path: Path<String>,
    body: Json<model::AcceptRequest>,
) -> HttpResponse {
    match processor
        .accept(path.into_inner(), body.provider_id)
        .await
    {
        Ok(engagement) => response::ok(model::Engagement::from(engagement)),
        Err(e) => e.error_response(),
    }
}
