use actix_web::error::ResponseError;
use actix_web::web::{post, Data, Json};
use actix_web::{HttpResponse, Scope};

use crate::dao::Settlement;
use crate::processor::BookingProcessor;
use crate::utils::response;

use super::model;

pub fn register_endpoints(scope: Scope) -> Scope {
    scope
        .route("/payments/verify", post().to(verify_payment))
        .route("/payments/failed", post().to(fail_payment))
}

/// Gateway settlement callback. Re-delivery of an already-settled order is
/// acknowledged without touching the ledger again.
async fn verify_payment(
    processor: Data<BookingProcessor>,
    body: Json<model::VerifyPaymentRequest>,
) -> HttpResponse {
    match processor.verify_payment(body.into_inner()).await {
        Ok(Settlement::Settled(receipt)) => response::ok(model::SettlementResponse {
            message: "Payment verified and completed successfully".to_string(),
            payment: receipt.payment.into(),
        }),
        Ok(Settlement::AlreadySettled(payment)) => response::ok(model::SettlementResponse {
            message: "Payment already settled".to_string(),
            payment: payment.into(),
        }),
        Err(e) => e.error_response(),
    }
}

async fn fail_payment(
    processor: Data<BookingProcessor>,
    body: Json<model::FailPaymentRequest>,
) -> HttpResponse {
    match processor.fail_payment(body.into_inner().order_ref).await {
        Ok(payment) => response::ok(model::SettlementResponse {
            message: "Payment marked as failed".to_string(),
            payment: payment.into(),
        }),
        Err(e) => e.error_response(),
    }
}
