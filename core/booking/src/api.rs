use actix_web::web::Data;
use actix_web::Scope;

use servease_persistence::executor::DbExecutor;

use crate::processor::BookingProcessor;
use crate::utils::ExtendableScope;

mod customers;
mod engagements;
pub mod model;
mod payments;
mod providers;
mod wallets;

pub const BOOKING_API_PATH: &str = "/api";

pub fn api_scope(scope: Scope) -> Scope {
    scope
        .extend(engagements::register_endpoints)
        .extend(customers::register_endpoints)
        .extend(wallets::register_endpoints)
        .extend(payments::register_endpoints)
        .extend(providers::register_endpoints)
}

pub fn web_scope(db: &DbExecutor, processor: BookingProcessor) -> Scope {
    Scope::new(BOOKING_API_PATH)
        .app_data(Data::new(db.clone()))
        .app_data(Data::new(processor))
        .service(api_scope(Scope::new("")))
}
