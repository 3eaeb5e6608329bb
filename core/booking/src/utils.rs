use actix_web::Scope;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: Option<String>,
}

impl ErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

pub trait ExtendableScope {
    fn extend<F: FnOnce(Self) -> Self>(self, f: F) -> Self
    where
        Self: Sized;
}

impl ExtendableScope for Scope {
    fn extend<F: FnOnce(Self) -> Self>(self, f: F) -> Self {
        f(self)
    }
}

pub mod response {
    use actix_web::HttpResponse;
    use serde::Serialize;

    use super::ErrorMessage;

    pub fn ok<T: Serialize>(t: T) -> HttpResponse {
        HttpResponse::Ok().json(t)
    }

    pub fn created<T: Serialize>(t: T) -> HttpResponse {
        HttpResponse::Created().json(t)
    }

    pub fn not_found() -> HttpResponse {
        HttpResponse::NotFound().json(ErrorMessage { message: None })
    }

    pub fn bad_request(e: &impl ToString) -> HttpResponse {
        HttpResponse::BadRequest().json(ErrorMessage::new(e.to_string()))
    }

    pub fn conflict(e: &impl ToString) -> HttpResponse {
        HttpResponse::Conflict().json(ErrorMessage::new(e.to_string()))
    }

    pub fn server_error(e: &impl ToString) -> HttpResponse {
        let e = e.to_string();
        log::error!("Booking API server error: {}", e);
        HttpResponse::InternalServerError().json(ErrorMessage::new(e))
    }
}
