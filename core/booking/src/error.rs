use actix_web::{error::ResponseError, HttpResponse};

use crate::gateway::GatewayError;
use crate::utils::ErrorMessage;

pub use servease_persistence::executor::Error as DbError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Db(#[from] DbError),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Payment rejected: {0}")]
    PaymentRejected(String),
    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn bad_request(msg: impl ToString) -> Self {
        Error::BadRequest(msg.to_string())
    }

    pub fn not_found(msg: impl ToString) -> Self {
        Error::NotFound(msg.to_string())
    }

    pub fn conflict(msg: impl ToString) -> Self {
        Error::Conflict(msg.to_string())
    }

    pub fn internal(msg: impl ToString) -> Self {
        Error::Internal(msg.to_string())
    }
}

impl From<diesel::result::Error> for Error {
    fn from(e: diesel::result::Error) -> Self {
        Error::Db(e.into())
    }
}

impl From<r2d2::Error> for Error {
    fn from(e: r2d2::Error) -> Self {
        Error::Db(e.into())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Error::Db(e.into())
    }
}

impl ResponseError for Error {
    fn error_response(&self) -> HttpResponse {
        match self {
            Error::BadRequest(_) | Error::PaymentRejected(_) => {
                HttpResponse::BadRequest().json(ErrorMessage::new(self.to_string()))
            }
            Error::NotFound(_) => {
                HttpResponse::NotFound().json(ErrorMessage::new(self.to_string()))
            }
            Error::Conflict(_) => {
                HttpResponse::Conflict().json(ErrorMessage::new(self.to_string()))
            }
            Error::Gateway(_) => {
                log::error!("payment gateway failure: {}", self);
                HttpResponse::BadGateway().json(ErrorMessage::new(self.to_string()))
            }
            _ => {
                // The original cause goes to the operator log, the caller
                // only sees a generic failure.
                log::error!("internal error: {}", self);
                HttpResponse::InternalServerError()
                    .json(ErrorMessage::new("internal server error".to_string()))
            }
        }
    }
}
