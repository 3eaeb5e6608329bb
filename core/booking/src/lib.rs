#[macro_use]
extern crate diesel;

pub mod api;
pub mod config;
pub mod dao;
pub mod discovery;
pub mod error;
pub mod fees;
pub mod gateway;
pub mod models;
pub mod notify;
pub mod processor;
pub mod schema;
pub mod utils;

pub mod migrations {
    #[derive(diesel_migrations::EmbedMigrations)]
    struct _Dummy;
}
