use std::sync::Arc;

use actix_web::{middleware, App, HttpServer};
use structopt::StructOpt;

use servease_booking::api;
use servease_booking::config::Config;
use servease_booking::gateway::LocalGateway;
use servease_booking::migrations;
use servease_booking::notify::BookingNotifier;
use servease_booking::processor::BookingProcessor;
use servease_persistence::executor::DbExecutor;

#[derive(StructOpt)]
#[structopt(name = "servease", about = "Home-services booking broker")]
struct Args {
    /// Address for the HTTP API.
    #[structopt(long, env = "SERVEASE_API_ADDR", default_value = "127.0.0.1:5000")]
    api_addr: String,

    /// SQLite database location.
    #[structopt(long, env = "DATABASE_URL", default_value = "servease.db")]
    database_url: String,

    #[structopt(flatten)]
    config: Config,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::from_args();

    let db = DbExecutor::new(&args.database_url)?;
    db.apply_migration(migrations::run_with_output)?;

    if !args.config.gateway.skip_signature_verification && args.config.gateway.key_secret.is_empty()
    {
        log::warn!("no gateway secret configured; settlement callbacks will not verify");
    }
    let gateway = Arc::new(LocalGateway::new(args.config.gateway.key_secret.clone()));
    let notifier = BookingNotifier::new();
    let processor = BookingProcessor::new(db.clone(), gateway, notifier, args.config.clone());

    log::info!("starting booking API on {}", args.api_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .service(api::web_scope(&db, processor.clone()))
    })
    .bind(&args.api_addr)?
    .run()
    .await?;

    Ok(())
}
