#![allow(dead_code)]

use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tempdir::TempDir;

use servease_booking::api::model::CreateEngagementRequest;
use servease_booking::config::Config;
use servease_booking::gateway::LocalGateway;
use servease_booking::migrations;
use servease_booking::models::engagement::BookingType;
use servease_booking::notify::BookingNotifier;
use servease_booking::processor::BookingProcessor;
use servease_persistence::executor::DbExecutor;

pub const TEST_GATEWAY_SECRET: &str = "test-gateway-secret";

pub struct TestNode {
    pub db: DbExecutor,
    pub processor: BookingProcessor,
    pub gateway: Arc<LocalGateway>,
    pub notifier: BookingNotifier,
    _dir: TempDir,
}

/// Fresh service wiring over its own temporary database file.
pub fn spawn_node(name: &str) -> anyhow::Result<TestNode> {
    let dir = TempDir::new(name)?;
    let db = DbExecutor::from_data_dir(dir.path(), name)?;
    db.apply_migration(migrations::run_with_output)?;

    let mut config = Config::from_env()?;
    config.gateway.key_secret = TEST_GATEWAY_SECRET.to_string();
    let gateway = Arc::new(LocalGateway::new(TEST_GATEWAY_SECRET));
    let notifier = BookingNotifier::new();
    let processor = BookingProcessor::new(
        db.clone(),
        gateway.clone(),
        notifier.clone(),
        config,
    );
    Ok(TestNode {
        db,
        processor,
        gateway,
        notifier,
        _dir: dir,
    })
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd(y, m, d)
}

pub fn monthly_request(
    customer_id: i64,
    provider_id: i64,
    base_amount: i64,
    start: NaiveDate,
    end: NaiveDate,
    start_time: &str,
) -> CreateEngagementRequest {
    CreateEngagementRequest {
        customer_id,
        provider_id: Some(provider_id),
        booking_type: BookingType::Monthly,
        service_type: "MAID".to_string(),
        base_amount: BigDecimal::from(base_amount),
        start_date: start,
        end_date: Some(end),
        start_time: start_time.to_string(),
        responsibilities: None,
        payment_mode: None,
        latitude: None,
        longitude: None,
    }
}

pub fn on_demand_request(
    customer_id: i64,
    provider_id: Option<i64>,
    base_amount: i64,
    start: NaiveDate,
    start_time: &str,
) -> CreateEngagementRequest {
    CreateEngagementRequest {
        customer_id,
        provider_id,
        booking_type: BookingType::OnDemand,
        service_type: "COOK".to_string(),
        base_amount: BigDecimal::from(base_amount),
        start_date: start,
        end_date: None,
        start_time: start_time.to_string(),
        responsibilities: None,
        payment_mode: None,
        latitude: None,
        longitude: None,
    }
}
