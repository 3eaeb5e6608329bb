mod common;

use actix_web::{test, App};
use serde_json::json;

use servease_booking::api;

use common::spawn_node;

#[actix_rt::test]
async fn booking_lifecycle_over_http() -> anyhow::Result<()> {
    let node = spawn_node("http-lifecycle")?;
    let app = test::init_service(
        App::new().service(api::web_scope(&node.db, node.processor.clone())),
    )
    .await;

    // Validation failures never reach the ledger.
    let req = test::TestRequest::post()
        .uri("/api/engagements")
        .set_json(&json!({
            "customer_id": 1,
            "provider_id": 7,
            "booking_type": "MONTHLY",
            "service_type": "MAID",
            "base_amount": 0,
            "start_date": "2025-08-10",
            "end_date": "2025-08-20",
            "start_time": "09:00"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/engagements")
        .set_json(&json!({
            "customer_id": 1,
            "provider_id": 7,
            "booking_type": "MONTHLY",
            "service_type": "MAID",
            "base_amount": 1000,
            "start_date": "2025-08-10",
            "end_date": "2025-08-20",
            "start_time": "09:00"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let created: serde_json::Value = test::read_body_json(resp).await;
    let engagement_id = created["engagement"]["id"].as_str().expect("id").to_string();
    let order_ref = created["payment"]["order_ref"]
        .as_str()
        .expect("order ref")
        .to_string();
    assert_eq!(created["payment"]["status"], "PENDING");

    // A second booking in the same window comes back as a conflict.
    let req = test::TestRequest::post()
        .uri("/api/engagements")
        .set_json(&json!({
            "customer_id": 2,
            "provider_id": 7,
            "booking_type": "MONTHLY",
            "service_type": "MAID",
            "base_amount": 1000,
            "start_date": "2025-08-15",
            "end_date": "2025-08-16",
            "start_time": "09:30"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409);

    let req = test::TestRequest::get()
        .uri(&format!("/api/engagements/{}", engagement_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    // Settlement callback with a gateway-grade signature.
    let req = test::TestRequest::post()
        .uri("/api/payments/verify")
        .set_json(&json!({
            "order_ref": order_ref,
            "payment_ref": "pay_http_1",
            "signature": node.gateway.sign(&order_ref, "pay_http_1"),
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    // The provider's settlement landed in a wallet; the customer has none.
    let req = test::TestRequest::get().uri("/api/wallets/1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    // Customer bookings view carries the engagement with its history.
    let req = test::TestRequest::get()
        .uri("/api/customers/1/engagements")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let bookings: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(bookings["success"], true);

    // Provider reporting views.
    let req = test::TestRequest::get()
        .uri("/api/providers/7/payouts?month=2025-13")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400, "invalid month filter");

    Ok(())
}

#[actix_rt::test]
async fn acceptance_race_loss_maps_to_conflict_status() -> anyhow::Result<()> {
    let node = spawn_node("http-accept")?;
    let app = test::init_service(
        App::new().service(api::web_scope(&node.db, node.processor.clone())),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/engagements")
        .set_json(&json!({
            "customer_id": 5,
            "booking_type": "ON_DEMAND",
            "service_type": "COOK",
            "base_amount": 600,
            "start_date": "2025-08-11",
            "start_time": "10:00"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let created: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(created["engagement"]["assignment_status"], "UNASSIGNED");
    let engagement_id = created["engagement"]["id"].as_str().expect("id").to_string();

    let accept_uri = format!("/api/engagements/{}/accept", engagement_id);
    let req = test::TestRequest::post()
        .uri(&accept_uri)
        .set_json(&json!({ "provider_id": 11 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::patch()
        .uri(&accept_uri)
        .set_json(&json!({ "provider_id": 12 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409, "race losers see a conflict");

    let req = test::TestRequest::post()
        .uri("/api/engagements/does-not-exist/accept")
        .set_json(&json!({ "provider_id": 12 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    Ok(())
}
