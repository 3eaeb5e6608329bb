mod common;

use bigdecimal::BigDecimal;

use servease_booking::api::model::{
    LeaveAction, UpdateEngagementRequest, VacationPatch,
};
use servease_booking::dao::EngagementDao;
use servease_booking::error::Error;
use servease_booking::models::engagement::{BookingPhase, TaskStatus};
use servease_booking::models::modification::ModificationType;
use servease_booking::processor::UpdateOutcome;

use common::{date, monthly_request, spawn_node};

#[actix_rt::test]
async fn field_updates_apply_the_patch_and_audit_it() -> anyhow::Result<()> {
    let node = spawn_node("update-fields")?;

    let created = node
        .processor
        .create_booking(monthly_request(
            3,
            4,
            2000,
            date(2025, 8, 1),
            date(2025, 8, 30),
            "09:00",
        ))
        .await?;

    let request = UpdateEngagementRequest {
        task_status: Some(TaskStatus::InProgress),
        base_amount: Some(BigDecimal::from(2500)),
        modified_by_id: Some(3),
        ..Default::default()
    };
    let outcome = node
        .processor
        .update_booking(created.engagement.id.clone(), request)
        .await?;
    let updated = match outcome {
        UpdateOutcome::Updated(engagement) => engagement,
        other => panic!("expected a field update, got {:?}", other),
    };
    assert_eq!(updated.task_status, TaskStatus::InProgress);
    assert_eq!(updated.base_amount.0, BigDecimal::from(2500));
    // Untouched fields survive.
    assert_eq!(updated.service_type, "MAID");

    let (_, modifications) = node
        .db
        .as_dao::<EngagementDao>()
        .list_for_customer(3)
        .await?;
    assert_eq!(modifications.len(), 1);
    assert_eq!(
        modifications[0].modification_type,
        ModificationType::FieldUpdate
    );
    assert_eq!(modifications[0].actor_id, Some(3));
    Ok(())
}

#[actix_rt::test]
async fn an_empty_patch_is_rejected() -> anyhow::Result<()> {
    let node = spawn_node("update-empty")?;
    let created = node
        .processor
        .create_booking(monthly_request(
            3,
            4,
            2000,
            date(2025, 8, 1),
            date(2025, 8, 30),
            "09:00",
        ))
        .await?;
    let err = node
        .processor
        .update_booking(created.engagement.id, UpdateEngagementRequest::default())
        .await
        .expect_err("nothing to update");
    assert!(matches!(err, Error::BadRequest(_)));
    Ok(())
}

#[actix_rt::test]
async fn vacation_mode_and_field_mode_are_mutually_exclusive() -> anyhow::Result<()> {
    let node = spawn_node("update-exclusive")?;
    let created = node
        .processor
        .create_booking(monthly_request(
            3,
            4,
            2000,
            date(2025, 8, 1),
            date(2025, 8, 30),
            "09:00",
        ))
        .await?;

    let request = UpdateEngagementRequest {
        task_status: Some(TaskStatus::InProgress),
        vacation: Some(VacationPatch {
            action: LeaveAction::Apply,
            leave_start_date: Some(date(2025, 8, 5)),
            leave_end_date: Some(date(2025, 8, 6)),
        }),
        ..Default::default()
    };
    let err = node
        .processor
        .update_booking(created.engagement.id, request)
        .await
        .expect_err("both modes at once");
    assert!(matches!(err, Error::BadRequest(_)));
    Ok(())
}

#[actix_rt::test]
async fn vacation_mode_routes_to_the_leave_flow() -> anyhow::Result<()> {
    let node = spawn_node("update-vacation")?;
    let created = node
        .processor
        .create_booking(monthly_request(
            3,
            4,
            3000,
            date(2025, 8, 1),
            date(2025, 8, 30),
            "09:00",
        ))
        .await?;

    let request = UpdateEngagementRequest {
        vacation: Some(VacationPatch {
            action: LeaveAction::Apply,
            leave_start_date: Some(date(2025, 8, 5)),
            leave_end_date: Some(date(2025, 8, 9)),
        }),
        ..Default::default()
    };
    let outcome = node
        .processor
        .update_booking(created.engagement.id.clone(), request)
        .await?;
    match outcome {
        UpdateOutcome::LeaveApplied(outcome) => {
            assert_eq!(outcome.wallet_credit, BigDecimal::from(375));
        }
        other => panic!("expected a leave, got {:?}", other),
    }

    let cancel = UpdateEngagementRequest {
        vacation: Some(VacationPatch {
            action: LeaveAction::Cancel,
            leave_start_date: None,
            leave_end_date: None,
        }),
        ..Default::default()
    };
    let outcome = node
        .processor
        .update_booking(created.engagement.id, cancel)
        .await?;
    assert!(matches!(outcome, UpdateOutcome::LeaveCancelled(_)));
    Ok(())
}

#[actix_rt::test]
async fn cancel_and_delete_lifecycle() -> anyhow::Result<()> {
    let node = spawn_node("update-lifecycle")?;
    let created = node
        .processor
        .create_booking(monthly_request(
            3,
            4,
            2000,
            date(2025, 8, 1),
            date(2025, 8, 30),
            "09:00",
        ))
        .await?;
    let id = created.engagement.id.clone();

    let cancelled = node.processor.cancel_booking(id.clone(), None, None).await?;
    assert_eq!(cancelled.task_status, TaskStatus::Cancelled);

    let dao: EngagementDao = node.db.as_dao();
    dao.delete(id.clone()).await?;
    assert!(dao.get(id.clone()).await?.is_none());

    let err = dao.delete(id).await.expect_err("already gone");
    assert!(matches!(err, Error::NotFound(_)));

    let err = node
        .processor
        .cancel_booking("missing".to_string(), None, None)
        .await
        .expect_err("unknown engagement");
    assert!(matches!(err, Error::NotFound(_)));
    Ok(())
}

#[actix_rt::test]
async fn customer_listing_categorizes_by_date_range() -> anyhow::Result<()> {
    let node = spawn_node("update-categorize")?;

    let today = servease_booking::processor::business_today();
    let days = chrono::Duration::days;
    let past = monthly_request(6, 4, 1000, today - days(60), today - days(31), "09:00");
    let ongoing = monthly_request(6, 5, 1000, today - days(5), today + days(24), "09:00");
    let upcoming = monthly_request(6, 6, 1000, today + days(31), today + days(60), "10:00");
    let past = node.processor.create_booking(past).await?;
    let ongoing = node.processor.create_booking(ongoing).await?;
    let upcoming = node.processor.create_booking(upcoming).await?;

    let (engagements, _) = node.db.as_dao::<EngagementDao>().list_for_customer(6).await?;
    assert_eq!(engagements.len(), 3);

    for engagement in engagements {
        let expected = if engagement.id == past.engagement.id {
            BookingPhase::Past
        } else if engagement.id == ongoing.engagement.id {
            BookingPhase::Ongoing
        } else {
            assert_eq!(engagement.id, upcoming.engagement.id);
            BookingPhase::Upcoming
        };
        assert_eq!(engagement.phase(today), expected);
    }
    Ok(())
}
