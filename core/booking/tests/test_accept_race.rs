mod common;

use futures::future::join_all;

use servease_booking::dao::{AvailabilityDao, ProviderDao};
use servease_booking::error::Error;
use servease_booking::models::engagement::AssignmentStatus;
use servease_booking::models::provider::Provider;
use servease_booking::notify::ProviderEvent;

use common::{date, on_demand_request, spawn_node};

#[actix_rt::test]
async fn exactly_one_provider_wins_the_acceptance_race() -> anyhow::Result<()> {
    let node = spawn_node("accept-race")?;

    let created = node
        .processor
        .create_booking(on_demand_request(1, None, 600, date(2025, 8, 5), "10:00"))
        .await?;
    let engagement_id = created.engagement.id.clone();

    let mut events = node.notifier.subscribe();

    let contenders: Vec<i64> = (1..=8).collect();
    let attempts = contenders.iter().map(|provider_id| {
        let processor = node.processor.clone();
        let engagement_id = engagement_id.clone();
        let provider_id = *provider_id;
        async move { processor.accept(engagement_id, provider_id).await }
    });
    let results = join_all(attempts).await;

    let mut winners = vec![];
    let mut conflicts = 0;
    for (provider_id, result) in contenders.iter().zip(results) {
        match result {
            Ok(engagement) => {
                assert_eq!(engagement.provider_id, Some(*provider_id));
                winners.push(*provider_id);
            }
            Err(Error::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!(winners.len(), 1, "exactly one acceptance may succeed");
    assert_eq!(conflicts, contenders.len() - 1);

    let engagement = node
        .db
        .as_dao::<servease_booking::dao::EngagementDao>()
        .get(engagement_id.clone())
        .await?
        .expect("engagement");
    assert_eq!(engagement.assignment_status, AssignmentStatus::Assigned);
    assert_eq!(engagement.provider_id, Some(winners[0]));

    // The reservation was written exactly once, by the winner.
    let slots = node
        .db
        .as_dao::<AvailabilityDao>()
        .for_engagement(engagement_id.clone())
        .await?;
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].provider_id, winners[0]);

    // The winner got its confirmation event.
    let event = events.recv().await?;
    match event {
        ProviderEvent::BookingAssigned {
            provider_id,
            engagement_id: event_engagement,
        } => {
            assert_eq!(provider_id, winners[0]);
            assert_eq!(event_engagement, engagement_id);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    Ok(())
}

#[actix_rt::test]
async fn accepting_twice_or_blind_is_rejected() -> anyhow::Result<()> {
    let node = spawn_node("accept-errors")?;

    let err = node
        .processor
        .accept("no-such-engagement".to_string(), 1)
        .await
        .expect_err("unknown engagement");
    assert!(matches!(err, Error::NotFound(_)));

    let created = node
        .processor
        .create_booking(on_demand_request(1, None, 600, date(2025, 8, 6), "10:00"))
        .await?;
    node.processor.accept(created.engagement.id.clone(), 4).await?;

    let err = node
        .processor
        .accept(created.engagement.id.clone(), 5)
        .await
        .expect_err("already assigned");
    assert!(matches!(err, Error::Conflict(_)));
    Ok(())
}

#[actix_rt::test]
async fn acceptance_respects_existing_reservations() -> anyhow::Result<()> {
    let node = spawn_node("accept-conflict")?;

    // Provider 9 is busy 10:00-12:00 on the 7th.
    node.processor
        .create_booking(on_demand_request(1, Some(9), 500, date(2025, 8, 7), "10:00"))
        .await?;

    let open = node
        .processor
        .create_booking(on_demand_request(2, None, 500, date(2025, 8, 7), "11:00"))
        .await?;
    let err = node
        .processor
        .accept(open.engagement.id.clone(), 9)
        .await
        .expect_err("provider is double-booked");
    assert!(matches!(err, Error::Conflict(_)));

    // A free provider can still take it.
    node.processor.accept(open.engagement.id, 10).await?;
    Ok(())
}

#[actix_rt::test]
async fn discovery_notifies_only_nearby_located_providers() -> anyhow::Result<()> {
    let node = spawn_node("discovery")?;

    let providers: ProviderDao = node.db.as_dao();
    // Two within ~1.5 km of the customer, one across the city, one silent
    // about its location.
    providers
        .upsert(Provider::new(101, "close-1", Some(12.971), Some(77.594)))
        .await?;
    providers
        .upsert(Provider::new(102, "close-2", Some(12.980), Some(77.600)))
        .await?;
    providers
        .upsert(Provider::new(103, "far-away", Some(13.20), Some(77.75)))
        .await?;
    providers.upsert(Provider::new(104, "unlocated", None, None)).await?;

    let mut events = node.notifier.subscribe();

    let mut request = on_demand_request(5, None, 700, date(2025, 8, 8), "09:00");
    request.latitude = Some(12.9716);
    request.longitude = Some(77.5946);
    let created = node.processor.create_booking(request).await?;

    let mut notified = vec![];
    while let Ok(event) = events.try_recv() {
        match event {
            ProviderEvent::BookingAvailable {
                provider_id,
                engagement_id,
                ..
            } => {
                assert_eq!(engagement_id, created.engagement.id);
                notified.push(provider_id);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
    notified.sort_unstable();
    assert_eq!(notified, vec![101, 102]);
    Ok(())
}

#[actix_rt::test]
async fn discovery_is_skipped_without_coordinates() -> anyhow::Result<()> {
    let node = spawn_node("discovery-skip")?;
    node.db
        .as_dao::<ProviderDao>()
        .upsert(Provider::new(201, "close", Some(12.97), Some(77.59)))
        .await?;

    let mut events = node.notifier.subscribe();
    let created = node
        .processor
        .create_booking(on_demand_request(6, None, 700, date(2025, 8, 9), "09:00"))
        .await?;

    assert_eq!(
        created.engagement.assignment_status,
        AssignmentStatus::Unassigned
    );
    assert!(events.try_recv().is_err(), "no discovery event expected");
    Ok(())
}
