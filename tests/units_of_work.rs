mod common;

use std::time::Duration;

use chrono::Utc;
use tokio::time::timeout;

use campus_rides::models::rides::RideStatus;
use campus_rides::repositories::notifications::{emit, NotificationRepository};
use campus_rides::repositories::rides::RideRepository;
use campus_rides::repositories::store::{Store, UnitOfWork};

use common::{request_ride, signup, store, users};

#[tokio::test]
async fn dropped_unit_of_work_discards_ride_and_notification() {
    let store = store();
    let rides = RideRepository::new(store.clone());
    let consumer = signup(&store, "consumer@campus", "consumer").await;
    let ride = request_ride(&rides, "LIBRARY", Some(consumer.id)).await;

    let mut uow = store.begin().await.unwrap();
    let mut locked = uow.lock_ride(ride.id).await.unwrap().unwrap();
    let notification = locked.accept(3, Utc::now()).unwrap();
    uow.save_ride(&locked).await.unwrap();
    let queued = emit(uow.as_mut(), notification).await.unwrap();
    assert!(queued.is_some());
    drop(uow);

    let stored = rides.get_ride(ride.id).await.unwrap();
    assert_eq!(stored.status, RideStatus::Pending);
    assert_eq!(stored.puller_id, None);
    assert!(stored.accepted_at.is_none());

    let inbox = NotificationRepository::new(store.clone())
        .for_user(consumer.id)
        .await
        .unwrap();
    assert!(inbox.is_empty());
}

#[tokio::test]
async fn dropped_unit_of_work_discards_puller_credit() {
    let store = store();
    let puller = signup(&store, "puller@campus", "puller").await;

    let mut uow = store.begin().await.unwrap();
    let mut locked = uow.lock_user(puller.id).await.unwrap().unwrap();
    locked.credit_completed_ride();
    uow.save_user(&locked).await.unwrap();
    drop(uow);

    let stored = users(&store).get_user(puller.id).await.unwrap();
    assert_eq!(stored.points, 0);
    assert_eq!(stored.total_rides, 0);
}

#[tokio::test]
async fn store_is_usable_after_a_rollback() {
    let store = store();
    let rides = RideRepository::new(store.clone());
    let ride = request_ride(&rides, "GYM", None).await;

    let mut uow = store.begin().await.unwrap();
    let mut locked = uow.lock_ride(ride.id).await.unwrap().unwrap();
    locked.accept(3, Utc::now()).unwrap();
    uow.save_ride(&locked).await.unwrap();
    drop(uow);

    let accepted = rides.accept_ride(ride.id, 4).await.unwrap();
    assert_eq!(accepted.puller_id, Some(4));
}

#[tokio::test]
async fn reads_do_not_wait_on_open_unit_of_work() {
    let store = store();
    let rides = RideRepository::new(store.clone());
    let ride = request_ride(&rides, "MARKET", None).await;

    let mut uow = store.begin().await.unwrap();
    let mut locked = uow.lock_ride(ride.id).await.unwrap().unwrap();
    locked.accept(3, Utc::now()).unwrap();
    uow.save_ride(&locked).await.unwrap();

    let seen = timeout(Duration::from_secs(1), store.get_ride(ride.id))
        .await
        .expect("read blocked behind an open unit of work")
        .unwrap()
        .unwrap();
    assert_eq!(seen.status, RideStatus::Pending);

    uow.commit().await.unwrap();
    assert_eq!(
        rides.ride_status(ride.id).await.unwrap(),
        RideStatus::Accepted
    );
}
