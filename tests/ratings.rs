mod common;

use campus_rides::error::DomainError;
use campus_rides::models::notifications::NotificationType;
use campus_rides::repositories::notifications::NotificationRepository;
use campus_rides::repositories::ratings::RatingRepository;
use campus_rides::repositories::rides::RideRepository;

use common::{completed_ride, request_ride, signup, store, users};

#[tokio::test]
async fn rating_bounds_are_inclusive() {
    let store = store();
    let rides = RideRepository::new(store.clone());
    let ratings = RatingRepository::new(store.clone());
    let puller = signup(&store, "puller@campus", "puller").await;

    let ride = completed_ride(&rides, "LIBRARY", None, puller.id).await;

    for out_of_range in [0, 6, -1] {
        let result = ratings.submit_rating(ride.id, out_of_range, None).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
    assert_eq!(rides.get_ride(ride.id).await.unwrap().rating, None);

    ratings.submit_rating(ride.id, 1, None).await.unwrap();
    let rated = ratings
        .submit_rating(ride.id, 5, Some("great".to_string()))
        .await
        .unwrap();
    assert_eq!(rated.rating, Some(5));
    assert_eq!(rated.review.as_deref(), Some("great"));
}

#[tokio::test]
async fn only_completed_rides_can_be_rated() {
    let store = store();
    let rides = RideRepository::new(store.clone());
    let ratings = RatingRepository::new(store.clone());

    let pending = request_ride(&rides, "HALL", None).await;
    let result = ratings.submit_rating(pending.id, 4, None).await;
    assert!(matches!(result, Err(DomainError::InvalidState(_))));

    // State is checked before the range.
    let result = ratings.submit_rating(pending.id, 9, None).await;
    assert!(matches!(result, Err(DomainError::InvalidState(_))));

    let result = ratings.submit_rating(404, 4, None).await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn puller_rating_is_rounded_mean_of_rated_rides() {
    let store = store();
    let rides = RideRepository::new(store.clone());
    let ratings = RatingRepository::new(store.clone());
    let puller = signup(&store, "puller@campus", "puller").await;

    for rating in [5, 4, 4] {
        let ride = completed_ride(&rides, "MARKET", None, puller.id).await;
        ratings.submit_rating(ride.id, rating, None).await.unwrap();
    }
    // Completed but never rated; must not drag the average down.
    completed_ride(&rides, "MARKET", None, puller.id).await;

    let puller_after = users(&store).get_user(puller.id).await.unwrap();
    assert_eq!(puller_after.rating, 4.33);

    let listed = ratings.puller_ratings(puller.id).await.unwrap();
    assert_eq!(listed.len(), 3);
    assert!(listed.iter().all(|r| r.destination == "MARKET"));
}

#[tokio::test]
async fn rerating_replaces_previous_value_in_average() {
    let store = store();
    let rides = RideRepository::new(store.clone());
    let ratings = RatingRepository::new(store.clone());
    let puller = signup(&store, "puller@campus", "puller").await;

    let first = completed_ride(&rides, "A", None, puller.id).await;
    let second = completed_ride(&rides, "B", None, puller.id).await;
    ratings.submit_rating(first.id, 1, None).await.unwrap();
    ratings.submit_rating(second.id, 2, None).await.unwrap();
    ratings.submit_rating(first.id, 5, None).await.unwrap();

    let puller_after = users(&store).get_user(puller.id).await.unwrap();
    assert_eq!(puller_after.rating, 3.5);
}

#[tokio::test]
async fn puller_is_told_about_new_rating() {
    let store = store();
    let rides = RideRepository::new(store.clone());
    let ratings = RatingRepository::new(store.clone());
    let notifications = NotificationRepository::new(store.clone());
    let puller = signup(&store, "puller@campus", "puller").await;

    let ride = completed_ride(&rides, "GYM", None, puller.id).await;
    ratings.submit_rating(ride.id, 3, None).await.unwrap();

    let inbox = notifications.for_user(puller.id).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].notification_type, NotificationType::RatingReceived);
    assert!(inbox[0].message.contains('3'));
}

#[tokio::test]
async fn missing_puller_record_still_stores_rating() {
    let store = store();
    let rides = RideRepository::new(store.clone());
    let ratings = RatingRepository::new(store.clone());

    let ride = completed_ride(&rides, "GYM", None, 77).await;
    let rated = ratings.submit_rating(ride.id, 2, None).await.unwrap();

    assert_eq!(rated.rating, Some(2));
    assert_eq!(rides.get_ride(ride.id).await.unwrap().rating, Some(2));
    assert!(NotificationRepository::new(store)
        .for_user(77)
        .await
        .unwrap()
        .is_empty());
}
