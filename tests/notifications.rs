mod common;

use campus_rides::error::DomainError;
use campus_rides::models::notifications::NotificationType;
use campus_rides::repositories::notifications::NotificationRepository;
use campus_rides::repositories::rides::RideRepository;

use common::{completed_ride, request_ride, store};

#[tokio::test]
async fn inbox_is_newest_first_and_tracks_unread() {
    let store = store();
    let rides = RideRepository::new(store.clone());
    let notifications = NotificationRepository::new(store.clone());

    completed_ride(&rides, "LIBRARY", Some(1), 3).await;
    let rejected = request_ride(&rides, "GYM", Some(1)).await;
    rides.reject_ride(rejected.id, 3).await.unwrap();

    let inbox = notifications.for_user(1).await.unwrap();
    let kinds: Vec<NotificationType> = inbox.iter().map(|n| n.notification_type).collect();
    assert_eq!(
        kinds,
        vec![
            NotificationType::RideRejected,
            NotificationType::RideCompleted,
            NotificationType::RideAccepted,
        ]
    );
    assert_eq!(notifications.unread_count(1).await.unwrap(), 3);

    let read = notifications.mark_read(inbox[0].id).await.unwrap();
    assert!(read.is_read);
    assert_eq!(notifications.unread_count(1).await.unwrap(), 2);

    assert_eq!(notifications.mark_all_read(1).await.unwrap(), 2);
    assert_eq!(notifications.unread_count(1).await.unwrap(), 0);
    assert_eq!(notifications.mark_all_read(1).await.unwrap(), 0);
}

#[tokio::test]
async fn marking_unknown_notification_is_not_found() {
    let notifications = NotificationRepository::new(store());

    let result = notifications.mark_read(12).await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}
