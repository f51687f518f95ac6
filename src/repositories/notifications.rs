use std::sync::Arc;

use chrono::Utc;

use super::store::{Store, UnitOfWork};
use crate::error::DomainError;
use crate::models::notifications::{NewNotification, Notification};

/// Records `notification` inside the caller's unit of work, so it is only
/// persisted if the triggering change commits. `None` is a no-op.
pub async fn emit(
    uow: &mut dyn UnitOfWork,
    notification: Option<NewNotification>,
) -> Result<Option<Notification>, anyhow::Error> {
    let Some(notification) = notification else {
        log::debug!("No recipient for notification, skipping.");
        return Ok(None);
    };

    let recorded = uow.insert_notification(notification, Utc::now()).await?;
    log::debug!(
        "Queued {} notification {} for user {}.",
        recorded.notification_type,
        recorded.id,
        recorded.user_id
    );

    Ok(Some(recorded))
}

#[derive(Clone)]
pub struct NotificationRepository {
    store: Arc<dyn Store>,
}

impl NotificationRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn for_user(&self, user_id: i64) -> Result<Vec<Notification>, DomainError> {
        Ok(self.store.list_notifications(user_id).await?)
    }

    pub async fn unread_count(&self, user_id: i64) -> Result<usize, DomainError> {
        let notifications = self.store.list_notifications(user_id).await?;
        Ok(notifications.iter().filter(|n| !n.is_read).count())
    }

    pub async fn mark_read(&self, id: i64) -> Result<Notification, DomainError> {
        let mut uow = self.store.begin().await?;
        let mut notification = uow
            .lock_notification(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Notification", id))?;

        notification.is_read = true;
        uow.save_notification(&notification).await?;
        uow.commit().await?;

        log::info!(
            "Marked notification {} read for user {}.",
            notification.id,
            notification.user_id
        );
        Ok(notification)
    }

    pub async fn mark_all_read(&self, user_id: i64) -> Result<u64, DomainError> {
        let mut uow = self.store.begin().await?;
        let marked = uow.mark_all_notifications_read(user_id).await?;
        uow.commit().await?;

        log::info!("Marked {} notifications read for user {}.", marked, user_id);
        Ok(marked)
    }
}
