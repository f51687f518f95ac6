use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::{RideFilter, RideOrder, Store, TokenFilter, UnitOfWork};
use crate::models::{
    notifications::{NewNotification, Notification},
    rides::{NewRideRequest, RideRequest},
    tokens::{NewToken, Token},
    users::{NewUser, Role, User},
};

#[derive(Clone, Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    rides: BTreeMap<i64, RideRequest>,
    notifications: BTreeMap<i64, Notification>,
    tokens: BTreeMap<i64, Token>,
    last_user_id: i64,
    last_ride_id: i64,
    last_notification_id: i64,
    last_token_id: i64,
}

/// Process-local store for tests and local runs. Units of work are serialised
/// by a single writer lock held for their whole lifetime; each one writes into
/// a staged copy that replaces the live tables on commit. Plain reads share
/// the table lock, which a unit of work only takes while committing.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    writer: Arc<Mutex<()>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_rides<'a>(
    rides: impl Iterator<Item = &'a RideRequest>,
    filter: &RideFilter,
) -> Vec<RideRequest> {
    let mut rides: Vec<RideRequest> = rides.filter(|r| filter.matches(r)).cloned().collect();

    match filter.order {
        RideOrder::Oldest => rides.sort_by_key(|r| (r.created_at, r.id)),
        RideOrder::Newest => {
            rides.sort_by_key(|r| (r.created_at, r.id));
            rides.reverse();
        }
    }

    if let Some(limit) = filter.limit {
        rides.truncate(limit.max(0) as usize);
    }

    rides
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, anyhow::Error> {
        let writer = self.writer.clone().lock_owned().await;
        let staged = self.tables.read().await.clone();

        Ok(Box::new(MemoryUnitOfWork {
            _writer: writer,
            tables: self.tables.clone(),
            staged,
        }))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, anyhow::Error> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, anyhow::Error> {
        let tables = self.tables.read().await;

        Ok(tables
            .users
            .values()
            .find(|u| u.identifier == identifier)
            .cloned())
    }

    async fn list_unapproved_users(&self) -> Result<Vec<User>, anyhow::Error> {
        let tables = self.tables.read().await;

        Ok(tables
            .users
            .values()
            .filter(|u| !u.is_approved)
            .cloned()
            .collect())
    }

    async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, anyhow::Error> {
        let tables = self.tables.read().await;

        Ok(tables
            .users
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }

    async fn get_ride(&self, id: i64) -> Result<Option<RideRequest>, anyhow::Error> {
        Ok(self.tables.read().await.rides.get(&id).cloned())
    }

    async fn list_rides(&self, filter: &RideFilter) -> Result<Vec<RideRequest>, anyhow::Error> {
        let tables = self.tables.read().await;

        Ok(sorted_rides(tables.rides.values(), filter))
    }

    async fn list_notifications(&self, user_id: i64) -> Result<Vec<Notification>, anyhow::Error> {
        let tables = self.tables.read().await;
        let mut notifications: Vec<Notification> = tables
            .notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notifications.sort_by_key(|n| (n.created_at, n.id));
        notifications.reverse();

        Ok(notifications)
    }

    async fn list_tokens(&self, filter: &TokenFilter) -> Result<Vec<Token>, anyhow::Error> {
        let tables = self.tables.read().await;

        Ok(tables
            .tokens
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }
}

struct MemoryUnitOfWork {
    _writer: OwnedMutexGuard<()>,
    tables: Arc<RwLock<Tables>>,
    staged: Tables,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn insert_user(
        &mut self,
        user: NewUser,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, anyhow::Error> {
        if self
            .staged
            .users
            .values()
            .any(|u| u.identifier == user.identifier)
        {
            return Ok(None);
        }

        self.staged.last_user_id += 1;
        let user = user.into_user(self.staged.last_user_id, now);
        self.staged.users.insert(user.id, user.clone());

        Ok(Some(user))
    }

    async fn lock_user(&mut self, id: i64) -> Result<Option<User>, anyhow::Error> {
        Ok(self.staged.users.get(&id).cloned())
    }

    async fn save_user(&mut self, user: &User) -> Result<(), anyhow::Error> {
        self.staged.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete_user(&mut self, id: i64) -> Result<(), anyhow::Error> {
        self.staged.users.remove(&id);
        Ok(())
    }

    async fn insert_ride(
        &mut self,
        ride: NewRideRequest,
        now: DateTime<Utc>,
    ) -> Result<RideRequest, anyhow::Error> {
        self.staged.last_ride_id += 1;
        let ride = ride.into_ride(self.staged.last_ride_id, now);
        self.staged.rides.insert(ride.id, ride.clone());

        Ok(ride)
    }

    async fn lock_ride(&mut self, id: i64) -> Result<Option<RideRequest>, anyhow::Error> {
        Ok(self.staged.rides.get(&id).cloned())
    }

    async fn save_ride(&mut self, ride: &RideRequest) -> Result<(), anyhow::Error> {
        self.staged.rides.insert(ride.id, ride.clone());
        Ok(())
    }

    async fn ratings_for_puller(&mut self, puller_id: i64) -> Result<Vec<i32>, anyhow::Error> {
        Ok(self
            .staged
            .rides
            .values()
            .filter(|r| r.puller_id == Some(puller_id))
            .filter_map(|r| r.rating)
            .collect())
    }

    async fn insert_notification(
        &mut self,
        notification: NewNotification,
        now: DateTime<Utc>,
    ) -> Result<Notification, anyhow::Error> {
        self.staged.last_notification_id += 1;
        let notification = Notification {
            id: self.staged.last_notification_id,
            user_id: notification.user_id,
            message: notification.message,
            is_read: false,
            created_at: now,
            notification_type: notification.notification_type,
        };
        self.staged
            .notifications
            .insert(notification.id, notification.clone());

        Ok(notification)
    }

    async fn lock_notification(
        &mut self,
        id: i64,
    ) -> Result<Option<Notification>, anyhow::Error> {
        Ok(self.staged.notifications.get(&id).cloned())
    }

    async fn save_notification(
        &mut self,
        notification: &Notification,
    ) -> Result<(), anyhow::Error> {
        self.staged
            .notifications
            .insert(notification.id, notification.clone());
        Ok(())
    }

    async fn mark_all_notifications_read(&mut self, user_id: i64) -> Result<u64, anyhow::Error> {
        let mut marked = 0;
        for notification in self.staged.notifications.values_mut() {
            if notification.user_id == user_id && !notification.is_read {
                notification.is_read = true;
                marked += 1;
            }
        }

        Ok(marked)
    }

    async fn insert_token(
        &mut self,
        token: NewToken,
        now: DateTime<Utc>,
    ) -> Result<Option<Token>, anyhow::Error> {
        if self
            .staged
            .tokens
            .values()
            .any(|t| t.token_value == token.token_value)
        {
            return Ok(None);
        }

        self.staged.last_token_id += 1;
        let token = token.into_token(self.staged.last_token_id, now);
        self.staged.tokens.insert(token.id, token.clone());

        Ok(Some(token))
    }

    async fn lock_token(&mut self, token_value: &str) -> Result<Option<Token>, anyhow::Error> {
        Ok(self
            .staged
            .tokens
            .values()
            .find(|t| t.token_value == token_value)
            .cloned())
    }

    async fn save_token(&mut self, token: &Token) -> Result<(), anyhow::Error> {
        self.staged.tokens.insert(token.id, token.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), anyhow::Error> {
        let MemoryUnitOfWork {
            _writer,
            tables,
            staged,
        } = *self;
        *tables.write().await = staged;

        Ok(())
    }
}
