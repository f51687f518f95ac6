//! Storage seam shared by every repository.
//!
//! All writes go through a [`UnitOfWork`] obtained from [`Store::begin`]. Rows
//! that are read in order to be modified are fetched with the `lock_*`
//! methods, which hold them until the unit of work commits or is dropped.
//! Dropping a unit of work without calling [`UnitOfWork::commit`] discards
//! every write made through it.
//!
//! Inside a unit of work, rides are locked before users.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    notifications::{NewNotification, Notification},
    rides::{NewRideRequest, RideRequest, RideStatus},
    tokens::{NewToken, Token},
    users::{NewUser, Role, User},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RideOrder {
    #[default]
    Oldest,
    Newest,
}

#[derive(Clone, Debug, Default)]
pub struct RideFilter {
    pub status: Option<RideStatus>,
    pub puller_id: Option<i64>,
    pub consumer_id: Option<i64>,
    pub rated_only: bool,
    pub order: RideOrder,
    pub limit: Option<i64>,
}

impl RideFilter {
    pub fn with_status(mut self, status: RideStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn for_puller(mut self, puller_id: i64) -> Self {
        self.puller_id = Some(puller_id);
        self
    }

    pub fn for_consumer(mut self, consumer_id: i64) -> Self {
        self.consumer_id = Some(consumer_id);
        self
    }

    pub fn rated(mut self) -> Self {
        self.rated_only = true;
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.order = RideOrder::Newest;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, ride: &RideRequest) -> bool {
        self.status.map_or(true, |s| ride.status == s)
            && self.puller_id.map_or(true, |p| ride.puller_id == Some(p))
            && self.consumer_id.map_or(true, |c| ride.consumer_id == Some(c))
            && (!self.rated_only || ride.rating.is_some())
    }
}

#[derive(Clone, Debug, Default)]
pub struct TokenFilter {
    pub is_used: Option<bool>,
    pub owned_by: Option<i64>,
}

impl TokenFilter {
    pub fn matches(&self, token: &Token) -> bool {
        self.is_used.map_or(true, |u| token.is_used == u)
            && self.owned_by.map_or(true, |o| token.owned_by == Some(o))
    }
}

#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, anyhow::Error>;

    async fn get_user(&self, id: i64) -> Result<Option<User>, anyhow::Error>;

    async fn find_user_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, anyhow::Error>;

    async fn list_unapproved_users(&self) -> Result<Vec<User>, anyhow::Error>;

    async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, anyhow::Error>;

    async fn get_ride(&self, id: i64) -> Result<Option<RideRequest>, anyhow::Error>;

    async fn list_rides(&self, filter: &RideFilter) -> Result<Vec<RideRequest>, anyhow::Error>;

    /// Newest first.
    async fn list_notifications(&self, user_id: i64) -> Result<Vec<Notification>, anyhow::Error>;

    async fn list_tokens(&self, filter: &TokenFilter) -> Result<Vec<Token>, anyhow::Error>;
}

#[async_trait]
pub trait UnitOfWork: Send {
    /// `None` when the identifier is already taken.
    async fn insert_user(
        &mut self,
        user: NewUser,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, anyhow::Error>;

    async fn lock_user(&mut self, id: i64) -> Result<Option<User>, anyhow::Error>;

    async fn save_user(&mut self, user: &User) -> Result<(), anyhow::Error>;

    async fn delete_user(&mut self, id: i64) -> Result<(), anyhow::Error>;

    async fn insert_ride(
        &mut self,
        ride: NewRideRequest,
        now: DateTime<Utc>,
    ) -> Result<RideRequest, anyhow::Error>;

    async fn lock_ride(&mut self, id: i64) -> Result<Option<RideRequest>, anyhow::Error>;

    async fn save_ride(&mut self, ride: &RideRequest) -> Result<(), anyhow::Error>;

    /// Ratings of every rated ride of the puller, including writes made
    /// earlier in this unit of work.
    async fn ratings_for_puller(&mut self, puller_id: i64) -> Result<Vec<i32>, anyhow::Error>;

    async fn insert_notification(
        &mut self,
        notification: NewNotification,
        now: DateTime<Utc>,
    ) -> Result<Notification, anyhow::Error>;

    async fn lock_notification(&mut self, id: i64)
        -> Result<Option<Notification>, anyhow::Error>;

    async fn save_notification(&mut self, notification: &Notification)
        -> Result<(), anyhow::Error>;

    /// Returns how many notifications changed.
    async fn mark_all_notifications_read(&mut self, user_id: i64) -> Result<u64, anyhow::Error>;

    /// `None` when the token value already exists.
    async fn insert_token(
        &mut self,
        token: NewToken,
        now: DateTime<Utc>,
    ) -> Result<Option<Token>, anyhow::Error>;

    async fn lock_token(&mut self, token_value: &str) -> Result<Option<Token>, anyhow::Error>;

    async fn save_token(&mut self, token: &Token) -> Result<(), anyhow::Error>;

    async fn commit(self: Box<Self>) -> Result<(), anyhow::Error>;
}
