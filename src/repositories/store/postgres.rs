use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use super::{RideFilter, RideOrder, Store, TokenFilter, UnitOfWork};
use crate::models::{
    notifications::{NewNotification, Notification},
    rides::{NewRideRequest, RideRequest},
    tokens::{NewToken, Token},
    users::{NewUser, Role, User},
};

const USER_COLUMNS: &str = "id, identifier, display_name, credential_hash, role, is_approved, points, rating, total_rides, created_at";
const RIDE_COLUMNS: &str = "id, destination, status, consumer_id, puller_id, created_at, accepted_at, completed_at, rating, review, pickup_location, distance_km";
const NOTIFICATION_COLUMNS: &str =
    "id, user_id, message, is_read, created_at, notification_type";
const TOKEN_COLUMNS: &str = "id, token_value, issued_by, owned_by, created_at, used_at, is_used";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    identifier: String,
    display_name: Option<String>,
    credential_hash: String,
    role: String,
    is_approved: bool,
    points: i64,
    rating: f64,
    total_rides: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            identifier: row.identifier,
            display_name: row.display_name,
            credential_hash: row.credential_hash,
            role: row.role.parse()?,
            is_approved: row.is_approved,
            points: row.points,
            rating: row.rating,
            total_rides: row.total_rides,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RideRow {
    id: i64,
    destination: String,
    status: String,
    consumer_id: Option<i64>,
    puller_id: Option<i64>,
    created_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    rating: Option<i32>,
    review: Option<String>,
    pickup_location: Option<String>,
    distance_km: Option<f64>,
}

impl TryFrom<RideRow> for RideRequest {
    type Error = anyhow::Error;

    fn try_from(row: RideRow) -> Result<Self, Self::Error> {
        Ok(RideRequest {
            id: row.id,
            destination: row.destination,
            status: row.status.parse()?,
            consumer_id: row.consumer_id,
            puller_id: row.puller_id,
            created_at: row.created_at,
            accepted_at: row.accepted_at,
            completed_at: row.completed_at,
            rating: row.rating,
            review: row.review,
            pickup_location: row.pickup_location,
            distance_km: row.distance_km,
        })
    }
}

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: i64,
    user_id: i64,
    message: String,
    is_read: bool,
    created_at: DateTime<Utc>,
    notification_type: String,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = anyhow::Error;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: row.id,
            user_id: row.user_id,
            message: row.message,
            is_read: row.is_read,
            created_at: row.created_at,
            notification_type: row.notification_type.parse()?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TokenRow {
    id: i64,
    token_value: String,
    issued_by: i64,
    owned_by: Option<i64>,
    created_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
    is_used: bool,
}

impl From<TokenRow> for Token {
    fn from(row: TokenRow) -> Self {
        Token {
            id: row.id,
            token_value: row.token_value,
            issued_by: row.issued_by,
            owned_by: row.owned_by,
            created_at: row.created_at,
            used_at: row.used_at,
            is_used: row.is_used,
        }
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, anyhow::Error>
where
    T: TryFrom<R, Error = anyhow::Error>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[derive(Clone)]
pub struct PgStore {
    conn: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, anyhow::Error> {
        let conn = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        Ok(PgStore { conn })
    }

    pub async fn migrate(&self) -> Result<(), anyhow::Error> {
        sqlx::migrate!("./migrations").run(&self.conn).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, anyhow::Error> {
        let tx = self.conn.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, anyhow::Error> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.conn)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, anyhow::Error> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE identifier = $1",
            USER_COLUMNS
        ))
        .bind(identifier)
        .fetch_optional(&self.conn)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn list_unapproved_users(&self) -> Result<Vec<User>, anyhow::Error> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE is_approved = FALSE ORDER BY id",
            USER_COLUMNS
        ))
        .fetch_all(&self.conn)
        .await?;

        convert_all(rows)
    }

    async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, anyhow::Error> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE role = $1 ORDER BY id",
            USER_COLUMNS
        ))
        .bind(role.as_str())
        .fetch_all(&self.conn)
        .await?;

        convert_all(rows)
    }

    async fn get_ride(&self, id: i64) -> Result<Option<RideRequest>, anyhow::Error> {
        let row = sqlx::query_as::<_, RideRow>(&format!(
            "SELECT {} FROM ride_requests WHERE id = $1",
            RIDE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.conn)
        .await?;

        row.map(RideRequest::try_from).transpose()
    }

    async fn list_rides(&self, filter: &RideFilter) -> Result<Vec<RideRequest>, anyhow::Error> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM ride_requests WHERE TRUE",
            RIDE_COLUMNS
        ));

        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(puller_id) = filter.puller_id {
            query.push(" AND puller_id = ").push_bind(puller_id);
        }
        if let Some(consumer_id) = filter.consumer_id {
            query.push(" AND consumer_id = ").push_bind(consumer_id);
        }
        if filter.rated_only {
            query.push(" AND rating IS NOT NULL");
        }

        query.push(match filter.order {
            RideOrder::Oldest => " ORDER BY created_at ASC, id ASC",
            RideOrder::Newest => " ORDER BY created_at DESC, id DESC",
        });

        if let Some(limit) = filter.limit {
            query.push(" LIMIT ").push_bind(limit.max(0));
        }

        let rows = query
            .build_query_as::<RideRow>()
            .fetch_all(&self.conn)
            .await?;

        convert_all(rows)
    }

    async fn list_notifications(&self, user_id: i64) -> Result<Vec<Notification>, anyhow::Error> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {} FROM notifications WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.conn)
        .await?;

        convert_all(rows)
    }

    async fn list_tokens(&self, filter: &TokenFilter) -> Result<Vec<Token>, anyhow::Error> {
        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM tokens WHERE TRUE", TOKEN_COLUMNS));

        if let Some(is_used) = filter.is_used {
            query.push(" AND is_used = ").push_bind(is_used);
        }
        if let Some(owned_by) = filter.owned_by {
            query.push(" AND owned_by = ").push_bind(owned_by);
        }
        query.push(" ORDER BY id");

        let rows = query
            .build_query_as::<TokenRow>()
            .fetch_all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Token::from).collect())
    }
}

pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn insert_user(
        &mut self,
        user: NewUser,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, anyhow::Error> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
                INSERT INTO users (identifier, display_name, credential_hash, role, is_approved, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (identifier) DO NOTHING
                RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.identifier)
        .bind(&user.display_name)
        .bind(&user.credential_hash)
        .bind(user.role.as_str())
        .bind(user.is_approved)
        .bind(now)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn lock_user(&mut self, id: i64) -> Result<Option<User>, anyhow::Error> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1 FOR UPDATE",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn save_user(&mut self, user: &User) -> Result<(), anyhow::Error> {
        sqlx::query(
            r#"
                UPDATE users
                SET display_name = $2, is_approved = $3, points = $4, rating = $5, total_rides = $6
                WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.display_name)
        .bind(user.is_approved)
        .bind(user.points)
        .bind(user.rating)
        .bind(user.total_rides)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn delete_user(&mut self, id: i64) -> Result<(), anyhow::Error> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn insert_ride(
        &mut self,
        ride: NewRideRequest,
        now: DateTime<Utc>,
    ) -> Result<RideRequest, anyhow::Error> {
        let row = sqlx::query_as::<_, RideRow>(&format!(
            r#"
                INSERT INTO ride_requests (destination, status, consumer_id, pickup_location, distance_km, created_at)
                VALUES ($1, 'pending', $2, $3, $4, $5)
                RETURNING {}
            "#,
            RIDE_COLUMNS
        ))
        .bind(&ride.destination)
        .bind(ride.consumer_id)
        .bind(&ride.pickup_location)
        .bind(ride.distance_km)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await?;

        RideRequest::try_from(row)
    }

    async fn lock_ride(&mut self, id: i64) -> Result<Option<RideRequest>, anyhow::Error> {
        let row = sqlx::query_as::<_, RideRow>(&format!(
            "SELECT {} FROM ride_requests WHERE id = $1 FOR UPDATE",
            RIDE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(RideRequest::try_from).transpose()
    }

    async fn save_ride(&mut self, ride: &RideRequest) -> Result<(), anyhow::Error> {
        sqlx::query(
            r#"
                UPDATE ride_requests
                SET status = $2, puller_id = $3, accepted_at = $4, completed_at = $5, rating = $6, review = $7
                WHERE id = $1
            "#,
        )
        .bind(ride.id)
        .bind(ride.status.as_str())
        .bind(ride.puller_id)
        .bind(ride.accepted_at)
        .bind(ride.completed_at)
        .bind(ride.rating)
        .bind(&ride.review)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn ratings_for_puller(&mut self, puller_id: i64) -> Result<Vec<i32>, anyhow::Error> {
        let ratings: Vec<i32> = sqlx::query_scalar(
            "SELECT rating FROM ride_requests WHERE puller_id = $1 AND rating IS NOT NULL",
        )
        .bind(puller_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(ratings)
    }

    async fn insert_notification(
        &mut self,
        notification: NewNotification,
        now: DateTime<Utc>,
    ) -> Result<Notification, anyhow::Error> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
                INSERT INTO notifications (user_id, message, is_read, created_at, notification_type)
                VALUES ($1, $2, FALSE, $3, $4)
                RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(notification.user_id)
        .bind(&notification.message)
        .bind(now)
        .bind(notification.notification_type.as_str())
        .fetch_one(&mut *self.tx)
        .await?;

        Notification::try_from(row)
    }

    async fn lock_notification(
        &mut self,
        id: i64,
    ) -> Result<Option<Notification>, anyhow::Error> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {} FROM notifications WHERE id = $1 FOR UPDATE",
            NOTIFICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(Notification::try_from).transpose()
    }

    async fn save_notification(
        &mut self,
        notification: &Notification,
    ) -> Result<(), anyhow::Error> {
        sqlx::query("UPDATE notifications SET is_read = $2 WHERE id = $1")
            .bind(notification.id)
            .bind(notification.is_read)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn mark_all_notifications_read(&mut self, user_id: i64) -> Result<u64, anyhow::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected())
    }

    async fn insert_token(
        &mut self,
        token: NewToken,
        now: DateTime<Utc>,
    ) -> Result<Option<Token>, anyhow::Error> {
        let row = sqlx::query_as::<_, TokenRow>(&format!(
            r#"
                INSERT INTO tokens (token_value, issued_by, created_at, is_used)
                VALUES ($1, $2, $3, FALSE)
                ON CONFLICT (token_value) DO NOTHING
                RETURNING {}
            "#,
            TOKEN_COLUMNS
        ))
        .bind(&token.token_value)
        .bind(token.issued_by)
        .bind(now)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Token::from))
    }

    async fn lock_token(&mut self, token_value: &str) -> Result<Option<Token>, anyhow::Error> {
        let row = sqlx::query_as::<_, TokenRow>(&format!(
            "SELECT {} FROM tokens WHERE token_value = $1 FOR UPDATE",
            TOKEN_COLUMNS
        ))
        .bind(token_value)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Token::from))
    }

    async fn save_token(&mut self, token: &Token) -> Result<(), anyhow::Error> {
        sqlx::query("UPDATE tokens SET owned_by = $2, used_at = $3, is_used = $4 WHERE id = $1")
            .bind(token.id)
            .bind(token.owned_by)
            .bind(token.used_at)
            .bind(token.is_used)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), anyhow::Error> {
        self.tx.commit().await?;
        Ok(())
    }
}
