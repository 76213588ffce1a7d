//! PostgreSQL booking store

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use super::{BookingStore, CascadeSummary};
use crate::models::{
    Booking, BookingSource, NewBooking, NewProperty, NewRoom, NewUser, Property, Room, User,
};

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store over an initialised pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> DatabaseResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;

        info!("Database migrations applied");
        Ok(())
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
    }
}

fn property_from_row(row: &PgRow) -> Property {
    Property {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        location: row.get("location"),
        pin: row.get("pin"),
    }
}

fn room_from_row(row: &PgRow) -> Room {
    Room {
        id: row.get("id"),
        property_id: row.get("property_id"),
        name: row.get("name"),
        price: row.get("price"),
    }
}

fn booking_from_row(row: &PgRow) -> DatabaseResult<Booking> {
    let source: String = row.get("source");
    let source = source
        .parse::<BookingSource>()
        .map_err(|e| DatabaseError::Query(sqlx::Error::Decode(e.into())))?;

    Ok(Booking {
        id: row.get("id"),
        room_id: row.get("room_id"),
        start: row.get("start_date"),
        end: row.get("end_date"),
        source,
        label: row.get("label"),
    })
}

#[async_trait]
impl BookingStore for PgStore {
    async fn create_user(&self, new_user: NewUser) -> DatabaseResult<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(user_from_row(&row))
    }

    async fn find_user_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_user_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn create_property(&self, new_property: NewProperty) -> DatabaseResult<Property> {
        let row = sqlx::query(
            r#"
            INSERT INTO properties (user_id, name, location, pin)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, location, pin
            "#,
        )
        .bind(new_property.user_id)
        .bind(&new_property.name)
        .bind(&new_property.location)
        .bind(&new_property.pin)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(property_from_row(&row))
    }

    async fn find_property(&self, id: i64) -> DatabaseResult<Option<Property>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, name, location, pin
            FROM properties
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(row.as_ref().map(property_from_row))
    }

    async fn properties_by_owner(&self, user_id: i64) -> DatabaseResult<Vec<Property>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, name, location, pin
            FROM properties
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(rows.iter().map(property_from_row).collect())
    }

    async fn create_room(&self, new_room: NewRoom) -> DatabaseResult<Room> {
        let row = sqlx::query(
            r#"
            INSERT INTO rooms (property_id, name, price)
            VALUES ($1, $2, $3)
            RETURNING id, property_id, name, price
            "#,
        )
        .bind(new_room.property_id)
        .bind(&new_room.name)
        .bind(&new_room.price)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(room_from_row(&row))
    }

    async fn find_room(&self, id: i64) -> DatabaseResult<Option<Room>> {
        let row = sqlx::query(
            r#"
            SELECT id, property_id, name, price
            FROM rooms
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(row.as_ref().map(room_from_row))
    }

    async fn rooms_by_properties(&self, property_ids: &[i64]) -> DatabaseResult<Vec<Room>> {
        if property_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT id, property_id, name, price
            FROM rooms
            WHERE property_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(property_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(rows.iter().map(room_from_row).collect())
    }

    async fn create_booking(&self, new_booking: NewBooking) -> DatabaseResult<Booking> {
        let row = sqlx::query(
            r#"
            INSERT INTO bookings (room_id, start_date, end_date, source, label)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, room_id, start_date, end_date, source, label
            "#,
        )
        .bind(new_booking.room_id)
        .bind(new_booking.start)
        .bind(new_booking.end)
        .bind(new_booking.source.as_str())
        .bind(&new_booking.label)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        booking_from_row(&row)
    }

    async fn bookings_by_rooms(&self, room_ids: &[i64]) -> DatabaseResult<Vec<Booking>> {
        if room_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT id, room_id, start_date, end_date, source, label
            FROM bookings
            WHERE room_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(room_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        rows.iter().map(booking_from_row).collect()
    }

    async fn delete_property_cascade(&self, id: i64) -> DatabaseResult<Option<CascadeSummary>> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;

        // Lock the property row so concurrent writers queue behind the cascade
        let exists = sqlx::query("SELECT id FROM properties WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DatabaseError::Query)?
            .is_some();

        if !exists {
            tx.rollback().await.map_err(DatabaseError::Query)?;
            return Ok(None);
        }

        let bookings = sqlx::query(
            r#"
            DELETE FROM bookings
            WHERE room_id IN (SELECT id FROM rooms WHERE property_id = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::Query)?
        .rows_affected();

        let rooms = sqlx::query("DELETE FROM rooms WHERE property_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::Query)?
            .rows_affected();

        sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::Query)?;

        tx.commit().await.map_err(DatabaseError::Query)?;

        Ok(Some(CascadeSummary { rooms, bookings }))
    }

    async fn health_check(&self) -> DatabaseResult<bool> {
        common::database::health_check(&self.pool).await
    }
}
