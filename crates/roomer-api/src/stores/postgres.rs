//! PostgreSQL store implementations
//!
//! Accounts and listings each live in one table; pictures are kept as JSONB
//! documents and the owned-room sequence as a UUID array. Search, proximity,
//! pagination, and random sampling are expressed in SQL so the datastore does
//! the work.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use roomer_core::{Account, DatabaseConfig, Listing, Picture, Profile, RoomerError, Result};

use super::{AccountStore, ListingPatch, ListingQuery, ListingStore, ProfilePatch, SortOrder};

/// Open a connection pool against the configured database.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.pool_size)
        .connect(&config.url)
        .await
        .map_err(|e| RoomerError::Upstream(format!("PostgreSQL connection failed: {e}")))
}

/// Create tables and indexes if they do not exist yet.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id UUID PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            picture JSONB,
            token TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            rooms UUID[] NOT NULL DEFAULT '{}',
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS listings (
            id UUID PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            price DOUBLE PRECISION NOT NULL,
            latitude DOUBLE PRECISION NOT NULL,
            longitude DOUBLE PRECISION NOT NULL,
            pictures JSONB NOT NULL DEFAULT '[]',
            rating_value DOUBLE PRECISION,
            reviews INTEGER,
            owner UUID NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS accounts_token_idx ON accounts (token)",
        "CREATE INDEX IF NOT EXISTS listings_owner_idx ON listings (owner)",
        "CREATE INDEX IF NOT EXISTS listings_coords_idx ON listings (latitude, longitude)",
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| RoomerError::Upstream(format!("Schema initialization failed: {e}")))?;
    }

    Ok(())
}

/// Account row from the database
#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    username: String,
    name: String,
    description: String,
    picture: Option<Json<Picture>>,
    token: String,
    password_hash: String,
    password_salt: String,
    rooms: Vec<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            email: row.email,
            profile: Profile {
                username: row.username,
                name: row.name,
                description: row.description,
                picture: row.picture.map(|p| p.0),
            },
            token: row.token,
            password_hash: row.password_hash,
            password_salt: row.password_salt,
            rooms: row.rooms,
            created_at: row.created_at,
        }
    }
}

/// Listing row from the database
#[derive(Debug, FromRow)]
struct ListingRow {
    id: Uuid,
    title: String,
    description: String,
    price: f64,
    latitude: f64,
    longitude: f64,
    pictures: Json<Vec<Picture>>,
    rating_value: Option<f64>,
    reviews: Option<i32>,
    owner: Uuid,
    created_at: DateTime<Utc>,
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        Listing {
            id: row.id,
            title: row.title,
            description: row.description,
            price: row.price,
            location: [row.latitude, row.longitude],
            pictures: row.pictures.0,
            rating_value: row.rating_value,
            reviews: row.reviews,
            owner: row.owner,
            created_at: row.created_at,
        }
    }
}

const ACCOUNT_COLUMNS: &str = "id, email, username, name, description, picture, token, \
     password_hash, password_salt, rooms, created_at";

const LISTING_COLUMNS: &str = "id, title, description, price, latitude, longitude, pictures, \
     rating_value, reviews, owner, created_at";

/// PostgreSQL-backed account repository
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by(&self, column: &str, value: &str) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {column} = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RoomerError::Upstream(format!("Failed to fetch account: {e}")))?;

        Ok(row.map(Account::from))
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts
                (id, email, username, name, description, picture, token,
                 password_hash, password_salt, rooms, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.profile.username)
        .bind(&account.profile.name)
        .bind(&account.profile.description)
        .bind(account.profile.picture.clone().map(Json))
        .bind(&account.token)
        .bind(&account.password_hash)
        .bind(&account.password_salt)
        .bind(&account.rooms)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RoomerError::Upstream(format!("Failed to create account: {e}")))?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RoomerError::Upstream(format!("Failed to fetch account: {e}")))?;

        Ok(row.map(Account::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.fetch_one_by("email", email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        self.fetch_one_by("username", username).await
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Account>> {
        self.fetch_one_by("token", token).await
    }

    async fn update_profile(&self, id: Uuid, patch: &ProfilePatch) -> Result<Account> {
        let sql = format!(
            r#"
            UPDATE accounts SET
                email = COALESCE($2, email),
                username = COALESCE($3, username),
                name = COALESCE($4, name),
                description = COALESCE($5, description)
            WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .bind(&patch.email)
            .bind(&patch.username)
            .bind(&patch.name)
            .bind(&patch.description)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RoomerError::Upstream(format!("Failed to update account: {e}")))?;

        row.map(Account::from)
            .ok_or_else(|| RoomerError::NotFound("User not found".to_string()))
    }

    async fn set_credentials(
        &self,
        id: Uuid,
        password_hash: &str,
        password_salt: &str,
        token: &str,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE accounts SET password_hash = $2, password_salt = $3, token = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .bind(password_salt)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| RoomerError::Upstream(format!("Failed to update credentials: {e}")))?;

        Ok(())
    }

    async fn set_picture(&self, id: Uuid, picture: Option<Picture>) -> Result<Account> {
        let sql = format!(
            "UPDATE accounts SET picture = $2 WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .bind(picture.map(Json))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RoomerError::Upstream(format!("Failed to update account picture: {e}")))?;

        row.map(Account::from)
            .ok_or_else(|| RoomerError::NotFound("User not found".to_string()))
    }

    async fn add_room(&self, id: Uuid, room: Uuid) -> Result<()> {
        sqlx::query("UPDATE accounts SET rooms = array_append(rooms, $2) WHERE id = $1")
            .bind(id)
            .bind(room)
            .execute(&self.pool)
            .await
            .map_err(|e| RoomerError::Upstream(format!("Failed to record owned room: {e}")))?;

        Ok(())
    }

    async fn remove_room(&self, id: Uuid, room: Uuid) -> Result<()> {
        sqlx::query("UPDATE accounts SET rooms = array_remove(rooms, $2) WHERE id = $1")
            .bind(id)
            .bind(room)
            .execute(&self.pool)
            .await
            .map_err(|e| RoomerError::Upstream(format!("Failed to remove owned room: {e}")))?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RoomerError::Upstream(format!("Failed to delete account: {e}")))?;

        Ok(())
    }
}

/// PostgreSQL-backed listing repository
pub struct PgListingStore {
    pool: PgPool,
}

impl PgListingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn insert(&self, listing: &Listing) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO listings
                (id, title, description, price, latitude, longitude, pictures,
                 rating_value, reviews, owner, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(listing.id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.price)
        .bind(listing.location[0])
        .bind(listing.location[1])
        .bind(Json(listing.pictures.clone()))
        .bind(listing.rating_value)
        .bind(listing.reviews)
        .bind(listing.owner)
        .bind(listing.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RoomerError::Upstream(format!("Failed to create listing: {e}")))?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Listing>> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1");
        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RoomerError::Upstream(format!("Failed to fetch listing: {e}")))?;

        Ok(row.map(Listing::from))
    }

    async fn update(&self, id: Uuid, patch: &ListingPatch) -> Result<Listing> {
        let sql = format!(
            r#"
            UPDATE listings SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                latitude = COALESCE($5, latitude),
                longitude = COALESCE($6, longitude)
            WHERE id = $1
            RETURNING {LISTING_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(id)
            .bind(&patch.title)
            .bind(&patch.description)
            .bind(patch.price)
            .bind(patch.location.map(|l| l[0]))
            .bind(patch.location.map(|l| l[1]))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RoomerError::Upstream(format!("Failed to update listing: {e}")))?;

        row.map(Listing::from)
            .ok_or_else(|| RoomerError::NotFound("Room not found".to_string()))
    }

    async fn set_pictures(&self, id: Uuid, pictures: Vec<Picture>) -> Result<Listing> {
        let sql = format!(
            "UPDATE listings SET pictures = $2 WHERE id = $1 RETURNING {LISTING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(id)
            .bind(Json(pictures))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RoomerError::Upstream(format!("Failed to update listing pictures: {e}")))?;

        row.map(Listing::from)
            .ok_or_else(|| RoomerError::NotFound("Room not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RoomerError::Upstream(format!("Failed to delete listing: {e}")))?;

        Ok(())
    }

    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Listing>> {
        let sql = format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE owner = $1 ORDER BY created_at ASC"
        );
        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RoomerError::Upstream(format!("Failed to fetch listings: {e}")))?;

        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn search(&self, query: &ListingQuery) -> Result<Vec<Listing>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE 1 = 1"
        ));

        if let Some(title) = query.title.as_deref().filter(|t| !t.is_empty()) {
            builder.push(" AND title ILIKE ");
            builder.push_bind(format!("%{title}%"));
        }
        if let Some(min) = query.price_min {
            builder.push(" AND price >= ");
            builder.push_bind(min);
        }
        if let Some(max) = query.price_max {
            builder.push(" AND price <= ");
            builder.push_bind(max);
        }

        builder.push(match query.sort {
            Some(SortOrder::PriceAsc) => " ORDER BY price ASC, created_at ASC",
            Some(SortOrder::PriceDesc) => " ORDER BY price DESC, created_at ASC",
            Some(SortOrder::DateAsc) => " ORDER BY created_at ASC, id ASC",
            Some(SortOrder::DateDesc) => " ORDER BY created_at DESC, id ASC",
            None => " ORDER BY created_at ASC, id ASC",
        });

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }
        if let Some(offset) = query.offset {
            builder.push(" OFFSET ");
            builder.push_bind(offset);
        }

        let rows: Vec<ListingRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RoomerError::Upstream(format!("Failed to search listings: {e}")))?;

        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM listings")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RoomerError::Upstream(format!("Failed to count listings: {e}")))
    }

    async fn sample(&self, n: i64) -> Result<Vec<Listing>> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings ORDER BY random() LIMIT $1");
        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(n)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RoomerError::Upstream(format!("Failed to sample listings: {e}")))?;

        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn nearby(&self, latitude: f64, longitude: f64, radius: f64) -> Result<Vec<Listing>> {
        let sql = format!(
            r#"
            SELECT {LISTING_COLUMNS} FROM listings
            WHERE power(latitude - $1, 2) + power(longitude - $2, 2) <= power($3, 2)
            ORDER BY power(latitude - $1, 2) + power(longitude - $2, 2) ASC
            "#
        );
        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(latitude)
            .bind(longitude)
            .bind(radius)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RoomerError::Upstream(format!("Failed to run proximity query: {e}")))?;

        Ok(rows.into_iter().map(Listing::from).collect())
    }
}
