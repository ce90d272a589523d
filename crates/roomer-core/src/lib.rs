//! Roomer Core - Domain models, shared types, and configuration
//!
//! This crate defines the abstractions used throughout the Roomer system:
//! - Account and listing models
//! - Media attachment references
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{AppConfig, ConfigError, DatabaseConfig, MailConfig, MediaConfig, ServerConfig};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Error Types
// ============================================================================

/// Core error taxonomy for Roomer operations
///
/// Variants carry the client-facing message verbatim; the HTTP layer maps
/// each variant to a status code (400/401/404) and renders the
/// `{"error": message}` envelope.
#[derive(thiserror::Error, Debug)]
pub enum RoomerError {
    #[error("{0}")]
    MissingParameter(String),

    #[error("{0}")]
    InvalidFormat(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    LimitExceeded(String),

    #[error("{0}")]
    Upstream(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RoomerError>;

// ============================================================================
// Domain Constants
// ============================================================================

/// Maximum number of pictures attachable to a listing.
pub const MAX_LISTING_PICTURES: usize = 5;

/// Fixed page size for the listing search endpoint.
pub const LISTINGS_PAGE_SIZE: i64 = 5;

/// Proximity radius for the nearby query, in coordinate-space units.
pub const NEARBY_RADIUS: f64 = 0.1;

/// How many listings the unfiltered listing endpoint samples at random
/// when the collection holds more than this many.
pub const UNFILTERED_SAMPLE_SIZE: i64 = 15;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 5;

// ============================================================================
// Media Attachments
// ============================================================================

/// Reference to a binary asset hosted on the external media host.
///
/// `public_id` is the opaque identifier the host assigned at upload time and
/// the handle used to delete the asset later; `url` is publicly retrievable
/// and stable until deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Picture {
    pub public_id: String,
    pub url: String,
}

// ============================================================================
// Accounts
// ============================================================================

/// Public-facing profile fields of an account.
///
/// Serialized as the `account` object in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<Picture>,
}

/// A registered user with credentials, profile fields, and owned listings.
///
/// The struct deliberately does not implement `Serialize`: credential
/// material never leaves the process through a response body. Handlers build
/// dedicated view types instead.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    /// Unique, format-validated login address.
    pub email: String,
    pub profile: Profile,
    /// Opaque session token; one active token per account, replaced as a
    /// whole on rotation, never revoked individually.
    pub token: String,
    pub password_hash: String,
    /// Regenerated on every password change, never reused.
    pub password_salt: String,
    /// Ordered ids of listings owned by this account (best-effort integrity).
    pub rooms: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        email: impl Into<String>,
        profile: Profile,
        token: String,
        password_hash: String,
        password_salt: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            profile,
            token,
            password_hash,
            password_salt,
            rooms: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// Listings
// ============================================================================

/// A rentable property record.
#[derive(Debug, Clone)]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Always strictly positive once set.
    pub price: f64,
    /// Latitude/longitude pair.
    pub location: [f64; 2],
    /// At most [`MAX_LISTING_PICTURES`] attachments, in upload order.
    pub pictures: Vec<Picture>,
    pub rating_value: Option<f64>,
    pub reviews: Option<i32>,
    /// The account that created the listing; immutable after creation.
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        location: [f64; 2],
        owner: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            price,
            location,
            pictures: Vec::new(),
            rating_value: None,
            reviews: None,
            owner,
            created_at: Utc::now(),
        }
    }
}
