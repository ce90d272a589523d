//! Persistence-backed repositories for accounts and listings
//!
//! Stores are trait objects injected into [`crate::state::AppState`], with a
//! PostgreSQL implementation for production and an in-memory implementation
//! for tests. Query-shaped operations (substring filter, price range, sort,
//! pagination, proximity, random sampling) are part of the trait surface so
//! both implementations can delegate them to their own engine.

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use roomer_core::{Account, Listing, Picture, Result};
use uuid::Uuid;

/// Merge-patch over an account's mutable profile fields.
///
/// Applied as a single read-modify-write so concurrent updates cannot leave
/// a half-applied profile.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub email: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.username.is_none()
            && self.name.is_none()
            && self.description.is_none()
    }
}

/// Merge-patch over a listing's mutable fields.
#[derive(Debug, Clone, Default)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub location: Option<[f64; 2]>,
}

impl ListingPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.location.is_none()
    }
}

/// Sort orders accepted by the listing search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    PriceAsc,
    PriceDesc,
    DateAsc,
    DateDesc,
}

impl SortOrder {
    /// Parse the wire representation; unknown values are ignored by callers.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "price-asc" => Some(Self::PriceAsc),
            "price-desc" => Some(Self::PriceDesc),
            "date-asc" => Some(Self::DateAsc),
            "date-desc" => Some(Self::DateDesc),
            _ => None,
        }
    }
}

/// Predicate, sort, and window for a listing search.
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    /// Case-insensitive substring match on the title.
    pub title: Option<String>,
    /// Inclusive lower price bound.
    pub price_min: Option<f64>,
    /// Inclusive upper price bound.
    pub price_max: Option<f64>,
    pub sort: Option<SortOrder>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Repository over the accounts collection.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert(&self, account: &Account) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<Account>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>>;

    async fn find_by_token(&self, token: &str) -> Result<Option<Account>>;

    /// Apply a profile merge-patch in one write and return the updated account.
    async fn update_profile(&self, id: Uuid, patch: &ProfilePatch) -> Result<Account>;

    /// Replace credential material and the session token atomically.
    async fn set_credentials(
        &self,
        id: Uuid,
        password_hash: &str,
        password_salt: &str,
        token: &str,
    ) -> Result<()>;

    /// Attach or clear the profile picture and return the updated account.
    async fn set_picture(&self, id: Uuid, picture: Option<Picture>) -> Result<Account>;

    async fn add_room(&self, id: Uuid, room: Uuid) -> Result<()>;

    async fn remove_room(&self, id: Uuid, room: Uuid) -> Result<()>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Repository over the listings collection.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn insert(&self, listing: &Listing) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<Listing>>;

    /// Apply a merge-patch in one write and return the updated listing.
    async fn update(&self, id: Uuid, patch: &ListingPatch) -> Result<Listing>;

    /// Replace the picture sequence and return the updated listing.
    async fn set_pictures(&self, id: Uuid, pictures: Vec<Picture>) -> Result<Listing>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Listing>>;

    /// Filtered, sorted, optionally windowed search.
    async fn search(&self, query: &ListingQuery) -> Result<Vec<Listing>>;

    async fn count(&self) -> Result<i64>;

    /// Uniform random sample without replacement.
    async fn sample(&self, n: i64) -> Result<Vec<Listing>>;

    /// Listings within `radius` of the point, ordered by increasing planar
    /// coordinate distance.
    async fn nearby(&self, latitude: f64, longitude: f64, radius: f64) -> Result<Vec<Listing>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("price-asc"), Some(SortOrder::PriceAsc));
        assert_eq!(SortOrder::parse("price-desc"), Some(SortOrder::PriceDesc));
        assert_eq!(SortOrder::parse("date-asc"), Some(SortOrder::DateAsc));
        assert_eq!(SortOrder::parse("date-desc"), Some(SortOrder::DateDesc));
        assert_eq!(SortOrder::parse("rating-asc"), None);
        assert_eq!(SortOrder::parse(""), None);
    }

    #[test]
    fn test_empty_patches() {
        assert!(ProfilePatch::default().is_empty());
        assert!(ListingPatch::default().is_empty());

        let patch = ProfilePatch {
            name: Some("New name".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
