//! In-memory store implementations for tests
//!
//! Mirror the PostgreSQL semantics closely enough for handler tests: the
//! unsorted ordering is creation order, search filters match the SQL
//! predicates, and proximity uses the same planar distance.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use roomer_core::{Account, Listing, Picture, RoomerError, Result};

use super::{AccountStore, ListingPatch, ListingQuery, ListingStore, ProfilePatch, SortOrder};

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, account: &Account) -> Result<()> {
        self.accounts
            .write()
            .await
            .insert(account.id, account.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.profile.username == username)
            .cloned())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.token == token)
            .cloned())
    }

    async fn update_profile(&self, id: Uuid, patch: &ProfilePatch) -> Result<Account> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| RoomerError::NotFound("User not found".to_string()))?;

        if let Some(email) = &patch.email {
            account.email = email.clone();
        }
        if let Some(username) = &patch.username {
            account.profile.username = username.clone();
        }
        if let Some(name) = &patch.name {
            account.profile.name = name.clone();
        }
        if let Some(description) = &patch.description {
            account.profile.description = description.clone();
        }

        Ok(account.clone())
    }

    async fn set_credentials(
        &self,
        id: Uuid,
        password_hash: &str,
        password_salt: &str,
        token: &str,
    ) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        if let Some(account) = accounts.get_mut(&id) {
            account.password_hash = password_hash.to_string();
            account.password_salt = password_salt.to_string();
            account.token = token.to_string();
        }
        Ok(())
    }

    async fn set_picture(&self, id: Uuid, picture: Option<Picture>) -> Result<Account> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| RoomerError::NotFound("User not found".to_string()))?;
        account.profile.picture = picture;
        Ok(account.clone())
    }

    async fn add_room(&self, id: Uuid, room: Uuid) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        if let Some(account) = accounts.get_mut(&id) {
            account.rooms.push(room);
        }
        Ok(())
    }

    async fn remove_room(&self, id: Uuid, room: Uuid) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        if let Some(account) = accounts.get_mut(&id) {
            account.rooms.retain(|r| *r != room);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.accounts.write().await.remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryListingStore {
    listings: RwLock<HashMap<Uuid, Listing>>,
}

impl MemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn in_creation_order(listings: &HashMap<Uuid, Listing>) -> Vec<Listing> {
        let mut all: Vec<Listing> = listings.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        all
    }
}

fn planar_distance(location: [f64; 2], latitude: f64, longitude: f64) -> f64 {
    let dx = location[0] - latitude;
    let dy = location[1] - longitude;
    (dx * dx + dy * dy).sqrt()
}

#[async_trait]
impl ListingStore for MemoryListingStore {
    async fn insert(&self, listing: &Listing) -> Result<()> {
        self.listings
            .write()
            .await
            .insert(listing.id, listing.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Listing>> {
        Ok(self.listings.read().await.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, patch: &ListingPatch) -> Result<Listing> {
        let mut listings = self.listings.write().await;
        let listing = listings
            .get_mut(&id)
            .ok_or_else(|| RoomerError::NotFound("Room not found".to_string()))?;

        if let Some(title) = &patch.title {
            listing.title = title.clone();
        }
        if let Some(description) = &patch.description {
            listing.description = description.clone();
        }
        if let Some(price) = patch.price {
            listing.price = price;
        }
        if let Some(location) = patch.location {
            listing.location = location;
        }

        Ok(listing.clone())
    }

    async fn set_pictures(&self, id: Uuid, pictures: Vec<Picture>) -> Result<Listing> {
        let mut listings = self.listings.write().await;
        let listing = listings
            .get_mut(&id)
            .ok_or_else(|| RoomerError::NotFound("Room not found".to_string()))?;
        listing.pictures = pictures;
        Ok(listing.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.listings.write().await.remove(&id);
        Ok(())
    }

    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Listing>> {
        let listings = self.listings.read().await;
        let mut owned = Self::in_creation_order(&listings);
        owned.retain(|l| l.owner == owner);
        Ok(owned)
    }

    async fn search(&self, query: &ListingQuery) -> Result<Vec<Listing>> {
        let listings = self.listings.read().await;
        let mut matches = Self::in_creation_order(&listings);

        if let Some(title) = query.title.as_deref().filter(|t| !t.is_empty()) {
            let needle = title.to_lowercase();
            matches.retain(|l| l.title.to_lowercase().contains(&needle));
        }
        if let Some(min) = query.price_min {
            matches.retain(|l| l.price >= min);
        }
        if let Some(max) = query.price_max {
            matches.retain(|l| l.price <= max);
        }

        match query.sort {
            Some(SortOrder::PriceAsc) => {
                matches.sort_by(|a, b| a.price.total_cmp(&b.price));
            }
            Some(SortOrder::PriceDesc) => {
                matches.sort_by(|a, b| b.price.total_cmp(&a.price));
            }
            Some(SortOrder::DateAsc) | None => {}
            Some(SortOrder::DateDesc) => {
                matches.reverse();
            }
        }

        if let Some(offset) = query.offset {
            matches = matches.into_iter().skip(offset.max(0) as usize).collect();
        }
        if let Some(limit) = query.limit {
            matches.truncate(limit.max(0) as usize);
        }

        Ok(matches)
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.listings.read().await.len() as i64)
    }

    async fn sample(&self, n: i64) -> Result<Vec<Listing>> {
        let listings = self.listings.read().await;
        let all: Vec<&Listing> = listings.values().collect();
        Ok(all
            .choose_multiple(&mut rand::thread_rng(), n.max(0) as usize)
            .map(|l| (*l).clone())
            .collect())
    }

    async fn nearby(&self, latitude: f64, longitude: f64, radius: f64) -> Result<Vec<Listing>> {
        let listings = self.listings.read().await;
        let mut within: Vec<Listing> = listings
            .values()
            .filter(|l| planar_distance(l.location, latitude, longitude) <= radius)
            .cloned()
            .collect();
        within.sort_by(|a, b| {
            planar_distance(a.location, latitude, longitude)
                .total_cmp(&planar_distance(b.location, latitude, longitude))
        });
        Ok(within)
    }
}
