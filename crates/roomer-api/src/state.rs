//! Application state management
//!
//! One explicitly constructed set of store and gateway handles, built by the
//! process entry point and shared across handlers. No ambient globals: every
//! collaborator a handler touches comes through here.

use std::sync::Arc;

use roomer_core::config::AppConfig;

use crate::gateways::{Mailer, MediaGateway};
use crate::stores::{AccountStore, ListingStore};

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Account repository
    pub accounts: Arc<dyn AccountStore>,
    /// Listing repository
    pub listings: Arc<dyn ListingStore>,
    /// Binary-asset host gateway
    pub media: Arc<dyn MediaGateway>,
    /// Outbound email gateway
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        accounts: Arc<dyn AccountStore>,
        listings: Arc<dyn ListingStore>,
        media: Arc<dyn MediaGateway>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            config,
            accounts,
            listings,
            media,
            mailer,
        }
    }
}
