//! Roomer API - REST server for the rental marketplace
//!
//! Provides the HTTP surface over two document collections (accounts and
//! listings), an external media host, and an SMTP notification gateway.
//! Collaborators are injected through [`state::AppState`]; the binary entry
//! point owns their lifecycle.

pub mod auth;
pub mod error;
pub mod gateways;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod stores;
pub mod validate;

pub use routes::create_router;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    //! Test wiring: in-memory stores and recording gateways

    use std::sync::Arc;

    use roomer_core::config::AppConfig;

    use crate::gateways::{RecordingMailer, RecordingMediaGateway};
    use crate::routes::create_router;
    use crate::state::AppState;
    use crate::stores::memory::{MemoryAccountStore, MemoryListingStore};

    /// Handles integration tests assert against.
    pub struct TestApp {
        pub router: axum::Router,
        pub state: Arc<AppState>,
        pub media: Arc<RecordingMediaGateway>,
        pub mailer: Arc<RecordingMailer>,
    }

    /// Build a full application wired to in-memory stores and recording
    /// gateways.
    pub fn test_app() -> TestApp {
        let media = Arc::new(RecordingMediaGateway::new());
        let mailer = Arc::new(RecordingMailer::new());
        let state = Arc::new(AppState::new(
            AppConfig::default(),
            Arc::new(MemoryAccountStore::new()),
            Arc::new(MemoryListingStore::new()),
            media.clone(),
            mailer.clone(),
        ));

        TestApp {
            router: create_router(state.clone()),
            state,
            media,
            mailer,
        }
    }

    /// Router-only variant for tests that do not inspect the fakes.
    pub fn create_router_for_testing() -> axum::Router {
        test_app().router
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use testing::create_router_for_testing;
