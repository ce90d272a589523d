//! Authorization gate
//!
//! Mutating endpoints carry the session token as a `token` field in the
//! request body or query rather than a header, so authentication is a
//! handler-level step instead of extraction middleware: the gate resolves
//! the presented token against the account store before any business logic
//! runs, and ownership is checked by comparing the resolved account's token
//! with the token stored on the target resource's owner.

use crate::stores::AccountStore;
use roomer_core::{Account, Listing, RoomerError, Result};

const UNAUTHORIZED: &str = "User unauthorized";

/// Resolve a presented token to the owning account.
///
/// An absent, empty, or unknown token rejects with `Unauthorized` before the
/// caller's business logic runs.
pub async fn authenticate(accounts: &dyn AccountStore, token: Option<&str>) -> Result<Account> {
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| RoomerError::Unauthorized(UNAUTHORIZED.to_string()))?;

    accounts
        .find_by_token(token)
        .await?
        .ok_or_else(|| RoomerError::Unauthorized(UNAUTHORIZED.to_string()))
}

/// Require that the caller holds the owner's current token.
pub fn require_owner(caller: &Account, owner_token: &str) -> Result<()> {
    if caller.token != owner_token {
        return Err(RoomerError::Unauthorized(UNAUTHORIZED.to_string()));
    }
    Ok(())
}

/// Fetch the account owning a listing.
///
/// A dangling owner reference is treated as an authorization failure: nobody
/// can prove ownership of an orphaned listing.
pub async fn resolve_owner(accounts: &dyn AccountStore, listing: &Listing) -> Result<Account> {
    accounts
        .get(listing.owner)
        .await?
        .ok_or_else(|| RoomerError::Unauthorized(UNAUTHORIZED.to_string()))
}
