//! API handlers

pub mod health;
pub mod rooms;
pub mod users;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

/// Plain confirmation body for delete/update operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parse a path id, rejecting malformed values before any store access.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Wrong id".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert!(parse_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(parse_id("not-an-id").is_err());
        assert!(parse_id("").is_err());
    }
}
