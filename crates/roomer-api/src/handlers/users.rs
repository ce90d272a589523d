//! Account handlers
//!
//! Sign-up, login, profile reads and updates, password lifecycle, profile
//! picture attachment, and account deletion. Every mutating handler walks
//! the same short-circuiting sequence: parameter presence, id syntax, token
//! resolution, resource existence, ownership, field validation, one write.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use roomer_core::{Account, Profile, RoomerError};

use crate::auth;
use crate::error::AppError;
use crate::gateways::{Mailer, MediaGateway};
use crate::handlers::rooms::{OwnerSummary, RoomResponse};
use crate::handlers::{parse_id, MessageResponse};
use crate::state::AppState;
use crate::stores::{AccountStore, ListingStore, ProfilePatch};
use crate::validate;

/// Sign-up request
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignUpRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LogInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Session response: the opaque token plus the public profile
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    #[schema(value_type = Object)]
    pub account: Profile,
}

/// Public account view
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountView {
    pub id: Uuid,
    #[schema(value_type = Object)]
    pub account: Profile,
    pub rooms: Vec<Uuid>,
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            account: account.profile,
            rooms: account.rooms,
        }
    }
}

/// Owner-facing account view (includes the email)
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountDetail {
    pub id: Uuid,
    pub email: String,
    #[schema(value_type = Object)]
    pub account: Profile,
    pub rooms: Vec<Uuid>,
}

impl From<Account> for AccountDetail {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            account: account.profile,
            rooms: account.rooms,
        }
    }
}

/// Profile update request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub token: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Password rotation request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePasswordRequest {
    pub token: Option<String>,
    #[serde(rename = "previousPassword")]
    pub previous_password: Option<String>,
    #[serde(rename = "newPassword")]
    pub new_password: Option<String>,
}

/// Password rotation response; the session token is rotated together with
/// the password, invalidating outstanding sessions
#[derive(Debug, Serialize, ToSchema)]
pub struct PasswordChangedResponse {
    pub message: String,
    pub token: String,
}

/// Password recovery request
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecoverPasswordRequest {
    pub email: Option<String>,
}

/// Picture upload request; image bytes are base64 encoded
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadPictureRequest {
    pub token: Option<String>,
    pub picture: Option<String>,
}

/// Token-only request body for delete operations
#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub token: Option<String>,
}

/// Create a new account
#[utoipa::path(
    post,
    path = "/user/sign_up",
    tag = "users",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "Account created", body = SessionResponse),
        (status = 400, description = "Validation failure", body = crate::error::ErrorBody)
    )
)]
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignUpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(email), Some(username), Some(name), Some(description), Some(password)) = (
        request.email,
        request.username,
        request.name,
        request.description,
        request.password,
    ) else {
        return Err(RoomerError::MissingParameter("Missing parameters".to_string()).into());
    };

    for field in [&email, &username, &name, &description] {
        validate::non_blank(field, "All fields must be completed correctly")?;
    }
    validate::email(&email)?;

    if state.accounts.find_by_email(&email).await?.is_some() {
        return Err(RoomerError::Conflict("Email already used".to_string()).into());
    }
    if state
        .accounts
        .find_by_username(username.trim())
        .await?
        .is_some()
    {
        return Err(RoomerError::Conflict("Username already used".to_string()).into());
    }

    auth::validate_password(&password)?;

    let salt = auth::generate_salt();
    let hash = auth::hash_password(&password, &salt)?;
    let token = auth::issue_token(auth::SIGNUP_TOKEN_BYTES);

    let account = Account::new(
        email,
        Profile {
            username: username.trim().to_string(),
            name: name.trim().to_string(),
            description: description.trim().to_string(),
            picture: None,
        },
        token,
        hash,
        salt,
    );
    state.accounts.insert(&account).await?;

    Ok(Json(SessionResponse {
        token: account.token,
        account: account.profile,
    }))
}

/// Verify credentials and return the session token
#[utoipa::path(
    post,
    path = "/user/log_in",
    tag = "users",
    request_body = LogInRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = SessionResponse),
        (status = 400, description = "Wrong password", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown email", body = crate::error::ErrorBody)
    )
)]
pub async fn log_in(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LogInRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(email), Some(password)) = (request.email, request.password) else {
        return Err(RoomerError::MissingParameter("Missing parameters".to_string()).into());
    };

    let account = state
        .accounts
        .find_by_email(&email)
        .await?
        .ok_or_else(|| RoomerError::NotFound("Email not found".to_string()))?;

    if !auth::verify_password(&password, &account.password_salt, &account.password_hash)? {
        return Err(AppError::BadRequest("Wrong password".to_string()));
    }

    Ok(Json(SessionResponse {
        token: account.token,
        account: account.profile,
    }))
}

/// Fetch the public view of an account
#[utoipa::path(
    get,
    path = "/user/{id}",
    tag = "users",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "Public account view", body = AccountView),
        (status = 400, description = "Malformed id", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown account", body = crate::error::ErrorBody)
    )
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;

    let account = state
        .accounts
        .get(id)
        .await?
        .ok_or_else(|| RoomerError::NotFound("User not found".to_string()))?;

    Ok(Json(AccountView::from(account)))
}

/// List the listings owned by an account
#[utoipa::path(
    get,
    path = "/user/rooms/{id}",
    tag = "users",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "Owned listings", body = [RoomResponse]),
        (status = 400, description = "Malformed id", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown account or no rooms", body = crate::error::ErrorBody)
    )
)]
pub async fn user_rooms(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;

    let account = state
        .accounts
        .get(id)
        .await?
        .ok_or_else(|| RoomerError::NotFound("User not found".to_string()))?;

    if account.rooms.is_empty() {
        return Err(RoomerError::NotFound("This user has no room".to_string()).into());
    }

    let owner = OwnerSummary::from_account(&account);
    let mut rooms = Vec::with_capacity(account.rooms.len());
    for room_id in &account.rooms {
        // Room references are best-effort; a dangling id is skipped.
        if let Some(listing) = state.listings.get(*room_id).await? {
            rooms.push(RoomResponse::new(listing, owner.clone()));
        }
    }

    Ok(Json(rooms))
}

/// Update profile fields
#[utoipa::path(
    put,
    path = "/user/update/{id}",
    tag = "users",
    params(("id" = String, Path, description = "Account id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountDetail),
        (status = 400, description = "Validation failure", body = crate::error::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown account", body = crate::error::ErrorBody)
    )
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let caller = auth::authenticate(state.accounts.as_ref(), request.token.as_deref()).await?;

    let target = state
        .accounts
        .get(id)
        .await?
        .ok_or_else(|| RoomerError::NotFound("User not found".to_string()))?;
    auth::require_owner(&caller, &target.token)?;

    let patch = ProfilePatch {
        email: request.email,
        username: request.username,
        name: request.name,
        description: request.description,
    };
    if patch.is_empty() {
        return Err(RoomerError::MissingParameter("Missing parameters".to_string()).into());
    }

    if let Some(email) = &patch.email {
        validate::non_blank(email, "Email cannot be blank")?;
        validate::email(email)?;
        if let Some(existing) = state.accounts.find_by_email(email).await? {
            if existing.id != target.id {
                return Err(RoomerError::Conflict("Email already used".to_string()).into());
            }
        }
    }
    if let Some(username) = &patch.username {
        validate::non_blank(username, "Username cannot be blank")?;
        if let Some(existing) = state.accounts.find_by_username(username).await? {
            if existing.id != target.id {
                return Err(RoomerError::Conflict("Username already used".to_string()).into());
            }
        }
    }
    if let Some(name) = &patch.name {
        validate::non_blank(name, "Name cannot be blank")?;
    }
    if let Some(description) = &patch.description {
        validate::non_blank(description, "Description cannot be blank")?;
    }

    let updated = state.accounts.update_profile(id, &patch).await?;

    Ok(Json(AccountDetail::from(updated)))
}

/// Rotate the password, salt, and session token
#[utoipa::path(
    put,
    path = "/user/update_password",
    tag = "users",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password changed, new token issued", body = PasswordChangedResponse),
        (status = 400, description = "Validation failure", body = crate::error::ErrorBody),
        (status = 401, description = "Unauthorized or wrong previous password", body = crate::error::ErrorBody)
    )
)]
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(previous), Some(new)) = (request.previous_password, request.new_password) else {
        return Err(RoomerError::MissingParameter("Missing parameters".to_string()).into());
    };

    let caller = auth::authenticate(state.accounts.as_ref(), request.token.as_deref()).await?;

    if !auth::verify_password(&previous, &caller.password_salt, &caller.password_hash)? {
        return Err(RoomerError::Unauthorized("Wrong previous password".to_string()).into());
    }
    if previous == new {
        return Err(RoomerError::Unauthorized(
            "Previous password and new password must be different".to_string(),
        )
        .into());
    }
    auth::validate_password(&new)?;

    let salt = auth::generate_salt();
    let hash = auth::hash_password(&new, &salt)?;
    let token = auth::issue_token(auth::RESET_TOKEN_BYTES);
    state
        .accounts
        .set_credentials(caller.id, &hash, &salt, &token)
        .await?;

    Ok(Json(PasswordChangedResponse {
        message: "Password successfully modified".to_string(),
        token,
    }))
}

/// Trigger the password recovery email
#[utoipa::path(
    post,
    path = "/user/recover_password",
    tag = "users",
    request_body = RecoverPasswordRequest,
    responses(
        (status = 200, description = "Recovery email queued", body = MessageResponse),
        (status = 400, description = "Missing email", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown email", body = crate::error::ErrorBody)
    )
)]
pub async fn recover_password(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecoverPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let Some(email) = request.email else {
        return Err(RoomerError::MissingParameter("Missing email".to_string()).into());
    };

    let account = state
        .accounts
        .find_by_email(&email)
        .await?
        .ok_or_else(|| RoomerError::NotFound("User not found".to_string()))?;

    let reset_link = format!(
        "{}?token={}",
        state.config.mail.reset_link_base, account.token
    );
    // Fire-and-forget: the client sees success regardless of delivery.
    if let Err(err) = state
        .mailer
        .send_password_reset(&account.email, &reset_link)
        .await
    {
        tracing::warn!(error = %err, "password recovery email delivery failed");
    }

    Ok(Json(MessageResponse::new("A link has been sent to the user")))
}

/// Attach or replace the profile picture
#[utoipa::path(
    put,
    path = "/user/upload_picture/{id}",
    tag = "users",
    params(("id" = String, Path, description = "Account id")),
    request_body = UploadPictureRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountDetail),
        (status = 400, description = "Validation or media host failure", body = crate::error::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown account", body = crate::error::ErrorBody)
    )
)]
pub async fn upload_user_picture(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UploadPictureRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let Some(picture) = request.picture else {
        return Err(RoomerError::MissingParameter("Missing picture".to_string()).into());
    };

    let caller = auth::authenticate(state.accounts.as_ref(), request.token.as_deref()).await?;
    let target = state
        .accounts
        .get(id)
        .await?
        .ok_or_else(|| RoomerError::NotFound("User not found".to_string()))?;
    auth::require_owner(&caller, &target.token)?;

    let bytes = BASE64
        .decode(picture.as_bytes())
        .map_err(|_| RoomerError::InvalidFormat("Invalid picture encoding".to_string()))?;

    // Replace semantics: the previous asset is removed from the host first.
    if let Some(existing) = &target.profile.picture {
        state.media.remove(&existing.public_id).await?;
    }
    let uploaded = state.media.upload(bytes).await?;
    let updated = state.accounts.set_picture(id, Some(uploaded)).await?;

    Ok(Json(AccountDetail::from(updated)))
}

/// Remove the profile picture
#[utoipa::path(
    delete,
    path = "/user/delete_picture/{id}",
    tag = "users",
    params(("id" = String, Path, description = "Account id")),
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountDetail),
        (status = 400, description = "Malformed id or media host failure", body = crate::error::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown account or no picture", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_user_picture(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<TokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let caller = auth::authenticate(state.accounts.as_ref(), request.token.as_deref()).await?;

    let target = state
        .accounts
        .get(id)
        .await?
        .ok_or_else(|| RoomerError::NotFound("User not found".to_string()))?;
    auth::require_owner(&caller, &target.token)?;

    let Some(existing) = &target.profile.picture else {
        return Err(RoomerError::NotFound("Picture not found".to_string()).into());
    };

    state.media.remove(&existing.public_id).await?;
    let updated = state.accounts.set_picture(id, None).await?;

    Ok(Json(AccountDetail::from(updated)))
}

/// Delete the account and cascade to its listings
#[utoipa::path(
    delete,
    path = "/user/delete/{id}",
    tag = "users",
    params(("id" = String, Path, description = "Account id")),
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 400, description = "Malformed id or media host failure", body = crate::error::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown account", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<TokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let caller = auth::authenticate(state.accounts.as_ref(), request.token.as_deref()).await?;

    let target = state
        .accounts
        .get(id)
        .await?
        .ok_or_else(|| RoomerError::NotFound("User not found".to_string()))?;
    auth::require_owner(&caller, &target.token)?;

    // Fail-closed cascade: host assets go first, records are only removed
    // once their assets are gone.
    for listing in state.listings.find_by_owner(id).await? {
        for picture in &listing.pictures {
            state.media.remove(&picture.public_id).await?;
        }
        state.listings.delete(listing.id).await?;
    }
    if let Some(picture) = &target.profile.picture {
        state.media.remove(&picture.public_id).await?;
    }
    state.accounts.delete(id).await?;

    Ok(Json(MessageResponse::new("User deleted")))
}
