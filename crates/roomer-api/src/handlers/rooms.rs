//! Listing handlers
//!
//! Publishing, search (filter/sort/pagination), proximity queries, updates,
//! picture attachment, and deletion with media-host cleanup.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use roomer_core::{
    Account, Listing, Picture, Profile, RoomerError, LISTINGS_PAGE_SIZE, MAX_LISTING_PICTURES,
    NEARBY_RADIUS, UNFILTERED_SAMPLE_SIZE,
};

use crate::auth;
use crate::error::AppError;
use crate::gateways::MediaGateway;
use crate::handlers::{parse_id, MessageResponse};
use crate::state::AppState;
use crate::stores::{AccountStore, ListingPatch, ListingQuery, ListingStore, SortOrder};
use crate::validate;

/// Owner section of a listing response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OwnerSummary {
    pub id: Uuid,
    #[schema(value_type = Object)]
    pub account: Profile,
}

impl OwnerSummary {
    pub fn from_account(account: &Account) -> Self {
        Self {
            id: account.id,
            account: account.profile.clone(),
        }
    }
}

/// Listing representation returned by every room endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    #[serde(rename = "ratingValue", skip_serializing_if = "Option::is_none")]
    pub rating_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<i32>,
    #[schema(value_type = Vec<f64>)]
    pub location: [f64; 2],
    #[schema(value_type = Vec<Object>)]
    pub pictures: Vec<Picture>,
    pub owner: OwnerSummary,
}

impl RoomResponse {
    pub fn new(listing: Listing, owner: OwnerSummary) -> Self {
        Self {
            id: listing.id,
            title: listing.title,
            description: listing.description,
            price: listing.price,
            rating_value: listing.rating_value,
            reviews: listing.reviews,
            location: listing.location,
            pictures: listing.pictures,
            owner,
        }
    }
}

/// Resolve each listing's owner to build responses; orphaned listings are
/// skipped (room references are best-effort).
async fn with_owners(
    state: &AppState,
    listings: Vec<Listing>,
) -> Result<Vec<RoomResponse>, AppError> {
    let mut owners: HashMap<Uuid, Account> = HashMap::new();
    let mut out = Vec::with_capacity(listings.len());

    for listing in listings {
        let owner = match owners.get(&listing.owner) {
            Some(owner) => owner.clone(),
            None => match state.accounts.get(listing.owner).await? {
                Some(owner) => {
                    owners.insert(listing.owner, owner.clone());
                    owner
                }
                None => continue,
            },
        };
        out.push(RoomResponse::new(listing, OwnerSummary::from_account(&owner)));
    }

    Ok(out)
}

/// Listing creation request
#[derive(Debug, Deserialize, ToSchema)]
pub struct PublishRequest {
    pub token: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    #[schema(value_type = Vec<f64>)]
    pub location: Option<Vec<f64>>,
}

/// Listing update request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoomRequest {
    pub token: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    #[schema(value_type = Vec<f64>)]
    pub location: Option<Vec<f64>>,
}

/// Picture upload request; image bytes are base64 encoded
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadRoomPictureRequest {
    pub token: Option<String>,
    pub picture: Option<String>,
}

/// Picture deletion request
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteRoomPictureRequest {
    pub token: Option<String>,
    pub picture_id: Option<String>,
}

/// Token-only request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteRoomRequest {
    pub token: Option<String>,
}

/// Search parameters for the listing list endpoint
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RoomsQuery {
    /// Case-insensitive substring match on the title
    pub title: Option<String>,
    /// Inclusive lower price bound
    #[serde(rename = "priceMin")]
    pub price_min: Option<String>,
    /// Inclusive upper price bound
    #[serde(rename = "priceMax")]
    pub price_max: Option<String>,
    /// price-asc, price-desc, date-asc, or date-desc
    pub sort: Option<String>,
    /// Page number; pages hold 5 listings
    pub page: Option<String>,
}

/// Proximity query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AroundQuery {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

/// Create a listing
#[utoipa::path(
    post,
    path = "/room/publish",
    tag = "rooms",
    request_body = PublishRequest,
    responses(
        (status = 200, description = "Listing created", body = RoomResponse),
        (status = 400, description = "Validation failure", body = crate::error::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody)
    )
)]
pub async fn publish(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PublishRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(title), Some(description), Some(price), Some(location)) = (
        request.title,
        request.description,
        request.price,
        request.location,
    ) else {
        return Err(RoomerError::MissingParameter("Missing parameters".to_string()).into());
    };

    let caller = auth::authenticate(state.accounts.as_ref(), request.token.as_deref()).await?;

    validate::non_blank(&title, "All fields must be completed correctly")?;
    validate::non_blank(&description, "All fields must be completed correctly")?;
    validate::positive_price(price, "All fields must be completed correctly")?;
    let location = validate::coordinates(&location)?;

    let listing = Listing::new(title, description, price, location, caller.id);
    state.listings.insert(&listing).await?;
    state.accounts.add_room(caller.id, listing.id).await?;

    Ok(Json(RoomResponse::new(
        listing,
        OwnerSummary::from_account(&caller),
    )))
}

/// Filter, sort, and paginate listings
///
/// With no parameters at all, returns up to 15 listings sampled at random.
/// Out-of-range page numbers fall back to the unpaged result set; this is
/// documented legacy behavior, not an error.
#[utoipa::path(
    get,
    path = "/rooms",
    tag = "rooms",
    params(RoomsQuery),
    responses(
        (status = 200, description = "Matching listings", body = [RoomResponse])
    )
)]
pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RoomsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let no_filters = params.title.is_none()
        && params.price_min.is_none()
        && params.price_max.is_none()
        && params.sort.is_none()
        && params.page.is_none();

    if no_filters {
        let total = state.listings.count().await?;
        let listings = if total > UNFILTERED_SAMPLE_SIZE {
            state.listings.sample(UNFILTERED_SAMPLE_SIZE).await?
        } else {
            state.listings.search(&ListingQuery::default()).await?
        };
        return Ok(Json(with_owners(&state, listings).await?));
    }

    // Non-numeric bounds and unknown sort values are ignored, not rejected.
    let query = ListingQuery {
        title: params.title.clone(),
        price_min: params.price_min.as_deref().and_then(|v| v.parse().ok()),
        price_max: params.price_max.as_deref().and_then(|v| v.parse().ok()),
        sort: params.sort.as_deref().and_then(SortOrder::parse),
        limit: None,
        offset: None,
    };

    let matches = state.listings.search(&query).await?;

    if let Some(page) = params.page.as_deref().and_then(|v| v.parse::<i64>().ok()) {
        let total = matches.len() as i64;
        let total_pages = (total + LISTINGS_PAGE_SIZE - 1) / LISTINGS_PAGE_SIZE;
        if page >= 1 && page <= total_pages {
            let paged = state
                .listings
                .search(&ListingQuery {
                    limit: Some(LISTINGS_PAGE_SIZE),
                    offset: Some(LISTINGS_PAGE_SIZE * (page - 1)),
                    ..query
                })
                .await?;
            return Ok(Json(with_owners(&state, paged).await?));
        }
    }

    Ok(Json(with_owners(&state, matches).await?))
}

/// Proximity search around a coordinate
#[utoipa::path(
    get,
    path = "/rooms/around",
    tag = "rooms",
    params(AroundQuery),
    responses(
        (status = 200, description = "Listings within the radius, nearest first", body = [RoomResponse]),
        (status = 400, description = "Missing or invalid coordinates", body = crate::error::ErrorBody)
    )
)]
pub async fn around(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AroundQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(latitude), Some(longitude)) = (params.latitude, params.longitude) else {
        return Err(RoomerError::MissingParameter("Missing location".to_string()).into());
    };

    let (Ok(latitude), Ok(longitude)) = (latitude.parse::<f64>(), longitude.parse::<f64>())
    else {
        return Err(RoomerError::InvalidFormat("Wrong latitude/longitude".to_string()).into());
    };
    if !(latitude > 0.0) || !(longitude > 0.0) {
        return Err(RoomerError::InvalidFormat("Wrong latitude/longitude".to_string()).into());
    }

    let listings = state
        .listings
        .nearby(latitude, longitude, NEARBY_RADIUS)
        .await?;

    Ok(Json(with_owners(&state, listings).await?))
}

/// Fetch one listing
#[utoipa::path(
    get,
    path = "/room/{id}",
    tag = "rooms",
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Listing", body = RoomResponse),
        (status = 400, description = "Malformed id", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown listing", body = crate::error::ErrorBody)
    )
)]
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;

    let listing = state
        .listings
        .get(id)
        .await?
        .ok_or_else(|| RoomerError::NotFound("Room not found".to_string()))?;
    let owner = state
        .accounts
        .get(listing.owner)
        .await?
        .ok_or_else(|| RoomerError::NotFound("Room not found".to_string()))?;

    Ok(Json(RoomResponse::new(
        listing,
        OwnerSummary::from_account(&owner),
    )))
}

/// Update listing fields
#[utoipa::path(
    put,
    path = "/room/update/{id}",
    tag = "rooms",
    params(("id" = String, Path, description = "Listing id")),
    request_body = UpdateRoomRequest,
    responses(
        (status = 200, description = "Updated listing", body = RoomResponse),
        (status = 400, description = "Validation failure", body = crate::error::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown listing", body = crate::error::ErrorBody)
    )
)]
pub async fn update_room(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateRoomRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let caller = auth::authenticate(state.accounts.as_ref(), request.token.as_deref()).await?;

    let listing = state
        .listings
        .get(id)
        .await?
        .ok_or_else(|| RoomerError::NotFound("Room not found".to_string()))?;
    let owner = auth::resolve_owner(state.accounts.as_ref(), &listing).await?;
    auth::require_owner(&caller, &owner.token)?;

    let location = match &request.location {
        Some(raw) => Some(validate::coordinates(raw)?),
        None => None,
    };
    let patch = ListingPatch {
        title: request.title,
        description: request.description,
        price: request.price,
        location,
    };
    if patch.is_empty() {
        return Err(RoomerError::MissingParameter("Missing parameters".to_string()).into());
    }

    if let Some(title) = &patch.title {
        validate::non_blank(title, "Title cannot be blank")?;
    }
    if let Some(description) = &patch.description {
        validate::non_blank(description, "Description cannot be blank")?;
    }
    if let Some(price) = patch.price {
        validate::positive_price(price, "Price must be greater than zero")?;
    }

    let updated = state.listings.update(id, &patch).await?;

    Ok(Json(RoomResponse::new(
        updated,
        OwnerSummary::from_account(&owner),
    )))
}

/// Attach a picture to a listing (at most 5)
#[utoipa::path(
    put,
    path = "/room/upload_picture/{id}",
    tag = "rooms",
    params(("id" = String, Path, description = "Listing id")),
    request_body = UploadRoomPictureRequest,
    responses(
        (status = 200, description = "Updated listing", body = RoomResponse),
        (status = 400, description = "Validation, limit, or media host failure", body = crate::error::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown listing", body = crate::error::ErrorBody)
    )
)]
pub async fn upload_room_picture(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UploadRoomPictureRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let Some(picture) = request.picture else {
        return Err(RoomerError::MissingParameter("Missing picture".to_string()).into());
    };

    let caller = auth::authenticate(state.accounts.as_ref(), request.token.as_deref()).await?;
    let listing = state
        .listings
        .get(id)
        .await?
        .ok_or_else(|| RoomerError::NotFound("Room not found".to_string()))?;
    let owner = auth::resolve_owner(state.accounts.as_ref(), &listing).await?;
    auth::require_owner(&caller, &owner.token)?;

    if listing.pictures.len() >= MAX_LISTING_PICTURES {
        return Err(
            RoomerError::LimitExceeded("Can't add more than 5 pictures".to_string()).into(),
        );
    }

    let bytes = BASE64
        .decode(picture.as_bytes())
        .map_err(|_| RoomerError::InvalidFormat("Invalid picture encoding".to_string()))?;
    let uploaded = state.media.upload(bytes).await?;

    let mut pictures = listing.pictures;
    pictures.push(uploaded);
    let updated = state.listings.set_pictures(id, pictures).await?;

    Ok(Json(RoomResponse::new(
        updated,
        OwnerSummary::from_account(&owner),
    )))
}

/// Remove one picture from a listing by its exact asset id
#[utoipa::path(
    delete,
    path = "/room/delete_picture/{id}",
    tag = "rooms",
    params(("id" = String, Path, description = "Listing id")),
    request_body = DeleteRoomPictureRequest,
    responses(
        (status = 200, description = "Updated listing", body = RoomResponse),
        (status = 400, description = "Validation or media host failure", body = crate::error::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown listing or picture", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_room_picture(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<DeleteRoomPictureRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let Some(picture_id) = request.picture_id else {
        return Err(RoomerError::MissingParameter("Missing picture_id".to_string()).into());
    };

    let caller = auth::authenticate(state.accounts.as_ref(), request.token.as_deref()).await?;
    let listing = state
        .listings
        .get(id)
        .await?
        .ok_or_else(|| RoomerError::NotFound("Room not found".to_string()))?;
    let owner = auth::resolve_owner(state.accounts.as_ref(), &listing).await?;
    auth::require_owner(&caller, &owner.token)?;

    // Exact-id match only; asset ids are unique per upload, so at most one
    // picture can match and nothing is ever multi-deleted.
    let mut pictures = listing.pictures;
    let Some(position) = pictures.iter().position(|p| p.public_id == picture_id) else {
        return Err(RoomerError::NotFound("Picture not found".to_string()).into());
    };

    state.media.remove(&picture_id).await?;
    pictures.remove(position);
    let updated = state.listings.set_pictures(id, pictures).await?;

    Ok(Json(RoomResponse::new(
        updated,
        OwnerSummary::from_account(&owner),
    )))
}

/// Delete a listing and its pictures
#[utoipa::path(
    delete,
    path = "/room/delete/{id}",
    tag = "rooms",
    params(("id" = String, Path, description = "Listing id")),
    request_body = DeleteRoomRequest,
    responses(
        (status = 200, description = "Listing deleted", body = MessageResponse),
        (status = 400, description = "Malformed id or media host failure", body = crate::error::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown listing", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_room(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<DeleteRoomRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let caller = auth::authenticate(state.accounts.as_ref(), request.token.as_deref()).await?;

    let listing = state
        .listings
        .get(id)
        .await?
        .ok_or_else(|| RoomerError::NotFound("Room not found".to_string()))?;
    let owner = auth::resolve_owner(state.accounts.as_ref(), &listing).await?;
    auth::require_owner(&caller, &owner.token)?;

    // Fail-closed cascade: one removal per picture, record deleted last.
    for picture in &listing.pictures {
        state.media.remove(&picture.public_id).await?;
    }
    state.listings.delete(id).await?;
    state.accounts.remove_room(listing.owner, id).await?;

    Ok(Json(MessageResponse::new("Room deleted")))
}
