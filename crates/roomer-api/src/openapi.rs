//! OpenAPI / Swagger UI documentation
//!
//! - Swagger UI: `/swagger-ui`
//! - OpenAPI JSON: `/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::handlers::health::HealthResponse;
use crate::handlers::rooms::{
    DeleteRoomPictureRequest, DeleteRoomRequest, OwnerSummary, PublishRequest, RoomResponse,
    UpdateRoomRequest, UploadRoomPictureRequest,
};
use crate::handlers::users::{
    AccountDetail, AccountView, LogInRequest, PasswordChangedResponse, RecoverPasswordRequest,
    SessionResponse, SignUpRequest, TokenRequest, UpdatePasswordRequest, UpdateUserRequest,
    UploadPictureRequest,
};
use crate::handlers::MessageResponse;

/// Main API documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Roomer API",
        version = "0.1.0",
        description = "Backend for a property-rental marketplace: accounts, listings, \
                       opaque-token authentication, image attachments, and proximity search.",
        license(name = "Apache-2.0")
    ),
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::sign_up,
        crate::handlers::users::log_in,
        crate::handlers::users::get_user,
        crate::handlers::users::user_rooms,
        crate::handlers::users::update_user,
        crate::handlers::users::update_password,
        crate::handlers::users::recover_password,
        crate::handlers::users::upload_user_picture,
        crate::handlers::users::delete_user_picture,
        crate::handlers::users::delete_user,
        crate::handlers::rooms::publish,
        crate::handlers::rooms::list_rooms,
        crate::handlers::rooms::around,
        crate::handlers::rooms::get_room,
        crate::handlers::rooms::update_room,
        crate::handlers::rooms::upload_room_picture,
        crate::handlers::rooms::delete_room_picture,
        crate::handlers::rooms::delete_room,
    ),
    components(schemas(
        ErrorBody,
        MessageResponse,
        HealthResponse,
        SignUpRequest,
        LogInRequest,
        SessionResponse,
        AccountView,
        AccountDetail,
        UpdateUserRequest,
        UpdatePasswordRequest,
        PasswordChangedResponse,
        RecoverPasswordRequest,
        UploadPictureRequest,
        TokenRequest,
        OwnerSummary,
        RoomResponse,
        PublishRequest,
        UpdateRoomRequest,
        UploadRoomPictureRequest,
        DeleteRoomPictureRequest,
        DeleteRoomRequest,
    )),
    tags(
        (name = "users", description = "Account management"),
        (name = "rooms", description = "Listing management"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
