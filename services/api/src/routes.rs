//! API service routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use chrono::Utc;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    calendar,
    error::ApiError,
    extract::{ApiJson, ApiPath, ApiQuery},
    models::{
        calendar::CalendarQuery,
        payloads::{
            AuthResponse, BookingCreated, CreateBookingRequest, CreatePropertyRequest,
            CreateRoomRequest, DataQuery, DeletePropertyRequest, LoginRequest, PropertyCreated,
            RoomCreated, SignupRequest, SuccessResponse, UserResponse,
        },
    },
    state::AppState,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/data", get(list_data))
        .route("/properties", post(create_property))
        .route("/properties/:id", delete(delete_property))
        .route("/rooms", post(create_room))
        .route("/rooms/:id/calendar", get(room_calendar))
        .route("/bookings", post(create_booking));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
///
/// Answers 503 when the store cannot be reached.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (status, label) = match state.gateway.health_check().await {
        Ok(true) => (StatusCode::OK, "ok"),
        Ok(false) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
        Err(e) => {
            tracing::error!("Store health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    (
        status,
        Json(json!({
            "status": label,
            "service": "syncstay-api"
        })),
    )
}

/// Register a new user
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.gateway.signup(&payload).await?;

    Ok(Json(AuthResponse {
        success: true,
        user: UserResponse::from(&user),
    }))
}

/// Log a user in
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.gateway.login(&payload).await?;

    Ok(Json(AuthResponse {
        success: true,
        user: UserResponse::from(&user),
    }))
}

/// List the properties, rooms and bookings owned by a user
pub async fn list_data(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DataQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let data = state.gateway.list_data(query.user_id).await?;
    Ok(Json(data))
}

/// Create a property
pub async fn create_property(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreatePropertyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let property = state.gateway.create_property(&payload).await?;

    Ok(Json(PropertyCreated {
        success: true,
        property,
    }))
}

/// Create a room
pub async fn create_room(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateRoomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let room = state.gateway.create_room(&payload).await?;

    Ok(Json(RoomCreated {
        success: true,
        room,
    }))
}

/// Create a pin-gated booking
pub async fn create_booking(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = state.gateway.create_booking(&payload).await?;

    Ok(Json(BookingCreated {
        success: true,
        booking,
    }))
}

/// Delete a property and everything under it
pub async fn delete_property(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<DeletePropertyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.gateway.delete_property(id, &payload.pin).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Read-only month calendar of a room, for sharing with agents
pub async fn room_calendar(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<CalendarQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let month = match query.month.as_deref() {
        Some(month) => calendar::parse_month(month).map_err(ApiError::BadRequest)?,
        None => calendar::month_start(Utc::now().date_naive()),
    };

    let view = state.gateway.room_calendar(id, month).await?;
    Ok(Json(view))
}
