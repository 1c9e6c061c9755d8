//! Rutas de alquileres
//!
//! /available es pública; el resto exige token. Las rutas del lender
//! (requests, approve, reject) exigen además rol vendor.

use axum::{
    extract::{Path, Query, State},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::rental_controller::RentalController;
use crate::dto::api::ApiResponse;
use crate::dto::rental_dto::{
    AvailabilityQuery, AvailabilityRequest, AvailabilityResponse, RatingRequest, RentRequest,
    RentalResponse,
};
use crate::middleware::auth::{auth_middleware, vendor_middleware, AuthenticatedUser};
use crate::models::vehicle::RatingAggregate;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_rental_router(state: AppState) -> Router<AppState> {
    let lender_routes = Router::new()
        .route("/requests", get(lender_requests))
        .route("/:id/approve", patch(approve_rental))
        .route("/:id/reject", patch(reject_rental))
        .route_layer(from_fn_with_state(state.clone(), vendor_middleware));

    let renter_routes = Router::new()
        .route("/rent", post(rent_vehicle))
        .route("/rating", post(rate_rental))
        .route("/my", get(my_rentals));

    Router::new()
        .merge(renter_routes)
        .merge(lender_routes)
        .route_layer(from_fn_with_state(state, auth_middleware))
        .route("/available", post(get_available_vehicles))
}

async fn get_available_vehicles(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
    Json(request): Json<AvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let controller = RentalController::new(state.pool.clone());
    let response = controller
        .find_available(request, query, state.config.search_radius_m)
        .await?;
    Ok(Json(response))
}

async fn rent_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<RentRequest>,
) -> Result<(axum::http::StatusCode, Json<ApiResponse<RentalResponse>>), AppError> {
    let controller = RentalController::new(state.pool.clone());
    let response = controller.rent(user.user_id, request).await?;
    Ok((axum::http::StatusCode::CREATED, Json(response)))
}

async fn rate_rental(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<RatingRequest>,
) -> Result<Json<ApiResponse<RatingAggregate>>, AppError> {
    let controller = RentalController::new(state.pool.clone());
    let response = controller.rate(user.user_id, request).await?;
    Ok(Json(response))
}

async fn my_rentals(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<RentalResponse>>, AppError> {
    let controller = RentalController::new(state.pool.clone());
    let response = controller.my_rentals(user.user_id).await?;
    Ok(Json(response))
}

async fn lender_requests(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<crate::dto::rental_dto::StatusFilterQuery>,
) -> Result<Json<Vec<RentalResponse>>, AppError> {
    let controller = RentalController::new(state.pool.clone());
    let response = controller
        .lender_requests(user.user_id, query.status.as_deref())
        .await?;
    Ok(Json(response))
}

async fn approve_rental(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RentalResponse>>, AppError> {
    let controller = RentalController::new(state.pool.clone());
    let response = controller.approve(user.user_id, id).await?;
    Ok(Json(response))
}

async fn reject_rental(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RentalResponse>>, AppError> {
    let controller = RentalController::new(state.pool.clone());
    let response = controller.reject(user.user_id, id).await?;
    Ok(Json(response))
}
