//! Rutas de vehículos (gestión de flota del lender)

use axum::{
    extract::{Path, State},
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::api::ApiResponse;
use crate::dto::rental_dto::RentalResponse;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest, VehicleResponse};
use crate::middleware::auth::{auth_middleware, vendor_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(create_vehicle))
        .route("/", get(my_vehicles))
        .route("/:id", patch(update_vehicle))
        .route("/:id", delete(delete_vehicle))
        .route("/:id/rents", get(vehicle_rent_history))
        .route_layer(from_fn_with_state(state.clone(), vendor_middleware))
        .route_layer(from_fn_with_state(state, auth_middleware))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<(axum::http::StatusCode, Json<ApiResponse<VehicleResponse>>), AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.create(user.user_id, request).await?;
    Ok((axum::http::StatusCode::CREATED, Json(response)))
}

async fn my_vehicles(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.my_vehicles(user.user_id).await?;
    Ok(Json(response))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.update(user.user_id, id, request).await?;
    Ok(Json(response))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    controller.delete(user.user_id, id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Vehicle deleted"
    })))
}

async fn vehicle_rent_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<RentalResponse>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.rent_history(user.user_id, id).await?;
    Ok(Json(response))
}
