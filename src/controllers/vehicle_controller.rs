//! Controller de vehículos
//!
//! CRUD del lender sobre su flota. La subida de imágenes vive en un store
//! externo: aquí solo se guarda la URL.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::api::ApiResponse;
use crate::dto::rental_dto::RentalResponse;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest, VehicleResponse};
use crate::models::vehicle::Vehicle;
use crate::repositories::rental_repository::RentalRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::AppError;
use crate::utils::validation::validate_coordinates;

pub struct VehicleController {
    vehicles: VehicleRepository,
    rentals: RentalRepository,
}

impl VehicleController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            vehicles: VehicleRepository::new(pool.clone()),
            rentals: RentalRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        request: CreateVehicleRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        request.validate()?;
        validate_coordinates(request.latitude, request.longitude)?;

        let vehicle = self
            .vehicles
            .create(
                owner_id,
                request.category,
                request.company,
                request.model,
                request.year,
                request.num_plate,
                request.price_per_hour,
                request.latitude,
                request.longitude,
                request.image_url,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            vehicle.into(),
            "Vehicle added".to_string(),
        ))
    }

    pub async fn my_vehicles(&self, owner_id: Uuid) -> Result<Vec<VehicleResponse>, AppError> {
        let vehicles = self.vehicles.find_by_owner(owner_id).await?;
        Ok(vehicles.into_iter().map(VehicleResponse::from).collect())
    }

    pub async fn update(
        &self,
        owner_id: Uuid,
        vehicle_id: Uuid,
        request: UpdateVehicleRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        self.owned_vehicle(owner_id, vehicle_id).await?;

        let vehicle = self
            .vehicles
            .update(
                vehicle_id,
                request.price_per_hour,
                request.image_url,
                request.available,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            vehicle.into(),
            "Vehicle updated".to_string(),
        ))
    }

    pub async fn delete(&self, owner_id: Uuid, vehicle_id: Uuid) -> Result<(), AppError> {
        self.owned_vehicle(owner_id, vehicle_id).await?;
        self.vehicles.delete(vehicle_id).await
    }

    /// Historial de alquileres de un vehículo, solo para su owner
    pub async fn rent_history(
        &self,
        owner_id: Uuid,
        vehicle_id: Uuid,
    ) -> Result<Vec<RentalResponse>, AppError> {
        self.owned_vehicle(owner_id, vehicle_id).await?;

        let rentals = self.rentals.find_by_vehicle(vehicle_id).await?;
        Ok(rentals.into_iter().map(RentalResponse::from).collect())
    }

    async fn owned_vehicle(&self, owner_id: Uuid, vehicle_id: Uuid) -> Result<Vehicle, AppError> {
        let vehicle = self
            .vehicles
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        if vehicle.owner_id != owner_id {
            return Err(AppError::Forbidden(
                "Not allowed to manage this vehicle".to_string(),
            ));
        }

        Ok(vehicle)
    }
}
