//! DTOs de Vehicle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::vehicle::{RatingAggregate, Vehicle, VehicleCategory};

// Request para publicar un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    pub category: VehicleCategory,

    #[validate(length(min = 2, max = 100))]
    pub company: String,

    #[validate(length(min = 1, max = 100))]
    pub model: String,

    #[validate(range(min = 1900, max = 2030))]
    pub year: i32,

    #[validate(length(min = 3, max = 20))]
    pub num_plate: String,

    pub price_per_hour: f64,

    pub latitude: f64,
    pub longitude: f64,

    // URL del store de imágenes externo
    #[validate(length(min = 1))]
    pub image_url: String,
}

// Request para actualizar un vehículo (solo precio, imagen y disponibilidad
// publicitaria son mutables)
#[derive(Debug, Deserialize)]
pub struct UpdateVehicleRequest {
    pub price_per_hour: Option<f64>,
    pub image_url: Option<String>,
    pub available: Option<bool>,
}

// Response de vehículo
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category: VehicleCategory,
    pub company: String,
    pub model: String,
    pub year: i32,
    pub num_plate: String,
    pub price_per_hour: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub image_url: String,
    pub available: bool,
    pub rating: RatingAggregate,
    pub created_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(v: Vehicle) -> Self {
        Self {
            id: v.id,
            owner_id: v.owner_id,
            category: v.category,
            company: v.company,
            model: v.model,
            year: v.year,
            num_plate: v.num_plate,
            price_per_hour: v.price_per_hour.to_string().parse().unwrap_or(0.0),
            latitude: v.latitude,
            longitude: v.longitude,
            image_url: v.image_url,
            available: v.available,
            rating: RatingAggregate::new(v.rating_average, v.rating_count),
            created_at: v.created_at,
        }
    }
}
